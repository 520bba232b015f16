//! CLI argument definitions

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "nekomimi")]
#[command(about = "Launch Windows games under Wine/Proton and track playtime", version)]
pub struct Args {
    /// Config file (default: ~/.config/nekomimi/config.yml)
    #[arg(long, value_name = "FILE", env = "NEKOMIMI_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory holding one YAML file per game
    #[arg(long, value_name = "DIR", env = "NEKOMIMI_GAMES")]
    pub games_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// List the game library
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Launch a game and track it until it exits
    ///
    /// Wine and Proton games launched without the mod loader are timed by the
    /// wine/umu-run process, which can exit before or after the game itself.
    Launch {
        /// Game id
        id: String,
        /// Return right after the game starts (playtime is not recorded)
        #[arg(long)]
        no_wait: bool,
    },
    /// Show games that are currently running
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the effective config
    Config {
        /// Also write it to the config file, filling in defaults
        #[arg(long)]
        write: bool,
    },
}
