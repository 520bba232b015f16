mod cli;
mod clock;
mod config;
mod error;
mod game;
mod launch;
mod mods;
mod paths;
mod process;
mod tracking;

#[cfg(test)]
mod testing;

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::cli::{Args, Command};
use crate::clock::SystemClock;
use crate::config::{load_cfg, load_cfg_from, save_cfg, AppConfig};
use crate::game::{GameStore, YamlGameStore};
use crate::launch::{Collaborators, DetachedSpawner, Launcher, SystemShell};
use crate::mods::{BuiltinProfiles, LoaderDeps, LocalPackages, ModLoaderBridge, SystemRunners};
use crate::paths::{PATH_CONFIG, PATH_GAMES, PATH_LOADER, PATH_RUNNERS};
use crate::process::{probe_for, PkillKiller};

fn main() -> Result<()> {
    let args = Args::parse();

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("nekomimi=info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let config = match &args.config {
        Some(path) => load_cfg_from(path),
        None => load_cfg(),
    };
    let games_dir = args.games_dir.clone().unwrap_or_else(|| PATH_GAMES.clone());
    let store = Arc::new(YamlGameStore::new(games_dir));

    match args.command {
        Command::List { json } => list_games(&store, json),
        Command::Launch { id, no_wait } => launch_game(&config, store, &id, no_wait),
        Command::Status { json } => show_status(&config, store, json),
        Command::Config { write } => {
            print!("{}", serde_yaml::to_string(&config)?);
            if write {
                let path = args.config.as_deref().unwrap_or(PATH_CONFIG.as_path());
                save_cfg(&config, path)?;
                info!("Wrote {}", path.display());
            }
            Ok(())
        }
    }
}

/// Wire the launcher to the real system
fn build_launcher(config: &AppConfig, store: Arc<dyn GameStore>) -> Launcher {
    let clock = Arc::new(SystemClock);
    let spawner = Arc::new(DetachedSpawner);
    let profiles = Arc::new(BuiltinProfiles::with_extra(&config.loader.profiles));
    let runners = Arc::new(SystemRunners::detect(&config.runner.scan_paths));

    let loader_root = match config.loader.path.trim() {
        "" => PATH_LOADER.clone(),
        path => path.into(),
    };
    let installer = Arc::new(LocalPackages::new(
        loader_root,
        PATH_RUNNERS.clone(),
        SystemRunners::detect(&config.runner.scan_paths),
    ));

    let loader = ModLoaderBridge::new(
        &config.loader,
        LoaderDeps {
            profiles: profiles.clone(),
            installer,
            runners,
            killer: Arc::new(PkillKiller),
            spawner: spawner.clone(),
            clock: clock.clone(),
        },
    );

    Launcher::new(
        Collaborators {
            store,
            probe: probe_for(config.tracking.probe),
            shell: Arc::new(SystemShell),
            spawner,
            loader: Arc::new(loader),
            profiles,
            clock,
        },
        config.tracking.launch_grace(),
    )
}

fn list_games(store: &YamlGameStore, json: bool) -> Result<()> {
    let games = store.list().context("Failed to read game library")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&games)?);
        return Ok(());
    }

    if games.is_empty() {
        println!("No games in {}", store.dir().display());
        return Ok(());
    }
    for game in games {
        let last_played = game
            .last_played
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "never".to_string());
        let mods = if game.mods.enabled { " [mods]" } else { "" };
        println!(
            "{:<12} {:<32} {:<7} {:>7.1}h  last played {}{}",
            game.id,
            game.name,
            format!("{:?}", game.runner.kind).to_lowercase(),
            game.playtime,
            last_played,
            mods
        );
    }
    Ok(())
}

fn launch_game(config: &AppConfig, store: Arc<dyn GameStore>, id: &str, no_wait: bool) -> Result<()> {
    let launcher = build_launcher(config, store);
    launcher.reattach();

    let outcome = launcher.launch(id);
    if !outcome.success {
        bail!(outcome.error.unwrap_or_else(|| "Launch failed".to_string()));
    }
    match outcome.pid {
        Some(pid) => println!("Started {} (pid {})", id, pid),
        None => println!("Started {} through the mod loader", id),
    }

    if no_wait {
        return Ok(());
    }

    let reconciler = launcher
        .reconciler(config.tracking.reconcile_interval())
        .spawn()
        .context("Failed to start process tracking")?;

    // Also waits for any re-attached sessions
    info!("Waiting for running games to exit");
    launcher.registry().wait_until_idle(None);

    launcher.registry().shutdown();
    if reconciler.join().is_err() {
        warn!("Reconciler thread panicked");
    }
    Ok(())
}

fn show_status(config: &AppConfig, store: Arc<dyn GameStore>, json: bool) -> Result<()> {
    let launcher = build_launcher(config, store);
    launcher.reattach();
    let running = launcher.list_running();

    if json {
        println!("{}", serde_json::to_string_pretty(&running)?);
    } else if running.is_empty() {
        println!("No games running");
    } else {
        for game in running {
            println!(
                "{:<12} since {}",
                game.game_id,
                game.started_at.format("%Y-%m-%d %H:%M")
            );
        }
    }
    Ok(())
}
