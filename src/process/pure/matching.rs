// Process matching helpers (pure, no I/O)

use regex::{Regex, RegexBuilder};

/// Case-insensitive literal matcher for an executable name inside a command line.
///
/// Returns `None` for an empty name, which would otherwise match everything.
pub fn name_pattern(executable_name: &str) -> Option<Regex> {
    if executable_name.is_empty() {
        return None;
    }
    RegexBuilder::new(&regex::escape(executable_name))
        .case_insensitive(true)
        .build()
        .ok()
}

/// Parse the one-pid-per-line output of pgrep, dropping `exclude`
pub fn parse_pid_list(output: &str, exclude: u32) -> Vec<u32> {
    output
        .lines()
        .filter_map(|line| line.trim().parse::<u32>().ok())
        .filter(|pid| *pid != exclude)
        .collect()
}

/// Escape a literal for a POSIX extended regex (pgrep/pkill patterns)
pub fn ere_escape(literal: &str) -> String {
    let mut escaped = String::with_capacity(literal.len());
    for c in literal.chars() {
        if matches!(
            c,
            '.' | '^' | '$' | '*' | '+' | '?' | '(' | ')' | '[' | ']' | '{' | '}' | '|' | '\\'
        ) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
