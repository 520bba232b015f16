//! Launch validation functions (pure, no side effects)

use crate::error::LaunchError;
use crate::game::GameRecord;

/// Check that a game has every field its runner needs.
///
/// Native games only need an executable; Wine and Proton games also need a
/// runner path and a prefix. All missing fields are reported at once.
pub fn validate_game(game: &GameRecord) -> Result<(), LaunchError> {
    let mut missing = Vec::new();

    if game.executable.trim().is_empty() {
        missing.push("executable");
    }
    if !game.runner.kind.is_native() {
        if game.runner.path.trim().is_empty() {
            missing.push("runner path");
        }
        if game.runner.prefix.trim().is_empty() {
            missing.push("runner prefix");
        }
    }

    if missing.is_empty() {
        Ok(())
    } else {
        Err(LaunchError::Validation(missing.join(", ")))
    }
}
