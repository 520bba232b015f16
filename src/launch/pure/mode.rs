//! Direct vs. loader-mediated launch selection

use crate::mods::LoaderProfile;

#[derive(Debug, Clone, PartialEq)]
pub enum LaunchMode {
    Direct,
    Loader(LoaderProfile),
}

/// Combine "the user wants mods" with "a loader profile exists for this game".
///
/// Both must hold for the loader path. Mods enabled on a game without a
/// profile falls back to a direct launch.
pub fn select_mode(mods_enabled: bool, profile: Option<LoaderProfile>) -> LaunchMode {
    match (mods_enabled, profile) {
        (true, Some(profile)) => LaunchMode::Loader(profile),
        _ => LaunchMode::Direct,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loader_needs_both_intent_and_profile() {
        let efmi = LoaderProfile::new("EFMI");
        assert_eq!(select_mode(true, Some(efmi.clone())), LaunchMode::Loader(efmi.clone()));
        assert_eq!(select_mode(false, Some(efmi)), LaunchMode::Direct);
        assert_eq!(select_mode(true, None), LaunchMode::Direct);
        assert_eq!(select_mode(false, None), LaunchMode::Direct);
    }
}
