// Executable name -> loader importer lookup

use std::collections::BTreeMap;

use crate::mods::types::LoaderProfile;

/// Maps a game executable to the loader profile that supports it
pub trait ProfileResolver: Send + Sync {
    fn profile_for(&self, executable_name: &str) -> Option<LoaderProfile>;
}

/// Games the loader ships importers for
const BUILTIN_PROFILES: &[(&str, &str)] = &[
    ("endfield.exe", "EFMI"),
    ("genshinimpact.exe", "GIMI"),
    ("starrail.exe", "SRMI"),
    ("zenlesszonezero.exe", "ZZMI"),
    ("bh3.exe", "HIMI"),
    ("client-win64-shipping.exe", "WWMI"),
];

/// The builtin table plus user-configured entries, which take precedence
#[derive(Debug, Clone, Default)]
pub struct BuiltinProfiles {
    extra: BTreeMap<String, String>,
}

impl BuiltinProfiles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_extra(extra: &BTreeMap<String, String>) -> Self {
        Self {
            extra: extra
                .iter()
                .map(|(exe, id)| (exe.to_lowercase(), id.trim().to_string()))
                .filter(|(_, id)| !id.is_empty())
                .collect(),
        }
    }
}

impl ProfileResolver for BuiltinProfiles {
    fn profile_for(&self, executable_name: &str) -> Option<LoaderProfile> {
        let key = executable_name.trim().to_lowercase();
        if let Some(id) = self.extra.get(&key) {
            return Some(LoaderProfile::new(id.clone()));
        }
        BUILTIN_PROFILES
            .iter()
            .find(|(exe, _)| *exe == key)
            .map(|(_, id)| LoaderProfile::new(*id))
    }
}

/// A non-blank importer pinned on the game wins over the lookup
pub fn pick_profile(
    pinned: Option<&str>,
    resolver: &dyn ProfileResolver,
    executable_name: &str,
) -> Option<LoaderProfile> {
    match pinned.map(str::trim).filter(|id| !id.is_empty()) {
        Some(id) => Some(LoaderProfile::new(id.to_uppercase())),
        None => resolver.profile_for(executable_name),
    }
}
