//! Compatibility runtime discovery
//!
//! The loader is started with a Proton build's own `wine64`, so only
//! directories laid out like Proton (`files/bin/wine64`) count.

use std::cmp::Ordering;
use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use crate::paths::{PATH_RUNNERS, PATH_STEAM};

#[derive(Debug, Clone, PartialEq)]
pub struct CompatRuntime {
    pub name: String,
    pub root: PathBuf,
}

impl CompatRuntime {
    pub fn wine64(&self) -> PathBuf {
        wine64_in(&self.root)
    }

    /// `Some` if `root` looks like a Proton build
    pub fn from_root(root: &Path) -> Option<Self> {
        if !wine64_in(root).is_file() {
            return None;
        }
        Some(Self {
            name: root.file_name()?.to_string_lossy().into_owned(),
            root: root.to_path_buf(),
        })
    }
}

fn wine64_in(root: &Path) -> PathBuf {
    root.join("files").join("bin").join("wine64")
}

pub trait RunnerLocator: Send + Sync {
    /// Find a runtime. `preferred` is an absolute runtime directory or the
    /// name of one under a search root; empty picks the newest discovered.
    fn locate(&self, preferred: &str) -> Option<CompatRuntime>;
}

/// Searches the app's runners directory, configured paths and Steam's
/// `compatibilitytools.d`
pub struct SystemRunners {
    roots: Vec<PathBuf>,
}

impl SystemRunners {
    pub fn new(roots: Vec<PathBuf>) -> Self {
        Self { roots }
    }

    pub fn detect(scan_paths: &[String]) -> Self {
        let mut roots = vec![PATH_RUNNERS.clone()];
        roots.extend(
            scan_paths
                .iter()
                .map(|p| p.trim())
                .filter(|p| !p.is_empty())
                .map(PathBuf::from),
        );
        if let Ok(steam_dir) = steamlocate::SteamDir::locate() {
            roots.push(steam_dir.path().join("compatibilitytools.d"));
        }
        roots.push(PATH_STEAM.join("compatibilitytools.d"));

        let mut unique: Vec<PathBuf> = Vec::new();
        for root in roots {
            if !unique.contains(&root) {
                unique.push(root);
            }
        }
        Self::new(unique)
    }

    /// Every runtime under the search roots, newest version first
    pub fn discover(&self) -> Vec<CompatRuntime> {
        let mut found: Vec<CompatRuntime> = Vec::new();
        for root in &self.roots {
            let walk = WalkDir::new(root).min_depth(1).max_depth(1).follow_links(true);
            for entry in walk.into_iter().filter_map(|e| e.ok()) {
                if !entry.file_type().is_dir() {
                    continue;
                }
                if let Some(runtime) = CompatRuntime::from_root(entry.path())
                    && !found.iter().any(|r| r.name == runtime.name)
                {
                    found.push(runtime);
                }
            }
        }
        found.sort_by(|a, b| version_cmp(&b.name, &a.name));
        found
    }
}

impl RunnerLocator for SystemRunners {
    fn locate(&self, preferred: &str) -> Option<CompatRuntime> {
        let preferred = preferred.trim();
        if preferred.is_empty() {
            let newest = self.discover().into_iter().next();
            debug!("Newest compatibility runtime: {:?}", newest.as_ref().map(|r| &r.name));
            return newest;
        }

        let as_path = Path::new(preferred);
        if as_path.is_absolute() {
            return CompatRuntime::from_root(as_path);
        }

        self.roots
            .iter()
            .find_map(|root| CompatRuntime::from_root(&root.join(preferred)))
            .or_else(|| {
                self.discover()
                    .into_iter()
                    .find(|r| r.name.eq_ignore_ascii_case(preferred))
            })
    }
}

/// Compare names so that embedded numbers sort numerically
/// (`GE-Proton10-2` > `GE-Proton9-27`)
fn version_cmp(a: &str, b: &str) -> Ordering {
    let mut a = a.chars().peekable();
    let mut b = b.chars().peekable();

    loop {
        match (a.peek().copied(), b.peek().copied()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) if x.is_ascii_digit() && y.is_ascii_digit() => {
                let na = take_number(&mut a);
                let nb = take_number(&mut b);
                match na.cmp(&nb) {
                    Ordering::Equal => {}
                    other => return other,
                }
            }
            (Some(x), Some(y)) => {
                match x.to_ascii_lowercase().cmp(&y.to_ascii_lowercase()) {
                    Ordering::Equal => {}
                    other => return other,
                }
                a.next();
                b.next();
            }
        }
    }
}

fn take_number(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> u64 {
    let mut n: u64 = 0;
    while let Some(d) = chars.peek().and_then(|c| c.to_digit(10)) {
        n = n.saturating_mul(10).saturating_add(d as u64);
        chars.next();
    }
    n
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn fake_runtime(root: &Path, name: &str) -> PathBuf {
        let dir = root.join(name);
        fs::create_dir_all(dir.join("files/bin")).unwrap();
        fs::write(dir.join("files/bin/wine64"), "").unwrap();
        dir
    }

    #[test]
    fn version_ordering_is_numeric() {
        assert_eq!(version_cmp("GE-Proton10-2", "GE-Proton9-27"), Ordering::Greater);
        assert_eq!(version_cmp("GE-Proton10-14", "GE-Proton10-2"), Ordering::Greater);
        assert_eq!(version_cmp("proton-9", "Proton-9"), Ordering::Equal);
    }

    #[test]
    fn discover_skips_non_proton_dirs_and_sorts_newest_first() {
        let dir = tempfile::tempdir().unwrap();
        fake_runtime(dir.path(), "GE-Proton9-27");
        fake_runtime(dir.path(), "GE-Proton10-14");
        fs::create_dir_all(dir.path().join("wine-ge-8-26/bin")).unwrap();

        let runners = SystemRunners::new(vec![dir.path().to_path_buf(), dir.path().join("missing")]);
        let names: Vec<String> = runners.discover().into_iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["GE-Proton10-14", "GE-Proton9-27"]);
    }

    #[test]
    fn locate_by_path_name_or_newest() {
        let dir = tempfile::tempdir().unwrap();
        let older = fake_runtime(dir.path(), "GE-Proton9-27");
        fake_runtime(dir.path(), "GE-Proton10-14");
        let runners = SystemRunners::new(vec![dir.path().to_path_buf()]);

        let by_path = runners.locate(older.to_str().unwrap()).unwrap();
        assert_eq!(by_path.name, "GE-Proton9-27");
        assert_eq!(by_path.wine64(), older.join("files/bin/wine64"));

        assert_eq!(runners.locate("ge-proton9-27").unwrap().name, "GE-Proton9-27");
        assert_eq!(runners.locate("").unwrap().name, "GE-Proton10-14");
        assert!(runners.locate("/nowhere/Proton").is_none());
    }
}
