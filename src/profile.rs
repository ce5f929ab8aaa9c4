//! Filesystem layout of the persistent profile.
//!
//! ```text
//! <home>/.lumen_profile/
//! ├── cache/           engine HTTP cache
//! ├── storage/         cookies, local storage, IndexedDB
//! └── bookmarks.json   JSON array of URL strings
//! ```
//!
//! Only the persistent session ever touches these paths. Incognito sessions
//! are fully in-memory.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::ProfileConfig;
use crate::error::{Error, Result};

const CACHE_DIR: &str = "cache";
const STORAGE_DIR: &str = "storage";
const BOOKMARKS_FILE: &str = "bookmarks.json";

/// Paths of the persistent profile, rooted at a fixed directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfilePaths {
    root: PathBuf,
}

impl ProfilePaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolves the root from the config: the explicit root if set,
    /// otherwise `<home>/<dir_name>`.
    pub fn from_config(config: &ProfileConfig) -> Self {
        match &config.root {
            Some(root) => Self::new(root.clone()),
            None => Self::new(home_dir().join(&config.dir_name)),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn cache_dir(&self) -> PathBuf {
        self.root.join(CACHE_DIR)
    }

    pub fn storage_dir(&self) -> PathBuf {
        self.root.join(STORAGE_DIR)
    }

    pub fn bookmarks_file(&self) -> PathBuf {
        self.root.join(BOOKMARKS_FILE)
    }

    /// Creates the root, `cache/` and `storage/` if they are missing.
    pub fn ensure_dirs(&self) -> Result<()> {
        for dir in [self.root.clone(), self.cache_dir(), self.storage_dir()] {
            fs::create_dir_all(&dir).map_err(|source| Error::ProfileDir {
                path: dir.clone(),
                source,
            })?;
        }
        debug!(root = %self.root.display(), "Profile directories ready");
        Ok(())
    }
}

/// The user's home directory, from the environment.
///
/// Falls back to the current directory when no home is set.
pub fn home_dir() -> PathBuf {
    #[cfg(windows)]
    let home = std::env::var_os("USERPROFILE");
    #[cfg(not(windows))]
    let home = std::env::var_os("HOME");

    home.map(PathBuf::from).unwrap_or_else(|| PathBuf::from("."))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_under_root() {
        let paths = ProfilePaths::new("/profiles/lumen");
        assert_eq!(paths.cache_dir(), Path::new("/profiles/lumen/cache"));
        assert_eq!(paths.storage_dir(), Path::new("/profiles/lumen/storage"));
        assert_eq!(paths.bookmarks_file(), Path::new("/profiles/lumen/bookmarks.json"));
    }

    #[test]
    fn test_explicit_root_wins() {
        let config = ProfileConfig {
            dir_name: ".ignored".to_string(),
            root: Some(PathBuf::from("/srv/lumen")),
        };
        assert_eq!(ProfilePaths::from_config(&config).root(), Path::new("/srv/lumen"));
    }

    #[test]
    fn test_default_root_uses_dir_name() {
        let paths = ProfilePaths::from_config(&ProfileConfig::default());
        assert!(paths.root().ends_with(".lumen_profile"));
    }

    #[test]
    fn test_ensure_dirs_creates_layout() {
        let dir = tempfile::tempdir().unwrap();
        let paths = ProfilePaths::new(dir.path().join("profile"));
        paths.ensure_dirs().unwrap();
        assert!(paths.cache_dir().is_dir());
        assert!(paths.storage_dir().is_dir());
        // Idempotent.
        paths.ensure_dirs().unwrap();
    }

    #[test]
    fn test_ensure_dirs_reports_failure() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        fs::write(&blocker, b"x").unwrap();
        let paths = ProfilePaths::new(blocker.join("profile"));
        let err = paths.ensure_dirs().unwrap_err();
        assert!(matches!(err, Error::ProfileDir { .. }));
    }
}
