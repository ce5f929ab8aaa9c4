//! History, bookmarks and downloads.
//!
//! All three are ordered lists deduplicated by exact string value (no URL
//! normalization: `https://a.com` and `https://a.com/` are distinct).
//! Only bookmarks reach the disk, as a JSON array of strings that is
//! rewritten in full on every addition.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::session::SessionMode;

/// Visited URLs, in memory only.
#[derive(Debug, Clone, Default)]
pub struct HistoryStore {
    entries: Vec<String>,
}

impl HistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a visit. Returns `false` when nothing was added: the URL is
    /// already present, or the visit happened in an incognito session.
    pub fn add(&mut self, url: &str, mode: SessionMode) -> bool {
        if mode.is_incognito() || self.contains(url) {
            return false;
        }
        self.entries.push(url.to_string());
        true
    }

    pub fn contains(&self, url: &str) -> bool {
        self.entries.iter().any(|e| e == url)
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn recent_first(&self) -> Vec<String> {
        self.entries.iter().rev().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Bookmarked URLs, persisted as JSON.
#[derive(Debug, Clone)]
pub struct BookmarkStore {
    path: PathBuf,
    entries: Vec<String>,
}

impl BookmarkStore {
    /// Reads the bookmark file.
    ///
    /// A missing, unreadable or malformed file yields an empty store.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str::<Vec<String>>(&content) {
                Ok(entries) => {
                    info!(path = %path.display(), count = entries.len(), "Bookmarks loaded");
                    entries
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Malformed bookmark file, starting empty");
                    Vec::new()
                }
            },
            Err(e) => {
                debug!(path = %path.display(), error = %e, "No bookmark file, starting empty");
                Vec::new()
            }
        };
        Self { path, entries }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Adds `url` and rewrites the file.
    ///
    /// Returns `Ok(false)` without touching the file when `url` is empty or
    /// already bookmarked. On a write error the entry stays in memory.
    pub fn add(&mut self, url: &str) -> Result<bool> {
        if url.is_empty() || self.contains(url) {
            return Ok(false);
        }
        self.entries.push(url.to_string());
        self.save()?;
        Ok(true)
    }

    pub fn contains(&self, url: &str) -> bool {
        self.entries.iter().any(|e| e == url)
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn recent_first(&self) -> Vec<String> {
        self.entries.iter().rev().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn save(&self) -> Result<()> {
        let json = serde_json::to_string(&self.entries)?;
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| Error::BookmarkWrite {
                path: self.path.clone(),
                source,
            })?;
        }
        fs::write(&self.path, json).map_err(|source| Error::BookmarkWrite {
            path: self.path.clone(),
            source,
        })?;
        debug!(path = %self.path.display(), count = self.entries.len(), "Bookmarks saved");
        Ok(())
    }
}

/// Destination paths of accepted downloads, in memory only.
#[derive(Debug, Clone, Default)]
pub struct DownloadLog {
    entries: Vec<PathBuf>,
}

impl DownloadLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, destination: impl Into<PathBuf>) {
        self.entries.push(destination.into());
    }

    pub fn entries(&self) -> &[PathBuf] {
        &self.entries
    }

    pub fn recent_first(&self) -> Vec<PathBuf> {
        self.entries.iter().rev().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
