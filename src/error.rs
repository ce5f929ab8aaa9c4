//! Library error type.

use std::io;
use std::path::PathBuf;

use crate::tab::TabId;
use crate::window::WindowId;

/// Errors surfaced by the browser core.
///
/// Reading the bookmark file never produces one of these: a missing or
/// malformed file simply means "no bookmarks yet".
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("cannot create profile directory {}: {source}", path.display())]
    ProfileDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot write bookmarks to {}: {source}", path.display())]
    BookmarkWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot encode bookmarks: {0}")]
    BookmarkEncode(#[from] serde_json::Error),

    #[error("no window with id {0}")]
    UnknownWindow(WindowId),

    #[error("no tab with id {0}")]
    UnknownTab(TabId),
}

pub type Result<T> = std::result::Result<T, Error>;
