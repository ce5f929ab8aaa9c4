//! Dialogs for a shell without a widget toolkit.
//!
//! Downloads are saved straight into the downloads directory. Lists and
//! notices are shown in the title line of the window that asked for them:
//!
//! ```text
//! History: [1] https://a.test/ · [2] https://b.test/ · Esc closes · Lumen
//! ```
//!
//! A list cannot block the event loop, so [`Dialogs::pick_from_list`]
//! opens the picker and returns `None`. Choosing an entry stores the
//! answer and hands back the action that opened the list; dispatching it
//! again makes the same list request, which now returns the choice.

use std::path::{Path, PathBuf};
use std::process::Command;

use lumen::events::UiAction;
use lumen::window::{Dialogs, WindowId};
use tracing::{debug, info, warn};
use winit::keyboard::{Key, NamedKey};

const FALLBACK_FILE_NAME: &str = "download";

/// Entries reachable with the digit keys.
pub const MAX_PICKER_ITEMS: usize = 9;

/// An open list, waiting for a digit key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListPicker {
    pub window: WindowId,
    pub title: String,
    pub items: Vec<String>,
    origin: UiAction,
}

/// Key presses understood while a picker is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickerKey {
    Close,
    /// Zero-based entry index.
    Choose(usize),
}

pub fn picker_key(key: &Key) -> Option<PickerKey> {
    match key {
        Key::Named(NamedKey::Escape) => Some(PickerKey::Close),
        Key::Character(c) => match c.as_str() {
            "1" | "2" | "3" | "4" | "5" | "6" | "7" | "8" | "9" => c
                .parse::<usize>()
                .ok()
                .map(|n| PickerKey::Choose(n - 1)),
            _ => None,
        },
        _ => None,
    }
}

pub struct ShellDialogs {
    downloads_dir: PathBuf,
    /// Window and action behind the dialog calls being made right now.
    origin: Option<(WindowId, UiAction)>,
    picker: Option<ListPicker>,
    /// List title and the entry chosen for it.
    answer: Option<(String, String)>,
    notice: Option<(WindowId, String)>,
}

impl ShellDialogs {
    pub fn new(downloads_dir: PathBuf) -> Self {
        Self {
            downloads_dir,
            origin: None,
            picker: None,
            answer: None,
            notice: None,
        }
    }

    /// `<home>/Downloads`.
    pub fn default_downloads_dir() -> PathBuf {
        lumen::profile::home_dir().join("Downloads")
    }

    /// Marks the start of a UI action's dispatch.
    pub fn begin(&mut self, window: WindowId, action: UiAction) {
        self.origin = Some((window, action));
    }

    /// Marks the end of a dispatch. An answer nobody asked for is dropped.
    pub fn end(&mut self) {
        self.origin = None;
        if let Some((title, _)) = self.answer.take() {
            debug!(list = %title, "Choice no longer requested");
        }
    }

    pub fn picker_for(&self, window: WindowId) -> Option<&ListPicker> {
        self.picker.as_ref().filter(|p| p.window == window)
    }

    pub fn close_picker(&mut self) {
        self.picker = None;
    }

    /// Picks entry `index` of the open list.
    ///
    /// Returns the window and action to dispatch again, or `None` when no
    /// list is open or the index is out of range (the list stays open).
    pub fn choose(&mut self, index: usize) -> Option<(WindowId, UiAction)> {
        let item = self.picker.as_ref()?.items.get(index)?.clone();
        let picker = self.picker.take()?;
        self.answer = Some((picker.title, item));
        Some((picker.window, picker.origin))
    }

    pub fn notice_for(&self, window: WindowId) -> Option<&str> {
        self.notice
            .as_ref()
            .filter(|(w, _)| *w == window)
            .map(|(_, text)| text.as_str())
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    fn destination_for(&self, suggested_name: &str) -> PathBuf {
        // SECURITY: the name comes from the page. Only its last component is
        // kept so a download cannot land outside the downloads directory.
        let name = Path::new(suggested_name)
            .file_name()
            .and_then(|n| n.to_str())
            .filter(|n| !n.is_empty())
            .unwrap_or(FALLBACK_FILE_NAME);
        self.downloads_dir.join(name)
    }
}

impl Dialogs for ShellDialogs {
    fn save_file(&mut self, suggested_name: &str) -> Option<PathBuf> {
        Some(self.destination_for(suggested_name))
    }

    fn pick_from_list(&mut self, title: &str, items: &[String]) -> Option<String> {
        if let Some((answered, item)) = self.answer.take() {
            if answered == title && items.contains(&item) {
                return Some(item);
            }
            debug!(list = title, "Stale choice ignored");
        }

        let Some((window, origin)) = self.origin.clone() else {
            info!(list = title, entries = items.len(), "List requested outside a UI action");
            return None;
        };
        if items.len() > MAX_PICKER_ITEMS {
            debug!(list = title, hidden = items.len() - MAX_PICKER_ITEMS, "List truncated");
        }
        self.picker = Some(ListPicker {
            window,
            title: title.to_string(),
            items: items.iter().take(MAX_PICKER_ITEMS).cloned().collect(),
            origin,
        });
        None
    }

    fn inform(&mut self, title: &str, text: &str) {
        info!(title, "{text}");
        match &self.origin {
            Some((window, _)) => self.notice = Some((*window, format!("{title}: {text}"))),
            None => debug!(title, "Notice outside a UI action, logged only"),
        }
    }

    fn open_file(&mut self, path: &Path) {
        let opener = if cfg!(target_os = "macos") {
            "open"
        } else if cfg!(windows) {
            "explorer"
        } else {
            "xdg-open"
        };
        if let Err(e) = Command::new(opener).arg(path).spawn() {
            warn!(path = %path.display(), error = %e, "Cannot open file");
        }
    }
}
