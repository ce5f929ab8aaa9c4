//! Tabs and their load state machine.
//!
//! ```text
//! Idle ──start──▶ Loading(p) ──finish──▶ Finished(ok | failed)
//!                    ▲                          │
//!                    └──────── navigate ────────┘
//! ```

use std::fmt;
use std::sync::Arc;

use crate::engine::RenderSurface;
use crate::session::BrowsingSession;

/// Title shown until the page reports its own.
pub const DEFAULT_TAB_TITLE: &str = "New Tab";

/// Stable identifier for a tab, unique across all windows.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct TabId(u64);

impl TabId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How a finished load ended.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum LoadOutcome {
    Ok,
    Failed,
}

/// Load state of a tab.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum LoadState {
    Idle,
    Loading { progress: u8 },
    Finished(LoadOutcome),
}

impl LoadState {
    pub fn is_loading(self) -> bool {
        matches!(self, LoadState::Loading { .. })
    }

    pub fn progress(self) -> Option<u8> {
        match self {
            LoadState::Loading { progress } => Some(progress),
            _ => None,
        }
    }
}

/// Clamps an engine-reported progress value into 0–100.
pub fn clamp_progress(value: i32) -> u8 {
    value.clamp(0, 100) as u8
}

/// One tab: a session plus the surface rendering into it.
pub struct Tab {
    id: TabId,
    session: Arc<BrowsingSession>,
    surface: Box<dyn RenderSurface>,
    url: String,
    title: String,
    load: LoadState,
}

impl Tab {
    pub fn new(id: TabId, session: Arc<BrowsingSession>, surface: Box<dyn RenderSurface>) -> Self {
        Self {
            id,
            session,
            surface,
            url: String::new(),
            title: DEFAULT_TAB_TITLE.to_string(),
            load: LoadState::Idle,
        }
    }

    pub fn id(&self) -> TabId {
        self.id
    }

    pub fn session(&self) -> &Arc<BrowsingSession> {
        &self.session
    }

    pub fn surface(&self) -> &dyn RenderSurface {
        self.surface.as_ref()
    }

    pub fn surface_mut(&mut self) -> &mut dyn RenderSurface {
        self.surface.as_mut()
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn load_state(&self) -> LoadState {
        self.load
    }

    pub(crate) fn set_url(&mut self, url: impl Into<String>) {
        self.url = url.into();
    }

    pub(crate) fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub(crate) fn begin_load(&mut self) {
        self.load = LoadState::Loading { progress: 0 };
    }

    /// Progress can arrive without a prior start (e.g. in-page navigation);
    /// it enters `Loading` in that case.
    pub(crate) fn set_progress(&mut self, value: i32) -> u8 {
        let progress = clamp_progress(value);
        self.load = LoadState::Loading { progress };
        progress
    }

    pub(crate) fn finish_load(&mut self, ok: bool) -> LoadOutcome {
        let outcome = if ok { LoadOutcome::Ok } else { LoadOutcome::Failed };
        self.load = LoadState::Finished(outcome);
        outcome
    }
}

impl fmt::Debug for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tab")
            .field("id", &self.id)
            .field("session", &self.session.id())
            .field("url", &self.url)
            .field("title", &self.title)
            .field("load", &self.load)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_progress() {
        assert_eq!(clamp_progress(-5), 0);
        assert_eq!(clamp_progress(0), 0);
        assert_eq!(clamp_progress(42), 42);
        assert_eq!(clamp_progress(100), 100);
        assert_eq!(clamp_progress(250), 100);
    }

    #[test]
    fn test_load_state_helpers() {
        assert!(LoadState::Loading { progress: 3 }.is_loading());
        assert_eq!(LoadState::Loading { progress: 3 }.progress(), Some(3));
        assert!(!LoadState::Idle.is_loading());
        assert_eq!(LoadState::Finished(LoadOutcome::Ok).progress(), None);
    }

    #[test]
    fn test_tab_id_display() {
        assert_eq!(TabId::new(7).to_string(), "7");
        assert_eq!(TabId::new(7).get(), 7);
    }
}
