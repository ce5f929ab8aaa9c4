//! One browser window: its tabs, status bar and navigation state.
//!
//! A window always holds at least one tab and exactly one of them is
//! active. Whenever the active tab changes, the URL field, progress display
//! and back/forward availability are re-read from it.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::engine::{Capabilities, DownloadRequest};
use crate::events::{EngineEvent, UiAction};
use crate::session::SessionMode;
use crate::store::{BookmarkStore, DownloadLog, HistoryStore};
use crate::tab::{LoadOutcome, Tab, TabId};
use crate::urlbar::{UrlBar, normalize_input};

const LOADED_TIMEOUT: Duration = Duration::from_secs(3);
const CANCELED_TIMEOUT: Duration = Duration::from_secs(3);
const INFO_TIMEOUT: Duration = Duration::from_secs(5);

/// Stable identifier for a window.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct WindowId(u64);

impl WindowId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Modal dialogs, provided by the front end.
pub trait Dialogs {
    /// Asks where to save a download. `None` when the user cancels.
    fn save_file(&mut self, suggested_name: &str) -> Option<PathBuf>;

    /// Shows a list and returns the entry the user picked, if any.
    fn pick_from_list(&mut self, title: &str, items: &[String]) -> Option<String>;

    /// Informational message box.
    fn inform(&mut self, title: &str, text: &str);

    /// Opens a local file with the system handler.
    fn open_file(&mut self, path: &Path);
}

/// Transient text shown in the status bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub text: String,
    /// How long the front end should keep it; `None` until replaced.
    pub timeout: Option<Duration>,
}

/// Status bar: a message and an optional progress indicator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusBar {
    message: Option<StatusMessage>,
    progress: Option<u8>,
}

impl StatusBar {
    pub fn show(&mut self, text: impl Into<String>, timeout: Option<Duration>) {
        self.message = Some(StatusMessage {
            text: text.into(),
            timeout,
        });
    }

    /// Called by the front end once a message's timeout elapsed.
    pub fn clear_message(&mut self) {
        self.message = None;
    }

    pub fn message(&self) -> Option<&StatusMessage> {
        self.message.as_ref()
    }

    /// Progress shown, `None` when the indicator is hidden.
    pub fn progress(&self) -> Option<u8> {
        self.progress
    }

    fn set_progress(&mut self, progress: Option<u8>) {
        self.progress = progress;
    }
}

/// Enabled state of the back and forward buttons.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NavState {
    pub can_go_back: bool,
    pub can_go_forward: bool,
}

/// What a window handler needs from the rest of the browser.
pub(crate) struct WindowContext<'a> {
    pub capabilities: Capabilities,
    pub bookmarks: &'a mut BookmarkStore,
    pub dialogs: &'a mut dyn Dialogs,
    pub home_url: &'a str,
}

/// A browser window.
#[derive(Debug)]
pub struct BrowserWindow {
    id: WindowId,
    mode: SessionMode,
    title: String,
    tabs: Vec<Tab>,
    active: usize,
    url_bar: UrlBar,
    status: StatusBar,
    nav: NavState,
    history: HistoryStore,
    downloads: DownloadLog,
}

impl BrowserWindow {
    /// A window always starts with its first tab.
    pub(crate) fn new(id: WindowId, mode: SessionMode, base_title: &str, first_tab: Tab) -> Self {
        let title = match mode {
            SessionMode::Persistent => base_title.to_string(),
            SessionMode::Incognito => format!("{base_title} (Incognito)"),
        };
        let mut window = Self {
            id,
            mode,
            title,
            tabs: vec![first_tab],
            active: 0,
            url_bar: UrlBar::new(),
            status: StatusBar::default(),
            nav: NavState::default(),
            history: HistoryStore::new(),
            downloads: DownloadLog::new(),
        };
        window.refresh_active();
        window
    }

    pub fn id(&self) -> WindowId {
        self.id
    }

    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    pub fn is_incognito(&self) -> bool {
        self.mode.is_incognito()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn tabs(&self) -> &[Tab] {
        &self.tabs
    }

    pub fn tab_count(&self) -> usize {
        self.tabs.len()
    }

    pub fn tab(&self, id: TabId) -> Option<&Tab> {
        self.tabs.iter().find(|t| t.id() == id)
    }

    pub fn contains_tab(&self, id: TabId) -> bool {
        self.tab_index(id).is_some()
    }

    pub fn active_tab(&self) -> &Tab {
        &self.tabs[self.active]
    }

    pub fn active_tab_id(&self) -> TabId {
        self.active_tab().id()
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn url_bar(&self) -> &UrlBar {
        &self.url_bar
    }

    pub fn url_bar_mut(&mut self) -> &mut UrlBar {
        &mut self.url_bar
    }

    pub fn status(&self) -> &StatusBar {
        &self.status
    }

    pub fn status_mut(&mut self) -> &mut StatusBar {
        &mut self.status
    }

    pub fn nav_state(&self) -> NavState {
        self.nav
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    pub fn downloads(&self) -> &DownloadLog {
        &self.downloads
    }

    fn tab_index(&self, id: TabId) -> Option<usize> {
        self.tabs.iter().position(|t| t.id() == id)
    }

    fn active_tab_mut(&mut self) -> &mut Tab {
        &mut self.tabs[self.active]
    }

    // ─────────────────────────────────────────────────────────────────────
    // Tab management
    // ─────────────────────────────────────────────────────────────────────

    /// Appends a tab and makes it active.
    pub(crate) fn push_tab(&mut self, tab: Tab) {
        self.tabs.push(tab);
        self.active = self.tabs.len() - 1;
        self.refresh_active();
    }

    /// Closes a tab. The last tab of a window cannot be closed.
    pub fn close_tab(&mut self, id: TabId) -> bool {
        if self.tabs.len() <= 1 {
            debug!(window = %self.id, tab = %id, "Refusing to close the last tab");
            return false;
        }
        let Some(index) = self.tab_index(id) else {
            return false;
        };
        let tab = self.tabs.remove(index);
        if index < self.active {
            self.active -= 1;
        } else if index == self.active {
            self.active = index.min(self.tabs.len() - 1);
        }
        info!(
            window = %self.id,
            tab = %id,
            incognito = tab.session().is_incognito(),
            "Tab closed"
        );
        drop(tab);
        self.refresh_active();
        true
    }

    pub fn select_tab(&mut self, id: TabId) -> bool {
        let Some(index) = self.tab_index(id) else {
            return false;
        };
        self.active = index;
        self.refresh_active();
        true
    }

    /// Moves a tab to `to` (clamped). The active tab stays active.
    pub fn move_tab(&mut self, id: TabId, to: usize) -> bool {
        let Some(from) = self.tab_index(id) else {
            return false;
        };
        let active_id = self.active_tab_id();
        let tab = self.tabs.remove(from);
        let to = to.min(self.tabs.len());
        self.tabs.insert(to, tab);
        self.active = self.tab_index(active_id).unwrap_or(0);
        true
    }

    /// Re-reads everything that mirrors the active tab.
    fn refresh_active(&mut self) {
        let tab = &self.tabs[self.active];
        let url = tab.url().to_string();
        let progress = tab.load_state().progress();
        self.url_bar.set_url(&url);
        self.status.set_progress(progress);
        self.refresh_nav();
    }

    fn refresh_nav(&mut self) {
        let surface = self.tabs[self.active].surface();
        self.nav = NavState {
            can_go_back: surface.can_go_back(),
            can_go_forward: surface.can_go_forward(),
        };
    }

    // ─────────────────────────────────────────────────────────────────────
    // Navigation
    // ─────────────────────────────────────────────────────────────────────

    pub fn back(&mut self) {
        self.active_tab_mut().surface_mut().back();
    }

    pub fn forward(&mut self) {
        self.active_tab_mut().surface_mut().forward();
    }

    pub fn reload(&mut self) {
        self.active_tab_mut().surface_mut().reload();
    }

    /// Navigates the active tab to URL-field input. Empty input is ignored.
    pub fn go_to(&mut self, input: &str) {
        match normalize_input(input) {
            Some(url) => {
                debug!(window = %self.id, %url, "Navigating");
                self.active_tab_mut().surface_mut().load(&url);
            }
            None => debug!(window = %self.id, "Ignoring empty URL input"),
        }
    }

    fn load_in_active(&mut self, url: &str) {
        self.active_tab_mut().surface_mut().load(url);
    }

    // ─────────────────────────────────────────────────────────────────────
    // Event handling
    // ─────────────────────────────────────────────────────────────────────

    /// Window-local UI actions. Actions needing the engine or other windows
    /// are handled by the browser before reaching here.
    pub(crate) fn handle_action(&mut self, action: UiAction, ctx: &mut WindowContext<'_>) {
        match action {
            UiAction::CloseTab(id) => {
                self.close_tab(id);
            }
            UiAction::SelectTab(id) => {
                self.select_tab(id);
            }
            UiAction::MoveTab { tab, to } => {
                self.move_tab(tab, to);
            }
            UiAction::Back => self.back(),
            UiAction::Forward => self.forward(),
            UiAction::Reload => self.reload(),
            UiAction::Home => self.load_in_active(ctx.home_url),
            UiAction::GoTo(input) => self.go_to(&input),
            UiAction::ShowUserAgent => {
                let ua = self.active_tab().session().user_agent().to_string();
                self.status.show(ua, Some(INFO_TIMEOUT));
            }
            UiAction::ShowDownloads => self.show_downloads(ctx),
            UiAction::ShowHistory => {
                let items = self.history.recent_first();
                self.pick_and_navigate("History", &items, ctx);
            }
            UiAction::ShowBookmarks => {
                let items = ctx.bookmarks.recent_first();
                self.pick_and_navigate("Bookmarks", &items, ctx);
            }
            UiAction::AddBookmark => self.add_bookmark(ctx),
            UiAction::NewTab { .. } | UiAction::OpenIncognitoWindow | UiAction::CloseWindow => {
                warn!(window = %self.id, ?action, "Action needs the browser, ignored by window");
            }
        }
    }

    /// Engine callbacks for one of this window's tabs.
    pub(crate) fn handle_engine(&mut self, id: TabId, event: EngineEvent, ctx: &mut WindowContext<'_>) {
        let Some(index) = self.tab_index(id) else {
            if let EngineEvent::DownloadRequested(request) = event {
                request.cancel();
            }
            return;
        };
        let is_active = index == self.active;

        match event {
            EngineEvent::LoadStarted => {
                self.tabs[index].begin_load();
                if is_active {
                    self.status.set_progress(Some(0));
                    self.status.show("Loading…", None);
                }
            }
            EngineEvent::LoadProgress(value) => {
                let progress = self.tabs[index].set_progress(value);
                if is_active {
                    self.status.set_progress(Some(progress));
                }
            }
            EngineEvent::LoadFinished { ok } => {
                let outcome = self.tabs[index].finish_load(ok);
                debug!(window = %self.id, tab = %id, ?outcome, "Load finished");
                if is_active {
                    self.status.set_progress(None);
                    let text = match outcome {
                        LoadOutcome::Ok => "Loaded",
                        LoadOutcome::Failed => "Load failed",
                    };
                    self.status.show(text, Some(LOADED_TIMEOUT));
                    self.refresh_nav();
                }
            }
            EngineEvent::UrlChanged(url) => {
                let mode = self.tabs[index].session().mode();
                if self.history.add(&url, mode) {
                    debug!(window = %self.id, %url, "History entry added");
                }
                if is_active {
                    self.url_bar.set_url(&url);
                }
                self.tabs[index].set_url(url);
                if is_active {
                    self.refresh_nav();
                }
            }
            EngineEvent::TitleChanged(title) => {
                self.tabs[index].set_title(title);
            }
            EngineEvent::HistoryChanged => {
                if is_active {
                    self.refresh_nav();
                }
            }
            EngineEvent::DownloadRequested(request) => self.handle_download(request, ctx),
        }
    }

    fn handle_download(&mut self, mut request: Box<dyn DownloadRequest>, ctx: &mut WindowContext<'_>) {
        let suggested = request.suggested_file_name().to_string();
        match ctx.dialogs.save_file(&suggested) {
            Some(destination) => {
                if ctx.capabilities.download_file_name
                    && let Some(name) = destination.file_name().and_then(|n| n.to_str())
                {
                    request.set_download_file_name(name);
                }
                request.accept(&destination);
                info!(window = %self.id, path = %destination.display(), "Download accepted");
                self.status.show(
                    format!("Downloading → {}", destination.display()),
                    Some(INFO_TIMEOUT),
                );
                self.downloads.record(destination);
            }
            None => {
                request.cancel();
                info!(window = %self.id, file = %suggested, "Download canceled");
                self.status.show("Download canceled", Some(CANCELED_TIMEOUT));
            }
        }
    }

    fn show_downloads(&mut self, ctx: &mut WindowContext<'_>) {
        let items: Vec<String> = self
            .downloads
            .recent_first()
            .iter()
            .map(|p| p.display().to_string())
            .collect();
        if let Some(choice) = ctx.dialogs.pick_from_list("Downloads", &items) {
            let path = PathBuf::from(choice);
            if path.exists() {
                ctx.dialogs.open_file(&path);
            } else {
                debug!(path = %path.display(), "Download no longer on disk");
            }
        }
    }

    fn pick_and_navigate(&mut self, title: &str, items: &[String], ctx: &mut WindowContext<'_>) {
        if let Some(url) = ctx.dialogs.pick_from_list(title, items) {
            self.load_in_active(&url);
        }
    }

    fn add_bookmark(&mut self, ctx: &mut WindowContext<'_>) {
        let url = self.active_tab().surface().url();
        match ctx.bookmarks.add(&url) {
            Ok(true) => {
                info!(%url, "Bookmark added");
                ctx.dialogs.inform("Bookmark added", &url);
            }
            Ok(false) => debug!(%url, "Already bookmarked or empty"),
            Err(e) => {
                warn!(error = %e, "Bookmark kept in memory only");
                self.status.show(format!("Bookmark not saved: {e}"), Some(INFO_TIMEOUT));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::Browser;
    use crate::config::{Config, DEFAULT_USER_AGENT};
    use crate::engine::WebEngine;
    use crate::events::BrowserEvent;
    use crate::tab::LoadState;
    use crate::testing::{FakeDownload, FakeEngine, ScriptedDialogs};
    use tempfile::TempDir;

    struct Harness {
        dir: TempDir,
        engine: FakeEngine,
        dialogs: ScriptedDialogs,
        browser: Browser,
        window: WindowId,
    }

    impl Harness {
        fn new(mode: SessionMode) -> Self {
            Self::with_engine(mode, FakeEngine::default())
        }

        fn with_engine(mode: SessionMode, mut engine: FakeEngine) -> Self {
            let dir = TempDir::new().unwrap();
            let mut config = Config::default();
            config.profile.root = Some(dir.path().join("profile"));
            let mut browser = Browser::new(config, engine.capabilities());
            let window = browser.open_window(&mut engine, mode, None).unwrap();
            Self {
                dir,
                engine,
                dialogs: ScriptedDialogs::default(),
                browser,
                window,
            }
        }

        fn ui(&mut self, action: UiAction) {
            let event = BrowserEvent::ui(self.window, action);
            self.browser.dispatch(&mut self.engine, &mut self.dialogs, event);
        }

        fn engine_event(&mut self, tab: TabId, event: EngineEvent) {
            let event = BrowserEvent::engine(tab, event);
            self.browser.dispatch(&mut self.engine, &mut self.dialogs, event);
        }

        fn open_tab(&mut self) -> TabId {
            self.browser.new_tab(&mut self.engine, self.window, None).unwrap()
        }

        fn win(&self) -> &BrowserWindow {
            self.browser.window(self.window).unwrap()
        }

        fn tab_ids(&self) -> Vec<TabId> {
            self.win().tabs().iter().map(Tab::id).collect()
        }

        fn message(&self) -> Option<StatusMessage> {
            self.win().status().message().cloned()
        }
    }

    fn msg(text: &str, secs: u64) -> Option<StatusMessage> {
        Some(StatusMessage {
            text: text.to_string(),
            timeout: Some(Duration::from_secs(secs)),
        })
    }

    #[test]
    fn test_load_lifecycle_updates_status() {
        let mut h = Harness::new(SessionMode::Persistent);
        let tab = h.win().active_tab_id();

        h.engine_event(tab, EngineEvent::LoadStarted);
        assert_eq!(h.win().status().progress(), Some(0));
        assert_eq!(h.message().unwrap().text, "Loading…");
        assert_eq!(h.message().unwrap().timeout, None);

        h.engine_event(tab, EngineEvent::LoadProgress(140));
        assert_eq!(h.win().status().progress(), Some(100));
        assert_eq!(h.win().active_tab().load_state(), LoadState::Loading { progress: 100 });

        h.engine_event(tab, EngineEvent::LoadFinished { ok: true });
        assert_eq!(h.win().status().progress(), None);
        assert_eq!(h.message(), msg("Loaded", 3));
        assert_eq!(h.win().active_tab().load_state(), LoadState::Finished(LoadOutcome::Ok));
    }

    #[test]
    fn test_new_load_after_finish_restarts_at_zero() {
        let mut h = Harness::new(SessionMode::Persistent);
        let tab = h.win().active_tab_id();
        assert_eq!(h.win().active_tab().load_state(), LoadState::Idle);

        h.engine_event(tab, EngineEvent::LoadStarted);
        h.engine_event(tab, EngineEvent::LoadProgress(80));
        h.engine_event(tab, EngineEvent::LoadFinished { ok: false });
        assert_eq!(h.win().active_tab().load_state(), LoadState::Finished(LoadOutcome::Failed));

        h.engine_event(tab, EngineEvent::LoadStarted);
        assert_eq!(h.win().active_tab().load_state(), LoadState::Loading { progress: 0 });
        assert_eq!(h.win().status().progress(), Some(0));
        assert_eq!(h.message().unwrap().text, "Loading…");
    }

    #[test]
    fn test_failed_load_reports_failure() {
        let mut h = Harness::new(SessionMode::Persistent);
        let tab = h.win().active_tab_id();

        h.engine_event(tab, EngineEvent::LoadStarted);
        h.engine_event(tab, EngineEvent::LoadFinished { ok: false });

        assert_eq!(h.message(), msg("Load failed", 3));
    }

    #[test]
    fn test_background_tab_events_leave_status_alone() {
        let mut h = Harness::new(SessionMode::Persistent);
        let background = h.win().active_tab_id();
        let front = h.open_tab();

        h.engine_event(background, EngineEvent::LoadStarted);
        h.engine_event(background, EngineEvent::LoadProgress(30));
        h.engine_event(background, EngineEvent::UrlChanged("https://bg.test/".into()));
        h.engine_event(background, EngineEvent::TitleChanged("Background".into()));

        assert_eq!(h.win().active_tab_id(), front);
        assert_eq!(h.win().status().progress(), None);
        assert!(h.message().is_none());
        assert_ne!(h.win().url_bar().display_text(), "https://bg.test/");

        let tab = h.win().tab(background).unwrap();
        assert_eq!(tab.title(), "Background");
        assert_eq!(tab.load_state(), LoadState::Loading { progress: 30 });

        // Switching shows the background tab's state.
        h.ui(UiAction::SelectTab(background));
        assert_eq!(h.win().status().progress(), Some(30));
        assert_eq!(h.win().url_bar().display_text(), "https://bg.test/");
    }

    #[test]
    fn test_url_change_updates_bar_and_history() {
        let mut h = Harness::new(SessionMode::Persistent);
        let tab = h.win().active_tab_id();

        h.engine_event(tab, EngineEvent::UrlChanged("https://a.test/".into()));
        h.engine_event(tab, EngineEvent::UrlChanged("https://a.test/".into()));

        assert_eq!(h.win().url_bar().display_text(), "https://a.test/");
        assert_eq!(h.win().active_tab().url(), "https://a.test/");
        assert_eq!(h.win().history().entries(), ["https://a.test/"]);
    }

    #[test]
    fn test_close_active_tab_selects_next_then_previous() {
        let mut h = Harness::new(SessionMode::Persistent);
        let t1 = h.win().active_tab_id();
        let t2 = h.open_tab();
        let t3 = h.open_tab();

        h.ui(UiAction::SelectTab(t2));
        h.ui(UiAction::CloseTab(t2));
        assert_eq!(h.tab_ids(), vec![t1, t3]);
        assert_eq!(h.win().active_tab_id(), t3);

        h.ui(UiAction::CloseTab(t3));
        assert_eq!(h.win().active_tab_id(), t1);

        h.ui(UiAction::CloseTab(t1));
        assert_eq!(h.tab_ids(), vec![t1]);
    }

    #[test]
    fn test_close_tab_before_active_keeps_selection() {
        let mut h = Harness::new(SessionMode::Persistent);
        let t1 = h.win().active_tab_id();
        let t2 = h.open_tab();

        h.ui(UiAction::CloseTab(t1));

        assert_eq!(h.win().active_tab_id(), t2);
        assert_eq!(h.win().active_index(), 0);
    }

    #[test]
    fn test_move_tab_keeps_active_tab() {
        let mut h = Harness::new(SessionMode::Persistent);
        let t1 = h.win().active_tab_id();
        let t2 = h.open_tab();
        let t3 = h.open_tab();

        h.ui(UiAction::MoveTab { tab: t3, to: 0 });
        assert_eq!(h.tab_ids(), vec![t3, t1, t2]);
        assert_eq!(h.win().active_tab_id(), t3);

        h.ui(UiAction::MoveTab { tab: t1, to: 10 });
        assert_eq!(h.tab_ids(), vec![t3, t2, t1]);
        assert_eq!(h.win().active_index(), 0);
    }

    #[test]
    fn test_select_tab_refreshes_nav_state() {
        let mut h = Harness::new(SessionMode::Persistent);
        let t1 = h.win().active_tab_id();
        let t2 = h.open_tab();
        h.engine.set_nav(t1, true, true);

        assert_eq!(h.win().nav_state(), NavState::default());
        h.ui(UiAction::SelectTab(t1));
        assert_eq!(
            h.win().nav_state(),
            NavState { can_go_back: true, can_go_forward: true }
        );
        h.ui(UiAction::SelectTab(t2));
        assert_eq!(h.win().nav_state(), NavState::default());
    }

    #[test]
    fn test_show_user_agent() {
        let mut h = Harness::new(SessionMode::Incognito);

        h.ui(UiAction::ShowUserAgent);

        assert_eq!(h.message(), msg(DEFAULT_USER_AGENT, 5));
    }

    #[test]
    fn test_download_accepted_with_chosen_name() {
        let mut h = Harness::new(SessionMode::Persistent);
        let tab = h.win().active_tab_id();
        let dest = h.dir.path().join("saved.pdf");
        h.dialogs.save_to = Some(dest.clone());

        let (request, outcome) = FakeDownload::new("report.pdf");
        h.engine_event(tab, EngineEvent::DownloadRequested(request));

        assert_eq!(h.dialogs.save_requests, vec!["report.pdf"]);
        let outcome = outcome.lock().unwrap();
        assert_eq!(outcome.accepted.as_deref(), Some(dest.as_path()));
        assert_eq!(outcome.file_name.as_deref(), Some("saved.pdf"));
        assert_eq!(h.win().downloads().entries(), [dest.clone()]);
        assert_eq!(
            h.message().unwrap().text,
            format!("Downloading → {}", dest.display())
        );
    }

    #[test]
    fn test_download_without_file_name_capability() {
        let engine = FakeEngine::with_capabilities(Capabilities {
            download_file_name: false,
            ..Capabilities::default()
        });
        let mut h = Harness::with_engine(SessionMode::Persistent, engine);
        let tab = h.win().active_tab_id();
        h.dialogs.save_to = Some(h.dir.path().join("x.bin"));

        let (request, outcome) = FakeDownload::new("x.bin");
        h.engine_event(tab, EngineEvent::DownloadRequested(request));

        let outcome = outcome.lock().unwrap();
        assert!(outcome.accepted.is_some());
        assert_eq!(outcome.file_name, None);
    }

    #[test]
    fn test_download_canceled_in_dialog() {
        let mut h = Harness::new(SessionMode::Persistent);
        let tab = h.win().active_tab_id();

        let (request, outcome) = FakeDownload::new("x.bin");
        h.engine_event(tab, EngineEvent::DownloadRequested(request));

        assert!(outcome.lock().unwrap().canceled);
        assert!(h.win().downloads().is_empty());
        assert_eq!(h.message(), msg("Download canceled", 3));
    }

    #[test]
    fn test_downloads_list_opens_existing_files_only() {
        let mut h = Harness::new(SessionMode::Persistent);
        let tab = h.win().active_tab_id();
        let present = h.dir.path().join("present.txt");
        let missing = h.dir.path().join("missing.txt");
        std::fs::write(&present, "x").unwrap();

        for dest in [&present, &missing] {
            h.dialogs.save_to = Some(dest.clone());
            let (request, _) = FakeDownload::new("f");
            h.engine_event(tab, EngineEvent::DownloadRequested(request));
        }

        h.dialogs.pick = Some(missing.display().to_string());
        h.ui(UiAction::ShowDownloads);
        assert!(h.dialogs.opened.is_empty());
        assert_eq!(
            h.dialogs.lists[0].1,
            vec![missing.display().to_string(), present.display().to_string()]
        );

        h.dialogs.pick = Some(present.display().to_string());
        h.ui(UiAction::ShowDownloads);
        assert_eq!(h.dialogs.opened, vec![present]);
    }

    #[test]
    fn test_bookmark_write_failure_shows_warning() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, "").unwrap();
        let mut config = Config::default();
        config.profile.root = Some(blocker);
        let mut engine = FakeEngine::default();
        let mut dialogs = ScriptedDialogs::default();
        let mut browser = Browser::new(config, engine.capabilities());
        let win = browser
            .open_window(&mut engine, SessionMode::Incognito, Some("https://a.test/"))
            .unwrap();

        browser.dispatch(&mut engine, &mut dialogs, BrowserEvent::ui(win, UiAction::AddBookmark));

        let window = browser.window(win).unwrap();
        let message = window.status().message().unwrap();
        assert!(message.text.starts_with("Bookmark not saved"), "{}", message.text);
        assert!(dialogs.informed.is_empty());
        assert!(browser.bookmarks().contains("https://a.test/"));
    }

    #[test]
    fn test_bookmarks_dialog_navigates() {
        let mut h = Harness::new(SessionMode::Persistent);
        let tab = h.win().active_tab_id();
        h.ui(UiAction::AddBookmark);

        h.dialogs.pick = Some("https://www.google.com".into());
        h.ui(UiAction::ShowBookmarks);

        assert_eq!(h.dialogs.lists[0].0, "Bookmarks");
        assert_eq!(h.engine.log.borrow().loads(tab).len(), 2);
    }

    #[test]
    fn test_window_id_display() {
        assert_eq!(WindowId::new(3).to_string(), "3");
        assert_eq!(WindowId::new(3).get(), 3);
    }
}
