//! Application controller.
//!
//! [`Browser`] owns every window, the session factory and the bookmark
//! store. It does not own the engine: front ends pass one in with each call
//! so engine state can live wherever the event loop needs it.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::config::Config;
use crate::engine::{Capabilities, WebEngine};
use crate::error::{Error, Result};
use crate::events::{BrowserEvent, EngineEvent, EventQueue, EventSender, UiAction};
use crate::session::{BrowsingSession, SessionFactory, SessionMode};
use crate::store::BookmarkStore;
use crate::tab::{Tab, TabId};
use crate::window::{BrowserWindow, Dialogs, WindowContext, WindowId};

const ERROR_TIMEOUT: Duration = Duration::from_secs(5);

pub struct Browser {
    config: Config,
    capabilities: Capabilities,
    sessions: SessionFactory,
    bookmarks: BookmarkStore,
    windows: Vec<BrowserWindow>,
    queue: EventQueue,
    next_window: u64,
    next_tab: u64,
}

impl Browser {
    /// Creates the controller.
    ///
    /// `capabilities` is what [`WebEngine::capabilities`] reported at
    /// startup; the controller never asks the engine again.
    pub fn new(config: Config, capabilities: Capabilities) -> Self {
        let sessions = SessionFactory::from_config(&config);
        Self::with_sessions(config, sessions, capabilities)
    }

    pub fn with_sessions(config: Config, sessions: SessionFactory, capabilities: Capabilities) -> Self {
        info!(?capabilities, "Engine capabilities negotiated");
        if capabilities.interceptor.is_none() {
            warn!("Engine offers no request interception, blocking is unavailable");
        }
        let bookmarks = BookmarkStore::load(sessions.paths().bookmarks_file());
        Self {
            config,
            capabilities,
            sessions,
            bookmarks,
            windows: Vec::new(),
            queue: EventQueue::new(),
            next_window: 1,
            next_tab: 1,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    pub fn sessions(&self) -> &SessionFactory {
        &self.sessions
    }

    /// Session for `mode` from the factory.
    ///
    /// Lets a front end configure engine-wide state from the persistent
    /// profile before the first window opens. Tabs opened later share the
    /// same persistent session.
    pub fn session(&mut self, mode: SessionMode) -> Result<Arc<BrowsingSession>> {
        self.sessions.create_session(mode)
    }

    pub fn bookmarks(&self) -> &BookmarkStore {
        &self.bookmarks
    }

    /// Handle for engine adapters and front ends to queue events.
    pub fn sender(&self) -> EventSender {
        self.queue.sender()
    }

    pub fn windows(&self) -> &[BrowserWindow] {
        &self.windows
    }

    pub fn window(&self, id: WindowId) -> Option<&BrowserWindow> {
        self.windows.iter().find(|w| w.id() == id)
    }

    pub fn window_mut(&mut self, id: WindowId) -> Option<&mut BrowserWindow> {
        self.windows.iter_mut().find(|w| w.id() == id)
    }

    /// The window holding `tab`.
    pub fn window_of_tab(&self, tab: TabId) -> Result<WindowId> {
        self.windows
            .iter()
            .find(|w| w.contains_tab(tab))
            .map(BrowserWindow::id)
            .ok_or(Error::UnknownTab(tab))
    }

    /// No window left: the front end should exit.
    pub fn is_finished(&self) -> bool {
        self.windows.is_empty()
    }

    // ─────────────────────────────────────────────────────────────────────
    // Windows and tabs
    // ─────────────────────────────────────────────────────────────────────

    /// Opens a window with one tab on `url` (home page if `None`).
    pub fn open_window(
        &mut self,
        engine: &mut dyn WebEngine,
        mode: SessionMode,
        url: Option<&str>,
    ) -> Result<WindowId> {
        let id = WindowId::new(self.next_window);
        self.next_window += 1;
        engine.window_opened(id, mode);

        let url = url.unwrap_or(&self.config.general.home_url).to_string();
        let tab = match self.build_tab(engine, id, mode, &url) {
            Ok(tab) => tab,
            Err(e) => {
                engine.window_closed(id);
                return Err(e);
            }
        };
        let window = BrowserWindow::new(id, mode, &self.config.general.window_title, tab);
        info!(window = %id, ?mode, "Window opened");
        self.windows.push(window);
        Ok(id)
    }

    /// Adds a tab to `window` and makes it active.
    pub fn new_tab(
        &mut self,
        engine: &mut dyn WebEngine,
        window: WindowId,
        url: Option<&str>,
    ) -> Result<TabId> {
        let mode = self.window(window).ok_or(Error::UnknownWindow(window))?.mode();
        let url = url.unwrap_or(&self.config.general.home_url).to_string();
        let tab = self.build_tab(engine, window, mode, &url)?;
        let id = tab.id();
        if let Some(win) = self.window_mut(window) {
            win.push_tab(tab);
        }
        debug!(window = %window, tab = %id, %url, "Tab opened");
        Ok(id)
    }

    /// Closes a window and all of its tabs.
    pub fn close_window(&mut self, engine: &mut dyn WebEngine, id: WindowId) -> bool {
        let Some(index) = self.windows.iter().position(|w| w.id() == id) else {
            return false;
        };
        let window = self.windows.remove(index);
        info!(window = %id, tabs = window.tab_count(), "Window closed");
        drop(window);
        engine.window_closed(id);
        true
    }

    fn build_tab(
        &mut self,
        engine: &mut dyn WebEngine,
        window: WindowId,
        mode: SessionMode,
        url: &str,
    ) -> Result<Tab> {
        let session = self.sessions.create_session(mode)?;
        match self.capabilities.interceptor {
            Some(api) => engine.install_interceptor(&session, api),
            None => debug!(session = %session.id(), "Session runs without request filtering"),
        }
        let id = TabId::new(self.next_tab);
        self.next_tab += 1;
        let mut surface = engine.create_surface(window, id, Arc::clone(&session));
        surface.load(url);
        Ok(Tab::new(id, session, surface))
    }

    // ─────────────────────────────────────────────────────────────────────
    // Event dispatch
    // ─────────────────────────────────────────────────────────────────────

    /// Handles one event.
    pub fn dispatch(
        &mut self,
        engine: &mut dyn WebEngine,
        dialogs: &mut dyn Dialogs,
        event: BrowserEvent,
    ) {
        match event {
            BrowserEvent::Ui { window, action } => self.handle_ui(engine, dialogs, window, action),
            BrowserEvent::Engine { tab, event } => self.handle_engine(dialogs, tab, event),
        }
    }

    /// Drains the queue. Returns the number of events handled.
    pub fn process_pending(&mut self, engine: &mut dyn WebEngine, dialogs: &mut dyn Dialogs) -> usize {
        let mut handled = 0;
        while let Some(event) = self.queue.try_next() {
            self.dispatch(engine, dialogs, event);
            handled += 1;
        }
        handled
    }

    fn handle_ui(
        &mut self,
        engine: &mut dyn WebEngine,
        dialogs: &mut dyn Dialogs,
        window: WindowId,
        action: UiAction,
    ) {
        match action {
            UiAction::NewTab { url } => {
                if let Err(e) = self.new_tab(engine, window, url.as_deref()) {
                    warn!(window = %window, error = %e, "Cannot open tab");
                    if let Some(win) = self.window_mut(window) {
                        win.status_mut().show(format!("Cannot open tab: {e}"), Some(ERROR_TIMEOUT));
                    }
                }
            }
            UiAction::OpenIncognitoWindow => {
                if let Err(e) = self.open_window(engine, SessionMode::Incognito, None) {
                    warn!(error = %e, "Cannot open incognito window");
                }
            }
            UiAction::CloseWindow => {
                self.close_window(engine, window);
            }
            action => {
                let Some(win) = self.windows.iter_mut().find(|w| w.id() == window) else {
                    debug!(window = %window, ?action, "Action for unknown window dropped");
                    return;
                };
                let mut ctx = WindowContext {
                    capabilities: self.capabilities,
                    bookmarks: &mut self.bookmarks,
                    dialogs,
                    home_url: &self.config.general.home_url,
                };
                win.handle_action(action, &mut ctx);
            }
        }
    }

    fn handle_engine(&mut self, dialogs: &mut dyn Dialogs, tab: TabId, event: EngineEvent) {
        let Some(win) = self.windows.iter_mut().find(|w| w.contains_tab(tab)) else {
            debug!(tab = %tab, ?event, "Event for closed tab dropped");
            if let EngineEvent::DownloadRequested(request) = event {
                request.cancel();
            }
            return;
        };
        let mut ctx = WindowContext {
            capabilities: self.capabilities,
            bookmarks: &mut self.bookmarks,
            dialogs,
            home_url: &self.config.general.home_url,
        };
        win.handle_engine(tab, event, &mut ctx);
    }
}
