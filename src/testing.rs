//! In-memory engine, surfaces, downloads and dialogs for controller tests.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::{Arc, Mutex, Weak};

use crate::engine::{Capabilities, DownloadRequest, InterceptorApi, RenderSurface, WebEngine};
use crate::session::{BrowsingSession, SessionId, SessionMode};
use crate::tab::TabId;
use crate::window::{Dialogs, WindowId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceCall {
    Load(String),
    Back,
    Forward,
    Reload,
}

#[derive(Debug, Default)]
pub struct EngineLog {
    pub calls: Vec<(TabId, SurfaceCall)>,
    pub installed: Vec<(SessionId, InterceptorApi)>,
    pub sessions: Vec<(TabId, Weak<BrowsingSession>)>,
    pub nav: HashMap<TabId, (bool, bool)>,
    pub opened: Vec<(WindowId, SessionMode)>,
    pub closed: Vec<WindowId>,
    pub dropped: Vec<TabId>,
}

impl EngineLog {
    pub fn loads(&self, tab: TabId) -> Vec<String> {
        self.calls
            .iter()
            .filter_map(|(t, call)| match call {
                SurfaceCall::Load(url) if *t == tab => Some(url.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn session_of(&self, tab: TabId) -> Option<Arc<BrowsingSession>> {
        self.sessions
            .iter()
            .find(|(t, _)| *t == tab)
            .and_then(|(_, s)| s.upgrade())
    }
}

#[derive(Debug, Default)]
pub struct FakeEngine {
    pub capabilities: Capabilities,
    pub log: Rc<RefCell<EngineLog>>,
}

impl FakeEngine {
    pub fn with_capabilities(capabilities: Capabilities) -> Self {
        Self {
            capabilities,
            log: Rc::default(),
        }
    }

    pub fn set_nav(&self, tab: TabId, can_go_back: bool, can_go_forward: bool) {
        self.log.borrow_mut().nav.insert(tab, (can_go_back, can_go_forward));
    }
}

impl WebEngine for FakeEngine {
    fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    fn window_opened(&mut self, window: WindowId, mode: SessionMode) {
        self.log.borrow_mut().opened.push((window, mode));
    }

    fn window_closed(&mut self, window: WindowId) {
        self.log.borrow_mut().closed.push(window);
    }

    fn install_interceptor(&mut self, session: &Arc<BrowsingSession>, api: InterceptorApi) {
        self.log.borrow_mut().installed.push((session.id(), api));
    }

    fn create_surface(
        &mut self,
        _window: WindowId,
        tab: TabId,
        session: Arc<BrowsingSession>,
    ) -> Box<dyn RenderSurface> {
        self.log.borrow_mut().sessions.push((tab, Arc::downgrade(&session)));
        Box::new(FakeSurface {
            tab,
            url: String::new(),
            log: Rc::clone(&self.log),
        })
    }
}

pub struct FakeSurface {
    tab: TabId,
    url: String,
    log: Rc<RefCell<EngineLog>>,
}

impl FakeSurface {
    fn record(&self, call: SurfaceCall) {
        self.log.borrow_mut().calls.push((self.tab, call));
    }
}

impl RenderSurface for FakeSurface {
    fn load(&mut self, url: &str) {
        self.url = url.to_string();
        self.record(SurfaceCall::Load(url.to_string()));
    }

    fn back(&mut self) {
        self.record(SurfaceCall::Back);
    }

    fn forward(&mut self) {
        self.record(SurfaceCall::Forward);
    }

    fn reload(&mut self) {
        self.record(SurfaceCall::Reload);
    }

    fn url(&self) -> String {
        self.url.clone()
    }

    fn can_go_back(&self) -> bool {
        self.log.borrow().nav.get(&self.tab).is_some_and(|n| n.0)
    }

    fn can_go_forward(&self) -> bool {
        self.log.borrow().nav.get(&self.tab).is_some_and(|n| n.1)
    }
}

impl Drop for FakeSurface {
    fn drop(&mut self) {
        self.log.borrow_mut().dropped.push(self.tab);
    }
}

#[derive(Debug, Default)]
pub struct DownloadOutcome {
    pub file_name: Option<String>,
    pub accepted: Option<PathBuf>,
    pub canceled: bool,
}

#[derive(Debug)]
pub struct FakeDownload {
    name: String,
    outcome: Arc<Mutex<DownloadOutcome>>,
}

impl FakeDownload {
    pub fn new(name: &str) -> (Box<Self>, Arc<Mutex<DownloadOutcome>>) {
        let outcome = Arc::new(Mutex::new(DownloadOutcome::default()));
        let download = Box::new(Self {
            name: name.to_string(),
            outcome: Arc::clone(&outcome),
        });
        (download, outcome)
    }
}

impl DownloadRequest for FakeDownload {
    fn suggested_file_name(&self) -> &str {
        &self.name
    }

    fn set_download_file_name(&mut self, name: &str) {
        self.outcome.lock().unwrap().file_name = Some(name.to_string());
    }

    fn accept(self: Box<Self>, destination: &Path) {
        self.outcome.lock().unwrap().accepted = Some(destination.to_path_buf());
    }

    fn cancel(self: Box<Self>) {
        self.outcome.lock().unwrap().canceled = true;
    }
}

/// Dialogs answering from preset values and recording what was shown.
#[derive(Debug, Default)]
pub struct ScriptedDialogs {
    pub save_to: Option<PathBuf>,
    pub pick: Option<String>,
    pub save_requests: Vec<String>,
    pub lists: Vec<(String, Vec<String>)>,
    pub informed: Vec<(String, String)>,
    pub opened: Vec<PathBuf>,
}

impl Dialogs for ScriptedDialogs {
    fn save_file(&mut self, suggested_name: &str) -> Option<PathBuf> {
        self.save_requests.push(suggested_name.to_string());
        self.save_to.clone()
    }

    fn pick_from_list(&mut self, title: &str, items: &[String]) -> Option<String> {
        self.lists.push((title.to_string(), items.to_vec()));
        self.pick.clone()
    }

    fn inform(&mut self, title: &str, text: &str) {
        self.informed.push((title.to_string(), text.to_string()));
    }

    fn open_file(&mut self, path: &Path) {
        self.opened.push(path.to_path_buf());
    }
}
