//! Integration between Servo and the browser core.
//!
//! - [`Waker`]: the `Send + Sync` bridge from Servo's internal threads to
//!   the winit loop on the main thread.
//! - [`TabDelegate`]: per-webview Servo callbacks, turned into
//!   [`EngineEvent`]s and the request-blocking hook.
//! - [`ServoEngine`]: the [`WebEngine`] implementation, a short-lived view
//!   over the [`Shell`] and the active event loop.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::rc::Rc;
use std::sync::Arc;
use std::time::Instant;

use euclid::Scale;
use lumen::config::Config;
use lumen::engine::{Capabilities, InterceptorApi, RenderSurface, WebEngine};
use lumen::events::{EngineEvent, EventSender};
use lumen::privacy::{
    BlocklistInterceptor, RequestDescriptor, RequestInterceptor, RequestVerdict, ResourceType,
};
use lumen::session::{BrowsingSession, SessionId, SessionMode};
use lumen::tab::TabId;
use lumen::window::{StatusMessage, WindowId};
use servo::{
    LoadStatus, OffscreenRenderingContext, RenderingContext, Servo, WebResourceLoad,
    WebResourceResponse, WebView, WebViewBuilder, WebViewDelegate, WindowRenderingContext,
};
use tracing::{debug, error, warn};
use url::Url;
use webrender_api::units::DevicePoint;
use winit::dpi::LogicalSize;
use winit::event_loop::{ActiveEventLoop, EventLoop, EventLoopProxy};
use winit::keyboard::ModifiersState;
use winit::raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use winit::window::Window;

use crate::error::ShellError;
use crate::rendering;

/// Servo registers one request hook per webview and cannot rename downloads.
pub const SERVO_CAPABILITIES: Capabilities = Capabilities {
    interceptor: Some(InterceptorApi::Current),
    download_file_name: false,
};

/// Servo's "head parsed" milestone, as a progress value.
const HEAD_PARSED_PROGRESS: i32 = 50;

// ─────────────────────────────────────────────────────────────────────────────
// Waker
// ─────────────────────────────────────────────────────────────────────────────

/// Sent through the winit proxy when Servo has work for the main thread;
/// the loop answers with `servo.spin_event_loop()`.
#[derive(Debug)]
pub struct WakerEvent;

#[derive(Clone)]
pub struct Waker(EventLoopProxy<WakerEvent>);

impl Waker {
    pub fn new(event_loop: &EventLoop<WakerEvent>) -> Self {
        Self(event_loop.create_proxy())
    }
}

impl embedder_traits::EventLoopWaker for Waker {
    fn clone_box(&self) -> Box<dyn embedder_traits::EventLoopWaker> {
        Box::new(Self(self.0.clone()))
    }

    fn wake(&self) {
        if let Err(error) = self.0.send_event(WakerEvent) {
            warn!(?error, "Cannot wake the winit event loop");
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Per-tab state
// ─────────────────────────────────────────────────────────────────────────────

/// Joint session history as last reported by Servo.
#[derive(Debug, Default, Clone, Copy)]
struct NavHistory {
    len: usize,
    current: usize,
}

/// A tab's webview and the offscreen target it paints into.
pub struct TabView {
    pub webview: WebView,
    pub context: Rc<OffscreenRenderingContext>,
}

/// Webviews of one native window, keyed by tab.
pub type TabViews = Rc<RefCell<HashMap<TabId, TabView>>>;

#[derive(Default)]
struct ServoVerdict {
    blocked: bool,
}

impl RequestVerdict for ServoVerdict {
    fn block(&mut self) {
        self.blocked = true;
    }

    fn allow(&mut self) {
        self.blocked = false;
    }
}

/// Servo callbacks for one tab.
struct TabDelegate {
    tab: TabId,
    sender: EventSender,
    window: Rc<Window>,
    history: Rc<Cell<NavHistory>>,
    /// `None` when no hook was installed for the tab's session.
    interceptor: Option<Arc<BlocklistInterceptor>>,
}

impl TabDelegate {
    fn send(&self, event: EngineEvent) {
        self.sender.send_engine(self.tab, event);
    }
}

impl WebViewDelegate for TabDelegate {
    fn notify_new_frame_ready(&self, _webview: WebView) {
        self.window.request_redraw();
    }

    fn notify_url_changed(&self, _webview: WebView, url: Url) {
        self.send(EngineEvent::UrlChanged(url.into()));
    }

    fn notify_page_title_changed(&self, _webview: WebView, title: Option<String>) {
        if let Some(title) = title {
            self.send(EngineEvent::TitleChanged(title));
        }
    }

    fn notify_load_status_changed(&self, _webview: WebView, status: LoadStatus) {
        let event = match status {
            LoadStatus::Started => EngineEvent::LoadStarted,
            LoadStatus::HeadParsed => EngineEvent::LoadProgress(HEAD_PARSED_PROGRESS),
            LoadStatus::Complete => EngineEvent::LoadFinished { ok: true },
        };
        self.send(event);
    }

    fn notify_history_changed(&self, _webview: WebView, entries: Vec<Url>, current: usize) {
        self.history.set(NavHistory {
            len: entries.len(),
            current,
        });
        self.send(EngineEvent::HistoryChanged);
    }

    fn load_web_resource(&self, _webview: WebView, load: WebResourceLoad) {
        let Some(interceptor) = &self.interceptor else {
            return;
        };
        let request = load.request();
        let resource_type = if request.is_for_main_frame {
            ResourceType::Document
        } else {
            ResourceType::Other
        };
        let url = request.url.clone();

        // SECURITY: a panic must not unwind into Servo's request path. A
        // request whose check panicked is let through and logged.
        let blocked = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let mut verdict = ServoVerdict::default();
            let descriptor =
                RequestDescriptor::new(url.as_str()).with_resource_type(resource_type);
            interceptor.intercept_request(&descriptor, &mut verdict);
            verdict.blocked
        }))
        .unwrap_or_else(|_| {
            error!(tab = %self.tab, url = %url, "Request check panicked, request allowed");
            false
        });

        if blocked {
            load.intercept(WebResourceResponse::new(url)).cancel();
        }
    }
}

/// [`RenderSurface`] over a Servo webview. Dropping it closes the webview.
struct ServoSurface {
    tab: TabId,
    webview: Option<WebView>,
    history: Rc<Cell<NavHistory>>,
    views: TabViews,
    sender: EventSender,
}

impl RenderSurface for ServoSurface {
    fn load(&mut self, url: &str) {
        let Some(webview) = &self.webview else {
            return;
        };
        match Url::parse(url) {
            Ok(url) => webview.load(url),
            Err(e) => {
                warn!(tab = %self.tab, url, error = %e, "Unparsable URL");
                self.sender.send_engine(self.tab, EngineEvent::LoadStarted);
                self.sender
                    .send_engine(self.tab, EngineEvent::LoadFinished { ok: false });
            }
        }
    }

    fn back(&mut self) {
        if let Some(webview) = &self.webview {
            webview.go_back(1);
        }
    }

    fn forward(&mut self) {
        if let Some(webview) = &self.webview {
            webview.go_forward(1);
        }
    }

    fn reload(&mut self) {
        if let Some(webview) = &self.webview {
            webview.reload();
        }
    }

    fn url(&self) -> String {
        self.webview
            .as_ref()
            .and_then(WebView::url)
            .map(String::from)
            .unwrap_or_default()
    }

    fn can_go_back(&self) -> bool {
        self.history.get().current > 0
    }

    fn can_go_forward(&self) -> bool {
        let history = self.history.get();
        history.current + 1 < history.len
    }
}

impl Drop for ServoSurface {
    fn drop(&mut self) {
        self.views.borrow_mut().remove(&self.tab);
        debug!(tab = %self.tab, "Webview released");
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Native windows and shell state
// ─────────────────────────────────────────────────────────────────────────────

/// The winit window backing one browser window.
pub struct NativeWindow {
    pub window: Rc<Window>,
    pub context: Rc<WindowRenderingContext>,
    pub views: TabViews,
    pub cursor: DevicePoint,
    pub modifiers: ModifiersState,
    /// Status message on display and when it appeared.
    pub status_since: Option<(StatusMessage, Instant)>,
    pub last_title: String,
    pub shown_tab: Option<TabId>,
}

impl NativeWindow {
    fn open(event_loop: &ActiveEventLoop, config: &Config) -> Result<Self, ShellError> {
        let attributes = Window::default_attributes()
            .with_title(config.general.window_title.clone())
            .with_inner_size(LogicalSize::new(
                f64::from(config.window.width),
                f64::from(config.window.height),
            ));
        let window = event_loop.create_window(attributes)?;
        let context = rendering::create_rendering_context(
            event_loop.display_handle()?,
            window.window_handle()?,
            window.inner_size(),
        )?;
        Ok(Self {
            window: Rc::new(window),
            context,
            views: Rc::default(),
            cursor: DevicePoint::zero(),
            modifiers: ModifiersState::default(),
            status_since: None,
            last_title: String::new(),
            shown_tab: None,
        })
    }

    pub fn view(&self, tab: TabId) -> Option<WebView> {
        self.views.borrow().get(&tab).map(|v| v.webview.clone())
    }

    pub fn paint(&self, tab: TabId) {
        let views = self.views.borrow();
        let Some(view) = views.get(&tab) else {
            return;
        };
        view.webview.paint();
        rendering::present(&self.context, &view.context, self.window.inner_size());
    }

    pub fn resize(&self, size: winit::dpi::PhysicalSize<u32>) {
        self.context.resize(size);
        for view in self.views.borrow().values() {
            view.context.resize(size);
        }
    }
}

/// Engine-side state living for the whole run.
pub struct Shell {
    pub servo: Servo,
    pub config: Config,
    pub windows: HashMap<WindowId, NativeWindow>,
    sender: EventSender,
    filtered_sessions: HashSet<SessionId>,
    warned_incognito: bool,
}

impl Shell {
    pub fn new(servo: Servo, config: Config, sender: EventSender) -> Self {
        Self {
            servo,
            config,
            windows: HashMap::new(),
            sender,
            filtered_sessions: HashSet::new(),
            warned_incognito: false,
        }
    }

    pub fn window_for(&self, id: winit::window::WindowId) -> Option<WindowId> {
        self.windows
            .iter()
            .find(|(_, native)| native.window.id() == id)
            .map(|(id, _)| *id)
    }
}

/// [`WebEngine`] view over the shell, built for each controller call.
pub struct ServoEngine<'a> {
    event_loop: &'a ActiveEventLoop,
    shell: &'a mut Shell,
}

impl<'a> ServoEngine<'a> {
    pub fn new(event_loop: &'a ActiveEventLoop, shell: &'a mut Shell) -> Self {
        Self { event_loop, shell }
    }
}

impl WebEngine for ServoEngine<'_> {
    fn capabilities(&self) -> Capabilities {
        SERVO_CAPABILITIES
    }

    fn window_opened(&mut self, window: WindowId, mode: SessionMode) {
        if mode.is_incognito() && !self.shell.warned_incognito {
            warn!("Servo shares one storage area between webviews, incognito is not isolated on disk");
            self.shell.warned_incognito = true;
        }
        match NativeWindow::open(self.event_loop, &self.shell.config) {
            Ok(native) => {
                self.shell.windows.insert(window, native);
            }
            Err(e) => error!(window = %window, error = %e, "Cannot open native window"),
        }
    }

    fn window_closed(&mut self, window: WindowId) {
        self.shell.windows.remove(&window);
    }

    fn install_interceptor(&mut self, session: &Arc<BrowsingSession>, api: InterceptorApi) {
        if api != InterceptorApi::Current {
            debug!(?api, "Servo has a single interception entry point");
        }
        self.shell.filtered_sessions.insert(session.id());
    }

    fn create_surface(
        &mut self,
        window: WindowId,
        tab: TabId,
        session: Arc<BrowsingSession>,
    ) -> Box<dyn RenderSurface> {
        let history = Rc::new(Cell::new(NavHistory::default()));
        let sender = self.shell.sender.clone();
        let Some(native) = self.shell.windows.get(&window) else {
            warn!(window = %window, tab = %tab, "No native window, tab stays blank");
            return Box::new(ServoSurface {
                tab,
                webview: None,
                history,
                views: Rc::default(),
                sender,
            });
        };

        let interceptor = self
            .shell
            .filtered_sessions
            .contains(&session.id())
            .then(|| Arc::clone(session.interceptor()));
        let delegate = Rc::new(TabDelegate {
            tab,
            sender: sender.clone(),
            window: Rc::clone(&native.window),
            history: Rc::clone(&history),
            interceptor,
        });

        let context = rendering::create_tab_context(&native.context, native.window.inner_size());
        let webview = WebViewBuilder::new(
            &self.shell.servo,
            Rc::clone(&context) as Rc<dyn RenderingContext>,
        )
        .hidpi_scale_factor(Scale::new(native.window.scale_factor() as f32))
        .delegate(delegate)
        .build();

        native.views.borrow_mut().insert(
            tab,
            TabView {
                webview: webview.clone(),
                context,
            },
        );
        debug!(window = %window, tab = %tab, session = %session.id(), "Webview created");

        Box::new(ServoSurface {
            tab,
            webview: Some(webview),
            history,
            views: Rc::clone(&native.views),
            sender,
        })
    }
}
