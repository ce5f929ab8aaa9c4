//! Contract with the embedded rendering engine.
//!
//! The browser core never renders, fetches or runs scripts. It drives an
//! engine through these traits and receives its callbacks as
//! [`EngineEvent`](crate::events::EngineEvent)s.
//!
//! Optional engine features are described once, at startup, by
//! [`Capabilities`]. The controller branches on those flags instead of
//! probing the engine on every call.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::session::{BrowsingSession, SessionMode};
use crate::tab::TabId;
use crate::window::WindowId;

/// Registration point the engine offers for request interception.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterceptorApi {
    /// Per-session interceptor hook.
    Current,
    /// Older registration entry point with the same semantics.
    Legacy,
}

/// Optional engine features, resolved once when the browser starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// How to install the request hook; `None` means requests cannot be
    /// filtered at all.
    pub interceptor: Option<InterceptorApi>,
    /// Whether a download's file name can be set before accepting it.
    pub download_file_name: bool,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            interceptor: Some(InterceptorApi::Current),
            download_file_name: true,
        }
    }
}

/// The engine as seen by the browser.
pub trait WebEngine {
    /// Reports optional features. Called once.
    fn capabilities(&self) -> Capabilities;

    /// A browser window was opened.
    fn window_opened(&mut self, _window: WindowId, _mode: SessionMode) {}

    /// A browser window and all of its tabs were closed.
    fn window_closed(&mut self, _window: WindowId) {}

    /// Wires the session's interception hook through `api`.
    fn install_interceptor(&mut self, session: &Arc<BrowsingSession>, api: InterceptorApi);

    /// Creates the rendering surface of a new tab, bound to `session`.
    ///
    /// The engine reports the surface's lifecycle through events tagged
    /// with `tab`.
    fn create_surface(
        &mut self,
        window: WindowId,
        tab: TabId,
        session: Arc<BrowsingSession>,
    ) -> Box<dyn RenderSurface>;
}

/// Per-tab navigation primitives. Dropping the surface releases it.
pub trait RenderSurface {
    fn load(&mut self, url: &str);
    fn back(&mut self);
    fn forward(&mut self);
    fn reload(&mut self);
    /// The URL currently displayed, empty before the first commit.
    fn url(&self) -> String;
    fn can_go_back(&self) -> bool;
    fn can_go_forward(&self) -> bool;
}

/// A download the engine is waiting for a decision on.
///
/// Consumed by exactly one of [`accept`](Self::accept) or
/// [`cancel`](Self::cancel).
pub trait DownloadRequest: Send + fmt::Debug {
    fn suggested_file_name(&self) -> &str;

    /// Only meaningful when [`Capabilities::download_file_name`] is set.
    fn set_download_file_name(&mut self, name: &str);

    fn accept(self: Box<Self>, destination: &Path);

    fn cancel(self: Box<Self>);
}
