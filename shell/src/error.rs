//! Shell error type.

use winit::error::{EventLoopError, OsError};

#[derive(Debug, thiserror::Error)]
pub enum ShellError {
    #[error("cannot install the rustls crypto provider")]
    CryptoProvider,

    #[error("event loop: {0}")]
    EventLoop(#[from] EventLoopError),

    #[error("cannot create window: {0}")]
    Window(#[from] OsError),

    #[error("no display or window handle: {0}")]
    Handle(#[from] winit::raw_window_handle::HandleError),

    #[error("cannot set up GPU rendering: {0}")]
    Rendering(String),

    #[error(transparent)]
    Core(#[from] lumen::Error),
}
