//! GPU rendering contexts.
//!
//! Each native window owns one `WindowRenderingContext`. Every tab gets its
//! own offscreen context derived from it; the active tab's is blitted to the
//! window on redraw, so switching tabs needs no engine call.

use std::rc::Rc;

use servo::{OffscreenRenderingContext, RenderingContext, WindowRenderingContext};
use winit::dpi::PhysicalSize;
use winit::raw_window_handle::{DisplayHandle, WindowHandle};

use crate::error::ShellError;

/// Creates the hardware-accelerated context bound to a window and makes it
/// current, as required before any webview is built on it.
pub fn create_rendering_context(
    display_handle: DisplayHandle<'_>,
    window_handle: WindowHandle<'_>,
    size: PhysicalSize<u32>,
) -> Result<Rc<WindowRenderingContext>, ShellError> {
    let context = WindowRenderingContext::new(display_handle, window_handle, size)
        .map_err(|e| ShellError::Rendering(format!("{e:?}")))?;
    context
        .make_current()
        .map_err(|e| ShellError::Rendering(format!("{e:?}")))?;
    Ok(Rc::new(context))
}

/// Offscreen target for one tab.
pub fn create_tab_context(
    window_context: &WindowRenderingContext,
    size: PhysicalSize<u32>,
) -> Rc<OffscreenRenderingContext> {
    Rc::new(window_context.offscreen_context(size))
}

/// Paints `offscreen` over the whole window and presents the frame.
pub fn present(
    window_context: &WindowRenderingContext,
    offscreen: &OffscreenRenderingContext,
    size: PhysicalSize<u32>,
) {
    window_context.prepare_for_rendering();
    if let Some(blit) = offscreen.render_to_parent_callback() {
        let gl = window_context.glow_gl_api();
        let target = euclid::default::Rect::new(
            euclid::default::Point2D::new(0, 0),
            euclid::default::Size2D::new(size.width as i32, size.height as i32),
        );
        blit(&gl, target);
    }
    window_context.present();
}
