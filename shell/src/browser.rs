//! winit event loop and window lifecycle.
//!
//! ## Two-phase app
//!
//! winit 0.30 only lets windows be created inside `resumed()`, and Servo
//! needs a window before it can render. The app therefore starts in an
//! initial state and switches to running there:
//!
//! ```text
//! App::Initial  →  [resumed()]  →  App::Running(Running)
//! ```
//!
//! ## Event flow
//!
//! ```text
//! Servo threads ─wake()─▶ EventLoopProxy ─▶ user_event()
//!                                             └─ servo.spin_event_loop()
//!                                                  └─ TabDelegate → EventSender
//! winit window events ─▶ shortcuts / URL field / page input
//!                             └─ Browser::dispatch
//! about_to_wait() ─▶ Browser::process_pending, status expiry, window titles
//! ```

use std::time::Instant;

use lumen::app::Browser;
use lumen::config::Config;
use lumen::events::{BrowserEvent, UiAction};
use lumen::session::SessionMode;
use lumen::urlbar::UrlBar;
use lumen::window::WindowId;
use servo::{
    InputEvent, MouseButton as ServoMouseButton, MouseButtonAction, MouseButtonEvent,
    MouseLeftViewportEvent, MouseMoveEvent, ServoBuilder, WebView, WheelDelta, WheelEvent,
    WheelMode,
};
use tracing::{error, info};
use webrender_api::units::DevicePoint;
use winit::application::ApplicationHandler;
use winit::event::{ElementState, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{Key, ModifiersState, NamedKey};

use crate::dialogs::{PickerKey, ShellDialogs, picker_key};
use crate::error::ShellError;
use crate::keyboard::keyboard_event_from_winit;
use crate::preferences::{build_servo_opts, build_servo_preferences};
use crate::servo_glue::{SERVO_CAPABILITIES, ServoEngine, Shell, Waker, WakerEvent};
use crate::shortcuts::{ShellCommand, command_for_key};
use crate::title::compose_title;

/// Pixels per wheel "line".
const LINE_HEIGHT: f32 = 76.0;

pub enum App {
    /// Waiting for `resumed()`.
    Initial {
        waker: Waker,
        config: Box<Config>,
        mode: SessionMode,
        initial_url: Option<String>,
    },
    Running(Box<Running>),
    Stopped,
}

impl App {
    pub fn new(
        event_loop: &EventLoop<WakerEvent>,
        config: Config,
        mode: SessionMode,
        initial_url: Option<String>,
    ) -> Self {
        Self::Initial {
            waker: Waker::new(event_loop),
            config: Box::new(config),
            mode,
            initial_url,
        }
    }
}

pub struct Running {
    shell: Shell,
    browser: Browser,
    dialogs: ShellDialogs,
}

impl Running {
    fn start(
        event_loop: &ActiveEventLoop,
        waker: Waker,
        config: Config,
        mode: SessionMode,
        initial_url: Option<&str>,
    ) -> Result<Self, ShellError> {
        let mut browser = Browser::new(config.clone(), SERVO_CAPABILITIES);
        // Servo's profile is engine-wide: it follows the first window's mode.
        let profile = match mode {
            SessionMode::Persistent => Some(browser.session(SessionMode::Persistent)?),
            SessionMode::Incognito => None,
        };

        let servo = ServoBuilder::default()
            .opts(build_servo_opts(profile.as_deref()))
            .preferences(build_servo_preferences(&config))
            .event_loop_waker(Box::new(waker))
            .build();

        let shell = Shell::new(servo, config, browser.sender());
        let mut running = Self {
            shell,
            browser,
            dialogs: ShellDialogs::new(ShellDialogs::default_downloads_dir()),
        };

        let mut engine = ServoEngine::new(event_loop, &mut running.shell);
        let window = running.browser.open_window(&mut engine, mode, initial_url)?;
        info!(window = %window, ?mode, "Browser started");
        Ok(running)
    }

    fn dispatch_ui(&mut self, event_loop: &ActiveEventLoop, window: WindowId, action: UiAction) {
        self.dialogs.begin(window, action.clone());
        let mut engine = ServoEngine::new(event_loop, &mut self.shell);
        self.browser
            .dispatch(&mut engine, &mut self.dialogs, BrowserEvent::ui(window, action));
        self.dialogs.end();
    }

    fn pump(&mut self, event_loop: &ActiveEventLoop) {
        let mut engine = ServoEngine::new(event_loop, &mut self.shell);
        self.browser.process_pending(&mut engine, &mut self.dialogs);
    }

    fn active_view(&self, window: WindowId) -> Option<WebView> {
        let tab = self.browser.window(window)?.active_tab_id();
        self.shell.windows.get(&window)?.view(tab)
    }

    fn forward_input(&self, window: WindowId, event: InputEvent) {
        if let Some(webview) = self.active_view(window) {
            webview.notify_input_event(event);
        }
    }

    /// Expires status messages, refreshes titles and schedules the next
    /// wake-up.
    fn sync(&mut self, event_loop: &ActiveEventLoop) {
        let now = Instant::now();
        let mut next_deadline: Option<Instant> = None;
        let ids: Vec<WindowId> = self.browser.windows().iter().map(|w| w.id()).collect();

        for id in ids {
            let (Some(native), Some(window)) =
                (self.shell.windows.get_mut(&id), self.browser.window_mut(id))
            else {
                continue;
            };

            let current = window.status().message().cloned();
            if native.status_since.as_ref().map(|(m, _)| m) != current.as_ref() {
                native.status_since = current.map(|m| (m, now));
            }
            let deadline = native
                .status_since
                .as_ref()
                .and_then(|(m, since)| m.timeout.map(|t| *since + t));
            match deadline {
                Some(deadline) if deadline <= now => {
                    window.status_mut().clear_message();
                    native.status_since = None;
                }
                Some(deadline) => {
                    next_deadline = Some(next_deadline.map_or(deadline, |d| d.min(deadline)));
                }
                None => {}
            }

            let active = window.active_tab_id();
            if native.shown_tab != Some(active) {
                native.shown_tab = Some(active);
                native.window.request_redraw();
            }

            let title = compose_title(window, &self.dialogs);
            if title != native.last_title {
                native.window.set_title(&title);
                native.last_title = title;
            }
        }

        event_loop.set_control_flow(match next_deadline {
            Some(deadline) => ControlFlow::WaitUntil(deadline),
            None => ControlFlow::Wait,
        });
        if self.browser.is_finished() {
            info!("Last window closed");
            event_loop.exit();
        }
    }

    fn on_key(&mut self, event_loop: &ActiveEventLoop, id: WindowId, event: &KeyEvent) {
        let Some(mods) = self.shell.windows.get(&id).map(|n| n.modifiers) else {
            return;
        };
        let pressed = event.state == ElementState::Pressed;
        if pressed {
            self.dialogs.dismiss_notice();
        }

        if self.dialogs.picker_for(id).is_some() {
            match picker_key(&event.logical_key).filter(|_| pressed) {
                Some(PickerKey::Close) => self.dialogs.close_picker(),
                Some(PickerKey::Choose(index)) => {
                    if let Some((window, action)) = self.dialogs.choose(index) {
                        self.dispatch_ui(event_loop, window, action);
                    }
                }
                None => {}
            }
            return;
        }

        if pressed {
            let command = self
                .browser
                .window(id)
                .and_then(|w| command_for_key(&event.logical_key, mods, w));
            match command {
                Some(ShellCommand::Ui(action)) => {
                    self.dispatch_ui(event_loop, id, action);
                    return;
                }
                Some(ShellCommand::FocusUrlBar) => {
                    if let Some(window) = self.browser.window_mut(id) {
                        window.url_bar_mut().focus();
                    }
                    return;
                }
                None => {}
            }
        }

        let Some(window) = self.browser.window_mut(id) else {
            return;
        };
        if window.url_bar().is_focused() {
            if pressed
                && let Some(input) = edit_url_bar(window.url_bar_mut(), &event.logical_key, mods)
            {
                self.dispatch_ui(event_loop, id, UiAction::GoTo(input));
            }
            return;
        }

        self.forward_input(id, InputEvent::Keyboard(keyboard_event_from_winit(event, mods)));
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => self.dispatch_ui(event_loop, id, UiAction::CloseWindow),

            WindowEvent::RedrawRequested => {
                if let (Some(native), Some(window)) =
                    (self.shell.windows.get(&id), self.browser.window(id))
                {
                    native.paint(window.active_tab_id());
                }
            }

            WindowEvent::Resized(size) => {
                if let Some(native) = self.shell.windows.get(&id) {
                    native.resize(size);
                    native.window.request_redraw();
                }
            }

            WindowEvent::ModifiersChanged(modifiers) => {
                if let Some(native) = self.shell.windows.get_mut(&id) {
                    native.modifiers = modifiers.state();
                }
            }

            WindowEvent::CursorMoved { position, .. } => {
                let point = DevicePoint::new(position.x as f32, position.y as f32);
                if let Some(native) = self.shell.windows.get_mut(&id) {
                    native.cursor = point;
                }
                self.forward_input(id, InputEvent::MouseMove(MouseMoveEvent::new(point.into())));
            }

            WindowEvent::CursorLeft { .. } => {
                self.forward_input(
                    id,
                    InputEvent::MouseLeftViewport(MouseLeftViewportEvent::default()),
                );
            }

            WindowEvent::MouseWheel { delta, .. } => {
                let Some(cursor) = self.shell.windows.get(&id).map(|n| n.cursor) else {
                    return;
                };
                let (x, y, mode) = match delta {
                    MouseScrollDelta::LineDelta(dx, dy) => (
                        f64::from(dx * LINE_HEIGHT),
                        f64::from(dy * LINE_HEIGHT),
                        WheelMode::DeltaLine,
                    ),
                    MouseScrollDelta::PixelDelta(delta) => (delta.x, delta.y, WheelMode::DeltaPixel),
                };
                let wheel = WheelDelta { x, y, z: 0.0, mode };
                self.forward_input(id, InputEvent::Wheel(WheelEvent::new(wheel, cursor.into())));
            }

            WindowEvent::MouseInput { state, button, .. } => {
                let Some(cursor) = self.shell.windows.get(&id).map(|n| n.cursor) else {
                    return;
                };
                if state == ElementState::Pressed
                    && let Some(window) = self.browser.window_mut(id)
                    && window.url_bar().is_focused()
                {
                    window.url_bar_mut().unfocus();
                }
                let action = match state {
                    ElementState::Pressed => MouseButtonAction::Down,
                    ElementState::Released => MouseButtonAction::Up,
                };
                self.forward_input(
                    id,
                    InputEvent::MouseButton(MouseButtonEvent::new(
                        action,
                        servo_button(button),
                        cursor.into(),
                    )),
                );
            }

            WindowEvent::KeyboardInput { event, .. } => self.on_key(event_loop, id, &event),

            _ => (),
        }
    }
}

fn servo_button(button: MouseButton) -> ServoMouseButton {
    match button {
        MouseButton::Left => ServoMouseButton::Left,
        MouseButton::Right => ServoMouseButton::Right,
        MouseButton::Middle => ServoMouseButton::Middle,
        MouseButton::Back => ServoMouseButton::Back,
        MouseButton::Forward => ServoMouseButton::Forward,
        MouseButton::Other(id) => ServoMouseButton::Other(id),
    }
}

/// Applies a key press to the focused URL field. Returns the submitted
/// input on Enter.
fn edit_url_bar(bar: &mut UrlBar, key: &Key, mods: ModifiersState) -> Option<String> {
    match key {
        Key::Named(NamedKey::Enter) => return bar.submit(),
        Key::Named(NamedKey::Escape) => bar.unfocus(),
        Key::Named(NamedKey::Backspace) => bar.backspace(),
        Key::Named(NamedKey::Delete) => bar.delete(),
        Key::Named(NamedKey::ArrowLeft) => bar.move_cursor_left(),
        Key::Named(NamedKey::ArrowRight) => bar.move_cursor_right(),
        Key::Named(NamedKey::Home) => bar.home(),
        Key::Named(NamedKey::End) => bar.end(),
        Key::Named(NamedKey::Space) => bar.insert_char(' '),
        Key::Character(c) if mods.control_key() => {
            if c.eq_ignore_ascii_case("a") {
                bar.select_all();
            }
        }
        Key::Character(c) if !mods.alt_key() => bar.insert_str(c),
        _ => {}
    }
    None
}

impl ApplicationHandler<WakerEvent> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if !matches!(self, Self::Initial { .. }) {
            return;
        }
        let Self::Initial {
            waker,
            config,
            mode,
            initial_url,
        } = std::mem::replace(self, Self::Stopped)
        else {
            return;
        };

        match Running::start(event_loop, waker, *config, mode, initial_url.as_deref()) {
            Ok(running) => *self = Self::Running(Box::new(running)),
            Err(e) => {
                error!(error = %e, "Cannot start the browser");
                event_loop.exit();
            }
        }
    }

    fn user_event(&mut self, event_loop: &ActiveEventLoop, _event: WakerEvent) {
        if let Self::Running(running) = self {
            running.shell.servo.spin_event_loop();
            running.pump(event_loop);
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let Self::Running(running) = self else {
            return;
        };
        running.shell.servo.spin_event_loop();
        if let Some(id) = running.shell.window_for(window_id) {
            running.window_event(event_loop, id, event);
        }
        running.pump(event_loop);
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if let Self::Running(running) = self {
            running.pump(event_loop);
            running.sync(event_loop);
        }
    }
}
