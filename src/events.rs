//! Events driving the browser controller.
//!
//! Every toolbar button, menu entry and engine callback becomes a
//! [`BrowserEvent`]. Front ends and engine adapters push events through an
//! [`EventSender`] (cloneable, usable from any thread); the [`Browser`]
//! drains its [`EventQueue`] on the UI thread.
//!
//! [`Browser`]: crate::app::Browser

use crossbeam_channel::{Receiver, Sender, TryRecvError, unbounded};
use tracing::warn;

use crate::engine::DownloadRequest;
use crate::tab::TabId;
use crate::window::WindowId;

/// User-interface actions, addressed to one window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiAction {
    /// Opens a tab on `url`, or on the home page.
    NewTab { url: Option<String> },
    CloseTab(TabId),
    SelectTab(TabId),
    /// Moves a tab to position `to` (clamped to the tab count).
    MoveTab { tab: TabId, to: usize },
    Back,
    Forward,
    Reload,
    Home,
    /// Text submitted from the URL field.
    GoTo(String),
    ShowUserAgent,
    OpenIncognitoWindow,
    ShowDownloads,
    ShowHistory,
    ShowBookmarks,
    AddBookmark,
    CloseWindow,
}

/// Engine callbacks, addressed to one tab.
#[derive(Debug)]
pub enum EngineEvent {
    LoadStarted,
    /// Raw engine value; clamped to 0–100 by the controller.
    LoadProgress(i32),
    LoadFinished { ok: bool },
    UrlChanged(String),
    TitleChanged(String),
    /// Back/forward availability may have changed.
    HistoryChanged,
    DownloadRequested(Box<dyn DownloadRequest>),
}

#[derive(Debug)]
pub enum BrowserEvent {
    Ui { window: WindowId, action: UiAction },
    Engine { tab: TabId, event: EngineEvent },
}

impl BrowserEvent {
    pub fn ui(window: WindowId, action: UiAction) -> Self {
        Self::Ui { window, action }
    }

    pub fn engine(tab: TabId, event: EngineEvent) -> Self {
        Self::Engine { tab, event }
    }
}

/// Sending half of the event queue.
#[derive(Debug, Clone)]
pub struct EventSender(Sender<BrowserEvent>);

impl EventSender {
    /// Queues an event. Events sent after the browser is gone are dropped.
    pub fn send(&self, event: BrowserEvent) {
        if let Err(error) = self.0.send(event) {
            warn!(event = ?error.0, "Event dropped, browser already shut down");
        }
    }

    pub fn send_ui(&self, window: WindowId, action: UiAction) {
        self.send(BrowserEvent::ui(window, action));
    }

    pub fn send_engine(&self, tab: TabId, event: EngineEvent) {
        self.send(BrowserEvent::engine(tab, event));
    }
}

/// Single-consumer event queue owned by the controller.
#[derive(Debug)]
pub struct EventQueue {
    tx: Sender<BrowserEvent>,
    rx: Receiver<BrowserEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self { tx, rx }
    }

    pub fn sender(&self) -> EventSender {
        EventSender(self.tx.clone())
    }

    /// Next pending event, without blocking.
    pub fn try_next(&self) -> Option<BrowserEvent> {
        match self.rx.try_recv() {
            Ok(event) => Some(event),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_preserves_order() {
        let queue = EventQueue::new();
        let sender = queue.sender();
        sender.send_ui(WindowId::new(1), UiAction::Reload);
        sender.send_engine(TabId::new(2), EngineEvent::LoadProgress(40));
        assert_eq!(queue.len(), 2);

        assert!(matches!(
            queue.try_next(),
            Some(BrowserEvent::Ui { action: UiAction::Reload, .. })
        ));
        assert!(matches!(
            queue.try_next(),
            Some(BrowserEvent::Engine { event: EngineEvent::LoadProgress(40), .. })
        ));
        assert!(queue.try_next().is_none());
    }

    #[test]
    fn test_sender_works_from_other_threads() {
        let queue = EventQueue::new();
        let sender = queue.sender();
        std::thread::spawn(move || {
            sender.send_engine(TabId::new(1), EngineEvent::LoadStarted);
        })
        .join()
        .unwrap();
        assert!(matches!(
            queue.try_next(),
            Some(BrowserEvent::Engine { event: EngineEvent::LoadStarted, .. })
        ));
    }

    #[test]
    fn test_send_after_drop_is_harmless() {
        let queue = EventQueue::new();
        let sender = queue.sender();
        drop(queue);
        sender.send_ui(WindowId::new(1), UiAction::Home);
    }
}
