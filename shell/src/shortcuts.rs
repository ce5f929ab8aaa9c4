//! Keyboard shortcuts.
//!
//! | Keys                  | Command                   |
//! |-----------------------|---------------------------|
//! | Ctrl+T                | new tab                   |
//! | Ctrl+W                | close tab                 |
//! | Ctrl+Tab / +Shift     | next / previous tab       |
//! | Ctrl+L                | focus URL field           |
//! | Ctrl+R, F5            | reload                    |
//! | Alt+Left / Alt+Right  | back / forward            |
//! | Alt+Home              | home page                 |
//! | Ctrl+U                | show user agent           |
//! | Ctrl+Shift+N          | incognito window          |
//! | Ctrl+D                | bookmark current page     |
//! | Ctrl+B / Ctrl+H / Ctrl+J | bookmarks / history / downloads |

use lumen::events::UiAction;
use lumen::window::BrowserWindow;
use winit::keyboard::{Key, ModifiersState, NamedKey};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Ui(UiAction),
    FocusUrlBar,
}

/// Maps a key press to a command for `window`, if it is a shortcut.
pub fn command_for_key(
    key: &Key,
    mods: ModifiersState,
    window: &BrowserWindow,
) -> Option<ShellCommand> {
    let ui = |action| Some(ShellCommand::Ui(action));

    match key {
        Key::Named(NamedKey::F5) => ui(UiAction::Reload),
        Key::Named(NamedKey::Tab) if mods.control_key() => {
            let step = if mods.shift_key() { -1 } else { 1 };
            ui(UiAction::SelectTab(cycle_tab(window, step)))
        }
        Key::Named(NamedKey::ArrowLeft) if mods.alt_key() => ui(UiAction::Back),
        Key::Named(NamedKey::ArrowRight) if mods.alt_key() => ui(UiAction::Forward),
        Key::Named(NamedKey::Home) if mods.alt_key() => ui(UiAction::Home),
        Key::Character(c) if mods.control_key() && !mods.alt_key() => {
            match (c.to_lowercase().as_str(), mods.shift_key()) {
                ("t", false) => ui(UiAction::NewTab { url: None }),
                ("w", false) => ui(UiAction::CloseTab(window.active_tab_id())),
                ("l", false) => Some(ShellCommand::FocusUrlBar),
                ("r", false) => ui(UiAction::Reload),
                ("u", false) => ui(UiAction::ShowUserAgent),
                ("n", true) => ui(UiAction::OpenIncognitoWindow),
                ("d", false) => ui(UiAction::AddBookmark),
                ("b", false) => ui(UiAction::ShowBookmarks),
                ("h", false) => ui(UiAction::ShowHistory),
                ("j", false) => ui(UiAction::ShowDownloads),
                _ => None,
            }
        }
        _ => None,
    }
}

fn cycle_tab(window: &BrowserWindow, step: isize) -> lumen::tab::TabId {
    let count = window.tab_count() as isize;
    let index = (window.active_index() as isize + step).rem_euclid(count);
    window.tabs()[index as usize].id()
}
