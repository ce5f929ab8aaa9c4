//! Window title line.
//!
//! The shell draws no toolbar of its own: the URL field, tab position and
//! status bar are shown in the native title, e.g.
//!
//! ```text
//! Rust Programming Language · https://www.rust-lang.org/ · [2/3] · Loaded · Lumen
//! ```
//!
//! An open list picker replaces the whole line.

use lumen::window::BrowserWindow;

use crate::dialogs::{ListPicker, ShellDialogs};

const SEPARATOR: &str = " · ";
const CURSOR: char = '|';

pub fn compose_title(window: &BrowserWindow, dialogs: &ShellDialogs) -> String {
    if let Some(picker) = dialogs.picker_for(window.id()) {
        return picker_line(picker, window.title());
    }

    let tab = window.active_tab();
    let url_bar = window.url_bar();
    let mut parts: Vec<String> = Vec::with_capacity(5);

    if url_bar.is_focused() {
        let text = url_bar.display_text();
        let (before, after) = text.split_at(url_bar.cursor_pos());
        parts.push(format!("Go to: {before}{CURSOR}{after}"));
    } else {
        parts.push(tab.title().to_string());
        if !url_bar.display_text().is_empty() {
            parts.push(url_bar.display_text().to_string());
        }
    }

    if window.tab_count() > 1 {
        parts.push(format!("[{}/{}]", window.active_index() + 1, window.tab_count()));
    }

    let status = window.status();
    match (status.progress(), status.message()) {
        (Some(progress), _) => parts.push(format!("{progress}%")),
        (None, Some(message)) => parts.push(message.text.clone()),
        (None, None) => {}
    }
    if let Some(notice) = dialogs.notice_for(window.id()) {
        parts.push(notice.to_string());
    }

    parts.push(window.title().to_string());
    parts.join(SEPARATOR)
}

fn picker_line(picker: &ListPicker, window_title: &str) -> String {
    let mut parts: Vec<String> = Vec::with_capacity(picker.items.len() + 2);
    if picker.items.is_empty() {
        parts.push(format!("{}: empty", picker.title));
    }
    for (index, item) in picker.items.iter().enumerate() {
        if index == 0 {
            parts.push(format!("{}: [1] {item}", picker.title));
        } else {
            parts.push(format!("[{}] {item}", index + 1));
        }
    }
    parts.push("Esc closes".to_string());
    parts.push(window_title.to_string());
    parts.join(SEPARATOR)
}
