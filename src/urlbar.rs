//! URL field: text editing state machine and navigation input rules.
//!
//! Holds the text typed by the user, the cursor and the focus state. No
//! rendering here; front ends draw [`UrlBar::display_text`] however they
//! like and feed key presses back in.

use url::Url;

/// Scheme prepended to input that has none.
pub const DEFAULT_SCHEME: &str = "https://";

/// Turns URL-field input into a navigable URL.
///
/// Input is trimmed; empty input yields `None`. Anything not starting with
/// `http://` or `https://` gets [`DEFAULT_SCHEME`] prepended. No further
/// validation: malformed URLs are the engine's to report.
pub fn normalize_input(input: &str) -> Option<String> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }
    if input.starts_with("http://") || input.starts_with("https://") {
        Some(input.to_string())
    } else {
        Some(format!("{DEFAULT_SCHEME}{input}"))
    }
}

/// Normalizes a URL for display.
///
/// SECURITY: homograph spoofing.
///
/// Punycode hosts (`xn--…`) get a visible warning, and invisible
/// characters used to disguise a URL are removed.
pub fn display_url(url: &str) -> String {
    if let Ok(parsed) = Url::parse(url)
        && parsed.host_str().is_some_and(|h| h.starts_with("xn--"))
    {
        return format!("⚠️  {parsed} (Punycode)");
    }

    url.chars()
        .filter(|c| {
            !matches!(
                *c,
                '\u{200B}'..='\u{200D}' // Zero-width space, ZWNJ, ZWJ
                | '\u{2060}'            // Word joiner
                | '\u{FEFF}'            // Zero-width no-break space (BOM)
                | '\u{034F}'            // Combining grapheme joiner
                | '\u{2028}'            // Line separator
                | '\u{2029}'            // Paragraph separator
            )
        })
        .collect()
}

/// Focus state of the URL field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlBarFocus {
    /// Keyboard input goes to the page.
    Unfocused,
    /// Just focused: everything is selected, the next key replaces it.
    Focused,
    /// The user is typing.
    Editing,
}

/// URL field state machine.
#[derive(Debug, Clone)]
pub struct UrlBar {
    text: String,
    /// Byte offset into `text`.
    cursor: usize,
    focus: UrlBarFocus,
    current_url: Option<String>,
}

impl UrlBar {
    pub fn new() -> Self {
        Self {
            text: String::new(),
            cursor: 0,
            focus: UrlBarFocus::Unfocused,
            current_url: None,
        }
    }

    /// Shows the page URL, unless the user is editing.
    pub fn set_url(&mut self, url: &str) {
        self.current_url = Some(url.to_string());
        if self.focus == UrlBarFocus::Unfocused {
            self.text = display_url(url);
            self.cursor = self.text.len();
        }
    }

    pub fn current_url(&self) -> Option<&str> {
        self.current_url.as_deref()
    }

    pub fn focus(&mut self) {
        self.focus = UrlBarFocus::Focused;
        self.cursor = self.text.len();
    }

    /// Drops focus and restores the page URL.
    pub fn unfocus(&mut self) {
        self.focus = UrlBarFocus::Unfocused;
        if let Some(url) = &self.current_url {
            self.text = display_url(url);
            self.cursor = self.text.len();
        }
    }

    fn start_editing_cleared(&mut self) {
        self.text.clear();
        self.cursor = 0;
        self.focus = UrlBarFocus::Editing;
    }

    pub fn insert_char(&mut self, c: char) {
        if self.focus == UrlBarFocus::Focused {
            self.start_editing_cleared();
        }
        self.text.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    pub fn insert_str(&mut self, s: &str) {
        for c in s.chars() {
            self.insert_char(c);
        }
    }

    pub fn backspace(&mut self) {
        if self.focus == UrlBarFocus::Focused {
            self.start_editing_cleared();
            return;
        }
        if self.cursor > 0 {
            let prev = self.prev_boundary();
            self.text.drain(prev..self.cursor);
            self.cursor = prev;
        }
    }

    pub fn delete(&mut self) {
        if self.focus == UrlBarFocus::Focused {
            self.start_editing_cleared();
            return;
        }
        if self.cursor < self.text.len() {
            let next = self.next_boundary();
            self.text.drain(self.cursor..next);
        }
    }

    pub fn move_cursor_left(&mut self) {
        if self.focus == UrlBarFocus::Focused {
            self.focus = UrlBarFocus::Editing;
            self.cursor = 0;
            return;
        }
        self.cursor = self.prev_boundary();
    }

    pub fn move_cursor_right(&mut self) {
        if self.focus == UrlBarFocus::Focused {
            // cursor already at end
            self.focus = UrlBarFocus::Editing;
            return;
        }
        self.cursor = self.next_boundary();
    }

    pub fn home(&mut self) {
        if self.focus == UrlBarFocus::Focused {
            self.focus = UrlBarFocus::Editing;
        }
        self.cursor = 0;
    }

    pub fn end(&mut self) {
        if self.focus == UrlBarFocus::Focused {
            self.focus = UrlBarFocus::Editing;
        }
        self.cursor = self.text.len();
    }

    pub fn select_all(&mut self) {
        self.focus = UrlBarFocus::Focused;
        self.cursor = self.text.len();
    }

    /// Enter: returns the trimmed input and drops focus.
    ///
    /// Empty input returns `None` and keeps focus.
    pub fn submit(&mut self) -> Option<String> {
        let input = self.text.trim();
        if input.is_empty() {
            return None;
        }
        let input = input.to_string();
        self.focus = UrlBarFocus::Unfocused;
        Some(input)
    }

    pub fn is_focused(&self) -> bool {
        self.focus != UrlBarFocus::Unfocused
    }

    pub fn focus_state(&self) -> UrlBarFocus {
        self.focus
    }

    pub fn display_text(&self) -> &str {
        &self.text
    }

    pub fn cursor_pos(&self) -> usize {
        self.cursor
    }

    /// Characters before the cursor (for rendering).
    pub fn cursor_char_offset(&self) -> usize {
        self.text[..self.cursor].chars().count()
    }

    fn prev_boundary(&self) -> usize {
        self.text[..self.cursor]
            .char_indices()
            .next_back()
            .map(|(i, _)| i)
            .unwrap_or(0)
    }

    fn next_boundary(&self) -> usize {
        self.text[self.cursor..]
            .char_indices()
            .nth(1)
            .map(|(i, _)| self.cursor + i)
            .unwrap_or(self.text.len())
    }
}

impl Default for UrlBar {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_input_prefixes_scheme() {
        assert_eq!(normalize_input("example.com").as_deref(), Some("https://example.com"));
        assert_eq!(
            normalize_input("  example.com/a?b=c  ").as_deref(),
            Some("https://example.com/a?b=c")
        );
    }

    #[test]
    fn test_normalize_input_keeps_http_schemes() {
        assert_eq!(normalize_input("http://example.com").as_deref(), Some("http://example.com"));
        assert_eq!(normalize_input("https://example.com").as_deref(), Some("https://example.com"));
    }

    #[test]
    fn test_normalize_input_other_schemes_get_prefixed() {
        // Only http(s) counts as a scheme prefix; the engine reports the rest.
        assert_eq!(normalize_input("ftp://host").as_deref(), Some("https://ftp://host"));
    }

    #[test]
    fn test_normalize_input_empty() {
        assert_eq!(normalize_input(""), None);
        assert_eq!(normalize_input("   "), None);
    }

    #[test]
    fn test_punycode_warning() {
        let shown = display_url("https://xn--ggle-0nd.com/path");
        assert!(shown.contains("⚠️"), "{shown}");
        assert!(shown.contains("Punycode"), "{shown}");
        assert!(shown.contains("xn--ggle-0nd.com"), "{shown}");
    }

    #[test]
    fn test_normal_domain_unchanged() {
        assert_eq!(
            display_url("https://google.com/path?query=value"),
            "https://google.com/path?query=value"
        );
    }

    #[test]
    fn test_zero_width_characters_filtered() {
        let shown = display_url("https://google.com/pa\u{200B}th\u{FEFF}\u{2060}");
        assert_eq!(shown, "https://google.com/path");
    }

    #[test]
    fn test_focus_then_type_replaces_text() {
        let mut bar = UrlBar::new();
        bar.set_url("https://example.com/");
        bar.focus();
        bar.insert_str("rust-lang.org");
        assert_eq!(bar.display_text(), "rust-lang.org");
        assert_eq!(bar.focus_state(), UrlBarFocus::Editing);
    }

    #[test]
    fn test_set_url_ignored_while_editing() {
        let mut bar = UrlBar::new();
        bar.focus();
        bar.insert_str("typing");
        bar.set_url("https://example.com/");
        assert_eq!(bar.display_text(), "typing");
        bar.unfocus();
        assert_eq!(bar.display_text(), "https://example.com/");
    }

    #[test]
    fn test_cursor_editing_multibyte() {
        let mut bar = UrlBar::new();
        bar.focus();
        bar.insert_str("héllo");
        bar.move_cursor_left();
        bar.move_cursor_left();
        bar.backspace();
        assert_eq!(bar.display_text(), "hélo");
        bar.home();
        bar.delete();
        assert_eq!(bar.display_text(), "élo");
        assert_eq!(bar.cursor_char_offset(), 0);
        bar.end();
        assert_eq!(bar.cursor_char_offset(), 3);
    }

    #[test]
    fn test_submit_returns_trimmed_input_and_unfocuses() {
        let mut bar = UrlBar::new();
        bar.focus();
        bar.insert_str("  example.com ");
        assert_eq!(bar.submit().as_deref(), Some("example.com"));
        assert!(!bar.is_focused());
    }

    #[test]
    fn test_submit_empty_keeps_focus() {
        let mut bar = UrlBar::new();
        bar.focus();
        assert_eq!(bar.submit(), None);
        assert!(bar.is_focused());
    }

    #[test]
    fn test_unfocus_restores_normalized_url() {
        let mut bar = UrlBar::new();
        bar.set_url("https://xn--ggle-0nd.com");
        bar.focus();
        bar.insert_str("test");
        bar.unfocus();
        assert!(bar.display_text().contains("⚠️"), "{}", bar.display_text());
    }
}
