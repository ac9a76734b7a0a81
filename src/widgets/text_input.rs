use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::Widget,
};
use tui_textarea::{CursorMove, Input, Key, TextArea};

use crate::cache::CacheManager;
use crate::config::Theme;

use super::text_input_common::{add_to_history, load_history_impl, save_history_impl};

/// Event emitted by TextInput widget
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextInputEvent {
    None,
    Changed,
    Submit,
    Cancel,
    HistoryChanged,
}

/// Single-line text input wrapping tui-textarea, with optional per-field history
pub struct TextInput {
    textarea: TextArea<'static>,
    value: String,
    placeholder: Option<String>,
    pub history_id: Option<String>,
    pub history: Vec<String>,
    history_index: Option<usize>,
    history_temp: Option<String>,
    pub history_limit: usize,
    history_loaded: bool,
    text_color: Option<Color>,
    placeholder_color: Option<Color>,
    cursor_focused: Option<Color>,
    focused: bool,
}

impl TextInput {
    pub fn new() -> Self {
        let mut widget = Self {
            textarea: TextArea::default(),
            value: String::new(),
            placeholder: None,
            history_id: None,
            history: Vec::new(),
            history_index: None,
            history_temp: None,
            history_limit: 1000,
            history_loaded: false,
            text_color: None,
            placeholder_color: None,
            cursor_focused: None,
            focused: false,
        };
        widget.apply_style();
        widget
    }

    /// Re-apply colours, placeholder and cursor style (a fresh TextArea loses them)
    fn apply_style(&mut self) {
        let mut style = Style::default();
        if let Some(color) = self.text_color {
            style = style.fg(color);
        }
        self.textarea.set_style(style);
        self.textarea.set_cursor_line_style(Style::default());
        if let Some(ref placeholder) = self.placeholder {
            self.textarea.set_placeholder_text(placeholder.clone());
            if let Some(color) = self.placeholder_color {
                self.textarea
                    .set_placeholder_style(Style::default().fg(color));
            }
        }
        self.set_focused(self.focused);
    }

    fn sync_from_textarea(&mut self) {
        self.value = self.textarea.lines().first().cloned().unwrap_or_default();
    }

    fn sync_to_textarea(&mut self) {
        let single_line = self.value.replace(['\n', '\r'], " ");
        let end = single_line.chars().count();
        self.textarea = TextArea::new(vec![single_line]);
        self.apply_style();
        self.textarea
            .move_cursor(CursorMove::Jump(0, end.min(u16::MAX as usize) as u16));
    }

    /// Text colour, placeholder colour and cursor colour from the theme
    pub fn with_theme(mut self, theme: &Theme) -> Self {
        self.text_color = Some(theme.get("text_primary"));
        self.placeholder_color = Some(theme.get("text_secondary"));
        self.cursor_focused = Some(theme.get("cursor_focused"));
        self.apply_style();
        self
    }

    pub fn with_placeholder(mut self, placeholder: &str) -> Self {
        self.placeholder = Some(placeholder.to_string());
        self.apply_style();
        self
    }

    pub fn with_history(mut self, history_id: &str) -> Self {
        self.history_id = Some(history_id.to_string());
        self
    }

    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    /// Show the cursor only while focused. "default" cursor colour means REVERSED.
    pub fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
        let cursor_style = if !focused {
            // Same style as the text hides the cursor
            self.textarea.style()
        } else {
            match self.cursor_focused.unwrap_or(Color::Reset) {
                Color::Reset => Style::default().add_modifier(Modifier::REVERSED),
                color => Style::default().bg(color).fg(Color::Black),
            }
        };
        self.textarea.set_cursor_style(cursor_style);
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn set_value(&mut self, value: String) {
        self.value = value;
        self.sync_to_textarea();
    }

    pub fn clear(&mut self) {
        self.value.clear();
        self.history_index = None;
        self.history_temp = None;
        self.sync_to_textarea();
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    /// Load history from cache once
    pub fn load_history(&mut self, cache: &CacheManager) -> Result<()> {
        if self.history_loaded {
            return Ok(());
        }
        if let Some(ref history_id) = self.history_id {
            self.history = load_history_impl(cache, history_id)?;
            self.history_loaded = true;
        }
        Ok(())
    }

    /// Record the current value in history and persist it
    pub fn save_to_history(&mut self, cache: &CacheManager) -> Result<()> {
        let Some(history_id) = self.history_id.clone() else {
            return Ok(());
        };
        if self.value.trim().is_empty() {
            return Ok(());
        }
        self.load_history(cache)?;
        add_to_history(&mut self.history, self.value.clone());
        save_history_impl(cache, &history_id, &self.history, self.history_limit)
    }

    /// Step to an older history entry
    pub fn navigate_history_up(&mut self, cache: Option<&CacheManager>) {
        if self.history_id.is_none() {
            return;
        }
        if let Some(cache) = cache {
            if let Err(e) = self.load_history(cache) {
                tracing::warn!("could not load input history: {}", e);
                return;
            }
        }
        if self.history.is_empty() {
            return;
        }

        let new_index = match self.history_index {
            Some(idx) => idx.saturating_sub(1),
            None => {
                self.history_temp = Some(self.value.clone());
                self.history.len() - 1
            }
        };
        self.history_index = Some(new_index);
        if let Some(entry) = self.history.get(new_index) {
            self.value = entry.clone();
            self.sync_to_textarea();
        }
    }

    /// Step to a newer history entry, restoring the edited value past the newest
    pub fn navigate_history_down(&mut self) {
        let Some(idx) = self.history_index else {
            return;
        };
        if idx + 1 >= self.history.len() {
            self.value = self.history_temp.take().unwrap_or_default();
            self.history_index = None;
        } else {
            self.history_index = Some(idx + 1);
            self.value = self.history[idx + 1].clone();
        }
        self.sync_to_textarea();
    }

    pub fn handle_key(&mut self, event: &KeyEvent, cache: Option<&CacheManager>) -> TextInputEvent {
        match event.code {
            KeyCode::Enter => return TextInputEvent::Submit,
            KeyCode::Esc => return TextInputEvent::Cancel,
            KeyCode::Up if self.history_id.is_some() => {
                self.navigate_history_up(cache);
                return TextInputEvent::HistoryChanged;
            }
            KeyCode::Down if self.history_id.is_some() => {
                self.navigate_history_down();
                return TextInputEvent::HistoryChanged;
            }
            _ => {}
        }

        let input = key_event_to_input(event);
        if matches!(input.key, Key::Null | Key::Enter | Key::Tab) {
            return TextInputEvent::None;
        }
        let before = self.value.clone();
        self.textarea.input(input);
        self.sync_from_textarea();
        if self.value == before {
            return TextInputEvent::None;
        }
        self.history_index = None;
        self.history_temp = None;
        TextInputEvent::Changed
    }
}

/// Convert a crossterm key event to tui-textarea input
fn key_event_to_input(event: &KeyEvent) -> Input {
    let key = match event.code {
        KeyCode::Char(c) => Key::Char(c),
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Delete => Key::Delete,
        KeyCode::Left => Key::Left,
        KeyCode::Right => Key::Right,
        KeyCode::Home => Key::Home,
        KeyCode::End => Key::End,
        KeyCode::Enter => Key::Enter,
        KeyCode::Tab | KeyCode::BackTab => Key::Tab,
        _ => Key::Null,
    };

    Input {
        key,
        ctrl: event.modifiers.contains(KeyModifiers::CONTROL),
        alt: event.modifiers.contains(KeyModifiers::ALT),
        shift: event.modifiers.contains(KeyModifiers::SHIFT),
    }
}

impl Default for TextInput {
    fn default() -> Self {
        Self::new()
    }
}

impl Widget for &TextInput {
    fn render(self, area: Rect, buf: &mut ratatui::buffer::Buffer) {
        self.textarea.render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_str(input: &mut TextInput, s: &str) {
        for c in s.chars() {
            input.handle_key(&key(KeyCode::Char(c)), None);
        }
    }

    #[test]
    fn test_typing_updates_value() {
        let mut input = TextInput::new();
        assert!(input.is_empty());
        type_str(&mut input, "0.25");
        assert_eq!(input.value(), "0.25");
        assert_eq!(
            input.handle_key(&key(KeyCode::Backspace), None),
            TextInputEvent::Changed
        );
        assert_eq!(input.value(), "0.2");
    }

    #[test]
    fn test_enter_submits_without_newline() {
        let mut input = TextInput::new();
        type_str(&mut input, "3");
        assert_eq!(
            input.handle_key(&key(KeyCode::Enter), None),
            TextInputEvent::Submit
        );
        assert_eq!(input.value(), "3");
    }

    #[test]
    fn test_clear_and_set_value() {
        let mut input = TextInput::new();
        input.set_value("10".to_string());
        assert_eq!(input.value(), "10");
        input.clear();
        assert!(input.is_empty());
    }

    #[test]
    fn test_history_navigation() {
        let dir = tempfile::tempdir().unwrap();
        let cache = CacheManager::with_dir(dir.path().to_path_buf());
        let mut input = TextInput::new().with_history("lambda");

        for v in ["1", "2"] {
            input.set_value(v.to_string());
            input.save_to_history(&cache).unwrap();
        }
        input.set_value("draft".to_string());

        input.handle_key(&key(KeyCode::Up), Some(&cache));
        assert_eq!(input.value(), "2");
        input.handle_key(&key(KeyCode::Up), Some(&cache));
        assert_eq!(input.value(), "1");
        input.handle_key(&key(KeyCode::Up), Some(&cache));
        assert_eq!(input.value(), "1");
        input.handle_key(&key(KeyCode::Down), Some(&cache));
        input.handle_key(&key(KeyCode::Down), Some(&cache));
        assert_eq!(input.value(), "draft");
    }

    #[test]
    fn test_blank_value_not_saved() {
        let dir = tempfile::tempdir().unwrap();
        let cache = CacheManager::with_dir(dir.path().to_path_buf());
        let mut input = TextInput::new().with_history("n");
        input.set_value("  ".to_string());
        input.save_to_history(&cache).unwrap();
        assert!(input.history.is_empty());
    }
}
