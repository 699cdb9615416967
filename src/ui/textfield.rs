//! TextField widget - a single-line text input field

use super::layout::Rect;
use super::widget::{mouse_position, EventResult, Widget};
use crate::input::InputEvent;
use crate::screen::Screen;
use crate::ui::theme::Theme;
use std::cell::Cell;

/// A single-line text input with an optional label in front
pub struct TextField {
    text: String,
    label: String,
    /// Cursor position (character index)
    cursor_pos: usize,
    /// Horizontal scroll offset in characters, adjusted while drawing
    scroll_offset: Cell<usize>,
    focused: bool,
}

impl TextField {
    pub fn new() -> Self {
        Self {
            text: String::new(),
            label: String::new(),
            cursor_pos: 0,
            scroll_offset: Cell::new(0),
            focused: false,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.cursor_pos = self.char_len();
    }

    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = label.into();
    }

    /// Take the contents, leaving the field empty
    pub fn take_text(&mut self) -> String {
        self.cursor_pos = 0;
        self.scroll_offset.set(0);
        std::mem::take(&mut self.text)
    }

    pub fn cursor_pos(&self) -> usize {
        self.cursor_pos
    }

    fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    fn byte_index(&self, char_pos: usize) -> usize {
        self.text
            .char_indices()
            .nth(char_pos)
            .map(|(i, _)| i)
            .unwrap_or(self.text.len())
    }

    pub fn insert_char(&mut self, ch: char) {
        let at = self.byte_index(self.cursor_pos);
        self.text.insert(at, ch);
        self.cursor_pos += 1;
    }

    pub fn insert_str(&mut self, s: &str) {
        for ch in s.chars().filter(|c| !c.is_control()) {
            self.insert_char(ch);
        }
    }

    fn backspace(&mut self) {
        if self.cursor_pos > 0 {
            self.cursor_pos -= 1;
            let at = self.byte_index(self.cursor_pos);
            self.text.remove(at);
        }
    }

    fn delete(&mut self) {
        if self.cursor_pos < self.char_len() {
            let at = self.byte_index(self.cursor_pos);
            self.text.remove(at);
        }
    }

    /// Keep the cursor inside a window `visible_width` characters wide
    fn ensure_cursor_visible(&self, visible_width: usize) {
        if visible_width == 0 {
            return;
        }
        // Leave one character at the end for the cursor when at end of text
        let usable_width = visible_width.saturating_sub(1);
        let offset = self.scroll_offset.get();
        if self.cursor_pos < offset {
            self.scroll_offset.set(self.cursor_pos);
        } else if self.cursor_pos > offset + usable_width {
            self.scroll_offset.set(self.cursor_pos - usable_width);
        }
    }

    fn label_width(&self) -> u16 {
        self.label.chars().count() as u16
    }
}

impl Default for TextField {
    fn default() -> Self {
        Self::new()
    }
}

impl Widget for TextField {
    fn draw(&self, screen: &mut Screen, theme: &Theme, bounds: Rect) {
        if bounds.width == 0 || bounds.height == 0 {
            return;
        }
        let row = bounds.y + 1;
        let col = bounds.x + 1;
        let max_col = bounds.x + bounds.width;

        screen.fill(row, col, bounds.width, 1, ' ', theme.text_field_fg, theme.text_field_bg);
        screen.write_clipped(row, col, max_col, &self.label, theme.prompt_label_fg, theme.text_field_bg);

        let text_col = col + self.label_width();
        let visible_width = bounds.width.saturating_sub(self.label_width()) as usize;
        self.ensure_cursor_visible(visible_width);
        let offset = self.scroll_offset.get();

        let visible: String = self.text.chars().skip(offset).take(visible_width).collect();
        screen.write_clipped(row, text_col, max_col, &visible, theme.text_field_fg, theme.text_field_bg);

        if self.focused && visible_width > 0 {
            screen.set_cursor(row, text_col + (self.cursor_pos - offset) as u16);
            screen.set_cursor_visible(true);
        }
    }

    fn handle_event(&mut self, event: &InputEvent, bounds: Rect) -> EventResult {
        if let Some((row, col)) = mouse_position(event) {
            if !bounds.contains(row, col) {
                return EventResult::Ignored;
            }
            if let InputEvent::MouseClick { .. } = event {
                let text_start = bounds.x + 1 + self.label_width();
                let click_offset = col.saturating_sub(text_start) as usize;
                self.cursor_pos = (self.scroll_offset.get() + click_offset).min(self.char_len());
                return EventResult::Consumed;
            }
            return EventResult::Ignored;
        }

        if !self.focused {
            return EventResult::Ignored;
        }

        match event {
            InputEvent::Char(ch) => {
                self.insert_char(*ch);
                EventResult::Changed
            }
            InputEvent::Backspace => {
                self.backspace();
                EventResult::Changed
            }
            InputEvent::Delete => {
                self.delete();
                EventResult::Changed
            }
            InputEvent::CursorLeft => {
                self.cursor_pos = self.cursor_pos.saturating_sub(1);
                EventResult::Consumed
            }
            InputEvent::CursorRight => {
                self.cursor_pos = (self.cursor_pos + 1).min(self.char_len());
                EventResult::Consumed
            }
            InputEvent::Home => {
                self.cursor_pos = 0;
                EventResult::Consumed
            }
            InputEvent::End => {
                self.cursor_pos = self.char_len();
                EventResult::Consumed
            }
            InputEvent::Enter => EventResult::Submit,
            _ => EventResult::Ignored,
        }
    }

    fn has_focus(&self) -> bool {
        self.focused
    }

    fn set_focus(&mut self, focused: bool) {
        self.focused = focused;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn focused() -> TextField {
        let mut field = TextField::new().with_label("> ");
        field.set_focus(true);
        field
    }

    fn bounds() -> Rect {
        Rect::new(0, 0, 20, 1)
    }

    #[test]
    fn test_typing_and_submit() {
        let mut field = focused();
        for ch in "héllo".chars() {
            assert_eq!(field.handle_event(&InputEvent::Char(ch), bounds()), EventResult::Changed);
        }
        field.handle_event(&InputEvent::CursorLeft, bounds());
        field.handle_event(&InputEvent::Backspace, bounds());
        assert_eq!(field.text(), "hélo");
        assert_eq!(field.handle_event(&InputEvent::Enter, bounds()), EventResult::Submit);
        assert_eq!(field.take_text(), "hélo");
        assert_eq!(field.text(), "");
        assert_eq!(field.cursor_pos(), 0);
    }

    #[test]
    fn test_unfocused_ignores_keys() {
        let mut field = TextField::new();
        assert_eq!(field.handle_event(&InputEvent::Char('a'), bounds()), EventResult::Ignored);
        assert_eq!(field.text(), "");
    }

    #[test]
    fn test_click_places_cursor_after_label() {
        let mut field = focused();
        field.set_text("abcdef");
        // label "> " occupies columns 1-2, text starts at column 3
        field.handle_event(&InputEvent::MouseClick { row: 1, col: 5 }, bounds());
        assert_eq!(field.cursor_pos(), 2);
    }

    #[test]
    fn test_draw_scrolls_to_cursor() {
        let theme = Theme::light();
        let mut screen = Screen::new(6, 1);
        let mut field = focused();
        field.set_text("abcdefgh");
        field.draw(&mut screen, &theme, Rect::new(0, 0, 6, 1));
        // four text columns: the last three characters and the cursor cell
        assert_eq!(screen.get(1, 3).map(|c| c.ch), Some('f'));
        assert_eq!(screen.get(1, 5).map(|c| c.ch), Some('h'));
        assert_eq!(screen.get(1, 6).map(|c| c.ch), Some(' '));
    }
}
