//! Editor pane: line-number gutter and highlighted document text

use super::layout::Rect;
use crate::document::{Cursor, SourceDocument};
use crate::highlight::HighlightApplier;
use crate::screen::Screen;
use crate::ui::theme::Theme;

/// Scroll position of the editor pane. The document owns the text and cursor.
#[derive(Debug, Default)]
pub struct EditorView {
    pub scroll_row: usize,
    pub scroll_col: usize,
}

impl EditorView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Gutter width for a document of `line_count` lines
    pub fn gutter_width(line_count: usize) -> u16 {
        let digits = line_count.max(1).to_string().len() as u16;
        digits.max(3) + 2
    }

    /// Adjust scroll position to keep cursor visible
    pub fn ensure_cursor_visible(&mut self, cursor: Cursor, visible_lines: usize, visible_cols: usize) {
        if cursor.line < self.scroll_row {
            self.scroll_row = cursor.line;
        } else if visible_lines > 0 && cursor.line >= self.scroll_row + visible_lines {
            self.scroll_row = cursor.line + 1 - visible_lines;
        }

        if cursor.col < self.scroll_col {
            self.scroll_col = cursor.col;
        } else if visible_cols > 0 && cursor.col >= self.scroll_col + visible_cols {
            self.scroll_col = cursor.col + 1 - visible_cols;
        }
    }

    pub fn scroll_by(&mut self, delta: isize, line_count: usize) {
        let max = line_count.saturating_sub(1);
        self.scroll_row = self.scroll_row.saturating_add_signed(delta).min(max);
    }

    /// Visible text area of `bounds` once the gutter is taken off
    pub fn text_area(bounds: Rect, line_count: usize) -> Rect {
        let gutter = Self::gutter_width(line_count).min(bounds.width);
        Rect::new(bounds.x + gutter, bounds.y, bounds.width - gutter, bounds.height)
    }

    /// Document position under a 1-based screen position
    pub fn position_at(&self, row: u16, col: u16, bounds: Rect, doc: &SourceDocument) -> Option<(usize, usize)> {
        let area = Self::text_area(bounds, doc.line_count());
        if !bounds.contains(row, col) {
            return None;
        }
        let line = self.scroll_row + (row - 1 - bounds.y) as usize;
        let col = self.scroll_col + (col.saturating_sub(1 + area.x)) as usize;
        Some((line, col))
    }

    pub fn draw(
        &self,
        screen: &mut Screen,
        theme: &Theme,
        doc: &SourceDocument,
        highlight: &HighlightApplier,
        bounds: Rect,
        focused: bool,
    ) {
        if bounds.width == 0 || bounds.height == 0 {
            return;
        }
        let row = bounds.y + 1; // Convert 0-based to 1-based
        let col = bounds.x + 1;
        let gutter = Self::gutter_width(doc.line_count()).min(bounds.width);
        let area = Self::text_area(bounds, doc.line_count());

        screen.fill(row, col, gutter, bounds.height, ' ', theme.line_number_fg, theme.line_number_bg);
        screen.fill(row, col + gutter, area.width, bounds.height, ' ', theme.editor_fg, theme.editor_bg);

        let offsets = doc.line_offsets();
        for r in 0..bounds.height as usize {
            let line_num = self.scroll_row + r;
            let Some(line) = doc.line(line_num) else {
                break;
            };
            let screen_row = row + r as u16;

            let number = format!(" {:>width$} ", line_num + 1, width = gutter.saturating_sub(2) as usize);
            screen.write_clipped(screen_row, col, col + gutter - 1, &number, theme.line_number_fg, theme.line_number_bg);

            let line_start = offsets[line_num];
            for (x, (byte, ch)) in line.char_indices().enumerate().skip(self.scroll_col) {
                let screen_x = x - self.scroll_col;
                if screen_x >= area.width as usize {
                    break;
                }
                let fg = highlight.color_at(line_start + byte).unwrap_or(theme.editor_fg);
                let ch = if ch == '\t' { ' ' } else { ch };
                screen.set(screen_row, col + gutter + screen_x as u16, ch, fg, theme.editor_bg);
            }
        }

        if focused {
            let cursor = doc.cursor();
            if cursor.line >= self.scroll_row && cursor.col >= self.scroll_col {
                let r = cursor.line - self.scroll_row;
                let c = cursor.col - self.scroll_col;
                if r < bounds.height as usize && c < area.width as usize {
                    screen.set_cursor(row + r as u16, col + gutter + c as u16);
                    screen.set_cursor_visible(true);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gutter_width_grows_with_digits() {
        assert_eq!(EditorView::gutter_width(1), 5);
        assert_eq!(EditorView::gutter_width(999), 5);
        assert_eq!(EditorView::gutter_width(1000), 6);
    }

    #[test]
    fn test_scroll_follows_cursor() {
        let mut view = EditorView::new();
        view.ensure_cursor_visible(Cursor::new(30, 0), 10, 40);
        assert_eq!(view.scroll_row, 21);
        view.ensure_cursor_visible(Cursor::new(5, 50), 10, 40);
        assert_eq!(view.scroll_row, 5);
        assert_eq!(view.scroll_col, 11);
    }

    #[test]
    fn test_draw_uses_highlight_colours() {
        let theme = Theme::light();
        let doc = SourceDocument::from_text("x = 1\nprint(x)");
        let mut highlight = HighlightApplier::new();
        highlight.refresh(doc.revision(), &doc.text(), &theme.syntax);

        let mut screen = Screen::new(20, 3);
        let view = EditorView::new();
        view.draw(&mut screen, &theme, &doc, &highlight, Rect::new(0, 0, 20, 3), true);

        // gutter is five columns wide, text starts at column 6
        assert_eq!(screen.get(1, 4).map(|c| c.ch), Some('1'));
        let x = screen.get(1, 6).expect("Should have cell");
        assert_eq!((x.ch, x.fg), ('x', theme.editor_fg));
        let one = screen.get(1, 10).expect("Should have cell");
        assert_eq!((one.ch, one.fg), ('1', theme.syntax.number));
        let p = screen.get(2, 6).expect("Should have cell");
        assert_eq!((p.ch, p.fg), ('p', theme.syntax.builtin));
    }

    #[test]
    fn test_position_at_maps_click_to_document() {
        let doc = SourceDocument::from_text("abc\ndef");
        let view = EditorView::new();
        let bounds = Rect::new(0, 0, 20, 5);
        assert_eq!(view.position_at(2, 8, bounds, &doc), Some((1, 2)));
        assert_eq!(view.position_at(9, 8, bounds, &doc), None);
    }
}
