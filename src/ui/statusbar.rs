//! Status bar at the bottom of the screen

use super::layout::Rect;
use crate::screen::Screen;
use crate::state::AppState;
use crate::ui::theme::Theme;

/// Stateless status bar
pub struct StatusBar;

impl StatusBar {
    /// Status message on the left; file name, dirty marker and position on the right
    pub fn draw(
        screen: &mut Screen,
        theme: &Theme,
        state: &AppState,
        file_name: &str,
        dirty: bool,
        cursor_line: usize,
        cursor_col: usize,
        bounds: Rect,
    ) {
        if bounds.width == 0 || bounds.height == 0 {
            return;
        }
        let row = bounds.y + 1;
        let col = bounds.x + 1;
        let width = bounds.width;

        screen.fill(row, col, width, 1, ' ', theme.statusbar_fg, theme.statusbar_bg);

        let left = match &state.status_message {
            Some(msg) => format!(" {}", msg),
            None => " F1 Help  F5 Run  F6 Stop  Tab Console  ^S Save  ^O Open  ^T Theme  ^Q Quit".to_string(),
        };

        let marker = if dirty { "*" } else { "" };
        let right = format!("{}{}  Ln {}, Col {} ", file_name, marker, cursor_line + 1, cursor_col + 1);
        let right_len = right.chars().count() as u16;
        let right_x = col + width.saturating_sub(right_len);

        screen.write_clipped(row, col, right_x.saturating_sub(2), &left, theme.statusbar_fg, theme.statusbar_bg);
        screen.write_clipped(row, right_x, bounds.x + width, &right, theme.statusbar_fg, theme.statusbar_bg);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row_text(screen: &Screen, width: u16) -> String {
        (1..=width).filter_map(|c| screen.get(1, c)).map(|c| c.ch).collect()
    }

    #[test]
    fn test_shows_message_and_position() {
        let theme = Theme::light();
        let mut state = AppState::new();
        state.set_status("Saved demo.cmm");
        let mut screen = Screen::new(60, 1);
        StatusBar::draw(&mut screen, &theme, &state, "demo.cmm", true, 2, 4, Rect::new(0, 0, 60, 1));
        let text = row_text(&screen, 60);
        assert!(text.starts_with(" Saved demo.cmm"));
        assert!(text.ends_with("demo.cmm*  Ln 3, Col 5 "));
    }
}
