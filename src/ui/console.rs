//! Console pane: program output and echoed input

use super::layout::Rect;
use crate::console::{ConsoleSink, Origin};
use crate::screen::Screen;
use crate::session::SessionState;
use crate::ui::theme::Theme;

/// The console pane (stateless, scroll lives in the sink)
pub struct ConsolePane;

impl ConsolePane {
    /// Title line above the pane, showing the session state
    pub fn draw_title(screen: &mut Screen, theme: &Theme, state: SessionState, scroll: usize, bounds: Rect) {
        if bounds.width == 0 || bounds.height == 0 {
            return;
        }
        let row = bounds.y + 1;
        let col = bounds.x + 1;
        screen.fill(row, col, bounds.width, 1, '─', theme.console_title_fg, theme.console_title_bg);

        let status = match state {
            SessionState::Idle => "",
            SessionState::Running => " running ",
            SessionState::WaitingForInput => " waiting for input ",
            SessionState::Stopped => " stopped ",
            SessionState::Finished => " finished ",
        };
        let mut title = format!(" Console{}", status);
        if scroll > 0 {
            title.push_str(&format!("[-{}] ", scroll));
        }
        screen.write_clipped(row, col + 1, bounds.x + bounds.width, &title, theme.console_title_fg, theme.console_title_bg);
    }

    pub fn draw(screen: &mut Screen, theme: &Theme, console: &ConsoleSink, bounds: Rect) {
        if bounds.width == 0 || bounds.height == 0 {
            return;
        }
        let row = bounds.y + 1;
        let col = bounds.x + 1;
        let max_col = bounds.x + bounds.width;
        screen.fill(row, col, bounds.width, bounds.height, ' ', theme.console_fg, theme.console_bg);

        for (r, entry) in console.visible(bounds.height as usize).iter().enumerate() {
            let fg = match entry.origin {
                Origin::ProgramOutput => theme.console_fg,
                Origin::UserEcho => theme.console_input_fg,
            };
            // Embedded newlines from print("a\nb") are shown as spaces
            let text: String = entry.text.chars().map(|c| if c.is_control() { ' ' } else { c }).collect();
            screen.write_clipped(row + r as u16, col, max_col, &text, fg, theme.console_bg);
        }
    }
}
