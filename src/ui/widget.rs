//! Widget trait and event results for UI components

use super::layout::Rect;
use crate::input::InputEvent;
use crate::screen::Screen;
use crate::ui::theme::Theme;

/// Result of handling an event
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EventResult {
    /// Event was handled, stop propagation
    Consumed,
    /// Event was not handled, continue propagation
    Ignored,
    /// Text content changed
    Changed,
    /// Enter pressed
    Submit,
}

/// Common interface for focusable UI widgets
pub trait Widget {
    /// Draw the widget within `bounds`
    fn draw(&self, screen: &mut Screen, theme: &Theme, bounds: Rect);

    /// Handle an input event. Mouse events outside `bounds` are ignored.
    fn handle_event(&mut self, event: &InputEvent, bounds: Rect) -> EventResult;

    fn has_focus(&self) -> bool {
        false
    }

    fn set_focus(&mut self, _focused: bool) {}
}

/// Extract mouse position from an event
pub fn mouse_position(event: &InputEvent) -> Option<(u16, u16)> {
    match event {
        InputEvent::MouseClick { row, col }
        | InputEvent::ScrollUp { row, col }
        | InputEvent::ScrollDown { row, col } => Some((*row, *col)),
        _ => None,
    }
}
