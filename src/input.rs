//! Input handling and key event processing

use crate::terminal::{Key, MouseButton, MouseEvent};

/// Processed input events for the application
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InputEvent {
    MouseClick { row: u16, col: u16 },
    ScrollUp { row: u16, col: u16 },
    ScrollDown { row: u16, col: u16 },
    /// Regular character input
    Char(char),
    /// Navigation keys
    CursorUp,
    CursorDown,
    CursorLeft,
    CursorRight,
    Home,
    End,
    PageUp,
    PageDown,
    CtrlHome,
    CtrlEnd,
    /// Editing keys
    Enter,
    Backspace,
    Delete,
    Tab,
    ShiftTab,
    Escape,
    F1, // Syntax help
    F5, // Run
    F6, // Stop
    CtrlC, // Copy line
    CtrlV, // Paste
    CtrlX, // Cut line
    CtrlS, // Save
    CtrlO, // Open
    CtrlN, // New
    CtrlL, // Clear console
    CtrlT, // Toggle theme
    CtrlZ, // Undo
    CtrlY, // Redo
    CtrlQ, // Quit
    Unknown,
}

impl From<Key> for InputEvent {
    fn from(key: Key) -> Self {
        match key {
            Key::Char(c) => InputEvent::Char(c),
            Key::Enter => InputEvent::Enter,
            Key::Escape => InputEvent::Escape,
            Key::Backspace => InputEvent::Backspace,
            Key::Delete => InputEvent::Delete,
            Key::Tab => InputEvent::Tab,
            Key::ShiftTab => InputEvent::ShiftTab,
            Key::Up => InputEvent::CursorUp,
            Key::Down => InputEvent::CursorDown,
            Key::Left => InputEvent::CursorLeft,
            Key::Right => InputEvent::CursorRight,
            Key::Home => InputEvent::Home,
            Key::End => InputEvent::End,
            Key::PageUp => InputEvent::PageUp,
            Key::PageDown => InputEvent::PageDown,
            Key::CtrlHome => InputEvent::CtrlHome,
            Key::CtrlEnd => InputEvent::CtrlEnd,
            Key::F(1) => InputEvent::F1,
            Key::F(5) => InputEvent::F5,
            Key::F(6) => InputEvent::F6,
            Key::Ctrl('c') => InputEvent::CtrlC,
            Key::Ctrl('v') => InputEvent::CtrlV,
            Key::Ctrl('x') => InputEvent::CtrlX,
            Key::Ctrl('s') => InputEvent::CtrlS,
            Key::Ctrl('o') => InputEvent::CtrlO,
            Key::Ctrl('n') => InputEvent::CtrlN,
            Key::Ctrl('l') => InputEvent::CtrlL,
            Key::Ctrl('t') => InputEvent::CtrlT,
            Key::Ctrl('z') => InputEvent::CtrlZ,
            Key::Ctrl('y') => InputEvent::CtrlY,
            Key::Ctrl('q') => InputEvent::CtrlQ,
            Key::Mouse(MouseEvent { button: MouseButton::Left, row, col, pressed: true }) => {
                InputEvent::MouseClick { row, col }
            }
            Key::Mouse(MouseEvent { button: MouseButton::WheelUp, row, col, .. }) => {
                InputEvent::ScrollUp { row, col }
            }
            Key::Mouse(MouseEvent { button: MouseButton::WheelDown, row, col, .. }) => {
                InputEvent::ScrollDown { row, col }
            }
            _ => InputEvent::Unknown,
        }
    }
}
