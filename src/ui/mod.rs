//! UI components for the editor shell

pub mod console;
pub mod editor;
pub mod help;
pub mod layout;
pub mod statusbar;
pub mod textfield;
pub mod theme;
pub mod widget;

pub use console::ConsolePane;
pub use editor::EditorView;
pub use help::HelpView;
pub use layout::{compute_layout, main_screen_layout, Rect};
pub use statusbar::StatusBar;
pub use textfield::TextField;
pub use theme::Theme;
pub use widget::{EventResult, Widget};
