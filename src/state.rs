//! Application state management

use crate::ui::layout::ComputedLayout;
use clap::ValueEnum;

/// Which component receives key presses
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Focus {
    Editor,
    ConsoleInput,
    Prompt,
}

/// Colour scheme
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, ValueEnum)]
pub enum ThemeKind {
    #[default]
    Light,
    Dark,
}

impl ThemeKind {
    pub fn toggled(self) -> Self {
        match self {
            ThemeKind::Light => ThemeKind::Dark,
            ThemeKind::Dark => ThemeKind::Light,
        }
    }
}

/// What the one-line prompt at the bottom is asking for
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PromptKind {
    /// Path to save under; run the script afterwards if `run_after`
    SaveAs { run_after: bool },
    /// Path of a file to open
    Open,
}

impl PromptKind {
    pub fn label(self) -> &'static str {
        match self {
            PromptKind::SaveAs { .. } => "Save as: ",
            PromptKind::Open => "Open: ",
        }
    }
}

/// Action that discards unsaved changes, waiting for a second key press
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ArmedAction {
    Quit,
    New,
    Open,
}

/// Main application state
pub struct AppState {
    pub focus: Focus,

    /// Focus to return to when the prompt closes
    pub focus_before_prompt: Focus,

    pub theme: ThemeKind,

    /// Active path prompt, if any
    pub prompt: Option<PromptKind>,

    /// Spaces added after a line ending in `{`
    pub indent_step: usize,

    /// Console pane height in lines
    pub console_height: u16,

    /// Main screen layout (editor, console, console_input, status_bar)
    pub main_layout: Option<ComputedLayout>,

    pub status_message: Option<String>,

    pub should_quit: bool,

    /// Discarding action pressed once with unsaved changes
    pub armed: Option<ArmedAction>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            focus: Focus::Editor,
            focus_before_prompt: Focus::Editor,
            theme: ThemeKind::default(),
            prompt: None,
            indent_step: 4,
            console_height: 8,
            main_layout: None,
            status_message: None,
            should_quit: false,
            armed: None,
        }
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = Some(msg.into());
    }

    pub fn clear_status(&mut self) {
        self.status_message = None;
    }

    /// Toggle between editor and console input
    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Editor => Focus::ConsoleInput,
            Focus::ConsoleInput | Focus::Prompt => Focus::Editor,
        };
    }

    pub fn open_prompt(&mut self, kind: PromptKind) {
        if self.prompt.is_none() {
            self.focus_before_prompt = self.focus;
        }
        self.prompt = Some(kind);
        self.focus = Focus::Prompt;
    }

    /// Close the prompt, returning what it was for
    pub fn close_prompt(&mut self) -> Option<PromptKind> {
        let kind = self.prompt.take();
        if kind.is_some() {
            self.focus = self.focus_before_prompt;
        }
        kind
    }

    /// True if `action` was already armed; otherwise arms it
    pub fn confirm(&mut self, action: ArmedAction) -> bool {
        if self.armed == Some(action) {
            self.armed = None;
            true
        } else {
            self.armed = Some(action);
            false
        }
    }

    pub fn toggle_theme(&mut self) {
        self.theme = self.theme.toggled();
    }
}
