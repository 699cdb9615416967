//! Main application: event loop, key bindings and drawing

use crate::document::SourceDocument;
use crate::highlight::HighlightApplier;
use crate::input::InputEvent;
use crate::screen::Screen;
use crate::session::{ExecutionSession, RunError, SessionState};
use crate::state::{AppState, ArmedAction, Focus, PromptKind, ThemeKind};
use crate::terminal::Terminal;
use crate::ui::layout::ComputedLayout;
use crate::ui::{
    compute_layout, main_screen_layout, ConsolePane, EditorView, EventResult, HelpView, Rect, StatusBar, TextField,
    Theme, Widget,
};
use std::io;
use std::path::PathBuf;
use std::time::Duration;

/// Lines moved per mouse wheel step
const WHEEL_STEP: usize = 3;

pub struct App {
    screen: Screen,
    state: AppState,
    theme: Theme,
    document: SourceDocument,
    view: EditorView,
    help: HelpView,
    highlight: HighlightApplier,
    session: ExecutionSession,
    console_field: TextField,
    prompt_field: TextField,
    clipboard: Option<arboard::Clipboard>,
}

impl App {
    pub fn new(document: SourceDocument, theme: ThemeKind, size: (u16, u16)) -> Self {
        let mut state = AppState::new();
        state.theme = theme;
        Self {
            screen: Screen::new(size.0, size.1),
            state,
            theme: Theme::for_kind(theme),
            document,
            view: EditorView::new(),
            help: HelpView::new(),
            highlight: HighlightApplier::new(),
            session: ExecutionSession::new(),
            console_field: TextField::new().with_label("  "),
            prompt_field: TextField::new(),
            clipboard: None,
        }
    }

    pub fn with_clipboard(mut self, clipboard: Option<arboard::Clipboard>) -> Self {
        self.clipboard = clipboard;
        self
    }

    pub fn run(&mut self, terminal: &mut Terminal) -> io::Result<()> {
        loop {
            terminal.update_size();
            let (width, height) = terminal.size();
            if (width, height) != self.screen.size() {
                self.screen.resize(width, height);
                self.screen.invalidate();
            }

            self.draw();
            self.screen.flush(terminal)?;

            // Handle all available input before the next draw
            let mut had_input = false;
            while let Some(key) = terminal.read_key()? {
                had_input = true;
                self.handle_input(InputEvent::from(key));
                if self.state.should_quit {
                    break;
                }
            }

            if self.state.should_quit {
                break;
            }

            if self.session.state() == SessionState::Running {
                self.pump_session();
            } else if !had_input {
                // Nothing to do - sleep briefly to avoid 100% CPU
                std::thread::sleep(Duration::from_millis(10));
            }
        }
        tracing::info!("editor closed");
        Ok(())
    }

    // ---- drawing ----

    fn layout(&self) -> ComputedLayout {
        let (width, height) = self.screen.size();
        compute_layout(&main_screen_layout(self.state.console_height), Rect::new(0, 0, width, height))
    }

    fn sync_widget_focus(&mut self) {
        self.console_field.set_focus(self.state.focus == Focus::ConsoleInput);
        self.prompt_field.set_focus(self.state.focus == Focus::Prompt);
    }

    pub fn draw(&mut self) {
        self.sync_widget_focus();
        self.highlight
            .refresh(self.document.revision(), &self.document.text(), &self.theme.syntax);

        let layout = self.layout();
        self.screen.clear_with(self.theme.editor_fg, self.theme.editor_bg);
        self.screen.set_cursor_visible(false);

        self.view.draw(
            &mut self.screen,
            &self.theme,
            &self.document,
            &self.highlight,
            layout.get("editor"),
            self.state.focus == Focus::Editor && !self.help.is_open(),
        );
        self.help.draw(&mut self.screen, &self.theme, layout.get("editor"));

        let console = self.session.console();
        ConsolePane::draw_title(
            &mut self.screen,
            &self.theme,
            self.session.state(),
            console.scroll(),
            layout.get("console_title"),
        );
        ConsolePane::draw(&mut self.screen, &self.theme, console, layout.get("console"));

        if let Some(kind) = self.state.prompt {
            self.prompt_field.set_label(kind.label());
            self.prompt_field.draw(&mut self.screen, &self.theme, layout.get("console_input"));
        } else {
            let label = if self.session.state() == SessionState::WaitingForInput { "> " } else { "  " };
            self.console_field.set_label(label);
            self.console_field.draw(&mut self.screen, &self.theme, layout.get("console_input"));
        }

        let cursor = self.document.cursor();
        StatusBar::draw(
            &mut self.screen,
            &self.theme,
            &self.state,
            &self.document.display_name(),
            self.document.is_dirty(),
            cursor.line,
            cursor.col,
            layout.get("status_bar"),
        );

        self.state.main_layout = Some(layout);
    }

    /// Lines and columns of the editor text area
    fn editor_viewport(&self) -> (usize, usize) {
        let layout = match &self.state.main_layout {
            Some(layout) => layout.clone(),
            None => self.layout(),
        };
        let bounds = layout.get("editor");
        let area = EditorView::text_area(bounds, self.document.line_count());
        (bounds.height as usize, area.width as usize)
    }

    // ---- input ----

    pub fn handle_input(&mut self, event: InputEvent) {
        self.sync_widget_focus();
        if event != InputEvent::CtrlQ && event != InputEvent::CtrlN && event != InputEvent::CtrlO {
            self.state.armed = None;
        }

        if self.help.is_open() {
            let bounds = self.layout().get("editor");
            self.help.handle_event(&event, bounds);
            return;
        }

        match event {
            InputEvent::MouseClick { row, col } => return self.handle_click(row, col),
            InputEvent::ScrollUp { row, col } => return self.handle_scroll(row, col, true),
            InputEvent::ScrollDown { row, col } => return self.handle_scroll(row, col, false),
            InputEvent::Unknown => return,
            _ => {}
        }

        if self.state.focus == Focus::Prompt {
            self.handle_prompt_key(event);
            return;
        }

        match event {
            InputEvent::F1 => self.help.open(),
            InputEvent::F5 => self.run_script(),
            InputEvent::F6 => self.stop_script(),
            InputEvent::Tab => self.state.toggle_focus(),
            InputEvent::CtrlS => self.save(),
            InputEvent::CtrlO => self.request_open(),
            InputEvent::CtrlN => self.new_document(),
            InputEvent::CtrlL => {
                self.session.console_mut().clear();
                self.state.set_status("Console cleared");
            }
            InputEvent::CtrlT => self.toggle_theme(),
            InputEvent::CtrlQ => self.quit(),
            event => match self.state.focus {
                Focus::Editor => self.handle_editor_key(event),
                Focus::ConsoleInput => self.handle_console_key(event),
                Focus::Prompt => {}
            },
        }
    }

    fn handle_editor_key(&mut self, event: InputEvent) {
        let (visible_lines, visible_cols) = self.editor_viewport();
        let page = visible_lines.max(1);
        self.state.clear_status();
        let doc = &mut self.document;

        match event {
            InputEvent::Char(ch) => doc.insert_char(ch),
            InputEvent::Enter => doc.newline(self.state.indent_step),
            InputEvent::Backspace => doc.backspace(),
            InputEvent::Delete => doc.delete(),
            InputEvent::CursorLeft => doc.move_left(),
            InputEvent::CursorRight => doc.move_right(),
            InputEvent::CursorUp => doc.move_up(1),
            InputEvent::CursorDown => doc.move_down(1),
            InputEvent::Home => doc.move_home(),
            InputEvent::End => doc.move_end(),
            InputEvent::PageUp => doc.move_up(page),
            InputEvent::PageDown => doc.move_down(page),
            InputEvent::CtrlHome => doc.set_cursor(0, 0),
            InputEvent::CtrlEnd => doc.set_cursor(usize::MAX, usize::MAX),
            InputEvent::CtrlZ => {
                if !doc.undo() {
                    self.state.set_status("Nothing to undo");
                }
            }
            InputEvent::CtrlY => {
                if !doc.redo() {
                    self.state.set_status("Nothing to redo");
                }
            }
            InputEvent::CtrlC => self.clipboard_copy(),
            InputEvent::CtrlX => self.clipboard_cut(),
            InputEvent::CtrlV => self.clipboard_paste(),
            _ => return,
        }
        self.view
            .ensure_cursor_visible(self.document.cursor(), visible_lines, visible_cols);
    }

    fn handle_console_key(&mut self, event: InputEvent) {
        match event {
            InputEvent::PageUp => {
                let page = self.state.console_height.max(1) as usize;
                self.session.console_mut().scroll_up(page);
            }
            InputEvent::PageDown => {
                let page = self.state.console_height.max(1) as usize;
                self.session.console_mut().scroll_down(page);
            }
            InputEvent::CtrlV => {
                if let Some(text) = self.clipboard.as_mut().and_then(|c| c.get_text().ok()) {
                    self.console_field.insert_str(text.lines().next().unwrap_or(""));
                }
            }
            event => {
                let bounds = self.layout().get("console_input");
                if self.console_field.handle_event(&event, bounds) == EventResult::Submit {
                    self.submit_console_input();
                }
            }
        }
    }

    fn handle_prompt_key(&mut self, event: InputEvent) {
        match event {
            InputEvent::Escape => {
                self.state.close_prompt();
                self.prompt_field.take_text();
                self.state.set_status("Cancelled");
            }
            event => {
                let bounds = self.layout().get("console_input");
                if self.prompt_field.handle_event(&event, bounds) == EventResult::Submit {
                    self.submit_prompt();
                }
            }
        }
    }

    fn handle_click(&mut self, row: u16, col: u16) {
        let layout = self.layout();
        match layout.hit_test(row, col) {
            Some("editor") => {
                if self.state.focus != Focus::Prompt {
                    self.state.focus = Focus::Editor;
                }
                if let Some((line, col)) = self.view.position_at(row, col, layout.get("editor"), &self.document) {
                    self.document.set_cursor(line, col);
                }
            }
            Some("console_input") => {
                if self.state.focus != Focus::Prompt {
                    self.state.focus = Focus::ConsoleInput;
                }
                self.sync_widget_focus();
                let event = InputEvent::MouseClick { row, col };
                let bounds = layout.get("console_input");
                if self.state.focus == Focus::Prompt {
                    self.prompt_field.handle_event(&event, bounds);
                } else {
                    self.console_field.handle_event(&event, bounds);
                }
            }
            _ => {}
        }
    }

    fn handle_scroll(&mut self, row: u16, col: u16, up: bool) {
        let layout = self.layout();
        match layout.hit_test(row, col) {
            Some("console") | Some("console_title") => {
                let console = self.session.console_mut();
                if up {
                    console.scroll_up(WHEEL_STEP);
                } else {
                    console.scroll_down(WHEEL_STEP);
                }
            }
            Some("editor") => {
                let delta = if up { -(WHEEL_STEP as isize) } else { WHEEL_STEP as isize };
                self.view.scroll_by(delta, self.document.line_count());
            }
            _ => {}
        }
    }

    // ---- execution ----

    fn run_script(&mut self) {
        let source = self.document.text();
        match self.session.start(&source, self.document.path()) {
            Ok(()) => {
                self.state.set_status("Running...");
                // A successful start leaves the session at Running or later
                self.after_session_step(SessionState::Running);
            }
            Err(RunError::Untitled) => {
                self.state.set_status(RunError::Untitled.to_string());
                self.prompt_field.take_text();
                self.state.open_prompt(PromptKind::SaveAs { run_after: true });
            }
            Err(err) => self.state.set_status(err.to_string()),
        }
    }

    fn stop_script(&mut self) {
        let before = self.session.state();
        if self.session.stop() {
            self.after_session_step(before);
        }
    }

    fn pump_session(&mut self) {
        let before = self.session.state();
        self.session.pump();
        self.after_session_step(before);
    }

    fn submit_console_input(&mut self) {
        if self.session.state() != SessionState::WaitingForInput {
            self.state.set_status("No script is waiting for input");
            return;
        }
        let before = self.session.state();
        let text = self.console_field.take_text();
        self.session.submit_input(&text);
        self.after_session_step(before);
    }

    /// Move focus and post status messages when the session changes state
    fn after_session_step(&mut self, before: SessionState) {
        let now = self.session.state();
        if now == before && now != SessionState::WaitingForInput {
            return;
        }
        match now {
            SessionState::WaitingForInput => {
                if self.state.focus != Focus::Prompt {
                    self.state.focus = Focus::ConsoleInput;
                }
                self.state.set_status("Waiting for input");
            }
            SessionState::Running => self.state.set_status("Running..."),
            SessionState::Finished | SessionState::Stopped => {
                let message = match (now, self.session.last_error()) {
                    (SessionState::Stopped, _) => "Execution stopped by user".to_string(),
                    (_, Some(err)) => format!("Execution failed: {}", err),
                    _ => "Execution finished".to_string(),
                };
                self.state.set_status(message);
                if self.state.focus == Focus::ConsoleInput {
                    self.state.focus = Focus::Editor;
                }
            }
            SessionState::Idle => {}
        }
    }

    // ---- files ----

    fn save(&mut self) {
        if self.document.path().is_none() {
            self.prompt_field.take_text();
            self.state.open_prompt(PromptKind::SaveAs { run_after: false });
            return;
        }
        match self.document.save() {
            Ok(()) => self.state.set_status(format!("Saved: {}", self.document.display_name())),
            Err(e) => self.state.set_status(format!("Cannot save file: {}", e)),
        }
    }

    fn request_open(&mut self) {
        if self.document.is_dirty() && !self.state.confirm(ArmedAction::Open) {
            self.state.set_status("Unsaved changes: press Ctrl+O again to open another file");
            return;
        }
        self.prompt_field.take_text();
        self.state.open_prompt(PromptKind::Open);
    }

    fn submit_prompt(&mut self) {
        let text = self.prompt_field.take_text();
        let Some(kind) = self.state.close_prompt() else {
            return;
        };
        let path = text.trim();
        if path.is_empty() {
            self.state.set_status("Cancelled");
            return;
        }
        let path = PathBuf::from(path);

        match kind {
            PromptKind::SaveAs { run_after } => match self.document.save_as(&path) {
                Ok(()) => {
                    self.state.set_status(format!("Saved: {}", path.display()));
                    if run_after {
                        self.run_script();
                    }
                }
                Err(e) => self.state.set_status(format!("Cannot save file: {}", e)),
            },
            PromptKind::Open => match SourceDocument::load(&path) {
                Ok(doc) => {
                    self.replace_document(doc);
                    self.state.set_status(format!("Opened: {}", path.display()));
                }
                Err(e) => self.state.set_status(format!("Cannot open file: {}", e)),
            },
        }
    }

    fn new_document(&mut self) {
        if self.document.is_dirty() && !self.state.confirm(ArmedAction::New) {
            self.state.set_status("Unsaved changes: press Ctrl+N again to discard them");
            return;
        }
        self.replace_document(SourceDocument::new());
        self.state.set_status("New file created");
    }

    fn replace_document(&mut self, doc: SourceDocument) {
        self.document = doc;
        self.view = EditorView::new();
        self.highlight.invalidate();
        self.state.focus = Focus::Editor;
    }

    // ---- misc commands ----

    fn toggle_theme(&mut self) {
        self.state.toggle_theme();
        self.theme = Theme::for_kind(self.state.theme);
        self.highlight.invalidate();
        self.screen.invalidate();
        let name = match self.state.theme {
            ThemeKind::Light => "light",
            ThemeKind::Dark => "dark",
        };
        self.state.set_status(format!("Theme: {}", name));
    }

    fn quit(&mut self) {
        if self.document.is_dirty() && !self.state.confirm(ArmedAction::Quit) {
            self.state.set_status("Unsaved changes: press Ctrl+Q again to quit");
            return;
        }
        self.state.should_quit = true;
    }

    fn clipboard_copy(&mut self) {
        let text = self.document.copy_line();
        match self.clipboard.as_mut().map(|c| c.set_text(text)) {
            Some(Ok(())) => self.state.set_status("Copied line"),
            Some(Err(e)) => self.state.set_status(format!("Clipboard error: {}", e)),
            None => self.state.set_status("Clipboard unavailable"),
        }
    }

    fn clipboard_cut(&mut self) {
        let Some(clipboard) = self.clipboard.as_mut() else {
            self.state.set_status("Clipboard unavailable");
            return;
        };
        if let Err(e) = clipboard.set_text(self.document.copy_line()) {
            self.state.set_status(format!("Clipboard error: {}", e));
            return;
        }
        self.document.cut_line();
        self.state.set_status("Cut line");
    }

    fn clipboard_paste(&mut self) {
        match self.clipboard.as_mut().map(|c| c.get_text()) {
            Some(Ok(text)) => self.document.insert_str(&text),
            Some(Err(e)) => self.state.set_status(format!("Clipboard error: {}", e)),
            None => self.state.set_status("Clipboard unavailable"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::Origin;

    fn app(source: &str) -> App {
        App::new(SourceDocument::from_text(source), ThemeKind::Light, (80, 24))
    }

    fn titled(source: &str) -> App {
        let mut app = app(source);
        app.document.set_path(PathBuf::from("demo.cmm"));
        app
    }

    fn type_text(app: &mut App, text: &str) {
        for ch in text.chars() {
            app.handle_input(InputEvent::Char(ch));
        }
    }

    fn console_texts(app: &App) -> Vec<String> {
        app.session.console().entries().iter().map(|e| e.text.clone()).collect()
    }

    fn screen_row(app: &App, row: u16) -> String {
        (1..=80).filter_map(|c| app.screen.get(row, c)).map(|c| c.ch).collect()
    }

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("cmm-ide-{}-{}", std::process::id(), name))
    }

    #[test]
    fn test_input_moves_focus_and_submits() {
        let mut app = titled("name = input(\"Name?\")\nprint(\"Hi \" + name)");
        app.handle_input(InputEvent::F5);
        assert_eq!(app.session.state(), SessionState::WaitingForInput);
        assert_eq!(app.state.focus, Focus::ConsoleInput);

        type_text(&mut app, "Bob");
        app.handle_input(InputEvent::Enter);

        assert_eq!(app.session.state(), SessionState::Finished);
        assert_eq!(app.state.focus, Focus::Editor);
        assert_eq!(app.state.status_message.as_deref(), Some("Execution finished"));
        let texts = console_texts(&app);
        assert_eq!(&texts[2..5], &["Name?", "> Bob", "Hi Bob"]);
        assert_eq!(app.session.console().entries()[3].origin, Origin::UserEcho);
        // the script's text went to the console, not the editor
        assert_eq!(app.document.text(), "name = input(\"Name?\")\nprint(\"Hi \" + name)");
    }

    #[test]
    fn test_clear_console_while_waiting() {
        let mut app = titled("v = input(\"Q\")\nprint(v)");
        app.handle_input(InputEvent::F5);
        app.handle_input(InputEvent::CtrlL);
        assert!(app.session.console().is_empty());
        assert_eq!(app.session.state(), SessionState::WaitingForInput);
        assert_eq!(app.state.focus, Focus::ConsoleInput);

        type_text(&mut app, "x");
        app.handle_input(InputEvent::Enter);
        assert_eq!(app.session.state(), SessionState::Finished);
        assert_eq!(&console_texts(&app)[..2], &["> x", "x"]);
    }

    #[test]
    fn test_stop_while_waiting() {
        let mut app = titled("a = input(\"A?\")\nprint(len(a))");
        app.handle_input(InputEvent::F5);
        app.handle_input(InputEvent::F6);
        assert_eq!(app.session.state(), SessionState::Stopped);
        assert_eq!(app.state.status_message.as_deref(), Some("Execution stopped by user"));
        let texts = console_texts(&app);
        assert_eq!(&texts[2..5], &["A?", "> ", "0"]);
    }

    #[test]
    fn test_rerun_reports_finish() {
        let mut app = titled("print(1)");
        app.handle_input(InputEvent::F5);
        app.state.clear_status();
        app.handle_input(InputEvent::F5);
        assert_eq!(app.state.status_message.as_deref(), Some("Execution finished"));
        assert_eq!(console_texts(&app).iter().filter(|t| t.as_str() == "1").count(), 2);
    }

    #[test]
    fn test_empty_buffer_is_not_run() {
        let mut app = titled("   ");
        app.handle_input(InputEvent::F5);
        assert_eq!(app.session.state(), SessionState::Idle);
        assert_eq!(app.state.status_message.as_deref(), Some("No code to run"));
        assert!(app.session.console().is_empty());
    }

    #[test]
    fn test_second_run_while_waiting_is_rejected() {
        let mut app = titled("input()");
        app.handle_input(InputEvent::F5);
        app.state.focus = Focus::Editor;
        app.handle_input(InputEvent::F5);
        assert_eq!(app.state.status_message.as_deref(), Some("A script is already running"));
        assert_eq!(app.session.state(), SessionState::WaitingForInput);
    }

    #[test]
    fn test_untitled_run_saves_first() {
        let path = temp_path("untitled-run.cmm");
        let mut app = app("print(6 * 7)");
        app.handle_input(InputEvent::F5);
        assert_eq!(app.state.prompt, Some(PromptKind::SaveAs { run_after: true }));
        assert_eq!(app.state.focus, Focus::Prompt);

        type_text(&mut app, &path.display().to_string());
        app.handle_input(InputEvent::Enter);

        let saved = std::fs::read_to_string(&path).expect("Should read");
        let _ = std::fs::remove_file(&path);
        assert_eq!(saved, "print(6 * 7)");
        assert_eq!(app.state.prompt, None);
        assert_eq!(app.session.state(), SessionState::Finished);
        let texts = console_texts(&app);
        assert_eq!(texts[0], format!("=== Running script: {} ===", path.display()));
        assert_eq!(texts[2], "42");
    }

    #[test]
    fn test_prompt_escape_cancels() {
        let mut app = app("print(1)");
        app.handle_input(InputEvent::CtrlS);
        assert_eq!(app.state.focus, Focus::Prompt);
        type_text(&mut app, "x.cmm");
        app.handle_input(InputEvent::Escape);
        assert_eq!(app.state.prompt, None);
        assert_eq!(app.state.focus, Focus::Editor);
        assert_eq!(app.document.path(), None);
    }

    #[test]
    fn test_open_missing_file_reports_error() {
        let mut app = app("");
        app.handle_input(InputEvent::CtrlO);
        type_text(&mut app, "/nonexistent/dir/file.cmm");
        app.handle_input(InputEvent::Enter);
        let status = app.state.status_message.clone().unwrap_or_default();
        assert!(status.starts_with("Cannot open file:"));
    }

    #[test]
    fn test_enter_auto_indents() {
        let mut app = app("");
        type_text(&mut app, "if (x) {");
        app.handle_input(InputEvent::Enter);
        type_text(&mut app, "y = 1");
        assert_eq!(app.document.text(), "if (x) {\n    y = 1");
    }

    #[test]
    fn test_quit_with_changes_needs_confirmation() {
        let mut app = app("");
        type_text(&mut app, "x");
        app.handle_input(InputEvent::CtrlQ);
        assert!(!app.state.should_quit);
        app.handle_input(InputEvent::CtrlQ);
        assert!(app.state.should_quit);
    }

    #[test]
    fn test_other_key_disarms_quit() {
        let mut app = app("");
        type_text(&mut app, "x");
        app.handle_input(InputEvent::CtrlQ);
        app.handle_input(InputEvent::CursorLeft);
        app.handle_input(InputEvent::CtrlQ);
        assert!(!app.state.should_quit);
    }

    #[test]
    fn test_clear_console_and_theme_toggle() {
        let mut app = titled("print(1)");
        app.handle_input(InputEvent::F5);
        assert!(!app.session.console().is_empty());
        app.handle_input(InputEvent::CtrlL);
        assert!(app.session.console().is_empty());

        app.handle_input(InputEvent::CtrlT);
        assert_eq!(app.state.theme, ThemeKind::Dark);
        assert_eq!(app.theme, Theme::dark());
    }

    #[test]
    fn test_tab_toggles_focus_and_console_enter_without_script() {
        let mut app = app("");
        app.handle_input(InputEvent::Tab);
        assert_eq!(app.state.focus, Focus::ConsoleInput);
        type_text(&mut app, "hello");
        app.handle_input(InputEvent::Enter);
        assert_eq!(app.state.status_message.as_deref(), Some("No script is waiting for input"));
        assert_eq!(app.console_field.text(), "hello");
    }

    #[test]
    fn test_draw_renders_panes() {
        let mut app = titled("print(1)");
        app.handle_input(InputEvent::F5);
        app.draw();
        let layout = app.state.main_layout.clone().expect("Should have layout");
        let console = layout.get("console");
        // second console row holds the start time
        let row = console.y + 2;
        let text: String = (1..=10).filter_map(|c| app.screen.get(row, c)).map(|c| c.ch).collect();
        assert_eq!(text, "Start time");
    }

    #[test]
    fn test_f1_shows_syntax_help() {
        let mut app = titled("print(1)");
        app.handle_input(InputEvent::F1);
        assert!(app.help.is_open());
        app.draw();
        let editor = app.state.main_layout.clone().expect("Should have layout").get("editor");
        assert!(screen_row(&app, editor.y + 1).contains("C-- Syntax Help"));
        assert!(screen_row(&app, editor.y + 2).starts_with("Input and output"));

        // keys go to the help page, not the buffer
        type_text(&mut app, "zz");
        app.handle_input(InputEvent::F5);
        assert_eq!(app.document.text(), "print(1)");
        assert_eq!(app.session.state(), SessionState::Idle);

        app.handle_input(InputEvent::Escape);
        assert!(!app.help.is_open());
        app.draw();
        let line = screen_row(&app, editor.y + 1);
        assert!(!line.contains("C-- Syntax Help"));
        assert!(line.contains("print(1)"));
    }

    #[test]
    fn test_long_loop_yields_to_the_ui() {
        let mut app = titled("i = 0\nwhile (i < 1000) { i += 1 }\nprint(i)");
        app.session = ExecutionSession::with_tick_interval(Duration::ZERO);
        app.handle_input(InputEvent::F5);
        assert_eq!(app.session.state(), SessionState::Running);
        while app.session.state() == SessionState::Running {
            app.pump_session();
        }
        assert_eq!(app.session.state(), SessionState::Finished);
        assert!(console_texts(&app).contains(&"1000".to_string()));
    }
}
