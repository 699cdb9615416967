//! Syntax help overlay (F1)

use super::layout::Rect;
use super::widget::{EventResult, Widget};
use crate::highlight::HighlightApplier;
use crate::input::InputEvent;
use crate::screen::Screen;
use crate::script::lexer::Builtin;
use crate::ui::theme::Theme;

/// Lines starting with this are C-- code and drawn highlighted
const CODE_INDENT: &str = "    ";

const HELP_TEXT: &str = r#"Input and output
    print("Hello");              // one console line, arguments joined by spaces
    name = input("Your name?");  // waits for a line typed into the console
    output(1, 2);                // same as print

Variables
    age = 13;
    name = "Ann";
    is_student = true;
    int count = 0;               // a type name before a variable is ignored
    count += 2;
    count++;

Conditions
    if (x == 0) {
        print("x = 0");
    } else if (x > 0) {
        print("x > 0");
    } else {
        print("x < 0");
    }

Loops
    for (int i = 1; i <= 10; i++) {
        print(i);
    }
    while (running) {
        running = false;
    }
  break and continue work inside loops.
  A ';' may be left out at the end of a line.

Operators
  Arithmetic   +  -  *  /  %  **
  Comparison   ==  !=  <  <=  >  >=
  Logical      &&  ||  !
  Assignment   =  +=  -=  *=  /=  %=  ++  --
  / always gives a float. % takes the sign of the divisor.
  + joins text when either side is a string.
    print(5 % 3);
    print(2 ** 10);
    print("n = " + 3);

Built-in functions
    print(a, ...)   output(a, ...)   input(prompt)
    int(x)   float(x)   str(x)   len(s)
    abs(x)   min(a, b, ...)   max(a, b, ...)   round(x)

Values
    42   3.5   1e3   "text\n"   'text'   true   false
    // line comment
    /* block comment */"#;

/// Scrollable help page drawn over the editor pane
pub struct HelpView {
    open: bool,
    scroll: usize,
    lines: Vec<&'static str>,
    /// Highlight classes of code lines, `None` for prose
    code: Vec<Option<HighlightApplier>>,
}

impl HelpView {
    pub fn new() -> Self {
        let lines: Vec<&'static str> = HELP_TEXT.lines().collect();
        // Only classes are read back, so any palette will do
        let palette = Theme::light().syntax;
        let code = lines
            .iter()
            .map(|line| {
                line.starts_with(CODE_INDENT).then(|| {
                    let mut applier = HighlightApplier::new();
                    applier.apply(line, &palette);
                    applier
                })
            })
            .collect();
        Self {
            open: false,
            scroll: 0,
            lines,
            code,
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn open(&mut self) {
        self.open = true;
        self.scroll = 0;
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    pub fn lines(&self) -> &[&'static str] {
        &self.lines
    }

    pub fn scroll(&self) -> usize {
        self.scroll
    }

    fn page_height(bounds: Rect) -> usize {
        bounds.height.saturating_sub(2).max(1) as usize
    }

    fn scroll_by(&mut self, delta: isize, bounds: Rect) {
        let max = self.lines.len().saturating_sub(Self::page_height(bounds));
        self.scroll = self.scroll.saturating_add_signed(delta).min(max);
    }
}

impl Default for HelpView {
    fn default() -> Self {
        Self::new()
    }
}

impl Widget for HelpView {
    fn draw(&self, screen: &mut Screen, theme: &Theme, bounds: Rect) {
        if !self.open || bounds.width == 0 || bounds.height < 3 {
            return;
        }
        let row = bounds.y + 1;
        let col = bounds.x + 1;
        let max_col = bounds.x + bounds.width;
        let width = bounds.width;

        screen.fill(row, col, width, bounds.height, ' ', theme.editor_fg, theme.editor_bg);

        let title = " C-- Syntax Help ";
        screen.fill(row, col, width, 1, ' ', theme.console_title_fg, theme.console_title_bg);
        let title_col = col + width.saturating_sub(title.len() as u16) / 2;
        screen.write_clipped(row, title_col, max_col, title, theme.console_title_fg, theme.console_title_bg);

        let height = Self::page_height(bounds);
        for (i, line) in self.lines.iter().skip(self.scroll).take(height).enumerate() {
            let r = row + 1 + i as u16;
            let highlight = self.code.get(self.scroll + i).and_then(Option::as_ref);
            for (offset, (c, ch)) in line.char_indices().enumerate() {
                let x = col + offset as u16;
                if x > max_col {
                    break;
                }
                let fg = highlight
                    .and_then(|h| h.class_at(c))
                    .and_then(|class| theme.syntax.color(class))
                    .unwrap_or(theme.editor_fg);
                screen.set(r, x, ch, fg, theme.editor_bg);
            }
        }

        let hint = " Up/Down PgUp/PgDn Scroll   Esc/F1 Close";
        let hint_row = bounds.y + bounds.height;
        screen.fill(hint_row, col, width, 1, ' ', theme.statusbar_fg, theme.statusbar_bg);
        screen.write_clipped(hint_row, col, max_col, hint, theme.statusbar_fg, theme.statusbar_bg);
    }

    fn handle_event(&mut self, event: &InputEvent, bounds: Rect) -> EventResult {
        if !self.open {
            return EventResult::Ignored;
        }
        let page = Self::page_height(bounds) as isize;
        match event {
            InputEvent::Escape | InputEvent::F1 => self.close(),
            InputEvent::CursorUp => self.scroll_by(-1, bounds),
            InputEvent::CursorDown => self.scroll_by(1, bounds),
            InputEvent::PageUp => self.scroll_by(-page, bounds),
            InputEvent::PageDown => self.scroll_by(page, bounds),
            InputEvent::ScrollUp { .. } => self.scroll_by(-3, bounds),
            InputEvent::ScrollDown { .. } => self.scroll_by(3, bounds),
            InputEvent::Home | InputEvent::CtrlHome => self.scroll = 0,
            InputEvent::End | InputEvent::CtrlEnd => self.scroll_by(isize::MAX, bounds),
            _ => {}
        }
        // Modal while open
        EventResult::Consumed
    }

    fn has_focus(&self) -> bool {
        self.open
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::interpreter;
    use crate::script::lexer::TokenClass;

    fn row_text(screen: &Screen, row: u16, width: u16) -> String {
        (1..=width).filter_map(|c| screen.get(row, c)).map(|c| c.ch).collect()
    }

    #[test]
    fn test_lists_every_builtin() {
        for builtin in Builtin::ALL {
            let call = format!("{}(", builtin.name());
            assert!(HELP_TEXT.contains(&call), "missing {}", builtin.name());
        }
    }

    #[test]
    fn test_examples_compile() {
        let help = HelpView::new();
        let examples = [
            &help.lines[1..4],
            &help.lines[6..12],
            &help.lines[14..21],
            &help.lines[23..29],
        ];
        for lines in examples {
            let source = lines.join("\n");
            assert!(interpreter::compile(&source).is_ok(), "{}", source);
        }
    }

    #[test]
    fn test_code_lines_are_classified() {
        let help = HelpView::new();
        let line = help.lines.iter().position(|l| l.trim_start().starts_with("if (x == 0)"));
        let line = line.expect("Should have an if example");
        let applier = help.code[line].as_ref().expect("Should be code");
        assert_eq!(applier.class_at(4), Some(TokenClass::Keyword));
        assert!(help.code[0].is_none());
    }

    #[test]
    fn test_draw_and_scroll() {
        let theme = Theme::dark();
        let bounds = Rect::new(0, 0, 60, 10);
        let mut help = HelpView::new();
        let mut screen = Screen::new(60, 10);

        help.draw(&mut screen, &theme, bounds);
        assert_eq!(screen.get(2, 1).map(|c| c.ch), Some(' '));

        help.open();
        help.draw(&mut screen, &theme, bounds);
        assert!(row_text(&screen, 1, 60).contains("C-- Syntax Help"));
        assert!(row_text(&screen, 2, 60).starts_with("Input and output"));
        assert!(row_text(&screen, 10, 60).contains("Esc/F1 Close"));

        help.handle_event(&InputEvent::CursorDown, bounds);
        assert_eq!(help.scroll(), 1);
        help.handle_event(&InputEvent::End, bounds);
        assert_eq!(help.scroll(), help.lines().len() - 8);
        help.handle_event(&InputEvent::PageDown, bounds);
        assert_eq!(help.scroll(), help.lines().len() - 8);

        assert_eq!(help.handle_event(&InputEvent::Char('x'), bounds), EventResult::Consumed);
        help.handle_event(&InputEvent::Escape, bounds);
        assert!(!help.is_open());
        assert_eq!(help.handle_event(&InputEvent::Escape, bounds), EventResult::Ignored);
    }
}
