//! Double-buffered screen rendering system
//! Minimizes flicker by only updating changed cells

use crate::terminal::{Color, CursorStyle, Terminal};
use std::fmt::Write as _;
use std::io;

/// A single cell on the screen
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Cell {
    pub ch: char,
    pub fg: Color,
    pub bg: Color,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            ch: ' ',
            fg: Color::Gray,
            bg: Color::Black,
        }
    }
}

impl Cell {
    pub fn new(ch: char, fg: Color, bg: Color) -> Self {
        Self { ch, fg, bg }
    }
}

/// Double-buffered screen, 1-based coordinates
pub struct Screen {
    width: u16,
    height: u16,
    front: Vec<Cell>, // Currently displayed
    back: Vec<Cell>,  // Being drawn to
    cursor_row: u16,
    cursor_col: u16,
    cursor_visible: bool,
    cursor_style: CursorStyle,
}

impl Screen {
    pub fn new(width: u16, height: u16) -> Self {
        let size = (width as usize) * (height as usize);
        Self {
            width,
            height,
            front: vec![Cell::new('\0', Color::Black, Color::Black); size], // Force initial draw
            back: vec![Cell::default(); size],
            cursor_row: 1,
            cursor_col: 1,
            cursor_visible: true,
            cursor_style: CursorStyle::BlinkingBar,
        }
    }

    pub fn size(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        let size = (width as usize) * (height as usize);
        self.width = width;
        self.height = height;
        self.front = vec![Cell::new('\0', Color::Black, Color::Black); size];
        self.back = vec![Cell::default(); size];
    }

    fn index(&self, row: u16, col: u16) -> Option<usize> {
        if row >= 1 && row <= self.height && col >= 1 && col <= self.width {
            Some(((row - 1) as usize) * (self.width as usize) + ((col - 1) as usize))
        } else {
            None
        }
    }

    /// Set a cell in the back buffer
    pub fn set(&mut self, row: u16, col: u16, ch: char, fg: Color, bg: Color) {
        if let Some(idx) = self.index(row, col) {
            self.back[idx] = Cell::new(ch, fg, bg);
        }
    }

    pub fn get(&self, row: u16, col: u16) -> Option<Cell> {
        self.index(row, col).map(|idx| self.back[idx])
    }

    /// Write a string starting at the given position, clipped at `max_col`
    pub fn write_str(&mut self, row: u16, col: u16, s: &str, fg: Color, bg: Color) {
        self.write_clipped(row, col, self.width, s, fg, bg);
    }

    pub fn write_clipped(&mut self, row: u16, col: u16, max_col: u16, s: &str, fg: Color, bg: Color) {
        let mut c = col;
        for ch in s.chars() {
            if c > max_col {
                break;
            }
            self.set(row, c, ch, fg, bg);
            c += 1;
        }
    }

    pub fn fill(&mut self, row: u16, col: u16, width: u16, height: u16, ch: char, fg: Color, bg: Color) {
        for r in row..row.saturating_add(height) {
            for c in col..col.saturating_add(width) {
                self.set(r, c, ch, fg, bg);
            }
        }
    }

    pub fn clear_with(&mut self, fg: Color, bg: Color) {
        self.back.fill(Cell::new(' ', fg, bg));
    }

    pub fn set_cursor(&mut self, row: u16, col: u16) {
        self.cursor_row = row;
        self.cursor_col = col;
    }

    pub fn set_cursor_visible(&mut self, visible: bool) {
        self.cursor_visible = visible;
    }

    pub fn set_cursor_style(&mut self, style: CursorStyle) {
        self.cursor_style = style;
    }

    /// Escape sequences that bring the terminal from the front buffer to
    /// the back buffer. The front buffer is updated as cells are emitted.
    fn render_diff(&mut self) -> String {
        let mut out = String::new();
        let mut last: Option<(Color, Color)> = None;
        let mut next_pos: Option<(u16, u16)> = None;

        for row in 1..=self.height {
            for col in 1..=self.width {
                let idx = ((row - 1) as usize) * (self.width as usize) + ((col - 1) as usize);
                let back = self.back[idx];
                if self.front[idx] == back {
                    continue;
                }

                if next_pos != Some((row, col)) {
                    let _ = write!(out, "\x1b[{};{}H", row, col);
                }
                if last != Some((back.fg, back.bg)) {
                    let _ = write!(out, "\x1b[{};{}m", back.fg.to_fg_sgr(), back.bg.to_bg_sgr());
                    last = Some((back.fg, back.bg));
                }
                out.push(back.ch);

                self.front[idx] = back;
                next_pos = Some((row, col + 1));
            }
        }
        out
    }

    /// Flush changes to the terminal (only updates changed cells)
    pub fn flush(&mut self, term: &mut Terminal) -> io::Result<()> {
        let diff = self.render_diff();
        if !diff.is_empty() {
            term.hide_cursor()?;
            term.write_raw(&diff)?;
        }

        if self.cursor_visible {
            term.goto(self.cursor_row, self.cursor_col)?;
            term.set_cursor_style(self.cursor_style)?;
            term.show_cursor()?;
        } else {
            term.hide_cursor()?;
        }

        term.flush()
    }

    /// Force full redraw on next flush
    pub fn invalidate(&mut self) {
        for cell in &mut self.front {
            cell.ch = '\0';
        }
    }
}
