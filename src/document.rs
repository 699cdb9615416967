//! The script buffer being edited
//!
//! Text is kept as lines; columns count characters, not bytes. Every change
//! bumps the revision so the highlighter knows when to retag, and is recorded
//! as a group of primitive edits for undo/redo.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Cursor position: line and character column, both 0-based
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Cursor {
    pub line: usize,
    pub col: usize,
}

impl Cursor {
    pub fn new(line: usize, col: usize) -> Self {
        Self { line, col }
    }
}

/// Primitive edits; each has an exact inverse
#[derive(Clone, Debug, PartialEq)]
enum Edit {
    /// Insert text (no newlines) at a position
    Insert { line: usize, col: usize, text: String },
    /// Delete text (no newlines) at a position
    Delete { line: usize, col: usize, text: String },
    /// Split a line in two at a column
    SplitLine { line: usize, col: usize },
    /// Join a line with the next one; `col` is the joined line's old length
    JoinLines { line: usize, col: usize },
}

impl Edit {
    fn inverse(&self) -> Edit {
        match self {
            Edit::Insert { line, col, text } => Edit::Delete {
                line: *line,
                col: *col,
                text: text.clone(),
            },
            Edit::Delete { line, col, text } => Edit::Insert {
                line: *line,
                col: *col,
                text: text.clone(),
            },
            Edit::SplitLine { line, col } => Edit::JoinLines { line: *line, col: *col },
            Edit::JoinLines { line, col } => Edit::SplitLine { line: *line, col: *col },
        }
    }
}

/// One user action
#[derive(Clone, Debug)]
struct UndoEntry {
    edits: Vec<Edit>,
    before: Cursor,
    after: Cursor,
}

/// Byte index of character column `col` in `s` (clamped to the end)
fn byte_index(s: &str, col: usize) -> usize {
    s.char_indices().nth(col).map_or(s.len(), |(i, _)| i)
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Leading whitespace of a line
fn indentation(line: &str) -> &str {
    let trimmed = line.trim_start_matches([' ', '\t']);
    &line[..line.len() - trimmed.len()]
}

pub struct SourceDocument {
    lines: Vec<String>,
    cursor: Cursor,
    path: Option<PathBuf>,
    dirty: bool,
    revision: u64,
    undo_stack: Vec<UndoEntry>,
    redo_stack: Vec<UndoEntry>,
}

impl Default for SourceDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl SourceDocument {
    pub fn new() -> Self {
        Self {
            lines: vec![String::new()],
            cursor: Cursor::default(),
            path: None,
            dirty: false,
            revision: 0,
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
        }
    }

    pub fn from_text(text: &str) -> Self {
        let mut doc = Self::new();
        doc.lines = text
            .split('\n')
            .map(|l| l.strip_suffix('\r').unwrap_or(l).to_string())
            .collect();
        doc
    }

    /// Read a document from disk
    pub fn load(path: &Path) -> io::Result<Self> {
        let text = fs::read_to_string(path)?;
        let mut doc = Self::from_text(&text);
        doc.path = Some(path.to_path_buf());
        Ok(doc)
    }

    /// Write to the backing path. Fails with `NotFound` on an untitled document.
    pub fn save(&mut self) -> io::Result<()> {
        let Some(path) = self.path.clone() else {
            return Err(io::Error::new(io::ErrorKind::NotFound, "document has no file name"));
        };
        self.save_as(&path)
    }

    pub fn save_as(&mut self, path: &Path) -> io::Result<()> {
        fs::write(path, self.text())?;
        self.path = Some(path.to_path_buf());
        self.dirty = false;
        tracing::info!("saved {}", path.display());
        Ok(())
    }

    /// Snapshot of the whole buffer
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn line(&self, n: usize) -> Option<&str> {
        self.lines.get(n).map(|s| s.as_str())
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Byte offset of the start of each line in `text()`
    pub fn line_offsets(&self) -> Vec<usize> {
        let mut offsets = Vec::with_capacity(self.lines.len());
        let mut offset = 0;
        for line in &self.lines {
            offsets.push(offset);
            offset += line.len() + 1;
        }
        offsets
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// Move the cursor, clamped to the text
    pub fn set_cursor(&mut self, line: usize, col: usize) {
        let line = line.min(self.lines.len() - 1);
        let col = col.min(char_len(&self.lines[line]));
        self.cursor = Cursor { line, col };
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn set_path(&mut self, path: PathBuf) {
        self.path = Some(path);
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Name shown in the status bar
    pub fn display_name(&self) -> String {
        self.path
            .as_ref()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "Untitled".to_string())
    }

    fn current_line(&self) -> &str {
        &self.lines[self.cursor.line]
    }

    // ---- primitive edits ----

    fn apply(&mut self, edit: &Edit) {
        match edit {
            Edit::Insert { line, col, text } => {
                let l = &mut self.lines[*line];
                let at = byte_index(l, *col);
                l.insert_str(at, text);
            }
            Edit::Delete { line, col, text } => {
                let l = &mut self.lines[*line];
                let start = byte_index(l, *col);
                let end = byte_index(l, *col + char_len(text));
                l.replace_range(start..end, "");
            }
            Edit::SplitLine { line, col } => {
                let l = &mut self.lines[*line];
                let at = byte_index(l, *col);
                let rest = l.split_off(at);
                self.lines.insert(line + 1, rest);
            }
            Edit::JoinLines { line, .. } => {
                if line + 1 < self.lines.len() {
                    let next = self.lines.remove(line + 1);
                    self.lines[*line].push_str(&next);
                }
            }
        }
    }

    fn touch(&mut self) {
        self.dirty = true;
        self.revision += 1;
    }

    /// Apply a user action and record it for undo
    fn perform(&mut self, edits: Vec<Edit>, after: Cursor) {
        if edits.is_empty() {
            self.cursor = after;
            return;
        }
        let before = self.cursor;
        for edit in &edits {
            self.apply(edit);
        }
        self.cursor = after;
        self.undo_stack.push(UndoEntry { edits, before, after });
        self.redo_stack.clear();
        self.touch();
    }

    pub fn undo(&mut self) -> bool {
        let Some(entry) = self.undo_stack.pop() else {
            return false;
        };
        for edit in entry.edits.iter().rev() {
            self.apply(&edit.inverse());
        }
        self.cursor = entry.before;
        self.redo_stack.push(entry);
        self.touch();
        true
    }

    pub fn redo(&mut self) -> bool {
        let Some(entry) = self.redo_stack.pop() else {
            return false;
        };
        for edit in &entry.edits {
            self.apply(edit);
        }
        self.cursor = entry.after;
        self.undo_stack.push(entry);
        self.touch();
        true
    }

    // ---- user actions ----

    pub fn insert_char(&mut self, ch: char) {
        if ch == '\n' {
            self.newline(0);
            return;
        }
        let Cursor { line, col } = self.cursor;
        self.perform(
            vec![Edit::Insert {
                line,
                col,
                text: ch.to_string(),
            }],
            Cursor::new(line, col + 1),
        );
    }

    /// Insert text at the cursor; newlines split lines, carriage returns are dropped
    pub fn insert_str(&mut self, text: &str) {
        let text = text.replace('\r', "");
        let Cursor { mut line, mut col } = self.cursor;
        let mut edits = Vec::new();
        for (i, segment) in text.split('\n').enumerate() {
            if i > 0 {
                edits.push(Edit::SplitLine { line, col });
                line += 1;
                col = 0;
            }
            if !segment.is_empty() {
                edits.push(Edit::Insert {
                    line,
                    col,
                    text: segment.to_string(),
                });
                col += char_len(segment);
            }
        }
        self.perform(edits, Cursor::new(line, col));
    }

    /// Split the line at the cursor, carrying over the current indentation
    /// plus `indent_step` spaces when the text before the cursor ends in `{`
    pub fn newline(&mut self, indent_step: usize) {
        let Cursor { line, col } = self.cursor;
        let before = &self.current_line()[..byte_index(self.current_line(), col)];
        let mut indent = indentation(before).to_string();
        if indent_step > 0 && before.trim_end().ends_with('{') {
            indent.push_str(&" ".repeat(indent_step));
        }

        let mut edits = vec![Edit::SplitLine { line, col }];
        let new_col = char_len(&indent);
        if !indent.is_empty() {
            edits.push(Edit::Insert {
                line: line + 1,
                col: 0,
                text: indent,
            });
        }
        self.perform(edits, Cursor::new(line + 1, new_col));
    }

    pub fn backspace(&mut self) {
        let Cursor { line, col } = self.cursor;
        if col > 0 {
            let l = self.current_line();
            let start = byte_index(l, col - 1);
            let end = byte_index(l, col);
            let text = l[start..end].to_string();
            self.perform(
                vec![Edit::Delete {
                    line,
                    col: col - 1,
                    text,
                }],
                Cursor::new(line, col - 1),
            );
        } else if line > 0 {
            let prev_len = char_len(&self.lines[line - 1]);
            self.perform(
                vec![Edit::JoinLines {
                    line: line - 1,
                    col: prev_len,
                }],
                Cursor::new(line - 1, prev_len),
            );
        }
    }

    /// Delete the character under the cursor
    pub fn delete(&mut self) {
        let Cursor { line, col } = self.cursor;
        let l = self.current_line();
        if col < char_len(l) {
            let start = byte_index(l, col);
            let end = byte_index(l, col + 1);
            let text = l[start..end].to_string();
            self.perform(vec![Edit::Delete { line, col, text }], self.cursor);
        } else if line + 1 < self.lines.len() {
            self.perform(vec![Edit::JoinLines { line, col }], self.cursor);
        }
    }

    /// The cursor line with a trailing newline, for the clipboard
    pub fn copy_line(&self) -> String {
        format!("{}\n", self.current_line())
    }

    /// Remove the cursor line and return it with a trailing newline
    pub fn cut_line(&mut self) -> String {
        let copied = self.copy_line();
        let line = self.cursor.line;
        let text = self.current_line().to_string();

        let mut edits = Vec::new();
        if !text.is_empty() {
            edits.push(Edit::Delete {
                line,
                col: 0,
                text,
            });
        }
        let after = if line + 1 < self.lines.len() {
            edits.push(Edit::JoinLines { line, col: 0 });
            Cursor::new(line, 0)
        } else if line > 0 {
            let prev_len = char_len(&self.lines[line - 1]);
            edits.push(Edit::JoinLines {
                line: line - 1,
                col: prev_len,
            });
            Cursor::new(line - 1, 0)
        } else {
            Cursor::new(0, 0)
        };
        self.perform(edits, after);
        copied
    }

    // ---- cursor movement ----

    pub fn move_left(&mut self) {
        let Cursor { line, col } = self.cursor;
        if col > 0 {
            self.cursor.col -= 1;
        } else if line > 0 {
            self.cursor = Cursor::new(line - 1, char_len(&self.lines[line - 1]));
        }
    }

    pub fn move_right(&mut self) {
        let Cursor { line, col } = self.cursor;
        if col < char_len(self.current_line()) {
            self.cursor.col += 1;
        } else if line + 1 < self.lines.len() {
            self.cursor = Cursor::new(line + 1, 0);
        }
    }

    pub fn move_up(&mut self, lines: usize) {
        let Cursor { line, col } = self.cursor;
        self.set_cursor(line.saturating_sub(lines), col);
    }

    pub fn move_down(&mut self, lines: usize) {
        let Cursor { line, col } = self.cursor;
        self.set_cursor(line + lines, col);
    }

    pub fn move_home(&mut self) {
        self.cursor.col = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor.col = char_len(self.current_line());
    }
}
