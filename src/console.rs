//! Append-only console log shared by program output and echoed user input

/// Who produced a console entry
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Origin {
    ProgramOutput,
    UserEcho,
}

/// One console line
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConsoleEntry {
    pub text: String,
    pub origin: Origin,
}

/// The console pane's contents
#[derive(Debug, Default)]
pub struct ConsoleSink {
    entries: Vec<ConsoleEntry>,
    /// Scroll position in lines from the bottom (0 = showing latest lines)
    scroll: usize,
}

impl ConsoleSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one entry and scroll to the end
    pub fn append(&mut self, text: impl Into<String>, origin: Origin) {
        let text = text.into();
        tracing::trace!("console {:?}: {}", origin, text);
        self.entries.push(ConsoleEntry { text, origin });
        self.scroll = 0;
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.scroll = 0;
    }

    pub fn entries(&self) -> &[ConsoleEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn scroll(&self) -> usize {
        self.scroll
    }

    /// Scroll towards older entries, keeping at least one entry in view
    pub fn scroll_up(&mut self, lines: usize) {
        let max_scroll = self.entries.len().saturating_sub(1);
        self.scroll = (self.scroll + lines).min(max_scroll);
    }

    pub fn scroll_down(&mut self, lines: usize) {
        self.scroll = self.scroll.saturating_sub(lines);
    }

    /// Entries visible in a pane `height` lines tall, oldest first
    pub fn visible(&self, height: usize) -> &[ConsoleEntry] {
        let end = self.entries.len().saturating_sub(self.scroll);
        let start = end.saturating_sub(height);
        &self.entries[start..end]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(sink: &ConsoleSink) -> Vec<&str> {
        sink.entries().iter().map(|e| e.text.as_str()).collect()
    }

    #[test]
    fn test_append_keeps_order_and_origin() {
        let mut sink = ConsoleSink::new();
        sink.append("Who?", Origin::ProgramOutput);
        sink.append("> Ann", Origin::UserEcho);
        assert_eq!(texts(&sink), vec!["Who?", "> Ann"]);
        assert_eq!(sink.entries()[1].origin, Origin::UserEcho);
    }

    #[test]
    fn test_clear_truncates() {
        let mut sink = ConsoleSink::new();
        sink.append("a", Origin::ProgramOutput);
        sink.clear();
        assert!(sink.is_empty());
    }

    #[test]
    fn test_append_resets_scroll() {
        let mut sink = ConsoleSink::new();
        for i in 0..20 {
            sink.append(i.to_string(), Origin::ProgramOutput);
        }
        sink.scroll_up(5);
        assert_eq!(sink.scroll(), 5);
        let view: Vec<&str> = sink.visible(3).iter().map(|e| e.text.as_str()).collect();
        assert_eq!(view, vec!["12", "13", "14"]);

        sink.append("20", Origin::ProgramOutput);
        assert_eq!(sink.scroll(), 0);
        assert_eq!(sink.visible(1)[0].text, "20");
    }

    #[test]
    fn test_scroll_is_clamped() {
        let mut sink = ConsoleSink::new();
        sink.append("only", Origin::ProgramOutput);
        sink.scroll_up(10);
        assert_eq!(sink.scroll(), 0);
        sink.scroll_down(3);
        assert_eq!(sink.scroll(), 0);
    }
}
