//! Syntax highlighting by literal-text retagging
//!
//! Every pass throws away all tag ranges and rebuilds them from the token
//! stream. Each highlightable token paints every literal occurrence of its
//! text in the document, so a keyword spelled inside a string or a longer
//! identifier is coloured too. Ranges are applied in token order and the
//! last range covering a byte decides its colour.
//!
//! Repainting the same literal again paints the same spans, and only the
//! latest repaint survives, so each distinct literal is searched once, at the
//! position of its last occurrence in token order.

use crate::script::lexer::{Token, TokenClass, TokenStream};
use crate::terminal::Color;
use std::collections::HashMap;

/// Colours for each highlight class
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SyntaxPalette {
    pub keyword: Color,
    pub comment: Color,
    pub string: Color,
    pub number: Color,
    pub builtin: Color,
}

impl SyntaxPalette {
    pub fn color(&self, class: TokenClass) -> Option<Color> {
        match class {
            TokenClass::Keyword => Some(self.keyword),
            TokenClass::Comment => Some(self.comment),
            TokenClass::String => Some(self.string),
            TokenClass::Number => Some(self.number),
            TokenClass::BuiltinName => Some(self.builtin),
            TokenClass::Other => None,
        }
    }
}

/// A coloured span of the document (byte offsets, end exclusive)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TagRange {
    pub tag: TokenClass,
    pub color: Color,
    pub start: usize,
    pub end: usize,
}

/// Holds the tag ranges of the last pass
#[derive(Debug, Default)]
pub struct HighlightApplier {
    ranges: Vec<TagRange>,
    /// Resolved colour per byte, last covering range wins
    painted: Vec<Option<Color>>,
    /// Document revision the ranges were computed for
    revision: Option<u64>,
}

impl HighlightApplier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recompute all tag ranges for `text`
    pub fn apply(&mut self, text: &str, palette: &SyntaxPalette) -> &[TagRange] {
        self.ranges.clear();

        let tokens: Vec<Token<'_>> = TokenStream::new(text).highlightable().collect();

        let mut last_index: HashMap<&str, usize> = HashMap::with_capacity(tokens.len());
        for (i, token) in tokens.iter().enumerate() {
            last_index.insert(token.lexeme, i);
        }

        for (i, token) in tokens.iter().enumerate() {
            if token.lexeme.is_empty() || last_index.get(token.lexeme) != Some(&i) {
                continue;
            }
            let tag = token.kind.class();
            let Some(color) = palette.color(tag) else {
                continue;
            };
            for (start, matched) in text.match_indices(token.lexeme) {
                self.ranges.push(TagRange {
                    tag,
                    color,
                    start,
                    end: start + matched.len(),
                });
            }
        }

        self.painted = self.paint(text.len());
        tracing::debug!(
            "highlight pass: {} tokens, {} literals, {} ranges",
            tokens.len(),
            last_index.len(),
            self.ranges.len()
        );
        &self.ranges
    }

    /// Recompute only if `revision` differs from the last pass
    pub fn refresh(&mut self, revision: u64, text: &str, palette: &SyntaxPalette) -> bool {
        if self.revision == Some(revision) {
            return false;
        }
        self.apply(text, palette);
        self.revision = Some(revision);
        true
    }

    /// Force the next `refresh` to recompute (e.g. after a theme change)
    pub fn invalidate(&mut self) {
        self.revision = None;
    }

    pub fn ranges(&self) -> &[TagRange] {
        &self.ranges
    }

    /// Resolve the ranges into one colour per byte of a `len`-byte document
    pub fn paint(&self, len: usize) -> Vec<Option<Color>> {
        let mut painted = vec![None; len];
        for range in &self.ranges {
            let end = range.end.min(len);
            if range.start < end {
                painted[range.start..end].fill(Some(range.color));
            }
        }
        painted
    }

    /// Colour of the byte at `offset` from the last pass
    pub fn color_at(&self, offset: usize) -> Option<Color> {
        self.painted.get(offset).copied().flatten()
    }

    /// Class of the last range covering `offset`
    pub fn class_at(&self, offset: usize) -> Option<TokenClass> {
        self.ranges
            .iter()
            .rev()
            .find(|r| r.start <= offset && offset < r.end)
            .map(|r| r.tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn palette() -> SyntaxPalette {
        SyntaxPalette {
            keyword: Color::Blue,
            comment: Color::Green,
            string: Color::Red,
            number: Color::Magenta,
            builtin: Color::Cyan,
        }
    }

    fn apply(text: &str) -> HighlightApplier {
        let mut applier = HighlightApplier::new();
        applier.apply(text, &palette());
        applier
    }

    #[test]
    fn test_idempotent() {
        let text = "x = input(\"n?\")\nif (x == \"if\") { print(x, 1.5) } // done";
        let mut applier = HighlightApplier::new();
        let first = applier.apply(text, &palette()).to_vec();
        let second = applier.apply(text, &palette()).to_vec();
        assert_eq!(first, second);
        assert!(!first.is_empty());
    }

    #[test]
    fn test_keyword_inside_string_is_tagged() {
        let text = "x = \"if\"\nif (x) {}";
        let applier = apply(text);
        assert_eq!(applier.class_at(4), Some(TokenClass::String));
        assert_eq!(applier.class_at(5), Some(TokenClass::Keyword));
        assert_eq!(applier.class_at(9), Some(TokenClass::Keyword));
        assert_eq!(applier.color_at(5), Some(Color::Blue));
    }

    #[test]
    fn test_builtin_inside_identifier_is_tagged() {
        let text = "printer = 1\nprint(printer)";
        let applier = apply(text);
        assert_eq!(applier.class_at(0), Some(TokenClass::BuiltinName));
        assert_eq!(applier.class_at(5), None);
        assert_eq!(applier.class_at(18), Some(TokenClass::BuiltinName));
    }

    #[test]
    fn test_later_token_wins_inside_comment() {
        let text = "// print me\nprint(1)";
        let applier = apply(text);
        assert_eq!(applier.class_at(0), Some(TokenClass::Comment));
        assert_eq!(applier.class_at(3), Some(TokenClass::BuiltinName));
        assert_eq!(applier.class_at(9), Some(TokenClass::Comment));
    }

    #[test]
    fn test_repeated_literals_searched_once() {
        let applier = apply("print(1)\nprint(2)");
        // two `print` spans plus one per number
        assert_eq!(applier.ranges().len(), 4);
    }

    #[test]
    fn test_malformed_tokens_are_not_tagged() {
        let applier = apply("x = \"open\n12ab");
        assert!(applier.ranges().is_empty());
    }

    #[test]
    fn test_refresh_tracks_revision() {
        let mut applier = HighlightApplier::new();
        assert!(applier.refresh(1, "print(1)", &palette()));
        assert!(!applier.refresh(1, "print(1)", &palette()));
        applier.invalidate();
        assert!(applier.refresh(1, "print(1)", &palette()));
    }

    #[test]
    fn test_paint_resolves_last_write() {
        let applier = apply("x = \"if\"\nif (x) {}");
        let painted = applier.paint(8);
        assert_eq!(painted[4], Some(Color::Red));
        assert_eq!(painted[5], Some(Color::Blue));
        assert_eq!(painted[7], Some(Color::Red));
        assert_eq!(painted[0], None);
    }
}
