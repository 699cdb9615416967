//! Colour themes for the editor shell
//!
//! A theme covers the editor pane, the console and the status bar, and
//! carries the syntax palette handed to the highlighter.

use crate::highlight::SyntaxPalette;
use crate::state::ThemeKind;
use crate::terminal::Color;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Theme {
    pub editor_fg: Color,
    pub editor_bg: Color,
    pub line_number_fg: Color,
    pub line_number_bg: Color,

    pub console_fg: Color,
    pub console_bg: Color,
    pub console_input_fg: Color,
    pub console_title_fg: Color,
    pub console_title_bg: Color,

    pub text_field_fg: Color,
    pub text_field_bg: Color,
    pub prompt_label_fg: Color,

    pub statusbar_fg: Color,
    pub statusbar_bg: Color,

    pub syntax: SyntaxPalette,
}

impl Theme {
    pub fn for_kind(kind: ThemeKind) -> Self {
        match kind {
            ThemeKind::Light => Self::light(),
            ThemeKind::Dark => Self::dark(),
        }
    }

    pub fn light() -> Self {
        let panel = Color::Rgb(0xf0, 0xf0, 0xf0);
        let muted = Color::Rgb(0x66, 0x66, 0x66);
        Self {
            editor_fg: Color::Black,
            editor_bg: Color::White,
            line_number_fg: muted,
            line_number_bg: panel,

            console_fg: Color::Black,
            console_bg: Color::White,
            console_input_fg: Color::Rgb(0x00, 0x00, 0xff),
            console_title_fg: muted,
            console_title_bg: panel,

            text_field_fg: Color::Black,
            text_field_bg: Color::Rgb(0xe4, 0xe4, 0xe4),
            prompt_label_fg: Color::Rgb(0x00, 0x00, 0xff),

            statusbar_fg: muted,
            statusbar_bg: panel,

            syntax: SyntaxPalette {
                keyword: Color::Rgb(0x00, 0x00, 0xff),
                comment: Color::Rgb(0x00, 0x80, 0x00),
                string: Color::Rgb(0x80, 0x00, 0x80),
                number: Color::Rgb(0xff, 0x00, 0x00),
                builtin: Color::Rgb(0xff, 0xa5, 0x00),
            },
        }
    }

    pub fn dark() -> Self {
        let panel = Color::Rgb(0x25, 0x25, 0x26);
        let muted = Color::Rgb(0x85, 0x85, 0x85);
        let text = Color::Rgb(0xd4, 0xd4, 0xd4);
        let background = Color::Rgb(0x1e, 0x1e, 0x1e);
        Self {
            editor_fg: text,
            editor_bg: background,
            line_number_fg: muted,
            line_number_bg: panel,

            console_fg: text,
            console_bg: background,
            console_input_fg: Color::Rgb(0x56, 0x9c, 0xd6),
            console_title_fg: muted,
            console_title_bg: panel,

            text_field_fg: text,
            text_field_bg: Color::Rgb(0x3c, 0x3c, 0x3c),
            prompt_label_fg: Color::Rgb(0x56, 0x9c, 0xd6),

            statusbar_fg: muted,
            statusbar_bg: panel,

            syntax: SyntaxPalette {
                keyword: Color::Rgb(0x56, 0x9c, 0xd6),
                comment: Color::Rgb(0x6a, 0x99, 0x55),
                string: Color::Rgb(0xce, 0x91, 0x78),
                number: Color::Rgb(0xb5, 0xce, 0xa8),
                builtin: Color::Rgb(0xd7, 0xba, 0x7d),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palettes_differ_between_themes() {
        let light = Theme::for_kind(ThemeKind::Light);
        let dark = Theme::for_kind(ThemeKind::Dark);
        assert_ne!(light.syntax, dark.syntax);
        assert_eq!(dark.editor_bg, Color::Rgb(0x1e, 0x1e, 0x1e));
    }

    #[test]
    fn test_syntax_classes_are_distinct() {
        for theme in [Theme::light(), Theme::dark()] {
            let s = theme.syntax;
            let colors = [s.keyword, s.comment, s.string, s.number, s.builtin];
            for (i, a) in colors.iter().enumerate() {
                for b in &colors[i + 1..] {
                    assert_ne!(a, b);
                }
            }
        }
    }
}
