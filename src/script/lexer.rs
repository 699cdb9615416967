//! C-- lexer/tokenizer
//!
//! The lexer never fails. Malformed input (an unterminated string, a number
//! running into letters, a stray character) is returned as an `Invalid` token
//! so the highlighter can keep going; the parser reports it as a syntax error.

use std::iter::Peekable;
use std::str::CharIndices;

/// Token kinds
#[derive(Clone, Debug, PartialEq)]
pub enum TokenKind {
    // Literals
    Integer(i64),
    Float(f64),
    String(String),

    // Identifiers and keywords
    Identifier,
    Keyword(Keyword),
    Builtin(Builtin),

    Comment,

    // Operators
    Plus,
    Minus,
    Star,
    StarStar,
    Slash,
    Percent,
    PlusPlus,
    MinusMinus,
    Assign,
    PlusAssign,
    MinusAssign,
    StarAssign,
    SlashAssign,
    PercentAssign,
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    AndAnd,
    OrOr,
    Bang,

    // Punctuation
    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,
    Comma,
    Semicolon,

    /// Malformed span; the payload says what was wrong with it
    Invalid(&'static str),
}

/// C-- keywords
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Keyword {
    If,
    Else,
    For,
    While,
    Break,
    Continue,
    True,
    False,
    // Type names (accepted in declarations, ignored at run time)
    Int,
    Float,
    Double,
    StringType,
    Bool,
    Char,
    Var,
}

impl Keyword {
    fn lookup(word: &str) -> Option<Keyword> {
        match word {
            "if" => Some(Keyword::If),
            "else" => Some(Keyword::Else),
            "for" => Some(Keyword::For),
            "while" => Some(Keyword::While),
            "break" => Some(Keyword::Break),
            "continue" => Some(Keyword::Continue),
            "true" => Some(Keyword::True),
            "false" => Some(Keyword::False),
            "int" => Some(Keyword::Int),
            "float" => Some(Keyword::Float),
            "double" => Some(Keyword::Double),
            "string" => Some(Keyword::StringType),
            "bool" => Some(Keyword::Bool),
            "char" => Some(Keyword::Char),
            "var" => Some(Keyword::Var),
            _ => None,
        }
    }

    /// Whether the keyword names a type in a declaration (`int i = 0`)
    pub fn is_type(self) -> bool {
        matches!(
            self,
            Keyword::Int
                | Keyword::Float
                | Keyword::Double
                | Keyword::StringType
                | Keyword::Bool
                | Keyword::Char
                | Keyword::Var
        )
    }
}

/// Built-in functions
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Builtin {
    Print,
    Output,
    Input,
    Str,
    Len,
    Abs,
    Min,
    Max,
    Round,
    // Conversions spelled like type keywords: `int(x)`, `float(x)`
    Int,
    Float,
}

impl Builtin {
    pub const ALL: [Builtin; 11] = [
        Builtin::Print,
        Builtin::Output,
        Builtin::Input,
        Builtin::Str,
        Builtin::Len,
        Builtin::Abs,
        Builtin::Min,
        Builtin::Max,
        Builtin::Round,
        Builtin::Int,
        Builtin::Float,
    ];

    fn lookup(word: &str) -> Option<Builtin> {
        match word {
            "print" => Some(Builtin::Print),
            "output" => Some(Builtin::Output),
            "input" => Some(Builtin::Input),
            "str" => Some(Builtin::Str),
            "len" => Some(Builtin::Len),
            "abs" => Some(Builtin::Abs),
            "min" => Some(Builtin::Min),
            "max" => Some(Builtin::Max),
            "round" => Some(Builtin::Round),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Builtin::Print => "print",
            Builtin::Output => "output",
            Builtin::Input => "input",
            Builtin::Str => "str",
            Builtin::Len => "len",
            Builtin::Abs => "abs",
            Builtin::Min => "min",
            Builtin::Max => "max",
            Builtin::Round => "round",
            Builtin::Int => "int",
            Builtin::Float => "float",
        }
    }
}

/// Coarse token classes used for highlighting
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TokenClass {
    Keyword,
    Comment,
    String,
    Number,
    BuiltinName,
    Other,
}

impl TokenKind {
    pub fn class(&self) -> TokenClass {
        match self {
            TokenKind::Keyword(_) => TokenClass::Keyword,
            TokenKind::Comment => TokenClass::Comment,
            TokenKind::String(_) => TokenClass::String,
            TokenKind::Integer(_) | TokenKind::Float(_) => TokenClass::Number,
            TokenKind::Builtin(_) => TokenClass::BuiltinName,
            _ => TokenClass::Other,
        }
    }
}

/// A token with its source span (byte offsets) and 1-based line
#[derive(Clone, Debug, PartialEq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub lexeme: &'a str,
    pub start: usize,
    pub end: usize,
    pub line: usize,
}

/// Restartable token source over a document snapshot
#[derive(Clone, Copy, Debug)]
pub struct TokenStream<'a> {
    source: &'a str,
}

impl<'a> TokenStream<'a> {
    pub fn new(source: &'a str) -> Self {
        Self { source }
    }

    /// Start a fresh pass over the source
    pub fn iter(&self) -> Lexer<'a> {
        Lexer::new(self.source)
    }

    /// Tokens that carry a highlight class (everything except `Other`)
    pub fn highlightable(&self) -> impl Iterator<Item = Token<'a>> + 'a {
        self.iter().filter(|t| t.kind.class() != TokenClass::Other)
    }
}

impl<'a> IntoIterator for TokenStream<'a> {
    type Item = Token<'a>;
    type IntoIter = Lexer<'a>;

    fn into_iter(self) -> Lexer<'a> {
        self.iter()
    }
}

/// The lexer
pub struct Lexer<'a> {
    source: &'a str,
    chars: Peekable<CharIndices<'a>>,
    line: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            chars: source.char_indices().peekable(),
            line: 1,
        }
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().map(|&(_, c)| c)
    }

    /// Character after the current one
    fn peek_next(&self) -> Option<char> {
        let mut it = self.chars.clone();
        it.next();
        it.next().map(|(_, c)| c)
    }

    fn advance(&mut self) -> Option<char> {
        let (_, c) = self.chars.next()?;
        if c == '\n' {
            self.line += 1;
        }
        Some(c)
    }

    /// Byte offset of the next unread character
    fn offset(&mut self) -> usize {
        self.chars.peek().map_or(self.source.len(), |&(i, _)| i)
    }

    fn advance_if(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn read_line_comment(&mut self) -> TokenKind {
        while let Some(c) = self.peek() {
            if c == '\n' {
                break;
            }
            self.advance();
        }
        TokenKind::Comment
    }

    fn read_block_comment(&mut self) -> TokenKind {
        // Opening "/*" already consumed
        loop {
            match self.advance() {
                Some('*') if self.peek() == Some('/') => {
                    self.advance();
                    return TokenKind::Comment;
                }
                Some(_) => {}
                None => return TokenKind::Invalid("unterminated comment"),
            }
        }
    }

    fn read_string(&mut self, quote: char) -> TokenKind {
        let mut s = String::new();

        loop {
            match self.peek() {
                None | Some('\n') => return TokenKind::Invalid("unterminated string literal"),
                Some(c) if c == quote => {
                    self.advance();
                    return TokenKind::String(s);
                }
                Some('\\') => {
                    self.advance();
                    let escaped = match self.peek() {
                        Some('n') => '\n',
                        Some('t') => '\t',
                        Some('r') => '\r',
                        Some('0') => '\0',
                        Some('\\') => '\\',
                        Some('"') => '"',
                        Some('\'') => '\'',
                        _ => {
                            s.push('\\');
                            continue;
                        }
                    };
                    self.advance();
                    s.push(escaped);
                }
                Some(c) => {
                    s.push(c);
                    self.advance();
                }
            }
        }
    }

    fn read_number(&mut self, start: usize) -> TokenKind {
        let mut is_float = false;

        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            self.advance();
        }

        // Fractional part
        if self.peek() == Some('.') && matches!(self.peek_next(), Some(c) if c.is_ascii_digit()) {
            is_float = true;
            self.advance();
            while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
                self.advance();
            }
        }

        // Exponent
        if matches!(self.peek(), Some('e') | Some('E')) {
            let digits_follow = match self.peek_next() {
                Some(c) if c.is_ascii_digit() => true,
                Some('+') | Some('-') => {
                    let mut it = self.chars.clone();
                    it.next();
                    it.next();
                    matches!(it.next(), Some((_, c)) if c.is_ascii_digit())
                }
                _ => false,
            };
            if digits_follow {
                is_float = true;
                self.advance();
                if matches!(self.peek(), Some('+') | Some('-')) {
                    self.advance();
                }
                while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
                    self.advance();
                }
            }
        }

        // A number running straight into letters (`12ab`, `1e`) is malformed
        if matches!(self.peek(), Some(c) if c.is_alphanumeric() || c == '_') {
            while matches!(self.peek(), Some(c) if c.is_alphanumeric() || c == '_') {
                self.advance();
            }
            return TokenKind::Invalid("malformed number");
        }

        let text = &self.source[start..self.offset()];
        if !is_float {
            if let Ok(n) = text.parse::<i64>() {
                return TokenKind::Integer(n);
            }
        }
        match text.parse::<f64>() {
            Ok(f) => TokenKind::Float(f),
            Err(_) => TokenKind::Invalid("malformed number"),
        }
    }

    fn read_word(&mut self, start: usize) -> TokenKind {
        while matches!(self.peek(), Some(c) if c.is_alphanumeric() || c == '_') {
            self.advance();
        }
        let word = &self.source[start..self.offset()];

        if let Some(kw) = Keyword::lookup(word) {
            TokenKind::Keyword(kw)
        } else if let Some(b) = Builtin::lookup(word) {
            TokenKind::Builtin(b)
        } else {
            TokenKind::Identifier
        }
    }

    /// Get the next token, or `None` at end of input
    pub fn next_token(&mut self) -> Option<Token<'a>> {
        self.skip_whitespace();

        let start = self.offset();
        let line = self.line;
        let c = self.advance()?;

        let kind = match c {
            '/' if self.peek() == Some('/') => self.read_line_comment(),
            '/' if self.peek() == Some('*') => {
                self.advance();
                self.read_block_comment()
            }
            '"' | '\'' => self.read_string(c),
            '0'..='9' => self.read_number(start),
            '.' if matches!(self.peek(), Some(d) if d.is_ascii_digit()) => self.read_number(start),
            c if c.is_alphabetic() || c == '_' => self.read_word(start),

            '+' => {
                if self.advance_if('+') {
                    TokenKind::PlusPlus
                } else if self.advance_if('=') {
                    TokenKind::PlusAssign
                } else {
                    TokenKind::Plus
                }
            }
            '-' => {
                if self.advance_if('-') {
                    TokenKind::MinusMinus
                } else if self.advance_if('=') {
                    TokenKind::MinusAssign
                } else {
                    TokenKind::Minus
                }
            }
            '*' => {
                if self.advance_if('*') {
                    TokenKind::StarStar
                } else if self.advance_if('=') {
                    TokenKind::StarAssign
                } else {
                    TokenKind::Star
                }
            }
            '/' => {
                if self.advance_if('=') {
                    TokenKind::SlashAssign
                } else {
                    TokenKind::Slash
                }
            }
            '%' => {
                if self.advance_if('=') {
                    TokenKind::PercentAssign
                } else {
                    TokenKind::Percent
                }
            }
            '=' => {
                if self.advance_if('=') {
                    TokenKind::Equal
                } else {
                    TokenKind::Assign
                }
            }
            '!' => {
                if self.advance_if('=') {
                    TokenKind::NotEqual
                } else {
                    TokenKind::Bang
                }
            }
            '<' => {
                if self.advance_if('=') {
                    TokenKind::LessEqual
                } else {
                    TokenKind::Less
                }
            }
            '>' => {
                if self.advance_if('=') {
                    TokenKind::GreaterEqual
                } else {
                    TokenKind::Greater
                }
            }
            '&' => {
                if self.advance_if('&') {
                    TokenKind::AndAnd
                } else {
                    TokenKind::Invalid("unexpected character '&'")
                }
            }
            '|' => {
                if self.advance_if('|') {
                    TokenKind::OrOr
                } else {
                    TokenKind::Invalid("unexpected character '|'")
                }
            }
            '(' => TokenKind::LeftParen,
            ')' => TokenKind::RightParen,
            '{' => TokenKind::LeftBrace,
            '}' => TokenKind::RightBrace,
            ',' => TokenKind::Comma,
            ';' => TokenKind::Semicolon,

            _ => TokenKind::Invalid("unexpected character"),
        };

        let end = self.offset();
        Some(Token {
            kind,
            lexeme: &self.source[start..end],
            start,
            end,
            line,
        })
    }

    /// Tokenize entire input
    pub fn tokenize(&mut self) -> Vec<Token<'a>> {
        let mut tokens = Vec::new();
        while let Some(token) = self.next_token() {
            tokens.push(token);
        }
        tokens
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Token<'a>> {
        self.next_token()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        Lexer::new(src).map(|t| t.kind).collect()
    }

    #[test]
    fn test_simple_statement() {
        assert_eq!(
            kinds("x = 42;"),
            vec![
                TokenKind::Identifier,
                TokenKind::Assign,
                TokenKind::Integer(42),
                TokenKind::Semicolon,
            ]
        );
    }

    #[test]
    fn test_spans_and_lines() {
        let tokens = Lexer::new("a\n  print(\"hi\")").tokenize();
        assert_eq!(tokens[0].lexeme, "a");
        assert_eq!(tokens[0].line, 1);
        assert_eq!(tokens[1].kind, TokenKind::Builtin(Builtin::Print));
        assert_eq!(tokens[1].line, 2);
        assert_eq!((tokens[1].start, tokens[1].end), (4, 9));
        assert_eq!(tokens[3].kind, TokenKind::String("hi".to_string()));
        assert_eq!(tokens[3].lexeme, "\"hi\"");
    }

    #[test]
    fn test_operators() {
        assert_eq!(
            kinds("i ++ ** += != <= && || !"),
            vec![
                TokenKind::Identifier,
                TokenKind::PlusPlus,
                TokenKind::StarStar,
                TokenKind::PlusAssign,
                TokenKind::NotEqual,
                TokenKind::LessEqual,
                TokenKind::AndAnd,
                TokenKind::OrOr,
                TokenKind::Bang,
            ]
        );
    }

    #[test]
    fn test_numbers() {
        assert_eq!(
            kinds("7 2.5 1e3 .5"),
            vec![
                TokenKind::Integer(7),
                TokenKind::Float(2.5),
                TokenKind::Float(1000.0),
                TokenKind::Float(0.5),
            ]
        );
    }

    #[test]
    fn test_comments() {
        let tokens = Lexer::new("// line\nx /* block\nstill */ y").tokenize();
        assert_eq!(tokens[0].kind, TokenKind::Comment);
        assert_eq!(tokens[0].lexeme, "// line");
        assert_eq!(tokens[2].kind, TokenKind::Comment);
        assert_eq!(tokens[2].lexeme, "/* block\nstill */");
        assert_eq!(tokens[3].line, 3);
    }

    #[test]
    fn test_string_escapes() {
        assert_eq!(
            kinds(r#""a\tb\"c" 'd'"#),
            vec![
                TokenKind::String("a\tb\"c".to_string()),
                TokenKind::String("d".to_string()),
            ]
        );
    }

    #[test]
    fn test_malformed_input_degrades_to_invalid() {
        let tokens = Lexer::new("x = \"open\ny = 12ab @ 3").tokenize();
        assert!(matches!(tokens[2].kind, TokenKind::Invalid(_)));
        assert_eq!(tokens[2].lexeme, "\"open");
        // Lexing continues on the next line
        assert_eq!(tokens[3].lexeme, "y");
        assert!(matches!(tokens[5].kind, TokenKind::Invalid(_)));
        assert_eq!(tokens[5].lexeme, "12ab");
        assert!(matches!(tokens[6].kind, TokenKind::Invalid(_)));
        assert_eq!(tokens[7].kind, TokenKind::Integer(3));
        assert!(tokens.iter().all(|t| !matches!(t.kind, TokenKind::Invalid(_)) || t.kind.class() == TokenClass::Other));
    }

    #[test]
    fn test_unterminated_block_comment() {
        let tokens = Lexer::new("x /* never closed").tokenize();
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[1].kind, TokenKind::Invalid("unterminated comment"));
    }

    #[test]
    fn test_classes() {
        let stream = TokenStream::new("if (x) { print(\"s\", 1); } // c");
        let classes: Vec<TokenClass> = stream.highlightable().map(|t| t.kind.class()).collect();
        assert_eq!(
            classes,
            vec![
                TokenClass::Keyword,
                TokenClass::BuiltinName,
                TokenClass::String,
                TokenClass::Number,
                TokenClass::Comment,
            ]
        );
    }

    #[test]
    fn test_stream_is_restartable() {
        let stream = TokenStream::new("a = 1; b = 2;");
        let first: Vec<_> = stream.iter().collect();
        let second: Vec<_> = stream.iter().collect();
        assert_eq!(first, second);
        assert_eq!(first.len(), 8);
    }
}
