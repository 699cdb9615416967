//! C-- parser - produces an AST

use crate::script::error::ScriptError;
use crate::script::lexer::{Builtin, Keyword, Token, TokenKind};

/// Expression types
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Integer(i64),
    Float(f64),
    String(String),
    Bool(bool),
    /// Variable reference
    Variable(String),
    BinaryOp(Box<Expr>, BinOp, Box<Expr>),
    UnaryOp(UnaryOp, Box<Expr>),
    /// Call of a named function; resolved at run time
    Call(Callee, Vec<Expr>),
}

/// What a call expression refers to
#[derive(Clone, Debug, PartialEq)]
pub enum Callee {
    Builtin(Builtin),
    /// Unknown name; calling it is a runtime error
    Named(String),
}

/// Binary operators
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

/// Unary operators
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Plus,
    Not,
}

/// A statement with the line it starts on
#[derive(Clone, Debug, PartialEq)]
pub struct Stmt {
    pub line: usize,
    pub kind: StmtKind,
}

/// Statement types
#[derive(Clone, Debug, PartialEq)]
pub enum StmtKind {
    /// Expression evaluated for its effects, e.g. `print(x);`
    Expression(Expr),

    /// `name = expr`, or a compound assignment such as `name += expr`
    Assign {
        name: String,
        op: Option<BinOp>,
        value: Expr,
    },

    /// `name++` / `name--`
    Increment { name: String, delta: i64 },

    If {
        condition: Expr,
        then_branch: Vec<Stmt>,
        else_branch: Option<Vec<Stmt>>,
    },

    While { condition: Expr, body: Vec<Stmt> },

    For {
        init: Option<Box<Stmt>>,
        condition: Option<Expr>,
        update: Option<Box<Stmt>>,
        body: Vec<Stmt>,
    },

    Block(Vec<Stmt>),

    Break,
    Continue,
}

/// Deepest statement/expression nesting accepted. Evaluating and dropping a
/// tree recurses once per level, so this bounds stack use after parsing too.
const MAX_NESTING: usize = 128;

/// Parser for C--
pub struct Parser<'a> {
    tokens: Vec<Token<'a>>,
    pos: usize,
    /// Number of enclosing loops, for validating `break`/`continue`
    loop_depth: usize,
    /// Current nesting of statements, sub-expressions and operator chains
    depth: usize,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: Vec<Token<'a>>) -> Self {
        // Comments never reach the grammar
        let tokens = tokens
            .into_iter()
            .filter(|t| t.kind != TokenKind::Comment)
            .collect();
        Self {
            tokens,
            pos: 0,
            loop_depth: 0,
            depth: 0,
        }
    }

    fn current(&self) -> Option<&Token<'a>> {
        self.tokens.get(self.pos)
    }

    fn peek(&self) -> Option<&TokenKind> {
        self.current().map(|t| &t.kind)
    }

    fn peek_at(&self, offset: usize) -> Option<&TokenKind> {
        self.tokens.get(self.pos + offset).map(|t| &t.kind)
    }

    /// Line of the current token, or of the last token at end of input
    fn line(&self) -> usize {
        self.current()
            .or_else(|| self.tokens.last())
            .map_or(1, |t| t.line)
    }

    fn check(&self, kind: &TokenKind) -> bool {
        self.peek() == Some(kind)
    }

    fn check_keyword(&self, kw: Keyword) -> bool {
        self.peek() == Some(&TokenKind::Keyword(kw))
    }

    fn advance(&mut self) -> Option<&Token<'a>> {
        let token = self.tokens.get(self.pos);
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn error(&self, msg: impl Into<String>) -> ScriptError {
        ScriptError::Syntax {
            line: self.line(),
            message: msg.into(),
        }
    }

    /// Describe the current token for error messages
    fn describe_current(&self) -> String {
        match self.current() {
            None => "end of input".to_string(),
            Some(t) => match &t.kind {
                TokenKind::Invalid(reason) => format!("{} '{}'", reason, t.lexeme),
                _ => format!("'{}'", t.lexeme),
            },
        }
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> Result<(), ScriptError> {
        if self.check(&kind) {
            self.advance();
            Ok(())
        } else if let Some(TokenKind::Invalid(_)) = self.peek() {
            Err(self.error(self.describe_current()))
        } else {
            Err(self.error(format!("expected {}, found {}", what, self.describe_current())))
        }
    }

    /// Go one level deeper, failing past `MAX_NESTING`
    fn enter(&mut self, what: &str) -> Result<(), ScriptError> {
        if self.depth >= MAX_NESTING {
            return Err(self.error(format!("{} nested too deeply", what)));
        }
        self.depth += 1;
        Ok(())
    }

    fn nested<T>(
        &mut self,
        what: &str,
        parse: impl FnOnce(&mut Self) -> Result<T, ScriptError>,
    ) -> Result<T, ScriptError> {
        self.enter(what)?;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    /// Left-associative chain `next (op next)*`. Each operator deepens the
    /// resulting tree by one level.
    fn parse_chain(
        &mut self,
        next: fn(&mut Self) -> Result<Expr, ScriptError>,
        operator: fn(&TokenKind) -> Option<BinOp>,
    ) -> Result<Expr, ScriptError> {
        let mut left = next(self)?;
        let mut levels = 0;
        let result = loop {
            let Some(op) = self.peek().and_then(operator) else {
                break Ok(left);
            };
            if let Err(e) = self.enter("expression") {
                break Err(e);
            }
            levels += 1;
            self.advance();
            match next(self) {
                Ok(right) => left = Expr::BinaryOp(Box::new(left), op, Box::new(right)),
                Err(e) => break Err(e),
            }
        };
        self.depth -= levels;
        result
    }

    /// Parse the entire program
    pub fn parse(&mut self) -> Result<Vec<Stmt>, ScriptError> {
        let mut statements = Vec::new();
        while self.current().is_some() {
            statements.push(self.parse_statement()?);
        }
        Ok(statements)
    }

    fn parse_statement(&mut self) -> Result<Stmt, ScriptError> {
        self.nested("statements", Self::parse_statement_inner)
    }

    fn parse_statement_inner(&mut self) -> Result<Stmt, ScriptError> {
        let line = self.line();

        let kind = match self.peek() {
            Some(TokenKind::Keyword(Keyword::If)) => {
                self.advance();
                self.parse_if()?
            }
            Some(TokenKind::Keyword(Keyword::While)) => {
                self.advance();
                self.parse_while()?
            }
            Some(TokenKind::Keyword(Keyword::For)) => {
                self.advance();
                self.parse_for()?
            }
            Some(TokenKind::LeftBrace) => StmtKind::Block(self.parse_block()?),
            Some(TokenKind::Keyword(Keyword::Break)) => {
                if self.loop_depth == 0 {
                    return Err(self.error("'break' outside loop"));
                }
                self.advance();
                self.end_statement()?;
                StmtKind::Break
            }
            Some(TokenKind::Keyword(Keyword::Continue)) => {
                if self.loop_depth == 0 {
                    return Err(self.error("'continue' outside loop"));
                }
                self.advance();
                self.end_statement()?;
                StmtKind::Continue
            }
            Some(TokenKind::Semicolon) => {
                // Stray semicolon: empty statement
                self.advance();
                StmtKind::Block(Vec::new())
            }
            _ => {
                let kind = self.parse_simple()?;
                self.end_statement()?;
                kind
            }
        };

        Ok(Stmt { line, kind })
    }

    /// A simple statement ends with `;`, or implicitly at a line break,
    /// before `}` or at end of input
    fn end_statement(&mut self) -> Result<(), ScriptError> {
        if self.check(&TokenKind::Semicolon) {
            self.advance();
            return Ok(());
        }
        match self.current() {
            None => Ok(()),
            Some(t) if t.kind == TokenKind::RightBrace => Ok(()),
            Some(t) => {
                let prev_line = self.tokens[self.pos - 1].line;
                let prev_end_line = prev_line + self.tokens[self.pos - 1].lexeme.matches('\n').count();
                if t.line > prev_end_line {
                    Ok(())
                } else {
                    Err(self.error(format!("expected ';', found {}", self.describe_current())))
                }
            }
        }
    }

    /// Assignment, increment or bare expression (no terminator)
    fn parse_simple(&mut self) -> Result<StmtKind, ScriptError> {
        // Optional type prefix: `int i = 0`
        if let Some(TokenKind::Keyword(kw)) = self.peek() {
            if kw.is_type() && self.peek_at(1) == Some(&TokenKind::Identifier) {
                self.advance();
            }
        }

        if self.check(&TokenKind::Identifier) {
            let op = match self.peek_at(1) {
                Some(TokenKind::Assign) => Some(None),
                Some(TokenKind::PlusAssign) => Some(Some(BinOp::Add)),
                Some(TokenKind::MinusAssign) => Some(Some(BinOp::Sub)),
                Some(TokenKind::StarAssign) => Some(Some(BinOp::Mul)),
                Some(TokenKind::SlashAssign) => Some(Some(BinOp::Div)),
                Some(TokenKind::PercentAssign) => Some(Some(BinOp::Mod)),
                _ => None,
            };

            if let Some(op) = op {
                let name = self.identifier_name();
                self.advance(); // operator
                let value = self.parse_expression()?;
                return Ok(StmtKind::Assign { name, op, value });
            }

            let delta = match self.peek_at(1) {
                Some(TokenKind::PlusPlus) => Some(1),
                Some(TokenKind::MinusMinus) => Some(-1),
                _ => None,
            };
            if let Some(delta) = delta {
                let name = self.identifier_name();
                self.advance();
                return Ok(StmtKind::Increment { name, delta });
            }
        }

        Ok(StmtKind::Expression(self.parse_expression()?))
    }

    /// Consume the current identifier token and return its text
    fn identifier_name(&mut self) -> String {
        self.advance().map(|t| t.lexeme.to_string()).unwrap_or_default()
    }

    fn parse_block(&mut self) -> Result<Vec<Stmt>, ScriptError> {
        self.expect(TokenKind::LeftBrace, "'{'")?;
        let mut statements = Vec::new();
        loop {
            match self.peek() {
                Some(TokenKind::RightBrace) => {
                    self.advance();
                    return Ok(statements);
                }
                None => return Err(self.error("expected '}' before end of input")),
                _ => statements.push(self.parse_statement()?),
            }
        }
    }

    /// Braced block or a single statement
    fn parse_body(&mut self) -> Result<Vec<Stmt>, ScriptError> {
        if self.check(&TokenKind::LeftBrace) {
            self.parse_block()
        } else {
            Ok(vec![self.parse_statement()?])
        }
    }

    fn parse_condition(&mut self) -> Result<Expr, ScriptError> {
        self.expect(TokenKind::LeftParen, "'('")?;
        let condition = self.parse_expression()?;
        self.expect(TokenKind::RightParen, "')'")?;
        Ok(condition)
    }

    fn parse_if(&mut self) -> Result<StmtKind, ScriptError> {
        let condition = self.parse_condition()?;
        let then_branch = self.parse_body()?;

        let else_branch = if self.check_keyword(Keyword::Else) {
            self.advance();
            if self.check_keyword(Keyword::If) {
                let line = self.line();
                self.advance();
                let nested = self.nested("statements", Self::parse_if)?;
                Some(vec![Stmt { line, kind: nested }])
            } else {
                Some(self.parse_body()?)
            }
        } else {
            None
        };

        Ok(StmtKind::If {
            condition,
            then_branch,
            else_branch,
        })
    }

    fn parse_loop_body(&mut self) -> Result<Vec<Stmt>, ScriptError> {
        self.loop_depth += 1;
        let body = self.parse_body();
        self.loop_depth -= 1;
        body
    }

    fn parse_while(&mut self) -> Result<StmtKind, ScriptError> {
        let condition = self.parse_condition()?;
        let body = self.parse_loop_body()?;
        Ok(StmtKind::While { condition, body })
    }

    fn parse_for(&mut self) -> Result<StmtKind, ScriptError> {
        self.expect(TokenKind::LeftParen, "'('")?;

        let init = if self.check(&TokenKind::Semicolon) {
            None
        } else {
            let line = self.line();
            Some(Box::new(Stmt {
                line,
                kind: self.parse_simple()?,
            }))
        };
        self.expect(TokenKind::Semicolon, "';'")?;

        let condition = if self.check(&TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect(TokenKind::Semicolon, "';'")?;

        let update = if self.check(&TokenKind::RightParen) {
            None
        } else {
            let line = self.line();
            Some(Box::new(Stmt {
                line,
                kind: self.parse_simple()?,
            }))
        };
        self.expect(TokenKind::RightParen, "')'")?;

        let body = self.parse_loop_body()?;
        Ok(StmtKind::For {
            init,
            condition,
            update,
            body,
        })
    }

    /// Parse an expression
    pub fn parse_expression(&mut self) -> Result<Expr, ScriptError> {
        self.nested("expression", Self::parse_or)
    }

    fn parse_or(&mut self) -> Result<Expr, ScriptError> {
        self.parse_chain(Self::parse_and, |kind| match kind {
            TokenKind::OrOr => Some(BinOp::Or),
            _ => None,
        })
    }

    fn parse_and(&mut self) -> Result<Expr, ScriptError> {
        self.parse_chain(Self::parse_equality, |kind| match kind {
            TokenKind::AndAnd => Some(BinOp::And),
            _ => None,
        })
    }

    fn parse_equality(&mut self) -> Result<Expr, ScriptError> {
        self.parse_chain(Self::parse_comparison, |kind| match kind {
            TokenKind::Equal => Some(BinOp::Eq),
            TokenKind::NotEqual => Some(BinOp::Ne),
            _ => None,
        })
    }

    fn parse_comparison(&mut self) -> Result<Expr, ScriptError> {
        self.parse_chain(Self::parse_additive, |kind| match kind {
            TokenKind::Less => Some(BinOp::Lt),
            TokenKind::LessEqual => Some(BinOp::Le),
            TokenKind::Greater => Some(BinOp::Gt),
            TokenKind::GreaterEqual => Some(BinOp::Ge),
            _ => None,
        })
    }

    fn parse_additive(&mut self) -> Result<Expr, ScriptError> {
        self.parse_chain(Self::parse_term, |kind| match kind {
            TokenKind::Plus => Some(BinOp::Add),
            TokenKind::Minus => Some(BinOp::Sub),
            _ => None,
        })
    }

    fn parse_term(&mut self) -> Result<Expr, ScriptError> {
        self.parse_chain(Self::parse_unary, |kind| match kind {
            TokenKind::Star => Some(BinOp::Mul),
            TokenKind::Slash => Some(BinOp::Div),
            TokenKind::Percent => Some(BinOp::Mod),
            _ => None,
        })
    }

    fn parse_unary(&mut self) -> Result<Expr, ScriptError> {
        let op = match self.peek() {
            Some(TokenKind::Bang) => Some(UnaryOp::Not),
            Some(TokenKind::Minus) => Some(UnaryOp::Neg),
            Some(TokenKind::Plus) => Some(UnaryOp::Plus),
            _ => None,
        };
        if let Some(op) = op {
            self.advance();
            let operand = self.nested("expression", Self::parse_unary)?;
            return Ok(Expr::UnaryOp(op, Box::new(operand)));
        }
        self.parse_power()
    }

    /// `**` binds tighter than unary minus on its left and is right-associative
    fn parse_power(&mut self) -> Result<Expr, ScriptError> {
        let base = self.parse_call()?;
        if self.check(&TokenKind::StarStar) {
            self.advance();
            let exponent = self.nested("expression", Self::parse_unary)?;
            return Ok(Expr::BinaryOp(Box::new(base), BinOp::Pow, Box::new(exponent)));
        }
        Ok(base)
    }

    fn parse_call(&mut self) -> Result<Expr, ScriptError> {
        let callee = match self.peek() {
            Some(TokenKind::Builtin(b)) => Some(Callee::Builtin(*b)),
            Some(TokenKind::Keyword(Keyword::Int)) if self.peek_at(1) == Some(&TokenKind::LeftParen) => {
                Some(Callee::Builtin(Builtin::Int))
            }
            Some(TokenKind::Keyword(Keyword::Float)) if self.peek_at(1) == Some(&TokenKind::LeftParen) => {
                Some(Callee::Builtin(Builtin::Float))
            }
            Some(TokenKind::Identifier) if self.peek_at(1) == Some(&TokenKind::LeftParen) => {
                self.current().map(|t| Callee::Named(t.lexeme.to_string()))
            }
            _ => None,
        };

        let Some(callee) = callee else {
            return self.parse_primary();
        };

        if let Callee::Builtin(b) = callee {
            if self.peek_at(1) != Some(&TokenKind::LeftParen) {
                return Err(self.error(format!("expected '(' after '{}'", b.name())));
            }
        }

        self.advance(); // name
        self.advance(); // '('
        let mut args = Vec::new();
        if !self.check(&TokenKind::RightParen) {
            loop {
                args.push(self.parse_expression()?);
                if self.check(&TokenKind::Comma) {
                    self.advance();
                } else {
                    break;
                }
            }
        }
        self.expect(TokenKind::RightParen, "')'")?;
        Ok(Expr::Call(callee, args))
    }

    fn parse_primary(&mut self) -> Result<Expr, ScriptError> {
        let Some(token) = self.current() else {
            return Err(self.error("unexpected end of input"));
        };
        let kind = token.kind.clone();
        let lexeme = token.lexeme;

        let expr = match kind {
            TokenKind::Integer(n) => Expr::Integer(n),
            TokenKind::Float(f) => Expr::Float(f),
            TokenKind::String(s) => Expr::String(s),
            TokenKind::Keyword(Keyword::True) => Expr::Bool(true),
            TokenKind::Keyword(Keyword::False) => Expr::Bool(false),
            TokenKind::Identifier => Expr::Variable(lexeme.to_string()),
            TokenKind::LeftParen => {
                self.advance();
                let inner = self.parse_expression()?;
                self.expect(TokenKind::RightParen, "')'")?;
                return Ok(inner);
            }
            TokenKind::Invalid(_) => return Err(self.error(self.describe_current())),
            _ => {
                return Err(self.error(format!(
                    "expected expression, found {}",
                    self.describe_current()
                )))
            }
        };

        self.advance();
        Ok(expr)
    }
}
