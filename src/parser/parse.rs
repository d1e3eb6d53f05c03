//! Main parser coordinator
//!
//! This module provides the [`Parser`] struct, the [`ParseError`] type, the
//! shared helper methods and the [`rewrite`] entry point.
//!
//! # Parser Architecture
//!
//! The Parser is recursive descent, split across files with `impl Parser`
//! blocks:
//! - This module: Parser struct, helpers, error recovery, program assembly
//! - `declarations`: functions, scalar/array declarations, container declarations
//! - `statements`: control flow, line markers, boilerplate stripping
//! - `expressions`: precedence climbing over the C operator table
//!
//! # Totality
//!
//! Lowering never fails. A statement that does not parse is replaced in
//! place by [`Stmt::Malformed`] and the parser resynchronizes at the next
//! `;` or at the closing `}` of the enclosing block. The failure surfaces
//! only if execution reaches that statement.

use crate::parser::ast::*;
use crate::parser::lexer::{Lexer, Token, TokenKind};
use std::fmt;
use std::rc::Rc;

/// Parser error type
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub message: String,
    pub location: SourceLocation,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Parse error at line {}, column {}: {}",
            self.location.line, self.location.column, self.message
        )
    }
}

impl std::error::Error for ParseError {}

/// Lower restricted-language source into a runnable [`Program`].
///
/// Total: unrecognized constructs become [`Stmt::Malformed`] statements.
/// When a `main` function is defined, one call to it is appended to the
/// program body.
pub fn rewrite(source: &str) -> Program {
    Parser::new(source).parse_program()
}

/// Deepest statement and expression nesting accepted before a construct is
/// rejected as malformed. Keeps both the parser and the tree walk well inside
/// the native stack.
pub const MAX_NESTING: usize = 256;

/// Recursive descent parser for the container language
pub struct Parser {
    pub(crate) tokens: Vec<Token>,
    pub(crate) position: usize,
    /// Trimmed source lines, cited by line markers
    lines: Vec<Rc<str>>,
    /// Current recursion depth across statements and expressions
    depth: usize,
}

impl Parser {
    pub fn new(source: &str) -> Self {
        let tokens = Lexer::new(source).tokenize();
        let lines = source.lines().map(|line| Rc::from(line.trim())).collect();
        Self {
            tokens,
            position: 0,
            lines,
            depth: 0,
        }
    }

    /// Run `parse` one nesting level deeper, failing once [`MAX_NESTING`]
    /// levels are open
    pub(crate) fn nested<T>(
        &mut self,
        parse: impl FnOnce(&mut Self) -> Result<T, ParseError>,
    ) -> Result<T, ParseError> {
        if self.depth >= MAX_NESTING {
            return Err(self.error_here("Nesting too deep"));
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    /// Parse the entire program: function definitions plus top-level statements
    pub fn parse_program(&mut self) -> Program {
        let mut program = Program::new();

        while !self.is_at_end() {
            if self.check(&TokenKind::RBrace) {
                let marker = self.line_marker();
                let error = self.error_here("Unmatched '}'");
                self.advance();
                program.body.push(marker);
                program.body.push(Stmt::Malformed(error));
                continue;
            }

            if !self.looks_like_function() {
                self.parse_statement_into(&mut program.body);
                continue;
            }

            let start = self.position;
            let marker = self.line_marker();
            match self.parse_function_definition() {
                Ok(Some(function)) => {
                    // A later definition replaces an earlier one
                    program.functions.retain(|f| f.name != function.name);
                    program.functions.push(function);
                }
                Ok(None) => {}
                Err(error) => {
                    program.body.push(marker);
                    program.body.push(Stmt::Malformed(error));
                    self.synchronize(start);
                }
            }
        }

        if program.function("main").is_some() {
            program.body.push(Stmt::Expr(Expr::Call {
                name: "main".to_string(),
                args: Vec::new(),
            }));
            program.entry = Some("main".to_string());
        }

        program
    }

    /// Parse one statement, prefixed by its line marker. Statements that
    /// lower to nothing (boilerplate, empty statements) produce no marker.
    pub(crate) fn parse_statement_into(&mut self, out: &mut Vec<Stmt>) {
        let start = self.position;
        let marker = self.line_marker();

        match self.parse_statement() {
            Ok(stmts) if stmts.is_empty() => {}
            Ok(stmts) => {
                out.push(marker);
                out.extend(stmts);
            }
            Err(error) => {
                out.push(marker);
                out.push(Stmt::Malformed(error));
                self.synchronize(start);
            }
        }
    }

    /// Skip past the construct that failed to parse: through the next `;` at
    /// brace depth zero, through a `{ ... }` block opened while skipping, or
    /// up to (not including) the `}` closing the enclosing block.
    pub(crate) fn synchronize(&mut self, start: usize) {
        let mut depth = 0usize;

        loop {
            match self.peek_kind() {
                TokenKind::Eof => return,
                TokenKind::Semicolon if depth == 0 => {
                    self.advance();
                    return;
                }
                TokenKind::LBrace => {
                    depth += 1;
                    self.advance();
                }
                TokenKind::RBrace if depth == 0 => {
                    if self.position == start {
                        self.advance();
                    }
                    return;
                }
                TokenKind::RBrace => {
                    depth -= 1;
                    self.advance();
                    if depth == 0 {
                        return;
                    }
                }
                _ => {
                    self.advance();
                }
            }
        }
    }

    /// Line marker for the statement starting at the current token
    pub(crate) fn line_marker(&self) -> Stmt {
        let number = self.current_location().line;
        let text = number
            .checked_sub(1)
            .and_then(|i| self.lines.get(i))
            .cloned()
            .unwrap_or_else(|| Rc::from(""));
        Stmt::Line(SourceLine { number, text })
    }

    /// Lookahead: does a function definition or prototype start here?
    ///
    /// Matches `type... name (` where the type is a run of scalar type names,
    /// a generic `name<...>`, or a single user identifier, optionally followed
    /// by `*`/`&`.
    pub(crate) fn looks_like_function(&self) -> bool {
        let mut i = self.position;
        let mut saw_type = false;

        loop {
            match self.kind_at(i) {
                TokenKind::Const => i += 1,
                TokenKind::TypeName(_) => {
                    saw_type = true;
                    i += 1;
                }
                TokenKind::Ident(_) if !saw_type => {
                    if matches!(self.kind_at(i + 1), TokenKind::Lt) {
                        match self.template_end(i + 1) {
                            Some(end) => i = end,
                            None => return false,
                        }
                    } else if matches!(self.kind_at(i + 1), TokenKind::Ident(_)) {
                        i += 1;
                    } else {
                        return false;
                    }
                    saw_type = true;
                }
                _ => break,
            }
        }

        while matches!(self.kind_at(i), TokenKind::Star | TokenKind::Amp) {
            i += 1;
        }

        saw_type
            && matches!(self.kind_at(i), TokenKind::Ident(_))
            && matches!(self.kind_at(i + 1), TokenKind::LParen)
    }

    /// Index just past the `>` closing the template argument list that opens
    /// at `open`. `None` if the list is not closed before `;`, `{` or EOF.
    pub(crate) fn template_end(&self, open: usize) -> Option<usize> {
        let mut depth = 0i32;
        let mut i = open;

        loop {
            match self.kind_at(i) {
                TokenKind::Lt => depth += 1,
                TokenKind::Gt => depth -= 1,
                TokenKind::GtGt => depth -= 2,
                TokenKind::Semicolon | TokenKind::LBrace | TokenKind::Eof => return None,
                _ => {}
            }
            i += 1;
            if depth <= 0 {
                return Some(i);
            }
        }
    }

    /// Consume a template argument list (`<...>`, nesting and `>>` included)
    pub(crate) fn skip_template_args(&mut self) -> Result<(), ParseError> {
        match self.template_end(self.position) {
            Some(end) if self.check(&TokenKind::Lt) => {
                self.position = end;
                Ok(())
            }
            _ => Err(self.error_here("Unterminated template argument list")),
        }
    }

    /// Consume tokens through the next `;` (boilerplate statements)
    pub(crate) fn skip_statement(&mut self) {
        while !self.is_at_end() {
            if self.advance().kind == TokenKind::Semicolon {
                break;
            }
        }
    }

    // ===== Helper methods =====

    pub(crate) fn kind_at(&self, index: usize) -> &TokenKind {
        let last = self.tokens.len() - 1;
        &self.tokens[index.min(last)].kind
    }

    pub(crate) fn peek_kind(&self) -> &TokenKind {
        self.kind_at(self.position)
    }

    pub(crate) fn peek_ahead(&self, n: usize) -> &TokenKind {
        self.kind_at(self.position + n)
    }

    pub(crate) fn check(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(self.peek_kind()) == std::mem::discriminant(kind)
    }

    pub(crate) fn match_token(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.position += 1;
        }
        self.previous()
    }

    pub(crate) fn is_at_end(&self) -> bool {
        matches!(self.peek_kind(), TokenKind::Eof)
    }

    pub(crate) fn peek(&self) -> &Token {
        &self.tokens[self.position.min(self.tokens.len() - 1)]
    }

    pub(crate) fn previous(&self) -> &Token {
        &self.tokens[self.position.saturating_sub(1)]
    }

    pub(crate) fn current_location(&self) -> SourceLocation {
        self.peek().location
    }

    pub(crate) fn error_here(&self, message: &str) -> ParseError {
        ParseError {
            message: message.to_string(),
            location: self.current_location(),
        }
    }

    pub(crate) fn expect_token(&mut self, kind: &TokenKind, ctx: &str) -> Result<(), ParseError> {
        if self.check(kind) {
            self.advance();
            Ok(())
        } else {
            Err(ParseError {
                message: format!("Expected {} {}, found {}", kind, ctx, self.peek().kind),
                location: self.current_location(),
            })
        }
    }

    pub(crate) fn expect_lparen(&mut self, ctx: &str) -> Result<(), ParseError> {
        self.expect_token(&TokenKind::LParen, ctx)
    }

    pub(crate) fn expect_rparen(&mut self, ctx: &str) -> Result<(), ParseError> {
        self.expect_token(&TokenKind::RParen, ctx)
    }

    pub(crate) fn expect_rbrace(&mut self, ctx: &str) -> Result<(), ParseError> {
        self.expect_token(&TokenKind::RBrace, ctx)
    }

    pub(crate) fn expect_semicolon(&mut self, ctx: &str) -> Result<(), ParseError> {
        self.expect_token(&TokenKind::Semicolon, ctx)
    }

    pub(crate) fn expect_identifier(&mut self) -> Result<String, ParseError> {
        if let TokenKind::Ident(name) = self.peek_kind() {
            let name = name.clone();
            self.advance();
            Ok(name)
        } else {
            Err(ParseError {
                message: format!("Expected identifier, found {}", self.peek().kind),
                location: self.current_location(),
            })
        }
    }
}
