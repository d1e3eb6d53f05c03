//! Lexer (tokenizer) for the container language
//!
//! Converts raw source text into a flat [`Token`] stream consumed by the
//! parser. The lexer never fails: characters it cannot classify and
//! unterminated literals become [`TokenKind::Invalid`], and the parser turns
//! whatever statement contains them into a deferred failure.
//!
//! Preprocessor lines (`#include ...`) and comments are skipped, and the
//! `std::` qualifier is dropped so `std::stack<int>` lexes like `stack<int>`.

use super::ast::SourceLocation;
use std::fmt;

/// Scalar type names accepted in declarations and signatures
pub const SCALAR_TYPES: &[&str] = &[
    "int", "double", "string", "bool", "float", "char", "auto", "long", "unsigned", "short",
    "void", "signed", "size_t",
];

/// All token kinds produced by the lexer
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Literals
    IntLiteral(i64),
    FloatLiteral(f64),
    StringLiteral(String),
    CharLiteral(char),

    // Identifiers and scalar type names
    Ident(String),
    TypeName(String),

    // Keywords
    If,
    Else,
    While,
    Do,
    For,
    Return,
    Break,
    Continue,
    True,
    False,
    Null,
    Const,
    Using,
    Namespace,

    // Arithmetic
    Plus,
    Minus,
    Star,
    Slash,
    Percent,

    // Comparison
    EqEq,
    NotEq,
    Lt,
    Le,
    Gt,
    Ge,

    // Logical
    AndAnd,
    OrOr,
    Bang,

    // Bitwise
    Amp,
    Pipe,
    Caret,
    Tilde,
    LtLt,
    GtGt,

    // Assignment
    Eq,
    PlusEq,
    MinusEq,
    StarEq,
    SlashEq,
    PercentEq,

    // Increment/Decrement
    PlusPlus,
    MinusMinus,

    // Member access
    Dot,
    Arrow,
    ColonColon,

    // Ternary
    Question,
    Colon,

    // Punctuation
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Semicolon,
    Comma,

    /// Something the lexer could not classify; carries a description
    Invalid(String),

    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::IntLiteral(n) => write!(f, "int literal {}", n),
            TokenKind::FloatLiteral(x) => write!(f, "float literal {}", x),
            TokenKind::StringLiteral(s) => write!(f, "string literal {:?}", s),
            TokenKind::CharLiteral(c) => write!(f, "char literal {:?}", c),
            TokenKind::Ident(s) => write!(f, "identifier '{}'", s),
            TokenKind::TypeName(s) => write!(f, "type '{}'", s),
            TokenKind::Invalid(msg) => write!(f, "{}", msg),
            TokenKind::Eof => write!(f, "end of file"),
            other => write!(f, "'{}'", other.symbol()),
        }
    }
}

impl TokenKind {
    fn symbol(&self) -> &'static str {
        match self {
            TokenKind::If => "if",
            TokenKind::Else => "else",
            TokenKind::While => "while",
            TokenKind::Do => "do",
            TokenKind::For => "for",
            TokenKind::Return => "return",
            TokenKind::Break => "break",
            TokenKind::Continue => "continue",
            TokenKind::True => "true",
            TokenKind::False => "false",
            TokenKind::Null => "nullptr",
            TokenKind::Const => "const",
            TokenKind::Using => "using",
            TokenKind::Namespace => "namespace",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Star => "*",
            TokenKind::Slash => "/",
            TokenKind::Percent => "%",
            TokenKind::EqEq => "==",
            TokenKind::NotEq => "!=",
            TokenKind::Lt => "<",
            TokenKind::Le => "<=",
            TokenKind::Gt => ">",
            TokenKind::Ge => ">=",
            TokenKind::AndAnd => "&&",
            TokenKind::OrOr => "||",
            TokenKind::Bang => "!",
            TokenKind::Amp => "&",
            TokenKind::Pipe => "|",
            TokenKind::Caret => "^",
            TokenKind::Tilde => "~",
            TokenKind::LtLt => "<<",
            TokenKind::GtGt => ">>",
            TokenKind::Eq => "=",
            TokenKind::PlusEq => "+=",
            TokenKind::MinusEq => "-=",
            TokenKind::StarEq => "*=",
            TokenKind::SlashEq => "/=",
            TokenKind::PercentEq => "%=",
            TokenKind::PlusPlus => "++",
            TokenKind::MinusMinus => "--",
            TokenKind::Dot => ".",
            TokenKind::Arrow => "->",
            TokenKind::ColonColon => "::",
            TokenKind::Question => "?",
            TokenKind::Colon => ":",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::LBrace => "{",
            TokenKind::RBrace => "}",
            TokenKind::LBracket => "[",
            TokenKind::RBracket => "]",
            TokenKind::Semicolon => ";",
            TokenKind::Comma => ",",
            _ => "?",
        }
    }
}

/// A token and where it starts
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub location: SourceLocation,
}

/// Lexer for the container language
pub struct Lexer {
    input: Vec<char>,
    position: usize,
    line: usize,
    column: usize,
}

impl Lexer {
    /// Create a new lexer for the given source string.
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
            line: 1,
            column: 1,
        }
    }

    /// Tokenize the entire input. Always ends with [`TokenKind::Eof`].
    pub fn tokenize(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();

        loop {
            self.skip_whitespace_and_comments();

            if self.is_at_end() {
                tokens.push(Token {
                    kind: TokenKind::Eof,
                    location: self.current_location(),
                });
                break;
            }

            if self.peek() == Some('#') {
                self.skip_rest_of_line();
                continue;
            }

            let location = self.current_location();
            if let Some(kind) = self.next_token() {
                tokens.push(Token { kind, location });
            }
        }

        tokens
    }

    /// Next token kind, or `None` when the characters consumed produce no
    /// token (the `std::` qualifier)
    fn next_token(&mut self) -> Option<TokenKind> {
        let ch = self.advance()?;

        let kind = match ch {
            '"' => self.string_literal(),
            '\'' => self.char_literal(),
            '0'..='9' => self.number_literal(ch),
            'a'..='z' | 'A'..='Z' | '_' => return self.identifier_or_keyword(ch),

            '+' => self.pick(&[('+', TokenKind::PlusPlus), ('=', TokenKind::PlusEq)], TokenKind::Plus),
            '-' => self.pick(
                &[('-', TokenKind::MinusMinus), ('=', TokenKind::MinusEq), ('>', TokenKind::Arrow)],
                TokenKind::Minus,
            ),
            '*' => self.pick(&[('=', TokenKind::StarEq)], TokenKind::Star),
            '/' => self.pick(&[('=', TokenKind::SlashEq)], TokenKind::Slash),
            '%' => self.pick(&[('=', TokenKind::PercentEq)], TokenKind::Percent),
            '=' => self.pick(&[('=', TokenKind::EqEq)], TokenKind::Eq),
            '!' => self.pick(&[('=', TokenKind::NotEq)], TokenKind::Bang),
            '<' => self.pick(&[('=', TokenKind::Le), ('<', TokenKind::LtLt)], TokenKind::Lt),
            '>' => self.pick(&[('=', TokenKind::Ge), ('>', TokenKind::GtGt)], TokenKind::Gt),
            '&' => self.pick(&[('&', TokenKind::AndAnd)], TokenKind::Amp),
            '|' => self.pick(&[('|', TokenKind::OrOr)], TokenKind::Pipe),
            ':' => self.pick(&[(':', TokenKind::ColonColon)], TokenKind::Colon),
            '^' => TokenKind::Caret,
            '~' => TokenKind::Tilde,
            '.' => TokenKind::Dot,
            '?' => TokenKind::Question,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            ';' => TokenKind::Semicolon,
            ',' => TokenKind::Comma,

            _ => TokenKind::Invalid(format!("unexpected character '{}'", ch)),
        };

        Some(kind)
    }

    /// Consume a second character if it completes a two-character operator
    fn pick(&mut self, pairs: &[(char, TokenKind)], single: TokenKind) -> TokenKind {
        for (next, kind) in pairs {
            if self.peek() == Some(*next) {
                self.advance();
                return kind.clone();
            }
        }
        single
    }

    fn escape(&mut self) -> Option<char> {
        let escaped = self.advance()?;
        Some(match escaped {
            'n' => '\n',
            't' => '\t',
            'r' => '\r',
            '0' => '\0',
            other => other,
        })
    }

    /// Parse string literal
    fn string_literal(&mut self) -> TokenKind {
        let mut string = String::new();

        while let Some(ch) = self.peek() {
            match ch {
                '"' => {
                    self.advance();
                    return TokenKind::StringLiteral(string);
                }
                '\n' => break,
                '\\' => {
                    self.advance();
                    match self.escape() {
                        Some(c) => string.push(c),
                        None => break,
                    }
                }
                _ => {
                    string.push(ch);
                    self.advance();
                }
            }
        }

        TokenKind::Invalid("unterminated string literal".to_string())
    }

    /// Parse character literal
    fn char_literal(&mut self) -> TokenKind {
        let value = match self.advance() {
            Some('\\') => self.escape(),
            Some('\'') | Some('\n') | None => None,
            other => other,
        };

        match (value, self.peek()) {
            (Some(c), Some('\'')) => {
                self.advance();
                TokenKind::CharLiteral(c)
            }
            _ => TokenKind::Invalid("malformed character literal".to_string()),
        }
    }

    /// Parse numeric literal: decimal or hex integers, decimal floats with
    /// optional exponent. Type suffixes (`u`, `l`, `f`) are accepted and dropped.
    fn number_literal(&mut self, first_digit: char) -> TokenKind {
        if first_digit == '0' && matches!(self.peek(), Some('x') | Some('X')) {
            self.advance();
            let mut digits = String::new();
            while let Some(ch) = self.peek().filter(|c| c.is_ascii_hexdigit()) {
                digits.push(ch);
                self.advance();
            }
            self.skip_suffix();
            return match i64::from_str_radix(&digits, 16) {
                Ok(n) => TokenKind::IntLiteral(n),
                Err(_) => TokenKind::Invalid(format!("invalid hex literal 0x{}", digits)),
            };
        }

        let mut num_str = String::new();
        num_str.push(first_digit);
        let mut is_float = false;

        while let Some(ch) = self.peek() {
            if ch.is_ascii_digit() {
                num_str.push(ch);
                self.advance();
            } else if ch == '.' && !is_float && self.peek_ahead(1).is_some_and(|c| c.is_ascii_digit()) {
                is_float = true;
                num_str.push(ch);
                self.advance();
            } else if matches!(ch, 'e' | 'E')
                && self
                    .peek_ahead(1)
                    .is_some_and(|c| c.is_ascii_digit() || c == '-' || c == '+')
            {
                is_float = true;
                num_str.push(ch);
                self.advance();
                if let Some(sign) = self.peek().filter(|c| *c == '-' || *c == '+') {
                    num_str.push(sign);
                    self.advance();
                }
            } else {
                break;
            }
        }

        if matches!(self.peek(), Some('f') | Some('F')) {
            is_float = true;
        }
        self.skip_suffix();

        if is_float {
            match num_str.parse::<f64>() {
                Ok(x) => TokenKind::FloatLiteral(x),
                Err(_) => TokenKind::Invalid(format!("invalid float literal {}", num_str)),
            }
        } else {
            match num_str.parse::<i64>() {
                Ok(n) => TokenKind::IntLiteral(n),
                Err(_) => TokenKind::Invalid(format!("invalid integer literal {}", num_str)),
            }
        }
    }

    fn skip_suffix(&mut self) {
        while matches!(self.peek(), Some('u' | 'U' | 'l' | 'L' | 'f' | 'F')) {
            self.advance();
        }
    }

    /// Parse identifier or keyword. Returns `None` for the `std::` qualifier.
    fn identifier_or_keyword(&mut self, first_char: char) -> Option<TokenKind> {
        let mut ident = String::new();
        ident.push(first_char);

        while let Some(ch) = self.peek() {
            if ch.is_ascii_alphanumeric() || ch == '_' {
                ident.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        if ident == "std" && self.peek() == Some(':') && self.peek_ahead(1) == Some(':') {
            self.advance();
            self.advance();
            return None;
        }

        let kind = match ident.as_str() {
            "if" => TokenKind::If,
            "else" => TokenKind::Else,
            "while" => TokenKind::While,
            "do" => TokenKind::Do,
            "for" => TokenKind::For,
            "return" => TokenKind::Return,
            "break" => TokenKind::Break,
            "continue" => TokenKind::Continue,
            "true" => TokenKind::True,
            "false" => TokenKind::False,
            "nullptr" | "NULL" => TokenKind::Null,
            "const" => TokenKind::Const,
            "using" => TokenKind::Using,
            "namespace" => TokenKind::Namespace,
            name if SCALAR_TYPES.contains(&name) => TokenKind::TypeName(ident),
            _ => TokenKind::Ident(ident),
        };

        Some(kind)
    }

    /// Skip whitespace and comments. An unterminated block comment runs to
    /// the end of input.
    fn skip_whitespace_and_comments(&mut self) {
        loop {
            match self.peek() {
                Some(' ') | Some('\t') | Some('\r') | Some('\n') => {
                    self.advance();
                }
                Some('/') if self.peek_ahead(1) == Some('/') => self.skip_rest_of_line(),
                Some('/') if self.peek_ahead(1) == Some('*') => {
                    self.advance();
                    self.advance();
                    while !self.is_at_end() {
                        if self.peek() == Some('*') && self.peek_ahead(1) == Some('/') {
                            self.advance();
                            self.advance();
                            break;
                        }
                        self.advance();
                    }
                }
                _ => break,
            }
        }
    }

    /// Skip to the end of the line (line comments, preprocessor directives)
    fn skip_rest_of_line(&mut self) {
        while let Some(ch) = self.peek() {
            self.advance();
            if ch == '\n' {
                break;
            }
        }
    }

    fn peek(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek_ahead(&self, n: usize) -> Option<char> {
        self.input.get(self.position + n).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = *self.input.get(self.position)?;
        self.position += 1;

        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }

        Some(ch)
    }

    fn is_at_end(&self) -> bool {
        self.position >= self.input.len()
    }

    fn current_location(&self) -> SourceLocation {
        SourceLocation::new(self.line, self.column)
    }
}
