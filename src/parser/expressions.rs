//! Expression parsing implementation
//!
//! Binary operators are parsed by precedence climbing over a single
//! operator table; assignment, the ternary, unary and postfix forms are
//! recursive descent.
//!
//! # Supported Expressions
//!
//! - Literals: integers, floats, strings, characters (as one-character
//!   strings), `true`/`false`, `nullptr`/`NULL` (as `null`), `endl` (as `"\n"`)
//! - Binary operators: arithmetic, comparison, logical, bitwise
//! - Unary operators: `-`, `+`, `!`, `~`, prefix `++`/`--`, C-style casts
//! - Postfix: calls, method calls, member access (`.` and `->`), indexing,
//!   postfix `++`/`--`
//! - Assignment and compound assignment (right-associative), ternary `? :`

use crate::parser::ast::*;
use crate::parser::lexer::TokenKind;
use crate::parser::parse::{ParseError, Parser};

/// Binary operator and its precedence (higher binds tighter)
fn binary_op(kind: &TokenKind) -> Option<(BinOp, u8)> {
    let entry = match kind {
        TokenKind::OrOr => (BinOp::Or, 1),
        TokenKind::AndAnd => (BinOp::And, 2),
        TokenKind::Pipe => (BinOp::BitOr, 3),
        TokenKind::Caret => (BinOp::BitXor, 4),
        TokenKind::Amp => (BinOp::BitAnd, 5),
        TokenKind::EqEq => (BinOp::Eq, 6),
        TokenKind::NotEq => (BinOp::Ne, 6),
        TokenKind::Lt => (BinOp::Lt, 7),
        TokenKind::Le => (BinOp::Le, 7),
        TokenKind::Gt => (BinOp::Gt, 7),
        TokenKind::Ge => (BinOp::Ge, 7),
        TokenKind::LtLt => (BinOp::Shl, 8),
        TokenKind::GtGt => (BinOp::Shr, 8),
        TokenKind::Plus => (BinOp::Add, 9),
        TokenKind::Minus => (BinOp::Sub, 9),
        TokenKind::Star => (BinOp::Mul, 10),
        TokenKind::Slash => (BinOp::Div, 10),
        TokenKind::Percent => (BinOp::Mod, 10),
        _ => return None,
    };
    Some(entry)
}

fn compound_op(kind: &TokenKind) -> Option<BinOp> {
    match kind {
        TokenKind::PlusEq => Some(BinOp::Add),
        TokenKind::MinusEq => Some(BinOp::Sub),
        TokenKind::StarEq => Some(BinOp::Mul),
        TokenKind::SlashEq => Some(BinOp::Div),
        TokenKind::PercentEq => Some(BinOp::Mod),
        _ => None,
    }
}

impl Parser {
    /// Parse expression (top-level entry point)
    pub(crate) fn parse_expression(&mut self) -> Result<Expr, ParseError> {
        self.nested(Self::parse_assignment)
    }

    /// Parse assignment or ternary (right-associative)
    fn parse_assignment(&mut self) -> Result<Expr, ParseError> {
        let target = self.parse_ternary()?;

        if self.match_token(&TokenKind::Eq) {
            let value = self.parse_expression()?;
            return Ok(Expr::Assign {
                target: Box::new(target),
                value: Box::new(value),
            });
        }

        if let Some(op) = compound_op(self.peek_kind()) {
            self.advance();
            let value = self.parse_expression()?;
            return Ok(Expr::CompoundAssign {
                op,
                target: Box::new(target),
                value: Box::new(value),
            });
        }

        Ok(target)
    }

    /// Parse ternary: condition ? then_expr : else_expr
    fn parse_ternary(&mut self) -> Result<Expr, ParseError> {
        let condition = self.parse_binary(1)?;

        if !self.match_token(&TokenKind::Question) {
            return Ok(condition);
        }

        let then_expr = self.parse_expression()?;
        self.expect_token(&TokenKind::Colon, "in ternary expression")?;
        let else_expr = self.nested(Self::parse_ternary)?;

        Ok(Expr::Ternary {
            condition: Box::new(condition),
            then_expr: Box::new(then_expr),
            else_expr: Box::new(else_expr),
        })
    }

    /// Precedence climbing over [`binary_op`]; all binary operators are
    /// left-associative
    fn parse_binary(&mut self, min_prec: u8) -> Result<Expr, ParseError> {
        let mut left = self.parse_unary()?;

        while let Some((op, prec)) = binary_op(self.peek_kind()) {
            if prec < min_prec {
                break;
            }
            self.advance();
            let right = self.parse_binary(prec + 1)?;
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }

        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        let op = match self.peek_kind() {
            TokenKind::Minus => Some(UnOp::Neg),
            TokenKind::Bang => Some(UnOp::Not),
            TokenKind::Tilde => Some(UnOp::BitNot),
            _ => None,
        };
        if let Some(op) = op {
            self.advance();
            let operand = self.nested(Self::parse_unary)?;
            return Ok(Expr::Unary {
                op,
                operand: Box::new(operand),
            });
        }

        match self.peek_kind() {
            TokenKind::Plus => {
                self.advance();
                self.nested(Self::parse_unary)
            }
            TokenKind::PlusPlus | TokenKind::MinusMinus => {
                let op = if self.check(&TokenKind::PlusPlus) {
                    StepOp::PreInc
                } else {
                    StepOp::PreDec
                };
                self.advance();
                let target = self.nested(Self::parse_unary)?;
                Ok(Expr::Step {
                    op,
                    target: Box::new(target),
                })
            }
            TokenKind::Star | TokenKind::Amp => {
                Err(self.error_here("Pointer operators are not supported"))
            }
            // C-style cast: (int)x, (unsigned long)y
            TokenKind::LParen if matches!(self.peek_ahead(1), TokenKind::TypeName(_)) => {
                self.advance();
                while self.match_token(&TokenKind::TypeName(String::new())) {}
                self.expect_rparen("after cast type")?;
                self.nested(Self::parse_unary)
            }
            _ => self.parse_postfix(),
        }
    }

    fn parse_postfix(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_primary()?;

        loop {
            if self.check(&TokenKind::LParen) {
                let name = match &expr {
                    Expr::Variable(name) => name.clone(),
                    _ => return Err(self.error_here("Only named functions can be called")),
                };
                self.advance();
                let args = self.parse_argument_list()?;
                expr = Expr::Call { name, args };
            } else if self.match_token(&TokenKind::Dot) || self.match_token(&TokenKind::Arrow) {
                let member = self.expect_identifier()?;
                if self.match_token(&TokenKind::LParen) {
                    let args = self.parse_argument_list()?;
                    expr = Expr::MethodCall {
                        object: Box::new(expr),
                        method: member,
                        args,
                    };
                } else {
                    expr = Expr::Member {
                        object: Box::new(expr),
                        member,
                    };
                }
            } else if self.match_token(&TokenKind::LBracket) {
                let index = self.parse_expression()?;
                self.expect_token(&TokenKind::RBracket, "after index")?;
                expr = Expr::Index {
                    object: Box::new(expr),
                    index: Box::new(index),
                };
            } else if self.check(&TokenKind::PlusPlus) || self.check(&TokenKind::MinusMinus) {
                let op = if self.check(&TokenKind::PlusPlus) {
                    StepOp::PostInc
                } else {
                    StepOp::PostDec
                };
                self.advance();
                expr = Expr::Step {
                    op,
                    target: Box::new(expr),
                };
            } else {
                return Ok(expr);
            }
        }
    }

    /// Parse call arguments after `(`, consuming the closing `)`
    fn parse_argument_list(&mut self) -> Result<Vec<Expr>, ParseError> {
        let mut args = Vec::new();

        if self.match_token(&TokenKind::RParen) {
            return Ok(args);
        }

        loop {
            args.push(self.parse_expression()?);
            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }

        self.expect_rparen("after arguments")?;
        Ok(args)
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let literal = match self.peek_kind().clone() {
            TokenKind::IntLiteral(n) => Literal::Int(n),
            TokenKind::FloatLiteral(x) => Literal::Float(x),
            TokenKind::StringLiteral(s) => Literal::Str(s),
            TokenKind::CharLiteral(c) => Literal::Str(c.to_string()),
            TokenKind::True => Literal::Bool(true),
            TokenKind::False => Literal::Bool(false),
            TokenKind::Null => Literal::Null,
            TokenKind::Ident(name) if name == "endl" => Literal::Str("\n".to_string()),
            TokenKind::Ident(name) => {
                self.advance();
                return Ok(Expr::Variable(name));
            }
            TokenKind::LParen => {
                self.advance();
                let expr = self.parse_expression()?;
                self.expect_rparen("after expression")?;
                return Ok(expr);
            }
            TokenKind::Invalid(message) => return Err(self.error_here(&message)),
            other => {
                return Err(self.error_here(&format!("Expected expression, found {}", other)));
            }
        };

        self.advance();
        Ok(Expr::Literal(literal))
    }
}
