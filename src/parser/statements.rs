//! Statement parsing implementation
//!
//! - Declarations: scalars, arrays, containers
//! - Control flow: `if`, `while`, `do-while`, `for`
//! - Jump statements: `return`, `break`, `continue`
//! - Compound statements: `{ ... }`
//! - Expression statements: method calls, assignments, function calls
//!
//! Every statement is preceded by a [`Stmt::Line`] marker for the line it
//! starts on, and every loop condition is wrapped in the iteration guard.
//! Console I/O and `using namespace` lines lower to nothing.
//!
//! # Grammar
//!
//! ```text
//! statement ::= scalar_decl | container_decl | if_stmt | while_stmt
//!             | do_while_stmt | for_stmt | return_stmt | break_stmt
//!             | continue_stmt | block | expr_stmt | ";"
//! ```

use crate::parser::ast::*;
use crate::parser::lexer::TokenKind;
use crate::parser::parse::{ParseError, Parser};

/// Stream objects whose statements are dropped
const CONSOLE_STREAMS: &[&str] = &["cout", "cin", "cerr", "clog"];

/// Calls whose statements are dropped
const CONSOLE_CALLS: &[&str] = &["printf", "puts", "scanf", "putchar", "getchar", "system"];

impl Parser {
    /// Parse block statements (inside braces, excluding the braces themselves)
    pub(crate) fn parse_block_statements(&mut self) -> Vec<Stmt> {
        let mut statements = Vec::new();

        while !self.check(&TokenKind::RBrace) && !self.is_at_end() {
            self.parse_statement_into(&mut statements);
        }

        statements
    }

    /// Parse a loop or branch body: a braced block or a single statement
    fn parse_body(&mut self) -> Result<Vec<Stmt>, ParseError> {
        if self.match_token(&TokenKind::LBrace) {
            let statements = self.parse_block_statements();
            self.expect_rbrace("after block")?;
            return Ok(statements);
        }

        let mut statements = Vec::new();
        self.parse_statement_into(&mut statements);
        Ok(statements)
    }

    /// Parse a statement into its lowered form (zero or more statements)
    pub(crate) fn parse_statement(&mut self) -> Result<Vec<Stmt>, ParseError> {
        self.nested(Self::lower_statement)
    }

    fn lower_statement(&mut self) -> Result<Vec<Stmt>, ParseError> {
        match self.peek_kind().clone() {
            TokenKind::Semicolon => {
                self.advance();
                Ok(Vec::new())
            }
            TokenKind::LBrace => {
                self.advance();
                let statements = self.parse_block_statements();
                self.expect_rbrace("after block")?;
                Ok(vec![Stmt::Block(statements)])
            }
            TokenKind::If => self.parse_if_statement(),
            TokenKind::While => self.parse_while_statement(),
            TokenKind::Do => self.parse_do_while_statement(),
            TokenKind::For => self.parse_for_statement(),
            TokenKind::Return => {
                self.advance();
                let value = if self.check(&TokenKind::Semicolon) {
                    None
                } else {
                    Some(self.parse_expression()?)
                };
                self.expect_semicolon("after 'return'")?;
                Ok(vec![Stmt::Return(value)])
            }
            TokenKind::Break => {
                self.advance();
                self.expect_semicolon("after 'break'")?;
                Ok(vec![Stmt::Break])
            }
            TokenKind::Continue => {
                self.advance();
                self.expect_semicolon("after 'continue'")?;
                Ok(vec![Stmt::Continue])
            }
            TokenKind::Using => {
                self.skip_statement();
                Ok(Vec::new())
            }
            TokenKind::Const if matches!(self.peek_ahead(1), TokenKind::Ident(_)) => {
                self.advance();
                self.parse_statement()
            }
            TokenKind::Const | TokenKind::TypeName(_) => self.parse_scalar_declaration(),
            TokenKind::Ident(name) => {
                if CONSOLE_STREAMS.contains(&name.as_str())
                    || (CONSOLE_CALLS.contains(&name.as_str())
                        && matches!(self.peek_ahead(1), TokenKind::LParen))
                {
                    self.skip_statement();
                    return Ok(Vec::new());
                }

                if matches!(self.peek_ahead(1), TokenKind::Lt) {
                    if let Some(kind) = ContainerKind::from_type_name(&name) {
                        return self.parse_container_declaration(kind);
                    }
                    let declares = self
                        .template_end(self.position + 1)
                        .is_some_and(|end| matches!(self.kind_at(end), TokenKind::Ident(_)));
                    if declares {
                        return Err(ParseError {
                            message: format!("Unsupported container type '{}'", name),
                            location: self.current_location(),
                        });
                    }
                }

                self.parse_expression_statement()
            }
            _ => self.parse_expression_statement(),
        }
    }

    fn parse_expression_statement(&mut self) -> Result<Vec<Stmt>, ParseError> {
        let expr = self.parse_expression()?;
        self.expect_semicolon("after expression")?;
        Ok(vec![Stmt::Expr(expr)])
    }

    fn parse_condition(&mut self, keyword: &str) -> Result<Expr, ParseError> {
        self.expect_lparen(&format!("after '{}'", keyword))?;
        let condition = self.parse_expression()?;
        self.expect_rparen(&format!("after {} condition", keyword))?;
        Ok(condition)
    }

    fn parse_if_statement(&mut self) -> Result<Vec<Stmt>, ParseError> {
        self.advance();
        let condition = self.parse_condition("if")?;
        let then_branch = self.parse_body()?;

        let else_branch = if self.match_token(&TokenKind::Else) {
            Some(self.parse_body()?)
        } else {
            None
        };

        Ok(vec![Stmt::If {
            condition,
            then_branch,
            else_branch,
        }])
    }

    fn parse_while_statement(&mut self) -> Result<Vec<Stmt>, ParseError> {
        self.advance();
        let condition = self.parse_condition("while")?;
        let body = self.parse_body()?;

        Ok(vec![Stmt::While {
            condition: Expr::guarded(Some(condition)),
            body,
        }])
    }

    fn parse_do_while_statement(&mut self) -> Result<Vec<Stmt>, ParseError> {
        self.advance();
        let body = self.parse_body()?;
        self.expect_token(&TokenKind::While, "after do-while body")?;
        let condition = self.parse_condition("while")?;
        self.expect_semicolon("after do-while")?;

        Ok(vec![Stmt::DoWhile {
            body,
            condition: Expr::guarded(Some(condition)),
        }])
    }

    /// Parse `for (init; condition; increment) body`. Every clause may be
    /// empty; the increment may be a comma-separated list.
    fn parse_for_statement(&mut self) -> Result<Vec<Stmt>, ParseError> {
        self.advance();
        self.expect_lparen("after 'for'")?;

        let init = if self.match_token(&TokenKind::Semicolon) {
            Vec::new()
        } else if matches!(self.peek_kind(), TokenKind::TypeName(_) | TokenKind::Const) {
            self.parse_scalar_declaration()?
        } else {
            self.parse_expression_statement()?
        };

        let condition = if self.check(&TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect_semicolon("after for condition")?;

        let mut increment = Vec::new();
        if !self.check(&TokenKind::RParen) {
            loop {
                increment.push(self.parse_expression()?);
                if !self.match_token(&TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect_rparen("after for clauses")?;

        let body = self.parse_body()?;

        Ok(vec![Stmt::For {
            init,
            condition: Expr::guarded(condition),
            increment,
            body,
        }])
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::ast::*;
    use crate::parser::parse::rewrite;

    fn lowered(source: &str) -> Vec<Stmt> {
        rewrite(source)
            .body
            .into_iter()
            .filter(|s| !matches!(s, Stmt::Line(_)))
            .collect()
    }

    #[test]
    fn test_boilerplate_is_dropped() {
        let program = rewrite(
            "#include <iostream>\nusing namespace std;\n// comment\n\nstd::cout << \"hi\" << std::endl;\nprintf(\"%d\", 1);\n",
        );
        assert!(program.body.is_empty());
    }

    #[test]
    fn test_loops_are_guarded() {
        let stmts = lowered("while (x < 3) x++;\nfor (;;) {}\ndo { } while (y);");
        match &stmts[0] {
            Stmt::While { condition, body } => {
                assert!(matches!(condition, Expr::Guard(_)));
                assert_eq!(body.len(), 2);
            }
            other => panic!("Expected while, got {:?}", other),
        }
        match &stmts[1] {
            Stmt::For {
                init,
                condition,
                increment,
                ..
            } => {
                assert!(init.is_empty());
                assert!(increment.is_empty());
                assert_eq!(*condition, Expr::guarded(None));
            }
            other => panic!("Expected for, got {:?}", other),
        }
        assert!(matches!(
            &stmts[2],
            Stmt::DoWhile {
                condition: Expr::Guard(_),
                ..
            }
        ));
    }

    #[test]
    fn test_for_with_declaration_and_comma_increment() {
        let stmts = lowered("for (int i = 0, j = 5; i < j; i++, j--) { s.push(i); }");
        match &stmts[0] {
            Stmt::For {
                init,
                increment,
                body,
                ..
            } => {
                assert_eq!(init.len(), 2);
                assert_eq!(increment.len(), 2);
                assert!(matches!(body[0], Stmt::Line(_)));
            }
            other => panic!("Expected for, got {:?}", other),
        }
    }

    #[test]
    fn test_if_else_chain() {
        let stmts = lowered("if (a) b = 1; else if (c) b = 2; else { b = 3; }");
        match &stmts[0] {
            Stmt::If {
                else_branch: Some(else_branch),
                ..
            } => {
                assert!(matches!(else_branch[1], Stmt::If { .. }));
            }
            other => panic!("Expected if, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_generic_type_is_malformed() {
        let stmts = lowered("map<int, int> m;");
        assert!(matches!(stmts[0], Stmt::Malformed(_)));
    }

    #[test]
    fn test_comparison_is_not_a_declaration() {
        let stmts = lowered("x < y;");
        assert!(matches!(stmts[0], Stmt::Expr(Expr::Binary { .. })));
    }
}
