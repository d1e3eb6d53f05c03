//! Declaration parsing implementation
//!
//! - Function definitions: `type name(params) { ... }`, lowered to untyped
//!   definitions keeping only parameter names. Prototypes are dropped.
//! - Scalar declarations: `int x = 1, y;` lowered to untyped bindings
//! - Array declarations: `int arr[3] = {1, 2, 3};` lowered to the array constructor
//! - Container declarations: `stack<int> s;` lowered to a constructor call
//!   bound to a constant
//!
//! # Grammar
//!
//! ```text
//! function_def   ::= type identifier "(" params ")" ( "{" statements "}" | ";" )
//! scalar_decl    ::= "const"? type_name+ declarator ( "," declarator )* ";"
//! declarator     ::= ("*" | "&")* identifier ( "[" expr? "]" )? initializer?
//! initializer    ::= "=" ( expr | brace_list ) | brace_list | "(" expr ")"
//! container_decl ::= container_name "<" ... ">" identifier ( "," identifier )* ";"
//! ```

use crate::parser::ast::*;
use crate::parser::lexer::TokenKind;
use crate::parser::parse::{ParseError, Parser};

impl Parser {
    /// Parse a function definition. Returns `Ok(None)` for a prototype.
    pub(crate) fn parse_function_definition(&mut self) -> Result<Option<FunctionDef>, ParseError> {
        let location = self.current_location();
        self.skip_return_type()?;

        let name = self.expect_identifier()?;
        self.expect_lparen("after function name")?;
        let params = self.parse_parameters()?;

        if self.match_token(&TokenKind::Semicolon) {
            return Ok(None);
        }

        let params = params
            .into_iter()
            .map(|param| {
                param.ok_or_else(|| ParseError {
                    message: format!("Parameter of '{}' has no name", name),
                    location,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        self.expect_token(&TokenKind::LBrace, "before function body")?;
        let body = self.parse_block_statements();
        self.expect_rbrace("after function body")?;

        Ok(Some(FunctionDef {
            name,
            params,
            body,
            location,
        }))
    }

    fn skip_return_type(&mut self) -> Result<(), ParseError> {
        while self.match_token(&TokenKind::Const) {}

        if self.check(&TokenKind::TypeName(String::new())) {
            while self.match_token(&TokenKind::TypeName(String::new())) {}
        } else {
            self.expect_identifier()?;
            if self.check(&TokenKind::Lt) {
                self.skip_template_args()?;
            }
        }

        while self.match_token(&TokenKind::Star) || self.match_token(&TokenKind::Amp) {}
        Ok(())
    }

    /// Parse a parameter list after `(`, consuming the closing `)`.
    ///
    /// Types, `const`, `&`, `*` and array suffixes are discarded; the name of
    /// each parameter is the last identifier outside template brackets and
    /// before any default value. A lone `void` means no parameters.
    fn parse_parameters(&mut self) -> Result<Vec<Option<String>>, ParseError> {
        let mut params = Vec::new();
        if self.match_token(&TokenKind::RParen) {
            return Ok(params);
        }

        loop {
            let mut name = None;
            let mut angle = 0i32;
            let mut bracket = 0i32;
            let mut defaulted = false;
            let mut only_void = true;

            loop {
                let kind = self.peek_kind().clone();
                match &kind {
                    TokenKind::Comma | TokenKind::RParen if angle <= 0 && bracket == 0 => break,
                    TokenKind::Eof | TokenKind::LBrace | TokenKind::Semicolon => {
                        return Err(self.error_here("Unterminated parameter list"));
                    }
                    TokenKind::Lt => angle += 1,
                    TokenKind::Gt => angle -= 1,
                    TokenKind::GtGt => angle -= 2,
                    TokenKind::LBracket => bracket += 1,
                    TokenKind::RBracket => bracket -= 1,
                    TokenKind::Eq if angle <= 0 => defaulted = true,
                    TokenKind::Ident(ident) if angle <= 0 && bracket == 0 && !defaulted => {
                        name = Some(ident.clone());
                    }
                    _ => {}
                }
                if !matches!(&kind, TokenKind::TypeName(t) if t == "void") {
                    only_void = false;
                }
                self.advance();
            }

            if !(only_void && name.is_none() && params.is_empty() && self.check(&TokenKind::RParen)) {
                params.push(name);
            }

            if self.match_token(&TokenKind::RParen) {
                return Ok(params);
            }
            self.expect_token(&TokenKind::Comma, "between parameters")?;
        }
    }

    /// Parse a scalar or array declaration, starting at `const` or a type name
    pub(crate) fn parse_scalar_declaration(&mut self) -> Result<Vec<Stmt>, ParseError> {
        while self.match_token(&TokenKind::Const) {}
        if !self.match_token(&TokenKind::TypeName(String::new())) {
            return Err(self.error_here("Expected type name"));
        }
        while self.match_token(&TokenKind::TypeName(String::new())) || self.match_token(&TokenKind::Const) {}

        let mut stmts = Vec::new();
        loop {
            stmts.push(self.parse_declarator()?);
            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }

        self.expect_semicolon("after declaration")?;
        Ok(stmts)
    }

    fn parse_declarator(&mut self) -> Result<Stmt, ParseError> {
        while self.match_token(&TokenKind::Star) || self.match_token(&TokenKind::Amp) {}
        let name = self.expect_identifier()?;

        if self.match_token(&TokenKind::LBracket) {
            let size = if self.check(&TokenKind::RBracket) {
                None
            } else {
                Some(self.parse_expression()?)
            };
            self.expect_token(&TokenKind::RBracket, "after array size")?;
            if self.check(&TokenKind::LBracket) {
                return Err(self.error_here("Multi-dimensional arrays are not supported"));
            }

            let has_init = self.match_token(&TokenKind::Eq) || self.check(&TokenKind::LBrace);
            let init = if has_init {
                self.expect_token(&TokenKind::LBrace, "to open array initializer")?;
                let mut items = Vec::new();
                self.parse_initializer_list(&mut items)?;
                items
            } else {
                Vec::new()
            };

            if size.is_none() && !has_init {
                return Err(ParseError {
                    message: format!("Array '{}' needs a size or an initializer", name),
                    location: self.current_location(),
                });
            }

            return Ok(Stmt::ArrayDecl { name, size, init });
        }

        let init = if self.match_token(&TokenKind::Eq) {
            Some(self.parse_expression()?)
        } else if self.match_token(&TokenKind::LParen) {
            let value = self.parse_expression()?;
            self.expect_rparen("after initializer")?;
            Some(value)
        } else if self.match_token(&TokenKind::LBrace) {
            let mut items = Vec::new();
            self.parse_initializer_list(&mut items)?;
            items.into_iter().next()
        } else {
            None
        };

        Ok(Stmt::Let { name, init })
    }

    /// Parse a brace initializer after `{`, consuming the closing `}`.
    /// Nested braces are flattened in order; a trailing comma is allowed.
    fn parse_initializer_list(&mut self, items: &mut Vec<Expr>) -> Result<(), ParseError> {
        loop {
            if self.match_token(&TokenKind::RBrace) {
                return Ok(());
            }

            if self.match_token(&TokenKind::LBrace) {
                self.nested(|parser| parser.parse_initializer_list(items))?;
            } else {
                items.push(self.parse_expression()?);
            }

            if !self.match_token(&TokenKind::Comma) {
                return self.expect_rbrace("after initializer list");
            }
        }
    }

    /// Parse `stack<T> a, b;` and friends
    pub(crate) fn parse_container_declaration(&mut self, kind: ContainerKind) -> Result<Vec<Stmt>, ParseError> {
        self.advance();
        self.skip_template_args()?;

        let mut stmts = Vec::new();
        loop {
            let name = self.expect_identifier()?;
            if matches!(
                self.peek_kind(),
                TokenKind::Eq | TokenKind::LParen | TokenKind::LBrace
            ) {
                return Err(ParseError {
                    message: format!("Initializing container '{}' at declaration is not supported", name),
                    location: self.current_location(),
                });
            }
            stmts.push(Stmt::Construct { name, kind });

            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }

        self.expect_semicolon("after container declaration")?;
        Ok(stmts)
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
    fn test_parameters_keep_only_names() {
        let program = rewrite(
            "void f(const stack<int>& s, int arr[], queue<pair<int,int>> *q, unsigned long n) {}",
        );
        assert_eq!(program.functions[0].params, vec!["s", "arr", "q", "n"]);
    }

    #[test]
    fn test_void_parameter_list() {
        let program = rewrite("int main(void) { return 0; }");
        assert!(program.functions[0].params.is_empty());
    }

    #[test]
    fn test_multiple_declarators() {
        let stmts = lowered("int a = 1, b, *c = nullptr;");
        assert_eq!(
            stmts,
            vec![
                Stmt::Let {
                    name: "a".to_string(),
                    init: Some(Expr::Literal(Literal::Int(1)))
                },
                Stmt::Let {
                    name: "b".to_string(),
                    init: None
                },
                Stmt::Let {
                    name: "c".to_string(),
                    init: Some(Expr::Literal(Literal::Null))
                },
            ]
        );
    }

    #[test]
    fn test_array_declaration_forms() {
        let stmts = lowered("int a[3] = {1, 2, 3};\nint b[] = {{4, 5}, {6},};\nstring c[2];");
        assert_eq!(
            stmts[0],
            Stmt::ArrayDecl {
                name: "a".to_string(),
                size: Some(Expr::Literal(Literal::Int(3))),
                init: vec![
                    Expr::Literal(Literal::Int(1)),
                    Expr::Literal(Literal::Int(2)),
                    Expr::Literal(Literal::Int(3)),
                ],
            }
        );
        match &stmts[1] {
            Stmt::ArrayDecl { size, init, .. } => {
                assert!(size.is_none());
                assert_eq!(init.len(), 3);
            }
            other => panic!("Expected array declaration, got {:?}", other),
        }
        assert!(matches!(&stmts[2], Stmt::ArrayDecl { init, .. } if init.is_empty()));
    }

    #[test]
    fn test_array_without_size_or_initializer_is_malformed() {
        let stmts = lowered("int a[];");
        assert!(matches!(stmts[0], Stmt::Malformed(_)));
    }

    #[test]
    fn test_container_declarations() {
        let stmts = lowered("std::stack<int> a, b;\nqueue<string> q;\nvector<vector<int>> v;");
        assert_eq!(
            stmts,
            vec![
                Stmt::Construct {
                    name: "a".to_string(),
                    kind: ContainerKind::Stack
                },
                Stmt::Construct {
                    name: "b".to_string(),
                    kind: ContainerKind::Stack
                },
                Stmt::Construct {
                    name: "q".to_string(),
                    kind: ContainerKind::Queue
                },
                Stmt::Construct {
                    name: "v".to_string(),
                    kind: ContainerKind::List
                },
            ]
        );
    }

    #[test]
    fn test_container_initializer_is_malformed() {
        let stmts = lowered("list<int> l = {1, 2};");
        assert!(matches!(stmts[0], Stmt::Malformed(_)));
    }
}
