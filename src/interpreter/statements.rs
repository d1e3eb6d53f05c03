//! Statement execution implementation
//!
//! This module executes every lowered statement form except loops:
//!
//! - Line markers (forwarded to the runtime journal)
//! - Untyped bindings, container constructors, array constructors
//! - `if/else`, blocks, `return`, `break`, `continue`
//! - Deferred parse failures
//!
//! # Control Flow
//!
//! `break`, `continue` and `return` set [`ControlFlow`] on the interpreter;
//! blocks stop at the first statement that leaves it non-normal and the
//! enclosing loop or call consumes it.

use crate::interpreter::engine::{ControlFlow, Interpreter};
use crate::interpreter::errors::RuntimeError;
use crate::interpreter::frames::Binding;
use crate::parser::ast::*;
use crate::runtime::Value;

impl<'p> Interpreter<'p> {
    /// Execute statements inside a fresh scope
    pub(crate) fn execute_block(&mut self, stmts: &'p [Stmt]) -> Result<(), RuntimeError> {
        self.stack.push_scope();
        let result = self.execute_statements(stmts);
        self.stack.pop_scope();
        result
    }

    /// Execute statements in the current scope, stopping early on non-local
    /// control flow
    pub(crate) fn execute_statements(&mut self, stmts: &'p [Stmt]) -> Result<(), RuntimeError> {
        for stmt in stmts {
            self.execute_statement(stmt)?;
            if self.control_flow != ControlFlow::Normal {
                break;
            }
        }
        Ok(())
    }

    pub(crate) fn execute_statement(&mut self, stmt: &'p Stmt) -> Result<(), RuntimeError> {
        match stmt {
            Stmt::Line(line) => {
                self.runtime.set_line(line);
                Ok(())
            }

            Stmt::Let { name, init } => {
                let value = match init {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Undefined,
                };
                self.declare(name, Binding::variable(value));
                Ok(())
            }

            Stmt::Construct { name, kind } => {
                let id = match kind {
                    ContainerKind::Stack => self.runtime.create_stack(name),
                    ContainerKind::Queue => self.runtime.create_queue(name),
                    ContainerKind::List => self.runtime.create_list(name),
                };
                self.declare(name, Binding::constant(Value::Container(id)));
                Ok(())
            }

            Stmt::ArrayDecl { name, size, init } => self.execute_array_decl(name, size.as_ref(), init),

            Stmt::Expr(expr) => {
                self.evaluate(expr)?;
                Ok(())
            }

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if self.evaluate(condition)?.is_truthy() {
                    self.execute_block(then_branch)
                } else if let Some(else_branch) = else_branch {
                    self.execute_block(else_branch)
                } else {
                    Ok(())
                }
            }

            Stmt::While { condition, body } => self.execute_while(condition, body),

            Stmt::DoWhile { body, condition } => self.execute_do_while(body, condition),

            Stmt::For {
                init,
                condition,
                increment,
                body,
            } => self.execute_for(init, condition, increment, body),

            Stmt::Block(stmts) => self.execute_block(stmts),

            Stmt::Return(expr) => {
                let value = match expr {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Undefined,
                };
                self.control_flow = ControlFlow::Return(value);
                Ok(())
            }

            Stmt::Break => {
                self.control_flow = ControlFlow::Break;
                Ok(())
            }

            Stmt::Continue => {
                self.control_flow = ControlFlow::Continue;
                Ok(())
            }

            Stmt::Malformed(error) => Err(error.clone().into()),
        }
    }

    /// Array constructor: the declared size (or the initializer length when
    /// the size is omitted), then one element per initializer
    fn execute_array_decl(
        &mut self,
        name: &str,
        size: Option<&'p Expr>,
        init: &'p [Expr],
    ) -> Result<(), RuntimeError> {
        let size = match size {
            Some(expr) => {
                let value = self.evaluate(expr)?;
                value.as_index().ok_or_else(|| RuntimeError::InvalidArraySize {
                    size: value.to_string(),
                    line: self.line(),
                })?
            }
            None => init.len(),
        };

        let mut values = Vec::with_capacity(init.len());
        for expr in init {
            values.push(self.evaluate(expr)?);
        }

        let id = self.runtime.create_array(name, size, &values)?;
        self.declare(name, Binding::constant(Value::Container(id)));
        Ok(())
    }
}
