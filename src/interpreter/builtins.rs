//! Calls, method dispatch and member access
//!
//! A lowered program can call exactly two kinds of things: its own
//! functions and the methods of the containers the runtime built for it.
//! Anything else is an [`RuntimeError::UndefinedFunction`] fault.
//!
//! # Calling Convention
//!
//! - Arity is checked strictly against the definition.
//! - Arguments arrive already evaluated; scalars are copies and containers
//!   are handles, so a callee mutating `st.push(..)` affects the caller's
//!   container.
//! - The caller's source line is restored once the callee returns, so
//!   commands emitted later in the same statement cite the caller's line.

use crate::interpreter::engine::{ControlFlow, Interpreter};
use crate::interpreter::errors::RuntimeError;
use crate::interpreter::frames::Binding;
use crate::parser::ast::FunctionDef;
use crate::runtime::Value;

impl<'p> Interpreter<'p> {
    pub(crate) fn call_function(&mut self, name: &str, args: Vec<Value>) -> Result<Value, RuntimeError> {
        let Some(&function) = self.functions.get(name) else {
            return Err(RuntimeError::UndefinedFunction {
                name: name.to_string(),
                line: self.line(),
            });
        };
        self.call_user_function(function, args)
    }

    fn call_user_function(&mut self, function: &'p FunctionDef, args: Vec<Value>) -> Result<Value, RuntimeError> {
        if self.stack.depth() >= self.config.max_call_depth {
            return Err(RuntimeError::CallDepthExceeded {
                limit: self.config.max_call_depth,
                line: self.line(),
            });
        }

        if args.len() != function.params.len() {
            return Err(RuntimeError::ArgumentCountMismatch {
                function: function.name.clone(),
                expected: function.params.len(),
                got: args.len(),
                line: self.line(),
            });
        }

        let caller_line = self.runtime.current_line().clone();

        self.stack.push_frame(&function.name);
        for (param, arg) in function.params.iter().zip(args) {
            self.declare(param, Binding::variable(arg));
        }

        let result = self.execute_statements(&function.body);
        let flow = std::mem::replace(&mut self.control_flow, ControlFlow::Normal);
        self.stack.pop_frame();
        result?;

        let value = match flow {
            ControlFlow::Return(value) => value,
            ControlFlow::Normal => Value::Undefined,
            ControlFlow::Break => return Err(self.stray("break")),
            ControlFlow::Continue => return Err(self.stray("continue")),
        };

        self.runtime.set_line(&caller_line);
        Ok(value)
    }

    /// `receiver.method(args)`
    pub(crate) fn call_method(&mut self, receiver: &Value, method: &str, args: &[Value]) -> Result<Value, RuntimeError> {
        match receiver {
            Value::Container(id) => self.runtime.call_method(*id, method, args),
            Value::Str(s) if matches!(method, "size" | "length") => {
                if !args.is_empty() {
                    return Err(RuntimeError::ArgumentCountMismatch {
                        function: method.to_string(),
                        expected: 0,
                        got: args.len(),
                        line: self.line(),
                    });
                }
                Ok(Value::Int(s.chars().count() as i64))
            }
            other => Err(RuntimeError::TypeError {
                message: format!("{} has no method '{}'", other.type_name(), method),
                line: self.line(),
            }),
        }
    }

    /// `receiver.member` without a call: only `length` is readable
    pub(crate) fn read_member(&self, receiver: &Value, member: &str) -> Result<Value, RuntimeError> {
        let length = match (receiver, member) {
            (Value::Container(id), "length") => self.runtime.array_len(*id),
            (Value::Str(s), "length") => Some(s.chars().count()),
            _ => None,
        };

        length
            .map(|n| Value::Int(n as i64))
            .ok_or_else(|| RuntimeError::TypeError {
                message: format!("{} has no member '{}'", receiver.type_name(), member),
                line: self.line(),
            })
    }
}
