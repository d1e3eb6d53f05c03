//! Expression evaluation implementation
//!
//! # Value Semantics
//!
//! - Integers stay integers: `7 / 2 == 3`, division or modulo by integer
//!   zero is a fault. Any float operand promotes the operation to float,
//!   which follows IEEE rules.
//! - `+` concatenates when either side is a string.
//! - Comparisons, `!`, `&&` and `||` produce booleans; `&&`/`||` short-circuit.
//! - Equality is strict: values of different kinds are never equal, except
//!   that ints and floats compare numerically.
//!
//! # Assignment
//!
//! Assignment targets are resolved to a [`Place`] before the right-hand side
//! is evaluated, so `arr[i++] = v` reads `i` once. Element writes go through
//! the runtime, which records them.

use crate::interpreter::engine::Interpreter;
use crate::interpreter::errors::RuntimeError;
use crate::parser::ast::*;
use crate::runtime::{ContainerId, Value};
use std::cmp::Ordering;

/// A resolved assignment target
enum Place<'p> {
    Variable(&'p str),
    Element { array: ContainerId, index: Value },
}

impl<'p> Interpreter<'p> {
    /// Evaluate an expression to a value
    pub(crate) fn evaluate(&mut self, expr: &'p Expr) -> Result<Value, RuntimeError> {
        match expr {
            Expr::Literal(lit) => Ok(match lit {
                Literal::Int(n) => Value::Int(*n),
                Literal::Float(x) => Value::Float(*x),
                Literal::Str(s) => Value::Str(s.clone()),
                Literal::Bool(b) => Value::Bool(*b),
                Literal::Null => Value::Null,
            }),

            Expr::Variable(name) => self.read_variable(name),

            Expr::Assign { target, value } => {
                let place = self.resolve_place(target)?;
                let value = self.evaluate(value)?;
                self.store(&place, value.clone())?;
                Ok(value)
            }

            Expr::CompoundAssign { op, target, value } => {
                let place = self.resolve_place(target)?;
                let current = self.load(&place)?;
                let rhs = self.evaluate(value)?;
                let result = self.binary_op(*op, &current, &rhs)?;
                self.store(&place, result.clone())?;
                Ok(result)
            }

            Expr::Step { op, target } => {
                let place = self.resolve_place(target)?;
                let current = self.load(&place)?;
                let delta = match op {
                    StepOp::PreInc | StepOp::PostInc => BinOp::Add,
                    StepOp::PreDec | StepOp::PostDec => BinOp::Sub,
                };
                if !current.is_numeric() {
                    return Err(RuntimeError::TypeError {
                        message: format!("cannot increment or decrement {}", current.type_name()),
                        line: self.line(),
                    });
                }
                let updated = self.binary_op(delta, &current, &Value::Int(1))?;
                self.store(&place, updated.clone())?;
                Ok(match op {
                    StepOp::PreInc | StepOp::PreDec => updated,
                    StepOp::PostInc | StepOp::PostDec => current,
                })
            }

            Expr::Binary {
                op: BinOp::And,
                left,
                right,
            } => {
                let left = self.evaluate(left)?;
                if !left.is_truthy() {
                    return Ok(Value::Bool(false));
                }
                Ok(Value::Bool(self.evaluate(right)?.is_truthy()))
            }

            Expr::Binary {
                op: BinOp::Or,
                left,
                right,
            } => {
                let left = self.evaluate(left)?;
                if left.is_truthy() {
                    return Ok(Value::Bool(true));
                }
                Ok(Value::Bool(self.evaluate(right)?.is_truthy()))
            }

            Expr::Binary { op, left, right } => {
                let left = self.evaluate(left)?;
                let right = self.evaluate(right)?;
                self.binary_op(*op, &left, &right)
            }

            Expr::Unary { op, operand } => {
                let value = self.evaluate(operand)?;
                self.unary_op(*op, &value)
            }

            Expr::Ternary {
                condition,
                then_expr,
                else_expr,
            } => {
                if self.evaluate(condition)?.is_truthy() {
                    self.evaluate(then_expr)
                } else {
                    self.evaluate(else_expr)
                }
            }

            Expr::Call { name, args } => {
                let args = self.evaluate_args(args)?;
                self.call_function(name, args)
            }

            Expr::MethodCall {
                object,
                method,
                args,
            } => {
                let receiver = self.evaluate(object)?;
                let args = self.evaluate_args(args)?;
                self.call_method(&receiver, method, &args)
            }

            Expr::Member { object, member } => {
                let receiver = self.evaluate(object)?;
                self.read_member(&receiver, member)
            }

            Expr::Index { object, index } => {
                let receiver = self.evaluate(object)?;
                let index = self.evaluate(index)?;
                self.read_element(&receiver, &index)
            }

            Expr::Guard(condition) => {
                self.check_loop()?;
                self.evaluate(condition)
            }
        }
    }

    pub(crate) fn evaluate_args(&mut self, args: &'p [Expr]) -> Result<Vec<Value>, RuntimeError> {
        let mut values = Vec::with_capacity(args.len());
        for arg in args {
            values.push(self.evaluate(arg)?);
        }
        Ok(values)
    }

    fn resolve_place(&mut self, target: &'p Expr) -> Result<Place<'p>, RuntimeError> {
        match target {
            Expr::Variable(name) => Ok(Place::Variable(name)),
            Expr::Index { object, index } => {
                let receiver = self.evaluate(object)?;
                let index = self.evaluate(index)?;
                match receiver {
                    Value::Container(array) => Ok(Place::Element { array, index }),
                    other => Err(RuntimeError::TypeError {
                        message: format!("cannot assign into an element of {}", other.type_name()),
                        line: self.line(),
                    }),
                }
            }
            _ => Err(RuntimeError::InvalidAssignmentTarget { line: self.line() }),
        }
    }

    fn load(&self, place: &Place<'p>) -> Result<Value, RuntimeError> {
        match place {
            Place::Variable(name) => self.read_variable(name),
            Place::Element { array, index } => self.runtime.array_get(*array, index),
        }
    }

    fn store(&mut self, place: &Place<'p>, value: Value) -> Result<(), RuntimeError> {
        match place {
            Place::Variable(name) => self.write_variable(name, value),
            Place::Element { array, index } => self.runtime.array_set(*array, index, value),
        }
    }

    fn read_element(&self, receiver: &Value, index: &Value) -> Result<Value, RuntimeError> {
        match receiver {
            Value::Container(id) => self.runtime.array_get(*id, index),
            Value::Str(s) => Ok(index
                .as_index()
                .and_then(|i| s.chars().nth(i))
                .map(|c| Value::Str(c.to_string()))
                .unwrap_or_default()),
            other => Err(RuntimeError::TypeError {
                message: format!("cannot index {}", other.type_name()),
                line: self.line(),
            }),
        }
    }

    fn type_error(&self, op: BinOp, left: &Value, right: &Value) -> RuntimeError {
        RuntimeError::TypeError {
            message: format!(
                "unsupported operands for '{}': {} and {}",
                op.symbol(),
                left.type_name(),
                right.type_name()
            ),
            line: self.line(),
        }
    }

    pub(crate) fn binary_op(&self, op: BinOp, left: &Value, right: &Value) -> Result<Value, RuntimeError> {
        match op {
            BinOp::Add if matches!(left, Value::Str(_)) || matches!(right, Value::Str(_)) => {
                Ok(Value::Str(format!("{}{}", left, right)))
            }
            BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Div | BinOp::Mod => {
                self.arithmetic(op, left, right)
            }

            BinOp::Eq => Ok(Value::Bool(left.strict_eq(right))),
            BinOp::Ne => Ok(Value::Bool(!left.strict_eq(right))),

            BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge => {
                let result = match left.compare(right) {
                    Some(ordering) => match op {
                        BinOp::Lt => ordering == Ordering::Less,
                        BinOp::Le => ordering != Ordering::Greater,
                        BinOp::Gt => ordering == Ordering::Greater,
                        _ => ordering != Ordering::Less,
                    },
                    // Unordered pairs (NaN, undefined, mixed kinds) compare false
                    None => false,
                };
                Ok(Value::Bool(result))
            }

            BinOp::And => Ok(Value::Bool(left.is_truthy() && right.is_truthy())),
            BinOp::Or => Ok(Value::Bool(left.is_truthy() || right.is_truthy())),

            BinOp::BitAnd | BinOp::BitOr | BinOp::BitXor | BinOp::Shl | BinOp::Shr => {
                let (Some(a), Some(b)) = (left.as_int(), right.as_int()) else {
                    return Err(self.type_error(op, left, right));
                };
                Ok(Value::Int(match op {
                    BinOp::BitAnd => a & b,
                    BinOp::BitOr => a | b,
                    BinOp::BitXor => a ^ b,
                    BinOp::Shl => a.wrapping_shl((b & 63) as u32),
                    _ => a.wrapping_shr((b & 63) as u32),
                }))
            }
        }
    }

    fn arithmetic(&self, op: BinOp, left: &Value, right: &Value) -> Result<Value, RuntimeError> {
        let integral = |v: &Value| matches!(v, Value::Int(_) | Value::Bool(_));

        if integral(left) && integral(right) {
            let (Some(a), Some(b)) = (left.as_int(), right.as_int()) else {
                return Err(self.type_error(op, left, right));
            };
            let result = match op {
                BinOp::Add => a.wrapping_add(b),
                BinOp::Sub => a.wrapping_sub(b),
                BinOp::Mul => a.wrapping_mul(b),
                BinOp::Div | BinOp::Mod if b == 0 => {
                    let operation = if op == BinOp::Div { "Division" } else { "Modulo" };
                    return Err(RuntimeError::DivisionByZero {
                        operation: operation.to_string(),
                        line: self.line(),
                    });
                }
                BinOp::Div => a.wrapping_div(b),
                _ => a.wrapping_rem(b),
            };
            return Ok(Value::Int(result));
        }

        let (Some(a), Some(b)) = (left.as_number(), right.as_number()) else {
            return Err(self.type_error(op, left, right));
        };
        Ok(Value::Float(match op {
            BinOp::Add => a + b,
            BinOp::Sub => a - b,
            BinOp::Mul => a * b,
            BinOp::Div => a / b,
            _ => a % b,
        }))
    }

    fn unary_op(&self, op: UnOp, value: &Value) -> Result<Value, RuntimeError> {
        match (op, value) {
            (UnOp::Not, v) => Ok(Value::Bool(!v.is_truthy())),
            (UnOp::Neg, Value::Float(x)) => Ok(Value::Float(-x)),
            (UnOp::Neg, v) if v.is_numeric() => Ok(Value::Int(v.as_int().unwrap_or(0).wrapping_neg())),
            (UnOp::BitNot, v) if v.is_numeric() => Ok(Value::Int(!v.as_int().unwrap_or(0))),
            (_, v) => Err(RuntimeError::TypeError {
                message: format!("cannot apply unary operator to {}", v.type_name()),
                line: self.line(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::interpreter::engine::Interpreter;
    use crate::interpreter::errors::RuntimeError;
    use crate::interpreter::sandbox::TraceConfig;
    use crate::parser::rewrite;
    use crate::runtime::Scalar;

    /// Push `expr` onto a stack and report the recorded value
    fn eval(expr: &str) -> Result<Option<Scalar>, RuntimeError> {
        let source = format!("stack<int> s;\ns.push({});", expr);
        let program = rewrite(&source);
        let mut interpreter = Interpreter::new(&program, &TraceConfig::default());
        interpreter.run()?;
        let log = interpreter.into_log();
        Ok(log.get(0).and_then(|c| c.value.clone()))
    }

    #[test]
    fn test_integer_arithmetic_truncates() {
        assert_eq!(eval("7 / 2").unwrap(), Some(Scalar::Int(3)));
        assert_eq!(eval("-7 / 2").unwrap(), Some(Scalar::Int(-3)));
        assert_eq!(eval("7 % 3").unwrap(), Some(Scalar::Int(1)));
        assert_eq!(eval("1 + 2 * 3").unwrap(), Some(Scalar::Int(7)));
    }

    #[test]
    fn test_float_promotion() {
        assert_eq!(eval("7 / 2.0").unwrap(), Some(Scalar::Float(3.5)));
        assert_eq!(eval("0.5 + 1").unwrap(), Some(Scalar::Float(1.5)));
    }

    #[test]
    fn test_integer_division_by_zero_faults() {
        assert!(matches!(
            eval("1 / 0"),
            Err(RuntimeError::DivisionByZero { .. })
        ));
        assert!(matches!(
            eval("1 % 0"),
            Err(RuntimeError::DivisionByZero { .. })
        ));
    }

    #[test]
    fn test_string_concatenation() {
        assert_eq!(
            eval("\"n=\" + 4").unwrap(),
            Some(Scalar::Str("n=4".to_string()))
        );
    }

    #[test]
    fn test_logic_yields_booleans() {
        assert_eq!(eval("3 > 2 && 1").unwrap(), Some(Scalar::Bool(true)));
        assert_eq!(eval("0 || \"\"").unwrap(), Some(Scalar::Bool(false)));
        assert_eq!(eval("!5").unwrap(), Some(Scalar::Bool(false)));
        assert_eq!(eval("1 == 1.0").unwrap(), Some(Scalar::Bool(true)));
    }

    #[test]
    fn test_short_circuit_skips_side_effects() {
        let program = rewrite("stack<int> s;\nfalse && s.push(1);\ntrue || s.push(2);");
        let mut interpreter = Interpreter::new(&program, &TraceConfig::default());
        interpreter.run().unwrap();
        assert!(interpreter.into_log().is_empty());
    }

    #[test]
    fn test_steps_and_compound_assignment() {
        let program = rewrite(
            "stack<int> s;\nint i = 1;\ns.push(i++);\ns.push(++i);\ni *= 10;\ns.push(i);\nint a[2];\na[0] += 5;",
        );
        let mut interpreter = Interpreter::new(&program, &TraceConfig::default());
        let result = interpreter.run();
        let log: Vec<String> = interpreter.into_log().iter().map(|c| c.to_string()).collect();
        assert_eq!(
            &log[..3],
            &["PUSH(stack,s,1)", "PUSH(stack,s,3)", "PUSH(stack,s,30)"]
        );
        // a[0] is absent (null), so `+= 5` has no numeric meaning
        assert!(matches!(result, Err(RuntimeError::TypeError { .. })));
    }

    #[test]
    fn test_ternary_and_bitwise() {
        assert_eq!(eval("5 > 3 ? 6 & 3 : 0").unwrap(), Some(Scalar::Int(2)));
        assert_eq!(eval("1 << 4").unwrap(), Some(Scalar::Int(16)));
    }
}
