//! Runtime value representation
//!
//! This module defines the [`Value`] enum, which represents every value a
//! lowered program can hold. Values are untyped: declared C-like types are
//! never checked, so an `int` variable may well end up holding a string.
//!
//! # Value Types
//!
//! - [`Value::Int`]: 64-bit signed integer (integer literals, integer arithmetic)
//! - [`Value::Float`]: 64-bit float (float literals, mixed arithmetic)
//! - [`Value::Str`]: string and character literals
//! - [`Value::Bool`]: `true` / `false`, comparison results
//! - [`Value::Null`]: `nullptr` / `NULL`
//! - [`Value::Undefined`]: declared-but-unassigned bindings, `void` returns
//! - [`Value::Container`]: handle to a container owned by the [`Runtime`]
//!
//! Only the first four can be stored inside a container; see [`Scalar`].
//!
//! [`Runtime`]: super::Runtime

use super::command::Scalar;
use super::ContainerId;
use std::cmp::Ordering;
use std::fmt;

/// Runtime values in the interpreter
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
    Null,
    #[default]
    Undefined,
    Container(ContainerId),
}

impl Value {
    /// Host-language truthiness
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Int(n) => *n != 0,
            Value::Float(f) => *f != 0.0 && !f.is_nan(),
            Value::Str(s) => !s.is_empty(),
            Value::Bool(b) => *b,
            Value::Null | Value::Undefined => false,
            Value::Container(_) => true,
        }
    }

    /// Convert to a scalar payload, if this value may be stored in a container.
    /// NaN and infinities are refused since JSON has no encoding for them.
    pub fn to_scalar(&self) -> Option<Scalar> {
        match self {
            Value::Int(n) => Some(Scalar::Int(*n)),
            Value::Float(f) if f.is_finite() => Some(Scalar::Float(*f)),
            Value::Float(_) => None,
            Value::Str(s) => Some(Scalar::Str(s.clone())),
            Value::Bool(b) => Some(Scalar::Bool(*b)),
            Value::Null | Value::Undefined | Value::Container(_) => None,
        }
    }

    /// Numeric view used by arithmetic and comparisons (booleans count as 0/1)
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Int(n) => Some(*n as f64),
            Value::Float(f) => Some(*f),
            Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            _ => None,
        }
    }

    /// Integer view used by bitwise operators, modulo and array indexing.
    /// Floats truncate toward zero.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            Value::Float(f) if f.is_finite() => Some(f.trunc() as i64),
            Value::Bool(b) => Some(i64::from(*b)),
            _ => None,
        }
    }

    /// The index this value denotes, if it is a non-negative whole number
    pub fn as_index(&self) -> Option<usize> {
        match self {
            Value::Int(n) => usize::try_from(*n).ok(),
            Value::Float(f) if f.fract() == 0.0 && *f >= 0.0 && f.is_finite() => {
                Some(*f as usize)
            }
            _ => None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Value::Int(_) | Value::Float(_) | Value::Bool(_))
    }

    /// Short name of the value's kind, used in diagnostics
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::Bool(_) => "bool",
            Value::Null => "null",
            Value::Undefined => "undefined",
            Value::Container(_) => "container",
        }
    }

    /// Strict equality: numbers compare by value regardless of int/float,
    /// everything else must share a kind.
    pub fn strict_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Int(_) | Value::Float(_), Value::Int(_) | Value::Float(_)) => {
                self.as_number() == other.as_number()
            }
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Null, Value::Null) | (Value::Undefined, Value::Undefined) => true,
            (Value::Container(a), Value::Container(b)) => a == b,
            _ => false,
        }
    }

    /// Ordering for relational operators; `None` when the pair is unordered
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
            _ => self.as_number()?.partial_cmp(&other.as_number()?),
        }
    }
}

impl From<Scalar> for Value {
    fn from(scalar: Scalar) -> Self {
        match scalar {
            Scalar::Int(n) => Value::Int(n),
            Scalar::Float(f) => Value::Float(f),
            Scalar::Str(s) => Value::Str(s),
            Scalar::Bool(b) => Value::Bool(b),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(x) => write!(f, "{}", x),
            Value::Str(s) => write!(f, "{}", s),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Null => write!(f, "null"),
            Value::Undefined => write!(f, "undefined"),
            Value::Container(id) => write!(f, "<container #{}>", id.0),
        }
    }
}
