//! Runtime error types for the trace interpreter
//!
//! This module defines [`RuntimeError`], which represents every fault that can
//! stop a lowered program. Faults never escape the sandbox: they end the run
//! and are reported next to the command log collected so far.
//!
//! [`FaultKind`] groups the variants into the three classes the sandbox
//! distinguishes.

use crate::parser::ast::SourceLocation;
use crate::parser::ParseError;
use crate::runtime::Target;
use std::fmt;

/// Classification of a fault at the sandbox boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultKind {
    /// Source that could not be lowered, reached during execution
    Malformed,
    /// A fault raised while running well-formed code
    Runtime,
    /// The iteration guard or the call-depth ceiling tripped
    BoundedExecution,
}

impl fmt::Display for FaultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FaultKind::Malformed => write!(f, "malformed"),
            FaultKind::Runtime => write!(f, "runtime"),
            FaultKind::BoundedExecution => write!(f, "bounded-execution"),
        }
    }
}

/// Runtime errors that can occur during execution
#[derive(Debug, Clone, PartialEq)]
pub enum RuntimeError {
    /// Executed a statement that failed to parse
    Malformed {
        message: String,
        location: SourceLocation,
    },

    /// Read or assignment of a name that was never declared
    UndefinedVariable { name: String, line: usize },

    /// Call to a name that is neither a user function nor a capability
    UndefinedFunction { name: String, line: usize },

    /// Operand or element of the wrong kind
    TypeError { message: String, line: usize },

    /// Method the container does not expose
    UnsupportedMethod {
        target: Target,
        method: String,
        line: usize,
    },

    /// Function or method argument count mismatch
    ArgumentCountMismatch {
        function: String,
        expected: usize,
        got: usize,
        line: usize,
    },

    /// Re-assignment of a container binding
    ConstAssignment { name: String, line: usize },

    /// Left side of an assignment is not a variable, element or member
    InvalidAssignmentTarget { line: usize },

    /// Integer division or modulo by zero
    DivisionByZero { operation: String, line: usize },

    /// Array size that is not a non-negative whole number
    InvalidArraySize { size: String, line: usize },

    /// `break` or `continue` outside a loop
    StrayControlFlow { keyword: &'static str, line: usize },

    /// Call nesting exceeded the configured ceiling
    CallDepthExceeded { limit: usize, line: usize },

    /// The iteration guard tripped
    IterationLimitExceeded { limit: usize, line: usize },
}

impl RuntimeError {
    pub fn kind(&self) -> FaultKind {
        match self {
            RuntimeError::Malformed { .. } => FaultKind::Malformed,
            RuntimeError::CallDepthExceeded { .. } | RuntimeError::IterationLimitExceeded { .. } => {
                FaultKind::BoundedExecution
            }
            _ => FaultKind::Runtime,
        }
    }

    /// Source line the fault is attributed to (0 when no line was marked yet)
    pub fn line(&self) -> usize {
        match self {
            RuntimeError::Malformed { location, .. } => location.line,
            RuntimeError::UndefinedVariable { line, .. }
            | RuntimeError::UndefinedFunction { line, .. }
            | RuntimeError::TypeError { line, .. }
            | RuntimeError::UnsupportedMethod { line, .. }
            | RuntimeError::ArgumentCountMismatch { line, .. }
            | RuntimeError::ConstAssignment { line, .. }
            | RuntimeError::InvalidAssignmentTarget { line }
            | RuntimeError::DivisionByZero { line, .. }
            | RuntimeError::InvalidArraySize { line, .. }
            | RuntimeError::StrayControlFlow { line, .. }
            | RuntimeError::CallDepthExceeded { line, .. }
            | RuntimeError::IterationLimitExceeded { line, .. } => *line,
        }
    }
}

impl From<ParseError> for RuntimeError {
    fn from(err: ParseError) -> Self {
        RuntimeError::Malformed {
            message: err.message,
            location: err.location,
        }
    }
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuntimeError::Malformed { message, location } => {
                write!(
                    f,
                    "Malformed source at line {}, column {}: {}",
                    location.line, location.column, message
                )
            }
            RuntimeError::UndefinedVariable { name, line } => {
                write!(f, "Undefined variable '{}' at line {}", name, line)
            }
            RuntimeError::UndefinedFunction { name, line } => {
                write!(f, "Undefined function '{}' at line {}", name, line)
            }
            RuntimeError::TypeError { message, line } => {
                write!(f, "Type error at line {}: {}", line, message)
            }
            RuntimeError::UnsupportedMethod {
                target,
                method,
                line,
            } => {
                write!(f, "A {} has no method '{}' at line {}", target, method, line)
            }
            RuntimeError::ArgumentCountMismatch {
                function,
                expected,
                got,
                line,
            } => {
                write!(
                    f,
                    "Function '{}' expects {} argument{}, got {} at line {}",
                    function,
                    expected,
                    if *expected == 1 { "" } else { "s" },
                    got,
                    line
                )
            }
            RuntimeError::ConstAssignment { name, line } => {
                write!(f, "Assignment to constant '{}' at line {}", name, line)
            }
            RuntimeError::InvalidAssignmentTarget { line } => {
                write!(f, "Invalid assignment target at line {}", line)
            }
            RuntimeError::DivisionByZero { operation, line } => {
                write!(f, "{} by zero at line {}", operation, line)
            }
            RuntimeError::InvalidArraySize { size, line } => {
                write!(f, "Invalid array size {} at line {}", size, line)
            }
            RuntimeError::StrayControlFlow { keyword, line } => {
                write!(f, "'{}' outside of a loop at line {}", keyword, line)
            }
            RuntimeError::CallDepthExceeded { limit, line } => {
                write!(f, "Call depth exceeded {} at line {}", limit, line)
            }
            RuntimeError::IterationLimitExceeded { limit, line } => {
                write!(
                    f,
                    "Loop iteration limit of {} exceeded at line {}",
                    limit, line
                )
            }
        }
    }
}

impl std::error::Error for RuntimeError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fault_classification() {
        let malformed = RuntimeError::from(ParseError {
            message: "Expected expression".to_string(),
            location: SourceLocation::new(2, 5),
        });
        assert_eq!(malformed.kind(), FaultKind::Malformed);
        assert_eq!(malformed.line(), 2);

        let guard = RuntimeError::IterationLimitExceeded { limit: 5000, line: 4 };
        assert_eq!(guard.kind(), FaultKind::BoundedExecution);
        assert_eq!(
            guard.to_string(),
            "Loop iteration limit of 5000 exceeded at line 4"
        );

        let undefined = RuntimeError::UndefinedVariable {
            name: "x".to_string(),
            line: 1,
        };
        assert_eq!(undefined.kind(), FaultKind::Runtime);
    }
}
