//! Trace interpreter and execution sandbox
//!
//! This module runs lowered programs against the instrumented runtime:
//! - [`sandbox`]: the fault-containing boundary ([`execute`], [`TraceConfig`])
//! - [`engine`]: the [`Interpreter`] itself
//! - [`errors`]: runtime error types and their fault classification
//! - [`frames`]: variable scopes and the call stack
//!
//! # Execution Model
//!
//! The interpreter walks the lowered statements directly. A program's only
//! capabilities are the container constructors (reached through lowered
//! declarations), container methods, its own functions and the iteration
//! guard wrapped around every loop condition.
//!
//! [`Interpreter`]: engine::Interpreter

mod builtins;
pub mod constants;
pub mod engine;
pub mod errors;
mod expressions;
pub mod frames;
mod loops;
pub mod sandbox;
mod statements;

pub use sandbox::{execute, Execution, TraceConfig};
