//! # Introduction
//!
//! structrace runs small C-like programs that manipulate stacks, queues,
//! fixed-size arrays and linked lists, and records every container mutation
//! as a [`runtime::Command`]. The resulting [`runtime::CommandLog`] is then
//! replayed step by step, forward and backward, in a terminal UI built with
//! [ratatui](https://docs.rs/ratatui).
//!
//! ## Execution pipeline
//!
//! ```text
//! Source → Lexer → Lowering → Program → Interpreter → CommandLog → Timeline → TUI
//! ```
//!
//! 1. [`parser`]: tokenises the source and lowers it into an untyped
//!    [`parser::Program`] with line markers and guarded loop conditions.
//!    Lowering never fails; broken statements are kept and fault when run.
//! 2. [`runtime`]: the instrumented containers and the command journal.
//! 3. [`interpreter`]: walks the program inside a sandbox that contains every
//!    fault and returns the commands recorded so far.
//! 4. [`snapshot`]: rebuilds container state for any prefix of the log and
//!    drives stepping and auto-play.
//! 5. [`ui`]: ratatui-based viewer; not part of the stable library API.
//!
//! ## Supported subset
//!
//! Containers: `stack<T>`, `queue<T>`, `list<T>`, `T name[N] = {..}`.
//! Control flow: `if/else`, `while`, `do-while`, `for`, `break`, `continue`,
//! `return`, user functions (a `main` is invoked once if present).
//! Scalars: integers, floats, strings, chars, booleans.

pub mod interpreter;
pub mod parser;
pub mod runtime;
pub mod snapshot;
pub mod ui;

use interpreter::{Execution, TraceConfig};
use runtime::CommandLog;

/// Lower and run `source` with default limits, returning the command log.
/// A fault ends the log early but is never an error.
pub fn trace(source: &str) -> CommandLog {
    trace_with(source, &TraceConfig::default()).log
}

/// Lower and run `source`, reporting any contained fault alongside the log
pub fn trace_with(source: &str, config: &TraceConfig) -> Execution {
    let program = parser::rewrite(source);
    let execution = interpreter::execute(&program, config);
    tracing::debug!(
        functions = program.functions.len(),
        statements = program.body.len(),
        commands = execution.log.len(),
        complete = execution.is_complete(),
        "trace finished"
    );
    execution
}
