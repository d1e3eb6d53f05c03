//! Source rewriter: container-language source to a lowered program
//!
//! This module lowers restricted C++-like source into a [`Program`] of the
//! host instruction set the interpreter runs:
//! - [`lexer`]: Tokenization (source text → tokens), never fails
//! - [`parse`]: Parser core, error recovery and the [`rewrite`] entry point
//! - [`ast`]: Lowered program definitions
//! - `listing`: host program text for a lowered program (`Display`)
//!
//! # Supported Subset
//!
//! - Containers: `stack<T>`, `queue<T>`, `list<T>` (`vector<T>` and
//!   `LinkedList<T>` as aliases), fixed arrays with optional brace initializer
//! - Scalar declarations of any built-in type, untyped after lowering
//! - Functions (a `main` entry point is invoked once), `if/else`, `while`,
//!   `do-while`, `for`, `return`, `break`, `continue`
//! - Expressions: arithmetic, logical, bitwise, ternary, calls, method calls,
//!   indexing
//! - Comments, preprocessor lines, `using namespace` and console I/O are dropped
//!
//! # Parser Implementation
//!
//! Hand-written recursive descent parser with precedence climbing for binary operators.
//! No external parser generator dependencies.

pub mod ast;
mod declarations;
mod expressions;
pub mod lexer;
mod listing;
pub mod parse;
mod statements;

pub use ast::Program;
pub use parse::{rewrite, ParseError};
