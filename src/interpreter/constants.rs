// Constants for the trace interpreter

/// Guarded loop-condition evaluations allowed per run before the iteration
/// guard trips. Counted across all loops, not per loop.
pub const ITERATION_CEILING: usize = 5000;

/// Maximum nesting of user function calls. Sized so a runaway recursion
/// faults well before a 2 MiB thread stack runs out, even in debug builds.
pub const MAX_CALL_DEPTH: usize = 64;
