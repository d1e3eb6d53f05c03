//! The sandbox boundary
//!
//! [`execute`] is the only way the rest of the crate runs a program. It never
//! fails: whatever stops the run (a malformed statement, a runtime fault, the
//! iteration guard or the call-depth ceiling) is logged and handed back next
//! to the commands recorded up to that point.

use crate::interpreter::constants::{ITERATION_CEILING, MAX_CALL_DEPTH};
use crate::interpreter::engine::Interpreter;
use crate::interpreter::errors::RuntimeError;
use crate::parser::Program;
use crate::runtime::CommandLog;

/// Limits and recording options for one run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceConfig {
    /// Guarded loop-condition evaluations allowed across the whole run
    pub iteration_ceiling: usize,
    /// Maximum nesting of user function calls
    pub max_call_depth: usize,
    /// Drop `POP`/`DEQUEUE`/`LIST_REMOVE` commands aimed at empty containers
    pub suppress_empty_removals: bool,
}

impl Default for TraceConfig {
    fn default() -> Self {
        TraceConfig {
            iteration_ceiling: ITERATION_CEILING,
            max_call_depth: MAX_CALL_DEPTH,
            suppress_empty_removals: false,
        }
    }
}

/// Outcome of one contained run
#[derive(Debug, Clone, PartialEq)]
pub struct Execution {
    /// Every command recorded before the run ended
    pub log: CommandLog,
    /// Why the run stopped early, if it did
    pub fault: Option<RuntimeError>,
}

impl Execution {
    /// True when the program ran to completion
    pub fn is_complete(&self) -> bool {
        self.fault.is_none()
    }
}

/// Run a lowered program and contain any fault
pub fn execute(program: &Program, config: &TraceConfig) -> Execution {
    let mut interpreter = Interpreter::new(program, config);
    let result = interpreter.run();
    let commands = interpreter.commands_recorded();

    let fault = match result {
        Ok(()) => None,
        Err(error) => {
            tracing::warn!(kind = %error.kind(), commands, error = %error, "execution stopped");
            Some(error)
        }
    };

    Execution {
        log: interpreter.into_log(),
        fault,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::errors::FaultKind;
    use crate::parser::rewrite;

    #[test]
    fn test_clean_run_is_complete() {
        let program = rewrite("stack<int> s;\ns.push(1);");
        let execution = execute(&program, &TraceConfig::default());
        assert!(execution.is_complete());
        assert_eq!(execution.log.len(), 1);
    }

    #[test]
    fn test_faults_are_classified() {
        let cases = [
            ("stack<int> s;\ns.push(1);\ns.push(;", FaultKind::Malformed),
            ("stack<int> s;\ns.push(1);\ns.push(1 / 0);", FaultKind::Runtime),
            ("stack<int> s;\ns.push(1);\nwhile (1) {}", FaultKind::BoundedExecution),
        ];

        for (source, kind) in cases {
            let execution = execute(&rewrite(source), &TraceConfig::default());
            assert_eq!(execution.log.len(), 1, "{}", source);
            assert_eq!(execution.fault.map(|f| f.kind()), Some(kind), "{}", source);
        }
    }

    #[test]
    fn test_suppressed_empty_removals() {
        let config = TraceConfig {
            suppress_empty_removals: true,
            ..TraceConfig::default()
        };
        let program = rewrite("stack<int> s;\ns.pop();\nqueue<int> q;\nq.pop();");
        assert!(execute(&program, &config).log.is_empty());
        assert_eq!(execute(&program, &TraceConfig::default()).log.len(), 2);
    }
}
