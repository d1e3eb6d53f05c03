//! Loop statement execution (`while`, `do-while`, `for`).
//!
//! Adds `impl Interpreter` methods for the three loop forms. Conditions
//! arrive already wrapped in the iteration guard, so every condition
//! evaluation counts toward the run's ceiling. `break` and `continue` are
//! reported through [`LoopBodyResult`]; a `return` inside a body unwinds the
//! loop and leaves the signal for the enclosing call.

use crate::interpreter::engine::{ControlFlow, Interpreter};
use crate::interpreter::errors::RuntimeError;
use crate::parser::ast::{Expr, Stmt};

/// Result returned by [`Interpreter::execute_loop_body`] to signal how the body ended.
pub(crate) enum LoopBodyResult {
    /// Body completed normally or via `continue`, so the loop iterates again.
    Continue,
    /// `break` was encountered.
    Break,
    /// `return` was triggered; the loop unwinds and leaves `control_flow` set.
    Exit,
}

impl<'p> Interpreter<'p> {
    /// Executes `body` inside a fresh scope and consumes `break`/`continue`.
    pub(crate) fn execute_loop_body(&mut self, body: &'p [Stmt]) -> Result<LoopBodyResult, RuntimeError> {
        self.execute_block(body)?;

        let result = match self.control_flow {
            ControlFlow::Normal | ControlFlow::Continue => LoopBodyResult::Continue,
            ControlFlow::Break => LoopBodyResult::Break,
            ControlFlow::Return(_) => return Ok(LoopBodyResult::Exit),
        };
        self.control_flow = ControlFlow::Normal;
        Ok(result)
    }

    /// Executes a `while (condition) { body }` loop.
    pub(crate) fn execute_while(&mut self, condition: &'p Expr, body: &'p [Stmt]) -> Result<(), RuntimeError> {
        while self.evaluate(condition)?.is_truthy() {
            match self.execute_loop_body(body)? {
                LoopBodyResult::Continue => {}
                LoopBodyResult::Break | LoopBodyResult::Exit => break,
            }
        }
        Ok(())
    }

    /// Executes a `do { body } while (condition)` loop. The body always runs
    /// at least once; `continue` jumps to the condition.
    pub(crate) fn execute_do_while(&mut self, body: &'p [Stmt], condition: &'p Expr) -> Result<(), RuntimeError> {
        loop {
            match self.execute_loop_body(body)? {
                LoopBodyResult::Continue => {}
                LoopBodyResult::Break | LoopBodyResult::Exit => break,
            }
            if !self.evaluate(condition)?.is_truthy() {
                break;
            }
        }
        Ok(())
    }

    /// Executes a `for (init; condition; increment) { body }` loop. The
    /// initializer's bindings live in a scope around the whole loop.
    pub(crate) fn execute_for(
        &mut self,
        init: &'p [Stmt],
        condition: &'p Expr,
        increment: &'p [Expr],
        body: &'p [Stmt],
    ) -> Result<(), RuntimeError> {
        self.stack.push_scope();
        let result = self.run_for(init, condition, increment, body);
        self.stack.pop_scope();
        result
    }

    fn run_for(
        &mut self,
        init: &'p [Stmt],
        condition: &'p Expr,
        increment: &'p [Expr],
        body: &'p [Stmt],
    ) -> Result<(), RuntimeError> {
        self.execute_statements(init)?;

        while self.evaluate(condition)?.is_truthy() {
            match self.execute_loop_body(body)? {
                LoopBodyResult::Continue => {}
                LoopBodyResult::Break | LoopBodyResult::Exit => break,
            }
            for expr in increment {
                self.evaluate(expr)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::interpreter::engine::Interpreter;
    use crate::interpreter::errors::RuntimeError;
    use crate::interpreter::sandbox::TraceConfig;
    use crate::parser::rewrite;

    fn run_with(source: &str, config: &TraceConfig) -> (Vec<String>, Option<RuntimeError>) {
        let program = rewrite(source);
        let mut interpreter = Interpreter::new(&program, config);
        let result = interpreter.run();
        let log = interpreter.into_log();
        (log.iter().map(|c| c.to_string()).collect(), result.err())
    }

    fn run(source: &str) -> (Vec<String>, Option<RuntimeError>) {
        run_with(source, &TraceConfig::default())
    }

    #[test]
    fn test_while_drains_stack() {
        let (log, fault) = run("stack<int> s;\ns.push(1);\ns.push(2);\nwhile (!s.empty()) {\n  s.pop();\n}");
        assert!(fault.is_none());
        assert_eq!(
            log,
            vec!["PUSH(stack,s,1)", "PUSH(stack,s,2)", "POP(stack,s)", "POP(stack,s)"]
        );
    }

    #[test]
    fn test_break_and_continue() {
        let source = "stack<int> s;\nfor (int i = 0; i < 10; i++) {\n  if (i % 2 == 1) continue;\n  if (i > 4) break;\n  s.push(i);\n}";
        let (log, _) = run(source);
        assert_eq!(log, vec!["PUSH(stack,s,0)", "PUSH(stack,s,2)", "PUSH(stack,s,4)"]);
    }

    #[test]
    fn test_do_while_runs_once() {
        let (log, _) = run("queue<int> q;\ndo { q.push(1); } while (false);");
        assert_eq!(log, vec!["ENQUEUE(queue,q,1)"]);
    }

    #[test]
    fn test_return_from_inside_loop() {
        let source = "stack<int> s;\nint first() {\n  for (int i = 5; ; i++) { return i; }\n}\ns.push(first());";
        let (log, fault) = run(source);
        assert!(fault.is_none());
        assert_eq!(log, vec!["PUSH(stack,s,5)"]);
    }

    #[test]
    fn test_iteration_guard_keeps_prefix() {
        let config = TraceConfig {
            iteration_ceiling: 10,
            ..TraceConfig::default()
        };
        let (log, fault) = run_with("stack<int> s;\nwhile (true) { s.push(1); }", &config);
        assert_eq!(log.len(), 10);
        assert!(matches!(
            fault,
            Some(RuntimeError::IterationLimitExceeded { limit: 10, .. })
        ));
    }

    #[test]
    fn test_guard_counts_across_loops() {
        let config = TraceConfig {
            iteration_ceiling: 5,
            ..TraceConfig::default()
        };
        // 3 evaluations for the first loop (2 true + 1 false), 2 left for the second
        let source = "stack<int> s;\nfor (int i = 0; i < 2; i++) s.push(i);\nwhile (true) s.push(9);";
        let (log, fault) = run_with(source, &config);
        assert_eq!(
            log,
            vec!["PUSH(stack,s,0)", "PUSH(stack,s,1)", "PUSH(stack,s,9)", "PUSH(stack,s,9)"]
        );
        assert!(fault.is_some());
    }

    #[test]
    fn test_loop_scope_does_not_leak() {
        let (_, fault) = run("for (int i = 0; i < 1; i++) {}\ni = 3;");
        assert!(matches!(fault, Some(RuntimeError::UndefinedVariable { .. })));
    }
}
