// Execution engine for lowered programs

use crate::interpreter::errors::RuntimeError;
use crate::interpreter::frames::{Binding, CallStack};
use crate::interpreter::sandbox::TraceConfig;
use crate::parser::ast::{FunctionDef, Program};
use crate::runtime::{CommandLog, Runtime, Value};
use rustc_hash::FxHashMap;

/// Non-local control flow raised by `break`, `continue` and `return`
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ControlFlow {
    Normal,
    Break,
    Continue,
    Return(Value),
}

/// Walks a lowered program against the instrumented runtime
///
/// The interpreter borrows the program for its whole run. Its only reach
/// into the outside world is the [`Runtime`]: container constructors,
/// container methods and the command journal. Everything else a program can
/// name is either a binding on the [`CallStack`] or one of its own functions.
pub struct Interpreter<'p> {
    program: &'p Program,

    /// User functions by name, hoisted before execution starts
    pub(crate) functions: FxHashMap<&'p str, &'p FunctionDef>,

    /// Containers and the command journal
    pub(crate) runtime: Runtime,

    /// Global frame plus one frame per active call
    pub(crate) stack: CallStack,

    pub(crate) control_flow: ControlFlow,

    /// Guarded loop-condition evaluations so far
    guard_count: usize,

    pub(crate) config: TraceConfig,
}

impl<'p> Interpreter<'p> {
    pub fn new(program: &'p Program, config: &TraceConfig) -> Self {
        let functions = program
            .functions
            .iter()
            .map(|f| (f.name.as_str(), f))
            .collect();

        Interpreter {
            program,
            functions,
            runtime: Runtime::new(config.suppress_empty_removals),
            stack: CallStack::new(),
            control_flow: ControlFlow::Normal,
            guard_count: 0,
            config: *config,
        }
    }

    /// Run the top-level statements (which end with the `main()` call when
    /// the program defines one). Commands recorded before a fault are kept.
    pub fn run(&mut self) -> Result<(), RuntimeError> {
        let program = self.program;

        for stmt in &program.body {
            self.execute_statement(stmt)?;
            match self.control_flow {
                ControlFlow::Normal => {}
                ControlFlow::Return(_) => break,
                ControlFlow::Break => return Err(self.stray("break")),
                ControlFlow::Continue => return Err(self.stray("continue")),
            }
        }

        self.control_flow = ControlFlow::Normal;
        Ok(())
    }

    /// Commands recorded so far
    pub fn commands_recorded(&self) -> usize {
        self.runtime.journal().len()
    }

    /// Freeze the journal into the finished command log
    pub fn into_log(self) -> CommandLog {
        self.runtime.into_log()
    }

    /// Line number of the most recent line marker
    pub(crate) fn line(&self) -> usize {
        self.runtime.current_line().number
    }

    pub(crate) fn stray(&self, keyword: &'static str) -> RuntimeError {
        RuntimeError::StrayControlFlow {
            keyword,
            line: self.line(),
        }
    }

    /// The iteration guard: counts every guarded condition evaluation and
    /// trips once the count exceeds the ceiling
    pub(crate) fn check_loop(&mut self) -> Result<(), RuntimeError> {
        self.guard_count += 1;
        if self.guard_count > self.config.iteration_ceiling {
            return Err(RuntimeError::IterationLimitExceeded {
                limit: self.config.iteration_ceiling,
                line: self.line(),
            });
        }
        Ok(())
    }

    pub(crate) fn declare(&mut self, name: &str, binding: Binding) {
        self.stack.declare(name, binding);
    }

    pub(crate) fn read_variable(&self, name: &str) -> Result<Value, RuntimeError> {
        self.stack
            .lookup(name)
            .map(|binding| binding.value.clone())
            .ok_or_else(|| RuntimeError::UndefinedVariable {
                name: name.to_string(),
                line: self.line(),
            })
    }

    pub(crate) fn write_variable(&mut self, name: &str, value: Value) -> Result<(), RuntimeError> {
        let line = self.line();
        match self.stack.lookup_mut(name) {
            Some(binding) if binding.constant => Err(RuntimeError::ConstAssignment {
                name: name.to_string(),
                line,
            }),
            Some(binding) => {
                binding.value = value;
                Ok(())
            }
            None => Err(RuntimeError::UndefinedVariable {
                name: name.to_string(),
                line,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::constants::MAX_CALL_DEPTH;
    use crate::parser::rewrite;
    use crate::runtime::CommandKind;

    fn run_with(source: &str, config: &TraceConfig) -> (CommandLog, Option<RuntimeError>) {
        let program = rewrite(source);
        let mut interpreter = Interpreter::new(&program, config);
        let result = interpreter.run();
        (interpreter.into_log(), result.err())
    }

    fn run(source: &str) -> (CommandLog, Option<RuntimeError>) {
        run_with(source, &TraceConfig::default())
    }

    fn rendered(log: &CommandLog) -> Vec<String> {
        log.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_top_level_statements_run_in_order() {
        let (log, fault) = run("stack<int> s;\ns.push(10);\ns.push(20);\ns.pop();");
        assert!(fault.is_none());
        assert_eq!(
            rendered(&log),
            vec!["PUSH(stack,s,10)", "PUSH(stack,s,20)", "POP(stack,s)"]
        );
        assert_eq!(log[2].source_text, "s.pop();");
    }

    #[test]
    fn test_main_runs_once_and_sees_globals() {
        let source = "queue<int> q;\nvoid fill(int n) {\n  for (int i = 1; i <= n; i++) q.push(i);\n}\nint main() {\n  fill(3);\n  q.pop();\n  return 0;\n}\n";
        let (log, fault) = run(source);
        assert!(fault.is_none());
        assert_eq!(
            rendered(&log),
            vec![
                "ENQUEUE(queue,q,1)",
                "ENQUEUE(queue,q,2)",
                "ENQUEUE(queue,q,3)",
                "DEQUEUE(queue,q)"
            ]
        );
        assert_eq!(log[0].source_text, "for (int i = 1; i <= n; i++) q.push(i);");
        assert_eq!(log[3].source_text, "q.pop();");
    }

    #[test]
    fn test_caller_line_restored_after_call() {
        let source = "stack<int> s;\nint two() {\n  return 2;\n}\ns.push(two());";
        let (log, _) = run(source);
        assert_eq!(log[0].source_text, "s.push(two());");
    }

    #[test]
    fn test_containers_pass_by_handle() {
        let source = "void add(stack<int>& st, int v) { st.push(v); }\nstack<int> s;\nadd(s, 4);\nadd(s, 5);";
        let (log, fault) = run(source);
        assert!(fault.is_none());
        assert_eq!(rendered(&log), vec!["PUSH(stack,s,4)", "PUSH(stack,s,5)"]);
    }

    #[test]
    fn test_fault_keeps_prefix() {
        let (log, fault) = run("stack<int> s;\ns.push(1);\ns.push(missing);\ns.push(2);");
        assert_eq!(log.len(), 1);
        assert!(matches!(fault, Some(RuntimeError::UndefinedVariable { line: 3, .. })));
    }

    #[test]
    fn test_container_binding_is_constant() {
        let (_, fault) = run("stack<int> s;\ns = 3;");
        assert!(matches!(fault, Some(RuntimeError::ConstAssignment { .. })));
    }

    #[test]
    fn test_break_outside_loop() {
        let (_, fault) = run("break;");
        assert!(matches!(
            fault,
            Some(RuntimeError::StrayControlFlow { keyword: "break", .. })
        ));
    }

    #[test]
    fn test_runaway_recursion_is_bounded() {
        let config = TraceConfig {
            max_call_depth: 16,
            ..TraceConfig::default()
        };
        let (_, fault) = run_with("void f() { f(); }\nf();", &config);
        assert!(matches!(fault, Some(RuntimeError::CallDepthExceeded { limit: 16, .. })));
    }

    #[test]
    fn test_default_call_depth_fits_small_thread_stack() {
        let source = "int f(int n) { return n + f(n + 1) * 2; }\nvoid g() { g(); }\nf(0);\ng();";
        let worker = std::thread::Builder::new()
            .stack_size(2 * 1024 * 1024)
            .spawn(move || run_with(source, &TraceConfig::default()).1)
            .unwrap();
        let fault = worker.join().unwrap();
        assert!(matches!(
            fault,
            Some(RuntimeError::CallDepthExceeded { limit: MAX_CALL_DEPTH, line: 1 })
        ));
    }

    #[test]
    fn test_queue_front_feeds_stack() {
        let source = "queue<int> q;\nstack<int> s;\nq.push(7);\ns.push(q.front());\nq.pop();";
        let (log, _) = run(source);
        let kinds: Vec<CommandKind> = log.iter().map(|c| c.kind).collect();
        assert_eq!(
            kinds,
            vec![CommandKind::Enqueue, CommandKind::Push, CommandKind::Dequeue]
        );
        assert_eq!(rendered(&log)[1], "PUSH(stack,s,7)");
    }
}
