//! Call stack and lexical scopes
//!
//! - [`CallStack`]: the global frame plus one [`Frame`] per active call
//! - [`Frame`]: a function's bindings, with nested block scopes
//! - [`Binding`]: a value and whether it may be re-assigned
//!
//! # Scoping
//!
//! Each block pushes a scope. Declaring a name that already exists in an
//! outer scope shadows it; the outer binding is restored when the block
//! ends. Name lookup checks the current frame first, then the global frame,
//! so functions see top-level declarations but not their callers' locals.

use crate::runtime::Value;
use rustc_hash::FxHashMap;

/// A named value
#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    pub value: Value,
    /// Container bindings are constant
    pub constant: bool,
}

impl Binding {
    pub fn variable(value: Value) -> Self {
        Binding {
            value,
            constant: false,
        }
    }

    pub fn constant(value: Value) -> Self {
        Binding {
            value,
            constant: true,
        }
    }
}

#[derive(Debug, Clone, Default)]
struct ScopeData {
    shadowed: Vec<(String, Binding)>,
    declared: Vec<String>,
}

/// Activation record for a function call (or the top level)
#[derive(Debug, Clone)]
pub struct Frame {
    pub function_name: String,
    locals: FxHashMap<String, Binding>,
    scope_stack: Vec<ScopeData>,
}

impl Frame {
    pub fn new(function_name: &str) -> Self {
        Frame {
            function_name: function_name.to_string(),
            locals: FxHashMap::default(),
            scope_stack: Vec::new(),
        }
    }

    /// Enter a new scope
    pub fn push_scope(&mut self) {
        self.scope_stack.push(ScopeData::default());
    }

    /// Exit the current scope, dropping its declarations and restoring
    /// whatever they shadowed
    pub fn pop_scope(&mut self) {
        if let Some(scope) = self.scope_stack.pop() {
            for name in scope.declared {
                self.locals.remove(&name);
            }
            for (name, binding) in scope.shadowed {
                self.locals.insert(name, binding);
            }
        }
    }

    /// Declare a name in the innermost scope. Re-declaring in the same
    /// scope replaces the binding.
    pub fn declare(&mut self, name: &str, binding: Binding) {
        let previous = self.locals.insert(name.to_string(), binding);

        let Some(scope) = self.scope_stack.last_mut() else {
            return;
        };
        if scope.declared.iter().any(|n| n == name) {
            return;
        }
        match previous {
            Some(old) if !scope.shadowed.iter().any(|(n, _)| n == name) => {
                scope.shadowed.push((name.to_string(), old));
            }
            Some(_) => {}
            None => scope.declared.push(name.to_string()),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Binding> {
        self.locals.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Binding> {
        self.locals.get_mut(name)
    }
}

/// The call stack. Frame 0 is the global frame and is never popped.
#[derive(Debug, Clone)]
pub struct CallStack {
    frames: Vec<Frame>,
}

impl CallStack {
    pub fn new() -> Self {
        CallStack {
            frames: vec![Frame::new("<global>")],
        }
    }

    pub fn push_frame(&mut self, function_name: &str) {
        let mut frame = Frame::new(function_name);
        frame.push_scope();
        self.frames.push(frame);
    }

    pub fn pop_frame(&mut self) -> Option<Frame> {
        if self.frames.len() > 1 {
            self.frames.pop()
        } else {
            None
        }
    }

    /// Number of active calls (the global frame is not counted)
    pub fn depth(&self) -> usize {
        self.frames.len() - 1
    }

    pub fn current_frame(&self) -> &Frame {
        &self.frames[self.frames.len() - 1]
    }

    pub fn current_frame_mut(&mut self) -> &mut Frame {
        let last = self.frames.len() - 1;
        &mut self.frames[last]
    }

    pub fn push_scope(&mut self) {
        self.current_frame_mut().push_scope();
    }

    pub fn pop_scope(&mut self) {
        self.current_frame_mut().pop_scope();
    }

    pub fn declare(&mut self, name: &str, binding: Binding) {
        self.current_frame_mut().declare(name, binding);
    }

    /// Resolve a name: current frame, then globals
    pub fn lookup(&self, name: &str) -> Option<&Binding> {
        self.current_frame()
            .get(name)
            .or_else(|| self.frames[0].get(name))
    }

    pub fn lookup_mut(&mut self, name: &str) -> Option<&mut Binding> {
        let last = self.frames.len() - 1;
        if self.frames[last].get(name).is_some() {
            return self.frames[last].get_mut(name);
        }
        self.frames[0].get_mut(name)
    }
}

impl Default for CallStack {
    fn default() -> Self {
        Self::new()
    }
}
