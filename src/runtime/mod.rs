//! Instrumented runtime for lowered programs
//!
//! This module provides the only capabilities a lowered program can reach:
//! - [`command`]: the [`Command`] record and the immutable [`CommandLog`]
//! - [`value`]: runtime [`Value`] representation
//! - [`containers`]: stack, queue, list and array objects that record their
//!   own mutations
//!
//! # Recording Model
//!
//! The [`Runtime`] owns a [`Journal`] (the in-flight log plus the most
//! recently marked source line) and an arena of containers addressed by
//! [`ContainerId`]. Every mutating container call appends exactly one
//! command to the journal after the mutation has taken effect, citing the
//! current source line. When execution stops, for whatever reason, the
//! journal is frozen into a [`CommandLog`].

pub mod command;
pub mod containers;
pub mod value;

pub use command::{Command, CommandKind, CommandLog, Scalar, Target};
pub use containers::Container;
pub use value::Value;

use crate::interpreter::errors::RuntimeError;
use crate::parser::ast::SourceLine;
use containers::{ArrayObject, ListObject, QueueObject, StackObject};

/// Handle to a container in the runtime arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContainerId(pub usize);

/// The shared in-flight command log
#[derive(Debug, Default)]
pub struct Journal {
    commands: Vec<Command>,
    line: SourceLine,
    suppress_empty_removals: bool,
}

impl Journal {
    pub fn new(suppress_empty_removals: bool) -> Self {
        Journal {
            suppress_empty_removals,
            ..Journal::default()
        }
    }

    pub fn line_text(&self) -> &str {
        &self.line.text
    }

    pub fn line_number(&self) -> usize {
        self.line.number
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub(crate) fn record(&mut self, command: Command) {
        self.commands.push(command);
    }

    /// Record a removal. Removals from an already-empty container are kept
    /// unless the journal was configured to suppress them.
    pub(crate) fn record_removal(&mut self, had_items: bool, command: Command) {
        if had_items || !self.suppress_empty_removals {
            self.commands.push(command);
        }
    }
}

/// Container arena plus journal
#[derive(Debug, Default)]
pub struct Runtime {
    journal: Journal,
    containers: Vec<Container>,
}

impl Runtime {
    pub fn new(suppress_empty_removals: bool) -> Self {
        Runtime {
            journal: Journal::new(suppress_empty_removals),
            containers: Vec::new(),
        }
    }

    /// Source-line marker: later commands cite this line
    pub fn set_line(&mut self, line: &SourceLine) {
        if self.journal.line != *line {
            self.journal.line = line.clone();
        }
    }

    pub fn current_line(&self) -> &SourceLine {
        &self.journal.line
    }

    pub fn journal(&self) -> &Journal {
        &self.journal
    }

    pub fn create_stack(&mut self, name: &str) -> ContainerId {
        self.alloc(Container::Stack(StackObject::new(name)))
    }

    pub fn create_queue(&mut self, name: &str) -> ContainerId {
        self.alloc(Container::Queue(QueueObject::new(name)))
    }

    pub fn create_list(&mut self, name: &str) -> ContainerId {
        self.alloc(Container::List(ListObject::new(name)))
    }

    /// Construct an array: records `ARRAY_DECLARE`, then one `ARRAY_SET` per
    /// initializer element that fits, before returning the handle.
    pub fn create_array(
        &mut self,
        name: &str,
        size: usize,
        init: &[Value],
    ) -> Result<ContainerId, RuntimeError> {
        self.journal.record(
            Command::new(CommandKind::ArrayDeclare, Target::Array, name, self.journal.line_text())
                .with_size(size),
        );

        let mut array = ArrayObject::new(name, size);
        for (i, value) in init.iter().take(size).enumerate() {
            array.set(&Value::Int(i as i64), value.clone(), &mut self.journal)?;
        }
        Ok(self.alloc(Container::Array(array)))
    }

    pub fn get(&self, id: ContainerId) -> Option<&Container> {
        self.containers.get(id.0)
    }

    pub fn call_method(
        &mut self,
        id: ContainerId,
        method: &str,
        args: &[Value],
    ) -> Result<Value, RuntimeError> {
        let container = self.containers.get_mut(id.0).ok_or_else(|| dangling(&self.journal))?;
        container.call(method, args, &mut self.journal)
    }

    pub fn array_get(&self, id: ContainerId, index: &Value) -> Result<Value, RuntimeError> {
        match self.containers.get(id.0) {
            Some(Container::Array(array)) => Ok(array.get(index)),
            Some(other) => Err(not_indexable(other, &self.journal)),
            None => Err(dangling(&self.journal)),
        }
    }

    pub fn array_set(
        &mut self,
        id: ContainerId,
        index: &Value,
        value: Value,
    ) -> Result<(), RuntimeError> {
        match self.containers.get_mut(id.0) {
            Some(Container::Array(array)) => array.set(index, value, &mut self.journal),
            Some(other) => Err(not_indexable(other, &self.journal)),
            None => Err(dangling(&self.journal)),
        }
    }

    /// `arr.length`: always the declared size
    pub fn array_len(&self, id: ContainerId) -> Option<usize> {
        match self.containers.get(id.0) {
            Some(Container::Array(array)) => Some(array.len()),
            _ => None,
        }
    }

    /// Freeze the journal into the finished log
    pub fn into_log(self) -> CommandLog {
        CommandLog::from(self.journal.commands)
    }

    fn alloc(&mut self, container: Container) -> ContainerId {
        self.containers.push(container);
        ContainerId(self.containers.len() - 1)
    }
}

fn dangling(journal: &Journal) -> RuntimeError {
    RuntimeError::TypeError {
        message: "reference to a container that does not exist".to_string(),
        line: journal.line_number(),
    }
}

fn not_indexable(container: &Container, journal: &Journal) -> RuntimeError {
    RuntimeError::TypeError {
        message: format!("{} '{}' cannot be indexed", container.target(), container.name()),
        line: journal.line_number(),
    }
}
