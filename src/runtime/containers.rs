//! Instrumented container objects
//!
//! Each object performs the real container operation on its own storage and,
//! for mutating calls, appends exactly one [`Command`] to the shared
//! [`Journal`] *after* the mutation has taken effect. Read-only calls
//! (`top`, `front`, `size`, `empty`, ...) never touch the journal.

use super::command::{Command, CommandKind, Scalar, Target};
use super::value::Value;
use super::Journal;
use crate::interpreter::errors::RuntimeError;
use rustc_hash::FxHashMap;
use std::collections::VecDeque;

/// A container owned by the runtime arena
#[derive(Debug, Clone)]
pub enum Container {
    Stack(StackObject),
    Queue(QueueObject),
    List(ListObject),
    Array(ArrayObject),
}

impl Container {
    pub fn name(&self) -> &str {
        match self {
            Container::Stack(s) => &s.name,
            Container::Queue(q) => &q.name,
            Container::List(l) => &l.name,
            Container::Array(a) => &a.name,
        }
    }

    pub fn target(&self) -> Target {
        match self {
            Container::Stack(_) => Target::Stack,
            Container::Queue(_) => Target::Queue,
            Container::List(_) => Target::LinkedList,
            Container::Array(_) => Target::Array,
        }
    }

    /// Dispatch a method call by name
    pub(crate) fn call(
        &mut self,
        method: &str,
        args: &[Value],
        journal: &mut Journal,
    ) -> Result<Value, RuntimeError> {
        match self {
            Container::Stack(s) => s.call(method, args, journal),
            Container::Queue(q) => q.call(method, args, journal),
            Container::List(l) => l.call(method, args, journal),
            Container::Array(_) => Err(RuntimeError::UnsupportedMethod {
                target: Target::Array,
                method: method.to_string(),
                line: journal.line_number(),
            }),
        }
    }
}

/// LIFO stack: push appends to the end, pop removes from the end
#[derive(Debug, Clone)]
pub struct StackObject {
    pub name: String,
    pub items: Vec<Scalar>,
}

impl StackObject {
    pub fn new(name: &str) -> Self {
        StackObject {
            name: name.to_string(),
            items: Vec::new(),
        }
    }

    fn call(
        &mut self,
        method: &str,
        args: &[Value],
        journal: &mut Journal,
    ) -> Result<Value, RuntimeError> {
        match method {
            "push" | "push_back" => {
                let value = scalar_arg(method, args, journal)?;
                self.items.push(value.clone());
                journal.record(
                    Command::new(CommandKind::Push, Target::Stack, &self.name, journal.line_text())
                        .with_value(Some(value)),
                );
                Ok(Value::Undefined)
            }
            "pop" | "pop_back" => {
                expect_arity(method, args, 0, journal)?;
                let removed = self.items.pop();
                journal.record_removal(
                    removed.is_some(),
                    Command::new(CommandKind::Pop, Target::Stack, &self.name, journal.line_text()),
                );
                Ok(Value::Undefined)
            }
            "top" => {
                expect_arity(method, args, 0, journal)?;
                Ok(self.items.last().cloned().map(Value::from).unwrap_or_default())
            }
            "size" => {
                expect_arity(method, args, 0, journal)?;
                Ok(Value::Int(self.items.len() as i64))
            }
            "empty" => {
                expect_arity(method, args, 0, journal)?;
                Ok(Value::Bool(self.items.is_empty()))
            }
            _ => Err(unsupported(Target::Stack, method, journal)),
        }
    }
}

/// FIFO queue: push enqueues at the back, pop dequeues from the front
#[derive(Debug, Clone)]
pub struct QueueObject {
    pub name: String,
    pub items: VecDeque<Scalar>,
}

impl QueueObject {
    pub fn new(name: &str) -> Self {
        QueueObject {
            name: name.to_string(),
            items: VecDeque::new(),
        }
    }

    fn call(
        &mut self,
        method: &str,
        args: &[Value],
        journal: &mut Journal,
    ) -> Result<Value, RuntimeError> {
        match method {
            "push" => {
                let value = scalar_arg(method, args, journal)?;
                self.items.push_back(value.clone());
                journal.record(
                    Command::new(CommandKind::Enqueue, Target::Queue, &self.name, journal.line_text())
                        .with_value(Some(value)),
                );
                Ok(Value::Undefined)
            }
            "pop" => {
                expect_arity(method, args, 0, journal)?;
                let removed = self.items.pop_front();
                journal.record_removal(
                    removed.is_some(),
                    Command::new(CommandKind::Dequeue, Target::Queue, &self.name, journal.line_text()),
                );
                Ok(Value::Undefined)
            }
            "front" => {
                expect_arity(method, args, 0, journal)?;
                Ok(self.items.front().cloned().map(Value::from).unwrap_or_default())
            }
            "size" => {
                expect_arity(method, args, 0, journal)?;
                Ok(Value::Int(self.items.len() as i64))
            }
            "empty" => {
                expect_arity(method, args, 0, journal)?;
                Ok(Value::Bool(self.items.is_empty()))
            }
            _ => Err(unsupported(Target::Queue, method, journal)),
        }
    }
}

/// Singly linked list, stored head-to-tail
#[derive(Debug, Clone)]
pub struct ListObject {
    pub name: String,
    pub items: VecDeque<Scalar>,
}

impl ListObject {
    pub fn new(name: &str) -> Self {
        ListObject {
            name: name.to_string(),
            items: VecDeque::new(),
        }
    }

    fn insert_command(&self, value: Scalar, journal: &Journal) -> Command {
        Command::new(CommandKind::ListInsert, Target::LinkedList, &self.name, journal.line_text())
            .with_value(Some(value))
    }

    fn remove_command(&self, journal: &Journal) -> Command {
        Command::new(CommandKind::ListRemove, Target::LinkedList, &self.name, journal.line_text())
    }

    fn call(
        &mut self,
        method: &str,
        args: &[Value],
        journal: &mut Journal,
    ) -> Result<Value, RuntimeError> {
        match method {
            "push_back" | "insert" => {
                let value = scalar_arg(method, args, journal)?;
                self.items.push_back(value.clone());
                let cmd = self.insert_command(value, journal);
                journal.record(cmd);
                Ok(Value::Undefined)
            }
            // Recorded as a plain insert: replay places every insert at the tail.
            "push_front" => {
                let value = scalar_arg(method, args, journal)?;
                self.items.push_front(value.clone());
                let cmd = self.insert_command(value, journal);
                journal.record(cmd);
                Ok(Value::Undefined)
            }
            "pop_back" => {
                expect_arity(method, args, 0, journal)?;
                let removed = self.items.pop_back();
                let cmd = self.remove_command(journal);
                journal.record_removal(removed.is_some(), cmd);
                Ok(Value::Undefined)
            }
            "pop_front" => {
                expect_arity(method, args, 0, journal)?;
                let removed = self.items.pop_front();
                let cmd = self.remove_command(journal);
                journal.record_removal(removed.is_some(), cmd);
                Ok(Value::Undefined)
            }
            // Without an argument `remove` drops the tail node
            "remove" if args.is_empty() => {
                let removed = self.items.pop_back();
                let cmd = self.remove_command(journal);
                journal.record_removal(removed.is_some(), cmd);
                Ok(Value::Undefined)
            }
            "remove" => {
                let value = scalar_arg(method, args, journal)?;
                let was_empty = self.items.is_empty();
                if let Some(position) = self.items.iter().position(|item| item.matches(&value)) {
                    self.items.remove(position);
                }
                let cmd = self.remove_command(journal).with_value(Some(value));
                journal.record_removal(!was_empty, cmd);
                Ok(Value::Undefined)
            }
            "front" => {
                expect_arity(method, args, 0, journal)?;
                Ok(self.items.front().cloned().map(Value::from).unwrap_or_default())
            }
            "back" => {
                expect_arity(method, args, 0, journal)?;
                Ok(self.items.back().cloned().map(Value::from).unwrap_or_default())
            }
            "size" => {
                expect_arity(method, args, 0, journal)?;
                Ok(Value::Int(self.items.len() as i64))
            }
            "empty" => {
                expect_arity(method, args, 0, journal)?;
                Ok(Value::Bool(self.items.is_empty()))
            }
            _ => Err(unsupported(Target::LinkedList, method, journal)),
        }
    }
}

/// Fixed-size array. Writes inside `[0, size)` are observed; anything else is
/// kept in `overflow` so the program keeps running, but is never recorded.
#[derive(Debug, Clone)]
pub struct ArrayObject {
    pub name: String,
    pub slots: Vec<Option<Scalar>>,
    overflow: FxHashMap<String, Value>,
}

impl ArrayObject {
    pub fn new(name: &str, size: usize) -> Self {
        ArrayObject {
            name: name.to_string(),
            slots: vec![None; size],
            overflow: FxHashMap::default(),
        }
    }

    /// Declared size; never changes
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn get(&self, index: &Value) -> Value {
        match index.as_index() {
            Some(i) if i < self.slots.len() => {
                self.slots[i].clone().map(Value::from).unwrap_or(Value::Null)
            }
            _ => self
                .overflow
                .get(&index.to_string())
                .cloned()
                .unwrap_or_default(),
        }
    }

    pub(crate) fn set(
        &mut self,
        index: &Value,
        value: Value,
        journal: &mut Journal,
    ) -> Result<(), RuntimeError> {
        let slot = match index.as_index() {
            Some(i) if i < self.slots.len() => i,
            _ => {
                self.overflow.insert(index.to_string(), value);
                return Ok(());
            }
        };

        let scalar = match &value {
            Value::Null => None,
            other => Some(other.to_scalar().ok_or_else(|| RuntimeError::TypeError {
                message: format!("cannot store {} in array '{}'", element_kind(other), self.name),
                line: journal.line_number(),
            })?),
        };

        self.slots[slot] = scalar.clone();
        journal.record(
            Command::new(CommandKind::ArraySet, Target::Array, &self.name, journal.line_text())
                .with_index(slot)
                .with_value(scalar),
        );
        Ok(())
    }
}

fn expect_arity(
    method: &str,
    args: &[Value],
    expected: usize,
    journal: &Journal,
) -> Result<(), RuntimeError> {
    if args.len() == expected {
        Ok(())
    } else {
        Err(RuntimeError::ArgumentCountMismatch {
            function: method.to_string(),
            expected,
            got: args.len(),
            line: journal.line_number(),
        })
    }
}

fn scalar_arg(method: &str, args: &[Value], journal: &Journal) -> Result<Scalar, RuntimeError> {
    expect_arity(method, args, 1, journal)?;
    args[0].to_scalar().ok_or_else(|| RuntimeError::TypeError {
        message: format!(
            "{}() expects a number, string or boolean, got {}",
            method,
            element_kind(&args[0])
        ),
        line: journal.line_number(),
    })
}

fn element_kind(value: &Value) -> String {
    match value {
        Value::Float(f) if !f.is_finite() => format!("non-finite float {}", f),
        other => other.type_name().to_string(),
    }
}

fn unsupported(target: Target, method: &str, journal: &Journal) -> RuntimeError {
    RuntimeError::UnsupportedMethod {
        target,
        method: method.to_string(),
        line: journal.line_number(),
    }
}
