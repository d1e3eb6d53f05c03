//! Command records and the command log
//!
//! A [`Command`] is one observed container mutation. The ordered
//! [`CommandLog`] is the whole output of a trace and the whole input of
//! replay, so its serialized form keeps the field names the visualizer
//! front end reads: `type`, `target`, `targetName`, `value`, `index`, `size`
//! and `raw`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Index;

/// The closed set of recorded mutations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommandKind {
    Push,
    Pop,
    Enqueue,
    Dequeue,
    ArrayDeclare,
    ArraySet,
    ListInsert,
    ListRemove,
}

impl CommandKind {
    pub fn as_str(self) -> &'static str {
        match self {
            CommandKind::Push => "PUSH",
            CommandKind::Pop => "POP",
            CommandKind::Enqueue => "ENQUEUE",
            CommandKind::Dequeue => "DEQUEUE",
            CommandKind::ArrayDeclare => "ARRAY_DECLARE",
            CommandKind::ArraySet => "ARRAY_SET",
            CommandKind::ListInsert => "LIST_INSERT",
            CommandKind::ListRemove => "LIST_REMOVE",
        }
    }
}

/// Container kind a command applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Target {
    Stack,
    Queue,
    Array,
    #[serde(rename = "linkedlist")]
    LinkedList,
}

impl Target {
    pub fn as_str(self) -> &'static str {
        match self {
            Target::Stack => "stack",
            Target::Queue => "queue",
            Target::Array => "array",
            Target::LinkedList => "linkedlist",
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scalar payload carried by a command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
}

impl Scalar {
    /// Value equality as used by `remove(value)`: `1` matches `1.0`
    pub fn matches(&self, other: &Scalar) -> bool {
        match (self, other) {
            (Scalar::Int(a), Scalar::Int(b)) => a == b,
            (Scalar::Int(a), Scalar::Float(b)) | (Scalar::Float(b), Scalar::Int(a)) => {
                *a as f64 == *b
            }
            (Scalar::Float(a), Scalar::Float(b)) => a == b,
            (Scalar::Str(a), Scalar::Str(b)) => a == b,
            (Scalar::Bool(a), Scalar::Bool(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Int(n) => write!(f, "{}", n),
            Scalar::Float(x) => write!(f, "{}", x),
            Scalar::Str(s) => write!(f, "{:?}", s),
            Scalar::Bool(b) => write!(f, "{}", b),
        }
    }
}

/// One recorded mutation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Command {
    #[serde(rename = "type")]
    pub kind: CommandKind,
    pub target: Target,
    pub target_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<usize>,
    #[serde(rename = "raw")]
    pub source_text: String,
}

impl Command {
    pub fn new(
        kind: CommandKind,
        target: Target,
        target_name: impl Into<String>,
        source_text: impl Into<String>,
    ) -> Self {
        Command {
            kind,
            target,
            target_name: target_name.into(),
            value: None,
            index: None,
            size: None,
            source_text: source_text.into(),
        }
    }

    pub fn with_value(mut self, value: Option<Scalar>) -> Self {
        self.value = value;
        self
    }

    pub fn with_index(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }

    pub fn with_size(mut self, size: usize) -> Self {
        self.size = Some(size);
        self
    }
}

/// Compact rendering used by the log pane, e.g. `PUSH(stack,s,10)` or
/// `ARRAY_DECLARE(array,arr,size=3)`.
impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({},{}", self.kind.as_str(), self.target, self.target_name)?;
        if let Some(index) = self.index {
            write!(f, ",{}", index)?;
        }
        if let Some(value) = &self.value {
            write!(f, ",{}", value)?;
        }
        if let Some(size) = self.size {
            write!(f, ",size={}", size)?;
        }
        write!(f, ")")
    }
}

/// The ordered, immutable trace produced by one source submission
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommandLog {
    commands: Vec<Command>,
}

impl CommandLog {
    pub fn new() -> Self {
        CommandLog::default()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Command> {
        self.commands.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Command> {
        self.commands.iter()
    }

    pub fn as_slice(&self) -> &[Command] {
        &self.commands
    }

    /// Index of the last command, `None` for an empty log
    pub fn last_index(&self) -> Option<usize> {
        self.commands.len().checked_sub(1)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl From<Vec<Command>> for CommandLog {
    fn from(commands: Vec<Command>) -> Self {
        CommandLog { commands }
    }
}

impl Index<usize> for CommandLog {
    type Output = Command;

    fn index(&self, index: usize) -> &Command {
        &self.commands[index]
    }
}

impl<'a> IntoIterator for &'a CommandLog {
    type Item = &'a Command;
    type IntoIter = std::slice::Iter<'a, Command>;

    fn into_iter(self) -> Self::IntoIter {
        self.commands.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_matches_log_notation() {
        let push = Command::new(CommandKind::Push, Target::Stack, "s", "s.push(10);")
            .with_value(Some(Scalar::Int(10)));
        assert_eq!(push.to_string(), "PUSH(stack,s,10)");

        let declare = Command::new(CommandKind::ArrayDeclare, Target::Array, "arr", "")
            .with_size(3);
        assert_eq!(declare.to_string(), "ARRAY_DECLARE(array,arr,size=3)");

        let set = Command::new(CommandKind::ArraySet, Target::Array, "arr", "")
            .with_index(1)
            .with_value(Some(Scalar::Int(9)));
        assert_eq!(set.to_string(), "ARRAY_SET(array,arr,1,9)");
    }

    #[test]
    fn test_wire_field_names() {
        let cmd = Command::new(CommandKind::ListInsert, Target::LinkedList, "ll", "ll.push_back(1);")
            .with_value(Some(Scalar::Int(1)));
        let json = serde_json::to_value(&cmd).unwrap();

        assert_eq!(json["type"], "LIST_INSERT");
        assert_eq!(json["target"], "linkedlist");
        assert_eq!(json["targetName"], "ll");
        assert_eq!(json["value"], 1);
        assert_eq!(json["raw"], "ll.push_back(1);");
        assert!(json.get("index").is_none());
        assert!(json.get("size").is_none());
    }

    #[test]
    fn test_log_json_round_trip() {
        let log = CommandLog::from(vec![
            Command::new(CommandKind::Enqueue, Target::Queue, "q", "q.push(\"a\");")
                .with_value(Some(Scalar::Str("a".to_string()))),
            Command::new(CommandKind::ArraySet, Target::Array, "a", "a[0] = 1.5;")
                .with_index(0)
                .with_value(Some(Scalar::Float(1.5))),
            Command::new(CommandKind::Dequeue, Target::Queue, "q", "q.pop();"),
        ]);

        let json = log.to_json().unwrap();
        assert_eq!(CommandLog::from_json(&json).unwrap(), log);
    }

    #[test]
    fn test_scalar_matches() {
        assert!(Scalar::Int(2).matches(&Scalar::Float(2.0)));
        assert!(!Scalar::Int(2).matches(&Scalar::Str("2".to_string())));
        assert!(!Scalar::Bool(true).matches(&Scalar::Int(1)));
    }
}
