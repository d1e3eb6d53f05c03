// Container snapshots reconstructed from a command log

pub mod autoplay;
pub mod timeline;

pub use autoplay::{AutoPlay, PlaybackSpeed};
pub use timeline::{Timeline, TimelineState};

use crate::runtime::{Command, CommandKind, CommandLog, Scalar, Target};
use std::fmt;

/// Synthetic identity of one rendered item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ItemId(pub u64);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "item-{}", self.0)
    }
}

/// Monotonic identity source, threaded explicitly through replay.
/// Reset to zero whenever replay restarts from genesis.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdCounter {
    issued: u64,
}

impl IdCounter {
    pub fn new() -> Self {
        IdCounter::default()
    }

    /// Next identity; the first one after a reset is `item-1`
    pub fn next_id(&mut self) -> ItemId {
        self.issued += 1;
        ItemId(self.issued)
    }

    pub fn reset(&mut self) {
        self.issued = 0;
    }

    pub fn issued(&self) -> u64 {
        self.issued
    }
}

/// A stack, queue or list element
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    pub id: ItemId,
    pub value: Scalar,
}

/// One array slot; `value` stays `None` until the slot is written
#[derive(Debug, Clone, PartialEq)]
pub struct ArraySlot {
    pub id: ItemId,
    pub value: Option<Scalar>,
    pub index: usize,
}

/// State of one named container at some cursor
#[derive(Debug, Clone, PartialEq)]
pub enum ContainerSnapshot {
    /// Bottom to top
    Stack { name: String, items: Vec<Item> },
    /// Front to back
    Queue { name: String, items: Vec<Item> },
    Array { name: String, slots: Vec<ArraySlot> },
    /// Head to tail
    LinkedList { name: String, nodes: Vec<Item> },
}

impl ContainerSnapshot {
    fn empty(target: Target, name: &str) -> Self {
        let name = name.to_string();
        match target {
            Target::Stack => ContainerSnapshot::Stack {
                name,
                items: Vec::new(),
            },
            Target::Queue => ContainerSnapshot::Queue {
                name,
                items: Vec::new(),
            },
            Target::Array => ContainerSnapshot::Array {
                name,
                slots: Vec::new(),
            },
            Target::LinkedList => ContainerSnapshot::LinkedList {
                name,
                nodes: Vec::new(),
            },
        }
    }

    pub fn name(&self) -> &str {
        match self {
            ContainerSnapshot::Stack { name, .. }
            | ContainerSnapshot::Queue { name, .. }
            | ContainerSnapshot::Array { name, .. }
            | ContainerSnapshot::LinkedList { name, .. } => name,
        }
    }

    pub fn target(&self) -> Target {
        match self {
            ContainerSnapshot::Stack { .. } => Target::Stack,
            ContainerSnapshot::Queue { .. } => Target::Queue,
            ContainerSnapshot::Array { .. } => Target::Array,
            ContainerSnapshot::LinkedList { .. } => Target::LinkedList,
        }
    }

    /// Element count (declared size for arrays)
    pub fn len(&self) -> usize {
        match self {
            ContainerSnapshot::Stack { items, .. } | ContainerSnapshot::Queue { items, .. } => {
                items.len()
            }
            ContainerSnapshot::Array { slots, .. } => slots.len(),
            ContainerSnapshot::LinkedList { nodes, .. } => nodes.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Apply one command aimed at this container. Commands whose kind does
    /// not fit the container, or that lack a required payload, change nothing.
    fn apply(&mut self, command: &Command, ids: &mut IdCounter) {
        match (command.kind, self) {
            (CommandKind::Push, ContainerSnapshot::Stack { items, .. })
            | (CommandKind::Enqueue, ContainerSnapshot::Queue { items, .. })
            | (CommandKind::ListInsert, ContainerSnapshot::LinkedList { nodes: items, .. }) => {
                if let Some(value) = &command.value {
                    items.push(Item {
                        id: ids.next_id(),
                        value: value.clone(),
                    });
                }
            }

            (CommandKind::Pop, ContainerSnapshot::Stack { items, .. }) => {
                items.pop();
            }

            (CommandKind::Dequeue, ContainerSnapshot::Queue { items, .. }) => {
                if !items.is_empty() {
                    items.remove(0);
                }
            }

            (CommandKind::ArrayDeclare, ContainerSnapshot::Array { slots, .. }) => {
                let size = command.size.unwrap_or(0);
                *slots = (0..size)
                    .map(|index| ArraySlot {
                        id: ids.next_id(),
                        value: None,
                        index,
                    })
                    .collect();
            }

            (CommandKind::ArraySet, ContainerSnapshot::Array { slots, .. }) => {
                if let Some(slot) = command.index.and_then(|i| slots.get_mut(i)) {
                    slot.value = command.value.clone();
                }
            }

            (CommandKind::ListRemove, ContainerSnapshot::LinkedList { nodes, .. }) => {
                match &command.value {
                    Some(value) => {
                        if let Some(position) = nodes.iter().position(|n| n.value.matches(value)) {
                            nodes.remove(position);
                        }
                    }
                    None => {
                        nodes.pop();
                    }
                }
            }

            _ => {}
        }
    }
}

/// Every container referenced so far, in order of first reference
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SnapshotSet {
    containers: Vec<ContainerSnapshot>,
}

impl SnapshotSet {
    pub fn new() -> Self {
        SnapshotSet::default()
    }

    /// Apply one command, creating its container on first reference
    pub fn apply(&mut self, command: &Command, ids: &mut IdCounter) {
        let position = match self.position(command.target, &command.target_name) {
            Some(position) => position,
            None => {
                self.containers
                    .push(ContainerSnapshot::empty(command.target, &command.target_name));
                self.containers.len() - 1
            }
        };
        self.containers[position].apply(command, ids);
    }

    pub fn get(&self, target: Target, name: &str) -> Option<&ContainerSnapshot> {
        self.position(target, name).map(|i| &self.containers[i])
    }

    pub fn containers(&self) -> &[ContainerSnapshot] {
        &self.containers
    }

    pub fn len(&self) -> usize {
        self.containers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.containers.is_empty()
    }

    fn position(&self, target: Target, name: &str) -> Option<usize> {
        self.containers
            .iter()
            .position(|c| c.target() == target && c.name() == name)
    }
}

/// Rebuild the snapshot at `cursor` from genesis (`None` is genesis itself)
pub fn replay(log: &CommandLog, cursor: Option<usize>) -> SnapshotSet {
    replay_from_genesis(log, cursor).0
}

/// Full re-derivation with a fresh identity counter; also returns the counter
/// so forward stepping can continue from the rebuilt state
pub(crate) fn replay_from_genesis(log: &CommandLog, cursor: Option<usize>) -> (SnapshotSet, IdCounter) {
    let mut ids = IdCounter::new();
    let mut snapshot = SnapshotSet::new();

    if let Some(cursor) = cursor {
        for command in log.iter().take(cursor + 1) {
            snapshot.apply(command, &mut ids);
        }
    }
    (snapshot, ids)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn push(name: &str, value: i64) -> Command {
        Command::new(CommandKind::Push, Target::Stack, name, "").with_value(Some(Scalar::Int(value)))
    }

    fn values(items: &[Item]) -> Vec<Scalar> {
        items.iter().map(|i| i.value.clone()).collect()
    }

    #[test]
    fn test_stack_lifo_and_empty_pop() {
        let log = CommandLog::from(vec![
            push("s", 10),
            push("s", 20),
            Command::new(CommandKind::Pop, Target::Stack, "s", ""),
            Command::new(CommandKind::Pop, Target::Stack, "s", ""),
            Command::new(CommandKind::Pop, Target::Stack, "s", ""),
        ]);

        let at_two = replay(&log, Some(2));
        let Some(ContainerSnapshot::Stack { items, .. }) = at_two.get(Target::Stack, "s") else {
            panic!("stack missing");
        };
        assert_eq!(values(items), vec![Scalar::Int(10)]);
        assert_eq!(items[0].id.to_string(), "item-1");

        assert!(replay(&log, Some(4)).get(Target::Stack, "s").unwrap().is_empty());
    }

    #[test]
    fn test_queue_fifo() {
        let enqueue = |v| {
            Command::new(CommandKind::Enqueue, Target::Queue, "q", "").with_value(Some(Scalar::Int(v)))
        };
        let log = CommandLog::from(vec![
            enqueue(1),
            enqueue(2),
            enqueue(3),
            Command::new(CommandKind::Dequeue, Target::Queue, "q", ""),
        ]);

        let snapshot = replay(&log, log.last_index());
        let Some(ContainerSnapshot::Queue { items, .. }) = snapshot.get(Target::Queue, "q") else {
            panic!("queue missing");
        };
        assert_eq!(values(items), vec![Scalar::Int(2), Scalar::Int(3)]);
        assert_eq!(items[0].id, ItemId(2));
    }

    #[test]
    fn test_array_declare_and_bounds() {
        let set = |i, v| {
            Command::new(CommandKind::ArraySet, Target::Array, "arr", "")
                .with_index(i)
                .with_value(Some(Scalar::Int(v)))
        };
        let log = CommandLog::from(vec![
            Command::new(CommandKind::ArrayDeclare, Target::Array, "arr", "").with_size(3),
            set(0, 1),
            set(1, 2),
            set(2, 3),
            set(1, 9),
            set(7, 4),
        ]);

        let snapshot = replay(&log, log.last_index());
        let Some(ContainerSnapshot::Array { slots, .. }) = snapshot.get(Target::Array, "arr") else {
            panic!("array missing");
        };
        let values: Vec<_> = slots.iter().map(|s| s.value.clone()).collect();
        assert_eq!(
            values,
            vec![Some(Scalar::Int(1)), Some(Scalar::Int(9)), Some(Scalar::Int(3))]
        );
        assert_eq!(slots[2].index, 2);
    }

    #[test]
    fn test_list_remove_by_value_and_tail() {
        let insert = |v| {
            Command::new(CommandKind::ListInsert, Target::LinkedList, "ll", "")
                .with_value(Some(Scalar::Int(v)))
        };
        let remove = |v: Option<i64>| {
            Command::new(CommandKind::ListRemove, Target::LinkedList, "ll", "")
                .with_value(v.map(Scalar::Int))
        };
        let log = CommandLog::from(vec![
            insert(1),
            insert(2),
            insert(3),
            insert(2),
            remove(Some(2)),
            remove(Some(42)),
            remove(None),
        ]);

        let snapshot = replay(&log, log.last_index());
        let Some(ContainerSnapshot::LinkedList { nodes, .. }) = snapshot.get(Target::LinkedList, "ll") else {
            panic!("list missing");
        };
        assert_eq!(values(nodes), vec![Scalar::Int(1), Scalar::Int(3)]);
    }

    #[test]
    fn test_lazy_creation_does_not_duplicate() {
        let log = CommandLog::from(vec![
            Command::new(CommandKind::ArraySet, Target::Array, "a", "")
                .with_index(0)
                .with_value(Some(Scalar::Int(1))),
            Command::new(CommandKind::ArrayDeclare, Target::Array, "a", "").with_size(2),
            push("a", 5),
        ]);

        let snapshot = replay(&log, log.last_index());
        // Same name, different kind: two containers
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.get(Target::Array, "a").map(|c| c.len()), Some(2));
        assert_eq!(snapshot.get(Target::Stack, "a").map(|c| c.len()), Some(1));
    }

    #[test]
    fn test_mismatched_commands_are_ignored() {
        let log = CommandLog::from(vec![
            Command::new(CommandKind::ArraySet, Target::Stack, "s", "")
                .with_index(0)
                .with_value(Some(Scalar::Int(1))),
            Command::new(CommandKind::Dequeue, Target::Stack, "s", ""),
        ]);

        let snapshot = replay(&log, log.last_index());
        assert_eq!(snapshot.get(Target::Stack, "s").map(|c| c.len()), Some(0));
    }

    #[test]
    fn test_genesis_is_empty() {
        let log = CommandLog::from(vec![push("s", 1)]);
        assert!(replay(&log, None).is_empty());
    }
}
