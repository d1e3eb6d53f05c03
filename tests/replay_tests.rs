// Property tests for tracing and replay

use proptest::prelude::*;
use structrace::runtime::{Command, CommandKind, CommandLog, Scalar, Target};
use structrace::snapshot::{replay, ContainerSnapshot, IdCounter, SnapshotSet, Timeline};

fn arb_command() -> impl Strategy<Value = Command> {
    let name = prop_oneof![Just("a"), Just("b")];
    let value = prop_oneof![
        (-50i64..50).prop_map(Scalar::Int),
        any::<bool>().prop_map(Scalar::Bool),
        "[a-c]{1,2}".prop_map(Scalar::Str),
    ];

    (0u8..8, name, value, 0usize..6, 0usize..5).prop_map(|(kind, name, value, index, size)| {
        let (kind, target) = match kind {
            0 => (CommandKind::Push, Target::Stack),
            1 => (CommandKind::Pop, Target::Stack),
            2 => (CommandKind::Enqueue, Target::Queue),
            3 => (CommandKind::Dequeue, Target::Queue),
            4 => (CommandKind::ArrayDeclare, Target::Array),
            5 => (CommandKind::ArraySet, Target::Array),
            6 => (CommandKind::ListInsert, Target::LinkedList),
            _ => (CommandKind::ListRemove, Target::LinkedList),
        };
        let command = Command::new(kind, target, name, "");
        match kind {
            CommandKind::Push | CommandKind::Enqueue | CommandKind::ListInsert => {
                command.with_value(Some(value))
            }
            CommandKind::ListRemove if index % 2 == 0 => command.with_value(Some(value)),
            CommandKind::ArrayDeclare => command.with_size(size),
            CommandKind::ArraySet => command.with_index(index).with_value(Some(value)),
            _ => command,
        }
    })
}

fn values(snapshot: &SnapshotSet, target: Target, name: &str) -> Vec<Scalar> {
    match snapshot.get(target, name) {
        Some(ContainerSnapshot::Stack { items, .. }) | Some(ContainerSnapshot::Queue { items, .. }) => {
            items.iter().map(|i| i.value.clone()).collect()
        }
        _ => Vec::new(),
    }
}

fn push_source(kind: &str, values: &[i64]) -> String {
    let mut source = format!("{}<int> c;\n", kind);
    for v in values {
        source.push_str(&format!("c.push({});\n", v));
    }
    source.push_str("c.pop();\n");
    source
}

proptest! {
    #[test]
    fn prop_backward_jump_equals_forward_accumulation(
        commands in prop::collection::vec(arb_command(), 0..40),
        target in 0usize..40,
    ) {
        let log = CommandLog::from(commands);
        let mut forward = Timeline::new(log.clone());
        let mut ids = IdCounter::new();
        let mut incremental = SnapshotSet::new();

        for k in 0..log.len() {
            forward.step_forward();
            incremental.apply(&log[k], &mut ids);
            prop_assert_eq!(forward.snapshot(), &replay(&log, Some(k)));
            prop_assert_eq!(&incremental, forward.snapshot());
        }

        // Jump back to an arbitrary cursor, then walk forward again
        if !log.is_empty() {
            let k = target % log.len();
            forward.jump_to(Some(k));
            prop_assert_eq!(forward.snapshot(), &replay(&log, Some(k)));
            while forward.step_forward() {}
            prop_assert_eq!(forward.snapshot(), &incremental);
        }
    }

    #[test]
    fn prop_stack_pop_removes_latest(values_in in prop::collection::vec(-1000i64..1000, 1..12)) {
        let log = structrace::trace(&push_source("stack", &values_in));
        prop_assert_eq!(log.len(), values_in.len() + 1);

        let snapshot = replay(&log, log.last_index());
        let expected: Vec<Scalar> = values_in[..values_in.len() - 1]
            .iter()
            .map(|v| Scalar::Int(*v))
            .collect();
        prop_assert_eq!(values(&snapshot, Target::Stack, "c"), expected);
    }

    #[test]
    fn prop_queue_pop_removes_earliest(values_in in prop::collection::vec(-1000i64..1000, 1..12)) {
        let log = structrace::trace(&push_source("queue", &values_in));
        prop_assert!(log.iter().take(values_in.len()).all(|c| c.kind == CommandKind::Enqueue));
        prop_assert_eq!(log[values_in.len()].kind, CommandKind::Dequeue);

        let snapshot = replay(&log, log.last_index());
        let expected: Vec<Scalar> = values_in[1..].iter().map(|v| Scalar::Int(*v)).collect();
        prop_assert_eq!(values(&snapshot, Target::Queue, "c"), expected);
    }

    #[test]
    fn prop_array_writes_respect_bounds(size in 0usize..6, index in -3i64..9, value in -100i64..100) {
        let seeds: Vec<String> = (0..size).map(|i| (i * 10).to_string()).collect();
        let source = format!(
            "int arr[{}] = {{{}}};\narr[{}] = {};",
            size,
            seeds.join(", "),
            index,
            value
        );
        let log = structrace::trace(&source);
        let in_range = index >= 0 && (index as usize) < size;

        prop_assert_eq!(log.len(), 1 + size + usize::from(in_range));

        let snapshot = replay(&log, log.last_index());
        let Some(ContainerSnapshot::Array { slots, .. }) = snapshot.get(Target::Array, "arr") else {
            return Err(TestCaseError::fail("array missing"));
        };
        prop_assert_eq!(slots.len(), size);
        for slot in slots {
            let expected = if in_range && slot.index == index as usize {
                Scalar::Int(value)
            } else {
                Scalar::Int(slot.index as i64 * 10)
            };
            prop_assert_eq!(&slot.value, &Some(expected));
        }
    }
}
