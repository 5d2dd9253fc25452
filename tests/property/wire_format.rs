//! Property-based tests for the task wire format.
//!
//! Uses proptest to verify:
//! 1. The status ordinal mapping is a bijection over the fixed ordering.
//! 2. Any canonical task survives the wire form and back unchanged.
//! 3. Arbitrary bytes never panic `decode_list` (errors are returned).
//! 4. Out-of-range ordinals are always rejected.

use proptest::prelude::*;
use tasklist_proto::{Task, TaskId, TaskStatus, WireError, WireTask, decode_list, encode_list};

/// Strategy for generating arbitrary `TaskStatus` values.
fn arb_status() -> impl Strategy<Value = TaskStatus> {
    prop_oneof![
        Just(TaskStatus::NotStarted),
        Just(TaskStatus::InProgress),
        Just(TaskStatus::Completed),
    ]
}

/// Strategy for generating arbitrary canonical tasks.
fn arb_task() -> impl Strategy<Value = Task> {
    (any::<i64>(), "[^\x00]{1,64}", arb_status(), any::<i64>()).prop_map(
        |(id, name, status, priority)| Task {
            id: TaskId::new(id),
            name,
            status,
            priority,
        },
    )
}

proptest! {
    #[test]
    fn ordinal_mapping_is_inverse(status in arb_status()) {
        prop_assert_eq!(TaskStatus::from_ordinal(status.ordinal()), Some(status));
    }

    #[test]
    fn unknown_ordinals_are_rejected(ordinal in 3u8..) {
        prop_assert!(TaskStatus::from_ordinal(ordinal).is_none());
        let wire = WireTask { id: 1, name: "x".to_string(), priority: 0, status: ordinal };
        prop_assert!(matches!(Task::try_from(wire), Err(WireError::UnknownStatus(o)) if o == ordinal));
    }

    #[test]
    fn task_survives_wire_form(task in arb_task()) {
        let wire = WireTask::from(&task);
        prop_assert_eq!(wire.status, task.status.ordinal());
        let back = Task::try_from(wire).map_err(|e| TestCaseError::fail(e.to_string()))?;
        prop_assert_eq!(back, task);
    }

    #[test]
    fn list_order_is_preserved(tasks in prop::collection::vec(arb_task(), 0..16)) {
        let bytes = encode_list(&tasks).map_err(|e| TestCaseError::fail(e.to_string()))?;
        let decoded = decode_list(&bytes).map_err(|e| TestCaseError::fail(e.to_string()))?;
        prop_assert_eq!(decoded, tasks);
    }

    #[test]
    fn random_bytes_never_panic(bytes in prop::collection::vec(any::<u8>(), 0..256)) {
        let _ = decode_list(&bytes);
    }
}
