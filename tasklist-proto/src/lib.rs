//! Shared task model and wire format for the `tasklist` REST contract.

pub mod task;

pub use task::{Task, TaskId, TaskStatus, WireError, WireTask, decode_list, encode_list};
