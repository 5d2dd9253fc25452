//! In-memory task store exposing the tasklist REST contract.
//!
//! Exposes the server for use in tests and embedding. The store keeps
//! tasks in insertion order, assigns ids from 1 upward and answers in the
//! same JSON wire format the client speaks.

pub mod config;
pub mod server;
pub mod store;
