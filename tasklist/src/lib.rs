//! `tasklist`: client-side task list sync and validation engine.
//!
//! The engine keeps a canonical snapshot of the remote task collection
//! ([`controller::TaskListController`]), lets the user edit tasks through
//! per-task [`session::EditSession`]s, validates drafts locally
//! ([`validation`]) and persists them through a [`transport::TaskTransport`].
//! After every mutation the full collection is fetched again.

pub mod board;
pub mod config;
pub mod controller;
pub mod draft;
pub mod session;
pub mod transport;
pub mod validation;
