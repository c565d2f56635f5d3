//! Deterministic, pure logic shared by the agent.
//!
//! Core modules must be free of I/O side effects. They operate on in-memory
//! data structures and return deterministic outputs suitable for tests.

pub mod allowlist;
pub mod budget;
pub mod catalog;
pub mod ci;
pub mod conversation;
pub mod pr;
pub mod reliability;
pub mod text;
pub mod tool_args;
pub mod types;
