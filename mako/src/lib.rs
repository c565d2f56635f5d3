//! Interactive coding agent that drives `git`, `gh` and a read-only shell on
//! behalf of an OpenAI-compatible chat model.
//!
//! The crate keeps a strict separation:
//!
//! - **[`core`]**: Pure, deterministic logic (message history, argument
//!   decoding, CI classification, allow-listing). No I/O.
//! - **[`io`]**: Side-effecting adapters (HTTP, processes, filesystem,
//!   console). Each sits behind a trait so tests can substitute fakes.
//!
//! [`tools`] binds the two into the tool registry; [`turn`] and [`repl`]
//! orchestrate the conversation loop used by the `mako chat` command.

pub mod core;
pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod repl;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
pub mod tools;
pub mod turn;
