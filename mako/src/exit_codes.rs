//! Stable exit codes for mako CLI commands.

/// Command succeeded, or the chat session ended via `quit` or end of input.
pub const OK: i32 = 0;
/// Command failed due to invalid config, unreadable goal memory or other errors.
pub const INVALID: i32 = 1;
/// The session was interrupted with Ctrl-C (goal memory is saved first).
pub const INTERRUPTED: i32 = 130;
