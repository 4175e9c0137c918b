//! Command Module
//!
//! Maps command names to handlers and turns decoded requests into replies.
//!
//! ## Dispatch
//! ```text
//! request (array of bulk strings)
//!    │
//!    ▼
//! resolve ── not an array of bulk strings ──▶ -ERR Protocol error ...
//!    │     ── unknown name ─────────────────▶ -ERR unknown command ...
//!    │     ── wrong argument count ─────────▶ -ERR wrong number of arguments ...
//!    ▼
//! Invocation ──(engine appends to AOF if mutating)──▶ apply(store) ──▶ reply
//! ```
//!
//! Validation never touches the store. Handlers never touch the AOF; logging
//! is the caller's job, gated by [`CommandSpec::is_mutating`].

mod handlers;
mod registry;

use thiserror::Error;

use crate::protocol::Value;

pub use handlers::builtin_commands;
pub use registry::{Arity, CommandRegistry, CommandSpec, Handler, Invocation};

/// Failures answered to the client as an error reply
///
/// The `Display` text is exactly what goes on the wire after `-`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("ERR Protocol error: expected a non-empty array of bulk strings")]
    InvalidRequest,

    #[error("ERR unknown command '{0}'")]
    UnknownCommand(String),

    #[error("ERR wrong number of arguments for '{0}' command")]
    WrongArity(String),

    #[error("KEY not found")]
    KeyNotFound,
}

impl From<CommandError> for Value {
    fn from(err: CommandError) -> Self {
        Value::Error(err.to_string())
    }
}
