//! Append-Only File (AOF) Module
//!
//! Provides durability by logging every mutating request before it is
//! applied, and rebuilds the store at startup by replaying the log through
//! the same dispatch path live traffic uses.
//!
//! ## Responsibilities
//! - Append the request exactly as the codec encodes it
//! - Serialised appends (one record never interleaves with another)
//! - Configurable fsync policy
//! - Sequential replay, tolerant of a torn final record
//!
//! ## File Format
//! No framing of its own: each record is one RESP array, self-delimiting
//! through its length prefixes.
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ *3\r\n$3\r\nSET\r\n$1\r\na\r\n$1\r\n1\r\n   │  record 1
//! ├─────────────────────────────────────────────┤
//! │ *2\r\n$3\r\nDEL\r\n$1\r\na\r\n              │  record 2
//! ├─────────────────────────────────────────────┤
//! │ *3\r\n$3\r\nSET\r\n$1\r\nb\r\n$1\r          │  torn tail (dropped on replay)
//! └─────────────────────────────────────────────┘
//! ```

mod writer;
mod reader;
mod replay;

pub use writer::AofWriter;
pub use reader::{AofIterator, AofReader};
pub use replay::{AofReplay, ReplayResult};
