//! Store Module
//!
//! The in-memory key/value map every command reads and mutates.
//!
//! ## Responsibilities
//! - Byte-string keys to byte-string values
//! - Single-writer/multi-reader access across all connections
//! - Every operation atomic with respect to every other
//!
//! ## Data Structure Choice
//! One `HashMap` behind one `RwLock`. Coarse-grained: a write blocks all
//! readers for its (short) duration. Keys and values are `Bytes`, so handing
//! a value back to a connection is a refcount bump, not a copy.

mod table;

pub use table::Store;
