//! # RespKV
//!
//! A key-value server speaking the Redis wire protocol (RESP) with:
//! - Append-only file (AOF) persistence of every mutating command
//! - Crash recovery that tolerates a torn final record
//! - Single-writer/multi-reader store shared by all connections
//! - One thread per client connection
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      TCP Server                              │
//! │              (one thread per connection)                     │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ RESP bytes
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                   Protocol Codec                             │
//! │               (decode / encode Value)                        │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ Value
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │              Engine + Command Registry                       │
//! │        (resolve → log if mutating → apply)                   │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │     AOF     │          │    Store    │
//!   │  (Append)   │          │  (RwLock)   │
//!   └──────┬──────┘          └──────▲──────┘
//!          │      replay at startup │
//!          └────────────────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod protocol;
pub mod store;
pub mod command;
pub mod aof;
pub mod engine;
pub mod network;
pub mod client;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{KvError, Result};
pub use config::Config;
pub use engine::Engine;
pub use client::Client;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of RespKV
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
