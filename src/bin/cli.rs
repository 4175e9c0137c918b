//! RespKV CLI Client
//!
//! Command-line interface for interacting with RespKV.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use respkv::protocol::Value;
use respkv::Client;

/// RespKV CLI
#[derive(Parser, Debug)]
#[command(name = "respkv-cli")]
#[command(about = "CLI for the RespKV key-value server")]
struct Args {
    /// Server address
    #[arg(short, long, default_value = "127.0.0.1:6379")]
    server: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Ping the server, optionally with a message to echo
    Ping {
        message: Option<String>,
    },

    /// Get a value by key
    Get {
        /// The key to get
        key: String,
    },

    /// Set a key-value pair
    Set {
        /// The key to set
        key: String,

        /// The value to set
        value: String,
    },

    /// Delete a key
    Del {
        /// The key to delete
        key: String,
    },

    /// Check whether a key exists
    Exists {
        /// The key to check
        key: String,
    },
}

impl Commands {
    fn into_parts(self) -> Vec<String> {
        match self {
            Commands::Ping { message } => {
                let mut parts = vec!["PING".to_string()];
                parts.extend(message);
                parts
            }
            Commands::Get { key } => vec!["GET".to_string(), key],
            Commands::Set { key, value } => vec!["SET".to_string(), key, value],
            Commands::Del { key } => vec!["DEL".to_string(), key],
            Commands::Exists { key } => vec!["EXISTS".to_string(), key],
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    let mut client = match Client::connect(&args.server) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("Could not connect to {}: {}", args.server, e);
            return ExitCode::FAILURE;
        }
    };

    match client.call(args.command.into_parts()) {
        Ok(reply) => {
            println!("{}", render(&reply));
            if reply.is_error() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            eprintln!("Request failed: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Format a reply the way redis-cli does
fn render(reply: &Value) -> String {
    match reply {
        Value::SimpleString(text) => text.clone(),
        Value::Error(text) => format!("(error) {}", text),
        Value::Integer(n) => format!("(integer) {}", n),
        Value::BulkString(data) => format!("\"{}\"", String::from_utf8_lossy(data)),
        Value::Null => "(nil)".to_string(),
        Value::Array(items) if items.is_empty() => "(empty array)".to_string(),
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(i, item)| format!("{}) {}", i + 1, render(item)))
            .collect::<Vec<_>>()
            .join("\n"),
    }
}
