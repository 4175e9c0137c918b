//! RespKV Server Binary
//!
//! Replays the AOF, then starts the TCP server.

use std::sync::Arc;

use clap::Parser;
use respkv::config::AofSyncStrategy;
use respkv::network::Server;
use respkv::{Config, Engine};
use tracing_subscriber::{fmt, EnvFilter};

/// RespKV Server
#[derive(Parser, Debug)]
#[command(name = "respkv-server")]
#[command(about = "Redis-protocol key-value server with append-only persistence")]
#[command(version)]
struct Args {
    /// Data directory
    #[arg(short, long, default_value = "./respkv_data")]
    data_dir: String,

    /// AOF file name inside the data directory
    #[arg(short, long, default_value = "database.aof")]
    aof_file: String,

    /// Listen address (host:port)
    #[arg(short, long, default_value = "127.0.0.1:6379")]
    listen: String,

    /// AOF fsync policy: always, no, or every:<n>
    #[arg(short, long, default_value = "every:100")]
    fsync: AofSyncStrategy,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,respkv=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(true)
        .init();

    let args = Args::parse();

    tracing::info!("RespKV Server v{}", respkv::VERSION);
    tracing::info!("Data directory: {}", args.data_dir);
    tracing::info!("Listen address: {}", args.listen);

    // Build config from args
    let config = Config::builder()
        .data_dir(&args.data_dir)
        .aof_filename(&args.aof_file)
        .aof_sync_strategy(args.fsync)
        .listen_addr(&args.listen)
        .build();

    // Open engine (replays the AOF before returning)
    let engine = match Engine::open(config.clone()) {
        Ok(e) => Arc::new(e),
        Err(e) => {
            tracing::error!("Failed to open engine: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!(
        "Engine initialized with {} keys from {}",
        engine.store().len(),
        engine.aof_path().display()
    );

    // Start server
    let server = match Server::bind(&config, Arc::clone(&engine)) {
        Ok(server) => server,
        Err(e) => {
            tracing::error!("Failed to bind {}: {}", config.listen_addr, e);
            std::process::exit(1);
        }
    };

    if let Err(e) = server.run() {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }

    if let Err(e) = engine.sync() {
        tracing::error!("Final AOF sync failed: {}", e);
        std::process::exit(1);
    }

    tracing::info!("Server stopped");
}
