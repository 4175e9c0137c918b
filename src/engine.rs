//! Engine Module
//!
//! The execution engine that coordinates all components.
//!
//! ## Responsibilities
//! - Replay the AOF into the store before anything else can see it
//! - Resolve requests against the command registry
//! - Log mutating requests before applying them
//! - Apply commands to the store and produce replies

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::aof::{AofReplay, AofWriter, ReplayResult};
use crate::command::CommandRegistry;
use crate::config::Config;
use crate::error::Result;
use crate::protocol::Value;
use crate::store::Store;

/// The execution engine
///
/// ## Concurrency Model: Single-Writer / Multiple-Reader (SWMR)
///
/// - **Mutating commands** (SET/DEL): serialized by the `aof` mutex
///   - Must acquire: aof mutex → append record → store (write lock)
///   - The mutex is held across append and apply, so AOF order is the
///     order in which mutations hit the store
///
/// - **Read commands** (GET/EXISTS/PING): no aof mutex
///   - Store read lock only; many readers run concurrently
///
/// ## Startup
/// `open` replays the AOF before returning, so an `Engine` value only exists
/// once the store reflects every durable write.
pub struct Engine {
    /// Engine configuration
    config: Config,

    /// Resolved AOF location
    aof_path: PathBuf,

    /// The key/value data (internal RwLock)
    store: Arc<Store>,

    /// Command table shared by live traffic and replay
    registry: CommandRegistry,

    /// Append-only file (exclusive access needed)
    aof: Mutex<AofWriter>,

    /// What startup replay found
    replay: ReplayResult,
}

impl Engine {
    /// Open or create an engine with the given config
    ///
    /// On startup:
    /// 1. Create the data directory
    /// 2. Replay the AOF into a fresh store (no replies, no re-logging)
    /// 3. Open the AOF for appending
    /// 4. Ready to serve requests
    pub fn open(config: Config) -> Result<Self> {
        Self::open_with(config, Arc::new(Store::new()), CommandRegistry::with_builtins())
    }

    /// Open with a path (convenience method)
    ///
    /// Uses default config with the specified data directory
    pub fn open_path(path: &Path) -> Result<Self> {
        let config = Config::builder().data_dir(path).build();
        Self::open(config)
    }

    /// Open with an explicit store and command table
    pub fn open_with(config: Config, store: Arc<Store>, registry: CommandRegistry) -> Result<Self> {
        // Step 1: Create data directory if it doesn't exist
        fs::create_dir_all(&config.data_dir)?;
        let aof_path = config.aof_path();

        // Step 2: Replay through the same resolve/apply path live requests use
        let replay = AofReplay::replay(&aof_path, |record| registry.dispatch(&store, record))?;

        if replay.records_read > 0 || replay.was_truncated {
            tracing::info!(
                "AOF replay: {} records ({} rejected), {} bytes, truncated={}",
                replay.records_read,
                replay.records_rejected,
                replay.valid_bytes,
                replay.was_truncated
            );
        }

        // Step 3: Open for append only after replay has finished
        let aof = AofWriter::open(&aof_path, config.aof_sync_strategy)?;

        Ok(Self {
            config,
            aof_path,
            store,
            registry,
            aof: Mutex::new(aof),
            replay,
        })
    }

    /// Execute one decoded request
    ///
    /// Validation failures come back as `Ok(error reply)`. `Err` means the
    /// AOF append failed; the command was not applied and must not be
    /// acknowledged.
    pub fn execute(&self, request: &Value) -> Result<Value> {
        let invocation = match self.registry.resolve(request) {
            Ok(invocation) => invocation,
            Err(err) => {
                tracing::trace!("Rejected request: {}", err);
                return Ok(err.into());
            }
        };

        if !invocation.is_mutating() {
            return Ok(invocation.apply(&self.store));
        }

        let mut aof = self.aof.lock();
        aof.append(request)?;
        Ok(invocation.apply(&self.store))
    }

    /// Force unsynced AOF records to disk
    pub fn sync(&self) -> Result<()> {
        self.aof.lock().sync()
    }

    /// Close the engine gracefully
    ///
    /// Syncs the AOF so every acknowledged write is on disk
    pub fn close(self) -> Result<()> {
        self.aof.lock().sync()
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// The shared store
    pub fn store(&self) -> &Arc<Store> {
        &self.store
    }

    /// The command table
    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    /// Get the AOF path
    pub fn aof_path(&self) -> &Path {
        &self.aof_path
    }

    /// Current AOF size in bytes
    pub fn aof_len(&self) -> u64 {
        self.aof.lock().len()
    }

    /// Statistics from startup replay
    pub fn replay_result(&self) -> &ReplayResult {
        &self.replay
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }
}
