//! Configuration for RespKV
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;
use std::str::FromStr;

use crate::error::KvError;

/// Main configuration for a RespKV instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Root directory for data files
    /// Internal structure:
    ///   {data_dir}/
    ///     └── database.aof     (append-only file)
    pub data_dir: PathBuf,

    /// File name of the append-only file inside `data_dir`
    pub aof_filename: String,

    // -------------------------------------------------------------------------
    // AOF Configuration
    // -------------------------------------------------------------------------
    /// Sync strategy: how often to fsync the AOF
    pub aof_sync_strategy: AofSyncStrategy,

    // -------------------------------------------------------------------------
    // Network Configuration
    // -------------------------------------------------------------------------
    /// TCP listen address
    pub listen_addr: String,
}

/// AOF sync strategy
///
/// Every record reaches the OS with a single `write_all` before the command
/// is applied; the strategy only controls when the file is fsynced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AofSyncStrategy {
    /// fsync after every write (safest, slowest)
    EveryWrite,

    /// fsync after N unsynced records
    EveryNEntries { count: usize },

    /// Never fsync explicitly; leave it to the OS and to `close`
    OsManaged,
}

impl FromStr for AofSyncStrategy {
    type Err = KvError;

    /// Parses `always`, `no`, or `every:<n>`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "always" => Ok(AofSyncStrategy::EveryWrite),
            "no" => Ok(AofSyncStrategy::OsManaged),
            other => {
                let count = other
                    .strip_prefix("every:")
                    .and_then(|n| n.parse::<usize>().ok())
                    .filter(|&n| n > 0)
                    .ok_or_else(|| {
                        KvError::Config(format!(
                            "invalid fsync policy '{}' (expected always, no, or every:<n>)",
                            other
                        ))
                    })?;
                Ok(AofSyncStrategy::EveryNEntries { count })
            }
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./respkv_data"),
            aof_filename: "database.aof".to_string(),
            aof_sync_strategy: AofSyncStrategy::EveryNEntries { count: 100 },
            listen_addr: "127.0.0.1:6379".to_string(),
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Full path of the append-only file
    pub fn aof_path(&self) -> PathBuf {
        self.data_dir.join(&self.aof_filename)
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the data directory
    pub fn data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.data_dir = path.into();
        self
    }

    /// Set the AOF file name (relative to the data directory)
    pub fn aof_filename(mut self, name: impl Into<String>) -> Self {
        self.config.aof_filename = name.into();
        self
    }

    /// Set the AOF sync strategy
    pub fn aof_sync_strategy(mut self, strategy: AofSyncStrategy) -> Self {
        self.config.aof_sync_strategy = strategy;
        self
    }

    /// Set the TCP listen address
    pub fn listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.listen_addr = addr.into();
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
