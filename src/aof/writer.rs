//! AOF Writer
//!
//! Handles appending request records to the AOF file.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::config::AofSyncStrategy;
use crate::error::{KvError, Result};
use crate::protocol::{encode_value, Value};

/// Appends encoded requests to the AOF
///
/// Not internally synchronised; the engine keeps it behind a mutex.
#[derive(Debug)]
pub struct AofWriter {
    /// File opened in append mode
    file: File,

    /// Location of the AOF, for error messages
    path: PathBuf,

    /// When to fsync
    sync_strategy: AofSyncStrategy,

    /// Records written since the last fsync
    uncommitted: usize,

    /// Current file length in bytes
    len: u64,

    /// Records appended through this writer
    records_appended: u64,

    /// Set when a failed record could not be cut back off the file
    failed: bool,
}

impl AofWriter {
    /// Open or create an AOF, positioned at end-of-file
    pub fn open(path: &Path, sync_strategy: AofSyncStrategy) -> Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let len = file.metadata()?.len();

        tracing::debug!("Opened AOF {} ({} bytes)", path.display(), len);

        Ok(Self {
            file,
            path: path.to_path_buf(),
            sync_strategy,
            uncommitted: 0,
            len,
            records_appended: 0,
            failed: false,
        })
    }

    /// Append one request record
    ///
    /// The record goes out in a single `write_all`, followed by an fsync if
    /// the strategy calls for one. If either step fails the file is cut back
    /// to its previous length and the counters are left untouched, so a
    /// record reported as failed never comes back on replay. If the cut
    /// itself fails the writer refuses every later append. Returns the number
    /// of bytes written.
    pub fn append(&mut self, request: &Value) -> Result<u64> {
        if self.failed {
            return Err(KvError::AofWrite(format!(
                "{}: writer disabled after an unrecoverable write failure",
                self.path.display()
            )));
        }

        let bytes = encode_value(request);

        if let Err(e) = self.file.write_all(&bytes) {
            self.roll_back();
            return Err(KvError::AofWrite(format!("{}: {}", self.path.display(), e)));
        }

        let sync_due = match self.sync_strategy {
            AofSyncStrategy::EveryWrite => true,
            AofSyncStrategy::EveryNEntries { count } => self.uncommitted + 1 >= count,
            AofSyncStrategy::OsManaged => false,
        };
        if sync_due {
            if let Err(e) = self.file.sync_data() {
                self.roll_back();
                return Err(KvError::AofWrite(format!(
                    "fsync {}: {}",
                    self.path.display(),
                    e
                )));
            }
        }

        let written = bytes.len() as u64;
        self.len += written;
        self.records_appended += 1;
        self.uncommitted = if sync_due { 0 } else { self.uncommitted + 1 };

        Ok(written)
    }

    /// Cut the file back to the last acknowledged record
    fn roll_back(&mut self) {
        if let Err(e) = self.file.set_len(self.len) {
            tracing::error!(
                "Could not roll back failed AOF record in {}: {}; refusing further appends",
                self.path.display(),
                e
            );
            self.failed = true;
        }
    }

    /// Force unsynced records to disk
    pub fn sync(&mut self) -> Result<()> {
        if self.uncommitted == 0 {
            return Ok(());
        }
        self.file
            .sync_data()
            .map_err(|e| KvError::AofWrite(format!("fsync {}: {}", self.path.display(), e)))?;
        self.uncommitted = 0;
        Ok(())
    }

    /// Whether an earlier failure left the writer unable to append
    pub fn is_failed(&self) -> bool {
        self.failed
    }

    /// Records written since the last fsync
    pub fn uncommitted_count(&self) -> usize {
        self.uncommitted
    }

    /// Current AOF size in bytes
    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Records appended since this writer was opened
    pub fn records_appended(&self) -> u64 {
        self.records_appended
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for AofWriter {
    fn drop(&mut self) {
        if let Err(e) = self.sync() {
            tracing::warn!("AOF sync on drop failed: {}", e);
        }
    }
}
