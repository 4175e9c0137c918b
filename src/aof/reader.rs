//! AOF Reader
//!
//! Handles reading request records back from the AOF file.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Read, Take};
use std::path::Path;

use crate::error::Result;
use crate::protocol::{read_value, Value};

/// Reads records from an AOF, tracking the byte offset consumed
///
/// Only the bytes present when the file was opened are read; anything
/// appended later, or an endless device file, looks like end of file.
pub struct AofReader {
    reader: OffsetReader<BufReader<Take<File>>>,
    file_len: u64,
}

impl AofReader {
    /// Open an AOF file for reading from the beginning
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let file_len = file.metadata()?.len();

        Ok(Self {
            reader: OffsetReader {
                inner: BufReader::new(file.take(file_len)),
                offset: 0,
            },
            file_len,
        })
    }

    /// Read the next record
    ///
    /// `Ok(None)` at a clean end of file; `KvError::Incomplete` when the file
    /// ends inside a record.
    pub fn next_record(&mut self) -> Result<Option<Value>> {
        read_value(&mut self.reader)
    }

    /// Bytes consumed so far
    pub fn offset(&self) -> u64 {
        self.reader.offset
    }

    /// File length at open time
    pub fn file_len(&self) -> u64 {
        self.file_len
    }

    /// Iterate over records, stopping after the first error
    pub fn records(self) -> AofIterator {
        AofIterator {
            reader: self,
            done: false,
        }
    }
}

/// Iterator over AOF records
pub struct AofIterator {
    reader: AofReader,
    done: bool,
}

impl Iterator for AofIterator {
    type Item = Result<Value>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.reader.next_record() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

/// BufRead adaptor counting every byte handed out
struct OffsetReader<R> {
    inner: R,
    offset: u64,
}

impl<R: Read> Read for OffsetReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.offset += n as u64;
        Ok(n)
    }
}

impl<R: BufRead> BufRead for OffsetReader<R> {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        self.inner.fill_buf()
    }

    fn consume(&mut self, amt: usize) {
        self.inner.consume(amt);
        self.offset += amt as u64;
    }
}
