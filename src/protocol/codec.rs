//! Protocol codec
//!
//! Encoding and decoding functions for the RESP wire protocol.
//!
//! ## Wire Format
//! ```text
//! *<count>\r\n<value>...      array of `count` values
//! $<len>\r\n<bytes>\r\n       bulk string ($-1\r\n is null)
//! +<text>\r\n                 simple string
//! -<text>\r\n                 error
//! :<integer>\r\n              integer
//! ```
//!
//! Decoding consumes exactly the bytes of one value and leaves the reader
//! positioned at the start of the next one. The same reader functions serve
//! live connections and AOF replay.

use std::io::{BufRead, Read, Write};

use bytes::{BufMut, Bytes, BytesMut};

use super::Value;
use crate::error::{KvError, Result};

/// Maximum bulk string payload (512 MB)
pub const MAX_BULK_LEN: usize = 512 * 1024 * 1024;

/// Maximum number of elements in one array
pub const MAX_ARRAY_LEN: usize = 1024 * 1024;

/// Maximum length of a header or simple-string line, CRLF excluded
pub const MAX_LINE_LEN: usize = 64 * 1024;

/// Maximum array nesting accepted by the decoder
pub const MAX_NESTING_DEPTH: usize = 128;

const SIMPLE_STRING: u8 = b'+';
const ERROR: u8 = b'-';
const INTEGER: u8 = b':';
const BULK_STRING: u8 = b'$';
const ARRAY: u8 = b'*';

const CRLF: &[u8] = b"\r\n";
const NULL_BULK: &[u8] = b"$-1\r\n";

/// Bulk payloads are read in chunks so a bogus length cannot force a huge
/// allocation before the bytes actually arrive.
const INITIAL_BULK_CAPACITY: usize = 64 * 1024;

// =============================================================================
// Encoding
// =============================================================================

/// Encode a value to bytes
pub fn encode_value(value: &Value) -> Bytes {
    let mut buf = BytesMut::new();
    encode_value_into(value, &mut buf);
    buf.freeze()
}

/// Encode a value, appending to an existing buffer
///
/// CR and LF inside simple strings and errors are replaced by spaces so the
/// line framing always holds.
pub fn encode_value_into(value: &Value, buf: &mut BytesMut) {
    match value {
        Value::SimpleString(text) => put_text_line(buf, SIMPLE_STRING, text),
        Value::Error(text) => put_text_line(buf, ERROR, text),
        Value::Integer(n) => put_header(buf, INTEGER, *n),
        Value::BulkString(data) => {
            put_header(buf, BULK_STRING, data.len() as i64);
            buf.reserve(data.len() + CRLF.len());
            buf.put_slice(data);
            buf.put_slice(CRLF);
        }
        Value::Array(items) => {
            put_header(buf, ARRAY, items.len() as i64);
            for item in items {
                encode_value_into(item, buf);
            }
        }
        Value::Null => buf.put_slice(NULL_BULK),
    }
}

fn put_header(buf: &mut BytesMut, prefix: u8, n: i64) {
    buf.put_u8(prefix);
    buf.put_slice(n.to_string().as_bytes());
    buf.put_slice(CRLF);
}

fn put_text_line(buf: &mut BytesMut, prefix: u8, text: &str) {
    buf.reserve(text.len() + 3);
    buf.put_u8(prefix);
    for &b in text.as_bytes() {
        buf.put_u8(if b == b'\r' || b == b'\n' { b' ' } else { b });
    }
    buf.put_slice(CRLF);
}

// =============================================================================
// Decoding
// =============================================================================

/// Read one complete value from a buffered stream
///
/// Returns:
/// - `Ok(Some(value))` - a full value was decoded
/// - `Ok(None)` - the stream ended cleanly before the first byte of a value
/// - `Err(KvError::Incomplete)` - the stream ended inside a value
/// - `Err(KvError::Protocol)` - the bytes are not valid RESP
pub fn read_value<R: BufRead>(reader: &mut R) -> Result<Option<Value>> {
    if reader.fill_buf()?.is_empty() {
        return Ok(None);
    }
    read_nested(reader, 0).map(Some)
}

/// Decode one value from a byte slice
///
/// Returns the value and the number of bytes it occupied.
pub fn decode_value(bytes: &[u8]) -> Result<(Value, usize)> {
    let mut cursor = bytes;
    let value = read_value(&mut cursor)?
        .ok_or_else(|| KvError::Incomplete("empty input".to_string()))?;
    Ok((value, bytes.len() - cursor.len()))
}

fn read_nested<R: BufRead>(reader: &mut R, depth: usize) -> Result<Value> {
    if depth > MAX_NESTING_DEPTH {
        return Err(KvError::Protocol(format!(
            "nesting deeper than {} levels",
            MAX_NESTING_DEPTH
        )));
    }

    let line = read_line(reader)?;
    let (&prefix, rest) = line
        .split_first()
        .ok_or_else(|| KvError::Protocol("empty line where a value was expected".to_string()))?;

    match prefix {
        SIMPLE_STRING => Ok(Value::SimpleString(parse_text(rest)?)),
        ERROR => Ok(Value::Error(parse_text(rest)?)),
        INTEGER => Ok(Value::Integer(parse_integer(rest)?)),
        BULK_STRING => {
            let Some(len) = parse_length(rest, MAX_BULK_LEN, "bulk string")? else {
                return Ok(Value::Null);
            };
            read_bulk_payload(reader, len).map(Value::BulkString)
        }
        ARRAY => {
            let Some(count) = parse_length(rest, MAX_ARRAY_LEN, "array")? else {
                return Ok(Value::Null);
            };
            let mut items = Vec::with_capacity(count.min(1024));
            for _ in 0..count {
                items.push(read_nested(reader, depth + 1)?);
            }
            Ok(Value::Array(items))
        }
        other => Err(KvError::Protocol(format!(
            "unknown type prefix byte 0x{:02x}",
            other
        ))),
    }
}

/// Read a CRLF-terminated line, returning it without the terminator
fn read_line<R: BufRead>(reader: &mut R) -> Result<Vec<u8>> {
    let mut line = Vec::new();
    let limit = (MAX_LINE_LEN + CRLF.len()) as u64;
    reader.by_ref().take(limit).read_until(b'\n', &mut line)?;

    if !line.ends_with(b"\n") {
        if line.len() as u64 >= limit {
            return Err(KvError::Protocol(format!(
                "line longer than {} bytes",
                MAX_LINE_LEN
            )));
        }
        return Err(KvError::Incomplete(format!(
            "line cut off after {} bytes",
            line.len()
        )));
    }
    if !line.ends_with(CRLF) {
        return Err(KvError::Protocol("line not terminated by CRLF".to_string()));
    }

    line.truncate(line.len() - CRLF.len());
    Ok(line)
}

fn read_bulk_payload<R: BufRead>(reader: &mut R, len: usize) -> Result<Bytes> {
    let wanted = len + CRLF.len();
    let mut data = Vec::with_capacity(wanted.min(INITIAL_BULK_CAPACITY));
    reader.by_ref().take(wanted as u64).read_to_end(&mut data)?;

    if data.len() < wanted {
        return Err(KvError::Incomplete(format!(
            "bulk string declared {} bytes, got {}",
            len,
            data.len().min(len)
        )));
    }
    if !data.ends_with(CRLF) {
        return Err(KvError::Protocol(format!(
            "bulk string of {} bytes not followed by CRLF",
            len
        )));
    }

    data.truncate(len);
    Ok(Bytes::from(data))
}

fn parse_text(raw: &[u8]) -> Result<String> {
    String::from_utf8(raw.to_vec())
        .map_err(|_| KvError::Protocol("simple string is not valid UTF-8".to_string()))
}

fn parse_integer(raw: &[u8]) -> Result<i64> {
    std::str::from_utf8(raw)
        .ok()
        .and_then(|s| s.parse::<i64>().ok())
        .ok_or_else(|| {
            KvError::Protocol(format!(
                "invalid integer '{}'",
                String::from_utf8_lossy(raw)
            ))
        })
}

/// Parse a length header; `-1` is the null sentinel and yields `None`
fn parse_length(raw: &[u8], max: usize, what: &str) -> Result<Option<usize>> {
    let n = parse_integer(raw).map_err(|_| {
        KvError::Protocol(format!(
            "invalid {} length '{}'",
            what,
            String::from_utf8_lossy(raw)
        ))
    })?;

    match n {
        -1 => Ok(None),
        n if n < 0 => Err(KvError::Protocol(format!("negative {} length {}", what, n))),
        n if n as u64 > max as u64 => Err(KvError::Protocol(format!(
            "{} length {} exceeds maximum {}",
            what, n, max
        ))),
        n => Ok(Some(n as usize)),
    }
}

// =============================================================================
// Stream-based I/O helpers
// =============================================================================

/// Write a value to a stream and flush it
pub fn write_value<W: Write>(writer: &mut W, value: &Value) -> Result<()> {
    let bytes = encode_value(value);
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}
