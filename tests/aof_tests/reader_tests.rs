//! Tests for AOF Reader
//!
//! These tests verify:
//! - Reading records written by the writer, in order
//! - Offset tracking at record boundaries
//! - Behaviour at a torn tail and on garbage

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

use respkv::aof::{AofReader, AofWriter};
use respkv::config::AofSyncStrategy;
use respkv::protocol::{encode_value, Value};
use respkv::KvError;
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_temp_aof() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let aof_path = temp_dir.path().join("test.aof");
    (temp_dir, aof_path)
}

fn write_sets(path: &PathBuf, count: usize) -> Vec<Value> {
    let mut writer = AofWriter::open(path, AofSyncStrategy::EveryWrite).unwrap();
    (0..count)
        .map(|i| {
            let request = Value::command([
                "SET".to_string(),
                format!("key{}", i),
                format!("value{}", i),
            ]);
            writer.append(&request).unwrap();
            request
        })
        .collect()
}

// =============================================================================
// Reading Tests
// =============================================================================

#[test]
fn test_read_empty_file() {
    let (_temp, aof_path) = setup_temp_aof();
    File::create(&aof_path).unwrap();

    let mut reader = AofReader::open(&aof_path).unwrap();

    assert!(reader.next_record().unwrap().is_none());
    assert_eq!(reader.offset(), 0);
}

#[test]
fn test_read_back_in_order() {
    let (_temp, aof_path) = setup_temp_aof();
    let written = write_sets(&aof_path, 20);

    let reader = AofReader::open(&aof_path).unwrap();
    let read: Vec<Value> = reader.records().map(|r| r.unwrap()).collect();

    assert_eq!(read, written);
}

#[test]
fn test_offset_at_record_boundaries() {
    let (_temp, aof_path) = setup_temp_aof();
    let written = write_sets(&aof_path, 3);

    let mut reader = AofReader::open(&aof_path).unwrap();
    let mut expected_offset = 0u64;
    for request in &written {
        reader.next_record().unwrap().unwrap();
        expected_offset += encode_value(request).len() as u64;
        assert_eq!(reader.offset(), expected_offset);
    }
    assert_eq!(reader.offset(), reader.file_len());
}

#[test]
fn test_large_record() {
    let (_temp, aof_path) = setup_temp_aof();
    let big = vec![0xABu8; 200_000];
    let request = Value::Array(vec![Value::bulk("SET"), Value::bulk("big"), Value::bulk(big)]);
    {
        let mut writer = AofWriter::open(&aof_path, AofSyncStrategy::EveryWrite).unwrap();
        writer.append(&request).unwrap();
    }

    let mut reader = AofReader::open(&aof_path).unwrap();

    assert_eq!(reader.next_record().unwrap(), Some(request));
    assert_eq!(reader.offset(), fs::metadata(&aof_path).unwrap().len());
}

// =============================================================================
// Damage Tests
// =============================================================================

#[test]
fn test_torn_tail_reports_incomplete() {
    let (_temp, aof_path) = setup_temp_aof();
    write_sets(&aof_path, 2);
    {
        let mut file = OpenOptions::new().append(true).open(&aof_path).unwrap();
        file.write_all(b"*3\r\n$3\r\nSET\r\n$1\r\nx").unwrap();
    }

    let results: Vec<_> = AofReader::open(&aof_path).unwrap().records().collect();

    assert_eq!(results.len(), 3);
    assert!(results[0].is_ok());
    assert!(results[1].is_ok());
    assert!(matches!(results[2], Err(KvError::Incomplete(_))));
}

#[test]
fn test_garbage_reports_protocol_error() {
    let (_temp, aof_path) = setup_temp_aof();
    fs::write(&aof_path, b"not resp at all\r\n").unwrap();

    let mut reader = AofReader::open(&aof_path).unwrap();

    assert!(matches!(reader.next_record(), Err(KvError::Protocol(_))));
}

#[test]
fn test_iterator_stops_after_error() {
    let (_temp, aof_path) = setup_temp_aof();
    fs::write(&aof_path, b"?bad\r\n*1\r\n$4\r\nPING\r\n").unwrap();

    let mut records = AofReader::open(&aof_path).unwrap().records();

    assert!(records.next().unwrap().is_err());
    assert!(records.next().is_none());
}

#[test]
fn test_reader_stops_at_length_seen_on_open() {
    let (_temp, aof_path) = setup_temp_aof();
    write_sets(&aof_path, 2);

    let mut reader = AofReader::open(&aof_path).unwrap();
    write_sets(&aof_path, 3);

    let mut count = 0;
    while reader.next_record().unwrap().is_some() {
        count += 1;
    }
    assert_eq!(count, 2);
    assert_eq!(reader.offset(), reader.file_len());
}
