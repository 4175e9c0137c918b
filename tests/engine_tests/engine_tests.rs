//! Tests for Engine
//!
//! These tests verify:
//! - Request execution through the registry
//! - Only well-formed mutating requests reach the AOF
//! - Crash recovery from the AOF on reopen
//! - Concurrent access patterns
//! - Engine lifecycle (open/close)

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::sync::Arc;
use std::thread;

use respkv::command::{Arity, CommandError, CommandRegistry, CommandSpec};
use respkv::config::{AofSyncStrategy, Config};
use respkv::engine::Engine;
use respkv::protocol::{encode_value, Value};
use respkv::store::Store;
use respkv::KvError;
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn test_config(temp_dir: &TempDir) -> Config {
    Config::builder()
        .data_dir(temp_dir.path())
        .aof_sync_strategy(AofSyncStrategy::EveryWrite) // Sync every write for test reliability
        .build()
}

fn setup_temp_engine() -> (TempDir, Engine) {
    let temp_dir = TempDir::new().unwrap();
    let engine = Engine::open(test_config(&temp_dir)).unwrap();
    (temp_dir, engine)
}

fn exec(engine: &Engine, parts: &[&'static str]) -> Value {
    engine.execute(&Value::command(parts.iter().copied())).unwrap()
}

// =============================================================================
// Basic Operations Tests
// =============================================================================

#[test]
fn test_engine_open_creates_files() {
    let temp_dir = TempDir::new().unwrap();
    let data_dir = temp_dir.path().join("mydb");

    let config = Config::builder().data_dir(&data_dir).build();
    let engine = Engine::open(config).unwrap();

    assert!(data_dir.exists());
    assert!(data_dir.join("database.aof").exists());
    assert_eq!(engine.aof_path(), data_dir.join("database.aof"));
}

#[test]
fn test_engine_set_get() {
    let (_temp, engine) = setup_temp_engine();

    assert_eq!(exec(&engine, &["SET", "hello", "world"]), Value::ok());
    assert_eq!(exec(&engine, &["GET", "hello"]), Value::bulk("world"));
}

#[test]
fn test_engine_get_nonexistent_key() {
    let (_temp, engine) = setup_temp_engine();
    assert_eq!(exec(&engine, &["GET", "nonexistent"]), Value::Null);
}

#[test]
fn test_engine_del_is_idempotent() {
    let (_temp, engine) = setup_temp_engine();
    exec(&engine, &["SET", "k", "v"]);

    assert!(!exec(&engine, &["DEL", "k"]).is_error());
    assert_eq!(exec(&engine, &["DEL", "k"]), Value::ok());
}

#[test]
fn test_engine_ping() {
    let (_temp, engine) = setup_temp_engine();
    assert_eq!(exec(&engine, &["ping"]), Value::simple("PONG"));
}

// =============================================================================
// AOF Gating Tests
// =============================================================================

#[test]
fn test_mutating_requests_are_logged_verbatim() {
    let (_temp, engine) = setup_temp_engine();
    let set = Value::command(["SET", "a", "1"]);
    let del = Value::command(["del", "a"]);

    engine.execute(&set).unwrap();
    engine.execute(&del).unwrap();

    let mut expected = encode_value(&set).to_vec();
    expected.extend_from_slice(&encode_value(&del));
    assert_eq!(fs::read(engine.aof_path()).unwrap(), expected);
}

#[test]
fn test_read_requests_are_not_logged() {
    let (_temp, engine) = setup_temp_engine();

    exec(&engine, &["GET", "a"]);
    exec(&engine, &["EXISTS", "a"]);
    exec(&engine, &["PING"]);

    assert_eq!(engine.aof_len(), 0);
}

#[test]
fn test_rejected_requests_are_not_logged() {
    let (_temp, engine) = setup_temp_engine();

    let wrong_arity = exec(&engine, &["SET", "only_key"]);
    let unknown = exec(&engine, &["HSET", "h", "f", "v"]);
    let not_bulk = engine
        .execute(&Value::Array(vec![Value::bulk("SET"), Value::Integer(1), Value::bulk("v")]))
        .unwrap();

    assert!(wrong_arity.is_error());
    assert!(unknown.is_error());
    assert_eq!(not_bulk, Value::from(CommandError::InvalidRequest));
    assert_eq!(engine.aof_len(), 0);
    assert!(engine.store().is_empty());
}

#[test]
fn test_del_of_absent_key_is_still_logged() {
    // The log records requests as received, not their outcome
    let (_temp, engine) = setup_temp_engine();

    exec(&engine, &["DEL", "never_set"]);

    assert_eq!(
        engine.aof_len(),
        encode_value(&Value::command(["DEL", "never_set"])).len() as u64
    );
}

// =============================================================================
// AOF Failure Tests
// =============================================================================

/// Writes to `/dev/full` always fail, so every mutating request hits the
/// append error path.
#[cfg(target_os = "linux")]
#[test]
fn test_failed_append_is_not_applied() {
    if !std::path::Path::new("/dev/full").exists() {
        return;
    }
    let temp_dir = TempDir::new().unwrap();
    let config = Config::builder()
        .data_dir(temp_dir.path())
        .aof_filename("/dev/full")
        .aof_sync_strategy(AofSyncStrategy::EveryWrite)
        .build();
    let store = Arc::new(Store::new());
    store.set("k".into(), "old".into());

    let engine = Engine::open_with(config, Arc::clone(&store), CommandRegistry::with_builtins())
        .unwrap();

    let set = engine.execute(&Value::command(["SET", "k", "new"]));
    assert!(matches!(set, Err(KvError::AofWrite(_))));
    assert_eq!(engine.store().get(b"k").as_deref(), Some(&b"old"[..]));

    let del = engine.execute(&Value::command(["DEL", "k"]));
    assert!(matches!(del, Err(KvError::AofWrite(_))));
    assert!(engine.store().exists(b"k"));

    // Reads never touch the log and keep working
    assert_eq!(exec(&engine, &["GET", "k"]), Value::bulk("old"));
    assert_eq!(engine.aof_len(), 0);
}

// =============================================================================
// Recovery Tests
// =============================================================================

#[test]
fn test_engine_recovers_after_reopen() {
    let temp_dir = TempDir::new().unwrap();

    {
        let engine = Engine::open(test_config(&temp_dir)).unwrap();
        exec(&engine, &["SET", "a", "1"]);
        exec(&engine, &["SET", "a", "2"]);
        exec(&engine, &["SET", "b", "x"]);
        exec(&engine, &["DEL", "b"]);
        engine.close().unwrap();
    }

    let engine = Engine::open(test_config(&temp_dir)).unwrap();

    assert_eq!(engine.replay_result().records_read, 4);
    assert_eq!(exec(&engine, &["GET", "a"]), Value::bulk("2"));
    assert_eq!(exec(&engine, &["GET", "b"]), Value::Null);
}

#[test]
fn test_engine_recovery_without_close() {
    let temp_dir = TempDir::new().unwrap();

    {
        let engine = Engine::open(test_config(&temp_dir)).unwrap();
        exec(&engine, &["SET", "survivor", "yes"]);
        // Dropped without close (simulated crash)
    }

    let engine = Engine::open(test_config(&temp_dir)).unwrap();
    assert_eq!(exec(&engine, &["GET", "survivor"]), Value::bulk("yes"));
}

#[test]
fn test_reopen_does_not_relog_replayed_records() {
    let temp_dir = TempDir::new().unwrap();
    {
        let engine = Engine::open(test_config(&temp_dir)).unwrap();
        exec(&engine, &["SET", "a", "1"]);
    }
    let size_after_first_run = fs::metadata(temp_dir.path().join("database.aof")).unwrap().len();

    for _ in 0..3 {
        let engine = Engine::open(test_config(&temp_dir)).unwrap();
        assert_eq!(engine.aof_len(), size_after_first_run);
    }
}

#[test]
fn test_engine_recovers_from_torn_tail() {
    let temp_dir = TempDir::new().unwrap();
    {
        let engine = Engine::open(test_config(&temp_dir)).unwrap();
        exec(&engine, &["SET", "a", "1"]);
    }
    {
        let aof_path = temp_dir.path().join("database.aof");
        let mut file = OpenOptions::new().append(true).open(aof_path).unwrap();
        file.write_all(b"*3\r\n$3\r\nSET\r\n$1\r\nb\r\n$5\r\nhal").unwrap();
    }

    let engine = Engine::open(test_config(&temp_dir)).unwrap();

    assert!(engine.replay_result().was_truncated);
    assert_eq!(exec(&engine, &["GET", "a"]), Value::bulk("1"));
    assert_eq!(exec(&engine, &["GET", "b"]), Value::Null);

    // New writes after recovery survive the next restart
    exec(&engine, &["SET", "c", "3"]);
    drop(engine);

    let engine = Engine::open(test_config(&temp_dir)).unwrap();
    assert!(!engine.replay_result().was_truncated);
    assert_eq!(exec(&engine, &["GET", "c"]), Value::bulk("3"));
}

#[test]
fn test_engine_custom_aof_filename() {
    let temp_dir = TempDir::new().unwrap();
    let config = Config::builder()
        .data_dir(temp_dir.path())
        .aof_filename("custom.aof")
        .build();

    let engine = Engine::open(config).unwrap();
    exec(&engine, &["SET", "k", "v"]);
    engine.sync().unwrap();

    assert!(temp_dir.path().join("custom.aof").exists());
    assert!(!temp_dir.path().join("database.aof").exists());
}

#[test]
fn test_engine_open_with_custom_command() {
    let temp_dir = TempDir::new().unwrap();
    let mut registry = CommandRegistry::with_builtins();
    registry.register(
        CommandSpec::new("APPENDX", Arity::Exact(1), |store: &Store, args: &[bytes::Bytes]| {
            let mut value = store.get(&args[0]).map(|v| v.to_vec()).unwrap_or_default();
            value.push(b'x');
            store.set(args[0].clone(), value.into());
            Ok::<_, CommandError>(Value::ok())
        })
        .mutating(),
    );

    {
        let engine = Engine::open_with(
            test_config(&temp_dir),
            Arc::new(Store::new()),
            registry,
        )
        .unwrap();
        exec(&engine, &["APPENDX", "k"]);
        exec(&engine, &["APPENDX", "k"]);
    }

    // Replay without the custom command rejects those records
    let engine = Engine::open(test_config(&temp_dir)).unwrap();
    assert_eq!(engine.replay_result().records_read, 2);
    assert_eq!(engine.replay_result().records_rejected, 2);
    assert!(engine.store().is_empty());
}

// =============================================================================
// Concurrent Access Tests
// =============================================================================

#[test]
fn test_engine_concurrent_writes() {
    let temp_dir = TempDir::new().unwrap();
    let config = Config::builder()
        .data_dir(temp_dir.path())
        .aof_sync_strategy(AofSyncStrategy::OsManaged)
        .build();
    let engine = Arc::new(Engine::open(config.clone()).unwrap());

    let mut handles = vec![];
    for t in 0..4 {
        let engine_clone = Arc::clone(&engine);
        handles.push(thread::spawn(move || {
            for i in 0..50 {
                let request = Value::command([
                    "SET".to_string(),
                    format!("thread{}_key{}", t, i),
                    format!("thread{}_value{}", t, i),
                ]);
                assert_eq!(engine_clone.execute(&request).unwrap(), Value::ok());
            }
        }));
    }

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(engine.store().len(), 200);
    engine.sync().unwrap();
    drop(engine);

    // Every record made it into the log intact
    let recovered = Engine::open(config).unwrap();
    assert_eq!(recovered.replay_result().records_read, 200);
    assert_eq!(recovered.replay_result().records_rejected, 0);
    for t in 0..4 {
        for i in 0..50 {
            let key = format!("thread{}_key{}", t, i);
            let expected = format!("thread{}_value{}", t, i);
            assert_eq!(
                recovered.store().get(key.as_bytes()).as_deref(),
                Some(expected.as_bytes())
            );
        }
    }
}

#[test]
fn test_engine_concurrent_reads() {
    let (_temp, engine) = setup_temp_engine();
    let engine = Arc::new(engine);

    for i in 0..50 {
        engine
            .execute(&Value::command(["SET".to_string(), format!("key{}", i), format!("value{}", i)]))
            .unwrap();
    }

    let mut handles = vec![];
    for _ in 0..4 {
        let engine_clone = Arc::clone(&engine);
        handles.push(thread::spawn(move || {
            for i in 0..50 {
                let reply = engine_clone
                    .execute(&Value::command(["GET".to_string(), format!("key{}", i)]))
                    .unwrap();
                assert_eq!(reply, Value::bulk(format!("value{}", i)));
            }
        }));
    }

    for handle in handles {
        handle.join().unwrap();
    }
}

// =============================================================================
// Lifecycle Tests
// =============================================================================

#[test]
fn test_engine_accessors() {
    let temp_dir = TempDir::new().unwrap();
    let data_dir = temp_dir.path().to_path_buf();

    let engine = Engine::open_path(&data_dir).unwrap();

    assert_eq!(engine.config().data_dir, data_dir);
    assert_eq!(engine.registry().len(), 5);
    assert_eq!(engine.aof_len(), 0);
    assert_eq!(engine.replay_result().records_read, 0);
}
