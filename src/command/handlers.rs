//! Built-in command handlers
//!
//! | Command | Args      | Reply                                        |
//! |---------|-----------|----------------------------------------------|
//! | PING    | [message] | `+PONG`, `+<message>`, or `$<message>` (*)   |
//! | SET     | key value | `+OK`                                        |
//! | GET     | key       | bulk value or null                           |
//! | DEL     | key       | `+KEY deleted successfully`, `+OK` if absent |
//! | EXISTS  | key       | `+KEY Exists`, `-KEY not found` if absent    |
//!
//! (*) A PING message that is not a single line of UTF-8 text is echoed back
//! as a bulk string so it survives the round trip unchanged.

use bytes::Bytes;

use super::{Arity, CommandError, CommandSpec};
use crate::protocol::Value;
use crate::store::Store;

/// The default command table
pub fn builtin_commands() -> Vec<CommandSpec> {
    vec![
        CommandSpec::new("PING", Arity::Range { min: 0, max: 1 }, ping),
        CommandSpec::new("SET", Arity::Exact(2), set).mutating(),
        CommandSpec::new("GET", Arity::Exact(1), get),
        CommandSpec::new("DEL", Arity::Exact(1), del).mutating(),
        CommandSpec::new("EXISTS", Arity::Exact(1), exists),
    ]
}

fn ping(_store: &Store, args: &[Bytes]) -> Result<Value, CommandError> {
    match args {
        [] => Ok(Value::simple("PONG")),
        [message] => Ok(echo(message)),
        _ => Err(CommandError::WrongArity("ping".to_string())),
    }
}

fn set(store: &Store, args: &[Bytes]) -> Result<Value, CommandError> {
    let [key, value] = args else {
        return Err(CommandError::WrongArity("set".to_string()));
    };
    store.set(key.clone(), value.clone());
    Ok(Value::ok())
}

fn get(store: &Store, args: &[Bytes]) -> Result<Value, CommandError> {
    let [key] = args else {
        return Err(CommandError::WrongArity("get".to_string()));
    };
    Ok(store.get(key).map_or(Value::Null, Value::BulkString))
}

fn del(store: &Store, args: &[Bytes]) -> Result<Value, CommandError> {
    let [key] = args else {
        return Err(CommandError::WrongArity("del".to_string()));
    };
    if store.delete(key) {
        Ok(Value::simple("KEY deleted successfully"))
    } else {
        Ok(Value::ok())
    }
}

fn exists(store: &Store, args: &[Bytes]) -> Result<Value, CommandError> {
    let [key] = args else {
        return Err(CommandError::WrongArity("exists".to_string()));
    };
    if store.exists(key) {
        Ok(Value::simple("KEY Exists"))
    } else {
        Err(CommandError::KeyNotFound)
    }
}

fn echo(message: &Bytes) -> Value {
    match std::str::from_utf8(message) {
        Ok(text) if !text.contains(['\r', '\n']) => Value::simple(text),
        _ => Value::BulkString(message.clone()),
    }
}
