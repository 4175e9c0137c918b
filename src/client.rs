//! Client
//!
//! A blocking RESP client for talking to a RespKV server.

use std::io::{BufReader, BufWriter};
use std::net::{TcpStream, ToSocketAddrs};

use bytes::Bytes;

use crate::error::{KvError, Result};
use crate::protocol::{read_value, write_value, Value};

/// A connection to a RespKV server
///
/// # Examples
/// ```no_run
/// # use respkv::Client;
/// # fn main() -> respkv::Result<()> {
/// let mut client = Client::connect("127.0.0.1:6379")?;
/// client.set("greeting", "hello")?;
/// assert_eq!(client.get("greeting")?.as_deref(), Some(&b"hello"[..]));
/// # Ok(())
/// # }
/// ```
pub struct Client {
    reader: BufReader<TcpStream>,
    writer: BufWriter<TcpStream>,
}

impl Client {
    /// Connect to a server
    pub fn connect(addr: impl ToSocketAddrs) -> Result<Self> {
        let stream = TcpStream::connect(addr)?;
        stream.set_nodelay(true)?;
        let read_stream = stream.try_clone()?;

        Ok(Self {
            reader: BufReader::new(read_stream),
            writer: BufWriter::new(stream),
        })
    }

    /// Send a raw command and wait for its reply
    pub fn call<I, T>(&mut self, parts: I) -> Result<Value>
    where
        I: IntoIterator<Item = T>,
        T: Into<Bytes>,
    {
        self.send(&Value::command(parts))
    }

    /// Send any value as a request and wait for its reply
    pub fn send(&mut self, request: &Value) -> Result<Value> {
        write_value(&mut self.writer, request)?;
        read_value(&mut self.reader)?
            .ok_or_else(|| KvError::Incomplete("server closed the connection".to_string()))
    }

    /// PING, returning the status text
    pub fn ping(&mut self) -> Result<String> {
        match self.call(["PING"])? {
            Value::SimpleString(text) => Ok(text),
            other => Err(unexpected(other)),
        }
    }

    /// SET key value
    pub fn set(&mut self, key: impl Into<Bytes>, value: impl Into<Bytes>) -> Result<()> {
        let request = Value::Array(vec![
            Value::bulk("SET"),
            Value::BulkString(key.into()),
            Value::BulkString(value.into()),
        ]);
        match self.send(&request)? {
            Value::SimpleString(_) => Ok(()),
            other => Err(unexpected(other)),
        }
    }

    /// GET key; `None` when the key does not exist
    pub fn get(&mut self, key: impl Into<Bytes>) -> Result<Option<Bytes>> {
        let request = Value::Array(vec![Value::bulk("GET"), Value::BulkString(key.into())]);
        match self.send(&request)? {
            Value::BulkString(data) => Ok(Some(data)),
            Value::Null => Ok(None),
            other => Err(unexpected(other)),
        }
    }

    /// DEL key; true when a key was removed
    pub fn del(&mut self, key: impl Into<Bytes>) -> Result<bool> {
        let request = Value::Array(vec![Value::bulk("DEL"), Value::BulkString(key.into())]);
        match self.send(&request)? {
            Value::SimpleString(text) => Ok(text != "OK"),
            other => Err(unexpected(other)),
        }
    }

    /// EXISTS key
    pub fn exists(&mut self, key: impl Into<Bytes>) -> Result<bool> {
        let request = Value::Array(vec![Value::bulk("EXISTS"), Value::BulkString(key.into())]);
        match self.send(&request)? {
            Value::SimpleString(_) => Ok(true),
            Value::Error(_) => Ok(false),
            other => Err(unexpected(other)),
        }
    }
}

fn unexpected(reply: Value) -> KvError {
    match reply {
        Value::Error(text) => KvError::Protocol(format!("server error: {}", text)),
        other => KvError::Protocol(format!("unexpected {} reply", other.type_name())),
    }
}
