//! Value definitions
//!
//! The tagged union shared by the decoder, the command handlers and the
//! encoder. Requests arrive as arrays of bulk strings; replies use every
//! variant.

use bytes::Bytes;

/// A single RESP value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// `+<text>\r\n` - status replies
    SimpleString(String),

    /// `-<text>\r\n` - failure replies
    Error(String),

    /// `:<n>\r\n`
    Integer(i64),

    /// `$<len>\r\n<bytes>\r\n` - binary safe payload
    BulkString(Bytes),

    /// `*<count>\r\n` followed by `count` values
    Array(Vec<Value>),

    /// `$-1\r\n` - "no such key"
    Null,
}

impl Value {
    /// Create a simple string reply
    pub fn simple(text: impl Into<String>) -> Self {
        Value::SimpleString(text.into())
    }

    /// Create an error reply
    pub fn error(text: impl Into<String>) -> Self {
        Value::Error(text.into())
    }

    /// Create a bulk string
    pub fn bulk(data: impl Into<Bytes>) -> Self {
        Value::BulkString(data.into())
    }

    /// The `+OK` status reply
    pub fn ok() -> Self {
        Value::SimpleString("OK".to_string())
    }

    /// Build a request: an array of bulk strings, command name first
    ///
    /// ```
    /// use respkv::protocol::Value;
    ///
    /// let request = Value::command(["SET", "k", "v"]);
    /// assert_eq!(request.as_array().map(|a| a.len()), Some(3));
    /// ```
    pub fn command<I, T>(parts: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Bytes>,
    {
        Value::Array(parts.into_iter().map(|p| Value::BulkString(p.into())).collect())
    }

    /// Borrow the payload of a bulk string
    pub fn as_bulk(&self) -> Option<&Bytes> {
        match self {
            Value::BulkString(data) => Some(data),
            _ => None,
        }
    }

    /// Borrow the elements of an array
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Value::Error(_))
    }

    /// Short name of the variant, for log lines and error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::SimpleString(_) => "simple-string",
            Value::Error(_) => "error",
            Value::Integer(_) => "integer",
            Value::BulkString(_) => "bulk-string",
            Value::Array(_) => "array",
            Value::Null => "null",
        }
    }
}
