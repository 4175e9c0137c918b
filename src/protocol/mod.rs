//! Protocol Module
//!
//! Defines the RESP wire protocol spoken between clients and the server, and
//! used verbatim as the record format of the append-only file.
//!
//! ## Value Types
//! ```text
//! ┌────────┬──────────────────────────────┬─────────────────────┐
//! │ Prefix │ Encoding                     │ Variant             │
//! ├────────┼──────────────────────────────┼─────────────────────┤
//! │   +    │ +<text>\r\n                  │ SimpleString        │
//! │   -    │ -<text>\r\n                  │ Error               │
//! │   :    │ :<i64>\r\n                   │ Integer             │
//! │   $    │ $<len>\r\n<bytes>\r\n        │ BulkString          │
//! │   $    │ $-1\r\n                      │ Null                │
//! │   *    │ *<count>\r\n<values...>      │ Array               │
//! └────────┴──────────────────────────────┴─────────────────────┘
//! ```
//!
//! ### Requests
//! A request is a non-empty array of bulk strings:
//! `*3\r\n$3\r\nSET\r\n$1\r\nk\r\n$1\r\nv\r\n`

mod value;
mod codec;

pub use value::Value;
pub use codec::{
    decode_value, encode_value, encode_value_into, read_value, write_value, MAX_ARRAY_LEN,
    MAX_BULK_LEN, MAX_LINE_LEN, MAX_NESTING_DEPTH,
};
