//! Protocol Module
//!
//! Request-side grammar of the key-value wire protocol, as seen by a
//! passive observer that only gets arbitrary TCP segments.
//!
//! ## Request Format (array of bulk strings)
//! ```text
//! *3\r\n            array header: 3 elements
//! $3\r\nSET\r\n     bulk length + value
//! $3\r\nkey\r\n
//! $5\r\nvalue\r\n
//! ```
//!
//! ## Transactions
//! ```text
//! *1 $5 MULTI   *3 $3 SET $1 a $1 b   *1 $4 EXEC
//!      │                │                  │
//!      ▼                ▼                  ▼
//!   "MULTI         SET a b /             EXEC"
//! ```
//!
//! Replies are never decoded, only counted.

mod lines;
mod request;
mod transaction;

pub use lines::{LineBuffer, CRLF};
pub use request::{
    analyze, decode_simple, is_transaction, parse_array_len, parse_bulk_len, Completion,
    MalformedHeader, EXEC, MULTI,
};
pub use transaction::expand_transaction;
