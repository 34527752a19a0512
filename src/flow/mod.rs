//! Flow Module
//!
//! Decides which side of a TCP flow a captured segment belongs to.
//!
//! ## Classification Rule
//! ```text
//!   src_port == server_port  ──►  RESPONSE, client = destination endpoint
//!   otherwise                ──►  REQUEST,  client = source endpoint
//! ```
//!
//! Only the configured port is consulted. TCP flags are ignored, so a client
//! whose ephemeral port equals the server port is misclassified.

mod segment;
mod classifier;

pub use segment::{ClientKey, Segment};
pub use classifier::classify;

/// Which way a segment travels relative to the server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Client to server
    Request,

    /// Server to client
    Response,
}
