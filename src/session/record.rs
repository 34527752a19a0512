//! Completed record definition

use std::fmt;

use serde::Serialize;

use crate::flow::ClientKey;

/// One request matched with the response bytes that followed it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    /// Capture time of the packet that closed this exchange (seconds)
    pub timestamp: f64,

    /// Client endpoint, serialized as `ip:port`
    pub client: ClientKey,

    /// Bytes counted for the request
    pub request_size: u64,

    /// Bytes counted for the response, zero if none were seen
    pub response_size: u64,

    /// Decoded command text
    pub command: String,
}

impl fmt::Display for Record {
    /// `timestamp client request_size response_size command`, column aligned
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.6} {:<21} {:>8} {:>8} {}",
            self.timestamp, self.client, self.request_size, self.response_size, self.command
        )
    }
}
