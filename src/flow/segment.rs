//! Segment and client key definitions

use std::fmt;
use std::net::{IpAddr, SocketAddr};

use bytes::Bytes;
use serde::{Serialize, Serializer};

/// Identifies the client side of one flow
///
/// Renders as `ip:port` (`[ip]:port` for IPv6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClientKey(SocketAddr);

impl ClientKey {
    pub fn new(ip: IpAddr, port: u16) -> Self {
        Self(SocketAddr::new(ip, port))
    }

    pub fn ip(&self) -> IpAddr {
        self.0.ip()
    }

    pub fn port(&self) -> u16 {
        self.0.port()
    }
}

impl From<SocketAddr> for ClientKey {
    fn from(addr: SocketAddr) -> Self {
        Self(addr)
    }
}

impl fmt::Display for ClientKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Pad through the inner SocketAddr so width specifiers apply
        f.pad(&self.0.to_string())
    }
}

impl Serialize for ClientKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One captured TCP segment, already stripped of its headers
#[derive(Debug, Clone)]
pub struct Segment {
    /// Capture timestamp in seconds since the epoch
    pub timestamp: f64,

    /// Sender endpoint
    pub src: SocketAddr,

    /// Receiver endpoint
    pub dst: SocketAddr,

    /// TCP payload
    pub payload: Bytes,

    /// Length of the whole frame on the wire
    pub wire_len: usize,
}

impl Segment {
    /// Create a segment whose wire length equals its payload length
    pub fn new(timestamp: f64, src: SocketAddr, dst: SocketAddr, payload: impl Into<Bytes>) -> Self {
        let payload = payload.into();
        let wire_len = payload.len();
        Self {
            timestamp,
            src,
            dst,
            payload,
            wire_len,
        }
    }

    /// Set the frame length (used with `SizeBasis::Frame`)
    pub fn with_wire_len(mut self, wire_len: usize) -> Self {
        self.wire_len = wire_len;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }
}
