//! Configuration for resp-sniffer
//!
//! Centralized configuration with sensible defaults.

use std::net::IpAddr;
use std::str::FromStr;

use crate::error::SnifferError;

/// Default port of the key-value server
pub const DEFAULT_SERVER_PORT: u16 = 6379;

/// Main configuration for one analysis run
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Capture Configuration
    // -------------------------------------------------------------------------
    /// Port the server listens on. Segments from this port are responses.
    pub server_port: u16,

    /// Only forward packets sent from this address
    pub src_filter: Option<IpAddr>,

    /// Only forward packets sent to this address
    pub dst_filter: Option<IpAddr>,

    /// Bounded channel size between the capture thread and the engine
    pub channel_capacity: usize,

    // -------------------------------------------------------------------------
    // Reconstruction Configuration
    // -------------------------------------------------------------------------
    /// What a request/response byte size counts
    pub size_basis: SizeBasis,

    /// Largest partial request kept per client before its state is dropped
    pub max_partial_bytes: usize,

    /// Emit still-pending sessions when the capture ends instead of dropping them
    pub flush_pending_on_end: bool,
}

/// Which length is accumulated into request and response sizes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SizeBasis {
    /// TCP payload bytes only
    #[default]
    Payload,

    /// Whole captured frame, link/network/transport headers included
    Frame,
}

impl FromStr for SizeBasis {
    type Err = SnifferError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "payload" => Ok(SizeBasis::Payload),
            "frame" => Ok(SizeBasis::Frame),
            other => Err(SnifferError::Config(format!(
                "unknown size basis {:?} (expected \"payload\" or \"frame\")",
                other
            ))),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: DEFAULT_SERVER_PORT,
            src_filter: None,
            dst_filter: None,
            channel_capacity: 1024,
            size_basis: SizeBasis::Payload,
            max_partial_bytes: 16 * 1024 * 1024, // 16 MB
            flush_pending_on_end: false,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the server port
    pub fn server_port(mut self, port: u16) -> Self {
        self.config.server_port = port;
        self
    }

    /// Only keep packets whose source address matches
    pub fn src_filter(mut self, addr: Option<IpAddr>) -> Self {
        self.config.src_filter = addr;
        self
    }

    /// Only keep packets whose destination address matches
    pub fn dst_filter(mut self, addr: Option<IpAddr>) -> Self {
        self.config.dst_filter = addr;
        self
    }

    /// Set the capture channel capacity (in segments)
    pub fn channel_capacity(mut self, capacity: usize) -> Self {
        self.config.channel_capacity = capacity.max(1);
        self
    }

    /// Set the size basis
    pub fn size_basis(mut self, basis: SizeBasis) -> Self {
        self.config.size_basis = basis;
        self
    }

    /// Set the per-client partial request limit (in bytes)
    pub fn max_partial_bytes(mut self, size: usize) -> Self {
        self.config.max_partial_bytes = size;
        self
    }

    /// Emit pending sessions at end of capture
    pub fn flush_pending_on_end(mut self, flush: bool) -> Self {
        self.config.flush_pending_on_end = flush;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
