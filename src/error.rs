//! Error types for resp-sniffer
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

use crate::flow::ClientKey;

/// Result type alias using SnifferError
pub type Result<T> = std::result::Result<T, SnifferError>;

/// Unified error type for resp-sniffer operations
#[derive(Debug, Error)]
pub enum SnifferError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Capture Errors
    // -------------------------------------------------------------------------
    #[error("Capture error: {0}")]
    Capture(String),

    #[error("Packet decode error: {0}")]
    Decode(String),

    // -------------------------------------------------------------------------
    // Reconstruction Errors (contained per client by the engine)
    // -------------------------------------------------------------------------
    #[error("Malformed request header from {client}: {line:?}")]
    MalformedHeader { client: ClientKey, line: String },

    #[error("Partial request from {client} exceeded {size} bytes")]
    RequestOverflow { client: ClientKey, size: usize },

    // -------------------------------------------------------------------------
    // Output Errors
    // -------------------------------------------------------------------------
    #[error("Serialization error: {0}")]
    Serialization(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl SnifferError {
    /// Whether the error only affects a single client's in-progress request
    pub fn is_flow_local(&self) -> bool {
        matches!(
            self,
            SnifferError::MalformedHeader { .. } | SnifferError::RequestOverflow { .. }
        )
    }

    /// Whether the error is the output consumer going away (e.g. `| head`)
    pub fn is_broken_pipe(&self) -> bool {
        matches!(self, SnifferError::Io(e) if e.kind() == std::io::ErrorKind::BrokenPipe)
    }
}
