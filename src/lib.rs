//! # resp-sniffer
//!
//! Passive request/response reconstruction for a key-value server:
//! - Reads captured TCP traffic (pcap / pcapng, file or stdin)
//! - Reassembles requests split across arbitrary segment boundaries
//! - Expands MULTI ... EXEC transactions into readable text
//! - Pairs each request with the response bytes that follow it
//!
//! The connection is never touched and capture may start mid-stream.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Capture Source                            │
//! │            (pcap-parser + etherparse, filter)                │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ Segment
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                   Flow Classifier                            │
//! │              (request / response, client key)                │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │ request                 │ response
//!          ▼                         │
//!   ┌─────────────┐                  │
//!   │ Reassembler │                  │
//!   │ + MULTI/EXEC│                  │
//!   └──────┬──────┘                  │
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────────────────────────────┐
//!   │           Correlator                │
//!   │   (pending session per client)      │
//!   └─────────────────┬───────────────────┘
//!                     ▼
//!                  Record
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod flow;
pub mod protocol;
pub mod session;
pub mod capture;
pub mod output;
pub mod engine;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{Result, SnifferError};
pub use config::{Config, SizeBasis};
pub use engine::{Engine, Sniffer, Stats};
pub use flow::{ClientKey, Direction, Segment};
pub use session::Record;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of resp-sniffer
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
