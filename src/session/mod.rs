//! Session Module
//!
//! Per-client reconstruction state.
//!
//! ## Lifecycle of one client key
//! ```text
//!            request completes              next request completes
//!   NONE ─────────────────────► PENDING ───────────────────────────► PENDING'
//!                                 │  ▲              (emits PENDING)
//!                  response bytes │  │
//!                                 └──┘
//! ```
//!
//! - `Reassembler` owns the partial request buffers and byte counters
//! - `Correlator` owns the pending sessions and emits `Record`s
//!
//! Anything still buffered or pending when the capture ends is dropped
//! unless the engine is configured to flush it.

mod reassembler;
mod correlator;
mod record;

pub use reassembler::{CompletedRequest, Reassembler};
pub use correlator::{Correlator, PendingSession};
pub use record::Record;
