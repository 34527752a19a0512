//! Engine Module
//!
//! The reconstruction engine that coordinates all components.
//!
//! ## Responsibilities
//! - Classify each segment as request or response
//! - Feed request payloads to the reassembler
//! - Hand completed requests and response byte counts to the correlator
//! - Contain per-client faults so one broken flow never stops the run
//!
//! ## Concurrency Model
//! Single-threaded and single-pass. The engine exclusively owns all
//! per-client state; the only thing it hands out is `Record`s, produced at
//! most once each and in the order of the packets that triggered them.

use crate::config::{Config, SizeBasis};
use crate::error::{Result, SnifferError};
use crate::flow::{classify, Direction, Segment};
use crate::session::{Correlator, Reassembler, Record};

/// Counters describing one run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stats {
    /// Segments handed to the engine
    pub segments: u64,

    /// Segments without payload
    pub empty_segments: u64,

    /// Simple and transactional requests completed
    pub requests_completed: u64,

    /// Of which MULTI ... EXEC blocks
    pub transactions_completed: u64,

    /// Records handed to the caller
    pub records_emitted: u64,

    /// Response segments with no pending session
    pub unmatched_responses: u64,

    /// Client states dropped for an unparseable header
    pub malformed_headers: u64,

    /// Client states dropped for exceeding the partial request limit
    pub overflowed_requests: u64,

    /// Partial requests abandoned at end of capture
    pub abandoned_requests: u64,

    /// Pending sessions abandoned at end of capture
    pub abandoned_sessions: u64,
}

/// The reconstruction engine
///
/// One engine per analysis run; nothing persists beyond it.
pub struct Engine {
    /// Engine configuration
    config: Config,

    /// Partial requests per client
    reassembler: Reassembler,

    /// Pending sessions per client
    correlator: Correlator,

    /// Run counters
    stats: Stats,

    /// Timestamp of the most recent segment, used for end-of-capture records
    last_timestamp: Option<f64>,
}

impl Engine {
    /// Create an engine with the given config
    pub fn new(config: Config) -> Self {
        let reassembler = Reassembler::new(config.max_partial_bytes);
        Self {
            config,
            reassembler,
            correlator: Correlator::new(),
            stats: Stats::default(),
            last_timestamp: None,
        }
    }

    /// Process one segment
    ///
    /// Returns the record closed by this segment, if any. Only a request
    /// completing for a client that already has a pending session closes one.
    pub fn process(&mut self, segment: &Segment) -> Option<Record> {
        self.stats.segments += 1;
        self.last_timestamp = Some(segment.timestamp);

        // Step 1: Classify (drops empty payloads)
        let Some((direction, client)) = classify(segment, self.config.server_port) else {
            self.stats.empty_segments += 1;
            return None;
        };

        let counted = match self.config.size_basis {
            SizeBasis::Payload => segment.payload.len(),
            SizeBasis::Frame => segment.wire_len,
        };

        match direction {
            // Step 2a: Response bytes accrue to the pending session
            Direction::Response => {
                if !self.correlator.respond(&client, counted as u64) {
                    self.stats.unmatched_responses += 1;
                    tracing::trace!(%client, bytes = counted, "response without a request, dropped");
                }
                None
            }

            // Step 2b: Request bytes go through reassembly
            Direction::Request => {
                let request = match self.reassembler.push(client, &segment.payload, counted) {
                    Ok(Some(request)) => request,
                    Ok(None) => return None,
                    Err(e) => {
                        self.record_fault(&e);
                        return None;
                    }
                };

                self.stats.requests_completed += 1;
                if request.transaction {
                    self.stats.transactions_completed += 1;
                }
                tracing::debug!(
                    %client,
                    size = request.size,
                    command = %request.command,
                    "request complete"
                );

                // Step 3: Close the prior exchange, open the new one
                let record = self.correlator.complete(segment.timestamp, request);
                if record.is_some() {
                    self.stats.records_emitted += 1;
                }
                record
            }
        }
    }

    /// End the run
    ///
    /// Partial requests are always dropped. Pending sessions are returned as
    /// records, oldest first, when `flush_pending_on_end` is set and dropped
    /// otherwise. Calling this again returns nothing.
    pub fn finish(&mut self) -> Vec<Record> {
        self.stats.abandoned_requests += self.reassembler.clear() as u64;

        let records = if self.config.flush_pending_on_end {
            let timestamp = self.last_timestamp.unwrap_or_default();
            let records = self.correlator.drain(timestamp);
            self.stats.records_emitted += records.len() as u64;
            records
        } else {
            self.stats.abandoned_sessions += self.correlator.clear() as u64;
            Vec::new()
        };

        tracing::info!(
            segments = self.stats.segments,
            requests = self.stats.requests_completed,
            transactions = self.stats.transactions_completed,
            records = self.stats.records_emitted,
            unmatched_responses = self.stats.unmatched_responses,
            malformed = self.stats.malformed_headers,
            overflowed = self.stats.overflowed_requests,
            abandoned_requests = self.stats.abandoned_requests,
            abandoned_sessions = self.stats.abandoned_sessions,
            "capture finished"
        );

        records
    }

    fn record_fault(&mut self, error: &SnifferError) {
        match error {
            SnifferError::MalformedHeader { .. } => self.stats.malformed_headers += 1,
            SnifferError::RequestOverflow { .. } => self.stats.overflowed_requests += 1,
            _ => {}
        }
        tracing::warn!("Dropping partial request: {}", error);
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// Get the run counters
    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get the reassembler (read-only)
    pub fn reassembler(&self) -> &Reassembler {
        &self.reassembler
    }

    /// Get the correlator (read-only)
    pub fn correlator(&self) -> &Correlator {
        &self.correlator
    }
}

// =============================================================================
// Lazy record stream
// =============================================================================

/// Forward-only record stream over a segment source
///
/// Pulls segments only as records are requested, so a live source blocks
/// here and nowhere else. When the source ends, any end-of-capture records
/// follow. A source error is yielded once and ends the stream without
/// flushing.
pub struct Sniffer<I> {
    engine: Engine,
    source: I,
    flushed: std::vec::IntoIter<Record>,
    done: bool,
}

impl<I> Sniffer<I>
where
    I: Iterator<Item = Result<Segment>>,
{
    pub fn new(engine: Engine, source: impl IntoIterator<IntoIter = I>) -> Self {
        Self {
            engine,
            source: source.into_iter(),
            flushed: Vec::new().into_iter(),
            done: false,
        }
    }

    /// Get the engine (read-only)
    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Consume the stream, returning the engine
    pub fn into_engine(self) -> Engine {
        self.engine
    }
}

impl<I> Iterator for Sniffer<I>
where
    I: Iterator<Item = Result<Segment>>,
{
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.done {
            match self.source.next() {
                Some(Ok(segment)) => {
                    if let Some(record) = self.engine.process(&segment) {
                        return Some(Ok(record));
                    }
                }
                Some(Err(e)) => {
                    self.done = true;
                    tracing::error!("Capture source failed: {}", e);
                    return Some(Err(e));
                }
                None => {
                    self.done = true;
                    self.flushed = self.engine.finish().into_iter();
                }
            }
        }
        self.flushed.next().map(Ok)
    }
}
