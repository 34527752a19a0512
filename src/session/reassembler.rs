//! Request reassembly
//!
//! Collects request-direction payloads per client until the buffered lines
//! form one whole request.

use std::collections::HashMap;

use crate::error::{Result, SnifferError};
use crate::flow::ClientKey;
use crate::protocol::{analyze, Completion, LineBuffer};

/// A request whose last byte has arrived
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedRequest {
    pub client: ClientKey,

    /// Decoded command text
    pub command: String,

    /// Bytes counted across every segment of the request
    pub size: u64,

    /// Whether the request was a MULTI ... EXEC block
    pub transaction: bool,
}

/// In-progress request of one client
#[derive(Debug, Default)]
struct PartialRequest {
    lines: LineBuffer,
    size: u64,
}

/// Owns every client's partial request buffer and byte counter
#[derive(Debug)]
pub struct Reassembler {
    partials: HashMap<ClientKey, PartialRequest>,

    /// Largest partial request kept before the client's state is dropped
    max_partial_bytes: usize,
}

impl Reassembler {
    pub fn new(max_partial_bytes: usize) -> Self {
        Self {
            partials: HashMap::new(),
            max_partial_bytes,
        }
    }

    /// Feed one request-direction payload
    ///
    /// `counted` is what the payload adds to the request size; it differs
    /// from `payload.len()` when whole frames are being counted.
    ///
    /// Returns `Ok(None)` while the request is incomplete. On a malformed
    /// header or an oversized partial request, this client's state is
    /// dropped before the error is returned; other clients are unaffected.
    pub fn push(
        &mut self,
        client: ClientKey,
        payload: &[u8],
        counted: usize,
    ) -> Result<Option<CompletedRequest>> {
        let partial = self.partials.entry(client).or_default();
        partial.lines.push(payload);
        partial.size += counted as u64;

        let buffered = partial.lines.appended_bytes();
        if buffered > self.max_partial_bytes {
            self.partials.remove(&client);
            return Err(SnifferError::RequestOverflow {
                client,
                size: self.max_partial_bytes,
            });
        }

        let completion = match analyze(partial.lines.lines()) {
            Ok(completion) => completion,
            Err(fault) => {
                self.partials.remove(&client);
                return Err(SnifferError::MalformedHeader {
                    client,
                    line: fault.line,
                });
            }
        };

        let (command, transaction) = match completion {
            Completion::Pending => {
                tracing::trace!(
                    %client,
                    lines = partial.lines.len(),
                    bytes = buffered,
                    "request incomplete, buffering"
                );
                return Ok(None);
            }
            Completion::Simple(command) => (command, false),
            Completion::Transaction(command) => (command, true),
        };

        let size = partial.size;
        if partial.lines.has_tail() {
            tracing::debug!(%client, "discarding bytes trailing a completed request");
        }
        self.partials.remove(&client);

        Ok(Some(CompletedRequest {
            client,
            command,
            size,
            transaction,
        }))
    }

    /// Drop a client's partial request, returning whether one existed
    pub fn discard(&mut self, client: &ClientKey) -> bool {
        self.partials.remove(client).is_some()
    }

    /// Drop every partial request, returning how many there were
    pub fn clear(&mut self) -> usize {
        let count = self.partials.len();
        self.partials.clear();
        count
    }

    /// Number of clients with a request in progress
    pub fn in_progress(&self) -> usize {
        self.partials.len()
    }

    /// Complete lines buffered for a client, if any
    pub fn buffered_lines(&self, client: &ClientKey) -> Option<usize> {
        self.partials.get(client).map(|p| p.lines.len())
    }

    /// Bytes counted so far for a client's in-progress request
    pub fn buffered_size(&self, client: &ClientKey) -> Option<u64> {
        self.partials.get(client).map(|p| p.size)
    }
}
