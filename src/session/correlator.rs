//! Session correlation
//!
//! Pairs each completed request with the response bytes that follow it and
//! emits the pair once the client's next request completes.

use std::collections::HashMap;

use crate::flow::ClientKey;

use super::{CompletedRequest, Record};

/// A completed request still collecting response bytes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSession {
    pub command: String,
    pub request_size: u64,
    pub response_size: u64,

    /// Install order, used to flush deterministically
    seq: u64,
}

impl PendingSession {
    fn into_record(self, timestamp: f64, client: ClientKey) -> Record {
        Record {
            timestamp,
            client,
            request_size: self.request_size,
            response_size: self.response_size,
            command: self.command,
        }
    }
}

/// Owns every client's pending session
#[derive(Debug, Default)]
pub struct Correlator {
    pending: HashMap<ClientKey, PendingSession>,
    next_seq: u64,
}

impl Correlator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a completed request as the client's pending session
    ///
    /// A session already pending for the same client is closed and returned
    /// as a record stamped with `timestamp`.
    pub fn complete(&mut self, timestamp: f64, request: CompletedRequest) -> Option<Record> {
        let client = request.client;
        let session = PendingSession {
            command: request.command,
            request_size: request.size,
            response_size: 0,
            seq: self.next_seq,
        };
        self.next_seq += 1;

        self.pending
            .insert(client, session)
            .map(|prior| prior.into_record(timestamp, client))
    }

    /// Add response bytes to the client's pending session
    ///
    /// Returns `false` when nothing is pending, in which case the bytes
    /// belong to a request that was never captured and are ignored.
    pub fn respond(&mut self, client: &ClientKey, len: u64) -> bool {
        match self.pending.get_mut(client) {
            Some(session) => {
                session.response_size += len;
                true
            }
            None => false,
        }
    }

    /// Close every pending session, oldest first
    pub fn drain(&mut self, timestamp: f64) -> Vec<Record> {
        let mut sessions: Vec<_> = self.pending.drain().collect();
        sessions.sort_by_key(|(_, session)| session.seq);
        sessions
            .into_iter()
            .map(|(client, session)| session.into_record(timestamp, client))
            .collect()
    }

    /// Drop every pending session, returning how many there were
    pub fn clear(&mut self) -> usize {
        let count = self.pending.len();
        self.pending.clear();
        count
    }

    pub fn pending(&self, client: &ClientKey) -> Option<&PendingSession> {
        self.pending.get(client)
    }

    /// Number of clients with a pending session
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
