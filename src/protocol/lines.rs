//! Line tokenizer
//!
//! Append-only buffer that turns an arbitrarily segmented byte stream into
//! CRLF-terminated lines. Bytes after the last terminator are held back as
//! an unterminated tail until the rest of the line arrives, and already
//! scanned bytes are never scanned twice.

use bytes::{Buf, Bytes, BytesMut};

/// Protocol line terminator
pub const CRLF: &[u8] = b"\r\n";

/// Completed lines plus the unterminated remainder of one flow
#[derive(Debug, Default, Clone)]
pub struct LineBuffer {
    /// Lines with the terminator stripped, in arrival order
    lines: Vec<Bytes>,

    /// Bytes not yet followed by a terminator
    tail: BytesMut,

    /// Offset in `tail` where the next terminator search starts
    cursor: usize,

    /// Total bytes appended since the last clear
    appended: usize,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append raw bytes, returning how many new lines were completed
    pub fn push(&mut self, data: &[u8]) -> usize {
        self.tail.extend_from_slice(data);
        self.appended += data.len();

        let mut completed = 0;
        while let Some(pos) = find_crlf(&self.tail[self.cursor..]) {
            let end = self.cursor + pos;
            let line = self.tail.split_to(end).freeze();
            self.tail.advance(CRLF.len());
            self.cursor = 0;

            tracing::trace!(len = line.len(), "line complete");
            self.lines.push(line);
            completed += 1;
        }

        // A trailing '\r' may be the first half of a terminator
        self.cursor = self.tail.len().saturating_sub(1);
        completed
    }

    /// Completed lines
    pub fn lines(&self) -> &[Bytes] {
        &self.lines
    }

    /// Number of completed lines
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty() && self.tail.is_empty()
    }

    /// Whether bytes are waiting for a terminator
    pub fn has_tail(&self) -> bool {
        !self.tail.is_empty()
    }

    /// Bytes appended since the last clear
    pub fn appended_bytes(&self) -> usize {
        self.appended
    }

    /// Drop everything, including any unterminated tail
    pub fn clear(&mut self) {
        self.lines.clear();
        self.tail.clear();
        self.cursor = 0;
        self.appended = 0;
    }
}

fn find_crlf(haystack: &[u8]) -> Option<usize> {
    haystack.windows(CRLF.len()).position(|w| w == CRLF)
}
