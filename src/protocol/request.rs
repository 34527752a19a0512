//! Request grammar
//!
//! Decides, from the complete lines buffered so far, whether they form one
//! whole request and decodes it to text.

use bytes::Bytes;
use thiserror::Error;

use super::transaction::expand_transaction;

/// Array header marker (`*N`)
const ARRAY_MARKER: u8 = b'*';

/// Bulk string length marker (`$len`)
const BULK_MARKER: u8 = b'$';

/// Opens a transaction
pub const MULTI: &[u8] = b"MULTI";

/// Closes a transaction
pub const EXEC: &[u8] = b"EXEC";

/// A header line that the grammar requires to be numeric is not
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed header line {line:?}")]
pub struct MalformedHeader {
    pub line: String,
}

impl MalformedHeader {
    fn new(line: &[u8]) -> Self {
        Self {
            line: String::from_utf8_lossy(line).into_owned(),
        }
    }
}

/// Outcome of testing buffered lines for a whole request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    /// More segments are needed
    Pending,

    /// A single command; text is its arguments joined by spaces
    Simple(String),

    /// A MULTI ... EXEC block, linearised by `expand_transaction`
    Transaction(String),
}

impl Completion {
    pub fn is_complete(&self) -> bool {
        !matches!(self, Completion::Pending)
    }
}

/// Parse an `*N` array header
pub fn parse_array_len(line: &[u8]) -> Option<usize> {
    parse_prefixed(line, ARRAY_MARKER)
}

/// Parse a `$len` bulk length header
pub fn parse_bulk_len(line: &[u8]) -> Option<usize> {
    parse_prefixed(line, BULK_MARKER)
}

fn parse_prefixed(line: &[u8], marker: u8) -> Option<usize> {
    let (&first, digits) = line.split_first()?;
    if first != marker || digits.is_empty() || !digits.iter().all(u8::is_ascii_digit) {
        return None;
    }
    std::str::from_utf8(digits).ok()?.parse().ok()
}

/// Index of the `MULTI` token if the request opens a transaction
///
/// The token is the first line after the array header, skipping the bulk
/// length line that precedes it on the wire when present.
fn multi_index(lines: &[Bytes]) -> Option<usize> {
    let idx = match lines.get(1) {
        Some(line) if parse_bulk_len(line).is_some() => 2,
        Some(_) => 1,
        None => return None,
    };
    lines
        .get(idx)
        .filter(|line| line.eq_ignore_ascii_case(MULTI))
        .map(|_| idx)
}

/// Whether the buffered lines open a transaction
pub fn is_transaction(lines: &[Bytes]) -> bool {
    multi_index(lines).is_some()
}

/// Text of a complete simple command: every value line, space separated
pub fn decode_simple(lines: &[Bytes]) -> String {
    lines
        .iter()
        .skip(2)
        .step_by(2)
        .map(|value| String::from_utf8_lossy(value))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Test buffered lines for a complete request
///
/// Transactions are checked first so that a lone `MULTI` segment, which is
/// also a well-formed one element array, keeps buffering until `EXEC`.
pub fn analyze(lines: &[Bytes]) -> Result<Completion, MalformedHeader> {
    let Some(header) = lines.first() else {
        return Ok(Completion::Pending);
    };
    let n_args = parse_array_len(header).ok_or_else(|| MalformedHeader::new(header))?;

    if let Some(idx) = multi_index(lines) {
        let closed = lines
            .last()
            .is_some_and(|line| idx + 1 < lines.len() && line.eq_ignore_ascii_case(EXEC));
        return Ok(if closed {
            Completion::Transaction(expand_transaction(&lines[idx..]))
        } else {
            Completion::Pending
        });
    }

    if n_args == 0 {
        return Ok(if lines.len() == 1 {
            Completion::Simple(String::new())
        } else {
            Completion::Pending
        });
    }

    // A count whose line total does not fit in usize can never complete
    let expected = n_args
        .checked_mul(2)
        .and_then(|n| n.checked_add(1))
        .ok_or_else(|| MalformedHeader::new(header))?;
    if lines.len() != expected {
        return Ok(Completion::Pending);
    }

    // Guards against a value holding an embedded terminator
    let len_line = &lines[lines.len() - 2];
    let declared = parse_bulk_len(len_line).ok_or_else(|| MalformedHeader::new(len_line))?;
    if declared != lines[lines.len() - 1].len() {
        return Ok(Completion::Pending);
    }

    Ok(Completion::Simple(decode_simple(lines)))
}
