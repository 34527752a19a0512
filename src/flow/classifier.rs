//! Flow classifier

use super::{ClientKey, Direction, Segment};

/// Classify a segment against the server port
///
/// Returns `None` for segments without payload (pure ACKs, SYN/FIN), which
/// must not touch any flow state.
pub fn classify(segment: &Segment, server_port: u16) -> Option<(Direction, ClientKey)> {
    if segment.is_empty() {
        return None;
    }

    if segment.src.port() == server_port {
        Some((Direction::Response, ClientKey::from(segment.dst)))
    } else {
        Some((Direction::Request, ClientKey::from(segment.src)))
    }
}
