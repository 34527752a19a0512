//! Tests for the request reassembler
//!
//! These tests verify:
//! - Single-segment and multi-segment simple commands
//! - Transactions split at every byte boundary
//! - Byte counters across segments
//! - Per-client isolation and fault containment

use resp_sniffer::flow::ClientKey;
use resp_sniffer::session::Reassembler;
use resp_sniffer::SnifferError;

// =============================================================================
// Helper Functions
// =============================================================================

const LIMIT: usize = 1024 * 1024;

fn client(port: u16) -> ClientKey {
    ClientKey::new("10.0.0.1".parse().unwrap(), port)
}

const SET: &[u8] = b"*3\r\n$3\r\nSET\r\n$3\r\nkey\r\n$5\r\nvalue\r\n";

const MULTI_SET: &[u8] = b"*1\r\n$5\r\nMULTI\r\n*3\r\n$3\r\nSET\r\n$1\r\na\r\n$1\r\nb\r\n*1\r\n$4\r\nEXEC\r\n";

// =============================================================================
// Simple Command Tests
// =============================================================================

#[test]
fn test_single_segment_command() {
    let mut reassembler = Reassembler::new(LIMIT);
    let request = reassembler.push(client(1), SET, SET.len()).unwrap().unwrap();

    assert_eq!(request.command, "SET key value");
    assert_eq!(request.size, SET.len() as u64);
    assert!(!request.transaction);
    assert_eq!(reassembler.in_progress(), 0);
}

#[test]
fn test_split_at_every_line_boundary() {
    let line_ends: Vec<usize> = SET
        .windows(2)
        .enumerate()
        .filter(|(_, w)| *w == b"\r\n")
        .map(|(i, _)| i + 2)
        .collect();

    for &split in &line_ends[..line_ends.len() - 1] {
        let mut reassembler = Reassembler::new(LIMIT);
        let (first, second) = SET.split_at(split);

        assert!(reassembler.push(client(1), first, first.len()).unwrap().is_none());
        let request = reassembler
            .push(client(1), second, second.len())
            .unwrap()
            .expect("request should complete on the second segment");

        assert_eq!(request.command, "SET key value", "split at {}", split);
        assert_eq!(request.size, (first.len() + second.len()) as u64);
    }
}

#[test]
fn test_split_mid_line() {
    let mut reassembler = Reassembler::new(LIMIT);
    assert!(reassembler.push(client(1), &SET[..10], 10).unwrap().is_none());
    let request = reassembler
        .push(client(1), &SET[10..], SET.len() - 10)
        .unwrap()
        .unwrap();

    assert_eq!(request.command, "SET key value");
}

#[test]
fn test_counted_size_is_caller_supplied() {
    let mut reassembler = Reassembler::new(LIMIT);
    reassembler.push(client(1), &SET[..8], 62).unwrap();
    let request = reassembler.push(client(1), &SET[8..], 80).unwrap().unwrap();

    assert_eq!(request.size, 142);
}

#[test]
fn test_length_mismatch_stays_buffered() {
    let mut reassembler = Reassembler::new(LIMIT);
    let payload = b"*2\r\n$3\r\nGET\r\n$9\r\nshort\r\n";

    assert!(reassembler.push(client(1), payload, payload.len()).unwrap().is_none());
    assert_eq!(reassembler.buffered_lines(&client(1)), Some(5));
    assert_eq!(reassembler.buffered_size(&client(1)), Some(payload.len() as u64));
}

// =============================================================================
// Transaction Tests
// =============================================================================

#[test]
fn test_transaction_split_at_every_byte() {
    for split in 1..MULTI_SET.len() {
        let mut reassembler = Reassembler::new(LIMIT);
        let (first, second) = MULTI_SET.split_at(split);

        assert!(
            reassembler.push(client(1), first, first.len()).unwrap().is_none(),
            "completed early at split {}",
            split
        );
        let request = reassembler
            .push(client(1), second, second.len())
            .unwrap()
            .expect("transaction should complete");

        assert_eq!(request.command, "MULTI SET a b / EXEC");
        assert!(request.transaction);
        assert_eq!(request.size, MULTI_SET.len() as u64);
    }
}

#[test]
fn test_transaction_one_byte_per_segment() {
    let mut reassembler = Reassembler::new(LIMIT);
    let mut completed = Vec::new();
    for byte in MULTI_SET {
        if let Some(request) = reassembler.push(client(1), std::slice::from_ref(byte), 1).unwrap() {
            completed.push(request);
        }
    }

    assert_eq!(completed.len(), 1);
    assert_eq!(completed[0].command, "MULTI SET a b / EXEC");
    assert_eq!(completed[0].size, MULTI_SET.len() as u64);
}

// =============================================================================
// Isolation and Fault Tests
// =============================================================================

#[test]
fn test_clients_are_independent() {
    let mut reassembler = Reassembler::new(LIMIT);
    assert!(reassembler.push(client(1), &SET[..12], 12).unwrap().is_none());
    assert!(reassembler.push(client(2), &SET[..20], 20).unwrap().is_none());
    assert_eq!(reassembler.in_progress(), 2);

    let first = reassembler.push(client(1), &SET[12..], SET.len() - 12).unwrap().unwrap();
    assert_eq!(first.client, client(1));
    assert_eq!(reassembler.in_progress(), 1);

    let second = reassembler.push(client(2), &SET[20..], SET.len() - 20).unwrap().unwrap();
    assert_eq!(second.client, client(2));
    assert_eq!(reassembler.in_progress(), 0);
}

#[test]
fn test_malformed_header_drops_only_that_client() {
    let mut reassembler = Reassembler::new(LIMIT);
    reassembler.push(client(2), &SET[..12], 12).unwrap();

    let err = reassembler.push(client(1), b"GET foo\r\n", 9).unwrap_err();
    match &err {
        SnifferError::MalformedHeader { client: c, line } => {
            assert_eq!(*c, client(1));
            assert_eq!(line, "GET foo");
        }
        other => panic!("Expected MalformedHeader, got {:?}", other),
    }
    assert!(err.is_flow_local());

    assert_eq!(reassembler.buffered_lines(&client(1)), None);
    assert_eq!(reassembler.buffered_lines(&client(2)), Some(2));

    // The faulted client recovers on its next well-formed request
    let request = reassembler.push(client(1), SET, SET.len()).unwrap().unwrap();
    assert_eq!(request.command, "SET key value");
}

#[test]
fn test_overflow_drops_client_state() {
    let mut reassembler = Reassembler::new(32);
    let payload = b"*1\r\n$5\r\nMULTI\r\n*2\r\n$3\r\nGET\r\n";
    reassembler.push(client(1), payload, payload.len()).unwrap();

    let err = reassembler.push(client(1), payload, payload.len()).unwrap_err();
    assert!(matches!(err, SnifferError::RequestOverflow { size: 32, .. }));
    assert_eq!(reassembler.in_progress(), 0);
}

#[test]
fn test_discard_and_clear() {
    let mut reassembler = Reassembler::new(LIMIT);
    reassembler.push(client(1), &SET[..5], 5).unwrap();
    reassembler.push(client(2), &SET[..5], 5).unwrap();

    assert!(reassembler.discard(&client(1)));
    assert!(!reassembler.discard(&client(1)));
    assert_eq!(reassembler.clear(), 1);
    assert_eq!(reassembler.in_progress(), 0);
}
