//! Tests for the session correlator
//!
//! These tests verify:
//! - A record is only emitted when the client's next request completes
//! - Response bytes accrue to the pending session
//! - Unmatched responses are ignored
//! - End-of-capture draining order

use resp_sniffer::flow::ClientKey;
use resp_sniffer::session::{CompletedRequest, Correlator};

// =============================================================================
// Helper Functions
// =============================================================================

fn client(port: u16) -> ClientKey {
    ClientKey::new("1.2.3.4".parse().unwrap(), port)
}

fn request(port: u16, command: &str, size: u64) -> CompletedRequest {
    CompletedRequest {
        client: client(port),
        command: command.to_string(),
        size,
        transaction: false,
    }
}

// =============================================================================
// Emission Tests
// =============================================================================

#[test]
fn test_first_request_emits_nothing() {
    let mut correlator = Correlator::new();
    assert!(correlator.complete(10.0, request(5555, "GET a", 50)).is_none());
    assert_eq!(correlator.len(), 1);
}

#[test]
fn test_next_request_closes_prior_session() {
    let mut correlator = Correlator::new();
    correlator.complete(10.0, request(5555, "GET a", 50));
    assert!(correlator.respond(&client(5555), 30));

    let record = correlator.complete(12.0, request(5555, "GET b", 40)).unwrap();
    assert_eq!(record.timestamp, 12.0);
    assert_eq!(record.client, client(5555));
    assert_eq!(record.request_size, 50);
    assert_eq!(record.response_size, 30);
    assert_eq!(record.command, "GET a");

    // The new request is now the pending one
    let pending = correlator.pending(&client(5555)).unwrap();
    assert_eq!(pending.command, "GET b");
    assert_eq!(pending.request_size, 40);
    assert_eq!(pending.response_size, 0);
}

#[test]
fn test_no_response_emits_zero_size() {
    let mut correlator = Correlator::new();
    correlator.complete(1.0, request(5555, "SUBSCRIBE x", 10));
    let record = correlator.complete(2.0, request(5555, "PING", 14)).unwrap();

    assert_eq!(record.response_size, 0);
}

#[test]
fn test_response_bytes_accumulate() {
    let mut correlator = Correlator::new();
    correlator.complete(1.0, request(5555, "LRANGE l 0 -1", 10));
    correlator.respond(&client(5555), 1400);
    correlator.respond(&client(5555), 1400);
    correlator.respond(&client(5555), 200);

    assert_eq!(correlator.pending(&client(5555)).unwrap().response_size, 3000);
}

#[test]
fn test_response_without_request_is_ignored() {
    let mut correlator = Correlator::new();
    assert!(!correlator.respond(&client(5555), 30));
    assert!(correlator.is_empty());
}

#[test]
fn test_clients_do_not_share_sessions() {
    let mut correlator = Correlator::new();
    correlator.complete(1.0, request(1, "GET a", 10));
    correlator.complete(1.5, request(2, "GET b", 10));
    correlator.respond(&client(2), 99);

    let record = correlator.complete(2.0, request(1, "GET c", 10)).unwrap();
    assert_eq!(record.command, "GET a");
    assert_eq!(record.response_size, 0);
    assert_eq!(correlator.pending(&client(2)).unwrap().response_size, 99);
}

// =============================================================================
// End-of-Capture Tests
// =============================================================================

#[test]
fn test_drain_in_install_order() {
    let mut correlator = Correlator::new();
    for port in [9, 3, 7, 1, 5] {
        correlator.complete(port as f64, request(port, &format!("GET {}", port), 10));
    }
    correlator.respond(&client(7), 21);

    let records = correlator.drain(100.0);
    let ports: Vec<u16> = records.iter().map(|r| r.client.port()).collect();
    assert_eq!(ports, vec![9, 3, 7, 1, 5]);
    assert!(records.iter().all(|r| r.timestamp == 100.0));
    assert_eq!(records[2].response_size, 21);
    assert!(correlator.is_empty());
}

#[test]
fn test_clear_drops_everything() {
    let mut correlator = Correlator::new();
    correlator.complete(1.0, request(1, "GET a", 10));
    correlator.complete(1.0, request(2, "GET a", 10));

    assert_eq!(correlator.clear(), 2);
    assert!(correlator.drain(2.0).is_empty());
}
