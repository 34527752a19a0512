//! Transaction Expansion Tests

use bytes::Bytes;
use resp_sniffer::protocol::expand_transaction;

fn words(tokens: &[&str]) -> Vec<Bytes> {
    tokens.iter().map(|t| Bytes::copy_from_slice(t.as_bytes())).collect()
}

#[test]
fn test_single_subcommand() {
    let lines = words(&["MULTI", "*2", "$3", "SET", "$1", "a", "*1", "EXEC"]);
    assert_eq!(expand_transaction(&lines), "MULTI SET a / EXEC");
}

#[test]
fn test_several_subcommands() {
    let lines = words(&[
        "MULTI", "*3", "$3", "SET", "$1", "k", "$1", "v", "*2", "$3", "GET", "$1", "k", "*1",
        "$4", "EXEC",
    ]);
    assert_eq!(expand_transaction(&lines), "MULTI SET k v / GET k / EXEC");
}

#[test]
fn test_no_separator_after_exec() {
    let lines = words(&["MULTI", "*1", "$4", "EXEC"]);
    assert_eq!(expand_transaction(&lines), "MULTI EXEC");
}

#[test]
fn test_arguments_outside_a_subcommand_are_dropped() {
    let lines = words(&["MULTI", "stray", "*1", "$4", "PING", "*1", "$4", "EXEC"]);
    assert_eq!(expand_transaction(&lines), "MULTI PING / EXEC");
}

#[test]
fn test_lowercase_exec_has_no_separator() {
    let lines = words(&["multi", "*1", "$4", "exec"]);
    assert_eq!(expand_transaction(&lines), "multi exec");
}

#[test]
fn test_empty_input() {
    assert_eq!(expand_transaction(&[]), "");
}
