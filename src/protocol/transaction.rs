//! Transaction expansion
//!
//! Turns the lines of a MULTI ... EXEC block into one readable string with
//! sub-commands separated by `/`.

use bytes::Bytes;

use super::request::{parse_array_len, parse_bulk_len, EXEC};

/// Separator between sub-commands
const SEPARATOR: &str = "/";

/// Linearise a transaction starting at its `MULTI` line
///
/// `*N` lines set how many arguments the next sub-command has, `$len` lines
/// are dropped, and every other line is an argument. A separator follows the
/// last argument of each sub-command except `EXEC`. Arguments arriving while
/// no sub-command is open are dropped.
pub fn expand_transaction(lines: &[Bytes]) -> String {
    let Some((multi, rest)) = lines.split_first() else {
        return String::new();
    };

    let mut tokens: Vec<String> = vec![String::from_utf8_lossy(multi).into_owned()];
    let mut expected = 0usize;

    for line in rest {
        if let Some(n) = parse_array_len(line) {
            expected = n;
            continue;
        }
        if parse_bulk_len(line).is_some() {
            continue;
        }
        if expected == 0 {
            continue;
        }

        tokens.push(String::from_utf8_lossy(line).into_owned());
        expected -= 1;
        if expected == 0 && !line.eq_ignore_ascii_case(EXEC) {
            tokens.push(SEPARATOR.to_string());
        }
    }

    tokens.join(" ")
}
