//! Best-effort call-site recovery from stack traces.

use lazy_static::lazy_static;
use regex::Regex;

use crate::{SourceLocation, BRIDGE_SOURCE};

/// Parse the first usable `file:line:column` frame out of `stack`, skipping
/// frames that belong to the bridge itself. Returns `None` rather than a
/// wrong location when nothing parses.
///
/// Handles both common frame shapes:
/// `at handler (/main.js:3:7)` and `handler@/main.js:3:7`.
pub fn parse_location(stack: &str) -> Option<SourceLocation> {
    lazy_static! {
        static ref FRAME: Regex =
            Regex::new(r"([^\s()@]+):([0-9]+):([0-9]+)\)?\s*$").unwrap();
    }

    for line in stack.lines() {
        let line = line.trim();
        if line.is_empty() || line.contains(BRIDGE_SOURCE) {
            continue;
        }

        let Some(captures) = FRAME.captures(line) else {
            continue;
        };
        let file = captures[1].trim_end_matches(')').to_string();
        if file.is_empty() {
            continue;
        }
        let (Ok(line_no), Ok(column)) = (captures[2].parse(), captures[3].parse()) else {
            continue;
        };

        return Some(SourceLocation {
            file,
            line: line_no,
            column,
        });
    }

    None
}
