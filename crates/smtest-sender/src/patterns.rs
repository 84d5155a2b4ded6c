// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Expected/actual extraction from plain failure messages
//!
//! Assertion libraries that do not throw a structured comparison failure
//! still tend to phrase their messages in a handful of fixed shapes. The
//! patterns below are tried in order and the first match wins:
//!
//! | Source                | Shape                                   |
//! |-----------------------|-----------------------------------------|
//! | JUnit 3/4             | `expected:<X> but was:<Y>`              |
//! | JUnit `assertSame`    | `expected same:<X> was not:<Y>`         |
//! | JUnit 5               | `expected: <X> but was: <Y>`            |
//! | TestNG                | `expected [X] but found [Y]`            |
//! | Hamcrest              | `Expected: X` / `but: was Y`            |
//! | Rust `assert_eq!`     | `left: X` / `right: Y` (left = expected) |

use std::sync::LazyLock;

use regex::Regex;
use tracing::warn;

use crate::throwable::ComparisonValues;

const PATTERN_SOURCES: &[&str] = &[
    r"(?s)expected:<(.*)> but was:<(.*)>",
    r"(?s)expected same:<(.*)> was not:<(.*)>",
    r"(?s)expected: <(.*)> but was: <(.*)>",
    r"(?s)expected \[(.*)\] but found \[(.*)\]",
    r"(?m)Expected: (.*)$\s*but: was (.*)$",
    r"(?m)^\s*left: `?(.*?)`?,?$\s*right: `?(.*?)`?$",
];

static PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    PATTERN_SOURCES
        .iter()
        .filter_map(|source| match Regex::new(source) {
            Ok(regex) => Some(regex),
            Err(e) => {
                warn!(pattern = source, error = %e, "Skipping invalid failure pattern");
                None
            }
        })
        .collect()
});

/// Try to read an expected/actual pair out of a failure message
///
/// Returns `None` when no known shape matches.
#[must_use]
pub fn extract(message: &str) -> Option<ComparisonValues> {
    PATTERNS.iter().find_map(|regex| {
        let captures = regex.captures(message)?;
        let expected = captures.get(1)?.as_str();
        let actual = captures.get(2)?.as_str();
        Some(ComparisonValues::new(expected, actual))
    })
}
