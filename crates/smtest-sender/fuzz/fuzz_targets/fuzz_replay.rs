// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Fuzz target for recorded run replay
//!
//! This fuzzes `replay`, which parses newline-delimited lifecycle events
//! and drives a sender with them.

#![no_main]

use libfuzzer_sys::fuzz_target;

use smtest_sender::replay;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        // Malformed records and unknown ids must surface as errors, not panics
        let _ = replay(input, std::io::sink());
    }
});
