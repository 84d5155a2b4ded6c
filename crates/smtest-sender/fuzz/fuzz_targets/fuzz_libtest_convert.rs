// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Fuzz target for libtest JSON conversion
//!
//! Converts arbitrary libtest output and replays the result, so every tree
//! the converter builds is also scanned and run.

#![no_main]

use libfuzzer_sys::fuzz_target;

use smtest_sender::libtest::{DEFAULT_ROOT_NAME, convert};
use smtest_sender::{Replayer, SmTestSender, ThresholdSetting};

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };
    if let Ok(events) = convert(input, DEFAULT_ROOT_NAME) {
        let sender = SmTestSender::new(std::io::sink()).with_threshold(ThresholdSetting::Fixed(10_000));
        let mut replayer = Replayer::new(sender);
        let _ = replayer.apply_all(events);
    }
});
