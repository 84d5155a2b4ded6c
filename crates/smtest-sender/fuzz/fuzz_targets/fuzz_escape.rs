// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Fuzz target for attribute escaping
//!
//! An escaped value must never contain a bare line break or an unescaped
//! closing bracket.

#![no_main]

use libfuzzer_sys::fuzz_target;

use smtest_sender::message::escape;

fuzz_target!(|data: &[u8]| {
    let Ok(value) = std::str::from_utf8(data) else {
        return;
    };
    let escaped = escape(value);
    assert!(!escaped.contains('\n'));
    assert!(!escaped.contains('\r'));

    let mut chars = escaped.chars();
    while let Some(c) = chars.next() {
        match c {
            '|' => {
                assert!(chars.next().is_some(), "dangling escape in {escaped:?}");
            }
            '\'' | '[' | ']' => panic!("unescaped {c:?} in {escaped:?}"),
            _ => {}
        }
    }
});
