// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! CLI tests for smtest-report
//!
//! These tests verify flag parsing, the logging level flags and their
//! interaction, and how the threshold flag maps onto the classifier.

use clap::Parser;
use proptest::prelude::*;
use smtest_report::config::{Config, InputFormat};
use smtest_sender::ThresholdSetting;
use tracing::Level;

// ============================================================================
// Input and output flags
// ============================================================================

#[test]
fn test_input_and_output_flags() {
    let config = Config::try_parse_from(["smtest-report", "-i", "run.jsonl", "--output", "out.txt"])
        .expect("parse should succeed");
    assert_eq!(config.input.as_deref(), Some(std::path::Path::new("run.jsonl")));
    assert_eq!(config.output.as_deref(), Some(std::path::Path::new("out.txt")));
}

#[test]
fn test_format_values() {
    let config =
        Config::try_parse_from(["smtest-report", "--format", "libtest"]).expect("parse should succeed");
    assert_eq!(config.format, InputFormat::Libtest);

    let config = Config::try_parse_from(["smtest-report", "-f", "replay"]).expect("parse should succeed");
    assert_eq!(config.format, InputFormat::Replay);
}

#[test]
fn test_unknown_format_rejected() {
    let result = Config::try_parse_from(["smtest-report", "--format", "junit-xml"]);
    assert!(result.is_err(), "Only replay and libtest are accepted");
}

#[test]
fn test_root_name_flag() {
    let config =
        Config::try_parse_from(["smtest-report", "-r", "my_crate"]).expect("parse should succeed");
    assert_eq!(config.root_name(), "my_crate");
}

// ============================================================================
// Threshold flag
// ============================================================================

#[test]
fn test_threshold_absent_reads_environment() {
    let config = Config::try_parse_from(["smtest-report"]).expect("parse should succeed");
    assert_eq!(config.threshold(), ThresholdSetting::Environment);
}

#[test]
fn test_threshold_rejects_negative() {
    let result = Config::try_parse_from(["smtest-report", "--message-length-threshold", "-5"]);
    assert!(result.is_err());
}

proptest! {
    #[test]
    fn prop_threshold_flag_is_fixed(value in 0usize..1_000_000) {
        let text = value.to_string();
        let config = Config::try_parse_from(["smtest-report", "--message-length-threshold", text.as_str()])
            .expect("parse should succeed");
        prop_assert_eq!(config.threshold(), ThresholdSetting::Fixed(value));
    }
}

// ============================================================================
// Logging flags
// ============================================================================

#[test]
fn test_verbose_short_flag_v() {
    let config = Config::try_parse_from(["smtest-report", "-v"]).expect("parse should succeed");
    assert!(config.verbose);
    assert!(!config.quiet);
    assert_eq!(config.log_level(), Level::DEBUG);
}

#[test]
fn test_quiet_long_flag() {
    let config = Config::try_parse_from(["smtest-report", "--quiet"]).expect("parse should succeed");
    assert!(config.quiet);
    assert_eq!(config.log_level(), Level::WARN);
}

#[test]
fn test_verbose_flag_value_syntax_not_supported() {
    // Boolean flags are toggled by presence only
    let result = Config::try_parse_from(["smtest-report", "--verbose=true"]);
    assert!(result.is_err(), "Boolean flags don't support =value syntax");
}

#[test]
fn test_no_flags_means_info_level() {
    let config = Config::try_parse_from(["smtest-report"]).expect("parse should succeed");
    assert_eq!(config.log_level(), Level::INFO);
}

#[test]
fn test_verbose_and_quiet_flags_both_parse() {
    let config = Config::try_parse_from(["smtest-report", "-q", "-v"]).expect("parse should succeed");
    assert!(config.verbose);
    assert!(config.quiet);
    // Verbose wins
    assert_eq!(config.log_level(), Level::DEBUG);
}
