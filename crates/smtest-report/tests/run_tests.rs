// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! End-to-end tests for the translation driver
//!
//! These tests run the recorded fixtures through `run` with file input and
//! output, the way the binary does.


use similar_asserts::assert_eq;
use smtest_report::config::{Config, InputFormat};
use smtest_report::run::{ReportError, Translation, run};
use smtest_sender::{Description, ReplayEvent, ThresholdSetting};
use test_utils::{TempTestDir, fixture};

fn lines_with(output: &str, prefix: &str) -> usize {
    output.lines().filter(|l| l.starts_with(prefix)).count()
}

#[test]
fn test_replay_fixture_to_file() {
    let temp = TempTestDir::new("replay_fixture");
    let config = Config {
        input: Some(fixture("sample-run.jsonl")),
        output: Some(temp.path().join("messages.txt")),
        message_length_threshold: Some(10_000),
        ..Default::default()
    };
    config.validate().expect("valid config");

    let result = run(&config).expect("run");
    assert_eq!(result.failure_count, 2);
    assert_eq!(result.ignore_count, 1);
    assert_eq!(result.assumption_failure_count, 1);
    assert!(!result.was_successful());

    let output = temp.read_file("messages.txt");
    assert_eq!(output.lines().next(), Some("##teamcity[suiteTreeStarted name='MathTest' locationHint='java:suite://com.example.MathTest']"));
    assert_eq!(
        lines_with(&output, "##teamcity[testSuiteStarted"),
        lines_with(&output, "##teamcity[testSuiteFinished")
    );
    assert!(output.ends_with("##teamcity[testSuiteFinished name='StringTest']\n"));
}

#[test]
fn test_libtest_fixture_to_file() {
    let temp = TempTestDir::new("libtest_fixture");
    let config = Config {
        input: Some(fixture("libtest-sample.jsonl")),
        output: Some(temp.path().join("messages.txt")),
        format: InputFormat::Libtest,
        root_name: "smtest_sender".to_string(),
        ..Default::default()
    };

    let result = run(&config).expect("run");
    assert_eq!(result.failure_count, 1);

    let output = temp.read_file("messages.txt");
    assert!(output.contains("##teamcity[testSuiteStarted name='stack']\n##teamcity[testSuiteStarted name='tests']\n"));
    assert!(output.contains("##teamcity[testFailed name='test_close_all_is_top_down'"));
}

#[test]
fn test_truncated_replay_reports_line() {
    let temp = TempTestDir::new("truncated");
    let tree = serde_json::to_string(&ReplayEvent::Tree {
        root: Description::suite(0, "pkg.All").with_child(Description::test(1, "pkg.All", "only")),
    })
    .expect("serialize");
    let input = temp.create_file("run.jsonl", &format!("{tree}\n{{\"event\":\"test_started\""));

    let config = Config {
        input: Some(input),
        output: Some(temp.path().join("messages.txt")),
        ..Default::default()
    };
    let err = run(&config).expect_err("truncated record");
    assert!(matches!(err, ReportError::Translate { line: 2, .. }));
}

#[test]
fn test_missing_input_file() {
    let config = Config {
        input: Some(std::path::PathBuf::from("/nonexistent/run-12345.jsonl")),
        ..Default::default()
    };
    assert!(matches!(run(&config), Err(ReportError::Read { .. })));
}

#[test]
fn test_unreadable_input_names_file() {
    let temp = TempTestDir::new("unreadable_input");
    let input = temp.path().join("broken.jsonl");
    std::fs::write(&input, [0xff, 0xfe, b'\n']).expect("write input");
    let config = Config {
        input: Some(input.clone()),
        output: Some(temp.path().join("messages.txt")),
        ..Default::default()
    };

    match run(&config) {
        Err(ReportError::Read { path, .. }) => assert_eq!(path, input),
        other => panic!("expected a read error, got {other:?}"),
    }
}

#[test]
fn test_translation_from_reader() {
    let content = std::fs::read_to_string(fixture("sample-run.jsonl")).expect("fixture");
    let translation = Translation {
        source: std::path::Path::new("sample-run.jsonl"),
        format: InputFormat::Replay,
        root_name: smtest_sender::libtest::DEFAULT_ROOT_NAME,
        threshold: ThresholdSetting::Fixed(0),
    };
    let (result, out) = translation
        .translate(content.as_bytes(), Vec::new())
        .expect("translate");
    assert_eq!(result.run_count, 4);

    // A zero threshold disables message scanning, but the typed comparison
    // failure still carries its values
    let out = String::from_utf8(out).expect("utf8");
    assert!(out.contains("type='comparisonFailure' expected='2' actual='3'"));
}
