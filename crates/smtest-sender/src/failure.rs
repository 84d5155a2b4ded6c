// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Failure classification
//!
//! Decides whether a test failure carries a structured expected/actual pair
//! (shown by the consumer as a diff) or is plain text, and builds the
//! attributes of the `testFailed` message accordingly.

use tracing::debug;

use crate::message::Attributes;
use crate::patterns;
use crate::throwable::{ExceptionClass, Throwable};

/// Environment variable overriding the message length threshold
pub const MESSAGE_LENGTH_THRESHOLD_ENV: &str = "IDEA_JUNIT_MESSAGE_LENGTH_THRESHOLD";

/// Messages at least this long skip heuristic pattern extraction
pub const DEFAULT_MESSAGE_LENGTH_THRESHOLD: usize = 10_000;

/// Exception types whose instances carry expected/actual values
pub const COMPARISON_FAILURE_TYPES: [&str; 2] =
    ["junit.framework.ComparisonFailure", "org.junit.ComparisonFailure"];

/// Where the message length threshold comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThresholdSetting {
    /// Read [`MESSAGE_LENGTH_THRESHOLD_ENV`] on every classification
    #[default]
    Environment,
    /// Fixed value
    Fixed(usize),
}

impl ThresholdSetting {
    /// Resolve the threshold, falling back to the default on any read or
    /// parse failure
    #[must_use]
    pub fn resolve(self) -> usize {
        match self {
            Self::Fixed(threshold) => threshold,
            Self::Environment => match std::env::var(MESSAGE_LENGTH_THRESHOLD_ENV) {
                Ok(raw) => parse_threshold(&raw),
                Err(_) => DEFAULT_MESSAGE_LENGTH_THRESHOLD,
            },
        }
    }
}

/// Parse a threshold setting
///
/// Zero or a negative value admits no message to pattern matching.
fn parse_threshold(raw: &str) -> usize {
    match raw.trim().parse::<i64>() {
        Ok(value) => usize::try_from(value).unwrap_or(0),
        Err(e) => {
            debug!(value = raw, error = %e, "Ignoring unparsable message length threshold");
            DEFAULT_MESSAGE_LENGTH_THRESHOLD
        }
    }
}

/// Structured diff data of a comparison failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComparisonFailureData {
    /// Expected value
    pub expected: String,
    /// Actual value
    pub actual: String,
    /// File holding a large expected payload
    pub expected_file: Option<String>,
    /// File holding a large actual payload
    pub actual_file: Option<String>,
    /// Stack trace of the reported failure
    pub trace: String,
    /// Message of the reported failure
    pub message: Option<String>,
}

/// Check whether `class` or any of its supertypes is a known comparison
/// failure type
#[must_use]
pub fn is_comparison_failure(class: &ExceptionClass) -> bool {
    class
        .hierarchy()
        .any(|c| COMPARISON_FAILURE_TYPES.contains(&c.name.as_str()))
}

/// Classify a failure using the threshold from the environment
#[must_use]
pub fn classify(throwable: &Throwable) -> Option<ComparisonFailureData> {
    classify_with(throwable, ThresholdSetting::Environment)
}

/// Classify a failure
///
/// Rules, first match wins:
/// 1. the throwable is a comparison failure: use its values
/// 2. its direct cause is a comparison failure: use the cause's values
/// 3. its message is shorter than the threshold and matches a known
///    expected/actual shape
/// 4. otherwise there is no structured data
#[must_use]
pub fn classify_with(throwable: &Throwable, threshold: ThresholdSetting) -> Option<ComparisonFailureData> {
    let trace = throwable.trace();
    let message = throwable.message.clone();

    let structured = if is_comparison_failure(&throwable.class) {
        Some(throwable)
    } else {
        throwable.cause().filter(|cause| is_comparison_failure(&cause.class))
    };

    if let Some(source) = structured {
        // All or nothing: a comparison type without values is plain text
        let values = source.comparison.as_ref()?;
        return Some(ComparisonFailureData {
            expected: values.expected.clone(),
            actual: values.actual.clone(),
            expected_file: values.expected_file.clone(),
            actual_file: values.actual_file.clone(),
            trace,
            message,
        });
    }

    let text = throwable.message.as_deref()?;
    if text.chars().count() >= threshold.resolve() {
        debug!(length = text.len(), "Failure message too long for pattern matching");
        return None;
    }
    let values = patterns::extract(text)?;
    Some(ComparisonFailureData {
        expected: values.expected,
        actual: values.actual,
        expected_file: None,
        actual_file: None,
        trace,
        message,
    })
}

/// Add the failure attributes of a `testFailed` message
///
/// `message` and `details` are always present. With structured data the
/// details drop everything up to and including the message, which the
/// consumer already shows, and the diff attributes follow.
pub fn register_attributes(
    attrs: &mut Attributes,
    data: Option<&ComparisonFailureData>,
    trace: &str,
    message: Option<&str>,
) {
    attrs.push("message", message.unwrap_or(""));
    let Some(data) = data else {
        attrs.push("details", trace);
        return;
    };

    let details = match message.filter(|m| !m.is_empty()) {
        Some(m) => trace.find(m).map_or(trace, |idx| &trace[idx + m.len()..]),
        None => trace,
    };
    attrs.push("details", details);
    attrs.push("type", "comparisonFailure");
    attrs.push("expected", &data.expected);
    attrs.push("actual", &data.actual);
    if let Some(path) = &data.expected_file {
        attrs.push("expectedFile", path);
    }
    if let Some(path) = &data.actual_file {
        attrs.push("actualFile", path);
    }
}
