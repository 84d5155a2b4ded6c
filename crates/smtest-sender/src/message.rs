// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Service message formatting
//!
//! Every message is a single line of the form
//! `##teamcity[<type> key='value' ...]`. Attribute values are escaped here
//! and nowhere else, so callers always pass raw text.

use std::fmt;
use std::io::{self, Write};

/// Marker that opens every message
pub const MARKER: &str = "teamcity";

/// Message types understood by the reporting consumer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageType {
    /// Announces that the reporter is attached
    EnteredTheMatrix,
    /// Names the root of the run
    RootName,
    /// Preview of a test leaf
    SuiteTreeNode,
    /// Preview of a suite opening
    SuiteTreeStarted,
    /// Preview of a suite closing
    SuiteTreeEnded,
    /// A suite opened during execution
    TestSuiteStarted,
    /// A suite closed during execution
    TestSuiteFinished,
    /// A test started
    TestStarted,
    /// A test finished
    TestFinished,
    /// A test failed
    TestFailed,
    /// A test was ignored
    TestIgnored,
}

impl MessageType {
    /// Wire name of the message type
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::EnteredTheMatrix => "enteredTheMatrix",
            Self::RootName => "rootName",
            Self::SuiteTreeNode => "suiteTreeNode",
            Self::SuiteTreeStarted => "suiteTreeStarted",
            Self::SuiteTreeEnded => "suiteTreeEnded",
            Self::TestSuiteStarted => "testSuiteStarted",
            Self::TestSuiteFinished => "testSuiteFinished",
            Self::TestStarted => "testStarted",
            Self::TestFinished => "testFinished",
            Self::TestFailed => "testFailed",
            Self::TestIgnored => "testIgnored",
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered attribute list of a message
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes {
    entries: Vec<(&'static str, String)>,
}

impl Attributes {
    /// Create an empty attribute list
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Single `name` attribute, the most common shape
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self::new().with("name", name)
    }

    /// Append an attribute
    pub fn push(&mut self, key: &'static str, value: impl Into<String>) {
        self.entries.push((key, value.into()));
    }

    /// Append an attribute, builder style
    #[must_use]
    pub fn with(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.push(key, value);
        self
    }

    /// Look up the first value for `key`
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Iterate attributes in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (*k, v.as_str()))
    }

    /// Check if no attributes were added
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Navigation hint for a test method
#[must_use]
pub fn test_location(class_name: &str, method_name: &str) -> String {
    format!("java:test://{class_name}.{method_name}")
}

/// Navigation hint for a suite
#[must_use]
pub fn suite_location(qualified: &str) -> String {
    format!("java:suite://{qualified}")
}

/// Escape a value for use between `'` delimiters
#[must_use]
pub fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '|' => out.push_str("||"),
            '\'' => out.push_str("|'"),
            '\n' => out.push_str("|n"),
            '\r' => out.push_str("|r"),
            '[' => out.push_str("|["),
            ']' => out.push_str("|]"),
            '\\' => out.push_str("|0x005C"),
            '\u{0085}' => out.push_str("|x"),
            '\u{2028}' => out.push_str("|l"),
            '\u{2029}' => out.push_str("|p"),
            other => out.push(other),
        }
    }
    out
}

/// Render a message without the trailing newline
#[must_use]
pub fn format_message(kind: MessageType, attrs: &Attributes) -> String {
    let mut line = format!("##{MARKER}[{kind}");
    for (key, value) in attrs.iter() {
        line.push(' ');
        line.push_str(key);
        line.push_str("='");
        line.push_str(&escape(value));
        line.push('\'');
    }
    line.push(']');
    line
}

/// Writes one message per line to an output sink
#[derive(Debug)]
pub struct MessageEmitter<W: Write> {
    out: W,
}

impl<W: Write> MessageEmitter<W> {
    /// Create an emitter over a sink
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Write one message line and flush it
    ///
    /// # Errors
    ///
    /// Returns the sink's error; there is no recovery without the channel.
    pub fn emit(&mut self, kind: MessageType, attrs: &Attributes) -> io::Result<()> {
        let line = format_message(kind, attrs);
        writeln!(self.out, "{line}")?;
        self.out.flush()
    }

    /// Borrow the sink
    pub fn get_ref(&self) -> &W {
        &self.out
    }

    /// Recover the sink
    pub fn into_inner(self) -> W {
        self.out
    }
}
