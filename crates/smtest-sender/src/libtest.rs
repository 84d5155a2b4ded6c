// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! libtest JSON input
//!
//! This module converts `cargo test -- -Z unstable-options --format json`
//! and `cargo nextest run --message-format libtest-json` output into a
//! recorded run. Module paths become suites: `net::codec::tests::decodes`
//! is the leaf `decodes` of class `net.codec.tests`, nested in the suites
//! `net`, `net.codec` and `net.codec.tests`.
//!
//! # Example
//!
//! ```no_run
//! use smtest_sender::libtest::convert;
//! use smtest_sender::Replayer;
//! use smtest_sender::SmTestSender;
//!
//! let output = r#"{"type":"test","event":"started","name":"tests::works"}"#;
//! let events = convert(output, smtest_sender::libtest::DEFAULT_ROOT_NAME).unwrap();
//! let mut replayer = Replayer::new(SmTestSender::new(std::io::stdout()));
//! replayer.apply_all(events).unwrap();
//! ```

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::SenderError;
use crate::node::{Description, NodeId};
use crate::replay::ReplayEvent;
use crate::throwable::{ExceptionClass, Throwable};

/// Exception class reported for failed Rust tests
pub const PANIC_CLASS: &str = "panic";

/// Root suite name when none is given
///
/// Module paths are made of identifiers, which never contain `-`, so this
/// name cannot be taken by a module suite.
pub const DEFAULT_ROOT_NAME: &str = "cargo-test";

/// A single event from libtest JSON output
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum LibtestEvent {
    /// Suite-level event
    Suite(SuiteEvent),
    /// Test event (started, ok, failed, ignored)
    Test(TestEvent),
}

/// Suite-level event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteEvent {
    /// Event type: "started" or "ok"/"failed"
    pub event: String,
    /// Number of tests (only in "started" event)
    pub test_count: Option<usize>,
}

/// Test-level event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestEvent {
    /// Event type: "started", "ok", "failed", "ignored", "timeout"
    pub event: String,
    /// Full test name, possibly prefixed with the nextest binary id
    pub name: String,
    /// Captured output (only in failed events)
    pub stdout: Option<String>,
    /// Ignore reason or failure message
    pub message: Option<String>,
}

/// Normalize a nextest test name to a module path
///
/// Input: "my-crate::my_crate$codec::tests::decodes"
/// Output: "codec::tests::decodes"
fn normalize_test_name(name: &str) -> &str {
    match name.find('$') {
        Some(idx) => &name[idx + 1..],
        None => name,
    }
}

/// Parse libtest JSON lines, skipping blank lines
///
/// # Errors
///
/// Returns `SenderError::JsonParse` if any line is invalid JSON.
pub fn parse_events(output: &str) -> Result<Vec<LibtestEvent>, SenderError> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| serde_json::from_str(line).map_err(SenderError::from))
        .collect()
}

/// Builds a [`Description`] tree out of module paths
struct TreeBuilder {
    root_name: String,
    next_id: u64,
    /// Suite class name to its node slot
    suites: HashMap<String, usize>,
    /// Normalized test name to its leaf id
    tests: HashMap<String, NodeId>,
    nodes: Vec<Description>,
    /// Child slots of each node slot, in first-seen order
    children: Vec<Vec<usize>>,
}

impl TreeBuilder {
    fn new(root_name: &str) -> Self {
        Self {
            root_name: root_name.to_string(),
            next_id: 1,
            suites: HashMap::new(),
            tests: HashMap::new(),
            nodes: vec![Description::suite(0, root_name)],
            children: vec![Vec::new()],
        }
    }

    fn add_node(&mut self, parent: usize, node: Description) -> usize {
        let slot = self.nodes.len();
        self.nodes.push(node);
        self.children.push(Vec::new());
        self.children[parent].push(slot);
        slot
    }

    fn allocate_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Register a test by its module path, returning its leaf id
    fn add_test(&mut self, path: &str) -> NodeId {
        if let Some(id) = self.tests.get(path) {
            return *id;
        }

        let segments: Vec<&str> = path.split("::").collect();
        let (method, modules) = segments
            .split_last()
            .map_or((path, &[][..]), |(last, rest)| (*last, rest));

        let mut parent = 0;
        for depth in 1..=modules.len() {
            let class_name = modules[..depth].join(".");
            parent = match self.suites.get(&class_name) {
                Some(slot) => *slot,
                None => {
                    if modules[depth - 1] == self.root_name {
                        warn!(module = %class_name, "Module shares the root suite name and will not be opened as a suite");
                    }
                    let id = self.allocate_id();
                    let slot = self.add_node(parent, Description::suite(id, class_name.as_str()));
                    self.suites.insert(class_name, slot);
                    slot
                }
            };
        }

        let class_name = if modules.is_empty() {
            self.root_name.clone()
        } else {
            modules.join(".")
        };
        let id = self.allocate_id();
        self.add_node(parent, Description::test(id, class_name, method));
        self.tests.insert(path.to_string(), NodeId(id));
        NodeId(id)
    }

    fn build(mut self) -> Description {
        self.assemble(0)
    }

    fn assemble(&mut self, slot: usize) -> Description {
        let child_slots = std::mem::take(&mut self.children[slot]);
        let children: Vec<Description> = child_slots.into_iter().map(|c| self.assemble(c)).collect();
        let mut node = std::mem::replace(&mut self.nodes[slot], Description::suite(0, ""));
        node.children = children;
        node
    }
}

/// Convert libtest JSON output into a recorded run rooted at `root_name`
///
/// # Errors
///
/// Returns `SenderError::JsonParse` if any line is invalid JSON, and
/// `SenderError::InvalidFormat` for a test event without a name.
pub fn convert(output: &str, root_name: &str) -> Result<Vec<ReplayEvent>, SenderError> {
    let events = parse_events(output)?;

    let mut builder = TreeBuilder::new(root_name);
    for event in &events {
        if let LibtestEvent::Test(test) = event {
            let path = normalize_test_name(&test.name);
            if path.is_empty() {
                return Err(SenderError::InvalidFormat {
                    message: format!("test event '{}' has an empty test name", test.event),
                });
            }
            builder.add_test(path);
        }
    }
    let ids = builder.tests.clone();
    let root = builder.build();

    let mut replay = vec![ReplayEvent::Tree { root }, ReplayEvent::RunStarted];
    let mut running: HashSet<NodeId> = HashSet::new();

    for event in events {
        let test = match event {
            LibtestEvent::Test(test) => test,
            LibtestEvent::Suite(suite) => {
                debug!(event = %suite.event, count = ?suite.test_count, "Suite event");
                continue;
            }
        };
        let Some(&id) = ids.get(normalize_test_name(&test.name)) else {
            continue;
        };

        match test.event.as_str() {
            "started" => {
                running.insert(id);
                replay.push(ReplayEvent::TestStarted { id });
            }
            "ok" => {
                running.remove(&id);
                replay.push(ReplayEvent::TestFinished { id });
            }
            "ignored" => {
                if running.remove(&id) {
                    let reason = test.message.as_deref();
                    replay.push(ReplayEvent::TestAssumptionFailure {
                        id,
                        exception: Throwable::new(ExceptionClass::root("ignored"), reason),
                    });
                    replay.push(ReplayEvent::TestFinished { id });
                } else {
                    replay.push(ReplayEvent::TestIgnored { id });
                }
            }
            other => {
                if !running.remove(&id) {
                    replay.push(ReplayEvent::TestStarted { id });
                }
                let message = test.stdout.or(test.message).or_else(|| Some(other.to_string()));
                replay.push(ReplayEvent::TestFailure {
                    id,
                    exception: Throwable::new(ExceptionClass::root(PANIC_CLASS), message.as_deref()),
                });
                replay.push(ReplayEvent::TestFinished { id });
            }
        }
    }

    replay.push(ReplayEvent::RunFinished);
    Ok(replay)
}
