// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Recorded event streams
//!
//! A recorded run is newline-delimited JSON. The first record carries the
//! static test tree; the rest are lifecycle callbacks referring to tree
//! nodes by id:
//!
//! ```text
//! {"event":"tree","root":{"id":0,"display_name":"AllTests","class_name":"pkg.AllTests","children":[...]}}
//! {"event":"run_started"}
//! {"event":"test_started","id":2}
//! {"event":"test_failure","id":2,"exception":{"class":{"name":"java.lang.AssertionError"},"message":"boom"}}
//! {"event":"test_finished","id":2}
//! {"event":"test_ignored","id":3}
//! {"event":"run_finished"}
//! ```
//!
//! # Example
//!
//! ```no_run
//! use smtest_sender::replay;
//!
//! let log = std::fs::read_to_string("run.jsonl").unwrap();
//! let out = replay(&log, Vec::new()).unwrap();
//! print!("{}", String::from_utf8_lossy(&out));
//! ```

use std::collections::HashMap;
use std::io::Write;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::SenderError;
use crate::node::{Description, NodeId};
use crate::sender::{Failure, SmTestSender};
use crate::throwable::Throwable;

/// One record of a recorded run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ReplayEvent {
    /// The static test tree, scanned before the run
    Tree {
        /// Root of the run
        root: Description,
    },
    /// The run started
    RunStarted,
    /// A test started
    TestStarted {
        /// Test node id
        id: NodeId,
    },
    /// A test finished
    TestFinished {
        /// Test node id
        id: NodeId,
    },
    /// A test failed
    TestFailure {
        /// Test node id
        id: NodeId,
        /// Reported exception
        exception: Throwable,
    },
    /// A test's assumption failed
    TestAssumptionFailure {
        /// Test node id
        id: NodeId,
        /// Reported exception
        exception: Throwable,
    },
    /// A test was skipped
    TestIgnored {
        /// Test node id
        id: NodeId,
    },
    /// The run finished
    RunFinished,
}

/// Drives a [`SmTestSender`] from recorded events
pub struct Replayer<W: Write> {
    sender: SmTestSender<W>,
    tree: Option<Description>,
    paths: HashMap<NodeId, Vec<usize>>,
}

impl<W: Write> Replayer<W> {
    /// Create a replayer feeding `sender`
    pub fn new(sender: SmTestSender<W>) -> Self {
        Self {
            sender,
            tree: None,
            paths: HashMap::new(),
        }
    }

    /// Process a single line of a recorded run
    ///
    /// Blank lines are skipped.
    ///
    /// # Errors
    ///
    /// Returns `SenderError::JsonParse` if the line is invalid, or the
    /// error of applying the event.
    pub fn process_line(&mut self, line: &str) -> Result<(), SenderError> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(());
        }
        let event: ReplayEvent = serde_json::from_str(line)?;
        self.apply(event)
    }

    /// Apply one event
    ///
    /// # Errors
    ///
    /// Returns `SenderError::TreeMissing` for lifecycle events before the
    /// tree, `SenderError::UnknownNode` for ids outside the tree, and
    /// `SenderError::Io` if the sink fails.
    pub fn apply(&mut self, event: ReplayEvent) -> Result<(), SenderError> {
        match event {
            ReplayEvent::Tree { root } => {
                self.paths = index_paths(&root);
                debug!(nodes = self.paths.len(), "Replaying test tree");
                self.sender.send_tree(&root)?;
                self.tree = Some(root);
            }
            ReplayEvent::RunStarted => {
                let root = self.tree.as_ref().ok_or(SenderError::TreeMissing)?;
                self.sender.run_started(root)?;
            }
            ReplayEvent::TestStarted { id } => {
                let node = resolve(self.tree.as_ref(), &self.paths, id)?;
                self.sender.test_started(node)?;
            }
            ReplayEvent::TestFinished { id } => {
                let node = resolve(self.tree.as_ref(), &self.paths, id)?;
                self.sender.test_finished(node)?;
            }
            ReplayEvent::TestFailure { id, exception } => {
                let node = resolve(self.tree.as_ref(), &self.paths, id)?;
                self.sender.test_failure(&Failure::new(node, &exception))?;
            }
            ReplayEvent::TestAssumptionFailure { id, exception } => {
                let node = resolve(self.tree.as_ref(), &self.paths, id)?;
                self.sender
                    .test_assumption_failure(&Failure::new(node, &exception))?;
            }
            ReplayEvent::TestIgnored { id } => {
                let node = resolve(self.tree.as_ref(), &self.paths, id)?;
                self.sender.test_ignored(node)?;
            }
            ReplayEvent::RunFinished => {
                let result = self.sender.tally();
                self.sender.run_finished(&result)?;
            }
        }
        Ok(())
    }

    /// Apply a sequence of events in order
    ///
    /// # Errors
    ///
    /// Stops at the first event that fails to apply.
    pub fn apply_all(&mut self, events: impl IntoIterator<Item = ReplayEvent>) -> Result<(), SenderError> {
        events.into_iter().try_for_each(|event| self.apply(event))
    }

    /// Borrow the sender
    pub fn sender(&self) -> &SmTestSender<W> {
        &self.sender
    }

    /// Finish replaying and hand back the sender
    pub fn finish(self) -> SmTestSender<W> {
        self.sender
    }
}

/// Replay a complete recorded run into `out`
///
/// # Errors
///
/// Returns the first error encountered; see [`Replayer::apply`].
pub fn replay<W: Write>(input: &str, out: W) -> Result<W, SenderError> {
    let mut replayer = Replayer::new(SmTestSender::new(out));
    for line in input.lines() {
        replayer.process_line(line)?;
    }
    Ok(replayer.finish().into_inner())
}

/// Child-index path to every node, first occurrence wins
fn index_paths(root: &Description) -> HashMap<NodeId, Vec<usize>> {
    let mut paths = HashMap::new();
    let mut pending = vec![(root, Vec::new())];
    while let Some((node, path)) = pending.pop() {
        for (i, child) in node.children.iter().enumerate().rev() {
            let mut child_path = path.clone();
            child_path.push(i);
            pending.push((child, child_path));
        }
        paths.entry(node.id).or_insert(path);
    }
    paths
}

fn resolve<'t>(
    tree: Option<&'t Description>,
    paths: &HashMap<NodeId, Vec<usize>>,
    id: NodeId,
) -> Result<&'t Description, SenderError> {
    let mut node = tree.ok_or(SenderError::TreeMissing)?;
    let path = paths.get(&id).ok_or(SenderError::UnknownNode { id })?;
    for &i in path {
        node = node.children.get(i).ok_or(SenderError::UnknownNode { id })?;
    }
    Ok(node)
}

#[cfg(test)]
mod tests {
    use super::*;
    use similar_asserts::assert_eq;

    fn sample_tree() -> Description {
        Description::suite(0, "pkg.AllTests").with_children([
            Description::suite(1, "pkg.A").with_children([
                Description::test(2, "pkg.A", "one"),
                Description::test(3, "pkg.A", "two"),
            ]),
            Description::suite(4, "pkg.B").with_child(Description::test(5, "pkg.B", "three")),
        ])
    }

    fn tree_line() -> String {
        serde_json::to_string(&ReplayEvent::Tree {
            root: sample_tree(),
        })
        .expect("serialize")
    }

    #[test]
    fn test_event_json_shape() {
        let event: ReplayEvent =
            serde_json::from_str(r#"{"event":"test_started","id":3}"#).expect("parse");
        assert_eq!(event, ReplayEvent::TestStarted { id: NodeId(3) });

        let event: ReplayEvent = serde_json::from_str(r#"{"event":"run_finished"}"#).expect("parse");
        assert_eq!(event, ReplayEvent::RunFinished);
    }

    #[test]
    fn test_index_paths() {
        let tree = sample_tree();
        let paths = index_paths(&tree);
        assert_eq!(paths[&NodeId(0)], Vec::<usize>::new());
        assert_eq!(paths[&NodeId(3)], vec![0, 1]);
        assert_eq!(paths[&NodeId(5)], vec![1, 0]);

        let node = resolve(Some(&tree), &paths, NodeId(5)).expect("resolve");
        assert_eq!(node.method_name.as_deref(), Some("three"));
    }

    #[test]
    fn test_replay_full_run() {
        let input = format!(
            "{}\n{}\n{}\n\n{}\n{}\n",
            tree_line(),
            r#"{"event":"run_started"}"#,
            r#"{"event":"test_started","id":5}"#,
            r#"{"event":"test_finished","id":5}"#,
            r#"{"event":"run_finished"}"#,
        );
        let out = String::from_utf8(replay(&input, Vec::new()).expect("replay")).expect("utf8");
        let runtime: Vec<&str> = out
            .lines()
            .skip_while(|l| !l.contains("enteredTheMatrix"))
            .collect();
        assert_eq!(
            runtime,
            vec![
                "##teamcity[enteredTheMatrix]",
                "##teamcity[rootName name='AllTests' comment='pkg' location='java:suite://pkg.AllTests']",
                "##teamcity[testSuiteStarted name='B']",
                "##teamcity[testStarted name='three' locationHint='java:test://pkg.B.three']",
                "##teamcity[testFinished name='three']",
                "##teamcity[testSuiteFinished name='B']",
            ]
        );
    }

    #[test]
    fn test_event_before_tree() {
        let result = replay(r#"{"event":"run_started"}"#, Vec::new());
        assert!(matches!(result, Err(SenderError::TreeMissing)));
    }

    #[test]
    fn test_unknown_node() {
        let input = format!("{}\n{}", tree_line(), r#"{"event":"test_started","id":99}"#);
        let result = replay(&input, Vec::new());
        assert!(matches!(
            result,
            Err(SenderError::UnknownNode { id: NodeId(99) })
        ));
    }

    #[test]
    fn test_invalid_json() {
        let result = replay("not json", Vec::new());
        assert!(matches!(result, Err(SenderError::JsonParse(_))));
    }

    #[test]
    fn test_tally_after_replay() {
        let mut replayer = Replayer::new(SmTestSender::new(Vec::new()));
        replayer
            .apply_all([
                ReplayEvent::Tree {
                    root: sample_tree(),
                },
                ReplayEvent::RunStarted,
                ReplayEvent::TestStarted { id: NodeId(2) },
                ReplayEvent::TestFinished { id: NodeId(2) },
                ReplayEvent::TestIgnored { id: NodeId(3) },
                ReplayEvent::RunFinished,
            ])
            .expect("replay");
        let tally = replayer.sender().tally();
        assert_eq!(tally.run_count, 1);
        assert_eq!(tally.ignore_count, 1);
        assert!(tally.was_successful());
    }
}
