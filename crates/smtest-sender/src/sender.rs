// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Lifecycle event receiver
//!
//! [`SmTestSender`] receives the execution engine's callbacks in execution
//! order and writes the matching service messages. The engine is expected to
//! call [`SmTestSender::send_tree`] once before the run starts so test starts
//! can be placed in their suites.

use std::io::Write;
use std::sync::{Mutex, MutexGuard};

use tracing::debug;

use crate::error::SenderError;
use crate::failure::{self, ThresholdSetting};
use crate::message::{Attributes, MessageEmitter, MessageType, suite_location, test_location};
use crate::node::TestNode;
use crate::session::RunSession;
use crate::throwable::Throwable;
use crate::tree::TreeScanner;

/// A failed test and the exception it reported
#[derive(Debug, Clone, Copy)]
pub struct Failure<'a, N> {
    /// The failing test
    pub description: &'a N,
    /// What it threw
    pub exception: &'a Throwable,
}

impl<'a, N> Failure<'a, N> {
    /// Pair a test with its exception
    pub fn new(description: &'a N, exception: &'a Throwable) -> Self {
        Self {
            description,
            exception,
        }
    }

    /// Exception message
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.exception.message.as_deref()
    }

    /// Printed stack trace
    #[must_use]
    pub fn trace(&self) -> String {
        self.exception.trace()
    }
}

/// Outcome counts of a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunResult {
    /// Tests that finished
    pub run_count: usize,
    /// Tests that failed
    pub failure_count: usize,
    /// Tests that were ignored
    pub ignore_count: usize,
    /// Tests whose assumptions failed
    pub assumption_failure_count: usize,
}

impl RunResult {
    /// Check if no test failed
    #[must_use]
    pub fn was_successful(&self) -> bool {
        self.failure_count == 0
    }
}

/// Name reported for a test: its method, or its display name when it has none
fn test_name<N: TestNode>(node: &N) -> &str {
    node.method_name().unwrap_or_else(|| node.display_name())
}

/// Translates test lifecycle callbacks into service messages
#[derive(Debug)]
pub struct SmTestSender<W: Write> {
    emitter: MessageEmitter<W>,
    session: RunSession,
    threshold: ThresholdSetting,
    tally: RunResult,
}

impl<W: Write> SmTestSender<W> {
    /// Create a sender writing to `out`
    pub fn new(out: W) -> Self {
        Self {
            emitter: MessageEmitter::new(out),
            session: RunSession::default(),
            threshold: ThresholdSetting::default(),
            tally: RunResult::default(),
        }
    }

    /// Use a fixed message length threshold instead of the environment
    #[must_use]
    pub fn with_threshold(mut self, threshold: ThresholdSetting) -> Self {
        self.threshold = threshold;
        self
    }

    /// State of the current run
    pub fn session(&self) -> &RunSession {
        &self.session
    }

    /// Counts collected so far
    pub fn tally(&self) -> RunResult {
        self.tally
    }

    /// Borrow the output sink
    pub fn get_ref(&self) -> &W {
        self.emitter.get_ref()
    }

    /// Recover the output sink
    pub fn into_inner(self) -> W {
        self.emitter.into_inner()
    }

    /// Preview the test tree and record every leaf's ancestor chain
    ///
    /// Starts a fresh session rooted at `root`.
    ///
    /// # Errors
    ///
    /// Returns `SenderError::Io` if the sink fails.
    pub fn send_tree<N: TestNode>(&mut self, root: &N) -> Result<(), SenderError> {
        self.session = RunSession::new(root.class_name());
        self.tally = RunResult::default();
        TreeScanner::new(root.class_name(), &mut self.session.registry, &mut self.emitter)
            .scan(root)?;
        debug!(chains = self.session.registry.len(), "Test tree scanned");
        Ok(())
    }

    /// The run started
    ///
    /// # Errors
    ///
    /// Returns `SenderError::Io` if the sink fails.
    pub fn run_started<N: TestNode>(&mut self, root: &N) -> Result<(), SenderError> {
        self.session.set_root(root.class_name());
        self.emitter
            .emit(MessageType::EnteredTheMatrix, &Attributes::new())?;

        let Some(root) = self.session.root().filter(|r| r.is_meaningful()) else {
            return Ok(());
        };
        let (name, comment) = root.split();
        let mut attrs = Attributes::named(name);
        if let Some(comment) = comment {
            attrs.push("comment", comment);
        }
        attrs.push("location", suite_location(root.qualified()));
        self.emitter.emit(MessageType::RootName, &attrs)?;
        Ok(())
    }

    /// A test started
    ///
    /// # Errors
    ///
    /// Returns `SenderError::Io` if the sink fails.
    pub fn test_started<N: TestNode>(&mut self, node: &N) -> Result<(), SenderError> {
        if !self.session.enter_test(node.id(), &mut self.emitter)? {
            debug!(id = %node.id(), "No ancestor chain recorded, suites unchanged");
        }

        let name = test_name(node);
        self.emitter.emit(
            MessageType::TestStarted,
            &Attributes::named(name).with("locationHint", test_location(node.class_name(), name)),
        )?;
        Ok(())
    }

    /// A test finished, whatever its outcome
    ///
    /// # Errors
    ///
    /// Returns `SenderError::Io` if the sink fails.
    pub fn test_finished<N: TestNode>(&mut self, node: &N) -> Result<(), SenderError> {
        self.tally.run_count += 1;
        self.emitter
            .emit(MessageType::TestFinished, &Attributes::named(test_name(node)))?;
        Ok(())
    }

    /// A test failed
    ///
    /// # Errors
    ///
    /// Returns `SenderError::Io` if the sink fails.
    pub fn test_failure<N: TestNode>(&mut self, failure: &Failure<'_, N>) -> Result<(), SenderError> {
        self.tally.failure_count += 1;
        let data = failure::classify_with(failure.exception, self.threshold);
        let mut attrs = Attributes::named(test_name(failure.description));
        failure::register_attributes(&mut attrs, data.as_ref(), &failure.trace(), failure.message());
        self.emitter.emit(MessageType::TestFailed, &attrs)?;
        Ok(())
    }

    /// A test's assumption did not hold, so it counts as ignored
    ///
    /// # Errors
    ///
    /// Returns `SenderError::Io` if the sink fails.
    pub fn test_assumption_failure<N: TestNode>(
        &mut self,
        failure: &Failure<'_, N>,
    ) -> Result<(), SenderError> {
        self.tally.assumption_failure_count += 1;
        self.emit_ignored(failure.description, false)
    }

    /// A test was skipped without ever starting
    ///
    /// Reported as a complete started / ignored / finished triple.
    ///
    /// # Errors
    ///
    /// Returns `SenderError::Io` if the sink fails.
    pub fn test_ignored<N: TestNode>(&mut self, node: &N) -> Result<(), SenderError> {
        self.tally.ignore_count += 1;
        self.test_started(node)?;
        self.emit_ignored(node, true)?;
        self.emitter
            .emit(MessageType::TestFinished, &Attributes::named(test_name(node)))?;
        Ok(())
    }

    /// The run finished; close whatever is still open
    ///
    /// # Errors
    ///
    /// Returns `SenderError::Io` if the sink fails.
    pub fn run_finished(&mut self, result: &RunResult) -> Result<(), SenderError> {
        debug!(
            run = result.run_count,
            failed = result.failure_count,
            ignored = result.ignore_count,
            open_suites = self.session.stack.len(),
            "Run finished"
        );
        self.session.stack.close_all(&mut self.emitter)?;
        Ok(())
    }

    fn emit_ignored<N: TestNode>(&mut self, node: &N, with_reason: bool) -> Result<(), SenderError> {
        let mut attrs = Attributes::named(test_name(node));
        if with_reason {
            match node.ignore_reason() {
                Ok(Some(reason)) => attrs.push("message", reason),
                Ok(None) => {}
                Err(e) => debug!(id = %node.id(), error = %e, "Ignore reason not available"),
            }
        }
        self.emitter.emit(MessageType::TestIgnored, &attrs)?;
        Ok(())
    }
}

/// A sender shared between threads
///
/// Each callback holds the lock for its whole duration, so the triple written
/// by `test_ignored` never interleaves with another thread's messages.
#[derive(Debug)]
pub struct SynchronizedSender<W: Write> {
    inner: Mutex<SmTestSender<W>>,
}

impl<W: Write> SynchronizedSender<W> {
    /// Wrap a sender
    pub fn new(sender: SmTestSender<W>) -> Self {
        Self {
            inner: Mutex::new(sender),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, SmTestSender<W>>, SenderError> {
        self.inner.lock().map_err(|_| SenderError::Poisoned)
    }

    /// See [`SmTestSender::send_tree`]
    ///
    /// # Errors
    ///
    /// Returns `SenderError::Poisoned` or the sender's error.
    pub fn send_tree<N: TestNode>(&self, root: &N) -> Result<(), SenderError> {
        self.lock()?.send_tree(root)
    }

    /// See [`SmTestSender::run_started`]
    ///
    /// # Errors
    ///
    /// Returns `SenderError::Poisoned` or the sender's error.
    pub fn run_started<N: TestNode>(&self, root: &N) -> Result<(), SenderError> {
        self.lock()?.run_started(root)
    }

    /// See [`SmTestSender::test_started`]
    ///
    /// # Errors
    ///
    /// Returns `SenderError::Poisoned` or the sender's error.
    pub fn test_started<N: TestNode>(&self, node: &N) -> Result<(), SenderError> {
        self.lock()?.test_started(node)
    }

    /// See [`SmTestSender::test_finished`]
    ///
    /// # Errors
    ///
    /// Returns `SenderError::Poisoned` or the sender's error.
    pub fn test_finished<N: TestNode>(&self, node: &N) -> Result<(), SenderError> {
        self.lock()?.test_finished(node)
    }

    /// See [`SmTestSender::test_failure`]
    ///
    /// # Errors
    ///
    /// Returns `SenderError::Poisoned` or the sender's error.
    pub fn test_failure<N: TestNode>(&self, failure: &Failure<'_, N>) -> Result<(), SenderError> {
        self.lock()?.test_failure(failure)
    }

    /// See [`SmTestSender::test_assumption_failure`]
    ///
    /// # Errors
    ///
    /// Returns `SenderError::Poisoned` or the sender's error.
    pub fn test_assumption_failure<N: TestNode>(
        &self,
        failure: &Failure<'_, N>,
    ) -> Result<(), SenderError> {
        self.lock()?.test_assumption_failure(failure)
    }

    /// See [`SmTestSender::test_ignored`]
    ///
    /// # Errors
    ///
    /// Returns `SenderError::Poisoned` or the sender's error.
    pub fn test_ignored<N: TestNode>(&self, node: &N) -> Result<(), SenderError> {
        self.lock()?.test_ignored(node)
    }

    /// See [`SmTestSender::run_finished`]
    ///
    /// # Errors
    ///
    /// Returns `SenderError::Poisoned` or the sender's error.
    pub fn run_finished(&self, result: &RunResult) -> Result<(), SenderError> {
        self.lock()?.run_finished(result)
    }

    /// Unwrap the sender
    ///
    /// # Errors
    ///
    /// Returns `SenderError::Poisoned` if a holder panicked.
    pub fn into_inner(self) -> Result<SmTestSender<W>, SenderError> {
        self.inner.into_inner().map_err(|_| SenderError::Poisoned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Description;
    use crate::throwable::{ComparisonValues, ExceptionClass};
    use similar_asserts::assert_eq;

    fn lines(sender: SmTestSender<Vec<u8>>) -> Vec<String> {
        String::from_utf8(sender.into_inner())
            .expect("utf8")
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn test_run_started_emits_root_name() {
        let root = Description::suite(0, "com.example.AllTests");
        let mut sender = SmTestSender::new(Vec::new());
        sender.run_started(&root).expect("run started");
        assert_eq!(
            lines(sender),
            vec![
                "##teamcity[enteredTheMatrix]",
                "##teamcity[rootName name='AllTests' comment='com.example' location='java:suite://com.example.AllTests']",
            ]
        );
    }

    #[test]
    fn test_run_started_without_package() {
        let root = Description::suite(0, "AllTests");
        let mut sender = SmTestSender::new(Vec::new());
        sender.run_started(&root).expect("run started");
        assert_eq!(
            lines(sender)[1],
            "##teamcity[rootName name='AllTests' location='java:suite://AllTests']"
        );
    }

    #[test]
    fn test_run_started_parameter_root_has_no_root_name() {
        let root = Description::parameter_set(0, 3);
        let mut sender = SmTestSender::new(Vec::new());
        sender.run_started(&root).expect("run started");
        assert_eq!(lines(sender), vec!["##teamcity[enteredTheMatrix]"]);
    }

    #[test]
    fn test_unscanned_test_start_leaves_stack_alone() {
        let node = Description::test(42, "pkg.Stray", "orphan");
        let mut sender = SmTestSender::new(Vec::new());
        sender.test_started(&node).expect("started");
        assert!(sender.session().stack.is_empty());
        assert_eq!(
            lines(sender),
            vec!["##teamcity[testStarted name='orphan' locationHint='java:test://pkg.Stray.orphan']"]
        );
    }

    #[test]
    fn test_ignored_triple_with_reason() {
        let node = Description::test(1, "pkg.T", "skipped").ignored(Some("not today"));
        let mut sender = SmTestSender::new(Vec::new());
        sender.test_ignored(&node).expect("ignored");
        assert_eq!(sender.tally().ignore_count, 1);
        assert_eq!(
            lines(sender),
            vec![
                "##teamcity[testStarted name='skipped' locationHint='java:test://pkg.T.skipped']",
                "##teamcity[testIgnored name='skipped' message='not today']",
                "##teamcity[testFinished name='skipped']",
            ]
        );
    }

    #[test]
    fn test_ignored_with_unavailable_reason() {
        let mut node = Description::test(1, "pkg.T", "old").ignored(Some("hidden"));
        if let Some(marker) = node.ignore.as_mut() {
            marker.legacy = true;
        }
        let mut sender = SmTestSender::new(Vec::new());
        sender.test_ignored(&node).expect("ignored");
        assert_eq!(lines(sender)[1], "##teamcity[testIgnored name='old']");
    }

    #[test]
    fn test_assumption_failure_has_no_reason() {
        let node = Description::test(1, "pkg.T", "assumes").ignored(Some("unused"));
        let exception = Throwable::new(
            ExceptionClass::root("org.junit.AssumptionViolatedException"),
            Some("not on CI"),
        );
        let mut sender = SmTestSender::new(Vec::new());
        sender
            .test_assumption_failure(&Failure::new(&node, &exception))
            .expect("assumption");
        assert_eq!(lines(sender), vec!["##teamcity[testIgnored name='assumes']"]);
    }

    #[test]
    fn test_failure_with_comparison() {
        let node = Description::test(1, "pkg.T", "compares");
        let exception = Throwable::new(
            ExceptionClass::root("junit.framework.ComparisonFailure"),
            Some("mismatch"),
        )
        .with_comparison(ComparisonValues::new("A", "B"));
        let mut sender = SmTestSender::new(Vec::new()).with_threshold(ThresholdSetting::Fixed(100));
        sender
            .test_failure(&Failure::new(&node, &exception))
            .expect("failure");
        assert_eq!(sender.tally().failure_count, 1);
        assert_eq!(
            lines(sender),
            vec![
                "##teamcity[testFailed name='compares' message='mismatch' details='|n' type='comparisonFailure' expected='A' actual='B']"
            ]
        );
    }

    #[test]
    fn test_failure_plain() {
        let node = Description::test(1, "pkg.T", "explodes");
        let exception = Throwable::new(ExceptionClass::root("java.lang.IllegalStateException"), Some("boom"))
            .with_frames(["pkg.T.explodes(T.java:9)"]);
        let mut sender = SmTestSender::new(Vec::new()).with_threshold(ThresholdSetting::Fixed(100));
        sender
            .test_failure(&Failure::new(&node, &exception))
            .expect("failure");
        assert_eq!(
            lines(sender),
            vec![
                "##teamcity[testFailed name='explodes' message='boom' details='java.lang.IllegalStateException: boom|n\tat pkg.T.explodes(T.java:9)|n']"
            ]
        );
    }

    #[test]
    fn test_synchronized_sender_from_threads() {
        let root = Description::suite(0, "Root").with_child(
            Description::suite(1, "pkg.A").with_children((2..6).map(|i| Description::test(i, "pkg.A", format!("t{i}")))),
        );
        let shared = SynchronizedSender::new(SmTestSender::new(Vec::new()));
        shared.send_tree(&root).expect("tree");

        std::thread::scope(|scope| {
            for child in &root.children[0].children {
                let shared = &shared;
                scope.spawn(move || shared.test_ignored(child).expect("ignored"));
            }
        });
        shared.run_finished(&RunResult::default()).expect("finished");

        let sender = shared.into_inner().expect("not poisoned");
        assert_eq!(sender.tally().ignore_count, 4);
        let out = lines(sender);
        let started = out.iter().filter(|l| l.starts_with("##teamcity[testSuiteStarted")).count();
        let finished = out.iter().filter(|l| l.starts_with("##teamcity[testSuiteFinished")).count();
        assert_eq!(started, 1);
        assert_eq!(finished, 1);

        // Every ignored message sits between its own start and finish
        for (i, line) in out.iter().enumerate() {
            if let Some(rest) = line.strip_prefix("##teamcity[testIgnored name='") {
                let name = rest.trim_end_matches("']");
                assert!(out[i - 1].starts_with(&format!("##teamcity[testStarted name='{name}'")));
                assert_eq!(out[i + 1], format!("##teamcity[testFinished name='{name}']"));
            }
        }
    }
}
