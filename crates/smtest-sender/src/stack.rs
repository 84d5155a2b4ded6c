// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Suite stack reconciliation
//!
//! Execution order only tells us which leaf starts next. Its ancestor chain,
//! recorded by the tree scan, is diffed against the suites currently open:
//! everything above the common prefix is closed top-down, then the rest of
//! the chain is opened outermost-first. Sibling tests therefore keep their
//! suite open, and moving to a sibling suite closes the old one before the
//! new one opens.

use std::io::{self, Write};

use tracing::trace;

use crate::message::{Attributes, MessageEmitter, MessageType};
use crate::registry::{Ancestor, AncestorChain};

/// Short names of the suites currently open, outermost at the bottom
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SuiteStack {
    suites: Vec<String>,
}

/// Changes needed to move the stack onto a new ancestor chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    /// Number of bottom entries that stay open
    pub keep: usize,
    /// Suites to open, outermost first
    pub open: Vec<String>,
}

impl SuiteStack {
    /// Create an empty stack
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Open suites, outermost first
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.suites
    }

    /// Innermost open suite
    #[must_use]
    pub fn top(&self) -> Option<&str> {
        self.suites.last().map(String::as_str)
    }

    /// Number of open suites
    #[must_use]
    pub fn len(&self) -> usize {
        self.suites.len()
    }

    /// Check if no suite is open
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.suites.is_empty()
    }

    /// Work out which suites to close and open for `chain`
    ///
    /// Names are compared positionally from the bottom; the first mismatch
    /// ends the shared prefix. A chain that shares nothing with the stack
    /// closes every open suite and reopens the whole chain. Ancestors named
    /// like the root are never opened, so they are left out of the
    /// comparison too.
    #[must_use]
    pub fn plan(&self, chain: &AncestorChain, root: Option<&str>) -> Transition {
        let wanted: Vec<&str> = chain
            .outermost_first()
            .map(Ancestor::short_name)
            .filter(|name| Some(*name) != root)
            .collect();
        let keep = self
            .suites
            .iter()
            .zip(&wanted)
            .take_while(|(open, name)| open.as_str() == **name)
            .count();
        let open = wanted[keep..].iter().map(|name| (*name).to_string()).collect();
        Transition { keep, open }
    }

    /// Apply a transition, emitting a message per closed and opened suite
    ///
    /// # Errors
    ///
    /// Returns the sink's error.
    pub fn apply<W: Write>(
        &mut self,
        transition: Transition,
        emitter: &mut MessageEmitter<W>,
    ) -> io::Result<()> {
        while self.suites.len() > transition.keep {
            if let Some(name) = self.suites.pop() {
                trace!(suite = %name, "Closing suite");
                emitter.emit(MessageType::TestSuiteFinished, &Attributes::named(name))?;
            }
        }
        for name in transition.open {
            trace!(suite = %name, "Opening suite");
            emitter.emit(MessageType::TestSuiteStarted, &Attributes::named(name.as_str()))?;
            self.suites.push(name);
        }
        Ok(())
    }

    /// Move the stack onto `chain`
    ///
    /// # Errors
    ///
    /// Returns the sink's error.
    pub fn reconcile<W: Write>(
        &mut self,
        chain: &AncestorChain,
        root: Option<&str>,
        emitter: &mut MessageEmitter<W>,
    ) -> io::Result<()> {
        let transition = self.plan(chain, root);
        self.apply(transition, emitter)
    }

    /// Close every open suite, innermost first
    ///
    /// # Errors
    ///
    /// Returns the sink's error.
    pub fn close_all<W: Write>(&mut self, emitter: &mut MessageEmitter<W>) -> io::Result<()> {
        self.apply(
            Transition {
                keep: 0,
                open: Vec::new(),
            },
            emitter,
        )
    }
}
