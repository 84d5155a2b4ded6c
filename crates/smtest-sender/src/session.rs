// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Per-run state shared by the tree scan and the lifecycle callbacks

use std::io::{self, Write};

use crate::message::MessageEmitter;
use crate::node::{NodeId, short_name};
use crate::registry::ParentChainRegistry;
use crate::stack::SuiteStack;

/// Name of the run root, taken from the top-level description
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootName {
    qualified: String,
}

impl RootName {
    /// Wrap the root's fully qualified class name
    #[must_use]
    pub fn new(qualified: impl Into<String>) -> Self {
        Self {
            qualified: qualified.into(),
        }
    }

    /// Fully qualified name
    #[must_use]
    pub fn qualified(&self) -> &str {
        &self.qualified
    }

    /// Short name used when comparing against open suites
    #[must_use]
    pub fn short(&self) -> &str {
        short_name(&self.qualified)
    }

    /// Synthesized roots of parameter sets carry no useful name
    #[must_use]
    pub fn is_meaningful(&self) -> bool {
        !self.qualified.starts_with('[')
    }

    /// Split at the last `.` into the short name and its package comment
    #[must_use]
    pub fn split(&self) -> (&str, Option<&str>) {
        match self.qualified.rfind('.') {
            Some(idx) => (&self.qualified[idx + 1..], Some(&self.qualified[..idx])),
            None => (&self.qualified, None),
        }
    }
}

/// State of one test run
#[derive(Debug, Default)]
pub struct RunSession {
    root: Option<RootName>,
    /// Suites currently open, outermost at the bottom
    pub stack: SuiteStack,
    /// Ancestor chains recorded by the tree scan
    pub registry: ParentChainRegistry,
}

impl RunSession {
    /// Start a session for the run rooted at `root_class`
    #[must_use]
    pub fn new(root_class: impl Into<String>) -> Self {
        Self {
            root: Some(RootName::new(root_class)),
            stack: SuiteStack::new(),
            registry: ParentChainRegistry::new(),
        }
    }

    /// Root of the run, once known
    #[must_use]
    pub fn root(&self) -> Option<&RootName> {
        self.root.as_ref()
    }

    /// Set the root unless one is already set
    ///
    /// Returns `false` when the root was already known.
    pub fn set_root(&mut self, root_class: &str) -> bool {
        if self.root.is_some() {
            return false;
        }
        self.root = Some(RootName::new(root_class));
        true
    }

    /// Short root name, if a root is known
    #[must_use]
    pub fn root_short_name(&self) -> Option<&str> {
        self.root.as_ref().map(RootName::short)
    }

    /// Open the suites of the next start of `id`
    ///
    /// Consumes one recorded chain and moves the stack onto it. Returns
    /// `false`, leaving the stack untouched, when no chain was recorded.
    ///
    /// # Errors
    ///
    /// Returns the sink's error.
    pub fn enter_test<W: Write>(
        &mut self,
        id: NodeId,
        emitter: &mut MessageEmitter<W>,
    ) -> io::Result<bool> {
        let Some(chain) = self.registry.take(id) else {
            return Ok(false);
        };
        let root = self.root.as_ref().map(RootName::short);
        self.stack.reconcile(&chain, root, emitter)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use similar_asserts::assert_eq;

    #[test]
    fn test_root_name_split() {
        let root = RootName::new("com.example.AllTests");
        assert_eq!(root.split(), ("AllTests", Some("com.example")));
        assert_eq!(root.short(), "AllTests");

        let bare = RootName::new("AllTests");
        assert_eq!(bare.split(), ("AllTests", None));
    }

    #[test]
    fn test_parameter_root_is_not_meaningful() {
        assert!(!RootName::new("[0]").is_meaningful());
        assert!(RootName::new("pkg.Suite").is_meaningful());
    }

    #[test]
    fn test_root_set_once() {
        let mut session = RunSession::default();
        assert!(session.root().is_none());
        assert!(session.set_root("pkg.First"));
        assert!(!session.set_root("pkg.Second"));
        assert_eq!(session.root_short_name(), Some("First"));
    }
}
