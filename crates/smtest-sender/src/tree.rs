// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Pre-run tree scan
//!
//! Walks the static test tree once, depth-first, before any test runs. The
//! consumer gets a preview of the tree (`suiteTreeStarted` /
//! `suiteTreeNode` / `suiteTreeEnded`) and the registry gets the ancestor
//! chain of every leaf, which execution order alone cannot reveal.

use std::io::{self, Write};

use tracing::warn;

use crate::message::{Attributes, MessageEmitter, MessageType, suite_location, test_location};
use crate::node::{TestNode, short_name};
use crate::registry::{Ancestor, AncestorChain, ParentChainRegistry};

/// Class JUnit synthesizes for a suite that has no tests
pub const EMPTY_SUITE_CLASS: &str = "junit.framework.TestSuite$1";

/// Method name of the placeholder test in an empty suite
pub const EMPTY_SUITE_WARNING: &str = "warning";

/// Check whether a leaf is the placeholder JUnit adds to empty suites
#[must_use]
pub fn is_empty_suite_placeholder(method_name: &str, class_name: &str) -> bool {
    method_name == EMPTY_SUITE_WARNING && class_name == EMPTY_SUITE_CLASS
}

/// Depth-first scanner over the static test tree
pub struct TreeScanner<'a, W: Write> {
    root_class: &'a str,
    registry: &'a mut ParentChainRegistry,
    emitter: &'a mut MessageEmitter<W>,
}

impl<'a, W: Write> TreeScanner<'a, W> {
    /// Create a scanner for the run rooted at a node of class `root_class`
    pub fn new(
        root_class: &'a str,
        registry: &'a mut ParentChainRegistry,
        emitter: &'a mut MessageEmitter<W>,
    ) -> Self {
        Self {
            root_class,
            registry,
            emitter,
        }
    }

    /// Scan the whole tree below `root`
    ///
    /// # Errors
    ///
    /// Returns the sink's error.
    pub fn scan<N: TestNode>(&mut self, root: &N) -> io::Result<()> {
        self.visit(root, None, &AncestorChain::new())
    }

    fn visit<N: TestNode>(
        &mut self,
        node: &N,
        parent: Option<&N>,
        inherited: &AncestorChain,
    ) -> io::Result<()> {
        let chain = match parent {
            Some(p) if p.class_name() != self.root_class => inherited.with_nearest(Ancestor::of(p)),
            _ => inherited.clone(),
        };

        let children = node.children();
        if children.is_empty() {
            return self.visit_leaf(node, parent, chain);
        }

        let class_name = node.class_name();
        let announce = class_name != self.root_class;
        if announce {
            let hint = location_hint(node);
            self.emitter.emit(
                MessageType::SuiteTreeStarted,
                &Attributes::named(short_name(class_name))
                    .with("locationHint", suite_location(&hint)),
            )?;
        }

        for child in children {
            self.visit(child, Some(node), &chain)?;
        }

        if announce {
            self.emitter.emit(
                MessageType::SuiteTreeEnded,
                &Attributes::named(short_name(class_name)),
            )?;
        }
        Ok(())
    }

    fn visit_leaf<N: TestNode>(
        &mut self,
        node: &N,
        parent: Option<&N>,
        chain: AncestorChain,
    ) -> io::Result<()> {
        let Some(method_name) = node.method_name() else {
            warn!(id = %node.id(), name = node.display_name(), "Skipping leaf without method name");
            return Ok(());
        };

        if parent.is_some() {
            self.registry.record(node.id(), chain);
        }

        let mut class_name = node.class_name();
        if is_empty_suite_placeholder(method_name, class_name) {
            if let Some(p) = parent {
                class_name = p.class_name();
            }
        }

        self.emitter.emit(
            MessageType::SuiteTreeNode,
            &Attributes::named(method_name).with("locationHint", test_location(class_name, method_name)),
        )
    }
}

/// Location of a suite preview
///
/// A parameter-set container (`[0]`) has no class of its own. Its first
/// child's display name looks like `method[0](pkg.Test)`, so the qualifier
/// following the container name gives `pkg.Test.[0]`.
fn location_hint<N: TestNode>(node: &N) -> String {
    let class_name = node.class_name();
    if !node.is_parameter_set() {
        return class_name.to_string();
    }
    let qualifier = node.children().first().and_then(|first| {
        let display = first.display_name();
        let idx = display.find(class_name)?;
        let rest = &display[idx + class_name.len()..];
        rest.strip_prefix('(')?.strip_suffix(')')
    });
    match qualifier {
        Some(q) => format!("{q}.{class_name}"),
        None => class_name.to_string(),
    }
}
