// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Parent chain registry
//!
//! The tree scan records, for every leaf, the suites between it and the run
//! root. A leaf may be scheduled more than once (reruns, parameterized
//! re-entry), so each id owns a FIFO queue and every test start consumes
//! exactly one recorded chain.

use std::collections::{HashMap, VecDeque};

use crate::node::{NodeId, TestNode, short_name};

/// A suite on the path from a leaf to the run root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ancestor {
    /// Suite identity
    pub id: NodeId,
    /// Fully qualified class name of the suite
    pub class_name: String,
}

impl Ancestor {
    /// Capture the parts of a node the stack reconciliation needs
    pub fn of<N: TestNode>(node: &N) -> Self {
        Self {
            id: node.id(),
            class_name: node.class_name().to_string(),
        }
    }

    /// Short class name as shown in suite messages
    #[must_use]
    pub fn short_name(&self) -> &str {
        short_name(&self.class_name)
    }
}

/// Ancestors of a leaf, nearest parent first, run root excluded
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AncestorChain {
    ancestors: Vec<Ancestor>,
}

impl AncestorChain {
    /// An empty chain, for leaves directly under the root
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A copy of this chain with `parent` as the new nearest ancestor
    #[must_use]
    pub fn with_nearest(&self, parent: Ancestor) -> Self {
        let mut ancestors = Vec::with_capacity(self.ancestors.len() + 1);
        ancestors.push(parent);
        ancestors.extend(self.ancestors.iter().cloned());
        Self { ancestors }
    }

    /// Number of ancestors
    #[must_use]
    pub fn len(&self) -> usize {
        self.ancestors.len()
    }

    /// Check if the leaf sits directly under the root
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ancestors.is_empty()
    }

    /// Ancestors from the outermost suite down to the nearest parent
    pub fn outermost_first(&self) -> impl Iterator<Item = &Ancestor> {
        self.ancestors.iter().rev()
    }

    /// Ancestors from the nearest parent up to the outermost suite
    pub fn nearest_first(&self) -> impl Iterator<Item = &Ancestor> {
        self.ancestors.iter()
    }
}

impl FromIterator<Ancestor> for AncestorChain {
    /// Collect ancestors given nearest parent first
    fn from_iter<I: IntoIterator<Item = Ancestor>>(iter: I) -> Self {
        Self {
            ancestors: iter.into_iter().collect(),
        }
    }
}

/// Queued ancestor chains keyed by leaf identity
#[derive(Debug, Default)]
pub struct ParentChainRegistry {
    chains: HashMap<NodeId, VecDeque<AncestorChain>>,
}

impl ParentChainRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a chain for the next scheduling of `id`
    pub fn record(&mut self, id: NodeId, chain: AncestorChain) {
        self.chains.entry(id).or_default().push_back(chain);
    }

    /// Consume the oldest queued chain for `id`
    pub fn take(&mut self, id: NodeId) -> Option<AncestorChain> {
        let queue = self.chains.get_mut(&id)?;
        let chain = queue.pop_front();
        if queue.is_empty() {
            self.chains.remove(&id);
        }
        chain
    }

    /// Number of chains still queued for `id`
    #[must_use]
    pub fn pending(&self, id: NodeId) -> usize {
        self.chains.get(&id).map_or(0, VecDeque::len)
    }

    /// Total number of unconsumed chains
    #[must_use]
    pub fn len(&self) -> usize {
        self.chains.values().map(VecDeque::len).sum()
    }

    /// Check if every recorded chain was consumed
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }
}
