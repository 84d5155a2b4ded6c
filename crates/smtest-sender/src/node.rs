// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Test tree nodes
//!
//! The execution engine owns the test tree. This module defines the
//! [`TestNode`] view the sender needs of it, plus [`Description`], a plain
//! serde-friendly tree used by the replay and libtest drivers.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Stable identity of a node in the test tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The running framework version cannot expose the ignore reason
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("ignore metadata accessor unavailable")]
pub struct MetadataUnavailable;

/// Read-only view of a node in the engine's test tree
pub trait TestNode {
    /// Identity used to key ancestor chains
    fn id(&self) -> NodeId;

    /// Human readable name, e.g. `testAdd(com.example.MathTest)` or `[0]`
    fn display_name(&self) -> &str;

    /// Fully qualified class name
    fn class_name(&self) -> &str;

    /// Method name, `None` for suites
    fn method_name(&self) -> Option<&str>;

    /// Ordered children; empty for leaves
    fn children(&self) -> &[Self]
    where
        Self: Sized;

    /// Reason attached to an explicit ignore marker
    ///
    /// # Errors
    ///
    /// Returns [`MetadataUnavailable`] when the framework predates the
    /// accessor for the marker's value.
    fn ignore_reason(&self) -> Result<Option<&str>, MetadataUnavailable>;

    /// Whether this node groups one parameter set of a parameterized test
    fn is_parameter_set(&self) -> bool {
        let name = self.display_name();
        name.starts_with('[') && name.ends_with(']')
    }
}

/// Shorten a qualified class name to its last `.` segment
///
/// Parameter-set names (`[0]`, `[a.b]`) are returned untouched.
#[must_use]
pub fn short_name(qualified: &str) -> &str {
    if qualified.starts_with('[') {
        return qualified;
    }
    match qualified.rfind('.') {
        Some(idx) => &qualified[idx + 1..],
        None => qualified,
    }
}

/// Ignore marker carried by a [`Description`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IgnoreMarker {
    /// Reason given on the marker
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Set when the marker came from a framework without a reason accessor
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub legacy: bool,
}

/// An owned test tree node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Description {
    /// Node identity
    pub id: NodeId,
    /// Display name
    pub display_name: String,
    /// Fully qualified class name
    pub class_name: String,
    /// Method name for test leaves
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method_name: Option<String>,
    /// Child nodes
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Description>,
    /// Ignore marker, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ignore: Option<IgnoreMarker>,
}

impl Description {
    /// Create a suite node named after its class
    #[must_use]
    pub fn suite(id: u64, class_name: impl Into<String>) -> Self {
        let class_name = class_name.into();
        Self {
            id: NodeId(id),
            display_name: class_name.clone(),
            class_name,
            method_name: None,
            children: Vec::new(),
            ignore: None,
        }
    }

    /// Create a test leaf, displayed as `method(class)`
    #[must_use]
    pub fn test(id: u64, class_name: impl Into<String>, method_name: impl Into<String>) -> Self {
        let class_name = class_name.into();
        let method_name = method_name.into();
        Self {
            id: NodeId(id),
            display_name: format!("{method_name}({class_name})"),
            class_name,
            method_name: Some(method_name),
            children: Vec::new(),
            ignore: None,
        }
    }

    /// Create the container for one parameter set, displayed as `[index]`
    #[must_use]
    pub fn parameter_set(id: u64, index: usize) -> Self {
        let name = format!("[{index}]");
        Self {
            id: NodeId(id),
            display_name: name.clone(),
            class_name: name,
            method_name: None,
            children: Vec::new(),
            ignore: None,
        }
    }

    /// Append a child node
    #[must_use]
    pub fn with_child(mut self, child: Description) -> Self {
        self.children.push(child);
        self
    }

    /// Append several child nodes
    #[must_use]
    pub fn with_children(mut self, children: impl IntoIterator<Item = Description>) -> Self {
        self.children.extend(children);
        self
    }

    /// Override the display name
    #[must_use]
    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = display_name.into();
        self
    }

    /// Mark the node ignored with an optional reason
    #[must_use]
    pub fn ignored(mut self, reason: Option<&str>) -> Self {
        self.ignore = Some(IgnoreMarker {
            reason: reason.map(str::to_string),
            legacy: false,
        });
        self
    }

    /// Check if the node has no children
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

impl TestNode for Description {
    fn id(&self) -> NodeId {
        self.id
    }

    fn display_name(&self) -> &str {
        &self.display_name
    }

    fn class_name(&self) -> &str {
        &self.class_name
    }

    fn method_name(&self) -> Option<&str> {
        self.method_name.as_deref()
    }

    fn children(&self) -> &[Self] {
        &self.children
    }

    fn ignore_reason(&self) -> Result<Option<&str>, MetadataUnavailable> {
        match &self.ignore {
            None => Ok(None),
            Some(marker) if marker.legacy => Err(MetadataUnavailable),
            Some(marker) => Ok(marker.reason.as_deref()),
        }
    }
}
