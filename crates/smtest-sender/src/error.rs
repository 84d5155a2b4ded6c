// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Error types for smtest-sender

use thiserror::Error;

use crate::node::NodeId;

/// Errors that can occur while translating test lifecycle events
#[derive(Debug, Error)]
pub enum SenderError {
    /// Writing to the output sink failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error parsing JSON
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// A replayed event references a node that is not part of the scanned tree
    #[error("Unknown test node: {id}")]
    UnknownNode {
        /// The node id that could not be resolved
        id: NodeId,
    },

    /// A lifecycle event arrived before the test tree was supplied
    #[error("Lifecycle event received before the test tree")]
    TreeMissing,

    /// Invalid event stream format
    #[error("Invalid event stream format: {message}")]
    InvalidFormat {
        /// Description of the format error
        message: String,
    },

    /// A thread panicked while holding the synchronized sender
    #[error("Sender lock poisoned")]
    Poisoned,
}
