// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! smtest-sender: test lifecycle events to TeamCity service messages
//!
//! This library crate turns the callbacks of a test execution engine (run
//! and test start/finish, failures, ignored tests) into correctly nested
//! `##teamcity[...]` status lines for an IDE or CI test viewer.
//!
//! # Example
//!
//! ```no_run
//! use smtest_sender::{Description, SmTestSender, RunResult};
//!
//! let root = Description::suite(0, "com.example.AllTests").with_child(
//!     Description::suite(1, "com.example.MathTest")
//!         .with_child(Description::test(2, "com.example.MathTest", "testAdd")),
//! );
//! let test = &root.children[0].children[0];
//!
//! let mut sender = SmTestSender::new(std::io::stdout());
//! sender.send_tree(&root).unwrap();
//! sender.run_started(&root).unwrap();
//! sender.test_started(test).unwrap();
//! sender.test_finished(test).unwrap();
//! sender.run_finished(&RunResult::default()).unwrap();
//! ```

pub mod error;
pub mod failure;
pub mod libtest;
pub mod message;
pub mod node;
pub mod patterns;
pub mod registry;
pub mod replay;
pub mod sender;
pub mod session;
pub mod stack;
pub mod throwable;
pub mod tree;

pub use error::SenderError;
pub use failure::{ComparisonFailureData, ThresholdSetting, classify};
pub use node::{Description, NodeId, TestNode};
pub use replay::{ReplayEvent, Replayer, replay};
pub use sender::{Failure, RunResult, SmTestSender, SynchronizedSender};
pub use throwable::{ComparisonValues, ExceptionClass, Throwable};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::error::SenderError;
    pub use crate::node::{Description, NodeId, TestNode};
    pub use crate::sender::{Failure, RunResult, SmTestSender};
    pub use crate::throwable::{ComparisonValues, ExceptionClass, Throwable};
}
