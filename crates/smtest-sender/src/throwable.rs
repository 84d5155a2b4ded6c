// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Exception model
//!
//! A [`Throwable`] carries its dynamic type as an [`ExceptionClass`] whose
//! supertype links end at a root class with no superclass, an optional
//! message, a cause chain, and the expected/actual payload that comparison
//! failures expose.

use serde::{Deserialize, Serialize};

/// The dynamic type of an exception and its supertypes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExceptionClass {
    /// Fully qualified class name
    pub name: String,
    /// Direct superclass, `None` at the root of the hierarchy
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub superclass: Option<Box<ExceptionClass>>,
}

impl ExceptionClass {
    /// A class with no known superclass
    #[must_use]
    pub fn root(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            superclass: None,
        }
    }

    /// A class extending `superclass`
    #[must_use]
    pub fn extending(name: impl Into<String>, superclass: ExceptionClass) -> Self {
        Self {
            name: name.into(),
            superclass: Some(Box::new(superclass)),
        }
    }

    /// Direct superclass
    #[must_use]
    pub fn superclass(&self) -> Option<&ExceptionClass> {
        self.superclass.as_deref()
    }

    /// Iterate this class followed by each supertype, nearest first
    pub fn hierarchy(&self) -> impl Iterator<Item = &ExceptionClass> {
        std::iter::successors(Some(self), |class| class.superclass())
    }
}

/// Expected/actual values exposed by a comparison failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonValues {
    /// Expected value
    pub expected: String,
    /// Actual value
    pub actual: String,
    /// File holding a large expected payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_file: Option<String>,
    /// File holding a large actual payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_file: Option<String>,
}

impl ComparisonValues {
    /// Create values without backing files
    #[must_use]
    pub fn new(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self {
            expected: expected.into(),
            actual: actual.into(),
            expected_file: None,
            actual_file: None,
        }
    }
}

/// An exception reported by a failing test
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Throwable {
    /// Dynamic type
    pub class: ExceptionClass,
    /// Exception message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Stack frames, innermost first, without the `at ` prefix
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub frames: Vec<String>,
    /// Underlying cause
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cause: Option<Box<Throwable>>,
    /// Expected/actual payload of comparison failures
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comparison: Option<ComparisonValues>,
}

impl Throwable {
    /// Create a throwable of the given type
    #[must_use]
    pub fn new(class: ExceptionClass, message: Option<&str>) -> Self {
        Self {
            class,
            message: message.map(str::to_string),
            frames: Vec::new(),
            cause: None,
            comparison: None,
        }
    }

    /// Attach a cause
    #[must_use]
    pub fn with_cause(mut self, cause: Throwable) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    /// Attach stack frames
    #[must_use]
    pub fn with_frames(mut self, frames: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.frames = frames.into_iter().map(Into::into).collect();
        self
    }

    /// Attach an expected/actual payload
    #[must_use]
    pub fn with_comparison(mut self, values: ComparisonValues) -> Self {
        self.comparison = Some(values);
        self
    }

    /// Underlying cause
    #[must_use]
    pub fn cause(&self) -> Option<&Throwable> {
        self.cause.as_deref()
    }

    /// Render the stack trace the way a JVM prints it
    ///
    /// ```text
    /// org.junit.ComparisonFailure: expected:<[A]> but was:<[B]>
    ///     at com.example.MathTest.testAdd(MathTest.java:12)
    /// Caused by: ...
    /// ```
    #[must_use]
    pub fn trace(&self) -> String {
        let mut out = String::new();
        let mut current = Some(self);
        let mut first = true;
        while let Some(throwable) = current {
            if !first {
                out.push_str("Caused by: ");
            }
            first = false;
            out.push_str(&throwable.class.name);
            if let Some(message) = &throwable.message {
                out.push_str(": ");
                out.push_str(message);
            }
            out.push('\n');
            for frame in &throwable.frames {
                out.push_str("\tat ");
                out.push_str(frame);
                out.push('\n');
            }
            current = throwable.cause();
        }
        out
    }
}
