// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Configuration for the smtest-report binary
//!
//! This module provides the command line configuration: where the recorded
//! run comes from, how it is encoded, where the service messages go, and
//! logging options.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use smtest_sender::ThresholdSetting;
use smtest_sender::libtest::DEFAULT_ROOT_NAME;

/// Encoding of the input stream
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InputFormat {
    /// Newline-delimited lifecycle events with the test tree up front
    #[default]
    Replay,
    /// libtest JSON from `cargo test` or `cargo nextest`
    Libtest,
}

/// smtest-report - translate test runs into TeamCity service messages
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "smtest-report")]
#[command(version, about, long_about = None)]
pub struct Config {
    /// Recorded run to read
    ///
    /// Defaults to stdin, so the reporter can sit at the end of a pipe.
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Encoding of the input
    #[arg(short, long, value_enum, default_value_t)]
    pub format: InputFormat,

    /// File to write service messages to
    ///
    /// Defaults to stdout. Logs always go to stderr.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Longest failure message, in characters, that is searched for
    /// expected/actual values
    ///
    /// When absent, `IDEA_JUNIT_MESSAGE_LENGTH_THRESHOLD` is read for every
    /// failure, falling back to 10000.
    #[arg(long)]
    pub message_length_threshold: Option<usize>,

    /// Name of the root suite for libtest input
    ///
    /// Modules with this name are merged into the root, so pick one that is
    /// not a module in the crate.
    #[arg(short, long, default_value = DEFAULT_ROOT_NAME)]
    pub root_name: String,

    /// Enable verbose logging (debug level)
    ///
    /// Logs are written to stderr so they never mix with service messages.
    #[arg(short, long, default_value = "false")]
    pub verbose: bool,

    /// Quiet mode - suppress info-level logs
    ///
    /// Only errors and warnings will be logged.
    #[arg(short, long, default_value = "false")]
    pub quiet: bool,
}

impl Config {
    /// Message length threshold the classifier should use
    #[must_use]
    pub fn threshold(&self) -> ThresholdSetting {
        self.message_length_threshold
            .map_or(ThresholdSetting::Environment, ThresholdSetting::Fixed)
    }

    /// Root suite name, falling back to `cargo-test` when left blank
    #[must_use]
    pub fn root_name(&self) -> &str {
        match self.root_name.trim() {
            "" => DEFAULT_ROOT_NAME,
            name => name,
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The input path is specified but doesn't exist or isn't a file
    /// - The output path's parent directory doesn't exist
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(ref input) = self.input {
            if !input.exists() {
                return Err(ConfigError::InputNotFound(input.clone()));
            }
            if !input.is_file() {
                return Err(ConfigError::InputNotFile(input.clone()));
            }
        }

        if let Some(parent) = self.output.as_ref().and_then(|o| o.parent()) {
            if !parent.as_os_str().is_empty() && !parent.is_dir() {
                return Err(ConfigError::OutputDirectoryNotFound(parent.to_path_buf()));
            }
        }

        Ok(())
    }

    /// Get the log level based on verbose/quiet flags
    #[must_use]
    pub fn log_level(&self) -> tracing::Level {
        if self.verbose {
            tracing::Level::DEBUG
        } else if self.quiet {
            tracing::Level::WARN
        } else {
            tracing::Level::INFO
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Input path not found
    #[error("Input file not found: {0}")]
    InputNotFound(PathBuf),

    /// Input path is not a regular file
    #[error("Input path is not a file: {0}")]
    InputNotFile(PathBuf),

    /// Output directory missing
    #[error("Output directory not found: {0}")]
    OutputDirectoryNotFound(PathBuf),
}
