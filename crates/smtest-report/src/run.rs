// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Translation driver
//!
//! Opens the configured input and output, feeds the recorded run through a
//! [`Replayer`], and reports the tally. Replay input is processed line by
//! line as it arrives; libtest input is read whole, since the test tree is
//! only known once every test name has been seen.

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use smtest_sender::libtest;
use smtest_sender::{Replayer, RunResult, SenderError, SmTestSender, ThresholdSetting};
use thiserror::Error;
use tracing::{debug, info};

use crate::config::{Config, InputFormat};

/// Errors that can occur while translating a run
#[derive(Debug, Error)]
pub enum ReportError {
    /// Input could not be opened or read
    #[error("Failed to read input {path}: {source}")]
    Read {
        /// Input location, `-` for stdin
        path: PathBuf,
        /// Underlying error
        source: io::Error,
    },

    /// Output could not be created
    #[error("Failed to create output {path}: {source}")]
    Write {
        /// Output file
        path: PathBuf,
        /// Underlying error
        source: io::Error,
    },

    /// The recorded run could not be translated
    #[error("Line {line}: {source}")]
    Translate {
        /// 1-based input line, 0 when not tied to a line
        line: usize,
        /// Underlying error
        source: SenderError,
    },
}

/// Options for a single translation
#[derive(Debug, Clone, Copy)]
pub struct Translation<'a> {
    /// Input location named in read errors, `-` for stdin
    pub source: &'a Path,
    /// Input encoding
    pub format: InputFormat,
    /// Root suite name for libtest input
    pub root_name: &'a str,
    /// Message length threshold
    pub threshold: ThresholdSetting,
}

impl<'a> Translation<'a> {
    /// Options taken from the command line
    #[must_use]
    pub fn from_config(config: &'a Config) -> Self {
        Self {
            source: config.input.as_deref().unwrap_or_else(|| Path::new("-")),
            format: config.format,
            root_name: config.root_name(),
            threshold: config.threshold(),
        }
    }

    /// Translate `input` into service messages written to `out`
    ///
    /// # Errors
    ///
    /// Returns `ReportError::Read` if the input fails, and
    /// `ReportError::Translate` for malformed records or a failing sink.
    pub fn translate<R: BufRead, W: Write>(&self, input: R, out: W) -> Result<(RunResult, W), ReportError> {
        let sender = SmTestSender::new(out).with_threshold(self.threshold);
        let mut replayer = Replayer::new(sender);

        match self.format {
            InputFormat::Replay => {
                for (idx, line) in input.lines().enumerate() {
                    let line = line.map_err(|source| self.read_error(source))?;
                    replayer
                        .process_line(&line)
                        .map_err(|source| ReportError::Translate { line: idx + 1, source })?;
                }
            }
            InputFormat::Libtest => {
                let mut text = String::new();
                let mut input = input;
                input
                    .read_to_string(&mut text)
                    .map_err(|source| self.read_error(source))?;
                let events = libtest::convert(&text, self.root_name)
                    .map_err(|source| ReportError::Translate { line: 0, source })?;
                debug!(events = events.len(), root = self.root_name, "Converted libtest output");
                replayer
                    .apply_all(events)
                    .map_err(|source| ReportError::Translate { line: 0, source })?;
            }
        }

        let result = replayer.sender().tally();
        Ok((result, replayer.finish().into_inner()))
    }

    fn read_error(&self, source: io::Error) -> ReportError {
        ReportError::Read {
            path: self.source.to_path_buf(),
            source,
        }
    }
}

fn open_input(config: &Config) -> Result<Box<dyn BufRead>, ReportError> {
    match &config.input {
        Some(path) => {
            let file = File::open(path).map_err(|source| ReportError::Read {
                path: path.clone(),
                source,
            })?;
            Ok(Box::new(BufReader::new(file)))
        }
        None => Ok(Box::new(io::stdin().lock())),
    }
}

fn open_output(config: &Config) -> Result<Box<dyn Write>, ReportError> {
    match &config.output {
        Some(path) => {
            let file = File::create(path).map_err(|source| ReportError::Write {
                path: path.clone(),
                source,
            })?;
            Ok(Box::new(BufWriter::new(file)))
        }
        None => Ok(Box::new(io::stdout().lock())),
    }
}

/// Translate the run described by `config`
///
/// # Errors
///
/// Returns the first input, output, or translation error.
pub fn run(config: &Config) -> Result<RunResult, ReportError> {
    let input = open_input(config)?;
    let output = open_output(config)?;
    let translation = Translation::from_config(config);

    info!(
        format = ?translation.format,
        input = %translation.source.display(),
        "Translating test run"
    );
    let (result, _) = translation.translate(input, output)?;
    info!(
        run = result.run_count,
        failed = result.failure_count,
        ignored = result.ignore_count,
        assumptions = result.assumption_failure_count,
        "Run translated"
    );
    Ok(result)
}
