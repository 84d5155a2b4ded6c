// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! smtest-report library
//!
//! This module exports the configuration and translation driver of the
//! `smtest-report` binary for use in integration tests.

pub mod config;
pub mod run;
