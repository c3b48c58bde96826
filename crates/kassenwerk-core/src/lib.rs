// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Kassenwerk — Core types, configuration and error definitions shared by the
// print bridge and payment terminal crates.

pub mod config;
pub mod error;
pub mod human_errors;
pub mod types;

pub use config::{BridgeSettings, KassenwerkConfig, TerminalSettings};
pub use error::KassenwerkError;
pub use types::*;
