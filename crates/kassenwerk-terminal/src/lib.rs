// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Kassenwerk Terminal — payment terminal client. Credit, debit, cancellation
// and confirmation requests travel as JSON lines over a single kept-open TCP
// socket.

pub mod client;
pub mod connection;
pub mod protocol;

pub use client::TerminalClient;
pub use protocol::{TerminalRequest, TransactionReceipt};
