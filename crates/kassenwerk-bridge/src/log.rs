// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>

use crate::traits::LogSink;

/// Default sink: forwards to `tracing` under the `kassenwerk` target.
pub struct TracingSink;

impl LogSink for TracingSink {
    fn info(&self, message: &str) {
        tracing::info!(target: "kassenwerk", "{message}");
    }

    fn error(&self, message: &str) {
        tracing::error!(target: "kassenwerk", "{message}");
    }
}
