// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Kassenwerk.

use thiserror::Error;

/// Top-level error type for all Kassenwerk operations.
#[derive(Debug, Error)]
pub enum KassenwerkError {
    // -- Setup --
    #[error("configuration error: {0}")]
    Configuration(String),

    // -- Print bridge handshake --
    #[error("certificate fetch failed: {0}")]
    CertificateFetch(String),

    #[error("signing request failed: {0}")]
    Signing(String),

    #[error("could not connect to print bridge after {attempts} attempt(s): {source}")]
    Connection {
        attempts: u32,
        #[source]
        source: Box<KassenwerkError>,
    },

    #[error("print bridge transport error: {0}")]
    Transport(String),

    #[error("print job failed: {0}")]
    PrintJob(String),

    // -- Payment terminal --
    #[error("payment terminal unreachable: {0}")]
    TerminalConnection(String),

    #[error("payment terminal protocol error: {0}")]
    TerminalProtocol(String),

    #[error("payment declined: {0}")]
    PaymentDeclined(String),

    // -- Plumbing --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, KassenwerkError>;
