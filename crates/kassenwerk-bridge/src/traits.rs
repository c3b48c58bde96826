// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Seams between the bootstrapper and the things it does not own: the bridge
// transport, the handshake suppliers, the application launcher and logging.

use std::sync::Arc;

use async_trait::async_trait;

use kassenwerk_core::error::Result;
use kassenwerk_core::types::{ConnectOptions, SignRequest, SignedResponse};

use crate::jobs::{PrintData, PrinterConfig};

/// Socket transport to the locally-running print bridge.
///
/// The transport performs the certificate/signature handshake itself during
/// `connect`, calling back into whichever suppliers were registered last.
/// All methods take `&self`; implementations keep their own interior state.
#[async_trait]
pub trait BridgeTransport: Send + Sync {
    /// Whether the socket is currently open.
    fn is_active(&self) -> bool;

    async fn connect(&self, options: ConnectOptions) -> Result<()>;

    async fn disconnect(&self) -> Result<()>;

    fn set_certificate_supplier(&self, supplier: Arc<dyn CertificateSupplier>);

    fn set_signature_supplier(&self, supplier: Arc<dyn SignatureSupplier>);

    /// Submit one or more jobs to the given printer.
    async fn print(&self, config: &PrinterConfig, jobs: &[PrintData]) -> Result<()>;
}

/// Produces the PEM certificate presented during the handshake.
#[async_trait]
pub trait CertificateSupplier: Send + Sync {
    async fn certificate(&self) -> Result<String>;
}

/// Signs handshake payloads with the certificate's private key.
#[async_trait]
pub trait SignatureSupplier: Send + Sync {
    async fn sign(&self, request: SignRequest) -> Result<SignedResponse>;
}

/// Best-effort start of the bridge application. Must not block.
pub trait ExternalLauncher: Send + Sync {
    fn attempt_external_launch(&self);
}

/// Where the bootstrapper reports what happened.
pub trait LogSink: Send + Sync {
    fn info(&self, message: &str);
    fn error(&self, message: &str);
}
