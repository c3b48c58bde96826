// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>

//! Kassenwerk Bridge — client for the locally-running print bridge.
//!
//! The bridge application owns the printers; this crate authenticates the
//! till to it (certificate + signed challenges), keeps the connection up with
//! a one-shot launch-and-retry recovery, and submits print jobs.
//!
//! The socket transport itself is supplied by the embedding application as a
//! [`traits::BridgeTransport`].

use std::sync::Arc;

pub mod bootstrap;
pub mod client;
pub mod jobs;
pub mod launcher;
pub mod log;
pub mod suppliers;
pub mod traits;

#[cfg(test)]
mod test_support;

pub use bootstrap::ConnectionBootstrapper;
pub use client::PrintClient;

/// The launcher for the target operating system.
///
/// RETURNS: a shared `ExternalLauncher` that opens `uri` with the desktop's
/// default handler, or a no-op on targets without one.
pub fn platform_launcher(uri: &str) -> Arc<dyn traits::ExternalLauncher> {
    #[cfg(any(target_os = "linux", target_os = "macos", target_os = "windows"))]
    {
        Arc::new(launcher::UriLauncher::new(uri))
    }
    #[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
    {
        tracing::debug!(uri, "no URI opener on this platform");
        Arc::new(launcher::NoopLauncher)
    }
}
