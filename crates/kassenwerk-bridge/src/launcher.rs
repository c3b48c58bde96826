// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Starting the bridge application through its custom URI scheme.
//
// The bridge registers a URI handler (e.g. `qz:launch`) when installed.
// Opening that URI through the desktop's opener starts the application if it
// is not already running. We never wait for the opener: the caller retries
// the connection regardless of whether the launch did anything.

use tokio::process::Command;
use tracing::{debug, warn};

use crate::traits::ExternalLauncher;

/// Opens a custom-scheme URI with the platform's default handler.
pub struct UriLauncher {
    uri: String,
}

impl UriLauncher {
    pub fn new(uri: impl Into<String>) -> Self {
        Self { uri: uri.into() }
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// The opener command for this target OS.
    fn command(&self) -> Command {
        #[cfg(target_os = "windows")]
        {
            let mut cmd = Command::new("cmd");
            cmd.args(["/C", "start", "", &self.uri]);
            cmd
        }
        #[cfg(target_os = "macos")]
        {
            let mut cmd = Command::new("open");
            cmd.arg(&self.uri);
            cmd
        }
        #[cfg(not(any(target_os = "windows", target_os = "macos")))]
        {
            let mut cmd = Command::new("xdg-open");
            cmd.arg(&self.uri);
            cmd
        }
    }
}

impl ExternalLauncher for UriLauncher {
    fn attempt_external_launch(&self) {
        let mut cmd = self.command();
        cmd.stdin(std::process::Stdio::null())
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::null());

        // Dropping the child detaches it; tokio reaps it in the background.
        match cmd.spawn() {
            Ok(_child) => debug!(uri = %self.uri, "bridge launch requested"),
            Err(e) => warn!(uri = %self.uri, error = %e, "could not open bridge launch URI"),
        }
    }
}

/// Launcher for platforms without a URI opener, and for embedding
/// applications that start the bridge themselves.
pub struct NoopLauncher;

impl ExternalLauncher for NoopLauncher {
    fn attempt_external_launch(&self) {
        debug!("bridge launch skipped (no-op launcher)");
    }
}
