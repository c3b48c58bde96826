// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Connection bootstrap for the print bridge.
//
// Registers the handshake suppliers with the transport, then connects. When
// the first attempt fails the bridge application is most likely not running,
// so we ask the OS to launch it and try exactly once more with the
// transport's own short retry loop. A second failure is final.

use std::sync::{Arc, Mutex};

use reqwest::Client;
use tracing::{debug, instrument};

use kassenwerk_core::error::{KassenwerkError, Result};
use kassenwerk_core::human_errors::humanize_error;
use kassenwerk_core::types::{ConnectionAttempt, Credentials, TransportState};

use crate::suppliers::{HttpSigner, certificate_supplier};
use crate::traits::{BridgeTransport, ExternalLauncher, LogSink};

/// Total attempts made by one `connect()` call that does not short-circuit.
const MAX_ATTEMPTS: u32 = 2;

/// Owns the transport handle and drives its closed → connecting → open →
/// closed lifecycle.
pub struct ConnectionBootstrapper {
    transport: Arc<dyn BridgeTransport>,
    launcher: Arc<dyn ExternalLauncher>,
    sink: Arc<dyn LogSink>,
    state: Mutex<TransportState>,
}

impl ConnectionBootstrapper {
    pub fn new(
        transport: Arc<dyn BridgeTransport>,
        launcher: Arc<dyn ExternalLauncher>,
        sink: Arc<dyn LogSink>,
    ) -> Self {
        Self {
            transport,
            launcher,
            sink,
            state: Mutex::new(TransportState::Closed),
        }
    }

    /// Register the certificate and signature suppliers for `credentials`.
    ///
    /// No request is made here; the transport calls the suppliers during its
    /// handshake.
    pub fn configure(&self, credentials: &Credentials, client: Client) {
        let certificate = certificate_supplier(&credentials.certificate, client.clone());
        let signer = Arc::new(HttpSigner::new(client, credentials.sign_url.clone()));

        self.transport.set_certificate_supplier(certificate);
        self.transport.set_signature_supplier(signer);
        debug!(sign_url = %credentials.sign_url, "handshake suppliers registered");
    }

    /// Connect to the bridge unless already connected.
    ///
    /// On failure the bridge application is launched once and a single retry
    /// is made; if that fails too a `Connection` error is returned.
    #[instrument(skip(self))]
    pub async fn connect(&self) -> Result<()> {
        if self.transport.is_active() {
            debug!("print bridge already connected");
            self.set_state(TransportState::Open);
            return Ok(());
        }

        self.set_state(TransportState::Connecting);

        let first_error = match self.attempt(ConnectionAttempt::initial()).await {
            Ok(()) => return Ok(()),
            Err(e) => e,
        };

        self.sink.error(&format!(
            "print bridge connection failed, launching bridge application: {first_error}"
        ));
        self.launcher.attempt_external_launch();

        match self.attempt(ConnectionAttempt::recovery()).await {
            Ok(()) => Ok(()),
            Err(e) => {
                self.set_state(TransportState::Closed);
                let err = KassenwerkError::Connection {
                    attempts: MAX_ATTEMPTS,
                    source: Box::new(e),
                };
                self.sink
                    .error(&format!("{err}. {}", humanize_error(&err).suggestion));
                Err(err)
            }
        }
    }

    /// Close the bridge connection. Failures are logged, never returned.
    #[instrument(skip(self))]
    pub async fn disconnect(&self) {
        match self.transport.disconnect().await {
            Ok(()) => self.sink.info("disconnected from print bridge"),
            Err(e) => self.sink.error(&format!("print bridge disconnect failed: {e}")),
        }
        self.set_state(TransportState::Closed);
    }

    /// Last known state of the transport handle.
    pub fn state(&self) -> TransportState {
        self.state
            .lock()
            .map(|s| *s)
            .unwrap_or(TransportState::Closed)
    }

    pub(crate) fn transport(&self) -> &Arc<dyn BridgeTransport> {
        &self.transport
    }

    pub(crate) fn sink(&self) -> &Arc<dyn LogSink> {
        &self.sink
    }

    async fn attempt(&self, attempt: ConnectionAttempt) -> Result<()> {
        let options = attempt.options();
        debug!(is_retry = attempt.is_retry, ?options, "connecting to print bridge");

        self.transport.connect(options).await?;

        self.set_state(TransportState::Open);
        self.sink.info(if attempt.is_retry {
            "connected to print bridge after launching it"
        } else {
            "connected to print bridge"
        });
        Ok(())
    }

    fn set_state(&self, new_state: TransportState) {
        if let Ok(mut state) = self.state.lock() {
            *state = new_state;
        }
    }
}
