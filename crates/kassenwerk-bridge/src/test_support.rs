// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// In-memory doubles for the bridge seams, shared by the unit tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use kassenwerk_core::error::{KassenwerkError, Result};
use kassenwerk_core::types::{ConnectOptions, SignRequest};

use crate::jobs::{PrintData, PrinterConfig};
use crate::traits::{
    BridgeTransport, CertificateSupplier, ExternalLauncher, LogSink, SignatureSupplier,
};

/// Scripted transport. Each `connect` pops the next scripted outcome; an
/// exhausted script behaves like a bridge that is not running.
#[derive(Default)]
pub(crate) struct MockTransport {
    active: AtomicBool,
    connect_script: Mutex<VecDeque<std::result::Result<(), String>>>,
    connect_calls: Mutex<Vec<ConnectOptions>>,
    fail_disconnect: bool,
    fail_print: Option<String>,
    handshake: bool,
    certificate: Mutex<Option<Arc<dyn CertificateSupplier>>>,
    signer: Mutex<Option<Arc<dyn SignatureSupplier>>>,
    presented: Mutex<Vec<String>>,
    prints: Mutex<Vec<(PrinterConfig, Vec<PrintData>)>>,
}

impl MockTransport {
    pub fn active() -> Self {
        let transport = Self::default();
        transport.active.store(true, Ordering::SeqCst);
        transport
    }

    pub fn with_connect_results(results: Vec<std::result::Result<(), String>>) -> Self {
        Self {
            connect_script: Mutex::new(results.into()),
            ..Self::default()
        }
    }

    pub fn failing_disconnect(mut self) -> Self {
        self.fail_disconnect = true;
        self
    }

    pub fn failing_print(mut self, reason: &str) -> Self {
        self.fail_print = Some(reason.to_string());
        self
    }

    /// Run the certificate and signature suppliers on every connect, like
    /// the real bridge handshake.
    pub fn with_handshake(mut self) -> Self {
        self.handshake = true;
        self
    }

    pub fn connect_calls(&self) -> Vec<ConnectOptions> {
        self.connect_calls.lock().unwrap().clone()
    }

    pub fn presented_certificates(&self) -> Vec<String> {
        self.presented.lock().unwrap().clone()
    }

    pub fn prints(&self) -> Vec<(PrinterConfig, Vec<PrintData>)> {
        self.prints.lock().unwrap().clone()
    }

    pub fn has_suppliers(&self) -> bool {
        self.certificate.lock().unwrap().is_some() && self.signer.lock().unwrap().is_some()
    }

    async fn run_handshake(&self) -> Result<()> {
        let certificate = self.certificate.lock().unwrap().clone();
        let signer = self.signer.lock().unwrap().clone();
        if let Some(certificate) = certificate {
            let pem = certificate.certificate().await?;
            self.presented.lock().unwrap().push(pem);
        }
        if let Some(signer) = signer {
            signer.sign(SignRequest("challenge".into())).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl BridgeTransport for MockTransport {
    fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    async fn connect(&self, options: ConnectOptions) -> Result<()> {
        self.connect_calls.lock().unwrap().push(options);
        if self.handshake {
            self.run_handshake().await?;
        }

        let outcome = self
            .connect_script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err("bridge not running".into()));

        match outcome {
            Ok(()) => {
                self.active.store(true, Ordering::SeqCst);
                Ok(())
            }
            Err(reason) => Err(KassenwerkError::Transport(reason)),
        }
    }

    async fn disconnect(&self) -> Result<()> {
        if self.fail_disconnect {
            return Err(KassenwerkError::Transport("socket already gone".into()));
        }
        self.active.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn set_certificate_supplier(&self, supplier: Arc<dyn CertificateSupplier>) {
        *self.certificate.lock().unwrap() = Some(supplier);
    }

    fn set_signature_supplier(&self, supplier: Arc<dyn SignatureSupplier>) {
        *self.signer.lock().unwrap() = Some(supplier);
    }

    async fn print(&self, config: &PrinterConfig, jobs: &[PrintData]) -> Result<()> {
        if let Some(reason) = &self.fail_print {
            return Err(KassenwerkError::Transport(reason.clone()));
        }
        self.prints
            .lock()
            .unwrap()
            .push((config.clone(), jobs.to_vec()));
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct CountingLauncher {
    launches: AtomicUsize,
}

impl CountingLauncher {
    pub fn count(&self) -> usize {
        self.launches.load(Ordering::SeqCst)
    }
}

impl ExternalLauncher for CountingLauncher {
    fn attempt_external_launch(&self) {
        self.launches.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Default)]
pub(crate) struct CapturingSink {
    infos: Mutex<Vec<String>>,
    errors: Mutex<Vec<String>>,
}

impl CapturingSink {
    pub fn infos(&self) -> Vec<String> {
        self.infos.lock().unwrap().clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().unwrap().clone()
    }
}

impl LogSink for CapturingSink {
    fn info(&self, message: &str) {
        self.infos.lock().unwrap().push(message.to_string());
    }

    fn error(&self, message: &str) {
        self.errors.lock().unwrap().push(message.to_string());
    }
}
