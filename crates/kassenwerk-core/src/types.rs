// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types shared by the print bridge and payment terminal clients.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Where the print bridge certificate comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CertificateSource {
    /// The PEM text itself, handed over by the caller.
    Literal(String),
    /// A URL serving the PEM text; fetched each time the bridge asks for it.
    Remote(String),
}

/// Everything the bridge handshake needs to authenticate this client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub certificate: CertificateSource,
    /// Endpoint that signs handshake challenges with the certificate's key.
    pub sign_url: String,
}

/// Options forwarded to the bridge transport's connect call.
///
/// Both fields are in the transport's own units; `None` lets the transport
/// apply its defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retries: Option<u32>,
    /// Seconds between the transport's internal retries.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delay: Option<u64>,
}

/// A single connect attempt made by the bootstrapper.
///
/// Created fresh for every `connect()` call and dropped once it resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionAttempt {
    pub retry_count: u32,
    pub delay: Duration,
    pub is_retry: bool,
}

impl ConnectionAttempt {
    /// Plain first attempt: transport defaults, no retries requested.
    pub fn initial() -> Self {
        Self {
            retry_count: 0,
            delay: Duration::ZERO,
            is_retry: false,
        }
    }

    /// The single recovery attempt made after launching the bridge application.
    pub fn recovery() -> Self {
        Self {
            retry_count: 2,
            delay: Duration::from_secs(1),
            is_retry: true,
        }
    }

    /// Transport options for this attempt.
    pub fn options(&self) -> ConnectOptions {
        if !self.is_retry {
            return ConnectOptions::default();
        }
        ConnectOptions {
            retries: Some(self.retry_count),
            delay: Some(self.delay.as_secs()),
        }
    }
}

/// Lifecycle of the bridge transport handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransportState {
    Closed,
    Connecting,
    Open,
}

/// Opaque handshake payload the bridge wants signed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SignRequest(pub String);

/// Parsed reply of the signing endpoint, handed back to the transport once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SignedResponse(pub serde_json::Value);

/// Classification of errors for retry and presentation decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorClass {
    /// Network blip, bridge not started yet — trying again may help.
    Transient,
    /// Someone at the counter must act (start the bridge, check the terminal).
    UserAction,
    /// Retrying will not help: bad settings, declined card, malformed data.
    Permanent,
}

/// SHA-256 fingerprint of a PEM certificate, hex-encoded.
///
/// Whitespace is ignored so the same certificate fetched with different line
/// endings yields the same fingerprint. Used in logs instead of the PEM body.
pub fn certificate_fingerprint(pem: &str) -> String {
    let mut hasher = Sha256::new();
    for line in pem.lines() {
        hasher.update(line.trim().as_bytes());
    }
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_attempt_uses_transport_defaults() {
        let attempt = ConnectionAttempt::initial();
        assert!(!attempt.is_retry);
        assert_eq!(attempt.options(), ConnectOptions::default());
    }

    #[test]
    fn recovery_attempt_requests_two_retries_one_second_apart() {
        let options = ConnectionAttempt::recovery().options();
        assert_eq!(options.retries, Some(2));
        assert_eq!(options.delay, Some(1));
    }

    #[test]
    fn connect_options_skip_unset_fields() {
        let json = serde_json::to_string(&ConnectOptions::default()).unwrap();
        assert_eq!(json, "{}");

        let json = serde_json::to_string(&ConnectionAttempt::recovery().options()).unwrap();
        assert_eq!(json, r#"{"retries":2,"delay":1}"#);
    }

    #[test]
    fn fingerprint_ignores_line_endings() {
        let unix = "-----BEGIN CERTIFICATE-----\nMIIB\n-----END CERTIFICATE-----\n";
        let dos = "-----BEGIN CERTIFICATE-----\r\nMIIB\r\n-----END CERTIFICATE-----\r\n";
        assert_eq!(certificate_fingerprint(unix), certificate_fingerprint(dos));
        assert_eq!(certificate_fingerprint(unix).len(), 64);
    }

    #[test]
    fn sign_request_serializes_as_plain_string() {
        let json = serde_json::to_string(&SignRequest("challenge".into())).unwrap();
        assert_eq!(json, r#""challenge""#);
    }
}
