// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Till configuration.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{KassenwerkError, Result};
use crate::types::{CertificateSource, Credentials};

/// Custom URI that asks the operating system to start the print bridge.
pub const DEFAULT_LAUNCH_URI: &str = "qz:launch";

/// Settings for the whole till, usually loaded from a JSON file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct KassenwerkConfig {
    pub bridge: BridgeSettings,
    pub terminal: TerminalSettings,
}

impl KassenwerkConfig {
    /// Parse settings from a JSON document. Missing keys take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a JSON settings file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }
}

/// Print bridge settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeSettings {
    /// Name of the printer as the bridge reports it.
    pub printer: Option<String>,
    /// Literal PEM certificate. Takes precedence over `certificate_url`.
    pub certificate: Option<String>,
    /// URL serving the PEM certificate.
    pub certificate_url: Option<String>,
    /// Endpoint that signs handshake challenges.
    pub sign_url: Option<String>,
    /// URI opened to start the bridge application when it is not running.
    pub launch_uri: String,
    /// Timeout for certificate and signing requests.
    pub http_timeout_secs: u64,
    /// Extra headers sent with certificate and signing requests (e.g. an API key).
    pub http_headers: BTreeMap<String, String>,
    pub copies: u32,
    /// Character encoding for raw command jobs (e.g. "CP437" for ESC/POS).
    pub encoding: Option<String>,
}

impl Default for BridgeSettings {
    fn default() -> Self {
        Self {
            printer: None,
            certificate: None,
            certificate_url: None,
            sign_url: None,
            launch_uri: DEFAULT_LAUNCH_URI.to_string(),
            http_timeout_secs: 15,
            http_headers: BTreeMap::new(),
            copies: 1,
            encoding: None,
        }
    }
}

impl BridgeSettings {
    /// The configured printer name, or a configuration error when missing.
    pub fn printer_name(&self) -> Result<&str> {
        non_blank(self.printer.as_deref())
            .ok_or_else(|| KassenwerkError::Configuration("printer name is required".into()))
    }

    /// Derive handshake credentials.
    ///
    /// A signing URL and at least one certificate field are required.
    pub fn credentials(&self) -> Result<Credentials> {
        let sign_url = non_blank(self.sign_url.as_deref())
            .ok_or_else(|| KassenwerkError::Configuration("sign URL is required".into()))?;

        let certificate = match (
            non_blank(self.certificate.as_deref()),
            non_blank(self.certificate_url.as_deref()),
        ) {
            (Some(pem), _) => CertificateSource::Literal(pem.to_string()),
            (None, Some(url)) => CertificateSource::Remote(url.to_string()),
            (None, None) => {
                return Err(KassenwerkError::Configuration(
                    "either a certificate or a certificate URL is required".into(),
                ));
            }
        };

        Ok(Credentials {
            certificate,
            sign_url: sign_url.to_string(),
        })
    }
}

/// Payment terminal settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TerminalSettings {
    pub host: String,
    pub port: u16,
    pub connect_timeout_secs: u64,
    /// How long to wait for an answer. Card payments wait for the customer.
    pub response_timeout_secs: u64,
    /// Identifier of this till, echoed in every request.
    pub terminal_id: String,
    /// ISO 4217 currency code for amounts.
    pub currency: String,
}

impl Default for TerminalSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 4100,
            connect_timeout_secs: 10,
            response_timeout_secs: 120,
            terminal_id: "till-1".to_string(),
            currency: "EUR".to_string(),
        }
    }
}

impl TerminalSettings {
    /// `host:port` socket address string.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Connect timeout, never shorter than one second.
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs.max(1))
    }

    /// Response timeout, never shorter than one second.
    pub fn response_timeout(&self) -> Duration {
        Duration::from_secs(self.response_timeout_secs.max(1))
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
