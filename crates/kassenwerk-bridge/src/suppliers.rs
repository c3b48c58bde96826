// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Handshake suppliers handed to the bridge transport.
//
// Nothing here touches the network until the transport asks: the remote
// certificate is fetched once per `certificate()` call and every signing
// challenge is one POST to the signing endpoint.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{ACCEPT, HeaderMap, HeaderName, HeaderValue};
use serde::Serialize;
use tracing::{debug, instrument, warn};

use kassenwerk_core::error::{KassenwerkError, Result};
use kassenwerk_core::types::{
    CertificateSource, SignRequest, SignedResponse, certificate_fingerprint,
};

use crate::traits::{CertificateSupplier, SignatureSupplier};

/// Build the HTTP client shared by both suppliers.
///
/// Header names and values are validated here so a bad entry in the settings
/// fails at construction rather than during the handshake.
pub fn build_http_client(timeout: Duration, headers: &BTreeMap<String, String>) -> Result<Client> {
    let mut default_headers = HeaderMap::new();
    for (name, value) in headers {
        let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
            KassenwerkError::Configuration(format!("invalid header name '{name}': {e}"))
        })?;
        let value = HeaderValue::from_str(value).map_err(|e| {
            KassenwerkError::Configuration(format!("invalid value for header '{name}': {e}"))
        })?;
        default_headers.insert(name, value);
    }

    Client::builder()
        .timeout(timeout)
        .default_headers(default_headers)
        .build()
        .map_err(|e| KassenwerkError::Configuration(format!("HTTP client: {e}")))
}

/// Pick the certificate supplier for a credential source.
pub fn certificate_supplier(
    source: &CertificateSource,
    client: Client,
) -> Arc<dyn CertificateSupplier> {
    match source {
        CertificateSource::Literal(pem) => Arc::new(LiteralCertificate::new(pem.clone())),
        CertificateSource::Remote(url) => Arc::new(RemoteCertificate::new(client, url.clone())),
    }
}

/// Certificate handed over up front. Never touches the network.
pub struct LiteralCertificate {
    pem: String,
}

impl LiteralCertificate {
    pub fn new(pem: String) -> Self {
        Self { pem }
    }
}

#[async_trait]
impl CertificateSupplier for LiteralCertificate {
    async fn certificate(&self) -> Result<String> {
        Ok(self.pem.clone())
    }
}

/// Certificate served over HTTP(S).
pub struct RemoteCertificate {
    client: Client,
    url: String,
}

impl RemoteCertificate {
    pub fn new(client: Client, url: String) -> Self {
        Self { client, url }
    }
}

#[async_trait]
impl CertificateSupplier for RemoteCertificate {
    #[instrument(skip(self), fields(url = %self.url))]
    async fn certificate(&self) -> Result<String> {
        debug!("fetching print bridge certificate");

        let response = self
            .client
            .get(&self.url)
            .header(ACCEPT, "text/plain")
            .send()
            .await
            .map_err(|e| KassenwerkError::CertificateFetch(format!("GET {}: {e}", self.url)))?;

        let status = response.status();
        if !status.is_success() {
            warn!(%status, "certificate endpoint refused");
            return Err(KassenwerkError::CertificateFetch(format!(
                "GET {} returned {status}",
                self.url
            )));
        }

        let pem = response.text().await.map_err(|e| {
            KassenwerkError::CertificateFetch(format!("reading body of {}: {e}", self.url))
        })?;

        debug!(fingerprint = %certificate_fingerprint(&pem), "certificate fetched");
        Ok(pem)
    }
}

/// JSON body posted to the signing endpoint.
#[derive(Serialize)]
struct SignBody<'a> {
    request: &'a SignRequest,
}

/// Signs handshake payloads through a remote endpoint holding the private key.
pub struct HttpSigner {
    client: Client,
    url: String,
}

impl HttpSigner {
    pub fn new(client: Client, url: String) -> Self {
        Self { client, url }
    }
}

#[async_trait]
impl SignatureSupplier for HttpSigner {
    #[instrument(skip(self, request), fields(url = %self.url))]
    async fn sign(&self, request: SignRequest) -> Result<SignedResponse> {
        debug!(payload_len = request.0.len(), "requesting handshake signature");

        let response = self
            .client
            .post(&self.url)
            .json(&SignBody { request: &request })
            .send()
            .await
            .map_err(|e| KassenwerkError::Signing(format!("POST {}: {e}", self.url)))?;

        let status = response.status();
        if !status.is_success() {
            warn!(%status, "signing endpoint refused");
            return Err(KassenwerkError::Signing(format!(
                "POST {} returned {status}",
                self.url
            )));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| KassenwerkError::Signing(format!("unreadable signature: {e}")))?;

        Ok(SignedResponse(body))
    }
}
