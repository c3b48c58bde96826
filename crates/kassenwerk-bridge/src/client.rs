// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// High-level print client used by the till.
//
// Validates the bridge settings once, wires the handshake suppliers into the
// transport and exposes the four job kinds the till prints: raw receipt
// commands, PDFs, HTML and images. Every print call makes sure the bridge is
// connected first.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Url;
use tracing::{info, instrument};

use kassenwerk_core::config::BridgeSettings;
use kassenwerk_core::error::{KassenwerkError, Result};
use kassenwerk_core::types::{CertificateSource, TransportState};

use crate::bootstrap::ConnectionBootstrapper;
use crate::jobs::{DocumentSource, PrintData, PrinterConfig, has_content};
use crate::log::TracingSink;
use crate::suppliers::build_http_client;
use crate::traits::{BridgeTransport, ExternalLauncher, LogSink};

/// Print client bound to one printer.
pub struct PrintClient {
    bootstrapper: ConnectionBootstrapper,
    printer: String,
    copies: u32,
    encoding: Option<String>,
}

impl PrintClient {
    /// Validate `settings` and register the handshake suppliers.
    ///
    /// Fails with `Configuration` before any network activity when the
    /// printer, the signing URL or both certificate fields are missing, or
    /// when a URL or custom header is malformed.
    pub fn new(
        settings: &BridgeSettings,
        transport: Arc<dyn BridgeTransport>,
        launcher: Arc<dyn ExternalLauncher>,
        sink: Arc<dyn LogSink>,
    ) -> Result<Self> {
        let printer = settings.printer_name()?.to_string();
        let credentials = settings.credentials()?;

        check_url("sign URL", &credentials.sign_url)?;
        if let CertificateSource::Remote(url) = &credentials.certificate {
            check_url("certificate URL", url)?;
        }

        let client = build_http_client(
            Duration::from_secs(settings.http_timeout_secs),
            &settings.http_headers,
        )?;

        let bootstrapper = ConnectionBootstrapper::new(transport, launcher, sink);
        bootstrapper.configure(&credentials, client);

        Ok(Self {
            bootstrapper,
            printer,
            copies: settings.copies,
            encoding: settings.encoding.clone(),
        })
    }

    /// Like [`PrintClient::new`] with the platform launcher for
    /// `settings.launch_uri` and logging through `tracing`.
    pub fn with_defaults(
        settings: &BridgeSettings,
        transport: Arc<dyn BridgeTransport>,
    ) -> Result<Self> {
        let launcher = crate::platform_launcher(&settings.launch_uri);
        Self::new(settings, transport, launcher, Arc::new(TracingSink))
    }

    pub fn printer(&self) -> &str {
        &self.printer
    }

    pub fn state(&self) -> TransportState {
        self.bootstrapper.state()
    }

    pub async fn connect(&self) -> Result<()> {
        self.bootstrapper.connect().await
    }

    pub async fn disconnect(&self) {
        self.bootstrapper.disconnect().await
    }

    /// Send raw printer commands (ZPL, ESC/POS), one data element per command.
    pub async fn print_raw<S: AsRef<str>>(&self, commands: &[S]) -> Result<()> {
        let data: Vec<PrintData> = commands
            .iter()
            .map(|c| PrintData::command(c.as_ref()))
            .collect();
        let config = self.config().with_encoding(self.encoding.clone());
        self.submit("raw", config, data).await
    }

    pub async fn print_pdf(&self, source: DocumentSource) -> Result<()> {
        ensure_source("PDF", &source)?;
        self.submit("pdf", self.config(), vec![PrintData::pdf(source)])
            .await
    }

    pub async fn print_html(&self, markup: &str) -> Result<()> {
        self.submit("html", self.config(), vec![PrintData::html(markup)])
            .await
    }

    pub async fn print_image(&self, source: DocumentSource) -> Result<()> {
        ensure_source("image", &source)?;
        self.submit("image", self.config(), vec![PrintData::image(source)])
            .await
    }

    fn config(&self) -> PrinterConfig {
        PrinterConfig::new(self.printer.clone()).with_copies(self.copies)
    }

    #[instrument(skip(self, config, data), fields(printer = %self.printer, elements = data.len()))]
    async fn submit(&self, kind: &str, config: PrinterConfig, data: Vec<PrintData>) -> Result<()> {
        if !has_content(&data) {
            return Err(KassenwerkError::PrintJob(format!("empty {kind} job")));
        }

        self.connect().await?;

        if let Err(e) = self.bootstrapper.transport().print(&config, &data).await {
            let err = KassenwerkError::PrintJob(format!("{kind} job on {}: {e}", self.printer));
            self.bootstrapper.sink().error(&err.to_string());
            return Err(err);
        }

        info!("print job submitted");
        Ok(())
    }
}

fn check_url(what: &str, url: &str) -> Result<()> {
    let parsed = Url::parse(url)
        .map_err(|e| KassenwerkError::Configuration(format!("invalid {what} '{url}': {e}")))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(KassenwerkError::Configuration(format!(
            "{what} must be http or https, got '{other}'"
        ))),
    }
}

fn ensure_source(kind: &str, source: &DocumentSource) -> Result<()> {
    if source.is_empty() {
        return Err(KassenwerkError::PrintJob(format!("empty {kind} job")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jobs::{DataFlavor, DataFormat, DataKind};
    use crate::test_support::{CapturingSink, CountingLauncher, MockTransport};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn settings(
        printer: Option<&str>,
        cert: Option<&str>,
        cert_url: Option<&str>,
        sign: Option<&str>,
    ) -> BridgeSettings {
        BridgeSettings {
            printer: printer.map(Into::into),
            certificate: cert.map(Into::into),
            certificate_url: cert_url.map(Into::into),
            sign_url: sign.map(Into::into),
            ..Default::default()
        }
    }

    fn build(
        settings: &BridgeSettings,
        transport: MockTransport,
    ) -> (Result<PrintClient>, Arc<MockTransport>, Arc<CountingLauncher>, Arc<CapturingSink>) {
        let transport = Arc::new(transport);
        let launcher = Arc::new(CountingLauncher::default());
        let sink = Arc::new(CapturingSink::default());
        let client = PrintClient::new(settings, transport.clone(), launcher.clone(), sink.clone());
        (client, transport, launcher, sink)
    }

    #[test]
    fn missing_fields_fail_synchronously() {
        let cases = [
            settings(None, None, Some("https://x/cert"), Some("https://x/sign")),
            settings(Some("Zebra"), None, Some("https://x/cert"), None),
            settings(Some("Zebra"), None, None, Some("https://x/sign")),
        ];
        for case in &cases {
            let (client, transport, _, _) = build(case, MockTransport::default());
            assert!(matches!(client, Err(KassenwerkError::Configuration(_))));
            assert!(!transport.has_suppliers(), "nothing registered on failure");
        }
    }

    #[test]
    fn malformed_urls_are_rejected() {
        let bad_sign = settings(Some("Zebra"), Some("CERT"), None, Some("not a url"));
        assert!(matches!(
            build(&bad_sign, MockTransport::default()).0,
            Err(KassenwerkError::Configuration(_))
        ));

        let ftp_cert = settings(Some("Zebra"), None, Some("ftp://x/cert"), Some("https://x/sign"));
        assert!(matches!(
            build(&ftp_cert, MockTransport::default()).0,
            Err(KassenwerkError::Configuration(_))
        ));
    }

    #[test]
    fn with_defaults_validates_too() {
        let ok = settings(Some("Zebra"), Some("CERT"), None, Some("https://x/sign"));
        let client = PrintClient::with_defaults(&ok, Arc::new(MockTransport::default())).unwrap();
        assert_eq!(client.printer(), "Zebra");
        assert_eq!(client.state(), TransportState::Closed);

        let missing = settings(Some("Zebra"), None, None, Some("https://x/sign"));
        assert!(PrintClient::with_defaults(&missing, Arc::new(MockTransport::default())).is_err());
    }

    #[tokio::test]
    async fn remote_certificate_fail_then_recover() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/cert"))
            .respond_with(ResponseTemplate::new(200).set_body_string("CERT"))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/sign"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!("sig")))
            .mount(&server)
            .await;

        let s = settings(
            Some("Zebra"),
            None,
            Some(&format!("{}/cert", server.uri())),
            Some(&format!("{}/sign", server.uri())),
        );
        let transport =
            MockTransport::with_connect_results(vec![Err("not running".into()), Ok(())])
                .with_handshake();
        let (client, transport, launcher, _) = build(&s, transport);
        let client = client.unwrap();

        client.connect().await.unwrap();

        assert_eq!(transport.connect_calls().len(), 2);
        assert_eq!(launcher.count(), 1);
        assert_eq!(client.state(), TransportState::Open);
    }

    #[tokio::test]
    async fn literal_certificate_never_hits_certificate_url() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/sign"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!("sig")))
            .mount(&server)
            .await;

        let s = settings(
            Some("Zebra"),
            Some("CERT"),
            None,
            Some(&format!("{}/sign", server.uri())),
        );
        let transport = MockTransport::with_connect_results(vec![Ok(())]).with_handshake();
        let (client, transport, _, _) = build(&s, transport);

        client.unwrap().connect().await.unwrap();
        assert_eq!(transport.presented_certificates(), vec!["CERT"]);
    }

    #[tokio::test]
    async fn print_raw_connects_then_submits() {
        let mut s = settings(Some("Zebra"), Some("CERT"), None, Some("https://x/sign"));
        s.encoding = Some("CP437".into());
        let (client, transport, _, sink) =
            build(&s, MockTransport::with_connect_results(vec![Ok(())]));
        let client = client.unwrap();

        client.print_raw(&["^XA", "^FDTotal 4.20^FS", "^XZ"]).await.unwrap();

        assert_eq!(transport.connect_calls().len(), 1);
        let prints = transport.prints();
        assert_eq!(prints.len(), 1);
        let (config, data) = &prints[0];
        assert_eq!(config.printer, "Zebra");
        assert_eq!(config.encoding.as_deref(), Some("CP437"));
        assert_eq!(data.len(), 3);
        assert!(data.iter().all(|d| d.kind == DataKind::Raw));
        assert_eq!(sink.infos(), vec!["connected to print bridge"]);
    }

    #[tokio::test]
    async fn print_pdf_and_image_use_pixel_jobs() {
        let s = settings(Some("Epson"), Some("CERT"), None, Some("https://x/sign"));
        let (client, transport, _, _) = build(&s, MockTransport::active());
        let client = client.unwrap();

        client
            .print_pdf(DocumentSource::Url("https://x/invoice.pdf".into()))
            .await
            .unwrap();
        client
            .print_image(DocumentSource::Base64("iVBORw0K".into()))
            .await
            .unwrap();
        client.print_html("<h1>Thanks</h1>").await.unwrap();

        let prints = transport.prints();
        assert_eq!(prints.len(), 3);
        assert_eq!(prints[0].1[0].format, DataFormat::Pdf);
        assert_eq!(prints[0].1[0].flavor, DataFlavor::File);
        assert_eq!(prints[1].1[0].format, DataFormat::Image);
        assert_eq!(prints[2].1[0].format, DataFormat::Html);
        assert!(transport.connect_calls().is_empty(), "already connected");
    }

    #[tokio::test]
    async fn empty_job_rejected_before_connecting() {
        let s = settings(Some("Zebra"), Some("CERT"), None, Some("https://x/sign"));
        let (client, transport, _, _) = build(&s, MockTransport::default());
        let client = client.unwrap();

        let empty: [&str; 0] = [];
        assert!(matches!(
            client.print_raw(&empty).await,
            Err(KassenwerkError::PrintJob(_))
        ));
        assert!(matches!(
            client.print_pdf(DocumentSource::Base64(String::new())).await,
            Err(KassenwerkError::PrintJob(_))
        ));
        assert!(transport.connect_calls().is_empty());
    }

    #[tokio::test]
    async fn print_failure_is_logged_and_returned() {
        let s = settings(Some("Zebra"), Some("CERT"), None, Some("https://x/sign"));
        let (client, _, _, sink) = build(&s, MockTransport::active().failing_print("paper out"));
        let client = client.unwrap();

        let err = client.print_html("<p>receipt</p>").await.unwrap_err();

        assert!(matches!(err, KassenwerkError::PrintJob(_)));
        assert_eq!(sink.errors().len(), 1);
        assert!(sink.errors()[0].contains("paper out"));
    }

    #[tokio::test]
    async fn print_without_bridge_surfaces_connection_error() {
        let s = settings(Some("Zebra"), Some("CERT"), None, Some("https://x/sign"));
        let (client, transport, launcher, _) = build(&s, MockTransport::default());

        let err = client.unwrap().print_html("<p>x</p>").await.unwrap_err();

        assert!(matches!(err, KassenwerkError::Connection { .. }));
        assert!(transport.prints().is_empty());
        assert_eq!(launcher.count(), 1);
    }
}
