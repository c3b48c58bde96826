// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Print job payloads in the shape the bridge expects.
//
// A job is a printer config plus a list of data elements. Raw elements are
// passed byte-for-byte to the printer (ZPL, ESC/POS); pixel elements are
// rendered by the bridge first (PDF, HTML, images).

use serde::{Deserialize, Serialize};

/// Raw printer language or rendered content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataKind {
    Raw,
    Pixel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataFormat {
    Command,
    Pdf,
    Html,
    Image,
}

/// How `data` is encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataFlavor {
    Plain,
    Base64,
    /// `data` is a URL or path the bridge loads itself.
    File,
}

/// Where a PDF or image comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentSource {
    /// Base64-encoded document bytes.
    Base64(String),
    /// URL the bridge downloads the document from.
    Url(String),
}

impl DocumentSource {
    fn into_parts(self) -> (DataFlavor, String) {
        match self {
            Self::Base64(data) => (DataFlavor::Base64, data),
            Self::Url(url) => (DataFlavor::File, url),
        }
    }

    /// True when there is no data or URL to hand to the bridge.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Base64(data) | Self::Url(data) => data.trim().is_empty(),
        }
    }
}

/// One element of a print job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrintData {
    #[serde(rename = "type")]
    pub kind: DataKind,
    pub format: DataFormat,
    pub flavor: DataFlavor,
    pub data: String,
}

impl PrintData {
    /// A raw command string sent to the printer unchanged.
    pub fn command(command: impl Into<String>) -> Self {
        Self {
            kind: DataKind::Raw,
            format: DataFormat::Command,
            flavor: DataFlavor::Plain,
            data: command.into(),
        }
    }

    pub fn pdf(source: DocumentSource) -> Self {
        let (flavor, data) = source.into_parts();
        Self {
            kind: DataKind::Pixel,
            format: DataFormat::Pdf,
            flavor,
            data,
        }
    }

    pub fn html(markup: impl Into<String>) -> Self {
        Self {
            kind: DataKind::Pixel,
            format: DataFormat::Html,
            flavor: DataFlavor::Plain,
            data: markup.into(),
        }
    }

    pub fn image(source: DocumentSource) -> Self {
        let (flavor, data) = source.into_parts();
        Self {
            kind: DataKind::Pixel,
            format: DataFormat::Image,
            flavor,
            data,
        }
    }
}

/// Page orientation for pixel jobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Orientation {
    Portrait,
    Landscape,
    ReverseLandscape,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorType {
    Color,
    Grayscale,
    Blackwhite,
}

/// Printer selection and job-wide options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrinterConfig {
    pub printer: String,
    pub copies: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_name: Option<String>,
    /// Code page for raw commands.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encoding: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orientation: Option<Orientation>,
    pub color_type: ColorType,
    /// Dots per inch for pixel jobs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub density: Option<u32>,
}

impl PrinterConfig {
    pub fn new(printer: impl Into<String>) -> Self {
        Self {
            printer: printer.into(),
            copies: 1,
            job_name: None,
            encoding: None,
            orientation: None,
            // Receipt and label printers are monochrome.
            color_type: ColorType::Blackwhite,
            density: None,
        }
    }

    pub fn with_job_name(mut self, name: impl Into<String>) -> Self {
        self.job_name = Some(name.into());
        self
    }

    pub fn with_copies(mut self, copies: u32) -> Self {
        self.copies = copies.max(1);
        self
    }

    pub fn with_encoding(mut self, encoding: Option<String>) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = Some(orientation);
        self
    }
}

/// Whether every element of a job carries something to print.
pub(crate) fn has_content(data: &[PrintData]) -> bool {
    !data.is_empty() && data.iter().all(|d| !d.data.trim().is_empty())
}
