// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Payment terminal messages.
//
// One JSON object per line in each direction. Every request carries a fresh
// id which the terminal echoes in its answer; amounts are in minor currency
// units (cents).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use kassenwerk_core::config::TerminalSettings;
use kassenwerk_core::error::{KassenwerkError, Result};

/// Operations the terminal understands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "operation", rename_all = "snake_case")]
pub enum TerminalRequest {
    Credit { amount: u64, installments: u32 },
    Debit { amount: u64 },
    /// Void a transaction that has not been settled yet.
    Cancel { transaction_id: String },
    /// Acknowledge a transaction so the terminal can settle it.
    Confirm { transaction_id: String },
}

impl TerminalRequest {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Credit { .. } => "credit",
            Self::Debit { .. } => "debit",
            Self::Cancel { .. } => "cancel",
            Self::Confirm { .. } => "confirm",
        }
    }

    /// Reject requests the terminal would refuse anyway.
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::Credit { amount: 0, .. } | Self::Debit { amount: 0 } => Err(
                KassenwerkError::Configuration("amount must be greater than zero".into()),
            ),
            Self::Credit {
                installments: 0, ..
            } => Err(KassenwerkError::Configuration(
                "installments must be at least 1".into(),
            )),
            Self::Cancel { transaction_id } | Self::Confirm { transaction_id }
                if transaction_id.trim().is_empty() =>
            {
                Err(KassenwerkError::Configuration(
                    "transaction id is required".into(),
                ))
            }
            _ => Ok(()),
        }
    }

    /// The transaction this request refers to, if it names one.
    fn transaction_id(&self) -> Option<&str> {
        match self {
            Self::Cancel { transaction_id } | Self::Confirm { transaction_id } => {
                Some(transaction_id.as_str())
            }
            _ => None,
        }
    }
}

/// A request as it goes over the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestEnvelope {
    pub id: Uuid,
    pub terminal_id: String,
    pub currency: String,
    pub sent_at: DateTime<Utc>,
    #[serde(flatten)]
    pub request: TerminalRequest,
}

impl RequestEnvelope {
    pub fn new(settings: &TerminalSettings, request: TerminalRequest) -> Self {
        Self {
            id: Uuid::new_v4(),
            terminal_id: settings.terminal_id.clone(),
            currency: settings.currency.clone(),
            sent_at: Utc::now(),
            request,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    Approved,
    Declined,
    Error,
}

/// The terminal's answer to one request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TerminalResponse {
    pub id: Uuid,
    pub status: ResponseStatus,
    #[serde(default)]
    pub transaction_id: Option<String>,
    #[serde(default)]
    pub authorization_code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Outcome of an approved operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionReceipt {
    pub request_id: Uuid,
    pub operation: String,
    pub transaction_id: String,
    pub authorization_code: Option<String>,
    pub message: Option<String>,
    pub completed_at: DateTime<Utc>,
}

impl TerminalResponse {
    /// Turn the answer into a receipt, or the matching error.
    pub fn into_receipt(self, envelope: &RequestEnvelope) -> Result<TransactionReceipt> {
        if self.id != envelope.id {
            return Err(KassenwerkError::TerminalProtocol(format!(
                "answer for {} while waiting for {}",
                self.id, envelope.id
            )));
        }

        let reason = self.message.clone().unwrap_or_else(|| "no reason given".into());
        match self.status {
            ResponseStatus::Declined => return Err(KassenwerkError::PaymentDeclined(reason)),
            ResponseStatus::Error => return Err(KassenwerkError::TerminalProtocol(reason)),
            ResponseStatus::Approved => {}
        }

        let transaction_id = self
            .transaction_id
            .or_else(|| envelope.request.transaction_id().map(str::to_string))
            .ok_or_else(|| {
                KassenwerkError::TerminalProtocol(format!(
                    "approved {} without a transaction id",
                    envelope.request.name()
                ))
            })?;

        Ok(TransactionReceipt {
            request_id: self.id,
            operation: envelope.request.name().to_string(),
            transaction_id,
            authorization_code: self.authorization_code,
            message: self.message,
            completed_at: Utc::now(),
        })
    }
}

/// Serialise a request as one newline-terminated frame.
pub fn encode_frame(envelope: &RequestEnvelope) -> Result<Vec<u8>> {
    let mut frame = serde_json::to_vec(envelope)?;
    frame.push(b'\n');
    Ok(frame)
}

/// Parse one received line.
pub fn decode_frame(line: &str) -> Result<TerminalResponse> {
    serde_json::from_str(line.trim_end())
        .map_err(|e| KassenwerkError::TerminalProtocol(format!("unreadable answer: {e}")))
}
