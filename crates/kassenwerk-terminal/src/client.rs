// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Payment terminal client.
//
// One request/response exchange at a time over a kept-open socket. A kept
// socket the terminal has already closed is replaced before the request is
// written. A request is only ever resent when writing it to a kept-open
// socket failed, i.e. the terminal cannot have seen it. Anything that goes
// wrong after the request was written is reported, never retried: resending a
// payment risks charging the customer twice.

use tokio::sync::Mutex;
use tracing::{error, info, instrument, warn};

use kassenwerk_core::config::TerminalSettings;
use kassenwerk_core::error::{KassenwerkError, Result};

use crate::connection::TerminalConnection;
use crate::protocol::{
    RequestEnvelope, TerminalRequest, TransactionReceipt, decode_frame, encode_frame,
};

pub struct TerminalClient {
    settings: TerminalSettings,
    connection: Mutex<Option<TerminalConnection>>,
}

impl TerminalClient {
    /// Create a client. The socket is opened on the first request.
    pub fn new(settings: TerminalSettings) -> Self {
        Self {
            settings,
            connection: Mutex::new(None),
        }
    }

    pub fn settings(&self) -> &TerminalSettings {
        &self.settings
    }

    /// Charge `amount` (minor units) as a credit card payment.
    pub async fn credit(&self, amount: u64, installments: u32) -> Result<TransactionReceipt> {
        self.execute(TerminalRequest::Credit {
            amount,
            installments,
        })
        .await
    }

    /// Charge `amount` (minor units) as a debit card payment.
    pub async fn debit(&self, amount: u64) -> Result<TransactionReceipt> {
        self.execute(TerminalRequest::Debit { amount }).await
    }

    pub async fn cancel(&self, transaction_id: &str) -> Result<TransactionReceipt> {
        self.execute(TerminalRequest::Cancel {
            transaction_id: transaction_id.to_string(),
        })
        .await
    }

    pub async fn confirm(&self, transaction_id: &str) -> Result<TransactionReceipt> {
        self.execute(TerminalRequest::Confirm {
            transaction_id: transaction_id.to_string(),
        })
        .await
    }

    /// Whether a socket is currently kept open.
    pub async fn is_connected(&self) -> bool {
        self.connection.lock().await.is_some()
    }

    /// Close the kept-open socket. Failures are logged, never returned.
    pub async fn close(&self) {
        if let Some(conn) = self.connection.lock().await.take() {
            let addr = conn.addr().to_string();
            match conn.shutdown().await {
                Ok(()) => info!(addr = %addr, "payment terminal connection closed"),
                Err(e) => warn!(addr = %addr, error = %e, "payment terminal shutdown failed"),
            }
        }
    }

    #[instrument(skip(self), fields(operation = request.name()))]
    async fn execute(&self, request: TerminalRequest) -> Result<TransactionReceipt> {
        request.validate()?;

        let envelope = RequestEnvelope::new(&self.settings, request);
        let frame = encode_frame(&envelope)?;

        let mut slot = self.connection.lock().await;

        let kept = match slot.take() {
            Some(kept) if kept.is_stale() => {
                info!(addr = %kept.addr(), "terminal closed the idle socket, reconnecting");
                None
            }
            kept => kept,
        };

        let mut conn = match kept {
            Some(mut kept) => match kept.send(&frame).await {
                Ok(()) => kept,
                Err(e) => {
                    warn!(error = %e, "kept-open terminal socket is stale, reconnecting");
                    self.open_and_send(&frame).await?
                }
            },
            None => self.open_and_send(&frame).await?,
        };

        let receipt = conn
            .receive(self.settings.response_timeout())
            .await
            .and_then(|line| decode_frame(&line))
            .and_then(|response| response.into_receipt(&envelope));

        match receipt {
            Ok(receipt) => {
                *slot = Some(conn);
                info!(
                    request_id = %receipt.request_id,
                    transaction_id = %receipt.transaction_id,
                    "terminal approved"
                );
                Ok(receipt)
            }
            Err(e) => {
                // Keep the socket only when the stream is known to be in step.
                if matches!(e, KassenwerkError::PaymentDeclined(_)) {
                    *slot = Some(conn);
                    warn!(request_id = %envelope.id, reason = %e, "terminal declined");
                } else {
                    error!(request_id = %envelope.id, error = %e, "terminal exchange failed");
                }
                Err(e)
            }
        }
    }

    async fn open_and_send(&self, frame: &[u8]) -> Result<TerminalConnection> {
        let mut conn =
            TerminalConnection::open(&self.settings.address(), self.settings.connect_timeout())
                .await?;
        conn.send(frame).await?;
        Ok(conn)
    }
}
