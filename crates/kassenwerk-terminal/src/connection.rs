// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Persistent TCP link to the payment terminal.
//
// The socket stays open between requests; the client drops it as soon as an
// exchange goes wrong so the next request starts from a clean stream.

use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tracing::{debug, info};

use kassenwerk_core::error::{KassenwerkError, Result};

/// Longest line accepted from the terminal.
const MAX_FRAME_BYTES: usize = 64 * 1024;

pub struct TerminalConnection {
    addr: String,
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
}

impl TerminalConnection {
    /// Open a socket to `addr`, giving up after `connect_timeout`.
    pub async fn open(addr: &str, connect_timeout: Duration) -> Result<Self> {
        info!(addr = %addr, "connecting to payment terminal");

        let stream = tokio::time::timeout(connect_timeout, TcpStream::connect(addr))
            .await
            .map_err(|_| {
                KassenwerkError::TerminalConnection(format!(
                    "connection to {} timed out after {}s",
                    addr,
                    connect_timeout.as_secs()
                ))
            })?
            .map_err(|e| KassenwerkError::TerminalConnection(format!("connect to {addr}: {e}")))?;

        stream
            .set_nodelay(true)
            .map_err(|e| KassenwerkError::TerminalConnection(format!("socket setup: {e}")))?;

        let (read, write) = stream.into_split();
        Ok(Self {
            addr: addr.to_string(),
            reader: BufReader::new(read),
            writer: write,
        })
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }

    /// Whether the kept socket can no longer carry a request.
    ///
    /// Checks the read side without blocking. End of stream or a read error
    /// means the terminal closed it; unsolicited bytes mean the stream is out
    /// of step. A terminal that closes after this check is still only seen
    /// by `receive`.
    pub fn is_stale(&self) -> bool {
        if !self.reader.buffer().is_empty() {
            return true;
        }
        let mut probe = [0u8; 1];
        match self.reader.get_ref().try_read(&mut probe) {
            Ok(_) => true,
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => false,
            Err(_) => true,
        }
    }

    /// Write one complete frame.
    pub async fn send(&mut self, frame: &[u8]) -> Result<()> {
        self.writer
            .write_all(frame)
            .await
            .map_err(|e| KassenwerkError::TerminalConnection(format!("send to {}: {e}", self.addr)))?;
        self.writer
            .flush()
            .await
            .map_err(|e| KassenwerkError::TerminalConnection(format!("flush to {}: {e}", self.addr)))?;
        debug!(bytes = frame.len(), "frame sent to terminal");
        Ok(())
    }

    /// Wait for the next line from the terminal.
    ///
    /// The request has already been delivered at this point, so every
    /// failure here is a protocol error: the payment may or may not have
    /// gone through.
    pub async fn receive(&mut self, response_timeout: Duration) -> Result<String> {
        let mut line = String::new();
        let mut limited = (&mut self.reader).take(MAX_FRAME_BYTES as u64);
        let read = tokio::time::timeout(response_timeout, limited.read_line(&mut line))
            .await
            .map_err(|_| {
                KassenwerkError::TerminalProtocol(format!(
                    "no answer from {} within {}s",
                    self.addr,
                    response_timeout.as_secs()
                ))
            })?
            .map_err(|e| {
                KassenwerkError::TerminalProtocol(format!("reading from {}: {e}", self.addr))
            })?;

        if read == 0 {
            return Err(KassenwerkError::TerminalProtocol(format!(
                "{} closed the connection before answering",
                self.addr
            )));
        }
        if !line.ends_with('\n') && line.len() >= MAX_FRAME_BYTES {
            return Err(KassenwerkError::TerminalProtocol(format!(
                "answer from {} exceeds {MAX_FRAME_BYTES} bytes",
                self.addr
            )));
        }

        debug!(bytes = read, "frame received from terminal");
        Ok(line)
    }

    /// Close the write side so the terminal sees a clean end of stream.
    pub async fn shutdown(mut self) -> Result<()> {
        self.writer
            .shutdown()
            .await
            .map_err(|e| KassenwerkError::TerminalConnection(format!("shutdown: {e}")))
    }
}
