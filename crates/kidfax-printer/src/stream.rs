// SPDX-FileCopyrightText: 2026 Kid Fax Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Printer connection over any async byte stream (device file, TCP socket).

use std::time::Duration;

use async_trait::async_trait;
use kidfax_core::{Directive, KidfaxError, PrinterConnection};
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::escpos::EscPosEncoder;

/// ESC/POS over an [`AsyncWrite`], with a per-write timeout.
pub struct StreamConnection<W> {
    writer: W,
    encoder: EscPosEncoder,
    write_timeout: Duration,
}

impl<W> StreamConnection<W>
where
    W: AsyncWrite + Unpin + Send,
{
    /// Wraps `writer` and sends the printer reset sequence.
    pub async fn open(
        writer: W,
        encoder: EscPosEncoder,
        write_timeout: Duration,
    ) -> Result<Self, KidfaxError> {
        let mut conn = Self {
            writer,
            encoder,
            write_timeout,
        };
        let init = conn.encoder.init();
        conn.send(&init).await.map_err(|e| KidfaxError::PrinterUnavailable {
            message: "printer did not accept reset".to_string(),
            source: Some(Box::new(e)),
        })?;
        Ok(conn)
    }

    async fn send(&mut self, bytes: &[u8]) -> Result<(), KidfaxError> {
        let limit = self.write_timeout;
        let writer = &mut self.writer;
        let io = async {
            writer.write_all(bytes).await?;
            writer.flush().await
        };
        match tokio::time::timeout(limit, io).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(KidfaxError::printer_write("write failed", e)),
            Err(_) => Err(KidfaxError::PrinterWrite {
                message: format!("write timed out after {limit:?}"),
                source: None,
            }),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

#[async_trait]
impl<W> PrinterConnection for StreamConnection<W>
where
    W: AsyncWrite + Unpin + Send,
{
    async fn write(&mut self, directives: &[Directive]) -> Result<(), KidfaxError> {
        let bytes = self.encoder.encode(directives);
        self.send(&bytes).await
    }

    async fn cut(&mut self) -> Result<(), KidfaxError> {
        let bytes = self.encoder.cut();
        self.send(&bytes).await
    }
}
