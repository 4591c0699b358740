// SPDX-FileCopyrightText: 2026 Kid Fax Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for kidfax.

use thiserror::Error;

/// The primary error type used across all kidfax adapter traits and the pipeline.
#[derive(Debug, Error)]
pub enum KidfaxError {
    /// Configuration errors (invalid TOML, missing credentials, bad values).
    #[error("configuration error: {0}")]
    Config(String),

    /// Seen-Set state file errors (unwritable directory, lock failure, serialization).
    #[error("state error: {source}")]
    State {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Message source errors (network failure, API error, malformed response).
    #[error("source error: {message}")]
    Source {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The printer could not be opened.
    #[error("printer unavailable: {message}")]
    PrinterUnavailable {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Writing to an open printer failed.
    #[error("printer write failed: {message}")]
    PrinterWrite {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Image decoding or processing failed.
    #[error("image error: {message}")]
    Image { message: String },

    /// Status display update failed.
    #[error("display error: {message}")]
    Display { message: String },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl KidfaxError {
    /// Shorthand for a [`KidfaxError::Source`] wrapping an underlying error.
    pub fn from_source<E>(message: impl Into<String>, err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        KidfaxError::Source {
            message: message.into(),
            source: Some(Box::new(err)),
        }
    }

    /// Shorthand for a [`KidfaxError::PrinterWrite`] wrapping an I/O error.
    pub fn printer_write(message: impl Into<String>, err: std::io::Error) -> Self {
        KidfaxError::PrinterWrite {
            message: message.into(),
            source: Some(Box::new(err)),
        }
    }

    /// Whether this error means the printer should be treated as gone.
    pub fn is_printer_failure(&self) -> bool {
        matches!(
            self,
            KidfaxError::PrinterUnavailable { .. } | KidfaxError::PrinterWrite { .. }
        )
    }
}
