// SPDX-FileCopyrightText: 2026 Kid Fax Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Status display trait for best-effort visual feedback.

use async_trait::async_trait;

use crate::error::KidfaxError;
use crate::traits::adapter::PluginAdapter;

/// A status display updated after each poll cycle that printed something.
///
/// Callers treat every error as non-fatal.
#[async_trait]
pub trait StatusDisplay: PluginAdapter {
    /// Shows how many messages were just printed and who sent the last one.
    async fn show_batch_result(
        &self,
        printed_count: usize,
        last_sender_label: Option<&str>,
    ) -> Result<(), KidfaxError>;
}
