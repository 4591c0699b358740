// SPDX-FileCopyrightText: 2026 Kid Fax Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message source trait for inbound integrations (SMS gateway, chat bot).

use async_trait::async_trait;

use crate::error::KidfaxError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{Attachment, AttachmentRef, Cursor, FetchBatch};

/// A source of inbound messages polled by the pipeline.
///
/// Implementations must not mutate any state on failure: a failed fetch is
/// retried later with the same cursor.
#[async_trait]
pub trait MessageSource: PluginAdapter {
    /// Key under which this source's Seen-Set lives in the state file.
    fn ledger_key(&self) -> &'static str;

    /// Fetches candidate messages newer than `cursor`, in chronological order.
    ///
    /// Sources without server-side cursors ignore the argument and return a
    /// recent window; the pipeline deduplicates against the Seen-Set.
    async fn fetch_new(&self, cursor: Option<Cursor>) -> Result<FetchBatch, KidfaxError>;

    /// Downloads an attachment left behind by `fetch_new`.
    ///
    /// Called only for messages that passed the Seen-Set and the allowlist.
    /// `Ok(None)` means the attachment is skipped, e.g. because it is too large.
    async fn fetch_attachment(
        &self,
        reference: &AttachmentRef,
    ) -> Result<Option<Attachment>, KidfaxError> {
        let _ = reference;
        Ok(None)
    }
}
