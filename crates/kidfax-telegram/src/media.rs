// SPDX-FileCopyrightText: 2026 Kid Fax Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Photo downloads.

use kidfax_core::{Attachment, AttachmentRef, KidfaxError};
use teloxide::Bot;
use teloxide::net::Download;
use teloxide::prelude::Requester;
use teloxide::types::{FileId, PhotoSize};
use tracing::{debug, warn};

/// Telegram re-encodes every photo as JPEG.
const PHOTO_MIME: &str = "image/jpeg";

/// Deferred download handle for a photo variant.
pub fn photo_ref(photo: &PhotoSize) -> AttachmentRef {
    AttachmentRef {
        file_id: photo.file.id.to_string(),
        declared_size: u64::from(photo.file.size),
    }
}

/// Downloads one photo if it is no larger than `max_bytes`.
///
/// Returns `Ok(None)` for oversized photos.
pub async fn download_photo(
    bot: &Bot,
    photo: &AttachmentRef,
    max_bytes: u64,
) -> Result<Option<Attachment>, KidfaxError> {
    let declared = photo.declared_size;
    if declared > max_bytes {
        warn!(size = declared, max = max_bytes, "photo too large, skipping");
        return Ok(None);
    }

    let file = bot
        .get_file(FileId(photo.file_id.clone()))
        .await
        .map_err(|e| KidfaxError::from_source("failed to get photo info", e))?;

    let mut data = Vec::new();
    bot.download_file(&file.path, &mut data)
        .await
        .map_err(|e| KidfaxError::from_source("failed to download photo", e))?;

    if data.len() as u64 > max_bytes {
        warn!(size = data.len(), max = max_bytes, "downloaded photo too large, dropping");
        return Ok(None);
    }

    debug!(file_id = %photo.file_id, size = data.len(), "downloaded photo");
    Ok(Some(Attachment {
        data,
        mime_type: PHOTO_MIME.to_string(),
    }))
}
