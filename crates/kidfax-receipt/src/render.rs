// SPDX-FileCopyrightText: 2026 Kid Fax Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Receipt layout for one authorized message.

use std::sync::Arc;

use chrono::Local;
use kidfax_config::KidfaxConfig;
use kidfax_core::{
    Align, AuthorizedMessage, Directive, ImageProcessor, KidfaxError, MonoImage, Receipt,
    TextStyle,
};
use tracing::warn;

use crate::avatar::AvatarStore;
use crate::dither::DitherProcessor;
use crate::encoding::Codepage;
use crate::wrap::wrap_text;

const HEADER: TextStyle = TextStyle::new(Align::Center, true, true);
const CENTERED: TextStyle = TextStyle::new(Align::Center, false, false);
const SENDER: TextStyle = TextStyle::new(Align::Left, true, false);
const BODY: TextStyle = TextStyle::new(Align::Left, false, false);

/// Layout parameters for [`ReceiptRenderer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderSettings {
    pub header: String,
    pub line_width: usize,
    /// Edge length of printed photo attachments.
    pub image_size: u32,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            header: "Kid Fax".to_string(),
            line_width: 32,
            image_size: 96,
        }
    }
}

/// Turns an [`AuthorizedMessage`] into printer directives.
#[derive(Clone)]
pub struct ReceiptRenderer {
    settings: RenderSettings,
    codepage: Codepage,
    avatars: Option<AvatarStore>,
    images: Arc<dyn ImageProcessor>,
}

impl ReceiptRenderer {
    pub fn new(
        settings: RenderSettings,
        codepage: Codepage,
        avatars: Option<AvatarStore>,
        images: Arc<dyn ImageProcessor>,
    ) -> Self {
        Self {
            settings,
            codepage,
            avatars,
            images,
        }
    }

    /// Builds the renderer described by the loaded configuration.
    pub fn from_config(config: &KidfaxConfig) -> Result<Self, KidfaxError> {
        let codepage = Codepage::from_label(&config.printer.encoding)?;
        let images: Arc<dyn ImageProcessor> = Arc::new(DitherProcessor::new());
        let avatars = config
            .avatar
            .enabled
            .then(|| AvatarStore::new(&config.avatar.dir, config.avatar.size, images.clone()));
        let settings = RenderSettings {
            header: config.general.header.clone(),
            line_width: config.printer.line_width,
            image_size: config.telegram.image_size,
        };
        Ok(Self::new(settings, codepage, avatars, images))
    }

    pub fn codepage(&self) -> Codepage {
        self.codepage
    }

    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    pub fn render(&self, authorized: &AuthorizedMessage) -> Receipt {
        let message = &authorized.message;
        let mut receipt = Receipt::new();

        receipt.style(HEADER);
        receipt.line(self.codepage.sanitize(&self.settings.header));

        receipt.style(CENTERED);
        let stamp = message.received_at.with_timezone(&Local);
        receipt.line(stamp.format("%Y-%m-%d %H:%M").to_string());
        receipt.line("-".repeat(self.settings.line_width));

        receipt.style(SENDER);
        receipt.line(format!("From: {}", self.codepage.sanitize(&authorized.label)));
        receipt.blank();

        if let Some(avatar) = authorized
            .contact_name
            .as_deref()
            .zip(self.avatars.as_ref())
            .and_then(|(name, store)| store.load(name))
        {
            image_block(&mut receipt, avatar);
        }

        receipt.style(BODY);
        let body = self.codepage.sanitize(&message.text);
        if !body.trim().is_empty() {
            for line in wrap_text(body.trim_end(), self.settings.line_width) {
                receipt.line(line);
            }
            receipt.blank();
        }

        if let Some(attachment) = &message.attachment {
            match self
                .images
                .process(&attachment.data, self.settings.image_size)
            {
                Ok(image) => image_block(&mut receipt, image),
                Err(e) => warn!(
                    message_id = %message.id,
                    mime = %attachment.mime_type,
                    error = %e,
                    "skipping attachment that could not be processed"
                ),
            }
        }

        receipt.style(BODY);
        receipt.blank();
        receipt.push(Directive::Cut);
        receipt
    }
}

fn image_block(receipt: &mut Receipt, image: MonoImage) {
    receipt.style(CENTERED);
    receipt.blank();
    receipt.push(Directive::Image(image));
    receipt.blank();
}

impl std::fmt::Debug for ReceiptRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReceiptRenderer")
            .field("settings", &self.settings)
            .field("codepage", &self.codepage)
            .field("avatars", &self.avatars)
            .finish()
    }
}
