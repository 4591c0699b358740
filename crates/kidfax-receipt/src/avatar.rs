// SPDX-FileCopyrightText: 2026 Kid Fax Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Contact avatars stored as `<dir>/<name>.png`.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use kidfax_core::{ImageProcessor, MonoImage};
use tracing::{debug, warn};

/// Read-only view of the avatar directory.
#[derive(Clone)]
pub struct AvatarStore {
    dir: PathBuf,
    size: u32,
    processor: Arc<dyn ImageProcessor>,
}

impl AvatarStore {
    pub fn new(dir: impl Into<PathBuf>, size: u32, processor: Arc<dyn ImageProcessor>) -> Self {
        Self {
            dir: dir.into(),
            size,
            processor,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the avatar for `contact`: exact file name first, then a
    /// case-insensitive match on the file stem.
    pub fn find(&self, contact: &str) -> Option<PathBuf> {
        let exact = self.dir.join(format!("{contact}.png"));
        if exact.is_file() {
            return Some(exact);
        }

        let wanted = contact.to_lowercase();
        let entries = std::fs::read_dir(&self.dir).ok()?;
        entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .find(|path| {
                path.extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("png"))
                    && path
                        .file_stem()
                        .and_then(|stem| stem.to_str())
                        .is_some_and(|stem| stem.to_lowercase() == wanted)
            })
    }

    /// The printable avatar for `contact`, or `None` when there is no usable one.
    pub fn load(&self, contact: &str) -> Option<MonoImage> {
        let path = self.find(contact)?;
        let raw = match std::fs::read(&path) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "cannot read avatar");
                return None;
            }
        };
        match self.processor.process(&raw, self.size) {
            Ok(image) => {
                debug!(contact, path = %path.display(), "using avatar");
                Some(image)
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "cannot process avatar");
                None
            }
        }
    }

    /// Contact names that have an avatar, sorted.
    pub fn list(&self) -> Vec<String> {
        let Ok(entries) = std::fs::read_dir(&self.dir) else {
            return Vec::new();
        };
        let mut names: Vec<String> = entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| {
                path.extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("png"))
            })
            .filter_map(|path| path.file_stem()?.to_str().map(str::to_string))
            .collect();
        names.sort();
        names
    }
}

impl std::fmt::Debug for AvatarStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AvatarStore")
            .field("dir", &self.dir)
            .field("size", &self.size)
            .finish()
    }
}
