// SPDX-FileCopyrightText: 2026 Kid Fax Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! JSON state file holding one Seen-Set per source.
//!
//! ```json
//! {"seen_sids": ["SM1", "SM2"], "seen_update_ids": ["1001", "1002"]}
//! ```
//!
//! Arrays are oldest first. Writes go through a temp file in the same
//! directory and a rename, under an exclusive lock on `<file>.lock`, and
//! leave the arrays of other sources untouched.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use fs2::FileExt;
use kidfax_core::{KidfaxError, MessageId};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::ledger::SeenLedger;

/// Ledger key used by the Twilio SMS poller.
pub const SMS_LEDGER_KEY: &str = "seen_sids";

/// Ledger key used by the Telegram poller.
pub const TELEGRAM_LEDGER_KEY: &str = "seen_update_ids";

/// Reads and writes one source's Seen-Set inside a shared state file.
#[derive(Debug, Clone)]
pub struct LedgerStore {
    path: PathBuf,
    key: String,
    max_entries: usize,
}

impl LedgerStore {
    pub fn new(path: impl Into<PathBuf>, key: impl Into<String>, max_entries: usize) -> Self {
        Self {
            path: path.into(),
            key: key.into(),
            max_entries,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Loads the ledger. Never fails: a missing or unreadable file, a missing
    /// key, or malformed JSON all yield an empty ledger.
    pub fn load(&self) -> SeenLedger {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no state file yet");
                return SeenLedger::new(self.max_entries);
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "state file unreadable, starting empty");
                return SeenLedger::new(self.max_entries);
            }
        };

        let Some(root) = parse_root(&raw) else {
            warn!(path = %self.path.display(), "state file is not a JSON object, starting empty");
            return SeenLedger::new(self.max_entries);
        };

        let ids = match root.get(&self.key) {
            Some(Value::Array(items)) => items.iter().filter_map(id_from_value).collect(),
            Some(_) => {
                warn!(key = %self.key, "state entry is not an array, starting empty");
                Vec::new()
            }
            None => Vec::new(),
        };

        let ledger = SeenLedger::from_ids(ids, self.max_entries);
        debug!(key = %self.key, entries = ledger.len(), "loaded seen ledger");
        ledger
    }

    /// Atomically replaces this source's array with `ledger`.
    pub fn persist(&self, ledger: &SeenLedger) -> Result<(), KidfaxError> {
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir).map_err(state_err)?;

        let lock = self.lock()?;

        let mut root = fs::read_to_string(&self.path)
            .ok()
            .and_then(|raw| parse_root(&raw))
            .unwrap_or_default();
        let ids: Vec<Value> = ledger
            .iter()
            .map(|id| Value::String(id.as_str().to_string()))
            .collect();
        root.insert(self.key.clone(), Value::Array(ids));

        let body = serde_json::to_vec_pretty(&Value::Object(root)).map_err(state_err)?;
        let mut tmp = tempfile::NamedTempFile::new_in(&dir).map_err(state_err)?;
        tmp.write_all(&body).map_err(state_err)?;
        tmp.as_file().sync_all().map_err(state_err)?;
        tmp.persist(&self.path).map_err(|e| state_err(e.error))?;

        if let Err(e) = FileExt::unlock(&lock) {
            debug!(error = %e, "failed to release state lock");
        }
        debug!(key = %self.key, entries = ledger.len(), "persisted seen ledger");
        Ok(())
    }

    fn lock(&self) -> Result<File, KidfaxError> {
        let mut lock_path = self.path.clone().into_os_string();
        lock_path.push(".lock");
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(PathBuf::from(lock_path))
            .map_err(state_err)?;
        file.lock_exclusive().map_err(state_err)?;
        Ok(file)
    }
}

fn parse_root(raw: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str(raw) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

/// Older Telegram state files stored update ids as integers.
fn id_from_value(value: &Value) -> Option<MessageId> {
    match value {
        Value::String(s) if !s.is_empty() => Some(MessageId(s.clone())),
        Value::Number(n) => Some(MessageId(n.to_string())),
        _ => None,
    }
}

fn state_err<E>(e: E) -> KidfaxError
where
    E: std::error::Error + Send + Sync + 'static,
{
    KidfaxError::State {
        source: Box::new(e),
    }
}
