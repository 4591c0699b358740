// SPDX-FileCopyrightText: 2026 Kid Fax Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Seen-Set persistence for kidfax.
//!
//! [`SeenLedger`] is the in-memory bounded set of handled message ids;
//! [`LedgerStore`] loads and atomically persists it in the shared JSON
//! state file.

pub mod ledger;
pub mod store;

pub use ledger::SeenLedger;
pub use store::{LedgerStore, SMS_LEDGER_KEY, TELEGRAM_LEDGER_KEY};
