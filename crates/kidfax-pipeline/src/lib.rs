// SPDX-FileCopyrightText: 2026 Kid Fax Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Polling pipeline for kidfax.
//!
//! Each cycle fetches new messages from one source, drops ids already in the
//! Seen-Set, applies the allowlist, prints the rest in order, updates the
//! status display, and saves the Seen-Set once.

pub mod filter;
pub mod pipeline;
pub mod shutdown;

pub use filter::{RejectReason, Verdict, authorize, sender_label};
pub use pipeline::{CycleReport, Pipeline, PipelineSettings, PipelineState};
pub use shutdown::install_signal_handler;
