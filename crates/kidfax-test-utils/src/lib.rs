// SPDX-FileCopyrightText: 2026 Kid Fax Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for kidfax integration tests.
//!
//! Mock adapters and a harness that runs the real pipeline without network
//! access or printer hardware.
//!
//! # Components
//!
//! - [`MockSource`] - scriptable message source (fixed window or long polling)
//! - [`MockPrinter`] - printer driver that fails on demand and records receipts
//! - [`RecordingDisplay`] - status display that records its calls
//! - [`TestHarness`] - pipeline wired to the mocks and a temp state file

pub mod harness;
pub mod mock_display;
pub mod mock_printer;
pub mod mock_source;

pub use harness::{TestHarness, TestHarnessBuilder};
pub use mock_display::RecordingDisplay;
pub use mock_printer::MockPrinter;
pub use mock_source::{MockSource, inbound};
