// SPDX-FileCopyrightText: 2026 Kid Fax Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Receipt printer support for kidfax.
//!
//! Drivers open connections to USB, serial, Bluetooth, network, or dummy
//! printers; [`PrinterSink`] keeps at most one connection open and drops it
//! on the first failed write.

pub mod dummy;
pub mod escpos;
pub mod factory;
pub mod network;
pub mod serial;
pub mod sink;
pub mod stream;
pub mod usb;

pub use dummy::DummyDriver;
pub use escpos::EscPosEncoder;
pub use factory::{build_driver, build_sink};
pub use network::NetworkDriver;
pub use serial::SerialDriver;
pub use sink::{PrinterSink, PrinterState};
pub use usb::UsbDriver;
