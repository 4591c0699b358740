// SPDX-FileCopyrightText: 2026 Kid Fax Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Picks the printer driver named in configuration.

use std::sync::Arc;
use std::time::Duration;

use kidfax_config::{PrinterConfig, PrinterDriverKind};
use kidfax_core::PrinterDriver;
use kidfax_receipt::Codepage;

use crate::dummy::DummyDriver;
use crate::escpos::EscPosEncoder;
use crate::network::NetworkDriver;
use crate::serial::SerialDriver;
use crate::sink::PrinterSink;
use crate::usb::UsbDriver;

/// The driver selected by `printer.driver`.
pub fn build_driver(config: &PrinterConfig, codepage: Codepage) -> Arc<dyn PrinterDriver> {
    let encoder = EscPosEncoder::new(codepage);
    let serial_timeout = Duration::from_millis(config.serial_timeout_ms);
    match config.driver {
        PrinterDriverKind::Usb => Arc::new(UsbDriver::new(&config.usb_device, encoder)),
        PrinterDriverKind::Serial => Arc::new(SerialDriver::new(
            &config.serial_port,
            config.baud_rate,
            serial_timeout,
            encoder,
        )),
        PrinterDriverKind::Bluetooth => Arc::new(SerialDriver::bluetooth(
            &config.bluetooth_port,
            config.baud_rate,
            serial_timeout,
            encoder,
        )),
        PrinterDriverKind::Network => Arc::new(NetworkDriver::new(
            &config.network_host,
            config.network_port,
            encoder,
        )),
        PrinterDriverKind::Dummy => Arc::new(DummyDriver::stdout(config.line_width)),
    }
}

/// A sink for the configured driver, with the dummy fallback when
/// `printer.allow_dummy` is set.
pub fn build_sink(config: &PrinterConfig, codepage: Codepage) -> PrinterSink {
    let sink = PrinterSink::new(build_driver(config, codepage));
    if config.allow_dummy && config.driver != PrinterDriverKind::Dummy {
        sink.with_fallback(Arc::new(DummyDriver::stdout(config.line_width)))
    } else {
        sink
    }
}
