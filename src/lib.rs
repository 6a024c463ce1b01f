// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Peripherals of the PSC9210 PCIe multi-function bridge.
//!
//! This crate drives the SPI host core of the PSC9210: clock and mode
//! configuration, chip-select arbitration over up to three devices, an
//! 8-byte FIFO path for short transfers and two scatter-gather DMA
//! channels for large ones. The PCI layer above maps the chip's register
//! windows and routes the shared interrupt line; this crate owns
//! everything behind those windows.

#![no_std]

#[cfg(test)]
extern crate std;

pub mod dma;
pub mod errorcode;
pub mod hil;
pub mod registers;
pub mod spi_host;
pub mod utilities;

#[cfg(test)]
mod testing;

pub use crate::dma::SgEntry;
pub use crate::errorcode::ErrorCode;
pub use crate::hil::spi::SpiHostClient;
pub use crate::spi_host::{DecodeScheme, Payload, SpiHost, TransferRequest};
