// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Interfaces for SPI master (controller) communication.

use crate::errorcode::ErrorCode;

/// Data order defines the order of bits sent over the wire: most significant
/// first, or least significant first.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DataOrder {
    /// Send the most significant bit first.
    MSBFirst,
    /// Send the least significant bit first.
    LSBFirst,
}

/// Clock polarity (CPOL) defines whether the SPI clock is high or low when
/// idle.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ClockPolarity {
    /// The clock is low when the SPI bus is not active. This is CPOL = 0.
    IdleLow,
    /// The clock is high when the SPI bus is not active. This is CPOL = 1.
    IdleHigh,
}

/// Clock phase (CPHA) defines whether to sample and send data on a leading
/// or trailing clock edge.
///
/// Consult a SPI reference on how CPHA interacts with CPOL.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ClockPhase {
    /// Sample on the leading clock edge. This is CPHA = 0.
    SampleLeading,
    /// Sample on the trailing clock edge. This is CPHA = 1.
    SampleTrailing,
}

/// Trait for clients of the SPI host.
///
/// The host invokes this callback exactly once per accepted transfer, from
/// its interrupt handler, after the transfer has finished or failed. The
/// buffers lent through the submitted request are handed back here; the
/// driver retains no reference to them afterwards.
pub trait SpiHostClient {
    /// Callback issued when a transfer finishes.
    ///
    /// `write_buffer` and `read_buffer` are the flat buffers passed at
    /// submission, if any; scatter-gather transfers pass `None` for both.
    /// `status` is `Ok(len)` with the number of bytes moved, or the error
    /// reported by the transceiver.
    fn transfer_done(
        &self,
        write_buffer: Option<&'static mut [u8]>,
        read_buffer: Option<&'static mut [u8]>,
        status: Result<usize, ErrorCode>,
    );
}
