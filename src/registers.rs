// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Register maps for the SPI host core.
//!
//! The core exposes three independently mapped windows besides the DMA
//! channel blocks (see `dma.rs`): the SPI control window, the 8-byte FIFO
//! window and the common reset register. The PCI layer maps each window and
//! hands this driver a [`StaticRef`](crate::utilities::StaticRef) per
//! window; no physical addresses appear here.

use tock_registers::registers::ReadWrite;
use tock_registers::{register_bitfields, register_structs};

/// FIFO depth in bytes. One burst never moves more than this.
pub const FIFO_DEPTH: usize = 8;

/// Value written to the chip-select field to de-assert every line,
/// regardless of the decode scheme in use.
pub const CS_DESELECT: u32 = 0xFF;

register_structs! {
    /// SPI control window.
    pub SpiRegisters {
        /// Transfer start bits
        (0x00 => pub(crate) ctrl: ReadWrite<u32, CTRL::Register>),
        /// Clock divider off the 125 MHz PLL
        (0x04 => pub(crate) clk: ReadWrite<u32, CLK::Register>),
        /// CPOL/CPHA/bit-order mode bits
        (0x08 => pub(crate) mode: ReadWrite<u32, MODE::Register>),
        /// Chip-select field (index or inverted line mask)
        (0x0C => pub(crate) cs: ReadWrite<u32, CS::Register>),
        /// FIFO burst length, 1..=8
        (0x10 => pub(crate) burst: ReadWrite<u32, BURST::Register>),
        /// Interrupt enables
        (0x14 => pub(crate) inten: ReadWrite<u32, INT::Register>),
        /// Interrupt status, write-1-to-clear
        (0x18 => pub(crate) stat: ReadWrite<u32, INT::Register>),
        (0x1C => @END),
    }
}

register_structs! {
    /// Byte-wide FIFO window.
    pub FifoRegisters {
        (0x00 => pub(crate) data: [ReadWrite<u8>; FIFO_DEPTH]),
        (0x08 => @END),
    }
}

register_structs! {
    /// Common reset register shared with the sibling cores on the chip.
    pub ResetRegisters {
        (0x00 => pub(crate) reset: ReadWrite<u32, RESET::Register>),
        (0x04 => @END),
    }
}

register_bitfields![u32,
    pub CTRL [
        /// Start a FIFO burst of `BURST::LEN` bytes
        FIFO_START OFFSET(0) NUMBITS(1) [],
        /// Start whichever DMA channels have been armed
        DMA_START OFFSET(1) NUMBITS(1) []
    ],
    pub CLK [
        /// Divider off the PLL; 0 is invalid and must never be programmed
        DIV OFFSET(0) NUMBITS(8) [],
        /// Divider enable. Must be low while DIV is rewritten.
        EN OFFSET(8) NUMBITS(1) []
    ],
    pub MODE [
        CPOL OFFSET(0) NUMBITS(1) [],
        CPHA OFFSET(1) NUMBITS(1) [],
        LSBFIRST OFFSET(2) NUMBITS(1) []
    ],
    pub CS [
        /// With the external decoder: the chip-select index. With direct
        /// drive: the inverted line mask (asserted lines are logic-low).
        /// All-ones de-asserts in either scheme.
        SEL OFFSET(0) NUMBITS(8) []
    ],
    pub BURST [
        LEN OFFSET(0) NUMBITS(4) []
    ],
    pub INT [
        /// Transfer-complete (FIFO burst done or armed DMA entries done)
        COMPLETE OFFSET(0) NUMBITS(1) [],
        /// Transceiver error
        ERROR OFFSET(1) NUMBITS(1) []
    ],
    pub RESET [
        /// Reset the SPI core. Requires a 10 ms settle delay.
        SPI OFFSET(0) NUMBITS(1) []
    ]
];
