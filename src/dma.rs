// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scatter-gather DMA channels of the SPI host core.
//!
//! The core has two independent channels, one per direction. Software hands
//! each channel one (address, length) entry at a time; the shared DMA-go
//! bit in the control window then starts whichever channels were armed, so
//! a large transfer takes one interrupt per scatter-gather entry.

use tock_registers::interfaces::{ReadWriteable, Writeable};
use tock_registers::registers::ReadWrite;
use tock_registers::{register_bitfields, register_structs};

use crate::utilities::StaticRef;

/// Transfers shorter than this stay on the FIFO path.
pub const DMA_MIN_LEN: usize = 8;

/// Largest length one scatter-gather entry can carry. Callers split
/// anything bigger into multiple entries.
pub const DMA_MAX_LEN: usize = 64 * 1024;

register_structs! {
    /// One DMA channel block. The TX and RX channels have identical
    /// layouts at independent base addresses.
    pub DmaChannelRegisters {
        (0x00 => pub(crate) ctrl: ReadWrite<u32, DMA_CTRL::Register>),
        /// Low half of the 64-bit device address
        (0x04 => pub(crate) addr_lo: ReadWrite<u32>),
        /// High half of the 64-bit device address
        (0x08 => pub(crate) addr_hi: ReadWrite<u32>),
        (0x0C => pub(crate) len: ReadWrite<u32, DMA_LEN::Register>),
        (0x10 => @END),
    }
}

register_bitfields![u32,
    pub DMA_CTRL [
        /// Channel armed. Must be set before the shared DMA-go bit is
        /// issued.
        EN OFFSET(0) NUMBITS(1) []
    ],
    pub DMA_LEN [
        LEN OFFSET(0) NUMBITS(24) []
    ]
];

/// One scatter-gather entry: a device memory address and a byte count.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SgEntry {
    pub addr: u64,
    pub len: u32,
}

/// Engine-owned cursor over a caller-provided scatter-gather list.
///
/// The caller's list is only ever read; all progress state lives in the
/// cursor, so the list can be reused by the caller once the transfer
/// completes.
#[derive(Copy, Clone)]
pub struct SgCursor {
    list: &'static [SgEntry],
    next: usize,
}

impl SgCursor {
    pub fn new(list: &'static [SgEntry]) -> SgCursor {
        SgCursor { list, next: 0 }
    }

    /// True once every entry has been handed to hardware.
    pub fn is_exhausted(&self) -> bool {
        self.next >= self.list.len()
    }

    /// Step past the current entry, returning it for programming. `None`
    /// once the list is exhausted.
    pub fn advance(&mut self) -> Option<SgEntry> {
        let entry = self.list.get(self.next).copied();
        if entry.is_some() {
            self.next += 1;
        }
        entry
    }

    /// Total number of bytes the list describes.
    pub fn total_len(&self) -> usize {
        self.list.iter().map(|e| e.len as usize).sum()
    }
}

/// Driver handle for one DMA channel.
pub struct DmaChannel {
    registers: StaticRef<DmaChannelRegisters>,
}

impl DmaChannel {
    pub const fn new(registers: StaticRef<DmaChannelRegisters>) -> DmaChannel {
        DmaChannel { registers }
    }

    /// Program one entry and arm the channel. Nothing moves until the
    /// shared DMA-go bit in the control window is issued.
    pub(crate) fn program_entry(&self, entry: SgEntry) {
        self.registers.addr_lo.set(entry.addr as u32);
        self.registers.addr_hi.set((entry.addr >> 32) as u32);
        self.registers.len.write(DMA_LEN::LEN.val(entry.len));
        self.registers.ctrl.modify(DMA_CTRL::EN::SET);
    }

    pub(crate) fn disable(&self) {
        self.registers.ctrl.modify(DMA_CTRL::EN::CLEAR);
    }
}
