// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! SPI host transfer engine for the PSC9210 PCIe bridge.
//!
//! The controller multiplexes two mutually exclusive transfer mechanisms
//! behind one submit interface: the 8-byte on-chip FIFO for short bursts
//! and a pair of scatter-gather DMA channels for large transfers. One
//! transfer is in flight at a time; the bus abstraction above serializes
//! submissions and is woken exactly once per transfer through
//! [`SpiHostClient`], no matter which path serviced it or how many
//! interrupts it took.
//!
//! Register sequencing rules the hardware imposes:
//!
//! - mode bits settle before any chip-select change;
//! - the clock divider is rewritten only while its enable bit is low;
//! - DMA channels are armed before the shared DMA-go bit is issued.
//!
//! `submit` and `handle_interrupt` both run from the kernel's interrupt
//! service loop and never overlap; the top-half handler only marks the
//! interrupt pending.

use core::cell::Cell;
use core::cmp;

use log::{debug, warn};
use tock_registers::interfaces::{ReadWriteable, Readable, Writeable};

use crate::dma::{DmaChannel, DmaChannelRegisters, SgCursor, SgEntry, DMA_MAX_LEN, DMA_MIN_LEN};
use crate::errorcode::ErrorCode;
use crate::hil::spi::{ClockPhase, ClockPolarity, DataOrder, SpiHostClient};
use crate::hil::time::Delay;
use crate::registers::{
    FifoRegisters, ResetRegisters, SpiRegisters, BURST, CLK, CS, CS_DESELECT, CTRL, FIFO_DEPTH,
    INT, MODE, RESET,
};
use crate::utilities::cells::{OptionalCell, TakeCell};
use crate::utilities::StaticRef;

/// The SPI core clocks off a fixed 125 MHz PLL.
pub const PLL_HZ: u32 = 125_000_000;

/// Fastest supported wire rate, ceil(PLL / 3).
pub const MAX_SPEED_HZ: u32 = (PLL_HZ + 2) / 3;

/// Slowest supported wire rate, ceil(PLL / 255).
pub const MIN_SPEED_HZ: u32 = (PLL_HZ + 254) / 255;

/// The chip routes at most three chip-select lines.
pub const MAX_CHIP_SELECTS: u8 = 3;

const CLKDIV_MIN: u8 = 1;
const CLKDIV_MAX: u8 = 255;
const RESET_DELAY_MS: u32 = 10;

/// How the chip-select lines are wired on the board.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DecodeScheme {
    /// Every line driven directly from the select field; asserted lines
    /// are logic-low, so the field carries an inverted mask.
    Direct,
    /// An external 3-line decoder addressed by index.
    Decoder,
}

/// Payload of one transfer.
pub enum Payload {
    /// Flat buffers serviced through the FIFO window. Either side may be
    /// absent: a missing source clocks out zeroes, a missing sink
    /// discards.
    Buffers {
        tx: Option<&'static mut [u8]>,
        rx: Option<&'static mut [u8]>,
        len: usize,
    },
    /// Scatter-gather lists serviced through the DMA channels, one list
    /// per direction. Either list may be empty.
    ScatterGather {
        tx: &'static [SgEntry],
        rx: &'static [SgEntry],
    },
}

/// One transfer as submitted by the bus abstraction. Buffers are borrowed
/// by the driver until the completion callback hands them back.
pub struct TransferRequest {
    pub speed_hz: u32,
    pub chip_select: u8,
    pub polarity: ClockPolarity,
    pub phase: ClockPhase,
    pub order: DataOrder,
    pub payload: Payload,
}

/// The engine's working state. The tagged variant makes the FIFO and DMA
/// paths mutually exclusive: there is no way to have both active.
#[derive(Copy, Clone)]
enum Transfer {
    Idle,
    Fifo {
        tx_remaining: usize,
        tx_offset: usize,
        rx_remaining: usize,
        rx_offset: usize,
    },
    Dma {
        tx: SgCursor,
        rx: SgCursor,
    },
}

pub struct SpiHost<'a> {
    registers: StaticRef<SpiRegisters>,
    fifo: StaticRef<FifoRegisters>,
    reset: StaticRef<ResetRegisters>,
    tx_dma: DmaChannel,
    rx_dma: DmaChannel,

    client: OptionalCell<&'a dyn SpiHostClient>,

    configured: Cell<bool>,
    decode: Cell<DecodeScheme>,
    num_cs: Cell<u8>,
    max_hz: Cell<u32>,
    min_hz: Cell<u32>,
    polarity: Cell<ClockPolarity>,
    phase: Cell<ClockPhase>,
    order: Cell<DataOrder>,
    divider: Cell<u8>,
    active_cs: OptionalCell<u8>,

    active: Cell<Transfer>,
    transfer_len: Cell<usize>,
    tx_buf: TakeCell<'static, [u8]>,
    rx_buf: TakeCell<'static, [u8]>,
}

impl<'a> SpiHost<'a> {
    pub const fn new(
        registers: StaticRef<SpiRegisters>,
        fifo: StaticRef<FifoRegisters>,
        tx_dma: StaticRef<DmaChannelRegisters>,
        rx_dma: StaticRef<DmaChannelRegisters>,
        reset: StaticRef<ResetRegisters>,
    ) -> SpiHost<'a> {
        SpiHost {
            registers,
            fifo,
            reset,
            tx_dma: DmaChannel::new(tx_dma),
            rx_dma: DmaChannel::new(rx_dma),

            client: OptionalCell::empty(),

            configured: Cell::new(false),
            decode: Cell::new(DecodeScheme::Direct),
            num_cs: Cell::new(0),
            max_hz: Cell::new(MAX_SPEED_HZ),
            min_hz: Cell::new(MIN_SPEED_HZ),
            polarity: Cell::new(ClockPolarity::IdleLow),
            phase: Cell::new(ClockPhase::SampleLeading),
            order: Cell::new(DataOrder::MSBFirst),
            divider: Cell::new(CLKDIV_MAX),
            active_cs: OptionalCell::empty(),

            active: Cell::new(Transfer::Idle),
            transfer_len: Cell::new(0),
            tx_buf: TakeCell::empty(),
            rx_buf: TakeCell::empty(),
        }
    }

    pub fn set_client(&self, client: &'a dyn SpiHostClient) {
        self.client.set(client);
    }

    /// Reset the SPI core and leave it quiescent with every line
    /// de-asserted. The reset pulse needs a 10 ms settle time.
    pub fn init(&self, delay: &dyn Delay) {
        self.reset.reset.write(RESET::SPI::SET);
        delay.delay_ms(RESET_DELAY_MS);
        self.registers
            .inten
            .modify(INT::COMPLETE::CLEAR + INT::ERROR::CLEAR);
        self.registers.cs.write(CS::SEL.val(CS_DESELECT));
        self.active_cs.clear();
    }

    /// Quiesce the core on the way out: mask interrupts, disarm DMA and
    /// pulse reset.
    pub fn deinit(&self, delay: &dyn Delay) {
        self.registers
            .inten
            .modify(INT::COMPLETE::CLEAR + INT::ERROR::CLEAR);
        self.tx_dma.disable();
        self.rx_dma.disable();
        self.reset.reset.write(RESET::SPI::SET);
        delay.delay_ms(RESET_DELAY_MS);
    }

    /// One-time setup from the bus layer: advertised frequency bounds,
    /// the number of wired chip selects and the decode scheme.
    pub fn configure(
        &self,
        max_hz: u32,
        min_hz: u32,
        num_cs: u8,
        decode: DecodeScheme,
    ) -> Result<(), ErrorCode> {
        if self.is_busy() {
            return Err(ErrorCode::BUSY);
        }
        if num_cs == 0 || num_cs > MAX_CHIP_SELECTS {
            return Err(ErrorCode::INVAL);
        }
        if max_hz == 0 || min_hz == 0 || max_hz < min_hz {
            return Err(ErrorCode::INVAL);
        }
        self.max_hz.set(cmp::min(max_hz, MAX_SPEED_HZ));
        self.min_hz.set(cmp::max(min_hz, MIN_SPEED_HZ));
        self.num_cs.set(num_cs);
        self.decode.set(decode);
        self.configured.set(true);
        Ok(())
    }

    pub fn is_busy(&self) -> bool {
        !matches!(self.active.get(), Transfer::Idle)
    }

    /// The chip select currently asserted on the bus, if any.
    pub fn active_chip_select(&self) -> Option<u8> {
        self.active_cs.get()
    }

    /// Transfer-size policy for the bus layer: short transfers stay on
    /// the FIFO, and anything longer than one scatter-gather entry can
    /// carry must be split by the caller.
    pub fn can_use_dma(&self, len: usize) -> bool {
        len >= DMA_MIN_LEN && len <= DMA_MAX_LEN
    }

    /// Pick the divider for a requested rate. Out-of-range requests are
    /// not an error: the transfer proceeds at the closest achievable
    /// rate, with a warning.
    fn divider_for(&self, hz: u32) -> u8 {
        if hz > self.max_hz.get() {
            warn!(
                "spi: requested {} Hz above the {} Hz maximum, running at full speed",
                hz,
                self.max_hz.get()
            );
            CLKDIV_MIN
        } else if hz < self.min_hz.get() {
            warn!(
                "spi: requested {} Hz below the {} Hz minimum, running at minimum speed",
                hz,
                self.min_hz.get()
            );
            CLKDIV_MAX
        } else {
            // In range, so the ceiling division lands in [3, 255] and
            // never programs the invalid divider 0.
            ((PLL_HZ + hz - 1) / hz) as u8
        }
    }

    /// Program the wire rate. Returns the rate actually achieved.
    pub fn set_rate(&self, hz: u32) -> Result<u32, ErrorCode> {
        if hz == 0 {
            return Err(ErrorCode::INVAL);
        }
        let div = self.divider_for(hz);
        // The divider may only be rewritten while stopped.
        self.registers.clk.modify(CLK::EN::CLEAR);
        self.registers.clk.modify(CLK::DIV.val(div as u32));
        self.registers.clk.modify(CLK::EN::SET);
        self.divider.set(div);
        Ok(PLL_HZ / div as u32)
    }

    pub fn get_rate(&self) -> u32 {
        PLL_HZ / self.divider.get() as u32
    }

    pub fn set_polarity(&self, polarity: ClockPolarity) {
        self.polarity.set(polarity);
        self.apply_mode_bits();
    }

    pub fn get_polarity(&self) -> ClockPolarity {
        if self.registers.mode.is_set(MODE::CPOL) {
            ClockPolarity::IdleHigh
        } else {
            ClockPolarity::IdleLow
        }
    }

    pub fn set_phase(&self, phase: ClockPhase) {
        self.phase.set(phase);
        self.apply_mode_bits();
    }

    pub fn get_phase(&self) -> ClockPhase {
        if self.registers.mode.is_set(MODE::CPHA) {
            ClockPhase::SampleTrailing
        } else {
            ClockPhase::SampleLeading
        }
    }

    pub fn set_data_order(&self, order: DataOrder) {
        self.order.set(order);
        self.apply_mode_bits();
    }

    pub fn get_data_order(&self) -> DataOrder {
        if self.registers.mode.is_set(MODE::LSBFIRST) {
            DataOrder::LSBFirst
        } else {
            DataOrder::MSBFirst
        }
    }

    fn apply_mode_bits(&self) {
        let cpol = match self.polarity.get() {
            ClockPolarity::IdleLow => 0,
            ClockPolarity::IdleHigh => 1,
        };
        let cpha = match self.phase.get() {
            ClockPhase::SampleLeading => 0,
            ClockPhase::SampleTrailing => 1,
        };
        let lsb = match self.order.get() {
            DataOrder::MSBFirst => 0,
            DataOrder::LSBFirst => 1,
        };
        self.registers
            .mode
            .write(MODE::CPOL.val(cpol) + MODE::CPHA.val(cpha) + MODE::LSBFIRST.val(lsb));
    }

    /// Assert one chip select. The mode bits are rewritten first: they
    /// must be stable before the select field changes, or the clock line
    /// can glitch while a peripheral is listening.
    fn select_chip(&self, cs_index: u8) {
        self.apply_mode_bits();
        let field = match self.decode.get() {
            DecodeScheme::Decoder => cs_index as u32,
            DecodeScheme::Direct => !(1u32 << cs_index) & 0xFF,
        };
        self.registers.cs.write(CS::SEL.val(field));
        self.active_cs.set(cs_index);
    }

    /// De-assert every line. The all-ones sentinel releases the bus in
    /// both decode schemes.
    fn deselect(&self) {
        self.apply_mode_bits();
        self.registers.cs.write(CS::SEL.val(CS_DESELECT));
        self.active_cs.clear();
    }

    /// Start the next FIFO burst: up to 8 bytes copied into the window,
    /// completion interrupts armed, start bit issued. Returns `false`
    /// when no bytes remain, which ends the transfer.
    fn fifo_fill_burst(&self) -> bool {
        if let Transfer::Fifo {
            tx_remaining,
            tx_offset,
            rx_remaining,
            rx_offset,
        } = self.active.get()
        {
            let burst = cmp::min(tx_remaining, FIFO_DEPTH);
            if burst == 0 {
                return false;
            }
            self.registers.burst.write(BURST::LEN.val(burst as u32));
            if self.tx_buf.is_none() {
                // No source buffer: clock out zeroes.
                for i in 0..burst {
                    self.fifo.data[i].set(0);
                }
            } else {
                self.tx_buf.map(|buf| {
                    for i in 0..burst {
                        self.fifo.data[i].set(buf[tx_offset + i]);
                    }
                });
            }
            self.active.set(Transfer::Fifo {
                tx_remaining: tx_remaining - burst,
                tx_offset: tx_offset + burst,
                rx_remaining,
                rx_offset,
            });
            self.registers
                .inten
                .modify(INT::COMPLETE::SET + INT::ERROR::SET);
            self.registers.ctrl.modify(CTRL::FIFO_START::SET);
            true
        } else {
            false
        }
    }

    /// Read back the burst that just finished. Runs before the next fill
    /// so the window can serve both directions across bursts.
    fn fifo_drain_burst(&self) {
        if let Transfer::Fifo {
            tx_remaining,
            tx_offset,
            rx_remaining,
            rx_offset,
        } = self.active.get()
        {
            let burst = cmp::min(rx_remaining, FIFO_DEPTH);
            if burst == 0 {
                return;
            }
            if self.rx_buf.is_none() {
                // No sink buffer: drain and discard.
                for i in 0..burst {
                    let _ = self.fifo.data[i].get();
                }
            } else {
                self.rx_buf.map(|buf| {
                    for i in 0..burst {
                        buf[rx_offset + i] = self.fifo.data[i].get();
                    }
                });
            }
            self.active.set(Transfer::Fifo {
                tx_remaining,
                tx_offset,
                rx_remaining: rx_remaining - burst,
                rx_offset: rx_offset + burst,
            });
        }
    }

    /// Hand one scatter-gather entry per direction to hardware and issue
    /// DMA-go. A direction whose list has run out is disarmed while the
    /// other keeps going. Returns `false` once both lists are exhausted,
    /// which ends the transfer.
    fn dma_advance(&self) -> bool {
        if let Transfer::Dma { mut tx, mut rx } = self.active.get() {
            if tx.is_exhausted() && rx.is_exhausted() {
                return false;
            }
            match tx.advance() {
                Some(entry) => self.tx_dma.program_entry(entry),
                None => self.tx_dma.disable(),
            }
            match rx.advance() {
                Some(entry) => self.rx_dma.program_entry(entry),
                None => self.rx_dma.disable(),
            }
            self.active.set(Transfer::Dma { tx, rx });
            self.registers
                .inten
                .modify(INT::COMPLETE::SET + INT::ERROR::SET);
            self.registers.ctrl.modify(CTRL::DMA_START::SET);
            true
        } else {
            false
        }
    }

    /// Tear down the finished transfer and wake the client. Only called
    /// from a non-`Idle` state, which is what bounds the callback to one
    /// invocation per transfer.
    fn complete_transfer(&self, status: Result<usize, ErrorCode>) {
        self.registers
            .inten
            .modify(INT::COMPLETE::CLEAR + INT::ERROR::CLEAR);
        self.tx_dma.disable();
        self.rx_dma.disable();
        self.deselect();
        self.active.set(Transfer::Idle);
        let tx = self.tx_buf.take();
        let rx = self.rx_buf.take();
        self.client.map(|client| client.transfer_done(tx, rx, status));
    }

    /// Submit one transfer. Returns immediately; completion arrives
    /// through the client callback. Malformed requests are rejected here
    /// with the request handed back, before any hardware state changes.
    pub fn submit(&self, transfer: TransferRequest) -> Result<(), (ErrorCode, TransferRequest)> {
        if !self.configured.get() {
            return Err((ErrorCode::OFF, transfer));
        }
        if self.is_busy() {
            return Err((ErrorCode::BUSY, transfer));
        }
        if transfer.speed_hz == 0 {
            return Err((ErrorCode::INVAL, transfer));
        }
        if transfer.chip_select >= self.num_cs.get() {
            return Err((ErrorCode::INVAL, transfer));
        }
        match &transfer.payload {
            Payload::Buffers { tx, rx, len } => {
                let mut count = *len;
                if let Some(buf) = tx {
                    count = cmp::min(count, buf.len());
                }
                if let Some(buf) = rx {
                    count = cmp::min(count, buf.len());
                }
                if count == 0 || (tx.is_none() && rx.is_none()) {
                    return Err((ErrorCode::INVAL, transfer));
                }
            }
            Payload::ScatterGather { tx, rx } => {
                if tx.is_empty() && rx.is_empty() {
                    return Err((ErrorCode::INVAL, transfer));
                }
                for entry in tx.iter().chain(rx.iter()) {
                    if entry.len == 0 {
                        return Err((ErrorCode::INVAL, transfer));
                    }
                    if entry.len as usize > DMA_MAX_LEN {
                        return Err((ErrorCode::SIZE, transfer));
                    }
                }
            }
        }

        // Mode and rate settle first, then the chip select asserts.
        self.polarity.set(transfer.polarity);
        self.phase.set(transfer.phase);
        self.order.set(transfer.order);
        if let Err(e) = self.set_rate(transfer.speed_hz) {
            return Err((e, transfer));
        }
        self.select_chip(transfer.chip_select);

        match transfer.payload {
            Payload::Buffers { tx, rx, len } => {
                let mut count = len;
                if let Some(ref buf) = tx {
                    count = cmp::min(count, buf.len());
                }
                if let Some(ref buf) = rx {
                    count = cmp::min(count, buf.len());
                }
                self.transfer_len.set(count);
                self.tx_buf.put(tx);
                self.rx_buf.put(rx);
                self.active.set(Transfer::Fifo {
                    tx_remaining: count,
                    tx_offset: 0,
                    rx_remaining: count,
                    rx_offset: 0,
                });
                self.fifo_fill_burst();
            }
            Payload::ScatterGather { tx, rx } => {
                let tx_cursor = SgCursor::new(tx);
                let rx_cursor = SgCursor::new(rx);
                self.transfer_len
                    .set(cmp::max(tx_cursor.total_len(), rx_cursor.total_len()));
                self.active.set(Transfer::Dma {
                    tx: tx_cursor,
                    rx: rx_cursor,
                });
                self.dma_advance();
            }
        }
        Ok(())
    }

    /// Service the shared interrupt line.
    ///
    /// The line is shared with unrelated devices, so the status register
    /// decides whether this core is involved at all. Every observed
    /// status bit is acknowledged (write-1-to-clear), and an interrupt
    /// that arrives with no transfer in flight changes nothing.
    pub fn handle_interrupt(&self) {
        let stat = self.registers.stat.extract();
        let complete = stat.is_set(INT::COMPLETE);
        let error = stat.is_set(INT::ERROR);
        if !complete && !error {
            // Not ours.
            return;
        }
        self.registers
            .stat
            .write(INT::COMPLETE.val(complete as u32) + INT::ERROR.val(error as u32));

        if error {
            match self.active.get() {
                Transfer::Idle => {}
                _ => {
                    self.transfer_len.set(0);
                    self.complete_transfer(Err(ErrorCode::FAIL));
                }
            }
            return;
        }

        match self.active.get() {
            Transfer::Idle => {}
            Transfer::Fifo { .. } => {
                self.fifo_drain_burst();
                if !self.fifo_fill_burst() {
                    let len = self.transfer_len.take();
                    self.complete_transfer(Ok(len));
                }
            }
            Transfer::Dma { .. } => {
                if !self.dma_advance() {
                    let len = self.transfer_len.take();
                    self.complete_transfer(Ok(len));
                }
            }
        }
    }

    /// Force-stop the current transfer. The hardware cannot cancel a
    /// burst mid-flight, so this masks the interrupts, disarms both DMA
    /// channels and abandons the transfer; no completion callback fires.
    /// The borrowed buffers come back to the caller directly.
    pub fn abort(&self) -> (Option<&'static mut [u8]>, Option<&'static mut [u8]>) {
        if self.is_busy() {
            debug!("spi: aborting transfer in flight");
        }
        self.registers
            .inten
            .modify(INT::COMPLETE::CLEAR + INT::ERROR::CLEAR);
        self.tx_dma.disable();
        self.rx_dma.disable();
        self.deselect();
        self.active.set(Transfer::Idle);
        self.transfer_len.set(0);
        (self.tx_buf.take(), self.rx_buf.take())
    }
}
