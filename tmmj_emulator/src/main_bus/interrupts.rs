//! Interrupt sources of the main CPU.
//!
//! | Level | Source                                            |
//! |-------|---------------------------------------------------|
//! | 5     | Start of each frame                               |
//! | 3     | Middle of each frame, and blit completion         |
use bitcode::Decode;
use bitcode::Encode;
use intbits::Bits;
use log::debug;

use crate::common::clock::ClockInfo;
use crate::common::clock::CYCLES_PER_FRAME;

pub const FRAME_IRQ_LEVEL: u8 = 5;
pub const MID_FRAME_IRQ_LEVEL: u8 = 3;
pub const BLIT_DONE_IRQ_LEVEL: u8 = 3;

/// Delay between the end of a blit and its completion interrupt.
pub const BLIT_DONE_DELAY_MICROS: u64 = 500;

#[derive(Default, Clone, Debug, PartialEq, Eq, Encode, Decode)]
pub struct InterruptController {
    /// Bit n is set while an interrupt of level n is pending.
    pending: u8,
    /// Master clock at which the blit completion interrupt fires. A later blit replaces an
    /// earlier one that has not fired yet.
    blit_done_at: Option<u64>,
}

impl InterruptController {
    pub fn raise(&mut self, level: u8) {
        self.pending.set_bit(level as usize, true);
    }

    pub fn pending(&self) -> u8 {
        self.pending
    }

    pub fn blit_done_at(&self) -> Option<u64> {
        self.blit_done_at
    }

    pub fn schedule_blit_done(&mut self, master_clock: u64) {
        let fire_at = master_clock + ClockInfo::micros_to_cycles(BLIT_DONE_DELAY_MICROS);
        if let Some(previous) = self.blit_done_at.replace(fire_at) {
            debug!(target: "bus", "Blit completion at {previous} replaced by {fire_at}");
        }
    }

    /// Raises the interrupts due between the master clock values `from` (exclusive) and `to`
    /// (inclusive). Returns true if a new frame started in between.
    pub fn advance(&mut self, from: u64, to: u64) -> bool {
        let frame_started = crosses(from, to, 0);
        if frame_started {
            self.raise(FRAME_IRQ_LEVEL);
        }
        if crosses(from, to, CYCLES_PER_FRAME / 2) {
            self.raise(MID_FRAME_IRQ_LEVEL);
        }
        if let Some(fire_at) = self.blit_done_at {
            if fire_at <= to {
                self.blit_done_at = None;
                self.raise(BLIT_DONE_IRQ_LEVEL);
            }
        }
        frame_started
    }

    /// Takes the highest pending interrupt level, as acknowledged by the CPU.
    pub fn consume(&mut self) -> Option<u8> {
        if self.pending == 0 {
            return None;
        }
        let level = 7 - self.pending.leading_zeros() as u8;
        self.pending.set_bit(level as usize, false);
        Some(level)
    }
}

/// True if a clock value `frame_cycle` cycles into some frame lies in (from, to].
fn crosses(from: u64, to: u64, frame_cycle: u64) -> bool {
    let frames = |clock: u64| (clock + CYCLES_PER_FRAME - frame_cycle) / CYCLES_PER_FRAME;
    frames(to) > frames(from)
}
