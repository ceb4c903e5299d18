//! Blitter that unpacks command streams from sprite ROM into tile RAM.
//!
//! The command stream is a sequence of byte pairs (amount, command), each followed by the 16-bit
//! little-endian values the command consumes:
//!
//! | Command | Operation                                                    |
//! |---------|--------------------------------------------------------------|
//! | 0x00    | Copy `amount` values. An amount of 0 ends the stream.        |
//! | 0x02    | Read one value and write it `amount` times.                  |
//! | 0x03    | Move to the start column of the next line.                   |
//!
//! Values are written into one 16-bit half of consecutive tile RAM words, the other half is kept.
use std::fmt::Display;

use log::trace;
use log::warn;

use super::registers::BlitterRegisters;
use super::tile_ram::TileRam;
use super::tile_ram::BANK_WORDS;
use super::tile_ram::NUM_BANKS;

/// Words between two lines of the blitter cursor.
const LINE_WORDS: usize = 0x80;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BlitOutcome {
    pub words_written: usize,
    /// True if the stream reached its end marker. Only then the completion interrupt is raised.
    pub completed: bool,
}

/// Reads the command stream, stopping at the end of the ROM.
struct BlitStream<'a> {
    data: &'a [u8],
    pos: usize,
}

impl BlitStream<'_> {
    fn byte(&mut self) -> Option<u8> {
        let value = self.data.get(self.pos).copied();
        self.pos += 1;
        value
    }

    fn value(&mut self) -> Option<u16> {
        let low = self.byte()?;
        let high = self.byte()?;
        Some(u16::from_le_bytes([low, high]))
    }
}

/// Position of the next write and the half of the tile word it updates.
struct BlitCursor {
    bank: usize,
    start_column: usize,
    column: usize,
    line_offset: usize,
    keep_mask: u32,
    shift: u32,
}

impl BlitCursor {
    fn write(&mut self, tile_ram: &mut TileRam, value: u16) {
        let offset = (self.line_offset + self.column) % BANK_WORDS;
        let old = tile_ram.read(self.bank, offset);
        let new = (old & self.keep_mask) | ((value as u32) << self.shift);
        tile_ram.write(self.bank, offset, new, 0xFFFF_FFFF);
        self.column = (self.column + 1) & 0x7F;
    }

    fn next_line(&mut self) {
        self.column = self.start_column;
        self.line_offset += LINE_WORDS;
    }
}

impl Display for BlitterRegisters {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "src:${:05X} col:{} line:{} tilemap:{} odd:{}",
            self.source(),
            self.column(),
            self.line(),
            self.tilemap(),
            self.odd()
        )
    }
}

/// Runs the command stream selected by `registers` against `tile_ram`.
pub fn run_blit(registers: &BlitterRegisters, data: &[u8], tile_ram: &mut TileRam) -> BlitOutcome {
    let mut outcome = BlitOutcome::default();
    let bank = registers.tilemap();
    if bank >= NUM_BANKS {
        warn!(target: "blitter", "Blit to unknown tilemap {bank}: {registers}");
        return outcome;
    }
    trace!(target: "blitter", "Blit {registers}");

    // Odd blits update the low half of each word, even blits the high half.
    let (keep_mask, shift) = if registers.odd() != 0 {
        (0xFFFF_0000, 0)
    } else {
        (0x0000_FFFF, 16)
    };
    let mut cursor = BlitCursor {
        bank,
        start_column: registers.column() as usize,
        column: registers.column() as usize,
        line_offset: LINE_WORDS * registers.line() as usize,
        keep_mask,
        shift,
    };
    let mut stream = BlitStream {
        data,
        pos: (registers.source() as usize) << 1,
    };

    loop {
        let (Some(amount), Some(command)) = (stream.byte(), stream.byte()) else {
            warn!(target: "blitter", "Blit ran past the end of ROM at ${:06X}", stream.pos);
            return outcome;
        };
        match command {
            0x00 => {
                if amount == 0 {
                    trace!(target: "blitter", "End of blit, {} words", outcome.words_written);
                    outcome.completed = true;
                    return outcome;
                }
                trace!(target: "blitter", "Copy {amount}");
                for _ in 0..amount {
                    let Some(value) = stream.value() else {
                        warn!(target: "blitter", "Blit copy ran past the end of ROM");
                        return outcome;
                    };
                    cursor.write(tile_ram, value);
                    outcome.words_written += 1;
                }
            }
            0x02 => {
                trace!(target: "blitter", "Fill {amount}");
                let Some(value) = stream.value() else {
                    warn!(target: "blitter", "Blit fill ran past the end of ROM");
                    return outcome;
                };
                for _ in 0..amount {
                    cursor.write(tile_ram, value);
                    outcome.words_written += 1;
                }
            }
            0x03 => {
                trace!(target: "blitter", "Next line");
                cursor.next_line();
            }
            _ => {
                warn!(target: "blitter", "Unknown blit command {command:02X}");
            }
        }
    }
}
