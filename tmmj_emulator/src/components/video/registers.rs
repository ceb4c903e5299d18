//! Register banks of the video chip.
use bilge::prelude::*;
use bitcode::Decode;
use bitcode::Encode;
use intbits::Bits;

use super::palette::Palette;
use crate::common::bus::combine_data;

#[derive(Default, Copy, Clone, Debug, PartialEq, Eq, Encode, Decode, strum::Display)]
pub enum TileSize {
    #[default]
    #[strum(serialize = "8x8")]
    Size8x8,
    #[strum(serialize = "16x16")]
    Size16x16,
}

impl TileSize {
    pub fn pixels(self) -> i32 {
        match self {
            TileSize::Size8x8 => 8,
            TileSize::Size16x16 => 16,
        }
    }
}

/// Registers of one tilemap. Only words 0 and 2 are understood.
#[derive(Default, Copy, Clone, Debug, PartialEq, Encode, Decode)]
pub struct TilemapRegisters {
    pub words: [u32; 6],
}

impl TilemapRegisters {
    pub fn write(&mut self, word: usize, data: u32, mem_mask: u32) {
        combine_data(&mut self.words[word], data, mem_mask);
    }

    /// Word 0
    /// 31  bit  24   23  bit  16
    ///  ---- ----    ---- ----
    ///  .... ....    .S.. ....
    ///                |
    ///                +-------- Cell size (0 = 8x8, 1 = 16x16)
    pub fn tile_size(&self) -> TileSize {
        if self.words[0].bit(22) {
            TileSize::Size16x16
        } else {
            TileSize::Size8x8
        }
    }

    /// Word 2
    /// 31  bit  20   19  bit  16   15  bit  4   3  bit  0
    ///  ---- ----    ---- ----     ---- ----    ----
    ///  YYYY YYYY    YYYY ....     XXXX XXXX    XXXX ....
    ///
    /// X is the horizontal, Y the vertical scroll offset in pixels.
    pub fn scroll_x(&self) -> i32 {
        self.words[2].bits(4..=15) as i32
    }

    pub fn scroll_y(&self) -> i32 {
        self.words[2].bits(20..=31) as i32
    }
}

/// Sprite registers. Their function is unknown, they are stored but never consulted.
#[derive(Default, Copy, Clone, Debug, PartialEq, Encode, Decode)]
pub struct SpriteRegisters {
    pub words: [u32; 7],
}

impl SpriteRegisters {
    pub fn write(&mut self, word: usize, data: u32, mem_mask: u32) {
        combine_data(&mut self.words[word], data, mem_mask);
    }
}

/// Brightness control byte, the top byte of a brightness port write
/// 7  bit  0
/// ---- ----
/// ELLL LB..
/// |||| ||
/// |||| |+--- Palette half (0 = entries 0x000-0x7FF, 1 = 0x800-0xFFF)
/// |+++-+---- Level (level / 16)
/// +--------- Enable
#[bitsize(8)]
#[derive(Clone, Copy, DebugBits, Default, FromBits, PartialEq)]
pub struct BrightnessControl {
    unknown_low: u2,
    upper_half: bool,
    level: u4,
    enable: bool,
}

/// One of the two brightness ports. Each port remembers the last level it applied.
#[derive(Default, Copy, Clone, Debug, PartialEq, Encode, Decode)]
pub struct BrightnessPort {
    last_level: f32,
}

impl BrightnessPort {
    pub fn last_level(&self) -> f32 {
        self.last_level
    }

    /// Applies a brightness port write to `palette`. Returns true if the contrast was changed.
    ///
    /// The write only takes effect if the enable bit is set and the level differs from the level
    /// last applied through this port.
    pub fn write(&mut self, data: u32, palette: &mut Palette) -> bool {
        let control = BrightnessControl::from(data.bits(24..=31) as u8);
        let level = control.level().value() as f32 / 16.0;
        if !control.enable() || level == self.last_level {
            return false;
        }
        let start = if control.upper_half() { 0x800 } else { 0 };
        palette.set_contrast(start, start + 0x800, level);
        self.last_level = level;
        log::debug!(target: "video", "brightness {level} at palette ${start:03X}");
        true
    }
}

/// Blitter registers
///
/// Word 0: bits 0-19 source word offset into sprite ROM.
/// Word 1: bits 16-23 start column, bits 0-7 start line.
/// Word 2: bits 13-15 target tilemap, bit 0 odd flag.
/// Word 3: writing triggers a blit.
#[derive(Default, Copy, Clone, Debug, PartialEq, Encode, Decode)]
pub struct BlitterRegisters {
    pub words: [u32; 4],
}

impl BlitterRegisters {
    pub fn write(&mut self, word: usize, data: u32, mem_mask: u32) {
        combine_data(&mut self.words[word], data, mem_mask);
    }

    pub fn source(&self) -> u32 {
        self.words[0].bits(0..=19)
    }

    pub fn column(&self) -> u32 {
        self.words[1].bits(16..=23)
    }

    pub fn line(&self) -> u32 {
        self.words[1].bits(0..=7)
    }

    pub fn tilemap(&self) -> usize {
        self.words[2].bits(13..=15) as usize
    }

    pub fn odd(&self) -> u32 {
        self.words[2].bits(0..=0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::image::Rgb24;

    #[test]
    fn test_tilemap_registers() {
        let mut regs = TilemapRegisters::default();
        assert_eq!(regs.tile_size(), TileSize::Size8x8);
        regs.write(0, 0x0040_0000, 0xFFFF_FFFF);
        assert_eq!(regs.tile_size(), TileSize::Size16x16);
        regs.write(2, 0x1230_4560, 0xFFFF_FFFF);
        assert_eq!(regs.scroll_x(), 0x456);
        assert_eq!(regs.scroll_y(), 0x123);
        assert_eq!(regs.tile_size().to_string(), "16x16");
    }

    #[test]
    fn test_brightness_requires_enable() {
        let mut palette = Palette::new();
        let mut port = BrightnessPort::default();
        // Level 8 without the enable bit
        assert!(!port.write(0x4000_0000, &mut palette));
        assert_eq!(palette.contrast(0), 1.0);
        assert_eq!(port.last_level(), 0.0);
    }

    #[test]
    fn test_brightness_applies_to_selected_half() {
        let mut palette = Palette::new();
        palette.set_color(0x000, 0x00FF_FFFF);
        palette.set_color(0x800, 0x00FF_FFFF);
        let mut port = BrightnessPort::default();
        // Enable, level 8, upper half
        assert!(port.write(0xC400_0000, &mut palette));
        assert_eq!(palette.contrast(0x800), 0.5);
        assert_eq!(palette.contrast(0xFFF), 0.5);
        assert_eq!(palette.contrast(0x7FF), 1.0);
        assert_eq!(palette.color(0x800), Rgb24::new(0x80, 0x80, 0x80));
        assert_eq!(palette.color(0x000), Rgb24::new(0xFF, 0xFF, 0xFF));
        // Same level again is ignored, even for the other half.
        assert!(!port.write(0xC000_0000, &mut palette));
        assert_eq!(palette.contrast(0x000), 1.0);
    }

    #[test]
    fn test_blitter_register_fields() {
        let mut regs = BlitterRegisters::default();
        regs.write(0, 0xFFF1_2345, 0xFFFF_FFFF);
        regs.write(1, 0x0012_0034, 0xFFFF_FFFF);
        regs.write(2, 0x0000_6001, 0xFFFF_FFFF);
        assert_eq!(regs.source(), 0x1_2345);
        assert_eq!(regs.column(), 0x12);
        assert_eq!(regs.line(), 0x34);
        assert_eq!(regs.tilemap(), 3);
        assert_eq!(regs.odd(), 1);
    }
}
