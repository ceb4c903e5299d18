//! Palette RAM and the per-entry contrast applied by the brightness ports.
use bitcode::Decode;
use bitcode::Encode;

use crate::common::bus::combine_data;
use crate::common::image::Rgb24;

pub const PALETTE_ENTRIES: usize = 0x1000;

#[derive(Clone, Encode, Decode)]
pub struct Palette {
    /// Raw palette RAM words as written by the CPU.
    memory: Vec<u32>,
    /// Colors decoded from `memory`.
    colors: Vec<Rgb24>,
    /// Contrast multiplier of each entry, 1.0 is full brightness.
    contrast: Vec<f32>,
}

impl Palette {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self {
            memory: vec![0; PALETTE_ENTRIES],
            colors: vec![Rgb24::BLACK; PALETTE_ENTRIES],
            contrast: vec![1.0; PALETTE_ENTRIES],
        }
    }

    pub fn read(&self, index: usize) -> u32 {
        self.memory[index]
    }

    /// Palette RAM write
    /// 31  bit  24   23  bit  16   15  bit  8   7  bit  0
    ///  ---- ----    ---- ----     ---- ----    ---- ----
    ///  .... ....    GGGG GGGG     RRRR RRRR    BBBB BBBB
    pub fn write(&mut self, index: usize, data: u32, mem_mask: u32) {
        combine_data(&mut self.memory[index], data, mem_mask);
        self.set_color(index, self.memory[index]);
    }

    /// Decodes a packed palette word into the color of entry `index`.
    pub fn set_color(&mut self, index: usize, word: u32) {
        let [_, g, r, b] = word.to_be_bytes();
        self.colors[index] = Rgb24::new(r, g, b);
    }

    /// Sets the contrast of entries `start..end`.
    pub fn set_contrast(&mut self, start: usize, end: usize, level: f32) {
        self.contrast[start..end].fill(level);
    }

    pub fn contrast(&self, index: usize) -> f32 {
        self.contrast[index]
    }

    /// Color of `pen` without contrast applied. Pens index the palette modulo its size.
    pub fn raw_color(&self, pen: u16) -> Rgb24 {
        self.colors[pen as usize % PALETTE_ENTRIES]
    }

    /// Color of `pen` with contrast applied.
    pub fn color(&self, pen: u16) -> Rgb24 {
        let index = pen as usize % PALETTE_ENTRIES;
        self.colors[index].with_contrast(self.contrast[index])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_unpack() {
        let mut palette = Palette::new();
        palette.write(0x42, 0x0011_2233, 0xFFFF_FFFF);
        assert_eq!(palette.raw_color(0x42), Rgb24::new(0x22, 0x11, 0x33));
        assert_eq!(palette.read(0x42), 0x0011_2233);
    }

    #[test]
    fn test_partial_write_updates_color() {
        let mut palette = Palette::new();
        palette.write(0x10, 0x0011_2233, 0xFFFF_FFFF);
        palette.write(0x10, 0x0000_FF00, 0x0000_FF00);
        assert_eq!(palette.raw_color(0x10), Rgb24::new(0xFF, 0x11, 0x33));
    }

    #[test]
    fn test_contrast_applies_to_range() {
        let mut palette = Palette::new();
        palette.set_color(0x7FF, 0x00FF_FFFF);
        palette.set_color(0x800, 0x00FF_FFFF);
        palette.set_contrast(0x800, 0x1000, 0.5);
        assert_eq!(palette.color(0x7FF), Rgb24::new(0xFF, 0xFF, 0xFF));
        assert_eq!(palette.color(0x800), Rgb24::new(0x80, 0x80, 0x80));
        assert_eq!(palette.contrast(0x800), 0.5);
    }
}
