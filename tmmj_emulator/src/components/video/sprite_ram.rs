//! Sprite RAM containing the sprite list.
use std::fmt::Display;
use std::fmt::Formatter;

use bilge::prelude::*;
use bitcode::Decode;
use bitcode::Encode;

use crate::common::bus::combine_data;

pub const SPRITE_RAM_WORDS: usize = 0x3000;

#[derive(Clone, Encode, Decode)]
pub struct SpriteRam {
    memory: Vec<u32>,
}

impl SpriteRam {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self {
            memory: vec![0; SPRITE_RAM_WORDS],
        }
    }

    pub fn read(&self, offset: usize) -> u32 {
        self.memory[offset]
    }

    pub fn write(&mut self, offset: usize, data: u32, mem_mask: u32) {
        combine_data(&mut self.memory[offset], data, mem_mask);
    }

    /// Decodes the sprite stored in the word pair at `word_idx`, if the pair is inside sprite RAM.
    pub fn get_sprite(&self, word_idx: usize) -> Option<Sprite> {
        let word0 = *self.memory.get(word_idx)?;
        let word1 = *self.memory.get(word_idx.checked_add(1)?)?;
        Some(Sprite::decode(word_idx, word0, word1))
    }

    /// Sprites in drawing order.
    ///
    /// The list is walked from the top of sprite RAM down to word index 2. The pair at word 0 is
    /// never drawn. There is no sprite count register, all slots are visited each frame.
    pub fn sprites(&self) -> impl Iterator<Item = Sprite> + '_ {
        sprite_word_indices().filter_map(|word_idx| self.get_sprite(word_idx))
    }
}

/// Word indices visited by the sprite walk: 0x2FFE, 0x2FFC, ... 2.
pub fn sprite_word_indices() -> impl Iterator<Item = usize> {
    (2..SPRITE_RAM_WORDS - 1).rev().step_by(2)
}

/// Sprite word 0
/// 31  bit  24   23  bit  16   15  bit  8   7  bit  0
///  ---- ----    ---- ----     ---- ----    ---- ----
///  .... YYYY    YYYY YYYY     XY.. XXXX    XXXX XXXX
///       ||||    |||| ||||     ||   ||||    |||| ||||
///       ++++----++++-++++-----||---++++----++++-++++- X position (signed 12 bit)
///       ++++----++++-++++-----||------------------- Y position
///                             |+------------------- Y flip
///                             +-------------------- X flip (inverted)
#[bitsize(32)]
#[derive(Clone, Copy, DebugBits, Default, FromBits, PartialEq)]
pub struct SpriteWord0 {
    x: u12,
    unknown_x: u2,
    y_flip: bool,
    x_flip: bool,
    y: u12,
    unknown_y: u4,
}

/// Sprite word 1
/// 31  bit  24   23  bit  16   15  bit  8   7  bit  0
///  ---- ----    ---- ----     ---- ----    ---- ----
///  .... CCCC    CCCC ..TT     TTTT TTTT    TTTT TTTT
///       ||||    ||||   ||     |||| ||||    |||| ||||
///       ||||    ||||   ++-----++++-++++----++++-++++- Tile number * 2
///       ++++----++++--------------------------------- Colour bank
#[bitsize(32)]
#[derive(Clone, Copy, DebugBits, Default, FromBits, PartialEq)]
pub struct SpriteWord1 {
    tile: u18,
    unknown_tile: u2,
    colour: u8,
    unknown_colour: u4,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Sprite {
    /// Word index of the sprite in sprite RAM.
    pub word_idx: usize,
    pub x: i32,
    pub y: i32,
    /// Value of the stored x flip bit. The hardware flips horizontally when it is clear.
    pub x_flip: bool,
    pub y_flip: bool,
    pub tile: u32,
    pub colour: u8,
}

impl Sprite {
    pub fn decode(word_idx: usize, word0: u32, word1: u32) -> Self {
        let word0 = SpriteWord0::from(word0);
        let word1 = SpriteWord1::from(word1);
        let mut x = word0.x().value() as i32;
        if x & 0x800 != 0 {
            x -= 0x1000;
        }
        Self {
            word_idx,
            x,
            y: word0.y().value() as i32,
            x_flip: word0.x_flip(),
            y_flip: word0.y_flip(),
            tile: word1.tile().value() >> 1,
            colour: word1.colour(),
        }
    }
}

impl Display for Sprite {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "${:04X}: ({}, {}) tile:{:05X} colour:{:02X}",
            self.word_idx, self.x, self.y, self.tile, self.colour
        )?;
        if !self.x_flip {
            write!(f, " hflip")?;
        }
        if self.y_flip {
            write!(f, " vflip")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_sprite_walk_order() {
        let indices: Vec<usize> = sprite_word_indices().collect();
        assert_eq!(indices.first(), Some(&0x2FFE));
        assert_eq!(indices.last(), Some(&2));
        assert_eq!(indices.len(), 0x17FF);
        assert!(indices.windows(2).all(|pair| pair[0] == pair[1] + 2));
    }

    #[test]
    fn test_decode_sprite() {
        // x = 0xFF0 (-16), y = 0x020, x flip set, tile field 0x00201 -> tile 0x100
        let sprite = Sprite::decode(0x10, 0x0020_8FF0, 0x0AB0_0201);
        assert_eq!(
            sprite,
            Sprite {
                word_idx: 0x10,
                x: -16,
                y: 0x20,
                x_flip: true,
                y_flip: false,
                tile: 0x100,
                colour: 0xAB,
            }
        );
    }

    #[test]
    fn test_get_sprite_bounds() {
        let mut sprite_ram = SpriteRam::new();
        sprite_ram.write(0x2FFE, 0x0020_0010, 0xFFFF_FFFF);
        assert_eq!(sprite_ram.get_sprite(0x2FFE).map(|sprite| sprite.y), Some(0x20));
        assert_eq!(sprite_ram.get_sprite(0x2FFF), None);
        assert_eq!(sprite_ram.get_sprite(SPRITE_RAM_WORDS), None);
        assert_eq!(sprite_ram.get_sprite(usize::MAX), None);
    }

    #[test]
    fn test_decode_positive_x() {
        let sprite = Sprite::decode(2, 0x0008_47FF, 0);
        assert_eq!(sprite.x, 0x7FF);
        assert_eq!(sprite.y, 0x008);
        assert!(sprite.y_flip);
        assert!(!sprite.x_flip);
    }
}
