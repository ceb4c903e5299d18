//! Tile decoding and tilemap rendering.
//!
//! Tile descriptors hold a raw tile ROM address in units of 32 bytes instead of a tile number, so
//! tiles can start in the middle of another tile. Tiles are rasterized pixel by pixel straight from
//! ROM.
use bilge::prelude::*;

use super::bitmap::Bitmap;
use super::bitmap::ClipRect;
use super::registers::TilemapRegisters;
use super::ClipMode;
use super::VideoConfig;

pub const TILEMAP_COLUMNS: usize = 64;
pub const TILEMAP_ROWS: usize = 64;

/// Tile descriptor
/// 31  bit  24   23  bit  16   15  bit  8   7  bit  0
///  ---- ----    ---- ----     ---- ----    ---- ----
///  BFFD CCCC    CCCC AAAA     AAAA AAAA    AAAA AAAA
///  |||| ||||    |||| ||||     |||| ||||    |||| ||||
///  |||| ||||    |||| ++++-----++++-++++----++++-++++- Tile ROM address / 32
///  |||| ++++----++++--------------------------------- Colour bank
///  |||+---------------------------------------------- Depth (0 = 4bpp, 1 = 8bpp)
///  |++----------------------------------------------- Flip (not used)
///  +------------------------------------------------- Blank (not used)
#[bitsize(32)]
#[derive(Clone, Copy, DebugBits, Default, FromBits, PartialEq)]
pub struct TileDescriptor {
    pub tile_address: u20,
    pub colour: u8,
    pub depth: bool,
    pub flip: u2,
    pub blank: bool,
}

/// Reads a byte of a graphics ROM. Addresses past the end mirror back to the start.
#[inline]
fn rom_byte(rom: &[u8], addr: usize) -> u8 {
    rom[addr % rom.len()]
}

/// Draws the tile described by `descriptor` with its top left corner at (x, y).
pub fn draw_tile(
    bitmap: &mut Bitmap,
    clip: &ClipRect,
    config: &VideoConfig,
    tile_rom: &[u8],
    descriptor: TileDescriptor,
    (x, y): (i32, i32),
    size: i32,
) {
    if tile_rom.is_empty() {
        return;
    }
    if x > clip.max_x || x + size < clip.min_x || y > clip.max_y || y + size < clip.min_y {
        return;
    }
    let visible = |px: i32, py: i32| match config.clip_mode {
        ClipMode::Exclusive => clip.contains_interior(px, py),
        ClipMode::Inclusive => clip.contains(px, py),
    };

    let base = descriptor.tile_address().value() as usize * 32;
    let colour_bank = (descriptor.colour() as u16) << 8;
    let mut count = 0;
    for draw_y in y..y + size {
        if descriptor.depth() {
            for draw_x in x..x + size {
                if visible(draw_x, draw_y) {
                    let data = rom_byte(tile_rom, base + count);
                    if data != 0xFF {
                        bitmap.plot(draw_x, draw_y, data as u16 + colour_bank);
                    }
                }
                count += 1;
            }
        } else {
            for draw_x in (x..x + size).step_by(2) {
                let data = rom_byte(tile_rom, base + count);
                for (px, nibble) in [(draw_x, data >> 4), (draw_x + 1, data & 0xF)] {
                    if nibble == 0xF || !visible(px, draw_y) {
                        continue;
                    }
                    let pen = if config.colour_bank_4bpp {
                        nibble as u16 + colour_bank
                    } else {
                        nibble as u16
                    };
                    bitmap.plot(px, draw_y, pen);
                }
                count += 1;
            }
        }
    }
}

/// Draws a 64x64 tilemap from `tile_words`, stored row by row.
///
/// Scrolling moves the whole grid. There is no wraparound, cells scrolled off the top left are not
/// repeated at the bottom right.
pub fn draw_tilemap(
    bitmap: &mut Bitmap,
    clip: &ClipRect,
    config: &VideoConfig,
    tile_rom: &[u8],
    tile_words: &[u32],
    registers: &TilemapRegisters,
) {
    let size = registers.tile_size().pixels();
    let scroll_x = registers.scroll_x();
    let scroll_y = registers.scroll_y();
    for (idx, word) in tile_words
        .iter()
        .take(TILEMAP_COLUMNS * TILEMAP_ROWS)
        .enumerate()
    {
        let column = (idx % TILEMAP_COLUMNS) as i32;
        let row = (idx / TILEMAP_COLUMNS) as i32;
        draw_tile(
            bitmap,
            clip,
            config,
            tile_rom,
            TileDescriptor::from(*word),
            (column * size - scroll_x, row * size - scroll_y),
            size,
        );
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::components::video::bitmap::BLACK_PEN;

    fn descriptor(tile_address: u32, colour: u8, depth: bool) -> TileDescriptor {
        TileDescriptor::new(
            u20::new(tile_address),
            colour,
            depth,
            u2::new(0),
            false,
        )
    }

    fn plotted(bitmap: &Bitmap) -> Vec<(u32, u32, u16)> {
        bitmap.iter().filter(|(_, _, pen)| *pen != BLACK_PEN).collect()
    }

    #[test]
    fn test_descriptor_fields() {
        let descriptor = TileDescriptor::from(0x9AB1_2345);
        assert_eq!(descriptor.tile_address().value(), 0x1_2345);
        assert_eq!(descriptor.colour(), 0xAB);
        assert!(descriptor.depth());
        assert_eq!(descriptor.flip().value(), 0);
        assert!(descriptor.blank());
    }

    #[test]
    fn test_4bpp_nibble_order() {
        let mut tile_rom = vec![0xFF_u8; 64];
        tile_rom[32] = 0x12;
        tile_rom[33] = 0xF4;
        let mut bitmap = Bitmap::new(16, 16);
        let clip = bitmap.bounds();
        draw_tile(
            &mut bitmap,
            &clip,
            &VideoConfig::default(),
            &tile_rom,
            descriptor(1, 0x33, false),
            (4, 4),
            8,
        );
        // Colour bank is not applied to 4bpp tiles, nibble 15 is transparent.
        assert_eq!(plotted(&bitmap), vec![(4, 4, 1), (5, 4, 2), (7, 4, 4)]);
    }

    #[test]
    fn test_4bpp_colour_bank_flag() {
        let tile_rom = vec![0x11_u8; 32];
        let mut bitmap = Bitmap::new(16, 16);
        let clip = bitmap.bounds();
        let config = VideoConfig {
            colour_bank_4bpp: true,
            ..Default::default()
        };
        draw_tile(
            &mut bitmap,
            &clip,
            &config,
            &tile_rom,
            descriptor(0, 0x02, false),
            (4, 4),
            8,
        );
        assert_eq!(bitmap[(4, 4)], 0x0201);
    }

    #[test]
    fn test_8bpp_colour_bank() {
        let mut tile_rom = vec![0xFF_u8; 64];
        tile_rom[0] = 0x00;
        tile_rom[9] = 0x7E;
        let mut bitmap = Bitmap::new(16, 16);
        let clip = bitmap.bounds();
        draw_tile(
            &mut bitmap,
            &clip,
            &VideoConfig::default(),
            &tile_rom,
            descriptor(0, 0x05, true),
            (2, 2),
            8,
        );
        assert_eq!(plotted(&bitmap), vec![(2, 2, 0x0500), (3, 3, 0x057E)]);
    }

    #[test]
    fn test_exclusive_clip_skips_border() {
        let tile_rom = vec![0x00_u8; 64];
        let mut bitmap = Bitmap::new(8, 8);
        let clip = bitmap.bounds();
        draw_tile(
            &mut bitmap,
            &clip,
            &VideoConfig::default(),
            &tile_rom,
            descriptor(0, 0, true),
            (0, 0),
            8,
        );
        assert_eq!(plotted(&bitmap).len(), 6 * 6);

        let config = VideoConfig {
            clip_mode: ClipMode::Inclusive,
            ..Default::default()
        };
        draw_tile(
            &mut bitmap,
            &clip,
            &config,
            &tile_rom,
            descriptor(0, 0, true),
            (0, 0),
            8,
        );
        assert_eq!(plotted(&bitmap).len(), 8 * 8);
    }

    #[test]
    fn test_rejected_cells_read_nothing() {
        let tile_rom = vec![0x00_u8; 64];
        let mut bitmap = Bitmap::new(8, 8);
        let clip = bitmap.bounds();
        for position in [(8, 0), (-9, 0), (0, 8), (0, -9)] {
            draw_tile(
                &mut bitmap,
                &clip,
                &VideoConfig::default(),
                &tile_rom,
                descriptor(0, 0, true),
                position,
                8,
            );
        }
        assert_eq!(plotted(&bitmap), vec![]);
    }

    #[test]
    fn test_scroll_moves_grid() {
        let tile_rom = vec![0x00_u8; 64];
        let mut tile_words = vec![0_u32; TILEMAP_COLUMNS * TILEMAP_ROWS];
        // Cell (1, 1) is an 8bpp tile of pen 0.
        tile_words[TILEMAP_COLUMNS + 1] = 0x1000_0000;
        // Other cells point at a transparent 4bpp tile.
        let tile_rom = [tile_rom, vec![0xFF; 32]].concat();
        for (idx, word) in tile_words.iter_mut().enumerate() {
            if idx != TILEMAP_COLUMNS + 1 {
                *word = 2;
            }
        }
        let mut registers = TilemapRegisters::default();
        registers.write(2, (4 << 20) | (3 << 4), 0xFFFF_FFFF);
        let mut bitmap = Bitmap::new(32, 32);
        let clip = bitmap.bounds();
        let config = VideoConfig {
            clip_mode: ClipMode::Inclusive,
            ..Default::default()
        };
        draw_tilemap(
            &mut bitmap,
            &clip,
            &config,
            &tile_rom,
            &tile_words,
            &registers,
        );
        let pixels = plotted(&bitmap);
        assert_eq!(pixels.len(), 64);
        assert_eq!(pixels.first(), Some(&(5, 4, 0)));
        assert_eq!(pixels.last(), Some(&(12, 11, 0)));
    }
}
