//! Sprite graphics decoding and sprite rendering.
use super::bitmap::Bitmap;
use super::bitmap::ClipRect;
use super::sprite_ram::Sprite;
use super::sprite_ram::SpriteRam;

pub const SPRITE_SIZE: i32 = 16;
const BYTES_PER_TILE: usize = 128;

/// Source of each pixel column within a sprite row: (ROM half, byte within the 8 byte row).
const COLUMN_LAYOUT: [(usize, usize); 16] = [
    (0, 5),
    (0, 4),
    (1, 5),
    (1, 4),
    (0, 7),
    (0, 6),
    (1, 7),
    (1, 6),
    (0, 1),
    (0, 0),
    (1, 1),
    (1, 0),
    (0, 3),
    (0, 2),
    (1, 3),
    (1, 2),
];

/// View of the sprite ROM as 16x16 tiles with 8 bits per pixel.
///
/// Each tile is split across both halves of the ROM. Tile `n` occupies 128 bytes at `n * 128` in
/// each half, 8 bytes per row.
pub struct SpriteGfx<'a> {
    rom: &'a [u8],
}

impl<'a> SpriteGfx<'a> {
    pub fn new(rom: &'a [u8]) -> Self {
        Self { rom }
    }

    fn half_len(&self) -> usize {
        self.rom.len() / 2
    }

    /// Number of complete tiles in the ROM. Tile numbers wrap around this count.
    pub fn num_tiles(&self) -> u32 {
        (self.half_len() / BYTES_PER_TILE) as u32
    }

    /// Pixel (x, y) of `tile`, both coordinates in 0..16.
    pub fn pixel(&self, tile: u32, x: usize, y: usize) -> u8 {
        let tile = (tile % self.num_tiles()) as usize;
        let (half, byte) = COLUMN_LAYOUT[x];
        self.rom[half * self.half_len() + tile * BYTES_PER_TILE + y * 8 + byte]
    }

    /// Draws `tile` at (x, y). Pixel value 255 is transparent, others are plotted at
    /// `colour * 256 + value`.
    #[allow(clippy::too_many_arguments)]
    pub fn draw(
        &self,
        bitmap: &mut Bitmap,
        clip: &ClipRect,
        tile: u32,
        colour: u8,
        flip_x: bool,
        flip_y: bool,
        (x, y): (i32, i32),
    ) {
        if self.num_tiles() == 0 {
            return;
        }
        let colour_bank = (colour as u16) << 8;
        for row in 0..SPRITE_SIZE as usize {
            let src_y = if flip_y { 15 - row } else { row };
            for column in 0..SPRITE_SIZE as usize {
                let draw_x = x + column as i32;
                let draw_y = y + row as i32;
                if !clip.contains(draw_x, draw_y) {
                    continue;
                }
                let src_x = if flip_x { 15 - column } else { column };
                let data = self.pixel(tile, src_x, src_y);
                if data != 0xFF {
                    bitmap.plot(draw_x, draw_y, data as u16 + colour_bank);
                }
            }
        }
    }
}

/// Draws a single sprite onto a screen that starts at `x_offset` in sprite space.
pub fn draw_sprite(
    bitmap: &mut Bitmap,
    clip: &ClipRect,
    gfx: &SpriteGfx,
    sprite: &Sprite,
    x_offset: i32,
) {
    gfx.draw(
        bitmap,
        clip,
        sprite.tile,
        sprite.colour,
        !sprite.x_flip,
        sprite.y_flip,
        (sprite.x - x_offset - 8, sprite.y - 8),
    );
}

/// Draws all sprites in sprite RAM order, later sprites on top of earlier ones.
pub fn draw_sprites(
    bitmap: &mut Bitmap,
    clip: &ClipRect,
    sprite_ram: &SpriteRam,
    sprite_rom: &[u8],
    x_offset: i32,
) {
    let gfx = SpriteGfx::new(sprite_rom);
    for sprite in sprite_ram.sprites() {
        draw_sprite(bitmap, clip, &gfx, &sprite, x_offset);
    }
}
