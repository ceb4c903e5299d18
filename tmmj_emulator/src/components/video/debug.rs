use super::sprite::SpriteGfx;
use super::sprite::SPRITE_SIZE;
use super::sprite_ram::Sprite;
use super::tilemap::draw_tilemap;
use super::tilemap::TILEMAP_COLUMNS;
use super::tilemap::TILEMAP_ROWS;
use super::Bitmap;
use super::ClipMode;
use super::VideoChip;
use super::VideoConfig;
use crate::common::image::Image;

pub struct VideoDebug<'a>(pub &'a VideoChip);

impl VideoDebug<'_> {
    pub fn tilemap_info(&self, bank: usize) -> String {
        let registers = &self.0.state.tilemap_registers[bank];
        format!(
            "Tiles {} scroll ({}, {})",
            registers.tile_size(),
            registers.scroll_x(),
            registers.scroll_y()
        )
    }

    pub fn brightness_info(&self) -> String {
        let [port1, port2] = &self.0.state.brightness;
        format!(
            "Brightness {:.4} / {:.4}",
            port1.last_level(),
            port2.last_level()
        )
    }

    /// All sprites in drawing order.
    pub fn sprites(&self) -> Vec<Sprite> {
        self.0.state.sprite_ram.sprites().collect()
    }

    pub fn sprite_info(&self, word_idx: usize) -> String {
        match self.0.state.sprite_ram.get_sprite(word_idx) {
            Some(sprite) => sprite.to_string(),
            None => format!("${word_idx:04X}: out of range"),
        }
    }

    /// Renders the graphics of the sprite at `word_idx`, unflipped. Returns None if `word_idx` is
    /// outside of sprite RAM.
    pub fn render_sprite<ImageT: Image>(
        &self,
        word_idx: usize,
        sprite_rom: &[u8],
    ) -> Option<ImageT> {
        let sprite = self.0.state.sprite_ram.get_sprite(word_idx)?;
        let gfx = SpriteGfx::new(sprite_rom);
        let mut bitmap = Bitmap::new(SPRITE_SIZE as u32, SPRITE_SIZE as u32);
        let clip = bitmap.bounds();
        gfx.draw(
            &mut bitmap,
            &clip,
            sprite.tile,
            sprite.colour,
            false,
            false,
            (0, 0),
        );
        Some(self.to_image(&bitmap))
    }

    /// Renders all 64x64 cells of a tilemap, ignoring scroll registers.
    pub fn render_tilemap<ImageT: Image>(&self, bank: usize, tile_rom: &[u8]) -> ImageT {
        let state = &self.0.state;
        let mut registers = state.tilemap_registers[bank];
        registers.words[2] = 0;
        let size = registers.tile_size().pixels() as u32;
        let mut bitmap = Bitmap::new(TILEMAP_COLUMNS as u32 * size, TILEMAP_ROWS as u32 * size);
        let clip = bitmap.bounds();
        let config = VideoConfig {
            clip_mode: ClipMode::Inclusive,
            ..*self.0.config()
        };
        draw_tilemap(
            &mut bitmap,
            &clip,
            &config,
            tile_rom,
            state.tile_ram.bank(bank),
            &registers,
        );
        self.to_image(&bitmap)
    }

    fn to_image<ImageT: Image>(&self, bitmap: &Bitmap) -> ImageT {
        let mut image = ImageT::new(bitmap.width(), bitmap.height());
        for (x, y, pen) in bitmap.iter() {
            image.set_pixel((x, y), self.0.state.pen_color(pen).into());
        }
        image
    }
}
