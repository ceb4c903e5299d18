//! Implementation of the tile/sprite video chip driving both screens.
mod bitmap;
mod blitter;
mod debug;
mod palette;
mod registers;
mod sprite;
mod sprite_ram;
mod tile_ram;
mod tilemap;

use bitcode::Decode;
use bitcode::Encode;
use serde::Deserialize;
use serde::Serialize;

pub use self::bitmap::Bitmap;
pub use self::bitmap::ClipRect;
pub use self::bitmap::BLACK_PEN;
pub use self::blitter::BlitOutcome;
pub use self::debug::VideoDebug;
pub use self::registers::TileSize;
pub use self::sprite_ram::Sprite;
pub use self::tilemap::TileDescriptor;
use self::blitter::run_blit;
use self::palette::Palette;
use self::registers::BlitterRegisters;
use self::registers::BrightnessPort;
use self::registers::SpriteRegisters;
use self::registers::TilemapRegisters;
use self::sprite::draw_sprites;
use self::sprite_ram::SpriteRam;
use self::tile_ram::TileRam;
use self::tile_ram::BUS_WINDOW_WORDS;
use self::tilemap::draw_tilemap;
use crate::common::image::Image;
use crate::common::image::Rgb24;

pub const SCREEN_WIDTH: u32 = 40 * 8;
pub const SCREEN_HEIGHT: u32 = 28 * 8;

/// Pixel test applied when rasterizing tiles.
#[derive(Default, Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClipMode {
    /// Tile pixels on the outermost rows and columns of the clip rectangle are not drawn.
    #[default]
    Exclusive,
    /// Tile pixels are drawn up to and including the clip rectangle border.
    Inclusive,
}

/// Compatibility options of the video chip.
#[derive(Default, Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoConfig {
    pub clip_mode: ClipMode,
    /// Add the descriptor colour bank to 4bpp tile pens. When unset, 4bpp pens are 0-14.
    pub colour_bank_4bpp: bool,
    /// Accept writes to the blitter registers at 0x200700. When unset, they are logged and ignored.
    pub blitter: bool,
}

#[derive(
    Default, Copy, Clone, Debug, PartialEq, Eq, Encode, Decode, strum::Display, strum::EnumIter,
)]
pub enum Screen {
    #[default]
    Left = 0,
    Right = 1,
}

impl Screen {
    /// Tilemaps drawn behind and in front of the sprites, and the screen's position in sprite
    /// space.
    fn layers(self) -> (usize, usize, i32) {
        match self {
            Screen::Left => (3, 2, SCREEN_WIDTH as i32),
            Screen::Right => (1, 0, 0),
        }
    }
}

#[derive(Clone, Encode, Decode)]
pub struct VideoState {
    tile_ram: TileRam,
    sprite_ram: SpriteRam,
    palette: Palette,
    tilemap_registers: [TilemapRegisters; 4],
    sprite_registers: SpriteRegisters,
    brightness: [BrightnessPort; 2],
    blitter_registers: BlitterRegisters,
    blit_completed: bool,
}

impl Default for VideoState {
    fn default() -> Self {
        Self {
            tile_ram: TileRam::new(),
            sprite_ram: SpriteRam::new(),
            palette: Palette::new(),
            tilemap_registers: [TilemapRegisters::default(); 4],
            sprite_registers: SpriteRegisters::default(),
            brightness: [BrightnessPort::default(); 2],
            blitter_registers: BlitterRegisters::default(),
            blit_completed: false,
        }
    }
}

impl VideoState {
    pub fn tile_word(&self, bank: usize, offset: usize) -> u32 {
        self.tile_ram.read(bank, offset)
    }

    pub fn sprite_word(&self, offset: usize) -> u32 {
        self.sprite_ram.read(offset)
    }

    /// Color of `pen` with contrast applied. The clear pen is always black.
    pub fn pen_color(&self, pen: u16) -> Rgb24 {
        if pen == BLACK_PEN {
            Rgb24::BLACK
        } else {
            self.palette.color(pen)
        }
    }

    pub fn contrast(&self, index: usize) -> f32 {
        self.palette.contrast(index)
    }

    pub fn tile_size(&self, bank: usize) -> TileSize {
        self.tilemap_registers[bank].tile_size()
    }
}

/// Composites `screen` into `bitmap`: back tilemap, sprites, front tilemap.
///
/// The sprite layer sits between the two tilemaps regardless of any priority bits, and sprites
/// positioned across the boundary of both screens are drawn partially on each.
pub fn compose_screen(
    state: &VideoState,
    config: &VideoConfig,
    screen: Screen,
    tile_rom: &[u8],
    sprite_rom: &[u8],
    bitmap: &mut Bitmap,
) {
    let (back, front, x_offset) = screen.layers();
    let clip = bitmap.bounds();
    bitmap.clear();
    let draw_bank = |bitmap: &mut Bitmap, bank: usize| {
        draw_tilemap(
            bitmap,
            &clip,
            config,
            tile_rom,
            &state.tile_ram.bank(bank)[..BUS_WINDOW_WORDS],
            &state.tilemap_registers[bank],
        )
    };
    draw_bank(bitmap, back);
    draw_sprites(bitmap, &clip, &state.sprite_ram, sprite_rom, x_offset);
    draw_bank(bitmap, front);
}

pub struct VideoChip {
    config: VideoConfig,
    state: VideoState,
    screens: [Bitmap; 2],
}

impl VideoChip {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self::with_config(VideoConfig::default())
    }

    pub fn with_config(config: VideoConfig) -> Self {
        Self {
            config,
            state: VideoState::default(),
            screens: [
                Bitmap::new(SCREEN_WIDTH, SCREEN_HEIGHT),
                Bitmap::new(SCREEN_WIDTH, SCREEN_HEIGHT),
            ],
        }
    }

    pub fn config(&self) -> &VideoConfig {
        &self.config
    }

    pub fn state(&self) -> &VideoState {
        &self.state
    }

    pub fn screen(&self, screen: Screen) -> &Bitmap {
        &self.screens[screen as usize]
    }

    pub fn reset(&mut self) {
        self.state = VideoState::default();
        for bitmap in self.screens.iter_mut() {
            bitmap.clear();
        }
    }

    pub fn load_state(&mut self, encoded: &[u8]) -> anyhow::Result<()> {
        self.state = bitcode::decode(encoded)?;
        Ok(())
    }

    pub fn save_state(&self) -> Vec<u8> {
        bitcode::encode(&self.state)
    }

    pub fn debug(&self) -> VideoDebug<'_> {
        VideoDebug(self)
    }

    /// Returns true once after a blit has reached the end of its command stream.
    pub fn consume_blit_completion(&mut self) -> bool {
        std::mem::take(&mut self.state.blit_completed)
    }

    pub fn bus_read(&mut self, addr: u32, _mem_mask: u32) -> u32 {
        match self.bus_peek(addr) {
            Some(value) => value,
            None => {
                log::warn!(target: "video", "Unhandled read from {addr:06X}");
                0
            }
        }
    }

    pub fn bus_peek(&self, addr: u32) -> Option<u32> {
        match addr {
            0x280000..=0x28FFFF => {
                let (bank, offset) = tile_ram_location(addr);
                Some(self.state.tile_ram.read(bank, offset))
            }
            0x290000..=0x29BFFF => Some(self.state.sprite_ram.read(word_index(addr, 0x290000))),
            0x29C000..=0x29FFFF => Some(self.state.palette.read(word_index(addr, 0x29C000))),
            _ => None,
        }
    }

    pub fn bus_write(&mut self, addr: u32, data: u32, mem_mask: u32) {
        #[cfg(feature = "debug_log")]
        log::trace!(target: "video", "Write {addr:06X} = {data:08X} ({mem_mask:08X})");
        match addr {
            0x200100..=0x20017F if (addr & 0x1F) < 0x18 => {
                let tilemap = ((addr - 0x200100) / 0x20) as usize;
                let word = ((addr & 0x1F) / 4) as usize;
                self.state.tilemap_registers[tilemap].write(word, data, mem_mask);
            }
            0x200200..=0x20021B => {
                self.state
                    .sprite_registers
                    .write(word_index(addr, 0x200200), data, mem_mask);
            }
            0x20040C => self.write_brightness(0, data),
            0x200410 => self.write_brightness(1, data),
            0x280000..=0x28FFFF => {
                let (bank, offset) = tile_ram_location(addr);
                self.state.tile_ram.write(bank, offset, data, mem_mask);
            }
            0x290000..=0x29BFFF => {
                self.state
                    .sprite_ram
                    .write(word_index(addr, 0x290000), data, mem_mask);
            }
            0x29C000..=0x29FFFF => {
                self.state
                    .palette
                    .write(word_index(addr, 0x29C000), data, mem_mask);
            }
            _ => {
                log::warn!(
                    target: "video",
                    "Unhandled write to {addr:06X} = {data:08X} ({mem_mask:08X})"
                );
            }
        }
    }

    /// Writes a blitter register. Writing word 3 runs the blit in `sprite_rom` immediately.
    pub fn write_blitter(&mut self, addr: u32, data: u32, mem_mask: u32, sprite_rom: &[u8]) {
        if !self.config.blitter {
            log::warn!(target: "video", "Blitter write to {addr:06X} while disabled");
            return;
        }
        let word = word_index(addr, 0x200700);
        self.state.blitter_registers.write(word, data, mem_mask);
        if word == 3 {
            let outcome = run_blit(
                &self.state.blitter_registers,
                sprite_rom,
                &mut self.state.tile_ram,
            );
            log::debug!(target: "blitter", "Blit done: {outcome:?}");
            if outcome.completed {
                self.state.blit_completed = true;
            }
        }
    }

    fn write_brightness(&mut self, port: usize, data: u32) {
        let state = &mut self.state;
        state.brightness[port].write(data, &mut state.palette);
    }

    pub fn draw_screen(&mut self, screen: Screen, tile_rom: &[u8], sprite_rom: &[u8]) {
        compose_screen(
            &self.state,
            &self.config,
            screen,
            tile_rom,
            sprite_rom,
            &mut self.screens[screen as usize],
        );
    }

    pub fn get_rgba_framebuffer<ImageT: Image>(&self, screen: Screen) -> ImageT {
        let bitmap = &self.screens[screen as usize];
        let mut image = ImageT::new(bitmap.width(), bitmap.height());
        for (x, y, pen) in bitmap.iter() {
            image.set_pixel((x, y), self.state.pen_color(pen).into());
        }
        image
    }
}

fn word_index(addr: u32, base: u32) -> usize {
    ((addr - base) / 4) as usize
}

/// Each bank is mapped to a 0x4000 byte window.
fn tile_ram_location(addr: u32) -> (usize, usize) {
    let offset = addr - 0x280000;
    ((offset / 0x4000) as usize, ((offset % 0x4000) / 4) as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tile_ram_window() {
        let mut video = VideoChip::new();
        video.bus_write(0x28C004, 0xCAFE_F00D, 0xFFFF_FFFF);
        assert_eq!(video.state().tile_word(3, 1), 0xCAFE_F00D);
        assert_eq!(video.bus_peek(0x28C004), Some(0xCAFE_F00D));
        assert_eq!(video.bus_peek(0x284004), Some(0));
    }

    #[test]
    fn test_tilemap_register_window() {
        let mut video = VideoChip::new();
        video.bus_write(0x200148, 0x0010_0020, 0xFFFF_FFFF);
        video.bus_write(0x200140, 0x0040_0000, 0xFFFF_FFFF);
        assert_eq!(video.state.tilemap_registers[2].scroll_x(), 2);
        assert_eq!(video.state.tilemap_registers[2].scroll_y(), 1);
        assert_eq!(video.state().tile_size(2), TileSize::Size16x16);
        // Gap between two register windows
        video.bus_write(0x200158, 0xFFFF_FFFF, 0xFFFF_FFFF);
        assert_eq!(video.state.tilemap_registers[2].words, [0x0040_0000, 0, 0x0010_0020, 0, 0, 0]);
    }

    #[test]
    fn test_blitter_disabled_by_default() {
        let data = [0x01, 0x00, 0xAA, 0xBB, 0x00, 0x00];
        let mut video = VideoChip::new();
        video.write_blitter(0x20070C, 0, 0xFFFF_FFFF, &data);
        assert_eq!(video.state().tile_word(0, 0), 0);
        assert!(!video.consume_blit_completion());
    }

    #[test]
    fn test_blit_completion_consumed_once() {
        let data = [0x01, 0x00, 0xAA, 0xBB, 0x00, 0x00];
        let mut video = VideoChip::with_config(VideoConfig {
            blitter: true,
            ..Default::default()
        });
        video.write_blitter(0x20070C, 0, 0xFFFF_FFFF, &data);
        assert_eq!(video.state().tile_word(0, 0), 0xBBAA_0000);
        assert!(video.consume_blit_completion());
        assert!(!video.consume_blit_completion());
    }

    #[test]
    fn test_save_state_round_trip() {
        let mut video = VideoChip::new();
        video.bus_write(0x29C010, 0x00FF_0000, 0xFFFF_FFFF);
        video.bus_write(0x20040C, 0xC000_0000, 0xFFFF_FFFF);
        let saved = video.save_state();
        video.reset();
        assert_eq!(video.bus_peek(0x29C010), Some(0));
        video.load_state(&saved).unwrap();
        assert_eq!(video.bus_peek(0x29C010), Some(0x00FF_0000));
        assert_eq!(video.state().contrast(0), 0.5);
        assert_eq!(video.state().pen_color(4), Rgb24::new(0, 0x80, 0));
        assert!(video.load_state(&[0x01]).is_err());
    }
}
