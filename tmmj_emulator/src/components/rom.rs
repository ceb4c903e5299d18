//! ROM images of the board.
use anyhow::ensure;
use anyhow::Result;

/// Largest program ROM the address map can hold.
pub const PROGRAM_ROM_SIZE: usize = 0x200000;

/// ROM regions as loaded by the host.
#[derive(Clone, Default)]
pub struct RomSet {
    /// Main CPU program, big-endian.
    pub program: Vec<u8>,
    /// 16x16 8bpp sprite graphics, split in two halves. Also the blitter's data source.
    pub sprite_gfx: Vec<u8>,
    /// Tile graphics, addressed in units of 32 bytes.
    pub tile_gfx: Vec<u8>,
}

impl RomSet {
    pub fn new(program: Vec<u8>, sprite_gfx: Vec<u8>, tile_gfx: Vec<u8>) -> Result<RomSet> {
        let roms = RomSet {
            program,
            sprite_gfx,
            tile_gfx,
        };
        roms.validate()?;
        Ok(roms)
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.program.len() <= PROGRAM_ROM_SIZE,
            "Program ROM is {} bytes, at most {} bytes are mapped",
            self.program.len(),
            PROGRAM_ROM_SIZE
        );
        ensure!(
            self.program.len() % 4 == 0,
            "Program ROM size {} is not a multiple of 4",
            self.program.len()
        );
        ensure!(!self.tile_gfx.is_empty(), "Tile ROM is empty");
        ensure!(!self.sprite_gfx.is_empty(), "Sprite ROM is empty");
        ensure!(
            self.sprite_gfx.len() % 2 == 0,
            "Sprite ROM size {} is odd, it must consist of two equal halves",
            self.sprite_gfx.len()
        );
        Ok(())
    }

    /// Big-endian word of the program ROM at `addr`. Reads past the end of the image return 0.
    pub fn program_word(&self, addr: u32) -> u32 {
        let addr = (addr & !3) as usize;
        match self.program.get(addr..addr + 4) {
            Some(bytes) => u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
            None => 0,
        }
    }
}
