//! Tile RAM containing the tile descriptors of the four tilemaps.
use bitcode::Decode;
use bitcode::Encode;

use crate::common::bus::combine_data;

pub const NUM_BANKS: usize = 4;
/// Words allocated per bank. The blitter can reach all of them.
pub const BANK_WORDS: usize = 0x8000;
/// Words per bank visible through the bus window, which covers exactly one 64x64 tilemap.
pub const BUS_WINDOW_WORDS: usize = 0x1000;

#[derive(Clone, Encode, Decode)]
pub struct TileRam {
    banks: Vec<Vec<u32>>,
}

impl TileRam {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self {
            banks: vec![vec![0; BANK_WORDS]; NUM_BANKS],
        }
    }

    /// Panics if `bank` or `offset` are out of range.
    pub fn read(&self, bank: usize, offset: usize) -> u32 {
        self.banks[bank][offset]
    }

    /// Merges `data` into the word at `offset`, keeping the bits not selected by `mem_mask`.
    pub fn write(&mut self, bank: usize, offset: usize, data: u32, mem_mask: u32) {
        combine_data(&mut self.banks[bank][offset], data, mem_mask);
    }

    pub fn bank(&self, bank: usize) -> &[u32] {
        &self.banks[bank]
    }
}

#[cfg(test)]
mod tests {
    use rand::Rng;
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn test_masked_write_preserves_other_lanes() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(0x7173);
        let mut tile_ram = TileRam::new();
        for _ in 0..1000 {
            let bank = rng.gen_range(0..NUM_BANKS);
            let offset = rng.gen_range(0..BANK_WORDS);
            let data: u32 = rng.gen();
            let mem_mask: u32 = rng.gen();
            let before = tile_ram.read(bank, offset);
            tile_ram.write(bank, offset, data, mem_mask);
            let after = tile_ram.read(bank, offset);
            assert_eq!(after & !mem_mask, before & !mem_mask);
            assert_eq!(after & mem_mask, data & mem_mask);
        }
    }

    #[test]
    fn test_banks_are_separate() {
        let mut tile_ram = TileRam::new();
        tile_ram.write(2, 0x10, 0xDEAD_BEEF, 0xFFFF_FFFF);
        assert_eq!(tile_ram.read(2, 0x10), 0xDEAD_BEEF);
        for bank in [0, 1, 3] {
            assert_eq!(tile_ram.read(bank, 0x10), 0);
        }
        assert_eq!(tile_ram.bank(2)[0x10], 0xDEAD_BEEF);
    }
}
