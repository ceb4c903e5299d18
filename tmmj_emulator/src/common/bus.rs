//! Bus interface between the main CPU and the board.
//!
//! The CPU core is an external collaborator. It accesses the board with byte addresses on a 32-bit
//! big-endian data bus. Narrow accesses select byte lanes through `mem_mask`: lane 0
//! (mask `0xFF00_0000`) is the byte at the aligned address, lane 3 (mask `0x0000_00FF`) the byte
//! at `addr + 3`.

/// Merges `data` into `target`, only updating the bits set in `mem_mask`.
#[inline]
pub fn combine_data(target: &mut u32, data: u32, mem_mask: u32) {
    *target = (*target & !mem_mask) | (data & mem_mask);
}

#[inline]
fn u16_lane_shift(addr: u32) -> u32 {
    16 - 8 * (addr & 2)
}

#[inline]
fn u8_lane_shift(addr: u32) -> u32 {
    24 - 8 * (addr & 3)
}

/// Generic trait shared by all 32-bit bus implementations.
pub trait Bus32 {
    /// Reads the aligned word at `addr` without side effects. None if nothing is mapped there.
    fn peek(&self, addr: u32) -> Option<u32>;
    fn read(&mut self, addr: u32, mem_mask: u32) -> u32;
    fn write(&mut self, addr: u32, data: u32, mem_mask: u32);
    fn reset(&mut self);

    #[inline]
    fn read_u32(&mut self, addr: u32) -> u32 {
        self.read(addr & !3, 0xFFFF_FFFF)
    }

    #[inline]
    fn write_u32(&mut self, addr: u32, value: u32) {
        self.write(addr & !3, value, 0xFFFF_FFFF)
    }

    #[inline]
    fn read_u16(&mut self, addr: u32) -> u16 {
        let shift = u16_lane_shift(addr);
        (self.read(addr & !3, 0xFFFF << shift) >> shift) as u16
    }

    #[inline]
    fn write_u16(&mut self, addr: u32, value: u16) {
        let shift = u16_lane_shift(addr);
        self.write(addr & !3, (value as u32) << shift, 0xFFFF << shift)
    }

    #[inline]
    fn read_u8(&mut self, addr: u32) -> u8 {
        let shift = u8_lane_shift(addr);
        (self.read(addr & !3, 0xFF << shift) >> shift) as u8
    }

    #[inline]
    fn write_u8(&mut self, addr: u32, value: u8) {
        let shift = u8_lane_shift(addr);
        self.write(addr & !3, (value as u32) << shift, 0xFF << shift)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingBus {
        accesses: Vec<(u32, u32, u32)>,
    }

    impl Bus32 for RecordingBus {
        fn peek(&self, _addr: u32) -> Option<u32> {
            None
        }

        fn read(&mut self, addr: u32, mem_mask: u32) -> u32 {
            self.accesses.push((addr, 0, mem_mask));
            0x1122_3344
        }

        fn write(&mut self, addr: u32, data: u32, mem_mask: u32) {
            self.accesses.push((addr, data, mem_mask));
        }

        fn reset(&mut self) {}
    }

    #[test]
    fn test_combine_data() {
        let mut word = 0x1122_3344;
        combine_data(&mut word, 0xAABB_CCDD, 0x00FF_00FF);
        assert_eq!(word, 0x11BB_33DD);
    }

    #[test]
    fn test_byte_lanes() {
        let mut bus = RecordingBus::default();
        bus.write_u8(0x1001, 0xAB);
        bus.write_u16(0x1002, 0xBEEF);
        bus.write_u16(0x1000, 0xCAFE);
        assert_eq!(
            bus.accesses,
            vec![
                (0x1000, 0x00AB_0000, 0x00FF_0000),
                (0x1000, 0x0000_BEEF, 0x0000_FFFF),
                (0x1000, 0xCAFE_0000, 0xFFFF_0000),
            ]
        );
        assert_eq!(bus.read_u8(0x2003), 0x44);
        assert_eq!(bus.read_u8(0x2000), 0x11);
        assert_eq!(bus.read_u16(0x2002), 0x3344);
    }
}
