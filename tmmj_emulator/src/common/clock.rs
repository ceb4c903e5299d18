use bitcode::Decode;
use bitcode::Encode;

/// Main CPU clock. All virtual time is measured in cycles of this clock.
pub const MASTER_CLOCK_HZ: u64 = 24_000_000;
pub const FRAMES_PER_SECOND: u64 = 60;
pub const CYCLES_PER_FRAME: u64 = MASTER_CLOCK_HZ / FRAMES_PER_SECOND;

#[derive(Default, Clone, Copy, PartialEq, Eq, Debug, Encode, Decode)]
pub struct ClockInfo {
    pub master_clock: u64,
    /// Frame counter
    pub f: u64,
    /// Cycles elapsed since the start of the current frame
    pub frame_cycle: u64,
}

impl ClockInfo {
    pub fn from_master_clock(master_clock: u64) -> Self {
        ClockInfo {
            master_clock,
            f: master_clock / CYCLES_PER_FRAME,
            frame_cycle: master_clock % CYCLES_PER_FRAME,
        }
    }

    pub fn from_frame(f: u64, frame_cycle: u64) -> Self {
        ClockInfo {
            master_clock: f * CYCLES_PER_FRAME + frame_cycle,
            f,
            frame_cycle,
        }
    }

    pub fn micros_to_cycles(micros: u64) -> u64 {
        micros * MASTER_CLOCK_HZ / 1_000_000
    }
}
