//! Main bus used by the 68EC020 CPU.
mod interrupts;

use log::debug;
use log::trace;
use log::warn;

pub use self::interrupts::InterruptController;
pub use self::interrupts::BLIT_DONE_DELAY_MICROS;
use crate::common::bus::combine_data;
use crate::common::bus::Bus32;
use crate::common::clock::ClockInfo;
use crate::components::eeprom;
use crate::components::eeprom::SerialEeprom;
use crate::components::eeprom::UnconnectedEeprom;
use crate::components::rom::RomSet;
use crate::components::video::VideoChip;
use crate::components::video::VideoConfig;
use crate::controller::InputMux;

const WORK_RAM_WORDS: usize = 0x40000;

pub struct MainBusImpl {
    pub roms: RomSet,
    pub wram: Vec<u32>,
    pub video: VideoChip,
    pub input_mux: InputMux,
    pub eeprom: Box<dyn SerialEeprom>,
    pub interrupts: InterruptController,
    pub master_clock: u64,
    /// Number of writes to the watchdog since reset.
    pub watchdog_writes: u64,
}

impl MainBusImpl {
    pub fn new(roms: RomSet, config: VideoConfig) -> Self {
        Self {
            roms,
            wram: vec![0; WORK_RAM_WORDS],
            video: VideoChip::with_config(config),
            input_mux: InputMux::default(),
            eeprom: Box::new(UnconnectedEeprom),
            interrupts: InterruptController::default(),
            master_clock: 0,
            watchdog_writes: 0,
        }
    }

    pub fn clock_info(&self) -> ClockInfo {
        ClockInfo::from_master_clock(self.master_clock)
    }

    /// Advances virtual time, raising the interrupts that became due. Returns true if a new frame
    /// started.
    pub fn advance_master_clock(&mut self, cycles: u64) -> bool {
        let from = self.master_clock;
        self.master_clock += cycles;
        self.interrupts.advance(from, self.master_clock)
    }

    pub fn consume_interrupt(&mut self) -> Option<u8> {
        self.interrupts.consume()
    }

    fn write_io_port(&mut self, data: u32, mem_mask: u32) {
        match mem_mask {
            0x0000_00FF => self.input_mux.write_select(data),
            0xFF00_0000 => eeprom::write_control(self.eeprom.as_mut(), data),
            _ => {
                trace!(target: "bus", "Watchdog {data:08X} ({mem_mask:08X})");
                self.watchdog_writes += 1;
            }
        }
    }

    fn write_blitter(&mut self, addr: u32, data: u32, mem_mask: u32) {
        self.video
            .write_blitter(addr, data, mem_mask, &self.roms.sprite_gfx);
        if self.video.consume_blit_completion() {
            debug!(target: "bus", "Blit completion scheduled at {}", self.master_clock);
            self.interrupts.schedule_blit_done(self.master_clock);
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
enum MemoryBlock {
    ProgramRom,
    Status,
    Video,
    Blitter,
    IoPort,
    WorkRam(usize),
    Unmapped,
}

fn memory_map(addr: u32) -> MemoryBlock {
    match addr {
        0x000000..=0x1FFFFF => MemoryBlock::ProgramRom,
        0x200010 | 0x200980 | 0x200984 => MemoryBlock::Status,
        0x200700..=0x20070F => MemoryBlock::Blitter,
        0x200100..=0x29FFFF => MemoryBlock::Video,
        0x400000 => MemoryBlock::IoPort,
        0xF00000..=0xFFFFFF => MemoryBlock::WorkRam(((addr - 0xF00000) / 4) as usize),
        _ => MemoryBlock::Unmapped,
    }
}

impl Bus32 for MainBusImpl {
    fn peek(&self, addr: u32) -> Option<u32> {
        match memory_map(addr) {
            MemoryBlock::ProgramRom => Some(self.roms.program_word(addr)),
            MemoryBlock::Status => Some(0),
            MemoryBlock::Video => self.video.bus_peek(addr),
            MemoryBlock::IoPort => Some(self.input_mux.read(self.eeprom.read_bit())),
            MemoryBlock::WorkRam(offset) => Some(self.wram[offset]),
            MemoryBlock::Blitter | MemoryBlock::Unmapped => None,
        }
    }

    fn read(&mut self, addr: u32, mem_mask: u32) -> u32 {
        match memory_map(addr) {
            MemoryBlock::Video => self.video.bus_read(addr, mem_mask),
            block => match self.peek(addr) {
                Some(value) => value,
                None => {
                    warn!(target: "bus", "Read from unmapped address {addr:06X} ({block:?})");
                    0
                }
            },
        }
    }

    fn write(&mut self, addr: u32, data: u32, mem_mask: u32) {
        match memory_map(addr) {
            MemoryBlock::Video => self.video.bus_write(addr, data, mem_mask),
            MemoryBlock::Blitter => self.write_blitter(addr, data, mem_mask),
            MemoryBlock::IoPort => self.write_io_port(data, mem_mask),
            MemoryBlock::WorkRam(offset) => combine_data(&mut self.wram[offset], data, mem_mask),
            block => {
                warn!(
                    target: "bus",
                    "Write to read-only or unmapped address {addr:06X} ({block:?}) = {data:08X}"
                );
            }
        }
    }

    fn reset(&mut self) {
        self.video.reset();
        self.input_mux.reset();
        self.wram.fill(0);
        self.interrupts = InterruptController::default();
        self.master_clock = 0;
        self.watchdog_writes = 0;
    }
}
