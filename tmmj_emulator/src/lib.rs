pub mod common;
pub mod components;
pub mod controller;
pub mod main_bus;

use common::bus::Bus32;
use common::clock::ClockInfo;
use common::image::Image;
use components::eeprom::SerialEeprom;
use components::rom::RomSet;
use components::video::Screen;
use components::video::VideoConfig;
use components::video::VideoDebug;
use controller::Inputs;
use main_bus::MainBusImpl;
use strum::IntoEnumIterator;

/// The dual screen mahjong board without its CPU.
///
/// The CPU core drives the board through `bus()`, advances virtual time with
/// `advance_master_clock` and acknowledges interrupts with `consume_interrupt`.
pub struct System {
    pub bus: MainBusImpl,
}

impl System {
    pub fn new(roms: RomSet) -> anyhow::Result<Self> {
        Self::with_config(roms, VideoConfig::default())
    }

    pub fn with_config(roms: RomSet, config: VideoConfig) -> anyhow::Result<Self> {
        roms.validate()?;
        Ok(Self {
            bus: MainBusImpl::new(roms, config),
        })
    }

    pub fn with_eeprom(mut self, eeprom: Box<dyn SerialEeprom>) -> Self {
        self.bus.eeprom = eeprom;
        self
    }

    pub fn bus(&mut self) -> &mut impl Bus32 {
        &mut self.bus
    }

    pub fn reset(&mut self) {
        self.bus.reset();
    }

    pub fn clock_info(&self) -> ClockInfo {
        self.bus.clock_info()
    }

    /// Advances virtual time by `cycles` of the master clock. Both screens are redrawn whenever a
    /// new frame starts. Returns true in that case.
    pub fn advance_master_clock(&mut self, cycles: u64) -> bool {
        let new_frame = self.bus.advance_master_clock(cycles);
        if new_frame {
            self.render_frame();
        }
        new_frame
    }

    /// Takes the highest pending interrupt level.
    pub fn consume_interrupt(&mut self) -> Option<u8> {
        self.bus.consume_interrupt()
    }

    pub fn render_frame(&mut self) {
        for screen in Screen::iter() {
            self.draw_screen(screen);
        }
    }

    pub fn draw_screen(&mut self, screen: Screen) {
        let roms = &self.bus.roms;
        self.bus
            .video
            .draw_screen(screen, &roms.tile_gfx, &roms.sprite_gfx);
    }

    pub fn get_rgba_framebuffer<ImageT: Image>(&self, screen: Screen) -> ImageT {
        self.bus.video.get_rgba_framebuffer(screen)
    }

    pub fn update_inputs(&mut self, inputs: Inputs) {
        self.bus.input_mux.inputs = inputs;
    }

    pub fn save_state(&self) -> Vec<u8> {
        self.bus.video.save_state()
    }

    pub fn load_state(&mut self, encoded: &[u8]) -> anyhow::Result<()> {
        self.bus.video.load_state(encoded)
    }

    /// Exposes debug information for investigating the system state.
    pub fn debug(&self) -> SystemDebug<'_> {
        SystemDebug(self)
    }
}

pub struct SystemDebug<'a>(&'a System);

impl<'a> SystemDebug<'a> {
    pub fn video(self) -> VideoDebug<'a> {
        self.0.bus.video.debug()
    }

    pub fn roms(&self) -> &'a RomSet {
        &self.0.bus.roms
    }
}
