//! Serial EEPROM interface and the control port decoding that drives it.
//!
//! The EEPROM device itself is provided by the host. The board only toggles its three input lines
//! and reads back the data out line.

/// Three-wire serial EEPROM, e.g. a 93C46.
pub trait SerialEeprom {
    fn write_bit(&mut self, bit: bool);
    /// Chip select. Deasserting it resets the device.
    fn set_cs_line(&mut self, asserted: bool);
    fn set_clock_line(&mut self, asserted: bool);
    fn read_bit(&self) -> bool;
}

/// Stand-in for a missing EEPROM. The data out line floats high.
#[derive(Default)]
pub struct UnconnectedEeprom;

impl SerialEeprom for UnconnectedEeprom {
    fn write_bit(&mut self, _bit: bool) {}
    fn set_cs_line(&mut self, _asserted: bool) {}
    fn set_clock_line(&mut self, _asserted: bool) {}
    fn read_bit(&self) -> bool {
        true
    }
}

/// EEPROM control bits written to the top byte of the port
/// 31  bit  24
///  ---- ----
///  .... .RCD
///        |||
///        ||+- Data in
///        |+-- Clock line
///        +--- Reset (clears chip select when set)
pub fn write_control(eeprom: &mut dyn SerialEeprom, data: u32) {
    eeprom.write_bit(data & 0x0100_0000 != 0);
    eeprom.set_cs_line(data & 0x0400_0000 == 0);
    eeprom.set_clock_line(data & 0x0200_0000 != 0);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingEeprom {
        events: Vec<&'static str>,
    }

    impl SerialEeprom for RecordingEeprom {
        fn write_bit(&mut self, bit: bool) {
            self.events.push(if bit { "bit1" } else { "bit0" });
        }
        fn set_cs_line(&mut self, asserted: bool) {
            self.events.push(if asserted { "cs" } else { "reset" });
        }
        fn set_clock_line(&mut self, asserted: bool) {
            self.events.push(if asserted { "clk_high" } else { "clk_low" });
        }
        fn read_bit(&self) -> bool {
            false
        }
    }

    #[test]
    fn test_write_control_order() {
        let mut eeprom = RecordingEeprom::default();
        write_control(&mut eeprom, 0x0300_0000);
        write_control(&mut eeprom, 0x0400_0000);
        assert_eq!(
            eeprom.events,
            vec!["bit1", "cs", "clk_high", "bit0", "reset", "clk_low"]
        );
    }
}
