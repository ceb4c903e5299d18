//! Mahjong control panels, coin/service inputs and the multiplexer selecting between them.
use intbits::Bits;
use packed_struct::prelude::*;

/// System input port, bits 0-6. All inputs are active low on the bus.
/// 7  bit  0
/// ---- ----
/// E?SD C?BA
/// |||| ||||
/// |||| |||+- Left screen coin A
/// |||| ||+-- Left screen coin B
/// |||| |+--- Unknown
/// |||| +---- Right screen coin A
/// |||+------ Right screen coin B
/// ||+------- Service
/// |+-------- Unknown
/// +--------- EEPROM data out (active high, not part of this struct)
#[derive(PackedStruct, Clone, Default, Debug, Copy, PartialEq, Eq)]
#[packed_struct(size_bytes = "1", bit_numbering = "lsb0")]
pub struct SystemInputs {
    #[packed_field(bits = "0")]
    pub left_coin_a: bool,
    #[packed_field(bits = "1")]
    pub left_coin_b: bool,
    #[packed_field(bits = "2")]
    pub unknown2: bool,
    #[packed_field(bits = "3")]
    pub right_coin_a: bool,
    #[packed_field(bits = "4")]
    pub right_coin_b: bool,
    #[packed_field(bits = "5")]
    pub service: bool,
    #[packed_field(bits = "6")]
    pub unknown6: bool,
}

impl SystemInputs {
    /// Port value with the EEPROM data bit in bit 7.
    pub fn to_u8(&self, eeprom_bit: bool) -> u8 {
        let pressed = self.pack().map(u8::from_le_bytes).unwrap_or_default();
        (!pressed & 0x7F) | ((eeprom_bit as u8) << 7)
    }
}

/// Buttons of one mahjong control panel. Buttons are read in five groups, see `group`.
#[derive(Clone, Default, Debug, Copy, PartialEq, Eq)]
pub struct MahjongPanel {
    pub a: bool,
    pub b: bool,
    pub c: bool,
    pub d: bool,
    pub e: bool,
    pub f: bool,
    pub g: bool,
    pub h: bool,
    pub i: bool,
    pub j: bool,
    pub k: bool,
    pub l: bool,
    pub m: bool,
    pub n: bool,
    pub kan: bool,
    pub pon: bool,
    pub chi: bool,
    pub reach: bool,
    pub ron: bool,
    pub start: bool,
    pub bet: bool,
}

impl MahjongPanel {
    /// Active low value of button group 0-4:
    ///
    /// | Group | Bit 0 | Bit 1 | Bit 2 | Bit 3 | Bit 4 | Bit 5 |
    /// |-------|-------|-------|-------|-------|-------|-------|
    /// | 0     | A     | E     | I     | M     | Kan   | Start |
    /// | 1     | B     | F     | J     | N     | Reach | Bet   |
    /// | 2     | C     | G     | K     | Chi   | Ron   |       |
    /// | 3     | D     | H     | L     | Pon   |       |       |
    /// | 4     |       |       |       |       |       |       |
    pub fn group(&self, group: usize) -> u8 {
        let buttons: &[bool] = match group {
            0 => &[self.a, self.e, self.i, self.m, self.kan, self.start],
            1 => &[self.b, self.f, self.j, self.n, self.reach, self.bet],
            2 => &[self.c, self.g, self.k, self.chi, self.ron],
            3 => &[self.d, self.h, self.l, self.pon],
            _ => &[],
        };
        let mut value = 0xFF_u8;
        for (bit, pressed) in buttons.iter().enumerate() {
            value.set_bit(bit, !pressed);
        }
        value
    }
}

/// Inputs of the whole cabinet.
#[derive(Clone, Default, Debug, Copy, PartialEq, Eq)]
pub struct Inputs {
    pub system: SystemInputs,
    pub player1: MahjongPanel,
    pub player2: MahjongPanel,
}

/// Input multiplexer behind the port at 0x400000.
///
/// The CPU writes an inverted one-hot group selection into the low byte of the port. Reads return
/// the system port in bits 0-7 and the selected group of both panels in bits 8-15 and 16-23.
#[derive(Clone, Default, Debug)]
pub struct InputMux {
    pub inputs: Inputs,
    latch: u8,
}

impl InputMux {
    /// Clears the group selection. Current inputs are kept.
    pub fn reset(&mut self) {
        self.latch = 0;
    }

    pub fn latch(&self) -> u8 {
        self.latch
    }

    pub fn write_select(&mut self, data: u32) {
        self.latch = !(data as u8);
    }

    pub fn read(&self, eeprom_bit: bool) -> u32 {
        let system = self.inputs.system.to_u8(eeprom_bit) as u32;
        let group = match self.latch {
            0x01 => 0,
            0x02 => 1,
            0x04 => 2,
            0x08 => 3,
            0x10 => 4,
            _ => return system | 0xFFFF_FF00,
        };
        system
            | (self.inputs.player1.group(group) as u32) << 8
            | (self.inputs.player2.group(group) as u32) << 16
            | 0xFF00_0000
    }
}
