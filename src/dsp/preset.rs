//! SPU reverb presets — hardware register tables for the ten factory rooms.
//!
//! Each preset is the 32-halfword register image the PlayStation BIOS wrote
//! into the SPU to configure its reverb unit: delay-line offsets in 8-byte
//! hardware units and Q15 fixed-point gains. The tables are compiled-in
//! constants; converting them to sample offsets and float gains for a given
//! sample rate is the engine's job (`dsp::reverb`).

use serde::{Deserialize, Serialize};

/// Number of factory presets, including "Off".
pub const NUM_PRESETS: usize = 10;

/// One SPU reverb register image.
///
/// Offsets (`d_*`, `m_*`) are unsigned halfwords in 8-byte units; gains
/// (`v_*`) are signed Q15. Field names follow the SPU register mnemonics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReverbPreset {
    /// All-pass filter 1 delay length.
    pub d_apf1: u16,
    /// All-pass filter 2 delay length.
    pub d_apf2: u16,
    /// One-pole IIR reflection coefficient.
    pub v_iir: i16,
    /// Comb tap gains.
    pub v_comb1: i16,
    pub v_comb2: i16,
    pub v_comb3: i16,
    pub v_comb4: i16,
    /// Wall reflection gain.
    pub v_wall: i16,
    /// All-pass stage gains.
    pub v_apf1: i16,
    pub v_apf2: i16,
    /// Same-side reflection write addresses.
    pub m_l_same: u16,
    pub m_r_same: u16,
    /// Comb tap read addresses.
    pub m_l_comb1: u16,
    pub m_r_comb1: u16,
    pub m_l_comb2: u16,
    pub m_r_comb2: u16,
    /// Same-side reflection read addresses.
    pub d_l_same: u16,
    pub d_r_same: u16,
    /// Cross-side reflection write addresses.
    pub m_l_diff: u16,
    pub m_r_diff: u16,
    pub m_l_comb3: u16,
    pub m_r_comb3: u16,
    pub m_l_comb4: u16,
    pub m_r_comb4: u16,
    /// Cross-side reflection read addresses.
    pub d_l_diff: u16,
    pub d_r_diff: u16,
    /// All-pass stage write addresses.
    pub m_l_apf1: u16,
    pub m_r_apf1: u16,
    pub m_l_apf2: u16,
    pub m_r_apf2: u16,
    /// Input gains.
    pub v_l_in: i16,
    pub v_r_in: i16,
}

impl ReverbPreset {
    /// Build a preset from its raw 32-halfword register image.
    const fn from_registers(data: [u16; 32]) -> Self {
        Self {
            d_apf1: data[0],
            d_apf2: data[1],
            v_iir: data[2] as i16,
            v_comb1: data[3] as i16,
            v_comb2: data[4] as i16,
            v_comb3: data[5] as i16,
            v_comb4: data[6] as i16,
            v_wall: data[7] as i16,
            v_apf1: data[8] as i16,
            v_apf2: data[9] as i16,
            m_l_same: data[10],
            m_r_same: data[11],
            m_l_comb1: data[12],
            m_r_comb1: data[13],
            m_l_comb2: data[14],
            m_r_comb2: data[15],
            d_l_same: data[16],
            d_r_same: data[17],
            m_l_diff: data[18],
            m_r_diff: data[19],
            m_l_comb3: data[20],
            m_r_comb3: data[21],
            m_l_comb4: data[22],
            m_r_comb4: data[23],
            d_l_diff: data[24],
            d_r_diff: data[25],
            m_l_apf1: data[26],
            m_r_apf1: data[27],
            m_l_apf2: data[28],
            m_r_apf2: data[29],
            v_l_in: data[30] as i16,
            v_r_in: data[31] as i16,
        }
    }

    /// All 22 offset fields, for invariant checks against a buffer length.
    pub fn offsets(&self) -> [u16; 22] {
        [
            self.d_apf1,
            self.d_apf2,
            self.m_l_same,
            self.m_r_same,
            self.m_l_comb1,
            self.m_r_comb1,
            self.m_l_comb2,
            self.m_r_comb2,
            self.d_l_same,
            self.d_r_same,
            self.m_l_diff,
            self.m_r_diff,
            self.m_l_comb3,
            self.m_r_comb3,
            self.m_l_comb4,
            self.m_r_comb4,
            self.d_l_diff,
            self.d_r_diff,
            self.m_l_apf1,
            self.m_r_apf1,
            self.m_l_apf2,
            self.m_r_apf2,
        ]
    }
}

/// Look up a preset by ordinal index. `None` for indices outside 0..10;
/// callers treat that as a no-op and keep the previous preset active.
pub fn lookup(index: usize) -> Option<&'static ReverbPreset> {
    TABLES.get(index)
}

/// The factory presets, addressable by host-facing ordinal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReverbType {
    #[default]
    Room,
    StudioSmall,
    StudioMedium,
    StudioLarge,
    Hall,
    HalfEcho,
    SpaceEcho,
    ChaosEcho,
    Delay,
    Off,
}

impl ReverbType {
    pub const ALL: [ReverbType; NUM_PRESETS] = [
        ReverbType::Room,
        ReverbType::StudioSmall,
        ReverbType::StudioMedium,
        ReverbType::StudioLarge,
        ReverbType::Hall,
        ReverbType::HalfEcho,
        ReverbType::SpaceEcho,
        ReverbType::ChaosEcho,
        ReverbType::Delay,
        ReverbType::Off,
    ];

    /// Ordinal index into the preset table.
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// The preset at a given ordinal, if in range.
    pub fn from_index(index: usize) -> Option<ReverbType> {
        Self::ALL.get(index).copied()
    }

    /// Display name, matching the hardware SDK preset names.
    pub fn name(&self) -> &'static str {
        match self {
            ReverbType::Room => "Room",
            ReverbType::StudioSmall => "Studio Small",
            ReverbType::StudioMedium => "Studio Medium",
            ReverbType::StudioLarge => "Studio Large",
            ReverbType::Hall => "Hall",
            ReverbType::HalfEcho => "Half Echo",
            ReverbType::SpaceEcho => "Space Echo",
            ReverbType::ChaosEcho => "Chaos Echo",
            ReverbType::Delay => "Delay",
            ReverbType::Off => "Off",
        }
    }

    pub fn preset(&self) -> &'static ReverbPreset {
        &TABLES[self.index()]
    }
}

// Register images in host ordinal order (Room = 0 .. Off = 9).

static TABLES: [ReverbPreset; NUM_PRESETS] = [
    // Room, SPU mem required: 0x26C0
    ReverbPreset::from_registers([
        0x007D, 0x005B, 0x6D80, 0x54B8, 0xBED0, 0x0000, 0x0000, 0xBA80,
        0x5800, 0x5300, 0x04D6, 0x0333, 0x03F0, 0x0227, 0x0374, 0x01EF,
        0x0334, 0x01B5, 0x0000, 0x0000, 0x0000, 0x0000, 0x0000, 0x0000,
        0x0000, 0x0000, 0x01B4, 0x0136, 0x00B8, 0x005C, 0x8000, 0x8000,
    ]),
    // Studio Small, SPU mem required: 0x1F40
    ReverbPreset::from_registers([
        0x0033, 0x0025, 0x70F0, 0x4FA8, 0xBCE0, 0x4410, 0xC0F0, 0x9C00,
        0x5280, 0x4EC0, 0x03E4, 0x031B, 0x03A4, 0x02AF, 0x0372, 0x0266,
        0x031C, 0x025D, 0x025C, 0x018E, 0x022F, 0x0135, 0x01D2, 0x00B7,
        0x018F, 0x00B5, 0x00B4, 0x0080, 0x004C, 0x0026, 0x8000, 0x8000,
    ]),
    // Studio Medium, SPU mem required: 0x4840
    ReverbPreset::from_registers([
        0x00B1, 0x007F, 0x70F0, 0x4FA8, 0xBCE0, 0x4510, 0xBEF0, 0xB4C0,
        0x5280, 0x4EC0, 0x0904, 0x076B, 0x0824, 0x065F, 0x07A2, 0x0616,
        0x076C, 0x05ED, 0x05EC, 0x042E, 0x050F, 0x0305, 0x0462, 0x02B7,
        0x042F, 0x0265, 0x0264, 0x01B2, 0x0100, 0x0080, 0x8000, 0x8000,
    ]),
    // Studio Large, SPU mem required: 0x6FE0
    ReverbPreset::from_registers([
        0x00E3, 0x00A9, 0x6F60, 0x4FA8, 0xBCE0, 0x4510, 0xBEF0, 0xA680,
        0x5680, 0x52C0, 0x0DFB, 0x0B58, 0x0D09, 0x0A3C, 0x0BD9, 0x0973,
        0x0B59, 0x08DA, 0x08D9, 0x05E9, 0x07EC, 0x04B0, 0x06EF, 0x03D2,
        0x05EA, 0x031D, 0x031C, 0x0238, 0x0154, 0x00AA, 0x8000, 0x8000,
    ]),
    // Hall, SPU mem required: 0xADE0
    ReverbPreset::from_registers([
        0x01A5, 0x0139, 0x6000, 0x5000, 0x4C00, 0xB800, 0xBC00, 0xC000,
        0x6000, 0x5C00, 0x15BA, 0x11BB, 0x14C2, 0x10BD, 0x11BC, 0x0DC1,
        0x11C0, 0x0DC3, 0x0DC0, 0x09C1, 0x0BC4, 0x07C1, 0x0A00, 0x06CD,
        0x09C2, 0x05C1, 0x05C0, 0x041A, 0x0274, 0x013A, 0x8000, 0x8000,
    ]),
    // Half Echo, SPU mem required: 0x3C00
    ReverbPreset::from_registers([
        0x0017, 0x0013, 0x70F0, 0x4FA8, 0xBCE0, 0x4510, 0xBEF0, 0x8500,
        0x5F80, 0x54C0, 0x0371, 0x02AF, 0x02E5, 0x01DF, 0x02B0, 0x01D7,
        0x0358, 0x026A, 0x01D6, 0x011E, 0x012D, 0x00B1, 0x011F, 0x0059,
        0x01A0, 0x00E3, 0x0058, 0x0040, 0x0028, 0x0014, 0x8000, 0x8000,
    ]),
    // Space Echo, SPU mem required: 0xF6C0
    ReverbPreset::from_registers([
        0x033D, 0x0231, 0x7E00, 0x5000, 0xB400, 0xB000, 0x4C00, 0xB000,
        0x6000, 0x5400, 0x1ED6, 0x1A31, 0x1D14, 0x183B, 0x1BC2, 0x16B2,
        0x1A32, 0x15EF, 0x15EE, 0x1055, 0x1334, 0x0F2D, 0x11F6, 0x0C5D,
        0x1056, 0x0AE1, 0x0AE0, 0x07A2, 0x0464, 0x0232, 0x8000, 0x8000,
    ]),
    // Chaos Echo, SPU mem required: 0x18040
    ReverbPreset::from_registers([
        0x0001, 0x0001, 0x7FFF, 0x7FFF, 0x0000, 0x0000, 0x0000, 0x8100,
        0x0000, 0x0000, 0x1FFF, 0x0FFF, 0x1005, 0x0005, 0x0000, 0x0000,
        0x1005, 0x0005, 0x0000, 0x0000, 0x0000, 0x0000, 0x0000, 0x0000,
        0x0000, 0x0000, 0x1004, 0x1002, 0x0004, 0x0002, 0x8000, 0x8000,
    ]),
    // Delay, SPU mem required: 0x18040
    ReverbPreset::from_registers([
        0x0001, 0x0001, 0x7FFF, 0x7FFF, 0x0000, 0x0000, 0x0000, 0x0000,
        0x0000, 0x0000, 0x1FFF, 0x0FFF, 0x1005, 0x0005, 0x0000, 0x0000,
        0x1005, 0x0005, 0x0000, 0x0000, 0x0000, 0x0000, 0x0000, 0x0000,
        0x0000, 0x0000, 0x1004, 0x1002, 0x0004, 0x0002, 0x8000, 0x8000,
    ]),
    // Off, SPU mem required: 0x10
    ReverbPreset::from_registers([
        0x0000, 0x0000, 0x0000, 0x0000, 0x0000, 0x0000, 0x0000, 0x0000,
        0x0000, 0x0000, 0x0001, 0x0001, 0x0001, 0x0001, 0x0001, 0x0001,
        0x0000, 0x0000, 0x0001, 0x0001, 0x0001, 0x0001, 0x0001, 0x0001,
        0x0000, 0x0000, 0x0001, 0x0001, 0x0001, 0x0001, 0x0000, 0x0000,
    ]),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_in_range() {
        for i in 0..NUM_PRESETS {
            assert!(lookup(i).is_some(), "preset {i} should exist");
        }
    }

    #[test]
    fn lookup_out_of_range() {
        assert!(lookup(NUM_PRESETS).is_none());
        assert!(lookup(usize::MAX).is_none());
    }

    #[test]
    fn hall_register_values() {
        let hall = ReverbType::Hall.preset();
        assert_eq!(hall.d_apf1, 0x01A5);
        assert_eq!(hall.d_apf2, 0x0139);
        assert_eq!(hall.v_iir, 0x6000);
        assert_eq!(hall.v_wall, 0xC000_u16 as i16);
        assert_eq!(hall.m_l_same, 0x15BA);
        assert_eq!(hall.v_l_in, 0x8000_u16 as i16);
    }

    #[test]
    fn off_preset_gains_are_zero() {
        let off = ReverbType::Off.preset();
        assert_eq!(off.v_iir, 0);
        assert_eq!(off.v_comb1, 0);
        assert_eq!(off.v_comb2, 0);
        assert_eq!(off.v_comb3, 0);
        assert_eq!(off.v_comb4, 0);
        assert_eq!(off.v_wall, 0);
        assert_eq!(off.v_apf1, 0);
        assert_eq!(off.v_apf2, 0);
        assert_eq!(off.v_l_in, 0);
        assert_eq!(off.v_r_in, 0);
    }

    #[test]
    fn type_index_round_trip() {
        for (i, ty) in ReverbType::ALL.iter().enumerate() {
            assert_eq!(ty.index(), i);
            assert_eq!(ReverbType::from_index(i), Some(*ty));
        }
        assert_eq!(ReverbType::from_index(NUM_PRESETS), None);
    }

    #[test]
    fn type_names_match_ordinals() {
        assert_eq!(ReverbType::from_index(0).unwrap().name(), "Room");
        assert_eq!(ReverbType::from_index(4).unwrap().name(), "Hall");
        assert_eq!(ReverbType::from_index(9).unwrap().name(), "Off");
    }

    #[test]
    fn lookup_matches_type_preset() {
        for ty in ReverbType::ALL {
            assert_eq!(lookup(ty.index()), Some(ty.preset()));
        }
    }
}
