//! Closed enumerations identifying targets inside the shared resource tables.
//!
//! Every identifying field of a manipulation is one of these types. They are
//! deliberately closed: raw input that does not name a known variant fails at
//! the deserialization boundary and never reaches table addressing.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Character gender, used by gendered table addressing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(test, derive(proptest_derive::Arbitrary))]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub const ALL: [Gender; 2] = [Gender::Male, Gender::Female];
}

/// The nine model races with their own deformation and skeleton data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(test, derive(proptest_derive::Arbitrary))]
pub enum ModelRace {
    Midlander,
    Highlander,
    Elezen,
    Miqote,
    Roegadyn,
    Lalafell,
    AuRa,
    Hrothgar,
    Viera,
}

impl ModelRace {
    pub const ALL: [ModelRace; 9] = [
        ModelRace::Midlander,
        ModelRace::Highlander,
        ModelRace::Elezen,
        ModelRace::Miqote,
        ModelRace::Roegadyn,
        ModelRace::Lalafell,
        ModelRace::AuRa,
        ModelRace::Hrothgar,
        ModelRace::Viera,
    ];

    fn block(self) -> u16 {
        self as u16
    }
}

/// The sixteen sub-races, two per model race, addressed by the racial
/// scaling table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(test, derive(proptest_derive::Arbitrary))]
pub enum SubRace {
    Midlander,
    Highlander,
    Wildwood,
    Duskwight,
    Plainsfolk,
    Dunesfolk,
    SeekerOfTheSun,
    KeeperOfTheMoon,
    Seawolf,
    Hellsguard,
    Raen,
    Xaela,
    Helion,
    Lost,
    Rava,
    Veena,
}

impl SubRace {
    pub fn model_race(self) -> ModelRace {
        match self {
            SubRace::Midlander => ModelRace::Midlander,
            SubRace::Highlander => ModelRace::Highlander,
            SubRace::Wildwood | SubRace::Duskwight => ModelRace::Elezen,
            SubRace::SeekerOfTheSun | SubRace::KeeperOfTheMoon => ModelRace::Miqote,
            SubRace::Seawolf | SubRace::Hellsguard => ModelRace::Roegadyn,
            SubRace::Plainsfolk | SubRace::Dunesfolk => ModelRace::Lalafell,
            SubRace::Raen | SubRace::Xaela => ModelRace::AuRa,
            SubRace::Helion | SubRace::Lost => ModelRace::Hrothgar,
            SubRace::Rava | SubRace::Veena => ModelRace::Viera,
        }
    }

    /// Row index of this sub-race inside the racial scaling table.
    ///
    /// Rows come in pairs at a stride of ten per model race, mirroring the
    /// shipped table layout; most of each block is unused.
    pub fn scaling_row(self) -> usize {
        match self {
            SubRace::Midlander => 0,
            SubRace::Highlander => 1,
            SubRace::Wildwood => 10,
            SubRace::Duskwight => 11,
            SubRace::Plainsfolk => 20,
            SubRace::Dunesfolk => 21,
            SubRace::SeekerOfTheSun => 30,
            SubRace::KeeperOfTheMoon => 31,
            SubRace::Seawolf => 40,
            SubRace::Hellsguard => 41,
            SubRace::Raen => 50,
            SubRace::Xaela => 51,
            SubRace::Helion => 60,
            SubRace::Lost => 61,
            SubRace::Rava => 70,
            SubRace::Veena => 71,
        }
    }
}

/// A (gender, model race) pair with its canonical numeric race code.
///
/// Deformation tables exist per combined race, and keyed skeleton records use
/// the race code as their key prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u16)]
pub enum CombinedRace {
    MidlanderMale = 101,
    MidlanderFemale = 201,
    HighlanderMale = 301,
    HighlanderFemale = 401,
    ElezenMale = 501,
    ElezenFemale = 601,
    MiqoteMale = 701,
    MiqoteFemale = 801,
    RoegadynMale = 901,
    RoegadynFemale = 1001,
    LalafellMale = 1101,
    LalafellFemale = 1201,
    AuRaMale = 1301,
    AuRaFemale = 1401,
    HrothgarMale = 1501,
    HrothgarFemale = 1601,
    VieraMale = 1701,
    VieraFemale = 1801,
}

impl CombinedRace {
    pub const ALL: [CombinedRace; 18] = [
        CombinedRace::MidlanderMale,
        CombinedRace::MidlanderFemale,
        CombinedRace::HighlanderMale,
        CombinedRace::HighlanderFemale,
        CombinedRace::ElezenMale,
        CombinedRace::ElezenFemale,
        CombinedRace::MiqoteMale,
        CombinedRace::MiqoteFemale,
        CombinedRace::RoegadynMale,
        CombinedRace::RoegadynFemale,
        CombinedRace::LalafellMale,
        CombinedRace::LalafellFemale,
        CombinedRace::AuRaMale,
        CombinedRace::AuRaFemale,
        CombinedRace::HrothgarMale,
        CombinedRace::HrothgarFemale,
        CombinedRace::VieraMale,
        CombinedRace::VieraFemale,
    ];

    /// Derive the combined race from a gender and a model race.
    pub fn of(gender: Gender, race: ModelRace) -> CombinedRace {
        let idx = race.block() as usize * 2
            + match gender {
                Gender::Male => 0,
                Gender::Female => 1,
            };
        CombinedRace::ALL[idx]
    }

    /// The canonical numeric code (`c0101` through `c1801`).
    pub fn race_code(self) -> u16 {
        self as u16
    }
}

/// Equipment and accessory slots addressable by per-set metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(test, derive(proptest_derive::Arbitrary))]
pub enum EquipSlot {
    Head,
    Body,
    Hands,
    Legs,
    Feet,
    Ears,
    Neck,
    Wrists,
    RightRing,
    LeftRing,
}

impl EquipSlot {
    pub const ALL: [EquipSlot; 10] = [
        EquipSlot::Head,
        EquipSlot::Body,
        EquipSlot::Hands,
        EquipSlot::Legs,
        EquipSlot::Feet,
        EquipSlot::Ears,
        EquipSlot::Neck,
        EquipSlot::Wrists,
        EquipSlot::RightRing,
        EquipSlot::LeftRing,
    ];

    /// Accessory slots live in separate deformation tables and have no
    /// equipment-parameter bits.
    pub fn is_accessory(self) -> bool {
        matches!(
            self,
            EquipSlot::Ears
                | EquipSlot::Neck
                | EquipSlot::Wrists
                | EquipSlot::RightRing
                | EquipSlot::LeftRing
        )
    }

    /// Index of the slot within its five-slot table family.
    pub fn slot_index(self) -> usize {
        match self {
            EquipSlot::Head | EquipSlot::Ears => 0,
            EquipSlot::Body | EquipSlot::Neck => 1,
            EquipSlot::Hands | EquipSlot::Wrists => 2,
            EquipSlot::Legs | EquipSlot::RightRing => 3,
            EquipSlot::Feet | EquipSlot::LeftRing => 4,
        }
    }

    /// Bit offset of this slot's two-bit group inside a deformation entry.
    pub fn deform_bit_offset(self) -> u32 {
        self.slot_index() as u32 * 2
    }

    /// Byte range `(offset, length)` of this slot inside an equipment
    /// parameter row, or `None` for accessory slots.
    pub fn eqp_byte_range(self) -> Option<(usize, usize)> {
        match self {
            EquipSlot::Body => Some((0, 2)),
            EquipSlot::Legs => Some((2, 1)),
            EquipSlot::Hands => Some((3, 1)),
            EquipSlot::Feet => Some((4, 1)),
            EquipSlot::Head => Some((5, 2)),
            _ => None,
        }
    }

    /// Mask of this slot's bytes inside an equipment parameter row.
    pub fn eqp_mask(self) -> Option<u64> {
        self.eqp_byte_range().map(|(offset, len)| {
            let mut mask = 0u64;
            for byte in offset..offset + len {
                mask |= 0xFF << (byte * 8);
            }
            mask
        })
    }
}

/// The four extra-skeleton sub-tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(test, derive(proptest_derive::Arbitrary))]
pub enum EstSlot {
    Face,
    Hair,
    Body,
    Head,
}

impl EstSlot {
    pub const ALL: [EstSlot; 4] = [EstSlot::Face, EstSlot::Hair, EstSlot::Body, EstSlot::Head];
}

/// Scaling attributes stored per sub-race in the racial scaling table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(test, derive(proptest_derive::Arbitrary))]
pub enum RspAttribute {
    Height,
    Muscle,
    BustMin,
    BustMax,
    TailMin,
    TailMax,
    EarMin,
    EarMax,
}

impl RspAttribute {
    pub const COUNT: usize = 8;

    /// Byte offset of this attribute inside a scaling row.
    pub fn offset(self) -> usize {
        self as usize * 4
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

impl fmt::Display for ModelRace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

impl fmt::Display for SubRace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

impl fmt::Display for EquipSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

impl fmt::Display for EstSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

impl fmt::Display for RspAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

impl fmt::Display for CombinedRace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "c{:04}", self.race_code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combined_race_codes() {
        assert_eq!(CombinedRace::of(Gender::Male, ModelRace::Midlander).race_code(), 101);
        assert_eq!(CombinedRace::of(Gender::Female, ModelRace::Midlander).race_code(), 201);
        assert_eq!(CombinedRace::of(Gender::Male, ModelRace::Lalafell).race_code(), 1101);
        assert_eq!(CombinedRace::of(Gender::Female, ModelRace::Viera).race_code(), 1801);
    }

    #[test]
    fn test_combined_race_is_exhaustive() {
        for gender in Gender::ALL {
            for race in ModelRace::ALL {
                let combined = CombinedRace::of(gender, race);
                assert!(CombinedRace::ALL.contains(&combined));
            }
        }
    }

    #[test]
    fn test_scaling_rows_are_paired() {
        assert_eq!(SubRace::Midlander.scaling_row(), 0);
        assert_eq!(SubRace::Highlander.scaling_row(), 1);
        assert_eq!(SubRace::Wildwood.scaling_row(), 10);
        assert_eq!(SubRace::Veena.scaling_row(), 71);
    }

    #[test]
    fn test_sub_race_model_race() {
        assert_eq!(SubRace::Duskwight.model_race(), ModelRace::Elezen);
        assert_eq!(SubRace::Plainsfolk.model_race(), ModelRace::Lalafell);
        assert_eq!(SubRace::Lost.model_race(), ModelRace::Hrothgar);
    }

    #[test]
    fn test_eqp_masks_are_disjoint() {
        let mut seen = 0u64;
        for slot in EquipSlot::ALL {
            if let Some(mask) = slot.eqp_mask() {
                assert_eq!(seen & mask, 0, "{slot} overlaps another slot");
                seen |= mask;
            }
        }
        // Bytes 0 through 6 are claimed, the last row byte is reserved.
        assert_eq!(seen, 0x00FF_FFFF_FFFF_FFFF);
    }

    #[test]
    fn test_accessory_slots_have_no_eqp_bits() {
        for slot in EquipSlot::ALL {
            assert_eq!(slot.is_accessory(), slot.eqp_byte_range().is_none());
        }
    }
}
