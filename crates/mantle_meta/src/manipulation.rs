//! Typed patch entries for the six manipulation categories.
//!
//! A manipulation is an identifier (*which* target inside *which* table) plus
//! a patch value. Equality, ordering and hashing consider only the
//! identifying fields: two manipulations with different values but the same
//! target are the "same" manipulation for ownership and conflict purposes.
//! The per-category structs keep that rule locally; [`MetaIdentifier`] and
//! [`MetaManipulation`] are the closed sums dispatched by category tag.

use crate::snapshot::TableKind;
use crate::types::{CombinedRace, EquipSlot, EstSlot, Gender, ModelRace, RspAttribute, SubRace};
use byteorder::{ByteOrder, LittleEndian};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// The six manipulation categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum MetaCategory {
    Imc = 1,
    Eqdp = 2,
    Eqp = 3,
    Est = 4,
    Gmp = 5,
    Rsp = 6,
}

impl fmt::Display for MetaCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

/// Target of a racial scaling patch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RspIdentifier {
    pub sub_race: SubRace,
    pub attribute: RspAttribute,
}

/// Target of an equipment parameter patch: one slot's bytes of one set row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EqpIdentifier {
    pub set_id: u16,
    pub slot: EquipSlot,
}

/// Target of a gimmick parameter patch: one whole set row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GmpIdentifier {
    pub set_id: u16,
}

/// Target of a deformation patch: one slot's bit pair of one set row in one
/// combined race's table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EqdpIdentifier {
    pub gender: Gender,
    pub race: ModelRace,
    pub set_id: u16,
    pub slot: EquipSlot,
}

impl EqdpIdentifier {
    pub fn combined_race(&self) -> CombinedRace {
        CombinedRace::of(self.gender, self.race)
    }
}

/// Target of an extra-skeleton patch: one keyed record of one slot family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EstIdentifier {
    pub slot: EstSlot,
    pub gender: Gender,
    pub race: ModelRace,
    pub set_id: u16,
}

impl EstIdentifier {
    pub fn combined_race(&self) -> CombinedRace {
        CombinedRace::of(self.gender, self.race)
    }
}

/// Target of a variant metadata patch: one variant of one slot of one set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImcIdentifier {
    pub primary_id: u16,
    pub variant: u8,
    pub slot: EquipSlot,
}

/// A packed gimmick parameter row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GmpEntry(pub u64);

impl GmpEntry {
    pub fn enabled(self) -> bool {
        self.0 & 1 != 0
    }

    pub fn animated(self) -> bool {
        self.0 & 2 != 0
    }

    pub fn rotation_a(self) -> u16 {
        (self.0 >> 2 & 0x3FF) as u16
    }

    pub fn rotation_b(self) -> u16 {
        (self.0 >> 12 & 0x3FF) as u16
    }

    pub fn rotation_c(self) -> u16 {
        (self.0 >> 22 & 0x3FF) as u16
    }

    pub fn animation_type(self) -> u8 {
        (self.0 >> 32 & 0xF) as u8
    }
}

/// One six-byte variant metadata entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImcEntry {
    pub material_id: u8,
    pub decal_id: u8,
    pub vfx_id: u8,
    pub material_animation_id: u8,
    pub attribute_and_sound: u16,
}

impl ImcEntry {
    pub const SIZE: usize = 6;

    pub fn to_bytes(self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        bytes[0] = self.material_id;
        bytes[1] = self.decal_id;
        bytes[2] = self.vfx_id;
        bytes[3] = self.material_animation_id;
        LittleEndian::write_u16(&mut bytes[4..6], self.attribute_and_sound);
        bytes
    }

    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            material_id: bytes[0],
            decal_id: bytes[1],
            vfx_id: bytes[2],
            material_animation_id: bytes[3],
            attribute_and_sound: LittleEndian::read_u16(&bytes[4..6]),
        }
    }
}

macro_rules! manipulation {
    ($(#[$doc:meta])* $name:ident, $identifier:ty, $entry:ty) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, Serialize, Deserialize)]
        #[serde(rename_all = "camelCase")]
        pub struct $name {
            #[serde(flatten)]
            pub identifier: $identifier,
            pub entry: $entry,
        }

        impl $name {
            pub fn new(identifier: $identifier, entry: $entry) -> Self {
                Self { identifier, entry }
            }
        }

        impl PartialEq for $name {
            fn eq(&self, other: &Self) -> bool {
                self.identifier == other.identifier
            }
        }

        impl Eq for $name {}

        impl Hash for $name {
            fn hash<H: Hasher>(&self, state: &mut H) {
                self.identifier.hash(state);
            }
        }
    };
}

manipulation!(
    /// A racial scaling patch; the entry is the scaling factor.
    RspManipulation, RspIdentifier, f32
);
manipulation!(
    /// An equipment parameter patch; only the identified slot's bytes of the
    /// entry are applied.
    EqpManipulation, EqpIdentifier, u64
);
manipulation!(
    /// A gimmick parameter patch covering the whole set row.
    GmpManipulation, GmpIdentifier, GmpEntry
);
manipulation!(
    /// A deformation patch; only the low two bits of the entry are applied.
    EqdpManipulation, EqdpIdentifier, u8
);
manipulation!(
    /// An extra-skeleton patch; an entry of zero removes the record.
    EstManipulation, EstIdentifier, u16
);
manipulation!(
    /// A variant metadata patch replacing one six-byte entry.
    ImcManipulation, ImcIdentifier, ImcEntry
);

/// The identifying half of a manipulation, dispatched by category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "type", content = "target")]
pub enum MetaIdentifier {
    Imc(ImcIdentifier),
    Eqdp(EqdpIdentifier),
    Eqp(EqpIdentifier),
    Est(EstIdentifier),
    Gmp(GmpIdentifier),
    Rsp(RspIdentifier),
}

impl MetaIdentifier {
    pub fn category(&self) -> MetaCategory {
        match self {
            MetaIdentifier::Imc(_) => MetaCategory::Imc,
            MetaIdentifier::Eqdp(_) => MetaCategory::Eqdp,
            MetaIdentifier::Eqp(_) => MetaCategory::Eqp,
            MetaIdentifier::Est(_) => MetaCategory::Est,
            MetaIdentifier::Gmp(_) => MetaCategory::Gmp,
            MetaIdentifier::Rsp(_) => MetaCategory::Rsp,
        }
    }

    /// The table this identifier addresses.
    pub fn table_kind(&self) -> TableKind {
        match self {
            MetaIdentifier::Imc(_) => TableKind::Imc,
            MetaIdentifier::Eqdp(id) => TableKind::Eqdp {
                race: id.combined_race(),
                accessory: id.slot.is_accessory(),
            },
            MetaIdentifier::Eqp(_) => TableKind::Eqp,
            MetaIdentifier::Est(id) => TableKind::Est(id.slot),
            MetaIdentifier::Gmp(_) => TableKind::Gmp,
            MetaIdentifier::Rsp(_) => TableKind::Rsp,
        }
    }
}

impl fmt::Display for MetaIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetaIdentifier::Imc(id) => {
                write!(f, "Imc - {} - {} - {}", id.primary_id, id.slot, id.variant)
            }
            MetaIdentifier::Eqdp(id) => write!(
                f,
                "Eqdp - {} - {} - {} - {}",
                id.gender, id.race, id.set_id, id.slot
            ),
            MetaIdentifier::Eqp(id) => write!(f, "Eqp - {} - {}", id.set_id, id.slot),
            MetaIdentifier::Est(id) => write!(
                f,
                "Est - {} - {} - {} - {}",
                id.slot, id.gender, id.race, id.set_id
            ),
            MetaIdentifier::Gmp(id) => write!(f, "Gmp - {}", id.set_id),
            MetaIdentifier::Rsp(id) => write!(f, "Rsp - {} - {}", id.sub_race, id.attribute),
        }
    }
}

/// A full manipulation: identifier plus patch value, dispatched by category.
///
/// Like the per-category structs, equality and hashing ignore the patch
/// value.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(tag = "type", content = "manipulation")]
pub enum MetaManipulation {
    Imc(ImcManipulation),
    Eqdp(EqdpManipulation),
    Eqp(EqpManipulation),
    Est(EstManipulation),
    Gmp(GmpManipulation),
    Rsp(RspManipulation),
}

impl MetaManipulation {
    pub fn identifier(&self) -> MetaIdentifier {
        match self {
            MetaManipulation::Imc(m) => MetaIdentifier::Imc(m.identifier),
            MetaManipulation::Eqdp(m) => MetaIdentifier::Eqdp(m.identifier),
            MetaManipulation::Eqp(m) => MetaIdentifier::Eqp(m.identifier),
            MetaManipulation::Est(m) => MetaIdentifier::Est(m.identifier),
            MetaManipulation::Gmp(m) => MetaIdentifier::Gmp(m.identifier),
            MetaManipulation::Rsp(m) => MetaIdentifier::Rsp(m.identifier),
        }
    }

    pub fn category(&self) -> MetaCategory {
        self.identifier().category()
    }
}

impl PartialEq for MetaManipulation {
    fn eq(&self, other: &Self) -> bool {
        self.identifier() == other.identifier()
    }
}

impl Eq for MetaManipulation {}

impl Hash for MetaManipulation {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identifier().hash(state);
    }
}

impl PartialOrd for MetaManipulation {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for MetaManipulation {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.identifier().cmp(&other.identifier())
    }
}

impl From<RspManipulation> for MetaManipulation {
    fn from(m: RspManipulation) -> Self {
        MetaManipulation::Rsp(m)
    }
}

impl From<EqpManipulation> for MetaManipulation {
    fn from(m: EqpManipulation) -> Self {
        MetaManipulation::Eqp(m)
    }
}

impl From<GmpManipulation> for MetaManipulation {
    fn from(m: GmpManipulation) -> Self {
        MetaManipulation::Gmp(m)
    }
}

impl From<EqdpManipulation> for MetaManipulation {
    fn from(m: EqdpManipulation) -> Self {
        MetaManipulation::Eqdp(m)
    }
}

impl From<EstManipulation> for MetaManipulation {
    fn from(m: EstManipulation) -> Self {
        MetaManipulation::Est(m)
    }
}

impl From<ImcManipulation> for MetaManipulation {
    fn from(m: ImcManipulation) -> Self {
        MetaManipulation::Imc(m)
    }
}
