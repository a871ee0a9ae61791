//! The per-set variant metadata table.
//!
//! Each set owns a block of ten slot columns with a fixed variant capacity
//! of six-byte entries. The table cannot grow: a set beyond the captured
//! snapshot or a variant beyond the row capacity is an invalid identifying
//! field and fails fast.

use crate::blob::TableBlob;
use crate::error::{Error, Result};
use crate::manipulation::ImcEntry;
use crate::snapshot::TableKind;
use crate::types::EquipSlot;
use std::sync::Arc;

/// Variants per (set, slot) row.
pub const VARIANT_CAPACITY: u8 = 32;

const SLOT_COLUMNS: usize = 10;
const SET_STRIDE: usize = SLOT_COLUMNS * VARIANT_CAPACITY as usize * ImcEntry::SIZE;

fn slot_column(slot: EquipSlot) -> usize {
    match slot {
        EquipSlot::Head => 0,
        EquipSlot::Body => 1,
        EquipSlot::Hands => 2,
        EquipSlot::Legs => 3,
        EquipSlot::Feet => 4,
        EquipSlot::Ears => 5,
        EquipSlot::Neck => 6,
        EquipSlot::Wrists => 7,
        EquipSlot::RightRing => 8,
        EquipSlot::LeftRing => 9,
    }
}

/// Check a target against a snapshot of `snapshot_len` bytes without
/// materializing a table.
pub fn validate_target(snapshot_len: usize, set: u16, variant: u8) -> Result<()> {
    if variant >= VARIANT_CAPACITY {
        return Err(Error::VariantOutOfRange {
            variant,
            capacity: VARIANT_CAPACITY,
        });
    }
    if (set as usize + 1) * SET_STRIDE > snapshot_len {
        return Err(Error::UnknownSet {
            kind: TableKind::Imc,
            set,
        });
    }
    Ok(())
}

/// A materialized variant metadata table.
#[derive(Debug, Clone)]
pub struct ImcTable {
    blob: TableBlob,
}

impl ImcTable {
    pub fn validate_snapshot(bytes: &[u8]) -> Result<()> {
        if bytes.len() % SET_STRIDE != 0 {
            return Err(Error::MalformedSnapshot {
                kind: TableKind::Imc,
                reason: format!("{} bytes is not a whole number of set blocks", bytes.len()),
            });
        }
        Ok(())
    }

    pub fn new(snapshot: Arc<[u8]>) -> Result<Self> {
        Self::validate_snapshot(&snapshot)?;
        Ok(Self {
            blob: TableBlob::from_snapshot(snapshot),
        })
    }

    pub fn set_count(&self) -> usize {
        self.blob.len() / SET_STRIDE
    }

    fn offset(&self, set: u16, slot: EquipSlot, variant: u8) -> Result<usize> {
        validate_target(self.blob.len(), set, variant)?;
        Ok(set as usize * SET_STRIDE
            + slot_column(slot) * VARIANT_CAPACITY as usize * ImcEntry::SIZE
            + variant as usize * ImcEntry::SIZE)
    }

    pub fn get(&self, set: u16, slot: EquipSlot, variant: u8) -> Result<ImcEntry> {
        let offset = self.offset(set, slot, variant)?;
        Ok(ImcEntry::from_bytes(self.blob.read_bytes(offset, ImcEntry::SIZE)))
    }

    /// The pristine entry for a target, read from the snapshot.
    pub fn default_entry(&self, set: u16, slot: EquipSlot, variant: u8) -> Result<ImcEntry> {
        let offset = self.offset(set, slot, variant)?;
        Ok(ImcEntry::from_bytes(&self.blob.snapshot()[offset..offset + ImcEntry::SIZE]))
    }

    /// Replace one entry, reporting whether stored bytes changed.
    pub fn set_entry(&mut self, set: u16, slot: EquipSlot, variant: u8, entry: ImcEntry) -> Result<bool> {
        let offset = self.offset(set, slot, variant)?;
        Ok(self.blob.write_bytes(offset, &entry.to_bytes()))
    }

    pub fn reset(&mut self) {
        self.blob.reset();
    }

    pub fn bytes(&self) -> &[u8] {
        self.blob.bytes()
    }
}
