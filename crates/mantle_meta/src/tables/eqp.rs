//! The expanded equipment parameter table: one `u64` row per set.
//!
//! Patches are masked to the identified slot's bytes, so two mods can patch
//! different slots of the same row without clobbering each other.

use crate::blob::TableBlob;
use crate::error::{Error, Result};
use crate::snapshot::TableKind;
use crate::types::EquipSlot;
use std::sync::Arc;

const ROW_SIZE: usize = 8;

/// A materialized equipment parameter table.
#[derive(Debug, Clone)]
pub struct EqpTable {
    blob: TableBlob,
}

impl EqpTable {
    pub fn validate_snapshot(bytes: &[u8]) -> Result<()> {
        if bytes.len() % ROW_SIZE != 0 {
            return Err(Error::MalformedSnapshot {
                kind: TableKind::Eqp,
                reason: format!("{} bytes is not a whole number of rows", bytes.len()),
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

    pub fn row_count(&self) -> usize {
        self.blob.len() / ROW_SIZE
    }

    /// The current row for a set; sets beyond the materialized region read
    /// as their default.
    pub fn row(&self, set: u16) -> u64 {
        let offset = set as usize * ROW_SIZE;
        if offset + ROW_SIZE <= self.blob.len() {
            self.blob.read_u64(offset)
        } else {
            self.default_row(set)
        }
    }

    /// The pristine row for a set; sets beyond the snapshot default to zero.
    pub fn default_row(&self, set: u16) -> u64 {
        self.blob.snapshot_u64(set as usize * ROW_SIZE)
    }

    /// Write the identified slot's bytes of `value` into the set's row,
    /// growing the table as needed. Reports whether stored bytes changed.
    pub fn set_slot(&mut self, set: u16, slot: EquipSlot, value: u64) -> Result<bool> {
        let mask = slot.eqp_mask().ok_or(Error::InvalidSlot {
            kind: TableKind::Eqp,
            slot,
        })?;

        let offset = set as usize * ROW_SIZE;
        self.blob.grow(offset + ROW_SIZE);
        let current = self.blob.read_u64(offset);
        Ok(self.blob.write_u64(offset, (current & !mask) | (value & mask)))
    }

    pub fn reset(&mut self) {
        self.blob.reset();
    }

    pub fn bytes(&self) -> &[u8] {
        self.blob.bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(rows: &[u64]) -> EqpTable {
        let mut bytes = Vec::with_capacity(rows.len() * ROW_SIZE);
        for row in rows {
            bytes.extend_from_slice(&row.to_le_bytes());
        }
        EqpTable::new(Arc::from(bytes)).unwrap()
    }

    #[test]
    fn test_masked_write_leaves_other_slots() {
        let mut t = table(&[0xFFFF_FFFF_FFFF_FFFF, 0]);
        assert!(t.set_slot(0, EquipSlot::Legs, 0).unwrap());
        // Legs is byte 2; everything else keeps its previous value.
        assert_eq!(t.row(0), 0xFFFF_FFFF_FF00_FFFF);
    }

    #[test]
    fn test_grow_on_unseen_set() {
        let mut t = table(&[1, 2]);
        assert_eq!(t.row_count(), 2);
        assert!(t.set_slot(5, EquipSlot::Feet, 0xAA_0000_0000).unwrap());
        assert_eq!(t.row_count(), 6);
        assert_eq!(t.row(5), 0xAA_0000_0000);
        // Rows created by growth default to zero.
        assert_eq!(t.row(3), 0);
    }

    #[test]
    fn test_accessory_slot_fails_fast() {
        let mut t = table(&[0]);
        assert!(matches!(
            t.set_slot(0, EquipSlot::Neck, 1),
            Err(Error::InvalidSlot { .. })
        ));
    }

    #[test]
    fn test_default_row_beyond_snapshot_is_zero() {
        let t = table(&[7]);
        assert_eq!(t.default_row(0), 7);
        assert_eq!(t.default_row(9), 0);
        assert_eq!(t.row(9), 0);
    }
}
