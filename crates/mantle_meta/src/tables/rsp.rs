//! The racial scaling grid inside the character parameter table.
//!
//! The table holds much more than scaling factors; only the grid starting at
//! [`SCALING_GRID_OFFSET`] is addressable. Rows are indexed by sub-race in
//! fixed pairs ([`SubRace::scaling_row`]), columns by attribute.

use crate::blob::TableBlob;
use crate::error::{Error, Result};
use crate::snapshot::TableKind;
use crate::types::{RspAttribute, SubRace};
use std::sync::Arc;

/// Byte offset of the racial scaling grid inside the table.
pub const SCALING_GRID_OFFSET: usize = 0x2A800;

/// Bytes per scaling row, one `f32` per attribute.
pub const SCALING_ROW_SIZE: usize = RspAttribute::COUNT * 4;

/// Rows in the grid; sub-race pairs sit at a stride of ten, so the last used
/// row index is 71.
pub const SCALING_ROW_COUNT: usize = 72;

/// A materialized character parameter table.
#[derive(Debug, Clone)]
pub struct RspTable {
    blob: TableBlob,
}

impl RspTable {
    /// Validate that a captured snapshot is long enough to hold the grid.
    pub fn validate_snapshot(bytes: &[u8]) -> Result<()> {
        let needed = SCALING_GRID_OFFSET + SCALING_ROW_COUNT * SCALING_ROW_SIZE;
        if bytes.len() < needed {
            return Err(Error::MalformedSnapshot {
                kind: TableKind::Rsp,
                reason: format!("{} bytes cannot hold the scaling grid", bytes.len()),
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

    fn offset(sub_race: SubRace, attribute: RspAttribute) -> usize {
        SCALING_GRID_OFFSET + sub_race.scaling_row() * SCALING_ROW_SIZE + attribute.offset()
    }

    pub fn get(&self, sub_race: SubRace, attribute: RspAttribute) -> f32 {
        self.blob.read_f32(Self::offset(sub_race, attribute))
    }

    /// Write a scaling factor, reporting whether the stored bytes changed.
    pub fn set(&mut self, sub_race: SubRace, attribute: RspAttribute, value: f32) -> bool {
        self.blob.write_f32(Self::offset(sub_race, attribute), value)
    }

    /// The pristine value for a target, read from the snapshot.
    pub fn default_value(&self, sub_race: SubRace, attribute: RspAttribute) -> f32 {
        self.blob.snapshot_f32(Self::offset(sub_race, attribute))
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
    use byteorder::{ByteOrder, LittleEndian};

    fn snapshot_with(sub_race: SubRace, attribute: RspAttribute, value: f32) -> Arc<[u8]> {
        let mut bytes = vec![0u8; SCALING_GRID_OFFSET + SCALING_ROW_COUNT * SCALING_ROW_SIZE];
        let offset = RspTable::offset(sub_race, attribute);
        LittleEndian::write_f32(&mut bytes[offset..offset + 4], value);
        Arc::from(bytes)
    }

    #[test]
    fn test_short_snapshot_is_rejected() {
        assert!(matches!(
            RspTable::new(Arc::from(vec![0u8; 16])),
            Err(Error::MalformedSnapshot { .. })
        ));
    }

    #[test]
    fn test_set_and_default_round() {
        let snap = snapshot_with(SubRace::Midlander, RspAttribute::Height, 1.0);
        let mut table = RspTable::new(snap).unwrap();

        assert_eq!(table.get(SubRace::Midlander, RspAttribute::Height), 1.0);
        assert!(table.set(SubRace::Midlander, RspAttribute::Height, 1.05));
        assert!(!table.set(SubRace::Midlander, RspAttribute::Height, 1.05));
        assert_eq!(table.get(SubRace::Midlander, RspAttribute::Height), 1.05);

        // Default derivation reads the pristine snapshot, not the live bytes.
        assert_eq!(table.default_value(SubRace::Midlander, RspAttribute::Height), 1.0);

        table.reset();
        assert_eq!(table.get(SubRace::Midlander, RspAttribute::Height), 1.0);
    }

    #[test]
    fn test_rows_do_not_alias() {
        let snap = snapshot_with(SubRace::Veena, RspAttribute::EarMax, 0.5);
        let mut table = RspTable::new(snap).unwrap();
        table.set(SubRace::Rava, RspAttribute::EarMax, 2.0);
        assert_eq!(table.get(SubRace::Veena, RspAttribute::EarMax), 0.5);
    }
}
