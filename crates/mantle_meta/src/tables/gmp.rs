//! The expanded gimmick parameter table: one packed `u64` row per set.

use crate::blob::TableBlob;
use crate::error::{Error, Result};
use crate::manipulation::GmpEntry;
use crate::snapshot::TableKind;
use std::sync::Arc;

const ROW_SIZE: usize = 8;

/// A materialized gimmick parameter table.
#[derive(Debug, Clone)]
pub struct GmpTable {
    blob: TableBlob,
}

impl GmpTable {
    pub fn validate_snapshot(bytes: &[u8]) -> Result<()> {
        if bytes.len() % ROW_SIZE != 0 {
            return Err(Error::MalformedSnapshot {
                kind: TableKind::Gmp,
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

    pub fn row(&self, set: u16) -> GmpEntry {
        let offset = set as usize * ROW_SIZE;
        if offset + ROW_SIZE <= self.blob.len() {
            GmpEntry(self.blob.read_u64(offset))
        } else {
            self.default_row(set)
        }
    }

    /// The pristine row for a set; sets beyond the snapshot default to zero.
    pub fn default_row(&self, set: u16) -> GmpEntry {
        GmpEntry(self.blob.snapshot_u64(set as usize * ROW_SIZE))
    }

    /// Replace the whole row for a set, growing the table as needed.
    /// Reports whether stored bytes changed.
    pub fn set_row(&mut self, set: u16, entry: GmpEntry) -> bool {
        let offset = set as usize * ROW_SIZE;
        self.blob.grow(offset + ROW_SIZE);
        self.blob.write_u64(offset, entry.0)
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

    #[test]
    fn test_whole_row_write_and_revert() {
        let snapshot: Vec<u8> = 3u64.to_le_bytes().into_iter().chain(9u64.to_le_bytes()).collect();
        let mut t = GmpTable::new(Arc::from(snapshot)).unwrap();

        assert!(t.set_row(1, GmpEntry(0xDEAD)));
        assert_eq!(t.row(1), GmpEntry(0xDEAD));
        assert_eq!(t.default_row(1), GmpEntry(9));

        assert!(t.set_row(1, t.default_row(1)));
        assert_eq!(t.row(1), GmpEntry(9));
    }

    #[test]
    fn test_misaligned_snapshot_is_rejected() {
        assert!(matches!(
            GmpTable::new(Arc::from(vec![0u8; 9])),
            Err(Error::MalformedSnapshot { .. })
        ));
    }
}
