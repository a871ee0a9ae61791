//! An extra-skeleton table for one slot family.
//!
//! Unlike the dense per-set tables this is a keyed file: a `u32` record
//! count followed by six-byte records of `(race code, set id, skeleton id)`,
//! sorted by race code then set id. A skeleton id of zero means "no extra
//! skeleton" and is stored as record absence.

use crate::blob::TableBlob;
use crate::error::{Error, Result};
use crate::snapshot::TableKind;
use byteorder::{ByteOrder, LittleEndian};
use std::sync::Arc;

const HEADER_SIZE: usize = 4;
const RECORD_SIZE: usize = 6;

/// A materialized extra-skeleton table.
#[derive(Debug, Clone)]
pub struct EstTable {
    kind: TableKind,
    blob: TableBlob,
}

fn record_count(bytes: &[u8]) -> usize {
    LittleEndian::read_u32(&bytes[0..4]) as usize
}

fn record_key(bytes: &[u8], index: usize) -> (u16, u16) {
    let offset = HEADER_SIZE + index * RECORD_SIZE;
    (
        LittleEndian::read_u16(&bytes[offset..offset + 2]),
        LittleEndian::read_u16(&bytes[offset + 2..offset + 4]),
    )
}

fn record_value(bytes: &[u8], index: usize) -> u16 {
    let offset = HEADER_SIZE + index * RECORD_SIZE + 4;
    LittleEndian::read_u16(&bytes[offset..offset + 2])
}

/// Binary search for a key; `Err` carries the insertion point.
fn search(bytes: &[u8], race_code: u16, set_id: u16) -> std::result::Result<usize, usize> {
    let key = (race_code, set_id);
    let mut lo = 0;
    let mut hi = record_count(bytes);
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        match record_key(bytes, mid).cmp(&key) {
            std::cmp::Ordering::Less => lo = mid + 1,
            std::cmp::Ordering::Greater => hi = mid,
            std::cmp::Ordering::Equal => return Ok(mid),
        }
    }
    Err(lo)
}

impl EstTable {
    pub fn validate_snapshot(kind: TableKind, bytes: &[u8]) -> Result<()> {
        if bytes.len() < HEADER_SIZE {
            return Err(Error::MalformedSnapshot {
                kind,
                reason: "missing record count header".into(),
            });
        }

        let count = record_count(bytes);
        if bytes.len() != HEADER_SIZE + count * RECORD_SIZE {
            return Err(Error::MalformedSnapshot {
                kind,
                reason: format!("header claims {count} records, length disagrees"),
            });
        }

        for i in 1..count {
            if record_key(bytes, i - 1) >= record_key(bytes, i) {
                return Err(Error::MalformedSnapshot {
                    kind,
                    reason: format!("records {} and {} are out of order", i - 1, i),
                });
            }
        }

        Ok(())
    }

    pub fn new(kind: TableKind, snapshot: Arc<[u8]>) -> Result<Self> {
        Self::validate_snapshot(kind, &snapshot)?;
        Ok(Self {
            kind,
            blob: TableBlob::from_snapshot(snapshot),
        })
    }

    pub fn kind(&self) -> TableKind {
        self.kind
    }

    pub fn record_count(&self) -> usize {
        record_count(self.blob.bytes())
    }

    /// The current skeleton id for a key; absence reads as zero.
    pub fn get(&self, race_code: u16, set_id: u16) -> u16 {
        match search(self.blob.bytes(), race_code, set_id) {
            Ok(i) => record_value(self.blob.bytes(), i),
            Err(_) => 0,
        }
    }

    /// The pristine skeleton id for a key, read from the snapshot.
    pub fn default_value(&self, race_code: u16, set_id: u16) -> u16 {
        match search(self.blob.snapshot(), race_code, set_id) {
            Ok(i) => record_value(self.blob.snapshot(), i),
            Err(_) => 0,
        }
    }

    /// Write a skeleton id for a key, inserting or removing the record as
    /// needed. Reports whether stored bytes changed.
    pub fn set(&mut self, race_code: u16, set_id: u16, value: u16) -> bool {
        match search(self.blob.bytes(), race_code, set_id) {
            Ok(i) if value == 0 => {
                self.remove_record(i);
                true
            }
            Ok(i) => {
                let offset = HEADER_SIZE + i * RECORD_SIZE + 4;
                self.blob.write_u16(offset, value)
            }
            Err(_) if value == 0 => false,
            Err(i) => {
                self.insert_record(i, race_code, set_id, value);
                true
            }
        }
    }

    fn insert_record(&mut self, index: usize, race_code: u16, set_id: u16, value: u16) {
        let bytes = self.blob.bytes();
        let count = record_count(bytes);
        let split = HEADER_SIZE + index * RECORD_SIZE;

        let mut next = Vec::with_capacity(bytes.len() + RECORD_SIZE);
        next.extend_from_slice(&(count as u32 + 1).to_le_bytes());
        next.extend_from_slice(&bytes[HEADER_SIZE..split]);
        next.extend_from_slice(&race_code.to_le_bytes());
        next.extend_from_slice(&set_id.to_le_bytes());
        next.extend_from_slice(&value.to_le_bytes());
        next.extend_from_slice(&bytes[split..]);

        self.blob.replace(next.into_boxed_slice());
    }

    fn remove_record(&mut self, index: usize) {
        let bytes = self.blob.bytes();
        let count = record_count(bytes);
        let start = HEADER_SIZE + index * RECORD_SIZE;

        let mut next = Vec::with_capacity(bytes.len() - RECORD_SIZE);
        next.extend_from_slice(&(count as u32 - 1).to_le_bytes());
        next.extend_from_slice(&bytes[HEADER_SIZE..start]);
        next.extend_from_slice(&bytes[start + RECORD_SIZE..]);

        self.blob.replace(next.into_boxed_slice());
    }

    /// Restore the exact snapshot contents.
    pub fn reset(&mut self) {
        let pristine = self.blob.snapshot().to_vec().into_boxed_slice();
        self.blob.replace(pristine);
    }

    pub fn bytes(&self) -> &[u8] {
        self.blob.bytes()
    }
}
