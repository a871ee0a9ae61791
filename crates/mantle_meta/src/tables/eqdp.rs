//! A deformation parameter table for one combined race: one `u16` row per
//! set, two bits per slot.
//!
//! Bit zero of a slot's pair marks material presence, bit one model
//! presence. The store keeps one table per combined race and accessory
//! family; the layout is identical for all of them.

use crate::blob::TableBlob;
use crate::error::{Error, Result};
use crate::snapshot::TableKind;
use crate::types::EquipSlot;
use byteorder::{ByteOrder, LittleEndian};
use std::sync::Arc;

const ROW_SIZE: usize = 2;

/// Read a slot's two-bit group straight from captured snapshot bytes,
/// without materializing a table. Sets beyond the snapshot read as zero.
pub fn snapshot_bit_pair(bytes: &[u8], set: u16, slot: EquipSlot) -> u16 {
    let offset = set as usize * ROW_SIZE;
    if offset + ROW_SIZE > bytes.len() {
        return 0;
    }
    LittleEndian::read_u16(&bytes[offset..offset + 2]) >> slot.deform_bit_offset() & 0b11
}

/// Material presence bit inside a slot's two-bit group.
pub const MATERIAL_BIT: u16 = 0b01;

/// Model presence bit inside a slot's two-bit group.
pub const MODEL_BIT: u16 = 0b10;

/// A materialized deformation table.
#[derive(Debug, Clone)]
pub struct EqdpTable {
    kind: TableKind,
    blob: TableBlob,
}

impl EqdpTable {
    pub fn validate_snapshot(kind: TableKind, bytes: &[u8]) -> Result<()> {
        if bytes.len() % ROW_SIZE != 0 {
            return Err(Error::MalformedSnapshot {
                kind,
                reason: format!("{} bytes is not a whole number of rows", bytes.len()),
            });
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

    pub fn row(&self, set: u16) -> u16 {
        let offset = set as usize * ROW_SIZE;
        if offset + ROW_SIZE <= self.blob.len() {
            self.blob.read_u16(offset)
        } else {
            self.default_row(set)
        }
    }

    /// The pristine row for a set; sets beyond the snapshot default to zero.
    pub fn default_row(&self, set: u16) -> u16 {
        self.blob.snapshot_u16(set as usize * ROW_SIZE)
    }

    /// The current two-bit group for a slot of a set.
    pub fn bit_pair(&self, set: u16, slot: EquipSlot) -> u16 {
        self.row(set) >> slot.deform_bit_offset() & 0b11
    }

    /// Write a slot's two-bit group, growing the table as needed.
    /// Only the low two bits of `value` are used. Reports whether stored
    /// bytes changed.
    pub fn set_bit_pair(&mut self, set: u16, slot: EquipSlot, value: u8) -> bool {
        let offset = set as usize * ROW_SIZE;
        self.blob.grow(offset + ROW_SIZE);

        let shift = slot.deform_bit_offset();
        let mask = 0b11u16 << shift;
        let current = self.blob.read_u16(offset);
        let next = (current & !mask) | ((value as u16 & 0b11) << shift);
        self.blob.write_u16(offset, next)
    }

    pub fn reset(&mut self) {
        self.blob.reset();
    }

    pub fn bytes(&self) -> &[u8] {
        self.blob.bytes()
    }
}
