//! Backing byte regions for patched resource tables.
//!
//! A [`TableBlob`] is the mutable copy of one captured table. It is only
//! materialized once a category actually patches something; until then the
//! immutable snapshot serves all reads. Growth keeps the no-partial-state
//! rule: the new region is fully populated before the old one is released.

use byteorder::{ByteOrder, LittleEndian};
use std::sync::Arc;

/// A lazily-grown byte region seeded from an immutable snapshot.
#[derive(Debug, Clone)]
pub struct TableBlob {
    data: Box<[u8]>,
    snapshot: Arc<[u8]>,
}

impl TableBlob {
    /// Materialize a blob as a copy of the captured snapshot.
    pub fn from_snapshot(snapshot: Arc<[u8]>) -> Self {
        let data = snapshot.to_vec().into_boxed_slice();
        Self { data, snapshot }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The pristine bytes this blob was seeded from.
    pub fn snapshot(&self) -> &[u8] {
        &self.snapshot
    }

    /// The current bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    /// Grow the region to at least `new_len` bytes.
    ///
    /// All existing bytes are copied and the new tail is zero-filled; the old
    /// region is only released after the copy finished. Shrinking is not
    /// supported, a smaller `new_len` leaves the blob untouched.
    pub fn grow(&mut self, new_len: usize) {
        if new_len <= self.data.len() {
            return;
        }

        let mut next = vec![0u8; new_len].into_boxed_slice();
        next[..self.data.len()].copy_from_slice(&self.data);
        self.data = next;
    }

    /// Swap in a fully-built replacement region.
    ///
    /// Keyed tables insert and remove records mid-blob, which cannot be
    /// expressed as tail growth; they build the complete new region first and
    /// release the old one here.
    pub fn replace(&mut self, data: Box<[u8]>) {
        self.data = data;
    }

    /// Restore every byte to its default: the snapshot prefix is copied back
    /// and any grown tail is zeroed.
    pub fn reset(&mut self) {
        let snap_len = self.snapshot.len().min(self.data.len());
        self.data[..snap_len].copy_from_slice(&self.snapshot[..snap_len]);
        self.data[snap_len..].fill(0);
    }

    pub fn read_u16(&self, offset: usize) -> u16 {
        LittleEndian::read_u16(&self.data[offset..offset + 2])
    }

    pub fn read_u64(&self, offset: usize) -> u64 {
        LittleEndian::read_u64(&self.data[offset..offset + 8])
    }

    pub fn read_f32(&self, offset: usize) -> f32 {
        LittleEndian::read_f32(&self.data[offset..offset + 4])
    }

    /// Write a `u16`, reporting whether the stored bytes changed.
    pub fn write_u16(&mut self, offset: usize, value: u16) -> bool {
        if self.read_u16(offset) == value {
            return false;
        }
        LittleEndian::write_u16(&mut self.data[offset..offset + 2], value);
        true
    }

    /// Write a `u64`, reporting whether the stored bytes changed.
    pub fn write_u64(&mut self, offset: usize, value: u64) -> bool {
        if self.read_u64(offset) == value {
            return false;
        }
        LittleEndian::write_u64(&mut self.data[offset..offset + 8], value);
        true
    }

    /// Write an `f32`, reporting whether the stored bytes changed.
    ///
    /// Comparison is bitwise, so writing a different NaN encoding counts as
    /// a change.
    pub fn write_f32(&mut self, offset: usize, value: f32) -> bool {
        if self.read_f32(offset).to_bits() == value.to_bits() {
            return false;
        }
        LittleEndian::write_f32(&mut self.data[offset..offset + 4], value);
        true
    }

    pub fn read_bytes(&self, offset: usize, len: usize) -> &[u8] {
        &self.data[offset..offset + len]
    }

    /// Read a `u16` from the pristine snapshot, or zero when the offset lies
    /// in a grown tail the snapshot never covered.
    pub fn snapshot_u16(&self, offset: usize) -> u16 {
        if offset + 2 > self.snapshot.len() {
            return 0;
        }
        LittleEndian::read_u16(&self.snapshot[offset..offset + 2])
    }

    /// Read a `u64` from the pristine snapshot, or zero beyond its end.
    pub fn snapshot_u64(&self, offset: usize) -> u64 {
        if offset + 8 > self.snapshot.len() {
            return 0;
        }
        LittleEndian::read_u64(&self.snapshot[offset..offset + 8])
    }

    /// Read an `f32` from the pristine snapshot, or zero beyond its end.
    pub fn snapshot_f32(&self, offset: usize) -> f32 {
        if offset + 4 > self.snapshot.len() {
            return 0.0;
        }
        LittleEndian::read_f32(&self.snapshot[offset..offset + 4])
    }

    /// Write raw bytes, reporting whether the stored bytes changed.
    pub fn write_bytes(&mut self, offset: usize, bytes: &[u8]) -> bool {
        let target = &mut self.data[offset..offset + bytes.len()];
        if target == bytes {
            return false;
        }
        target.copy_from_slice(bytes);
        true
    }
}
