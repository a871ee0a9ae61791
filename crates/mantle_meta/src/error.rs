//! Error types for manipulation validation and table access.
//!
//! All fallible functions in this crate return [`Result<T>`], which uses
//! [`Error`] as the error type. Every variant describes an invalid
//! identifying field or a missing/malformed snapshot; they are raised at the
//! boundary that turns raw input into a table address, before any bytes are
//! written.

use crate::snapshot::TableKind;
use crate::types::EquipSlot;
use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while validating or applying manipulations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// No pristine bytes were captured for the table a manipulation targets.
    #[error("no default snapshot captured for the {0} table")]
    MissingSnapshot(TableKind),

    /// The captured bytes cannot be interpreted as the table they claim to be.
    #[error("captured {kind} table is malformed: {reason}")]
    MalformedSnapshot { kind: TableKind, reason: String },

    /// A set id addresses a row beyond a table that cannot grow.
    #[error("set {set} does not exist in the captured {kind} table")]
    UnknownSet { kind: TableKind, set: u16 },

    /// A variant index exceeds the fixed per-row variant capacity.
    #[error("variant {variant} exceeds the row capacity of {capacity} variants")]
    VariantOutOfRange { variant: u8, capacity: u8 },

    /// The slot is not addressable by the targeted table.
    #[error("slot {slot} has no bytes in the {kind} table")]
    InvalidSlot { kind: TableKind, slot: EquipSlot },
}
