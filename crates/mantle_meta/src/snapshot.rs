//! Default snapshots of the shared resource tables.
//!
//! Every manipulation category patches a copy of one of these tables. The
//! pristine bytes are captured once by the host and handed to the stores
//! through [`DefaultTableSource`]; they are immutable and shared read-only
//! across all collections. Reverting a patch target always derives its
//! default value from the snapshot, never from a generic zero.

use crate::types::{CombinedRace, EstSlot};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Identifies one captured resource table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TableKind {
    /// Equipment parameters, one `u64` row per set.
    Eqp,
    /// Gimmick parameters, one `u64` row per set.
    Gmp,
    /// Deformation parameters for one combined race, one `u16` row per set.
    /// Accessory slots live in a separate table per race.
    Eqdp { race: CombinedRace, accessory: bool },
    /// Extra-skeleton records for one slot family, keyed by race code and set.
    Est(EstSlot),
    /// The character parameter table holding the racial scaling grid.
    Rsp,
    /// Per-set variant metadata, six-byte entries.
    Imc,
}

impl TableKind {
    /// Every capturable table, for hosts that capture exhaustively.
    pub fn all() -> Vec<TableKind> {
        let mut kinds = vec![
            TableKind::Eqp,
            TableKind::Gmp,
            TableKind::Rsp,
            TableKind::Imc,
        ];
        for race in CombinedRace::ALL {
            kinds.push(TableKind::Eqdp {
                race,
                accessory: false,
            });
            kinds.push(TableKind::Eqdp {
                race,
                accessory: true,
            });
        }
        for slot in EstSlot::ALL {
            kinds.push(TableKind::Est(slot));
        }
        kinds
    }
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableKind::Eqp => write!(f, "eqp"),
            TableKind::Gmp => write!(f, "gmp"),
            TableKind::Eqdp { race, accessory: false } => write!(f, "eqdp/{race}"),
            TableKind::Eqdp { race, accessory: true } => write!(f, "eqdp/{race}/accessory"),
            TableKind::Est(slot) => write!(f, "est/{slot}"),
            TableKind::Rsp => write!(f, "rsp"),
            TableKind::Imc => write!(f, "imc"),
        }
    }
}

/// Provider of the pristine table bytes used to seed and revert blobs.
///
/// Implementations must return the same bytes for the same kind for the
/// lifetime of every store built on top of them.
pub trait DefaultTableSource {
    /// The captured bytes for `kind`, or `None` if that table was never
    /// captured.
    fn table(&self, kind: TableKind) -> Option<Arc<[u8]>>;
}

/// An in-memory [`DefaultTableSource`].
#[derive(Debug, Default, Clone)]
pub struct MemoryTableSource {
    tables: HashMap<TableKind, Arc<[u8]>>,
}

impl MemoryTableSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Capture `bytes` as the pristine contents of `kind`, replacing any
    /// previous capture.
    pub fn insert(&mut self, kind: TableKind, bytes: impl Into<Arc<[u8]>>) {
        self.tables.insert(kind, bytes.into());
    }

    pub fn with_table(mut self, kind: TableKind, bytes: impl Into<Arc<[u8]>>) -> Self {
        self.insert(kind, bytes);
        self
    }
}

impl DefaultTableSource for MemoryTableSource {
    fn table(&self, kind: TableKind) -> Option<Arc<[u8]>> {
        self.tables.get(&kind).cloned()
    }
}
