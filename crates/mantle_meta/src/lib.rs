//! Binary metadata patching for fixed-layout game resource tables.
//!
//! Mods describe their metadata edits as typed manipulations, one of six
//! categories, each targeting a specific cell of a specific table. This
//! crate keeps a mutable copy of each touched table next to an immutable
//! snapshot of its pristine bytes, so any edit can be reverted to the exact
//! default later without reloading anything. It supports:
//!
//! - **Typed manipulations**: Identifier + value pairs per category, with
//!   equality and hashing on the identifier only
//! - **Lazy materialization**: A table is copied from its snapshot the first
//!   time a manipulation touches it
//! - **Exact revert**: Defaults are recomputed from the snapshot at the same
//!   address the edit used
//! - **Ownership tracking**: Each live edit remembers the mod that made it
//! - **Derived rebuilds**: Variant metadata is recomputed from deformation
//!   contents as a final pass over a batch
//!
//! # Example
//!
//! ```no_run
//! use mantle_meta::{
//!     DefaultTableSource, MemoryTableSource, MetaManipulation, MetaStore,
//!     RspAttribute, RspIdentifier, RspManipulation, SubRace, TableKind,
//! };
//! use std::sync::Arc;
//!
//! # fn main() -> mantle_meta::Result<()> {
//! let snapshots = MemoryTableSource::new().with_table(TableKind::Rsp, load_cmp_bytes());
//! let mut store: MetaStore<u16> = MetaStore::new(Arc::new(snapshots));
//!
//! let manip: MetaManipulation = RspManipulation::new(
//!     RspIdentifier {
//!         sub_race: SubRace::Midlander,
//!         attribute: RspAttribute::Height,
//!     },
//!     1.05,
//! )
//! .into();
//!
//! store.validate(&manip)?;
//! store.apply(&manip, 3)?;
//! store.revert(&manip.identifier(), 3)?;
//! # Ok(())
//! # }
//! # fn load_cmp_bytes() -> Vec<u8> { Vec::new() }
//! ```

pub mod blob;
pub mod error;
pub mod manipulation;
pub mod snapshot;
pub mod store;
pub mod tables;
pub mod types;

// Re-export main types
pub use error::{Error, Result};
pub use manipulation::{
    EqdpIdentifier, EqdpManipulation, EqpIdentifier, EqpManipulation, EstIdentifier,
    EstManipulation, GmpEntry, GmpIdentifier, GmpManipulation, ImcEntry, ImcIdentifier,
    ImcManipulation, MetaCategory, MetaIdentifier, MetaManipulation, RspIdentifier,
    RspManipulation,
};
pub use snapshot::{DefaultTableSource, MemoryTableSource, TableKind};
pub use store::MetaStore;
pub use types::{
    CombinedRace, EquipSlot, EstSlot, Gender, ModelRace, RspAttribute, SubRace,
};
