//! Per-collection overlay resolution for Mantle mods.
//!
//! This crate decides, for every virtual game path and metadata target, which
//! enabled mod's version the game should see. It supports:
//!
//! - **Path resolution**: Virtual path to winning source file, with reverse
//!   lookups from source files back to the paths they cover
//! - **Conflict tracking**: Symmetric per-mod-pair records that survive
//!   priority changes and mod removal
//! - **Metadata layering**: Typed binary patches applied over pristine
//!   table snapshots, reverted per target when their owner leaves
//! - **Settings collections**: Named setting sets with depth-first
//!   inheritance
//! - **Incremental updates**: Settings notifications map to targeted
//!   add/remove/reload operations instead of full rebuilds
//!
//! # Example
//!
//! ```no_run
//! use mantle_meta::MemoryTableSource;
//! use mantle_mod::ModRegistry;
//! use mantle_overlay::{CacheContext, ClosedSink, Collection, CollectionCache, CollectionStore};
//! use std::sync::Arc;
//!
//! let mods = ModRegistry::new();
//! let mut collections = CollectionStore::new();
//! collections.insert(Collection::new("player"));
//!
//! let snapshots = Arc::new(MemoryTableSource::new());
//! let mut cache = CollectionCache::new("player", snapshots);
//! cache.full_recompute(&CacheContext {
//!     mods: &mods,
//!     settings: &collections,
//!     sink: &ClosedSink,
//! });
//!
//! if let Some(source) = cache.resolve("chara/equipment/e0001/model.mdl") {
//!     println!("redirected to {source}");
//! }
//! ```

pub mod cache;
pub mod changed;
pub mod collection;
pub mod conflicts;
pub mod error;
pub mod resolver;

// Re-export main types
pub use cache::{CacheContext, ClosedSink, CollectionCache, LiveSink, SettingChange};
pub use changed::{ChangedItem, ChangedItemValue, ChangedItems, ItemIdentifier};
pub use collection::{Collection, CollectionStore, SettingsSource};
pub use conflicts::{ConflictGraph, ConflictItem, ConflictRecord};
pub use error::{Error, Result};
pub use resolver::{ModFile, OverlayResolver};
