//! Mod definitions and per-collection settings for Mantle.
//!
//! This crate provides the read-only data model consumed by the overlay
//! resolver: mod definitions with their option groups and asset claims,
//! the per-collection settings record, and the enumeration trait giving a
//! collection access to installed and temporary mods.

pub mod data;
pub mod error;
pub mod path;
pub mod settings;
pub mod source;

// Re-export main types
pub use data::{GroupKind, GroupOption, ModData, OptionData, OptionGroup, TempMod};
pub use error::{Error, Result};
pub use path::{GamePath, SourcePath, MAX_GAME_PATH_LENGTH};
pub use settings::ModSettings;
pub use source::{ModId, ModRegistry, ModSource};
