mod changed_items;
mod config;
mod conflicts;
mod info;
mod resolve;

pub use changed_items::{list_changed_items, ChangedItemsArgs};
pub use config::{set_profile_dir, show_config};
pub use conflicts::{list_conflicts, ConflictsArgs};
pub use info::{info_mod_file, InfoArgs};
pub use resolve::{resolve_paths, ResolveArgs};
