//! On-disk mod profiles.
//!
//! A profile is a plain directory that every command reads fresh on each
//! invocation:
//!
//! ```text
//! profile/
//! ├── collections.json      # array of collections with per-mod settings
//! ├── mods/
//! │   ├── 010-aurora.json   # one mod per file, in file name order
//! │   └── 020-newhair.json
//! └── tables/               # optional pristine table snapshots
//!     ├── rsp.bin
//!     └── est/Face.bin
//! ```
//!
//! Installed mod indices follow the lexicographic order of the file names
//! under `mods/`, so the settings arrays inside `collections.json` stay
//! aligned as long as files keep their names. Snapshot files are probed
//! per table kind at `tables/<kind>.bin` using the kind's display name;
//! profiles without snapshots still resolve files but skip metadata
//! patches.

use crate::errors::CliError;
use camino::{Utf8Path, Utf8PathBuf};
use mantle_meta::{MemoryTableSource, TableKind};
use mantle_mod::{ModData, ModId, ModRegistry, ModSource};
use mantle_overlay::{CacheContext, ClosedSink, Collection, CollectionCache, CollectionStore};
use miette::Result;
use std::fs;
use std::sync::Arc;
use tracing::debug;

pub const COLLECTIONS_FILE: &str = "collections.json";
pub const MODS_DIR: &str = "mods";
pub const TABLES_DIR: &str = "tables";

/// Everything a command needs from one profile directory.
#[derive(Debug)]
pub struct Profile {
    pub root: Utf8PathBuf,
    pub mods: ModRegistry,
    pub collections: CollectionStore,
    pub snapshots: Arc<MemoryTableSource>,
}

impl Profile {
    pub fn load(root: impl AsRef<Utf8Path>) -> Result<Self> {
        let root = root.as_ref().to_owned();
        if !root.is_dir() {
            return Err(CliError::ProfileNotFound { path: root }.into());
        }

        let collections = load_collections(&root)?;
        let mods = load_mods(&root)?;
        let snapshots = Arc::new(load_snapshots(&root));

        Ok(Profile {
            root,
            mods,
            collections,
            snapshots,
        })
    }

    /// Builds and fully recomputes the overlay cache for one collection.
    pub fn build_cache(&self, collection: &str) -> Result<CollectionCache> {
        if self.collections.get(collection).is_none() {
            let mut available: Vec<&str> = self.collections.names().collect();
            available.sort_unstable();
            return Err(
                CliError::collection_not_found(collection, available.join(", ")).into(),
            );
        }

        let mut cache = CollectionCache::new(collection, self.snapshots.clone());
        cache.full_recompute(&CacheContext {
            mods: &self.mods,
            settings: &self.collections,
            sink: &ClosedSink,
        });
        Ok(cache)
    }

    /// Display name for a mod id, falling back to the raw id.
    pub fn mod_label(&self, id: ModId, collection: &str) -> String {
        match self.mods.name(id, collection) {
            Some(name) => name.to_string(),
            None => id.to_string(),
        }
    }

    /// The installed mod with this display name.
    pub fn find_installed(&self, name: &str) -> Option<ModId> {
        self.mods
            .installed()
            .iter()
            .position(|data| data.name == name)
            .map(|index| ModId::Installed(index as u16))
    }
}

fn load_collections(root: &Utf8Path) -> Result<CollectionStore> {
    let path = root.join(COLLECTIONS_FILE);
    if !path.is_file() {
        return Err(CliError::CollectionsFileMissing { path }.into());
    }
    let content = fs::read_to_string(&path).map_err(CliError::from)?;
    let entries: Vec<Collection> =
        serde_json::from_str(&content).map_err(|source| CliError::parse_error(path, source))?;

    let mut store = CollectionStore::new();
    for collection in entries {
        store.insert(collection);
    }
    Ok(store)
}

fn load_mods(root: &Utf8Path) -> Result<ModRegistry> {
    let dir = root.join(MODS_DIR);
    if !dir.is_dir() {
        return Err(CliError::ModsDirectoryMissing { path: dir }.into());
    }

    let mut files: Vec<Utf8PathBuf> = Vec::new();
    for entry in dir.read_dir_utf8().map_err(CliError::from)? {
        let entry = entry.map_err(CliError::from)?;
        let path = entry.into_path();
        if path.extension() == Some("json") {
            files.push(path);
        }
    }
    files.sort();

    let mut registry = ModRegistry::new();
    for path in files {
        let content = fs::read_to_string(&path).map_err(CliError::from)?;
        let data: ModData = serde_json::from_str(&content)
            .map_err(|source| CliError::parse_error(path.clone(), source))?;
        debug!(mod_name = %data.name, file = %path, "loaded mod");
        registry.push_installed(data);
    }
    Ok(registry)
}

fn load_snapshots(root: &Utf8Path) -> MemoryTableSource {
    let dir = root.join(TABLES_DIR);
    let mut source = MemoryTableSource::new();
    if !dir.is_dir() {
        return source;
    }
    for kind in TableKind::all() {
        let path = dir.join(format!("{kind}.bin"));
        if let Ok(bytes) = fs::read(&path) {
            debug!(table = %kind, size = bytes.len(), "captured table snapshot");
            source.insert(kind, bytes);
        }
    }
    source
}
