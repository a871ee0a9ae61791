//! Lazily rebuilt index of human-identifiable changed items.
//!
//! The cache maps raw resolved state (virtual paths, patch targets) to
//! item names a user recognizes, via an [`ItemIdentifier`] collaborator.
//! Variant metadata is excluded on both sides: `.imc` paths and Imc patch
//! targets identify whole equipment sets, which floods the index with
//! items a mod never visibly touches.

use crate::error::Result;
use crate::resolver::OverlayResolver;
use mantle_meta::{MetaCategory, MetaIdentifier, MetaStore};
use mantle_mod::{GamePath, ModId};
use serde::Serialize;
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

/// Aggregated value attached to a changed item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ChangedItemValue {
    /// A quantity; summed across contributing mods and options.
    Counter(u64),
    /// Anything non-numeric; the latest contribution wins.
    Label(String),
}

/// One changed item: the mods touching it and the aggregate value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangedItem {
    /// Contributing mods in first-seen order.
    pub mods: Vec<ModId>,
    pub value: ChangedItemValue,
}

/// Names game-facing items for raw paths and patch targets.
///
/// Implementations live outside this crate (item databases, filename
/// heuristics). One subject may name several items, and a subject nobody
/// recognizes names none.
pub trait ItemIdentifier {
    fn identify_path(&self, path: &GamePath) -> Result<Vec<(String, ChangedItemValue)>>;

    fn identify_manipulation(
        &self,
        identifier: &MetaIdentifier,
    ) -> Result<Vec<(String, ChangedItemValue)>>;
}

/// Sorted index of changed items by name.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct ChangedItems {
    entries: BTreeMap<String, ChangedItem>,
}

impl ChangedItems {
    pub fn get(&self, name: &str) -> Option<&ChangedItem> {
        self.entries.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ChangedItem)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn add(&mut self, name: String, owner: ModId, value: ChangedItemValue) {
        match self.entries.entry(name) {
            Entry::Vacant(slot) => {
                slot.insert(ChangedItem {
                    mods: vec![owner],
                    value,
                });
            }
            Entry::Occupied(mut slot) => {
                let item = slot.get_mut();
                item.value = match (&item.value, &value) {
                    (ChangedItemValue::Counter(have), ChangedItemValue::Counter(add)) => {
                        ChangedItemValue::Counter(have + add)
                    }
                    _ => value,
                };
                if !item.mods.contains(&owner) {
                    item.mods.push(owner);
                }
            }
        }
    }
}

/// Builds a fresh index from the currently resolved state.
///
/// Fails as a whole if the identifier fails for any subject; the caller
/// keeps its previous index in that case.
pub(crate) fn build_changed_items(
    resolver: &OverlayResolver,
    meta: &MetaStore<ModId>,
    identifier: &dyn ItemIdentifier,
) -> Result<ChangedItems> {
    let mut items = ChangedItems::default();
    for (path, file) in resolver.iter() {
        if path.extension() == Some("imc") {
            continue;
        }
        for (name, value) in identifier.identify_path(path)? {
            items.add(name, file.owner, value);
        }
    }
    for (target, owner) in meta.identifiers() {
        if target.category() == MetaCategory::Imc {
            continue;
        }
        for (name, value) in identifier.identify_manipulation(&target)? {
            items.add(name, owner, value);
        }
    }
    Ok(items)
}
