//! Identity and enumeration of the mods a collection can draw from.

use crate::data::{ModData, TempMod};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Identifies one mod taking part in resolution.
///
/// Installed mods keep a stable index for the lifetime of a cache; event
/// payloads refer to that index. Temporary mods bypass collection settings
/// and are indexed within their own registries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ModId {
    /// An installed mod, by its stable index.
    Installed(u16),
    /// A temporary mod active in every collection.
    TemporaryGlobal(u16),
    /// A temporary mod scoped to the owning collection.
    TemporaryLocal(u16),
}

impl fmt::Display for ModId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModId::Installed(index) => write!(f, "installed/{index}"),
            ModId::TemporaryGlobal(index) => write!(f, "temporary/{index}"),
            ModId::TemporaryLocal(index) => write!(f, "local/{index}"),
        }
    }
}

/// Read-only enumeration of mods, in the order a full resolution pass
/// replays them: global temporaries, then collection-scoped temporaries,
/// then installed mods in stored order.
pub trait ModSource {
    /// Installed mods in stable index order.
    fn installed(&self) -> &[ModData];

    /// Always-active mods applied to every collection before any installed
    /// mod.
    fn temporary_global(&self) -> &[TempMod];

    /// Always-active mods scoped to one collection, applied after global
    /// temporaries and before installed mods.
    fn temporary_local(&self, collection: &str) -> &[TempMod];

    /// Display name for a mod id, if it refers to a known mod.
    fn name(&self, id: ModId, collection: &str) -> Option<&str> {
        match id {
            ModId::Installed(index) => self
                .installed()
                .get(index as usize)
                .map(|mod_data| mod_data.name.as_str()),
            ModId::TemporaryGlobal(index) => self
                .temporary_global()
                .get(index as usize)
                .map(|temp| temp.name.as_str()),
            ModId::TemporaryLocal(index) => self
                .temporary_local(collection)
                .get(index as usize)
                .map(|temp| temp.name.as_str()),
        }
    }

    /// Priority a mod contests with when it has no settings record.
    fn intrinsic_priority(&self, id: ModId, collection: &str) -> i32 {
        match id {
            ModId::Installed(index) => self
                .installed()
                .get(index as usize)
                .map_or(0, |mod_data| mod_data.priority),
            ModId::TemporaryGlobal(index) => self
                .temporary_global()
                .get(index as usize)
                .map_or(0, |temp| temp.priority),
            ModId::TemporaryLocal(index) => self
                .temporary_local(collection)
                .get(index as usize)
                .map_or(0, |temp| temp.priority),
        }
    }
}

/// An in-memory [`ModSource`].
#[derive(Debug, Default)]
pub struct ModRegistry {
    installed: Vec<ModData>,
    temporary_global: Vec<TempMod>,
    temporary_local: HashMap<String, Vec<TempMod>>,
}

impl ModRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_installed(&mut self, mod_data: ModData) -> ModId {
        self.installed.push(mod_data);
        ModId::Installed(self.installed.len() as u16 - 1)
    }

    pub fn push_temporary_global(&mut self, temp: TempMod) -> ModId {
        self.temporary_global.push(temp);
        ModId::TemporaryGlobal(self.temporary_global.len() as u16 - 1)
    }

    pub fn push_temporary_local(&mut self, collection: &str, temp: TempMod) -> ModId {
        let list = self.temporary_local.entry(collection.to_string()).or_default();
        list.push(temp);
        ModId::TemporaryLocal(list.len() as u16 - 1)
    }

    pub fn installed_mut(&mut self, index: u16) -> Option<&mut ModData> {
        self.installed.get_mut(index as usize)
    }
}

impl ModSource for ModRegistry {
    fn installed(&self) -> &[ModData] {
        &self.installed
    }

    fn temporary_global(&self) -> &[TempMod] {
        &self.temporary_global
    }

    fn temporary_local(&self, collection: &str) -> &[TempMod] {
        self.temporary_local
            .get(collection)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::OptionData;

    #[test]
    fn test_registry_lookup() {
        let mut registry = ModRegistry::new();
        let installed = registry.push_installed(ModData {
            name: "Installed".to_string(),
            description: None,
            priority: 2,
            groups: vec![],
            default_option: OptionData::default(),
        });
        let local = registry.push_temporary_local(
            "Base",
            TempMod {
                name: "Scoped".to_string(),
                priority: 7,
                data: OptionData::default(),
            },
        );

        assert_eq!(registry.name(installed, "Base"), Some("Installed"));
        assert_eq!(registry.name(local, "Base"), Some("Scoped"));
        assert_eq!(registry.name(local, "Other"), None);
        assert_eq!(registry.intrinsic_priority(local, "Base"), 7);
        assert_eq!(registry.intrinsic_priority(installed, "Base"), 2);
    }

    #[test]
    fn test_mod_id_display() {
        assert_eq!(ModId::Installed(3).to_string(), "installed/3");
        assert_eq!(ModId::TemporaryLocal(0).to_string(), "local/0");
    }
}
