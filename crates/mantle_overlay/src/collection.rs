//! Named settings collections with inheritance.
//!
//! A collection stores one optional [`ModSettings`] slot per installed mod.
//! An empty slot defers to the collection's parents: the effective value is
//! found by walking the inheritance chain depth first, in declaration
//! order, and taking the first collection that has an own entry. A mod
//! without an entry anywhere in the chain is disabled.

use mantle_mod::ModSettings;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Read access to collections by name, used while walking inheritance
/// chains. The overlay cache never stores collections itself; the owning
/// application passes a source into each operation.
pub trait SettingsSource {
    fn collection(&self, name: &str) -> Option<&Collection>;
}

/// A named list of per-mod settings plus the parents it inherits from.
///
/// Serialized as JSON; inherited slots appear as `null`:
///
/// ```json
/// {
///   "name": "player",
///   "inherits": ["base"],
///   "settings": [null, { "enabled": true, "priority": 3 }]
/// }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    pub name: String,

    /// Parent collections consulted for mods without an own entry, in
    /// declaration order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub inherits: Vec<String>,

    /// One slot per installed mod index. `None` defers to the parents.
    #[serde(default)]
    pub settings: Vec<Option<ModSettings>>,
}

impl Collection {
    pub fn new(name: impl Into<String>) -> Self {
        Collection {
            name: name.into(),
            inherits: Vec::new(),
            settings: Vec::new(),
        }
    }

    /// The collection's own entry for a mod, ignoring inheritance.
    pub fn own_settings(&self, mod_index: u16) -> Option<&ModSettings> {
        self.settings.get(mod_index as usize).and_then(Option::as_ref)
    }

    /// Stores an own entry for a mod, growing the slot list as needed.
    /// Passing `None` makes the slot inherit again.
    pub fn set_settings(&mut self, mod_index: u16, settings: Option<ModSettings>) {
        let index = mod_index as usize;
        if self.settings.len() <= index {
            self.settings.resize(index + 1, None);
        }
        self.settings[index] = settings;
    }

    /// Resolves the effective settings for a mod.
    ///
    /// Walks this collection and its parents depth first, in declaration
    /// order, returning the first own entry found. Inheritance cycles are
    /// legal and simply skipped on the second visit.
    pub fn effective_settings<'a>(
        &'a self,
        source: &'a dyn SettingsSource,
        mod_index: u16,
    ) -> Option<&'a ModSettings> {
        let mut visited: HashSet<&str> = HashSet::new();
        let mut stack: Vec<&Collection> = vec![self];
        while let Some(collection) = stack.pop() {
            if !visited.insert(collection.name.as_str()) {
                continue;
            }
            if let Some(settings) = collection.own_settings(mod_index) {
                return Some(settings);
            }
            // Reversed so the first declared parent is visited first.
            for parent in collection.inherits.iter().rev() {
                if let Some(parent) = source.collection(parent) {
                    stack.push(parent);
                }
            }
        }
        None
    }
}

/// Owning map of collections by name.
#[derive(Debug, Default)]
pub struct CollectionStore {
    collections: HashMap<String, Collection>,
}

impl CollectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a collection, replacing any existing one with the same name.
    pub fn insert(&mut self, collection: Collection) {
        self.collections.insert(collection.name.clone(), collection);
    }

    pub fn get(&self, name: &str) -> Option<&Collection> {
        self.collections.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Collection> {
        self.collections.get_mut(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.collections.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.collections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collections.is_empty()
    }
}

impl SettingsSource for CollectionStore {
    fn collection(&self, name: &str) -> Option<&Collection> {
        self.collections.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enabled(priority: i32) -> ModSettings {
        ModSettings {
            enabled: true,
            priority,
            settings: Vec::new(),
        }
    }

    #[test]
    fn test_own_entry_shadows_parents() {
        let mut store = CollectionStore::new();
        let mut base = Collection::new("base");
        base.set_settings(0, Some(enabled(1)));
        store.insert(base);

        let mut player = Collection::new("player");
        player.inherits.push("base".to_string());
        player.set_settings(0, Some(enabled(7)));
        store.insert(player);

        let player = store.get("player").unwrap();
        let settings = player.effective_settings(&store, 0).unwrap();
        assert_eq!(settings.priority, 7);
    }

    #[test]
    fn test_inheritance_is_depth_first() {
        // player -> [left, right], left -> [deep]; only deep and right
        // carry an entry, so the depth-first walk must reach deep first.
        let mut store = CollectionStore::new();
        let mut deep = Collection::new("deep");
        deep.set_settings(2, Some(enabled(3)));
        store.insert(deep);

        let mut left = Collection::new("left");
        left.inherits.push("deep".to_string());
        store.insert(left);

        let mut right = Collection::new("right");
        right.set_settings(2, Some(enabled(9)));
        store.insert(right);

        let mut player = Collection::new("player");
        player.inherits = vec!["left".to_string(), "right".to_string()];
        store.insert(player);

        let player = store.get("player").unwrap();
        let settings = player.effective_settings(&store, 2).unwrap();
        assert_eq!(settings.priority, 3);
    }

    #[test]
    fn test_missing_entry_everywhere_is_disabled() {
        let mut store = CollectionStore::new();
        store.insert(Collection::new("base"));
        let mut player = Collection::new("player");
        player.inherits.push("base".to_string());
        store.insert(player);

        let player = store.get("player").unwrap();
        assert!(player.effective_settings(&store, 4).is_none());
    }

    #[test]
    fn test_inheritance_cycle_is_skipped() {
        let mut store = CollectionStore::new();
        let mut a = Collection::new("a");
        a.inherits.push("b".to_string());
        store.insert(a);
        let mut b = Collection::new("b");
        b.inherits.push("a".to_string());
        b.set_settings(1, Some(enabled(2)));
        store.insert(b);

        let a = store.get("a").unwrap();
        let settings = a.effective_settings(&store, 1).unwrap();
        assert_eq!(settings.priority, 2);
        assert!(a.effective_settings(&store, 0).is_none());
    }

    #[test]
    fn test_json_null_slots_inherit() {
        let json = r#"{
            "name": "player",
            "inherits": ["base"],
            "settings": [null, { "enabled": true, "priority": 3 }]
        }"#;
        let collection: Collection = serde_json::from_str(json).unwrap();
        assert!(collection.own_settings(0).is_none());
        let settings = collection.own_settings(1).unwrap();
        assert!(settings.enabled);
        assert_eq!(settings.priority, 3);
    }
}
