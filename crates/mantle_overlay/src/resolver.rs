//! The path overlay: virtual asset path to winning source file.
//!
//! [`OverlayResolver`] is deliberately dumb storage. It never decides who
//! wins a path; the collection cache arbitrates claims through the
//! conflict graph and only then inserts or replaces entries here.

use mantle_mod::{GamePath, ModId, SourcePath, MAX_GAME_PATH_LENGTH};
use std::collections::{BTreeSet, HashMap};

/// One winning claim: the mod owning a virtual path and the concrete file
/// the path redirects to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModFile {
    pub owner: ModId,
    pub source: SourcePath,
}

/// Maps every claimed virtual path to the single winning [`ModFile`].
#[derive(Debug, Default)]
pub struct OverlayResolver {
    resolved: HashMap<GamePath, ModFile>,
}

impl OverlayResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up a raw path string. Malformed and over-long queries resolve
    /// to `None` like unclaimed paths do.
    pub fn resolve(&self, path: &str) -> Option<&SourcePath> {
        let path = GamePath::new(path).ok()?;
        self.resolve_path(&path)
    }

    /// Looks up a parsed path.
    ///
    /// A claimed path still resolves to `None` when the winning source is
    /// itself too long for the consuming system, or when it points at an
    /// on-disk file that no longer exists. Both are "not currently
    /// resolvable", not errors, and the claim stays in place.
    pub fn resolve_path(&self, path: &GamePath) -> Option<&SourcePath> {
        let file = self.resolved.get(path)?;
        if file.source.as_str().len() > MAX_GAME_PATH_LENGTH {
            return None;
        }
        if file.source.is_rooted() && !file.source.exists() {
            return None;
        }
        Some(&file.source)
    }

    /// All virtual paths currently mapped to `source`, matched by
    /// case-insensitive separator-normalized equality.
    ///
    /// A source that is itself a well-formed virtual path names that path
    /// too, whether or not an entry redirects it. Results are sorted.
    pub fn reverse_resolve(&self, source: &SourcePath) -> Vec<GamePath> {
        let needle = source.normalized();
        let mut paths: BTreeSet<GamePath> = self
            .resolved
            .iter()
            .filter(|(_, file)| file.source.normalized() == needle)
            .map(|(path, _)| path.clone())
            .collect();
        if let Some(own) = source.game_path() {
            paths.insert(own);
        }
        paths.into_iter().collect()
    }

    pub fn insert(&mut self, path: GamePath, owner: ModId, source: SourcePath) {
        self.resolved.insert(path, ModFile { owner, source });
    }

    pub fn remove(&mut self, path: &GamePath) -> Option<ModFile> {
        self.resolved.remove(path)
    }

    /// The mod currently owning a path, regardless of source validity.
    pub fn owner(&self, path: &GamePath) -> Option<ModId> {
        self.resolved.get(path).map(|file| file.owner)
    }

    pub fn entry(&self, path: &GamePath) -> Option<&ModFile> {
        self.resolved.get(path)
    }

    /// Every path claimed by one mod, sorted for stable removal order.
    pub fn owned_paths(&self, owner: ModId) -> Vec<GamePath> {
        let mut paths: Vec<GamePath> = self
            .resolved
            .iter()
            .filter(|(_, file)| file.owner == owner)
            .map(|(path, _)| path.clone())
            .collect();
        paths.sort_unstable();
        paths
    }

    pub fn iter(&self) -> impl Iterator<Item = (&GamePath, &ModFile)> {
        self.resolved.iter()
    }

    pub fn len(&self) -> usize {
        self.resolved.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resolved.is_empty()
    }

    pub fn clear(&mut self) {
        self.resolved.clear();
    }
}
