//! Per-collection cache tying the resolver, conflict graph and metadata
//! store together.
//!
//! A [`CollectionCache`] owns the three structures exclusively and mutates
//! them only through a small set of logical operations: add, remove,
//! reload, full recompute, and the settings-notification dispatcher
//! [`CollectionCache::on_change`]. Each logical operation advances the
//! change counter exactly once, no matter how many files it touches or
//! how many opponent reloads it cascades into, so dependents can use the
//! counter as a cheap staleness check.
//!
//! The cache holds no references to the outside world. Mod data, settings
//! collections and the live-table sink are passed in per operation via
//! [`CacheContext`], leaving the owning application free to rebuild them
//! between calls.

use crate::changed::{build_changed_items, ChangedItems, ItemIdentifier};
use crate::collection::SettingsSource;
use crate::conflicts::{ConflictGraph, ConflictItem, ConflictRecord};
use crate::resolver::OverlayResolver;
use mantle_meta::{DefaultTableSource, MetaManipulation, MetaStore, TableKind};
use mantle_mod::{GamePath, ModId, ModSettings, ModSource, OptionData, SourcePath};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, info, warn};

/// A settings notification delivered by the owning application.
///
/// `old` carries the previous value where the sender knows it. Enable
/// transitions that come out of inheritance changes carry `None` because
/// no previous effective value was stored locally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingChange {
    /// The collection's inheritance list changed.
    Inheritance,
    /// One mod's settings switched between inherited and locally owned.
    ModInheritance { mod_index: u16 },
    /// One mod's enabled flag changed.
    EnableState { mod_index: u16, old: Option<bool> },
    /// One mod's priority changed.
    Priority { mod_index: u16, old: i32 },
    /// One option group's selection changed.
    Setting {
        mod_index: u16,
        group_index: usize,
        old: u64,
    },
    /// Enabled flags changed for many mods at once.
    MultiEnableState,
    /// Selections changed for many mods or groups at once.
    MultiSetting,
}

/// Receiver for the live resource tables of the consuming process.
///
/// After every logical mutation the cache pushes its materialized tables
/// through the sink, provided the one-time readiness gate has opened;
/// while the gate is closed the flush is skipped entirely.
pub trait LiveSink {
    /// Whether the readiness gate has opened.
    fn is_open(&self) -> bool;

    /// Installs the current bytes for one table.
    fn install_table(&self, kind: TableKind, bytes: &[u8]);

    /// Reloads resources the consuming process keeps resident.
    fn reload_resident(&self);
}

/// A sink whose readiness gate never opens. For offline tools and tests
/// that only inspect resolved state.
#[derive(Debug, Default, Clone, Copy)]
pub struct ClosedSink;

impl LiveSink for ClosedSink {
    fn is_open(&self) -> bool {
        false
    }

    fn install_table(&self, _kind: TableKind, _bytes: &[u8]) {}

    fn reload_resident(&self) {}
}

/// The collaborators one cache operation consults.
#[derive(Clone, Copy)]
pub struct CacheContext<'a> {
    pub mods: &'a dyn ModSource,
    pub settings: &'a dyn SettingsSource,
    pub sink: &'a dyn LiveSink,
}

/// Resolution state for one activated collection.
pub struct CollectionCache {
    collection: String,
    resolver: OverlayResolver,
    conflicts: ConflictGraph,
    meta: MetaStore<ModId>,
    /// Contest priority per currently placed mod: the collection-settings
    /// priority for installed mods, the intrinsic one for temporary mods.
    priorities: HashMap<ModId, i32>,
    counter: u64,
    changed: ChangedItems,
    changed_stamp: Option<u64>,
}

impl std::fmt::Debug for CollectionCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // `meta` holds a `dyn DefaultTableSource` and cannot derive Debug.
        f.debug_struct("CollectionCache")
            .field("collection", &self.collection)
            .field("resolver", &self.resolver)
            .field("conflicts", &self.conflicts)
            .field("priorities", &self.priorities)
            .field("counter", &self.counter)
            .field("changed", &self.changed)
            .field("changed_stamp", &self.changed_stamp)
            .finish_non_exhaustive()
    }
}

impl CollectionCache {
    /// Creates an empty cache for one collection. `snapshots` seeds the
    /// metadata stores and is shared read-only across caches.
    pub fn new(collection: impl Into<String>, snapshots: Arc<dyn DefaultTableSource>) -> Self {
        CollectionCache {
            collection: collection.into(),
            resolver: OverlayResolver::new(),
            conflicts: ConflictGraph::new(),
            meta: MetaStore::new(snapshots),
            priorities: HashMap::new(),
            counter: 0,
            changed: ChangedItems::default(),
            changed_stamp: None,
        }
    }

    /// The collection this cache resolves for.
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Monotonic stamp advanced once per logical mutation.
    pub fn change_counter(&self) -> u64 {
        self.counter
    }

    pub fn resolve(&self, path: &str) -> Option<&SourcePath> {
        self.resolver.resolve(path)
    }

    pub fn resolve_path(&self, path: &GamePath) -> Option<&SourcePath> {
        self.resolver.resolve_path(path)
    }

    pub fn reverse_resolve(&self, source: &SourcePath) -> Vec<GamePath> {
        self.resolver.reverse_resolve(source)
    }

    /// Read access to the resolved-files overlay.
    pub fn resolved(&self) -> &OverlayResolver {
        &self.resolver
    }

    /// The conflicts one mod participates in.
    pub fn conflicts(&self, mod_id: ModId) -> Vec<&ConflictRecord> {
        self.conflicts.conflicts(mod_id)
    }

    /// Every live conflict record, once each.
    pub fn all_conflicts(&self) -> impl Iterator<Item = &ConflictRecord> {
        self.conflicts.all()
    }

    /// Read access to the metadata stores, including per-target owner
    /// lookups and current values.
    pub fn meta(&self) -> &MetaStore<ModId> {
        &self.meta
    }

    /// Places one mod's contributions into the overlay. No-op when the
    /// mod is missing or not effectively enabled; temporary mods bypass
    /// settings entirely.
    pub fn add_mod(&mut self, ctx: &CacheContext<'_>, id: ModId) {
        if let Some(manipulated) = self.add_mod_inner(ctx, id) {
            self.finish_mutation(ctx, manipulated);
        }
    }

    /// Withdraws one mod's contributions. Opponents that lost contested
    /// items to it are re-added in place so their claims re-resolve
    /// against whoever is next in line.
    pub fn remove_mod(&mut self, ctx: &CacheContext<'_>, id: ModId) {
        self.remove_mod_inner(ctx, id);
        self.finish_mutation(ctx, false);
    }

    /// Withdraws and re-adds one mod, picking up changed settings.
    pub fn reload_mod(&mut self, ctx: &CacheContext<'_>, id: ModId) {
        self.remove_mod_inner(ctx, id);
        let manipulated = self.add_mod_inner(ctx, id).unwrap_or(false);
        self.finish_mutation(ctx, manipulated);
    }

    /// Rebuilds everything from scratch: global temporary mods, then
    /// collection-scoped temporary mods, then installed mods in stored
    /// order.
    pub fn full_recompute(&mut self, ctx: &CacheContext<'_>) {
        self.resolver.clear();
        self.conflicts.clear();
        self.priorities.clear();
        self.meta.reset();

        let global = ctx.mods.temporary_global().len();
        for index in 0..global {
            self.add_mod_inner(ctx, ModId::TemporaryGlobal(index as u16));
        }
        let local = ctx.mods.temporary_local(&self.collection).len();
        for index in 0..local {
            self.add_mod_inner(ctx, ModId::TemporaryLocal(index as u16));
        }
        let installed = ctx.mods.installed().len();
        for index in 0..installed {
            self.add_mod_inner(ctx, ModId::Installed(index as u16));
        }

        info!(
            collection = %self.collection,
            resolved = self.resolver.len(),
            conflicts = self.conflicts.len(),
            manipulations = self.meta.entry_count(),
            "recomputed collection overlay"
        );
        self.finish_mutation(ctx, true);
    }

    /// Applies one settings notification, choosing between a targeted
    /// update and a full rebuild.
    pub fn on_change(&mut self, ctx: &CacheContext<'_>, change: SettingChange) {
        match change {
            SettingChange::Inheritance
            | SettingChange::MultiEnableState
            | SettingChange::MultiSetting => self.full_recompute(ctx),
            SettingChange::ModInheritance { mod_index }
            | SettingChange::EnableState {
                mod_index,
                old: None,
            } => {
                // The previous effective value is unknown; what counts is
                // whether the mod should be present now.
                let id = ModId::Installed(mod_index);
                if self.mod_enabled(ctx, mod_index) {
                    self.reload_mod(ctx, id);
                } else {
                    self.remove_mod(ctx, id);
                }
            }
            SettingChange::EnableState {
                mod_index,
                old: Some(false),
            } => self.add_mod(ctx, ModId::Installed(mod_index)),
            SettingChange::EnableState {
                mod_index,
                old: Some(true),
            } => self.remove_mod(ctx, ModId::Installed(mod_index)),
            SettingChange::Priority { mod_index, .. } => {
                let id = ModId::Installed(mod_index);
                // Keep the cached priority current even when no conflict
                // forces a reload right now.
                if let Some(settings) = self.effective_settings(ctx, mod_index) {
                    let priority = settings.priority;
                    if let Some(cached) = self.priorities.get_mut(&id) {
                        *cached = priority;
                    }
                }
                if self.conflicts.involving(id) {
                    self.reload_mod(ctx, id);
                }
            }
            SettingChange::Setting { mod_index, .. } => {
                if self.mod_enabled(ctx, mod_index) {
                    self.reload_mod(ctx, ModId::Installed(mod_index));
                }
            }
        }
    }

    /// Runs once when the consuming process signals readiness: dependents
    /// must re-read their views and the live tables receive their first
    /// install.
    pub fn notify_ready(&mut self, ctx: &CacheContext<'_>) {
        self.counter += 1;
        self.flush_live(ctx);
    }

    /// The changed-items index, rebuilt only when the change counter has
    /// advanced since the last build. A failing [`ItemIdentifier`] leaves
    /// the previous index in place until the next structural change.
    pub fn changed_items(&mut self, identifier: &dyn ItemIdentifier) -> &ChangedItems {
        if self.changed_stamp == Some(self.counter) {
            return &self.changed;
        }
        self.changed_stamp = Some(self.counter);
        match build_changed_items(&self.resolver, &self.meta, identifier) {
            Ok(items) => self.changed = items,
            Err(err) => error!(
                collection = %self.collection,
                error = %err,
                "changed item rebuild failed, keeping previous index"
            ),
        }
        &self.changed
    }

    fn effective_settings<'a>(
        &self,
        ctx: &CacheContext<'a>,
        mod_index: u16,
    ) -> Option<&'a ModSettings> {
        ctx.settings
            .collection(&self.collection)?
            .effective_settings(ctx.settings, mod_index)
    }

    fn mod_enabled(&self, ctx: &CacheContext<'_>, mod_index: u16) -> bool {
        self.effective_settings(ctx, mod_index)
            .is_some_and(|settings| settings.enabled)
    }

    /// Places contributions without touching the counter. Returns `None`
    /// when nothing was placed, `Some(manipulated)` otherwise.
    fn add_mod_inner(&mut self, ctx: &CacheContext<'_>, id: ModId) -> Option<bool> {
        match id {
            ModId::Installed(index) => {
                let mod_data = ctx.mods.installed().get(index as usize)?;
                let settings = self.effective_settings(ctx, index)?;
                if !settings.enabled {
                    return None;
                }
                self.priorities.insert(id, settings.priority);
                let options = mod_data.emitted_options(settings);
                Some(self.offer_options(id, &options))
            }
            ModId::TemporaryGlobal(index) => {
                let temp = ctx.mods.temporary_global().get(index as usize)?;
                self.priorities.insert(id, temp.priority);
                Some(self.offer_options(id, &[&temp.data]))
            }
            ModId::TemporaryLocal(index) => {
                let temp = ctx
                    .mods
                    .temporary_local(&self.collection)
                    .get(index as usize)?;
                self.priorities.insert(id, temp.priority);
                Some(self.offer_options(id, &[&temp.data]))
            }
        }
    }

    /// Withdraws contributions without touching the counter. Opponents
    /// whose items the removed mod held are reloaded in place, which may
    /// cascade; the cascade is bounded by the number of live records.
    fn remove_mod_inner(&mut self, ctx: &CacheContext<'_>, id: ModId) {
        for path in self.resolver.owned_paths(id) {
            self.resolver.remove(&path);
        }
        for identifier in self.meta.owned_identifiers(id) {
            if let Err(err) = self.meta.revert(&identifier, id) {
                warn!(
                    mod_id = %id,
                    identifier = %identifier,
                    error = %err,
                    "failed to revert metadata patch"
                );
            }
        }
        self.priorities.remove(&id);

        for (other, held) in self.conflicts.remove_mod(id) {
            if held {
                self.remove_mod_inner(ctx, other);
                self.add_mod_inner(ctx, other);
            }
        }
    }

    /// Offers every file and manipulation of the emitted options, in
    /// emission order. Returns whether any valid manipulation was seen.
    fn offer_options(&mut self, id: ModId, options: &[&OptionData]) -> bool {
        // Validate up front so a malformed entry is skipped instead of
        // leaving a half-applied batch.
        for data in options {
            for manipulation in &data.manipulations {
                if let Err(err) = self.meta.validate(manipulation) {
                    warn!(
                        mod_id = %id,
                        identifier = %manipulation.identifier(),
                        error = %err,
                        "skipping invalid metadata patch"
                    );
                }
            }
        }

        let mut manipulated = false;
        for data in options {
            for (path, source) in data.paths() {
                self.offer_file(id, path, source);
            }
            for manipulation in &data.manipulations {
                if self.meta.validate(manipulation).is_err() {
                    continue;
                }
                manipulated = true;
                self.offer_manipulation(id, manipulation);
            }
        }
        manipulated
    }

    /// One claim on a virtual path. Unclaimed paths are taken silently. A
    /// repeat offer from the same mod is a lower-priority option of that
    /// mod and is dropped without bookkeeping; claims against another mod
    /// go through the conflict graph.
    fn offer_file(&mut self, id: ModId, path: &GamePath, source: &SourcePath) {
        let Some(current) = self.resolver.owner(path) else {
            self.resolver.insert(path.clone(), id, source.clone());
            return;
        };
        if current == id {
            return;
        }
        let taken = self.conflicts.add_conflict(
            ConflictItem::File(path.clone()),
            id,
            current,
            &self.priorities,
        );
        if taken {
            self.resolver.insert(path.clone(), id, source.clone());
        }
    }

    /// One claim on a metadata patch target, with the same arbitration as
    /// [`Self::offer_file`].
    fn offer_manipulation(&mut self, id: ModId, manipulation: &MetaManipulation) {
        let identifier = manipulation.identifier();
        let Some(current) = self.meta.owner(&identifier) else {
            self.apply_manipulation(id, manipulation);
            return;
        };
        if current == id {
            return;
        }
        let taken =
            self.conflicts
                .add_conflict(ConflictItem::Meta(identifier), id, current, &self.priorities);
        if taken {
            self.apply_manipulation(id, manipulation);
        }
    }

    fn apply_manipulation(&mut self, id: ModId, manipulation: &MetaManipulation) {
        if let Err(err) = self.meta.apply(manipulation, id) {
            warn!(
                mod_id = %id,
                identifier = %manipulation.identifier(),
                error = %err,
                "failed to apply metadata patch"
            );
        }
    }

    /// Common tail of every logical mutation: optionally re-derives
    /// dependent metadata, advances the counter once, and pushes state to
    /// an open sink.
    fn finish_mutation(&mut self, ctx: &CacheContext<'_>, rebuild_derived: bool) {
        if rebuild_derived {
            if let Err(err) = self.meta.rebuild_derived() {
                warn!(
                    collection = %self.collection,
                    error = %err,
                    "failed to rebuild derived metadata"
                );
            }
        }
        self.counter += 1;
        self.flush_live(ctx);
    }

    fn flush_live(&self, ctx: &CacheContext<'_>) {
        if !ctx.sink.is_open() {
            return;
        }
        ctx.sink.reload_resident();
        for kind in self.meta.materialized_tables() {
            if let Some(bytes) = self.meta.table_bytes(kind) {
                ctx.sink.install_table(kind, bytes);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::changed::ChangedItemValue;
    use crate::collection::{Collection, CollectionStore};
    use crate::error::{Error, Result};
    use byteorder::{ByteOrder, LittleEndian};
    use mantle_meta::tables::rsp::{SCALING_GRID_OFFSET, SCALING_ROW_COUNT, SCALING_ROW_SIZE};
    use mantle_meta::{
        EquipSlot, ImcEntry, ImcIdentifier, ImcManipulation, MemoryTableSource, MetaIdentifier,
        RspAttribute, RspIdentifier, RspManipulation, SubRace,
    };
    use mantle_mod::{ModData, ModRegistry, TempMod};
    use proptest::prelude::*;
    use std::cell::{Cell, RefCell};

    // One Imc set covers 10 slot columns times 32 variants of 6 bytes.
    const IMC_SET_BLOCK: usize = 1920;

    fn path(raw: &str) -> GamePath {
        GamePath::new(raw).unwrap()
    }

    fn rsp_snapshot(value: f32) -> Vec<u8> {
        let len = SCALING_GRID_OFFSET + SCALING_ROW_COUNT * SCALING_ROW_SIZE;
        let mut bytes = vec![0u8; len];
        let mut offset = SCALING_GRID_OFFSET;
        while offset + 4 <= len {
            LittleEndian::write_f32(&mut bytes[offset..offset + 4], value);
            offset += 4;
        }
        bytes
    }

    fn snapshots() -> Arc<MemoryTableSource> {
        Arc::new(MemoryTableSource::new().with_table(TableKind::Rsp, rsp_snapshot(1.0)))
    }

    fn enabled(priority: i32) -> ModSettings {
        ModSettings {
            enabled: true,
            priority,
            settings: Vec::new(),
        }
    }

    fn disabled() -> ModSettings {
        ModSettings {
            enabled: false,
            priority: 0,
            settings: Vec::new(),
        }
    }

    fn file_mod(name: &str, virtual_path: &str, source: &str) -> ModData {
        let mut default_option = OptionData::default();
        default_option
            .files
            .insert(path(virtual_path), SourcePath::from(source));
        ModData {
            name: name.to_string(),
            description: None,
            priority: 0,
            groups: Vec::new(),
            default_option,
        }
    }

    fn rsp_mod(name: &str, value: f32) -> ModData {
        let mut default_option = OptionData::default();
        default_option.manipulations.push(
            RspManipulation::new(
                RspIdentifier {
                    sub_race: SubRace::Midlander,
                    attribute: RspAttribute::Height,
                },
                value,
            )
            .into(),
        );
        ModData {
            name: name.to_string(),
            description: None,
            priority: 0,
            groups: Vec::new(),
            default_option,
        }
    }

    fn height_target() -> RspIdentifier {
        RspIdentifier {
            sub_race: SubRace::Midlander,
            attribute: RspAttribute::Height,
        }
    }

    struct Fixture {
        mods: ModRegistry,
        collections: CollectionStore,
    }

    impl Fixture {
        fn new() -> Self {
            let mut collections = CollectionStore::new();
            collections.insert(Collection::new("player"));
            Fixture {
                mods: ModRegistry::new(),
                collections,
            }
        }

        fn add_installed(&mut self, data: ModData, settings: Option<ModSettings>) -> ModId {
            let id = self.mods.push_installed(data);
            if let ModId::Installed(index) = id {
                self.collections
                    .get_mut("player")
                    .unwrap()
                    .set_settings(index, settings);
            }
            id
        }

        fn set_settings(&mut self, index: u16, settings: Option<ModSettings>) {
            self.collections
                .get_mut("player")
                .unwrap()
                .set_settings(index, settings);
        }
    }

    fn ctx<'a>(fixture: &'a Fixture, sink: &'a dyn LiveSink) -> CacheContext<'a> {
        CacheContext {
            mods: &fixture.mods,
            settings: &fixture.collections,
            sink,
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        open: Cell<bool>,
        installs: RefCell<Vec<TableKind>>,
        resident_reloads: Cell<u32>,
    }

    impl LiveSink for RecordingSink {
        fn is_open(&self) -> bool {
            self.open.get()
        }

        fn install_table(&self, kind: TableKind, _bytes: &[u8]) {
            self.installs.borrow_mut().push(kind);
        }

        fn reload_resident(&self) {
            self.resident_reloads.set(self.resident_reloads.get() + 1);
        }
    }

    #[derive(Default)]
    struct CountingNamer {
        calls: Cell<u32>,
        fail: Cell<bool>,
    }

    impl CountingNamer {
        fn name_of(subject: &str) -> String {
            subject.rsplit('/').next().unwrap_or(subject).to_string()
        }
    }

    impl ItemIdentifier for CountingNamer {
        fn identify_path(&self, path: &GamePath) -> Result<Vec<(String, ChangedItemValue)>> {
            self.calls.set(self.calls.get() + 1);
            if self.fail.get() {
                return Err(Error::identify(path.as_str(), "lookup failed"));
            }
            Ok(vec![(
                Self::name_of(path.as_str()),
                ChangedItemValue::Counter(1),
            )])
        }

        fn identify_manipulation(
            &self,
            identifier: &MetaIdentifier,
        ) -> Result<Vec<(String, ChangedItemValue)>> {
            self.calls.set(self.calls.get() + 1);
            if self.fail.get() {
                return Err(Error::identify(identifier.to_string(), "lookup failed"));
            }
            Ok(vec![(
                identifier.to_string(),
                ChangedItemValue::Counter(1),
            )])
        }
    }

    fn resolved_snapshot(cache: &CollectionCache) -> Vec<(String, String, ModId)> {
        let mut entries: Vec<_> = cache
            .resolved()
            .iter()
            .map(|(path, file)| {
                (
                    path.as_str().to_string(),
                    file.source.as_str().to_string(),
                    file.owner,
                )
            })
            .collect();
        entries.sort();
        entries
    }

    fn conflict_snapshot(cache: &CollectionCache) -> Vec<(ModId, ModId, Vec<String>, Option<ModId>)> {
        let mut records: Vec<_> = cache
            .all_conflicts()
            .map(|record| {
                let [x, y] = record.mods();
                let mut items: Vec<String> =
                    record.items().iter().map(ToString::to_string).collect();
                items.sort();
                (x.min(y), x.max(y), items, record.winner())
            })
            .collect();
        records.sort();
        records
    }

    #[test]
    fn test_higher_priority_mod_wins_path() {
        let mut fixture = Fixture::new();
        let a = fixture.add_installed(
            file_mod("A", "a/b.tex", "mods/a/b.tex"),
            Some(enabled(10)),
        );
        let b = fixture.add_installed(file_mod("B", "a/b.tex", "mods/b/b.tex"), Some(enabled(5)));

        let mut cache = CollectionCache::new("player", snapshots());
        cache.full_recompute(&ctx(&fixture, &ClosedSink));

        assert_eq!(cache.resolve("a/b.tex").unwrap().as_str(), "mods/a/b.tex");
        let records = cache.conflicts(a);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].winner(), Some(a));
        assert_eq!(records[0].items(), &[ConflictItem::File(path("a/b.tex"))]);

        // Disabling A hands the path to B and clears the conflict.
        fixture.set_settings(0, Some(disabled()));
        cache.on_change(
            &ctx(&fixture, &ClosedSink),
            SettingChange::EnableState {
                mod_index: 0,
                old: Some(true),
            },
        );

        assert_eq!(cache.resolve("a/b.tex").unwrap().as_str(), "mods/b/b.tex");
        assert!(cache.conflicts(a).is_empty());
        assert!(cache.conflicts(b).is_empty());
    }

    #[test]
    fn test_metadata_patches_layer_and_revert() {
        let mut fixture = Fixture::new();
        fixture.add_installed(rsp_mod("A", 1.05), Some(enabled(10)));
        fixture.add_installed(rsp_mod("B", 0.95), Some(enabled(5)));

        let mut cache = CollectionCache::new("player", snapshots());
        cache.full_recompute(&ctx(&fixture, &ClosedSink));
        assert_eq!(cache.meta().current_rsp(&height_target()), Some(1.05));

        fixture.set_settings(0, Some(disabled()));
        cache.on_change(
            &ctx(&fixture, &ClosedSink),
            SettingChange::EnableState {
                mod_index: 0,
                old: Some(true),
            },
        );
        assert_eq!(cache.meta().current_rsp(&height_target()), Some(0.95));

        fixture.set_settings(1, Some(disabled()));
        cache.on_change(
            &ctx(&fixture, &ClosedSink),
            SettingChange::EnableState {
                mod_index: 1,
                old: Some(true),
            },
        );
        // Back to the pristine snapshot value.
        assert_eq!(cache.meta().current_rsp(&height_target()), Some(1.0));
        assert_eq!(cache.meta().entry_count(), 0);
    }

    #[test]
    fn test_removing_winner_promotes_next_in_line() {
        let mut fixture = Fixture::new();
        let a = fixture.add_installed(file_mod("A", "a/b.tex", "mods/a.tex"), Some(enabled(30)));
        let b = fixture.add_installed(file_mod("B", "a/b.tex", "mods/b.tex"), Some(enabled(20)));
        let c = fixture.add_installed(file_mod("C", "a/b.tex", "mods/c.tex"), Some(enabled(10)));

        let mut cache = CollectionCache::new("player", snapshots());
        cache.full_recompute(&ctx(&fixture, &ClosedSink));
        assert_eq!(cache.resolve("a/b.tex").unwrap().as_str(), "mods/a.tex");

        let before = cache.change_counter();
        cache.remove_mod(&ctx(&fixture, &ClosedSink), a);

        // B beats C for the vacated path, and the whole cascade counts as
        // one logical event.
        assert_eq!(cache.resolve("a/b.tex").unwrap().as_str(), "mods/b.tex");
        assert_eq!(cache.change_counter(), before + 1);
        let records = cache.conflicts(c);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].other(c), b);
        assert_eq!(records[0].winner(), Some(b));
        assert!(cache.conflicts(a).is_empty());
    }

    #[test]
    fn test_reload_twice_matches_single_reload() {
        let mut fixture = Fixture::new();
        let mut a = file_mod("A", "a/b.tex", "mods/a.tex");
        a.default_option.manipulations.push(
            RspManipulation::new(height_target(), 1.05).into(),
        );
        fixture.add_installed(a, Some(enabled(10)));
        let mut b = file_mod("B", "a/b.tex", "mods/b.tex");
        b.default_option.manipulations.push(
            RspManipulation::new(height_target(), 0.95).into(),
        );
        let b = fixture.add_installed(b, Some(enabled(5)));
        fixture.add_installed(file_mod("C", "c/d.tex", "mods/c.tex"), Some(enabled(5)));

        let mut cache = CollectionCache::new("player", snapshots());
        cache.full_recompute(&ctx(&fixture, &ClosedSink));

        cache.reload_mod(&ctx(&fixture, &ClosedSink), b);
        let resolved_once = resolved_snapshot(&cache);
        let conflicts_once = conflict_snapshot(&cache);
        let rsp_once = cache.meta().current_rsp(&height_target());
        let counter_once = cache.change_counter();

        cache.reload_mod(&ctx(&fixture, &ClosedSink), b);
        assert_eq!(resolved_snapshot(&cache), resolved_once);
        assert_eq!(conflict_snapshot(&cache), conflicts_once);
        assert_eq!(cache.meta().current_rsp(&height_target()), rsp_once);
        assert_eq!(cache.change_counter(), counter_once + 1);
    }

    #[test]
    fn test_temporary_mods_bypass_settings() {
        let mut fixture = Fixture::new();
        // No settings at all for the installed mod; it stays out.
        fixture.add_installed(file_mod("A", "a/b.tex", "mods/a.tex"), None);

        let mut data = OptionData::default();
        data.files
            .insert(path("a/b.tex"), SourcePath::from("temp/global.tex"));
        fixture.mods.push_temporary_global(TempMod {
            name: "global".to_string(),
            priority: 1,
            data,
        });

        let mut data = OptionData::default();
        data.files
            .insert(path("a/b.tex"), SourcePath::from("temp/local.tex"));
        fixture.mods.push_temporary_local(
            "player",
            TempMod {
                name: "local".to_string(),
                priority: 5,
                data,
            },
        );

        let mut cache = CollectionCache::new("player", snapshots());
        cache.full_recompute(&ctx(&fixture, &ClosedSink));

        // The local temporary mod outranks the global one.
        assert_eq!(cache.resolve("a/b.tex").unwrap().as_str(), "temp/local.tex");
        let record = cache.conflicts(ModId::TemporaryGlobal(0));
        assert_eq!(record.len(), 1);
        assert_eq!(record[0].winner(), Some(ModId::TemporaryLocal(0)));
    }

    #[test]
    fn test_intra_mod_precedence_records_no_conflict() {
        use mantle_mod::{GroupKind, GroupOption, OptionGroup};

        let mut high = OptionData::default();
        high.files
            .insert(path("a/b.tex"), SourcePath::from("options/high.tex"));
        let mut low = OptionData::default();
        low.files
            .insert(path("a/b.tex"), SourcePath::from("options/low.tex"));
        let mut unset = OptionData::default();
        unset
            .files
            .insert(path("a/b.tex"), SourcePath::from("options/unset.tex"));

        let data = ModData {
            name: "Multi".to_string(),
            description: None,
            priority: 0,
            groups: vec![OptionGroup {
                name: "Parts".to_string(),
                kind: GroupKind::Multi,
                priority: 0,
                options: vec![
                    GroupOption {
                        name: "High".to_string(),
                        priority: 3,
                        data: high,
                    },
                    GroupOption {
                        name: "Unset".to_string(),
                        priority: 1,
                        data: unset,
                    },
                    GroupOption {
                        name: "Low".to_string(),
                        priority: 2,
                        data: low,
                    },
                ],
            }],
            default_option: OptionData::default(),
        };

        let mut fixture = Fixture::new();
        let settings = ModSettings {
            enabled: true,
            priority: 0,
            settings: vec![0b101],
        };
        fixture.add_installed(data, Some(settings));

        let mut cache = CollectionCache::new("player", snapshots());
        cache.full_recompute(&ctx(&fixture, &ClosedSink));

        // Option "High" (bit 0, priority 3) is emitted before "Low"
        // (bit 2, priority 2); the second same-mod offer is dropped
        // without a conflict record.
        assert_eq!(
            cache.resolve("a/b.tex").unwrap().as_str(),
            "options/high.tex"
        );
        assert_eq!(cache.all_conflicts().count(), 0);
    }

    #[test]
    fn test_priority_event_rebalances_conflicts() {
        let mut fixture = Fixture::new();
        let a = fixture.add_installed(file_mod("A", "a/b.tex", "mods/a.tex"), Some(enabled(10)));
        let b = fixture.add_installed(file_mod("B", "a/b.tex", "mods/b.tex"), Some(enabled(5)));

        let mut cache = CollectionCache::new("player", snapshots());
        cache.full_recompute(&ctx(&fixture, &ClosedSink));
        assert_eq!(cache.resolve("a/b.tex").unwrap().as_str(), "mods/a.tex");

        fixture.set_settings(1, Some(enabled(20)));
        cache.on_change(
            &ctx(&fixture, &ClosedSink),
            SettingChange::Priority {
                mod_index: 1,
                old: 5,
            },
        );

        assert_eq!(cache.resolve("a/b.tex").unwrap().as_str(), "mods/b.tex");
        let records = cache.conflicts(a);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].winner(), Some(b));
    }

    #[test]
    fn test_setting_event_reemits_options() {
        use mantle_mod::{GroupKind, GroupOption, OptionGroup};

        let mut gold = OptionData::default();
        gold.files
            .insert(path("a/b.tex"), SourcePath::from("options/gold.tex"));
        let mut silver = OptionData::default();
        silver
            .files
            .insert(path("a/b.tex"), SourcePath::from("options/silver.tex"));

        let data = ModData {
            name: "Single".to_string(),
            description: None,
            priority: 0,
            groups: vec![OptionGroup {
                name: "Finish".to_string(),
                kind: GroupKind::Single,
                priority: 0,
                options: vec![
                    GroupOption {
                        name: "Gold".to_string(),
                        priority: 0,
                        data: gold,
                    },
                    GroupOption {
                        name: "Silver".to_string(),
                        priority: 0,
                        data: silver,
                    },
                ],
            }],
            default_option: OptionData::default(),
        };

        let mut fixture = Fixture::new();
        fixture.add_installed(
            data,
            Some(ModSettings {
                enabled: true,
                priority: 0,
                settings: vec![0],
            }),
        );

        let mut cache = CollectionCache::new("player", snapshots());
        cache.full_recompute(&ctx(&fixture, &ClosedSink));
        assert_eq!(
            cache.resolve("a/b.tex").unwrap().as_str(),
            "options/gold.tex"
        );

        fixture.set_settings(
            0,
            Some(ModSettings {
                enabled: true,
                priority: 0,
                settings: vec![1],
            }),
        );
        cache.on_change(
            &ctx(&fixture, &ClosedSink),
            SettingChange::Setting {
                mod_index: 0,
                group_index: 0,
                old: 0,
            },
        );
        assert_eq!(
            cache.resolve("a/b.tex").unwrap().as_str(),
            "options/silver.tex"
        );
    }

    #[test]
    fn test_ambiguous_enable_state_follows_effective_value() {
        let mut fixture = Fixture::new();
        fixture.add_installed(file_mod("A", "a/b.tex", "mods/a.tex"), Some(enabled(1)));

        let mut cache = CollectionCache::new("player", snapshots());
        cache.full_recompute(&ctx(&fixture, &ClosedSink));
        let counter = cache.change_counter();

        cache.on_change(
            &ctx(&fixture, &ClosedSink),
            SettingChange::EnableState {
                mod_index: 0,
                old: None,
            },
        );
        assert!(cache.resolve("a/b.tex").is_some());
        assert_eq!(cache.change_counter(), counter + 1);

        fixture.set_settings(0, Some(disabled()));
        cache.on_change(
            &ctx(&fixture, &ClosedSink),
            SettingChange::EnableState {
                mod_index: 0,
                old: None,
            },
        );
        assert!(cache.resolve("a/b.tex").is_none());
        assert_eq!(cache.change_counter(), counter + 2);
    }

    #[test]
    fn test_silent_events_leave_counter_alone() {
        let mut fixture = Fixture::new();
        fixture.add_installed(file_mod("A", "a/b.tex", "mods/a.tex"), Some(enabled(1)));
        fixture.add_installed(file_mod("B", "c/d.tex", "mods/b.tex"), Some(disabled()));

        let mut cache = CollectionCache::new("player", snapshots());
        cache.full_recompute(&ctx(&fixture, &ClosedSink));
        let counter = cache.change_counter();

        // Priority change without any conflict: nothing to re-resolve.
        cache.on_change(
            &ctx(&fixture, &ClosedSink),
            SettingChange::Priority {
                mod_index: 0,
                old: 1,
            },
        );
        // Setting change on a disabled mod.
        cache.on_change(
            &ctx(&fixture, &ClosedSink),
            SettingChange::Setting {
                mod_index: 1,
                group_index: 0,
                old: 0,
            },
        );
        // Enable notification for a mod that is still disabled.
        cache.on_change(
            &ctx(&fixture, &ClosedSink),
            SettingChange::EnableState {
                mod_index: 1,
                old: Some(false),
            },
        );

        assert_eq!(cache.change_counter(), counter);
    }

    #[test]
    fn test_bulk_changes_recompute_everything() {
        let mut fixture = Fixture::new();
        fixture.add_installed(file_mod("A", "a/b.tex", "mods/a.tex"), Some(disabled()));
        fixture.add_installed(file_mod("B", "c/d.tex", "mods/b.tex"), Some(disabled()));

        let mut cache = CollectionCache::new("player", snapshots());
        cache.full_recompute(&ctx(&fixture, &ClosedSink));
        assert!(cache.resolve("a/b.tex").is_none());
        let counter = cache.change_counter();

        fixture.set_settings(0, Some(enabled(1)));
        fixture.set_settings(1, Some(enabled(1)));
        cache.on_change(&ctx(&fixture, &ClosedSink), SettingChange::MultiEnableState);

        assert!(cache.resolve("a/b.tex").is_some());
        assert!(cache.resolve("c/d.tex").is_some());
        assert_eq!(cache.change_counter(), counter + 1);
    }

    #[test]
    fn test_inheritance_change_triggers_full_rebuild() {
        let mut fixture = Fixture::new();
        fixture.mods.push_installed(file_mod("A", "a/b.tex", "mods/a.tex"));
        let mut base = Collection::new("base");
        base.set_settings(0, Some(enabled(1)));
        fixture.collections.insert(base);

        let mut cache = CollectionCache::new("player", snapshots());
        cache.full_recompute(&ctx(&fixture, &ClosedSink));
        // No settings reachable from "player" yet.
        assert!(cache.resolve("a/b.tex").is_none());

        fixture
            .collections
            .get_mut("player")
            .unwrap()
            .inherits
            .push("base".to_string());
        cache.on_change(&ctx(&fixture, &ClosedSink), SettingChange::Inheritance);

        assert_eq!(cache.resolve("a/b.tex").unwrap().as_str(), "mods/a.tex");
    }

    #[test]
    fn test_open_sink_receives_state_once_per_mutation() {
        let mut fixture = Fixture::new();
        fixture.add_installed(rsp_mod("A", 1.05), Some(enabled(1)));

        let sink = RecordingSink::default();
        sink.open.set(true);
        let mut cache = CollectionCache::new("player", snapshots());
        cache.full_recompute(&ctx(&fixture, &sink));

        assert_eq!(sink.resident_reloads.get(), 1);
        assert_eq!(sink.installs.borrow().as_slice(), &[TableKind::Rsp]);

        cache.notify_ready(&ctx(&fixture, &sink));
        assert_eq!(sink.resident_reloads.get(), 2);
        assert_eq!(cache.change_counter(), 2);
    }

    #[test]
    fn test_closed_sink_receives_nothing() {
        let mut fixture = Fixture::new();
        fixture.add_installed(rsp_mod("A", 1.05), Some(enabled(1)));

        let sink = RecordingSink::default();
        let mut cache = CollectionCache::new("player", snapshots());
        cache.full_recompute(&ctx(&fixture, &sink));

        assert_eq!(sink.resident_reloads.get(), 0);
        assert!(sink.installs.borrow().is_empty());
    }

    #[test]
    fn test_changed_items_rebuild_is_lazy() {
        let mut fixture = Fixture::new();
        fixture.add_installed(file_mod("A", "a/ring.mdl", "mods/a.mdl"), Some(enabled(1)));
        let b = fixture.add_installed(file_mod("B", "b/sword.mdl", "mods/b.mdl"), Some(enabled(1)));

        let mut cache = CollectionCache::new("player", snapshots());
        cache.full_recompute(&ctx(&fixture, &ClosedSink));

        let namer = CountingNamer::default();
        assert_eq!(cache.changed_items(&namer).len(), 2);
        let calls = namer.calls.get();
        assert!(calls > 0);

        // Same counter: served from the cached index.
        cache.changed_items(&namer);
        assert_eq!(namer.calls.get(), calls);

        cache.remove_mod(&ctx(&fixture, &ClosedSink), b);
        assert_eq!(cache.changed_items(&namer).len(), 1);
        assert!(namer.calls.get() > calls);
    }

    #[test]
    fn test_changed_items_keep_last_good_on_failure() {
        let mut fixture = Fixture::new();
        fixture.add_installed(file_mod("A", "a/ring.mdl", "mods/a.mdl"), Some(enabled(1)));
        let b = fixture.add_installed(file_mod("B", "b/sword.mdl", "mods/b.mdl"), Some(enabled(1)));

        let mut cache = CollectionCache::new("player", snapshots());
        cache.full_recompute(&ctx(&fixture, &ClosedSink));

        let namer = CountingNamer::default();
        assert_eq!(cache.changed_items(&namer).len(), 2);

        namer.fail.set(true);
        cache.remove_mod(&ctx(&fixture, &ClosedSink), b);
        // The failed rebuild leaves the previous index visible.
        assert_eq!(cache.changed_items(&namer).len(), 2);
        let calls = namer.calls.get();
        // And it is not retried until the counter advances again.
        cache.changed_items(&namer);
        assert_eq!(namer.calls.get(), calls);

        namer.fail.set(false);
        cache.add_mod(&ctx(&fixture, &ClosedSink), b);
        assert_eq!(cache.changed_items(&namer).len(), 2);
    }

    #[test]
    fn test_changed_items_exclude_variant_metadata() {
        let mut data = OptionData::default();
        data.files
            .insert(path("chara/e0001/model.mdl"), SourcePath::from("files/model.mdl"));
        data.files
            .insert(path("chara/e0001/set.imc"), SourcePath::from("files/set.imc"));
        data.manipulations.push(
            ImcManipulation::new(
                ImcIdentifier {
                    primary_id: 0,
                    variant: 1,
                    slot: EquipSlot::Body,
                },
                ImcEntry {
                    material_id: 5,
                    ..ImcEntry::default()
                },
            )
            .into(),
        );

        let mut fixture = Fixture::new();
        fixture.mods.push_temporary_global(TempMod {
            name: "variant".to_string(),
            priority: 0,
            data,
        });

        let source = MemoryTableSource::new()
            .with_table(TableKind::Rsp, rsp_snapshot(1.0))
            .with_table(TableKind::Imc, vec![0u8; IMC_SET_BLOCK]);
        let mut cache = CollectionCache::new("player", Arc::new(source));
        cache.full_recompute(&ctx(&fixture, &ClosedSink));
        assert_eq!(cache.meta().entry_count(), 1);

        let namer = CountingNamer::default();
        let items = cache.changed_items(&namer);
        assert!(items.get("model.mdl").is_some());
        assert!(items.get("set.imc").is_none());
        assert_eq!(items.len(), 1);
    }

    proptest! {
        /// Whatever the claim order, each path must end up owned by its
        /// highest-priority claimant, first claimant winning ties.
        #[test]
        fn test_highest_priority_claimant_wins(
            mods in prop::collection::vec(
                (-10i32..10, prop::collection::vec(0usize..5, 1..4)),
                1..6,
            ),
        ) {
            let paths = ["p/0.tex", "p/1.tex", "p/2.tex", "p/3.tex", "p/4.tex"];
            let mut fixture = Fixture::new();
            for (index, (priority, claims)) in mods.iter().enumerate() {
                let mut data = OptionData::default();
                for path_index in claims {
                    data.files.insert(
                        path(paths[*path_index]),
                        SourcePath::from(format!("src/{index}/{path_index}.tex").as_str()),
                    );
                }
                fixture.mods.push_temporary_global(TempMod {
                    name: format!("t{index}"),
                    priority: *priority,
                    data,
                });
            }

            let mut cache = CollectionCache::new("player", snapshots());
            cache.full_recompute(&ctx(&fixture, &ClosedSink));

            for (path_index, path_name) in paths.iter().enumerate() {
                let claimants: Vec<(usize, i32)> = mods
                    .iter()
                    .enumerate()
                    .filter(|(_, (_, claims))| claims.contains(&path_index))
                    .map(|(mod_index, (priority, _))| (mod_index, *priority))
                    .collect();
                match claimants.iter().map(|(_, priority)| *priority).max() {
                    None => prop_assert!(cache.resolve(path_name).is_none()),
                    Some(best) => {
                        let expected = claimants
                            .iter()
                            .find(|(_, priority)| *priority == best)
                            .map(|(mod_index, _)| *mod_index)
                            .unwrap();
                        let owner = cache.resolved().owner(&path(path_name)).unwrap();
                        prop_assert_eq!(owner, ModId::TemporaryGlobal(expected as u16));
                    }
                }
            }
        }
    }
}
