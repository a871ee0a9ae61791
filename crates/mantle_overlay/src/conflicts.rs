//! Symmetric mod-to-mod conflict bookkeeping.
//!
//! Every contested pair of mods shares exactly one [`ConflictRecord`],
//! stored in an arena and referenced by [`ConflictId`] from both mods'
//! adjacency lists. The two views can therefore never drift apart: an
//! item struck from one side is gone from the other, and a record whose
//! item list empties out is garbage collected from both sides at once.

use mantle_meta::MetaIdentifier;
use mantle_mod::{GamePath, ModId};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// Index of a [`ConflictRecord`] in the graph's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConflictId(usize);

/// One contested claim: a virtual path or a metadata patch target.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ConflictItem {
    File(GamePath),
    Meta(MetaIdentifier),
}

impl fmt::Display for ConflictItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConflictItem::File(path) => write!(f, "file {path}"),
            ConflictItem::Meta(identifier) => write!(f, "meta {identifier}"),
        }
    }
}

/// The contested items between one unordered pair of mods.
#[derive(Debug, Clone)]
pub struct ConflictRecord {
    mods: [ModId; 2],
    items: Vec<ConflictItem>,
    holder: ModId,
    solved: bool,
}

impl ConflictRecord {
    /// Both mods party to the conflict.
    pub fn mods(&self) -> [ModId; 2] {
        self.mods
    }

    /// The opposing mod from `mod_id`'s point of view.
    pub fn other(&self, mod_id: ModId) -> ModId {
        if self.mods[0] == mod_id {
            self.mods[1]
        } else {
            self.mods[0]
        }
    }

    /// Contested paths and patch targets, in claim order.
    pub fn items(&self) -> &[ConflictItem] {
        &self.items
    }

    /// The mod whose claims currently stand. On a priority tie this is
    /// the first claimant, which keeps its items without the conflict
    /// counting as solved.
    pub fn holder(&self) -> ModId {
        self.holder
    }

    /// Whether priorities actually decided this conflict.
    pub fn solved(&self) -> bool {
        self.solved
    }

    /// The enforced winner, if any.
    pub fn winner(&self) -> Option<ModId> {
        self.solved.then_some(self.holder)
    }

    pub fn involves(&self, mod_id: ModId) -> bool {
        self.mods[0] == mod_id || self.mods[1] == mod_id
    }
}

/// Arena of live conflict records plus per-mod adjacency.
#[derive(Debug, Default)]
pub struct ConflictGraph {
    records: Vec<Option<ConflictRecord>>,
    free: Vec<usize>,
    adjacency: HashMap<ModId, Vec<ConflictId>>,
}

impl ConflictGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a contested claim of `item` by `new_mod` against the
    /// currently winning `incumbent`. Returns whether the new mod
    /// outranks the incumbent and should take the claim.
    ///
    /// When the incumbent is outranked, items it had previously defended
    /// against third mods are no longer settled: the same item is struck
    /// from those records and each affected third mod is queued to
    /// contest the new claimant directly. Every queue entry corresponds
    /// to one struck item occurrence, so the worklist is bounded by the
    /// total contested item count and the loop terminates.
    pub fn add_conflict(
        &mut self,
        item: ConflictItem,
        new_mod: ModId,
        incumbent: ModId,
        priorities: &HashMap<ModId, i32>,
    ) -> bool {
        let priority_of = |mod_id: ModId| priorities.get(&mod_id).copied().unwrap_or(0);
        let new_priority = priority_of(new_mod);
        let outranks = priority_of(incumbent) < new_priority;

        let mut worklist = vec![incumbent];
        while let Some(existing) = worklist.pop() {
            let existing_priority = priority_of(existing);
            if existing_priority < new_priority {
                self.strike_item(existing, &item, &mut worklist);
            }
            self.append_item(new_mod, existing, item.clone(), new_priority, existing_priority);
        }
        outranks
    }

    /// Removes `item` from every record of a mod that just lost it and
    /// queues the far side of each affected record for a direct contest.
    fn strike_item(&mut self, loser: ModId, item: &ConflictItem, worklist: &mut Vec<ModId>) {
        let Some(ids) = self.adjacency.get(&loser).cloned() else {
            return;
        };
        for id in ids {
            let Some(record) = self.records[id.0].as_mut() else {
                continue;
            };
            let other = record.other(loser);
            let count = record.items.len();
            record.items.retain(|contested| contested != item);
            if record.items.len() < count {
                worklist.push(other);
            }
            self.release_if_empty(id);
        }
    }

    /// Appends `item` to the record between the two mods, creating the
    /// record on first contact. Winner flags are fixed at creation; a
    /// later priority change reloads the mod and rebuilds its records.
    fn append_item(
        &mut self,
        new_mod: ModId,
        existing: ModId,
        item: ConflictItem,
        new_priority: i32,
        existing_priority: i32,
    ) {
        if let Some(id) = self.pair_record(new_mod, existing) {
            if let Some(record) = self.records[id.0].as_mut() {
                record.items.push(item);
            }
            return;
        }

        let record = ConflictRecord {
            mods: [new_mod, existing],
            items: vec![item],
            holder: if existing_priority < new_priority {
                new_mod
            } else {
                existing
            },
            solved: existing_priority != new_priority,
        };
        let id = self.alloc(record);
        self.adjacency.entry(new_mod).or_default().push(id);
        self.adjacency.entry(existing).or_default().push(id);
    }

    /// Strikes `mod_id` from the graph entirely. Returns, per opposing
    /// mod, whether the removed mod held the contested items; a former
    /// holder's opponent must be reloaded so its losing claims get
    /// re-resolved against whoever is next in line.
    pub fn remove_mod(&mut self, mod_id: ModId) -> Vec<(ModId, bool)> {
        let Some(ids) = self.adjacency.remove(&mod_id) else {
            return Vec::new();
        };
        let mut opponents = Vec::with_capacity(ids.len());
        for id in ids {
            let Some(record) = self.records[id.0].take() else {
                continue;
            };
            let other = record.other(mod_id);
            opponents.push((other, record.holder == mod_id));
            self.detach(other, id);
            self.free.push(id.0);
        }
        opponents
    }

    /// The records one mod participates in.
    pub fn conflicts(&self, mod_id: ModId) -> Vec<&ConflictRecord> {
        match self.adjacency.get(&mod_id) {
            Some(ids) => ids
                .iter()
                .filter_map(|id| self.records[id.0].as_ref())
                .collect(),
            None => Vec::new(),
        }
    }

    /// Every live record, visited once regardless of how many adjacency
    /// lists refer to it.
    pub fn all(&self) -> impl Iterator<Item = &ConflictRecord> {
        self.records.iter().filter_map(Option::as_ref)
    }

    /// Whether a mod is party to any conflict at all.
    pub fn involving(&self, mod_id: ModId) -> bool {
        self.adjacency.contains_key(&mod_id)
    }

    pub fn len(&self) -> usize {
        self.records.len() - self.free.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&mut self) {
        self.records.clear();
        self.free.clear();
        self.adjacency.clear();
    }

    fn alloc(&mut self, record: ConflictRecord) -> ConflictId {
        match self.free.pop() {
            Some(index) => {
                self.records[index] = Some(record);
                ConflictId(index)
            }
            None => {
                self.records.push(Some(record));
                ConflictId(self.records.len() - 1)
            }
        }
    }

    fn pair_record(&self, a: ModId, b: ModId) -> Option<ConflictId> {
        self.adjacency.get(&a)?.iter().copied().find(|id| {
            self.records[id.0]
                .as_ref()
                .is_some_and(|record| record.involves(b))
        })
    }

    fn detach(&mut self, mod_id: ModId, id: ConflictId) {
        if let Some(ids) = self.adjacency.get_mut(&mod_id) {
            ids.retain(|&known| known != id);
            if ids.is_empty() {
                self.adjacency.remove(&mod_id);
            }
        }
    }

    fn release_if_empty(&mut self, id: ConflictId) {
        let emptied = self.records[id.0]
            .as_ref()
            .is_some_and(|record| record.items.is_empty());
        if !emptied {
            return;
        }
        if let Some(record) = self.records[id.0].take() {
            self.detach(record.mods[0], id);
            self.detach(record.mods[1], id);
            self.free.push(id.0);
        }
    }
}
