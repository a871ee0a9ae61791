//! The meta manipulation store: one sub-store per category plus the
//! aggregate dispatcher.
//!
//! Each sub-store owns a lazily-materialized table and a map from live
//! target to (applied value, owning mod). Last writer wins inside a store;
//! conflict arbitration between mods happens a layer above, before `apply`
//! is called. Reverting recomputes the category's default for the exact
//! target from the pristine snapshot.
//!
//! The owner type is generic: the store only needs to compare and copy it.

use crate::error::{Error, Result};
use crate::manipulation::{
    EqdpIdentifier, EqpIdentifier, EstIdentifier, GmpEntry, GmpIdentifier, ImcEntry,
    ImcIdentifier, MetaIdentifier, MetaManipulation, RspIdentifier,
};
use crate::snapshot::{DefaultTableSource, TableKind};
use crate::tables::eqdp::MATERIAL_BIT;
use crate::tables::{self, EqdpTable, EqpTable, EstTable, GmpTable, ImcTable, RspTable};
use crate::types::{CombinedRace, EquipSlot, EstSlot};
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;
use tracing::{debug, warn};

struct RspStore<O> {
    table: Option<RspTable>,
    entries: HashMap<RspIdentifier, (f32, O)>,
}

impl<O: Copy + Eq + Hash + Debug> RspStore<O> {
    fn new() -> Self {
        Self {
            table: None,
            entries: HashMap::new(),
        }
    }

    fn table_mut(&mut self, source: &dyn DefaultTableSource) -> Result<&mut RspTable> {
        if self.table.is_none() {
            let snapshot = source
                .table(TableKind::Rsp)
                .ok_or(Error::MissingSnapshot(TableKind::Rsp))?;
            self.table = Some(RspTable::new(snapshot)?);
        }
        self.table.as_mut().ok_or(Error::MissingSnapshot(TableKind::Rsp))
    }

    fn validate(&self, source: &dyn DefaultTableSource) -> Result<()> {
        if self.table.is_some() {
            return Ok(());
        }
        let snapshot = source
            .table(TableKind::Rsp)
            .ok_or(Error::MissingSnapshot(TableKind::Rsp))?;
        RspTable::validate_snapshot(&snapshot)
    }

    fn apply(
        &mut self,
        id: RspIdentifier,
        entry: f32,
        owner: O,
        source: &dyn DefaultTableSource,
    ) -> Result<bool> {
        self.entries.insert(id, (entry, owner));
        Ok(self.table_mut(source)?.set(id.sub_race, id.attribute, entry))
    }

    fn revert(&mut self, id: &RspIdentifier, owner: O) -> Result<bool> {
        match self.entries.get(id) {
            Some((_, current)) if *current == owner => {}
            _ => return Ok(false),
        }
        self.entries.remove(id);

        let Some(table) = self.table.as_mut() else {
            warn!(sub_race = %id.sub_race, "reverting a scaling entry without a materialized table");
            return Ok(false);
        };
        let default = table.default_value(id.sub_race, id.attribute);
        Ok(table.set(id.sub_race, id.attribute, default))
    }

    fn reset(&mut self) {
        if let Some(table) = self.table.as_mut() {
            table.reset();
        }
        self.entries.clear();
    }

    fn dispose(&mut self) {
        self.table = None;
        self.entries.clear();
    }
}

struct EqpStore<O> {
    table: Option<EqpTable>,
    entries: HashMap<EqpIdentifier, (u64, O)>,
}

impl<O: Copy + Eq + Hash + Debug> EqpStore<O> {
    fn new() -> Self {
        Self {
            table: None,
            entries: HashMap::new(),
        }
    }

    fn table_mut(&mut self, source: &dyn DefaultTableSource) -> Result<&mut EqpTable> {
        if self.table.is_none() {
            let snapshot = source
                .table(TableKind::Eqp)
                .ok_or(Error::MissingSnapshot(TableKind::Eqp))?;
            self.table = Some(EqpTable::new(snapshot)?);
        }
        self.table.as_mut().ok_or(Error::MissingSnapshot(TableKind::Eqp))
    }

    fn validate(&self, id: &EqpIdentifier, source: &dyn DefaultTableSource) -> Result<()> {
        if id.slot.eqp_byte_range().is_none() {
            return Err(Error::InvalidSlot {
                kind: TableKind::Eqp,
                slot: id.slot,
            });
        }
        if self.table.is_some() {
            return Ok(());
        }
        let snapshot = source
            .table(TableKind::Eqp)
            .ok_or(Error::MissingSnapshot(TableKind::Eqp))?;
        EqpTable::validate_snapshot(&snapshot)
    }

    fn apply(
        &mut self,
        id: EqpIdentifier,
        entry: u64,
        owner: O,
        source: &dyn DefaultTableSource,
    ) -> Result<bool> {
        self.entries.insert(id, (entry, owner));
        self.table_mut(source)?.set_slot(id.set_id, id.slot, entry)
    }

    fn revert(&mut self, id: &EqpIdentifier, owner: O) -> Result<bool> {
        match self.entries.get(id) {
            Some((_, current)) if *current == owner => {}
            _ => return Ok(false),
        }
        self.entries.remove(id);

        let Some(table) = self.table.as_mut() else {
            warn!(set = id.set_id, "reverting an equipment parameter without a materialized table");
            return Ok(false);
        };
        let default = table.default_row(id.set_id);
        table.set_slot(id.set_id, id.slot, default)
    }

    fn reset(&mut self) {
        if let Some(table) = self.table.as_mut() {
            table.reset();
        }
        self.entries.clear();
    }

    fn dispose(&mut self) {
        self.table = None;
        self.entries.clear();
    }
}

struct GmpStore<O> {
    table: Option<GmpTable>,
    entries: HashMap<GmpIdentifier, (GmpEntry, O)>,
}

impl<O: Copy + Eq + Hash + Debug> GmpStore<O> {
    fn new() -> Self {
        Self {
            table: None,
            entries: HashMap::new(),
        }
    }

    fn table_mut(&mut self, source: &dyn DefaultTableSource) -> Result<&mut GmpTable> {
        if self.table.is_none() {
            let snapshot = source
                .table(TableKind::Gmp)
                .ok_or(Error::MissingSnapshot(TableKind::Gmp))?;
            self.table = Some(GmpTable::new(snapshot)?);
        }
        self.table.as_mut().ok_or(Error::MissingSnapshot(TableKind::Gmp))
    }

    fn validate(&self, source: &dyn DefaultTableSource) -> Result<()> {
        if self.table.is_some() {
            return Ok(());
        }
        let snapshot = source
            .table(TableKind::Gmp)
            .ok_or(Error::MissingSnapshot(TableKind::Gmp))?;
        GmpTable::validate_snapshot(&snapshot)
    }

    fn apply(
        &mut self,
        id: GmpIdentifier,
        entry: GmpEntry,
        owner: O,
        source: &dyn DefaultTableSource,
    ) -> Result<bool> {
        self.entries.insert(id, (entry, owner));
        Ok(self.table_mut(source)?.set_row(id.set_id, entry))
    }

    fn revert(&mut self, id: &GmpIdentifier, owner: O) -> Result<bool> {
        match self.entries.get(id) {
            Some((_, current)) if *current == owner => {}
            _ => return Ok(false),
        }
        self.entries.remove(id);

        let Some(table) = self.table.as_mut() else {
            warn!(set = id.set_id, "reverting a gimmick parameter without a materialized table");
            return Ok(false);
        };
        let default = table.default_row(id.set_id);
        Ok(table.set_row(id.set_id, default))
    }

    fn reset(&mut self) {
        if let Some(table) = self.table.as_mut() {
            table.reset();
        }
        self.entries.clear();
    }

    fn dispose(&mut self) {
        self.table = None;
        self.entries.clear();
    }
}

struct EqdpStore<O> {
    tables: HashMap<TableKind, EqdpTable>,
    entries: HashMap<EqdpIdentifier, (u8, O)>,
}

impl<O: Copy + Eq + Hash + Debug> EqdpStore<O> {
    fn new() -> Self {
        Self {
            tables: HashMap::new(),
            entries: HashMap::new(),
        }
    }

    fn kind(id: &EqdpIdentifier) -> TableKind {
        TableKind::Eqdp {
            race: id.combined_race(),
            accessory: id.slot.is_accessory(),
        }
    }

    fn table_mut(&mut self, kind: TableKind, source: &dyn DefaultTableSource) -> Result<&mut EqdpTable> {
        if !self.tables.contains_key(&kind) {
            let snapshot = source.table(kind).ok_or(Error::MissingSnapshot(kind))?;
            self.tables.insert(kind, EqdpTable::new(kind, snapshot)?);
        }
        self.tables.get_mut(&kind).ok_or(Error::MissingSnapshot(kind))
    }

    fn validate(&self, id: &EqdpIdentifier, source: &dyn DefaultTableSource) -> Result<()> {
        let kind = Self::kind(id);
        if self.tables.contains_key(&kind) {
            return Ok(());
        }
        let snapshot = source.table(kind).ok_or(Error::MissingSnapshot(kind))?;
        EqdpTable::validate_snapshot(kind, &snapshot)
    }

    fn apply(
        &mut self,
        id: EqdpIdentifier,
        entry: u8,
        owner: O,
        source: &dyn DefaultTableSource,
    ) -> Result<bool> {
        self.entries.insert(id, (entry, owner));
        let table = self.table_mut(Self::kind(&id), source)?;
        Ok(table.set_bit_pair(id.set_id, id.slot, entry))
    }

    fn revert(&mut self, id: &EqdpIdentifier, owner: O) -> Result<bool> {
        match self.entries.get(id) {
            Some((_, current)) if *current == owner => {}
            _ => return Ok(false),
        }
        self.entries.remove(id);

        let Some(table) = self.tables.get_mut(&Self::kind(id)) else {
            warn!(set = id.set_id, "reverting a deformation entry without a materialized table");
            return Ok(false);
        };
        let default = table.default_row(id.set_id) >> id.slot.deform_bit_offset() & 0b11;
        Ok(table.set_bit_pair(id.set_id, id.slot, default as u8))
    }

    /// Whether any combined race currently has the material bit for
    /// `(set, slot)`, consulting live tables first and captured snapshots
    /// otherwise. `None` when no deformation data exists at all.
    fn material_anywhere(
        &self,
        source: &dyn DefaultTableSource,
        set: u16,
        slot: EquipSlot,
    ) -> Option<bool> {
        let accessory = slot.is_accessory();
        let mut any_info = false;

        for race in CombinedRace::ALL {
            let kind = TableKind::Eqdp { race, accessory };
            let pair = if let Some(table) = self.tables.get(&kind) {
                table.bit_pair(set, slot)
            } else if let Some(snapshot) = source.table(kind) {
                tables::eqdp::snapshot_bit_pair(&snapshot, set, slot)
            } else {
                continue;
            };

            any_info = true;
            if pair & MATERIAL_BIT != 0 {
                return Some(true);
            }
        }

        any_info.then_some(false)
    }

    fn reset(&mut self) {
        for table in self.tables.values_mut() {
            table.reset();
        }
        self.entries.clear();
    }

    fn dispose(&mut self) {
        self.tables.clear();
        self.entries.clear();
    }
}

struct EstStore<O> {
    tables: HashMap<EstSlot, EstTable>,
    entries: HashMap<EstIdentifier, (u16, O)>,
}

impl<O: Copy + Eq + Hash + Debug> EstStore<O> {
    fn new() -> Self {
        Self {
            tables: HashMap::new(),
            entries: HashMap::new(),
        }
    }

    fn table_mut(&mut self, slot: EstSlot, source: &dyn DefaultTableSource) -> Result<&mut EstTable> {
        let kind = TableKind::Est(slot);
        if !self.tables.contains_key(&slot) {
            let snapshot = source.table(kind).ok_or(Error::MissingSnapshot(kind))?;
            self.tables.insert(slot, EstTable::new(kind, snapshot)?);
        }
        self.tables.get_mut(&slot).ok_or(Error::MissingSnapshot(kind))
    }

    fn validate(&self, id: &EstIdentifier, source: &dyn DefaultTableSource) -> Result<()> {
        if self.tables.contains_key(&id.slot) {
            return Ok(());
        }
        let kind = TableKind::Est(id.slot);
        let snapshot = source.table(kind).ok_or(Error::MissingSnapshot(kind))?;
        EstTable::validate_snapshot(kind, &snapshot)
    }

    fn apply(
        &mut self,
        id: EstIdentifier,
        entry: u16,
        owner: O,
        source: &dyn DefaultTableSource,
    ) -> Result<bool> {
        self.entries.insert(id, (entry, owner));
        let race_code = id.combined_race().race_code();
        let table = self.table_mut(id.slot, source)?;
        Ok(table.set(race_code, id.set_id, entry))
    }

    fn revert(&mut self, id: &EstIdentifier, owner: O) -> Result<bool> {
        match self.entries.get(id) {
            Some((_, current)) if *current == owner => {}
            _ => return Ok(false),
        }
        self.entries.remove(id);

        let Some(table) = self.tables.get_mut(&id.slot) else {
            warn!(set = id.set_id, "reverting a skeleton entry without a materialized table");
            return Ok(false);
        };
        let race_code = id.combined_race().race_code();
        let default = table.default_value(race_code, id.set_id);
        Ok(table.set(race_code, id.set_id, default))
    }

    fn reset(&mut self) {
        for table in self.tables.values_mut() {
            table.reset();
        }
        self.entries.clear();
    }

    fn dispose(&mut self) {
        self.tables.clear();
        self.entries.clear();
    }
}

struct ImcStore<O> {
    table: Option<ImcTable>,
    entries: HashMap<ImcIdentifier, (ImcEntry, O)>,
}

impl<O: Copy + Eq + Hash + Debug> ImcStore<O> {
    fn new() -> Self {
        Self {
            table: None,
            entries: HashMap::new(),
        }
    }

    fn table_mut(&mut self, source: &dyn DefaultTableSource) -> Result<&mut ImcTable> {
        if self.table.is_none() {
            let snapshot = source
                .table(TableKind::Imc)
                .ok_or(Error::MissingSnapshot(TableKind::Imc))?;
            self.table = Some(ImcTable::new(snapshot)?);
        }
        self.table.as_mut().ok_or(Error::MissingSnapshot(TableKind::Imc))
    }

    fn validate(&self, id: &ImcIdentifier, source: &dyn DefaultTableSource) -> Result<()> {
        let snapshot_len = match &self.table {
            Some(table) => table.bytes().len(),
            None => {
                let snapshot = source
                    .table(TableKind::Imc)
                    .ok_or(Error::MissingSnapshot(TableKind::Imc))?;
                ImcTable::validate_snapshot(&snapshot)?;
                snapshot.len()
            }
        };
        tables::imc::validate_target(snapshot_len, id.primary_id, id.variant)
    }

    /// Apply an entry. `modeled` is the deformation-derived gate: when
    /// false the entry stays recorded but writes nothing this pass.
    fn apply(
        &mut self,
        id: ImcIdentifier,
        entry: ImcEntry,
        owner: O,
        modeled: bool,
        source: &dyn DefaultTableSource,
    ) -> Result<bool> {
        self.entries.insert(id, (entry, owner));
        if !modeled {
            return Ok(false);
        }
        self.table_mut(source)?
            .set_entry(id.primary_id, id.slot, id.variant, entry)
    }

    fn revert(&mut self, id: &ImcIdentifier, owner: O) -> Result<bool> {
        match self.entries.get(id) {
            Some((_, current)) if *current == owner => {}
            _ => return Ok(false),
        }
        self.entries.remove(id);

        let Some(table) = self.table.as_mut() else {
            return Ok(false);
        };
        let default = table.default_entry(id.primary_id, id.slot, id.variant)?;
        table.set_entry(id.primary_id, id.slot, id.variant, default)
    }

    /// Recompute the whole table: reset to the snapshot, then re-apply every
    /// live entry in identifier order, gated by current deformation data.
    fn rebuild(
        &mut self,
        eqdp: &EqdpStore<O>,
        source: &dyn DefaultTableSource,
    ) -> Result<()> {
        if self.entries.is_empty() && self.table.is_none() {
            return Ok(());
        }

        let mut live: Vec<(ImcIdentifier, ImcEntry)> = self
            .entries
            .iter()
            .map(|(id, (entry, _))| (*id, *entry))
            .collect();
        live.sort_by_key(|(id, _)| *id);

        let gates: Vec<bool> = live
            .iter()
            .map(|(id, _)| {
                eqdp.material_anywhere(source, id.primary_id, id.slot)
                    .unwrap_or(true)
            })
            .collect();

        let table = self.table_mut(source)?;
        table.reset();
        let mut written = 0usize;
        for ((id, entry), modeled) in live.into_iter().zip(gates) {
            if modeled {
                table.set_entry(id.primary_id, id.slot, id.variant, entry)?;
                written += 1;
            }
        }

        debug!(written, "rebuilt variant metadata from live entries");
        Ok(())
    }

    fn reset(&mut self) {
        if let Some(table) = self.table.as_mut() {
            table.reset();
        }
        self.entries.clear();
    }

    fn dispose(&mut self) {
        self.table = None;
        self.entries.clear();
    }
}

/// The aggregate manipulation store for one collection.
///
/// Dispatches on [`MetaManipulation`] to the per-category sub-stores. The
/// snapshot source is shared read-only across all collections; the stores
/// and their blobs are exclusive to this instance.
pub struct MetaStore<O> {
    snapshots: Arc<dyn DefaultTableSource>,
    rsp: RspStore<O>,
    eqp: EqpStore<O>,
    gmp: GmpStore<O>,
    eqdp: EqdpStore<O>,
    est: EstStore<O>,
    imc: ImcStore<O>,
}

impl<O: Copy + Eq + Hash + Debug> MetaStore<O> {
    pub fn new(snapshots: Arc<dyn DefaultTableSource>) -> Self {
        Self {
            snapshots,
            rsp: RspStore::new(),
            eqp: EqpStore::new(),
            gmp: GmpStore::new(),
            eqdp: EqdpStore::new(),
            est: EstStore::new(),
            imc: ImcStore::new(),
        }
    }

    /// Check that `manipulation` could be applied: its identifying fields
    /// are in range and the table it targets has a usable snapshot. Performs
    /// no mutation, so a batch can be validated completely before the first
    /// apply.
    pub fn validate(&self, manipulation: &MetaManipulation) -> Result<()> {
        let source = &*self.snapshots;
        match manipulation {
            MetaManipulation::Rsp(_) => self.rsp.validate(source),
            MetaManipulation::Eqp(m) => self.eqp.validate(&m.identifier, source),
            MetaManipulation::Gmp(_) => self.gmp.validate(source),
            MetaManipulation::Eqdp(m) => self.eqdp.validate(&m.identifier, source),
            MetaManipulation::Est(m) => self.est.validate(&m.identifier, source),
            MetaManipulation::Imc(m) => self.imc.validate(&m.identifier, source),
        }
    }

    /// Apply a manipulation on behalf of `owner`, materializing the backing
    /// table if needed. Returns whether stored bytes changed.
    pub fn apply(&mut self, manipulation: &MetaManipulation, owner: O) -> Result<bool> {
        match *manipulation {
            MetaManipulation::Rsp(m) => {
                self.rsp.apply(m.identifier, m.entry, owner, &*self.snapshots)
            }
            MetaManipulation::Eqp(m) => {
                self.eqp.apply(m.identifier, m.entry, owner, &*self.snapshots)
            }
            MetaManipulation::Gmp(m) => {
                self.gmp.apply(m.identifier, m.entry, owner, &*self.snapshots)
            }
            MetaManipulation::Eqdp(m) => {
                self.eqdp.apply(m.identifier, m.entry, owner, &*self.snapshots)
            }
            MetaManipulation::Est(m) => {
                self.est.apply(m.identifier, m.entry, owner, &*self.snapshots)
            }
            MetaManipulation::Imc(m) => {
                let modeled = self
                    .eqdp
                    .material_anywhere(&*self.snapshots, m.identifier.primary_id, m.identifier.slot)
                    .unwrap_or(true);
                self.imc
                    .apply(m.identifier, m.entry, owner, modeled, &*self.snapshots)
            }
        }
    }

    /// Revert a target if `owner` currently owns it, restoring the
    /// category-specific default derived from the pristine snapshot.
    pub fn revert(&mut self, identifier: &MetaIdentifier, owner: O) -> Result<bool> {
        match identifier {
            MetaIdentifier::Rsp(id) => self.rsp.revert(id, owner),
            MetaIdentifier::Eqp(id) => self.eqp.revert(id, owner),
            MetaIdentifier::Gmp(id) => self.gmp.revert(id, owner),
            MetaIdentifier::Eqdp(id) => self.eqdp.revert(id, owner),
            MetaIdentifier::Est(id) => self.est.revert(id, owner),
            MetaIdentifier::Imc(id) => self.imc.revert(id, owner),
        }
    }

    /// The mod currently owning a live target.
    pub fn owner(&self, identifier: &MetaIdentifier) -> Option<O> {
        match identifier {
            MetaIdentifier::Rsp(id) => self.rsp.entries.get(id).map(|(_, o)| *o),
            MetaIdentifier::Eqp(id) => self.eqp.entries.get(id).map(|(_, o)| *o),
            MetaIdentifier::Gmp(id) => self.gmp.entries.get(id).map(|(_, o)| *o),
            MetaIdentifier::Eqdp(id) => self.eqdp.entries.get(id).map(|(_, o)| *o),
            MetaIdentifier::Est(id) => self.est.entries.get(id).map(|(_, o)| *o),
            MetaIdentifier::Imc(id) => self.imc.entries.get(id).map(|(_, o)| *o),
        }
    }

    /// All live targets with their owners, in identifier order.
    pub fn identifiers(&self) -> Vec<(MetaIdentifier, O)> {
        let mut out: Vec<(MetaIdentifier, O)> = Vec::with_capacity(self.entry_count());
        out.extend(self.rsp.entries.iter().map(|(id, (_, o))| (MetaIdentifier::Rsp(*id), *o)));
        out.extend(self.eqp.entries.iter().map(|(id, (_, o))| (MetaIdentifier::Eqp(*id), *o)));
        out.extend(self.gmp.entries.iter().map(|(id, (_, o))| (MetaIdentifier::Gmp(*id), *o)));
        out.extend(self.eqdp.entries.iter().map(|(id, (_, o))| (MetaIdentifier::Eqdp(*id), *o)));
        out.extend(self.est.entries.iter().map(|(id, (_, o))| (MetaIdentifier::Est(*id), *o)));
        out.extend(self.imc.entries.iter().map(|(id, (_, o))| (MetaIdentifier::Imc(*id), *o)));
        out.sort_by_key(|(id, _)| *id);
        out
    }

    /// Live targets owned by `owner`, in identifier order.
    pub fn owned_identifiers(&self, owner: O) -> Vec<MetaIdentifier> {
        self.identifiers()
            .into_iter()
            .filter(|(_, o)| *o == owner)
            .map(|(id, _)| id)
            .collect()
    }

    pub fn entry_count(&self) -> usize {
        self.rsp.entries.len()
            + self.eqp.entries.len()
            + self.gmp.entries.len()
            + self.eqdp.entries.len()
            + self.est.entries.len()
            + self.imc.entries.len()
    }

    /// Recompute the derived variant metadata category from current
    /// deformation contents. Runs as a final pass, never per-entry.
    pub fn rebuild_derived(&mut self) -> Result<()> {
        self.imc.rebuild(&self.eqdp, &*self.snapshots)
    }

    /// Restore every category to defaults and clear all ownership records.
    pub fn reset(&mut self) {
        self.rsp.reset();
        self.eqp.reset();
        self.gmp.reset();
        self.eqdp.reset();
        self.est.reset();
        self.imc.reset();
    }

    /// Release all backing blobs.
    pub fn dispose(&mut self) {
        self.rsp.dispose();
        self.eqp.dispose();
        self.gmp.dispose();
        self.eqdp.dispose();
        self.est.dispose();
        self.imc.dispose();
    }

    /// Current bytes of a materialized table, for installation into live
    /// resource tables. `None` while the category is untouched.
    pub fn table_bytes(&self, kind: TableKind) -> Option<&[u8]> {
        match kind {
            TableKind::Rsp => self.rsp.table.as_ref().map(|t| t.bytes()),
            TableKind::Eqp => self.eqp.table.as_ref().map(|t| t.bytes()),
            TableKind::Gmp => self.gmp.table.as_ref().map(|t| t.bytes()),
            TableKind::Eqdp { .. } => self.eqdp.tables.get(&kind).map(|t| t.bytes()),
            TableKind::Est(slot) => self.est.tables.get(&slot).map(|t| t.bytes()),
            TableKind::Imc => self.imc.table.as_ref().map(|t| t.bytes()),
        }
    }

    /// Kinds of every materialized table.
    pub fn materialized_tables(&self) -> Vec<TableKind> {
        let mut kinds = Vec::new();
        if self.rsp.table.is_some() {
            kinds.push(TableKind::Rsp);
        }
        if self.eqp.table.is_some() {
            kinds.push(TableKind::Eqp);
        }
        if self.gmp.table.is_some() {
            kinds.push(TableKind::Gmp);
        }
        kinds.extend(self.eqdp.tables.values().map(|t| t.kind()));
        kinds.extend(self.est.tables.keys().map(|slot| TableKind::Est(*slot)));
        if self.imc.table.is_some() {
            kinds.push(TableKind::Imc);
        }
        kinds.sort();
        kinds
    }

    /// Read-only view of a target's current table value for inspection.
    pub fn current_rsp(&self, id: &RspIdentifier) -> Option<f32> {
        self.rsp.table.as_ref().map(|t| t.get(id.sub_race, id.attribute))
    }
}
