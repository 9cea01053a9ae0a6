//! Blind-judging anonymization.
//!
//! A global registry of single-character codes feeds a lot pool sized to the
//! current selection. Draws permute the pool uniformly over the selected
//! entries; commits write the drafted codes into the tabulation records once
//! no code repeats within the item.

use std::collections::{BTreeMap, BTreeSet};

use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::enrollment::resolve_entries;
use crate::error::{CoreError, Result};
use crate::models::ResultStatus;
use crate::snapshot::EventSnapshot;
use crate::tabulation::TabulationManager;

pub struct LotManager {
    registry: Vec<char>,
    pool: Vec<char>,
    selection: Vec<String>,
    drafts: BTreeMap<String, char>,
}

impl LotManager {
    /// Registry codes are kept sorted ascending and deduplicated.
    pub fn new(mut registry: Vec<char>) -> Self {
        registry.sort_unstable();
        registry.dedup();
        Self { registry, pool: Vec::new(), selection: Vec::new(), drafts: BTreeMap::new() }
    }

    pub fn from_snapshot(snapshot: &EventSnapshot) -> Self {
        Self::new(snapshot.registry_codes())
    }

    pub fn registry(&self) -> &[char] {
        &self.registry
    }

    pub fn pool(&self) -> &[char] {
        &self.pool
    }

    pub fn drafts(&self) -> &BTreeMap<String, char> {
        &self.drafts
    }

    /// Recomputes the pool for a new selection: the first N registry codes,
    /// ascending. A full recompute, not an incremental resize; drafts for
    /// entries outside the new selection are dropped.
    pub fn select_entries(&mut self, entry_keys: Vec<String>) -> Result<()> {
        if entry_keys.len() > self.registry.len() {
            return Err(CoreError::Validation(format!(
                "{} entries selected but the registry holds only {} codes",
                entry_keys.len(),
                self.registry.len()
            )));
        }
        self.pool = self.registry.iter().copied().take(entry_keys.len()).collect();
        self.drafts.retain(|key, _| entry_keys.contains(key));
        self.selection = entry_keys;
        Ok(())
    }

    /// Drafts a uniform random permutation of the pool over the selection.
    /// The pool must match the selection exactly; `select_entries` first.
    pub fn draw(&mut self, seed: u64) -> Result<()> {
        if self.pool.len() != self.selection.len() {
            return Err(CoreError::Validation(format!(
                "pool holds {} codes for {} selected entries",
                self.pool.len(),
                self.selection.len()
            )));
        }

        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(seed);
        let mut shuffled = self.pool.clone();
        shuffled.shuffle(&mut rng);

        for (entry_key, code) in self.selection.iter().zip(shuffled) {
            self.drafts.insert(entry_key.clone(), code);
        }
        Ok(())
    }

    /// Overwrites a single draft without touching the pool.
    pub fn manual_edit(&mut self, entry_key: &str, code: char) -> Result<()> {
        if !self.selection.iter().any(|key| key == entry_key) {
            return Err(CoreError::NotFound(format!(
                "entry {} is not part of the current selection",
                entry_key
            )));
        }
        if !self.registry.contains(&code) {
            return Err(CoreError::Validation(format!("code {} is not in the registry", code)));
        }
        self.drafts.insert(entry_key.to_string(), code);
        Ok(())
    }

    /// Entry keys whose draft code collides with another draft, or with a
    /// code already committed to a different entry of the same item. Codes
    /// only have to be unique within one item; reuse across items is fine.
    pub fn conflict_set(&self, item_id: &str, tabulation: &TabulationManager) -> BTreeSet<String> {
        // Committed codes of this item, minus entries whose committed code is
        // about to be replaced by a draft of their own.
        let committed: Vec<(&str, char)> = tabulation
            .entries_for_item(item_id)
            .into_iter()
            .filter(|entry| !self.drafts.contains_key(&entry.entry_key))
            .filter_map(|entry| entry.code_letter.map(|code| (entry.entry_key.as_str(), code)))
            .collect();

        let mut conflicts = BTreeSet::new();
        for (entry_key, code) in &self.drafts {
            let drafted_twice =
                self.drafts.iter().any(|(other, c)| other != entry_key && c == code);
            let committed_elsewhere =
                committed.iter().any(|(other, c)| *other != entry_key.as_str() && c == code);
            if drafted_twice || committed_elsewhere {
                conflicts.insert(entry_key.clone());
            }
        }
        conflicts
    }

    /// Writes every draft into its tabulation entry and retires the used
    /// codes from the pool. Refuses while the item is declared or any draft
    /// collides; returns the number of codes committed.
    pub fn commit(&mut self, item_id: &str, tabulation: &mut TabulationManager) -> Result<u32> {
        if tabulation.status(item_id) == ResultStatus::Declared {
            return Err(CoreError::InvalidState(format!(
                "item {} is declared; codes are frozen",
                item_id
            )));
        }
        let conflicts = self.conflict_set(item_id, tabulation);
        if !conflicts.is_empty() {
            return Err(CoreError::Conflict(format!(
                "duplicate codes drafted for item {}: {}",
                item_id,
                conflicts.into_iter().collect::<Vec<_>>().join(", ")
            )));
        }

        let mut committed = 0u32;
        for (entry_key, code) in std::mem::take(&mut self.drafts) {
            tabulation.assign_code(item_id, &entry_key, code);
            self.pool.retain(|c| *c != code);
            committed += 1;
        }
        log::info!("committed {} lot codes for item {}", committed, item_id);
        Ok(committed)
    }

    /// Assigns `registry[index % len]` to every entry of each item, in entry
    /// enumeration order. Does not guarantee per-item uniqueness when an item
    /// has more entries than the registry has codes; a drafted draw plus
    /// `commit` remains the uniqueness gate.
    pub fn bulk_auto_assign(
        &self,
        item_ids: &[String],
        snapshot: &EventSnapshot,
        tabulation: &mut TabulationManager,
    ) -> Result<u32> {
        if self.registry.is_empty() {
            return Err(CoreError::Validation("code registry is empty".to_string()));
        }
        for item_id in item_ids {
            snapshot.item(item_id)?;
            if tabulation.status(item_id) == ResultStatus::Declared {
                return Err(CoreError::InvalidState(format!(
                    "item {} is declared; codes are frozen",
                    item_id
                )));
            }
        }

        let mut assigned = 0u32;
        for item_id in item_ids {
            let item = snapshot.item(item_id)?;
            let entries = resolve_entries(item, snapshot)?;
            for (index, entry) in entries.iter().enumerate() {
                let code = self.registry[index % self.registry.len()];
                tabulation.assign_code(item_id, &entry.key(), code);
                assigned += 1;
            }
        }
        log::info!("bulk-assigned {} codes across {} items", assigned, item_ids.len());
        Ok(assigned)
    }
}
