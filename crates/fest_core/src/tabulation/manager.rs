//! Mark storage and the declare/purge state machine.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ranking::{resolve_standings, Standing};
use crate::enrollment::{
    leadership_cardinality, resolve_entries, validate_group_shape, GroupViolation,
    LeadershipCardinality,
};
use crate::error::{CoreError, Result};
use crate::models::{Item, ItemResult, ResultStatus, TabulationEntry, Winner};
use crate::snapshot::EventSnapshot;

/// Tabulation state for save/load.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TabulationState {
    /// Keyed by the deterministic (item, entry) id.
    pub entries: BTreeMap<String, TabulationEntry>,
    /// Keyed by item id.
    pub results: BTreeMap<String, ItemResult>,
}

/// Core scoring system: judge marks in, declared results out.
///
/// Per item the result status runs NotUploaded -> Uploaded -> Declared, and
/// back to NotUploaded only through the destructive purge. Marks and codes
/// are editable while the status is anything but Declared.
pub struct TabulationManager {
    state: TabulationState,
}

impl Default for TabulationManager {
    fn default() -> Self {
        Self::new()
    }
}

impl TabulationManager {
    pub fn new() -> Self {
        Self { state: TabulationState::default() }
    }

    /// Load from persisted state.
    pub fn from_state(state: TabulationState) -> Self {
        Self { state }
    }

    /// Current state for saving.
    pub fn state(&self) -> &TabulationState {
        &self.state
    }

    /// Result status of an item; items never scored are NotUploaded.
    pub fn status(&self, item_id: &str) -> ResultStatus {
        self.state.results.get(item_id).map(|r| r.status).unwrap_or_default()
    }

    pub fn result(&self, item_id: &str) -> Option<&ItemResult> {
        self.state.results.get(item_id)
    }

    pub fn results(&self) -> &BTreeMap<String, ItemResult> {
        &self.state.results
    }

    /// Tabulation entries of one item, ascending by entry key.
    pub fn entries_for_item(&self, item_id: &str) -> Vec<&TabulationEntry> {
        self.state.entries.values().filter(|e| e.item_id == item_id).collect()
    }

    pub fn entry(&self, item_id: &str, entry_key: &str) -> Option<&TabulationEntry> {
        self.state.entries.get(&TabulationEntry::entry_id(item_id, entry_key))
    }

    /// Upserts the entry and stores its anonymization code. Used by the lot
    /// manager at commit time; state guards live there.
    pub(crate) fn assign_code(&mut self, item_id: &str, entry_key: &str, code: char) {
        let entry = self
            .state
            .entries
            .entry(TabulationEntry::entry_id(item_id, entry_key))
            .or_insert_with(|| TabulationEntry::new(item_id, entry_key));
        entry.code_letter = Some(code);
    }

    /// Records one judge's marks for an item. Marks stay editable until the
    /// item is declared; the first recorded marks move it to Uploaded.
    pub fn save_marks(
        &mut self,
        snapshot: &EventSnapshot,
        item_id: &str,
        judge_id: &str,
        marks: &[(String, Option<f64>)],
    ) -> Result<()> {
        let item = snapshot.item(item_id)?;
        snapshot.judge(judge_id)?;

        if self.status(item_id) == ResultStatus::Declared {
            return Err(CoreError::InvalidState(format!(
                "item {} is declared; marks are frozen",
                item_id
            )));
        }
        for (_, mark) in marks {
            if let Some(value) = mark {
                if !(0.0..=100.0).contains(value) {
                    return Err(CoreError::MarkOutOfRange {
                        judge_id: judge_id.to_string(),
                        value: *value,
                    });
                }
            }
        }

        // Marks may only target entries that exist for this item.
        let valid_keys: BTreeSet<String> =
            resolve_entries(item, snapshot)?.iter().map(|e| e.key()).collect();
        for (entry_key, _) in marks {
            if !valid_keys.contains(entry_key) {
                return Err(CoreError::NotFound(format!(
                    "entry {} is not enrolled in item {}",
                    entry_key, item_id
                )));
            }
        }

        for (entry_key, mark) in marks {
            let entry = self
                .state
                .entries
                .entry(TabulationEntry::entry_id(item_id, entry_key))
                .or_insert_with(|| TabulationEntry::new(item_id, entry_key));
            entry.marks.insert(judge_id.to_string(), *mark);
        }

        let result = self.result_record_mut(item);
        if result.status == ResultStatus::NotUploaded {
            result.status = ResultStatus::Uploaded;
        }
        log::debug!("stored {} marks from judge {} on item {}", marks.len(), judge_id, item_id);
        Ok(())
    }

    fn result_record_mut(&mut self, item: &Item) -> &mut ItemResult {
        self.state.results.entry(item.id.clone()).or_insert_with(|| ItemResult {
            item_id: item.id.clone(),
            category_id: item.category_id.clone(),
            status: ResultStatus::NotUploaded,
            winners: Vec::new(),
            declared_at: None,
        })
    }

    /// Standings over the full entry set of one item, from current marks.
    /// Entries without any recorded marks score 0.
    pub fn compute_standings(
        &self,
        snapshot: &EventSnapshot,
        item_id: &str,
    ) -> Result<Vec<Standing>> {
        let item = snapshot.item(item_id)?;
        let entries = resolve_entries(item, snapshot)?;
        let marked: Vec<(String, f64)> = entries
            .iter()
            .map(|entry| {
                let key = entry.key();
                let mean = self.entry(item_id, &key).map(|e| e.mean_mark()).unwrap_or(0.0);
                (key, mean)
            })
            .collect();
        Ok(resolve_standings(item, &marked, &snapshot.grades))
    }

    /// Computes current standings and stores the derived mark, position and
    /// grade on each tabulation entry. Rejected once declared.
    pub fn resolve_item(
        &mut self,
        snapshot: &EventSnapshot,
        item_id: &str,
    ) -> Result<Vec<Standing>> {
        if self.status(item_id) == ResultStatus::Declared {
            return Err(CoreError::InvalidState(format!(
                "item {} is declared; standings are frozen",
                item_id
            )));
        }
        let standings = self.compute_standings(snapshot, item_id)?;
        self.store_standings(item_id, &standings);
        Ok(standings)
    }

    fn store_standings(&mut self, item_id: &str, standings: &[Standing]) {
        for standing in standings {
            let entry = self
                .state
                .entries
                .entry(TabulationEntry::entry_id(item_id, &standing.entry_key))
                .or_insert_with(|| TabulationEntry::new(item_id, &standing.entry_key));
            entry.final_mark = Some(standing.final_mark);
            entry.position = Some(standing.position);
            entry.grade_id = standing.grade_id.clone();
        }
    }

    /// Freezes the current winners into an immutable result.
    ///
    /// Winner rows carry participant id, position, mark and grade. Point
    /// values are deliberately not stored: aggregation re-derives them from
    /// live configuration, so later point-table edits change totals while
    /// the declared outcome itself stays fixed. Group entries are credited
    /// to their leader.
    pub fn declare(
        &mut self,
        snapshot: &EventSnapshot,
        item_id: &str,
        declared_at: DateTime<Utc>,
    ) -> Result<&ItemResult> {
        let item = snapshot.item(item_id)?;
        match self.status(item_id) {
            ResultStatus::Declared => {
                return Err(CoreError::InvalidState(format!(
                    "item {} is already declared",
                    item_id
                )));
            }
            ResultStatus::NotUploaded => {
                return Err(CoreError::InvalidState(format!(
                    "item {} has no uploaded marks to declare",
                    item_id
                )));
            }
            ResultStatus::Uploaded => {}
        }

        let entries = resolve_entries(item, snapshot)?;
        let standings = self.compute_standings(snapshot, item_id)?;
        self.store_standings(item_id, &standings);

        let mut winners: Vec<Winner> = standings
            .iter()
            .zip(&entries)
            .filter(|(standing, _)| standing.position > 0)
            .map(|(standing, entry)| Winner {
                participant_id: entry.leader_id().to_string(),
                position: standing.position,
                mark: standing.final_mark,
                grade_id: standing.grade_id.clone(),
            })
            .collect();
        winners.sort_by(|a, b| {
            a.position.cmp(&b.position).then_with(|| a.participant_id.cmp(&b.participant_id))
        });

        let winner_count = winners.len();
        let result = self.result_record_mut(item);
        result.status = ResultStatus::Declared;
        result.winners = winners;
        result.declared_at = Some(declared_at);
        log::info!("declared item {} with {} winners", item_id, winner_count);
        Ok(result)
    }

    /// Destructive reset: the result goes back to NotUploaded and every
    /// tabulation entry of the item is deleted. Unconditional once invoked;
    /// returns the number of entries removed.
    pub fn purge(&mut self, item_id: &str) -> u32 {
        let before = self.state.entries.len();
        self.state.entries.retain(|_, entry| entry.item_id != item_id);
        let removed = (before - self.state.entries.len()) as u32;

        if let Some(result) = self.state.results.get_mut(item_id) {
            result.status = ResultStatus::NotUploaded;
            result.winners.clear();
            result.declared_at = None;
        }
        log::warn!("purged item {}: {} tabulation entries deleted", item_id, removed);
        removed
    }

    /// Per-judge mark submission progress for one item.
    pub fn mark_progress(
        &self,
        snapshot: &EventSnapshot,
        item_id: &str,
    ) -> Result<Vec<JudgeProgress>> {
        let item = snapshot.item(item_id)?;
        let entries = resolve_entries(item, snapshot)?;
        let expected = entries.len() as u32;

        Ok(snapshot
            .judges_for_item(item_id)
            .into_iter()
            .map(|judge_id| {
                let submitted = entries
                    .iter()
                    .filter(|entry| {
                        self.entry(item_id, &entry.key())
                            .and_then(|e| e.marks.get(judge_id).copied().flatten())
                            .is_some()
                    })
                    .count() as u32;
                JudgeProgress { judge_id: judge_id.to_string(), submitted, expected }
            })
            .collect())
    }

    /// Everything a caller needs to decide whether an item may be declared.
    pub fn declaration_readiness(
        &self,
        snapshot: &EventSnapshot,
        item_id: &str,
    ) -> Result<ReadinessReport> {
        let item = snapshot.item(item_id)?;
        let entries = resolve_entries(item, snapshot)?;

        let mut leadership_issues = Vec::new();
        for entry in &entries {
            let cardinality = leadership_cardinality(entry, snapshot)?;
            if !cardinality.is_valid() {
                leadership_issues.push((entry.key(), cardinality));
            }
        }

        Ok(ReadinessReport {
            item_id: item_id.to_string(),
            group_violations: validate_group_shape(item, &entries),
            leadership_issues,
            judge_progress: self.mark_progress(snapshot, item_id)?,
        })
    }
}

/// Per-judge mark submission progress for one item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JudgeProgress {
    pub judge_id: String,
    pub submitted: u32,
    pub expected: u32,
}

impl JudgeProgress {
    pub fn is_complete(&self) -> bool {
        self.submitted >= self.expected
    }
}

/// Declaration gate: group shape, leadership and mark completeness combined.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadinessReport {
    pub item_id: String,
    pub group_violations: Vec<GroupViolation>,
    /// Entries whose leadership is not exactly one marked leader.
    pub leadership_issues: Vec<(String, LeadershipCardinality)>,
    pub judge_progress: Vec<JudgeProgress>,
}

impl ReadinessReport {
    pub fn is_ready(&self) -> bool {
        self.group_violations.is_empty()
            && self.leadership_issues.is_empty()
            && !self.judge_progress.is_empty()
            && self.judge_progress.iter().all(|j| j.is_complete())
    }
}
