//! One consistent in-memory view of the event's configuration.
//!
//! The snapshot is supplied by an external persistence collaborator; every
//! engine operation reads from it, so re-running an operation against the
//! same snapshot yields identical output. Collections are keyed in ordered
//! maps so iteration order never depends on insertion or hashing.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::models::{
    Category, CodeLetter, GradeTables, Item, Judge, JudgeAssignment, Participant, Settings, Team,
};

/// Registry used when the snapshot carries no code letters of its own.
pub static DEFAULT_CODE_REGISTRY: Lazy<Vec<char>> = Lazy::new(|| ('A'..='Z').collect());

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventSnapshot {
    #[serde(default)]
    pub teams: BTreeMap<String, Team>,
    #[serde(default)]
    pub categories: BTreeMap<String, Category>,
    #[serde(default)]
    pub items: BTreeMap<String, Item>,
    #[serde(default)]
    pub participants: BTreeMap<String, Participant>,
    #[serde(default)]
    pub grades: GradeTables,
    #[serde(default)]
    pub code_letters: Vec<CodeLetter>,
    #[serde(default)]
    pub judges: BTreeMap<String, Judge>,
    #[serde(default)]
    pub judge_assignments: Vec<JudgeAssignment>,
    #[serde(default)]
    pub settings: Settings,
}

impl EventSnapshot {
    pub fn team(&self, id: &str) -> Result<&Team> {
        self.teams.get(id).ok_or_else(|| CoreError::NotFound(format!("team {}", id)))
    }

    pub fn category(&self, id: &str) -> Result<&Category> {
        self.categories.get(id).ok_or_else(|| CoreError::NotFound(format!("category {}", id)))
    }

    pub fn item(&self, id: &str) -> Result<&Item> {
        self.items.get(id).ok_or_else(|| CoreError::NotFound(format!("item {}", id)))
    }

    pub fn participant(&self, id: &str) -> Result<&Participant> {
        self.participants.get(id).ok_or_else(|| CoreError::NotFound(format!("participant {}", id)))
    }

    pub fn judge(&self, id: &str) -> Result<&Judge> {
        self.judges.get(id).ok_or_else(|| CoreError::NotFound(format!("judge {}", id)))
    }

    /// Participants enrolled in an item, ascending by participant id.
    pub fn enrolled_participants(&self, item_id: &str) -> Vec<&Participant> {
        self.participants.values().filter(|p| p.is_enrolled(item_id)).collect()
    }

    /// Registry codes, ascending and deduplicated. Falls back to A-Z when
    /// the snapshot carries no registry.
    pub fn registry_codes(&self) -> Vec<char> {
        if self.code_letters.is_empty() {
            return DEFAULT_CODE_REGISTRY.clone();
        }
        let mut codes: Vec<char> = self.code_letters.iter().map(|c| c.code).collect();
        codes.sort_unstable();
        codes.dedup();
        codes
    }

    /// Judges assigned to an item, ascending by judge id.
    pub fn judges_for_item(&self, item_id: &str) -> Vec<&str> {
        let mut ids: Vec<&str> = self
            .judge_assignments
            .iter()
            .filter(|a| a.item_ids.contains(item_id))
            .map(|a| a.judge_id.as_str())
            .collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }
}
