use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// An individual entrant. Group membership and leadership are tracked per
/// item on the participant record; the group resolver folds these into
/// first-class entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Participant {
    pub id: String,
    pub name: String,
    pub team_id: String,
    pub category_id: String,
    pub chest_number: String,
    /// Item ids this participant is enrolled in.
    #[serde(default)]
    pub item_ids: BTreeSet<String>,
    /// Group items: group index within the team. Defaults to 1 when absent.
    #[serde(default)]
    pub item_groups: BTreeMap<String, u32>,
    /// Group items this participant leads.
    #[serde(default)]
    pub group_leader_item_ids: BTreeSet<String>,
    /// Leader-only external chest number per group item.
    #[serde(default)]
    pub group_chest_numbers: BTreeMap<String, String>,
}

impl Participant {
    pub fn is_enrolled(&self, item_id: &str) -> bool {
        self.item_ids.contains(item_id)
    }

    pub fn group_index(&self, item_id: &str) -> u32 {
        self.item_groups.get(item_id).copied().unwrap_or(1)
    }

    pub fn leads(&self, item_id: &str) -> bool {
        self.group_leader_item_ids.contains(item_id)
    }
}
