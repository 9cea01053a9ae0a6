use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Registry entry for a single-character anonymization code. The registry is
/// global; a code is only required to be unique within one item's entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodeLetter {
    pub id: String,
    pub code: char,
}

/// Per-entry scoring record of one item. The id is the deterministic key of
/// (item, entry), so re-running a computation lands on the same record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TabulationEntry {
    pub id: String,
    pub item_id: String,
    pub entry_key: String,
    /// Raw mark per judge. A judge may be recorded with no mark yet.
    #[serde(default)]
    pub marks: BTreeMap<String, Option<f64>>,
    /// Anonymization code committed for blind judging.
    #[serde(default)]
    pub code_letter: Option<char>,
    /// Derived fields, filled when the item is resolved.
    #[serde(default)]
    pub final_mark: Option<f64>,
    #[serde(default)]
    pub position: Option<u32>,
    #[serde(default)]
    pub grade_id: Option<String>,
}

impl TabulationEntry {
    pub fn entry_id(item_id: &str, entry_key: &str) -> String {
        format!("{}::{}", item_id, entry_key)
    }

    pub fn new(item_id: &str, entry_key: &str) -> Self {
        Self {
            id: Self::entry_id(item_id, entry_key),
            item_id: item_id.to_string(),
            entry_key: entry_key.to_string(),
            marks: BTreeMap::new(),
            code_letter: None,
            final_mark: None,
            position: None,
            grade_id: None,
        }
    }

    /// Arithmetic mean of the recorded marks; 0.0 when none are recorded.
    pub fn mean_mark(&self) -> f64 {
        let recorded: Vec<f64> = self.marks.values().filter_map(|m| *m).collect();
        if recorded.is_empty() {
            0.0
        } else {
            recorded.iter().sum::<f64>() / recorded.len() as f64
        }
    }
}
