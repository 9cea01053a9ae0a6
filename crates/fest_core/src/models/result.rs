use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultStatus {
    #[default]
    NotUploaded,
    Uploaded,
    Declared,
}

/// One frozen winner row. Mark and position are fixed at declare time; point
/// values are re-derived from live configuration whenever points aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Winner {
    pub participant_id: String,
    pub position: u32,
    pub mark: f64,
    #[serde(default)]
    pub grade_id: Option<String>,
}

/// Scoring outcome of one item. Winners are immutable while the status is
/// Declared; only an explicit purge resets them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemResult {
    pub item_id: String,
    pub category_id: String,
    pub status: ResultStatus,
    #[serde(default)]
    pub winners: Vec<Winner>,
    #[serde(default)]
    pub declared_at: Option<DateTime<Utc>>,
}
