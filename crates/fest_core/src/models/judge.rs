use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Judge {
    pub id: String,
    pub name: String,
}

/// Items a judge is assigned to mark.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JudgeAssignment {
    pub judge_id: String,
    #[serde(default)]
    pub item_ids: BTreeSet<String>,
}
