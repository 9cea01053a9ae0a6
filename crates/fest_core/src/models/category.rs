use serde::{Deserialize, Serialize};

/// Age/skill category of the event. Enrollment caps are optional; `None`
/// means the category imposes no limit of that kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub max_on_stage: Option<u32>,
    #[serde(default)]
    pub max_off_stage: Option<u32>,
    #[serde(default)]
    pub max_combined: Option<u32>,
    /// Items in a general category are open to participants of any category.
    #[serde(default)]
    pub is_general: bool,
}
