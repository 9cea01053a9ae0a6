use serde::{Deserialize, Serialize};

/// A competing team (house). Participants reference it by id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    pub id: String,
    pub name: String,
}
