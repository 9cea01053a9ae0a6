use serde::{Deserialize, Serialize};

use super::item::ItemType;

/// Percentage-band classification (e.g. A/B/C) carrying its own point value,
/// independent of winning position.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Grade {
    pub id: String,
    pub name: String,
    /// Inclusive lower bound of the mark band, in percent.
    pub lower_limit: f64,
    /// Inclusive upper bound of the mark band, in percent.
    pub upper_limit: f64,
    pub points: u32,
}

impl Grade {
    pub fn contains(&self, mark: f64) -> bool {
        mark >= self.lower_limit && mark <= self.upper_limit
    }
}

/// Grade tables configured per item type. Tables are unordered; resolution
/// takes the first grade whose band contains the mark.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GradeTables {
    #[serde(default)]
    pub single: Vec<Grade>,
    #[serde(default)]
    pub group: Vec<Grade>,
}

impl GradeTables {
    pub fn table_for(&self, item_type: ItemType) -> &[Grade] {
        match item_type {
            ItemType::Single => &self.single,
            ItemType::Group => &self.group,
        }
    }

    /// First grade in the item-type table whose band contains the mark.
    pub fn resolve(&self, item_type: ItemType, mark: f64) -> Option<&Grade> {
        self.table_for(item_type).iter().find(|g| g.contains(mark))
    }

    pub fn find(&self, item_type: ItemType, grade_id: &str) -> Option<&Grade> {
        self.table_for(item_type).iter().find(|g| g.id == grade_id)
    }
}
