use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::grade::Grade;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemType {
    Single,
    Group,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PerformanceType {
    OnStage,
    OffStage,
}

impl PerformanceType {
    pub fn label(&self) -> &'static str {
        match self {
            PerformanceType::OnStage => "on-stage",
            PerformanceType::OffStage => "off-stage",
        }
    }
}

/// Prize points per winning position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrizePoints {
    pub first: u32,
    pub second: u32,
    pub third: u32,
}

impl PrizePoints {
    /// Points paid at a position (1..=3); 0 for anything else.
    pub fn for_position(&self, position: u32) -> u32 {
        match position {
            1 => self.first,
            2 => self.second,
            3 => self.third,
            _ => 0,
        }
    }

    /// Positions whose prize pays more than zero. A zero-point tier is
    /// skipped entirely when ranks are resolved.
    pub fn paying_positions(&self) -> Vec<u32> {
        (1..=3).filter(|p| self.for_position(*p) > 0).collect()
    }
}

/// A judged event of the competition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    pub name: String,
    pub category_id: String,
    pub item_type: ItemType,
    pub performance_type: PerformanceType,
    pub points: PrizePoints,
    /// Per-item grade point overrides, keyed by grade id.
    #[serde(default)]
    pub grade_point_overrides: BTreeMap<String, u32>,
    /// Group items: maximum members per group. Single items: per-team entry cap.
    pub max_participants: u32,
    /// Group items only: maximum active groups per team.
    #[serde(default)]
    pub max_groups_per_team: Option<u32>,
    #[serde(default)]
    pub duration_minutes: u32,
}

impl Item {
    pub fn is_group(&self) -> bool {
        self.item_type == ItemType::Group
    }

    /// Grade points for this item: the per-item override when configured,
    /// the table value otherwise.
    pub fn grade_points_for(&self, grade: &Grade) -> u32 {
        self.grade_point_overrides.get(&grade.id).copied().unwrap_or(grade.points)
    }
}
