//! Leaderboard and insight payloads produced by the points engine.

use serde::{Deserialize, Serialize};

use crate::models::PerformanceType;

/// Rank/grade point split, tracked at every aggregation level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointsBreakdown {
    pub rank_points: u32,
    pub grade_points: u32,
}

impl PointsBreakdown {
    pub fn total(&self) -> u32 {
        self.rank_points + self.grade_points
    }

    pub fn add(&mut self, other: PointsBreakdown) {
        self.rank_points += other.rank_points;
        self.grade_points += other.grade_points;
    }
}

/// One frozen winner row priced against current configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContributionRow {
    pub participant_id: String,
    pub team_id: String,
    pub category_id: String,
    pub item_id: String,
    pub position: u32,
    pub mark: f64,
    pub grade_id: Option<String>,
    pub points: PointsBreakdown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemContribution {
    pub item_id: String,
    pub points: PointsBreakdown,
    pub rows: Vec<ContributionRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryContribution {
    pub category_id: String,
    pub points: PointsBreakdown,
    pub items: Vec<ItemContribution>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamStanding {
    pub team_id: String,
    pub team_name: String,
    pub points: PointsBreakdown,
    pub categories: Vec<CategoryContribution>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopperRow {
    pub participant_id: String,
    pub participant_name: String,
    pub team_id: String,
    pub category_id: String,
    pub points: PointsBreakdown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticipantInsight {
    pub participant_id: String,
    pub rows: Vec<ContributionRow>,
    pub total: PointsBreakdown,
}

/// Event-wide declared counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalSummary {
    pub declared_items: u32,
    pub contributing_participants: u32,
    pub winner_rows: u32,
}

/// Optional restrictions for the toppers query.
#[derive(Debug, Clone, Default)]
pub struct TopperFilter {
    pub performance_type: Option<PerformanceType>,
    pub category_id: Option<String>,
}
