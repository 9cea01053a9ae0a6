pub mod aggregator;
pub mod types;

pub use aggregator::PointsEngine;
pub use types::{
    CategoryContribution, ContributionRow, GlobalSummary, ItemContribution, ParticipantInsight,
    PointsBreakdown, TeamStanding, TopperFilter, TopperRow,
};
