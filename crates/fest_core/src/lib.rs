//! # fest_core - Competition Scoring & Points Engine
//!
//! Deterministic core for a multi-category competitive arts event:
//! enrollment quota validation, group entry resolution, blind-judging lot
//! draws, mark tabulation with rank/grade resolution, and team/participant
//! leaderboards.
//!
//! ## Features
//! - Pure operations over one entity snapshot (same input = same output)
//! - Seedable, uniform lot draws (ChaCha8 + Fisher-Yates)
//! - Declared results freeze marks and positions; point values re-price
//!   from live configuration at aggregation time
//! - serde round-trip on every persistent structure

// Large enum variants - boxing would require API changes
#![allow(clippy::large_enum_variant)]

pub mod enrollment;
pub mod error;
pub mod lots;
pub mod models;
pub mod points;
pub mod snapshot;
pub mod tabulation;

// Re-export the engine surface
pub use enrollment::{
    leadership_cardinality, resolve_entries, validate_enrollment, validate_enrollment_batch,
    validate_group_shape, Entry, GroupViolation, LeadershipCardinality, QuotaViolation,
};
pub use error::{CoreError, Result};
pub use lots::LotManager;
pub use points::{
    CategoryContribution, ContributionRow, GlobalSummary, ItemContribution, ParticipantInsight,
    PointsBreakdown, PointsEngine, TeamStanding, TopperFilter, TopperRow,
};
pub use snapshot::{EventSnapshot, DEFAULT_CODE_REGISTRY};
pub use tabulation::{
    resolve_standings, JudgeProgress, ReadinessReport, Standing, TabulationManager,
    TabulationState,
};

// Re-export entity models
pub use models::{
    Category, CodeLetter, Grade, GradeTables, Item, ItemResult, ItemType, Judge, JudgeAssignment,
    Participant, PerformanceType, PrizePoints, ResultStatus, Settings, StageCaps, TabulationEntry,
    Team, Winner,
};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const SCHEMA_VERSION: u8 = 1;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn build_snapshot() -> EventSnapshot {
        let mut snapshot = EventSnapshot::default();

        for (id, name) in [("t1", "Red House"), ("t2", "Blue House")] {
            snapshot.teams.insert(id.to_string(), Team { id: id.to_string(), name: name.to_string() });
        }
        snapshot.categories.insert(
            "c1".to_string(),
            Category {
                id: "c1".to_string(),
                name: "Senior".to_string(),
                max_on_stage: Some(4),
                max_off_stage: Some(4),
                max_combined: None,
                is_general: false,
            },
        );
        snapshot.items.insert(
            "solo".to_string(),
            Item {
                id: "solo".to_string(),
                name: "Solo Song".to_string(),
                category_id: "c1".to_string(),
                item_type: ItemType::Single,
                performance_type: PerformanceType::OnStage,
                points: PrizePoints { first: 5, second: 3, third: 1 },
                grade_point_overrides: Default::default(),
                max_participants: 3,
                max_groups_per_team: None,
                duration_minutes: 6,
            },
        );
        snapshot.grades.single = vec![
            Grade {
                id: "a".to_string(),
                name: "A".to_string(),
                lower_limit: 80.0,
                upper_limit: 100.0,
                points: 5,
            },
            Grade {
                id: "b".to_string(),
                name: "B".to_string(),
                lower_limit: 60.0,
                upper_limit: 79.99,
                points: 3,
            },
        ];

        for (id, team) in [("p1", "t1"), ("p2", "t1"), ("p3", "t2")] {
            let mut participant = Participant {
                id: id.to_string(),
                name: format!("Participant {}", id),
                team_id: team.to_string(),
                category_id: "c1".to_string(),
                chest_number: format!("1{}", id),
                item_ids: Default::default(),
                item_groups: Default::default(),
                group_leader_item_ids: Default::default(),
                group_chest_numbers: Default::default(),
            };
            participant.item_ids.insert("solo".to_string());
            snapshot.participants.insert(id.to_string(), participant);
        }

        snapshot
            .judges
            .insert("j1".to_string(), Judge { id: "j1".to_string(), name: "Judge One".to_string() });
        let mut assignment =
            JudgeAssignment { judge_id: "j1".to_string(), item_ids: Default::default() };
        assignment.item_ids.insert("solo".to_string());
        snapshot.judge_assignments.push(assignment);

        snapshot
    }

    #[test]
    fn test_full_flow_from_enrollment_to_leaderboard() {
        let snapshot = build_snapshot();

        // Enrollment holds within quota.
        let participant = snapshot.participant("p1").unwrap();
        let verdict =
            validate_enrollment(participant, &participant.item_ids, &snapshot).unwrap();
        assert_eq!(verdict, None);

        // Anonymize the item's entries with a seeded draw.
        let item = snapshot.item("solo").unwrap();
        let entries = resolve_entries(item, &snapshot).unwrap();
        let mut lots = LotManager::from_snapshot(&snapshot);
        lots.select_entries(entries.iter().map(|e| e.key()).collect()).unwrap();
        lots.draw(2024).unwrap();

        let mut tabulation = TabulationManager::new();
        lots.commit("solo", &mut tabulation).unwrap();
        assert!(lots.conflict_set("solo", &tabulation).is_empty());

        // Judge marks, declare, aggregate.
        tabulation
            .save_marks(
                &snapshot,
                "solo",
                "j1",
                &[
                    ("p1".to_string(), Some(92.0)),
                    ("p2".to_string(), Some(75.0)),
                    ("p3".to_string(), Some(92.0)),
                ],
            )
            .unwrap();

        let declared_at = Utc.with_ymd_and_hms(2024, 11, 20, 17, 0, 0).unwrap();
        let result = tabulation.declare(&snapshot, "solo", declared_at).unwrap();
        // 92-92 tie shares first; 75 takes second.
        assert_eq!(result.winners.len(), 3);
        assert_eq!(result.winners[0].position, 1);
        assert_eq!(result.winners[1].position, 1);
        assert_eq!(result.winners[2].position, 2);

        let engine = PointsEngine::new(&snapshot, tabulation.results());
        let standings = engine.team_standings().unwrap();
        // t1: p1 first (5+5) + p2 second (3+3) = 16; t2: p3 first (5+5) = 10.
        assert_eq!(standings[0].team_id, "t1");
        assert_eq!(standings[0].points.total(), 16);
        assert_eq!(standings[1].team_id, "t2");
        assert_eq!(standings[1].points.total(), 10);

        // Re-running against the unchanged snapshot is idempotent.
        assert_eq!(engine.team_standings().unwrap(), standings);
    }
}
