//! Enrollment quota validation.
//!
//! Admission control with layered caps: global total, global per performance
//! type, then per category. Checks run in a fixed order and categories are
//! visited ascending by id, so the reported violation is deterministic for a
//! given snapshot.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::{Participant, PerformanceType};
use crate::snapshot::EventSnapshot;

/// A failed quota check, returned as a value so callers can surface it
/// without unwinding. `None` from the validator means the set is admissible.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuotaViolation {
    GlobalTotal { cap: u32, count: u32 },
    GlobalStage { performance: PerformanceType, cap: u32, count: u32 },
    CategoryStage { category_id: String, performance: PerformanceType, cap: u32, count: u32 },
    CategoryCombined { category_id: String, cap: u32, count: u32 },
}

impl fmt::Display for QuotaViolation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            QuotaViolation::GlobalTotal { cap, count } => {
                write!(f, "total enrollment limit exceeded: {} items, limit {}", count, cap)
            }
            QuotaViolation::GlobalStage { performance, cap, count } => {
                write!(f, "{} limit exceeded: {} items, limit {}", performance.label(), count, cap)
            }
            QuotaViolation::CategoryStage { category_id, performance, cap, count } => {
                write!(
                    f,
                    "category {} {} limit exceeded: {} items, limit {}",
                    category_id,
                    performance.label(),
                    count,
                    cap
                )
            }
            QuotaViolation::CategoryCombined { category_id, cap, count } => {
                write!(
                    f,
                    "category {} combined limit exceeded: {} items, limit {}",
                    category_id, count, cap
                )
            }
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct StageCounts {
    on_stage: u32,
    off_stage: u32,
}

impl StageCounts {
    fn record(&mut self, performance: PerformanceType) {
        match performance {
            PerformanceType::OnStage => self.on_stage += 1,
            PerformanceType::OffStage => self.off_stage += 1,
        }
    }

    fn for_type(&self, performance: PerformanceType) -> u32 {
        match performance {
            PerformanceType::OnStage => self.on_stage,
            PerformanceType::OffStage => self.off_stage,
        }
    }

    fn total(&self) -> u32 {
        self.on_stage + self.off_stage
    }
}

/// Checks a participant's effective item set against global and per-category
/// quotas. The candidate set is the caller-merged result of any pending
/// additions and removals, which lets callers probe a batch before writing
/// anything. Pure; the first failing check wins.
pub fn validate_enrollment(
    participant: &Participant,
    candidate_item_ids: &BTreeSet<String>,
    snapshot: &EventSnapshot,
) -> Result<Option<QuotaViolation>> {
    let settings = &snapshot.settings;
    log::debug!(
        "quota check: participant {} with {} candidate items",
        participant.id,
        candidate_item_ids.len()
    );

    // 1. Global total cap.
    if let Some(cap) = settings.max_total_items_per_participant {
        let count = candidate_item_ids.len() as u32;
        if count > cap {
            return Ok(Some(QuotaViolation::GlobalTotal { cap, count }));
        }
    }

    // Resolve every candidate item once; unknown ids are a caller error.
    let mut global = StageCounts::default();
    let mut per_category: BTreeMap<&str, StageCounts> = BTreeMap::new();
    for item_id in candidate_item_ids {
        let item = snapshot.item(item_id)?;
        global.record(item.performance_type);
        per_category.entry(item.category_id.as_str()).or_default().record(item.performance_type);
    }

    // 2. Global per-stage caps, on-stage first.
    for performance in [PerformanceType::OnStage, PerformanceType::OffStage] {
        if let Some(cap) = settings.max_items_per_participant.cap_for(performance) {
            let count = global.for_type(performance);
            if count > cap {
                return Ok(Some(QuotaViolation::GlobalStage { performance, cap, count }));
            }
        }
    }

    // 3. Per-category caps, categories ascending by id.
    for (category_id, counts) in &per_category {
        let category = snapshot.category(category_id)?;
        if let Some(cap) = category.max_on_stage {
            if counts.on_stage > cap {
                return Ok(Some(QuotaViolation::CategoryStage {
                    category_id: category.id.clone(),
                    performance: PerformanceType::OnStage,
                    cap,
                    count: counts.on_stage,
                }));
            }
        }
        if let Some(cap) = category.max_off_stage {
            if counts.off_stage > cap {
                return Ok(Some(QuotaViolation::CategoryStage {
                    category_id: category.id.clone(),
                    performance: PerformanceType::OffStage,
                    cap,
                    count: counts.off_stage,
                }));
            }
        }
        if let Some(cap) = category.max_combined {
            if counts.total() > cap {
                return Ok(Some(QuotaViolation::CategoryCombined {
                    category_id: category.id.clone(),
                    cap,
                    count: counts.total(),
                }));
            }
        }
    }

    Ok(None)
}

/// Applies a pending add/remove batch to the participant's current set and
/// validates the merged result.
pub fn validate_enrollment_batch(
    participant: &Participant,
    added: &[String],
    removed: &[String],
    snapshot: &EventSnapshot,
) -> Result<Option<QuotaViolation>> {
    let mut candidate = participant.item_ids.clone();
    for item_id in added {
        candidate.insert(item_id.clone());
    }
    for item_id in removed {
        candidate.remove(item_id);
    }
    validate_enrollment(participant, &candidate, snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, Item, ItemType, PrizePoints};

    fn create_test_item(id: &str, category_id: &str, performance: PerformanceType) -> Item {
        Item {
            id: id.to_string(),
            name: format!("Item {}", id),
            category_id: category_id.to_string(),
            item_type: ItemType::Single,
            performance_type: performance,
            points: PrizePoints { first: 5, second: 3, third: 1 },
            grade_point_overrides: Default::default(),
            max_participants: 3,
            max_groups_per_team: None,
            duration_minutes: 10,
        }
    }

    fn create_test_category(id: &str) -> Category {
        Category {
            id: id.to_string(),
            name: format!("Category {}", id),
            max_on_stage: None,
            max_off_stage: None,
            max_combined: None,
            is_general: false,
        }
    }

    fn create_test_participant(id: &str) -> Participant {
        Participant {
            id: id.to_string(),
            name: format!("Participant {}", id),
            team_id: "t1".to_string(),
            category_id: "c1".to_string(),
            chest_number: "100".to_string(),
            item_ids: Default::default(),
            item_groups: Default::default(),
            group_leader_item_ids: Default::default(),
            group_chest_numbers: Default::default(),
        }
    }

    fn create_test_snapshot(items: Vec<Item>, categories: Vec<Category>) -> EventSnapshot {
        let mut snapshot = EventSnapshot::default();
        for item in items {
            snapshot.items.insert(item.id.clone(), item);
        }
        for category in categories {
            snapshot.categories.insert(category.id.clone(), category);
        }
        snapshot
    }

    fn candidates(ids: &[&str]) -> BTreeSet<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_empty_candidate_set_passes() {
        let snapshot = create_test_snapshot(vec![], vec![]);
        let participant = create_test_participant("p1");
        let verdict = validate_enrollment(&participant, &candidates(&[]), &snapshot).unwrap();
        assert_eq!(verdict, None);
    }

    #[test]
    fn test_global_total_cap() {
        let items = vec![
            create_test_item("i1", "c1", PerformanceType::OnStage),
            create_test_item("i2", "c1", PerformanceType::OffStage),
            create_test_item("i3", "c1", PerformanceType::OffStage),
        ];
        let mut snapshot = create_test_snapshot(items, vec![create_test_category("c1")]);
        snapshot.settings.max_total_items_per_participant = Some(2);

        let participant = create_test_participant("p1");
        let verdict =
            validate_enrollment(&participant, &candidates(&["i1", "i2", "i3"]), &snapshot).unwrap();
        assert_eq!(verdict, Some(QuotaViolation::GlobalTotal { cap: 2, count: 3 }));
    }

    #[test]
    fn test_stage_cap_reported_before_total_pass() {
        // Caps {total: 5, on-stage: 3} with 4 on-stage candidates: the total
        // cap passes, the on-stage check must still fire.
        let items = vec![
            create_test_item("i1", "c1", PerformanceType::OnStage),
            create_test_item("i2", "c1", PerformanceType::OnStage),
            create_test_item("i3", "c1", PerformanceType::OnStage),
            create_test_item("i4", "c1", PerformanceType::OnStage),
        ];
        let mut snapshot = create_test_snapshot(items, vec![create_test_category("c1")]);
        snapshot.settings.max_total_items_per_participant = Some(5);
        snapshot.settings.max_items_per_participant.on_stage = Some(3);

        let participant = create_test_participant("p1");
        let verdict =
            validate_enrollment(&participant, &candidates(&["i1", "i2", "i3", "i4"]), &snapshot)
                .unwrap();
        assert_eq!(
            verdict,
            Some(QuotaViolation::GlobalStage {
                performance: PerformanceType::OnStage,
                cap: 3,
                count: 4
            })
        );
    }

    #[test]
    fn test_total_checked_before_stage() {
        let items = vec![
            create_test_item("i1", "c1", PerformanceType::OnStage),
            create_test_item("i2", "c1", PerformanceType::OnStage),
        ];
        let mut snapshot = create_test_snapshot(items, vec![create_test_category("c1")]);
        snapshot.settings.max_total_items_per_participant = Some(1);
        snapshot.settings.max_items_per_participant.on_stage = Some(1);

        let participant = create_test_participant("p1");
        let verdict =
            validate_enrollment(&participant, &candidates(&["i1", "i2"]), &snapshot).unwrap();
        // Both caps are broken; the global total wins because it runs first.
        assert_eq!(verdict, Some(QuotaViolation::GlobalTotal { cap: 1, count: 2 }));
    }

    #[test]
    fn test_category_caps_visited_in_id_order() {
        let items = vec![
            create_test_item("i1", "cb", PerformanceType::OnStage),
            create_test_item("i2", "cb", PerformanceType::OnStage),
            create_test_item("i3", "ca", PerformanceType::OnStage),
            create_test_item("i4", "ca", PerformanceType::OnStage),
        ];
        let mut ca = create_test_category("ca");
        ca.max_on_stage = Some(1);
        let mut cb = create_test_category("cb");
        cb.max_on_stage = Some(1);
        let snapshot = create_test_snapshot(items, vec![ca, cb]);

        let participant = create_test_participant("p1");
        let verdict =
            validate_enrollment(&participant, &candidates(&["i1", "i2", "i3", "i4"]), &snapshot)
                .unwrap();
        // Both categories are violated; "ca" sorts first and must be the one
        // reported regardless of item enumeration order.
        assert_eq!(
            verdict,
            Some(QuotaViolation::CategoryStage {
                category_id: "ca".to_string(),
                performance: PerformanceType::OnStage,
                cap: 1,
                count: 2
            })
        );
    }

    #[test]
    fn test_category_combined_cap() {
        let items = vec![
            create_test_item("i1", "c1", PerformanceType::OnStage),
            create_test_item("i2", "c1", PerformanceType::OffStage),
        ];
        let mut category = create_test_category("c1");
        category.max_combined = Some(1);
        let snapshot = create_test_snapshot(items, vec![category]);

        let participant = create_test_participant("p1");
        let verdict =
            validate_enrollment(&participant, &candidates(&["i1", "i2"]), &snapshot).unwrap();
        assert_eq!(
            verdict,
            Some(QuotaViolation::CategoryCombined {
                category_id: "c1".to_string(),
                cap: 1,
                count: 2
            })
        );
    }

    #[test]
    fn test_unknown_item_is_an_error_not_a_violation() {
        let snapshot = create_test_snapshot(vec![], vec![]);
        let participant = create_test_participant("p1");
        assert!(validate_enrollment(&participant, &candidates(&["ghost"]), &snapshot).is_err());
    }

    #[test]
    fn test_batch_matches_merged_set() {
        let items = vec![
            create_test_item("i1", "c1", PerformanceType::OnStage),
            create_test_item("i2", "c1", PerformanceType::OnStage),
            create_test_item("i3", "c1", PerformanceType::OffStage),
        ];
        let mut snapshot = create_test_snapshot(items, vec![create_test_category("c1")]);
        snapshot.settings.max_items_per_participant.on_stage = Some(1);

        let mut participant = create_test_participant("p1");
        participant.item_ids.insert("i1".to_string());

        // Adding a second on-stage item breaks the cap...
        let verdict = validate_enrollment_batch(
            &participant,
            &["i2".to_string()],
            &[],
            &snapshot,
        )
        .unwrap();
        assert!(verdict.is_some());

        // ...unless the first one is removed in the same batch.
        let verdict = validate_enrollment_batch(
            &participant,
            &["i2".to_string()],
            &["i1".to_string()],
            &snapshot,
        )
        .unwrap();
        assert_eq!(verdict, None);

        // The batch verdict must equal validating the merged set directly.
        let merged = candidates(&["i2"]);
        assert_eq!(
            validate_enrollment(&participant, &merged, &snapshot).unwrap(),
            verdict
        );
    }
}
