//! Group entry resolution.
//!
//! Participants carry raw per-item group membership and leadership marks;
//! this module folds them into first-class entries, the unit everything
//! downstream (lots, marks, results) operates on.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::{Item, ItemType, Participant};
use crate::snapshot::EventSnapshot;

/// The unit being judged: one individual participant, or one team group with
/// a designated leader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Entry {
    Individual {
        participant_id: String,
    },
    Group {
        team_id: String,
        item_id: String,
        group_index: u32,
        leader_participant_id: String,
        member_ids: Vec<String>,
    },
}

impl Entry {
    /// Stable key identifying this entry within its item.
    pub fn key(&self) -> String {
        match self {
            Entry::Individual { participant_id } => participant_id.clone(),
            Entry::Group { team_id, item_id, group_index, .. } => {
                format!("{}:{}:g{}", team_id, item_id, group_index)
            }
        }
    }

    /// The participant credited with this entry's results.
    pub fn leader_id(&self) -> &str {
        match self {
            Entry::Individual { participant_id } => participant_id,
            Entry::Group { leader_participant_id, .. } => leader_participant_id,
        }
    }

    pub fn member_count(&self) -> u32 {
        match self {
            Entry::Individual { .. } => 1,
            Entry::Group { member_ids, .. } => member_ids.len() as u32,
        }
    }

    /// Roster name: the participant's own name, or `"{leader} & Party"`.
    pub fn display_name(&self, snapshot: &EventSnapshot) -> Result<String> {
        let leader = snapshot.participant(self.leader_id())?;
        Ok(match self {
            Entry::Individual { .. } => leader.name.clone(),
            Entry::Group { .. } => format!("{} & Party", leader.name),
        })
    }

    /// External chest number: the participant's own, or the leader's
    /// per-item group chest number (absent until assigned).
    pub fn chest_number(&self, snapshot: &EventSnapshot) -> Result<Option<String>> {
        let leader = snapshot.participant(self.leader_id())?;
        Ok(match self {
            Entry::Individual { .. } => Some(leader.chest_number.clone()),
            Entry::Group { item_id, .. } => leader.group_chest_numbers.get(item_id).cloned(),
        })
    }
}

/// How many members of a group are actually marked as its leader. A group is
/// only valid with exactly one; the resolver's fallback keeps unled groups
/// usable but they stay needs-attention until fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LeadershipCardinality {
    NoLeader,
    Single,
    Multiple,
}

impl LeadershipCardinality {
    pub fn is_valid(&self) -> bool {
        matches!(self, LeadershipCardinality::Single)
    }
}

/// A group-shape rule broken by the current enrollment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GroupViolation {
    SizeExceeded { item_id: String, team_id: String, group_index: u32, size: u32, cap: u32 },
    GroupCountExceeded { item_id: String, team_id: String, count: u32, cap: u32 },
}

impl fmt::Display for GroupViolation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            GroupViolation::SizeExceeded { item_id, team_id, group_index, size, cap } => {
                write!(
                    f,
                    "group {} of team {} in item {} has {} members, limit {}",
                    group_index, team_id, item_id, size, cap
                )
            }
            GroupViolation::GroupCountExceeded { item_id, team_id, count, cap } => {
                write!(
                    f,
                    "team {} fields {} groups in item {}, limit {}",
                    team_id, count, item_id, cap
                )
            }
        }
    }
}

/// Folds enrolled participants into judgeable entries.
///
/// Single items produce one entry per enrolled participant. Group items
/// partition each team's enrolled participants by their group index (1 when
/// unset); every non-empty partition becomes one entry. The leader is the
/// first member marked as leading the item, falling back to the first member
/// when nobody is marked. Output order is deterministic: participants by id,
/// groups by (team id, group index).
pub fn resolve_entries(item: &Item, snapshot: &EventSnapshot) -> Result<Vec<Entry>> {
    let enrolled = snapshot.enrolled_participants(&item.id);

    match item.item_type {
        ItemType::Single => Ok(enrolled
            .iter()
            .map(|p| Entry::Individual { participant_id: p.id.clone() })
            .collect()),
        ItemType::Group => {
            let mut partitions: BTreeMap<(String, u32), Vec<&Participant>> = BTreeMap::new();
            for participant in enrolled {
                let index = participant.group_index(&item.id);
                partitions
                    .entry((participant.team_id.clone(), index))
                    .or_default()
                    .push(participant);
            }

            let mut entries = Vec::new();
            for ((team_id, group_index), members) in partitions {
                let leader = members.iter().find(|m| m.leads(&item.id)).unwrap_or(&members[0]);
                entries.push(Entry::Group {
                    team_id,
                    item_id: item.id.clone(),
                    group_index,
                    leader_participant_id: leader.id.clone(),
                    member_ids: members.iter().map(|m| m.id.clone()).collect(),
                });
            }
            Ok(entries)
        }
    }
}

/// Counts marked leaders among an entry's members. Individual entries are
/// always valid.
pub fn leadership_cardinality(
    entry: &Entry,
    snapshot: &EventSnapshot,
) -> Result<LeadershipCardinality> {
    match entry {
        Entry::Individual { .. } => Ok(LeadershipCardinality::Single),
        Entry::Group { item_id, member_ids, .. } => {
            let mut marked = 0u32;
            for member_id in member_ids {
                if snapshot.participant(member_id)?.leads(item_id) {
                    marked += 1;
                }
            }
            Ok(match marked {
                0 => LeadershipCardinality::NoLeader,
                1 => LeadershipCardinality::Single,
                _ => LeadershipCardinality::Multiple,
            })
        }
    }
}

/// Checks group size and per-team group count against the item's caps.
pub fn validate_group_shape(item: &Item, entries: &[Entry]) -> Vec<GroupViolation> {
    let mut violations = Vec::new();
    let mut groups_per_team: BTreeMap<&str, u32> = BTreeMap::new();

    for entry in entries {
        if let Entry::Group { team_id, group_index, member_ids, .. } = entry {
            *groups_per_team.entry(team_id.as_str()).or_default() += 1;
            let size = member_ids.len() as u32;
            if item.max_participants > 0 && size > item.max_participants {
                violations.push(GroupViolation::SizeExceeded {
                    item_id: item.id.clone(),
                    team_id: team_id.clone(),
                    group_index: *group_index,
                    size,
                    cap: item.max_participants,
                });
            }
        }
    }

    if let Some(cap) = item.max_groups_per_team {
        for (team_id, count) in groups_per_team {
            if count > cap {
                violations.push(GroupViolation::GroupCountExceeded {
                    item_id: item.id.clone(),
                    team_id: team_id.to_string(),
                    count,
                    cap,
                });
            }
        }
    }

    violations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ItemType, PerformanceType, PrizePoints};

    fn create_test_item(id: &str, item_type: ItemType) -> Item {
        Item {
            id: id.to_string(),
            name: format!("Item {}", id),
            category_id: "c1".to_string(),
            item_type,
            performance_type: PerformanceType::OnStage,
            points: PrizePoints { first: 5, second: 3, third: 1 },
            grade_point_overrides: Default::default(),
            max_participants: 5,
            max_groups_per_team: Some(2),
            duration_minutes: 10,
        }
    }

    fn create_test_participant(id: &str, team_id: &str, item_id: &str) -> Participant {
        let mut participant = Participant {
            id: id.to_string(),
            name: format!("Participant {}", id),
            team_id: team_id.to_string(),
            category_id: "c1".to_string(),
            chest_number: format!("1{}", id),
            item_ids: Default::default(),
            item_groups: Default::default(),
            group_leader_item_ids: Default::default(),
            group_chest_numbers: Default::default(),
        };
        participant.item_ids.insert(item_id.to_string());
        participant
    }

    fn snapshot_with(item: Item, participants: Vec<Participant>) -> EventSnapshot {
        let mut snapshot = EventSnapshot::default();
        snapshot.items.insert(item.id.clone(), item);
        for participant in participants {
            snapshot.participants.insert(participant.id.clone(), participant);
        }
        snapshot
    }

    #[test]
    fn test_single_item_entries() {
        let item = create_test_item("i1", ItemType::Single);
        let snapshot = snapshot_with(
            item.clone(),
            vec![
                create_test_participant("p2", "t1", "i1"),
                create_test_participant("p1", "t2", "i1"),
            ],
        );

        let entries = resolve_entries(&item, &snapshot).unwrap();
        assert_eq!(entries.len(), 2);
        // Participant id order, regardless of team.
        assert_eq!(entries[0].key(), "p1");
        assert_eq!(entries[1].key(), "p2");
    }

    #[test]
    fn test_group_partitioning_defaults_to_group_one() {
        let item = create_test_item("i1", ItemType::Group);
        let mut p1 = create_test_participant("p1", "t1", "i1");
        p1.group_leader_item_ids.insert("i1".to_string());
        let p2 = create_test_participant("p2", "t1", "i1");
        let mut p3 = create_test_participant("p3", "t1", "i1");
        p3.item_groups.insert("i1".to_string(), 2);
        let snapshot = snapshot_with(item.clone(), vec![p1, p2, p3]);

        let entries = resolve_entries(&item, &snapshot).unwrap();
        assert_eq!(entries.len(), 2);

        match &entries[0] {
            Entry::Group { group_index, leader_participant_id, member_ids, .. } => {
                assert_eq!(*group_index, 1);
                assert_eq!(leader_participant_id, "p1");
                assert_eq!(member_ids, &vec!["p1".to_string(), "p2".to_string()]);
            }
            other => panic!("expected group entry, got {:?}", other),
        }
        match &entries[1] {
            Entry::Group { group_index, leader_participant_id, .. } => {
                assert_eq!(*group_index, 2);
                // No marked leader: falls back to the first member.
                assert_eq!(leader_participant_id, "p3");
            }
            other => panic!("expected group entry, got {:?}", other),
        }
    }

    #[test]
    fn test_leadership_cardinality() {
        let item = create_test_item("i1", ItemType::Group);
        let mut p1 = create_test_participant("p1", "t1", "i1");
        p1.group_leader_item_ids.insert("i1".to_string());
        let mut p2 = create_test_participant("p2", "t1", "i1");
        p2.group_leader_item_ids.insert("i1".to_string());
        let p3 = create_test_participant("p3", "t2", "i1");
        let snapshot = snapshot_with(item.clone(), vec![p1, p2, p3]);

        let entries = resolve_entries(&item, &snapshot).unwrap();
        assert_eq!(entries.len(), 2);

        // Two marked leaders in t1's group, none in t2's.
        assert_eq!(
            leadership_cardinality(&entries[0], &snapshot).unwrap(),
            LeadershipCardinality::Multiple
        );
        assert_eq!(
            leadership_cardinality(&entries[1], &snapshot).unwrap(),
            LeadershipCardinality::NoLeader
        );
        assert!(!LeadershipCardinality::Multiple.is_valid());
    }

    #[test]
    fn test_group_display_name_and_chest_number() {
        let item = create_test_item("i1", ItemType::Group);
        let mut p1 = create_test_participant("p1", "t1", "i1");
        p1.group_leader_item_ids.insert("i1".to_string());
        p1.group_chest_numbers.insert("i1".to_string(), "G7".to_string());
        let p2 = create_test_participant("p2", "t1", "i1");
        let snapshot = snapshot_with(item.clone(), vec![p1, p2]);

        let entries = resolve_entries(&item, &snapshot).unwrap();
        assert_eq!(entries[0].display_name(&snapshot).unwrap(), "Participant p1 & Party");
        assert_eq!(entries[0].chest_number(&snapshot).unwrap(), Some("G7".to_string()));
    }

    #[test]
    fn test_group_size_violation() {
        let mut item = create_test_item("i1", ItemType::Group);
        item.max_participants = 2;
        let participants = vec![
            create_test_participant("p1", "t1", "i1"),
            create_test_participant("p2", "t1", "i1"),
            create_test_participant("p3", "t1", "i1"),
        ];
        let snapshot = snapshot_with(item.clone(), participants);

        let entries = resolve_entries(&item, &snapshot).unwrap();
        let violations = validate_group_shape(&item, &entries);
        assert_eq!(violations.len(), 1);
        assert_eq!(
            violations[0],
            GroupViolation::SizeExceeded {
                item_id: "i1".to_string(),
                team_id: "t1".to_string(),
                group_index: 1,
                size: 3,
                cap: 2,
            }
        );
    }

    #[test]
    fn test_group_count_violation() {
        let mut item = create_test_item("i1", ItemType::Group);
        item.max_groups_per_team = Some(1);
        let p1 = create_test_participant("p1", "t1", "i1");
        let mut p2 = create_test_participant("p2", "t1", "i1");
        p2.item_groups.insert("i1".to_string(), 2);
        let snapshot = snapshot_with(item.clone(), vec![p1, p2]);

        let entries = resolve_entries(&item, &snapshot).unwrap();
        let violations = validate_group_shape(&item, &entries);
        assert_eq!(violations.len(), 1);
        assert!(matches!(
            violations[0],
            GroupViolation::GroupCountExceeded { count: 2, cap: 1, .. }
        ));
    }
}
