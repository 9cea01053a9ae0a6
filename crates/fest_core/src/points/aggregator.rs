//! Pure projection of declared results against current configuration.
//!
//! Nothing is cached: every query walks the declared results again, so a
//! fresh snapshot fully supersedes prior output. Declared winner rows carry
//! no point values; the engine prices positions and grades from the live
//! item and grade tables each time it runs.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::Result;
use crate::models::{Item, ItemResult, ItemType, ResultStatus, Winner};
use crate::snapshot::EventSnapshot;

use super::types::{
    CategoryContribution, ContributionRow, GlobalSummary, ItemContribution, ParticipantInsight,
    PointsBreakdown, TeamStanding, TopperFilter, TopperRow,
};

pub struct PointsEngine<'a> {
    snapshot: &'a EventSnapshot,
    results: &'a BTreeMap<String, ItemResult>,
}

impl<'a> PointsEngine<'a> {
    pub fn new(snapshot: &'a EventSnapshot, results: &'a BTreeMap<String, ItemResult>) -> Self {
        Self { snapshot, results }
    }

    fn declared_results(&self) -> impl Iterator<Item = &ItemResult> {
        self.results.values().filter(|r| r.status == ResultStatus::Declared)
    }

    /// Prices one frozen winner row against the live item and grade tables.
    fn price_winner(&self, item: &Item, winner: &Winner) -> PointsBreakdown {
        let rank_points = item.points.for_position(winner.position);
        let grade_points = winner
            .grade_id
            .as_deref()
            .and_then(|grade_id| self.snapshot.grades.find(item.item_type, grade_id))
            .map(|grade| item.grade_points_for(grade))
            .unwrap_or(0);
        PointsBreakdown { rank_points, grade_points }
    }

    /// All contribution rows from declared results, in (item id, declared
    /// winner) order.
    pub fn contribution_rows(&self) -> Result<Vec<ContributionRow>> {
        let mut rows = Vec::new();
        for result in self.declared_results() {
            let item = self.snapshot.item(&result.item_id)?;
            for winner in &result.winners {
                let participant = self.snapshot.participant(&winner.participant_id)?;
                rows.push(ContributionRow {
                    participant_id: participant.id.clone(),
                    team_id: participant.team_id.clone(),
                    category_id: item.category_id.clone(),
                    item_id: item.id.clone(),
                    position: winner.position,
                    mark: winner.mark,
                    grade_id: winner.grade_id.clone(),
                    points: self.price_winner(item, winner),
                });
            }
        }
        Ok(rows)
    }

    /// Team leaderboard: participant -> item -> category -> team rollup,
    /// best total first. Ties break on team id so output is reproducible.
    pub fn team_standings(&self) -> Result<Vec<TeamStanding>> {
        // team -> category -> item -> rows
        let mut by_team: BTreeMap<String, BTreeMap<String, BTreeMap<String, Vec<ContributionRow>>>> =
            BTreeMap::new();
        for row in self.contribution_rows()? {
            by_team
                .entry(row.team_id.clone())
                .or_default()
                .entry(row.category_id.clone())
                .or_default()
                .entry(row.item_id.clone())
                .or_default()
                .push(row);
        }

        let mut standings = Vec::new();
        for (team_id, categories) in by_team {
            let team = self.snapshot.team(&team_id)?;
            let mut team_points = PointsBreakdown::default();
            let mut category_contributions = Vec::new();

            for (category_id, items) in categories {
                let mut category_points = PointsBreakdown::default();
                let mut item_contributions = Vec::new();

                for (item_id, rows) in items {
                    let mut item_points = PointsBreakdown::default();
                    for row in &rows {
                        item_points.add(row.points);
                    }
                    category_points.add(item_points);
                    item_contributions.push(ItemContribution { item_id, points: item_points, rows });
                }

                team_points.add(category_points);
                category_contributions.push(CategoryContribution {
                    category_id,
                    points: category_points,
                    items: item_contributions,
                });
            }

            standings.push(TeamStanding {
                team_id,
                team_name: team.name.clone(),
                points: team_points,
                categories: category_contributions,
            });
        }

        standings.sort_by(|a, b| {
            b.points.total().cmp(&a.points.total()).then_with(|| a.team_id.cmp(&b.team_id))
        });
        Ok(standings)
    }

    /// Top individual scorers. Restricted to Single items; group wins credit
    /// a leader but say nothing about individual performance.
    pub fn individual_toppers(
        &self,
        filter: &TopperFilter,
        top_k: usize,
    ) -> Result<Vec<TopperRow>> {
        let mut totals: BTreeMap<String, PointsBreakdown> = BTreeMap::new();
        for row in self.contribution_rows()? {
            let item = self.snapshot.item(&row.item_id)?;
            if item.item_type != ItemType::Single {
                continue;
            }
            if let Some(performance) = filter.performance_type {
                if item.performance_type != performance {
                    continue;
                }
            }
            if let Some(category_id) = &filter.category_id {
                if &row.category_id != category_id {
                    continue;
                }
            }
            totals.entry(row.participant_id.clone()).or_default().add(row.points);
        }

        let mut toppers = Vec::new();
        for (participant_id, points) in totals {
            let participant = self.snapshot.participant(&participant_id)?;
            toppers.push(TopperRow {
                participant_id,
                participant_name: participant.name.clone(),
                team_id: participant.team_id.clone(),
                category_id: participant.category_id.clone(),
                points,
            });
        }
        toppers.sort_by(|a, b| {
            b.points.total().cmp(&a.points.total()).then_with(|| a.participant_id.cmp(&b.participant_id))
        });
        toppers.truncate(top_k);
        Ok(toppers)
    }

    /// Contribution rows of one item, best position first.
    pub fn item_insight(&self, item_id: &str) -> Result<Vec<ContributionRow>> {
        self.snapshot.item(item_id)?;
        let mut rows: Vec<ContributionRow> =
            self.contribution_rows()?.into_iter().filter(|row| row.item_id == item_id).collect();
        rows.sort_by(|a, b| {
            a.position.cmp(&b.position).then_with(|| a.participant_id.cmp(&b.participant_id))
        });
        Ok(rows)
    }

    /// Everything one participant scored, with a running total.
    pub fn participant_insight(&self, participant_id: &str) -> Result<ParticipantInsight> {
        self.snapshot.participant(participant_id)?;
        let rows: Vec<ContributionRow> = self
            .contribution_rows()?
            .into_iter()
            .filter(|row| row.participant_id == participant_id)
            .collect();
        let mut total = PointsBreakdown::default();
        for row in &rows {
            total.add(row.points);
        }
        Ok(ParticipantInsight { participant_id: participant_id.to_string(), rows, total })
    }

    /// Event-wide declared counts.
    pub fn global_summary(&self) -> GlobalSummary {
        let mut declared_items = 0u32;
        let mut winner_rows = 0u32;
        let mut participants: BTreeSet<&str> = BTreeSet::new();
        for result in self.declared_results() {
            declared_items += 1;
            for winner in &result.winners {
                winner_rows += 1;
                participants.insert(winner.participant_id.as_str());
            }
        }
        GlobalSummary {
            declared_items,
            contributing_participants: participants.len() as u32,
            winner_rows,
        }
    }
}
