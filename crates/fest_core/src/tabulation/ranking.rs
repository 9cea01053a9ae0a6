//! Rank and grade resolution from final marks.

use serde::{Deserialize, Serialize};

use crate::models::{GradeTables, Item};

/// Resolved standing of one entry within its item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Standing {
    pub entry_key: String,
    pub final_mark: f64,
    /// Winning position (1-3); 0 when unplaced.
    pub position: u32,
    pub rank_points: u32,
    pub grade_id: Option<String>,
    pub grade_points: u32,
}

impl Standing {
    pub fn total_points(&self) -> u32 {
        self.rank_points + self.grade_points
    }
}

/// Resolves positions and grades for one item's entries from their final
/// marks.
///
/// Entries sharing a mark share an ordinal (tie collapse). An ordinal only
/// becomes a position when its prize tier pays more than zero; a zero-point
/// tier leaves the entry unplaced while the next distinct mark still takes
/// the following ordinal. Grades resolve independently of position, so an
/// unplaced entry can still earn grade points.
pub fn resolve_standings(
    item: &Item,
    marked_entries: &[(String, f64)],
    grades: &GradeTables,
) -> Vec<Standing> {
    // Distinct positive marks, highest first.
    let mut unique_marks: Vec<f64> =
        marked_entries.iter().map(|(_, mark)| *mark).filter(|mark| *mark > 0.0).collect();
    unique_marks.sort_by(|a, b| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));
    unique_marks.dedup();

    let thresholds = item.points.paying_positions();

    marked_entries
        .iter()
        .map(|(entry_key, final_mark)| {
            let final_mark = *final_mark;

            let mut position = 0u32;
            let mut rank_points = 0u32;
            if final_mark > 0.0 {
                let ordinal = unique_marks
                    .iter()
                    .position(|mark| *mark == final_mark)
                    .map(|index| index as u32 + 1)
                    .unwrap_or(0);
                if thresholds.contains(&ordinal) {
                    position = ordinal;
                    rank_points = item.points.for_position(ordinal);
                }
            }

            let grade = grades.resolve(item.item_type, final_mark);
            let grade_points = grade.map(|g| item.grade_points_for(g)).unwrap_or(0);

            Standing {
                entry_key: entry_key.clone(),
                final_mark,
                position,
                rank_points,
                grade_id: grade.map(|g| g.id.clone()),
                grade_points,
            }
        })
        .collect()
}
