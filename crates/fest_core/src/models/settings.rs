use serde::{Deserialize, Serialize};

use super::item::PerformanceType;

/// Per-performance-type enrollment caps. `None` means no cap.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct StageCaps {
    #[serde(default)]
    pub on_stage: Option<u32>,
    #[serde(default)]
    pub off_stage: Option<u32>,
}

impl StageCaps {
    pub fn cap_for(&self, performance: PerformanceType) -> Option<u32> {
        match performance {
            PerformanceType::OnStage => self.on_stage,
            PerformanceType::OffStage => self.off_stage,
        }
    }
}

/// Event-wide enrollment limits.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub max_total_items_per_participant: Option<u32>,
    #[serde(default)]
    pub max_items_per_participant: StageCaps,
}
