//! Stage win/loss statistics models.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::{Stage, StageId};

/// Win rate classification used when presenting results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WinrateBand {
    Strong,
    Even,
    Weak,
}

impl WinrateBand {
    /// Classify a win rate given as a percentage (0-100).
    pub fn from_percent(winrate_percent: f64) -> Self {
        if winrate_percent >= 60.0 {
            WinrateBand::Strong
        } else if winrate_percent >= 50.0 {
            WinrateBand::Even
        } else {
            WinrateBand::Weak
        }
    }
}

impl std::fmt::Display for WinrateBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WinrateBand::Strong => write!(f, "strong"),
            WinrateBand::Even => write!(f, "even"),
            WinrateBand::Weak => write!(f, "weak"),
        }
    }
}

/// Running win/total count for one stage. `wins <= total` always holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageTally {
    pub stage_id: StageId,
    pub stage_name: String,
    pub wins: u32,
    pub total: u32,
}

impl StageTally {
    pub fn new(stage: &Stage) -> Self {
        Self {
            stage_id: stage.id.clone(),
            stage_name: stage.name.clone(),
            wins: 0,
            total: 0,
        }
    }

    /// Count one game on this stage.
    pub fn record(&mut self, won: bool) {
        self.total += 1;
        if won {
            self.wins += 1;
        }
    }
}

/// Per-stage tallies for a single aggregation run.
///
/// Owned by one call; never shared between characters or requests.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StageTallies {
    by_stage: HashMap<StageId, StageTally>,
}

impl StageTallies {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one game on `stage`. The stage name is taken from the first
    /// observation of its id.
    pub fn record(&mut self, stage: &Stage, won: bool) {
        self.by_stage
            .entry(stage.id.clone())
            .or_insert_with(|| StageTally::new(stage))
            .record(won);
    }

    pub fn get(&self, stage_id: &StageId) -> Option<&StageTally> {
        self.by_stage.get(stage_id)
    }

    pub fn len(&self) -> usize {
        self.by_stage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_stage.is_empty()
    }

    /// Total games counted across all stages.
    pub fn games_counted(&self) -> u32 {
        self.by_stage.values().map(|t| t.total).sum()
    }

    /// Fold another run's tallies into this one, summing per stage.
    pub fn merge(&mut self, other: StageTallies) {
        for (stage_id, tally) in other.by_stage {
            let entry = self.by_stage.entry(stage_id).or_insert_with(|| StageTally {
                wins: 0,
                total: 0,
                ..tally.clone()
            });
            entry.wins += tally.wins;
            entry.total += tally.total;
        }
    }

    pub fn into_values(self) -> impl Iterator<Item = StageTally> {
        self.by_stage.into_values()
    }
}

/// Final ranked entry for one stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageResult {
    pub stage_id: StageId,
    pub stage_name: String,
    pub wins: u32,
    pub total: u32,

    /// Unrounded win rate, 0.0 to 100.0
    pub winrate_percent: f64,
}

impl StageResult {
    pub fn band(&self) -> WinrateBand {
        WinrateBand::from_percent(self.winrate_percent)
    }

    /// Games counted as losses, including unreported ones.
    pub fn losses(&self) -> u32 {
        self.total - self.wins
    }
}
