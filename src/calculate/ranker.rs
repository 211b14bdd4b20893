//! Turns stage tallies into the ranked result list.

use crate::models::{StageResult, StageTallies};

use super::calculate_winrate_percent;

/// Minimum games on a stage before it is ranked.
pub const DEFAULT_MIN_GAMES: u32 = 5;

/// Rank stages by win rate, best first.
///
/// Stages with fewer than `min_games` games are dropped. Equal win rates are
/// ordered by stage id ascending. An empty result means there was not enough
/// data.
pub fn rank(tallies: StageTallies, min_games: u32) -> Vec<StageResult> {
    let mut results: Vec<StageResult> = tallies
        .into_values()
        .filter(|t| t.total >= min_games)
        .map(|t| StageResult {
            winrate_percent: calculate_winrate_percent(t.wins, t.total),
            stage_id: t.stage_id,
            stage_name: t.stage_name,
            wins: t.wins,
            total: t.total,
        })
        .collect();

    results.sort_by(|a, b| {
        b.winrate_percent
            .total_cmp(&a.winrate_percent)
            .then_with(|| a.stage_id.cmp(&b.stage_id))
    });

    results
}
