//! Stage statistics engine.
//!
//! - `aggregator`: walks tournaments and their set trees, tallying games per
//!   stage for one character
//! - `ranker`: filters tallies below the sample floor and orders by win rate

pub mod aggregator;
pub mod ranker;

pub use aggregator::{AggregateError, StageAggregator};
pub use ranker::{rank, DEFAULT_MIN_GAMES};

/// Calculate win rate as a percentage (0-100). Zero games yields 0.
pub fn calculate_winrate_percent(wins: u32, total: u32) -> f64 {
    if total == 0 {
        0.0
    } else {
        wins as f64 / total as f64 * 100.0
    }
}
