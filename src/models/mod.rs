//! Core data models for stage analytics.

mod ids;
mod stats;
mod tournament;

pub use ids::*;
pub use stats::*;
pub use tournament::*;
