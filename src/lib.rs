//! # Stage Analytics
//!
//! Ranks stages by a character's historical win rate using tournament
//! results from start.gg.
//!
//! ## Architecture
//!
//! - **models**: Tournament/set/game trees and stage statistics
//! - **fetch**: GraphQL transport and error taxonomy
//! - **sources**: Tournament and match data sources (live API, JSON fixtures)
//! - **calculate**: Stage tally aggregation and ranking
//! - **api**: REST API endpoints
//! - **config**: Configuration loading and validation

pub mod api;
pub mod calculate;
pub mod config;
pub mod fetch;
pub mod models;
pub mod sources;

pub use models::*;
