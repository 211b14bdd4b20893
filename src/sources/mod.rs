//! Tournament data sources.
//!
//! The aggregation engine only sees these two traits. `StartggClient` talks
//! to the live GraphQL API; `FixtureSource` serves a saved JSON snapshot.

use async_trait::async_trait;

use crate::fetch::FetchError;
use crate::models::{StartggId, Tournament, TournamentSets};

pub mod fixture;
pub mod startgg;

pub use fixture::FixtureSource;
pub use startgg::StartggClient;

/// Yields tournaments for a game, one page per call.
#[async_trait]
pub trait TournamentSource: Send + Sync {
    /// Source identifier for logging.
    fn name(&self) -> &'static str;

    /// List one page of completed tournaments for `videogame_id`.
    async fn list_tournaments(
        &self,
        videogame_id: &StartggId,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<Tournament>, FetchError>;
}

/// Yields the events -> sets -> games tree for a tournament, one page per call.
#[async_trait]
pub trait MatchDataSource: Send + Sync {
    /// Source identifier for logging.
    fn name(&self) -> &'static str;

    /// Fetch one page of sets (per event) for `tournament_id`.
    async fn list_sets(
        &self,
        tournament_id: &StartggId,
        page: u32,
        per_page: u32,
    ) -> Result<TournamentSets, FetchError>;
}
