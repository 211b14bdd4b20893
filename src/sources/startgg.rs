//! start.gg GraphQL API client.
//!
//! Issues the tournament search and per-tournament set queries. All start.gg
//! query text and response shapes are kept in this module.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use super::{MatchDataSource, TournamentSource};
use crate::fetch::{FetchError, GraphqlClient};
use crate::models::{StartggId, Tournament, TournamentSets};

// ── Queries ─────────────────────────────────────────────────────────────────

/// Completed tournaments featuring a videogame.
pub const SEARCH_TOURNAMENTS_QUERY: &str = r#"
query SearchTournaments($videogameId: ID!, $perPage: Int, $page: Int) {
  tournaments(query: {
    perPage: $perPage
    page: $page
    filter: {
      videogameIds: [$videogameId]
      upcoming: false
    }
  }) {
    nodes {
      id
      name
      startAt
    }
  }
}
"#;

/// One page of sets per event, with per-game stage and character data.
pub const TOURNAMENT_SETS_QUERY: &str = r#"
query GetTournamentSets($tournamentId: ID!, $page: Int, $perPage: Int) {
  tournament(id: $tournamentId) {
    events {
      id
      sets(page: $page, perPage: $perPage) {
        nodes {
          id
          winnerId
          games {
            winnerId
            stage {
              id
              name
            }
            selections {
              character {
                id
                name
              }
              entrant {
                id
              }
            }
          }
        }
      }
    }
  }
}
"#;

// ── Response shapes ─────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct TournamentConnection {
    #[serde(default)]
    nodes: Option<Vec<Tournament>>,
}

#[derive(Debug, Deserialize)]
struct SearchTournamentsData {
    tournaments: Option<TournamentConnection>,
}

#[derive(Debug, Deserialize)]
struct TournamentSetsData {
    tournament: Option<TournamentSets>,
}

impl SearchTournamentsData {
    fn into_tournaments(self) -> Vec<Tournament> {
        self.tournaments.and_then(|c| c.nodes).unwrap_or_default()
    }
}

impl TournamentSetsData {
    fn into_tree(self) -> TournamentSets {
        self.tournament.unwrap_or_default()
    }
}

// ── Client ──────────────────────────────────────────────────────────────────

/// start.gg API client.
pub struct StartggClient {
    graphql: GraphqlClient,
}

impl StartggClient {
    pub fn new(graphql: GraphqlClient) -> Self {
        Self { graphql }
    }
}

#[async_trait]
impl TournamentSource for StartggClient {
    fn name(&self) -> &'static str {
        "startgg"
    }

    async fn list_tournaments(
        &self,
        videogame_id: &StartggId,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<Tournament>, FetchError> {
        info!(
            "start.gg: searching tournaments for videogame {} (page {}, {} per page)",
            videogame_id, page, per_page
        );

        let data: SearchTournamentsData = self
            .graphql
            .query(
                SEARCH_TOURNAMENTS_QUERY,
                json!({
                    "videogameId": videogame_id,
                    "page": page,
                    "perPage": per_page,
                }),
            )
            .await?;

        let tournaments = data.into_tournaments();
        info!("start.gg: found {} tournaments", tournaments.len());
        Ok(tournaments)
    }
}

#[async_trait]
impl MatchDataSource for StartggClient {
    fn name(&self) -> &'static str {
        "startgg"
    }

    async fn list_sets(
        &self,
        tournament_id: &StartggId,
        page: u32,
        per_page: u32,
    ) -> Result<TournamentSets, FetchError> {
        info!("start.gg: fetching sets for tournament {}", tournament_id);

        let data: TournamentSetsData = self
            .graphql
            .query(
                TOURNAMENT_SETS_QUERY,
                json!({
                    "tournamentId": tournament_id,
                    "page": page,
                    "perPage": per_page,
                }),
            )
            .await?;

        let tree = data.into_tree();
        info!(
            "start.gg: got {} sets across {} events for tournament {}",
            tree.set_count(),
            tree.events.len(),
            tournament_id
        );
        Ok(tree)
    }
}
