//! Stage tally aggregation.
//!
//! Pulls one page of tournaments, then each tournament's set tree in turn,
//! and counts every game the target character appears in against the stage
//! it was played on. Tournaments are processed strictly one after another.
//! Any source error aborts the whole run and no tallies are returned.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info};

use crate::fetch::FetchError;
use crate::models::{CharacterId, Game, StageResult, StageTallies, StartggId, TournamentId};
use crate::sources::{MatchDataSource, TournamentSource};

use super::rank;

/// Default number of tournaments scanned per run.
pub const DEFAULT_MAX_TOURNAMENTS: u32 = 20;

/// Default sets requested per tournament.
pub const DEFAULT_SETS_PER_PAGE: u32 = 50;

/// Errors that abort an aggregation run.
#[derive(Debug, Error)]
pub enum AggregateError {
    #[error("Tournament search failed: {source}")]
    TournamentSearch {
        #[source]
        source: FetchError,
    },

    #[error("Fetching sets for tournament {tournament_id} ({tournament_name}) failed: {source}")]
    MatchData {
        tournament_id: TournamentId,
        tournament_name: String,
        #[source]
        source: FetchError,
    },
}

impl AggregateError {
    /// The underlying source error.
    pub fn fetch_error(&self) -> &FetchError {
        match self {
            AggregateError::TournamentSearch { source } => source,
            AggregateError::MatchData { source, .. } => source,
        }
    }
}

/// How a single game relates to the target character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GameOutcome {
    Win,
    Loss,
    /// No stage, no selections, or the character was not picked
    Skipped,
}

/// Attribute one game to `character_id`.
///
/// Uses the first selection for the character; the game is a win when its
/// winner is that selection's entrant. A matched selection without an
/// entrant cannot be attributed and is skipped.
fn classify_game(game: &Game, character_id: &CharacterId) -> GameOutcome {
    if game.stage.is_none() || game.selections.is_empty() {
        return GameOutcome::Skipped;
    }

    let Some(entrant_id) = game
        .selection_for(character_id)
        .and_then(|selection| selection.entrant_id())
    else {
        return GameOutcome::Skipped;
    };

    if game.winner_id.as_ref() == Some(entrant_id) {
        GameOutcome::Win
    } else {
        GameOutcome::Loss
    }
}

/// Builds per-stage tallies for a character from the two data sources.
#[derive(Clone)]
pub struct StageAggregator {
    tournaments: Arc<dyn TournamentSource>,
    matches: Arc<dyn MatchDataSource>,
    videogame_id: StartggId,
    sets_per_page: u32,
}

impl StageAggregator {
    pub fn new(
        tournaments: Arc<dyn TournamentSource>,
        matches: Arc<dyn MatchDataSource>,
        videogame_id: StartggId,
    ) -> Self {
        Self {
            tournaments,
            matches,
            videogame_id,
            sets_per_page: DEFAULT_SETS_PER_PAGE,
        }
    }

    pub fn with_sets_per_page(mut self, sets_per_page: u32) -> Self {
        self.sets_per_page = sets_per_page;
        self
    }

    /// Count wins and games per stage for `character_id` over at most
    /// `max_tournaments` tournaments.
    pub async fn compute_stage_tallies(
        &self,
        character_id: &CharacterId,
        max_tournaments: u32,
    ) -> Result<StageTallies, AggregateError> {
        let mut tournaments = self
            .tournaments
            .list_tournaments(&self.videogame_id, 1, max_tournaments)
            .await
            .map_err(|source| AggregateError::TournamentSearch { source })?;
        if tournaments.len() > max_tournaments as usize {
            debug!(
                "{} returned {} tournaments, keeping the first {}",
                self.tournaments.name(),
                tournaments.len(),
                max_tournaments
            );
            tournaments.truncate(max_tournaments as usize);
        }

        info!(
            "Scanning {} tournaments from {} for character {}",
            tournaments.len(),
            self.tournaments.name(),
            character_id
        );

        let mut tallies = StageTallies::new();
        let mut skipped = 0u32;

        for tournament in &tournaments {
            let tree = self
                .matches
                .list_sets(&tournament.id, 1, self.sets_per_page)
                .await
                .map_err(|source| AggregateError::MatchData {
                    tournament_id: tournament.id.clone(),
                    tournament_name: tournament.name.clone(),
                    source,
                })?;

            let before = tallies.games_counted();
            for game in tree.games() {
                let won = match classify_game(game, character_id) {
                    GameOutcome::Win => true,
                    GameOutcome::Loss => false,
                    GameOutcome::Skipped => {
                        skipped += 1;
                        continue;
                    }
                };
                if let Some(stage) = &game.stage {
                    tallies.record(stage, won);
                }
            }

            debug!(
                "{}: {} sets, {} games counted",
                tournament.name,
                tree.set_count(),
                tallies.games_counted() - before
            );
        }

        info!(
            "Counted {} games on {} stages ({} games skipped)",
            tallies.games_counted(),
            tallies.len(),
            skipped
        );

        Ok(tallies)
    }

    /// Tally and rank in one step.
    pub async fn stage_winrates(
        &self,
        character_id: &CharacterId,
        max_tournaments: u32,
        min_games: u32,
    ) -> Result<Vec<StageResult>, AggregateError> {
        let tallies = self
            .compute_stage_tallies(character_id, max_tournaments)
            .await?;
        Ok(rank(tallies, min_games))
    }
}
