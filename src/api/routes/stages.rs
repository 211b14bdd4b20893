use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::api::state::AppState;
use crate::api::ApiError;
use crate::models::{CharacterId, StageResult};

#[derive(Debug, Deserialize)]
pub struct StageParams {
    pub min_games: Option<u32>,
    pub max_tournaments: Option<u32>,
}

/// Largest scan a single request may ask for.
const MAX_TOURNAMENTS_LIMIT: u32 = 100;

#[derive(Debug, Serialize)]
pub struct StageReport {
    pub character_id: CharacterId,
    pub min_games: u32,
    pub max_tournaments: u32,
    pub stages: Vec<StageResult>,
}

pub async fn character_stages(
    State(state): State<AppState>,
    Path(character_id): Path<String>,
    Query(params): Query<StageParams>,
) -> Result<Json<StageReport>, ApiError> {
    let character_id = character_id.trim();
    if character_id.is_empty() {
        return Err(ApiError::BadRequest("character id is required".to_string()));
    }
    let character_id = CharacterId::from(character_id);

    let min_games = params.min_games.unwrap_or(state.analysis.min_games);
    let max_tournaments = params
        .max_tournaments
        .unwrap_or(state.analysis.max_tournaments);
    if max_tournaments == 0 || max_tournaments > MAX_TOURNAMENTS_LIMIT {
        return Err(ApiError::BadRequest(format!(
            "max_tournaments must be between 1 and {}",
            MAX_TOURNAMENTS_LIMIT
        )));
    }

    let stages = state
        .aggregator
        .stage_winrates(&character_id, max_tournaments, min_games)
        .await
        .map_err(|e| {
            warn!(
                "Stage aggregation for character {} failed ({:?}): {}",
                character_id,
                e.fetch_error().kind(),
                e
            );
            ApiError::Upstream(e.to_string())
        })?;

    Ok(Json(StageReport {
        character_id,
        min_games,
        max_tournaments,
        stages,
    }))
}
