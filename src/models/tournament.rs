//! Tournament and match tree models.
//!
//! These mirror the shape of the start.gg GraphQL responses closely enough to
//! be deserialized directly: `tournament -> events -> sets -> games ->
//! stage/selections`. Lists that the service reports as `null` decode as
//! empty.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::{CharacterId, EntrantId, StageId, StartggId, TournamentId};

/// Deserialize `null` as the type's default (empty list, etc.).
fn deserialize_null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    let maybe: Option<T> = Option::deserialize(deserializer)?;
    Ok(maybe.unwrap_or_default())
}

/// A tournament as returned by the tournament search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tournament {
    pub id: TournamentId,

    pub name: String,

    /// Start time (unix seconds on the wire)
    #[serde(default, with = "chrono::serde::ts_seconds_option")]
    pub start_at: Option<DateTime<Utc>>,
}

impl Tournament {
    pub fn new(id: impl Into<TournamentId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            start_at: None,
        }
    }
}

/// A stage (map) a game was played on. Identity is `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stage {
    pub id: StageId,
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub name: String,
}

/// Reference to a playable character.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterRef {
    pub id: CharacterId,
    #[serde(default)]
    pub name: Option<String>,
}

/// Reference to a tournament entrant (player or team).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntrantRef {
    pub id: EntrantId,
}

/// Which character an entrant played in a single game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    #[serde(default)]
    pub character: Option<CharacterRef>,
    /// Missing on some unreported or DQ'd games
    #[serde(default)]
    pub entrant: Option<EntrantRef>,
}

impl Selection {
    /// Whether this selection is for the given character.
    pub fn is_character(&self, character_id: &CharacterId) -> bool {
        self.character
            .as_ref()
            .is_some_and(|c| &c.id == character_id)
    }

    pub fn entrant_id(&self) -> Option<&EntrantId> {
        self.entrant.as_ref().map(|e| &e.id)
    }
}

/// A single game within a set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Game {
    /// Entrant that won the game; absent for unreported games
    #[serde(default)]
    pub winner_id: Option<EntrantId>,

    #[serde(default)]
    pub stage: Option<Stage>,

    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub selections: Vec<Selection>,
}

impl Game {
    /// First selection in order whose character matches, if any.
    pub fn selection_for(&self, character_id: &CharacterId) -> Option<&Selection> {
        self.selections.iter().find(|s| s.is_character(character_id))
    }
}

/// A set (series of games between two entrants).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Set {
    pub id: StartggId,

    #[serde(default)]
    pub winner_id: Option<EntrantId>,

    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub games: Vec<Game>,
}

/// One page of sets for an event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SetPage {
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub nodes: Vec<Set>,
}

/// An event within a tournament with its page of sets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventSets {
    #[serde(default)]
    pub id: Option<StartggId>,

    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub sets: SetPage,
}

/// The full events -> sets -> games tree for one tournament.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TournamentSets {
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub events: Vec<EventSets>,
}

impl TournamentSets {
    /// All games in the tree, in event/set/game order.
    pub fn games(&self) -> impl Iterator<Item = &Game> {
        self.events
            .iter()
            .flat_map(|e| e.sets.nodes.iter())
            .flat_map(|s| s.games.iter())
    }

    /// Number of sets across all events.
    pub fn set_count(&self) -> usize {
        self.events.iter().map(|e| e.sets.nodes.len()).sum()
    }
}
