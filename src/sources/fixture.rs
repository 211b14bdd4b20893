//! Offline source backed by a saved JSON snapshot.
//!
//! Snapshot layout:
//!
//! ```json
//! {
//!   "tournaments": [{"id": 1, "name": "Weekly", "startAt": 1700000000}],
//!   "sets": {"1": {"events": [{"sets": {"nodes": [...]}}]}}
//! }
//! ```

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{MatchDataSource, TournamentSource};
use crate::fetch::FetchError;
use crate::models::{StartggId, Tournament, TournamentSets};

/// A snapshot of tournament data for one game.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub tournaments: Vec<Tournament>,

    /// Set trees keyed by tournament id
    #[serde(default)]
    pub sets: HashMap<String, TournamentSets>,
}

/// Source serving a [`Snapshot`] from memory.
#[derive(Debug, Clone, Default)]
pub struct FixtureSource {
    snapshot: Snapshot,
}

impl FixtureSource {
    pub fn new(snapshot: Snapshot) -> Self {
        Self { snapshot }
    }

    /// Parse a snapshot from JSON text.
    pub fn from_json(json: &str) -> Result<Self, FetchError> {
        Ok(Self::new(serde_json::from_str(json)?))
    }

    /// Load a snapshot file.
    pub fn from_file(path: &Path) -> Result<Self, FetchError> {
        let contents = std::fs::read_to_string(path)?;
        let source = Self::from_json(&contents)?;
        info!(
            "Loaded fixture {} ({} tournaments)",
            path.display(),
            source.snapshot.tournaments.len()
        );
        Ok(source)
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }
}

/// Slice out one 1-based page.
fn page_of<T: Clone>(items: &[T], page: u32, per_page: u32) -> Vec<T> {
    let page = page.max(1) as usize;
    let per_page = per_page as usize;
    items
        .iter()
        .skip((page - 1) * per_page)
        .take(per_page)
        .cloned()
        .collect()
}

#[async_trait]
impl TournamentSource for FixtureSource {
    fn name(&self) -> &'static str {
        "fixture"
    }

    async fn list_tournaments(
        &self,
        _videogame_id: &StartggId,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<Tournament>, FetchError> {
        Ok(page_of(&self.snapshot.tournaments, page, per_page))
    }
}

#[async_trait]
impl MatchDataSource for FixtureSource {
    fn name(&self) -> &'static str {
        "fixture"
    }

    async fn list_sets(
        &self,
        tournament_id: &StartggId,
        page: u32,
        per_page: u32,
    ) -> Result<TournamentSets, FetchError> {
        let Some(tree) = self.snapshot.sets.get(tournament_id.as_str()) else {
            return Ok(TournamentSets::default());
        };

        let mut tree = tree.clone();
        for event in &mut tree.events {
            event.sets.nodes = page_of(&event.sets.nodes, page, per_page);
        }
        Ok(tree)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SNAPSHOT: &str = r#"{
        "tournaments": [
            {"id": 1, "name": "Weekly 1"},
            {"id": 2, "name": "Weekly 2"},
            {"id": 3, "name": "Weekly 3"}
        ],
        "sets": {
            "1": {"events": [{"sets": {"nodes": [
                {"id": 10, "games": []},
                {"id": 11, "games": []},
                {"id": 12, "games": []}
            ]}}]}
        }
    }"#;

    fn game_id() -> StartggId {
        StartggId::from(1386u64)
    }

    #[tokio::test]
    async fn test_list_tournaments_pages() {
        let source = FixtureSource::from_json(SNAPSHOT).unwrap();

        let first = source.list_tournaments(&game_id(), 1, 2).await.unwrap();
        assert_eq!(first.len(), 2);
        assert_eq!(first[0].name, "Weekly 1");

        let second = source.list_tournaments(&game_id(), 2, 2).await.unwrap();
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].name, "Weekly 3");
    }

    #[tokio::test]
    async fn test_list_sets_pages_per_event() {
        let source = FixtureSource::from_json(SNAPSHOT).unwrap();

        let tree = source
            .list_sets(&StartggId::from(1u64), 1, 2)
            .await
            .unwrap();
        assert_eq!(tree.set_count(), 2);
    }

    #[tokio::test]
    async fn test_list_sets_unknown_tournament_is_empty() {
        let source = FixtureSource::from_json(SNAPSHOT).unwrap();

        let tree = source
            .list_sets(&StartggId::from(99u64), 1, 50)
            .await
            .unwrap();
        assert_eq!(tree, TournamentSets::default());
    }

    #[test]
    fn test_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(SNAPSHOT.as_bytes()).unwrap();

        let source = FixtureSource::from_file(file.path()).unwrap();
        assert_eq!(source.snapshot().tournaments.len(), 3);
    }

    #[test]
    fn test_from_file_missing_is_transport_error() {
        let err = FixtureSource::from_file(Path::new("/nonexistent/snapshot.json")).unwrap_err();
        assert!(err.is_transport());
    }

    #[test]
    fn test_from_json_malformed() {
        let err = FixtureSource::from_json("{not json").unwrap_err();
        assert!(err.is_protocol());
    }

    #[test]
    fn test_bundled_sample_fixture_parses() {
        let source = FixtureSource::from_json(include_str!("../../fixtures/sample_snapshot.json"))
            .unwrap();
        assert!(!source.snapshot().tournaments.is_empty());
    }
}
