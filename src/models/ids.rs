//! Identifiers as issued by start.gg.

use serde::{Deserialize, Deserializer, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Raw id as it appears on the wire. start.gg emits most ids as JSON
/// numbers, but some fields (and some API versions) send strings.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Number(serde_json::Number),
    String(String),
}

/// An opaque start.gg identifier (tournament, stage, character, entrant...).
///
/// Equality is on the canonical string form, so `10` and `"10"` compare equal.
/// Numeric ids order numerically and sort before non-numeric ones.
#[derive(Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "String")]
pub struct StartggId(String);

impl StartggId {
    /// Create an id from its string form.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Numeric value, if the id is purely numeric.
    pub fn as_u64(&self) -> Option<u64> {
        self.0.parse().ok()
    }
}

impl<'de> Deserialize<'de> for StartggId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match RawId::deserialize(deserializer)? {
            RawId::Number(n) => Self(n.to_string()),
            RawId::String(s) => Self(s),
        })
    }
}

impl Ord for StartggId {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.as_u64(), other.as_u64()) {
            (Some(a), Some(b)) => a.cmp(&b).then_with(|| self.0.cmp(&other.0)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => self.0.cmp(&other.0),
        }
    }
}

impl PartialOrd for StartggId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for StartggId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl fmt::Debug for StartggId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StartggId({})", self.0)
    }
}

impl From<String> for StartggId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for StartggId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<u64> for StartggId {
    fn from(n: u64) -> Self {
        Self(n.to_string())
    }
}

impl From<StartggId> for String {
    fn from(id: StartggId) -> Self {
        id.0
    }
}

/// Type alias for tournament IDs
pub type TournamentId = StartggId;

/// Type alias for stage IDs
pub type StageId = StartggId;

/// Type alias for character IDs
pub type CharacterId = StartggId;

/// Type alias for entrant IDs
pub type EntrantId = StartggId;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_from_json_number() {
        let id: StartggId = serde_json::from_str("1386").unwrap();
        assert_eq!(id.as_str(), "1386");
        assert_eq!(id.as_u64(), Some(1386));
    }

    #[test]
    fn test_id_from_json_string() {
        let id: StartggId = serde_json::from_str("\"1386\"").unwrap();
        assert_eq!(id, StartggId::from(1386u64));
    }

    #[test]
    fn test_id_non_numeric() {
        let id: StartggId = serde_json::from_str("\"preview_123\"").unwrap();
        assert_eq!(id.as_u64(), None);
        assert_eq!(id.as_str(), "preview_123");
    }

    #[test]
    fn test_id_serializes_as_string() {
        let id = StartggId::from(42u64);
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"42\"");
    }

    #[test]
    fn test_id_numeric_ordering() {
        let mut ids = vec![
            StartggId::from(10u64),
            StartggId::from(2u64),
            StartggId::from(33u64),
        ];
        ids.sort();
        assert_eq!(
            ids,
            vec![StartggId::from(2u64), StartggId::from(10u64), StartggId::from(33u64)]
        );
    }

    #[test]
    fn test_id_mixed_ordering_numeric_first() {
        assert!(StartggId::from("abc") > StartggId::from("2"));
        assert!(StartggId::from("1a") > StartggId::from("10"));
        assert!(StartggId::from("abc") < StartggId::from("abd"));
    }

    #[test]
    fn test_id_display() {
        let id = StartggId::new("77");
        assert_eq!(format!("{}", id), "77");
        assert_eq!(format!("{:<4}|", id), "77  |");
        assert!(format!("{:?}", id).contains("77"));
    }
}
