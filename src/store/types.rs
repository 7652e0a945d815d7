//! Core types for the history and file stores

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier of a history entry: the millisecond Unix timestamp assigned
/// at save time. Doubles as the sort key, so newer entries always compare
/// greater than older ones.
///
/// Serialized as a plain integer in storage; rendered as a decimal string
/// on the wire (clients treat it as an opaque token).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntryId(pub u64);

impl EntryId {
    pub fn from_millis(millis: u64) -> Self {
        Self(millis)
    }

    pub fn as_millis(&self) -> u64 {
        self.0
    }

    /// The moment this entry was saved, for logging and diagnostics.
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.0 as i64).single()
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for EntryId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u64>().map(EntryId)
    }
}

/// How a text entry reached the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    /// Submitted from the web UI (JSON POST).
    Interactive,
    /// Submitted via the URL shortcut (query-parameter GET).
    Programmatic,
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Origin::Interactive => write!(f, "interactive"),
            Origin::Programmatic => write!(f, "programmatic"),
        }
    }
}

/// A saved text snippet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextEntry {
    pub id: EntryId,
    pub text: String,
    /// `None` when the backend does not persist provenance
    /// (the filesystem backend stores bare text files).
    pub origin: Option<Origin>,
}

/// Metadata for a stored file. The blob itself lives in the backend and is
/// fetched separately on download.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredFile {
    /// Name the file is stored under. Sanitized, unique per store;
    /// uploading the same name again overwrites the previous blob.
    pub storage_name: String,
    /// Name the client supplied. After sanitization these currently
    /// coincide, but the wire format exposes both.
    pub original_name: String,
    pub size_bytes: u64,
    /// Millisecond Unix timestamp assigned at upload time.
    pub uploaded_at: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_id_roundtrip() {
        let id = EntryId::from_millis(1_700_000_000_123);
        let s = id.to_string();
        assert_eq!(s, "1700000000123");
        assert_eq!(s.parse::<EntryId>().unwrap(), id);
    }

    #[test]
    fn test_entry_id_rejects_garbage() {
        assert!("".parse::<EntryId>().is_err());
        assert!("abc".parse::<EntryId>().is_err());
        assert!("-5".parse::<EntryId>().is_err());
        assert!("17.5".parse::<EntryId>().is_err());
    }

    #[test]
    fn test_entry_id_ordering_follows_time() {
        let older = EntryId::from_millis(1000);
        let newer = EntryId::from_millis(1001);
        assert!(newer > older);
    }

    #[test]
    fn test_entry_id_converts_to_wall_clock() {
        let id = EntryId::from_millis(1_700_000_000_123);
        let at = id.timestamp().unwrap();
        assert_eq!(at.timestamp_millis(), 1_700_000_000_123);
        assert!(EntryId::from_millis(0).timestamp().is_some());
    }

    #[test]
    fn test_origin_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&Origin::Interactive).unwrap(),
            "\"interactive\""
        );
        assert_eq!(
            serde_json::to_string(&Origin::Programmatic).unwrap(),
            "\"programmatic\""
        );
    }
}
