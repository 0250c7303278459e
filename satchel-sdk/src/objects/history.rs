use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// A single entry in the wallet's audit history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: Uuid,
    pub description: CompactString,
    #[serde(with = "time::serde::rfc3339")]
    pub created: OffsetDateTime,
}

impl HistoryEntry {
    /// Create an entry stamped with the current time.
    pub fn now(description: impl Into<CompactString>) -> Self {
        Self {
            id: Uuid::now_v7(),
            description: description.into(),
            created: OffsetDateTime::now_utc(),
        }
    }
}
