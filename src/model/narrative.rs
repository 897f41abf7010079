use serde::{Deserialize, Serialize};

/// Append-only generated text about what happened to a faction at a tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NarrativeEvent {
    pub id: u64,
    pub tick: u64,
    pub faction_id: String,
    pub text: String,
    /// Unix epoch milliseconds.
    pub created_at: i64,
}
