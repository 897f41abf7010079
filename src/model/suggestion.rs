use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum SuggestionStatus {
    Pending,
    Processed,
}

string_enum!(SuggestionStatus {
    Pending => "pending",
    Processed => "processed",
});

/// An externally submitted instruction for a faction, consumed by the event system.
///
/// Transitions `pending -> processed` exactly once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    pub id: u64,
    pub faction_id: String,
    pub tick: u64,
    pub text: String,
    pub status: SuggestionStatus,
    /// Unix epoch milliseconds.
    pub created_at: i64,
    pub processed_at: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSuggestion {
    pub faction_id: String,
    #[serde(default)]
    pub tick: u64,
    pub text: String,
}

impl NewSuggestion {
    pub fn new(faction_id: impl Into<String>, tick: u64, text: impl Into<String>) -> Self {
        Self {
            faction_id: faction_id.into(),
            tick,
            text: text.into(),
        }
    }

    pub fn with_id(self, id: u64, created_at: i64) -> Suggestion {
        Suggestion {
            id,
            faction_id: self.faction_id,
            tick: self.tick,
            text: self.text,
            status: SuggestionStatus::Pending,
            created_at,
            processed_at: None,
        }
    }
}
