use serde::{Deserialize, Serialize};

/// A persistent bias pulling `source`'s attitude toward `target` to a value.
///
/// Unique per `(source_faction_id, target_faction_id, factor_key)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoliticalMemory {
    pub id: u64,
    pub source_faction_id: String,
    pub target_faction_id: String,
    pub factor_key: String,
    pub modifier_value: f64,
    pub is_static: bool,
    pub expires_at_tick: Option<u64>,
}

impl PoliticalMemory {
    /// Memories expire once the tick reaches `expires_at_tick`.
    pub fn is_active_at(&self, tick: u64) -> bool {
        self.expires_at_tick.is_none_or(|t| t > tick)
    }

    pub fn key(&self) -> (&str, &str, &str) {
        (
            &self.source_faction_id,
            &self.target_faction_id,
            &self.factor_key,
        )
    }
}

/// A political memory that has not been assigned an id yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPoliticalMemory {
    pub source_faction_id: String,
    pub target_faction_id: String,
    pub factor_key: String,
    pub modifier_value: f64,
    #[serde(default)]
    pub is_static: bool,
    #[serde(default)]
    pub expires_at_tick: Option<u64>,
}

impl NewPoliticalMemory {
    pub fn new(
        source: impl Into<String>,
        target: impl Into<String>,
        factor_key: impl Into<String>,
        modifier_value: f64,
    ) -> Self {
        Self {
            source_faction_id: source.into(),
            target_faction_id: target.into(),
            factor_key: factor_key.into(),
            modifier_value,
            is_static: true,
            expires_at_tick: None,
        }
    }

    pub fn expiring_at(mut self, tick: u64) -> Self {
        self.is_static = false;
        self.expires_at_tick = Some(tick);
        self
    }

    pub fn with_id(self, id: u64) -> PoliticalMemory {
        PoliticalMemory {
            id,
            source_faction_id: self.source_faction_id,
            target_faction_id: self.target_faction_id,
            factor_key: self.factor_key,
            modifier_value: self.modifier_value,
            is_static: self.is_static,
            expires_at_tick: self.expires_at_tick,
        }
    }
}
