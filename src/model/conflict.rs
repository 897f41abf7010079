use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum ConflictStatus {
    Active,
    Ceasefire,
    Victory,
}

string_enum!(ConflictStatus {
    Active => "ACTIVE",
    Ceasefire => "CEASEFIRE",
    Victory => "VICTORY",
});

/// How a conflict ended. Both outcomes are reported with status `VICTORY`;
/// the tag keeps a decisive win apart from a negotiated settlement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum ConflictResolution {
    /// One side fell to the victory strength threshold.
    Decisive,
    /// Both sides bled enough that they settled.
    Negotiated,
}

string_enum!(ConflictResolution {
    Decisive => "decisive",
    Negotiated => "negotiated",
});

/// A modeled war between two factions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conflict {
    pub id: u64,
    pub aggressor_faction_id: String,
    pub defender_faction_id: String,
    pub status: ConflictStatus,
    pub start_tick: u64,
    pub last_combat_tick: Option<u64>,
    pub victory_faction_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution: Option<ConflictResolution>,
}

impl Conflict {
    pub fn is_active(&self) -> bool {
        self.status == ConflictStatus::Active
    }

    pub fn involves(&self, faction_id: &str) -> bool {
        self.aggressor_faction_id == faction_id || self.defender_faction_id == faction_id
    }

    /// True if this conflict is between `a` and `b` in either direction.
    pub fn is_between(&self, a: &str, b: &str) -> bool {
        (self.aggressor_faction_id == a && self.defender_faction_id == b)
            || (self.aggressor_faction_id == b && self.defender_faction_id == a)
    }

    /// Ticks of war as of `tick`, never less than one.
    pub fn duration_at(&self, tick: u64) -> u64 {
        tick.saturating_sub(self.start_tick).max(1)
    }
}

/// A conflict that has not been assigned an id yet. Always starts `ACTIVE`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewConflict {
    pub aggressor_faction_id: String,
    pub defender_faction_id: String,
    pub start_tick: u64,
}

impl NewConflict {
    pub fn with_id(self, id: u64) -> Conflict {
        Conflict {
            id,
            aggressor_faction_id: self.aggressor_faction_id,
            defender_faction_id: self.defender_faction_id,
            status: ConflictStatus::Active,
            start_tick: self.start_tick,
            last_combat_tick: None,
            victory_faction_id: None,
            resolution: None,
        }
    }
}
