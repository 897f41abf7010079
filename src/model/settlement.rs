use serde::{Deserialize, Serialize};

/// A populated place owned by a faction. Feeds the economic system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    pub id: String,
    pub name: String,
    pub owner_faction_id: String,
    #[serde(default)]
    pub population: u64,
    #[serde(default)]
    pub market_tier: u32,
    #[serde(default)]
    pub garrison: u32,
}
