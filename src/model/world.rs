use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use super::conflict::Conflict;
use super::faction::Faction;
use super::memory::{NewPoliticalMemory, PoliticalMemory};
use super::metric::TickMetric;
use super::narrative::NarrativeEvent;
use super::settlement::Settlement;
use super::suggestion::{NewSuggestion, Suggestion};
use crate::id::IdGenerator;
use crate::store::{MetricIndex, Store, StoreError};

/// The complete in-memory world: the default `Store` implementation.
///
/// Factions and settlements are keyed by their external string ids. Every
/// other record gets an id from the shared `IdGenerator`, so ids are unique
/// across tables and increase in creation order.
#[derive(Debug, Default)]
pub struct World {
    pub current_tick: u64,
    pub factions: BTreeMap<String, Faction>,
    pub settlements: BTreeMap<String, Settlement>,
    pub political_memories: BTreeMap<u64, PoliticalMemory>,
    pub conflicts: BTreeMap<u64, Conflict>,
    pub metrics: Vec<TickMetric>,
    pub narratives: Vec<NarrativeEvent>,
    pub suggestions: BTreeMap<u64, Suggestion>,
    pub id_gen: IdGenerator,
    pub(crate) metric_index: MetricIndex,
}

/// JSON document produced by seeding/import tooling.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldSeed {
    pub current_tick: u64,
    pub factions: Vec<Faction>,
    pub settlements: Vec<Settlement>,
    pub political_memories: Vec<NewPoliticalMemory>,
    pub suggestions: Vec<NewSuggestion>,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a world from a seed, enforcing the same constraints as live inserts
    /// (unique faction ids, unique political-memory keys).
    pub fn from_seed(seed: WorldSeed) -> Result<Self, StoreError> {
        let mut world = World::new();
        world.current_tick = seed.current_tick;
        for faction in seed.factions {
            world.insert_faction(faction)?;
        }
        for settlement in seed.settlements {
            world
                .settlements
                .insert(settlement.id.clone(), settlement);
        }
        for memory in seed.political_memories {
            world.insert_political_memory(memory)?;
        }
        for suggestion in seed.suggestions {
            world.insert_suggestion(suggestion)?;
        }
        Ok(world)
    }

    /// Bring the per-tick metric index up to date with `metrics`.
    ///
    /// Only needed after rows are pushed onto `metrics` directly; `record_metric`
    /// keeps the index current on its own.
    pub fn reindex_metrics(&mut self) {
        self.metric_index.catch_up(&self.metrics);
    }

    /// Re-seat the id generator past every id already present.
    ///
    /// Needed after rows are inserted with pre-assigned ids (e.g. loaded from Postgres).
    pub fn sync_id_gen(&mut self) {
        let ids = self
            .political_memories
            .keys()
            .chain(self.conflicts.keys())
            .chain(self.suggestions.keys())
            .copied()
            .chain(self.metrics.iter().map(|m| m.id))
            .chain(self.narratives.iter().map(|n| n.id));
        for id in ids {
            self.id_gen.advance_past(id);
        }
    }
}

/// Wall-clock creation stamp in Unix epoch milliseconds.
pub(crate) fn unix_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}
