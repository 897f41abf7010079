//! Storage seam shared by every simulation system.
//!
//! Systems never reach into a concrete backend; they receive a `&mut dyn Store`
//! through the tick context. `World` is the in-memory implementation.

mod filter;
mod index;
mod memory;
pub mod query;

use thiserror::Error;

pub(crate) use index::MetricIndex;

pub use filter::{
    ConflictFilter, FactionFilter, FactionScope, MemoryFilter, MetricFilter, NarrativeFilter,
};

use crate::model::{
    Conflict, Faction, FactionUpdate, NarrativeEvent, NewConflict, NewPoliticalMemory,
    NewSuggestion, NewTickMetric, PoliticalMemory, Settlement, Suggestion, TickMetric,
};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("faction {0} not found")]
    FactionNotFound(String),
    #[error("faction {0} already exists")]
    DuplicateFaction(String),
    #[error("conflict {0} not found")]
    ConflictNotFound(u64),
    #[error("an active conflict between {0} and {1} already exists")]
    DuplicateActiveConflict(String, String),
    #[error(
        "political memory ({source_faction_id} -> {target_faction_id}, {factor_key}) already exists"
    )]
    DuplicatePoliticalMemory {
        source_faction_id: String,
        target_faction_id: String,
        factor_key: String,
    },
    #[error("suggestion {0} not found")]
    SuggestionNotFound(u64),
    #[error("suggestion {0} was already processed")]
    SuggestionAlreadyProcessed(u64),
}

/// Read/write access to the persisted world.
///
/// Record-returning methods yield every match in creation order; the bounded,
/// newest-first listing used by external readers lives in [`query`].
pub trait Store {
    // -- World clock --

    fn current_tick(&self) -> Result<u64, StoreError>;

    /// Advance the clock by `count` and return the new tick.
    fn advance_clock(&mut self, count: u64) -> Result<u64, StoreError>;

    // -- Factions --

    fn faction(&self, id: &str) -> Result<Option<Faction>, StoreError>;

    fn factions(&self, filter: &FactionFilter) -> Result<Vec<Faction>, StoreError>;

    fn insert_faction(&mut self, faction: Faction) -> Result<(), StoreError>;

    fn update_faction(&mut self, id: &str, update: FactionUpdate) -> Result<(), StoreError>;

    /// Sum of `military_strength` over all factions.
    fn total_military_strength(&self) -> Result<f64, StoreError>;

    // -- Settlements --

    fn settlements_owned_by(&self, faction_id: &str) -> Result<Vec<Settlement>, StoreError>;

    // -- Political memory --

    /// Fails with `DuplicatePoliticalMemory` if the (source, target, factor) key exists.
    fn insert_political_memory(&mut self, memory: NewPoliticalMemory) -> Result<u64, StoreError>;

    fn political_memories(&self, filter: &MemoryFilter)
    -> Result<Vec<PoliticalMemory>, StoreError>;

    // -- Conflicts --

    /// Fails with `DuplicateActiveConflict` if the pair is already at war.
    fn insert_conflict(&mut self, conflict: NewConflict) -> Result<u64, StoreError>;

    fn conflict(&self, id: u64) -> Result<Option<Conflict>, StoreError>;

    fn conflicts(&self, filter: &ConflictFilter) -> Result<Vec<Conflict>, StoreError>;

    fn count_conflicts(&self, filter: &ConflictFilter) -> Result<usize, StoreError>;

    /// Overwrite status, combat tick and outcome of an existing conflict.
    fn update_conflict(&mut self, conflict: &Conflict) -> Result<(), StoreError>;

    // -- Metrics --

    fn record_metric(&mut self, metric: NewTickMetric) -> Result<u64, StoreError>;

    fn metrics(&self, filter: &MetricFilter) -> Result<Vec<TickMetric>, StoreError>;

    fn sum_metrics(&self, filter: &MetricFilter) -> Result<f64, StoreError>;

    // -- Narratives --

    fn record_narrative(
        &mut self,
        tick: u64,
        faction_id: &str,
        text: String,
    ) -> Result<u64, StoreError>;

    fn narratives(&self, filter: &NarrativeFilter) -> Result<Vec<NarrativeEvent>, StoreError>;

    // -- Suggestions --

    fn insert_suggestion(&mut self, suggestion: NewSuggestion) -> Result<u64, StoreError>;

    fn suggestion(&self, id: u64) -> Result<Option<Suggestion>, StoreError>;

    /// Up to `limit` pending suggestions, oldest first.
    fn pending_suggestions(&self, limit: usize) -> Result<Vec<Suggestion>, StoreError>;

    /// Mark a pending suggestion processed, stamping the processing time.
    fn mark_suggestion_processed(&mut self, id: u64) -> Result<(), StoreError>;
}
