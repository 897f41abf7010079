//! Read-only listing for external readers (API gateway, dashboards).
//!
//! Every list is capped and ordered newest-first: by tick, then by creation.

use super::{ConflictFilter, FactionFilter, MetricFilter, NarrativeFilter, Store, StoreError};
use crate::model::{Conflict, Faction, NarrativeEvent, TickMetric};

pub const DEFAULT_LIST_LIMIT: usize = 200;
pub const MAX_LIST_LIMIT: usize = 500;

/// Clamp a caller-requested limit into `1..=MAX_LIST_LIMIT`.
pub fn effective_limit(requested: Option<usize>) -> usize {
    requested
        .unwrap_or(DEFAULT_LIST_LIMIT)
        .clamp(1, MAX_LIST_LIMIT)
}

pub fn list_factions(
    store: &dyn Store,
    limit: Option<usize>,
) -> Result<Vec<Faction>, StoreError> {
    let mut factions = store.factions(&FactionFilter::all())?;
    factions.truncate(effective_limit(limit));
    Ok(factions)
}

pub fn get_faction(store: &dyn Store, id: &str) -> Result<Option<Faction>, StoreError> {
    store.faction(id)
}

/// Conflicts ordered by most recent combat (or start, if none yet).
pub fn list_conflicts(
    store: &dyn Store,
    filter: &ConflictFilter,
    limit: Option<usize>,
) -> Result<Vec<Conflict>, StoreError> {
    let mut conflicts = store.conflicts(filter)?;
    conflicts.sort_by(|a, b| {
        let ta = a.last_combat_tick.unwrap_or(a.start_tick);
        let tb = b.last_combat_tick.unwrap_or(b.start_tick);
        tb.cmp(&ta).then(b.id.cmp(&a.id))
    });
    conflicts.truncate(effective_limit(limit));
    Ok(conflicts)
}

pub fn list_metrics(
    store: &dyn Store,
    filter: &MetricFilter,
    limit: Option<usize>,
) -> Result<Vec<TickMetric>, StoreError> {
    let mut metrics = store.metrics(filter)?;
    metrics.sort_by(|a, b| {
        b.tick
            .cmp(&a.tick)
            .then(b.created_at.cmp(&a.created_at))
            .then(b.id.cmp(&a.id))
    });
    metrics.truncate(effective_limit(limit));
    Ok(metrics)
}

pub fn list_narratives(
    store: &dyn Store,
    filter: &NarrativeFilter,
    limit: Option<usize>,
) -> Result<Vec<NarrativeEvent>, StoreError> {
    let mut events = store.narratives(filter)?;
    events.sort_by(|a, b| {
        b.tick
            .cmp(&a.tick)
            .then(b.created_at.cmp(&a.created_at))
            .then(b.id.cmp(&a.id))
    });
    events.truncate(effective_limit(limit));
    Ok(events)
}
