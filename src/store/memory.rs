use super::{
    ConflictFilter, FactionFilter, MemoryFilter, MetricFilter, NarrativeFilter, Store, StoreError,
};
use crate::model::world::unix_millis;
use crate::model::{
    Conflict, Faction, FactionUpdate, NarrativeEvent, NewConflict, NewPoliticalMemory,
    NewSuggestion, NewTickMetric, PoliticalMemory, Settlement, Suggestion, SuggestionStatus,
    TickMetric, World,
};

impl Store for World {
    fn current_tick(&self) -> Result<u64, StoreError> {
        Ok(self.current_tick)
    }

    fn advance_clock(&mut self, count: u64) -> Result<u64, StoreError> {
        self.current_tick = self.current_tick.saturating_add(count);
        Ok(self.current_tick)
    }

    fn faction(&self, id: &str) -> Result<Option<Faction>, StoreError> {
        Ok(self.factions.get(id).cloned())
    }

    fn factions(&self, filter: &FactionFilter) -> Result<Vec<Faction>, StoreError> {
        Ok(self
            .factions
            .values()
            .filter(|f| filter.matches(f))
            .cloned()
            .collect())
    }

    fn insert_faction(&mut self, faction: Faction) -> Result<(), StoreError> {
        if self.factions.contains_key(&faction.id) {
            return Err(StoreError::DuplicateFaction(faction.id));
        }
        self.factions.insert(faction.id.clone(), faction);
        Ok(())
    }

    fn update_faction(&mut self, id: &str, update: FactionUpdate) -> Result<(), StoreError> {
        let faction = self
            .factions
            .get_mut(id)
            .ok_or_else(|| StoreError::FactionNotFound(id.to_string()))?;
        update.apply(faction);
        Ok(())
    }

    fn total_military_strength(&self) -> Result<f64, StoreError> {
        Ok(self.factions.values().map(|f| f.military_strength).sum())
    }

    fn settlements_owned_by(&self, faction_id: &str) -> Result<Vec<Settlement>, StoreError> {
        Ok(self
            .settlements
            .values()
            .filter(|s| s.owner_faction_id == faction_id)
            .cloned()
            .collect())
    }

    fn insert_political_memory(&mut self, memory: NewPoliticalMemory) -> Result<u64, StoreError> {
        let duplicate = self.political_memories.values().any(|m| {
            m.key()
                == (
                    memory.source_faction_id.as_str(),
                    memory.target_faction_id.as_str(),
                    memory.factor_key.as_str(),
                )
        });
        if duplicate {
            return Err(StoreError::DuplicatePoliticalMemory {
                source_faction_id: memory.source_faction_id,
                target_faction_id: memory.target_faction_id,
                factor_key: memory.factor_key,
            });
        }
        let id = self.id_gen.next_id();
        self.political_memories.insert(id, memory.with_id(id));
        Ok(id)
    }

    fn political_memories(
        &self,
        filter: &MemoryFilter,
    ) -> Result<Vec<PoliticalMemory>, StoreError> {
        Ok(self
            .political_memories
            .values()
            .filter(|m| filter.matches(m))
            .cloned()
            .collect())
    }

    fn insert_conflict(&mut self, conflict: NewConflict) -> Result<u64, StoreError> {
        let at_war = self.conflicts.values().any(|c| {
            c.is_active()
                && c.is_between(&conflict.aggressor_faction_id, &conflict.defender_faction_id)
        });
        if at_war {
            return Err(StoreError::DuplicateActiveConflict(
                conflict.aggressor_faction_id,
                conflict.defender_faction_id,
            ));
        }
        let id = self.id_gen.next_id();
        self.conflicts.insert(id, conflict.with_id(id));
        Ok(id)
    }

    fn conflict(&self, id: u64) -> Result<Option<Conflict>, StoreError> {
        Ok(self.conflicts.get(&id).cloned())
    }

    fn conflicts(&self, filter: &ConflictFilter) -> Result<Vec<Conflict>, StoreError> {
        Ok(self
            .conflicts
            .values()
            .filter(|c| filter.matches(c))
            .cloned()
            .collect())
    }

    fn count_conflicts(&self, filter: &ConflictFilter) -> Result<usize, StoreError> {
        Ok(self.conflicts.values().filter(|c| filter.matches(c)).count())
    }

    fn update_conflict(&mut self, conflict: &Conflict) -> Result<(), StoreError> {
        let stored = self
            .conflicts
            .get_mut(&conflict.id)
            .ok_or(StoreError::ConflictNotFound(conflict.id))?;
        stored.status = conflict.status;
        stored.last_combat_tick = conflict.last_combat_tick;
        stored.victory_faction_id = conflict.victory_faction_id.clone();
        stored.resolution = conflict.resolution;
        Ok(())
    }

    fn record_metric(&mut self, metric: NewTickMetric) -> Result<u64, StoreError> {
        let id = self.id_gen.next_id();
        self.metrics.push(metric.with_id(id, unix_millis()));
        self.metric_index.catch_up(&self.metrics);
        Ok(id)
    }

    fn metrics(&self, filter: &MetricFilter) -> Result<Vec<TickMetric>, StoreError> {
        Ok(self
            .metric_index
            .candidates(&self.metrics, filter.from_tick, filter.to_tick)
            .into_iter()
            .filter(|m| filter.matches(m))
            .cloned()
            .collect())
    }

    fn sum_metrics(&self, filter: &MetricFilter) -> Result<f64, StoreError> {
        Ok(self
            .metric_index
            .candidates(&self.metrics, filter.from_tick, filter.to_tick)
            .into_iter()
            .filter(|m| filter.matches(m))
            .map(|m| m.value)
            .sum())
    }

    fn record_narrative(
        &mut self,
        tick: u64,
        faction_id: &str,
        text: String,
    ) -> Result<u64, StoreError> {
        let id = self.id_gen.next_id();
        self.narratives.push(NarrativeEvent {
            id,
            tick,
            faction_id: faction_id.to_string(),
            text,
            created_at: unix_millis(),
        });
        Ok(id)
    }

    fn narratives(&self, filter: &NarrativeFilter) -> Result<Vec<NarrativeEvent>, StoreError> {
        Ok(self
            .narratives
            .iter()
            .filter(|n| filter.matches(n))
            .cloned()
            .collect())
    }

    fn insert_suggestion(&mut self, suggestion: NewSuggestion) -> Result<u64, StoreError> {
        let id = self.id_gen.next_id();
        self.suggestions
            .insert(id, suggestion.with_id(id, unix_millis()));
        Ok(id)
    }

    fn suggestion(&self, id: u64) -> Result<Option<Suggestion>, StoreError> {
        Ok(self.suggestions.get(&id).cloned())
    }

    fn pending_suggestions(&self, limit: usize) -> Result<Vec<Suggestion>, StoreError> {
        let mut pending: Vec<Suggestion> = self
            .suggestions
            .values()
            .filter(|s| s.status == SuggestionStatus::Pending)
            .cloned()
            .collect();
        // Ids increase with insertion, so they break same-millisecond ties.
        pending.sort_by_key(|s| (s.created_at, s.id));
        pending.truncate(limit);
        Ok(pending)
    }

    fn mark_suggestion_processed(&mut self, id: u64) -> Result<(), StoreError> {
        let suggestion = self
            .suggestions
            .get_mut(&id)
            .ok_or(StoreError::SuggestionNotFound(id))?;
        if suggestion.status == SuggestionStatus::Processed {
            return Err(StoreError::SuggestionAlreadyProcessed(id));
        }
        suggestion.status = SuggestionStatus::Processed;
        suggestion.processed_at = Some(unix_millis());
        Ok(())
    }
}
