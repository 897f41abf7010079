use super::config::EventConfig;
use super::context::{SubsystemError, TickContext};
use super::system::SimSystem;
use crate::ai::{NarrativeRequest, Narrator, TemplateNarrator};
use crate::model::{
    Conflict, ConflictStatus, FactionUpdate, NewTickMetric, PoliticalMemory, Suggestion,
    SystemType, keys,
};
use crate::store::{ConflictFilter, MemoryFilter, StoreError};

/// Consumes pending suggestions and narrates conflicts that ended this tick.
pub struct EventSystem {
    config: EventConfig,
    narrator: Box<dyn Narrator>,
}

impl EventSystem {
    pub fn new(config: EventConfig) -> Self {
        Self::with_narrator(config, Box::new(TemplateNarrator))
    }

    pub fn with_narrator(config: EventConfig, narrator: Box<dyn Narrator>) -> Self {
        Self { config, narrator }
    }

    pub fn set_narrator(&mut self, narrator: Box<dyn Narrator>) {
        self.narrator = narrator;
    }

    fn apply_suggestion(
        &mut self,
        ctx: &mut TickContext,
        suggestion: &Suggestion,
    ) -> Result<(), SubsystemError> {
        let tick = ctx.tick;
        let faction = ctx.store.faction(&suggestion.faction_id)?;

        if let Some(faction) = &faction {
            let before = faction.stability;
            let after = (before * self.config.stability_bump).min(self.config.stability_cap);
            ctx.store
                .update_faction(&faction.id, FactionUpdate::stability(after))?;
            ctx.store.record_metric(NewTickMetric::faction(
                tick,
                &faction.id,
                SystemType::Event,
                keys::STABILITY_CHANGE,
                after - before,
            ))?;
        }
        // Processed before narration so a narrative failure can't replay the suggestion
        ctx.store.mark_suggestion_processed(suggestion.id)?;

        let request = NarrativeRequest {
            faction_id: suggestion.faction_id.clone(),
            faction_name: faction
                .map(|f| f.name)
                .unwrap_or_else(|| suggestion.faction_id.clone()),
            tick,
            summary: suggestion.text.clone(),
        };
        let mut text = match self.narrator.generate_narrative(&request) {
            Ok(text) => text,
            Err(err) => {
                ctx.isolate(self.name(), Some(&suggestion.faction_id), &err);
                TemplateNarrator.generate_narrative(&request)?
            }
        };

        if let Some(memory) = strongest_static_memory(ctx, &suggestion.faction_id)? {
            text.push(' ');
            text.push_str(&format!(
                "Relations with {} held steady through {} (+{}).",
                memory.target_faction_id, memory.factor_key, memory.modifier_value
            ));
        }
        ctx.store
            .record_narrative(tick, &suggestion.faction_id, text)?;
        Ok(())
    }
}

impl SimSystem for EventSystem {
    fn name(&self) -> &str {
        "event"
    }

    fn tick(&mut self, ctx: &mut TickContext) -> Result<(), StoreError> {
        let tick = ctx.tick;

        let pending = ctx
            .store
            .pending_suggestions(self.config.suggestions_per_tick)?;
        for suggestion in &pending {
            if let Err(err) = self.apply_suggestion(ctx, suggestion) {
                ctx.isolate(self.name(), Some(&suggestion.faction_id), err);
            }
        }

        let resolved = ctx.store.conflicts(&ConflictFilter::resolved_at(tick))?;
        for conflict in &resolved {
            if let Err(err) = narrate_resolution(ctx, conflict) {
                ctx.isolate(self.name(), Some(&conflict.aggressor_faction_id), err);
            }
        }

        tracing::debug!(
            tick,
            suggestions = pending.len(),
            resolved = resolved.len(),
            "event system executed"
        );
        Ok(())
    }
}

fn strongest_static_memory(
    ctx: &TickContext,
    faction_id: &str,
) -> Result<Option<PoliticalMemory>, StoreError> {
    let memories = ctx
        .store
        .political_memories(&MemoryFilter::source(faction_id).static_only())?;
    Ok(memories
        .into_iter()
        .max_by(|a, b| a.modifier_value.total_cmp(&b.modifier_value)))
}

/// Text describing how a conflict ended after `duration` ticks.
pub fn resolution_text(
    conflict: &Conflict,
    aggressor_name: &str,
    defender_name: &str,
    tick: u64,
) -> String {
    let duration = conflict.duration_at(tick);
    let winner = conflict.victory_faction_id.as_deref();
    let outcome = match (conflict.status, winner) {
        (ConflictStatus::Victory, Some(id)) if id == conflict.aggressor_faction_id => {
            format!("{aggressor_name} declared victory over {defender_name}")
        }
        (ConflictStatus::Victory, Some(_)) => {
            format!("{defender_name} declared victory over {aggressor_name}")
        }
        _ => format!("Ceasefire between {aggressor_name} and {defender_name}"),
    };
    format!("{outcome} after {duration} tick(s) of war.")
}

fn narrate_resolution(ctx: &mut TickContext, conflict: &Conflict) -> Result<(), StoreError> {
    let name_of = |id: &str| -> Result<String, StoreError> {
        Ok(ctx
            .store
            .faction(id)?
            .map(|f| f.name)
            .unwrap_or_else(|| id.to_string()))
    };
    let aggressor = name_of(&conflict.aggressor_faction_id)?;
    let defender = name_of(&conflict.defender_faction_id)?;
    let text = resolution_text(conflict, &aggressor, &defender, ctx.tick);

    ctx.store
        .record_narrative(ctx.tick, &conflict.aggressor_faction_id, text.clone())?;
    ctx.store
        .record_narrative(ctx.tick, &conflict.defender_faction_id, text)?;
    Ok(())
}
