use std::collections::HashMap;

use super::context::TickContext;
use super::system::SimSystem;
use crate::model::{FactionUpdate, NewTickMetric, Relation, SystemType, keys};
use crate::store::{FactionFilter, MemoryFilter, Store, StoreError};

/// Attitude moved per relation per tick.
const ATTITUDE_STEP: f64 = 1.0;

/// Drifts every relation one step toward its political-memory target, or
/// toward neutral when no memory applies.
pub struct PoliticalSystem;

impl SimSystem for PoliticalSystem {
    fn name(&self) -> &str {
        "political"
    }

    fn tick(&mut self, ctx: &mut TickContext) -> Result<(), StoreError> {
        let tick = ctx.tick;
        let factions = ctx.store.factions(&FactionFilter::all())?;

        let mut global_gap = 0.0;
        let mut global_relations = 0usize;

        for faction in factions.iter().filter(|f| !f.relations.is_empty()) {
            let targets = memory_targets(&*ctx.store, &faction.id, tick)?;

            let mut drift = 0.0;
            let mut gap = 0.0;
            let next: Vec<Relation> = faction
                .relations
                .iter()
                .map(|r| {
                    let target = targets.get(&r.target_faction_id).copied().unwrap_or(0.0);
                    let moved = step_toward(r.attitude, target);
                    drift += (moved - r.attitude).abs();
                    gap += (moved - target).abs();
                    Relation {
                        attitude: moved,
                        ..r.clone()
                    }
                })
                .collect();

            global_gap += gap;
            global_relations += next.len();
            ctx.store
                .update_faction(&faction.id, FactionUpdate::relations(next))?;

            if drift != 0.0 {
                ctx.store.record_metric(NewTickMetric::faction(
                    tick,
                    &faction.id,
                    SystemType::Political,
                    keys::ATTITUDE_DRIFT_ABS,
                    drift,
                ))?;
            }
            ctx.store.record_metric(NewTickMetric::faction(
                tick,
                &faction.id,
                SystemType::Political,
                keys::POLITICAL_EQUILIBRIUM_GAP,
                gap,
            ))?;
        }

        if global_relations > 0 {
            ctx.store.record_metric(NewTickMetric::global(
                tick,
                SystemType::Political,
                keys::GLOBAL_POLITICAL_HEALTH,
                global_gap / global_relations as f64,
            ))?;
        }

        tracing::debug!(tick, relations = global_relations, "political system executed");
        Ok(())
    }
}

/// Sum of non-expired memory modifiers held by `faction_id`, per target faction.
fn memory_targets(
    store: &dyn Store,
    faction_id: &str,
    tick: u64,
) -> Result<HashMap<String, f64>, StoreError> {
    let mut targets: HashMap<String, f64> = HashMap::new();
    for memory in store.political_memories(&MemoryFilter::source(faction_id).active_at(tick))? {
        *targets.entry(memory.target_faction_id).or_default() += memory.modifier_value;
    }
    Ok(targets)
}

/// Move one step from `attitude` toward `target` without passing it.
pub fn step_toward(attitude: f64, target: f64) -> f64 {
    if attitude < target {
        (attitude + ATTITUDE_STEP).min(target)
    } else if attitude > target {
        (attitude - ATTITUDE_STEP).max(target)
    } else {
        attitude
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Faction, NewPoliticalMemory, World};
    use crate::store::MetricFilter;
    use crate::testutil::{faction_with_relations, tick_system};

    #[test]
    fn step_toward_moves_one_unit_without_overshoot() {
        assert_eq!(step_toward(0.0, 20.0), 1.0);
        assert_eq!(step_toward(25.0, 20.0), 24.0);
        assert_eq!(step_toward(20.0, 20.0), 20.0);
        assert_eq!(step_toward(-3.0, 0.0), -2.0);
        assert_eq!(step_toward(0.5, 0.0), 0.0);
        assert_eq!(step_toward(19.5, 20.0), 20.0);
    }

    #[test]
    fn relations_without_memory_drift_to_neutral() {
        let mut world = World::new();
        world
            .insert_faction(faction_with_relations("A", &[("B", -50.0), ("C", 30.0)]))
            .unwrap();
        world.insert_faction(Faction::new("B", "Beta")).unwrap();
        world.insert_faction(Faction::new("C", "Gamma")).unwrap();

        tick_system(&mut world, &mut PoliticalSystem, 1, 0);

        let a = &world.factions["A"];
        assert_eq!(a.relation("B").unwrap().attitude, -49.0);
        assert_eq!(a.relation("C").unwrap().attitude, 29.0);

        let drift = world
            .sum_metrics(&MetricFilter::key(keys::ATTITUDE_DRIFT_ABS).faction("A"))
            .unwrap();
        assert_eq!(drift, 2.0);
        let gap = world
            .sum_metrics(&MetricFilter::key(keys::POLITICAL_EQUILIBRIUM_GAP).faction("A"))
            .unwrap();
        assert_eq!(gap, 49.0 + 29.0);
        let health = world
            .metrics(&MetricFilter::key(keys::GLOBAL_POLITICAL_HEALTH).global())
            .unwrap();
        assert_eq!(health.len(), 1);
        assert_eq!(health[0].value, 39.0);
    }

    #[test]
    fn memories_for_same_target_are_summed() {
        let mut world = World::new();
        world
            .insert_faction(faction_with_relations("A", &[("B", 0.0)]))
            .unwrap();
        world
            .insert_political_memory(NewPoliticalMemory::new("A", "B", "trade", 5.0))
            .unwrap();
        world
            .insert_political_memory(NewPoliticalMemory::new("A", "B", "dynasty", 10.0))
            .unwrap();

        tick_system(&mut world, &mut PoliticalSystem, 1, 0);

        let gap = world
            .sum_metrics(&MetricFilter::key(keys::POLITICAL_EQUILIBRIUM_GAP).faction("A"))
            .unwrap();
        assert_eq!(gap, 14.0);
    }

    #[test]
    fn expired_memory_is_ignored() {
        let mut world = World::new();
        world
            .insert_faction(faction_with_relations("A", &[("B", 5.0)]))
            .unwrap();
        world
            .insert_political_memory(NewPoliticalMemory::new("A", "B", "truce", 50.0).expiring_at(3))
            .unwrap();

        tick_system(&mut world, &mut PoliticalSystem, 2, 0);
        assert_eq!(world.factions["A"].relation("B").unwrap().attitude, 6.0);

        tick_system(&mut world, &mut PoliticalSystem, 3, 0);
        assert_eq!(world.factions["A"].relation("B").unwrap().attitude, 5.0);
    }

    #[test]
    fn equilibrium_emits_gap_but_no_drift() {
        let mut world = World::new();
        world
            .insert_faction(faction_with_relations("A", &[("B", 0.0)]))
            .unwrap();

        tick_system(&mut world, &mut PoliticalSystem, 1, 0);

        assert!(
            world
                .metrics(&MetricFilter::key(keys::ATTITUDE_DRIFT_ABS))
                .unwrap()
                .is_empty()
        );
        let gaps = world
            .metrics(&MetricFilter::key(keys::POLITICAL_EQUILIBRIUM_GAP))
            .unwrap();
        assert_eq!(gaps.len(), 1);
        assert_eq!(gaps[0].value, 0.0);
    }

    #[test]
    fn no_relations_anywhere_skips_global_metric() {
        let mut world = World::new();
        world.insert_faction(Faction::new("A", "Alpha")).unwrap();
        tick_system(&mut world, &mut PoliticalSystem, 1, 0);
        assert!(world.metrics.is_empty());
    }
}
