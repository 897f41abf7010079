use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use rand::Rng;

use super::config::WarConfig;
use super::context::TickContext;
use super::system::SimSystem;
use crate::model::{
    Conflict, ConflictResolution, ConflictStatus, FactionUpdate, NewConflict, NewTickMetric,
    SystemType, keys,
};
use crate::store::{ConflictFilter, FactionFilter, MetricFilter, StoreError};

/// Starts wars out of hostile relations and fights one combat round per
/// active conflict each tick.
pub struct WarSystem {
    config: WarConfig,
}

impl WarSystem {
    pub fn new(config: WarConfig) -> Self {
        Self { config }
    }
}

impl SimSystem for WarSystem {
    fn name(&self) -> &str {
        "war"
    }

    fn tick(&mut self, ctx: &mut TickContext) -> Result<(), StoreError> {
        let started = initiate_conflicts(ctx, &self.config)?;
        let fought = resolve_combat(ctx, &self.config)?;
        tracing::debug!(tick = ctx.tick, started, fought, "war system executed");
        Ok(())
    }
}

/// Unordered pair key: (a, b) and (b, a) map to the same entry.
fn pair_key(a: &str, b: &str) -> (String, String) {
    if a <= b {
        (a.to_string(), b.to_string())
    } else {
        (b.to_string(), a.to_string())
    }
}

// --- Phase 1: Initiation ---

fn initiate_conflicts(ctx: &mut TickContext, cfg: &WarConfig) -> Result<usize, StoreError> {
    let tick = ctx.tick;
    let mut blocked: HashSet<(String, String)> = ctx
        .store
        .conflicts(&ConflictFilter::active())?
        .iter()
        .map(|c| pair_key(&c.aggressor_faction_id, &c.defender_faction_id))
        .collect();

    let factions = ctx.store.factions(&FactionFilter::all())?;
    let known: HashSet<&str> = factions.iter().map(|f| f.id.as_str()).collect();

    let mut started = 0usize;
    for faction in &factions {
        for rel in &faction.relations {
            let target = rel.target_faction_id.as_str();
            if target == faction.id || !known.contains(target) {
                continue;
            }
            if rel.attitude >= cfg.initiation_attitude_threshold {
                continue;
            }
            let key = pair_key(&faction.id, target);
            if blocked.contains(&key) {
                continue;
            }
            if ctx.rng.random_range(0.0..1.0) >= cfg.initiation_probability {
                continue;
            }

            let conflict_id = ctx.store.insert_conflict(NewConflict {
                aggressor_faction_id: faction.id.clone(),
                defender_faction_id: target.to_string(),
                start_tick: tick,
            })?;
            // Block immediately so the reverse relation can't open a second war this pass
            blocked.insert(key);
            started += 1;

            ctx.store.record_metric(NewTickMetric::faction(
                tick,
                &faction.id,
                SystemType::War,
                keys::CONFLICT_STARTED,
                1.0,
            ))?;
            tracing::info!(
                conflict_id,
                aggressor = %faction.id,
                defender = target,
                attitude = rel.attitude,
                tick,
                "conflict started"
            );
        }
    }

    if started > 0 {
        ctx.store.record_metric(NewTickMetric::global(
            tick,
            SystemType::War,
            keys::CONFLICTS_STARTED_TOTAL,
            started as f64,
        ))?;
    }
    Ok(started)
}

// --- Phase 2: Combat ---

/// Casualties assigned to each side in one combat round.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CombatRound {
    pub aggressor_casualties: f64,
    pub defender_casualties: f64,
}

/// Casualties for one round between the given pre-combat strengths.
///
/// The weaker side always loses at least one unit; on equal strength the
/// aggressor takes the weaker side's losses.
pub fn combat_round(aggressor: f64, defender: f64, cfg: &WarConfig) -> CombatRound {
    let weaker = aggressor.min(defender);
    let base = weaker * cfg.base_casualty_rate;
    let weaker_cas = base.floor().max(1.0);
    let stronger_cas = (base * cfg.stronger_side_casualty_factor).floor().max(0.0);

    CombatRound {
        aggressor_casualties: if aggressor <= defender {
            weaker_cas
        } else {
            stronger_cas
        },
        defender_casualties: if defender < aggressor {
            weaker_cas
        } else {
            stronger_cas
        },
    }
}

/// Side with strictly more remaining strength, `None` on a tie.
fn stronger_side(conflict: &Conflict, aggressor: f64, defender: f64) -> Option<String> {
    if aggressor > defender {
        Some(conflict.aggressor_faction_id.clone())
    } else if defender > aggressor {
        Some(conflict.defender_faction_id.clone())
    } else {
        None
    }
}

fn resolve_combat(ctx: &mut TickContext, cfg: &WarConfig) -> Result<usize, StoreError> {
    let tick = ctx.tick;
    let conflicts = ctx.store.conflicts(&ConflictFilter::active())?;
    if conflicts.is_empty() {
        return Ok(0);
    }

    let factions = ctx.store.factions(&FactionFilter::all())?;
    let mut strength: HashMap<String, f64> = factions
        .iter()
        .map(|f| (f.id.clone(), f.military_strength))
        .collect();
    let mut treasury: HashMap<String, f64> = factions
        .iter()
        .map(|f| (f.id.clone(), f.treasury))
        .collect();

    let mut casualties: BTreeMap<String, f64> = BTreeMap::new();
    let mut costs: BTreeMap<String, f64> = BTreeMap::new();
    let mut touched: BTreeSet<String> = BTreeSet::new();
    let mut fought = 0usize;

    for mut conflict in conflicts {
        let a_id = conflict.aggressor_faction_id.clone();
        let d_id = conflict.defender_faction_id.clone();
        let (Some(&a_str), Some(&d_str)) = (strength.get(&a_id), strength.get(&d_id)) else {
            tracing::warn!(
                conflict_id = conflict.id,
                aggressor = %a_id,
                defender = %d_id,
                "conflict references an unknown faction; skipping combat"
            );
            continue;
        };
        fought += 1;
        conflict.last_combat_tick = Some(tick);

        if a_str <= 0.0 && d_str <= 0.0 {
            // Nothing left to fight with on either side
            conclude(ctx, &mut conflict, None, ConflictResolution::Decisive)?;
            ctx.store.update_conflict(&conflict)?;
            continue;
        }

        let round = combat_round(a_str, d_str, cfg);
        let a_now = (a_str - round.aggressor_casualties).max(0.0);
        let d_now = (d_str - round.defender_casualties).max(0.0);
        strength.insert(a_id.clone(), a_now);
        strength.insert(d_id.clone(), d_now);
        *casualties.entry(a_id.clone()).or_default() += round.aggressor_casualties;
        *casualties.entry(d_id.clone()).or_default() += round.defender_casualties;

        // Cost is capped at the current treasury, so a side already in debt ends at zero
        for (id, pre_strength) in [(&a_id, a_str), (&d_id, d_str)] {
            let current = treasury.get(id).copied().unwrap_or(0.0);
            let cost = (pre_strength * cfg.treasury_war_cost_per_strength)
                .round()
                .min(current);
            if let Some(t) = treasury.get_mut(id) {
                *t -= cost;
            }
            *costs.entry(id.clone()).or_default() += cost;
        }
        touched.insert(a_id.clone());
        touched.insert(d_id.clone());

        if a_now <= cfg.victory_strength_threshold || d_now <= cfg.victory_strength_threshold {
            let winner = stronger_side(&conflict, a_now, d_now);
            conclude(ctx, &mut conflict, winner, ConflictResolution::Decisive)?;
        } else if ctx.rng.random_range(0.0..1.0) < cfg.resolution_check_probability {
            let combined_loss = (a_str - a_now) + (d_str - d_now);
            let combined_start = a_str + d_str;
            if combined_start > 0.0 && combined_loss / combined_start > cfg.negotiated_loss_ratio {
                let winner = stronger_side(&conflict, a_now, d_now);
                conclude(ctx, &mut conflict, winner, ConflictResolution::Negotiated)?;
            }
        }
        ctx.store.update_conflict(&conflict)?;
    }

    for id in &touched {
        ctx.store.update_faction(
            id,
            FactionUpdate {
                military_strength: strength.get(id).copied(),
                treasury: treasury.get(id).copied(),
                ..FactionUpdate::default()
            },
        )?;
    }
    for (id, cas) in &casualties {
        if *cas > 0.0 {
            ctx.store.record_metric(NewTickMetric::faction(
                tick,
                id,
                SystemType::War,
                keys::WAR_CASUALTIES,
                *cas,
            ))?;
        }
    }
    for (id, cost) in &costs {
        if *cost > 0.0 {
            ctx.store.record_metric(NewTickMetric::faction(
                tick,
                id,
                SystemType::War,
                keys::WAR_TREASURY_COST,
                *cost,
            ))?;
        }
    }

    let recent_casualties = ctx.store.sum_metrics(
        &MetricFilter::key(keys::WAR_CASUALTIES)
            .system(SystemType::War)
            .window(tick, cfg.risk_window_ticks),
    )?;
    let total_strength = ctx.store.total_military_strength()?.max(1.0);
    ctx.store.record_metric(NewTickMetric::global(
        tick,
        SystemType::War,
        keys::GLOBAL_RISK_INTENSITY,
        recent_casualties / total_strength,
    ))?;

    Ok(fought)
}

/// Mark a conflict resolved. The status is `VICTORY` for both decisive and
/// negotiated endings; `resolution` records which.
fn conclude(
    ctx: &mut TickContext,
    conflict: &mut Conflict,
    winner: Option<String>,
    resolution: ConflictResolution,
) -> Result<(), StoreError> {
    conflict.status = ConflictStatus::Victory;
    conflict.resolution = Some(resolution);
    conflict.victory_faction_id = winner;

    let metric = match &conflict.victory_faction_id {
        Some(id) => NewTickMetric::faction(
            ctx.tick,
            id,
            SystemType::War,
            keys::CONFLICT_RESOLVED,
            1.0,
        ),
        None => NewTickMetric::global(ctx.tick, SystemType::War, keys::CONFLICT_RESOLVED, 1.0),
    };
    ctx.store.record_metric(metric)?;

    tracing::info!(
        conflict_id = conflict.id,
        winner = conflict.victory_faction_id.as_deref().unwrap_or("none"),
        resolution = %resolution,
        tick = ctx.tick,
        "conflict resolved"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Faction, World};
    use crate::store::Store;
    use crate::testutil::{faction_with_relations, tick_system};

    fn certain_war() -> WarConfig {
        WarConfig {
            initiation_probability: 1.0,
            resolution_check_probability: 0.0,
            ..WarConfig::default()
        }
    }

    fn no_new_wars() -> WarConfig {
        WarConfig {
            initiation_probability: 0.0,
            resolution_check_probability: 0.0,
            ..WarConfig::default()
        }
    }

    fn army(id: &str, strength: f64, treasury: f64) -> Faction {
        Faction {
            military_strength: strength,
            treasury,
            ..Faction::new(id, id)
        }
    }

    fn at_war(world: &mut World, a: &str, b: &str) -> u64 {
        world
            .insert_conflict(NewConflict {
                aggressor_faction_id: a.to_string(),
                defender_faction_id: b.to_string(),
                start_tick: 0,
            })
            .unwrap()
    }

    #[test]
    fn mutual_hostility_starts_exactly_one_war() {
        let mut world = World::new();
        world
            .insert_faction(Faction {
                military_strength: 10.0,
                treasury: 1000.0,
                ..faction_with_relations("A", &[("B", -90.0)])
            })
            .unwrap();
        world
            .insert_faction(Faction {
                military_strength: 10.0,
                treasury: 1000.0,
                ..faction_with_relations("B", &[("A", -90.0)])
            })
            .unwrap();

        tick_system(&mut world, &mut WarSystem::new(certain_war()), 1, 0);

        assert_eq!(world.conflicts.len(), 1);
        let c = world.conflicts.values().next().unwrap();
        assert_eq!(c.aggressor_faction_id, "A");
        assert_eq!(c.start_tick, 1);
        assert_eq!(
            world
                .sum_metrics(&MetricFilter::key(keys::CONFLICTS_STARTED_TOTAL).global())
                .unwrap(),
            1.0
        );
        // Combat ran on the tick the war started
        assert_eq!(c.last_combat_tick, Some(1));
    }

    #[test]
    fn threshold_attitude_is_not_hostile_enough() {
        let mut world = World::new();
        world
            .insert_faction(faction_with_relations("A", &[("B", -80.0)]))
            .unwrap();
        world.insert_faction(Faction::new("B", "B")).unwrap();
        tick_system(&mut world, &mut WarSystem::new(certain_war()), 1, 0);
        assert!(world.conflicts.is_empty());
    }

    #[test]
    fn unknown_target_never_attacked() {
        let mut world = World::new();
        world
            .insert_faction(faction_with_relations("A", &[("GHOST", -100.0)]))
            .unwrap();
        tick_system(&mut world, &mut WarSystem::new(certain_war()), 1, 0);
        assert!(world.conflicts.is_empty());
    }

    #[test]
    fn existing_war_blocks_new_one() {
        let mut world = World::new();
        world
            .insert_faction(Faction {
                military_strength: 100.0,
                ..faction_with_relations("A", &[("B", -95.0)])
            })
            .unwrap();
        world
            .insert_faction(Faction {
                military_strength: 100.0,
                ..faction_with_relations("B", &[("A", -95.0)])
            })
            .unwrap();
        at_war(&mut world, "B", "A");
        tick_system(&mut world, &mut WarSystem::new(certain_war()), 1, 0);
        assert_eq!(world.conflicts.len(), 1);
    }

    #[test]
    fn combat_round_tie_hits_aggressor() {
        let r = combat_round(10.0, 10.0, &WarConfig::default());
        assert_eq!(r.aggressor_casualties, 1.0);
        assert_eq!(r.defender_casualties, 0.0);

        let r = combat_round(200.0, 100.0, &WarConfig::default());
        assert_eq!(r.defender_casualties, 10.0);
        assert_eq!(r.aggressor_casualties, 4.0);
    }

    #[test]
    fn combat_round_weaker_side_loses_at_least_one() {
        let r = combat_round(50.0, 3.0, &WarConfig::default());
        assert_eq!(r.defender_casualties, 1.0);
        assert_eq!(r.aggressor_casualties, 0.0);
    }

    #[test]
    fn combat_applies_losses_costs_and_metrics() {
        let mut world = World::new();
        world.insert_faction(army("A", 10.0, 1000.0)).unwrap();
        world.insert_faction(army("B", 10.0, 1000.0)).unwrap();
        at_war(&mut world, "A", "B");

        tick_system(&mut world, &mut WarSystem::new(no_new_wars()), 1, 0);

        assert_eq!(world.factions["A"].military_strength, 9.0);
        assert_eq!(world.factions["B"].military_strength, 10.0);
        assert_eq!(world.factions["A"].treasury, 980.0);
        assert_eq!(world.factions["B"].treasury, 980.0);

        let cas = world
            .metrics(&MetricFilter::key(keys::WAR_CASUALTIES))
            .unwrap();
        assert_eq!(cas.len(), 1, "zero casualties are not emitted");
        assert_eq!(cas[0].faction_id.as_deref(), Some("A"));
        assert_eq!(
            world
                .metrics(&MetricFilter::key(keys::WAR_TREASURY_COST))
                .unwrap()
                .len(),
            2
        );

        let risk = world
            .metrics(&MetricFilter::key(keys::GLOBAL_RISK_INTENSITY).global())
            .unwrap();
        assert_eq!(risk.len(), 1);
        assert!((risk[0].value - 1.0 / 19.0).abs() < 1e-12);

        let c = world.conflicts.values().next().unwrap();
        assert_eq!(c.status, ConflictStatus::Active);
        assert_eq!(c.last_combat_tick, Some(1));
    }

    #[test]
    fn war_cost_capped_at_treasury() {
        let mut world = World::new();
        world.insert_faction(army("A", 10.0, 5.0)).unwrap();
        world.insert_faction(army("B", 10.0, -50.0)).unwrap();
        at_war(&mut world, "A", "B");

        tick_system(&mut world, &mut WarSystem::new(no_new_wars()), 1, 0);

        assert_eq!(world.factions["A"].treasury, 0.0);
        // A side that enters combat in debt is settled at zero
        assert_eq!(world.factions["B"].treasury, 0.0);
        assert_eq!(
            world
                .sum_metrics(&MetricFilter::key(keys::WAR_TREASURY_COST).faction("A"))
                .unwrap(),
            5.0
        );
        assert!(
            world
                .metrics(&MetricFilter::key(keys::WAR_TREASURY_COST).faction("B"))
                .unwrap()
                .is_empty()
        );
    }

    #[test]
    fn side_reduced_to_zero_loses() {
        let mut world = World::new();
        world.insert_faction(army("A", 1.0, 100.0)).unwrap();
        world.insert_faction(army("B", 50.0, 100.0)).unwrap();
        let id = at_war(&mut world, "A", "B");

        tick_system(&mut world, &mut WarSystem::new(no_new_wars()), 3, 0);

        let c = &world.conflicts[&id];
        assert_eq!(c.status, ConflictStatus::Victory);
        assert_eq!(c.victory_faction_id.as_deref(), Some("B"));
        assert_eq!(c.resolution, Some(ConflictResolution::Decisive));
        assert_eq!(c.last_combat_tick, Some(3));
        assert_eq!(world.factions["A"].military_strength, 0.0);
        assert_eq!(
            world
                .sum_metrics(&MetricFilter::key(keys::CONFLICT_RESOLVED).faction("B"))
                .unwrap(),
            1.0
        );
    }

    #[test]
    fn negotiated_settlement_after_heavy_losses() {
        let mut world = World::new();
        world.insert_faction(army("A", 2.0, 100.0)).unwrap();
        world.insert_faction(army("B", 2.0, 100.0)).unwrap();
        let id = at_war(&mut world, "A", "B");
        let cfg = WarConfig {
            initiation_probability: 0.0,
            resolution_check_probability: 1.0,
            ..WarConfig::default()
        };

        tick_system(&mut world, &mut WarSystem::new(cfg), 1, 0);

        // A loses 1 of a combined 4: 25% < 30%, so the war goes on
        assert_eq!(world.conflicts[&id].status, ConflictStatus::Active);

        let mut world = World::new();
        world.insert_faction(army("A", 2.0, 100.0)).unwrap();
        world.insert_faction(army("B", 3.0, 100.0)).unwrap();
        let id = at_war(&mut world, "A", "B");
        let cfg = WarConfig {
            initiation_probability: 0.0,
            resolution_check_probability: 1.0,
            negotiated_loss_ratio: 0.15,
            ..WarConfig::default()
        };
        tick_system(&mut world, &mut WarSystem::new(cfg), 1, 0);

        let c = &world.conflicts[&id];
        assert_eq!(c.status, ConflictStatus::Victory);
        assert_eq!(c.resolution, Some(ConflictResolution::Negotiated));
        assert_eq!(c.victory_faction_id.as_deref(), Some("B"));
    }

    #[test]
    fn conflict_with_missing_faction_is_skipped() {
        let mut world = World::new();
        world.insert_faction(army("A", 10.0, 100.0)).unwrap();
        let id = at_war(&mut world, "A", "GONE");
        tick_system(&mut world, &mut WarSystem::new(no_new_wars()), 1, 0);
        assert_eq!(world.conflicts[&id].last_combat_tick, None);
        assert_eq!(world.factions["A"].military_strength, 10.0);
    }
}
