use std::collections::HashMap;

use super::config::DecisionConfig;
use super::context::{SubsystemError, TickContext};
use super::system::SimSystem;
use crate::ai::{Decision, DecisionAction, DecisionContext, DecisionMaker, HeuristicDecisionMaker};
use crate::model::{Faction, FactionUpdate, NewTickMetric, SystemType, keys};
use crate::store::{ConflictFilter, FactionFilter, MetricFilter, StoreError};

/// Lets every AI-controlled faction pick and apply one strategic action per tick.
pub struct DecisionSystem {
    config: DecisionConfig,
    decision_maker: Box<dyn DecisionMaker>,
}

impl DecisionSystem {
    pub fn new(config: DecisionConfig) -> Self {
        let heuristic = HeuristicDecisionMaker::new(config.clone());
        Self::with_decision_maker(config, Box::new(heuristic))
    }

    pub fn with_decision_maker(config: DecisionConfig, decision_maker: Box<dyn DecisionMaker>) -> Self {
        Self {
            config,
            decision_maker,
        }
    }

    pub fn set_decision_maker(&mut self, decision_maker: Box<dyn DecisionMaker>) {
        self.decision_maker = decision_maker;
    }

    fn build_context(
        &self,
        ctx: &TickContext,
        faction: &Faction,
        in_war: bool,
        hostile_avg: f64,
    ) -> Result<DecisionContext, StoreError> {
        let recent_losses = ctx.store.sum_metrics(
            &MetricFilter::key(keys::WAR_CASUALTIES)
                .system(SystemType::War)
                .faction(&faction.id)
                .window(ctx.tick, self.config.loss_window_ticks),
        )?;
        Ok(DecisionContext {
            faction_id: faction.id.clone(),
            tick: ctx.tick,
            treasury: faction.treasury,
            military_strength: faction.military_strength,
            stability: faction.stability,
            econ_low: faction.treasury < self.config.low_treasury_threshold,
            in_war,
            recent_losses,
            hostile_avg,
            weaker_than_hostiles: hostile_avg > 0.0 && faction.military_strength < hostile_avg,
        })
    }

    fn decide_and_apply(
        &mut self,
        ctx: &mut TickContext,
        faction: &Faction,
        in_war: bool,
        hostile_avg: f64,
    ) -> Result<(), SubsystemError> {
        let context = self.build_context(ctx, faction, in_war, hostile_avg)?;
        let decision = self.decision_maker.generate_decision(&context)?;
        self.apply(ctx, &faction.id, &decision)?;
        ctx.store
            .record_narrative(ctx.tick, &faction.id, decision_text(&faction.id, &decision))?;
        Ok(())
    }

    fn apply(
        &self,
        ctx: &mut TickContext,
        faction_id: &str,
        decision: &Decision,
    ) -> Result<(), StoreError> {
        let tick = ctx.tick;
        match decision.action {
            DecisionAction::AdjustSpending if decision.amount != 0.0 => {
                let Some(current) = ctx.store.faction(faction_id)? else {
                    return Ok(());
                };
                ctx.store.update_faction(
                    faction_id,
                    FactionUpdate::treasury(current.treasury + decision.amount),
                )?;
                ctx.store.record_metric(NewTickMetric::faction(
                    tick,
                    faction_id,
                    SystemType::Decision,
                    keys::AI_DECISION_TREASURY_DELTA,
                    decision.amount,
                ))?;
            }
            DecisionAction::RecruitUnits => {
                let recruits = decision.amount.floor().max(0.0);
                if recruits <= 0.0 {
                    return Ok(());
                }
                let Some(current) = ctx.store.faction(faction_id)? else {
                    return Ok(());
                };
                let cost = -recruits * self.config.recruit_cost_per_strength;
                ctx.store.update_faction(
                    faction_id,
                    FactionUpdate {
                        treasury: Some(current.treasury + cost),
                        military_strength: Some(current.military_strength + recruits),
                        ..FactionUpdate::default()
                    },
                )?;
                ctx.store.record_metric(NewTickMetric::faction(
                    tick,
                    faction_id,
                    SystemType::Decision,
                    keys::AI_DECISION_TREASURY_DELTA,
                    cost,
                ))?;
                ctx.store.record_metric(NewTickMetric::faction(
                    tick,
                    faction_id,
                    SystemType::Decision,
                    keys::AI_DECISION_MILITARY_DELTA,
                    recruits,
                ))?;
            }
            _ => {}
        }
        Ok(())
    }
}

impl SimSystem for DecisionSystem {
    fn name(&self) -> &str {
        "decision"
    }

    fn tick(&mut self, ctx: &mut TickContext) -> Result<(), StoreError> {
        let controlled = ctx.store.factions(&FactionFilter::ai_controlled())?;
        if controlled.is_empty() {
            return Ok(());
        }
        let in_war = ctx.store.count_conflicts(&ConflictFilter::active())? > 0;

        // Per-pass cache; strengths change every tick so nothing is kept across passes
        let mut hostile_cache: HashMap<String, f64> = HashMap::new();

        for faction in &controlled {
            let hostile_avg = match hostile_cache.get(&faction.id) {
                Some(avg) => *avg,
                None => {
                    let strengths = match hostile_strengths(ctx, faction, &self.config) {
                        Ok(strengths) => strengths,
                        Err(err) => {
                            ctx.isolate(self.name(), Some(&faction.id), err);
                            continue;
                        }
                    };
                    let avg = hostile_average(
                        faction,
                        &strengths,
                        self.config.hostile_attitude_threshold,
                    );
                    hostile_cache.insert(faction.id.clone(), avg);
                    avg
                }
            };
            if let Err(err) = self.decide_and_apply(ctx, faction, in_war, hostile_avg) {
                ctx.isolate(self.name(), Some(&faction.id), err);
            }
        }

        tracing::debug!(
            tick = ctx.tick,
            factions = controlled.len(),
            in_war,
            "decision system executed"
        );
        Ok(())
    }
}

/// Current strength of every faction `faction` is hostile toward.
///
/// Read from the store at call time, so recruitment earlier in the same pass is
/// visible.
fn hostile_strengths(
    ctx: &TickContext,
    faction: &Faction,
    cfg: &DecisionConfig,
) -> Result<HashMap<String, f64>, StoreError> {
    let mut strengths = HashMap::new();
    for rel in faction
        .relations
        .iter()
        .filter(|r| r.attitude < cfg.hostile_attitude_threshold)
    {
        if let Some(target) = ctx.store.faction(&rel.target_faction_id)? {
            strengths.insert(target.id, target.military_strength);
        }
    }
    Ok(strengths)
}

/// Mean strength of known factions this one holds below `threshold`; 0 if none.
pub fn hostile_average(faction: &Faction, strengths: &HashMap<String, f64>, threshold: f64) -> f64 {
    let hostile: Vec<f64> = faction
        .relations
        .iter()
        .filter(|r| r.attitude < threshold)
        .filter_map(|r| strengths.get(&r.target_faction_id).copied())
        .collect();
    if hostile.is_empty() {
        0.0
    } else {
        hostile.iter().sum::<f64>() / hostile.len() as f64
    }
}

/// One-line summary of a decision, written even when it changes nothing.
pub fn decision_text(faction_id: &str, decision: &Decision) -> String {
    let target = decision
        .target
        .as_deref()
        .map(|t| format!(" on {t}"))
        .unwrap_or_default();
    format!(
        "AI ({faction_id}) decided: {}{target} ({:+}) · confidence {:.0}%. {}",
        decision.action,
        decision.amount,
        decision.confidence * 100.0,
        decision.rationale
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::{CapabilityError, ExternalDecisionMaker};
    use crate::model::{NewConflict, Relation, World};
    use crate::store::{NarrativeFilter, Store};
    use crate::testutil::{ai_faction, tick_system};

    fn decisions() -> DecisionSystem {
        DecisionSystem::new(DecisionConfig::default())
    }

    fn metric(world: &World, key: &str, faction: &str) -> Vec<f64> {
        world
            .metrics(&MetricFilter::key(key).faction(faction))
            .unwrap()
            .into_iter()
            .map(|m| m.value)
            .collect()
    }

    #[test]
    fn recruit_ten_costs_five_hundred() {
        let mut world = World::new();
        world
            .insert_faction(Faction {
                relations: vec![Relation::new("H", -60.0)],
                ..ai_faction("A", 1000.0, 10.0)
            })
            .unwrap();
        world
            .insert_faction(Faction {
                military_strength: 50.0,
                ..Faction::new("H", "Horde")
            })
            .unwrap();

        tick_system(&mut world, &mut decisions(), 1, 0);

        assert_eq!(world.factions["A"].treasury, 500.0);
        assert_eq!(world.factions["A"].military_strength, 20.0);
        assert_eq!(metric(&world, keys::AI_DECISION_TREASURY_DELTA, "A"), vec![-500.0]);
        assert_eq!(metric(&world, keys::AI_DECISION_MILITARY_DELTA, "A"), vec![10.0]);
    }

    #[test]
    fn low_treasury_at_peace_adds_hundred() {
        let mut world = World::new();
        world.insert_faction(ai_faction("A", 100.0, 10.0)).unwrap();

        tick_system(&mut world, &mut decisions(), 1, 0);

        assert_eq!(world.factions["A"].treasury, 200.0);
        assert_eq!(metric(&world, keys::AI_DECISION_TREASURY_DELTA, "A"), vec![100.0]);
    }

    #[test]
    fn low_treasury_during_any_war_adds_fifty() {
        let mut world = World::new();
        world.insert_faction(ai_faction("A", 100.0, 10.0)).unwrap();
        world.insert_faction(Faction::new("X", "X")).unwrap();
        world.insert_faction(Faction::new("Y", "Y")).unwrap();
        world
            .insert_conflict(NewConflict {
                aggressor_faction_id: "X".into(),
                defender_faction_id: "Y".into(),
                start_tick: 0,
            })
            .unwrap();

        tick_system(&mut world, &mut decisions(), 1, 0);
        assert_eq!(world.factions["A"].treasury, 150.0);
    }

    #[test]
    fn recruit_capped_at_twenty() {
        let mut world = World::new();
        world
            .insert_faction(Faction {
                relations: vec![Relation::new("H", -60.0)],
                ..ai_faction("A", 2000.0, 10.0)
            })
            .unwrap();
        world
            .insert_faction(Faction {
                military_strength: 50.0,
                ..Faction::new("H", "Horde")
            })
            .unwrap();

        tick_system(&mut world, &mut decisions(), 1, 0);

        assert_eq!(world.factions["A"].military_strength, 30.0);
        assert_eq!(world.factions["A"].treasury, 1000.0);
    }

    #[test]
    fn stronger_than_hostiles_does_not_recruit() {
        let mut world = World::new();
        world
            .insert_faction(Faction {
                relations: vec![Relation::new("H", -60.0)],
                ..ai_faction("A", 2000.0, 20.0)
            })
            .unwrap();
        world
            .insert_faction(Faction {
                military_strength: 5.0,
                ..Faction::new("H", "Horde")
            })
            .unwrap();

        tick_system(&mut world, &mut decisions(), 1, 0);

        assert!(metric(&world, keys::AI_DECISION_MILITARY_DELTA, "A").is_empty());
        assert!(metric(&world, keys::AI_DECISION_TREASURY_DELTA, "A").is_empty());
        assert_eq!(world.factions["A"].treasury, 2000.0);
        // The no-op is still narrated
        let n = world.narratives(&NarrativeFilter::faction("A")).unwrap();
        assert_eq!(n.len(), 1);
        assert_eq!(
            n[0].text,
            "AI (A) decided: AdjustSpending (+0) · confidence 50%. No strategic action needed"
        );
    }

    #[test]
    fn only_ai_controlled_factions_decide() {
        let mut world = World::new();
        world
            .insert_faction(Faction {
                treasury: 100.0,
                ..Faction::new("P", "Player")
            })
            .unwrap();
        tick_system(&mut world, &mut decisions(), 1, 0);
        assert_eq!(world.factions["P"].treasury, 100.0);
        assert!(world.narratives.is_empty());
    }

    #[test]
    fn recruitment_earlier_in_the_pass_is_seen_by_rivals() {
        let mut world = World::new();
        world
            .insert_faction(Faction {
                relations: vec![Relation::new("B", -60.0)],
                ..ai_faction("A", 1500.0, 10.0)
            })
            .unwrap();
        world
            .insert_faction(Faction {
                relations: vec![Relation::new("A", -60.0)],
                ..ai_faction("B", 2000.0, 15.0)
            })
            .unwrap();

        tick_system(&mut world, &mut decisions(), 1, 0);

        // A goes first: 10 < 15, recruits 20
        assert_eq!(world.factions["A"].military_strength, 30.0);
        assert_eq!(world.factions["A"].treasury, 500.0);
        // B now faces 30, not 10, and recruits too
        assert_eq!(world.factions["B"].military_strength, 35.0);
        assert_eq!(world.factions["B"].treasury, 1000.0);
        assert_eq!(metric(&world, keys::AI_DECISION_MILITARY_DELTA, "B"), vec![20.0]);
    }

    #[test]
    fn hostile_average_ignores_friends_and_unknowns() {
        let faction = Faction {
            relations: vec![
                Relation::new("H1", -50.0),
                Relation::new("H2", -90.0),
                Relation::new("F", 30.0),
                Relation::new("GONE", -100.0),
            ],
            ..Faction::new("A", "A")
        };
        let strengths: HashMap<String, f64> = [("H1", 10.0), ("H2", 30.0), ("F", 500.0)]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        assert_eq!(hostile_average(&faction, &strengths, -40.0), 20.0);
        assert_eq!(hostile_average(&Faction::new("B", "B"), &strengths, -40.0), 0.0);
    }

    #[test]
    fn external_provider_failure_isolated_per_faction() {
        let mut world = World::new();
        world.insert_faction(ai_faction("A", 1000.0, 10.0)).unwrap();
        world.insert_faction(ai_faction("B", 1000.0, 10.0)).unwrap();
        let provider = ExternalDecisionMaker::new(|ctx| {
            if ctx.faction_id == "A" {
                return Err(CapabilityError::Decision("timeout".into()));
            }
            Ok(Decision {
                action: DecisionAction::AdjustSpending,
                amount: -25.0,
                target: Some("A".into()),
                confidence: 0.9,
                rationale: "Fund the border forts".into(),
            })
        });
        let mut system =
            DecisionSystem::with_decision_maker(DecisionConfig::default(), Box::new(provider));

        let failures = tick_system(&mut world, &mut system, 1, 0);

        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].faction_id.as_deref(), Some("A"));
        assert_eq!(world.factions["A"].treasury, 1000.0);
        assert_eq!(world.factions["B"].treasury, 975.0);
        assert_eq!(
            world.narratives[0].text,
            "AI (B) decided: AdjustSpending on A (-25) · confidence 90%. Fund the border forts"
        );
    }

    #[test]
    fn unknown_action_only_narrated() {
        let mut world = World::new();
        world.insert_faction(ai_faction("A", 1000.0, 10.0)).unwrap();
        let provider = ExternalDecisionMaker::new(|_| {
            Ok(Decision {
                action: DecisionAction::Other("SendEnvoy".into()),
                amount: 3.0,
                target: None,
                confidence: 0.4,
                rationale: "Talk first".into(),
            })
        });
        let mut system =
            DecisionSystem::with_decision_maker(DecisionConfig::default(), Box::new(provider));
        tick_system(&mut world, &mut system, 1, 0);

        assert_eq!(world.factions["A"].treasury, 1000.0);
        assert!(world.metrics.is_empty());
        assert!(world.narratives[0].text.starts_with("AI (A) decided: SendEnvoy (+3)"));
    }

    #[test]
    fn recent_losses_reach_the_provider() {
        let mut world = World::new();
        world.insert_faction(ai_faction("A", 1000.0, 10.0)).unwrap();
        for (tick, value) in [(1, 100.0), (6, 3.0), (10, 4.0)] {
            world
                .record_metric(NewTickMetric::faction(
                    tick,
                    "A",
                    SystemType::War,
                    keys::WAR_CASUALTIES,
                    value,
                ))
                .unwrap();
        }
        let provider = ExternalDecisionMaker::new(|ctx| {
            Ok(Decision {
                action: DecisionAction::AdjustSpending,
                amount: ctx.recent_losses,
                target: None,
                confidence: 1.0,
                rationale: String::new(),
            })
        });
        let mut system =
            DecisionSystem::with_decision_maker(DecisionConfig::default(), Box::new(provider));
        tick_system(&mut world, &mut system, 10, 0);

        // Window of five ticks ending at 10 covers ticks 6..=10
        assert_eq!(world.factions["A"].treasury, 1007.0);
    }
}
