use super::config::EconomicConfig;
use super::context::TickContext;
use super::system::SimSystem;
use crate::model::{Faction, FactionUpdate, NewTickMetric, Settlement, SystemType, keys};
use crate::store::{FactionFilter, StoreError};

/// Applies settlement income, army upkeep and bureaucracy cost to every
/// treasury once per tick.
pub struct EconomicSystem {
    config: EconomicConfig,
}

impl EconomicSystem {
    pub fn new(config: EconomicConfig) -> Self {
        Self { config }
    }
}

/// One faction's books for a single tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ledger {
    pub income: f64,
    pub upkeep: f64,
    pub bureaucracy: f64,
}

impl Ledger {
    pub fn compute(faction: &Faction, settlements: &[Settlement], cfg: &EconomicConfig) -> Self {
        let population: u64 = settlements.iter().map(|s| s.population).sum();
        let market_tiers: u32 = settlements.iter().map(|s| s.market_tier).sum();
        let income = if cfg.income_pop_divisor > 0.0 {
            population as f64 / cfg.income_pop_divisor
        } else {
            0.0
        } + market_tiers as f64 * cfg.income_per_market_tier;

        Self {
            income,
            upkeep: faction.military_strength * cfg.army_upkeep_per_strength,
            bureaucracy: cfg.bureaucracy_base
                + faction.territories as f64 * cfg.bureaucracy_per_territory,
        }
    }

    pub fn delta(&self) -> f64 {
        self.income - self.upkeep - self.bureaucracy
    }
}

impl SimSystem for EconomicSystem {
    fn name(&self) -> &str {
        "economic"
    }

    fn tick(&mut self, ctx: &mut TickContext) -> Result<(), StoreError> {
        let tick = ctx.tick;
        let factions = ctx.store.factions(&FactionFilter::all())?;
        let mut total = 0.0;

        for faction in &factions {
            let settlements = ctx.store.settlements_owned_by(&faction.id)?;
            let ledger = Ledger::compute(faction, &settlements, &self.config);
            let treasury = faction.treasury + ledger.delta();
            total += treasury;

            ctx.store
                .update_faction(&faction.id, FactionUpdate::treasury(treasury))?;

            for (key, value) in [
                (keys::ECONOMY_INCOME, ledger.income),
                (keys::ECONOMY_UPKEEP, ledger.upkeep),
                (keys::ECONOMY_BUREAUCRACY, ledger.bureaucracy),
                (keys::TREASURY_DELTA, ledger.delta()),
            ] {
                ctx.store.record_metric(NewTickMetric::faction(
                    tick,
                    &faction.id,
                    SystemType::Economic,
                    key,
                    value,
                ))?;
            }
        }

        if !factions.is_empty() {
            ctx.store.record_metric(NewTickMetric::global(
                tick,
                SystemType::Economic,
                keys::GLOBAL_TREASURY_TOTAL,
                total,
            ))?;
        }

        tracing::debug!(tick, factions = factions.len(), "economic system executed");
        Ok(())
    }
}
