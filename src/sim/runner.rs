use rand::SeedableRng;
use rand::rngs::SmallRng;
use serde::Serialize;
use thiserror::Error;

use super::config::SimConfig;
use super::context::{SubsystemFailure, TickContext};
use super::decision::DecisionSystem;
use super::economy::EconomicSystem;
use super::event::EventSystem;
use super::political::PoliticalSystem;
use super::system::SimSystem;
use super::war::WarSystem;
use crate::ai::{DecisionMaker, Narrator};
use crate::model::World;
use crate::store::{Store, StoreError};

#[derive(Debug, Error)]
pub enum SimError {
    #[error("tick count must be at least 1, got {0}")]
    InvalidTickCount(u64),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// What one `run_tick` call did.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TickReport {
    /// The new current tick.
    pub tick: u64,
    /// Status lines in execution order, for display by the caller.
    pub messages: Vec<String>,
    /// Per-entity failures the event and decision systems isolated.
    pub failures: Vec<SubsystemFailure>,
}

/// The scheduler: advances the world clock and runs the five systems in a
/// fixed order against the new tick.
///
/// Without a store the clock is an in-memory counter and every system is
/// skipped.
pub struct SimCore<S = World> {
    store: Option<S>,
    offline_tick: u64,
    rng: SmallRng,
    political: PoliticalSystem,
    war: WarSystem,
    economic: EconomicSystem,
    event: EventSystem,
    decision: DecisionSystem,
}

impl SimCore<World> {
    /// Degraded mode: no store, only the clock moves.
    pub fn without_store(config: SimConfig) -> Self {
        Self::build(None, config)
    }
}

impl<S: Store> SimCore<S> {
    pub fn new(store: S, config: SimConfig) -> Self {
        Self::build(Some(store), config)
    }

    fn build(store: Option<S>, config: SimConfig) -> Self {
        Self {
            store,
            offline_tick: 0,
            rng: SmallRng::seed_from_u64(config.seed),
            political: PoliticalSystem,
            war: WarSystem::new(config.war),
            economic: EconomicSystem::new(config.economy),
            event: EventSystem::new(config.event),
            decision: DecisionSystem::new(config.decision),
        }
    }

    /// Replace the heuristic decision maker.
    pub fn with_decision_maker(mut self, decision_maker: Box<dyn DecisionMaker>) -> Self {
        self.decision.set_decision_maker(decision_maker);
        self
    }

    /// Replace the template narrator.
    pub fn with_narrator(mut self, narrator: Box<dyn Narrator>) -> Self {
        self.event.set_narrator(narrator);
        self
    }

    pub fn store(&self) -> Option<&S> {
        self.store.as_ref()
    }

    pub fn store_mut(&mut self) -> Option<&mut S> {
        self.store.as_mut()
    }

    pub fn into_store(self) -> Option<S> {
        self.store
    }

    pub fn current_tick(&self) -> Result<u64, SimError> {
        match &self.store {
            Some(store) => Ok(store.current_tick()?),
            None => Ok(self.offline_tick),
        }
    }

    /// Advance by `count` ticks and run every system once at the new tick.
    pub fn run_tick(&mut self, count: u64) -> Result<u64, SimError> {
        Ok(self.run_tick_with_report(count)?.tick)
    }

    pub fn run_tick_with_report(&mut self, count: u64) -> Result<TickReport, SimError> {
        if count == 0 {
            return Err(SimError::InvalidTickCount(count));
        }

        let Some(store) = self.store.as_mut() else {
            self.offline_tick = self.offline_tick.saturating_add(count);
            let tick = self.offline_tick;
            tracing::info!(tick, count, "world advanced without a store; systems skipped");
            return Ok(TickReport {
                tick,
                messages: vec![format!("Systems skipped at tick {tick} (no store)")],
                failures: Vec::new(),
            });
        };

        let tick = store.advance_clock(count)?;
        let mut report = TickReport {
            tick,
            ..TickReport::default()
        };

        let systems: [(&str, &mut dyn SimSystem); 5] = [
            ("Political", &mut self.political),
            ("War", &mut self.war),
            ("Economic", &mut self.economic),
            ("Event", &mut self.event),
            ("Decision", &mut self.decision),
        ];
        for (label, system) in systems {
            let mut ctx = TickContext {
                store: &mut *store,
                rng: &mut self.rng,
                tick,
                failures: &mut report.failures,
            };
            system.tick(&mut ctx)?;
            report
                .messages
                .push(format!("{label} System executed at tick {tick}"));
        }

        tracing::info!(
            tick,
            count,
            failures = report.failures.len(),
            "world advanced"
        );
        Ok(report)
    }
}
