use serde::{Deserialize, Serialize};

use super::CapabilityError;
use crate::sim::DecisionConfig;

/// Strategic action a faction can take. Providers may return actions the
/// simulation does not know; those land in `Other` and have no effect.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum DecisionAction {
    AdjustSpending,
    RecruitUnits,
    Other(String),
}

string_enum!(open DecisionAction, "decision action" {
    AdjustSpending => "AdjustSpending",
    RecruitUnits => "RecruitUnits",
});

/// Everything a decision provider gets to see about one faction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecisionContext {
    pub faction_id: String,
    pub tick: u64,
    pub treasury: f64,
    pub military_strength: f64,
    pub stability: f64,
    pub econ_low: bool,
    /// Any active conflict anywhere in the world.
    pub in_war: bool,
    /// This faction's casualties over the recent window.
    pub recent_losses: f64,
    /// Mean strength of factions this one is hostile toward; 0 if none.
    pub hostile_avg: f64,
    pub weaker_than_hostiles: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub action: DecisionAction,
    pub amount: f64,
    #[serde(default)]
    pub target: Option<String>,
    /// 0..=1
    pub confidence: f64,
    pub rationale: String,
}

impl Decision {
    fn new(action: DecisionAction, amount: f64, confidence: f64, rationale: &str) -> Self {
        Self {
            action,
            amount,
            target: None,
            confidence,
            rationale: rationale.to_string(),
        }
    }
}

/// Source of strategic decisions for AI-controlled factions.
pub trait DecisionMaker {
    fn generate_decision(&mut self, ctx: &DecisionContext) -> Result<Decision, CapabilityError>;
}

/// Deterministic rule set used when no external provider is configured.
#[derive(Debug, Clone, Default)]
pub struct HeuristicDecisionMaker {
    config: DecisionConfig,
}

impl HeuristicDecisionMaker {
    pub fn new(config: DecisionConfig) -> Self {
        Self { config }
    }
}

impl DecisionMaker for HeuristicDecisionMaker {
    fn generate_decision(&mut self, ctx: &DecisionContext) -> Result<Decision, CapabilityError> {
        let cfg = &self.config;
        let decision = if ctx.in_war && ctx.econ_low {
            Decision::new(
                DecisionAction::AdjustSpending,
                50.0,
                0.7,
                "Trim spending to sustain the war effort",
            )
        } else if ctx.econ_low {
            Decision::new(
                DecisionAction::AdjustSpending,
                100.0,
                0.8,
                "Treasury is low; cutting administrative costs",
            )
        } else if ctx.weaker_than_hostiles && ctx.treasury > cfg.recruit_reserve {
            let affordable =
                ((ctx.treasury - cfg.recruit_reserve) / cfg.recruit_cost_per_strength).floor();
            Decision::new(
                DecisionAction::RecruitUnits,
                affordable.min(cfg.max_recruit_per_tick),
                0.75,
                "Raise strength against hostile neighbours",
            )
        } else {
            Decision::new(
                DecisionAction::AdjustSpending,
                0.0,
                0.5,
                "No strategic action needed",
            )
        };
        Ok(decision)
    }
}

type DecisionFn = dyn FnMut(&DecisionContext) -> Result<Decision, CapabilityError>;

/// Delegates to an outside provider (an LLM proxy, a scripted test double, ...).
pub struct ExternalDecisionMaker {
    provider: Box<DecisionFn>,
}

impl ExternalDecisionMaker {
    pub fn new(
        provider: impl FnMut(&DecisionContext) -> Result<Decision, CapabilityError> + 'static,
    ) -> Self {
        Self {
            provider: Box::new(provider),
        }
    }
}

impl DecisionMaker for ExternalDecisionMaker {
    fn generate_decision(&mut self, ctx: &DecisionContext) -> Result<Decision, CapabilityError> {
        (self.provider)(ctx)
    }
}
