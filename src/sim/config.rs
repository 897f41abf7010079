use serde::{Deserialize, Serialize};

/// Configuration for a simulation run. Every section falls back to its
/// defaults, so a partial JSON file only needs the values it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// RNG seed. The same seed against the same world replays identically.
    pub seed: u64,
    pub war: WarConfig,
    pub economy: EconomicConfig,
    pub event: EventConfig,
    pub decision: DecisionConfig,
}

impl SimConfig {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            war: WarConfig::default(),
            economy: EconomicConfig::default(),
            event: EventConfig::default(),
            decision: DecisionConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WarConfig {
    /// Attitudes strictly below this can start a war.
    pub initiation_attitude_threshold: f64,
    /// Chance per qualifying relation per tick.
    pub initiation_probability: f64,
    /// Fraction of the weaker side's strength lost per combat round.
    pub base_casualty_rate: f64,
    /// Stronger side loses this fraction of the weaker side's base casualties.
    pub stronger_side_casualty_factor: f64,
    pub treasury_war_cost_per_strength: f64,
    /// A side at or below this strength has lost.
    pub victory_strength_threshold: f64,
    /// Chance per tick of checking for a negotiated end.
    pub resolution_check_probability: f64,
    /// Combined losses above this share of combined starting strength allow a settlement.
    pub negotiated_loss_ratio: f64,
    /// Ticks of casualties summed into `global_risk_intensity`.
    pub risk_window_ticks: u64,
}

impl Default for WarConfig {
    fn default() -> Self {
        Self {
            initiation_attitude_threshold: -80.0,
            initiation_probability: 0.05,
            base_casualty_rate: 0.1,
            stronger_side_casualty_factor: 0.4,
            treasury_war_cost_per_strength: 2.0,
            victory_strength_threshold: 0.0,
            resolution_check_probability: 0.2,
            negotiated_loss_ratio: 0.3,
            risk_window_ticks: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomicConfig {
    /// Income is settlement population divided by this.
    pub income_pop_divisor: f64,
    pub income_per_market_tier: f64,
    pub army_upkeep_per_strength: f64,
    /// Fixed cost per faction per tick.
    pub bureaucracy_base: f64,
    pub bureaucracy_per_territory: f64,
}

impl Default for EconomicConfig {
    fn default() -> Self {
        Self {
            income_pop_divisor: 100.0,
            income_per_market_tier: 5.0,
            army_upkeep_per_strength: 0.02,
            bureaucracy_base: 100.0,
            bureaucracy_per_territory: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventConfig {
    /// Pending suggestions consumed per tick.
    pub suggestions_per_tick: usize,
    /// Multiplier applied to stability per processed suggestion.
    pub stability_bump: f64,
    pub stability_cap: f64,
}

impl Default for EventConfig {
    fn default() -> Self {
        Self {
            suggestions_per_tick: 5,
            stability_bump: 1.05,
            stability_cap: 100.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecisionConfig {
    pub recruit_cost_per_strength: f64,
    /// Treasury below this counts as economically weak.
    pub low_treasury_threshold: f64,
    /// Treasury kept in reserve when recruiting.
    pub recruit_reserve: f64,
    pub max_recruit_per_tick: f64,
    /// Relations below this attitude count as hostile.
    pub hostile_attitude_threshold: f64,
    /// Ticks of casualties counted as recent losses.
    pub loss_window_ticks: u64,
}

impl Default for DecisionConfig {
    fn default() -> Self {
        Self {
            recruit_cost_per_strength: 50.0,
            low_treasury_threshold: 200.0,
            recruit_reserve: 500.0,
            max_recruit_per_tick: 20.0,
            hostile_attitude_threshold: -40.0,
            loss_window_ticks: 5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_other_defaults() {
        let cfg: SimConfig =
            serde_json::from_str(r#"{"seed": 7, "war": {"initiation_probability": 1.0}}"#)
                .unwrap();
        assert_eq!(cfg.seed, 7);
        assert_eq!(cfg.war.initiation_probability, 1.0);
        assert_eq!(cfg.war.initiation_attitude_threshold, -80.0);
        assert_eq!(cfg.decision.recruit_cost_per_strength, 50.0);
        assert_eq!(cfg.event.suggestions_per_tick, 5);
    }
}
