use serde::{Deserialize, Serialize};

/// Which subsystem emitted a metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum SystemType {
    Political,
    War,
    Economic,
    Event,
    Decision,
}

string_enum!(SystemType {
    Political => "political",
    War => "war",
    Economic => "economic",
    Event => "event",
    Decision => "decision",
});

/// Metric keys emitted by the simulation.
pub mod keys {
    pub const ATTITUDE_DRIFT_ABS: &str = "attitude_drift_abs";
    pub const POLITICAL_EQUILIBRIUM_GAP: &str = "political_equilibrium_gap";
    pub const GLOBAL_POLITICAL_HEALTH: &str = "global_political_health";

    pub const CONFLICT_STARTED: &str = "conflict_started";
    pub const CONFLICTS_STARTED_TOTAL: &str = "conflicts_started_total";
    pub const CONFLICT_RESOLVED: &str = "conflict_resolved";
    pub const WAR_CASUALTIES: &str = "war_casualties";
    pub const WAR_TREASURY_COST: &str = "war_treasury_cost";
    pub const GLOBAL_RISK_INTENSITY: &str = "global_risk_intensity";

    pub const ECONOMY_INCOME: &str = "economy_income";
    pub const ECONOMY_UPKEEP: &str = "economy_upkeep";
    pub const ECONOMY_BUREAUCRACY: &str = "economy_bureaucracy";
    pub const TREASURY_DELTA: &str = "treasury_delta";
    pub const GLOBAL_TREASURY_TOTAL: &str = "global_treasury_total";

    pub const STABILITY_CHANGE: &str = "stability_change";

    pub const AI_DECISION_TREASURY_DELTA: &str = "ai_decision_treasury_delta";
    pub const AI_DECISION_MILITARY_DELTA: &str = "ai_decision_military_delta";
}

/// Append-only numeric fact. `faction_id == None` marks a global metric.
///
/// Several rows may share tick and key; each is a separate emission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickMetric {
    pub id: u64,
    pub tick: u64,
    pub faction_id: Option<String>,
    pub system: SystemType,
    pub metric_key: String,
    pub value: f64,
    /// Unix epoch milliseconds.
    pub created_at: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewTickMetric {
    pub tick: u64,
    pub faction_id: Option<String>,
    pub system: SystemType,
    pub metric_key: String,
    pub value: f64,
}

impl NewTickMetric {
    pub fn faction(
        tick: u64,
        faction_id: impl Into<String>,
        system: SystemType,
        metric_key: &str,
        value: f64,
    ) -> Self {
        Self {
            tick,
            faction_id: Some(faction_id.into()),
            system,
            metric_key: metric_key.to_string(),
            value,
        }
    }

    pub fn global(tick: u64, system: SystemType, metric_key: &str, value: f64) -> Self {
        Self {
            tick,
            faction_id: None,
            system,
            metric_key: metric_key.to_string(),
            value,
        }
    }

    pub fn with_id(self, id: u64, created_at: i64) -> TickMetric {
        TickMetric {
            id,
            tick: self.tick,
            faction_id: self.faction_id,
            system: self.system,
            metric_key: self.metric_key,
            value: self.value,
            created_at,
        }
    }
}
