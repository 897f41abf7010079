use crate::model::{
    Conflict, ConflictStatus, Faction, NarrativeEvent, PoliticalMemory, SystemType, TickMetric,
};

/// Selects factions. An empty filter matches every faction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FactionFilter {
    pub ai_controlled: Option<bool>,
    /// Restrict to these ids. `None` means no restriction.
    pub ids: Option<Vec<String>>,
}

impl FactionFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn ai_controlled() -> Self {
        Self {
            ai_controlled: Some(true),
            ..Self::default()
        }
    }

    pub fn ids(ids: Vec<String>) -> Self {
        Self {
            ids: Some(ids),
            ..Self::default()
        }
    }

    pub fn matches(&self, faction: &Faction) -> bool {
        self.ai_controlled
            .is_none_or(|v| faction.is_ai_controlled() == v)
            && self
                .ids
                .as_ref()
                .is_none_or(|ids| ids.iter().any(|id| *id == faction.id))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryFilter {
    pub source_faction_id: Option<String>,
    pub target_faction_id: Option<String>,
    /// Only memories not yet expired at this tick.
    pub active_at: Option<u64>,
    pub static_only: bool,
}

impl MemoryFilter {
    pub fn source(faction_id: &str) -> Self {
        Self {
            source_faction_id: Some(faction_id.to_string()),
            ..Self::default()
        }
    }

    pub fn active_at(mut self, tick: u64) -> Self {
        self.active_at = Some(tick);
        self
    }

    pub fn static_only(mut self) -> Self {
        self.static_only = true;
        self
    }

    pub fn matches(&self, memory: &PoliticalMemory) -> bool {
        self.source_faction_id
            .as_ref()
            .is_none_or(|s| *s == memory.source_faction_id)
            && self
                .target_faction_id
                .as_ref()
                .is_none_or(|t| *t == memory.target_faction_id)
            && self.active_at.is_none_or(|tick| memory.is_active_at(tick))
            && (!self.static_only || memory.is_static)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConflictFilter {
    /// Conflicts where this faction is either side.
    pub faction_id: Option<String>,
    /// Any of these statuses. Empty matches every status.
    pub statuses: Vec<ConflictStatus>,
    pub last_combat_tick: Option<u64>,
}

impl ConflictFilter {
    pub fn status(status: ConflictStatus) -> Self {
        Self {
            statuses: vec![status],
            ..Self::default()
        }
    }

    pub fn active() -> Self {
        Self::status(ConflictStatus::Active)
    }

    /// Conflicts that ended with a combat round at `tick`.
    pub fn resolved_at(tick: u64) -> Self {
        Self {
            statuses: vec![ConflictStatus::Victory, ConflictStatus::Ceasefire],
            last_combat_tick: Some(tick),
            ..Self::default()
        }
    }

    pub fn faction(mut self, faction_id: &str) -> Self {
        self.faction_id = Some(faction_id.to_string());
        self
    }

    pub fn matches(&self, conflict: &Conflict) -> bool {
        self.faction_id
            .as_ref()
            .is_none_or(|id| conflict.involves(id))
            && (self.statuses.is_empty() || self.statuses.contains(&conflict.status))
            && self
                .last_combat_tick
                .is_none_or(|t| conflict.last_combat_tick == Some(t))
    }
}

/// Which faction a metric or narrative query is scoped to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FactionScope {
    #[default]
    Any,
    /// Only metrics recorded without a faction.
    Global,
    Faction(String),
}

impl FactionScope {
    fn matches(&self, faction_id: Option<&str>) -> bool {
        match self {
            FactionScope::Any => true,
            FactionScope::Global => faction_id.is_none(),
            FactionScope::Faction(id) => faction_id == Some(id.as_str()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricFilter {
    pub scope: FactionScope,
    pub system: Option<SystemType>,
    pub metric_key: Option<String>,
    /// Inclusive lower tick bound.
    pub from_tick: Option<u64>,
    /// Inclusive upper tick bound.
    pub to_tick: Option<u64>,
}

impl MetricFilter {
    pub fn key(metric_key: &str) -> Self {
        Self {
            metric_key: Some(metric_key.to_string()),
            ..Self::default()
        }
    }

    pub fn faction(mut self, faction_id: &str) -> Self {
        self.scope = FactionScope::Faction(faction_id.to_string());
        self
    }

    pub fn global(mut self) -> Self {
        self.scope = FactionScope::Global;
        self
    }

    pub fn system(mut self, system: SystemType) -> Self {
        self.system = Some(system);
        self
    }

    /// Restrict to the `window` ticks ending at `tick`, inclusive.
    pub fn window(mut self, tick: u64, window: u64) -> Self {
        self.from_tick = Some(tick.saturating_sub(window.saturating_sub(1)));
        self.to_tick = Some(tick);
        self
    }

    pub fn at_tick(mut self, tick: u64) -> Self {
        self.from_tick = Some(tick);
        self.to_tick = Some(tick);
        self
    }

    pub fn matches(&self, metric: &TickMetric) -> bool {
        self.scope.matches(metric.faction_id.as_deref())
            && self.system.is_none_or(|s| s == metric.system)
            && self
                .metric_key
                .as_ref()
                .is_none_or(|k| *k == metric.metric_key)
            && self.from_tick.is_none_or(|t| metric.tick >= t)
            && self.to_tick.is_none_or(|t| metric.tick <= t)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NarrativeFilter {
    pub faction_id: Option<String>,
    pub from_tick: Option<u64>,
    pub to_tick: Option<u64>,
}

impl NarrativeFilter {
    pub fn faction(faction_id: &str) -> Self {
        Self {
            faction_id: Some(faction_id.to_string()),
            ..Self::default()
        }
    }

    pub fn at_tick(mut self, tick: u64) -> Self {
        self.from_tick = Some(tick);
        self.to_tick = Some(tick);
        self
    }

    pub fn matches(&self, event: &NarrativeEvent) -> bool {
        self.faction_id
            .as_ref()
            .is_none_or(|id| *id == event.faction_id)
            && self.from_tick.is_none_or(|t| event.tick >= t)
            && self.to_tick.is_none_or(|t| event.tick <= t)
    }
}
