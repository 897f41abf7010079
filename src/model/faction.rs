use serde::{Deserialize, Serialize};

/// A political actor ("state") competing in the world.
///
/// Created externally (seed file or importer). Every field except `id` and
/// `name` may be rewritten by the simulation each tick; factions are never
/// deleted by the core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Faction {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub treasury: f64,
    /// Conceptually 0–100. Only the upper bound is enforced (by the event system).
    #[serde(default)]
    pub stability: f64,
    #[serde(default)]
    pub territories: u32,
    /// Never negative after the war system has run.
    #[serde(default)]
    pub military_strength: f64,
    /// This faction's view of others. Not required to be symmetric.
    #[serde(default)]
    pub relations: Vec<Relation>,
    #[serde(default)]
    pub objectives: Vec<Objective>,
    #[serde(default)]
    pub llm: LlmStatus,
    /// Display-only; the simulation never touches these.
    #[serde(default)]
    pub alerts: Vec<Alert>,
}

impl Faction {
    /// A faction with zeroed resources and no relations.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            treasury: 0.0,
            stability: 0.0,
            territories: 0,
            military_strength: 0.0,
            relations: Vec::new(),
            objectives: Vec::new(),
            llm: LlmStatus::default(),
            alerts: Vec::new(),
        }
    }

    pub fn relation(&self, target_faction_id: &str) -> Option<&Relation> {
        self.relations
            .iter()
            .find(|r| r.target_faction_id == target_faction_id)
    }

    pub fn is_ai_controlled(&self) -> bool {
        self.llm.enabled
    }
}

/// One faction's disposition toward another, stored inline on the source faction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relation {
    pub target_faction_id: String,
    /// Typically within [-100, 100].
    #[serde(default)]
    pub attitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trade_volume: Option<f64>,
}

impl Relation {
    pub fn new(target_faction_id: impl Into<String>, attitude: f64) -> Self {
        Self {
            target_faction_id: target_faction_id.into(),
            attitude,
            trade_volume: None,
        }
    }
}

/// Node in a faction's objective tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Objective {
    pub id: String,
    pub title: String,
    pub status: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Objective>,
}

/// Whether the decision system steers this faction, and its decision budget.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LlmStatus {
    pub enabled: bool,
    #[serde(default)]
    pub decisions_per_era: u32,
    #[serde(default)]
    pub remaining_quota: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    #[serde(rename = "type")]
    pub kind: String,
    pub severity: String,
    pub message: String,
}

/// Partial write to a faction. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FactionUpdate {
    pub treasury: Option<f64>,
    pub stability: Option<f64>,
    pub military_strength: Option<f64>,
    pub relations: Option<Vec<Relation>>,
}

impl FactionUpdate {
    pub fn treasury(value: f64) -> Self {
        Self {
            treasury: Some(value),
            ..Self::default()
        }
    }

    pub fn stability(value: f64) -> Self {
        Self {
            stability: Some(value),
            ..Self::default()
        }
    }

    pub fn relations(relations: Vec<Relation>) -> Self {
        Self {
            relations: Some(relations),
            ..Self::default()
        }
    }

    pub fn apply(self, faction: &mut Faction) {
        if let Some(v) = self.treasury {
            faction.treasury = v;
        }
        if let Some(v) = self.stability {
            faction.stability = v;
        }
        if let Some(v) = self.military_strength {
            faction.military_strength = v;
        }
        if let Some(v) = self.relations {
            faction.relations = v;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_json_defaults_missing_fields() {
        let json = r#"{"id":"F1","name":"Azgaar","relations":[{"target_faction_id":"F2","attitude":-45}]}"#;
        let f: Faction = serde_json::from_str(json).unwrap();
        assert_eq!(f.treasury, 0.0);
        assert!(!f.is_ai_controlled());
        assert_eq!(f.relation("F2").map(|r| r.attitude), Some(-45.0));
        assert!(f.relation("F3").is_none());
    }

    #[test]
    fn alert_kind_serializes_as_type() {
        let alert = Alert {
            kind: "war".to_string(),
            severity: "high".to_string(),
            message: "Open war".to_string(),
        };
        let json = serde_json::to_value(&alert).unwrap();
        assert_eq!(json["type"], "war");
    }

    #[test]
    fn update_only_touches_set_fields() {
        let mut f = Faction {
            treasury: 10.0,
            stability: 50.0,
            ..Faction::new("A", "Alpha")
        };
        FactionUpdate::treasury(25.0).apply(&mut f);
        assert_eq!(f.treasury, 25.0);
        assert_eq!(f.stability, 50.0);

        // Control and identity are outside the simulation's reach
        f.llm.enabled = true;
        FactionUpdate {
            stability: Some(10.0),
            military_strength: Some(3.0),
            relations: Some(vec![Relation::new("B", -5.0)]),
            ..FactionUpdate::default()
        }
        .apply(&mut f);
        assert!(f.is_ai_controlled());
        assert_eq!(f.name, "Alpha");
        assert_eq!(f.military_strength, 3.0);
    }
}
