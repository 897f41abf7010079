#![allow(dead_code)]

use statecraft::model::*;
use statecraft::store::Store;

/// Three factions with settlements, memories, a suggestion and one war.
pub fn build_test_world() -> World {
    let mut world = World::new();
    world.current_tick = 10;

    world
        .insert_faction(Faction {
            treasury: 1200.0,
            stability: 55.0,
            territories: 3,
            military_strength: 40.0,
            relations: vec![Relation::new("carth", -85.0), Relation::new("ilos", 12.0)],
            llm: LlmStatus {
                enabled: true,
                decisions_per_era: 4,
                remaining_quota: 4,
            },
            alerts: vec![Alert {
                kind: "border".into(),
                severity: "high".into(),
                message: "Raids in the\tnorth".into(),
            }],
            ..Faction::new("aurel", "Aurelian League")
        })
        .unwrap();
    world
        .insert_faction(Faction {
            treasury: 150.0,
            stability: 40.0,
            territories: 2,
            military_strength: 25.0,
            relations: vec![Relation::new("aurel", -70.0)],
            ..Faction::new("carth", "Carthen Marches")
        })
        .unwrap();
    world
        .insert_faction(Faction {
            treasury: 600.0,
            stability: 70.0,
            territories: 1,
            military_strength: 10.0,
            relations: vec![Relation {
                trade_volume: Some(250.0),
                ..Relation::new("aurel", 20.0)
            }],
            objectives: vec![Objective {
                id: "o1".into(),
                title: "Open the straits".into(),
                status: "active".into(),
                children: vec![],
            }],
            ..Faction::new("ilos", "Ilos")
        })
        .unwrap();

    for (id, owner, population, tier) in [
        ("s1", "aurel", 12_000, 3),
        ("s2", "carth", 4_000, 1),
        ("s3", "ilos", 6_500, 2),
    ] {
        world.settlements.insert(
            id.to_string(),
            Settlement {
                id: id.to_string(),
                name: format!("Town {id}"),
                owner_faction_id: owner.to_string(),
                population,
                market_tier: tier,
                garrison: 5,
            },
        );
    }

    world
        .insert_political_memory(NewPoliticalMemory::new("ilos", "aurel", "trade_pact", 20.0))
        .unwrap();
    world
        .insert_political_memory(
            NewPoliticalMemory::new("aurel", "carth", "border_raids", -90.0).expiring_at(40),
        )
        .unwrap();
    world
        .insert_suggestion(NewSuggestion::new("ilos", 10, "Fund the lighthouse"))
        .unwrap();
    world
        .insert_conflict(NewConflict {
            aggressor_faction_id: "aurel".into(),
            defender_faction_id: "carth".into(),
            start_tick: 8,
        })
        .unwrap();

    world
}

pub fn read_lines(path: &std::path::Path) -> Vec<String> {
    std::fs::read_to_string(path)
        .unwrap()
        .lines()
        .filter(|l| !l.is_empty())
        .map(String::from)
        .collect()
}
