use rand::SeedableRng;
use rand::rngs::SmallRng;

use crate::model::{Faction, LlmStatus, Relation, World};
use crate::sim::{SimSystem, SubsystemFailure, TickContext};

// ---------------------------------------------------------------------------
// Tick execution helpers
// ---------------------------------------------------------------------------

/// Run a single system at `tick` with a seeded RNG. Returns isolated failures.
///
/// Moves the world clock to `tick` first so store reads agree with the context.
/// Panics if the system aborts the tick.
pub fn tick_system(
    world: &mut World,
    system: &mut dyn SimSystem,
    tick: u64,
    seed: u64,
) -> Vec<SubsystemFailure> {
    world.current_tick = tick;
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut failures = Vec::new();
    let mut ctx = TickContext {
        store: world,
        rng: &mut rng,
        tick,
        failures: &mut failures,
    };
    if let Err(err) = system.tick(&mut ctx) {
        panic!("{} system failed at tick {tick}: {err}", system.name());
    }
    failures
}

/// Run `ticks` consecutive ticks of one system, starting after the current tick.
pub fn tick_system_for(world: &mut World, system: &mut dyn SimSystem, ticks: u64, seed: u64) {
    let start = world.current_tick;
    for t in 1..=ticks {
        tick_system(world, system, start + t, seed.wrapping_add(t));
    }
}

// ---------------------------------------------------------------------------
// Faction builders
// ---------------------------------------------------------------------------

/// A faction named after its id with the given attitudes toward others.
pub fn faction_with_relations(id: &str, relations: &[(&str, f64)]) -> Faction {
    Faction {
        relations: relations
            .iter()
            .map(|(target, attitude)| Relation::new(*target, *attitude))
            .collect(),
        ..Faction::new(id, id)
    }
}

/// An AI-controlled faction with the given treasury and military strength.
pub fn ai_faction(id: &str, treasury: f64, military_strength: f64) -> Faction {
    Faction {
        treasury,
        military_strength,
        stability: 60.0,
        llm: LlmStatus {
            enabled: true,
            decisions_per_era: 10,
            remaining_quota: 10,
        },
        ..Faction::new(id, id)
    }
}

/// Two mutually hostile factions of equal strength and wealth.
pub fn rival_world(attitude: f64, strength: f64, treasury: f64) -> World {
    let mut world = World::new();
    for (id, other) in [("A", "B"), ("B", "A")] {
        world.factions.insert(
            id.to_string(),
            Faction {
                treasury,
                military_strength: strength,
                ..faction_with_relations(id, &[(other, attitude)])
            },
        );
    }
    world
}
