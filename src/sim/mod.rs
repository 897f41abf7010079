mod config;
mod context;
mod decision;
mod economy;
mod event;
mod political;
mod runner;
mod system;
mod war;

pub use config::{DecisionConfig, EconomicConfig, EventConfig, SimConfig, WarConfig};
pub use context::{SubsystemError, SubsystemFailure, TickContext};
pub use decision::{DecisionSystem, decision_text, hostile_average};
pub use economy::{EconomicSystem, Ledger};
pub use event::{EventSystem, resolution_text};
pub use political::{PoliticalSystem, step_toward};
pub use runner::{SimCore, SimError, TickReport};
pub use system::SimSystem;
pub use war::{CombatRound, WarSystem, combat_round};
