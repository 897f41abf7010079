#[macro_use]
mod macros;

pub mod conflict;
pub mod faction;
pub mod memory;
pub mod metric;
pub mod narrative;
pub mod settlement;
pub mod suggestion;
pub mod world;

pub use conflict::{Conflict, ConflictResolution, ConflictStatus, NewConflict};
pub use faction::{Alert, Faction, FactionUpdate, LlmStatus, Objective, Relation};
pub use memory::{NewPoliticalMemory, PoliticalMemory};
pub use metric::{NewTickMetric, SystemType, TickMetric, keys};
pub use narrative::NarrativeEvent;
pub use settlement::Settlement;
pub use suggestion::{NewSuggestion, Suggestion, SuggestionStatus};
pub use world::{World, WorldSeed};
