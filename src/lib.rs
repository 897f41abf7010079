#[macro_use]
pub mod model;

pub mod ai;
pub mod db;
pub mod flush;
pub mod id;
pub mod sim;
pub mod store;
pub mod testutil;

pub use id::IdGenerator;
pub use model::{Conflict, Faction, World, WorldSeed};
pub use sim::{SimConfig, SimCore, SimError, TickReport};
pub use store::{Store, StoreError};
