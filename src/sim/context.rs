use std::fmt;

use rand::RngCore;
use serde::Serialize;
use thiserror::Error;

use crate::ai::CapabilityError;
use crate::store::{Store, StoreError};

/// Context passed to each system on every tick.
///
/// Bundled so fields can be added later without changing the `SimSystem`
/// trait signature.
pub struct TickContext<'a> {
    pub store: &'a mut dyn Store,
    pub rng: &'a mut dyn RngCore,
    /// The tick being simulated (already advanced by the scheduler).
    pub tick: u64,
    /// Per-entity failures that were isolated rather than aborting the tick.
    pub failures: &'a mut Vec<SubsystemFailure>,
}

impl TickContext<'_> {
    /// Record an isolated failure and keep going.
    pub fn isolate(
        &mut self,
        system: &str,
        faction_id: Option<&str>,
        error: impl fmt::Display,
    ) {
        tracing::warn!(
            system,
            faction_id = faction_id.unwrap_or("-"),
            tick = self.tick,
            "{error}"
        );
        self.failures.push(SubsystemFailure {
            system: system.to_string(),
            faction_id: faction_id.map(str::to_string),
            message: error.to_string(),
        });
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubsystemFailure {
    pub system: String,
    pub faction_id: Option<String>,
    pub message: String,
}

/// What can go wrong while handling a single entity in an isolating system.
#[derive(Debug, Error)]
pub enum SubsystemError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Capability(#[from] CapabilityError),
}
