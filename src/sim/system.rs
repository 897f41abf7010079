use super::context::TickContext;
use crate::store::StoreError;

/// One stage of the per-tick pipeline.
///
/// Object-safe so the scheduler can hold systems as `Box<dyn SimSystem>`.
/// Returning an error aborts the tick; systems that isolate per-entity
/// failures push them to `ctx.failures` instead and return `Ok`.
pub trait SimSystem {
    fn name(&self) -> &str;
    fn tick(&mut self, ctx: &mut TickContext) -> Result<(), StoreError>;
}
