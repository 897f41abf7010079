//! Pluggable decision and narrative providers.
//!
//! Both capabilities are chosen when the scheduler is built; the heuristic and
//! template variants need nothing external and are the defaults.

mod decision;
mod narrative;

use thiserror::Error;

pub use decision::{
    Decision, DecisionAction, DecisionContext, DecisionMaker, ExternalDecisionMaker,
    HeuristicDecisionMaker,
};
pub use narrative::{ExternalNarrator, NarrativeRequest, Narrator, TemplateNarrator};

#[derive(Debug, Error)]
pub enum CapabilityError {
    #[error("decision provider failed: {0}")]
    Decision(String),
    #[error("narrative provider failed: {0}")]
    Narrative(String),
}
