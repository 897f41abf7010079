use serde::Serialize;

use super::CapabilityError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NarrativeRequest {
    pub faction_id: String,
    pub faction_name: String,
    pub tick: u64,
    pub summary: String,
}

/// Turns a short summary of what happened into narrative text.
pub trait Narrator {
    fn generate_narrative(&mut self, req: &NarrativeRequest) -> Result<String, CapabilityError>;
}

/// Fixed sentence naming the faction. Always available.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateNarrator;

impl Narrator for TemplateNarrator {
    fn generate_narrative(&mut self, req: &NarrativeRequest) -> Result<String, CapabilityError> {
        Ok(format!("A suggestion was applied to {}.", req.faction_name))
    }
}

type NarrativeFn = dyn FnMut(&NarrativeRequest) -> Result<String, CapabilityError>;

pub struct ExternalNarrator {
    provider: Box<NarrativeFn>,
}

impl ExternalNarrator {
    pub fn new(
        provider: impl FnMut(&NarrativeRequest) -> Result<String, CapabilityError> + 'static,
    ) -> Self {
        Self {
            provider: Box::new(provider),
        }
    }
}

impl Narrator for ExternalNarrator {
    fn generate_narrative(&mut self, req: &NarrativeRequest) -> Result<String, CapabilityError> {
        (self.provider)(req)
    }
}
