//! Single-shot generation stages.

mod editor;
mod outline;
mod writer;

pub use editor::{EditedDraft, EditorAgent};
pub use outline::{Outline, OutlineAgent, OutlineSection};
pub use writer::WriterAgent;

use crate::content::normalize;
use crate::error::{PipelineError, Result};
use crate::llm::Provider;
use std::sync::Arc;

/// Model binding shared by the stage agents.
#[derive(Clone)]
pub struct StageModel {
    provider: Arc<dyn Provider>,
    model: String,
    temperature: f64,
}

impl StageModel {
    pub fn new(provider: Arc<dyn Provider>, model: &str, temperature: f64) -> Self {
        Self {
            provider,
            model: model.to_string(),
            temperature,
        }
    }

    /// Run one call and normalise the answer into the supported markdown subset.
    pub async fn generate(&self, stage: &str, system_prompt: &str, message: &str) -> Result<String> {
        let raw = self
            .provider
            .chat_with_system(Some(system_prompt), message, &self.model, self.temperature)
            .await
            .map_err(|e| PipelineError::from_llm(stage, &e))?;

        let text = normalize(&raw);
        if text.is_empty() {
            return Err(PipelineError::GenerationService {
                stage: stage.to_string(),
                message: "model returned only whitespace".into(),
            });
        }
        Ok(text)
    }
}
