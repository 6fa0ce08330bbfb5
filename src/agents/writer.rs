use super::StageModel;
use super::outline::Outline;
use crate::content::Draft;
use crate::error::{PipelineError, Result};
use crate::prompt::{PromptLibrary, WRITER_SYSTEM_PROMPT};
use crate::style::AuthorStyleProfile;
use std::sync::Arc;

/// Turns the outline into the first draft.
pub struct WriterAgent {
    model: StageModel,
    prompts: Arc<PromptLibrary>,
    min_words: usize,
    max_words: usize,
}

impl WriterAgent {
    pub fn new(
        model: StageModel,
        prompts: Arc<PromptLibrary>,
        min_words: usize,
        max_words: usize,
    ) -> Self {
        Self {
            model,
            prompts,
            min_words,
            max_words,
        }
    }

    pub async fn run(&self, outline: &Outline, style: Option<&AuthorStyleProfile>) -> Result<Draft> {
        let message = self
            .prompts
            .writer(
                &outline.markdown,
                style.map(|p| p.description.as_str()),
                self.min_words,
                self.max_words,
            )
            .map_err(|e| PipelineError::GenerationService {
                stage: "writer".into(),
                message: format!("prompt rendering failed: {e}"),
            })?;

        let content = self
            .model
            .generate("writer", WRITER_SYSTEM_PROMPT, &message)
            .await?;
        let draft = Draft::initial(content);
        tracing::info!(words = draft.word_count(), "First draft written");
        Ok(draft)
    }
}
