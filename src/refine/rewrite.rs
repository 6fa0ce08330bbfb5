use crate::agents::StageModel;
use crate::content::Draft;
use crate::error::{PipelineError, Result};
use crate::prompt::{PromptLibrary, REWRITE_SYSTEM_PROMPT, RewritePrompt};
use crate::scoring::SimilarityScore;
use crate::style::AuthorStyleProfile;
use std::sync::Arc;

/// Produces the next draft from the current one and its score.
pub struct StyleRewriter {
    model: StageModel,
    prompts: Arc<PromptLibrary>,
    min_words: usize,
    max_words: usize,
}

impl StyleRewriter {
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

    pub async fn rewrite(
        &self,
        draft: &Draft,
        profile: &AuthorStyleProfile,
        feedback: &SimilarityScore,
        attempt: u32,
    ) -> Result<Draft> {
        let message = self
            .prompts
            .rewrite(&RewritePrompt {
                author: &profile.author,
                description: &profile.description,
                examples: &profile.examples,
                score: feedback,
                attempt,
                draft: draft.content(),
                min_words: self.min_words,
                max_words: self.max_words,
            })
            .map_err(|e| PipelineError::GenerationService {
                stage: "style".into(),
                message: format!("prompt rendering failed: {e}"),
            })?;

        let content = self
            .model
            .generate("style", REWRITE_SYSTEM_PROMPT, &message)
            .await?;
        Ok(draft.revise(content))
    }
}
