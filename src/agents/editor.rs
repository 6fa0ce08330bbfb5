use super::StageModel;
use crate::content::{ContentRules, Draft, validate};
use crate::error::{PipelineError, Result};
use crate::prompt::{EDITOR_SYSTEM_PROMPT, PromptLibrary};
use std::sync::Arc;

/// The polished draft and every structural constraint it misses.
#[derive(Debug, Clone)]
pub struct EditedDraft {
    pub draft: Draft,
    pub problems: Vec<String>,
}

impl EditedDraft {
    pub fn constraints_met(&self) -> bool {
        self.problems.is_empty()
    }

    /// Unmet constraints as the non-fatal validation error.
    pub fn validation_error(&self) -> Option<PipelineError> {
        (!self.problems.is_empty()).then(|| PipelineError::ValidationFailed(self.problems.clone()))
    }
}

/// Final grammar and clarity pass plus constraint checks.
pub struct EditorAgent {
    model: StageModel,
    prompts: Arc<PromptLibrary>,
}

impl EditorAgent {
    pub fn new(model: StageModel, prompts: Arc<PromptLibrary>) -> Self {
        Self { model, prompts }
    }

    pub async fn run(&self, draft: &Draft, rules: &ContentRules) -> Result<EditedDraft> {
        let message = self
            .prompts
            .editor(
                draft.content(),
                &rules.required_headers,
                rules.min_words,
                rules.max_words,
            )
            .map_err(|e| PipelineError::GenerationService {
                stage: "editor".into(),
                message: format!("prompt rendering failed: {e}"),
            })?;

        let polished = self
            .model
            .generate("editor", EDITOR_SYSTEM_PROMPT, &message)
            .await?;
        let draft = draft.revise(polished);
        let problems = validate(draft.content(), rules);
        if !problems.is_empty() {
            tracing::warn!(problems = ?problems, "Edited draft misses content constraints");
        }
        Ok(EditedDraft { draft, problems })
    }
}
