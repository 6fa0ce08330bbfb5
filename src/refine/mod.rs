//! Bounded style refinement.
//!
//! ```text
//!            +-----------+  combined >= threshold   +-----------+
//!   draft -> |  Scoring  | -----------------------> | Converged |
//!            +-----------+                          +-----------+
//!              |      ^     attempts >= max         +-----------+
//!              |      |  -------------------------> | Exhausted |
//!              v      |                             +-----------+
//!            +-----------+
//!            | Rewriting |  attempts += 1
//!            +-----------+
//! ```
//!
//! Every scoring pass emits one `similarity` event and every rewrite one
//! `progress` event. Exhaustion returns the latest draft, not the best one.

mod rewrite;

pub use rewrite::StyleRewriter;

use crate::content::Draft;
use crate::error::{PipelineError, Result};
use crate::pipeline::{EventSink, PipelineEvent};
use crate::scoring::{SimilarityScore, SimilarityScorer};
use crate::style::{AuthorStyleProfile, StyleLibrary};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum LoopState {
    Scoring,
    Rewriting,
    Converged,
    Exhausted,
}

/// Loop limits.
#[derive(Debug, Clone, Copy)]
pub struct RefinementSettings {
    pub threshold: f64,
    pub max_attempts: u32,
    pub iteration_delay: Duration,
}

/// What the loop hands to the editor.
#[derive(Debug, Clone)]
pub struct RefinementOutcome {
    pub draft: Draft,
    pub score: SimilarityScore,
    pub author: String,
    pub state: LoopState,
}

impl RefinementOutcome {
    pub fn converged(&self) -> bool {
        self.state == LoopState::Converged
    }

    pub fn rewrite_attempts(&self) -> u32 {
        self.score.rewrite_attempts
    }
}

pub struct RefinementLoop<'a> {
    scorer: &'a SimilarityScorer,
    rewriter: &'a StyleRewriter,
    settings: RefinementSettings,
    sink: &'a dyn EventSink,
    cancel: &'a CancellationToken,
}

impl<'a> RefinementLoop<'a> {
    pub fn new(
        scorer: &'a SimilarityScorer,
        rewriter: &'a StyleRewriter,
        settings: RefinementSettings,
        sink: &'a dyn EventSink,
        cancel: &'a CancellationToken,
    ) -> Self {
        Self {
            scorer,
            rewriter,
            settings,
            sink,
            cancel,
        }
    }

    /// Drive `initial` to a terminal state against the closest author in `library`.
    pub async fn run(&self, initial: Draft, library: &StyleLibrary) -> Result<RefinementOutcome> {
        self.ensure_open()?;

        // The first embedding both picks the target author and scores the draft.
        let embedding = self.scorer.embed(&initial).await?;
        let (profile, _) = library.closest(&embedding);
        tracing::info!(author = %profile.author, "Refining towards closest author");

        let mut draft = initial;
        let mut pending_embedding = Some(embedding);
        let mut attempts: u32 = 0;
        let mut last_score: Option<SimilarityScore> = None;
        let mut state = LoopState::Scoring;

        loop {
            state = match state {
                LoopState::Scoring => {
                    self.ensure_open()?;
                    let score = match pending_embedding.take() {
                        Some(embedding) => {
                            self.scorer
                                .score_embedded(&draft, &embedding, profile, attempts)
                                .await?
                        }
                        None => self.scorer.score(&draft, profile, attempts).await?,
                    };
                    self.ensure_open()?;
                    self.sink
                        .emit(PipelineEvent::similarity(&score, &profile.author))
                        .await?;
                    last_score = Some(score);
                    self.next_state(&score, attempts)
                }
                LoopState::Rewriting => {
                    let Some(feedback) = last_score else {
                        return Err(internal("rewrite requested before scoring"));
                    };
                    if attempts > 0 {
                        self.pause().await?;
                    }
                    self.ensure_open()?;
                    attempts += 1;
                    draft = self
                        .rewriter
                        .rewrite(&draft, profile, &feedback, attempts)
                        .await?;
                    self.ensure_open()?;
                    self.sink
                        .emit(PipelineEvent::Progress {
                            word_count: draft.word_count(),
                        })
                        .await?;
                    LoopState::Scoring
                }
                LoopState::Converged | LoopState::Exhausted => break,
            };
            tracing::debug!(state = %state, attempts, "Refinement transition");
        }

        let score = last_score.ok_or_else(|| internal("loop finished without a score"))?;
        Ok(self.finish(draft, score, profile, state))
    }

    fn next_state(&self, score: &SimilarityScore, attempts: u32) -> LoopState {
        if score.combined_similarity >= self.settings.threshold {
            LoopState::Converged
        } else if attempts >= self.settings.max_attempts {
            LoopState::Exhausted
        } else {
            LoopState::Rewriting
        }
    }

    fn finish(
        &self,
        draft: Draft,
        score: SimilarityScore,
        profile: &AuthorStyleProfile,
        state: LoopState,
    ) -> RefinementOutcome {
        match state {
            LoopState::Converged => tracing::info!(
                combined = score.combined_similarity,
                attempts = score.rewrite_attempts,
                "Style converged"
            ),
            _ => tracing::warn!(
                combined = score.combined_similarity,
                threshold = self.settings.threshold,
                attempts = score.rewrite_attempts,
                "Rewrite budget exhausted, delivering latest draft"
            ),
        }
        RefinementOutcome {
            draft,
            score,
            author: profile.author.clone(),
            state,
        }
    }

    fn ensure_open(&self) -> Result<()> {
        if self.cancel.is_cancelled() {
            return Err(PipelineError::ConnectionClosed);
        }
        Ok(())
    }

    async fn pause(&self) -> Result<()> {
        if self.settings.iteration_delay.is_zero() {
            return Ok(());
        }
        tokio::select! {
            () = self.cancel.cancelled() => Err(PipelineError::ConnectionClosed),
            () = tokio::time::sleep(self.settings.iteration_delay) => Ok(()),
        }
    }
}

fn internal(message: &str) -> PipelineError {
    PipelineError::GenerationService {
        stage: "style".into(),
        message: message.into(),
    }
}
