//! Similarity scoring of drafts against author style profiles.
//!
//! `embedding_similarity` is the clamped cosine between the draft embedding
//! and the author centroid, `llm_similarity` comes from a [`StyleJudge`], and
//! `combined_similarity` is their weighted mean under [`ScoreWeights`].

mod judge;
pub mod vector;

pub use judge::{LlmJudge, StyleJudge, parse_score};

use crate::config::StyleConfig;
use crate::content::Draft;
use crate::error::{PipelineError, Result};
use crate::llm::EmbeddingProvider;
use crate::style::AuthorStyleProfile;
use serde::Serialize;
use std::sync::Arc;

/// One scoring pass over one draft.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SimilarityScore {
    pub embedding_similarity: f64,
    pub llm_similarity: f64,
    pub combined_similarity: f64,
    pub rewrite_attempts: u32,
}

/// Normalised weights of the two similarity signals.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreWeights {
    embedding: f64,
    llm: f64,
}

impl ScoreWeights {
    /// Weights are normalised to sum to one. Non-finite, negative or all-zero
    /// input falls back to equal weighting.
    pub fn new(embedding: f64, llm: f64) -> Self {
        let valid = |w: f64| w.is_finite() && w >= 0.0;
        let total = embedding + llm;
        if !valid(embedding) || !valid(llm) || total <= f64::EPSILON {
            return Self::equal();
        }
        Self {
            embedding: embedding / total,
            llm: llm / total,
        }
    }

    pub fn equal() -> Self {
        Self {
            embedding: 0.5,
            llm: 0.5,
        }
    }

    pub fn from_config(config: &StyleConfig) -> Self {
        Self::new(config.embedding_weight, config.llm_weight)
    }

    pub fn embedding(&self) -> f64 {
        self.embedding
    }

    pub fn llm(&self) -> f64 {
        self.llm
    }

    pub fn combine(&self, embedding_similarity: f64, llm_similarity: f64) -> f64 {
        (self.embedding * embedding_similarity + self.llm * llm_similarity).clamp(0.0, 1.0)
    }
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self::equal()
    }
}

/// Clamp a raw cosine into the reported [0, 1] range.
pub fn reported_similarity(cosine: f64) -> f64 {
    if cosine.is_nan() {
        return 0.0;
    }
    cosine.clamp(0.0, 1.0)
}

/// Scores drafts with an embedding provider and a judge.
pub struct SimilarityScorer {
    embedder: Arc<dyn EmbeddingProvider>,
    judge: Arc<dyn StyleJudge>,
    weights: ScoreWeights,
}

impl SimilarityScorer {
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        judge: Arc<dyn StyleJudge>,
        weights: ScoreWeights,
    ) -> Self {
        Self {
            embedder,
            judge,
            weights,
        }
    }

    pub fn weights(&self) -> ScoreWeights {
        self.weights
    }

    pub async fn embed(&self, draft: &Draft) -> Result<Vec<f32>> {
        self.embedder
            .embed_one(draft.content())
            .await
            .map_err(|e| PipelineError::from_llm("style", &e))
    }

    /// Score `draft` against `profile`.
    pub async fn score(
        &self,
        draft: &Draft,
        profile: &AuthorStyleProfile,
        rewrite_attempts: u32,
    ) -> Result<SimilarityScore> {
        let embedding = self.embed(draft).await?;
        self.score_embedded(draft, &embedding, profile, rewrite_attempts)
            .await
    }

    /// Score with a draft embedding the caller already holds.
    pub async fn score_embedded(
        &self,
        draft: &Draft,
        embedding: &[f32],
        profile: &AuthorStyleProfile,
        rewrite_attempts: u32,
    ) -> Result<SimilarityScore> {
        let embedding_similarity =
            reported_similarity(vector::cosine_similarity(embedding, &profile.embedding));

        let llm_similarity = self
            .judge
            .judge(draft.content(), profile)
            .await
            .map(reported_similarity)
            .map_err(|e| PipelineError::from_llm("style", &e))?;

        let combined_similarity = self.weights.combine(embedding_similarity, llm_similarity);

        tracing::debug!(
            author = %profile.author,
            embedding = embedding_similarity,
            judge = llm_similarity,
            combined = combined_similarity,
            rewrite_attempts,
            "Scored draft"
        );

        Ok(SimilarityScore {
            embedding_similarity,
            llm_similarity,
            combined_similarity,
            rewrite_attempts,
        })
    }
}
