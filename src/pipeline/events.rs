use super::state::Stage;
use crate::error::PipelineError;
use crate::scoring::SimilarityScore;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;
use tokio::sync::mpsc;

/// Metadata attached to the final post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultMetadata {
    pub word_count: usize,
    pub validated: bool,
}

/// Terminal artifact of a successful or best-effort request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationResult {
    pub blog: String,
    pub metadata: ResultMetadata,
}

/// Outbound session message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PipelineEvent {
    Status {
        stage: Stage,
        message: String,
    },
    Progress {
        word_count: usize,
    },
    Similarity {
        combined_similarity: f64,
        embedding_similarity: f64,
        llm_similarity: f64,
        author: String,
        rewrite_attempts: u32,
    },
    Complete {
        blog: String,
        metadata: ResultMetadata,
    },
    Error {
        message: String,
    },
}

impl PipelineEvent {
    pub fn status(stage: Stage) -> Self {
        Self::Status {
            stage,
            message: stage.status_message().to_string(),
        }
    }

    pub fn similarity(score: &SimilarityScore, author: &str) -> Self {
        Self::Similarity {
            combined_similarity: score.combined_similarity,
            embedding_similarity: score.embedding_similarity,
            llm_similarity: score.llm_similarity,
            author: author.to_string(),
            rewrite_attempts: score.rewrite_attempts,
        }
    }

    pub fn complete(result: GenerationResult) -> Self {
        Self::Complete {
            blog: result.blog,
            metadata: result.metadata,
        }
    }

    pub fn error(err: &PipelineError) -> Self {
        Self::Error {
            message: err.to_string(),
        }
    }

    /// `complete` and `error` end a session.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete { .. } | Self::Error { .. })
    }
}

/// Consumer of pipeline events.
///
/// `emit` fails with [`PipelineError::ConnectionClosed`] once the consumer is
/// gone; the orchestrator then stops without emitting anything else.
pub trait EventSink: Send + Sync {
    fn emit<'a>(
        &'a self,
        event: PipelineEvent,
    ) -> Pin<Box<dyn Future<Output = Result<(), PipelineError>> + Send + 'a>>;
}

/// Forwards events into a bounded channel.
pub struct ChannelSink {
    tx: mpsc::Sender<PipelineEvent>,
}

impl ChannelSink {
    pub fn new(tx: mpsc::Sender<PipelineEvent>) -> Self {
        Self { tx }
    }
}

impl EventSink for ChannelSink {
    fn emit<'a>(
        &'a self,
        event: PipelineEvent,
    ) -> Pin<Box<dyn Future<Output = Result<(), PipelineError>> + Send + 'a>> {
        Box::pin(async move {
            self.tx
                .send(event)
                .await
                .map_err(|_| PipelineError::ConnectionClosed)
        })
    }
}
