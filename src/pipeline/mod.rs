//! Request orchestration: Outline -> Writer -> Style refinement -> Editor.

mod events;
mod request;
mod state;

pub use events::{ChannelSink, EventSink, GenerationResult, PipelineEvent, ResultMetadata};
pub use request::GenerationRequest;
pub use state::{PipelineState, Stage, StageTransition};

use crate::agents::{EditorAgent, OutlineAgent, StageModel, WriterAgent};
use crate::config::Config;
use crate::content::ContentRules;
use crate::corpus::{CorpusSource, Rss2JsonSource};
use crate::error::{PipelineError, Result};
use crate::llm::{EmbeddingProvider, Provider, create_resilient_embedding, create_resilient_provider};
use crate::prompt::PromptLibrary;
use crate::refine::{RefinementLoop, RefinementSettings, StyleRewriter};
use crate::scoring::{LlmJudge, ScoreWeights, SimilarityScorer, StyleJudge};
use crate::style::{ProfileBuilder, ProfileCache, StyleLibrary};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Long-lived collaborators shared by every session.
pub struct Services {
    pub config: Arc<Config>,
    pub provider: Arc<dyn Provider>,
    pub embedder: Arc<dyn EmbeddingProvider>,
    pub judge: Arc<dyn StyleJudge>,
    pub corpus: Arc<dyn CorpusSource>,
    pub cache: Arc<ProfileCache>,
    pub prompts: Arc<PromptLibrary>,
}

impl Services {
    /// Wire the configured providers, each wrapped with timeout and retries.
    pub fn from_config(config: Config) -> anyhow::Result<Self> {
        let provider = create_resilient_provider(&config)?;
        let embedder = create_resilient_embedding(&config)?;
        let corpus: Arc<dyn CorpusSource> = Arc::new(Rss2JsonSource::new(&config.corpus));
        Self::new(config, provider, embedder, corpus)
    }

    /// Assemble services around explicit collaborators; the judge defaults to
    /// an [`LlmJudge`] over `provider`.
    pub fn new(
        config: Config,
        provider: Arc<dyn Provider>,
        embedder: Arc<dyn EmbeddingProvider>,
        corpus: Arc<dyn CorpusSource>,
    ) -> anyhow::Result<Self> {
        let prompts = Arc::new(PromptLibrary::new()?);
        let judge: Arc<dyn StyleJudge> = Arc::new(LlmJudge::new(
            Arc::clone(&provider),
            Arc::clone(&prompts),
            config.llm.judge_model(),
        ));
        let cache = Arc::new(ProfileCache::new(config.style.cache_profiles));
        Ok(Self {
            config: Arc::new(config),
            provider,
            embedder,
            judge,
            corpus,
            cache,
            prompts,
        })
    }

    #[must_use]
    pub fn with_judge(mut self, judge: Arc<dyn StyleJudge>) -> Self {
        self.judge = judge;
        self
    }

    async fn style_library(&self, style_source: &str) -> Result<Arc<StyleLibrary>> {
        self.cache
            .get_or_build(style_source, || async {
                let texts = self.corpus.fetch(style_source).await?;
                ProfileBuilder::new(Arc::clone(&self.embedder), &self.config.style)
                    .build(texts)
                    .await
            })
            .await
    }
}

/// Runs one request. Not shared across sessions.
pub struct Orchestrator {
    services: Arc<Services>,
    state: PipelineState,
}

impl Orchestrator {
    pub fn new(services: Arc<Services>) -> Self {
        Self {
            services,
            state: PipelineState::new(),
        }
    }

    pub fn state(&self) -> &PipelineState {
        &self.state
    }

    /// Run the pipeline, reporting the outcome on `sink`.
    ///
    /// Exactly one of `complete` or `error` ends the event stream unless the
    /// consumer went away, in which case nothing more is emitted.
    pub async fn run(
        &mut self,
        request: &GenerationRequest,
        sink: &dyn EventSink,
        cancel: &CancellationToken,
    ) -> Result<GenerationResult> {
        let outcome = self.execute(request, sink, cancel).await;
        if let Err(err) = &outcome {
            if err.is_reportable() && !cancel.is_cancelled() {
                tracing::error!(stage = ?self.state.current_stage(), "Pipeline failed: {err}");
                // The consumer may already be gone; nothing left to report to.
                let _ = sink.emit(PipelineEvent::error(err)).await;
            } else {
                tracing::info!("Session closed by client, pipeline aborted");
            }
        }
        outcome
    }

    async fn execute(
        &mut self,
        request: &GenerationRequest,
        sink: &dyn EventSink,
        cancel: &CancellationToken,
    ) -> Result<GenerationResult> {
        let services = Arc::clone(&self.services);
        let config = &services.config;

        ensure_open(cancel)?;
        let library = services.style_library(request.style_source()).await?;
        let primary = library.primary();
        tracing::info!(
            authors = library.len(),
            primary = %primary.author,
            "Style library ready"
        );

        let stage_model = StageModel::new(
            Arc::clone(&services.provider),
            &config.llm.model,
            config.llm.temperature,
        );

        self.enter(Stage::Outline, sink, cancel).await?;
        let outline = OutlineAgent::new(stage_model.clone(), Arc::clone(&services.prompts))
            .run(request.topic(), Some(primary))
            .await?;

        self.enter(Stage::Writer, sink, cancel).await?;
        let draft = WriterAgent::new(
            stage_model.clone(),
            Arc::clone(&services.prompts),
            config.content.min_word_count,
            config.content.max_word_count,
        )
        .run(&outline, Some(primary))
        .await?;
        emit(
            sink,
            cancel,
            PipelineEvent::Progress {
                word_count: draft.word_count(),
            },
        )
        .await?;

        self.enter(Stage::Style, sink, cancel).await?;
        let scorer = SimilarityScorer::new(
            Arc::clone(&services.embedder),
            Arc::clone(&services.judge),
            ScoreWeights::from_config(&config.style),
        );
        let rewriter = StyleRewriter::new(
            StageModel::new(
                Arc::clone(&services.provider),
                &config.llm.model,
                config.llm.rewrite_temperature,
            ),
            Arc::clone(&services.prompts),
            config.content.min_word_count,
            config.content.max_word_count,
        );
        let settings = RefinementSettings {
            threshold: config.style.similarity_threshold,
            max_attempts: config.style.max_rewrite_attempts,
            iteration_delay: Duration::from_millis(config.style.iteration_delay_ms),
        };
        let refined = RefinementLoop::new(&scorer, &rewriter, settings, sink, cancel)
            .run(draft, &library)
            .await?;

        self.enter(Stage::Editor, sink, cancel).await?;
        let rules = ContentRules::from_config(&config.content, &outline.headers());
        let edited = EditorAgent::new(stage_model, Arc::clone(&services.prompts))
            .run(&refined.draft, &rules)
            .await?;
        if let Some(err) = edited.validation_error() {
            tracing::warn!("{err}");
        }

        let validated = refined.converged() && edited.constraints_met();
        let result = GenerationResult {
            metadata: ResultMetadata {
                word_count: edited.draft.word_count(),
                validated,
            },
            blog: edited.draft.into_content(),
        };
        emit(sink, cancel, PipelineEvent::complete(result.clone())).await?;

        tracing::info!(
            words = result.metadata.word_count,
            validated,
            author = %refined.author,
            combined = refined.score.combined_similarity,
            rewrite_attempts = refined.rewrite_attempts(),
            "Pipeline complete"
        );
        Ok(result)
    }

    async fn enter(
        &mut self,
        stage: Stage,
        sink: &dyn EventSink,
        cancel: &CancellationToken,
    ) -> Result<()> {
        ensure_open(cancel)?;
        self.state
            .enter(stage)
            .map_err(|e| PipelineError::GenerationService {
                stage: stage.to_string(),
                message: e.to_string(),
            })?;
        tracing::info!(stage = %stage, "Entering stage");
        emit(sink, cancel, PipelineEvent::status(stage)).await
    }
}

fn ensure_open(cancel: &CancellationToken) -> Result<()> {
    if cancel.is_cancelled() {
        return Err(PipelineError::ConnectionClosed);
    }
    Ok(())
}

async fn emit(sink: &dyn EventSink, cancel: &CancellationToken, event: PipelineEvent) -> Result<()> {
    ensure_open(cancel)?;
    sink.emit(event).await
}
