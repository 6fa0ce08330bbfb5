use thiserror::Error;

// ─── Pipeline errors ─────────────────────────────────────────────────────────

/// Failure taxonomy of a generation session.
///
/// Every variant except [`PipelineError::ValidationFailed`] is fatal for the
/// session that raised it. Internal glue code keeps using `anyhow::Result`;
/// stage boundaries convert into this type so the orchestrator can decide
/// whether to emit an `error` event or stay silent.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("style source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("insufficient style sample: found {found} texts, need at least {required}")]
    InsufficientSample { found: usize, required: usize },

    #[error("{stage} generation failed: {message}")]
    GenerationService { stage: String, message: String },

    #[error("{stage} call timed out after {secs}s")]
    Timeout { stage: String, secs: u64 },

    #[error("content validation failed: {}", .0.join("; "))]
    ValidationFailed(Vec<String>),

    #[error("connection closed by client")]
    ConnectionClosed,

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl PipelineError {
    /// Map a provider failure raised inside `stage` onto the session taxonomy.
    pub fn from_llm(stage: &str, err: &anyhow::Error) -> Self {
        match err.downcast_ref::<LlmError>() {
            Some(LlmError::Timeout { secs, .. }) => Self::Timeout {
                stage: stage.to_string(),
                secs: *secs,
            },
            _ => Self::GenerationService {
                stage: stage.to_string(),
                message: err.to_string(),
            },
        }
    }

    /// Whether the failure should be reported to the client at all.
    pub fn is_reportable(&self) -> bool {
        !matches!(self, Self::ConnectionClosed)
    }
}

// ─── LLM / Provider errors ──────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("provider {provider} request failed: {message}")]
    Request { provider: String, message: String },

    #[error("provider {provider} timed out after {secs}s")]
    Timeout { provider: String, secs: u64 },

    #[error("provider {provider} returned an empty response")]
    EmptyResponse { provider: String },
}

// ─── Config errors ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load config: {0}")]
    Load(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

/// Shorthand result type for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;
