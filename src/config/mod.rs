mod env_overrides;
mod loader;
mod types;

pub use types::{
    Config, ContentConfig, CorpusConfig, EmbeddingConfig, GatewayConfig, LlmConfig, LogLevel,
    ObservabilityConfig, ReliabilityConfig, StyleConfig,
};
