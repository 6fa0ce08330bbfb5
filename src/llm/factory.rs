use super::embeddings::{GeminiEmbedding, OpenAiEmbedding, create_embedding_provider};
use super::gemini::{GEMINI_BASE_URL, GeminiProvider};
use super::reliable::{ReliableEmbedding, ReliableProvider, RetryPolicy};
use super::traits::{EmbeddingProvider, Provider};
use crate::config::Config;
use std::sync::Arc;

/// Create the bare generation provider named by `[llm] provider`.
pub fn create_provider(config: &Config) -> anyhow::Result<Box<dyn Provider>> {
    let llm = &config.llm;
    match llm.provider.as_str() {
        "gemini" => {
            let base_url = llm.base_url.as_deref().unwrap_or(GEMINI_BASE_URL);
            Ok(Box::new(
                GeminiProvider::with_base_url(llm.api_key.as_deref(), base_url)
                    .with_max_output_tokens(llm.max_output_tokens),
            ))
        }
        other => anyhow::bail!("unknown generation provider: {other}"),
    }
}

/// Generation provider wrapped with the configured timeout/retry policy.
pub fn create_resilient_provider(config: &Config) -> anyhow::Result<Arc<dyn Provider>> {
    let policy = RetryPolicy::from_config(&config.reliability);
    Ok(Arc::new(ReliableProvider::new(
        create_provider(config)?,
        policy,
    )))
}

/// Embedding provider wrapped with the configured timeout/retry policy.
pub fn create_resilient_embedding(config: &Config) -> anyhow::Result<Arc<dyn EmbeddingProvider>> {
    let embedding = &config.embedding;
    let api_key = embedding
        .api_key
        .as_deref()
        .or(config.llm.api_key.as_deref());
    let inner: Box<dyn EmbeddingProvider> =
        match (embedding.provider.as_str(), embedding.base_url.as_deref()) {
            ("gemini", Some(base_url)) => Box::new(GeminiEmbedding::with_base_url(
                api_key,
                base_url,
                &embedding.model,
                embedding.dimensions,
            )),
            ("openai", Some(base_url)) => Box::new(OpenAiEmbedding::new(
                base_url,
                api_key.unwrap_or_default(),
                &embedding.model,
                embedding.dimensions,
            )),
            _ => create_embedding_provider(
                &embedding.provider,
                api_key,
                &embedding.model,
                embedding.dimensions,
            )?,
        };
    let policy = RetryPolicy::from_config(&config.reliability);
    Ok(Arc::new(ReliableEmbedding::new(inner, policy)))
}
