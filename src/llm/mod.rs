// ── Infrastructure ──────────────────────────────────────────────────────────
pub mod http_client;
pub mod scrub;
pub mod traits;

// ── Decorator layers ────────────────────────────────────────────────────────
pub mod factory;
pub mod reliable;

// ── Provider implementations ────────────────────────────────────────────────
pub mod embeddings;
pub mod gemini;

pub use embeddings::{GeminiEmbedding, OpenAiEmbedding, create_embedding_provider};
pub use factory::{create_provider, create_resilient_embedding, create_resilient_provider};
pub use gemini::GeminiProvider;
pub use http_client::{build_provider_client, build_provider_client_with_timeout};
pub use reliable::{ReliableEmbedding, ReliableProvider, RetryPolicy};
pub use scrub::{api_error, sanitize_api_error, scrub_secret_patterns};
pub use traits::{EmbeddingProvider, Provider};
