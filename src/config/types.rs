use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Path to config.toml - computed at load time, not serialized
    #[serde(skip)]
    pub config_path: PathBuf,

    #[serde(default)]
    pub llm: LlmConfig,

    #[serde(default)]
    pub embedding: EmbeddingConfig,

    #[serde(default)]
    pub reliability: ReliabilityConfig,

    #[serde(default)]
    pub style: StyleConfig,

    #[serde(default)]
    pub content: ContentConfig,

    #[serde(default)]
    pub corpus: CorpusConfig,

    #[serde(default)]
    pub gateway: GatewayConfig,

    #[serde(default)]
    pub observability: ObservabilityConfig,
}

// ── Generation ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Generation backend; "gemini" is the only one shipped
    #[serde(default = "default_llm_provider")]
    pub provider: String,
    #[serde(default = "default_llm_model")]
    pub model: String,
    /// Model used for style judgments; falls back to `model`
    #[serde(default)]
    pub judge_model: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    /// Override the provider endpoint (tests, proxies)
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_rewrite_temperature")]
    pub rewrite_temperature: f64,
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,
}

fn default_llm_provider() -> String {
    "gemini".into()
}

fn default_llm_model() -> String {
    "gemini-2.5-flash-lite".into()
}

fn default_temperature() -> f64 {
    0.7
}

fn default_rewrite_temperature() -> f64 {
    0.8
}

fn default_max_output_tokens() -> u32 {
    2048
}

impl LlmConfig {
    pub fn judge_model(&self) -> &str {
        self.judge_model.as_deref().unwrap_or(&self.model)
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_llm_provider(),
            model: default_llm_model(),
            judge_model: None,
            api_key: None,
            base_url: None,
            temperature: default_temperature(),
            rewrite_temperature: default_rewrite_temperature(),
            max_output_tokens: default_max_output_tokens(),
        }
    }
}

// ── Embeddings ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// "gemini" | "openai" | "custom:<base-url>"
    #[serde(default = "default_embedding_provider")]
    pub provider: String,
    #[serde(default = "default_embedding_model")]
    pub model: String,
    #[serde(default)]
    pub api_key: Option<String>,
    /// Override the endpoint of the gemini/openai backends
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default = "default_embedding_dimensions")]
    pub dimensions: usize,
}

fn default_embedding_provider() -> String {
    "gemini".into()
}

fn default_embedding_model() -> String {
    "text-embedding-004".into()
}

fn default_embedding_dimensions() -> usize {
    768
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: default_embedding_provider(),
            model: default_embedding_model(),
            api_key: None,
            base_url: None,
            dimensions: default_embedding_dimensions(),
        }
    }
}

// ── Reliability ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReliabilityConfig {
    /// Upper bound for a single external call
    #[serde(default = "default_call_timeout_secs")]
    pub call_timeout_secs: u64,
    #[serde(default = "default_provider_retries")]
    pub provider_retries: u32,
    #[serde(default = "default_provider_backoff_ms")]
    pub provider_backoff_ms: u64,
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
}

fn default_call_timeout_secs() -> u64 {
    60
}

fn default_provider_retries() -> u32 {
    2
}

fn default_provider_backoff_ms() -> u64 {
    500
}

fn default_max_backoff_ms() -> u64 {
    10_000
}

impl Default for ReliabilityConfig {
    fn default() -> Self {
        Self {
            call_timeout_secs: default_call_timeout_secs(),
            provider_retries: default_provider_retries(),
            provider_backoff_ms: default_provider_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
        }
    }
}

// ── Style refinement ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StyleConfig {
    /// Combined similarity at or above which a draft is accepted
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f64,
    #[serde(default = "default_max_rewrite_attempts")]
    pub max_rewrite_attempts: u32,
    #[serde(default = "default_embedding_weight")]
    pub embedding_weight: f64,
    #[serde(default = "default_llm_weight")]
    pub llm_weight: f64,
    /// Minimum number of usable corpus texts
    #[serde(default = "default_min_sample_texts")]
    pub min_sample_texts: usize,
    #[serde(default = "default_num_style_examples")]
    pub num_style_examples: usize,
    /// Total character budget across style examples of one author
    #[serde(default = "default_style_example_length")]
    pub style_example_length: usize,
    /// Words per embedding chunk
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,
    /// Pause between rewrite attempts
    #[serde(default = "default_iteration_delay_ms")]
    pub iteration_delay_ms: u64,
    #[serde(default = "default_true")]
    pub cache_profiles: bool,
}

fn default_similarity_threshold() -> f64 {
    0.65
}

fn default_max_rewrite_attempts() -> u32 {
    3
}

fn default_embedding_weight() -> f64 {
    0.4
}

fn default_llm_weight() -> f64 {
    0.6
}

fn default_min_sample_texts() -> usize {
    3
}

fn default_num_style_examples() -> usize {
    3
}

fn default_style_example_length() -> usize {
    4000
}

fn default_chunk_size() -> usize {
    500
}

fn default_chunk_overlap() -> usize {
    50
}

fn default_iteration_delay_ms() -> u64 {
    500
}

fn default_true() -> bool {
    true
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: default_similarity_threshold(),
            max_rewrite_attempts: default_max_rewrite_attempts(),
            embedding_weight: default_embedding_weight(),
            llm_weight: default_llm_weight(),
            min_sample_texts: default_min_sample_texts(),
            num_style_examples: default_num_style_examples(),
            style_example_length: default_style_example_length(),
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
            iteration_delay_ms: default_iteration_delay_ms(),
            cache_profiles: true,
        }
    }
}

// ── Content constraints ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentConfig {
    #[serde(default = "default_min_word_count")]
    pub min_word_count: usize,
    #[serde(default = "default_max_word_count")]
    pub max_word_count: usize,
    /// Every outline header must appear as a heading in the final post
    #[serde(default = "default_true")]
    pub require_outline_sections: bool,
    #[serde(default = "default_min_unique_word_ratio")]
    pub min_unique_word_ratio: f64,
}

fn default_min_word_count() -> usize {
    150
}

fn default_max_word_count() -> usize {
    1500
}

fn default_min_unique_word_ratio() -> f64 {
    0.3
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            min_word_count: default_min_word_count(),
            max_word_count: default_max_word_count(),
            require_outline_sections: true,
            min_unique_word_ratio: default_min_unique_word_ratio(),
        }
    }
}

// ── Style corpus ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusConfig {
    /// Used by `scribetwin generate` when `--style-source` is omitted
    #[serde(default)]
    pub default_style_source: Option<String>,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_max_item_chars")]
    pub max_item_chars: usize,
    #[serde(default = "default_min_item_chars")]
    pub min_item_chars: usize,
}

fn default_request_timeout_secs() -> u64 {
    20
}

fn default_max_item_chars() -> usize {
    50_000
}

fn default_min_item_chars() -> usize {
    50
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            default_style_source: None,
            request_timeout_secs: default_request_timeout_secs(),
            max_item_chars: default_max_item_chars(),
            min_item_chars: default_min_item_chars(),
        }
    }
}

// ── Gateway ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Gateway port (default: 8000)
    #[serde(default = "default_gateway_port")]
    pub port: u16,
    /// Gateway host (default: 127.0.0.1)
    #[serde(default = "default_gateway_host")]
    pub host: String,
    /// Allow binding to non-localhost (default: false)
    #[serde(default)]
    pub allow_public_bind: bool,
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_gateway_port() -> u16 {
    8000
}

fn default_gateway_host() -> String {
    "127.0.0.1".into()
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_gateway_port(),
            host: default_gateway_host(),
            allow_public_bind: false,
            cors_origins: Vec::new(),
        }
    }
}

// ── Observability ───────────────────────────────────────────────────────────

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    #[serde(default)]
    pub log_level: LogLevel,
}
