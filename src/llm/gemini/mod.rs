//! Google Gemini text generation.
//!
//! Authentication: explicit key (config) → `GEMINI_API_KEY` → `GOOGLE_API_KEY`.

use crate::error::LlmError;
use crate::llm::{
    build_provider_client, sanitize_api_error, scrub_secret_patterns, traits::Provider,
};
use reqwest::Client;
use std::future::Future;
use std::pin::Pin;

mod types;
pub(crate) use types::{
    BatchEmbedRequest, BatchEmbedResponse, EmbedContent, EmbedContentRequest, EmbedPart,
};
use types::{Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig, Part};

pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Resolve a Gemini key from config or the conventional environment variables.
pub fn resolve_api_key(explicit: Option<&str>) -> Option<String> {
    explicit
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .map(String::from)
        .or_else(|| std::env::var("GEMINI_API_KEY").ok())
        .or_else(|| std::env::var("GOOGLE_API_KEY").ok())
}

/// Prefix bare model ids with `models/`.
pub(crate) fn model_name(model: &str) -> String {
    if model.starts_with("models/") {
        model.to_string()
    } else {
        format!("models/{model}")
    }
}

pub struct GeminiProvider {
    api_key: Option<String>,
    base_url: String,
    max_output_tokens: u32,
    client: Client,
}

impl GeminiProvider {
    pub fn new(api_key: Option<&str>) -> Self {
        Self::with_base_url(api_key, GEMINI_BASE_URL)
    }

    pub fn with_base_url(api_key: Option<&str>, base_url: &str) -> Self {
        Self {
            api_key: resolve_api_key(api_key),
            base_url: base_url.trim_end_matches('/').to_string(),
            max_output_tokens: 2048,
            client: build_provider_client(),
        }
    }

    pub fn with_max_output_tokens(mut self, max_output_tokens: u32) -> Self {
        self.max_output_tokens = max_output_tokens;
        self
    }

    fn build_request(
        &self,
        system_prompt: Option<&str>,
        message: &str,
        temperature: f64,
    ) -> GenerateContentRequest {
        let system_instruction = system_prompt.map(|sys| Content {
            role: None,
            parts: vec![Part::text(sys)],
        });

        GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part::text(message)],
            }],
            system_instruction,
            generation_config: GenerationConfig {
                temperature,
                max_output_tokens: self.max_output_tokens,
            },
        }
    }

    fn api_key(&self) -> anyhow::Result<&str> {
        self.api_key.as_deref().ok_or_else(|| {
            anyhow::anyhow!(
                "Gemini API key not found. Set GEMINI_API_KEY or GOOGLE_API_KEY, \
                 or [llm] api_key in config.toml"
            )
        })
    }

    async fn call_api(
        &self,
        system_prompt: Option<&str>,
        message: &str,
        model: &str,
        temperature: f64,
    ) -> anyhow::Result<GenerateContentResponse> {
        let api_key = self.api_key()?;
        let url = format!(
            "{}/{}:generateContent?key={api_key}",
            self.base_url,
            model_name(model)
        );
        let request = self.build_request(system_prompt, message, temperature);

        let response = self
            .client
            .post(url)
            .json(&request)
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("Gemini request failed: {}", scrub_secret_patterns(&e.to_string())))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!(
                "Gemini API error ({status}): {}",
                sanitize_api_error(&error_text)
            );
        }

        let result: GenerateContentResponse = response.json().await?;
        if let Some(err) = result.error.as_ref() {
            anyhow::bail!("Gemini API error: {}", sanitize_api_error(&err.message));
        }
        Ok(result)
    }

    fn extract_text(result: &GenerateContentResponse) -> anyhow::Result<String> {
        let candidate = result.candidates.as_ref().and_then(|c| c.first());

        let text = candidate
            .and_then(|candidate| candidate.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|part| part.text.as_deref())
                    .collect::<Vec<_>>()
                    .join("\n")
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            if let Some(reason) = candidate.and_then(|c| c.finish_reason.as_deref()) {
                tracing::warn!(finish_reason = reason, "Gemini returned no text");
            }
            return Err(LlmError::EmptyResponse {
                provider: "gemini".into(),
            }
            .into());
        }

        Ok(text)
    }
}

impl Provider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    fn chat_with_system<'a>(
        &'a self,
        system_prompt: Option<&'a str>,
        message: &'a str,
        model: &'a str,
        temperature: f64,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<String>> + Send + 'a>> {
        Box::pin(async move {
            let result = self
                .call_api(system_prompt, message, model, temperature)
                .await?;
            if let Some(usage) = result.usage_metadata.as_ref() {
                tracing::debug!(
                    model,
                    prompt_tokens = usage.prompt_token_count,
                    output_tokens = usage.candidates_token_count,
                    "Gemini usage"
                );
            }
            Self::extract_text(&result)
        })
    }
}
