use super::gemini::{
    BatchEmbedRequest, BatchEmbedResponse, EmbedContent, EmbedContentRequest, EmbedPart,
    GEMINI_BASE_URL, model_name, resolve_api_key,
};
use super::scrub::{sanitize_api_error, scrub_secret_patterns};
use super::traits::EmbeddingProvider;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

fn build_embedding_client() -> reqwest::Client {
    reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(3))
        .timeout(Duration::from_secs(30))
        .pool_max_idle_per_host(10)
        .pool_idle_timeout(Duration::from_secs(90))
        .tcp_keepalive(Duration::from_secs(60))
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

// ── Gemini embedding provider ────────────────────────────────

pub struct GeminiEmbedding {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
    dims: usize,
}

impl GeminiEmbedding {
    pub fn new(api_key: Option<&str>, model: &str, dims: usize) -> Self {
        Self::with_base_url(api_key, GEMINI_BASE_URL, model, dims)
    }

    pub fn with_base_url(api_key: Option<&str>, base_url: &str, model: &str, dims: usize) -> Self {
        Self {
            client: build_embedding_client(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: resolve_api_key(api_key),
            model: model_name(model),
            dims,
        }
    }

    async fn embed_batch(&self, texts: &[&str]) -> anyhow::Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("Gemini API key not found for embeddings"))?;

        let body = BatchEmbedRequest {
            requests: texts
                .iter()
                .map(|text| EmbedContentRequest {
                    model: self.model.clone(),
                    content: EmbedContent {
                        parts: vec![EmbedPart {
                            text: (*text).to_string(),
                        }],
                    },
                })
                .collect(),
        };

        let url = format!(
            "{}/{}:batchEmbedContents?key={api_key}",
            self.base_url, self.model
        );
        let resp = self
            .client
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                anyhow::anyhow!(
                    "Embedding HTTP request failed: {}",
                    scrub_secret_patterns(&e.to_string())
                )
            })?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            anyhow::bail!("Embedding API error ({status}): {}", sanitize_api_error(&text));
        }

        let parsed: BatchEmbedResponse = resp.json().await?;
        if parsed.embeddings.len() != texts.len() {
            anyhow::bail!(
                "Invalid embedding response: expected {} vectors, got {}",
                texts.len(),
                parsed.embeddings.len()
            );
        }
        Ok(parsed.embeddings.into_iter().map(|e| e.values).collect())
    }
}

impl EmbeddingProvider for GeminiEmbedding {
    fn name(&self) -> &str {
        "gemini"
    }

    fn dimensions(&self) -> usize {
        self.dims
    }

    fn embed<'a>(
        &'a self,
        texts: &'a [&'a str],
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<Vec<Vec<f32>>>> + Send + 'a>> {
        Box::pin(self.embed_batch(texts))
    }
}

// ── OpenAI-compatible embedding provider ─────────────────────

pub struct OpenAiEmbedding {
    client: reqwest::Client,
    cached_embeddings_url: String,
    cached_auth_header: String,
    model: String,
    dims: usize,
}

impl OpenAiEmbedding {
    pub fn new(base_url: &str, api_key: &str, model: &str, dims: usize) -> Self {
        let base = base_url.trim_end_matches('/');
        Self {
            client: build_embedding_client(),
            cached_embeddings_url: format!("{base}/v1/embeddings"),
            cached_auth_header: format!("Bearer {api_key}"),
            model: model.to_string(),
            dims,
        }
    }

    async fn embed_batch(&self, texts: &[&str]) -> anyhow::Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let body = serde_json::json!({
            "model": self.model,
            "input": texts,
        });

        let resp = self
            .client
            .post(&self.cached_embeddings_url)
            .header("Authorization", &self.cached_auth_header)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("Embedding HTTP request failed: {e}"))?;

        if !resp.status().is_success() {
            let status = resp.status();
            anyhow::bail!("Embedding API error {status}");
        }

        let json: serde_json::Value = resp.json().await?;
        let data = json
            .get("data")
            .and_then(|d| d.as_array())
            .ok_or_else(|| anyhow::anyhow!("Invalid embedding response: missing 'data'"))?;

        let mut embeddings = Vec::with_capacity(data.len());
        for item in data {
            let embedding = item
                .get("embedding")
                .and_then(|e| e.as_array())
                .ok_or_else(|| anyhow::anyhow!("Invalid embedding item"))?;

            #[allow(clippy::cast_possible_truncation)]
            let vec: Vec<f32> = embedding
                .iter()
                .filter_map(|v| v.as_f64().map(|f| f as f32))
                .collect();

            embeddings.push(vec);
        }

        Ok(embeddings)
    }
}

impl EmbeddingProvider for OpenAiEmbedding {
    fn name(&self) -> &str {
        "openai"
    }

    fn dimensions(&self) -> usize {
        self.dims
    }

    fn embed<'a>(
        &'a self,
        texts: &'a [&'a str],
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<Vec<Vec<f32>>>> + Send + 'a>> {
        Box::pin(self.embed_batch(texts))
    }
}

// ── Factory ──────────────────────────────────────────────────

pub fn create_embedding_provider(
    provider: &str,
    api_key: Option<&str>,
    model: &str,
    dims: usize,
) -> anyhow::Result<Box<dyn EmbeddingProvider>> {
    match provider {
        "gemini" => Ok(Box::new(GeminiEmbedding::new(api_key, model, dims))),
        "openai" => {
            let key = api_key
                .map(String::from)
                .or_else(|| std::env::var("OPENAI_API_KEY").ok())
                .unwrap_or_default();
            Ok(Box::new(OpenAiEmbedding::new(
                "https://api.openai.com",
                &key,
                model,
                dims,
            )))
        }
        name if name.starts_with("custom:") => {
            let base_url = name.strip_prefix("custom:").unwrap_or("").trim();
            let parsed = url::Url::parse(base_url)
                .map_err(|_| anyhow::anyhow!("invalid custom embedding base URL: {base_url}"))?;
            if !matches!(parsed.scheme(), "http" | "https") {
                anyhow::bail!("custom embedding base URL must use http(s)");
            }
            Ok(Box::new(OpenAiEmbedding::new(
                base_url,
                api_key.unwrap_or(""),
                model,
                dims,
            )))
        }
        other => anyhow::bail!("unknown embedding provider: {other}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn factory_gemini() {
        let p = create_embedding_provider("gemini", Some("k"), "text-embedding-004", 768).unwrap();
        assert_eq!(p.name(), "gemini");
        assert_eq!(p.dimensions(), 768);
    }

    #[test]
    fn factory_openai() {
        let p = create_embedding_provider("openai", Some("key"), "text-embedding-3-small", 1536)
            .unwrap();
        assert_eq!(p.name(), "openai");
        assert_eq!(p.dimensions(), 1536);
    }

    #[test]
    fn factory_custom_url() {
        let p = create_embedding_provider("custom:https://example.com", None, "model", 384).unwrap();
        assert_eq!(p.name(), "openai");
    }

    #[test]
    fn factory_rejects_unknown_and_malformed() {
        assert!(create_embedding_provider("cohere", None, "m", 1).is_err());
        assert!(create_embedding_provider("custom:", None, "m", 1).is_err());
        assert!(create_embedding_provider("custom:ftp://example.com", None, "m", 1).is_err());
    }

    #[test]
    fn openai_trailing_slash_stripped() {
        let p = OpenAiEmbedding::new("https://api.openai.com/", "key", "model", 1536);
        assert_eq!(
            p.cached_embeddings_url,
            "https://api.openai.com/v1/embeddings"
        );
    }

    #[test]
    fn gemini_model_is_prefixed() {
        let p = GeminiEmbedding::with_base_url(Some("k"), "http://localhost/", "text-embedding-004", 8);
        assert_eq!(p.model, "models/text-embedding-004");
        assert_eq!(p.base_url, "http://localhost");
    }

    #[tokio::test]
    async fn empty_batch_skips_network() {
        let p = GeminiEmbedding::with_base_url(Some("k"), "http://127.0.0.1:9", "m", 8);
        assert!(p.embed(&[]).await.unwrap().is_empty());
    }
}
