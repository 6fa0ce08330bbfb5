use super::traits::{EmbeddingProvider, Provider};
use crate::config::ReliabilityConfig;
use crate::error::LlmError;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

/// Check if an error is non-retryable (client errors that won't resolve with retries).
fn is_non_retryable(err: &anyhow::Error) -> bool {
    if let Some(reqwest_err) = err.downcast_ref::<reqwest::Error>()
        && let Some(status) = reqwest_err.status()
    {
        let code = status.as_u16();
        // 408 and 429 are transient.
        return status.is_client_error() && code != 429 && code != 408;
    }

    let msg = err.to_string();
    if is_quota_exhausted(&msg) {
        return true;
    }
    match status_in_message(&msg) {
        Some(code) => (400..500).contains(&code) && code != 429 && code != 408,
        None => false,
    }
}

/// Status code of a provider failure formatted as "... error (404 Not Found): ...".
fn status_in_message(msg: &str) -> Option<u16> {
    msg.split('(').skip(1).find_map(|rest| {
        let (code, tail) = rest.split_at_checked(3)?;
        if !code.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        if !(tail.starts_with(' ') || tail.starts_with(')')) {
            return None;
        }
        code.parse().ok()
    })
}

fn is_quota_exhausted(message: &str) -> bool {
    let lower = message.to_ascii_lowercase();
    lower.contains("insufficient_quota")
        || lower.contains("exceeded your current quota")
        || lower.contains("billing")
}

/// Per-call timeout plus bounded retries with exponential backoff.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub call_timeout: Duration,
    pub max_retries: u32,
    pub base_backoff_ms: u64,
    pub max_backoff_ms: u64,
}

impl RetryPolicy {
    pub fn from_config(config: &ReliabilityConfig) -> Self {
        Self {
            call_timeout: Duration::from_secs(config.call_timeout_secs),
            max_retries: config.provider_retries,
            base_backoff_ms: config.provider_backoff_ms,
            max_backoff_ms: config.max_backoff_ms,
        }
    }

    /// Run `call` until it succeeds, fails permanently, or the retry budget runs out.
    pub async fn run<T, F, Fut>(&self, provider: &str, mut call: F) -> anyhow::Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = anyhow::Result<T>>,
    {
        let mut failures = Vec::new();
        let mut backoff_ms = self.base_backoff_ms;
        let mut last_was_timeout = false;

        for attempt in 0..=self.max_retries {
            let outcome = match tokio::time::timeout(self.call_timeout, call()).await {
                Ok(result) => result,
                Err(_) => {
                    last_was_timeout = true;
                    failures.push(format!(
                        "attempt {}/{}: timed out after {}s",
                        attempt + 1,
                        self.max_retries + 1,
                        self.call_timeout.as_secs()
                    ));
                    if attempt < self.max_retries {
                        tracing::warn!(provider, attempt = attempt + 1, "Provider call timed out, retrying");
                        tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                        backoff_ms = backoff_ms.saturating_mul(2).min(self.max_backoff_ms);
                    }
                    continue;
                }
            };

            match outcome {
                Ok(value) => {
                    if attempt > 0 {
                        tracing::info!(provider, attempt, "Provider recovered after retries");
                    }
                    return Ok(value);
                }
                Err(e) => {
                    last_was_timeout = false;
                    let non_retryable = is_non_retryable(&e);
                    failures.push(format!(
                        "attempt {}/{}: {e}",
                        attempt + 1,
                        self.max_retries + 1
                    ));

                    if non_retryable {
                        tracing::warn!(provider, "Non-retryable provider error");
                        break;
                    }

                    if attempt < self.max_retries {
                        tracing::warn!(
                            provider,
                            attempt = attempt + 1,
                            max_retries = self.max_retries,
                            "Provider call failed, retrying"
                        );
                        tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                        backoff_ms = backoff_ms.saturating_mul(2).min(self.max_backoff_ms);
                    }
                }
            }
        }

        if last_was_timeout {
            return Err(LlmError::Timeout {
                provider: provider.to_string(),
                secs: self.call_timeout.as_secs(),
            }
            .into());
        }

        Err(LlmError::Request {
            provider: provider.to_string(),
            message: failures.join("; "),
        }
        .into())
    }
}

/// Provider wrapper applying a [`RetryPolicy`] to every call.
pub struct ReliableProvider {
    inner: Box<dyn Provider>,
    policy: RetryPolicy,
}

impl ReliableProvider {
    pub fn new(inner: Box<dyn Provider>, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }
}

impl Provider for ReliableProvider {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn chat_with_system<'a>(
        &'a self,
        system_prompt: Option<&'a str>,
        message: &'a str,
        model: &'a str,
        temperature: f64,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<String>> + Send + 'a>> {
        Box::pin(async move {
            self.policy
                .run(self.inner.name(), || {
                    self.inner
                        .chat_with_system(system_prompt, message, model, temperature)
                })
                .await
        })
    }
}

/// Embedding wrapper applying a [`RetryPolicy`] to every batch.
pub struct ReliableEmbedding {
    inner: Box<dyn EmbeddingProvider>,
    policy: RetryPolicy,
}

impl ReliableEmbedding {
    pub fn new(inner: Box<dyn EmbeddingProvider>, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }
}

impl EmbeddingProvider for ReliableEmbedding {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn dimensions(&self) -> usize {
        self.inner.dimensions()
    }

    fn embed<'a>(
        &'a self,
        texts: &'a [&'a str],
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<Vec<Vec<f32>>>> + Send + 'a>> {
        Box::pin(async move {
            self.policy
                .run(self.inner.name(), || self.inner.embed(texts))
                .await
        })
    }
}
