use super::{AuthorText, CorpusSource};
use crate::config::CorpusConfig;
use crate::error::PipelineError;
use crate::llm::{build_provider_client_with_timeout, sanitize_api_error};
use serde::Deserialize;
use std::future::Future;
use std::pin::Pin;

const UNKNOWN_AUTHOR: &str = "unknown_author";

#[derive(Debug, Deserialize)]
struct FeedDocument {
    items: Option<Vec<FeedItem>>,
}

#[derive(Debug, Default, Deserialize)]
struct FeedItem {
    #[serde(default)]
    author: Option<String>,
    #[serde(default)]
    content: Option<String>,
    #[serde(rename = "content:encoded", default)]
    content_encoded: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

impl FeedItem {
    fn body(&self) -> &str {
        [&self.content, &self.content_encoded, &self.description]
            .into_iter()
            .filter_map(|field| field.as_deref())
            .find(|body| !body.trim().is_empty())
            .unwrap_or("")
    }
}

/// Reads an rss2json-style JSON feed (`{"items": [{"author", "content", ...}]}`).
pub struct Rss2JsonSource {
    client: reqwest::Client,
    max_item_chars: usize,
    min_item_chars: usize,
}

impl Rss2JsonSource {
    pub fn new(config: &CorpusConfig) -> Self {
        Self {
            client: build_provider_client_with_timeout(config.request_timeout_secs),
            max_item_chars: config.max_item_chars,
            min_item_chars: config.min_item_chars,
        }
    }

    async fn fetch_document(&self, style_source: &str) -> Result<FeedDocument, PipelineError> {
        let url = url::Url::parse(style_source)
            .map_err(|e| PipelineError::SourceUnavailable(format!("invalid feed URL: {e}")))?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| PipelineError::SourceUnavailable(format!("feed request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(PipelineError::SourceUnavailable(format!(
                "feed returned {status}: {}",
                sanitize_api_error(&body)
            )));
        }

        let text = response
            .text()
            .await
            .map_err(|e| PipelineError::SourceUnavailable(format!("feed read failed: {e}")))?;
        serde_json::from_str(&text)
            .map_err(|e| PipelineError::SourceUnavailable(format!("feed is not valid JSON: {e}")))
    }

    fn extract_texts(&self, document: FeedDocument) -> Result<Vec<AuthorText>, PipelineError> {
        let items = document.items.ok_or_else(|| {
            PipelineError::SourceUnavailable("feed is missing the 'items' field".into())
        })?;

        let total = items.len();
        let texts: Vec<AuthorText> = items
            .iter()
            .filter_map(|item| {
                let author = item
                    .author
                    .as_deref()
                    .map(str::trim)
                    .filter(|a| !a.is_empty())
                    .unwrap_or(UNKNOWN_AUTHOR);

                let mut text = clean_html(item.body());
                if text.chars().count() < self.min_item_chars {
                    return None;
                }
                if text.chars().count() > self.max_item_chars {
                    tracing::warn!(author, "Truncated oversized feed item");
                    text = text.chars().take(self.max_item_chars).collect();
                }
                Some(AuthorText::new(author, text))
            })
            .collect();

        tracing::info!(items = total, usable = texts.len(), "Parsed style feed");
        Ok(texts)
    }
}

impl CorpusSource for Rss2JsonSource {
    fn name(&self) -> &str {
        "rss2json"
    }

    fn fetch<'a>(
        &'a self,
        style_source: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<AuthorText>, PipelineError>> + Send + 'a>> {
        Box::pin(async move {
            let document = self.fetch_document(style_source).await?;
            self.extract_texts(document)
        })
    }
}

/// Strip markup, scripts and styles; collapse whitespace.
pub(crate) fn clean_html(html: &str) -> String {
    use scraper::{Html, Node};

    if html.trim().is_empty() {
        return String::new();
    }

    let fragment = Html::parse_fragment(html);
    let mut parts: Vec<&str> = Vec::new();
    for node in fragment.tree.root().descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };
        let skipped = node.ancestors().any(|ancestor| {
            ancestor.value().as_element().is_some_and(|el| {
                matches!(el.name(), "script" | "style" | "noscript" | "meta" | "link")
            })
        });
        if !skipped {
            parts.push(text);
        }
    }

    parts.join(" ").split_whitespace().collect::<Vec<_>>().join(" ")
}
