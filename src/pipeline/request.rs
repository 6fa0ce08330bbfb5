use crate::error::PipelineError;
use serde::{Deserialize, Serialize};

/// A validated generation request. Construct via [`GenerationRequest::from_json`]
/// or [`GenerationRequest::new`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationRequest {
    topic: String,
    style_source: String,
}

#[derive(Deserialize)]
struct RawRequest {
    topic: Option<String>,
    style_source: Option<String>,
}

impl GenerationRequest {
    pub fn new(topic: &str, style_source: &str) -> Result<Self, PipelineError> {
        let topic = topic.trim();
        if topic.is_empty() {
            return Err(PipelineError::InvalidRequest("topic is required".into()));
        }

        let style_source = style_source.trim();
        if style_source.is_empty() {
            return Err(PipelineError::InvalidRequest(
                "style_source is required".into(),
            ));
        }
        let url = url::Url::parse(style_source).map_err(|e| {
            PipelineError::InvalidRequest(format!("style_source is not a valid URL: {e}"))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(PipelineError::InvalidRequest(
                "style_source must use http or https".into(),
            ));
        }

        Ok(Self {
            topic: topic.to_string(),
            style_source: style_source.to_string(),
        })
    }

    /// Decode and validate one inbound message.
    pub fn from_json(text: &str) -> Result<Self, PipelineError> {
        let raw: RawRequest = serde_json::from_str(text)
            .map_err(|e| PipelineError::InvalidRequest(format!("malformed request: {e}")))?;
        Self::new(
            raw.topic.as_deref().unwrap_or_default(),
            raw.style_source.as_deref().unwrap_or_default(),
        )
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn style_source(&self) -> &str {
        &self.style_source
    }
}
