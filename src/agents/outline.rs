use super::StageModel;
use crate::content::markdown::headings;
use crate::error::{PipelineError, Result};
use crate::prompt::{OUTLINE_SYSTEM_PROMPT, PromptLibrary};
use crate::style::AuthorStyleProfile;
use serde::Serialize;
use std::sync::Arc;

/// One planned section of the post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutlineSection {
    pub header: String,
    pub notes: Vec<String>,
}

/// Ordered plan for the post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Outline {
    pub title: String,
    pub sections: Vec<OutlineSection>,
    /// The outline as the model wrote it, fed verbatim to the writer.
    pub markdown: String,
}

impl Outline {
    /// Parse a markdown outline. `##`/`###` headings start sections; other
    /// non-empty lines become notes of the current section. Outlines written
    /// as a bare numbered list fall back to one section per top-level item.
    pub fn parse(markdown: &str, fallback_title: &str) -> Option<Self> {
        let title = headings(markdown)
            .into_iter()
            .find(|(depth, _)| *depth == 1)
            .map_or_else(|| fallback_title.to_string(), |(_, title)| title);

        let mut sections = sections_from_headings(markdown);
        if sections.is_empty() {
            sections = sections_from_list(markdown);
        }
        if sections.is_empty() {
            return None;
        }

        Some(Self {
            title,
            sections,
            markdown: markdown.to_string(),
        })
    }

    pub fn headers(&self) -> Vec<String> {
        self.sections.iter().map(|s| s.header.clone()).collect()
    }
}

fn sections_from_headings(markdown: &str) -> Vec<OutlineSection> {
    let mut sections: Vec<OutlineSection> = Vec::new();
    for line in markdown.lines() {
        let trimmed = line.trim();
        let depth = trimmed.chars().take_while(|&c| c == '#').count();
        if depth == 2 || depth == 3 {
            let header = clean_item(&trimmed[depth..]);
            if !header.is_empty() {
                sections.push(OutlineSection {
                    header,
                    notes: Vec::new(),
                });
            }
            continue;
        }
        if depth == 1 || trimmed.is_empty() {
            continue;
        }
        if let Some(current) = sections.last_mut() {
            let note = clean_item(trimmed);
            if !note.is_empty() {
                current.notes.push(note);
            }
        }
    }
    sections
}

fn sections_from_list(markdown: &str) -> Vec<OutlineSection> {
    let mut sections: Vec<OutlineSection> = Vec::new();
    for line in markdown.lines() {
        if line.trim().is_empty() || line.trim_start().starts_with('#') {
            continue;
        }
        let indented = line.starts_with(char::is_whitespace);
        let item = clean_item(line);
        if item.is_empty() {
            continue;
        }
        if !indented && is_numbered(line) {
            sections.push(OutlineSection {
                header: item,
                notes: Vec::new(),
            });
        } else if let Some(current) = sections.last_mut() {
            current.notes.push(item);
        }
    }
    sections
}

fn is_numbered(line: &str) -> bool {
    let digits = line.chars().take_while(char::is_ascii_digit).count();
    digits > 0 && matches!(line[digits..].chars().next(), Some('.' | ')'))
}

/// Strip list markers, numbering and emphasis around an outline line.
fn clean_item(line: &str) -> String {
    let mut text = line.trim().trim_start_matches(['-', '*', '+']).trim_start();
    let digits = text.chars().take_while(char::is_ascii_digit).count();
    if digits > 0 && matches!(text[digits..].chars().next(), Some('.' | ')')) {
        text = text[digits + 1..].trim_start();
    }
    text.replace("**", "")
        .replace("__", "")
        .trim_matches(|c: char| c == '*' || c == '_' || c.is_whitespace())
        .trim_end_matches(':')
        .trim()
        .to_string()
}

/// Plans the post from the topic.
pub struct OutlineAgent {
    model: StageModel,
    prompts: Arc<PromptLibrary>,
}

impl OutlineAgent {
    pub fn new(model: StageModel, prompts: Arc<PromptLibrary>) -> Self {
        Self { model, prompts }
    }

    pub async fn run(&self, topic: &str, style: Option<&AuthorStyleProfile>) -> Result<Outline> {
        let message = self
            .prompts
            .outline(topic, style.map(|p| p.description.as_str()))
            .map_err(|e| PipelineError::GenerationService {
                stage: "outline".into(),
                message: format!("prompt rendering failed: {e}"),
            })?;

        let markdown = self
            .model
            .generate("outline", OUTLINE_SYSTEM_PROMPT, &message)
            .await?;

        let outline = Outline::parse(&markdown, topic).ok_or_else(|| {
            PipelineError::GenerationService {
                stage: "outline".into(),
                message: "outline contained no sections".into(),
            }
        })?;
        tracing::info!(sections = outline.sections.len(), title = %outline.title, "Outline ready");
        Ok(outline)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::CannedProvider;
    use super::*;

    const OUTLINE_MD: &str = "# Shipping Rust Services\n\n## Why Rust\n- memory safety\n- speed\n\n## Architecture and Code:\n* **tokio** runtime\n\n## Conclusion\n- wrap up";

    #[test]
    fn parses_heading_outline() {
        let outline = Outline::parse(OUTLINE_MD, "fallback").unwrap();
        assert_eq!(outline.title, "Shipping Rust Services");
        assert_eq!(
            outline.headers(),
            vec!["Why Rust", "Architecture and Code", "Conclusion"]
        );
        assert_eq!(outline.sections[0].notes, vec!["memory safety", "speed"]);
        assert_eq!(outline.sections[1].notes, vec!["tokio runtime"]);
    }

    #[test]
    fn parses_numbered_list_outline() {
        let md = "1. Introduction\n   - hook the reader\n2) Main Ideas\n   - first idea\n3. Conclusion";
        let outline = Outline::parse(md, "Topic").unwrap();
        assert_eq!(outline.title, "Topic");
        assert_eq!(outline.headers(), vec!["Introduction", "Main Ideas", "Conclusion"]);
        assert_eq!(outline.sections[0].notes, vec!["hook the reader"]);
    }

    #[test]
    fn outline_without_sections_is_rejected() {
        assert!(Outline::parse("# Only a title", "t").is_none());
    }

    #[tokio::test]
    async fn agent_sends_topic_in_prompt() {
        let provider = Arc::new(CannedProvider::new(OUTLINE_MD));
        let agent = OutlineAgent::new(
            StageModel::new(provider.clone(), "m", 0.7),
            Arc::new(PromptLibrary::new().unwrap()),
        );

        let outline = agent.run("Rust services", None).await.unwrap();
        assert_eq!(outline.sections.len(), 3);
        assert!(provider.last_message().contains("Rust services"));
    }

    #[tokio::test]
    async fn agent_fails_on_unstructured_answer() {
        let provider = Arc::new(CannedProvider::new("I cannot help with that."));
        let agent = OutlineAgent::new(
            StageModel::new(provider, "m", 0.7),
            Arc::new(PromptLibrary::new().unwrap()),
        );
        let err = agent.run("topic", None).await.unwrap_err();
        assert!(matches!(err, PipelineError::GenerationService { .. }));
    }
}
