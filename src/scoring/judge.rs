use crate::llm::Provider;
use crate::prompt::{JUDGE_SYSTEM_PROMPT, PromptLibrary};
use crate::style::AuthorStyleProfile;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

const JUDGE_EXAMPLES: usize = 2;
const JUDGE_EXAMPLE_CHARS: usize = 1500;
const JUDGE_TEXT_CHARS: usize = 2000;
const JUDGE_TEMPERATURE: f64 = 0.3;
const NEUTRAL_SCORE: f64 = 0.5;

/// Model-judged stylistic closeness of a text to an author, in [0, 1].
pub trait StyleJudge: Send + Sync {
    fn judge<'a>(
        &'a self,
        text: &'a str,
        profile: &'a AuthorStyleProfile,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<f64>> + Send + 'a>>;
}

/// Asks the generation provider to rate the text against author examples.
pub struct LlmJudge {
    provider: Arc<dyn Provider>,
    prompts: Arc<PromptLibrary>,
    model: String,
}

impl LlmJudge {
    pub fn new(provider: Arc<dyn Provider>, prompts: Arc<PromptLibrary>, model: &str) -> Self {
        Self {
            provider,
            prompts,
            model: model.to_string(),
        }
    }
}

impl StyleJudge for LlmJudge {
    fn judge<'a>(
        &'a self,
        text: &'a str,
        profile: &'a AuthorStyleProfile,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<f64>> + Send + 'a>> {
        Box::pin(async move {
            let examples: Vec<String> = profile
                .examples
                .iter()
                .take(JUDGE_EXAMPLES)
                .map(|e| e.chars().take(JUDGE_EXAMPLE_CHARS).collect())
                .collect();
            let excerpt: String = text.chars().take(JUDGE_TEXT_CHARS).collect();
            let message = self.prompts.judge(&examples, &excerpt)?;

            let answer = self
                .provider
                .chat_with_system(
                    Some(JUDGE_SYSTEM_PROMPT),
                    &message,
                    &self.model,
                    JUDGE_TEMPERATURE,
                )
                .await?;

            Ok(parse_score(&answer).unwrap_or_else(|| {
                tracing::warn!(author = %profile.author, "Judge answer had no score, using neutral value");
                NEUTRAL_SCORE
            }))
        })
    }
}

/// Extract a similarity score from a judge answer.
///
/// Accepts `SCORE: x`, `rating: x` and `x / 1.0` in any case. Scores on a
/// 10- or 100-point scale are rescaled; the result is clamped to [0, 1].
pub fn parse_score(answer: &str) -> Option<f64> {
    let lower = answer.to_ascii_lowercase();

    let raw = ["score:", "rating:"]
        .iter()
        .find_map(|marker| {
            let idx = lower.find(marker)?;
            leading_number(&lower[idx + marker.len()..])
        })
        .or_else(|| out_of_one(&lower))?;

    let scaled = if raw > 1.0 && raw <= 10.0 {
        raw / 10.0
    } else if raw > 10.0 && raw <= 100.0 {
        raw / 100.0
    } else {
        raw
    };
    Some(scaled.clamp(0.0, 1.0))
}

fn leading_number(s: &str) -> Option<f64> {
    let s = s.trim_start_matches(|c: char| c.is_whitespace() || c == '*');
    let end = number_prefix_len(s);
    s[..end].parse().ok()
}

fn number_prefix_len(s: &str) -> usize {
    let mut seen_dot = false;
    let mut end = 0;
    for (i, c) in s.char_indices() {
        match c {
            '0'..='9' => end = i + 1,
            '.' if !seen_dot => seen_dot = true,
            _ => break,
        }
    }
    end
}

/// `0.7 / 1.0` or `0.7/1`.
fn out_of_one(s: &str) -> Option<f64> {
    for (idx, _) in s.match_indices('/') {
        let after = s[idx + 1..].trim_start();
        if !after.starts_with('1') {
            continue;
        }
        let before = s[..idx].trim_end();
        let start = before
            .char_indices()
            .rev()
            .take_while(|(_, c)| c.is_ascii_digit() || *c == '.')
            .last()
            .map(|(i, _)| i)?;
        if let Ok(value) = before[start..].parse() {
            return Some(value);
        }
    }
    None
}
