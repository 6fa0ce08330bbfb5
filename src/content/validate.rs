use super::markdown::{headings, word_count};
use crate::config::ContentConfig;
use std::collections::HashSet;

/// Structural constraints the final post must meet.
#[derive(Debug, Clone)]
pub struct ContentRules {
    pub min_words: usize,
    pub max_words: usize,
    pub min_unique_word_ratio: f64,
    /// Section headers that must appear as headings; empty disables the check.
    pub required_headers: Vec<String>,
}

impl ContentRules {
    pub fn from_config(config: &ContentConfig, outline_headers: &[String]) -> Self {
        Self {
            min_words: config.min_word_count,
            max_words: config.max_word_count,
            min_unique_word_ratio: config.min_unique_word_ratio,
            required_headers: if config.require_outline_sections {
                outline_headers.to_vec()
            } else {
                Vec::new()
            },
        }
    }
}

/// Every unmet constraint, as a human-readable reason. Empty means valid.
pub fn validate(text: &str, rules: &ContentRules) -> Vec<String> {
    if text.trim().is_empty() {
        return vec!["content is empty".to_string()];
    }

    let mut problems = Vec::new();
    let words = word_count(text);
    if words < rules.min_words {
        problems.push(format!(
            "too short: {words} words (minimum {})",
            rules.min_words
        ));
    }
    if words > rules.max_words {
        problems.push(format!(
            "too long: {words} words (maximum {})",
            rules.max_words
        ));
    }

    let ratio = unique_word_ratio(text);
    if ratio < rules.min_unique_word_ratio {
        problems.push(format!("content is repetitive: unique word ratio {ratio:.2}"));
    }

    let present: Vec<String> = headings(text)
        .into_iter()
        .map(|(_, title)| comparable(&title))
        .collect();
    for header in &rules.required_headers {
        let wanted = comparable(header);
        if wanted.is_empty() {
            continue;
        }
        if !present.iter().any(|title| title.contains(&wanted)) {
            problems.push(format!("missing section: {header}"));
        }
    }

    problems
}

fn comparable(title: &str) -> String {
    title
        .trim_matches(|c: char| !c.is_alphanumeric())
        .replace(['*', '_', '`'], "")
        .to_lowercase()
}

fn unique_word_ratio(text: &str) -> f64 {
    let words: Vec<String> = text
        .split_whitespace()
        .filter(|w| w.chars().any(char::is_alphanumeric))
        .map(str::to_lowercase)
        .collect();
    if words.is_empty() {
        return 0.0;
    }
    let unique: HashSet<&str> = words.iter().map(String::as_str).collect();
    #[allow(clippy::cast_precision_loss)]
    let ratio = unique.len() as f64 / words.len() as f64;
    ratio
}
