use serde::Serialize;
use std::collections::{HashMap, HashSet};

const SHORT_SENTENCE_WORDS: usize = 10;
const LONG_SENTENCE_WORDS: usize = 20;
const VOCABULARY_SIZE: usize = 12;
const MIN_PARAGRAPH_CHARS: usize = 100;

const CONTRACTIONS: [&str; 10] = [
    "don't", "can't", "won't", "it's", "you're", "we're", "i'm", "isn't", "that's", "let's",
];

const STOPWORDS: [&str; 48] = [
    "the", "and", "a", "an", "of", "to", "in", "is", "it", "that", "for", "on", "with", "as",
    "this", "are", "be", "was", "by", "or", "at", "from", "but", "not", "you", "your", "we",
    "our", "they", "their", "i", "my", "he", "she", "his", "her", "have", "has", "can", "will",
    "if", "so", "what", "which", "there", "than", "then", "more",
];

/// Surface statistics of a body of text.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SurfaceFeatures {
    pub word_count: usize,
    pub sentence_count: usize,
    pub avg_sentence_length: f64,
    pub short_sentences: usize,
    pub medium_sentences: usize,
    pub long_sentences: usize,
    pub avg_word_length: f64,
    pub unique_word_ratio: f64,
    /// Most frequent content words, most frequent first.
    pub vocabulary: Vec<String>,
    pub exclamations: usize,
    pub questions: usize,
    pub comma_density: f64,
    pub dashes: usize,
    pub uses_contractions: bool,
    pub bold_spans: usize,
    pub list_items: usize,
}

impl SurfaceFeatures {
    pub fn extract(text: &str) -> Self {
        let words: Vec<&str> = text.split_whitespace().collect();
        if words.is_empty() {
            return Self::default();
        }

        let sentence_lengths: Vec<usize> = text
            .split(['.', '!', '?'])
            .map(|s| s.split_whitespace().count())
            .filter(|&n| n > 0)
            .collect();
        let sentence_count = sentence_lengths.len().max(1);

        let normalized: Vec<String> = words.iter().map(|w| normalize_word(w)).collect();
        let unique: HashSet<&str> = normalized
            .iter()
            .map(String::as_str)
            .filter(|w| !w.is_empty())
            .collect();

        let lower = text.to_lowercase();
        let list_items = text
            .lines()
            .filter(|line| {
                let line = line.trim_start();
                line.starts_with("- ") || line.starts_with("* ")
            })
            .count();

        #[allow(clippy::cast_precision_loss)]
        Self {
            word_count: words.len(),
            sentence_count: sentence_lengths.len(),
            avg_sentence_length: words.len() as f64 / sentence_count as f64,
            short_sentences: sentence_lengths
                .iter()
                .filter(|&&n| n < SHORT_SENTENCE_WORDS)
                .count(),
            medium_sentences: sentence_lengths
                .iter()
                .filter(|&&n| (SHORT_SENTENCE_WORDS..=LONG_SENTENCE_WORDS).contains(&n))
                .count(),
            long_sentences: sentence_lengths
                .iter()
                .filter(|&&n| n > LONG_SENTENCE_WORDS)
                .count(),
            avg_word_length: words.iter().map(|w| w.chars().count()).sum::<usize>() as f64
                / words.len() as f64,
            unique_word_ratio: unique.len() as f64 / words.len() as f64,
            vocabulary: vocabulary_signature(&normalized),
            exclamations: text.matches('!').count(),
            questions: text.matches('?').count(),
            comma_density: text.matches(',').count() as f64 / words.len() as f64,
            dashes: text.matches("--").count() + text.matches('\u{2014}').count(),
            uses_contractions: CONTRACTIONS.iter().any(|c| lower.contains(c)),
            bold_spans: text.matches("**").count() / 2,
            list_items,
        }
    }

    /// Short prose description used to steer generation prompts.
    pub fn describe(&self) -> String {
        if self.word_count == 0 {
            return "neutral style".to_string();
        }

        let mut traits = Vec::new();
        traits.push(if self.avg_sentence_length < 12.0 {
            "very short, punchy sentences"
        } else if self.avg_sentence_length < 18.0 {
            "moderate-length sentences"
        } else {
            "longer, more complex sentences"
        });

        if self.exclamations > 2 {
            traits.push("enthusiastic tone with exclamations");
        }
        if self.questions > 2 {
            traits.push("engages reader with questions");
        }
        if self.dashes > 1 {
            traits.push("uses dashes for emphasis or asides");
        }
        traits.push(if self.uses_contractions {
            "conversational with contractions"
        } else {
            "more formal without contractions"
        });
        if self.bold_spans > 3 {
            traits.push("emphasizes key points with bold text");
        }
        if self.list_items > 3 {
            traits.push("uses bullet points or lists");
        }

        let mut description = traits.join("; ");
        if !self.vocabulary.is_empty() {
            description.push_str("; favourite words: ");
            description.push_str(&self.vocabulary.join(", "));
        }
        description
    }
}

fn normalize_word(word: &str) -> String {
    word.trim_matches(|c: char| !c.is_alphanumeric() && c != '\'')
        .to_lowercase()
}

fn vocabulary_signature(words: &[String]) -> Vec<String> {
    let stopwords: HashSet<&str> = STOPWORDS.into_iter().collect();
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for word in words {
        if word.chars().count() > 2 && !stopwords.contains(word.as_str()) {
            *counts.entry(word.as_str()).or_default() += 1;
        }
    }

    let mut ranked: Vec<(&str, usize)> = counts.into_iter().collect();
    // Ties broken alphabetically so the signature is stable.
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    ranked
        .into_iter()
        .take(VOCABULARY_SIZE)
        .map(|(word, _)| word.to_string())
        .collect()
}

/// Pick up to `count` excerpts spread across `text`, each roughly
/// `target_chars` long, so prompts see the author's range rather than one
/// opening paragraph.
pub fn select_diverse_examples(text: &str, count: usize, target_chars: usize) -> Vec<String> {
    if text.trim().is_empty() || count == 0 {
        return Vec::new();
    }

    let mut paragraphs: Vec<&str> = text
        .split("\n\n")
        .map(str::trim)
        .filter(|p| p.chars().count() > MIN_PARAGRAPH_CHARS)
        .collect();
    if paragraphs.is_empty() {
        paragraphs = text
            .lines()
            .map(str::trim)
            .filter(|p| p.chars().count() > MIN_PARAGRAPH_CHARS)
            .collect();
    }

    if paragraphs.len() < count {
        return vec![truncate_chars(text.trim(), target_chars.saturating_mul(count))];
    }

    let step = paragraphs.len() / count;
    let mut examples = Vec::with_capacity(count);
    for i in 0..count {
        let start = i * step;
        let mut excerpt: Vec<&str> = Vec::new();
        let mut length = 0;
        for paragraph in paragraphs.iter().skip(start).take(10) {
            excerpt.push(paragraph);
            length += paragraph.chars().count();
            if length >= target_chars {
                break;
            }
        }
        if !excerpt.is_empty() {
            examples.push(excerpt.join("\n\n"));
        }
    }
    examples
}

pub(crate) fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
