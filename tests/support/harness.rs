#![allow(dead_code, clippy::cast_precision_loss)]

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use scribetwin::Config;
use scribetwin::PipelineError;
use scribetwin::corpus::{AuthorText, CorpusSource};
use scribetwin::llm::{EmbeddingProvider, Provider};
use scribetwin::pipeline::{EventSink, PipelineEvent, Services};
use scribetwin::prompt::{
    EDITOR_SYSTEM_PROMPT, JUDGE_SYSTEM_PROMPT, OUTLINE_SYSTEM_PROMPT, REWRITE_SYSTEM_PROMPT,
    WRITER_SYSTEM_PROMPT,
};
use scribetwin::scoring::StyleJudge;
use scribetwin::style::AuthorStyleProfile;
use tokio_util::sync::CancellationToken;

pub const STYLE_SOURCE: &str = "https://feeds.example.com/engineering";
pub const EMBEDDING_DIMS: usize = 16;

pub const SECTIONS: [&str; 3] = ["Introduction", "Getting Started", "Conclusion"];

/// Install the crypto backend reqwest's rustls stack expects.
pub fn install_crypto() {
    let _ = rustls::crypto::ring::default_provider().install_default();
}

// ── Text fixtures ───────────────────────────────────────────────────────────

/// `count` distinct words, so repetition checks never trip.
pub fn prose(prefix: &str, count: usize) -> String {
    (0..count)
        .map(|i| format!("{prefix}{i}"))
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn outline_markdown() -> String {
    let mut out = String::from("# Shipping Rust Services\n");
    for section in SECTIONS {
        out.push_str(&format!("\n## {section}\n- key point about {section}\n"));
    }
    out
}

/// A post with every outline section and `words_per_section` body words each.
pub fn blog_post(prefix: &str, words_per_section: usize) -> String {
    let mut out = String::from("# Shipping Rust Services");
    for (i, section) in SECTIONS.iter().enumerate() {
        out.push_str(&format!(
            "\n\n## {section}\n\n{}",
            prose(&format!("{prefix}s{i}w"), words_per_section)
        ));
    }
    out
}

pub fn corpus_texts() -> Vec<AuthorText> {
    vec![
        AuthorText::new("Ada", prose("ada", 120)),
        AuthorText::new("Ada", prose("lovelace", 140)),
        AuthorText::new("Grace", prose("grace", 90)),
    ]
}

// ── Deterministic embeddings ────────────────────────────────────────────────

pub struct HashEmbedding {
    dims: usize,
    seed: u64,
}

impl HashEmbedding {
    pub const fn new(dims: usize, seed: u64) -> Self {
        Self { dims, seed }
    }

    fn fnv1a64(seed: u64, bytes: &[u8]) -> u64 {
        let mut hash: u64 = 0xcbf2_9ce4_8422_2325 ^ seed;
        for &byte in bytes {
            hash ^= u64::from(byte);
            hash = hash.wrapping_mul(0x0100_0000_01b3);
        }
        hash
    }

    fn splitmix64(mut x: u64) -> u64 {
        x = x.wrapping_add(0x9e37_79b9_7f4a_7c15);
        let mut z = x;
        z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
        z ^ (z >> 31)
    }

    fn unit_f32(x: u64) -> f32 {
        const U24_MAX: f32 = ((1u32 << 24) - 1) as f32;
        let top_u24: u32 = (x >> 40) as u32;
        (top_u24 as f32 / U24_MAX) * 2.0 - 1.0
    }

    fn embed_value(&self, text: &str, index: usize) -> f32 {
        let base = Self::fnv1a64(self.seed, text.as_bytes());
        Self::unit_f32(Self::splitmix64(base ^ (index as u64)))
    }
}

impl EmbeddingProvider for HashEmbedding {
    fn name(&self) -> &str {
        "hash-test-harness"
    }

    fn dimensions(&self) -> usize {
        self.dims
    }

    fn embed<'a>(
        &'a self,
        texts: &'a [&'a str],
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<Vec<Vec<f32>>>> + Send + 'a>> {
        Box::pin(async move {
            Ok(texts
                .iter()
                .map(|text| (0..self.dims).map(|i| self.embed_value(text, i)).collect())
                .collect())
        })
    }
}

// ── Scripted generation ─────────────────────────────────────────────────────

/// Answers each stage by its system prompt and counts rewrite calls.
pub struct ScriptedProvider {
    pub outline: String,
    pub writer: String,
    pub editor: String,
    rewrites: AtomicUsize,
    stages: Mutex<Vec<&'static str>>,
}

impl ScriptedProvider {
    pub fn new(editor: String) -> Self {
        Self {
            outline: outline_markdown(),
            writer: blog_post("draft", 80),
            editor,
            rewrites: AtomicUsize::new(0),
            stages: Mutex::new(Vec::new()),
        }
    }

    pub fn rewrite_calls(&self) -> usize {
        self.rewrites.load(Ordering::SeqCst)
    }

    pub fn stages(&self) -> Vec<&'static str> {
        self.stages.lock().unwrap().clone()
    }

    fn record(&self, stage: &'static str) {
        self.stages.lock().unwrap().push(stage);
    }
}

impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    fn chat_with_system<'a>(
        &'a self,
        system_prompt: Option<&'a str>,
        _message: &'a str,
        _model: &'a str,
        _temperature: f64,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<String>> + Send + 'a>> {
        Box::pin(async move {
            match system_prompt {
                Some(OUTLINE_SYSTEM_PROMPT) => {
                    self.record("outline");
                    Ok(self.outline.clone())
                }
                Some(WRITER_SYSTEM_PROMPT) => {
                    self.record("writer");
                    Ok(self.writer.clone())
                }
                Some(REWRITE_SYSTEM_PROMPT) => {
                    self.record("rewrite");
                    let n = self.rewrites.fetch_add(1, Ordering::SeqCst) + 1;
                    Ok(blog_post(&format!("rewrite{n}"), 80))
                }
                Some(JUDGE_SYSTEM_PROMPT) => {
                    self.record("judge");
                    Ok("Score: 0.5".to_string())
                }
                Some(EDITOR_SYSTEM_PROMPT) => {
                    self.record("editor");
                    Ok(self.editor.clone())
                }
                _ => anyhow::bail!("unexpected system prompt"),
            }
        })
    }
}

/// Replays a fixed score sequence; the last score repeats.
pub struct ScriptedJudge {
    scores: Mutex<VecDeque<f64>>,
    last: f64,
}

impl ScriptedJudge {
    pub fn new(scores: &[f64]) -> Self {
        Self {
            scores: Mutex::new(scores.iter().copied().collect()),
            last: scores.last().copied().unwrap_or(0.5),
        }
    }
}

impl StyleJudge for ScriptedJudge {
    fn judge<'a>(
        &'a self,
        _text: &'a str,
        _profile: &'a AuthorStyleProfile,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<f64>> + Send + 'a>> {
        Box::pin(async move { Ok(self.scores.lock().unwrap().pop_front().unwrap_or(self.last)) })
    }
}

// ── Corpus ──────────────────────────────────────────────────────────────────

pub struct StaticCorpus {
    texts: Option<Vec<AuthorText>>,
    fetches: AtomicUsize,
}

impl StaticCorpus {
    pub fn new(texts: Vec<AuthorText>) -> Self {
        Self {
            texts: Some(texts),
            fetches: AtomicUsize::new(0),
        }
    }

    pub fn unreachable() -> Self {
        Self {
            texts: None,
            fetches: AtomicUsize::new(0),
        }
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

impl CorpusSource for StaticCorpus {
    fn name(&self) -> &str {
        "static"
    }

    fn fetch<'a>(
        &'a self,
        style_source: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<AuthorText>, PipelineError>> + Send + 'a>> {
        Box::pin(async move {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            self.texts.clone().ok_or_else(|| {
                PipelineError::SourceUnavailable(format!("{style_source} did not respond"))
            })
        })
    }
}

// ── Events ──────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<PipelineEvent>>,
    disconnect: Option<(&'static str, CancellationToken)>,
}

impl RecordingSink {
    /// Cancel `token` right after recording the first event of `kind`, the
    /// way a client dropping its socket mid-session does.
    pub fn disconnecting_after(kind: &'static str, token: CancellationToken) -> Self {
        Self {
            events: Mutex::default(),
            disconnect: Some((kind, token)),
        }
    }

    pub fn events(&self) -> Vec<PipelineEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn kinds(&self) -> Vec<&'static str> {
        self.events().iter().map(kind).collect()
    }
}

impl EventSink for RecordingSink {
    fn emit<'a>(
        &'a self,
        event: PipelineEvent,
    ) -> Pin<Box<dyn Future<Output = Result<(), PipelineError>> + Send + 'a>> {
        Box::pin(async move {
            let event_kind = kind(&event);
            self.events.lock().unwrap().push(event);
            if let Some((trigger, token)) = &self.disconnect
                && *trigger == event_kind
            {
                token.cancel();
            }
            Ok(())
        })
    }
}

pub fn kind(event: &PipelineEvent) -> &'static str {
    match event {
        PipelineEvent::Status { .. } => "status",
        PipelineEvent::Progress { .. } => "progress",
        PipelineEvent::Similarity { .. } => "similarity",
        PipelineEvent::Complete { .. } => "complete",
        PipelineEvent::Error { .. } => "error",
    }
}

// ── Services ────────────────────────────────────────────────────────────────

/// Judge-only scoring with no pause between rewrites.
pub fn test_config(max_rewrite_attempts: u32) -> Config {
    let mut config = Config::default();
    config.style.embedding_weight = 0.0;
    config.style.llm_weight = 1.0;
    config.style.max_rewrite_attempts = max_rewrite_attempts;
    config.style.iteration_delay_ms = 0;
    config
}

pub fn services(
    config: Config,
    provider: Arc<ScriptedProvider>,
    judge: Arc<ScriptedJudge>,
    corpus: Arc<StaticCorpus>,
) -> Arc<Services> {
    let services = Services::new(
        config,
        provider,
        Arc::new(HashEmbedding::new(EMBEDDING_DIMS, 0x5EED_BA5E)),
        corpus,
    )
    .expect("services should assemble")
    .with_judge(judge);
    Arc::new(services)
}
