//! Style corpus retrieval.
//!
//! A style source is a reference (today: an rss2json-style feed URL) to a
//! collection of texts written by one or more authors.

mod rss;

pub use rss::Rss2JsonSource;

use crate::error::PipelineError;
use std::future::Future;
use std::pin::Pin;

/// One usable author-written text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorText {
    pub author: String,
    pub text: String,
}

impl AuthorText {
    pub fn new(author: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            author: author.into(),
            text: text.into(),
        }
    }
}

/// Fetches author texts for a style source.
///
/// Implementations report `SourceUnavailable` when the source cannot be
/// reached or parsed; an empty result is left to the profile builder.
pub trait CorpusSource: Send + Sync {
    fn name(&self) -> &str;

    fn fetch<'a>(
        &'a self,
        style_source: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<AuthorText>, PipelineError>> + Send + 'a>>;
}
