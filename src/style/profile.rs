use super::chunk::chunk_words;
use super::features::{SurfaceFeatures, select_diverse_examples, truncate_chars};
use crate::config::StyleConfig;
use crate::corpus::AuthorText;
use crate::error::{PipelineError, Result};
use crate::llm::EmbeddingProvider;
use crate::scoring::vector::{centroid, cosine_similarity};
use std::collections::BTreeMap;
use std::sync::Arc;

const EMBED_BATCH_SIZE: usize = 64;

/// Comparison target derived from one author's texts.
#[derive(Debug, Clone)]
pub struct AuthorStyleProfile {
    pub author: String,
    /// Unit-length centroid of the author's chunk embeddings.
    pub embedding: Vec<f32>,
    pub features: SurfaceFeatures,
    pub description: String,
    pub examples: Vec<String>,
    pub text_count: usize,
}

/// Every author profile built from one style source.
#[derive(Debug, Clone)]
pub struct StyleLibrary {
    profiles: Vec<AuthorStyleProfile>,
}

impl StyleLibrary {
    fn new(profiles: Vec<AuthorStyleProfile>) -> Option<Self> {
        (!profiles.is_empty()).then_some(Self { profiles })
    }

    /// The author with the most texts; ties go to the alphabetically first.
    pub fn primary(&self) -> &AuthorStyleProfile {
        let mut best = &self.profiles[0];
        for profile in &self.profiles[1..] {
            if profile.text_count > best.text_count {
                best = profile;
            }
        }
        best
    }

    /// The author whose centroid is nearest to `embedding`, with the raw cosine.
    pub fn closest(&self, embedding: &[f32]) -> (&AuthorStyleProfile, f64) {
        let mut best = (&self.profiles[0], cosine_similarity(embedding, &self.profiles[0].embedding));
        for profile in &self.profiles[1..] {
            let score = cosine_similarity(embedding, &profile.embedding);
            if score > best.1 {
                best = (profile, score);
            }
        }
        best
    }

    pub fn get(&self, author: &str) -> Option<&AuthorStyleProfile> {
        self.profiles.iter().find(|p| p.author == author)
    }

    pub fn authors(&self) -> impl Iterator<Item = &str> {
        self.profiles.iter().map(|p| p.author.as_str())
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

/// Builds a [`StyleLibrary`] from fetched author texts.
pub struct ProfileBuilder {
    embedder: Arc<dyn EmbeddingProvider>,
    min_sample_texts: usize,
    num_examples: usize,
    example_length: usize,
    chunk_size: usize,
    chunk_overlap: usize,
}

impl ProfileBuilder {
    pub fn new(embedder: Arc<dyn EmbeddingProvider>, config: &StyleConfig) -> Self {
        Self {
            embedder,
            min_sample_texts: config.min_sample_texts,
            num_examples: config.num_style_examples,
            example_length: config.style_example_length,
            chunk_size: config.chunk_size,
            chunk_overlap: config.chunk_overlap,
        }
    }

    pub async fn build(&self, texts: Vec<AuthorText>) -> Result<StyleLibrary> {
        if texts.len() < self.min_sample_texts {
            return Err(PipelineError::InsufficientSample {
                found: texts.len(),
                required: self.min_sample_texts,
            });
        }

        let mut by_author: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for item in texts {
            by_author.entry(item.author).or_default().push(item.text);
        }

        let mut profiles = Vec::with_capacity(by_author.len());
        for (author, texts) in by_author {
            profiles.push(self.build_author(author, &texts).await?);
        }

        StyleLibrary::new(profiles).ok_or(PipelineError::InsufficientSample {
            found: 0,
            required: self.min_sample_texts,
        })
    }

    async fn build_author(&self, author: String, texts: &[String]) -> Result<AuthorStyleProfile> {
        let combined = texts.join("\n\n");
        let chunks = chunk_words(&combined, self.chunk_size, self.chunk_overlap);

        let mut vectors = Vec::with_capacity(chunks.len());
        for batch in chunks.chunks(EMBED_BATCH_SIZE) {
            let refs: Vec<&str> = batch.iter().map(String::as_str).collect();
            let embedded = self
                .embedder
                .embed(&refs)
                .await
                .map_err(|e| PipelineError::from_llm("style", &e))?;
            vectors.extend(embedded);
        }

        let embedding = centroid(&vectors).ok_or_else(|| PipelineError::GenerationService {
            stage: "style".into(),
            message: format!("no usable embeddings for author '{author}'"),
        })?;

        let features = SurfaceFeatures::extract(&combined);
        let per_example = self.example_length / self.num_examples.max(1);
        let mut examples = select_diverse_examples(&combined, self.num_examples, per_example);
        if examples.is_empty() {
            examples.push(truncate_chars(&combined, self.example_length));
        }

        tracing::info!(
            author = %author,
            texts = texts.len(),
            chunks = vectors.len(),
            "Built author style profile"
        );

        Ok(AuthorStyleProfile {
            description: features.describe(),
            author,
            embedding,
            features,
            examples,
            text_count: texts.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::future::Future;
    use std::pin::Pin;

    /// Maps text to a 2-d vector by counting two marker words.
    struct MarkerEmbedding;

    impl EmbeddingProvider for MarkerEmbedding {
        fn name(&self) -> &str {
            "marker"
        }

        fn dimensions(&self) -> usize {
            2
        }

        fn embed<'a>(
            &'a self,
            texts: &'a [&'a str],
        ) -> Pin<Box<dyn Future<Output = anyhow::Result<Vec<Vec<f32>>>> + Send + 'a>> {
            Box::pin(async move {
                #[allow(clippy::cast_precision_loss)]
                let vectors = texts
                    .iter()
                    .map(|t| {
                        vec![
                            t.matches("alpha").count() as f32 + 0.01,
                            t.matches("omega").count() as f32 + 0.01,
                        ]
                    })
                    .collect();
                Ok(vectors)
            })
        }
    }

    fn builder(min_sample_texts: usize) -> ProfileBuilder {
        let config = StyleConfig {
            min_sample_texts,
            chunk_size: 20,
            chunk_overlap: 2,
            ..StyleConfig::default()
        };
        ProfileBuilder::new(Arc::new(MarkerEmbedding), &config)
    }

    fn corpus() -> Vec<AuthorText> {
        vec![
            AuthorText::new("ada", "alpha alpha words about alpha things."),
            AuthorText::new("ada", "more alpha prose, alpha again."),
            AuthorText::new("bob", "omega omega is what bob writes about."),
        ]
    }

    #[tokio::test]
    async fn too_few_texts_is_insufficient_sample() {
        let err = builder(5).build(corpus()).await.unwrap_err();
        assert!(matches!(
            err,
            PipelineError::InsufficientSample { found: 3, required: 5 }
        ));
    }

    #[tokio::test]
    async fn builds_one_profile_per_author() {
        let library = builder(1).build(corpus()).await.unwrap();
        assert_eq!(library.len(), 2);
        assert_eq!(library.authors().collect::<Vec<_>>(), vec!["ada", "bob"]);
        assert_eq!(library.primary().author, "ada");
        assert_eq!(library.get("bob").map(|p| p.text_count), Some(1));
    }

    #[tokio::test]
    async fn closest_picks_nearest_centroid() {
        let library = builder(1).build(corpus()).await.unwrap();
        let (profile, score) = library.closest(&[0.0, 1.0]);
        assert_eq!(profile.author, "bob");
        assert!(score > 0.9);
    }

    #[tokio::test]
    async fn surface_features_are_deterministic() {
        let a = builder(1).build(corpus()).await.unwrap();
        let b = builder(1).build(corpus()).await.unwrap();
        assert_eq!(a.primary().features, b.primary().features);
        assert_eq!(a.primary().embedding, b.primary().embedding);
        assert!(!a.primary().examples.is_empty());
    }
}
