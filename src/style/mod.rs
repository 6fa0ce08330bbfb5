//! Author style modelling: surface statistics, chunked embeddings and the
//! per-style-source profile cache.

mod cache;
mod chunk;
mod features;
mod profile;

pub use cache::ProfileCache;
pub use chunk::chunk_words;
pub use features::{SurfaceFeatures, select_diverse_examples};
pub use profile::{AuthorStyleProfile, ProfileBuilder, StyleLibrary};
