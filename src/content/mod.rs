//! Blog content: the immutable [`Draft`], markdown normalisation and
//! structural validation.

mod draft;
pub mod markdown;
mod validate;

pub use draft::Draft;
pub use markdown::{normalize, word_count};
pub use validate::{ContentRules, validate};
