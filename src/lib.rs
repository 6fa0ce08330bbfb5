#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::unnecessary_literal_bound,
    clippy::module_name_repetitions,
    clippy::struct_field_names,
    clippy::must_use_candidate,
    clippy::new_without_default,
    clippy::return_self_not_must_use
)]

pub mod agents;
pub mod app;
pub mod cli;
pub mod config;
pub mod content;
pub mod corpus;
pub mod error;
pub mod llm;
pub mod pipeline;
pub mod prompt;
pub mod refine;
pub mod scoring;
pub mod style;
pub mod transport;

pub use config::Config;
pub use error::{LlmError, PipelineError};
