mod engine;
mod templates;

pub use engine::TeraEngine;
pub use templates::{
    EDITOR_SYSTEM_PROMPT, JUDGE_SYSTEM_PROMPT, OUTLINE_SYSTEM_PROMPT, PromptLibrary,
    REWRITE_SYSTEM_PROMPT, RewritePrompt, WRITER_SYSTEM_PROMPT,
};
