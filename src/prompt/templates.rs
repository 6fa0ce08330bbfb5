use super::engine::TeraEngine;
use crate::scoring::SimilarityScore;
use tera::Context;

pub const OUTLINE_SYSTEM_PROMPT: &str = "You are a blog strategist. You turn a topic into a \
tight, well-structured markdown outline. You never write the post itself.";

pub const WRITER_SYSTEM_PROMPT: &str = "You are a professional blog writer. You write complete, \
engaging markdown blog posts that follow the outline you are given section by section.";

pub const REWRITE_SYSTEM_PROMPT: &str = "You are a style transfer editor. You rewrite blog posts \
so they read as if the target author wrote them, keeping every fact, section and code block.";

pub const JUDGE_SYSTEM_PROMPT: &str = "You are an expert in authorship analysis. You compare \
writing styles and answer with a numeric score only.";

pub const EDITOR_SYSTEM_PROMPT: &str = "You are a meticulous copy editor. You fix grammar, flow \
and clarity while preserving the author's voice, structure and markdown formatting.";

const OUTLINE: &str = r"Create a clear, structured blog outline for this topic: {{ topic }}

Format the outline as markdown:
- First line: `# ` followed by a compelling, specific headline.
- Then 4-5 main sections. Each section is a `## ` heading followed by 3-6 bullet points with the key points to cover.
- For technical software topics, include a section covering architecture and code.
- End with a `## Conclusion` section holding a memorable closing thought.
{% if style %}
The post will be written in this voice, so shape the structure to suit it: {{ style }}
{% endif %}
Return only the outline.";

const WRITER: &str = r"Write a blog post following this outline:

{{ outline }}

Requirements:
- Length: {{ min_words }}-{{ max_words }} words.
- Structure: use the outline headline as the `# ` title and every outline section as a `## ` heading, in order.
- Tone: engaging, informative and conversational{% if style %}; voice: {{ style }}{% endif %}.
- Formatting: markdown headings (`#`, `##`, `###` only), short paragraphs, bullet points where useful.
- Code: fenced blocks with triple backticks and a language tag when the topic is technical.

Write the complete blog post now. Return only the post.";

const REWRITE: &str = r"Rewrite the blog post below so it matches the writing style of {{ author }}.

Style profile of {{ author }}: {{ description }}

Examples of {{ author }}'s writing:
{% for example in examples %}
--- Example {{ loop.index }} ---
{{ example }}
{% endfor %}
Previous style assessment (0 = unrelated, 1 = indistinguishable):
- combined similarity: {{ combined | round(precision=3) }}
- embedding similarity: {{ embedding | round(precision=3) }}
- judge similarity: {{ judge | round(precision=3) }}
This is rewrite attempt {{ attempt }}. Focus on sentence rhythm, vocabulary and tone, where the post still differs most from the examples.

Rules:
- Keep every section heading, fact and code block.
- Keep the length between {{ min_words }} and {{ max_words }} words.
- Use markdown headings (`#`, `##`, `###` only) and triple-backtick code fences.

Blog post to rewrite:
{{ draft }}

Return only the rewritten blog post.";

const JUDGE: &str = r"Compare the writing style of the TEXT against the AUTHOR EXAMPLES.
Judge sentence structure, vocabulary, tone, punctuation habits and formatting. Ignore the topic.
{% for example in examples %}
AUTHOR EXAMPLE {{ loop.index }}:
{{ example }}
{% endfor %}
TEXT:
{{ text }}

Answer with a single line in the form `SCORE: x` where x is between 0.0 (completely different style) and 1.0 (same author).";

const EDITOR: &str = r"Polish this blog post for grammar, flow, clarity and readability.

Preserve the author's voice and style. Keep these section headings exactly as written:
{% for header in headers %}- {{ header }}
{% endfor %}
Keep the length between {{ min_words }} and {{ max_words }} words and keep the markdown formatting (`#`, `##`, `###` headings, triple-backtick code fences).

Blog post:
{{ draft }}

Return ONLY the polished blog post.";

/// Inputs to the rewrite prompt.
pub struct RewritePrompt<'a> {
    pub author: &'a str,
    pub description: &'a str,
    pub examples: &'a [String],
    pub score: &'a SimilarityScore,
    pub attempt: u32,
    pub draft: &'a str,
    pub min_words: usize,
    pub max_words: usize,
}

/// Renders the user message of every generation stage.
pub struct PromptLibrary {
    engine: TeraEngine,
}

impl PromptLibrary {
    pub fn new() -> anyhow::Result<Self> {
        let engine = TeraEngine::with_templates(&[
            ("outline", OUTLINE),
            ("writer", WRITER),
            ("rewrite", REWRITE),
            ("judge", JUDGE),
            ("editor", EDITOR),
        ])?;
        Ok(Self { engine })
    }

    pub fn outline(&self, topic: &str, style: Option<&str>) -> anyhow::Result<String> {
        let mut ctx = Context::new();
        ctx.insert("topic", topic);
        ctx.insert("style", &style);
        self.engine.render("outline", &ctx)
    }

    pub fn writer(
        &self,
        outline: &str,
        style: Option<&str>,
        min_words: usize,
        max_words: usize,
    ) -> anyhow::Result<String> {
        let mut ctx = Context::new();
        ctx.insert("outline", outline);
        ctx.insert("style", &style);
        ctx.insert("min_words", &min_words);
        ctx.insert("max_words", &max_words);
        self.engine.render("writer", &ctx)
    }

    pub fn rewrite(&self, prompt: &RewritePrompt<'_>) -> anyhow::Result<String> {
        let mut ctx = Context::new();
        ctx.insert("author", prompt.author);
        ctx.insert("description", prompt.description);
        ctx.insert("examples", prompt.examples);
        ctx.insert("combined", &prompt.score.combined_similarity);
        ctx.insert("embedding", &prompt.score.embedding_similarity);
        ctx.insert("judge", &prompt.score.llm_similarity);
        ctx.insert("attempt", &prompt.attempt);
        ctx.insert("draft", prompt.draft);
        ctx.insert("min_words", &prompt.min_words);
        ctx.insert("max_words", &prompt.max_words);
        self.engine.render("rewrite", &ctx)
    }

    pub fn judge(&self, examples: &[String], text: &str) -> anyhow::Result<String> {
        let mut ctx = Context::new();
        ctx.insert("examples", examples);
        ctx.insert("text", text);
        self.engine.render("judge", &ctx)
    }

    pub fn editor(
        &self,
        draft: &str,
        headers: &[String],
        min_words: usize,
        max_words: usize,
    ) -> anyhow::Result<String> {
        let mut ctx = Context::new();
        ctx.insert("draft", draft);
        ctx.insert("headers", headers);
        ctx.insert("min_words", &min_words);
        ctx.insert("max_words", &max_words);
        self.engine.render("editor", &ctx)
    }
}
