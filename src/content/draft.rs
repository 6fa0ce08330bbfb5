use super::markdown::word_count;

/// One version of the blog post.
///
/// A rewrite never edits a draft in place; [`Draft::revise`] produces its
/// successor with the next revision index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Draft {
    content: String,
    word_count: usize,
    revision_index: u32,
}

impl Draft {
    /// First draft, as produced by the writer.
    pub fn initial(content: impl Into<String>) -> Self {
        Self::at_revision(content.into(), 0)
    }

    pub fn revise(&self, content: impl Into<String>) -> Self {
        Self::at_revision(content.into(), self.revision_index + 1)
    }

    fn at_revision(content: String, revision_index: u32) -> Self {
        Self {
            word_count: word_count(&content),
            content,
            revision_index,
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn word_count(&self) -> usize {
        self.word_count
    }

    pub fn revision_index(&self) -> u32 {
        self.revision_index
    }

    pub fn into_content(self) -> String {
        self.content
    }
}
