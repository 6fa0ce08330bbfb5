//! The markdown subset consumed by the rendering side: `#`, `##` and `###`
//! headings, triple-backtick fences and inline emphasis.

const FENCE: &str = "```";
const MAX_HEADING_DEPTH: usize = 3;

/// Count words, ignoring markdown markers that stand alone (`#`, `-`, fences).
pub fn word_count(text: &str) -> usize {
    text.split_whitespace()
        .filter(|token| token.chars().any(char::is_alphanumeric))
        .count()
}

/// Bring model output into the supported markdown grammar.
pub fn normalize(raw: &str) -> String {
    let body = strip_wrapping_fence(raw.trim());

    let mut lines: Vec<String> = Vec::new();
    let mut in_fence = false;
    for line in body.lines() {
        if line.trim_start().starts_with(FENCE) {
            in_fence = !in_fence;
            lines.push(line.trim_end().to_string());
            continue;
        }
        if in_fence {
            lines.push(line.to_string());
        } else {
            lines.push(normalize_heading(line.trim_end()));
        }
    }
    if in_fence {
        lines.push(FENCE.to_string());
    }

    lines.join("\n").trim().to_string()
}

/// Remove a fence the model put around the whole answer.
fn strip_wrapping_fence(text: &str) -> &str {
    let Some(first_newline) = text.find('\n') else {
        return text;
    };
    let opener = text[..first_newline].trim();
    let is_wrapper = opener == FENCE
        || opener.eq_ignore_ascii_case("```markdown")
        || opener.eq_ignore_ascii_case("```md");
    if !is_wrapper || !text.ends_with(FENCE) {
        return text;
    }

    let inner = &text[first_newline + 1..text.len() - FENCE.len()];
    // A fence inside means the outer markers belong to real code blocks.
    if opener == FENCE && inner.contains(FENCE) {
        return text;
    }
    inner.trim()
}

fn normalize_heading(line: &str) -> String {
    let trimmed = line.trim_start();
    let depth = trimmed.chars().take_while(|&c| c == '#').count();
    if depth == 0 {
        return line.to_string();
    }

    let rest = trimmed[depth..].trim_start();
    if rest.is_empty() {
        return line.to_string();
    }
    format!("{} {rest}", "#".repeat(depth.min(MAX_HEADING_DEPTH)))
}

/// Text of every `#`..`###` heading, in order.
pub fn headings(text: &str) -> Vec<(usize, String)> {
    let mut in_fence = false;
    let mut found = Vec::new();
    for line in text.lines() {
        let trimmed = line.trim();
        if trimmed.starts_with(FENCE) {
            in_fence = !in_fence;
            continue;
        }
        if in_fence {
            continue;
        }
        let depth = trimmed.chars().take_while(|&c| c == '#').count();
        if (1..=MAX_HEADING_DEPTH).contains(&depth) {
            let title = trimmed[depth..].trim();
            if !title.is_empty() {
                found.push((depth, title.to_string()));
            }
        }
    }
    found
}
