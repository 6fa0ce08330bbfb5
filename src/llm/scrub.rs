use std::borrow::Cow;

const MAX_API_ERROR_CHARS: usize = 200;
const REDACTED: &str = "[REDACTED]";

/// Raw credential prefixes issued by the providers we talk to.
const PREFIX_PATTERNS: [&str; 5] = ["AIza", "ya29.", "sk-", "hf_", "eyJ"];

/// Places where a credential follows a fixed marker (query strings, headers, JSON).
const MARKER_PATTERNS: [&str; 8] = [
    "key=",
    "api_key=",
    "access_token=",
    "Authorization: Bearer ",
    "authorization: bearer ",
    "\"api_key\":\"",
    "\"access_token\":\"",
    "\"x-goog-api-key\":\"",
];

fn is_secret_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '+' | '/' | '=')
}

fn token_end(input: &str, from: usize) -> usize {
    let mut end = from;
    for (i, c) in input[from..].char_indices() {
        if is_secret_char(c) {
            end = from + i + c.len_utf8();
        } else {
            break;
        }
    }
    end
}

/// Replace the token following every occurrence of `marker`, keeping the marker
/// itself unless `include_marker` is set (raw prefixes are part of the secret).
fn scrub_after(scrubbed: &mut String, marker: &str, include_marker: bool) {
    let mut search_from = 0;
    while let Some(rel) = scrubbed[search_from..].find(marker) {
        let start = search_from + rel;
        let content_start = start + marker.len();
        let end = token_end(scrubbed, content_start);

        // Bare marker without a value.
        if end == content_start {
            search_from = content_start;
            continue;
        }

        let replace_from = if include_marker { start } else { content_start };
        scrubbed.replace_range(replace_from..end, REDACTED);
        search_from = replace_from + REDACTED.len();
    }
}

/// Scrub credential-shaped tokens from provider error strings.
///
/// reqwest errors embed the request URL, and Gemini authenticates through a
/// `?key=` query parameter, so transport errors routinely carry the API key.
pub fn scrub_secret_patterns(input: &str) -> Cow<'_, str> {
    let needs_scrubbing = PREFIX_PATTERNS
        .iter()
        .chain(MARKER_PATTERNS.iter())
        .any(|pattern| input.contains(pattern));
    if !needs_scrubbing {
        return Cow::Borrowed(input);
    }

    let mut scrubbed = input.to_string();
    for marker in MARKER_PATTERNS {
        scrub_after(&mut scrubbed, marker, false);
    }
    for prefix in PREFIX_PATTERNS {
        scrub_after(&mut scrubbed, prefix, true);
    }
    Cow::Owned(scrubbed)
}

/// Sanitize API error text by scrubbing secrets and truncating length.
pub fn sanitize_api_error(input: &str) -> String {
    let scrubbed = scrub_secret_patterns(input);

    if scrubbed.chars().count() <= MAX_API_ERROR_CHARS {
        return scrubbed.into_owned();
    }

    let scrubbed = scrubbed.as_ref();
    let mut end = MAX_API_ERROR_CHARS;
    while end > 0 && !scrubbed.is_char_boundary(end) {
        end -= 1;
    }

    format!("{}...", &scrubbed[..end])
}

/// Build a sanitized provider error from a failed HTTP response.
pub async fn api_error(provider: &str, response: reqwest::Response) -> anyhow::Error {
    let status = response.status();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "<failed to read provider error body>".to_string());
    let sanitized = sanitize_api_error(&body);
    anyhow::anyhow!("{provider} API error ({status}): {sanitized}")
}
