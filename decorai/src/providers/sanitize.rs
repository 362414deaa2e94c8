//! Clean up provider error bodies before they travel back to a browser:
//! scrub credential-like tokens and cap the length.

const MAX_API_ERROR_CHARS: usize = 200;

/// Prefixes of Google API keys and OAuth access tokens.
const SECRET_PREFIXES: [&str; 3] = ["AIza", "ya29.", "sk-"];

fn is_secret_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')
}

fn token_end(input: &str, from: usize) -> usize {
    input[from..]
        .char_indices()
        .find(|(_, c)| !is_secret_char(*c))
        .map(|(i, _)| from + i)
        .unwrap_or(input.len())
}

/// Replace every token starting with a known key prefix by `[REDACTED]`.
pub fn scrub_secret_patterns(input: &str) -> String {
    let mut scrubbed = input.to_string();

    for prefix in SECRET_PREFIXES {
        let mut search_from = 0;
        while let Some(rel) = scrubbed[search_from..].find(prefix) {
            let start = search_from + rel;
            let content_start = start + prefix.len();
            let end = token_end(&scrubbed, content_start);

            // A bare prefix is left alone.
            if end == content_start {
                search_from = content_start;
                continue;
            }

            scrubbed.replace_range(start..end, "[REDACTED]");
            search_from = start + "[REDACTED]".len();
        }
    }

    scrubbed
}

/// Scrub secrets, then truncate to `MAX_API_ERROR_CHARS` characters.
pub fn sanitize_api_error(input: &str) -> String {
    let scrubbed = scrub_secret_patterns(input.trim());

    match scrubbed.char_indices().nth(MAX_API_ERROR_CHARS) {
        Some((end, _)) => format!("{}...", &scrubbed[..end]),
        None => scrubbed,
    }
}

/// Build a sanitized provider error from a failed HTTP response body and status.
pub fn api_error_body(status: u16, body: &str) -> super::ProviderError {
    super::ProviderError::Http {
        status,
        body: sanitize_api_error(body),
    }
}
