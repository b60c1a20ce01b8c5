//! URL and input validation utilities

use regex::Regex;
use std::sync::OnceLock;

use crate::core::error_handling::{ClientError, ClientResult};

/// Watch page or short link, optional scheme and `www.`; anything may follow.
const YOUTUBE_URL_PATTERN: &str = r"^(https?://)?(www\.)?(youtube\.com/watch\?v=|youtu\.be/)";

fn youtube_regex() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(YOUTUBE_URL_PATTERN).expect("static pattern compiles"))
}

/// Check if text looks like a YouTube watch or short link
pub fn is_youtube_url(text: &str) -> bool {
    youtube_regex().is_match(text)
}

/// Trim raw input and validate it, distinguishing empty from malformed input
pub fn validate_youtube_url(input: &str) -> ClientResult<String> {
    let url = input.trim();

    if url.is_empty() {
        return Err(ClientError::EmptyUrl);
    }

    if !is_youtube_url(url) {
        return Err(ClientError::InvalidUrl);
    }

    Ok(url.to_string())
}
