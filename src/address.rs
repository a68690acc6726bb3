use regex::Regex;
use url::Url;

/// Fallback companion app address used whenever the configured one is unusable.
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8765";

/// Canonicalize a user-supplied companion app base address.
///
/// Never fails: empty or unparseable input falls back to [`DEFAULT_API_URL`].
/// A missing scheme gets `http://` prepended, trailing slashes are stripped,
/// and a path starting with `/api` is dropped entirely so that endpoint
/// concatenation can never produce an `/api/api/...` prefix. Query string and
/// fragment are discarded. The function is idempotent:
/// `normalize(normalize(x)) == normalize(x)` for all inputs.
pub fn normalize(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return DEFAULT_API_URL.to_string();
    }

    let scheme_regex = Regex::new(r"(?i)^https?://").unwrap();
    let candidate = if scheme_regex.is_match(trimmed) {
        trimmed.to_string()
    } else {
        format!("http://{trimmed}")
    };

    let mut parsed = match Url::parse(&candidate) {
        Ok(url) => url,
        Err(_) => return DEFAULT_API_URL.to_string(),
    };

    let mut path = parsed.path().trim_end_matches('/').to_string();
    if path.to_lowercase().starts_with("/api") {
        path.clear();
    }
    parsed.set_path(&path);
    parsed.set_query(None);
    parsed.set_fragment(None);

    let normalized = parsed.to_string().trim_end_matches('/').to_string();
    if normalized.is_empty() {
        DEFAULT_API_URL.to_string()
    } else {
        normalized
    }
}
