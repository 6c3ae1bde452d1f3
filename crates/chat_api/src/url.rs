use url::Url;

use crate::error::ChatApiError;

/// Default backend base URL used when none is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Trims the configured base URL, falls back to the default when blank and
/// drops trailing slashes.
pub fn normalize_base_url(input: &str) -> String {
    let base = if input.trim().is_empty() {
        DEFAULT_BASE_URL
    } else {
        input.trim()
    };

    base.trim_end_matches('/').to_string()
}

/// Builds a backend endpoint by appending percent-encoded path segments to the
/// base URL. Any path already present on the base URL is preserved.
pub fn endpoint_url(base: &str, segments: &[&str]) -> Result<Url, ChatApiError> {
    let normalized = normalize_base_url(base);
    let mut url = Url::parse(&normalized)
        .map_err(|error| ChatApiError::InvalidBaseUrl(format!("{normalized}: {error}")))?;

    {
        let mut path = url
            .path_segments_mut()
            .map_err(|_| ChatApiError::InvalidBaseUrl(normalized.clone()))?;
        path.pop_if_empty().extend(segments);
    }

    Ok(url)
}

pub fn threads_url(base: &str) -> Result<Url, ChatApiError> {
    endpoint_url(base, &["threads"])
}

pub fn thread_messages_url(base: &str, thread_id: &str) -> Result<Url, ChatApiError> {
    endpoint_url(base, &["threads", thread_id.trim(), "messages"])
}

pub fn upload_url(base: &str) -> Result<Url, ChatApiError> {
    endpoint_url(base, &["upload"])
}
