use std::collections::BTreeMap;

use crate::config::ChatApiConfig;

pub const HEADER_ACCEPT: &str = "accept";
pub const HEADER_CONTENT_TYPE: &str = "content-type";
pub const HEADER_USER_AGENT: &str = "user-agent";

/// Which kind of body/response a request carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderProfile {
    /// JSON request, JSON response.
    Json,
    /// JSON request, streamed `data:` records back.
    EventStream,
    /// Multipart upload; the client sets the boundary content type itself.
    Multipart,
}

/// Build a deterministic header map for backend requests.
pub fn build_headers(config: &ChatApiConfig, profile: HeaderProfile) -> BTreeMap<String, String> {
    let mut headers = BTreeMap::new();

    let accept = match profile {
        HeaderProfile::EventStream => "text/event-stream",
        HeaderProfile::Json | HeaderProfile::Multipart => "application/json",
    };
    headers.insert(HEADER_ACCEPT.to_owned(), accept.to_owned());

    if profile != HeaderProfile::Multipart {
        headers.insert(
            HEADER_CONTENT_TYPE.to_owned(),
            "application/json".to_owned(),
        );
    }

    let user_agent = config
        .user_agent
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(ToOwned::to_owned)
        .unwrap_or_else(default_user_agent);
    headers.insert(HEADER_USER_AGENT.to_owned(), user_agent);

    for (key, value) in &config.extra_headers {
        headers.insert(key.trim().to_ascii_lowercase(), value.trim().to_owned());
    }

    headers
}

fn default_user_agent() -> String {
    format!("agent_chat/{}", env!("CARGO_PKG_VERSION"))
}
