use std::collections::BTreeMap;

use crate::url::DEFAULT_BASE_URL;

/// Graph the backend runs for new threads unless told otherwise.
pub const DEFAULT_GRAPH_ID: &str = "langgraph-app";

/// Transport configuration for backend requests.
#[derive(Debug, Clone)]
pub struct ChatApiConfig {
    /// Base URL of the orchestration backend.
    pub base_url: String,
    /// Graph identifier sent when creating backend threads.
    pub graph_id: String,
    /// Optional `User-Agent` override.
    pub user_agent: Option<String>,
    /// Additional headers merged into request headers.
    pub extra_headers: BTreeMap<String, String>,
}

impl Default for ChatApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            graph_id: DEFAULT_GRAPH_ID.to_string(),
            user_agent: None,
            extra_headers: BTreeMap::new(),
        }
    }
}

impl ChatApiConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn with_graph_id(mut self, graph_id: impl Into<String>) -> Self {
        self.graph_id = graph_id.into();
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn insert_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_headers.insert(key.into(), value.into());
        self
    }

    pub fn with_headers(mut self, headers: impl IntoIterator<Item = (String, String)>) -> Self {
        self.extra_headers.extend(headers);
        self
    }
}
