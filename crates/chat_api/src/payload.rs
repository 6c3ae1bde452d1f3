use serde::{Deserialize, Serialize};

/// Body of `POST /threads`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateThreadRequest {
    pub graph_id: String,
}

/// Response of `POST /threads`.
///
/// Backends answer either `{"thread": {"id": ..}}`, `{"id": ..}` or
/// `{"thread_id": ..}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CreateThreadResponse {
    #[serde(default)]
    pub thread: Option<ThreadRef>,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub thread_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ThreadRef {
    #[serde(default)]
    pub id: Option<String>,
}

impl CreateThreadResponse {
    pub fn resolved_id(&self) -> Option<&str> {
        self.thread
            .as_ref()
            .and_then(|thread| thread.id.as_deref())
            .or(self.id.as_deref())
            .or(self.thread_id.as_deref())
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }
}

/// Body of `POST /threads/{id}/messages`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendMessageRequest {
    pub message: String,
    pub thread_id: String,
    pub stream: bool,
}

impl SendMessageRequest {
    pub fn streaming(thread_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            thread_id: thread_id.into(),
            stream: true,
        }
    }
}

/// Response of `POST /upload`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UploadResponse {
    #[serde(default)]
    pub url: Option<String>,
}
