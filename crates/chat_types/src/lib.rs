//! Shared value types for assistant turns: tool calls, agent blocks, agent
//! hand-offs and attachments.
//!
//! This crate holds only data shapes and small constructors. It knows nothing
//! about transport, persistence or how a stream is reduced.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use time::OffsetDateTime;
use uuid::Uuid;

/// Structured tool-call arguments.
pub type ToolArgs = Map<String, Value>;

/// Key used to carry tool arguments that could not be decoded into an object.
pub const RAW_ARGS_KEY: &str = "raw";

/// Name given to tool calls whose record carries no name.
pub const UNKNOWN_TOOL_NAME: &str = "unknown_tool";

/// Lifecycle of one tool invocation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolCallStatus {
    #[default]
    Pending,
    Completed,
    Error,
}

impl ToolCallStatus {
    pub fn parse(value: &str) -> Option<Self> {
        Some(match value.trim() {
            "pending" => Self::Pending,
            "completed" => Self::Completed,
            "error" => Self::Error,
            _ => return None,
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Error => "error",
        }
    }

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Error)
    }
}

/// One external function invocation made by the assistant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub args: ToolArgs,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default)]
    pub status: ToolCallStatus,
    /// Position in the owning stream's event sequence, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<u64>,
}

impl ToolCall {
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, args: ToolArgs) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            args,
            result: None,
            status: ToolCallStatus::Pending,
            timestamp: None,
        }
    }

    #[must_use]
    pub fn completed(mut self, result: impl Into<Value>) -> Self {
        self.result = Some(result.into());
        self.status = ToolCallStatus::Completed;
        self
    }

    #[must_use]
    pub fn with_status(mut self, status: ToolCallStatus) -> Self {
        self.status = status;
        self
    }
}

/// Contiguous span of assistant text attributed to one agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentBlock {
    pub agent_name: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub timestamp: u64,
}

impl AgentBlock {
    #[must_use]
    pub fn new(agent_name: impl Into<String>, timestamp: u64) -> Self {
        Self {
            agent_name: agent_name.into(),
            content: String::new(),
            timestamp,
        }
    }
}

/// Logged hand-off between two agents within one assistant turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentTransition {
    pub id: String,
    pub from_agent: String,
    pub to_agent: String,
    #[serde(default)]
    pub timestamp: u64,
}

impl AgentTransition {
    #[must_use]
    pub fn now(from_agent: impl Into<String>, to_agent: impl Into<String>) -> Self {
        Self {
            id: generate_id("agent_call"),
            from_agent: from_agent.into(),
            to_agent: to_agent.into(),
            timestamp: now_ms(),
        }
    }
}

/// File attached to a user message.
///
/// `local_handle` points at the file on disk until an upload returns a URL. It
/// is never serialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub id: String,
    pub name: String,
    pub size: u64,
    #[serde(rename = "type")]
    pub mime_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip)]
    pub local_handle: Option<PathBuf>,
}

impl Attachment {
    #[must_use]
    pub fn local(
        name: impl Into<String>,
        size: u64,
        mime_type: impl Into<String>,
        path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            id: generate_id("file"),
            name: name.into(),
            size,
            mime_type: mime_type.into(),
            url: None,
            local_handle: Some(path.into()),
        }
    }

    /// Replaces the local handle with the uploaded reference.
    pub fn mark_uploaded(&mut self, url: impl Into<String>) {
        self.url = Some(url.into());
        self.local_handle = None;
    }

    #[must_use]
    pub fn is_uploaded(&self) -> bool {
        self.url.is_some()
    }
}

/// Returns a prefixed random identifier such as `msg_4f0c...`.
#[must_use]
pub fn generate_id(prefix: &str) -> String {
    format!("{prefix}_{}", Uuid::new_v4().simple())
}

/// Current wall-clock time as Unix epoch milliseconds.
#[must_use]
pub fn now_ms() -> u64 {
    let millis = OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000;
    u64::try_from(millis).unwrap_or(0)
}
