use chat_types::ToolCall;
use serde_json::{json, Value};

use crate::sse::DATA_PREFIX;

/// Stream event emitted by the classifier after normalization.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatEvent {
    AgentStart {
        agent_name: String,
    },
    AgentEnd {
        agent_name: String,
    },
    Content {
        content: String,
        agent_name: Option<String>,
    },
    /// Tool-call lifecycle update; repeated ids replace earlier observations.
    ToolCall {
        call: ToolCall,
        agent_name: Option<String>,
    },
    AgentCall {
        from_agent: String,
        to_agent: String,
        agent_name: Option<String>,
    },
}

impl ChatEvent {
    pub fn content(content: impl Into<String>, agent_name: Option<&str>) -> Self {
        Self::Content {
            content: content.into(),
            agent_name: agent_name.map(ToOwned::to_owned),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::AgentStart { .. } => "agent_start",
            Self::AgentEnd { .. } => "agent_end",
            Self::Content { .. } => "content",
            Self::ToolCall { .. } => "tool_call",
            Self::AgentCall { .. } => "agent_call",
        }
    }

    pub fn agent_name(&self) -> Option<&str> {
        match self {
            Self::AgentStart { agent_name } | Self::AgentEnd { agent_name } => Some(agent_name),
            Self::Content { agent_name, .. }
            | Self::ToolCall { agent_name, .. }
            | Self::AgentCall { agent_name, .. } => agent_name.as_deref(),
        }
    }

    /// Wire representation of this event, as the backend would send it.
    pub fn to_wire_value(&self) -> Value {
        let mut value = match self {
            Self::AgentStart { .. } | Self::AgentEnd { .. } => json!({}),
            Self::Content { content, .. } => json!({ "content": content }),
            Self::ToolCall { call, .. } => {
                let mut tool_call = json!({
                    "id": call.id,
                    "name": call.name,
                    "args": call.args,
                    "status": call.status.as_str(),
                });
                if let Some(result) = &call.result {
                    tool_call["result"] = result.clone();
                }
                json!({ "toolCall": tool_call })
            }
            Self::AgentCall {
                from_agent,
                to_agent,
                ..
            } => json!({
                "agentCall": { "from_agent": from_agent, "to_agent": to_agent }
            }),
        };

        value["type"] = Value::from(self.kind());
        if let Some(agent_name) = self.agent_name() {
            value["agent_name"] = Value::from(agent_name);
        }
        value
    }

    /// Newline-terminated `data:` record carrying this event.
    pub fn to_record(&self) -> String {
        format!("{DATA_PREFIX} {}\n", self.to_wire_value())
    }
}

/// Result of classifying one complete record.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordOutcome {
    Event(ChatEvent),
    /// Not an event record (no prefix, empty payload, unknown type).
    Ignored,
    /// Carried the prefix but could not be decoded.
    Malformed(String),
}

impl RecordOutcome {
    pub fn into_event(self) -> Option<ChatEvent> {
        match self {
            Self::Event(event) => Some(event),
            Self::Ignored | Self::Malformed(_) => None,
        }
    }
}
