use chat_types::{AgentBlock, AgentTransition, Attachment, ToolCall};
use serde::{Deserialize, Serialize};

use crate::store::DEFAULT_THREAD_TITLE;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

/// One turn in a thread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub role: Role,
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_calls: Option<Vec<AgentTransition>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_agent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_blocks: Option<Vec<AgentBlock>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachments: Option<Vec<Attachment>>,
    #[serde(default)]
    pub timestamp: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Thread {
    pub id: String,
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default)]
    pub messages: Vec<Message>,
    #[serde(default)]
    pub created_at: u64,
    #[serde(default)]
    pub updated_at: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backend_thread_id: Option<String>,
}

fn default_title() -> String {
    DEFAULT_THREAD_TITLE.to_string()
}

/// Durable subset of the store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default)]
    pub threads: Vec<Thread>,
    #[serde(default)]
    pub current_thread_id: Option<String>,
}

/// Message contents supplied by callers; the store assigns id and timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct NewMessage {
    pub role: Role,
    pub content: String,
    pub tool_calls: Option<Vec<ToolCall>>,
    pub agent_calls: Option<Vec<AgentTransition>>,
    pub current_agent: Option<String>,
    pub agent_blocks: Option<Vec<AgentBlock>>,
    pub attachments: Option<Vec<Attachment>>,
}

impl NewMessage {
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self::with_role(Role::User, content)
    }

    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::with_role(Role::Assistant, content)
    }

    fn with_role(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            tool_calls: None,
            agent_calls: None,
            current_agent: None,
            agent_blocks: None,
            attachments: None,
        }
    }

    #[must_use]
    pub fn with_attachments(mut self, attachments: Vec<Attachment>) -> Self {
        self.attachments = (!attachments.is_empty()).then_some(attachments);
        self
    }

    pub(crate) fn into_message(self, id: String, timestamp: u64) -> Message {
        Message {
            id,
            role: self.role,
            content: self.content,
            tool_calls: self.tool_calls,
            agent_calls: self.agent_calls,
            current_agent: self.current_agent,
            agent_blocks: self.agent_blocks,
            attachments: self.attachments,
            timestamp,
        }
    }
}

/// Partial message update. Present fields replace the message's fields;
/// absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MessagePatch {
    pub content: Option<String>,
    pub tool_calls: Option<Vec<ToolCall>>,
    pub agent_calls: Option<Vec<AgentTransition>>,
    pub current_agent: Option<String>,
    pub agent_blocks: Option<Vec<AgentBlock>>,
    pub attachments: Option<Vec<Attachment>>,
}

impl MessagePatch {
    #[must_use]
    pub fn content(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    pub fn apply_to(&self, message: &mut Message) {
        if let Some(content) = &self.content {
            message.content.clone_from(content);
        }
        if let Some(tool_calls) = &self.tool_calls {
            message.tool_calls = Some(tool_calls.clone());
        }
        if let Some(agent_calls) = &self.agent_calls {
            message.agent_calls = Some(agent_calls.clone());
        }
        if let Some(current_agent) = &self.current_agent {
            message.current_agent = Some(current_agent.clone());
        }
        if let Some(agent_blocks) = &self.agent_blocks {
            message.agent_blocks = Some(agent_blocks.clone());
        }
        if let Some(attachments) = &self.attachments {
            message.attachments = Some(attachments.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use chat_types::ToolCall;

    use super::*;

    fn message() -> Message {
        NewMessage::assistant("").into_message("msg_1".to_string(), 1)
    }

    #[test]
    fn empty_patch_leaves_message_untouched() {
        let mut target = message();
        MessagePatch::default().apply_to(&mut target);

        assert_eq!(target, message());
        assert!(MessagePatch::default().is_empty());
    }

    #[test]
    fn patch_replaces_only_present_fields() {
        let mut target = message();
        target.current_agent = Some("planner".to_string());

        let patch = MessagePatch {
            content: Some("hello".to_string()),
            tool_calls: Some(vec![ToolCall::new("t1", "search", Default::default())]),
            ..MessagePatch::default()
        };
        patch.apply_to(&mut target);

        assert_eq!(target.content, "hello");
        assert_eq!(target.tool_calls.as_ref().map(Vec::len), Some(1));
        assert_eq!(target.current_agent.as_deref(), Some("planner"));
    }

    #[test]
    fn older_snapshots_without_optional_fields_load() {
        let thread: Thread = serde_json::from_str(
            r#"{"id":"thread_1","messages":[{"id":"m1","role":"user","content":"hi"}]}"#,
        )
        .expect("legacy thread");

        assert_eq!(thread.title, DEFAULT_THREAD_TITLE);
        assert_eq!(thread.backend_thread_id, None);
        assert_eq!(thread.messages[0].timestamp, 0);
        assert_eq!(thread.messages[0].agent_blocks, None);
    }

    #[test]
    fn message_serializes_camel_case_and_skips_absent_fields() {
        let value = serde_json::to_value(message()).expect("serialize");

        assert_eq!(
            value,
            serde_json::json!({"id": "msg_1", "role": "assistant", "content": "", "timestamp": 1})
        );
    }
}
