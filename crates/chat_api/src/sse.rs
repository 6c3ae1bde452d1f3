use chat_types::{generate_id, ToolArgs, ToolCall, ToolCallStatus, RAW_ARGS_KEY, UNKNOWN_TOOL_NAME};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::events::{ChatEvent, RecordOutcome};
use crate::lines::LineBuffer;

/// Marker every event record starts with.
pub const DATA_PREFIX: &str = "data:";

const DONE_SENTINEL: &str = "[DONE]";
const MAX_ARGS_DECODE_DEPTH: usize = 2;
const LOG_RECORD_PREVIEW_CHARS: usize = 120;

/// Incremental parser for `data: <json>` record streams.
#[derive(Debug, Default)]
pub struct EventStreamParser {
    lines: LineBuffer,
    malformed: usize,
}

impl EventStreamParser {
    /// Feed arbitrary bytes into the parser and drain complete events.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<ChatEvent> {
        let records = self.lines.feed(bytes);
        records
            .iter()
            .filter_map(|record| self.accept(record))
            .collect()
    }

    /// Best-effort parse of a trailing record left without a newline.
    pub fn finish(&mut self) -> Vec<ChatEvent> {
        match self.lines.finish() {
            Some(record) => self.accept(&record).into_iter().collect(),
            None => Vec::new(),
        }
    }

    /// Parse a complete stream body in one shot.
    pub fn parse_records(input: &str) -> Vec<ChatEvent> {
        let mut parser = Self::default();
        let mut events = parser.feed(input.as_bytes());
        events.extend(parser.finish());
        events
    }

    /// Number of records dropped because they could not be decoded.
    pub fn malformed_records(&self) -> usize {
        self.malformed
    }

    fn accept(&mut self, record: &str) -> Option<ChatEvent> {
        match classify_record(record) {
            RecordOutcome::Event(event) => {
                debug!(kind = event.kind(), agent = ?event.agent_name(), "stream event");
                Some(event)
            }
            RecordOutcome::Ignored => None,
            RecordOutcome::Malformed(reason) => {
                self.malformed += 1;
                warn!(
                    %reason,
                    record = %preview(record),
                    "dropping malformed stream record"
                );
                None
            }
        }
    }
}

/// Classify one complete record.
pub fn classify_record(record: &str) -> RecordOutcome {
    let Some(payload) = record.trim_start().strip_prefix(DATA_PREFIX) else {
        return RecordOutcome::Ignored;
    };
    let payload = payload.trim();
    if payload.is_empty() || payload == DONE_SENTINEL {
        return RecordOutcome::Ignored;
    }

    match serde_json::from_str::<Value>(payload) {
        Ok(value) => map_event(&value),
        Err(error) => RecordOutcome::Malformed(error.to_string()),
    }
}

fn map_event(value: &Value) -> RecordOutcome {
    let Some(event_type) = value.get("type").and_then(Value::as_str) else {
        return RecordOutcome::Malformed("record has no string `type` tag".to_string());
    };
    let agent_name = string_field(value, "agent_name");

    let event = match event_type {
        "agent_start" | "agent_end" => {
            let Some(agent_name) = agent_name else {
                return RecordOutcome::Malformed(format!("{event_type} without agent_name"));
            };
            if event_type == "agent_start" {
                ChatEvent::AgentStart { agent_name }
            } else {
                ChatEvent::AgentEnd { agent_name }
            }
        }
        "content" => {
            // Earlier backend revisions used `delta` for the text field.
            let content = value
                .get("content")
                .and_then(Value::as_str)
                .or_else(|| value.get("delta").and_then(Value::as_str))
                .unwrap_or("");
            if content.is_empty() {
                return RecordOutcome::Ignored;
            }
            ChatEvent::Content {
                content: content.to_owned(),
                agent_name,
            }
        }
        "tool_call" => {
            let payload = value
                .get("toolCall")
                .filter(|payload| payload.is_object())
                .unwrap_or(value);
            ChatEvent::ToolCall {
                call: decode_tool_call(payload),
                agent_name,
            }
        }
        "agent_call" => {
            let Some(call) = value.get("agentCall").filter(|call| call.is_object()) else {
                return RecordOutcome::Malformed("agent_call without agentCall payload".into());
            };
            let (Some(from_agent), Some(to_agent)) = (
                string_field(call, "from_agent"),
                string_field(call, "to_agent"),
            ) else {
                return RecordOutcome::Malformed("agentCall missing from_agent/to_agent".into());
            };
            ChatEvent::AgentCall {
                from_agent,
                to_agent,
                agent_name,
            }
        }
        other => {
            debug!(event_type = other, "ignoring unknown stream event type");
            return RecordOutcome::Ignored;
        }
    };

    RecordOutcome::Event(event)
}

fn decode_tool_call(payload: &Value) -> ToolCall {
    let result = payload
        .get("result")
        .filter(|result| !result.is_null())
        .cloned();
    let status = payload
        .get("status")
        .and_then(Value::as_str)
        .and_then(ToolCallStatus::parse)
        .unwrap_or(if result.is_some() {
            ToolCallStatus::Completed
        } else {
            ToolCallStatus::Pending
        });

    ToolCall {
        id: string_field(payload, "id").unwrap_or_else(|| generate_id("tool")),
        name: string_field(payload, "name").unwrap_or_else(|| UNKNOWN_TOOL_NAME.to_string()),
        args: decode_args(payload.get("args")),
        result,
        status,
        timestamp: None,
    }
}

/// Decode tool arguments that may arrive as an object or as JSON-encoded text.
///
/// Never fails: anything that does not end up as an object is wrapped under
/// [`RAW_ARGS_KEY`].
pub fn decode_args(value: Option<&Value>) -> ToolArgs {
    let mut current = match value {
        None | Some(Value::Null) => return Map::new(),
        Some(value) => value.clone(),
    };

    for _ in 0..MAX_ARGS_DECODE_DEPTH {
        let Value::String(raw) = &current else {
            break;
        };
        if raw.trim().is_empty() {
            return Map::new();
        }
        match serde_json::from_str::<Value>(raw) {
            Ok(decoded) => current = decoded,
            Err(_) => break,
        }
    }

    match current {
        Value::Object(map) => map,
        Value::Null => Map::new(),
        other => {
            let mut wrapped = Map::new();
            wrapped.insert(RAW_ARGS_KEY.to_string(), other);
            wrapped
        }
    }
}

fn string_field(value: &Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(ToString::to_string)
}

fn preview(record: &str) -> String {
    let mut preview: String = record.chars().take(LOG_RECORD_PREVIEW_CHARS).collect();
    if preview.len() < record.len() {
        preview.push_str("...");
    }
    preview
}
