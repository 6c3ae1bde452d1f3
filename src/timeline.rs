//! Render order of a finished assistant message.

use chat_types::{AgentBlock, ToolCall};
use thread_store::Message;

#[derive(Debug, Clone, PartialEq)]
pub enum TimelineItem {
    Agent(AgentBlock),
    /// Consecutive tool calls with no agent text between them.
    ToolGroup(Vec<ToolCall>),
}

enum Entry<'a> {
    Block(&'a AgentBlock),
    Tool(&'a ToolCall),
}

impl Entry<'_> {
    /// Unstamped tool calls sort after everything stamped.
    fn sort_key(&self) -> (bool, u64) {
        match self {
            Self::Block(block) => (false, block.timestamp),
            Self::Tool(call) => match call.timestamp {
                Some(timestamp) => (false, timestamp),
                None => (true, 0),
            },
        }
    }
}

/// Interleaves blocks and tool calls by sequence stamp, grouping runs of
/// adjacent tool calls. Ties keep blocks ahead of tool calls.
pub fn build_timeline(blocks: &[AgentBlock], tool_calls: &[ToolCall]) -> Vec<TimelineItem> {
    let mut entries: Vec<Entry<'_>> = blocks
        .iter()
        .map(Entry::Block)
        .chain(tool_calls.iter().map(Entry::Tool))
        .collect();
    entries.sort_by_key(Entry::sort_key);

    let mut items = Vec::new();
    for entry in entries {
        match entry {
            Entry::Block(block) => items.push(TimelineItem::Agent(block.clone())),
            Entry::Tool(call) => match items.last_mut() {
                Some(TimelineItem::ToolGroup(group)) => group.push(call.clone()),
                _ => items.push(TimelineItem::ToolGroup(vec![call.clone()])),
            },
        }
    }
    items
}

pub fn message_timeline(message: &Message) -> Vec<TimelineItem> {
    build_timeline(
        message.agent_blocks.as_deref().unwrap_or_default(),
        message.tool_calls.as_deref().unwrap_or_default(),
    )
}
