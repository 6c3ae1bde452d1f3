//! Folds an ordered [`ChatEvent`] sequence into one assistant message.
//!
//! Agent blocks are opened lazily on the first content after an agent switch
//! and are never merged backward: `A, B, A` yields three blocks. Blocks and
//! tool calls share one sequence counter so the render order can be rebuilt
//! afterwards (see [`crate::timeline`]).

use chat_api::ChatEvent;
use chat_types::{AgentBlock, AgentTransition, ToolCall, UNKNOWN_TOOL_NAME};
use thread_store::MessagePatch;
use tracing::debug;

/// Agent attributed to content that arrives before any agent is named.
pub const DEFAULT_AGENT: &str = "assistant";

/// Final content written when a stream produced no text at all.
pub const EMPTY_REPLY_FALLBACK: &str = "No response from server";

#[derive(Debug, Clone)]
pub struct StreamReducer {
    current_agent: String,
    agent_blocks: Vec<AgentBlock>,
    current_block: Option<usize>,
    tool_calls: Vec<ToolCall>,
    agent_calls: Vec<AgentTransition>,
    event_sequence: u64,
}

impl Default for StreamReducer {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamReducer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            current_agent: DEFAULT_AGENT.to_string(),
            agent_blocks: Vec::new(),
            current_block: None,
            tool_calls: Vec::new(),
            agent_calls: Vec::new(),
            event_sequence: 0,
        }
    }

    pub fn current_agent(&self) -> &str {
        &self.current_agent
    }

    pub fn agent_blocks(&self) -> &[AgentBlock] {
        &self.agent_blocks
    }

    pub fn tool_calls(&self) -> &[ToolCall] {
        &self.tool_calls
    }

    pub fn agent_calls(&self) -> &[AgentTransition] {
        &self.agent_calls
    }

    /// Text of every block joined in order.
    pub fn content(&self) -> String {
        self.agent_blocks
            .iter()
            .map(|block| block.content.as_str())
            .collect()
    }

    pub fn has_content(&self) -> bool {
        self.agent_blocks.iter().any(|block| !block.content.is_empty())
    }

    /// Applies one event and returns the store update it implies.
    pub fn apply(&mut self, event: ChatEvent) -> MessagePatch {
        debug!(kind = event.kind(), agent = %self.current_agent, "reducing stream event");
        match event {
            ChatEvent::AgentStart { agent_name } => {
                self.switch_agent(agent_name);
                MessagePatch {
                    current_agent: Some(self.current_agent.clone()),
                    ..MessagePatch::default()
                }
            }
            ChatEvent::Content {
                content,
                agent_name,
            } => {
                if let Some(agent_name) = agent_name {
                    if agent_name != self.current_agent {
                        self.switch_agent(agent_name);
                    }
                }
                let index = self.open_block();
                self.agent_blocks[index].content.push_str(&content);

                MessagePatch {
                    content: Some(self.content()),
                    agent_blocks: Some(self.agent_blocks.clone()),
                    current_agent: Some(self.current_agent.clone()),
                    ..MessagePatch::default()
                }
            }
            ChatEvent::ToolCall { call, .. } => {
                self.record_tool_call(call);
                MessagePatch {
                    tool_calls: Some(self.tool_calls.clone()),
                    agent_blocks: Some(self.agent_blocks.clone()),
                    ..MessagePatch::default()
                }
            }
            ChatEvent::AgentCall {
                from_agent,
                to_agent,
                ..
            } => {
                self.agent_calls
                    .push(AgentTransition::now(from_agent, to_agent.clone()));
                self.switch_agent(to_agent);
                MessagePatch {
                    agent_calls: Some(self.agent_calls.clone()),
                    current_agent: Some(self.current_agent.clone()),
                    ..MessagePatch::default()
                }
            }
            // Blocks close on the next switch, not here.
            ChatEvent::AgentEnd { .. } => MessagePatch::default(),
        }
    }

    /// Final update issued once the stream is exhausted.
    pub fn finish(&self) -> MessagePatch {
        let content = if self.has_content() {
            self.content()
        } else {
            EMPTY_REPLY_FALLBACK.to_string()
        };

        MessagePatch {
            content: Some(content),
            tool_calls: Some(self.tool_calls.clone()),
            agent_calls: Some(self.agent_calls.clone()),
            agent_blocks: Some(self.agent_blocks.clone()),
            ..MessagePatch::default()
        }
    }

    fn switch_agent(&mut self, agent_name: String) {
        self.current_agent = agent_name;
        self.current_block = None;
    }

    fn open_block(&mut self) -> usize {
        if let Some(index) = self.current_block {
            return index;
        }
        let block = AgentBlock::new(self.current_agent.clone(), self.next_sequence());
        self.agent_blocks.push(block);
        let index = self.agent_blocks.len() - 1;
        self.current_block = Some(index);
        index
    }

    /// Merges by id. A finished call never returns to pending, and fields the
    /// update leaves out keep their earlier values.
    fn record_tool_call(&mut self, mut call: ToolCall) {
        if let Some(existing) = self.tool_calls.iter_mut().find(|tool| tool.id == call.id) {
            call.timestamp = existing.timestamp;
            if existing.status.is_terminal() {
                call.status = existing.status;
            }
            if call.result.is_none() {
                call.result = existing.result.take();
            }
            if call.args.is_empty() {
                call.args = std::mem::take(&mut existing.args);
            }
            if call.name.is_empty() || call.name == UNKNOWN_TOOL_NAME {
                call.name = std::mem::take(&mut existing.name);
            }
            *existing = call;
            return;
        }
        call.timestamp = Some(self.next_sequence());
        self.tool_calls.push(call);
    }

    fn next_sequence(&mut self) -> u64 {
        let sequence = self.event_sequence;
        self.event_sequence += 1;
        sequence
    }
}
