use std::sync::atomic::Ordering;
use std::time::Duration;

use chat_api::{CancelSignal, ChatEvent};
use chat_types::ToolCall;
use rand::Rng;
use tracing::debug;

use crate::canned::CannedResponse;

const CANCEL_POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Pacing of a canned replay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayTiming {
    pub start_delay: Duration,
    pub tool_delay: Duration,
    pub min_char_delay: Duration,
    pub max_char_delay: Duration,
}

impl ReplayTiming {
    const START_DELAY_MS: u64 = 300;
    const TOOL_DELAY_MS: u64 = 500;
    const MIN_CHAR_DELAY_MS: u64 = 10;
    const MAX_CHAR_DELAY_MS: u64 = 40;

    /// No pauses at all.
    #[must_use]
    pub fn instant() -> Self {
        Self {
            start_delay: Duration::ZERO,
            tool_delay: Duration::ZERO,
            min_char_delay: Duration::ZERO,
            max_char_delay: Duration::ZERO,
        }
    }

    fn char_delay(&self) -> Duration {
        if self.max_char_delay <= self.min_char_delay {
            return self.min_char_delay;
        }
        rand::thread_rng().gen_range(self.min_char_delay..=self.max_char_delay)
    }
}

impl Default for ReplayTiming {
    fn default() -> Self {
        Self {
            start_delay: Duration::from_millis(Self::START_DELAY_MS),
            tool_delay: Duration::from_millis(Self::TOOL_DELAY_MS),
            min_char_delay: Duration::from_millis(Self::MIN_CHAR_DELAY_MS),
            max_char_delay: Duration::from_millis(Self::MAX_CHAR_DELAY_MS),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplayOutcome {
    Completed,
    Cancelled,
}

/// Replays `response` as stream events: every tool call first, then one
/// content event per character.
pub async fn replay_events<F>(
    response: &CannedResponse,
    timing: &ReplayTiming,
    cancellation: Option<&CancelSignal>,
    mut emit: F,
) -> ReplayOutcome
where
    F: FnMut(ChatEvent),
{
    debug!(
        category = response.category.as_str(),
        tool_calls = response.tool_calls.len(),
        "replaying canned response"
    );

    if !pause(timing.start_delay, cancellation).await {
        return ReplayOutcome::Cancelled;
    }

    if !response.tool_calls.is_empty() {
        for call in &response.tool_calls {
            emit(ChatEvent::ToolCall {
                call: call.clone(),
                agent_name: None,
            });
        }
        if !pause(timing.tool_delay, cancellation).await {
            return ReplayOutcome::Cancelled;
        }
    }

    for ch in response.content.chars() {
        if is_cancelled(cancellation) {
            return ReplayOutcome::Cancelled;
        }
        emit(ChatEvent::content(ch.to_string(), None));
        if !pause(timing.char_delay(), cancellation).await {
            return ReplayOutcome::Cancelled;
        }
    }

    ReplayOutcome::Completed
}

/// Replays `response` as cumulative updates: one update carrying only the
/// tool calls, then one per character with the text accumulated so far.
pub async fn replay<F>(
    response: &CannedResponse,
    timing: &ReplayTiming,
    cancellation: Option<&CancelSignal>,
    mut on_update: F,
) -> ReplayOutcome
where
    F: FnMut(&str, &[ToolCall]),
{
    let mut content = String::new();
    let mut tools_reported = false;
    replay_events(response, timing, cancellation, |event| match event {
        ChatEvent::ToolCall { .. } => {
            if !tools_reported {
                tools_reported = true;
                on_update("", &response.tool_calls);
            }
        }
        ChatEvent::Content { content: delta, .. } => {
            content.push_str(&delta);
            on_update(&content, &response.tool_calls);
        }
        _ => {}
    })
    .await
}

fn is_cancelled(cancellation: Option<&CancelSignal>) -> bool {
    cancellation.is_some_and(|signal| signal.load(Ordering::Acquire))
}

/// Sleeps for `delay` in short slices. Returns `false` once cancelled.
async fn pause(delay: Duration, cancellation: Option<&CancelSignal>) -> bool {
    let mut remaining = delay;
    while !remaining.is_zero() {
        if is_cancelled(cancellation) {
            return false;
        }
        let step = remaining.min(CANCEL_POLL_INTERVAL);
        tokio::time::sleep(step).await;
        remaining -= step;
    }
    !is_cancelled(cancellation)
}
