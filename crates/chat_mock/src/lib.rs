//! Offline stand-in for the orchestration backend.
//!
//! When the live stream is unavailable the session replays a canned reply
//! chosen by keyword. Replays go through the same [`ChatEvent`] path as live
//! traffic, so a fallback reply ends up shaped exactly like a streamed one.
//!
//! [`ChatEvent`]: chat_api::ChatEvent

mod canned;
mod demo;
mod replay;

pub use canned::{classify_prompt, generate, CannedResponse, MockCategory};
pub use demo::{multi_agent_demo, multi_agent_demo_records};
pub use replay::{replay, replay_events, ReplayOutcome, ReplayTiming};
