//! Streaming chat client core for multi-agent orchestration backends.
//!
//! Events decoded by [`chat_api`] are folded by [`reducer::StreamReducer`] into
//! message patches for a [`thread_store::ThreadStore`]. [`session::ChatSession`]
//! drives one send end to end and falls back to [`chat_mock`] replays when the
//! backend cannot be reached.
//!
//! # Public API Overview
//! - [`StreamReducer`]: event-by-event reduction into agent blocks, tool calls
//!   and agent hand-offs.
//! - [`build_timeline`]: chronological render order of a finished reply.
//! - [`ChatSession`]: send a message, stream or replay the reply, cancel.
//! - [`EnvConfig`] and [`init_logging`] for binaries.

pub mod config;
pub mod logging;
pub mod reducer;
pub mod session;
pub mod templates;
pub mod timeline;

pub use crate::config::EnvConfig;
pub use crate::logging::init_logging;
pub use crate::reducer::{StreamReducer, DEFAULT_AGENT, EMPTY_REPLY_FALLBACK};
pub use crate::session::{ChatSession, ReplySource, ReplyUpdate, SendOutcome};
pub use crate::templates::{categories, find_template, templates, templates_in, PromptTemplate};
pub use crate::timeline::{build_timeline, message_timeline, TimelineItem};

pub use chat_api;
pub use chat_mock;
pub use chat_types;
pub use thread_store;
