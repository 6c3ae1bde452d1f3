//! Terminal front end for the agent chat client.
//!
//! Configuration comes from the environment (see [`agent_chat::EnvConfig`]):
//!
//! - `AGENT_CHAT_API_BASE_URL` backend base URL, default `http://localhost:8000`
//! - `AGENT_CHAT_STORAGE_DIR` snapshot directory, default `./.agent_chat`
//! - `AGENT_CHAT_LOG` log filter, falling back to `RUST_LOG`
//!
//! When the backend is unreachable every reply is a canned demo reply and the
//! front end says so.

pub mod app;
pub mod commands;
