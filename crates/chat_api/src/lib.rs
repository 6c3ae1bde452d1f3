//! Transport-only client primitives for the agent orchestration backend.
//!
//! This crate owns request building, the chunk-to-record line buffer and the
//! classification of `data: <json>` records into [`ChatEvent`]s. It holds no
//! conversation state; folding events into messages happens downstream.
//!
//! Malformed records are counted and dropped by [`EventStreamParser`] and never
//! abort a stream. Only transport failures surface as [`ChatApiError`].

pub mod client;
pub mod config;
pub mod error;
pub mod events;
pub mod headers;
pub mod lines;
pub mod payload;
pub mod sse;
pub mod url;

pub use client::{CancelSignal, ChatApiClient, StreamSummary};
pub use config::ChatApiConfig;
pub use error::ChatApiError;
pub use events::{ChatEvent, RecordOutcome};
pub use lines::LineBuffer;
pub use payload::{CreateThreadRequest, CreateThreadResponse, SendMessageRequest, UploadResponse};
pub use sse::{classify_record, decode_args, EventStreamParser, DATA_PREFIX};
pub use url::{endpoint_url, normalize_base_url, DEFAULT_BASE_URL};
