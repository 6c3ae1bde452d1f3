//! Sending a user message and streaming the assistant reply into the store.
//!
//! The live backend is tried first. Any transport failure (no backend
//! thread, connection refused, non-2xx, aborted body) resets the assistant
//! message and replays a canned reply through a fresh [`StreamReducer`], so
//! stored state has the same shape whichever source produced it.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use chat_api::{CancelSignal, ChatApiClient, ChatApiError};
use chat_mock::{generate, replay_events, ReplayOutcome, ReplayTiming};
use chat_types::Attachment;
use thread_store::{MessagePatch, NewMessage, SharedThreadStore};
use tracing::{info, warn};

use crate::reducer::StreamReducer;

/// Where the stored assistant reply came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplySource {
    Live,
    /// Backend unavailable; the reply is canned demo data.
    Fallback { reason: String },
}

impl ReplySource {
    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback { .. })
    }
}

/// Progress reported while a reply is produced.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReplyUpdate<'a> {
    /// The live stream failed; a canned reply follows.
    Fallback { reason: &'a str },
    /// A patch just applied to the assistant message.
    Patch(&'a MessagePatch),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendOutcome {
    pub thread_id: String,
    pub user_message_id: String,
    pub assistant_message_id: String,
    pub source: ReplySource,
    pub cancelled: bool,
}

type InFlight = HashMap<(String, String), CancelSignal>;

#[derive(Debug, Clone)]
pub struct ChatSession {
    store: SharedThreadStore,
    client: ChatApiClient,
    timing: ReplayTiming,
    in_flight: Arc<Mutex<InFlight>>,
}

impl ChatSession {
    pub fn new(store: SharedThreadStore, client: ChatApiClient) -> Self {
        let graph_id = client.config().graph_id.clone();
        store.with(|store| store.set_graph_id(graph_id));
        Self {
            store,
            client,
            timing: ReplayTiming::default(),
            in_flight: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    #[must_use]
    pub fn with_timing(mut self, timing: ReplayTiming) -> Self {
        self.timing = timing;
        self
    }

    pub fn store(&self) -> &SharedThreadStore {
        &self.store
    }

    pub fn client(&self) -> &ChatApiClient {
        &self.client
    }

    /// Stops further updates to one in-flight reply. Returns whether a
    /// matching stream was running.
    pub fn cancel(&self, thread_id: &str, message_id: &str) -> bool {
        let key = (thread_id.to_string(), message_id.to_string());
        match lock_unpoisoned(&self.in_flight).get(&key) {
            Some(signal) => {
                signal.store(true, Ordering::Release);
                true
            }
            None => false,
        }
    }

    /// Cancels every in-flight reply in `thread_id`; returns how many.
    pub fn cancel_thread(&self, thread_id: &str) -> usize {
        let in_flight = lock_unpoisoned(&self.in_flight);
        let mut cancelled = 0;
        for ((thread, _), signal) in in_flight.iter() {
            if thread == thread_id {
                signal.store(true, Ordering::Release);
                cancelled += 1;
            }
        }
        cancelled
    }

    pub fn in_flight_count(&self) -> usize {
        lock_unpoisoned(&self.in_flight).len()
    }

    /// Sends `text` on `thread_id` (or a new thread when it is missing) and
    /// streams the reply into the store.
    pub async fn send_message(
        &self,
        thread_id: Option<&str>,
        text: &str,
        attachments: Vec<Attachment>,
        cancel: Option<CancelSignal>,
    ) -> SendOutcome {
        self.send_message_observed(thread_id, text, attachments, cancel, |_| {})
            .await
    }

    /// [`Self::send_message`], reporting each update to `observe` as it lands.
    pub async fn send_message_observed<F>(
        &self,
        thread_id: Option<&str>,
        text: &str,
        attachments: Vec<Attachment>,
        cancel: Option<CancelSignal>,
        mut observe: F,
    ) -> SendOutcome
    where
        F: FnMut(ReplyUpdate<'_>),
    {
        let signal = cancel.unwrap_or_else(|| Arc::new(AtomicBool::new(false)));
        let thread_id = self.ensure_thread(thread_id);

        let backend = self.ensure_backend_thread(&thread_id, &signal).await;
        let attachments = match &backend {
            Ok(backend_id) => self.upload_attachments(backend_id, attachments, &signal).await,
            Err(_) => attachments,
        };

        let user_message_id = self
            .store
            .add_message(&thread_id, NewMessage::user(text).with_attachments(attachments))
            .map(|message| message.id)
            .unwrap_or_default();
        self.store.begin_stream();
        let assistant_message_id = self
            .store
            .add_message(&thread_id, NewMessage::assistant(""))
            .map(|message| message.id)
            .unwrap_or_default();

        let key = (thread_id.clone(), assistant_message_id.clone());
        lock_unpoisoned(&self.in_flight).insert(key.clone(), Arc::clone(&signal));

        let (source, cancelled) = self
            .stream_reply(
                &thread_id,
                &assistant_message_id,
                text,
                backend,
                &signal,
                &mut observe,
            )
            .await;

        lock_unpoisoned(&self.in_flight).remove(&key);
        self.store.end_stream();

        SendOutcome {
            thread_id,
            user_message_id,
            assistant_message_id,
            source,
            cancelled,
        }
    }

    fn ensure_thread(&self, thread_id: Option<&str>) -> String {
        self.store.with(|store| match thread_id {
            Some(id) if store.thread(id).is_some() => id.to_string(),
            _ => store.create_thread(None),
        })
    }

    async fn ensure_backend_thread(
        &self,
        thread_id: &str,
        signal: &CancelSignal,
    ) -> Result<String, ChatApiError> {
        let existing = self
            .store
            .thread(thread_id)
            .and_then(|thread| thread.backend_thread_id);
        if let Some(backend_id) = existing {
            return Ok(backend_id);
        }

        let backend_id = self.client.create_thread(Some(signal)).await?;
        self.store
            .with(|store| store.set_backend_thread_id(thread_id, &backend_id));
        Ok(backend_id)
    }

    async fn upload_attachments(
        &self,
        backend_id: &str,
        mut attachments: Vec<Attachment>,
        signal: &CancelSignal,
    ) -> Vec<Attachment> {
        for attachment in attachments.iter_mut() {
            let Some(path) = attachment.local_handle.clone() else {
                continue;
            };
            match self
                .client
                .upload_file(
                    backend_id,
                    &attachment.name,
                    &attachment.mime_type,
                    &path,
                    Some(signal),
                )
                .await
            {
                Ok(url) => attachment.mark_uploaded(url),
                Err(error) => {
                    warn!(%error, file = %attachment.name, "attachment upload failed; keeping local reference");
                }
            }
        }
        attachments
    }

    async fn stream_reply<F>(
        &self,
        thread_id: &str,
        message_id: &str,
        text: &str,
        backend: Result<String, ChatApiError>,
        signal: &CancelSignal,
        observe: &mut F,
    ) -> (ReplySource, bool)
    where
        F: FnMut(ReplyUpdate<'_>),
    {
        let reason = match backend {
            Ok(backend_id) => {
                let mut reducer = StreamReducer::new();
                let streamed = self
                    .client
                    .stream_message(&backend_id, text, Some(signal), |event| {
                        let patch = reducer.apply(event);
                        observe(ReplyUpdate::Patch(&patch));
                        self.store.stream_update(thread_id, message_id, patch);
                    })
                    .await;
                match streamed {
                    Ok(_) => {
                        self.complete(thread_id, message_id, reducer.finish(), observe);
                        return (ReplySource::Live, false);
                    }
                    Err(error) if error.is_cancelled() => return (ReplySource::Live, true),
                    Err(error) => error,
                }
            }
            Err(error) if error.is_cancelled() => {
                return (
                    ReplySource::Fallback {
                        reason: error.to_string(),
                    },
                    true,
                )
            }
            Err(error) => error,
        };

        let reason = reason.to_string();
        warn!(%thread_id, %reason, "backend unavailable; replaying demo reply");
        observe(ReplyUpdate::Fallback { reason: &reason });
        let reset = reset_patch();
        observe(ReplyUpdate::Patch(&reset));
        self.store.stream_update(thread_id, message_id, reset);

        let response = generate(text);
        let mut reducer = StreamReducer::new();
        let outcome = replay_events(&response, &self.timing, Some(signal), |event| {
            let patch = reducer.apply(event);
            observe(ReplyUpdate::Patch(&patch));
            self.store.stream_update(thread_id, message_id, patch);
        })
        .await;

        let cancelled = outcome == ReplayOutcome::Cancelled;
        if !cancelled {
            self.complete(thread_id, message_id, reducer.finish(), observe);
            info!(%thread_id, category = response.category.as_str(), "demo reply complete");
        }
        (ReplySource::Fallback { reason }, cancelled)
    }

    fn complete<F>(&self, thread_id: &str, message_id: &str, patch: MessagePatch, observe: &mut F)
    where
        F: FnMut(ReplyUpdate<'_>),
    {
        observe(ReplyUpdate::Patch(&patch));
        self.store.update_message(thread_id, message_id, patch);
    }
}

/// Clears whatever a failed live stream left on the message.
fn reset_patch() -> MessagePatch {
    MessagePatch {
        content: Some(String::new()),
        tool_calls: Some(Vec::new()),
        agent_calls: Some(Vec::new()),
        agent_blocks: Some(Vec::new()),
        ..MessagePatch::default()
    }
}

fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
