use chat_types::{generate_id, now_ms};
use tracing::{debug, warn};

use crate::error::StoreError;
use crate::schema::{Message, MessagePatch, NewMessage, Role, Snapshot, Thread};
use crate::storage::{decode_snapshot, encode_snapshot, MemoryStorage, SnapshotStorage, STORAGE_KEY};

pub const DEFAULT_THREAD_TITLE: &str = "New Chat";
pub const DEFAULT_GRAPH_ID: &str = "langgraph-app";
pub const TITLE_MAX_CHARS: usize = 50;

/// Conversation threads plus the current selection.
///
/// Every operation is total: unknown thread or message ids leave the store
/// unchanged. Mutations write a snapshot through the configured storage;
/// write failures are logged and otherwise ignored. Streamed patches are
/// the exception: they stay in memory until the stream ends or the next
/// persisting mutation.
#[derive(Debug)]
pub struct ThreadStore {
    threads: Vec<Thread>,
    current_thread_id: Option<String>,
    is_loading: bool,
    active_streams: usize,
    unsaved: bool,
    graph_id: String,
    storage: Box<dyn SnapshotStorage>,
}

impl ThreadStore {
    /// Restores the snapshot held by `storage`, starting empty when there is
    /// none or it cannot be read.
    pub fn open(storage: impl SnapshotStorage + 'static) -> Self {
        let snapshot = match load_snapshot(&storage) {
            Ok(snapshot) => snapshot.unwrap_or_default(),
            Err(error) => {
                warn!(%error, "discarding unreadable chat snapshot");
                Snapshot::default()
            }
        };

        Self::from_snapshot(snapshot, Box::new(storage))
    }

    #[must_use]
    pub fn in_memory() -> Self {
        Self::open(MemoryStorage::new())
    }

    fn from_snapshot(snapshot: Snapshot, storage: Box<dyn SnapshotStorage>) -> Self {
        let current_thread_id = snapshot
            .current_thread_id
            .filter(|id| snapshot.threads.iter().any(|thread| &thread.id == id));

        Self {
            threads: snapshot.threads,
            current_thread_id,
            is_loading: false,
            active_streams: 0,
            unsaved: false,
            graph_id: DEFAULT_GRAPH_ID.to_string(),
            storage,
        }
    }

    #[must_use]
    pub fn threads(&self) -> &[Thread] {
        &self.threads
    }

    #[must_use]
    pub fn thread(&self, thread_id: &str) -> Option<&Thread> {
        self.threads.iter().find(|thread| thread.id == thread_id)
    }

    #[must_use]
    pub fn current_thread_id(&self) -> Option<&str> {
        self.current_thread_id.as_deref()
    }

    #[must_use]
    pub fn current_thread(&self) -> Option<&Thread> {
        self.current_thread_id
            .as_deref()
            .and_then(|id| self.thread(id))
    }

    #[must_use]
    pub fn message(&self, thread_id: &str, message_id: &str) -> Option<&Message> {
        self.thread(thread_id)?
            .messages
            .iter()
            .find(|message| message.id == message_id)
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.is_loading = loading;
    }

    /// Registers a reply stream; the store reports loading while any runs.
    pub fn begin_stream(&mut self) {
        self.active_streams += 1;
        self.is_loading = true;
    }

    /// Ends one reply stream and writes any patches it left unsaved.
    pub fn end_stream(&mut self) {
        self.active_streams = self.active_streams.saturating_sub(1);
        self.is_loading = self.active_streams > 0;
        self.flush();
    }

    #[must_use]
    pub fn active_streams(&self) -> usize {
        self.active_streams
    }

    #[must_use]
    pub fn graph_id(&self) -> &str {
        &self.graph_id
    }

    pub fn set_graph_id(&mut self, graph_id: impl Into<String>) {
        self.graph_id = graph_id.into();
    }

    /// Creates a thread at the front of the list and makes it current.
    pub fn create_thread(&mut self, title: Option<&str>) -> String {
        let now = now_ms();
        let thread = Thread {
            id: generate_id("thread"),
            title: title.unwrap_or(DEFAULT_THREAD_TITLE).to_string(),
            messages: Vec::new(),
            created_at: now,
            updated_at: now,
            backend_thread_id: None,
        };
        let id = thread.id.clone();

        self.threads.insert(0, thread);
        self.current_thread_id = Some(id.clone());
        debug!(thread_id = %id, "created thread");
        self.persist();
        id
    }

    pub fn delete_thread(&mut self, thread_id: &str) {
        let before = self.threads.len();
        self.threads.retain(|thread| thread.id != thread_id);
        if self.threads.len() == before {
            return;
        }

        if self.current_thread_id.as_deref() == Some(thread_id) {
            self.current_thread_id = self.threads.first().map(|thread| thread.id.clone());
        }
        debug!(thread_id, "deleted thread");
        self.persist();
    }

    pub fn select_thread(&mut self, thread_id: &str) {
        if self.thread(thread_id).is_none() {
            return;
        }
        self.current_thread_id = Some(thread_id.to_string());
        self.persist();
    }

    /// Appends a message, assigning its id and timestamp.
    ///
    /// The first user message of an untitled thread also names the thread.
    pub fn add_message(&mut self, thread_id: &str, message: NewMessage) -> Option<Message> {
        let thread = self.thread_mut(thread_id)?;
        let now = now_ms();

        if thread.messages.is_empty()
            && message.role == Role::User
            && thread.title == DEFAULT_THREAD_TITLE
        {
            thread.title = derive_title(&message.content);
        }

        let message = message.into_message(generate_id("msg"), now);
        thread.messages.push(message.clone());
        thread.updated_at = now;

        self.persist();
        Some(message)
    }

    /// Shallow-merges `patch` into the message. Returns whether it was found.
    pub fn update_message(&mut self, thread_id: &str, message_id: &str, patch: MessagePatch) -> bool {
        let found = self.patch_message(thread_id, message_id, patch);
        if found {
            self.persist();
        }
        found
    }

    /// Like [`Self::update_message`] but leaves the write to [`Self::flush`].
    /// Used for per-event stream patches.
    pub fn update_message_deferred(
        &mut self,
        thread_id: &str,
        message_id: &str,
        patch: MessagePatch,
    ) -> bool {
        let found = self.patch_message(thread_id, message_id, patch);
        self.unsaved |= found;
        found
    }

    /// Writes the snapshot when deferred updates are pending.
    pub fn flush(&mut self) {
        if self.unsaved {
            self.persist();
        }
    }

    fn patch_message(&mut self, thread_id: &str, message_id: &str, patch: MessagePatch) -> bool {
        let Some(thread) = self.thread_mut(thread_id) else {
            return false;
        };
        let Some(message) = thread
            .messages
            .iter_mut()
            .find(|message| message.id == message_id)
        else {
            return false;
        };

        patch.apply_to(message);
        thread.updated_at = now_ms();
        true
    }

    pub fn set_backend_thread_id(&mut self, thread_id: &str, backend_thread_id: &str) {
        let Some(thread) = self.thread_mut(thread_id) else {
            return;
        };
        thread.backend_thread_id = Some(backend_thread_id.to_string());
        self.persist();
    }

    pub fn clear_all_threads(&mut self) {
        self.threads.clear();
        self.current_thread_id = None;
        self.persist();
    }

    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            threads: self.threads.clone(),
            current_thread_id: self.current_thread_id.clone(),
        }
    }

    /// Writes the snapshot, reporting failures to the caller.
    pub fn save(&self) -> Result<(), StoreError> {
        let contents = encode_snapshot(&self.snapshot())?;
        self.storage.save(STORAGE_KEY, &contents)
    }

    fn persist(&mut self) {
        self.unsaved = false;
        if let Err(error) = self.save() {
            warn!(%error, "failed to persist chat snapshot");
        }
    }

    fn thread_mut(&mut self, thread_id: &str) -> Option<&mut Thread> {
        self.threads.iter_mut().find(|thread| thread.id == thread_id)
    }
}

fn load_snapshot(storage: &dyn SnapshotStorage) -> Result<Option<Snapshot>, StoreError> {
    storage
        .load(STORAGE_KEY)?
        .map(|contents| decode_snapshot(STORAGE_KEY, &contents))
        .transpose()
}

fn derive_title(content: &str) -> String {
    let mut chars = content.chars();
    let head: String = chars.by_ref().take(TITLE_MAX_CHARS).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derive_title_truncates_on_char_boundaries() {
        assert_eq!(derive_title("short"), "short");
        assert_eq!(derive_title(&"a".repeat(50)), "a".repeat(50));
        assert_eq!(derive_title(&"a".repeat(51)), format!("{}...", "a".repeat(50)));

        let long = "你".repeat(60);
        assert_eq!(derive_title(&long), format!("{}...", "你".repeat(50)));
    }

    #[test]
    fn current_selection_pointing_at_missing_thread_is_dropped_on_open() {
        let storage = MemoryStorage::new();
        storage.insert(
            STORAGE_KEY,
            r#"{"threads":[{"id":"thread_a"}],"currentThreadId":"thread_gone"}"#,
        );

        let store = ThreadStore::open(storage);

        assert_eq!(store.threads().len(), 1);
        assert_eq!(store.current_thread_id(), None);
    }

    #[test]
    fn transient_flags_start_at_defaults() {
        let mut store = ThreadStore::in_memory();
        assert!(!store.is_loading());
        assert_eq!(store.graph_id(), DEFAULT_GRAPH_ID);

        store.set_loading(true);
        store.set_graph_id("other-graph");
        assert!(store.is_loading());
        assert_eq!(store.graph_id(), "other-graph");
    }

    #[test]
    fn loading_stays_set_until_the_last_stream_ends() {
        let mut store = ThreadStore::in_memory();
        store.begin_stream();
        store.begin_stream();

        store.end_stream();
        assert!(store.is_loading());
        assert_eq!(store.active_streams(), 1);

        store.end_stream();
        assert!(!store.is_loading());
        store.end_stream();
        assert_eq!(store.active_streams(), 0);
    }

    #[test]
    fn deferred_updates_are_written_when_the_stream_ends() {
        let storage = MemoryStorage::new();
        let mut store = ThreadStore::open(storage.clone());
        let thread_id = store.create_thread(None);
        let message_id = store
            .add_message(&thread_id, NewMessage::assistant(""))
            .expect("message")
            .id;
        store.begin_stream();

        assert!(store.update_message_deferred(&thread_id, &message_id, MessagePatch::content("partial")));
        assert!(!store.update_message_deferred(&thread_id, "msg_missing", MessagePatch::content("x")));
        let saved = storage.get(STORAGE_KEY).expect("snapshot");
        assert!(!saved.contains("partial"));
        assert_eq!(store.message(&thread_id, &message_id).map(|m| m.content.as_str()), Some("partial"));

        store.end_stream();
        assert!(storage.get(STORAGE_KEY).expect("snapshot").contains("partial"));
    }
}
