use std::sync::{Arc, Mutex, MutexGuard};

use crate::schema::{Message, MessagePatch, NewMessage, Thread};
use crate::store::ThreadStore;

/// Cloneable handle serializing access to one [`ThreadStore`].
///
/// Each call takes the lock for the duration of a single operation, so
/// concurrent streams updating the same message resolve last-writer-wins.
#[derive(Debug, Clone)]
pub struct SharedThreadStore {
    inner: Arc<Mutex<ThreadStore>>,
}

impl SharedThreadStore {
    #[must_use]
    pub fn new(store: ThreadStore) -> Self {
        Self {
            inner: Arc::new(Mutex::new(store)),
        }
    }

    /// Runs `f` with exclusive access to the store.
    pub fn with<R>(&self, f: impl FnOnce(&mut ThreadStore) -> R) -> R {
        let mut guard = lock_unpoisoned(&self.inner);
        f(&mut guard)
    }

    pub fn create_thread(&self, title: Option<&str>) -> String {
        self.with(|store| store.create_thread(title))
    }

    pub fn add_message(&self, thread_id: &str, message: NewMessage) -> Option<Message> {
        self.with(|store| store.add_message(thread_id, message))
    }

    pub fn update_message(&self, thread_id: &str, message_id: &str, patch: MessagePatch) -> bool {
        if patch.is_empty() {
            return self.with(|store| store.message(thread_id, message_id).is_some());
        }
        self.with(|store| store.update_message(thread_id, message_id, patch))
    }

    #[must_use]
    pub fn thread(&self, thread_id: &str) -> Option<Thread> {
        self.with(|store| store.thread(thread_id).cloned())
    }

    #[must_use]
    pub fn message(&self, thread_id: &str, message_id: &str) -> Option<Message> {
        self.with(|store| store.message(thread_id, message_id).cloned())
    }

    /// Applies a streamed patch without writing the snapshot.
    pub fn stream_update(&self, thread_id: &str, message_id: &str, patch: MessagePatch) -> bool {
        if patch.is_empty() {
            return self.with(|store| store.message(thread_id, message_id).is_some());
        }
        self.with(|store| store.update_message_deferred(thread_id, message_id, patch))
    }

    pub fn begin_stream(&self) {
        self.with(ThreadStore::begin_stream);
    }

    pub fn end_stream(&self) {
        self.with(ThreadStore::end_stream);
    }
}

fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
