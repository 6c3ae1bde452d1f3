mod error;
mod paths;
mod schema;
mod shared;
mod storage;
mod store;

pub use error::StoreError;
pub use paths::{snapshot_file_name, storage_root};
pub use schema::{Message, MessagePatch, NewMessage, Role, Snapshot, Thread};
pub use shared::SharedThreadStore;
pub use storage::{
    decode_snapshot, encode_snapshot, FileStorage, MemoryStorage, SnapshotStorage, STORAGE_KEY,
};
pub use store::{ThreadStore, DEFAULT_GRAPH_ID, DEFAULT_THREAD_TITLE, TITLE_MAX_CHARS};
