//! Persistence boundary: key-value stores and the snapshot gateway.
//!
//! # Responsibility
//! - Define the key-value contract the core persists through.
//! - Serialize notebooks to the two-key layout and restore them at startup.
//!
//! # Invariants
//! - Missing or malformed persisted data is treated as absence, never as an
//!   error.
//! - Store failures are propagated unchanged and never retried.

pub mod kv_repo;
pub mod snapshot_repo;

pub use kv_repo::{
    KeyValueStore, MemoryKeyValueStore, RepoError, RepoResult, SqliteKeyValueStore,
};
pub use snapshot_repo::{SnapshotRepository, NOTES_KEY, TASKS_KEY};
