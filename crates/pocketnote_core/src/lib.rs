//! Core domain logic for PocketNote.
//! This crate owns the document model and every persistence invariant.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod search;
pub mod service;

pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use logging::{default_log_level, init_logging, logging_status, LogSettings, LoggingError};
pub use model::{
    Block, BlockAnchor, BlockBody, BlockId, BlockKind, BlockRemoval, Note, NoteId, Notebook,
    TableBlock, TableResize, Task, TaskId,
};
pub use repo::{
    KeyValueStore, MemoryKeyValueStore, RepoError, RepoResult, SnapshotRepository,
    SqliteKeyValueStore,
};
pub use search::{search_notes, SearchQuery};
pub use service::{
    list_note_cards, Debouncer, NoteCard, NotebookSession, SessionError, SessionOptions,
    SessionResult,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
