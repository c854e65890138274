//! Document model for notes, blocks and tasks.
//!
//! # Responsibility
//! - Define the entities persisted by the snapshot gateway.
//! - Provide pure, I/O-free edit operations over them.
//!
//! # Invariants
//! - Every note reachable through [`Notebook`] holds at least one block.
//! - Mutations go through `Notebook`/`Note` methods only; callers never hold
//!   a second copy of the collections.

pub mod block;
pub mod note;
pub mod notebook;
pub mod task;

pub use block::{Block, BlockBody, BlockId, BlockKind, TableBlock, TableResize};
pub use note::{BlockAnchor, BlockRemoval, Note, NoteId};
pub use notebook::Notebook;
pub use task::{Task, TaskId};

/// Current wall-clock time as Unix epoch milliseconds.
pub fn now_epoch_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
