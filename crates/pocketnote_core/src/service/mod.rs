//! Application layer over the document model.
//!
//! # Responsibility
//! - Own the notebook state, its persistence gateway and the autosave timer.
//! - Project notes into list cards for front ends.

pub mod autosave;
pub mod card;
pub mod session;

pub use autosave::{Debouncer, DEFAULT_AUTOSAVE_DEBOUNCE};
pub use card::{
    derive_note_preview, format_relative_time, list_note_cards, note_card, NoteCard,
    PREVIEW_MAX_CHARS, UNTITLED_LABEL,
};
pub use session::{NotebookSession, SessionError, SessionOptions, SessionResult};
