//! Note search entry points.
//!
//! # Responsibility
//! - Filter notes by case-insensitive substring over title and block text.
//! - Keep result ordering identical to the source collection.

pub mod matcher;

pub use matcher::{note_matches, search_notes, SearchQuery};
