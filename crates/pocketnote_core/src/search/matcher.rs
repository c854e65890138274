//! Case-insensitive substring matching over notes.
//!
//! # Invariants
//! - The empty query matches every note; whitespace is matched literally.
//! - Results keep the input order (newest-first for notebook collections).

use crate::model::note::Note;

/// Normalized search input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    needle: Option<String>,
}

impl SearchQuery {
    /// Lowercases `text`; only the empty string becomes the match-all query.
    pub fn new(text: &str) -> Self {
        let needle = if text.is_empty() {
            None
        } else {
            Some(text.to_lowercase())
        };
        Self { needle }
    }

    pub fn is_match_all(&self) -> bool {
        self.needle.is_none()
    }

    pub fn matches(&self, note: &Note) -> bool {
        match self.needle.as_deref() {
            None => true,
            Some(needle) => note_matches(note, needle),
        }
    }
}

/// Returns notes whose title or any block text contains `query`.
pub fn search_notes<'a>(notes: &'a [Note], query: &str) -> Vec<&'a Note> {
    let query = SearchQuery::new(query);
    notes.iter().filter(|note| query.matches(note)).collect()
}

/// Matches an already-lowercased `needle` against one note.
pub fn note_matches(note: &Note, needle: &str) -> bool {
    if contains_folded(&note.title, needle) {
        return true;
    }
    note.blocks()
        .iter()
        .flat_map(|block| block.text_fragments())
        .any(|fragment| contains_folded(fragment, needle))
}

fn contains_folded(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}
