//! Note list projections.
//!
//! # Responsibility
//! - Derive the card shown for each note in the list view: display title,
//!   plain-text preview and a relative "updated" label.
//!
//! # Invariants
//! - `preview` holds at most [`PREVIEW_MAX_CHARS`] characters with
//!   whitespace collapsed.
//! - Cards keep the notebook's newest-first order.

use crate::model::{Note, NoteId, Notebook};
use chrono::{Local, TimeZone};
use once_cell::sync::Lazy;
use regex::Regex;

/// Maximum preview length in characters.
pub const PREVIEW_MAX_CHARS: usize = 100;
/// Title shown for notes without one.
pub const UNTITLED_LABEL: &str = "Untitled";

const MINUTE_MS: i64 = 60_000;
const HOUR_MS: i64 = 60 * MINUTE_MS;
const DAY_MS: i64 = 24 * HOUR_MS;

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

/// List-view projection of one note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteCard {
    pub note_id: NoteId,
    pub title: String,
    /// Plain-text summary; `None` when the note has no block text.
    pub preview: Option<String>,
    pub updated_label: String,
}

/// Builds the card for `note` relative to `now_ms`.
pub fn note_card(note: &Note, now_ms: i64) -> NoteCard {
    let title = if note.title.is_empty() {
        UNTITLED_LABEL.to_string()
    } else {
        note.title.clone()
    };
    NoteCard {
        note_id: note.id,
        title,
        preview: derive_note_preview(note),
        updated_label: format_relative_time(note.updated_at, now_ms),
    }
}

/// Cards for the notes matching `query`, newest-first.
pub fn list_note_cards(notebook: &Notebook, query: &str, now_ms: i64) -> Vec<NoteCard> {
    notebook
        .search(query)
        .into_iter()
        .map(|note| note_card(note, now_ms))
        .collect()
}

/// Joins block text in reading order and keeps the first 100 characters.
pub fn derive_note_preview(note: &Note) -> Option<String> {
    let joined = note
        .blocks()
        .iter()
        .flat_map(|block| block.text_fragments())
        .collect::<Vec<_>>()
        .join(" ");
    let normalized = WHITESPACE_RE.replace_all(&joined, " ");
    let trimmed = normalized.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.chars().take(PREVIEW_MAX_CHARS).collect())
    }
}

/// Formats `then_ms` as "Just now", "5m ago", "3h ago", "2d ago" or a local
/// `YYYY-MM-DD` date once a week has passed.
pub fn format_relative_time(then_ms: i64, now_ms: i64) -> String {
    let elapsed = now_ms.saturating_sub(then_ms);
    if elapsed < MINUTE_MS {
        return "Just now".to_string();
    }
    if elapsed < HOUR_MS {
        return format!("{}m ago", elapsed / MINUTE_MS);
    }
    if elapsed < DAY_MS {
        return format!("{}h ago", elapsed / HOUR_MS);
    }
    if elapsed < 7 * DAY_MS {
        return format!("{}d ago", elapsed / DAY_MS);
    }
    match Local.timestamp_millis_opt(then_ms).single() {
        Some(date) => date.format("%Y-%m-%d").to_string(),
        None => "Unknown date".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::{derive_note_preview, format_relative_time, note_card, DAY_MS, HOUR_MS, MINUTE_MS};
    use crate::model::{Block, BlockKind, Note};

    #[test]
    fn relative_labels_follow_thresholds() {
        let now = 1_700_000_000_000;
        assert_eq!(format_relative_time(now - 30_000, now), "Just now");
        assert_eq!(format_relative_time(now + 5_000, now), "Just now");
        assert_eq!(format_relative_time(now - 5 * MINUTE_MS, now), "5m ago");
        assert_eq!(format_relative_time(now - 3 * HOUR_MS - 1, now), "3h ago");
        assert_eq!(format_relative_time(now - 6 * DAY_MS, now), "6d ago");
    }

    #[test]
    fn older_than_a_week_shows_date() {
        let now = 1_700_000_000_000;
        let label = format_relative_time(now - 30 * DAY_MS, now);
        let parts: Vec<_> = label.split('-').collect();
        assert_eq!(parts.len(), 3, "unexpected label {label}");
        assert_eq!(parts[0].len(), 4);
    }

    #[test]
    fn preview_collapses_whitespace_and_truncates() {
        let long = "word ".repeat(60);
        let note = Note::with_blocks(
            "",
            vec![
                Block::with_content(BlockKind::Heading1, "Plan\n\n"),
                Block::new(BlockKind::Divider),
                Block::with_content(BlockKind::Text, long),
            ],
        );
        let preview = derive_note_preview(&note).unwrap();
        assert!(preview.starts_with("Plan word"));
        assert_eq!(preview.chars().count(), 100);
    }

    #[test]
    fn card_uses_untitled_fallback() {
        let note = Note::new();
        let card = note_card(&note, note.updated_at);
        assert_eq!(card.title, "Untitled");
        assert_eq!(card.preview, None);
        assert_eq!(card.updated_label, "Just now");
    }
}
