//! Task domain model.
//!
//! Tasks are independent of notes and live in one flat, newest-first list.

use crate::model::now_epoch_ms;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier of a task.
pub type TaskId = Uuid;

/// A to-do item with a completion flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub text: String,
    #[serde(default)]
    pub completed: bool,
    /// Unix epoch milliseconds.
    pub created_at: i64,
}

impl Task {
    /// Creates an open task from user input.
    ///
    /// Surrounding whitespace is trimmed; returns `None` when nothing remains.
    pub fn new(text: &str) -> Option<Self> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(Self {
            id: Uuid::new_v4(),
            text: trimmed.to_string(),
            completed: false,
            created_at: now_epoch_ms(),
        })
    }

    /// Flips `completed` and returns the new value.
    pub fn toggle(&mut self) -> bool {
        self.completed = !self.completed;
        self.completed
    }
}

#[cfg(test)]
mod tests {
    use super::Task;

    #[test]
    fn new_trims_and_rejects_blank_input() {
        let task = Task::new("  water plants \n").expect("non-blank input");
        assert_eq!(task.text, "water plants");
        assert!(!task.completed);
        assert!(Task::new(" \t ").is_none());
    }

    #[test]
    fn serializes_camel_case_timestamp() {
        let task = Task::new("x").unwrap();
        let value = serde_json::to_value(&task).unwrap();
        assert!(value.get("createdAt").is_some());
        assert_eq!(value["completed"], false);
    }
}
