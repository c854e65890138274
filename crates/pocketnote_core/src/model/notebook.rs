//! In-memory notebook state.
//!
//! # Responsibility
//! - Own the note and task collections for one session.
//! - Apply collection-level operations (create, duplicate, close, delete).
//!
//! # Invariants
//! - Both collections are ordered newest-first; new entries are prepended.
//! - Operations on unknown ids are no-ops reported via return values.

use crate::model::note::{Note, NoteId};
use crate::model::task::{Task, TaskId};
use crate::search::search_notes;

/// Explicit state object holding every note and task.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Notebook {
    notes: Vec<Note>,
    tasks: Vec<Task>,
}

impl Notebook {
    /// Creates an empty notebook.
    pub fn new() -> Self {
        Self::default()
    }

    /// Notebook used on first launch: one welcome note, no tasks.
    pub fn seeded() -> Self {
        Self::from_parts(vec![Note::welcome()], Vec::new())
    }

    /// Builds a notebook from persisted collections.
    ///
    /// Notes are repaired with [`Note::ensure_editable`].
    pub fn from_parts(mut notes: Vec<Note>, tasks: Vec<Task>) -> Self {
        for note in &mut notes {
            note.ensure_editable();
        }
        Self { notes, tasks }
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn note(&self, id: NoteId) -> Option<&Note> {
        self.notes.iter().find(|note| note.id == id)
    }

    pub fn note_mut(&mut self, id: NoteId) -> Option<&mut Note> {
        self.notes.iter_mut().find(|note| note.id == id)
    }

    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    /// Prepends a new untitled note and returns its id.
    pub fn create_note(&mut self) -> NoteId {
        let note = Note::new();
        let id = note.id;
        self.notes.insert(0, note);
        id
    }

    /// Prepends a deep copy of `id` and returns the copy's id.
    pub fn duplicate_note(&mut self, id: NoteId) -> Option<NoteId> {
        let copy = self.note(id)?.duplicate();
        let copy_id = copy.id;
        self.notes.insert(0, copy);
        Some(copy_id)
    }

    /// Removes a note; returns whether anything was removed.
    pub fn delete_note(&mut self, id: NoteId) -> bool {
        let before = self.notes.len();
        self.notes.retain(|note| note.id != id);
        self.notes.len() != before
    }

    /// Discards `id` when it is blank (no title, no block text).
    ///
    /// Returns `true` when the note was discarded.
    pub fn close_note_editor(&mut self, id: NoteId) -> bool {
        match self.note(id) {
            Some(note) if note.is_blank() => self.delete_note(id),
            _ => false,
        }
    }

    /// Notes matching `query`, newest-first; all notes for an empty query.
    pub fn search(&self, query: &str) -> Vec<&Note> {
        search_notes(&self.notes, query)
    }

    /// Prepends a task built from `text`; no-op for blank input.
    pub fn create_task(&mut self, text: &str) -> Option<TaskId> {
        let task = Task::new(text)?;
        let id = task.id;
        self.tasks.insert(0, task);
        Some(id)
    }

    /// Flips completion of `id`; returns the new state.
    pub fn toggle_task(&mut self, id: TaskId) -> Option<bool> {
        self.tasks
            .iter_mut()
            .find(|task| task.id == id)
            .map(Task::toggle)
    }

    /// Removes a task; returns whether anything was removed.
    pub fn delete_task(&mut self, id: TaskId) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|task| task.id != id);
        self.tasks.len() != before
    }
}

#[cfg(test)]
mod tests {
    use super::Notebook;
    use crate::model::block::BlockKind;
    use uuid::Uuid;

    #[test]
    fn create_note_prepends() {
        let mut notebook = Notebook::new();
        let first = notebook.create_note();
        let second = notebook.create_note();
        let ids: Vec<_> = notebook.notes().iter().map(|note| note.id).collect();
        assert_eq!(ids, vec![second, first]);
    }

    #[test]
    fn seeded_notebook_has_welcome_note() {
        let notebook = Notebook::seeded();
        assert_eq!(notebook.notes().len(), 1);
        let welcome = &notebook.notes()[0];
        assert!(!welcome.title.is_empty());
        assert!(welcome
            .blocks()
            .iter()
            .any(|block| block.kind() == BlockKind::Checklist));
        assert!(notebook.tasks().is_empty());
    }

    #[test]
    fn close_keeps_titled_note() {
        let mut notebook = Notebook::new();
        let id = notebook.create_note();
        notebook.note_mut(id).unwrap().title = "Groceries".to_string();
        assert!(!notebook.close_note_editor(id));
        assert!(notebook.note(id).is_some());
    }

    #[test]
    fn task_ops_ignore_unknown_ids() {
        let mut notebook = Notebook::new();
        assert!(notebook.create_task("   ").is_none());
        let id = notebook.create_task(" call mom ").unwrap();
        assert_eq!(notebook.task(id).unwrap().text, "call mom");

        assert_eq!(notebook.toggle_task(Uuid::new_v4()), None);
        assert!(!notebook.delete_task(Uuid::new_v4()));
        assert_eq!(notebook.toggle_task(id), Some(true));
        assert!(notebook.delete_task(id));
        assert!(notebook.tasks().is_empty());
    }
}
