//! Editor session over one notebook.
//!
//! # Responsibility
//! - Own the [`Notebook`] and route every front-end event through it.
//! - Decide when state is written: structural edits save at once, content
//!   edits are debounced.
//!
//! # Invariants
//! - A successful write leaves nothing pending; a failed one leaves the
//!   notebook pending.
//! - Pending content edits are written by `tick`, `flush`, `shutdown` or drop.
//! - Edits addressed to unknown ids change nothing and write nothing.

use crate::model::{
    BlockAnchor, BlockId, BlockKind, BlockRemoval, Note, NoteId, Notebook, TableResize, TaskId,
};
use crate::repo::{KeyValueStore, RepoError, SnapshotRepository};
use crate::service::autosave::{Debouncer, DEFAULT_AUTOSAVE_DEBOUNCE};
use crate::service::card::{list_note_cards, NoteCard};
use log::{debug, error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{Duration, Instant};

pub type SessionResult<T> = Result<T, SessionError>;

/// Session-level persistence failure.
#[derive(Debug)]
pub enum SessionError {
    /// Saved state could not be read at startup.
    Load(RepoError),
    /// Current state could not be written.
    Save(RepoError),
}

impl Display for SessionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Load(err) => write!(f, "failed to load notebook: {err}"),
            Self::Save(err) => write!(f, "failed to save notebook: {err}"),
        }
    }
}

impl Error for SessionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Load(err) | Self::Save(err) => Some(err),
        }
    }
}

/// Tunables for [`NotebookSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOptions {
    /// Quiet period after the last content edit before it is written.
    pub autosave_debounce: Duration,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            autosave_debounce: DEFAULT_AUTOSAVE_DEBOUNCE,
        }
    }
}

/// Stateful editor session: notebook, gateway, active note and autosave.
pub struct NotebookSession<S: KeyValueStore> {
    notebook: Notebook,
    repo: SnapshotRepository<S>,
    autosave: Debouncer,
    active_note: Option<NoteId>,
    search_query: String,
}

impl<S: KeyValueStore> NotebookSession<S> {
    /// Loads saved state from `store` and starts a session over it.
    pub fn open(store: S, options: SessionOptions) -> SessionResult<Self> {
        let repo = SnapshotRepository::new(store);
        let notebook = repo.load().map_err(SessionError::Load)?;
        info!(
            "event=session_open module=service status=ok notes={} tasks={}",
            notebook.notes().len(),
            notebook.tasks().len()
        );
        Ok(Self {
            notebook,
            repo,
            autosave: Debouncer::new(options.autosave_debounce),
            active_note: None,
            search_query: String::new(),
        })
    }

    pub fn notebook(&self) -> &Notebook {
        &self.notebook
    }

    pub fn store(&self) -> &S {
        self.repo.store()
    }

    pub fn active_note_id(&self) -> Option<NoteId> {
        self.active_note
    }

    pub fn active_note(&self) -> Option<&Note> {
        self.active_note.and_then(|id| self.notebook.note(id))
    }

    /// Makes `id` the note being edited; `false` when it does not exist.
    pub fn open_note(&mut self, id: NoteId) -> bool {
        if self.notebook.note(id).is_none() {
            return false;
        }
        self.active_note = Some(id);
        true
    }

    pub fn has_pending_changes(&self) -> bool {
        self.autosave.is_pending()
    }

    pub fn autosave_deadline(&self) -> Option<Instant> {
        self.autosave.deadline()
    }

    // Note collection.

    /// Creates an empty note, makes it active and saves.
    pub fn create_note(&mut self) -> SessionResult<NoteId> {
        let id = self.notebook.create_note();
        self.active_note = Some(id);
        self.save_now()?;
        Ok(id)
    }

    /// Leaves the editor for `id`, discarding the note when it is blank.
    ///
    /// Returns `true` when the note was discarded.
    pub fn close_note(&mut self, id: NoteId) -> SessionResult<bool> {
        if self.active_note == Some(id) {
            self.active_note = None;
        }
        let discarded = self.notebook.close_note_editor(id);
        if discarded {
            debug!("event=note_discard module=service status=ok note_id={id}");
        }
        // Closing also writes out any edit still waiting on the debounce.
        if discarded || self.autosave.is_pending() {
            self.save_now()?;
        }
        Ok(discarded)
    }

    pub fn duplicate_note(&mut self, id: NoteId) -> SessionResult<Option<NoteId>> {
        let copy = self.notebook.duplicate_note(id);
        if copy.is_some() {
            self.save_now()?;
        }
        Ok(copy)
    }

    pub fn delete_note(&mut self, id: NoteId) -> SessionResult<bool> {
        if !self.notebook.delete_note(id) {
            return Ok(false);
        }
        if self.active_note == Some(id) {
            self.active_note = None;
        }
        self.save_now()?;
        Ok(true)
    }

    // Structural block edits; saved immediately.

    pub fn insert_block(
        &mut self,
        note_id: NoteId,
        anchor: BlockAnchor,
        kind: BlockKind,
    ) -> SessionResult<Option<BlockId>> {
        self.structural_edit(note_id, |note| Some(note.insert_block(anchor, kind)))
    }

    pub fn split_block(
        &mut self,
        note_id: NoteId,
        block_id: BlockId,
    ) -> SessionResult<Option<BlockId>> {
        self.structural_edit(note_id, |note| note.split_block(block_id))
    }

    /// Deletes a block; the last remaining block is kept.
    pub fn delete_block(
        &mut self,
        note_id: NoteId,
        block_id: BlockId,
    ) -> SessionResult<BlockRemoval> {
        let Some(note) = self.notebook.note_mut(note_id) else {
            return Ok(BlockRemoval::NotFound);
        };
        let removal = note.delete_block(block_id);
        if let BlockRemoval::Removed { .. } = removal {
            note.touch();
            self.save_now()?;
        }
        Ok(removal)
    }

    pub fn move_block(
        &mut self,
        note_id: NoteId,
        block_id: BlockId,
        to_index: usize,
    ) -> SessionResult<bool> {
        self.structural_flag(note_id, |note| note.move_block(block_id, to_index))
    }

    pub fn convert_block(
        &mut self,
        note_id: NoteId,
        block_id: BlockId,
        kind: BlockKind,
    ) -> SessionResult<bool> {
        self.structural_flag(note_id, |note| note.convert_block(block_id, kind))
    }

    pub fn toggle_checklist_item(
        &mut self,
        note_id: NoteId,
        block_id: BlockId,
    ) -> SessionResult<Option<bool>> {
        self.structural_edit(note_id, |note| note.toggle_checklist_item(block_id))
    }

    pub fn resize_table(
        &mut self,
        note_id: NoteId,
        block_id: BlockId,
        delta: TableResize,
    ) -> SessionResult<bool> {
        self.structural_flag(note_id, |note| note.resize_table(block_id, delta))
    }

    // Content edits; debounced.

    pub fn set_title(&mut self, note_id: NoteId, title: impl Into<String>) -> bool {
        let title = title.into();
        self.content_edit(note_id, |note| {
            note.title = title;
            true
        })
    }

    pub fn update_block_content(
        &mut self,
        note_id: NoteId,
        block_id: BlockId,
        content: impl Into<String>,
    ) -> bool {
        self.content_edit(note_id, |note| note.update_block_content(block_id, content))
    }

    pub fn update_table_cell(
        &mut self,
        note_id: NoteId,
        block_id: BlockId,
        row: usize,
        col: usize,
        text: impl Into<String>,
    ) -> bool {
        self.content_edit(note_id, |note| {
            note.update_table_cell(block_id, row, col, text)
        })
    }

    // Tasks.

    pub fn create_task(&mut self, text: &str) -> SessionResult<Option<TaskId>> {
        let id = self.notebook.create_task(text);
        if id.is_some() {
            self.save_now()?;
        }
        Ok(id)
    }

    pub fn toggle_task(&mut self, id: TaskId) -> SessionResult<Option<bool>> {
        let completed = self.notebook.toggle_task(id);
        if completed.is_some() {
            self.save_now()?;
        }
        Ok(completed)
    }

    pub fn delete_task(&mut self, id: TaskId) -> SessionResult<bool> {
        let removed = self.notebook.delete_task(id);
        if removed {
            self.save_now()?;
        }
        Ok(removed)
    }

    // Search and list projection.

    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    pub fn set_search_query(&mut self, query: impl Into<String>) {
        self.search_query = query.into();
    }

    /// Notes matching the current search query, newest-first.
    pub fn visible_notes(&self) -> Vec<&Note> {
        self.notebook.search(&self.search_query)
    }

    pub fn note_cards(&self, now_ms: i64) -> Vec<NoteCard> {
        list_note_cards(&self.notebook, &self.search_query, now_ms)
    }

    // Persistence.

    /// Writes pending content edits once the debounce window has elapsed.
    ///
    /// Returns `true` when a save happened.
    pub fn tick(&mut self, now: Instant) -> SessionResult<bool> {
        if !self.autosave.is_due(now) {
            return Ok(false);
        }
        debug!("event=autosave_fire module=service status=ok");
        self.write_snapshot(now)?;
        Ok(true)
    }

    /// Writes pending content edits immediately.
    pub fn flush(&mut self) -> SessionResult<()> {
        if self.autosave.is_pending() {
            self.save_now()?;
        }
        Ok(())
    }

    /// Saves unconditionally and ends the session.
    pub fn shutdown(mut self) -> SessionResult<()> {
        self.save_now()?;
        info!("event=session_close module=service status=ok");
        Ok(())
    }

    fn save_now(&mut self) -> SessionResult<()> {
        self.write_snapshot(Instant::now())
    }

    /// Writes the notebook; on failure the unsaved state stays pending for
    /// the next `tick`, `flush`, `shutdown` or drop.
    fn write_snapshot(&mut self, now: Instant) -> SessionResult<()> {
        match self.repo.save(&self.notebook) {
            Ok(()) => {
                self.autosave.cancel();
                Ok(())
            }
            Err(err) => {
                self.autosave.schedule(now);
                Err(SessionError::Save(err))
            }
        }
    }

    fn structural_edit<T>(
        &mut self,
        note_id: NoteId,
        edit: impl FnOnce(&mut Note) -> Option<T>,
    ) -> SessionResult<Option<T>> {
        let Some(note) = self.notebook.note_mut(note_id) else {
            return Ok(None);
        };
        let Some(outcome) = edit(note) else {
            return Ok(None);
        };
        note.touch();
        self.save_now()?;
        Ok(Some(outcome))
    }

    fn structural_flag(
        &mut self,
        note_id: NoteId,
        edit: impl FnOnce(&mut Note) -> bool,
    ) -> SessionResult<bool> {
        self.structural_edit(note_id, |note| edit(note).then_some(()))
            .map(|outcome| outcome.is_some())
    }

    fn content_edit(&mut self, note_id: NoteId, edit: impl FnOnce(&mut Note) -> bool) -> bool {
        let Some(note) = self.notebook.note_mut(note_id) else {
            return false;
        };
        if !edit(note) {
            return false;
        }
        note.touch();
        self.autosave.schedule(Instant::now());
        true
    }
}

impl<S: KeyValueStore> Drop for NotebookSession<S> {
    fn drop(&mut self) {
        if !self.autosave.is_pending() {
            return;
        }
        if let Err(err) = self.save_now() {
            error!("event=session_drop_flush module=service status=error error={err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{NotebookSession, SessionError, SessionOptions};
    use crate::model::{BlockAnchor, BlockKind, BlockRemoval};
    use crate::repo::{KeyValueStore, MemoryKeyValueStore, NOTES_KEY};
    use std::time::{Duration, Instant};

    fn session() -> NotebookSession<MemoryKeyValueStore> {
        NotebookSession::open(MemoryKeyValueStore::new(), SessionOptions::default()).unwrap()
    }

    #[test]
    fn empty_store_opens_with_welcome_note() {
        let session = session();
        assert_eq!(session.notebook().notes().len(), 1);
        assert!(session.active_note().is_none());
        assert!(session.store().is_empty());
    }

    #[test]
    fn create_note_saves_and_activates() {
        let mut session = session();
        let id = session.create_note().unwrap();
        assert_eq!(session.active_note_id(), Some(id));
        let saved = session.store().get(NOTES_KEY).unwrap().unwrap();
        assert!(saved.contains(&id.to_string()));
    }

    #[test]
    fn content_edit_waits_for_debounce() {
        let mut session = session();
        let id = session.create_note().unwrap();
        assert!(session.set_title(id, "Draft"));
        assert!(session.has_pending_changes());

        let saved = session.store().get(NOTES_KEY).unwrap().unwrap();
        assert!(!saved.contains("Draft"));

        assert!(!session.tick(Instant::now()).unwrap());
        assert!(session
            .tick(Instant::now() + Duration::from_millis(500))
            .unwrap());
        let saved = session.store().get(NOTES_KEY).unwrap().unwrap();
        assert!(saved.contains("Draft"));
        assert!(!session.has_pending_changes());
    }

    #[test]
    fn structural_edit_flushes_pending_content() {
        let mut session = session();
        let id = session.create_note().unwrap();
        let first = session.notebook().note(id).unwrap().blocks()[0].id;
        assert!(session.update_block_content(id, first, "hello"));

        session
            .insert_block(id, BlockAnchor::AfterBlock(first), BlockKind::Checklist)
            .unwrap()
            .unwrap();
        assert!(!session.has_pending_changes());
        let saved = session.store().get(NOTES_KEY).unwrap().unwrap();
        assert!(saved.contains("hello"));
    }

    #[test]
    fn unknown_note_edits_change_nothing() {
        let mut session = session();
        let ghost = uuid::Uuid::new_v4();
        assert!(!session.set_title(ghost, "x"));
        assert_eq!(
            session
                .insert_block(ghost, BlockAnchor::End, BlockKind::Text)
                .unwrap(),
            None
        );
        assert!(session.store().is_empty());
    }

    #[test]
    fn delete_block_reports_last_block_and_not_found() {
        let mut session = session();
        let id = session.create_note().unwrap();
        let only = session.notebook().note(id).unwrap().blocks()[0].id;
        assert_eq!(
            session.delete_block(id, only).unwrap(),
            BlockRemoval::LastBlock
        );
        assert_eq!(
            session.delete_block(id, uuid::Uuid::new_v4()).unwrap(),
            BlockRemoval::NotFound
        );
    }

    #[test]
    fn close_discards_blank_note_and_clears_active() {
        let mut session = session();
        let id = session.create_note().unwrap();
        assert!(session.close_note(id).unwrap());
        assert!(session.notebook().note(id).is_none());
        assert_eq!(session.active_note_id(), None);
    }

    #[test]
    fn save_failure_surfaces_as_session_error() {
        let mut session =
            NotebookSession::open(MemoryKeyValueStore::with_quota(8), SessionOptions::default())
                .unwrap();
        let err = session.create_note().unwrap_err();
        assert!(matches!(err, SessionError::Save(_)));
    }
}
