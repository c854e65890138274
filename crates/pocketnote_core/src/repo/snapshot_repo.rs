//! Notebook snapshot gateway over a key-value store.
//!
//! # Responsibility
//! - Encode notes and tasks as JSON arrays under two fixed keys.
//! - Restore a notebook at startup, seeding first-run state.
//!
//! # Invariants
//! - `save` writes both keys in one `put_all` call and is idempotent.
//! - `load` never fails on missing or malformed JSON: notes fall back to
//!   the welcome note, tasks to an empty list.

use crate::model::{Note, Notebook, Task};
use crate::repo::kv_repo::{KeyValueStore, RepoResult};
use log::{info, warn};
use serde::de::DeserializeOwned;
use std::time::Instant;

/// Store key holding the newest-first note array.
pub const NOTES_KEY: &str = "notes";
/// Store key holding the newest-first task array.
pub const TASKS_KEY: &str = "tasks";

/// Loads and saves whole notebook snapshots.
pub struct SnapshotRepository<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> SnapshotRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Restores the last saved notebook.
    ///
    /// # Errors
    /// - Only store read failures; decode problems degrade to defaults.
    pub fn load(&self) -> RepoResult<Notebook> {
        let notes = match self.read_array::<Note>(NOTES_KEY)? {
            Some(notes) => notes,
            None => {
                info!("event=snapshot_seed module=repo status=ok key={NOTES_KEY}");
                vec![Note::welcome()]
            }
        };
        let tasks = self.read_array::<Task>(TASKS_KEY)?.unwrap_or_default();

        info!(
            "event=snapshot_load module=repo status=ok notes={} tasks={}",
            notes.len(),
            tasks.len()
        );
        Ok(Notebook::from_parts(notes, tasks))
    }

    /// Persists both collections.
    pub fn save(&mut self, notebook: &Notebook) -> RepoResult<()> {
        let started_at = Instant::now();
        let notes = serde_json::to_string(notebook.notes())?;
        let tasks = serde_json::to_string(notebook.tasks())?;

        if let Err(err) = self
            .store
            .put_all(&[(NOTES_KEY, notes.as_str()), (TASKS_KEY, tasks.as_str())])
        {
            warn!("event=snapshot_save module=repo status=error error={err}");
            return Err(err);
        }

        info!(
            "event=snapshot_save module=repo status=ok notes={} tasks={} bytes={} duration_ms={}",
            notebook.notes().len(),
            notebook.tasks().len(),
            notes.len() + tasks.len(),
            started_at.elapsed().as_millis()
        );
        Ok(())
    }

    /// Reads one JSON array; `None` when the key is missing or undecodable.
    fn read_array<T: DeserializeOwned>(&self, key: &str) -> RepoResult<Option<Vec<T>>> {
        let Some(raw) = self.store.get(key)? else {
            return Ok(None);
        };
        match serde_json::from_str::<Vec<T>>(&raw) {
            Ok(items) => Ok(Some(items)),
            Err(err) => {
                warn!(
                    "event=snapshot_decode module=repo status=error key={key} error_code=malformed error={err}"
                );
                Ok(None)
            }
        }
    }
}
