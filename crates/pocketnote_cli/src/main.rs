//! `pocketnote` command-line front end.
//!
//! # Responsibility
//! - Map subcommands onto [`NotebookSession`] operations over a SQLite file.
//! - Resolve short id prefixes to full note, block and task ids.
//!
//! # Invariants
//! - Every invocation ends with `shutdown`, so debounced edits are written.

mod render;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use log::info;
use pocketnote_core::{
    default_log_level, init_logging, BlockAnchor, BlockKind, BlockRemoval, NoteId,
    NotebookSession, SessionOptions, SqliteKeyValueStore, TableResize, TaskId,
};
use std::path::PathBuf;
use uuid::Uuid;

type Session = NotebookSession<SqliteKeyValueStore>;

/// Block-based notes and a task list, stored in a local SQLite file.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the notebook database
    #[arg(long, env = "POCKETNOTE_DB", default_value = "pocketnote.sqlite3")]
    db: PathBuf,

    /// Log level (trace|debug|info|warn|error)
    #[arg(long, env = "POCKETNOTE_LOG_LEVEL")]
    log_level: Option<String>,

    /// Directory for rolling log files; logging is off when unset
    #[arg(long, env = "POCKETNOTE_LOG_DIR")]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Manage notes
    #[command(subcommand)]
    Notes(NotesCommand),
    /// Edit the blocks of a note
    #[command(subcommand)]
    Blocks(BlocksCommand),
    /// Manage the task list
    #[command(subcommand)]
    Tasks(TasksCommand),
}

#[derive(Subcommand, Debug)]
enum NotesCommand {
    /// List notes, newest first
    List {
        #[arg(long, short)]
        query: Option<String>,
    },
    /// Create a note
    New {
        #[arg(long)]
        title: Option<String>,
        /// Text of the first block
        #[arg(long)]
        text: Option<String>,
    },
    /// Print a note with its blocks
    Show { note: String },
    /// Rename a note
    Title { note: String, title: String },
    /// Copy a note with fresh ids
    Duplicate { note: String },
    /// Delete a note
    Delete { note: String },
    /// Close a note, discarding it when blank
    Close { note: String },
}

#[derive(Args, Debug)]
struct BlockTarget {
    note: String,
    block: String,
}

#[derive(Subcommand, Debug)]
enum BlocksCommand {
    /// Insert an empty block
    Add {
        note: String,
        #[arg(long)]
        kind: BlockKind,
        /// Block to insert after; appends when omitted
        #[arg(long)]
        after: Option<String>,
        #[arg(long)]
        content: Option<String>,
    },
    /// Insert a follow-on block, as pressing Enter would
    Split(BlockTarget),
    /// Replace a block's text
    Edit {
        #[command(flatten)]
        target: BlockTarget,
        content: String,
    },
    /// Delete a block
    Delete(BlockTarget),
    /// Toggle a checklist item
    Toggle(BlockTarget),
    /// Move a block to a position
    Move {
        #[command(flatten)]
        target: BlockTarget,
        index: usize,
    },
    /// Change a block's type
    Convert {
        #[command(flatten)]
        target: BlockTarget,
        kind: BlockKind,
    },
    /// Add or remove table rows and columns
    Resize {
        #[command(flatten)]
        target: BlockTarget,
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        rows: i32,
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        cols: i32,
    },
    /// Set one table cell
    Cell {
        #[command(flatten)]
        target: BlockTarget,
        row: usize,
        col: usize,
        text: String,
    },
}

#[derive(Subcommand, Debug)]
enum TasksCommand {
    /// List tasks, newest first
    List,
    /// Add a task
    Add { text: String },
    /// Flip a task's completion
    Toggle { task: String },
    /// Delete a task
    Delete { task: String },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    if let Some(log_dir) = &cli.log_dir {
        let log_dir = if log_dir.is_absolute() {
            log_dir.clone()
        } else {
            std::env::current_dir()?.join(log_dir)
        };
        let level = cli.log_level.as_deref().unwrap_or(default_log_level());
        init_logging(level, &log_dir).context("failed to initialize logging")?;
    }

    let store = SqliteKeyValueStore::open(&cli.db)
        .with_context(|| format!("failed to open notebook `{}`", cli.db.display()))?;
    let mut session = NotebookSession::open(store, SessionOptions::default())?;

    match cli.command {
        Command::Notes(command) => run_notes(&mut session, command)?,
        Command::Blocks(command) => run_blocks(&mut session, command)?,
        Command::Tasks(command) => run_tasks(&mut session, command)?,
    }

    session.shutdown()?;
    info!("event=cli_exit module=cli status=ok");
    Ok(())
}

fn run_notes(session: &mut Session, command: NotesCommand) -> Result<()> {
    match command {
        NotesCommand::List { query } => {
            session.set_search_query(query.unwrap_or_default());
            let cards = session.note_cards(pocketnote_core::model::now_epoch_ms());
            render::print_cards(&cards);
        }
        NotesCommand::New { title, text } => {
            let id = session.create_note()?;
            if let Some(title) = title {
                session.set_title(id, title);
            }
            if let Some(text) = text {
                let first = session
                    .active_note()
                    .map(|note| note.blocks()[0].id)
                    .ok_or_else(|| anyhow!("new note is missing"))?;
                session.update_block_content(id, first, text);
            }
            println!("{id}");
        }
        NotesCommand::Show { note } => {
            let id = resolve_note(session, &note)?;
            if let Some(note) = session.notebook().note(id) {
                render::print_note(note);
            }
        }
        NotesCommand::Title { note, title } => {
            let id = resolve_note(session, &note)?;
            session.set_title(id, title);
        }
        NotesCommand::Duplicate { note } => {
            let id = resolve_note(session, &note)?;
            if let Some(copy) = session.duplicate_note(id)? {
                println!("{copy}");
            }
        }
        NotesCommand::Delete { note } => {
            let id = resolve_note(session, &note)?;
            session.delete_note(id)?;
        }
        NotesCommand::Close { note } => {
            let id = resolve_note(session, &note)?;
            if session.close_note(id)? {
                println!("discarded empty note {}", render::short_id(id));
            }
        }
    }
    Ok(())
}

fn run_blocks(session: &mut Session, command: BlocksCommand) -> Result<()> {
    match command {
        BlocksCommand::Add {
            note,
            kind,
            after,
            content,
        } => {
            let note_id = resolve_note(session, &note)?;
            let anchor = match after {
                Some(prefix) => BlockAnchor::AfterBlock(resolve_block(session, note_id, &prefix)?),
                None => BlockAnchor::End,
            };
            let block_id = session
                .insert_block(note_id, anchor, kind)?
                .ok_or_else(|| anyhow!("note {note_id} disappeared"))?;
            if let Some(content) = content {
                if !session.update_block_content(note_id, block_id, content) {
                    bail!("{kind} blocks have no text content");
                }
            }
            println!("{block_id}");
        }
        BlocksCommand::Split(target) => {
            let (note_id, block_id) = resolve_target(session, &target)?;
            if let Some(created) = session.split_block(note_id, block_id)? {
                println!("{created}");
            }
        }
        BlocksCommand::Edit { target, content } => {
            let (note_id, block_id) = resolve_target(session, &target)?;
            if !session.update_block_content(note_id, block_id, content) {
                bail!("block {} has no text content", render::short_id(block_id));
            }
        }
        BlocksCommand::Delete(target) => {
            let (note_id, block_id) = resolve_target(session, &target)?;
            match session.delete_block(note_id, block_id)? {
                BlockRemoval::Removed { focus } => {
                    if let Some(focus) = focus {
                        println!("focus {}", render::short_id(focus));
                    }
                }
                BlockRemoval::LastBlock => bail!("cannot delete the last block of a note"),
                BlockRemoval::NotFound => bail!("block not found"),
            }
        }
        BlocksCommand::Toggle(target) => {
            let (note_id, block_id) = resolve_target(session, &target)?;
            match session.toggle_checklist_item(note_id, block_id)? {
                Some(checked) => println!("{}", if checked { "checked" } else { "unchecked" }),
                None => bail!("block {} is not a checklist item", render::short_id(block_id)),
            }
        }
        BlocksCommand::Move { target, index } => {
            let (note_id, block_id) = resolve_target(session, &target)?;
            session.move_block(note_id, block_id, index)?;
        }
        BlocksCommand::Convert { target, kind } => {
            let (note_id, block_id) = resolve_target(session, &target)?;
            session.convert_block(note_id, block_id, kind)?;
        }
        BlocksCommand::Resize { target, rows, cols } => {
            let (note_id, block_id) = resolve_target(session, &target)?;
            if !session.resize_table(note_id, block_id, TableResize { rows, cols })? {
                bail!("resize ignored: not a table, no change, or below 1x1");
            }
        }
        BlocksCommand::Cell {
            target,
            row,
            col,
            text,
        } => {
            let (note_id, block_id) = resolve_target(session, &target)?;
            if !session.update_table_cell(note_id, block_id, row, col, text) {
                bail!("cell ({row}, {col}) is outside the table");
            }
        }
    }
    Ok(())
}

fn run_tasks(session: &mut Session, command: TasksCommand) -> Result<()> {
    match command {
        TasksCommand::List => render::print_tasks(session.notebook().tasks()),
        TasksCommand::Add { text } => match session.create_task(&text)? {
            Some(id) => println!("{id}"),
            None => bail!("task text is empty"),
        },
        TasksCommand::Toggle { task } => {
            let id = resolve_task(session, &task)?;
            session.toggle_task(id)?;
        }
        TasksCommand::Delete { task } => {
            let id = resolve_task(session, &task)?;
            session.delete_task(id)?;
        }
    }
    Ok(())
}

fn resolve_note(session: &Session, prefix: &str) -> Result<NoteId> {
    resolve_prefix(
        session.notebook().notes().iter().map(|note| note.id),
        prefix,
        "note",
    )
}

fn resolve_task(session: &Session, prefix: &str) -> Result<TaskId> {
    resolve_prefix(
        session.notebook().tasks().iter().map(|task| task.id),
        prefix,
        "task",
    )
}

fn resolve_block(session: &Session, note_id: NoteId, prefix: &str) -> Result<Uuid> {
    let note = session
        .notebook()
        .note(note_id)
        .ok_or_else(|| anyhow!("note {note_id} not found"))?;
    resolve_prefix(note.blocks().iter().map(|block| block.id), prefix, "block")
}

fn resolve_target(session: &Session, target: &BlockTarget) -> Result<(NoteId, Uuid)> {
    let note_id = resolve_note(session, &target.note)?;
    let block_id = resolve_block(session, note_id, &target.block)?;
    Ok((note_id, block_id))
}

/// Finds the single id whose hyphenated form starts with `prefix`.
fn resolve_prefix(ids: impl Iterator<Item = Uuid>, prefix: &str, what: &str) -> Result<Uuid> {
    let needle = prefix.trim().to_ascii_lowercase();
    if needle.is_empty() {
        bail!("{what} id cannot be empty");
    }
    let mut matches = ids.filter(|id| id.to_string().starts_with(&needle));
    let Some(first) = matches.next() else {
        bail!("no {what} matches `{prefix}`");
    };
    if matches.next().is_some() {
        bail!("{what} id `{prefix}` is ambiguous");
    }
    Ok(first)
}
