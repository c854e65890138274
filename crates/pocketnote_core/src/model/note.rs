//! Note domain model and block edit operations.
//!
//! # Responsibility
//! - Hold the ordered block sequence of one note.
//! - Provide the only mutation entry points for that sequence.
//!
//! # Invariants
//! - `blocks` is never empty: every operation here keeps at least one block
//!   so the editor always has a focus target.
//! - Block ids are unique within the note.
//! - `id` never changes after creation.

use crate::model::block::{Block, BlockId, BlockKind, TableResize};
use crate::model::now_epoch_ms;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

/// Stable identifier of a note within the notebook.
pub type NoteId = Uuid;

/// Where a new block goes relative to the existing sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockAnchor {
    /// Right after the block with this id; appended when the id is unknown.
    AfterBlock(BlockId),
    /// Right after the block at this index; appended when out of range.
    AfterIndex(usize),
    /// At the end of the note.
    End,
}

/// Outcome of [`Note::delete_block`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockRemoval {
    /// Block removed; `focus` is the preceding block, if there was one.
    Removed { focus: Option<BlockId> },
    /// Refused: the block is the last one in the note.
    LastBlock,
    /// No block with that id.
    NotFound,
}

/// A titled document made of an ordered block sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: NoteId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    blocks: Vec<Block>,
    /// Unix epoch milliseconds.
    pub created_at: i64,
    /// Unix epoch milliseconds.
    pub updated_at: i64,
}

impl Note {
    /// Creates an untitled note holding one empty text block.
    pub fn new() -> Self {
        Self::with_blocks(String::new(), Vec::new())
    }

    /// Creates a note from existing blocks.
    ///
    /// An empty `blocks` list is replaced by one empty text block.
    pub fn with_blocks(title: impl Into<String>, blocks: Vec<Block>) -> Self {
        let now = now_epoch_ms();
        let mut note = Self {
            id: Uuid::new_v4(),
            title: title.into(),
            blocks,
            created_at: now,
            updated_at: now,
        };
        note.ensure_editable();
        note
    }

    /// Seed note shown when no saved state exists.
    pub fn welcome() -> Self {
        Self::with_blocks(
            "Welcome to Notes! 👋",
            vec![
                Block::with_content(BlockKind::Heading2, "Getting started"),
                Block::with_content(
                    BlockKind::Text,
                    "This is your first note. Tap to edit or long-press for more options.",
                ),
                Block::with_content(
                    BlockKind::Checklist,
                    "Swipe from the left edge to open the menu",
                ),
                Block::with_content(BlockKind::Checklist, "Tap the + button to create new notes"),
                Block::new(BlockKind::Divider),
                Block::with_content(BlockKind::Quote, "Start capturing your thoughts!"),
            ],
        )
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn block(&self, id: BlockId) -> Option<&Block> {
        self.blocks.iter().find(|block| block.id == id)
    }

    pub fn block_index(&self, id: BlockId) -> Option<usize> {
        self.blocks.iter().position(|block| block.id == id)
    }

    fn block_mut(&mut self, id: BlockId) -> Option<&mut Block> {
        self.blocks.iter_mut().find(|block| block.id == id)
    }

    /// Inserts an empty block of `kind` and returns its id for focusing.
    pub fn insert_block(&mut self, anchor: BlockAnchor, kind: BlockKind) -> BlockId {
        let block = Block::new(kind);
        let id = block.id;
        let index = self.insertion_index(anchor);
        self.blocks.insert(index, block);
        id
    }

    /// Handles a line break inside `id`.
    ///
    /// Inserts an empty block of the same kind after it (an empty text block
    /// after dividers and tables). The current block's text is not split.
    /// Returns `None` when `id` is unknown.
    pub fn split_block(&mut self, id: BlockId) -> Option<BlockId> {
        let index = self.block_index(id)?;
        let block = self.blocks[index].follow_on();
        let new_id = block.id;
        self.blocks.insert(index + 1, block);
        Some(new_id)
    }

    /// Removes a block unless it is the only one left.
    pub fn delete_block(&mut self, id: BlockId) -> BlockRemoval {
        let Some(index) = self.block_index(id) else {
            return BlockRemoval::NotFound;
        };
        if self.blocks.len() <= 1 {
            return BlockRemoval::LastBlock;
        }

        self.blocks.remove(index);
        let focus = index.checked_sub(1).map(|prev| self.blocks[prev].id);
        BlockRemoval::Removed { focus }
    }

    /// Sets text content; no-op for unknown ids, dividers and tables.
    pub fn update_block_content(&mut self, id: BlockId, content: impl Into<String>) -> bool {
        self.block_mut(id)
            .is_some_and(|block| block.set_content(content))
    }

    /// Flips a checklist item; returns the new checked state.
    pub fn toggle_checklist_item(&mut self, id: BlockId) -> Option<bool> {
        self.block_mut(id).and_then(Block::toggle_checked)
    }

    /// Resizes a table block; no-op when it would drop below 1x1.
    pub fn resize_table(&mut self, id: BlockId, delta: TableResize) -> bool {
        self.block_mut(id)
            .and_then(Block::table_mut)
            .is_some_and(|table| table.resize(delta))
    }

    /// Sets one table cell; no-op out of bounds.
    pub fn update_table_cell(
        &mut self,
        id: BlockId,
        row: usize,
        col: usize,
        text: impl Into<String>,
    ) -> bool {
        self.block_mut(id)
            .and_then(Block::table_mut)
            .is_some_and(|table| table.set_cell(row, col, text))
    }

    /// Moves a block to `to_index`, clamped to the last position.
    pub fn move_block(&mut self, id: BlockId, to_index: usize) -> bool {
        let Some(from) = self.block_index(id) else {
            return false;
        };
        let target = to_index.min(self.blocks.len() - 1);
        if from == target {
            return false;
        }
        let block = self.blocks.remove(from);
        self.blocks.insert(target, block);
        true
    }

    /// Changes the kind of a block in place.
    pub fn convert_block(&mut self, id: BlockId, kind: BlockKind) -> bool {
        self.block_mut(id).is_some_and(|block| block.convert(kind))
    }

    /// True when the title is empty and no block carries text.
    pub fn is_blank(&self) -> bool {
        self.title.is_empty() && self.blocks.iter().all(Block::is_empty)
    }

    /// Bumps `updated_at` to now.
    pub fn touch(&mut self) {
        self.updated_at = now_epoch_ms();
    }

    /// Deep copy with a fresh note id and fresh block ids.
    pub fn duplicate(&self) -> Note {
        let now = now_epoch_ms();
        Note {
            id: Uuid::new_v4(),
            title: self.title.clone(),
            blocks: self.blocks.iter().map(Block::duplicate).collect(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Restores model invariants on notes read from storage.
    ///
    /// Repeated block ids are replaced; the first occurrence keeps its id.
    pub fn ensure_editable(&mut self) {
        if self.blocks.is_empty() {
            self.blocks.push(Block::new(BlockKind::Text));
        }
        let mut seen = HashSet::with_capacity(self.blocks.len());
        for block in &mut self.blocks {
            while !seen.insert(block.id) {
                block.id = Uuid::new_v4();
            }
            if let Some(table) = block.table_mut() {
                table.normalize();
            }
        }
    }

    fn insertion_index(&self, anchor: BlockAnchor) -> usize {
        let end = self.blocks.len();
        match anchor {
            BlockAnchor::AfterBlock(id) => self.block_index(id).map_or(end, |index| index + 1),
            BlockAnchor::AfterIndex(index) if index < end => index + 1,
            BlockAnchor::AfterIndex(_) | BlockAnchor::End => end,
        }
    }
}

impl Default for Note {
    fn default() -> Self {
        Self::new()
    }
}
