//! Block domain model.
//!
//! # Responsibility
//! - Define the typed content units a note body is made of.
//! - Own per-variant edits (content, checked state, table grid shape).
//!
//! # Invariants
//! - `id` is unique within the owning note.
//! - For tables, `cells.len() == rows` and every row has exactly `cols`
//!   entries after every operation exposed here.
//! - Tables are never smaller than 1x1.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use uuid::Uuid;

/// Stable identifier of a block inside its note.
pub type BlockId = Uuid;

/// Initial row count for freshly inserted tables.
pub const DEFAULT_TABLE_ROWS: usize = 2;
/// Initial column count for freshly inserted tables.
pub const DEFAULT_TABLE_COLS: usize = 2;

/// Variant discriminant used by insert/convert requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
    Text,
    Heading1,
    Heading2,
    Heading3,
    Quote,
    List,
    Numbered,
    Checklist,
    Divider,
    Table,
}

impl BlockKind {
    /// All kinds in toolbar order.
    pub const ALL: [BlockKind; 10] = [
        BlockKind::Text,
        BlockKind::Heading1,
        BlockKind::Heading2,
        BlockKind::Heading3,
        BlockKind::Quote,
        BlockKind::List,
        BlockKind::Numbered,
        BlockKind::Checklist,
        BlockKind::Divider,
        BlockKind::Table,
    ];

    /// Persisted `type` tag for this kind.
    pub fn as_str(self) -> &'static str {
        match self {
            BlockKind::Text => "text",
            BlockKind::Heading1 => "heading1",
            BlockKind::Heading2 => "heading2",
            BlockKind::Heading3 => "heading3",
            BlockKind::Quote => "quote",
            BlockKind::List => "list",
            BlockKind::Numbered => "numbered",
            BlockKind::Checklist => "checklist",
            BlockKind::Divider => "divider",
            BlockKind::Table => "table",
        }
    }

    /// Whether blocks of this kind carry a single `content` string.
    pub fn is_text_like(self) -> bool {
        !matches!(self, BlockKind::Checklist | BlockKind::Divider | BlockKind::Table)
    }

    /// Whether blocks of this kind accept `content` edits.
    pub fn has_content(self) -> bool {
        !matches!(self, BlockKind::Divider | BlockKind::Table)
    }
}

impl Display for BlockKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BlockKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        BlockKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalized)
            .ok_or_else(|| {
                format!(
                    "unknown block type `{value}`; expected one of {}",
                    BlockKind::ALL.map(BlockKind::as_str).join("|")
                )
            })
    }
}

/// Row/column delta requested by a table resize.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TableResize {
    pub rows: i32,
    pub cols: i32,
}

impl TableResize {
    pub fn rows(delta: i32) -> Self {
        Self { rows: delta, cols: 0 }
    }

    pub fn cols(delta: i32) -> Self {
        Self { rows: 0, cols: delta }
    }
}

/// Row-major text grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableBlock {
    pub rows: usize,
    pub cols: usize,
    #[serde(default)]
    pub cells: Vec<Vec<String>>,
}

impl TableBlock {
    /// Creates an empty grid, clamped to at least 1x1.
    pub fn new(rows: usize, cols: usize) -> Self {
        let mut table = Self {
            rows: rows.max(1),
            cols: cols.max(1),
            cells: Vec::new(),
        };
        table.reshape();
        table
    }

    /// Applies a row/column delta.
    ///
    /// Returns `false` without touching the grid when the result would be
    /// smaller than 1x1 or when the delta is zero.
    pub fn resize(&mut self, delta: TableResize) -> bool {
        if delta == TableResize::default() {
            return false;
        }
        let Some(rows) = apply_delta(self.rows, delta.rows) else {
            return false;
        };
        let Some(cols) = apply_delta(self.cols, delta.cols) else {
            return false;
        };

        self.rows = rows;
        self.cols = cols;
        self.reshape();
        true
    }

    /// Reads one cell.
    pub fn cell(&self, row: usize, col: usize) -> Option<&str> {
        self.cells
            .get(row)
            .and_then(|cells| cells.get(col))
            .map(String::as_str)
    }

    /// Writes one cell; out-of-bounds coordinates are ignored.
    pub fn set_cell(&mut self, row: usize, col: usize, text: impl Into<String>) -> bool {
        match self.cells.get_mut(row).and_then(|cells| cells.get_mut(col)) {
            Some(cell) => {
                *cell = text.into();
                true
            }
            None => false,
        }
    }

    /// Repairs persisted grids whose cells disagree with `rows x cols`.
    pub fn normalize(&mut self) {
        self.rows = self.rows.max(1);
        self.cols = self.cols.max(1);
        self.reshape();
    }

    pub fn is_empty(&self) -> bool {
        self.cells.iter().flatten().all(|cell| cell.is_empty())
    }

    fn reshape(&mut self) {
        let cols = self.cols;
        self.cells.resize_with(self.rows, Vec::new);
        for row in &mut self.cells {
            row.resize(cols, String::new());
        }
    }
}

fn apply_delta(current: usize, delta: i32) -> Option<usize> {
    let next = i64::try_from(current).ok()? + i64::from(delta);
    if next < 1 {
        return None;
    }
    usize::try_from(next).ok()
}

/// Variant payload, tagged by `type` in persisted JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum BlockBody {
    Text {
        #[serde(default)]
        content: String,
    },
    Heading1 {
        #[serde(default)]
        content: String,
    },
    Heading2 {
        #[serde(default)]
        content: String,
    },
    Heading3 {
        #[serde(default)]
        content: String,
    },
    Quote {
        #[serde(default)]
        content: String,
    },
    List {
        #[serde(default)]
        content: String,
    },
    Numbered {
        #[serde(default)]
        content: String,
    },
    Checklist {
        #[serde(default)]
        content: String,
        #[serde(default)]
        checked: bool,
    },
    Divider,
    Table(TableBlock),
}

impl BlockBody {
    /// Builds an empty payload for `kind`.
    pub fn empty(kind: BlockKind) -> Self {
        Self::with_content(kind, String::new())
    }

    /// Builds a payload for `kind`, carrying `content` where the kind has one.
    pub fn with_content(kind: BlockKind, content: String) -> Self {
        match kind {
            BlockKind::Text => Self::Text { content },
            BlockKind::Heading1 => Self::Heading1 { content },
            BlockKind::Heading2 => Self::Heading2 { content },
            BlockKind::Heading3 => Self::Heading3 { content },
            BlockKind::Quote => Self::Quote { content },
            BlockKind::List => Self::List { content },
            BlockKind::Numbered => Self::Numbered { content },
            BlockKind::Checklist => Self::Checklist {
                content,
                checked: false,
            },
            BlockKind::Divider => Self::Divider,
            BlockKind::Table => Self::Table(TableBlock::new(DEFAULT_TABLE_ROWS, DEFAULT_TABLE_COLS)),
        }
    }

    pub fn kind(&self) -> BlockKind {
        match self {
            Self::Text { .. } => BlockKind::Text,
            Self::Heading1 { .. } => BlockKind::Heading1,
            Self::Heading2 { .. } => BlockKind::Heading2,
            Self::Heading3 { .. } => BlockKind::Heading3,
            Self::Quote { .. } => BlockKind::Quote,
            Self::List { .. } => BlockKind::List,
            Self::Numbered { .. } => BlockKind::Numbered,
            Self::Checklist { .. } => BlockKind::Checklist,
            Self::Divider => BlockKind::Divider,
            Self::Table(_) => BlockKind::Table,
        }
    }
}

/// One typed unit of a note body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub id: BlockId,
    #[serde(flatten)]
    pub body: BlockBody,
}

impl Block {
    /// Creates an empty block of `kind` with a generated id.
    pub fn new(kind: BlockKind) -> Self {
        Self::with_id(Uuid::new_v4(), BlockBody::empty(kind))
    }

    /// Creates a block of `kind` holding `content`.
    pub fn with_content(kind: BlockKind, content: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4(), BlockBody::with_content(kind, content.into()))
    }

    /// Creates a block with a caller-provided id.
    pub fn with_id(id: BlockId, body: BlockBody) -> Self {
        Self { id, body }
    }

    pub fn kind(&self) -> BlockKind {
        self.body.kind()
    }

    /// Text content for text-like and checklist blocks.
    pub fn content(&self) -> Option<&str> {
        match &self.body {
            BlockBody::Text { content }
            | BlockBody::Heading1 { content }
            | BlockBody::Heading2 { content }
            | BlockBody::Heading3 { content }
            | BlockBody::Quote { content }
            | BlockBody::List { content }
            | BlockBody::Numbered { content }
            | BlockBody::Checklist { content, .. } => Some(content.as_str()),
            BlockBody::Divider | BlockBody::Table(_) => None,
        }
    }

    /// Replaces `content`; returns `false` for kinds without content.
    pub fn set_content(&mut self, value: impl Into<String>) -> bool {
        match &mut self.body {
            BlockBody::Text { content }
            | BlockBody::Heading1 { content }
            | BlockBody::Heading2 { content }
            | BlockBody::Heading3 { content }
            | BlockBody::Quote { content }
            | BlockBody::List { content }
            | BlockBody::Numbered { content }
            | BlockBody::Checklist { content, .. } => {
                *content = value.into();
                true
            }
            BlockBody::Divider | BlockBody::Table(_) => false,
        }
    }

    /// Checked state for checklist blocks.
    pub fn checked(&self) -> Option<bool> {
        match &self.body {
            BlockBody::Checklist { checked, .. } => Some(*checked),
            _ => None,
        }
    }

    /// Flips a checklist item and returns the new state.
    pub fn toggle_checked(&mut self) -> Option<bool> {
        match &mut self.body {
            BlockBody::Checklist { checked, .. } => {
                *checked = !*checked;
                Some(*checked)
            }
            _ => None,
        }
    }

    pub fn table(&self) -> Option<&TableBlock> {
        match &self.body {
            BlockBody::Table(table) => Some(table),
            _ => None,
        }
    }

    pub fn table_mut(&mut self) -> Option<&mut TableBlock> {
        match &mut self.body {
            BlockBody::Table(table) => Some(table),
            _ => None,
        }
    }

    /// True when the block carries no user text (dividers never do).
    pub fn is_empty(&self) -> bool {
        match &self.body {
            BlockBody::Divider => true,
            BlockBody::Table(table) => table.is_empty(),
            _ => self.content().map_or(true, str::is_empty),
        }
    }

    /// Text fragments visible to search and previews, in reading order.
    pub fn text_fragments(&self) -> Vec<&str> {
        match &self.body {
            BlockBody::Divider => Vec::new(),
            BlockBody::Table(table) => table
                .cells
                .iter()
                .flatten()
                .map(String::as_str)
                .filter(|cell| !cell.is_empty())
                .collect(),
            _ => self.content().into_iter().collect(),
        }
    }

    /// Changes the variant in place, keeping the id.
    ///
    /// Content survives between kinds that carry content; it is dropped when
    /// converting to a divider or table.
    pub fn convert(&mut self, kind: BlockKind) -> bool {
        if self.kind() == kind {
            return false;
        }
        let content = self.content().unwrap_or_default().to_string();
        self.body = BlockBody::with_content(kind, content);
        true
    }

    /// Builds the empty follow-on block created by a line break in `self`.
    pub(crate) fn follow_on(&self) -> Block {
        let kind = self.kind();
        if kind.has_content() {
            Block::new(kind)
        } else {
            Block::new(BlockKind::Text)
        }
    }

    /// Copies the block under a fresh id.
    pub(crate) fn duplicate(&self) -> Block {
        Block::with_id(Uuid::new_v4(), self.body.clone())
    }
}
