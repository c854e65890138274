use pocketnote_core::{
    Block, BlockAnchor, BlockBody, BlockKind, BlockRemoval, Note, Notebook, TableBlock,
    TableResize,
};
use std::collections::HashSet;
use uuid::Uuid;

fn text(id: u128, content: &str) -> Block {
    Block::with_id(
        Uuid::from_u128(id),
        BlockBody::Text {
            content: content.to_string(),
        },
    )
}

fn table_block(id: u128, cells: [[&str; 2]; 2]) -> Block {
    Block::with_id(
        Uuid::from_u128(id),
        BlockBody::Table(TableBlock {
            rows: 2,
            cols: 2,
            cells: cells
                .iter()
                .map(|row| row.iter().map(|cell| cell.to_string()).collect())
                .collect(),
        }),
    )
}

#[test]
fn checklist_insert_after_last_block() {
    let mut note = Note::with_blocks("", vec![text(1, "a"), text(2, "b"), text(3, "c")]);

    let id = note.insert_block(
        BlockAnchor::AfterBlock(Uuid::from_u128(3)),
        BlockKind::Checklist,
    );

    assert_eq!(note.blocks().len(), 4);
    assert_eq!(note.block_index(id), Some(3));
    let created = note.block(id).unwrap();
    assert_eq!(created.kind(), BlockKind::Checklist);
    assert_eq!(created.checked(), Some(false));
    assert_eq!(created.content(), Some(""));
}

#[test]
fn insert_after_unknown_block_appends() {
    let mut note = Note::with_blocks("", vec![text(1, "a"), text(2, "b")]);
    let id = note.insert_block(BlockAnchor::AfterBlock(Uuid::from_u128(99)), BlockKind::Quote);
    assert_eq!(note.block_index(id), Some(2));
}

#[test]
fn table_grows_by_one_row() {
    let mut note = Note::with_blocks("", vec![table_block(7, [["a", "b"], ["c", "d"]])]);
    let id = Uuid::from_u128(7);

    assert!(note.resize_table(id, TableResize::rows(1)));

    let table = note.block(id).unwrap().table().unwrap();
    assert_eq!(table.rows, 3);
    assert_eq!(table.cols, 2);
    assert_eq!(
        table.cells,
        vec![
            vec!["a".to_string(), "b".to_string()],
            vec!["c".to_string(), "d".to_string()],
            vec![String::new(), String::new()],
        ]
    );
}

#[test]
fn table_resize_keeps_grid_shape_and_floor() {
    let mut note = Note::with_blocks("", vec![table_block(7, [["a", "b"], ["c", "d"]])]);
    let id = Uuid::from_u128(7);

    assert!(note.resize_table(id, TableResize::cols(1)));
    assert!(note.resize_table(id, TableResize { rows: -1, cols: -2 }));
    assert!(!note.resize_table(id, TableResize::rows(-1)));
    assert!(!note.resize_table(id, TableResize::cols(-1)));

    let table = note.block(id).unwrap().table().unwrap();
    assert_eq!((table.rows, table.cols), (1, 1));
    assert_eq!(table.cells, vec![vec!["a".to_string()]]);
    assert_eq!(table.cells.len(), table.rows);
    assert!(table.cells.iter().all(|row| row.len() == table.cols));
}

#[test]
fn note_always_keeps_one_block() {
    let mut note = Note::with_blocks("", vec![text(1, "a"), text(2, "b")]);
    let third = note.insert_block(BlockAnchor::End, BlockKind::Divider);

    for id in [Uuid::from_u128(1), third, Uuid::from_u128(2)] {
        note.delete_block(id);
        assert!(!note.blocks().is_empty());
    }
    assert_eq!(note.blocks().len(), 1);
    assert_eq!(note.blocks()[0].id, Uuid::from_u128(2));

    let before = note.clone();
    assert_eq!(
        note.delete_block(Uuid::from_u128(2)),
        BlockRemoval::LastBlock
    );
    assert_eq!(note, before);
}

#[test]
fn duplicate_note_gets_fresh_distinct_ids() {
    let mut notebook = Notebook::from_parts(
        vec![Note::with_blocks(
            "Trip",
            vec![text(1, "pack"), table_block(2, [["x", ""], ["", "y"]])],
        )],
        Vec::new(),
    );
    let original_id = notebook.notes()[0].id;

    let copy_id = notebook.duplicate_note(original_id).unwrap();
    assert_eq!(notebook.notes()[0].id, copy_id);

    let original = notebook.note(original_id).unwrap();
    let copy = notebook.note(copy_id).unwrap();
    assert_ne!(copy.id, original.id);
    assert_eq!(copy.title, original.title);

    let mut ids = HashSet::new();
    for block in original.blocks().iter().chain(copy.blocks()) {
        assert!(ids.insert(block.id), "duplicate block id {}", block.id);
    }
    for (left, right) in original.blocks().iter().zip(copy.blocks()) {
        assert_eq!(left.body, right.body);
    }
}

#[test]
fn empty_search_returns_collection_in_order() {
    let mut notebook = Notebook::new();
    let ids: Vec<_> = (0..3).map(|_| notebook.create_note()).collect();

    let found: Vec<_> = notebook.search("").into_iter().map(|note| note.id).collect();
    let expected: Vec<_> = ids.into_iter().rev().collect();
    assert_eq!(found, expected);
    assert!(notebook.search("   ").is_empty());
}

#[test]
fn search_matches_title_and_block_text_ignoring_case() {
    let mut notebook = Notebook::from_parts(
        vec![
            Note::with_blocks("Groceries", vec![text(1, "milk")]),
            Note::with_blocks("", vec![table_block(2, [["Budget", ""], ["", ""]])]),
            Note::with_blocks("Ideas", vec![text(3, "novel")]),
        ],
        Vec::new(),
    );
    notebook.create_task("milk run");

    let titles = |query: &str| -> Vec<String> {
        notebook
            .search(query)
            .into_iter()
            .map(|note| note.title.clone())
            .collect()
    };
    assert_eq!(titles("GROC"), vec!["Groceries"]);
    assert_eq!(titles("MILK"), vec!["Groceries"]);
    assert_eq!(titles("budget"), vec![""]);
    assert!(titles("nothing").is_empty());
}

#[test]
fn close_removes_empty_and_keeps_titled() {
    let mut notebook = Notebook::new();
    let empty = notebook.create_note();
    let titled = notebook.create_note();
    notebook.note_mut(titled).unwrap().title = "Keep me".to_string();

    assert!(notebook.close_note_editor(empty));
    assert!(!notebook.close_note_editor(titled));
    assert!(notebook.note(empty).is_none());
    assert!(notebook.note(titled).is_some());
}

#[test]
fn close_keeps_untitled_note_with_content() {
    let mut notebook = Notebook::new();
    let id = notebook.create_note();
    let block = notebook.note(id).unwrap().blocks()[0].id;
    notebook
        .note_mut(id)
        .unwrap()
        .update_block_content(block, "draft");

    assert!(!notebook.close_note_editor(id));
    assert!(notebook.note(id).is_some());
}

#[test]
fn content_updates_skip_dividers_and_tables() {
    let mut note = Note::with_blocks("", vec![table_block(1, [["", ""], ["", ""]])]);
    let divider = note.insert_block(BlockAnchor::End, BlockKind::Divider);

    assert!(!note.update_block_content(Uuid::from_u128(1), "x"));
    assert!(!note.update_block_content(divider, "x"));
    assert!(!note.update_table_cell(Uuid::from_u128(1), 2, 0, "x"));
    assert!(note.update_table_cell(Uuid::from_u128(1), 1, 1, "x"));
    assert_eq!(
        note.block(Uuid::from_u128(1)).unwrap().table().unwrap().cell(1, 1),
        Some("x")
    );
}

#[test]
fn convert_carries_text_between_text_kinds() {
    let mut note = Note::with_blocks("", vec![text(1, "todo")]);
    let id = Uuid::from_u128(1);

    assert!(note.convert_block(id, BlockKind::Checklist));
    assert_eq!(note.block(id).unwrap().content(), Some("todo"));
    assert_eq!(note.block(id).unwrap().checked(), Some(false));

    assert!(note.convert_block(id, BlockKind::Heading1));
    assert_eq!(note.block(id).unwrap().content(), Some("todo"));

    assert!(note.convert_block(id, BlockKind::Divider));
    assert_eq!(note.block(id).unwrap().content(), None);
}
