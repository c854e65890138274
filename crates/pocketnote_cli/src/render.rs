//! Plain-text output for notes, blocks and tasks.

use pocketnote_core::{Block, BlockBody, Note, NoteCard, Task};
use uuid::Uuid;

const SHORT_ID_LEN: usize = 8;

pub fn short_id(id: Uuid) -> String {
    id.to_string().chars().take(SHORT_ID_LEN).collect()
}

pub fn print_cards(cards: &[NoteCard]) {
    if cards.is_empty() {
        println!("no notes");
        return;
    }
    for card in cards {
        println!(
            "{}  {}  ({})",
            short_id(card.note_id),
            card.title,
            card.updated_label
        );
        if let Some(preview) = &card.preview {
            println!("          {preview}");
        }
    }
}

pub fn print_note(note: &Note) {
    let title = if note.title.is_empty() {
        pocketnote_core::service::UNTITLED_LABEL
    } else {
        note.title.as_str()
    };
    println!("# {title}  [{}]", note.id);
    for (index, block) in note.blocks().iter().enumerate() {
        println!("{index:>3} {} {}", short_id(block.id), render_block(block));
    }
}

pub fn print_tasks(tasks: &[Task]) {
    if tasks.is_empty() {
        println!("no tasks");
        return;
    }
    for task in tasks {
        let mark = if task.completed { 'x' } else { ' ' };
        println!("{} [{mark}] {}", short_id(task.id), task.text);
    }
}

fn render_block(block: &Block) -> String {
    match &block.body {
        BlockBody::Text { content } => content.clone(),
        BlockBody::Heading1 { content } => format!("# {content}"),
        BlockBody::Heading2 { content } => format!("## {content}"),
        BlockBody::Heading3 { content } => format!("### {content}"),
        BlockBody::Quote { content } => format!("> {content}"),
        BlockBody::List { content } => format!("- {content}"),
        BlockBody::Numbered { content } => format!("1. {content}"),
        BlockBody::Checklist { content, checked } => {
            format!("[{}] {content}", if *checked { 'x' } else { ' ' })
        }
        BlockBody::Divider => "---".to_string(),
        BlockBody::Table(table) => {
            let rows: Vec<String> = table
                .cells
                .iter()
                .map(|row| format!("| {} |", row.join(" | ")))
                .collect();
            format!("table {}x{}\n{}", table.rows, table.cols, indent(&rows))
        }
    }
}

fn indent(lines: &[String]) -> String {
    lines
        .iter()
        .map(|line| format!("             {line}"))
        .collect::<Vec<_>>()
        .join("\n")
}
