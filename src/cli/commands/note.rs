use clap::Subcommand;
use serde_json::json;
use uuid::Uuid;

use crate::cli::config::notes_path;
use crate::cli::utils::{output_empty_collection, output_success, output_value, truncate};
use crate::cli::OutputFormat;
use crate::notes::{Note, NoteBook, NoteUpdate};

#[derive(Subcommand)]
pub enum NoteCommands {
    #[command(about = "List notes, newest first")]
    List {
        #[arg(long, short, help = "Only notes whose title, content or lesson title match")]
        search: Option<String>,
    },

    #[command(about = "Show one note")]
    Show {
        id: Uuid,
    },

    #[command(about = "Add a note, optionally linked to a lesson")]
    Add {
        title: String,
        content: String,
        #[arg(long, requires = "lesson_title", help = "Linked lesson ID")]
        lesson: Option<Uuid>,
        #[arg(long, requires = "lesson", help = "Linked lesson title")]
        lesson_title: Option<String>,
    },

    #[command(about = "Change a note's title or content")]
    Edit {
        id: Uuid,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        content: Option<String>,
    },

    #[command(about = "Delete a note")]
    Delete {
        id: Uuid,
    },
}

fn print_notes(notes: &[&Note]) {
    for note in notes {
        let linked = note
            .lesson_title
            .as_deref()
            .map(|t| format!(" [{}]", t))
            .unwrap_or_default();
        println!(
            "{}  {}  {}{}",
            note.id,
            note.updated_at.format("%Y-%m-%d"),
            truncate(&note.title, 40),
            linked
        );
    }
}

fn print_note(note: &Note) {
    println!("{}", note.title);
    println!("ID: {}", note.id);
    if let (Some(id), Some(title)) = (note.lesson_id, &note.lesson_title) {
        println!("Lesson: {} ({})", title, id);
    }
    println!("Updated: {}", note.updated_at.format("%Y-%m-%d %H:%M"));
    println!();
    println!("{}", note.content);
}

pub fn handle(cmd: NoteCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let mut book = NoteBook::open(notes_path()?)?;

    match cmd {
        NoteCommands::List { search } => {
            let notes = book.search(search.as_deref().unwrap_or(""));
            if notes.is_empty() {
                return output_empty_collection(&output_format, "notes", "No notes found");
            }
            output_value(&output_format, &notes, |n| print_notes(n))
        }
        NoteCommands::Show { id } => {
            let note = book.get(id).ok_or_else(|| anyhow::anyhow!("Note {} not found", id))?;
            output_value(&output_format, note, print_note)
        }
        NoteCommands::Add {
            title,
            content,
            lesson,
            lesson_title,
        } => {
            let note = book.add(&title, &content, lesson.zip(lesson_title))?;
            output_success(
                &output_format,
                &format!("Note '{}' saved", note.title),
                Some(json!({ "note": note })),
            )
        }
        NoteCommands::Edit { id, title, content } => {
            if title.is_none() && content.is_none() {
                anyhow::bail!("Nothing to change: pass --title and/or --content");
            }
            let note = book.update(
                id,
                NoteUpdate {
                    title,
                    content,
                    ..Default::default()
                },
            )?;
            output_success(
                &output_format,
                &format!("Note '{}' updated", note.title),
                Some(json!({ "note": note })),
            )
        }
        NoteCommands::Delete { id } => {
            let note = book.delete(id)?;
            output_success(
                &output_format,
                &format!("Note '{}' deleted", note.title),
                Some(json!({ "id": note.id })),
            )
        }
    }
}
