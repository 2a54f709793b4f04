use clap::Subcommand;
use serde_json::json;
use std::path::PathBuf;
use uuid::Uuid;

use crate::cli::import::{apply_assignments, LessonFile};
use crate::cli::utils::{output_empty_collection, output_success, output_value, truncate};
use crate::cli::OutputFormat;
use crate::editor::{LessonForm, SectionEditor};
use crate::gateway::http::SearchParams;
use crate::gateway::{HttpGateway, PersistenceGateway};
use crate::models::{LessonRecord, LessonSummary};
use crate::types::{MoveDirection, Quarter};

#[derive(Subcommand)]
pub enum LessonCommands {
    #[command(about = "List all lessons, newest first")]
    List,

    #[command(about = "Show one lesson with its daily sections")]
    Show {
        #[arg(help = "Lesson ID")]
        id: Uuid,
    },

    #[command(about = "Search lessons by text and filters")]
    Search {
        #[arg(help = "Text matched against title, description, content and keywords")]
        query: Option<String>,
        #[arg(long)]
        year: Option<i32>,
        #[arg(long)]
        quarter: Option<Quarter>,
        #[arg(long, help = "Language ID")]
        language: Option<Uuid>,
        #[arg(long)]
        page: Option<i64>,
        #[arg(long)]
        limit: Option<i64>,
    },

    #[command(about = "Lessons for one year and quarter")]
    ByQuarter {
        year: i32,
        quarter: Quarter,
    },

    #[command(about = "Years that have lessons")]
    Years,

    #[command(about = "Create a lesson from a YAML or JSON file and/or name=value fields")]
    Create {
        #[arg(long, short, help = "Lesson file (.yaml, .yml or .json)")]
        file: Option<PathBuf>,
        #[arg(long = "set", value_name = "NAME=VALUE", help = "Set a lesson field")]
        set: Vec<String>,
    },

    #[command(about = "Edit a stored lesson")]
    Edit {
        #[arg(help = "Lesson ID")]
        id: Uuid,
        #[arg(long, short, help = "Lesson file whose fields override the stored ones")]
        file: Option<PathBuf>,
        #[arg(long = "set", value_name = "NAME=VALUE", help = "Set a lesson field")]
        set: Vec<String>,
        #[arg(long = "remove-section", value_name = "INDEX", help = "Remove the section at a 0-based position")]
        remove_section: Vec<usize>,
        #[arg(long = "move-section", value_name = "INDEX:up|down", help = "Move a section one position")]
        move_section: Vec<String>,
    },

    #[command(about = "Delete a lesson")]
    Delete {
        #[arg(help = "Lesson ID")]
        id: Uuid,
    },

    #[command(about = "Delete several lessons at once")]
    DeleteMany {
        #[arg(required = true, help = "Lesson IDs")]
        ids: Vec<Uuid>,
    },
}

fn parse_move(raw: &str) -> anyhow::Result<(usize, MoveDirection)> {
    let (index, direction) = raw
        .split_once(':')
        .ok_or_else(|| anyhow::anyhow!("Expected INDEX:up or INDEX:down, got '{}'", raw))?;
    let index = index
        .trim()
        .parse()
        .map_err(|_| anyhow::anyhow!("Invalid section index '{}'", index))?;
    let direction = direction.parse().map_err(|e: String| anyhow::anyhow!(e))?;
    Ok((index, direction))
}

/// Applies `--remove-section` then `--move-section`, checking every index
/// against the current section count first
fn apply_section_edits(editor: &mut SectionEditor, mut removals: Vec<usize>, moves: &[String]) -> anyhow::Result<()> {
    let ensure_index = |index: usize, len: usize| -> anyhow::Result<()> {
        if index >= len {
            anyhow::bail!("No section {} (lesson has {})", index, len);
        }
        Ok(())
    };

    // Highest index first so earlier removals do not shift later ones
    removals.sort_unstable_by(|a, b| b.cmp(a));
    removals.dedup();
    for &index in &removals {
        ensure_index(index, editor.len())?;
    }
    for index in removals {
        editor.remove_section(index)?;
    }

    let moves = moves.iter().map(|raw| parse_move(raw)).collect::<anyhow::Result<Vec<_>>>()?;
    for (index, direction) in moves {
        ensure_index(index, editor.len())?;
        editor.move_section(index, direction)?;
    }
    Ok(())
}

fn print_summaries(lessons: &[LessonSummary]) {
    println!("{:<36}  {:<4}  {:<2}  {:<3}  TITLE", "ID", "YEAR", "Q", "PUB");
    for lesson in lessons {
        println!(
            "{:<36}  {:<4}  {:<2}  {:<3}  {}",
            lesson.id,
            lesson.year,
            lesson.quarter,
            if lesson.is_published { "yes" } else { "no" },
            truncate(&lesson.title, 48)
        );
    }
}

fn print_lessons(lessons: &[LessonRecord]) {
    let summaries: Vec<LessonSummary> = lessons.iter().map(LessonSummary::from).collect();
    print_summaries(&summaries);
}

fn print_lesson(lesson: &LessonRecord) {
    println!("{} ({} {})", lesson.title, lesson.year, lesson.quarter);
    println!("ID: {}", lesson.id);
    if let Some(language) = &lesson.language {
        println!("Language: {} ({})", language.name, language.code);
    }
    println!("Published: {}", if lesson.is_published { "yes" } else { "no" });
    if let Some(description) = lesson.description.as_deref().filter(|d| !d.is_empty()) {
        println!("Description: {}", description);
    }
    println!("Sections:");
    for section in &lesson.sections {
        println!(
            "  {:>2}. {:<9} {:<20} {}",
            section.order,
            section.day,
            truncate(&section.bible_texts, 20),
            truncate(&section.content, 40)
        );
    }
}

async fn submit(form: &mut LessonForm<HttpGateway>, output_format: &OutputFormat, verb: &str) -> anyhow::Result<()> {
    let lesson = form.submit().await?;
    match output_format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&lesson)?),
        OutputFormat::Text => {
            output_success(output_format, &format!("Lesson '{}' {}", lesson.title, verb), None)?;
            print_lesson(&lesson);
        }
    }
    Ok(())
}

pub async fn handle(cmd: LessonCommands, gateway: HttpGateway, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        LessonCommands::List => {
            let lessons = gateway.list_lessons().await?;
            if lessons.is_empty() {
                return output_empty_collection(&output_format, "lessons", "No lessons found");
            }
            output_value(&output_format, &lessons, |l| print_lessons(l))
        }
        LessonCommands::Show { id } => {
            let lesson = gateway.fetch_lesson(id).await?;
            output_value(&output_format, &lesson, print_lesson)
        }
        LessonCommands::Search {
            query,
            year,
            quarter,
            language,
            page,
            limit,
        } => {
            let params = SearchParams {
                q: query,
                year,
                quarter,
                language_id: language,
                page,
                limit,
            };
            let result = gateway.search_lessons(&params).await?;
            output_value(&output_format, &result, |page| {
                print_summaries(&page.lessons);
                let info = &page.pagination;
                println!(
                    "Page {} of {} ({} lesson(s))",
                    info.current_page, info.total_pages, info.total_count
                );
            })
        }
        LessonCommands::ByQuarter { year, quarter } => {
            let lessons = gateway.lessons_by_quarter(year, quarter).await?;
            if lessons.is_empty() {
                return output_empty_collection(
                    &output_format,
                    "lessons",
                    &format!("No lessons for {} {}", quarter, year),
                );
            }
            output_value(&output_format, &lessons, |l| print_lessons(l))
        }
        LessonCommands::Years => {
            let years = gateway.lesson_years().await?;
            output_value(&output_format, &years, |years| {
                for year in years {
                    println!("{}", year);
                }
            })
        }
        LessonCommands::Create { file, set } => {
            let mut form = LessonForm::new(gateway.clone());
            form.initialize(None, &gateway).await?;
            if let Some(path) = file {
                LessonFile::load(&path)?.apply(&mut form)?;
            }
            apply_assignments(&mut form, &set)?;
            submit(&mut form, &output_format, "created").await
        }
        LessonCommands::Edit {
            id,
            file,
            set,
            remove_section,
            move_section,
        } => {
            let mut form = LessonForm::new(gateway.clone());
            form.initialize_from_gateway(id, &gateway).await?;
            if let Some(path) = file {
                LessonFile::load(&path)?.apply(&mut form)?;
            }
            apply_assignments(&mut form, &set)?;

            apply_section_edits(form.sections_mut()?, remove_section, &move_section)?;

            submit(&mut form, &output_format, "updated").await
        }
        LessonCommands::Delete { id } => {
            let outcome = gateway.delete_lesson(id).await?;
            output_success(
                &output_format,
                &outcome.message,
                Some(json!({ "deletedIds": outcome.deleted_ids })),
            )
        }
        LessonCommands::DeleteMany { ids } => {
            let outcome = gateway.delete_lessons(&ids).await?;
            output_success(
                &output_format,
                &outcome.message,
                Some(json!({ "deletedIds": outcome.deleted_ids })),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::DraftField;

    #[test]
    fn move_argument_parses() {
        assert_eq!(parse_move("2:up").unwrap(), (2, MoveDirection::Up));
        assert_eq!(parse_move("0:DOWN").unwrap(), (0, MoveDirection::Down));
        assert!(parse_move("2").is_err());
        assert!(parse_move("x:up").is_err());
        assert!(parse_move("1:left").is_err());
    }

    fn editor_with(days: &[&str]) -> SectionEditor {
        let mut editor = SectionEditor::new();
        for day in days {
            editor.update_draft_field(DraftField::Day, *day);
            editor.update_draft_field(DraftField::Content, format!("{} study", day));
            editor.update_draft_field(DraftField::BibleTexts, "Ps 1");
            editor.commit_draft().unwrap();
        }
        editor
    }

    fn days(editor: &SectionEditor) -> Vec<String> {
        editor.sections().iter().map(|s| s.day.to_string()).collect()
    }

    #[test]
    fn out_of_range_section_index_is_reported_before_editing() {
        let mut editor = editor_with(&["Sunday", "Monday"]);

        let err = apply_section_edits(&mut editor, vec![0, 5], &[]).unwrap_err();
        assert_eq!(err.to_string(), "No section 5 (lesson has 2)");
        assert_eq!(editor.len(), 2);

        let err = apply_section_edits(&mut editor, vec![], &["2:up".to_string()]).unwrap_err();
        assert_eq!(err.to_string(), "No section 2 (lesson has 2)");
        assert_eq!(days(&editor), vec!["Sunday", "Monday"]);
    }

    #[test]
    fn removals_apply_before_moves() {
        let mut editor = editor_with(&["Sunday", "Monday", "Tuesday", "Wednesday"]);
        apply_section_edits(&mut editor, vec![1, 1], &["1:up".to_string()]).unwrap();
        assert_eq!(days(&editor), vec!["Tuesday", "Sunday", "Wednesday"]);
    }
}
