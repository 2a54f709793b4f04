//! Lesson files for `ssl lesson create/edit`: YAML (`.yaml`/`.yml`) or JSON,
//! applied to a lesson form field by field.

use serde::Deserialize;
use std::fs;
use std::path::Path;
use uuid::Uuid;

use crate::editor::{DraftField, FieldError, FormError, LessonField, LessonForm, ValidationError};
use crate::gateway::PersistenceGateway;
use crate::models::Language;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionFile {
    #[serde(default)]
    pub day: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub bible_texts: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonFile {
    pub title: Option<String>,
    pub description: Option<String>,
    pub content: Option<String>,
    pub introduction: Option<String>,
    pub year: Option<i32>,
    pub quarter: Option<String>,
    pub keywords: Option<String>,
    /// Language id, code or name
    pub language: Option<String>,
    pub language_id: Option<Uuid>,
    pub is_published: Option<bool>,
    pub order: Option<i32>,
    /// Replaces every existing section when present
    #[serde(alias = "dailySections")]
    pub sections: Option<Vec<SectionFile>>,
}

impl LessonFile {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path.display(), e))?;
        let is_yaml = matches!(
            path.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase).as_deref(),
            Some("yaml") | Some("yml")
        );
        let file = if is_yaml {
            serde_yaml::from_str(&text)?
        } else {
            serde_json::from_str(&text)?
        };
        Ok(file)
    }

    /// Applies every present field; the first rejected value stops the import
    pub fn apply<G: PersistenceGateway>(self, form: &mut LessonForm<G>) -> Result<(), FormError> {
        let text_fields: [(Option<String>, fn(String) -> LessonField); 5] = [
            (self.title, LessonField::Title),
            (self.description, LessonField::Description),
            (self.content, LessonField::Content),
            (self.introduction, LessonField::Introduction),
            (self.keywords, LessonField::Keywords),
        ];
        for (value, field) in text_fields {
            if let Some(value) = value {
                form.set_field(field(value))?;
            }
        }

        if let Some(year) = self.year {
            form.set_field(LessonField::Year(year))?;
        }
        if let Some(quarter) = self.quarter {
            form.set_field(LessonField::parse("quarter", &quarter)?)?;
        }
        if let Some(id) = self.language_id {
            form.set_field(LessonField::LanguageId(id))?;
        } else if let Some(language) = self.language {
            let id = resolve_language(form.languages(), &language)?;
            form.set_field(LessonField::LanguageId(id))?;
        }
        if let Some(published) = self.is_published {
            form.set_field(LessonField::IsPublished(published))?;
        }
        if let Some(order) = self.order {
            form.set_field(LessonField::Order(order))?;
        }

        if let Some(sections) = self.sections {
            let editor = form.sections_mut()?;
            while !editor.is_empty() {
                editor.remove_section(editor.len() - 1)?;
            }
            for section in sections {
                editor.update_draft_field(DraftField::Day, section.day);
                editor.update_draft_field(DraftField::Content, section.content);
                editor.update_draft_field(DraftField::BibleTexts, section.bible_texts);
                editor.commit_draft()?;
            }
        }
        Ok(())
    }
}

/// Finds a language by id, code or name (case-insensitive)
pub fn resolve_language(languages: &[Language], raw: &str) -> Result<Uuid, ValidationError> {
    let wanted = raw.trim();
    if let Ok(id) = Uuid::parse_str(wanted) {
        return Ok(id);
    }
    languages
        .iter()
        .find(|l| l.code.eq_ignore_ascii_case(wanted) || l.name.eq_ignore_ascii_case(wanted))
        .map(|l| l.id)
        .ok_or_else(|| ValidationError::single(FieldError::new("languageId", format!("Unknown language '{}'", raw))))
}

/// Applies `name=value` assignments from the command line
pub fn apply_assignments<G: PersistenceGateway>(
    form: &mut LessonForm<G>,
    assignments: &[String],
) -> Result<(), FormError> {
    for assignment in assignments {
        let Some((name, value)) = assignment.split_once('=') else {
            return Err(ValidationError::single(FieldError::new(
                "field",
                format!("Expected name=value, got '{}'", assignment),
            ))
            .into());
        };
        let field = match name.trim() {
            "language" | "languageId" | "language_id" => {
                LessonField::LanguageId(resolve_language(form.languages(), value)?)
            }
            other => LessonField::parse(other, value)?,
        };
        form.set_field(field)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::StaticLanguages;
    use crate::models::language::{FRENCH_ID, SPANISH_ID};
    use crate::testing::RecordingGateway;
    use crate::types::Quarter;
    use std::io::Write;

    const YAML: &str = r#"
title: La fe que obra
content: "<p>Santiago 2</p>"
year: 2026
quarter: q2
language: es
isPublished: true
sections:
  - day: Sunday
    content: Fe viva
    bibleTexts: Sant 2:14-17
  - day: monday
    content: Obras
    bibleTexts: Sant 2:18-26
"#;

    async fn form() -> LessonForm<RecordingGateway> {
        let mut form = LessonForm::new(RecordingGateway::default());
        form.initialize(None, &StaticLanguages(Language::defaults())).await.unwrap();
        form
    }

    #[tokio::test]
    async fn yaml_file_fills_form() {
        let mut file = tempfile::Builder::new().suffix(".yml").tempfile().unwrap();
        file.write_all(YAML.as_bytes()).unwrap();

        let lesson = LessonFile::load(file.path()).unwrap();
        let mut form = form().await;
        lesson.apply(&mut form).unwrap();

        let payload = form.payload().unwrap();
        assert_eq!(payload.language_id, SPANISH_ID);
        assert_eq!(payload.quarter, Quarter::Q2);
        assert_eq!(payload.daily_sections.len(), 2);
        assert_eq!(payload.daily_sections[1].day, "Monday");
    }

    #[tokio::test]
    async fn incomplete_section_stops_import() {
        let lesson = LessonFile {
            sections: Some(vec![SectionFile {
                day: "Sunday".into(),
                content: "Only content".into(),
                bible_texts: String::new(),
            }]),
            ..Default::default()
        };
        let mut form = form().await;
        let err = lesson.apply(&mut form).unwrap_err();
        assert!(err.validation().unwrap().has_field("bibleTexts"));
        assert!(form.sections().is_empty());
    }

    #[tokio::test]
    async fn assignments_resolve_language_names() {
        let mut form = form().await;
        apply_assignments(
            &mut form,
            &["language=French".to_string(), "year=2027".to_string(), "title=Foi".to_string()],
        )
        .unwrap();
        assert_eq!(form.fields().language_id, Some(FRENCH_ID));
        assert_eq!(form.fields().year, 2027);

        assert!(apply_assignments(&mut form, &["year".to_string()]).is_err());
        assert!(apply_assignments(&mut form, &["language=Klingon".to_string()]).is_err());
    }
}
