//! Personal study notes kept in a local JSON file

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::editor::{FieldError, ValidationError};

#[derive(Debug, Error)]
pub enum NoteError {
    #[error("Failed to access note book {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Note book {path} is not valid JSON: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Note {0} not found")]
    NotFound(Uuid),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lesson_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lesson_title: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Partial update; `None` leaves a field as it is
#[derive(Debug, Clone, Default)]
pub struct NoteUpdate {
    pub title: Option<String>,
    pub content: Option<String>,
    pub lesson_id: Option<Uuid>,
    pub lesson_title: Option<String>,
}

/// Notes newest first, persisted after every change
#[derive(Debug)]
pub struct NoteBook {
    path: PathBuf,
    notes: Vec<Note>,
}

fn check_note(title: &str, content: &str) -> Result<(), ValidationError> {
    let mut errors = ValidationError::default();
    if title.trim().is_empty() {
        errors.push(FieldError::new("title", "Note title is required"));
    }
    if content.trim().is_empty() {
        errors.push(FieldError::new("content", "Note content is required"));
    }
    errors.into_result()
}

impl NoteBook {
    /// Opens the note book at `path`; a missing file is an empty book
    pub fn open(path: impl AsRef<Path>) -> Result<Self, NoteError> {
        let path = path.as_ref().to_path_buf();
        let notes = match fs::read_to_string(&path) {
            Ok(text) if text.trim().is_empty() => Vec::new(),
            Ok(text) => serde_json::from_str(&text).map_err(|source| NoteError::Corrupt {
                path: path.clone(),
                source,
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(source) => return Err(NoteError::Io { path, source }),
        };
        debug!("Loaded {} note(s) from {}", notes.len(), path.display());
        Ok(Self { path, notes })
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn get(&self, id: Uuid) -> Option<&Note> {
        self.notes.iter().find(|n| n.id == id)
    }

    pub fn add(
        &mut self,
        title: &str,
        content: &str,
        lesson: Option<(Uuid, String)>,
    ) -> Result<Note, NoteError> {
        check_note(title, content)?;

        let now = Utc::now();
        let (lesson_id, lesson_title) = match lesson {
            Some((id, title)) => (Some(id), Some(title)),
            None => (None, None),
        };
        let note = Note {
            id: Uuid::new_v4(),
            title: title.to_string(),
            content: content.to_string(),
            lesson_id,
            lesson_title,
            created_at: now,
            updated_at: now,
        };
        self.notes.insert(0, note.clone());
        self.save()?;
        Ok(note)
    }

    pub fn update(&mut self, id: Uuid, update: NoteUpdate) -> Result<Note, NoteError> {
        let index = self.notes.iter().position(|n| n.id == id).ok_or(NoteError::NotFound(id))?;

        let mut note = self.notes[index].clone();
        if let Some(title) = update.title {
            note.title = title;
        }
        if let Some(content) = update.content {
            note.content = content;
        }
        if update.lesson_id.is_some() {
            note.lesson_id = update.lesson_id;
        }
        if update.lesson_title.is_some() {
            note.lesson_title = update.lesson_title;
        }
        check_note(&note.title, &note.content)?;
        note.updated_at = Utc::now();

        self.notes[index] = note.clone();
        self.save()?;
        Ok(note)
    }

    pub fn delete(&mut self, id: Uuid) -> Result<Note, NoteError> {
        let index = self.notes.iter().position(|n| n.id == id).ok_or(NoteError::NotFound(id))?;
        let removed = self.notes.remove(index);
        self.save()?;
        Ok(removed)
    }

    /// Case-insensitive match on title, content or lesson title; blank matches all
    pub fn search(&self, term: &str) -> Vec<&Note> {
        let needle = term.trim().to_lowercase();
        if needle.is_empty() {
            return self.notes.iter().collect();
        }
        let hit = |s: &str| s.to_lowercase().contains(&needle);
        self.notes
            .iter()
            .filter(|n| hit(&n.title) || hit(&n.content) || n.lesson_title.as_deref().map_or(false, hit))
            .collect()
    }

    fn save(&self) -> Result<(), NoteError> {
        let io_err = |source| NoteError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(io_err)?;
            }
        }
        let text = serde_json::to_string_pretty(&self.notes).map_err(|source| NoteError::Corrupt {
            path: self.path.clone(),
            source,
        })?;
        fs::write(&self.path, text).map_err(io_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn notes_persist_newest_first() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("notes").join("notes.json");

        let mut book = NoteBook::open(&path).unwrap();
        assert!(book.notes().is_empty());
        book.add("First", "Grace abounds", None).unwrap();
        let second = book
            .add("Second", "Faith and works", Some((Uuid::new_v4(), "James".into())))
            .unwrap();

        let reopened = NoteBook::open(&path).unwrap();
        assert_eq!(reopened.notes().len(), 2);
        assert_eq!(reopened.notes()[0].id, second.id);
        assert_eq!(reopened.notes()[0].lesson_title.as_deref(), Some("James"));
    }

    #[test]
    fn add_requires_title_and_content() {
        let dir = TempDir::new().unwrap();
        let mut book = NoteBook::open(dir.path().join("notes.json")).unwrap();
        let err = book.add(" ", "", None).unwrap_err();
        match err {
            NoteError::Validation(v) => assert_eq!(v.fields(), vec!["title", "content"]),
            other => panic!("unexpected error: {}", other),
        }
        assert!(book.notes().is_empty());
    }

    #[test]
    fn update_delete_and_search() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("notes.json");
        let mut book = NoteBook::open(&path).unwrap();
        let note = book.add("Sabbath", "Rest and worship", None).unwrap();
        book.add("Prayer", "Daily habit", Some((Uuid::new_v4(), "The Sabbath Rest".into())))
            .unwrap();

        assert_eq!(book.search("SABBATH").len(), 2);
        assert_eq!(book.search("habit").len(), 1);
        assert_eq!(book.search("").len(), 2);

        let updated = book
            .update(
                note.id,
                NoteUpdate {
                    content: Some("Rest, worship and fellowship".into()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.title, "Sabbath");
        assert!(updated.updated_at >= note.updated_at);

        assert!(book
            .update(note.id, NoteUpdate { title: Some("".into()), ..Default::default() })
            .is_err());

        book.delete(note.id).unwrap();
        assert!(matches!(book.delete(note.id), Err(NoteError::NotFound(_))));
        assert_eq!(NoteBook::open(&path).unwrap().notes().len(), 1);
    }
}
