use tracing::{debug, error, warn};
use uuid::Uuid;

use super::error::{EditorError, FieldError, ValidationError};
use crate::models::{SectionPayload, SectionRecord};
use crate::types::{MoveDirection, Weekday};

/// Fields of the in-progress section draft
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftField {
    Day,
    Content,
    BibleTexts,
}

/// The section being composed, not yet part of the lesson
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionDraft {
    pub day: String,
    pub content: String,
    pub bible_texts: String,
}

impl Default for SectionDraft {
    fn default() -> Self {
        Self {
            day: Weekday::default().as_str().to_string(),
            content: String::new(),
            bible_texts: String::new(),
        }
    }
}

/// A committed daily section. `order` always equals the list position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub id: Option<Uuid>,
    pub day: Weekday,
    pub content: String,
    pub bible_texts: String,
    pub order: i32,
}

/// Checks the invariant every committed section satisfies and returns the
/// canonical day.
pub(crate) fn check_section(day: &str, content: &str, bible_texts: &str) -> Result<Weekday, ValidationError> {
    let mut errors = ValidationError::default();

    let parsed = if day.trim().is_empty() {
        errors.push(FieldError::new("day", "Day is required"));
        None
    } else {
        match day.parse::<Weekday>() {
            Ok(d) => Some(d),
            Err(msg) => {
                errors.push(FieldError::new("day", msg));
                None
            }
        }
    };
    if content.trim().is_empty() {
        errors.push(FieldError::new("content", "Content is required"));
    }
    if bible_texts.trim().is_empty() {
        errors.push(FieldError::new("bibleTexts", "Bible text reference is required"));
    }

    errors.into_result()?;
    // errors empty implies the day parsed
    Ok(parsed.unwrap_or_default())
}

/// Draft section plus the ordered list of committed sections for one lesson
#[derive(Debug, Clone, Default)]
pub struct SectionEditor {
    draft: SectionDraft,
    sections: Vec<Section>,
}

impl SectionEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draft(&self) -> &SectionDraft {
        &self.draft
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Sets one draft field. Nothing is validated until commit.
    pub fn update_draft_field(&mut self, field: DraftField, value: impl Into<String>) {
        let value = value.into();
        match field {
            DraftField::Day => self.draft.day = value,
            DraftField::Content => self.draft.content = value,
            DraftField::BibleTexts => self.draft.bible_texts = value,
        }
    }

    /// Moves the draft into the list as its last section and resets the draft.
    /// On failure neither the draft nor the list changes.
    pub fn commit_draft(&mut self) -> Result<usize, EditorError> {
        let day = check_section(&self.draft.day, &self.draft.content, &self.draft.bible_texts)?;

        let draft = std::mem::take(&mut self.draft);
        let index = self.sections.len();
        self.sections.push(Section {
            id: None,
            day,
            content: draft.content,
            bible_texts: draft.bible_texts,
            order: index as i32,
        });
        debug!("Committed {} section at position {}", day, index);
        Ok(index)
    }

    pub fn remove_section(&mut self, index: usize) -> Result<Section, EditorError> {
        self.check_index(index)?;
        let removed = self.sections.remove(index);
        self.renumber();
        Ok(removed)
    }

    /// Swaps a section with its neighbour. Returns false when the move would
    /// leave the list, which is not an error.
    pub fn move_section(&mut self, index: usize, direction: MoveDirection) -> Result<bool, EditorError> {
        self.check_index(index)?;

        let target = match direction {
            MoveDirection::Up if index == 0 => return Ok(false),
            MoveDirection::Up => index - 1,
            MoveDirection::Down if index + 1 == self.sections.len() => return Ok(false),
            MoveDirection::Down => index + 1,
        };

        self.sections.swap(index, target);
        self.renumber();
        Ok(true)
    }

    /// Replaces the list with stored sections: sorted by their stored order,
    /// incomplete entries dropped, then renumbered. Returns how many were dropped.
    pub fn load_existing(&mut self, mut stored: Vec<SectionRecord>) -> usize {
        stored.sort_by_key(|s| s.order);

        let total = stored.len();
        self.sections = stored
            .into_iter()
            .filter_map(|record| match check_section(&record.day, &record.content, &record.bible_texts) {
                Ok(day) => Some(Section {
                    id: record.id,
                    day,
                    content: record.content,
                    bible_texts: record.bible_texts,
                    order: 0,
                }),
                Err(e) => {
                    warn!(section_id = ?record.id, "Dropping stored section: {}", e);
                    None
                }
            })
            .collect();
        self.renumber();
        self.draft = SectionDraft::default();

        total - self.sections.len()
    }

    /// Serializes the current sequence; order is the list position
    pub fn to_payload(&self) -> Vec<SectionPayload> {
        self.sections
            .iter()
            .enumerate()
            .map(|(position, s)| SectionPayload {
                day: s.day.to_string(),
                content: s.content.clone(),
                bible_texts: s.bible_texts.clone(),
                order: position as i32,
            })
            .collect()
    }

    fn check_index(&self, index: usize) -> Result<(), EditorError> {
        if index < self.sections.len() {
            return Ok(());
        }
        let err = EditorError::IndexOutOfRange {
            index,
            len: self.sections.len(),
        };
        error!("Section editor misuse: {}", err);
        Err(err)
    }

    fn renumber(&mut self) {
        for (position, section) in self.sections.iter_mut().enumerate() {
            section.order = position as i32;
        }
    }
}
