use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::section::{SectionPayload, SectionRecord};
use crate::types::Quarter;

/// Inclusive bounds accepted for a lesson year
pub const YEAR_MIN: i32 = 2020;
pub const YEAR_MAX: i32 = 2030;

pub fn year_in_range(year: i32) -> bool {
    (YEAR_MIN..=YEAR_MAX).contains(&year)
}

/// Create/update request body accepted by the gateway.
///
/// Text fields default to empty when absent so that the server can answer
/// with a field-level validation message instead of a decode failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonPayload {
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub introduction: Option<String>,
    #[serde(default)]
    pub year: i32,
    pub quarter: Quarter,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keywords: Option<String>,
    pub language_id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_published: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i32>,
    #[serde(default)]
    pub daily_sections: Vec<SectionPayload>,
}

/// Minimal language reference embedded in a stored lesson
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageRef {
    pub id: Uuid,
    pub name: String,
    pub code: String,
}

/// Canonical stored representation of a lesson, as returned by the gateway
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonRecord {
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub introduction: Option<String>,
    pub year: i32,
    #[serde(default)]
    pub quarter: String,
    #[serde(default)]
    pub keywords: Option<String>,
    pub language_id: Uuid,
    #[serde(default)]
    pub language: Option<LanguageRef>,
    #[serde(default)]
    pub is_published: bool,
    #[serde(default)]
    pub order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub sections: Vec<SectionRecord>,
}

/// Row shape used by listings that do not need the lesson body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonSummary {
    pub id: Uuid,
    pub title: String,
    pub year: i32,
    pub quarter: String,
    pub is_published: bool,
    pub language: Option<LanguageRef>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&LessonRecord> for LessonSummary {
    fn from(lesson: &LessonRecord) -> Self {
        Self {
            id: lesson.id,
            title: lesson.title.clone(),
            year: lesson.year,
            quarter: lesson.quarter.clone(),
            is_published: lesson.is_published,
            language: lesson.language.clone(),
            created_at: lesson.created_at,
            updated_at: lesson.updated_at,
        }
    }
}

/// Result of a single or bulk lesson delete
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteOutcome {
    pub message: String,
    #[serde(default)]
    pub deleted_ids: Vec<Uuid>,
}

/// Filters accepted by lesson search and listing
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LessonQuery {
    pub text: Option<String>,
    pub year: Option<i32>,
    pub quarter: Option<Quarter>,
    pub language_id: Option<Uuid>,
    pub offset: i64,
    pub limit: Option<i64>,
}

impl LessonQuery {
    /// Lowercased search term, or None when blank
    pub fn needle(&self) -> Option<String> {
        self.text
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_lowercase)
    }

    /// Whether a lesson passes every filter except pagination
    pub fn matches(&self, lesson: &LessonRecord) -> bool {
        if let Some(year) = self.year {
            if lesson.year != year {
                return false;
            }
        }
        if let Some(quarter) = self.quarter {
            if lesson.quarter != quarter.as_str() {
                return false;
            }
        }
        if let Some(language_id) = self.language_id {
            if lesson.language_id != language_id {
                return false;
            }
        }
        match self.needle() {
            None => true,
            Some(needle) => {
                let hit = |s: &str| s.to_lowercase().contains(&needle);
                hit(&lesson.title)
                    || hit(&lesson.content)
                    || lesson.description.as_deref().map_or(false, hit)
                    || lesson.keywords.as_deref().map_or(false, hit)
            }
        }
    }
}
