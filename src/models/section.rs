use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One daily section as sent to the gateway. `day` stays a raw label on the
/// wire so the server can report a bad one as a field error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionPayload {
    #[serde(default)]
    pub day: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub bible_texts: String,
    #[serde(default)]
    pub order: i32,
}

/// One daily section as persisted. Every field tolerates being absent so that
/// slightly malformed stored data can still be loaded and filtered.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionRecord {
    #[serde(default)]
    pub id: Option<Uuid>,
    #[serde(default)]
    pub day: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub bible_texts: String,
    #[serde(default)]
    pub order: i32,
}

/// Single-section append request (`POST /api/lessons/:id/sections`)
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSection {
    #[serde(default)]
    pub day: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub bible_texts: String,
}

/// Flat append request (`POST /api/sections`) carrying its owning lesson
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFlatSection {
    #[serde(flatten)]
    pub section: NewSection,
    pub lesson_id: Option<Uuid>,
}
