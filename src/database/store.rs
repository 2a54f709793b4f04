use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{
    Language, LessonPayload, LessonQuery, LessonRecord, NewNotification, Notification, SectionPayload, SectionRecord,
};

/// Errors from the lesson store backends
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Durable storage for languages, lessons with their sections, and the
/// activity feed.
///
/// Payloads reaching the store have already been validated. Writers assign
/// section order from list position.
#[async_trait]
pub trait LessonStore: Send + Sync {
    async fn ping(&self) -> Result<(), StoreError>;

    /// Languages ordered by name; inactive ones only when asked
    async fn languages(&self, include_inactive: bool) -> Result<Vec<Language>, StoreError>;

    async fn language(&self, id: Uuid) -> Result<Option<Language>, StoreError>;

    async fn set_language_active(&self, id: Uuid, is_active: bool) -> Result<Language, StoreError>;

    async fn insert_lesson(&self, lesson: &LessonPayload) -> Result<LessonRecord, StoreError>;

    /// Replaces metadata and the whole section list
    async fn replace_lesson(&self, id: Uuid, lesson: &LessonPayload) -> Result<LessonRecord, StoreError>;

    async fn lesson(&self, id: Uuid) -> Result<Option<LessonRecord>, StoreError>;

    /// Matching lessons newest first, windowed by the query's offset and
    /// limit, together with the total match count
    async fn find_lessons(&self, query: &LessonQuery) -> Result<(Vec<LessonRecord>, i64), StoreError>;

    /// Distinct lesson years, descending
    async fn lesson_years(&self) -> Result<Vec<i32>, StoreError>;

    /// Deletes the given lessons and their sections; returns the IDs that existed
    async fn delete_lessons(&self, ids: &[Uuid]) -> Result<Vec<Uuid>, StoreError>;

    /// Appends one section after the lesson's current last section
    async fn append_section(&self, lesson_id: Uuid, section: &SectionPayload) -> Result<SectionRecord, StoreError>;

    async fn recent_notifications(&self, limit: i64) -> Result<Vec<Notification>, StoreError>;

    async fn insert_notification(&self, notification: &NewNotification) -> Result<Notification, StoreError>;
}
