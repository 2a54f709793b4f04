use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::ApiConfig;
use crate::database::LessonStore;
use crate::editor::section_editor::check_section;
use crate::editor::{FieldError, ValidationError};
use crate::error::ApiError;
use crate::models::lesson::year_in_range;
use crate::models::{
    DeleteOutcome, Language, LessonAction, LessonPayload, LessonQuery, LessonRecord, LessonSummary, NewNotification,
    NewSection, Notification, SectionPayload, SectionRecord, YEAR_MAX, YEAR_MIN,
};
use crate::pagination::{LessonPage, PageRequest};
use crate::types::Quarter;

/// Typed search filters after query-string parsing
#[derive(Debug, Clone, Default)]
pub struct LessonSearch {
    pub text: Option<String>,
    pub year: Option<i32>,
    pub quarter: Option<Quarter>,
    pub language_id: Option<Uuid>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// Server-side lesson operations: validation, storage and activity feed
#[derive(Clone)]
pub struct LessonService {
    store: Arc<dyn LessonStore>,
    api: ApiConfig,
}

/// Checks every lesson-level and section-level constraint the editor enforces.
/// Valid section days are rewritten to their canonical label.
pub fn validate_lesson(payload: &mut LessonPayload) -> Result<(), ValidationError> {
    let mut errors = ValidationError::default();

    if payload.title.trim().is_empty() {
        errors.push(FieldError::new("title", "Title is required"));
    }
    if payload.content.trim().is_empty() {
        errors.push(FieldError::new("content", "Content is required"));
    }
    if !year_in_range(payload.year) {
        errors.push(FieldError::new(
            "year",
            format!("Year must be between {} and {}, got {}", YEAR_MIN, YEAR_MAX, payload.year),
        ));
    }
    for (i, section) in payload.daily_sections.iter_mut().enumerate() {
        match check_section(&section.day, &section.content, &section.bible_texts) {
            Ok(day) => section.day = day.to_string(),
            Err(e) => {
                for field in e.errors() {
                    errors.push(FieldError::new(
                        "dailySections",
                        format!("Section {}: {}", i + 1, field.message),
                    ));
                }
            }
        }
    }

    errors.into_result()
}

impl LessonService {
    pub fn new(store: Arc<dyn LessonStore>, api: ApiConfig) -> Self {
        Self { store, api }
    }

    pub fn store(&self) -> &Arc<dyn LessonStore> {
        &self.store
    }

    async fn require_language(&self, id: Uuid) -> Result<(), ApiError> {
        match self.store.language(id).await? {
            Some(_) => Ok(()),
            None => Err(ValidationError::single(FieldError::new("languageId", "Language not found")).into()),
        }
    }

    /// Records an activity entry; a failing write never fails the caller
    async fn notify(&self, notification: NewNotification) {
        if let Err(e) = self.store.insert_notification(&notification).await {
            warn!("Failed to record notification '{}': {}", notification.title, e);
        }
    }

    pub async fn languages(&self, include_inactive: bool) -> Result<Vec<Language>, ApiError> {
        Ok(self.store.languages(include_inactive).await?)
    }

    pub async fn set_language_active(&self, id: Uuid, is_active: Option<bool>) -> Result<Language, ApiError> {
        let is_active = is_active.ok_or_else(|| ApiError::bad_request("isActive must be a boolean"))?;
        let language = self.store.set_language_active(id, is_active).await?;
        info!(language = %language.code, "Language {}", if is_active { "activated" } else { "deactivated" });
        Ok(language)
    }

    pub async fn create_lesson(&self, mut payload: LessonPayload) -> Result<LessonRecord, ApiError> {
        validate_lesson(&mut payload)?;
        self.require_language(payload.language_id).await?;

        let lesson = self.store.insert_lesson(&payload).await?;
        info!(lesson_id = %lesson.id, "Created lesson '{}'", lesson.title);
        self.notify(NewNotification::lesson(LessonAction::Created, &lesson.title)).await;
        Ok(lesson)
    }

    pub async fn update_lesson(&self, id: Uuid, mut payload: LessonPayload) -> Result<LessonRecord, ApiError> {
        validate_lesson(&mut payload)?;
        self.require_language(payload.language_id).await?;

        let lesson = self.store.replace_lesson(id, &payload).await?;
        info!(lesson_id = %lesson.id, "Updated lesson '{}' ({} sections)", lesson.title, lesson.sections.len());
        self.notify(NewNotification::lesson(LessonAction::Updated, &lesson.title)).await;
        Ok(lesson)
    }

    pub async fn lesson(&self, id: Uuid) -> Result<LessonRecord, ApiError> {
        self.store
            .lesson(id)
            .await?
            .ok_or_else(|| ApiError::not_found("Lesson not found"))
    }

    pub async fn list_lessons(&self) -> Result<Vec<LessonRecord>, ApiError> {
        let (lessons, _) = self.store.find_lessons(&LessonQuery::default()).await?;
        Ok(lessons)
    }

    pub async fn search_lessons(&self, search: LessonSearch) -> Result<LessonPage, ApiError> {
        let page = PageRequest::new(
            search.page,
            search.limit,
            self.api.default_page_size,
            self.api.max_page_size,
        );
        let query = LessonQuery {
            text: search.text,
            year: search.year,
            quarter: search.quarter,
            language_id: search.language_id,
            offset: page.offset,
            limit: Some(page.limit),
        };

        let (lessons, total) = self.store.find_lessons(&query).await?;
        Ok(LessonPage {
            lessons: lessons.iter().map(LessonSummary::from).collect(),
            pagination: page.info(total),
        })
    }

    pub async fn lessons_by_quarter(&self, year: i32, quarter: Quarter) -> Result<Vec<LessonRecord>, ApiError> {
        let query = LessonQuery {
            year: Some(year),
            quarter: Some(quarter),
            ..Default::default()
        };
        let (lessons, _) = self.store.find_lessons(&query).await?;
        Ok(lessons)
    }

    pub async fn lesson_years(&self) -> Result<Vec<i32>, ApiError> {
        Ok(self.store.lesson_years().await?)
    }

    pub async fn delete_lesson(&self, id: Uuid) -> Result<DeleteOutcome, ApiError> {
        let lesson = self.lesson(id).await?;
        self.store.delete_lessons(&[id]).await?;

        info!(lesson_id = %id, "Deleted lesson '{}'", lesson.title);
        self.notify(NewNotification::lesson(LessonAction::Deleted, &lesson.title)).await;
        Ok(DeleteOutcome {
            message: "Lesson deleted successfully".to_string(),
            deleted_ids: vec![id],
        })
    }

    pub async fn delete_lessons(&self, ids: Vec<Uuid>) -> Result<DeleteOutcome, ApiError> {
        if ids.is_empty() {
            return Err(ApiError::bad_request("Missing or invalid lesson IDs"));
        }
        let removed = self.store.delete_lessons(&ids).await?;

        info!("Bulk delete removed {} of {} requested lesson(s)", removed.len(), ids.len());
        if !removed.is_empty() {
            self.notify(NewNotification::lessons_deleted(removed.len())).await;
        }
        Ok(DeleteOutcome {
            message: format!("{} lesson(s) deleted successfully", removed.len()),
            deleted_ids: removed,
        })
    }

    /// Appends one section; order is the lesson's current section count
    pub async fn add_section(&self, lesson_id: Uuid, section: NewSection) -> Result<SectionRecord, ApiError> {
        let day = check_section(&section.day, &section.content, &section.bible_texts)?;
        let payload = SectionPayload {
            day: day.to_string(),
            content: section.content,
            bible_texts: section.bible_texts,
            order: 0,
        };
        Ok(self.store.append_section(lesson_id, &payload).await?)
    }

    pub async fn notifications(&self) -> Result<Vec<Notification>, ApiError> {
        Ok(self.store.recent_notifications(self.api.notification_feed_limit).await?)
    }

    pub async fn post_notification(&self, notification: NewNotification) -> Result<Notification, ApiError> {
        let mut errors = ValidationError::default();
        if notification.title.trim().is_empty() {
            errors.push(FieldError::required("title"));
        }
        if notification.message.trim().is_empty() {
            errors.push(FieldError::required("message"));
        }
        errors.into_result()?;

        Ok(self.store.insert_notification(&notification).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::database::MemoryStore;
    use crate::models::language::ENGLISH_ID;
    use crate::types::NotificationKind;

    fn service() -> LessonService {
        LessonService::new(Arc::new(MemoryStore::new()), AppConfig::development().api)
    }

    fn payload() -> LessonPayload {
        LessonPayload {
            title: "Covenant".into(),
            description: None,
            content: "<p>Promise</p>".into(),
            introduction: None,
            year: 2026,
            quarter: Quarter::Q1,
            keywords: Some("promise".into()),
            language_id: ENGLISH_ID,
            is_published: Some(true),
            order: Some(1),
            daily_sections: vec![SectionPayload {
                day: "Sunday".into(),
                content: "Noah".into(),
                bible_texts: "Gen 9".into(),
                order: 0,
            }],
        }
    }

    #[test]
    fn validation_names_every_bad_field() {
        let mut bad = payload();
        bad.title = " ".into();
        bad.year = 2019;
        bad.daily_sections[0].bible_texts.clear();

        let err = validate_lesson(&mut bad).unwrap_err();
        assert_eq!(err.fields(), vec!["title", "year", "dailySections"]);
    }

    #[tokio::test]
    async fn unknown_language_is_rejected() {
        let mut bad = payload();
        bad.language_id = Uuid::new_v4();
        let err = service().create_lesson(bad).await.unwrap_err();
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.message(), "Validation failed: Language not found");
    }

    #[tokio::test]
    async fn create_and_delete_emit_notifications() {
        let service = service();
        let lesson = service.create_lesson(payload()).await.unwrap();
        service.delete_lesson(lesson.id).await.unwrap();

        let feed = service.notifications().await.unwrap();
        assert_eq!(feed.len(), 2);
        assert_eq!(feed[0].title, "Lesson Deleted");
        assert_eq!(feed[0].kind, NotificationKind::Warning);
        assert_eq!(feed[1].message, "Lesson \"Covenant\" has been created");
    }

    #[tokio::test]
    async fn bulk_delete_requires_ids() {
        let err = service().delete_lessons(vec![]).await.unwrap_err();
        assert_eq!(err.status_code(), 400);
    }

    #[tokio::test]
    async fn bulk_delete_reports_only_existing_lessons() {
        let service = service();
        let lesson = service.create_lesson(payload()).await.unwrap();

        let outcome = service.delete_lessons(vec![lesson.id, Uuid::new_v4()]).await.unwrap();
        assert_eq!(outcome.deleted_ids, vec![lesson.id]);
        assert_eq!(outcome.message, "1 lesson(s) deleted successfully");

        let feed = service.notifications().await.unwrap();
        assert_eq!(feed[0].message, "1 lesson(s) have been deleted");

        let outcome = service.delete_lessons(vec![Uuid::new_v4()]).await.unwrap();
        assert!(outcome.deleted_ids.is_empty());
        assert_eq!(service.notifications().await.unwrap().len(), feed.len());
    }

    #[test]
    fn validation_canonicalizes_section_days() {
        let mut lesson = payload();
        lesson.daily_sections[0].day = " friday ".into();
        validate_lesson(&mut lesson).unwrap();
        assert_eq!(lesson.daily_sections[0].day, "Friday");

        lesson.daily_sections[0].day = "Someday".into();
        let err = validate_lesson(&mut lesson).unwrap_err();
        assert_eq!(err.fields(), vec!["dailySections"]);
    }

    #[tokio::test]
    async fn search_pages_through_matches() {
        let service = service();
        for i in 0..12 {
            let mut p = payload();
            p.title = format!("Covenant {}", i);
            service.create_lesson(p).await.unwrap();
        }

        let page = service
            .search_lessons(LessonSearch {
                text: Some("COVENANT".into()),
                page: Some(2),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(page.lessons.len(), 2);
        assert_eq!(page.pagination.total_count, 12);
        assert_eq!(page.pagination.total_pages, 2);
        assert!(!page.pagination.has_next_page);
        assert!(page.pagination.has_prev_page);
    }

    #[tokio::test]
    async fn add_section_validates_day() {
        let service = service();
        let lesson = service.create_lesson(payload()).await.unwrap();
        let bad = NewSection {
            day: "Someday".into(),
            content: "x".into(),
            bible_texts: "y".into(),
        };
        assert!(service.add_section(lesson.id, bad).await.is_err());

        let good = NewSection {
            day: "monday".into(),
            content: "Shem".into(),
            bible_texts: "Gen 10".into(),
        };
        let section = service.add_section(lesson.id, good).await.unwrap();
        assert_eq!(section.day, "Monday");
        assert_eq!(section.order, 1);
    }
}
