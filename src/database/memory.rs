use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use super::store::{LessonStore, StoreError};
use crate::models::{
    Language, LanguageRef, LessonPayload, LessonQuery, LessonRecord, NewNotification, Notification, SectionPayload,
    SectionRecord,
};

#[derive(Default)]
struct Tables {
    languages: Vec<Language>,
    /// Insertion order; reads walk it backwards for newest first
    lessons: Vec<LessonRecord>,
    notifications: Vec<Notification>,
}

/// In-process store for tests and running without a database
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Store seeded with the built-in language set
    pub fn new() -> Self {
        Self::with_languages(Language::defaults())
    }

    pub fn with_languages(mut languages: Vec<Language>) -> Self {
        languages.sort_by(|a, b| a.name.cmp(&b.name));
        Self {
            tables: RwLock::new(Tables {
                languages,
                ..Default::default()
            }),
        }
    }
}

fn section_records(sections: &[SectionPayload]) -> Vec<SectionRecord> {
    sections
        .iter()
        .enumerate()
        .map(|(position, s)| SectionRecord {
            id: Some(Uuid::new_v4()),
            day: s.day.clone(),
            content: s.content.clone(),
            bible_texts: s.bible_texts.clone(),
            order: position as i32,
        })
        .collect()
}

impl Tables {
    fn language_ref(&self, id: Uuid) -> Option<LanguageRef> {
        self.languages.iter().find(|l| l.id == id).map(|l| LanguageRef {
            id: l.id,
            name: l.name.clone(),
            code: l.code.clone(),
        })
    }

    /// Lesson with its language reference resolved
    fn resolved(&self, lesson: &LessonRecord) -> LessonRecord {
        let mut lesson = lesson.clone();
        lesson.language = self.language_ref(lesson.language_id);
        lesson
    }
}

#[async_trait]
impl LessonStore for MemoryStore {
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn languages(&self, include_inactive: bool) -> Result<Vec<Language>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .languages
            .iter()
            .filter(|l| include_inactive || l.is_active)
            .cloned()
            .collect())
    }

    async fn language(&self, id: Uuid) -> Result<Option<Language>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.languages.iter().find(|l| l.id == id).cloned())
    }

    async fn set_language_active(&self, id: Uuid, is_active: bool) -> Result<Language, StoreError> {
        let mut tables = self.tables.write().await;
        let language = tables
            .languages
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or(StoreError::NotFound("Language"))?;
        language.is_active = is_active;
        Ok(language.clone())
    }

    async fn insert_lesson(&self, lesson: &LessonPayload) -> Result<LessonRecord, StoreError> {
        let now = Utc::now();
        let record = LessonRecord {
            id: Uuid::new_v4(),
            title: lesson.title.clone(),
            description: lesson.description.clone(),
            content: lesson.content.clone(),
            introduction: lesson.introduction.clone(),
            year: lesson.year,
            quarter: lesson.quarter.to_string(),
            keywords: lesson.keywords.clone(),
            language_id: lesson.language_id,
            language: None,
            is_published: lesson.is_published.unwrap_or(false),
            order: lesson.order.unwrap_or(0),
            created_at: now,
            updated_at: now,
            sections: section_records(&lesson.daily_sections),
        };

        let mut tables = self.tables.write().await;
        tables.lessons.push(record.clone());
        debug!(lesson_id = %record.id, "Stored lesson in memory");
        Ok(tables.resolved(&record))
    }

    async fn replace_lesson(&self, id: Uuid, lesson: &LessonPayload) -> Result<LessonRecord, StoreError> {
        let mut tables = self.tables.write().await;
        let stored = tables
            .lessons
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or(StoreError::NotFound("Lesson"))?;

        stored.title = lesson.title.clone();
        stored.description = lesson.description.clone();
        stored.content = lesson.content.clone();
        stored.introduction = lesson.introduction.clone();
        stored.year = lesson.year;
        stored.quarter = lesson.quarter.to_string();
        stored.keywords = lesson.keywords.clone();
        stored.language_id = lesson.language_id;
        if let Some(published) = lesson.is_published {
            stored.is_published = published;
        }
        if let Some(order) = lesson.order {
            stored.order = order;
        }
        stored.sections = section_records(&lesson.daily_sections);
        stored.updated_at = Utc::now();

        let updated = stored.clone();
        Ok(tables.resolved(&updated))
    }

    async fn lesson(&self, id: Uuid) -> Result<Option<LessonRecord>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.lessons.iter().find(|l| l.id == id).map(|l| tables.resolved(l)))
    }

    async fn find_lessons(&self, query: &LessonQuery) -> Result<(Vec<LessonRecord>, i64), StoreError> {
        let tables = self.tables.read().await;
        let matching: Vec<&LessonRecord> = tables.lessons.iter().rev().filter(|l| query.matches(l)).collect();
        let total = matching.len() as i64;

        let offset = query.offset.max(0) as usize;
        let limit = query.limit.map_or(usize::MAX, |l| l.max(0) as usize);
        let page = matching
            .into_iter()
            .skip(offset)
            .take(limit)
            .map(|l| tables.resolved(l))
            .collect();
        Ok((page, total))
    }

    async fn lesson_years(&self) -> Result<Vec<i32>, StoreError> {
        let tables = self.tables.read().await;
        let mut years: Vec<i32> = tables.lessons.iter().map(|l| l.year).collect();
        years.sort_unstable_by(|a, b| b.cmp(a));
        years.dedup();
        Ok(years)
    }

    async fn delete_lessons(&self, ids: &[Uuid]) -> Result<Vec<Uuid>, StoreError> {
        let mut tables = self.tables.write().await;
        let removed: Vec<Uuid> = tables
            .lessons
            .iter()
            .map(|l| l.id)
            .filter(|id| ids.contains(id))
            .collect();
        tables.lessons.retain(|l| !removed.contains(&l.id));
        Ok(removed)
    }

    async fn append_section(&self, lesson_id: Uuid, section: &SectionPayload) -> Result<SectionRecord, StoreError> {
        let mut tables = self.tables.write().await;
        let lesson = tables
            .lessons
            .iter_mut()
            .find(|l| l.id == lesson_id)
            .ok_or(StoreError::NotFound("Lesson"))?;

        let record = SectionRecord {
            id: Some(Uuid::new_v4()),
            day: section.day.clone(),
            content: section.content.clone(),
            bible_texts: section.bible_texts.clone(),
            order: lesson.sections.len() as i32,
        };
        lesson.sections.push(record.clone());
        lesson.updated_at = Utc::now();
        Ok(record)
    }

    async fn recent_notifications(&self, limit: i64) -> Result<Vec<Notification>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .notifications
            .iter()
            .rev()
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }

    async fn insert_notification(&self, notification: &NewNotification) -> Result<Notification, StoreError> {
        let record = Notification {
            id: Uuid::new_v4(),
            title: notification.title.clone(),
            message: notification.message.clone(),
            kind: notification.kind,
            read: false,
            created_at: Utc::now(),
        };
        self.tables.write().await.notifications.push(record.clone());
        Ok(record)
    }
}
