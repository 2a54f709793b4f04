use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder, Transaction};
use std::collections::HashMap;
use tracing::debug;
use uuid::Uuid;

use super::manager::DatabaseManager;
use super::store::{LessonStore, StoreError};
use crate::models::{
    Language, LanguageRef, LessonPayload, LessonQuery, LessonRecord, NewNotification, Notification, SectionPayload,
    SectionRecord,
};

const LESSON_SELECT: &str = "SELECT l.id, l.title, l.description, l.content, l.introduction, l.year, l.quarter, \
     l.keywords, l.language_id, l.is_published, l.lesson_order, l.created_at, l.updated_at, \
     lang.name AS language_name, lang.code AS language_code \
     FROM lessons l LEFT JOIN languages lang ON lang.id = l.language_id";

#[derive(FromRow)]
struct LanguageRow {
    id: Uuid,
    name: String,
    code: String,
    flag: Option<String>,
    is_active: bool,
}

impl From<LanguageRow> for Language {
    fn from(row: LanguageRow) -> Self {
        Language {
            id: row.id,
            name: row.name,
            code: row.code,
            flag: row.flag,
            is_active: row.is_active,
        }
    }
}

#[derive(FromRow)]
struct LessonRow {
    id: Uuid,
    title: String,
    description: Option<String>,
    content: String,
    introduction: Option<String>,
    year: i32,
    quarter: String,
    keywords: Option<String>,
    language_id: Uuid,
    is_published: bool,
    lesson_order: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    language_name: Option<String>,
    language_code: Option<String>,
}

impl LessonRow {
    fn into_record(self, sections: Vec<SectionRecord>) -> LessonRecord {
        let language = match (self.language_name, self.language_code) {
            (Some(name), Some(code)) => Some(LanguageRef {
                id: self.language_id,
                name,
                code,
            }),
            _ => None,
        };
        LessonRecord {
            id: self.id,
            title: self.title,
            description: self.description,
            content: self.content,
            introduction: self.introduction,
            year: self.year,
            quarter: self.quarter,
            keywords: self.keywords,
            language_id: self.language_id,
            language,
            is_published: self.is_published,
            order: self.lesson_order,
            created_at: self.created_at,
            updated_at: self.updated_at,
            sections,
        }
    }
}

#[derive(FromRow)]
struct SectionRow {
    id: Uuid,
    lesson_id: Uuid,
    day: String,
    content: String,
    bible_texts: String,
    section_order: i32,
}

impl From<SectionRow> for SectionRecord {
    fn from(row: SectionRow) -> Self {
        SectionRecord {
            id: Some(row.id),
            day: row.day,
            content: row.content,
            bible_texts: row.bible_texts,
            order: row.section_order,
        }
    }
}

#[derive(FromRow)]
struct NotificationRow {
    id: Uuid,
    title: String,
    message: String,
    kind: String,
    read: bool,
    created_at: DateTime<Utc>,
}

impl From<NotificationRow> for Notification {
    fn from(row: NotificationRow) -> Self {
        Notification {
            id: row.id,
            title: row.title,
            message: row.message,
            kind: row.kind.parse().unwrap_or_default(),
            read: row.read,
            created_at: row.created_at,
        }
    }
}

/// Escapes LIKE wildcards so the search term matches literally
fn like_pattern(needle: &str) -> String {
    let escaped = needle.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_");
    format!("%{}%", escaped)
}

fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, query: &LessonQuery) {
    qb.push(" WHERE TRUE");
    if let Some(year) = query.year {
        qb.push(" AND l.year = ").push_bind(year);
    }
    if let Some(quarter) = query.quarter {
        qb.push(" AND l.quarter = ").push_bind(quarter.as_str());
    }
    if let Some(language_id) = query.language_id {
        qb.push(" AND l.language_id = ").push_bind(language_id);
    }
    if let Some(needle) = query.needle() {
        let pattern = like_pattern(&needle);
        qb.push(" AND (l.title ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR l.content ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR l.description ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR l.keywords ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}

async fn insert_sections(
    tx: &mut Transaction<'_, Postgres>,
    lesson_id: Uuid,
    sections: &[SectionPayload],
) -> Result<(), StoreError> {
    for (position, section) in sections.iter().enumerate() {
        sqlx::query(
            "INSERT INTO sections (id, lesson_id, day, content, bible_texts, section_order) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(Uuid::new_v4())
        .bind(lesson_id)
        .bind(section.day.as_str())
        .bind(&section.content)
        .bind(&section.bible_texts)
        .bind(position as i32)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}

/// Postgres-backed lesson store
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(manager: &DatabaseManager) -> Self {
        Self {
            pool: manager.pool().clone(),
        }
    }

    /// Loads sections for the given lessons, grouped by lesson and ordered
    async fn sections_for(&self, lesson_ids: &[Uuid]) -> Result<HashMap<Uuid, Vec<SectionRecord>>, StoreError> {
        if lesson_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let rows: Vec<SectionRow> = sqlx::query_as(
            "SELECT id, lesson_id, day, content, bible_texts, section_order FROM sections \
             WHERE lesson_id = ANY($1) ORDER BY lesson_id, section_order, created_at",
        )
        .bind(lesson_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut grouped: HashMap<Uuid, Vec<SectionRecord>> = HashMap::new();
        for row in rows {
            grouped.entry(row.lesson_id).or_default().push(row.into());
        }
        Ok(grouped)
    }

    async fn with_sections(&self, rows: Vec<LessonRow>) -> Result<Vec<LessonRecord>, StoreError> {
        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
        let mut sections = self.sections_for(&ids).await?;
        Ok(rows
            .into_iter()
            .map(|row| {
                let own = sections.remove(&row.id).unwrap_or_default();
                row.into_record(own)
            })
            .collect())
    }

    async fn require_lesson(&self, id: Uuid) -> Result<LessonRecord, StoreError> {
        self.lesson(id).await?.ok_or(StoreError::NotFound("Lesson"))
    }
}

#[async_trait]
impl LessonStore for PgStore {
    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn languages(&self, include_inactive: bool) -> Result<Vec<Language>, StoreError> {
        let rows: Vec<LanguageRow> = sqlx::query_as(
            "SELECT id, name, code, flag, is_active FROM languages WHERE is_active OR $1 ORDER BY name",
        )
        .bind(include_inactive)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Language::from).collect())
    }

    async fn language(&self, id: Uuid) -> Result<Option<Language>, StoreError> {
        let row: Option<LanguageRow> =
            sqlx::query_as("SELECT id, name, code, flag, is_active FROM languages WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(Language::from))
    }

    async fn set_language_active(&self, id: Uuid, is_active: bool) -> Result<Language, StoreError> {
        let row: Option<LanguageRow> = sqlx::query_as(
            "UPDATE languages SET is_active = $2, updated_at = now() WHERE id = $1 \
             RETURNING id, name, code, flag, is_active",
        )
        .bind(id)
        .bind(is_active)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Language::from).ok_or(StoreError::NotFound("Language"))
    }

    async fn insert_lesson(&self, lesson: &LessonPayload) -> Result<LessonRecord, StoreError> {
        let id = Uuid::new_v4();
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO lessons (id, title, description, content, introduction, year, quarter, keywords, \
             language_id, is_published, lesson_order) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
        )
        .bind(id)
        .bind(&lesson.title)
        .bind(&lesson.description)
        .bind(&lesson.content)
        .bind(&lesson.introduction)
        .bind(lesson.year)
        .bind(lesson.quarter.as_str())
        .bind(&lesson.keywords)
        .bind(lesson.language_id)
        .bind(lesson.is_published.unwrap_or(false))
        .bind(lesson.order.unwrap_or(0))
        .execute(&mut *tx)
        .await?;

        insert_sections(&mut tx, id, &lesson.daily_sections).await?;
        tx.commit().await?;

        debug!(lesson_id = %id, "Inserted lesson with {} section(s)", lesson.daily_sections.len());
        self.require_lesson(id).await
    }

    async fn replace_lesson(&self, id: Uuid, lesson: &LessonPayload) -> Result<LessonRecord, StoreError> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(
            "UPDATE lessons SET title = $2, description = $3, content = $4, introduction = $5, year = $6, \
             quarter = $7, keywords = $8, language_id = $9, is_published = COALESCE($10, is_published), \
             lesson_order = COALESCE($11, lesson_order), updated_at = now() WHERE id = $1",
        )
        .bind(id)
        .bind(&lesson.title)
        .bind(&lesson.description)
        .bind(&lesson.content)
        .bind(&lesson.introduction)
        .bind(lesson.year)
        .bind(lesson.quarter.as_str())
        .bind(&lesson.keywords)
        .bind(lesson.language_id)
        .bind(lesson.is_published)
        .bind(lesson.order)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            return Err(StoreError::NotFound("Lesson"));
        }

        sqlx::query("DELETE FROM sections WHERE lesson_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        insert_sections(&mut tx, id, &lesson.daily_sections).await?;
        tx.commit().await?;

        self.require_lesson(id).await
    }

    async fn lesson(&self, id: Uuid) -> Result<Option<LessonRecord>, StoreError> {
        let row: Option<LessonRow> = sqlx::query_as(&format!("{} WHERE l.id = $1", LESSON_SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        match row {
            Some(row) => Ok(self.with_sections(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn find_lessons(&self, query: &LessonQuery) -> Result<(Vec<LessonRecord>, i64), StoreError> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM lessons l");
        push_filters(&mut count, query);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut select = QueryBuilder::<Postgres>::new(LESSON_SELECT);
        push_filters(&mut select, query);
        select.push(" ORDER BY l.created_at DESC, l.id");
        if let Some(limit) = query.limit {
            select.push(" LIMIT ").push_bind(limit);
        }
        if query.offset > 0 {
            select.push(" OFFSET ").push_bind(query.offset);
        }
        let rows: Vec<LessonRow> = select.build_query_as().fetch_all(&self.pool).await?;

        Ok((self.with_sections(rows).await?, total))
    }

    async fn lesson_years(&self) -> Result<Vec<i32>, StoreError> {
        let years = sqlx::query_scalar("SELECT DISTINCT year FROM lessons ORDER BY year DESC")
            .fetch_all(&self.pool)
            .await?;
        Ok(years)
    }

    async fn delete_lessons(&self, ids: &[Uuid]) -> Result<Vec<Uuid>, StoreError> {
        let removed = sqlx::query_scalar("DELETE FROM lessons WHERE id = ANY($1) RETURNING id")
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;
        Ok(removed)
    }

    async fn append_section(&self, lesson_id: Uuid, section: &SectionPayload) -> Result<SectionRecord, StoreError> {
        let mut tx = self.pool.begin().await?;

        // Row lock serializes concurrent appends to the same lesson
        let locked: Option<Uuid> = sqlx::query_scalar("SELECT id FROM lessons WHERE id = $1 FOR UPDATE")
            .bind(lesson_id)
            .fetch_optional(&mut *tx)
            .await?;
        if locked.is_none() {
            return Err(StoreError::NotFound("Lesson"));
        }

        let next: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sections WHERE lesson_id = $1")
            .bind(lesson_id)
            .fetch_one(&mut *tx)
            .await?;

        let row: SectionRow = sqlx::query_as(
            "INSERT INTO sections (id, lesson_id, day, content, bible_texts, section_order) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING id, lesson_id, day, content, bible_texts, section_order",
        )
        .bind(Uuid::new_v4())
        .bind(lesson_id)
        .bind(section.day.as_str())
        .bind(&section.content)
        .bind(&section.bible_texts)
        .bind(next as i32)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("UPDATE lessons SET updated_at = now() WHERE id = $1")
            .bind(lesson_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        Ok(row.into())
    }

    async fn recent_notifications(&self, limit: i64) -> Result<Vec<Notification>, StoreError> {
        let rows: Vec<NotificationRow> = sqlx::query_as(
            "SELECT id, title, message, kind, read, created_at FROM notifications \
             ORDER BY created_at DESC LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Notification::from).collect())
    }

    async fn insert_notification(&self, notification: &NewNotification) -> Result<Notification, StoreError> {
        let row: NotificationRow = sqlx::query_as(
            "INSERT INTO notifications (id, title, message, kind) VALUES ($1, $2, $3, $4) \
             RETURNING id, title, message, kind, read, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(&notification.title)
        .bind(&notification.message)
        .bind(notification.kind.as_str())
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Quarter;

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
    }

    #[test]
    fn filters_bind_every_value() {
        let query = LessonQuery {
            text: Some("Grace".into()),
            year: Some(2025),
            quarter: Some(Quarter::Q2),
            ..Default::default()
        };
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM lessons l");
        push_filters(&mut qb, &query);
        let sql = qb.sql();
        assert!(sql.contains("l.year = $1"));
        assert!(sql.contains("l.quarter = $2"));
        assert!(sql.contains("l.keywords ILIKE $6"));
        assert!(!sql.contains("Grace"));
    }
}
