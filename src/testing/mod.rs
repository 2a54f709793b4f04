//! Test doubles and fixtures shared by unit tests

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Mutex;
use uuid::Uuid;

use crate::gateway::{GatewayError, LanguageSource, PersistenceGateway};
use crate::models::language::ENGLISH_ID;
use crate::models::{Language, LanguageRef, LessonPayload, LessonRecord, SectionRecord};

#[derive(Debug, Clone, PartialEq)]
pub enum GatewayCall {
    Create(LessonPayload),
    Update(Uuid, LessonPayload),
    Fetch(Uuid),
}

/// Gateway that records every call and answers with the stored form of the
/// payload it was given, or a queued failure.
#[derive(Default)]
pub struct RecordingGateway {
    calls: Mutex<Vec<GatewayCall>>,
    failure: Mutex<Option<GatewayError>>,
    stored: Mutex<Option<LessonRecord>>,
}

impl RecordingGateway {
    pub fn with_stored(lesson: LessonRecord) -> Self {
        let gateway = Self::default();
        *gateway.stored.lock().unwrap() = Some(lesson);
        gateway
    }

    pub fn fail_next(&self, error: GatewayError) {
        *self.failure.lock().unwrap() = Some(error);
    }

    pub fn calls(&self) -> Vec<GatewayCall> {
        self.calls.lock().unwrap().clone()
    }

    fn answer(&self, call: GatewayCall, id: Uuid, payload: &LessonPayload) -> Result<LessonRecord, GatewayError> {
        self.calls.lock().unwrap().push(call);
        if let Some(err) = self.failure.lock().unwrap().take() {
            return Err(err);
        }
        Ok(record_from_payload(id, payload))
    }
}

#[async_trait]
impl PersistenceGateway for RecordingGateway {
    async fn create_lesson(&self, payload: &LessonPayload) -> Result<LessonRecord, GatewayError> {
        self.answer(GatewayCall::Create(payload.clone()), Uuid::new_v4(), payload)
    }

    async fn update_lesson(&self, id: Uuid, payload: &LessonPayload) -> Result<LessonRecord, GatewayError> {
        self.answer(GatewayCall::Update(id, payload.clone()), id, payload)
    }

    async fn fetch_lesson(&self, id: Uuid) -> Result<LessonRecord, GatewayError> {
        self.calls.lock().unwrap().push(GatewayCall::Fetch(id));
        match self.stored.lock().unwrap().clone() {
            Some(lesson) if lesson.id == id => Ok(lesson),
            _ => Err(GatewayError::Rejected {
                status: 404,
                message: "Lesson not found".into(),
            }),
        }
    }
}

/// Language source whose fetch always fails
pub struct FailingLanguages;

#[async_trait]
impl LanguageSource for FailingLanguages {
    async fn active_languages(&self) -> Result<Vec<Language>, GatewayError> {
        Err(GatewayError::NetworkUnavailable("connection refused".into()))
    }
}

pub fn record_from_payload(id: Uuid, payload: &LessonPayload) -> LessonRecord {
    let now = Utc::now();
    LessonRecord {
        id,
        title: payload.title.clone(),
        description: payload.description.clone(),
        content: payload.content.clone(),
        introduction: payload.introduction.clone(),
        year: payload.year,
        quarter: payload.quarter.to_string(),
        keywords: payload.keywords.clone(),
        language_id: payload.language_id,
        language: None,
        is_published: payload.is_published.unwrap_or(false),
        order: payload.order.unwrap_or(0),
        created_at: now,
        updated_at: now,
        sections: payload
            .daily_sections
            .iter()
            .enumerate()
            .map(|(i, s)| SectionRecord {
                id: Some(Uuid::new_v4()),
                day: s.day.clone(),
                content: s.content.clone(),
                bible_texts: s.bible_texts.clone(),
                order: i as i32,
            })
            .collect(),
    }
}

/// Stored lesson with three sections in canonical order
pub fn sample_lesson() -> LessonRecord {
    let now = Utc::now();
    let section = |order: i32, day: &str, content: &str, texts: &str| SectionRecord {
        id: Some(Uuid::new_v4()),
        day: day.to_string(),
        content: content.to_string(),
        bible_texts: texts.to_string(),
        order,
    };
    LessonRecord {
        id: Uuid::new_v4(),
        title: "Walking in Faith".into(),
        description: Some("Third quarter study".into()),
        content: "<p>Faith that works</p>".into(),
        introduction: None,
        year: 2025,
        quarter: "Q3".into(),
        keywords: Some("faith, works".into()),
        language_id: ENGLISH_ID,
        language: Some(LanguageRef {
            id: ENGLISH_ID,
            name: "English".into(),
            code: "en".into(),
        }),
        is_published: true,
        order: 4,
        created_at: now,
        updated_at: now,
        sections: vec![
            section(0, "Sunday", "Abraham believed", "Gen 15:6"),
            section(1, "Tuesday", "Faith without works", "James 2:14-26"),
            section(2, "Friday", "Further study", "Heb 11"),
        ],
    }
}
