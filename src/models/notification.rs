use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::NotificationKind;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: Uuid,
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewNotification {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub message: String,
    #[serde(rename = "type", default)]
    pub kind: NotificationKind,
}

/// What happened to a lesson, for activity feed entries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LessonAction {
    Created,
    Updated,
    Deleted,
}

impl LessonAction {
    fn verb(&self) -> &'static str {
        match self {
            LessonAction::Created => "created",
            LessonAction::Updated => "updated",
            LessonAction::Deleted => "deleted",
        }
    }
}

impl NewNotification {
    pub fn new(title: impl Into<String>, message: impl Into<String>, kind: NotificationKind) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            kind,
        }
    }

    pub fn lesson(action: LessonAction, lesson_title: &str) -> Self {
        let verb = action.verb();
        let mut title = String::from("Lesson ");
        title.push_str(&verb[..1].to_uppercase());
        title.push_str(&verb[1..]);

        let kind = match action {
            LessonAction::Deleted => NotificationKind::Warning,
            _ => NotificationKind::Success,
        };
        Self::new(title, format!("Lesson \"{}\" has been {}", lesson_title, verb), kind)
    }

    pub fn lessons_deleted(count: usize) -> Self {
        Self::new(
            "Lessons Deleted",
            format!("{} lesson(s) have been deleted", count),
            NotificationKind::Warning,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lesson_notifications_follow_action() {
        let created = NewNotification::lesson(LessonAction::Created, "Grace");
        assert_eq!(created.title, "Lesson Created");
        assert_eq!(created.message, "Lesson \"Grace\" has been created");
        assert_eq!(created.kind, NotificationKind::Success);

        let deleted = NewNotification::lesson(LessonAction::Deleted, "Grace");
        assert_eq!(deleted.kind, NotificationKind::Warning);
    }
}
