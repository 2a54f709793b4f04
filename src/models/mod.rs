pub mod language;
pub mod lesson;
pub mod notification;
pub mod section;

pub use language::{Language, LanguageToggle};
pub use lesson::{DeleteOutcome, LanguageRef, LessonPayload, LessonQuery, LessonRecord, LessonSummary, YEAR_MAX, YEAR_MIN};
pub use notification::{LessonAction, NewNotification, Notification};
pub use section::{NewFlatSection, NewSection, SectionPayload, SectionRecord};
