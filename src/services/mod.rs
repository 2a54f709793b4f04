pub mod lesson_service;

pub use lesson_service::{validate_lesson, LessonSearch, LessonService};
