//! Lesson editing session: the section editor and the lesson form controller

pub mod error;
pub mod lesson_form;
pub mod section_editor;

pub use error::{EditorError, FieldError, FormError, ValidationError};
pub use lesson_form::{FormState, LessonField, LessonFields, LessonForm};
pub use section_editor::{DraftField, Section, SectionDraft, SectionEditor};
