use chrono::Datelike;
use std::fmt;
use tracing::{info, warn};
use uuid::Uuid;

use super::error::{FieldError, FormError, ValidationError};
use super::section_editor::SectionEditor;
use crate::gateway::{LanguageSource, PersistenceGateway};
use crate::models::lesson::year_in_range;
use crate::models::{Language, LessonPayload, LessonRecord, YEAR_MAX, YEAR_MIN};
use crate::types::Quarter;

/// Lifecycle of one editing session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormState {
    Uninitialized,
    Editing,
    /// A gateway call is in flight; the only state that performs network I/O
    Submitting,
    /// Terminal for this controller
    Submitted,
}

impl fmt::Display for FormState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FormState::Uninitialized => "uninitialized",
            FormState::Editing => "editing",
            FormState::Submitting => "submitting",
            FormState::Submitted => "submitted",
        };
        f.write_str(name)
    }
}

/// Lesson-level metadata held by the form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LessonFields {
    pub title: String,
    pub description: String,
    pub content: String,
    pub introduction: String,
    pub year: i32,
    pub quarter: Option<Quarter>,
    /// Stored quarter text that is not Q1-Q4; cleared once a quarter is set
    pub unrecognised_quarter: Option<String>,
    pub keywords: String,
    pub language_id: Option<Uuid>,
    pub is_published: bool,
    pub order: i32,
}

impl LessonFields {
    fn new_lesson() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            content: String::new(),
            introduction: String::new(),
            year: chrono::Local::now().year(),
            quarter: None,
            unrecognised_quarter: None,
            keywords: String::new(),
            language_id: None,
            is_published: false,
            order: 0,
        }
    }

    fn from_record(lesson: &LessonRecord) -> Self {
        let (quarter, unrecognised_quarter) = match lesson.quarter.parse::<Quarter>() {
            Ok(q) => (Some(q), None),
            Err(_) => {
                warn!(lesson_id = %lesson.id, "Stored quarter '{}' not recognised, leaving unset", lesson.quarter);
                let label = lesson.quarter.trim();
                (None, (!label.is_empty()).then(|| label.to_string()))
            }
        };
        Self {
            title: lesson.title.clone(),
            description: lesson.description.clone().unwrap_or_default(),
            content: lesson.content.clone(),
            introduction: lesson.introduction.clone().unwrap_or_default(),
            year: lesson.year,
            quarter,
            unrecognised_quarter,
            keywords: lesson.keywords.clone().unwrap_or_default(),
            language_id: Some(lesson.language_id),
            is_published: lesson.is_published,
            order: lesson.order,
        }
    }
}

/// One metadata field update
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LessonField {
    Title(String),
    Description(String),
    Content(String),
    Introduction(String),
    Year(i32),
    Quarter(Option<Quarter>),
    Keywords(String),
    LanguageId(Uuid),
    IsPublished(bool),
    Order(i32),
}

impl LessonField {
    pub fn name(&self) -> &'static str {
        match self {
            LessonField::Title(_) => "title",
            LessonField::Description(_) => "description",
            LessonField::Content(_) => "content",
            LessonField::Introduction(_) => "introduction",
            LessonField::Year(_) => "year",
            LessonField::Quarter(_) => "quarter",
            LessonField::Keywords(_) => "keywords",
            LessonField::LanguageId(_) => "languageId",
            LessonField::IsPublished(_) => "isPublished",
            LessonField::Order(_) => "order",
        }
    }

    /// Builds a field update from a `name` / text `value` pair
    pub fn parse(name: &str, value: &str) -> Result<Self, ValidationError> {
        let invalid = |field: &'static str, msg: String| ValidationError::single(FieldError::new(field, msg));

        let field = match name {
            "title" => LessonField::Title(value.to_string()),
            "description" => LessonField::Description(value.to_string()),
            "content" => LessonField::Content(value.to_string()),
            "introduction" => LessonField::Introduction(value.to_string()),
            "keywords" => LessonField::Keywords(value.to_string()),
            "year" => LessonField::Year(
                value
                    .trim()
                    .parse()
                    .map_err(|_| invalid("year", format!("Year must be a number, got '{}'", value)))?,
            ),
            "quarter" if value.trim().is_empty() => LessonField::Quarter(None),
            "quarter" => LessonField::Quarter(Some(value.parse().map_err(|msg| invalid("quarter", msg))?)),
            "languageId" | "language_id" | "language" => LessonField::LanguageId(
                Uuid::parse_str(value.trim())
                    .map_err(|_| invalid("languageId", format!("Invalid language id '{}'", value)))?,
            ),
            "isPublished" | "is_published" | "published" => LessonField::IsPublished(
                value
                    .trim()
                    .parse()
                    .map_err(|_| invalid("isPublished", format!("Expected true or false, got '{}'", value)))?,
            ),
            "order" => LessonField::Order(
                value
                    .trim()
                    .parse()
                    .map_err(|_| invalid("order", format!("Order must be a number, got '{}'", value)))?,
            ),
            other => return Err(invalid("field", format!("Unknown lesson field '{}'", other))),
        };
        Ok(field)
    }
}

/// Controller for one lesson editing session.
///
/// Owns the lesson metadata and the section editor, and hands the assembled
/// payload to the gateway on submit. Every mutating operation requires the
/// `editing` state.
pub struct LessonForm<G> {
    gateway: G,
    state: FormState,
    lesson_id: Option<Uuid>,
    fields: LessonFields,
    languages: Vec<Language>,
    sections: SectionEditor,
    last_error: Option<String>,
}

impl<G: PersistenceGateway> LessonForm<G> {
    pub fn new(gateway: G) -> Self {
        Self {
            gateway,
            state: FormState::Uninitialized,
            lesson_id: None,
            fields: LessonFields::new_lesson(),
            languages: Vec::new(),
            sections: SectionEditor::new(),
            last_error: None,
        }
    }

    pub fn state(&self) -> FormState {
        self.state
    }

    pub fn lesson_id(&self) -> Option<Uuid> {
        self.lesson_id
    }

    pub fn fields(&self) -> &LessonFields {
        &self.fields
    }

    pub fn languages(&self) -> &[Language] {
        &self.languages
    }

    pub fn sections(&self) -> &SectionEditor {
        &self.sections
    }

    /// Last gateway error message, kept until dismissed or a later success
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn dismiss_error(&mut self) {
        self.last_error = None;
    }

    /// Populates the form for a new lesson (`None`) or an existing one and
    /// loads the language list, falling back to the built-in set when the
    /// source fails or returns nothing.
    pub async fn initialize(
        &mut self,
        existing: Option<LessonRecord>,
        languages: &dyn LanguageSource,
    ) -> Result<(), FormError> {
        self.require_state("initialize", FormState::Uninitialized)?;
        let languages = Self::load_languages(languages).await;
        self.populate(existing, languages);
        Ok(())
    }

    /// Fetches a stored lesson by id and initializes the form with it. The
    /// lesson and the language list are requested concurrently.
    pub async fn initialize_from_gateway(
        &mut self,
        id: Uuid,
        languages: &dyn LanguageSource,
    ) -> Result<(), FormError> {
        self.require_state("initialize", FormState::Uninitialized)?;
        let (lesson, languages) = futures::join!(self.gateway.fetch_lesson(id), Self::load_languages(languages));
        self.populate(Some(lesson?), languages);
        Ok(())
    }

    async fn load_languages(source: &dyn LanguageSource) -> Vec<Language> {
        match source.active_languages().await {
            Ok(list) if !list.is_empty() => list,
            Ok(_) => {
                warn!("No active languages returned, using built-in defaults");
                Language::defaults()
            }
            Err(e) => {
                warn!("Failed to fetch languages, using built-in defaults: {}", e);
                Language::defaults()
            }
        }
    }

    fn populate(&mut self, existing: Option<LessonRecord>, languages: Vec<Language>) {
        self.languages = languages;

        match existing {
            Some(lesson) => {
                self.fields = LessonFields::from_record(&lesson);
                self.lesson_id = Some(lesson.id);
                let dropped = self.sections.load_existing(lesson.sections);
                if dropped > 0 {
                    warn!(lesson_id = %lesson.id, "Ignored {} incomplete stored section(s)", dropped);
                }
            }
            None => {
                self.fields = LessonFields::new_lesson();
                self.lesson_id = None;
                self.sections = SectionEditor::new();
            }
        }

        self.state = FormState::Editing;
    }

    /// Applies one field update. Values violating the field constraints are
    /// rejected and leave the form unchanged.
    pub fn set_field(&mut self, field: LessonField) -> Result<(), FormError> {
        self.require_state("set_field", FormState::Editing)?;

        match field {
            LessonField::Title(title) => {
                if title.trim().is_empty() {
                    return Err(ValidationError::single(FieldError::new("title", "Title is required")).into());
                }
                self.fields.title = title;
            }
            LessonField::Year(year) => {
                if !year_in_range(year) {
                    return Err(ValidationError::single(year_error(year)).into());
                }
                self.fields.year = year;
            }
            LessonField::LanguageId(id) => {
                if !self.has_language(id) {
                    return Err(ValidationError::single(FieldError::new(
                        "languageId",
                        "Selected language is not available",
                    ))
                    .into());
                }
                self.fields.language_id = Some(id);
            }
            LessonField::Order(order) => {
                if order < 0 {
                    return Err(
                        ValidationError::single(FieldError::new("order", "Order must not be negative")).into(),
                    );
                }
                self.fields.order = order;
            }
            LessonField::Description(v) => self.fields.description = v,
            LessonField::Content(v) => self.fields.content = v,
            LessonField::Introduction(v) => self.fields.introduction = v,
            LessonField::Quarter(v) => {
                self.fields.quarter = v;
                self.fields.unrecognised_quarter = None;
            }
            LessonField::Keywords(v) => self.fields.keywords = v,
            LessonField::IsPublished(v) => self.fields.is_published = v,
        }
        Ok(())
    }

    /// Mutable access to the section editor while editing
    pub fn sections_mut(&mut self) -> Result<&mut SectionEditor, FormError> {
        self.require_state("edit sections", FormState::Editing)?;
        Ok(&mut self.sections)
    }

    /// Validates every required field and assembles the submission payload
    pub fn payload(&self) -> Result<LessonPayload, ValidationError> {
        let f = &self.fields;
        let mut errors = ValidationError::default();

        if f.title.trim().is_empty() {
            errors.push(FieldError::new("title", "Title is required"));
        }
        if f.content.trim().is_empty() {
            errors.push(FieldError::new("content", "Content is required"));
        }
        if !year_in_range(f.year) {
            errors.push(year_error(f.year));
        }
        if f.quarter.is_none() {
            let message = match &f.unrecognised_quarter {
                Some(label) => format!("Quarter is required (stored value '{}' is not Q1-Q4)", label),
                None => "Quarter is required".to_string(),
            };
            errors.push(FieldError::new("quarter", message));
        }
        match f.language_id {
            None => errors.push(FieldError::new("languageId", "Language is required")),
            Some(id) if !self.has_language(id) => {
                errors.push(FieldError::new("languageId", "Selected language is not available"))
            }
            Some(_) => {}
        }
        errors.into_result()?;

        let optional = |s: &str| if s.trim().is_empty() { None } else { Some(s.to_string()) };

        Ok(LessonPayload {
            title: f.title.clone(),
            description: optional(&f.description),
            content: f.content.clone(),
            introduction: optional(&f.introduction),
            year: f.year,
            quarter: f.quarter.unwrap_or(Quarter::Q1),
            keywords: optional(&f.keywords),
            language_id: f.language_id.unwrap_or_default(),
            is_published: Some(f.is_published),
            order: Some(f.order),
            daily_sections: self.sections.to_payload(),
        })
    }

    /// Validates, then creates or updates through the gateway.
    ///
    /// On success the form becomes `submitted` and the stored lesson is
    /// returned. On gateway failure the form returns to `editing` with every
    /// value intact and the server message recorded in `last_error`.
    pub async fn submit(&mut self) -> Result<LessonRecord, FormError> {
        self.require_state("submit", FormState::Editing)?;

        let payload = self.payload()?;

        self.state = FormState::Submitting;
        let result = match self.lesson_id {
            Some(id) => self.gateway.update_lesson(id, &payload).await,
            None => self.gateway.create_lesson(&payload).await,
        };

        match result {
            Ok(stored) => {
                info!(lesson_id = %stored.id, "Lesson '{}' saved with {} section(s)", stored.title, stored.sections.len());
                self.state = FormState::Submitted;
                self.last_error = None;
                Ok(stored)
            }
            Err(e) => {
                warn!("Lesson submission failed: {}", e);
                self.state = FormState::Editing;
                self.last_error = Some(e.to_string());
                Err(e.into())
            }
        }
    }

    fn has_language(&self, id: Uuid) -> bool {
        self.languages.iter().any(|l| l.id == id)
    }

    fn require_state(&self, operation: &'static str, wanted: FormState) -> Result<(), FormError> {
        if self.state == wanted {
            Ok(())
        } else {
            Err(FormError::InvalidState {
                operation,
                state: self.state,
            })
        }
    }
}

fn year_error(year: i32) -> FieldError {
    FieldError::new(
        "year",
        format!("Year must be between {} and {}, got {}", YEAR_MIN, YEAR_MAX, year),
    )
}
