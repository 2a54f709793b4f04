use std::fmt;
use thiserror::Error;

use crate::gateway::GatewayError;

/// A single rejected field with a user-facing message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }

    pub fn required(field: &'static str) -> Self {
        Self::new(field, format!("{} is required", field))
    }
}

/// Local, recoverable validation failure naming every offending field
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationError {
    errors: Vec<FieldError>,
}

impl ValidationError {
    pub fn single(error: FieldError) -> Self {
        Self { errors: vec![error] }
    }

    pub fn push(&mut self, error: FieldError) {
        self.errors.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    pub fn fields(&self) -> Vec<&'static str> {
        self.errors.iter().map(|e| e.field).collect()
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }

    /// Ok when nothing was collected
    pub fn into_result(self) -> Result<(), ValidationError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<&str> = self.errors.iter().map(|e| e.message.as_str()).collect();
        write!(f, "Validation failed: {}", messages.join("; "))
    }
}

impl std::error::Error for ValidationError {}

/// Section editor errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditorError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Caller defect: the UI should never address a section that does not exist
    #[error("Section index {index} out of range for {len} section(s)")]
    IndexOutOfRange { index: usize, len: usize },
}

/// Lesson form controller errors
#[derive(Debug, Error)]
pub enum FormError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Editor(#[from] EditorError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("Operation '{operation}' not allowed while form is {state}")]
    InvalidState {
        operation: &'static str,
        state: super::FormState,
    },
}

impl FormError {
    pub fn validation(&self) -> Option<&ValidationError> {
        match self {
            FormError::Validation(v) => Some(v),
            FormError::Editor(EditorError::Validation(v)) => Some(v),
            _ => None,
        }
    }
}
