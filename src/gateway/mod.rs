//! Client side of the persistence gateway: the contract the lesson form
//! submits through, and its HTTP implementation.

pub mod http;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Language, LessonPayload, LessonRecord};

pub use http::HttpGateway;

/// Remote rejection or transport failure. The message is shown to the user as-is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// Non-2xx response; `message` is the server's `error` string verbatim
    #[error("{message}")]
    Rejected { status: u16, message: String },

    #[error("Could not reach server: {0}")]
    Transport(String),

    /// Language list could not be fetched; editors fall back to defaults
    #[error("Language list unavailable: {0}")]
    NetworkUnavailable(String),

    #[error("Unexpected response from server: {0}")]
    Decode(String),
}

impl GatewayError {
    pub fn status(&self) -> Option<u16> {
        match self {
            GatewayError::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Durable lesson storage as seen by the editor
#[async_trait]
pub trait PersistenceGateway: Send + Sync {
    async fn create_lesson(&self, payload: &LessonPayload) -> Result<LessonRecord, GatewayError>;

    async fn update_lesson(&self, id: Uuid, payload: &LessonPayload) -> Result<LessonRecord, GatewayError>;

    async fn fetch_lesson(&self, id: Uuid) -> Result<LessonRecord, GatewayError>;
}

/// Source of currently active languages
#[async_trait]
pub trait LanguageSource: Send + Sync {
    async fn active_languages(&self) -> Result<Vec<Language>, GatewayError>;
}

/// Fixed language list, used offline and in tests
#[derive(Debug, Clone, Default)]
pub struct StaticLanguages(pub Vec<Language>);

#[async_trait]
impl LanguageSource for StaticLanguages {
    async fn active_languages(&self) -> Result<Vec<Language>, GatewayError> {
        Ok(self.0.clone())
    }
}

#[async_trait]
impl<G: PersistenceGateway + ?Sized> PersistenceGateway for std::sync::Arc<G> {
    async fn create_lesson(&self, payload: &LessonPayload) -> Result<LessonRecord, GatewayError> {
        (**self).create_lesson(payload).await
    }

    async fn update_lesson(&self, id: Uuid, payload: &LessonPayload) -> Result<LessonRecord, GatewayError> {
        (**self).update_lesson(id, payload).await
    }

    async fn fetch_lesson(&self, id: Uuid) -> Result<LessonRecord, GatewayError> {
        (**self).fetch_lesson(id).await
    }
}
