// handlers/mod.rs - HTTP handlers for the lesson gateway
//
// Every handler takes the shared AppState, delegates to LessonService and
// answers with the {success, data} envelope or an ApiError body.

pub mod languages;
pub mod lessons;
pub mod notifications;
pub mod sections;
pub mod system;

use uuid::Uuid;

use crate::error::ApiError;

/// Parses a path id, answering 400 for malformed values
pub(crate) fn parse_id(raw: &str, what: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw.trim()).map_err(|_| ApiError::bad_request(format!("Invalid {} ID '{}'", what, raw)))
}

/// Lenient boolean query flag: `true`, `1` and `yes` are set
pub(crate) fn query_flag(raw: Option<&str>) -> bool {
    matches!(
        raw.map(|s| s.trim().to_ascii_lowercase()).as_deref(),
        Some("true") | Some("1") | Some("yes")
    )
}

/// Treats absent and blank query values alike
pub(crate) fn non_blank(raw: Option<String>) -> Option<String> {
    raw.filter(|s| !s.trim().is_empty())
}
