use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};

use super::parse_id;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::models::{NewFlatSection, NewSection, SectionRecord};
use crate::AppState;

/// POST /api/lessons/:id/sections - Append one section to a lesson
pub async fn append(
    State(state): State<AppState>,
    Path(lesson_id): Path<String>,
    payload: Result<Json<NewSection>, JsonRejection>,
) -> ApiResult<SectionRecord> {
    let lesson_id = parse_id(&lesson_id, "lesson")?;
    let Json(section) = payload?;
    let record = state.service.add_section(lesson_id, section).await?;
    Ok(ApiResponse::created(record))
}

/// POST /api/sections - Flat form carrying its owning `lessonId`
pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<NewFlatSection>, JsonRejection>,
) -> ApiResult<SectionRecord> {
    let Json(flat) = payload?;
    let lesson_id = flat
        .lesson_id
        .ok_or_else(|| ApiError::bad_request("Missing required field: lessonId"))?;
    let record = state.service.add_section(lesson_id, flat.section).await?;
    Ok(ApiResponse::created(record))
}
