use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    Json,
};
use serde::Deserialize;
use tracing::debug;
use uuid::Uuid;

use super::{non_blank, parse_id};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::models::{DeleteOutcome, LessonPayload, LessonRecord};
use crate::pagination::LessonPage;
use crate::services::LessonSearch;
use crate::types::Quarter;
use crate::AppState;

/// Raw search query; values are parsed by hand so bad input gets a JSON 400
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    pub q: Option<String>,
    pub year: Option<String>,
    pub quarter: Option<String>,
    pub language_id: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct QuarterQuery {
    pub year: Option<String>,
    pub quarter: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct BulkDelete {
    pub ids: Option<Vec<Uuid>>,
}

fn parse_year(raw: &str) -> Result<i32, ApiError> {
    raw.trim()
        .parse()
        .map_err(|_| ApiError::bad_request("Invalid year parameter. Must be a number."))
}

fn parse_quarter(raw: &str) -> Result<Quarter, ApiError> {
    raw.parse().map_err(ApiError::bad_request)
}

fn parse_number(raw: &str, name: &str) -> Result<i64, ApiError> {
    raw.trim()
        .parse()
        .map_err(|_| ApiError::bad_request(format!("Invalid {} parameter. Must be a number.", name)))
}

impl SearchQuery {
    fn into_search(self) -> Result<LessonSearch, ApiError> {
        Ok(LessonSearch {
            text: non_blank(self.q),
            year: non_blank(self.year).as_deref().map(parse_year).transpose()?,
            quarter: non_blank(self.quarter).as_deref().map(parse_quarter).transpose()?,
            language_id: non_blank(self.language_id)
                .as_deref()
                .map(|raw| parse_id(raw, "language"))
                .transpose()?,
            page: non_blank(self.page).as_deref().map(|p| parse_number(p, "page")).transpose()?,
            limit: non_blank(self.limit).as_deref().map(|l| parse_number(l, "limit")).transpose()?,
        })
    }
}

/// POST /api/lessons - Create a lesson with its daily sections
pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<LessonPayload>, JsonRejection>,
) -> ApiResult<LessonRecord> {
    let Json(payload) = payload?;
    let lesson = state.service.create_lesson(payload).await?;
    Ok(ApiResponse::created(lesson))
}

/// GET /api/lessons/:id - Lesson with ordered sections
pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<LessonRecord> {
    let id = parse_id(&id, "lesson")?;
    Ok(ApiResponse::success(state.service.lesson(id).await?))
}

/// PUT /api/lessons/:id - Replace metadata and the whole section list
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<LessonPayload>, JsonRejection>,
) -> ApiResult<LessonRecord> {
    let id = parse_id(&id, "lesson")?;
    let Json(payload) = payload?;
    Ok(ApiResponse::success(state.service.update_lesson(id, payload).await?))
}

/// DELETE /api/lessons/:id
pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<DeleteOutcome> {
    let id = parse_id(&id, "lesson")?;
    Ok(ApiResponse::success(state.service.delete_lesson(id).await?))
}

/// GET /api/lessons/list - All lessons, newest first
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<LessonRecord>> {
    Ok(ApiResponse::success(state.service.list_lessons().await?))
}

/// GET /api/lessons/search - Paginated text and filter search
pub async fn search(State(state): State<AppState>, Query(query): Query<SearchQuery>) -> ApiResult<LessonPage> {
    debug!("Lesson search: {:?}", query);
    let search = query.into_search()?;
    Ok(ApiResponse::success(state.service.search_lessons(search).await?))
}

/// GET /api/lessons/by-quarter?year=2026&quarter=Q1
pub async fn by_quarter(
    State(state): State<AppState>,
    Query(query): Query<QuarterQuery>,
) -> ApiResult<Vec<LessonRecord>> {
    let (Some(year), Some(quarter)) = (non_blank(query.year), non_blank(query.quarter)) else {
        return Err(ApiError::bad_request("Missing required parameters: year and quarter"));
    };
    let year = parse_year(&year)?;
    let quarter = parse_quarter(&quarter)?;
    Ok(ApiResponse::success(state.service.lessons_by_quarter(year, quarter).await?))
}

/// GET /api/lessons/years - Distinct years, descending
pub async fn years(State(state): State<AppState>) -> ApiResult<Vec<i32>> {
    Ok(ApiResponse::success(state.service.lesson_years().await?))
}

/// POST /api/lessons/delete - Bulk delete by id list
pub async fn delete_many(
    State(state): State<AppState>,
    payload: Result<Json<BulkDelete>, JsonRejection>,
) -> ApiResult<DeleteOutcome> {
    let Json(body) = payload?;
    let ids = body.ids.unwrap_or_default();
    Ok(ApiResponse::success(state.service.delete_lessons(ids).await?))
}
