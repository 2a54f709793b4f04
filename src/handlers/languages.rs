use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    Json,
};
use serde::Deserialize;

use super::{parse_id, query_flag};
use crate::middleware::{ApiResponse, ApiResult};
use crate::models::{Language, LanguageToggle};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct LanguageQuery {
    pub all: Option<String>,
}

/// GET /api/languages - Active languages by name; `?all=true` includes inactive ones
pub async fn list(State(state): State<AppState>, Query(query): Query<LanguageQuery>) -> ApiResult<Vec<Language>> {
    let include_inactive = query_flag(query.all.as_deref());
    Ok(ApiResponse::success(state.service.languages(include_inactive).await?))
}

/// PUT /api/languages/:id - Toggle a language with `{isActive}`
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<LanguageToggle>, JsonRejection>,
) -> ApiResult<Language> {
    let id = parse_id(&id, "language")?;
    let Json(toggle) = payload?;
    Ok(ApiResponse::success(
        state.service.set_language_active(id, toggle.is_active).await?,
    ))
}
