use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};

use crate::middleware::{ApiResponse, ApiResult};
use crate::models::{NewNotification, Notification};
use crate::AppState;

/// GET /api/notifications - Most recent activity entries
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<Notification>> {
    Ok(ApiResponse::success(state.service.notifications().await?))
}

/// POST /api/notifications - `{title, message, type?}`
pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<NewNotification>, JsonRejection>,
) -> ApiResult<Notification> {
    let Json(notification) = payload?;
    Ok(ApiResponse::created(state.service.post_notification(notification).await?))
}
