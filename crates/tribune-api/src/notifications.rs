use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Extension, Json,
};
use uuid::Uuid;

use tribune_types::api::{NotificationListResponse, SuccessResponse, UnreadCountResponse};
use tribune_types::models::Principal;

use crate::error::ApiError;
use crate::state::AppState;

pub async fn list_user_notifications(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> Result<impl IntoResponse, ApiError> {
    let notifications = state.notifier.list_for_user(&principal)?;
    Ok(Json(NotificationListResponse { notifications }))
}

pub async fn list_admin_notifications(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> Result<impl IntoResponse, ApiError> {
    if !principal.is_admin() {
        return Err(ApiError::Forbidden);
    }
    let notifications = state.notifier.list_for_admin()?;
    Ok(Json(NotificationListResponse { notifications }))
}

pub async fn unread_count(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> Result<impl IntoResponse, ApiError> {
    let count = state.notifier.unread_count(&principal)?;
    Ok(Json(UnreadCountResponse { count }))
}

pub async fn mark_all_read(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> Result<impl IntoResponse, ApiError> {
    state.notifier.mark_all_read(&principal)?;
    Ok(Json(SuccessResponse { success: true }))
}

pub async fn mark_one_read(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Extension(principal): Extension<Principal>,
) -> Result<impl IntoResponse, ApiError> {
    state.notifier.mark_read(id, &principal)?;
    Ok(Json(SuccessResponse { success: true }))
}
