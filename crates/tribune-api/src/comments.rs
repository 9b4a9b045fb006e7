use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use uuid::Uuid;

use tribune_types::api::{CommentListResponse, CreateCommentRequest, LikeResponse, SuccessResponse};
use tribune_types::models::Principal;

use crate::convert;
use crate::error::ApiError;
use crate::state::AppState;

const COMMENT_PAGE: u32 = 50;

pub async fn add_comment(
    State(state): State<AppState>,
    Path(news_id): Path<Uuid>,
    Extension(principal): Extension<Principal>,
    Json(req): Json<CreateCommentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.content.trim().is_empty() {
        return Err(ApiError::Validation("Comment must not be empty".into()));
    }
    state
        .db
        .get_news(&news_id.to_string())?
        .ok_or(ApiError::NotFound("Article not found"))?;

    let row = state.db.insert_comment(
        &Uuid::new_v4().to_string(),
        &news_id.to_string(),
        &principal.id.to_string(),
        &req.content,
    )?;

    Ok((StatusCode::CREATED, Json(convert::comment_from_row(row))))
}

pub async fn list_comments(
    State(state): State<AppState>,
    Path(news_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let rows = state.db.list_comments(&news_id.to_string(), COMMENT_PAGE)?;
    Ok(Json(CommentListResponse {
        comments: rows.into_iter().map(convert::comment_from_row).collect(),
    }))
}

pub async fn delete_comment(
    State(state): State<AppState>,
    Path((_news_id, comment_id)): Path<(Uuid, Uuid)>,
    Extension(principal): Extension<Principal>,
) -> Result<impl IntoResponse, ApiError> {
    let row = state
        .db
        .get_comment(&comment_id.to_string())?
        .ok_or(ApiError::NotFound("Comment not found"))?;

    if row.user_id != principal.id.to_string() && !principal.is_admin() {
        return Err(ApiError::Forbidden);
    }

    state.db.delete_comment(&comment_id.to_string())?;
    Ok(Json(SuccessResponse { success: true }))
}

/// Toggle: likes if not yet liked, unlikes otherwise.
pub async fn toggle_like(
    State(state): State<AppState>,
    Path(news_id): Path<Uuid>,
    Extension(principal): Extension<Principal>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .db
        .get_news(&news_id.to_string())?
        .ok_or(ApiError::NotFound("Article not found"))?;

    let liked = state.db.toggle_like(
        &Uuid::new_v4().to_string(),
        &news_id.to_string(),
        &principal.id.to_string(),
    )?;
    let likes = state.db.count_likes(&news_id.to_string())?;

    Ok(Json(LikeResponse { liked, likes }))
}
