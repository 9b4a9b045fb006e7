use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use uuid::Uuid;

use tribune_types::api::{
    DecideOpinionRequest, OpinionListResponse, OpinionResponse, PageMeta, PageQuery,
    SubmitOpinionRequest, SuccessResponse,
};
use tribune_types::models::{OpinionStatus, Principal};

use crate::convert;
use crate::error::ApiError;
use crate::moderation;
use crate::state::AppState;

pub async fn submit_opinion(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(req): Json<SubmitOpinionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let opinion = moderation::submit(&state.db, &state.notifier, &principal, req).await?;
    Ok((StatusCode::CREATED, Json(OpinionResponse { opinion })))
}

pub async fn decide_opinion(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Extension(principal): Extension<Principal>,
    Json(req): Json<DecideOpinionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let opinion =
        moderation::decide(&state.db, &state.notifier, &state.gateway, &principal, id, req).await?;
    Ok(Json(OpinionResponse { opinion }))
}

/// Moderation dashboard listing, optionally filtered by status.
pub async fn list_opinions(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
    Extension(principal): Extension<Principal>,
) -> Result<impl IntoResponse, ApiError> {
    if !principal.is_admin() {
        return Err(ApiError::Forbidden);
    }

    let status = match query.status.as_deref() {
        Some(s) => Some(
            s.parse::<OpinionStatus>()
                .map_err(|_| ApiError::Validation("Invalid status filter".into()))?,
        ),
        None => None,
    };
    let status_text = status.map(|s| s.as_str());

    let limit = query.limit_clamped();
    let offset = query.offset();

    let rows = state.db.list_opinions(status_text, limit, offset)?;
    let total = state.db.count_opinions(status_text)?;

    Ok(Json(OpinionListResponse {
        opinions: rows.into_iter().map(convert::opinion_from_row).collect(),
        meta: PageMeta::new(total, query.page, limit),
    }))
}

pub async fn my_opinions(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
    Extension(principal): Extension<Principal>,
) -> Result<impl IntoResponse, ApiError> {
    let limit = query.limit_clamped();
    let offset = query.offset();
    let author_id = principal.id.to_string();

    let rows = state.db.list_opinions_by_author(&author_id, limit, offset)?;
    let total = state.db.count_opinions_by_author(&author_id)?;

    Ok(Json(OpinionListResponse {
        opinions: rows.into_iter().map(convert::opinion_from_row).collect(),
        meta: PageMeta::new(total, query.page, limit),
    }))
}

pub async fn get_opinion(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Extension(_principal): Extension<Principal>,
) -> Result<impl IntoResponse, ApiError> {
    let row = state
        .db
        .get_opinion(&id.to_string())?
        .ok_or(ApiError::NotFound("Opinion not found"))?;
    Ok(Json(OpinionResponse { opinion: convert::opinion_from_row(row) }))
}

/// Owner-initiated deletion — a separate concern from moderation, which
/// never removes rows.
pub async fn delete_opinion(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Extension(principal): Extension<Principal>,
) -> Result<impl IntoResponse, ApiError> {
    let row = state
        .db
        .get_opinion(&id.to_string())?
        .ok_or(ApiError::NotFound("Opinion not found"))?;

    if row.author_id != principal.id.to_string() && !principal.is_admin() {
        return Err(ApiError::Forbidden);
    }

    state.db.delete_opinion(&id.to_string())?;
    Ok(Json(SuccessResponse { success: true }))
}
