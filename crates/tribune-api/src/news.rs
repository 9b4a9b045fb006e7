use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use uuid::Uuid;

use tribune_types::api::{
    CreateNewsRequest, NewsListResponse, NewsResponse, PageMeta, PageQuery, SuccessResponse,
    UpdateNewsRequest,
};
use tribune_types::models::Principal;

use crate::convert;
use crate::error::ApiError;
use crate::state::AppState;

pub async fn create_news(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(req): Json<CreateNewsRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if !principal.can_publish() {
        return Err(ApiError::Forbidden);
    }
    if req.title.trim().is_empty() || req.content.trim().is_empty() {
        return Err(ApiError::Validation("Title and content are required".into()));
    }

    let row = state.db.insert_news(
        &Uuid::new_v4().to_string(),
        &req.title,
        &req.content,
        req.category.as_deref(),
        req.sub_category.as_deref(),
        req.image_url.as_deref(),
        &principal.id.to_string(),
    )?;

    Ok((StatusCode::CREATED, Json(NewsResponse { article: convert::news_from_row(row) })))
}

/// Public listing with pagination, title/content search and category filter.
pub async fn list_news(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let limit = query.limit_clamped();
    let offset = query.offset();
    let search = query.search.as_deref().filter(|s| !s.trim().is_empty());
    let category = query.category.as_deref();

    let rows = state.db.list_news(search, category, limit, offset)?;
    let total = state.db.count_news(search, category)?;

    Ok(Json(NewsListResponse {
        articles: rows.into_iter().map(convert::news_from_row).collect(),
        meta: PageMeta::new(total, query.page, limit),
    }))
}

pub async fn get_news(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let row = state
        .db
        .get_news(&id.to_string())?
        .ok_or(ApiError::NotFound("Article not found"))?;
    Ok(Json(NewsResponse { article: convert::news_from_row(row) }))
}

pub async fn update_news(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Extension(principal): Extension<Principal>,
    Json(req): Json<UpdateNewsRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let existing = state
        .db
        .get_news(&id.to_string())?
        .ok_or(ApiError::NotFound("Article not found"))?;

    if existing.author_id != principal.id.to_string() && !principal.is_admin() {
        return Err(ApiError::Forbidden);
    }

    // Absent fields keep their stored value
    let title = req.title.unwrap_or(existing.title);
    let content = req.content.unwrap_or(existing.content);
    let category = req.category.or(existing.category);
    let sub_category = req.sub_category.or(existing.sub_category);
    let image_url = req.image_url.or(existing.image_url);

    if title.trim().is_empty() || content.trim().is_empty() {
        return Err(ApiError::Validation("Title and content must not be empty".into()));
    }

    let row = state
        .db
        .update_news(
            &id.to_string(),
            &title,
            &content,
            category.as_deref(),
            sub_category.as_deref(),
            image_url.as_deref(),
        )?
        .ok_or(ApiError::NotFound("Article not found"))?;

    Ok(Json(NewsResponse { article: convert::news_from_row(row) }))
}

pub async fn delete_news(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Extension(principal): Extension<Principal>,
) -> Result<impl IntoResponse, ApiError> {
    if !principal.is_admin() {
        return Err(ApiError::Forbidden);
    }
    if !state.db.delete_news(&id.to_string())? {
        return Err(ApiError::NotFound("Article not found"));
    }
    Ok(Json(SuccessResponse { success: true }))
}
