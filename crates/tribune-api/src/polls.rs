use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use uuid::Uuid;

use tribune_types::api::{CreatePollRequest, PollResponse, VoteRequest};
use tribune_types::models::Principal;

use crate::convert;
use crate::error::ApiError;
use crate::state::AppState;

pub async fn create_poll(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(req): Json<CreatePollRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if !principal.is_admin() {
        return Err(ApiError::Forbidden);
    }
    if req.question.trim().is_empty() {
        return Err(ApiError::Validation("Question is required".into()));
    }
    if req.options.len() < 2 || req.options.iter().any(|o| o.trim().is_empty()) {
        return Err(ApiError::Validation("At least two non-empty options are required".into()));
    }

    let poll_id = Uuid::new_v4();
    let options: Vec<(String, String)> = req
        .options
        .iter()
        .map(|text| (Uuid::new_v4().to_string(), text.clone()))
        .collect();

    state.db.insert_poll(&poll_id.to_string(), &req.question, &options)?;

    poll_response(&state, poll_id).await.map(|body| (StatusCode::CREATED, body))
}

pub async fn list_polls(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let rows = state.db.list_polls()?;
    let mut polls = Vec::with_capacity(rows.len());
    for row in rows {
        let options = state.db.get_poll_options(&row.id)?;
        polls.push(PollResponse {
            poll: convert::poll_from_row(row),
            options: options.into_iter().map(convert::poll_option_from_row).collect(),
        });
    }
    Ok(Json(polls))
}

pub async fn get_poll(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    poll_response(&state, id).await
}

pub async fn vote(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Extension(principal): Extension<Principal>,
    Json(req): Json<VoteRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let poll = state
        .db
        .get_poll(&id.to_string())?
        .ok_or(ApiError::NotFound("Poll not found"))?;

    let options = state.db.get_poll_options(&poll.id)?;
    if !options.iter().any(|o| o.id == req.option_id.to_string()) {
        return Err(ApiError::Validation("Option does not belong to this poll".into()));
    }

    let added = state.db.cast_vote(
        &Uuid::new_v4().to_string(),
        &poll.id,
        &req.option_id.to_string(),
        &principal.id.to_string(),
    )?;
    if !added {
        return Err(ApiError::Conflict("Already voted in this poll"));
    }

    poll_response(&state, id).await
}

async fn poll_response(state: &AppState, id: Uuid) -> Result<Json<PollResponse>, ApiError> {
    let row = state
        .db
        .get_poll(&id.to_string())?
        .ok_or(ApiError::NotFound("Poll not found"))?;
    let options = state.db.get_poll_options(&row.id)?;
    Ok(Json(PollResponse {
        poll: convert::poll_from_row(row),
        options: options.into_iter().map(convert::poll_option_from_row).collect(),
    }))
}
