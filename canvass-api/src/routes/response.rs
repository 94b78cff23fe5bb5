//! Response REST API Routes
//!
//! Axum route handlers for response submission, edits, and removal.
//! Submission provenance (client IP, user agent) is captured here from
//! request headers and stored, never echoed back in views.

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::auth::AuthContext;
use crate::error::ApiResult;
use crate::services::response_service;
use crate::state::AppState;
use crate::types::{
    DeletedCountResponse, ListResponsesResponse, SubmitResponseRequest, UpdateResponseRequest,
};
use canvass_core::ResponseMetadata;

/// Capture submission provenance from request headers.
fn metadata_from_headers(headers: &HeaderMap) -> ResponseMetadata {
    let ip_address = headers
        .get("x-forwarded-for")
        .and_then(|h| h.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());

    let user_agent = headers
        .get("user-agent")
        .and_then(|h| h.to_str().ok())
        .map(|v| v.to_string());

    ResponseMetadata::now(ip_address, user_agent)
}

// ============================================================================
// ROUTE HANDLERS
// ============================================================================

/// POST /api/v1/surveys/{id}/responses - Submit or replace the caller's response
pub async fn submit_response(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(survey_id): Path<Uuid>,
    headers: HeaderMap,
    Json(req): Json<SubmitResponseRequest>,
) -> ApiResult<impl IntoResponse> {
    let metadata = metadata_from_headers(&headers);
    let result =
        response_service::submit_or_update(&state, survey_id, &auth, &req.content, metadata)
            .await?;
    Ok((StatusCode::CREATED, Json(result)))
}

/// GET /api/v1/surveys/{id}/responses - List responses (creator only)
pub async fn list_responses(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(survey_id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let responses = response_service::list(&state, survey_id, &auth).await?;
    Ok(Json(ListResponsesResponse { responses }))
}

/// PUT /api/v1/surveys/{id}/responses/{response_id} - Edit own response
pub async fn update_response(
    State(state): State<AppState>,
    auth: AuthContext,
    Path((survey_id, response_id)): Path<(Uuid, Uuid)>,
    Json(req): Json<UpdateResponseRequest>,
) -> ApiResult<impl IntoResponse> {
    let view =
        response_service::update_content(&state, survey_id, response_id, &auth, &req.content)
            .await?;
    Ok(Json(view))
}

/// DELETE /api/v1/surveys/{id}/responses/{response_id} - Remove a response
pub async fn delete_response(
    State(state): State<AppState>,
    auth: AuthContext,
    Path((survey_id, response_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<StatusCode> {
    response_service::remove(&state, survey_id, response_id, &auth).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/v1/surveys/{id}/bad-responses - Bulk-delete flagged responses
pub async fn delete_bad_responses(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(survey_id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let deleted = response_service::delete_violations(&state, survey_id, &auth).await?;
    Ok(Json(DeletedCountResponse { deleted }))
}
