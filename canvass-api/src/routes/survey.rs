//! Survey REST API Routes
//!
//! Axum route handlers for survey CRUD and lifecycle operations. All
//! handlers delegate to the service layer; authentication is enforced
//! by the router-level middleware.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::auth::AuthContext;
use crate::error::ApiResult;
use crate::services::survey_service;
use crate::state::AppState;
use crate::types::{
    CreateSurveyRequest, ListParams, ListSurveysResponse, SearchParams, UpdateExpiryRequest,
};

// ============================================================================
// ROUTE HANDLERS
// ============================================================================

/// POST /api/v1/surveys - Create a new survey
pub async fn create_survey(
    State(state): State<AppState>,
    auth: AuthContext,
    Json(req): Json<CreateSurveyRequest>,
) -> ApiResult<impl IntoResponse> {
    let view = survey_service::create(&state, &auth, req).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

/// GET /api/v1/surveys - List surveys, newest first, paginated
pub async fn list_surveys(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> ApiResult<impl IntoResponse> {
    let surveys = survey_service::list(&state, params.page, params.limit).await?;
    Ok(Json(ListSurveysResponse { surveys }))
}

/// GET /api/v1/surveys/search - Keyword search over area and question
pub async fn search_surveys(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> ApiResult<impl IntoResponse> {
    let surveys = survey_service::search(&state, &params.q).await?;
    Ok(Json(ListSurveysResponse { surveys }))
}

/// GET /api/v1/surveys/{id} - Get survey by ID
pub async fn get_survey(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let view = survey_service::get(&state, id).await?;
    Ok(Json(view))
}

/// DELETE /api/v1/surveys/{id} - Delete survey and its responses
pub async fn delete_survey(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    survey_service::delete(&state, id, &auth).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/surveys/{id}/close - Close a survey permanently
pub async fn close_survey(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let view = survey_service::close(&state, id, &auth).await?;
    Ok(Json(view))
}

/// PUT /api/v1/surveys/{id}/expiry - Move the expiry date
pub async fn update_expiry(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateExpiryRequest>,
) -> ApiResult<impl IntoResponse> {
    let view = survey_service::update_expiry(&state, id, &auth, req.expiry_date).await?;
    Ok(Json(view))
}
