//! Summary REST API Routes
//!
//! Summary generation and the visibility toggle.

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::auth::AuthContext;
use crate::error::ApiResult;
use crate::services::summary_service;
use crate::state::AppState;
use crate::types::SetVisibilityRequest;

/// POST /api/v1/surveys/{id}/summary - Generate or regenerate the summary
pub async fn generate_summary(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(survey_id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let view = summary_service::generate(&state, survey_id, &auth).await?;
    Ok(Json(view))
}

/// PUT /api/v1/surveys/{id}/summary/visibility - Publish or hide the summary
pub async fn set_summary_visibility(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(survey_id): Path<Uuid>,
    Json(req): Json<SetVisibilityRequest>,
) -> ApiResult<impl IntoResponse> {
    let view = summary_service::set_visibility(&state, survey_id, &auth, req.visible).await?;
    Ok(Json(view))
}
