//! Moderation REST API Route
//!
//! Triggers a full moderation pass over a survey's responses.

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::auth::AuthContext;
use crate::error::ApiResult;
use crate::services::moderation_service;
use crate::state::AppState;

/// POST /api/v1/surveys/{id}/moderate - Re-moderate every response
pub async fn moderate_survey(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(survey_id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let report = moderation_service::run_moderation(&state, survey_id, &auth).await?;
    Ok(Json(report))
}
