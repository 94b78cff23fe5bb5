//! Survey Service
//!
//! Creation, reads, lifecycle transitions, and deletion.

use super::{ensure_creator, load_survey};
use crate::auth::AuthContext;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use crate::types::{CreateSurveyRequest, SurveyView};
use crate::validation::{ValidateLength, ValidateNonEmpty};
use canvass_core::{
    lifecycle, Guidelines, Survey, SurveyId, Timestamp, AREA_MAX, AREA_MIN, DOMAINS_MAX,
    DOMAINS_MIN, GUIDELINE_MAX, GUIDELINE_MIN, QUESTION_MAX, QUESTION_MIN,
};
use chrono::Utc;

const DEFAULT_PAGE_LIMIT: usize = 20;
const MAX_PAGE_LIMIT: usize = 100;

/// Create a survey owned by the caller.
pub async fn create(
    state: &AppState,
    auth: &AuthContext,
    req: CreateSurveyRequest,
) -> ApiResult<SurveyView> {
    req.area.validate_length("area", AREA_MIN, AREA_MAX)?;
    req.question
        .validate_length("question", QUESTION_MIN, QUESTION_MAX)?;
    req.permitted_domains
        .validate_length("permitted_domains", DOMAINS_MIN, DOMAINS_MAX)?;
    req.permitted_responses
        .validate_length("permitted_responses", GUIDELINE_MIN, GUIDELINE_MAX)?;
    req.summary_instructions
        .validate_length("summary_instructions", GUIDELINE_MIN, GUIDELINE_MAX)?;

    if !lifecycle::expiry_within_window(req.expiry_date, Utc::now()) {
        return Err(ApiError::validation_failed("Invalid expiry date"));
    }

    let survey = Survey::new(
        auth.user_id,
        auth.username.clone(),
        req.area.trim(),
        req.question.trim(),
        Guidelines {
            permitted_domains: req.permitted_domains.trim().to_string(),
            permitted_responses: req.permitted_responses.trim().to_string(),
            summary_instructions: req.summary_instructions.trim().to_string(),
        },
        req.expiry_date,
    );

    state.surveys.insert(&survey).await?;
    tracing::info!(survey_id = %survey.survey_id, creator = %auth.user_id, "survey created");

    Ok(SurveyView::redacted(&survey))
}

/// Fetch a single survey, summary redacted per visibility.
pub async fn get(state: &AppState, survey_id: SurveyId) -> ApiResult<SurveyView> {
    let survey = load_survey(state.surveys.as_ref(), survey_id).await?;
    Ok(SurveyView::redacted(&survey))
}

/// List surveys, newest first, paginated.
pub async fn list(
    state: &AppState,
    page: Option<usize>,
    limit: Option<usize>,
) -> ApiResult<Vec<SurveyView>> {
    let limit = limit.unwrap_or(DEFAULT_PAGE_LIMIT).clamp(1, MAX_PAGE_LIMIT);
    let page = page.unwrap_or(1).max(1);
    // Page numbers come straight from the query string; saturate rather
    // than overflow on absurd values.
    let offset = page.saturating_sub(1).saturating_mul(limit);

    let surveys = state.surveys.list(offset, limit).await?;
    Ok(surveys.iter().map(SurveyView::redacted).collect())
}

/// Keyword search over area and question.
pub async fn search(state: &AppState, query: &str) -> ApiResult<Vec<SurveyView>> {
    query.validate_non_empty("q")?;
    let surveys = state.surveys.search(query.trim()).await?;
    Ok(surveys.iter().map(SurveyView::redacted).collect())
}

/// Close a survey. Closing is final and distinct from expiry.
pub async fn close(state: &AppState, survey_id: SurveyId, auth: &AuthContext) -> ApiResult<SurveyView> {
    let mut survey = load_survey(state.surveys.as_ref(), survey_id).await?;
    ensure_creator(auth, &survey)?;

    if survey.is_closed {
        return Err(ApiError::state_conflict("Survey is already closed"));
    }
    lifecycle::can_close(&survey, Utc::now())?;

    survey.is_closed = true;
    survey.updated_at = Utc::now();
    state.surveys.update(&survey).await?;
    tracing::info!(survey_id = %survey.survey_id, "survey closed");

    Ok(SurveyView::redacted(&survey))
}

/// Move the expiry date of an open survey.
pub async fn update_expiry(
    state: &AppState,
    survey_id: SurveyId,
    auth: &AuthContext,
    new_date: Timestamp,
) -> ApiResult<SurveyView> {
    let mut survey = load_survey(state.surveys.as_ref(), survey_id).await?;
    ensure_creator(auth, &survey)?;

    lifecycle::can_update_expiry(&survey, new_date, Utc::now())?;

    survey.expiry_date = new_date;
    survey.updated_at = Utc::now();
    state.surveys.update(&survey).await?;

    Ok(SurveyView::redacted(&survey))
}

/// Delete a survey and cascade its responses.
pub async fn delete(state: &AppState, survey_id: SurveyId, auth: &AuthContext) -> ApiResult<()> {
    let survey = load_survey(state.surveys.as_ref(), survey_id).await?;
    ensure_creator(auth, &survey)?;

    let removed = state.responses.delete_by_survey(survey_id).await?;
    state.surveys.delete(survey_id).await?;
    tracing::info!(survey_id = %survey_id, responses_removed = removed, "survey deleted");

    Ok(())
}
