//! Response Service
//!
//! Submission (atomic create-or-replace), edits, and removal.

use super::{ensure_creator, load_survey};
use crate::auth::AuthContext;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use crate::types::{ResponseView, SubmitResponseResponse, SurveyView};
use crate::validation::ValidateLength;
use canvass_core::{lifecycle, ResponseId, ResponseMetadata, SurveyId, RESPONSE_MAX, RESPONSE_MIN};
use canvass_storage::ResponseDraft;
use chrono::Utc;

/// Submit a response, replacing the caller's earlier one if present.
///
/// The replace path resets moderation state: the new content has not
/// been reviewed, whatever the old verdict was.
pub async fn submit_or_update(
    state: &AppState,
    survey_id: SurveyId,
    auth: &AuthContext,
    content: &str,
    metadata: ResponseMetadata,
) -> ApiResult<SubmitResponseResponse> {
    let survey = load_survey(state.surveys.as_ref(), survey_id).await?;
    lifecycle::can_accept_response(&survey, Utc::now())?;

    content.validate_length("content", RESPONSE_MIN, RESPONSE_MAX)?;

    let response = state
        .responses
        .upsert_by_survey_user(ResponseDraft {
            survey_id,
            user_id: auth.user_id,
            username: auth.username.clone(),
            content: content.trim().to_string(),
            metadata,
        })
        .await?;
    tracing::info!(
        survey_id = %survey_id,
        response_id = %response.response_id,
        "response submitted"
    );

    // Read-your-writes: hand back the survey plus the full response list.
    let responses = state.responses.list_by_survey(survey_id).await?;
    Ok(SubmitResponseResponse {
        survey: SurveyView::redacted(&survey),
        responses: responses.iter().map(ResponseView::from).collect(),
    })
}

/// List every response for a survey. Creator-only.
pub async fn list(
    state: &AppState,
    survey_id: SurveyId,
    auth: &AuthContext,
) -> ApiResult<Vec<ResponseView>> {
    let survey = load_survey(state.surveys.as_ref(), survey_id).await?;
    ensure_creator(auth, &survey)?;

    let responses = state.responses.list_by_survey(survey_id).await?;
    Ok(responses.iter().map(ResponseView::from).collect())
}

/// Edit the content of an existing response. Owner-only.
///
/// Unlike the upsert path, an in-place edit keeps the moderation state;
/// the next moderation pass re-evaluates everything anyway.
pub async fn update_content(
    state: &AppState,
    survey_id: SurveyId,
    response_id: ResponseId,
    auth: &AuthContext,
    content: &str,
) -> ApiResult<ResponseView> {
    let survey = load_survey(state.surveys.as_ref(), survey_id).await?;
    lifecycle::can_accept_response(&survey, Utc::now())?;

    content.validate_length("content", RESPONSE_MIN, RESPONSE_MAX)?;

    let mut response = state
        .responses
        .get(response_id)
        .await?
        .filter(|r| r.survey_id == survey_id)
        .ok_or_else(|| ApiError::response_not_found(response_id))?;

    if response.user_id != auth.user_id {
        return Err(ApiError::forbidden("Not authorized to edit this response"));
    }

    response.content = content.trim().to_string();
    response.updated_at = Utc::now();
    state.responses.update(&response).await?;

    Ok(ResponseView::from(&response))
}

/// Remove a response. Allowed for its owner or the survey creator.
pub async fn remove(
    state: &AppState,
    survey_id: SurveyId,
    response_id: ResponseId,
    auth: &AuthContext,
) -> ApiResult<()> {
    let survey = load_survey(state.surveys.as_ref(), survey_id).await?;
    lifecycle::can_accept_response(&survey, Utc::now())?;

    let response = state
        .responses
        .get(response_id)
        .await?
        .filter(|r| r.survey_id == survey_id)
        .ok_or_else(|| ApiError::response_not_found(response_id))?;

    let is_owner = response.user_id == auth.user_id;
    if !is_owner && !auth.can_manage(survey.creator) {
        return Err(ApiError::forbidden(
            "Not authorized to delete this response",
        ));
    }

    state.responses.delete(response_id).await?;
    Ok(())
}

/// Bulk-delete every Violation response for a survey. Creator-only.
pub async fn delete_violations(
    state: &AppState,
    survey_id: SurveyId,
    auth: &AuthContext,
) -> ApiResult<usize> {
    let survey = load_survey(state.surveys.as_ref(), survey_id).await?;
    ensure_creator(auth, &survey)?;

    let deleted = state.responses.delete_violations(survey_id).await?;
    tracing::info!(survey_id = %survey_id, deleted, "violation responses removed");
    Ok(deleted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::services::test_support::{default_state, sample_survey, user};
    use canvass_core::ValidationState;
    use chrono::Duration;

    #[tokio::test]
    async fn test_submit_rejected_when_closed_or_expired() {
        let state = default_state();
        let creator = user("dana");
        let respondent = user("erin");

        let mut closed = sample_survey(creator.user_id, "dana", "Is the metro frequent enough?");
        closed.is_closed = true;
        state.surveys.insert(&closed).await.expect("insert");

        let err = submit_or_update(
            &state,
            closed.survey_id,
            &respondent,
            "the bus is always late",
            ResponseMetadata::now(None, None),
        )
        .await
        .unwrap_err();
        assert_eq!(err.message, "Survey is closed");

        let mut expired = sample_survey(creator.user_id, "dana", "Should the city add bike lanes?");
        expired.expiry_date = Utc::now() - Duration::days(1);
        state.surveys.insert(&expired).await.expect("insert");

        let err = submit_or_update(
            &state,
            expired.survey_id,
            &respondent,
            "the bus is always late",
            ResponseMetadata::now(None, None),
        )
        .await
        .unwrap_err();
        assert_eq!(err.message, "Survey has expired");
    }

    #[tokio::test]
    async fn test_closed_takes_precedence_over_expired() {
        let state = default_state();
        let creator = user("dana");
        let respondent = user("erin");

        let mut survey = sample_survey(creator.user_id, "dana", "Is the metro frequent enough?");
        survey.is_closed = true;
        survey.expiry_date = Utc::now() - Duration::days(1);
        state.surveys.insert(&survey).await.expect("insert");

        let err = submit_or_update(
            &state,
            survey.survey_id,
            &respondent,
            "the bus is always late",
            ResponseMetadata::now(None, None),
        )
        .await
        .unwrap_err();
        assert_eq!(err.message, "Survey is closed");
    }

    #[tokio::test]
    async fn test_resubmit_replaces_and_resets_moderation() {
        let state = default_state();
        let creator = user("dana");
        let respondent = user("erin");

        let survey = sample_survey(creator.user_id, "dana", "Is the metro frequent enough?");
        state.surveys.insert(&survey).await.expect("insert");

        let first = submit_or_update(
            &state,
            survey.survey_id,
            &respondent,
            "the bus is always late",
            ResponseMetadata::now(None, None),
        )
        .await
        .expect("first submit");
        let first_id = first.responses[0].response_id;

        // Flag it, then resubmit.
        let mut flagged = state
            .responses
            .get(first_id)
            .await
            .expect("get")
            .expect("exists");
        flagged.mark_violation("off-topic");
        state.responses.update(&flagged).await.expect("update");

        let second = submit_or_update(
            &state,
            survey.survey_id,
            &respondent,
            "trains are fine actually",
            ResponseMetadata::now(None, None),
        )
        .await
        .expect("second submit");

        assert_eq!(second.responses.len(), 1);
        let view = &second.responses[0];
        assert_eq!(view.response_id, first_id);
        assert_eq!(view.validation, ValidationState::Pending);
        assert!(view.violation_explanation.is_none());
    }

    #[tokio::test]
    async fn test_update_content_keeps_moderation_state() {
        let state = default_state();
        let creator = user("dana");
        let respondent = user("erin");

        let survey = sample_survey(creator.user_id, "dana", "Is the metro frequent enough?");
        state.surveys.insert(&survey).await.expect("insert");

        let submitted = submit_or_update(
            &state,
            survey.survey_id,
            &respondent,
            "the bus is always late",
            ResponseMetadata::now(None, None),
        )
        .await
        .expect("submit");
        let response_id = submitted.responses[0].response_id;

        let mut approved = state
            .responses
            .get(response_id)
            .await
            .expect("get")
            .expect("exists");
        approved.mark_approved();
        state.responses.update(&approved).await.expect("update");

        let view = update_content(
            &state,
            survey.survey_id,
            response_id,
            &respondent,
            "the bus is late every single morning",
        )
        .await
        .expect("edit");

        assert_eq!(view.validation, ValidationState::Approved);
        assert_eq!(view.content, "the bus is late every single morning");
    }

    #[tokio::test]
    async fn test_update_content_owner_only() {
        let state = default_state();
        let creator = user("dana");
        let respondent = user("erin");

        let survey = sample_survey(creator.user_id, "dana", "Is the metro frequent enough?");
        state.surveys.insert(&survey).await.expect("insert");

        let submitted = submit_or_update(
            &state,
            survey.survey_id,
            &respondent,
            "the bus is always late",
            ResponseMetadata::now(None, None),
        )
        .await
        .expect("submit");
        let response_id = submitted.responses[0].response_id;

        // Even the survey creator cannot rewrite someone else's words.
        let err = update_content(
            &state,
            survey.survey_id,
            response_id,
            &creator,
            "rewritten by someone else",
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::Forbidden);
    }

    #[tokio::test]
    async fn test_remove_by_owner_and_creator() {
        let state = default_state();
        let creator = user("dana");
        let respondent = user("erin");
        let stranger = user("frank");

        let survey = sample_survey(creator.user_id, "dana", "Is the metro frequent enough?");
        state.surveys.insert(&survey).await.expect("insert");

        let submitted = submit_or_update(
            &state,
            survey.survey_id,
            &respondent,
            "the bus is always late",
            ResponseMetadata::now(None, None),
        )
        .await
        .expect("submit");
        let response_id = submitted.responses[0].response_id;

        let err = remove(&state, survey.survey_id, response_id, &stranger)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Forbidden);

        remove(&state, survey.survey_id, response_id, &creator)
            .await
            .expect("creator removes");

        let err = remove(&state, survey.survey_id, response_id, &respondent)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ResponseNotFound);
    }

    #[tokio::test]
    async fn test_list_is_creator_only() {
        let state = default_state();
        let creator = user("dana");
        let respondent = user("erin");

        let survey = sample_survey(creator.user_id, "dana", "Is the metro frequent enough?");
        state.surveys.insert(&survey).await.expect("insert");

        let err = list(&state, survey.survey_id, &respondent).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Forbidden);

        assert!(list(&state, survey.survey_id, &creator)
            .await
            .expect("list")
            .is_empty());
    }

    #[tokio::test]
    async fn test_content_bounds() {
        let state = default_state();
        let creator = user("dana");
        let respondent = user("erin");

        let survey = sample_survey(creator.user_id, "dana", "Is the metro frequent enough?");
        state.surveys.insert(&survey).await.expect("insert");

        let err = submit_or_update(
            &state,
            survey.survey_id,
            &respondent,
            "too short",
            ResponseMetadata::now(None, None),
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidRange);

        let long = "x".repeat(2001);
        let err = submit_or_update(
            &state,
            survey.survey_id,
            &respondent,
            &long,
            ResponseMetadata::now(None, None),
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidRange);

        // The bounds are inclusive on both ends.
        let shortest = "x".repeat(10);
        let out = submit_or_update(
            &state,
            survey.survey_id,
            &respondent,
            &shortest,
            ResponseMetadata::now(None, None),
        )
        .await
        .expect("10 chars accepted");
        assert_eq!(out.responses[0].content, shortest);

        let longest = "x".repeat(2000);
        let out = submit_or_update(
            &state,
            survey.survey_id,
            &respondent,
            &longest,
            ResponseMetadata::now(None, None),
        )
        .await
        .expect("2000 chars accepted");
        assert_eq!(out.responses[0].content, longest);
    }
}
