//! Summary Service
//!
//! LLM-generated summaries over a survey's responses, plus the
//! visibility toggle. A freshly generated summary always starts hidden;
//! the creator publishes it explicitly.

use super::load_survey;
use crate::auth::AuthContext;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use crate::types::SurveyView;
use canvass_core::{lifecycle, Summary, SurveyId};
use canvass_llm::SummaryRequest;
use chrono::Utc;

/// Generate (or regenerate) the summary for a survey. Creator-only,
/// and there must be at least one response.
pub async fn generate(
    state: &AppState,
    survey_id: SurveyId,
    auth: &AuthContext,
) -> ApiResult<SurveyView> {
    let mut survey = load_survey(state.surveys.as_ref(), survey_id).await?;

    let responses = state.responses.list_by_survey(survey_id).await?;
    lifecycle::can_generate_summary(&survey, auth.user_id, responses.len())?;

    let request = SummaryRequest {
        area: survey.area.clone(),
        question: survey.question.clone(),
        summary_instructions: survey.guidelines.summary_instructions.clone(),
        responses: responses.into_iter().map(|r| r.content).collect(),
    };

    let content = state.summarizer.summarize(&request).await.map_err(|e| {
        tracing::error!(survey_id = %survey_id, error = %e, "summary generation aborted");
        ApiError::collaborator_failed(format!("Failed to generate summary: {}", e))
    })?;

    // Regeneration resets visibility: new content has not been reviewed
    // by the creator, whatever the old summary's state was.
    let now = Utc::now();
    survey.summary = Some(Summary {
        content: serde_json::to_string(&content)?,
        is_visible: false,
        last_updated: now,
    });
    survey.updated_at = now;
    state.surveys.update(&survey).await?;
    tracing::info!(survey_id = %survey_id, "summary generated");

    Ok(SurveyView::with_summary(&survey))
}

/// Toggle summary visibility. Creator-only; turning visibility on
/// requires non-empty content, turning it off is always allowed.
pub async fn set_visibility(
    state: &AppState,
    survey_id: SurveyId,
    auth: &AuthContext,
    visible: bool,
) -> ApiResult<SurveyView> {
    let mut survey = load_survey(state.surveys.as_ref(), survey_id).await?;
    super::ensure_creator(auth, &survey)?;

    if visible {
        lifecycle::can_make_visible(&survey.summary)?;
    }

    if let Some(summary) = survey.summary.as_mut() {
        summary.is_visible = visible;
        summary.last_updated = Utc::now();
        survey.updated_at = Utc::now();
        state.surveys.update(&survey).await?;
    }
    // Hiding a summary that does not exist is a no-op.

    Ok(SurveyView::with_summary(&survey))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::services::test_support::{
        default_state, sample_survey, scripted_state, user,
    };
    use canvass_core::{new_entity_id, CanvassError, LlmError, ResponseMetadata, Survey};
    use canvass_llm::ModerationVerdict;
    use canvass_storage::ResponseDraft;

    async fn seed_survey(state: &AppState, creator: &AuthContext) -> Survey {
        let survey = sample_survey(creator.user_id, "dana", "Is the metro frequent enough?");
        state.surveys.insert(&survey).await.expect("insert");
        survey
    }

    async fn seed_response(state: &AppState, survey: &Survey) {
        state
            .responses
            .upsert_by_survey_user(ResponseDraft {
                survey_id: survey.survey_id,
                user_id: new_entity_id(),
                username: "erin".to_string(),
                content: "the bus is always late".to_string(),
                metadata: ResponseMetadata::now(None, None),
            })
            .await
            .expect("upsert");
    }

    #[tokio::test]
    async fn test_generate_is_strictly_creator() {
        let state = default_state();
        let creator = user("dana");
        let survey = seed_survey(&state, &creator).await;
        seed_response(&state, &survey).await;

        let stranger = user("frank");
        let err = generate(&state, survey.survey_id, &stranger)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Forbidden);
        assert_eq!(
            err.message,
            "Not authorized to generate summary for this survey"
        );
    }

    #[tokio::test]
    async fn test_generate_requires_responses() {
        let state = default_state();
        let creator = user("dana");
        let survey = seed_survey(&state, &creator).await;

        let err = generate(&state, survey.survey_id, &creator)
            .await
            .unwrap_err();
        assert_eq!(err.message, "No responses available for summarization");
    }

    #[tokio::test]
    async fn test_generate_stores_hidden_summary() {
        let state = scripted_state(
            Ok(ModerationVerdict::default()),
            Ok(serde_json::json!({"themes": ["punctuality"]})),
        );
        let creator = user("dana");
        let survey = seed_survey(&state, &creator).await;
        seed_response(&state, &survey).await;

        let view = generate(&state, survey.survey_id, &creator)
            .await
            .expect("generate");
        let summary = view.summary.expect("summary in creator view");
        assert!(!summary.is_visible);
        assert_eq!(summary.content["themes"][0], "punctuality");

        // The public view still hides it.
        let stored = state
            .surveys
            .get(survey.survey_id)
            .await
            .expect("get")
            .expect("exists");
        assert!(SurveyView::redacted(&stored).summary.is_none());
    }

    #[tokio::test]
    async fn test_regeneration_resets_visibility() {
        let state = scripted_state(
            Ok(ModerationVerdict::default()),
            Ok(serde_json::json!({"themes": ["punctuality"]})),
        );
        let creator = user("dana");
        let survey = seed_survey(&state, &creator).await;
        seed_response(&state, &survey).await;

        generate(&state, survey.survey_id, &creator)
            .await
            .expect("generate");
        let view = set_visibility(&state, survey.survey_id, &creator, true)
            .await
            .expect("publish");
        assert!(view.summary.expect("summary").is_visible);

        let view = generate(&state, survey.survey_id, &creator)
            .await
            .expect("regenerate");
        assert!(!view.summary.expect("summary").is_visible);
    }

    #[tokio::test]
    async fn test_visibility_requires_content() {
        let state = default_state();
        let creator = user("dana");
        let survey = seed_survey(&state, &creator).await;

        let err = set_visibility(&state, survey.survey_id, &creator, true)
            .await
            .unwrap_err();
        assert_eq!(err.message, "Cannot make summary visible without content");
    }

    #[tokio::test]
    async fn test_hiding_without_summary_is_noop() {
        let state = default_state();
        let creator = user("dana");
        let survey = seed_survey(&state, &creator).await;

        let view = set_visibility(&state, survey.survey_id, &creator, false)
            .await
            .expect("noop hide");
        assert!(view.summary.is_none());
    }

    #[tokio::test]
    async fn test_visibility_is_creator_gated() {
        let state = scripted_state(
            Ok(ModerationVerdict::default()),
            Ok(serde_json::json!({"themes": []})),
        );
        let creator = user("dana");
        let survey = seed_survey(&state, &creator).await;
        seed_response(&state, &survey).await;
        generate(&state, survey.survey_id, &creator)
            .await
            .expect("generate");

        let stranger = user("frank");
        let err = set_visibility(&state, survey.survey_id, &stranger, true)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Forbidden);
    }

    #[tokio::test]
    async fn test_provider_failure_leaves_existing_summary() {
        let state = scripted_state(
            Ok(ModerationVerdict::default()),
            Ok(serde_json::json!({"themes": ["punctuality"]})),
        );
        let creator = user("dana");
        let survey = seed_survey(&state, &creator).await;
        seed_response(&state, &survey).await;
        generate(&state, survey.survey_id, &creator)
            .await
            .expect("generate");

        let failing = scripted_state(
            Ok(ModerationVerdict::default()),
            Err(CanvassError::Llm(LlmError::RateLimited {
                provider: "anthropic".to_string(),
            })),
        );
        let failing = AppState::new(
            state.surveys.clone(),
            state.responses.clone(),
            failing.moderator.clone(),
            failing.summarizer.clone(),
        );

        let err = generate(&failing, survey.survey_id, &creator)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::CollaboratorFailed);
        assert!(err.message.starts_with("Failed to generate summary:"));

        let stored = failing
            .surveys
            .get(survey.survey_id)
            .await
            .expect("get")
            .expect("exists");
        let summary = stored.summary.expect("earlier summary intact");
        assert!(summary.content.contains("punctuality"));
    }
}
