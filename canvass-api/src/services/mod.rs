//! Service Layer
//!
//! Business logic for survey, response, moderation, and summary
//! operations. Every mutation consults the lifecycle gates in
//! `canvass_core::lifecycle` immediately before writing, never from a
//! cached earlier read.

pub mod moderation_service;
pub mod response_service;
pub mod summary_service;
pub mod survey_service;

use crate::auth::AuthContext;
use crate::error::{ApiError, ApiResult};
use canvass_core::{Survey, SurveyId};
use canvass_storage::SurveyStore;

/// Load a survey or fail with 404.
pub(crate) async fn load_survey(
    surveys: &dyn SurveyStore,
    survey_id: SurveyId,
) -> ApiResult<Survey> {
    surveys
        .get(survey_id)
        .await?
        .ok_or_else(|| ApiError::survey_not_found(survey_id))
}

/// Creator-or-admin gate for survey management operations.
pub(crate) fn ensure_creator(auth: &AuthContext, survey: &Survey) -> ApiResult<()> {
    if auth.can_manage(survey.creator) {
        Ok(())
    } else {
        Err(ApiError::forbidden("Not authorized to manage this survey"))
    }
}

// ============================================================================
// TEST SUPPORT
// ============================================================================
