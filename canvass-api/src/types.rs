//! API Request and Response Types
//!
//! DTOs for the REST surface. The view types are the single place where
//! read-side redaction happens: hidden summaries never leave the server,
//! and response provenance (IP, user agent) is not echoed back.

use canvass_core::{
    Guidelines, Response, ResponseId, Summary, Survey, SurveyId, Timestamp, UserId,
    ValidationState,
};
use serde::{Deserialize, Serialize};

// ============================================================================
// REQUESTS
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSurveyRequest {
    pub area: String,
    pub question: String,
    pub permitted_domains: String,
    pub permitted_responses: String,
    pub summary_instructions: String,
    pub expiry_date: Timestamp,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateExpiryRequest {
    pub expiry_date: Timestamp,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitResponseRequest {
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateResponseRequest {
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetVisibilityRequest {
    pub visible: bool,
}

/// Query parameters for `GET /surveys`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListParams {
    pub page: Option<usize>,
    pub limit: Option<usize>,
}

/// Query parameters for `GET /surveys/search`.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchParams {
    pub q: String,
}

// ============================================================================
// VIEWS
// ============================================================================

/// Summary as served to clients: content deserialized back into JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryView {
    pub content: serde_json::Value,
    pub is_visible: bool,
    pub last_updated: Timestamp,
}

impl SummaryView {
    fn from_summary(summary: &Summary) -> Self {
        // Content was serialized from a JSON value on write; a parse
        // failure would mean corrupted storage, so fall back to the raw
        // string rather than dropping the summary.
        let content = serde_json::from_str(&summary.content)
            .unwrap_or_else(|_| serde_json::Value::String(summary.content.clone()));
        Self {
            content,
            is_visible: summary.is_visible,
            last_updated: summary.last_updated,
        }
    }
}

/// Survey as served to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurveyView {
    pub survey_id: SurveyId,
    pub creator: UserId,
    pub creator_name: String,
    pub area: String,
    pub question: String,
    pub guidelines: Guidelines,
    pub expiry_date: Timestamp,
    pub is_closed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<SummaryView>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl SurveyView {
    /// Public view: the summary subtree is stripped entirely unless the
    /// creator has made it visible.
    pub fn redacted(survey: &Survey) -> Self {
        Self::build(survey, false)
    }

    /// Creator view after generating or toggling a summary: the summary
    /// is included even while still hidden.
    pub fn with_summary(survey: &Survey) -> Self {
        Self::build(survey, true)
    }

    fn build(survey: &Survey, include_hidden_summary: bool) -> Self {
        let summary = survey
            .summary
            .as_ref()
            .filter(|s| s.is_visible || include_hidden_summary)
            .map(SummaryView::from_summary);

        Self {
            survey_id: survey.survey_id,
            creator: survey.creator,
            creator_name: survey.creator_name.clone(),
            area: survey.area.clone(),
            question: survey.question.clone(),
            guidelines: survey.guidelines.clone(),
            expiry_date: survey.expiry_date,
            is_closed: survey.is_closed,
            summary,
            created_at: survey.created_at,
            updated_at: survey.updated_at,
        }
    }
}

/// Response as served to clients. Submission provenance stays internal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseView {
    pub response_id: ResponseId,
    pub survey_id: SurveyId,
    pub user_id: UserId,
    pub username: String,
    pub content: String,
    pub validation: ValidationState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub violation_explanation: Option<String>,
    pub submission_time: Timestamp,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<&Response> for ResponseView {
    fn from(response: &Response) -> Self {
        Self {
            response_id: response.response_id,
            survey_id: response.survey_id,
            user_id: response.user_id,
            username: response.username.clone(),
            content: response.content.clone(),
            validation: response.validation,
            violation_explanation: response.violation_explanation.clone(),
            submission_time: response.metadata.submission_time,
            created_at: response.created_at,
            updated_at: response.updated_at,
        }
    }
}

// ============================================================================
// RESPONSE ENVELOPES
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListSurveysResponse {
    pub surveys: Vec<SurveyView>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListResponsesResponse {
    pub responses: Vec<ResponseView>,
}

/// Returned by the response upsert: the survey plus the full response
/// list, so the client reads its own write.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitResponseResponse {
    pub survey: SurveyView,
    pub responses: Vec<ResponseView>,
}

/// One flagged response as reported to the caller, with the explanation
/// as stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViolationView {
    pub response_id: ResponseId,
    pub explanation: String,
}

/// Result of a moderation pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModerationReport {
    /// Responses examined by this pass.
    pub total_responses: usize,
    /// Responses run through validation (the whole set; every response
    /// is re-evaluated).
    pub validated_responses: usize,
    /// The flagged subset with explanations.
    pub violations: Vec<ViolationView>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeletedCountResponse {
    pub deleted: usize,
}
