//! Core entity structures

use crate::{new_entity_id, ResponseId, SurveyId, Timestamp, UserId, ValidationState};
use chrono::Utc;
use serde::{Deserialize, Serialize};

// ============================================================================
// FIELD BOUNDS
// ============================================================================

/// Inclusive character bounds for survey and response text fields.
/// Enforced at the service boundary before any write.
pub const AREA_MIN: usize = 3;
pub const AREA_MAX: usize = 100;
pub const QUESTION_MIN: usize = 10;
pub const QUESTION_MAX: usize = 1000;
pub const DOMAINS_MIN: usize = 2;
pub const DOMAINS_MAX: usize = 500;
pub const GUIDELINE_MIN: usize = 10;
pub const GUIDELINE_MAX: usize = 500;
pub const RESPONSE_MIN: usize = 10;
pub const RESPONSE_MAX: usize = 2000;
pub const EXPLANATION_MIN: usize = 10;

/// Maximum survey lifetime from the moment of creation or expiry update.
pub const MAX_EXPIRY_DAYS: i64 = 365;

// ============================================================================
// SURVEY
// ============================================================================

/// Moderation and summarization instructions, authored by the survey
/// creator. Treated as stable once responses exist so that a moderation
/// pass stays meaningful.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Guidelines {
    /// Content domains a response is allowed to draw from.
    pub permitted_domains: String,
    /// Guidance on acceptable response shape and content.
    pub permitted_responses: String,
    /// Instructions steering the external summarizer.
    pub summary_instructions: String,
}

/// Opaque structured output of the external summarizer, stored serialized.
///
/// Invariant: `is_visible == true` requires non-empty `content`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    /// Serialized JSON produced by the summarizer. Deserialized only on
    /// the read side, and only when visible.
    pub content: String,
    pub is_visible: bool,
    pub last_updated: Timestamp,
}

/// A question plus guidelines, owned by a creator, with an expiry and
/// open/closed state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Survey {
    pub survey_id: SurveyId,
    pub creator: UserId,
    /// Username of the creator, denormalized from the verified identity.
    pub creator_name: String,
    pub area: String,
    pub question: String,
    pub guidelines: Guidelines,
    pub expiry_date: Timestamp,
    pub is_closed: bool,
    pub summary: Option<Summary>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Survey {
    /// Construct a new open survey. Field bounds and the expiry window are
    /// the caller's responsibility (service layer gates).
    pub fn new(
        creator: UserId,
        creator_name: impl Into<String>,
        area: impl Into<String>,
        question: impl Into<String>,
        guidelines: Guidelines,
        expiry_date: Timestamp,
    ) -> Self {
        let now = Utc::now();
        Self {
            survey_id: new_entity_id(),
            creator,
            creator_name: creator_name.into(),
            area: area.into(),
            question: question.into(),
            guidelines,
            expiry_date,
            is_closed: false,
            summary: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// A survey is expired once `now` passes its expiry date.
    pub fn is_expired(&self, now: Timestamp) -> bool {
        now > self.expiry_date
    }

    /// Active = accepting new and edited responses.
    pub fn is_active(&self, now: Timestamp) -> bool {
        !self.is_closed && !self.is_expired(now)
    }
}

// ============================================================================
// RESPONSE
// ============================================================================

/// Submission provenance captured alongside a response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseMetadata {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    /// Must not be in the future; refreshed on every upsert.
    pub submission_time: Timestamp,
}

impl ResponseMetadata {
    pub fn now(ip_address: Option<String>, user_agent: Option<String>) -> Self {
        Self {
            ip_address,
            user_agent,
            submission_time: Utc::now(),
        }
    }
}

/// One respondent's content against a survey.
///
/// At most one response exists per `(survey_id, user_id)` pair; the store
/// enforces this with a unique-constraint upsert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub response_id: ResponseId,
    pub survey_id: SurveyId,
    pub user_id: UserId,
    /// Username of the respondent, denormalized for collaborator payloads.
    pub username: String,
    pub content: String,
    pub validation: ValidationState,
    /// Present iff `validation == Violation`; cleared on approval.
    pub violation_explanation: Option<String>,
    pub metadata: ResponseMetadata,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Response {
    pub fn new(
        survey_id: SurveyId,
        user_id: UserId,
        username: impl Into<String>,
        content: impl Into<String>,
        metadata: ResponseMetadata,
    ) -> Self {
        let now = Utc::now();
        Self {
            response_id: new_entity_id(),
            survey_id,
            user_id,
            username: username.into(),
            content: content.into(),
            validation: ValidationState::Pending,
            violation_explanation: None,
            metadata,
            created_at: now,
            updated_at: now,
        }
    }

    /// Clear the response into the approved state, dropping any stale
    /// explanation from an earlier pass.
    pub fn mark_approved(&mut self) {
        self.validation = ValidationState::Approved;
        self.violation_explanation = None;
        self.updated_at = Utc::now();
    }

    /// Flag the response as a violation with the classifier's explanation.
    pub fn mark_violation(&mut self, explanation: impl Into<String>) {
        self.validation = ValidationState::Violation;
        self.violation_explanation = Some(explanation.into());
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sample_guidelines() -> Guidelines {
        Guidelines {
            permitted_domains: "technology, software".to_string(),
            permitted_responses: "constructive opinions only".to_string(),
            summary_instructions: "group by recurring themes".to_string(),
        }
    }

    fn sample_survey(expiry_offset: Duration) -> Survey {
        Survey::new(
            new_entity_id(),
            "alice",
            "developer tools",
            "Which editor do you use daily?",
            sample_guidelines(),
            Utc::now() + expiry_offset,
        )
    }

    #[test]
    fn test_survey_active_until_closed_or_expired() {
        let now = Utc::now();
        let mut survey = sample_survey(Duration::days(1));
        assert!(survey.is_active(now));
        assert!(!survey.is_expired(now));

        survey.is_closed = true;
        assert!(!survey.is_active(now));

        let expired = sample_survey(Duration::days(-1));
        assert!(expired.is_expired(now));
        assert!(!expired.is_active(now));
    }

    #[test]
    fn test_response_defaults_to_pending() {
        let survey = sample_survey(Duration::days(1));
        let response = Response::new(
            survey.survey_id,
            new_entity_id(),
            "bob",
            "I use a terminal editor",
            ResponseMetadata::now(None, None),
        );
        assert_eq!(response.validation, ValidationState::Pending);
        assert!(response.violation_explanation.is_none());
    }

    #[test]
    fn test_violation_round_trip_clears_explanation() {
        let survey = sample_survey(Duration::days(1));
        let mut response = Response::new(
            survey.survey_id,
            new_entity_id(),
            "bob",
            "completely off topic",
            ResponseMetadata::now(None, None),
        );

        response.mark_violation("off-topic");
        assert_eq!(response.validation, ValidationState::Violation);
        assert_eq!(response.violation_explanation.as_deref(), Some("off-topic"));

        response.mark_approved();
        assert_eq!(response.validation, ValidationState::Approved);
        assert!(response.violation_explanation.is_none());
    }
}
