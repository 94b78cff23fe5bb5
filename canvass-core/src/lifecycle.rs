//! Lifecycle Engine - pure predicates gating every mutation
//!
//! Each gate is consulted by the service layer immediately before a write,
//! never cached from an earlier read. All functions take `now` explicitly
//! so tests stay deterministic.

use crate::{CoreError, Summary, Survey, Timestamp, UserId, MAX_EXPIRY_DAYS};
use chrono::Duration;

/// A survey cannot be closed once expired; expiry already implies it.
pub fn can_close(survey: &Survey, now: Timestamp) -> Result<(), CoreError> {
    if survey.is_expired(now) {
        return Err(CoreError::conflict("Cannot close an expired survey"));
    }
    Ok(())
}

/// Gate for creating or editing responses. The closed check takes
/// precedence when a survey is both closed and expired.
pub fn can_accept_response(survey: &Survey, now: Timestamp) -> Result<(), CoreError> {
    if survey.is_closed {
        return Err(CoreError::validation("Survey is closed"));
    }
    if survey.is_expired(now) {
        return Err(CoreError::validation("Survey has expired"));
    }
    Ok(())
}

/// New expiry must land strictly in the future and at most one year out.
pub fn can_update_expiry(
    survey: &Survey,
    new_date: Timestamp,
    now: Timestamp,
) -> Result<(), CoreError> {
    if survey.is_closed {
        return Err(CoreError::conflict(
            "Cannot update expiry date of a closed survey",
        ));
    }
    if !expiry_within_window(new_date, now) {
        return Err(CoreError::validation("Invalid expiry date"));
    }
    Ok(())
}

/// Shared expiry-window rule, also applied at survey creation.
pub fn expiry_within_window(expiry: Timestamp, now: Timestamp) -> bool {
    expiry > now && expiry <= now + Duration::days(MAX_EXPIRY_DAYS)
}

/// Summaries can only be generated by the creator over a non-empty
/// response set.
pub fn can_generate_summary(
    survey: &Survey,
    caller: UserId,
    response_count: usize,
) -> Result<(), CoreError> {
    if survey.creator != caller {
        return Err(CoreError::authorization(
            "Not authorized to generate summary for this survey",
        ));
    }
    if response_count == 0 {
        return Err(CoreError::validation(
            "No responses available for summarization",
        ));
    }
    Ok(())
}

/// A summary may only become visible once content exists.
pub fn can_make_visible(summary: &Option<Summary>) -> Result<(), CoreError> {
    match summary {
        Some(s) if !s.content.is_empty() => Ok(()),
        _ => Err(CoreError::validation(
            "Cannot make summary visible without content",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{new_entity_id, Guidelines};
    use chrono::Utc;

    fn survey(closed: bool, expiry_offset: Duration) -> Survey {
        let mut s = Survey::new(
            new_entity_id(),
            "carol",
            "remote work",
            "How has remote work changed your routine?",
            Guidelines {
                permitted_domains: "work, lifestyle".to_string(),
                permitted_responses: "personal experiences only".to_string(),
                summary_instructions: "highlight common adjustments".to_string(),
            },
            Utc::now() + expiry_offset,
        );
        s.is_closed = closed;
        s
    }

    #[test]
    fn test_cannot_close_expired_survey() {
        let now = Utc::now();
        let err = can_close(&survey(false, Duration::days(-1)), now).unwrap_err();
        assert!(matches!(err, CoreError::Conflict(_)));

        assert!(can_close(&survey(false, Duration::days(1)), now).is_ok());
    }

    #[test]
    fn test_accept_response_gates() {
        let now = Utc::now();
        assert!(can_accept_response(&survey(false, Duration::days(1)), now).is_ok());

        let err = can_accept_response(&survey(true, Duration::days(1)), now).unwrap_err();
        assert_eq!(err, CoreError::validation("Survey is closed"));

        let err = can_accept_response(&survey(false, Duration::days(-1)), now).unwrap_err();
        assert_eq!(err, CoreError::validation("Survey has expired"));
    }

    #[test]
    fn test_closed_check_takes_precedence_over_expiry() {
        let now = Utc::now();
        let err = can_accept_response(&survey(true, Duration::days(-1)), now).unwrap_err();
        assert_eq!(err, CoreError::validation("Survey is closed"));
    }

    #[test]
    fn test_expiry_window() {
        let now = Utc::now();
        assert!(!expiry_within_window(now, now));
        assert!(!expiry_within_window(now - Duration::hours(1), now));
        assert!(expiry_within_window(now + Duration::days(1), now));
        assert!(expiry_within_window(now + Duration::days(MAX_EXPIRY_DAYS), now));
        assert!(!expiry_within_window(
            now + Duration::days(MAX_EXPIRY_DAYS) + Duration::hours(1),
            now
        ));
    }

    #[test]
    fn test_update_expiry_rejected_on_closed_survey() {
        let now = Utc::now();
        let err =
            can_update_expiry(&survey(true, Duration::days(1)), now + Duration::days(2), now)
                .unwrap_err();
        assert!(matches!(err, CoreError::Conflict(_)));

        let err =
            can_update_expiry(&survey(false, Duration::days(1)), now - Duration::days(2), now)
                .unwrap_err();
        assert_eq!(err, CoreError::validation("Invalid expiry date"));
    }

    #[test]
    fn test_generate_summary_gates() {
        let s = survey(false, Duration::days(1));
        let stranger = new_entity_id();

        let err = can_generate_summary(&s, stranger, 3).unwrap_err();
        assert!(matches!(err, CoreError::Authorization(_)));

        let err = can_generate_summary(&s, s.creator, 0).unwrap_err();
        assert_eq!(
            err,
            CoreError::validation("No responses available for summarization")
        );

        assert!(can_generate_summary(&s, s.creator, 1).is_ok());
    }

    #[test]
    fn test_visibility_requires_content() {
        assert!(can_make_visible(&None).is_err());
        assert!(can_make_visible(&Some(Summary {
            content: String::new(),
            is_visible: false,
            last_updated: Utc::now(),
        }))
        .is_err());
        assert!(can_make_visible(&Some(Summary {
            content: "{\"themes\":[]}".to_string(),
            is_visible: false,
            last_updated: Utc::now(),
        }))
        .is_ok());
    }
}
