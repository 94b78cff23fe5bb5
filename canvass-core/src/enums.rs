//! Enumerations shared across the Canvass crates

use serde::{Deserialize, Serialize};

/// Moderation state of a single response.
///
/// State machine: `Pending -> {Approved, Violation}`, and
/// `Violation <-> Approved` are both reachable because a later
/// moderation pass re-evaluates every response from scratch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationState {
    /// Not yet seen by a moderation pass.
    Pending,
    /// Cleared by the most recent moderation pass.
    Approved,
    /// Flagged by the most recent moderation pass; carries an explanation.
    Violation,
}

impl Default for ValidationState {
    fn default() -> Self {
        ValidationState::Pending
    }
}

impl std::fmt::Display for ValidationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ValidationState::Pending => "pending",
            ValidationState::Approved => "approved",
            ValidationState::Violation => "violation",
        };
        write!(f, "{}", s)
    }
}

/// Role carried in verified identity claims.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Admin,
}

impl Default for Role {
    fn default() -> Self {
        Role::User
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_state_serde_round_trip() -> Result<(), serde_json::Error> {
        let json = serde_json::to_string(&ValidationState::Violation)?;
        assert_eq!(json, "\"violation\"");
        let back: ValidationState = serde_json::from_str(&json)?;
        assert_eq!(back, ValidationState::Violation);
        Ok(())
    }

    #[test]
    fn test_default_states() {
        assert_eq!(ValidationState::default(), ValidationState::Pending);
        assert_eq!(Role::default(), Role::User);
    }
}
