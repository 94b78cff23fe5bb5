//! Canvass LLM - Collaborator Abstraction Layer
//!
//! Provider-agnostic traits for response moderation and survey
//! summarization. The service layer talks to these traits only; the
//! Anthropic implementation in [`providers`] is the default backend.

pub mod providers;

pub use providers::anthropic::{AnthropicClient, AnthropicModerator, AnthropicSummarizer};

use async_trait::async_trait;
use canvass_core::{CanvassResult, ResponseId};
use serde::{Deserialize, Serialize};

// ============================================================================
// MODERATION CONTRACT
// ============================================================================

/// A single response handed to the moderator for review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseForReview {
    pub id: ResponseId,
    pub username: String,
    pub content: String,
}

/// Everything the moderator needs to judge a survey's responses: the
/// question for context plus the creator-authored guidelines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModerationRequest {
    pub question: String,
    pub permitted_domains: String,
    pub permitted_responses: String,
    pub responses: Vec<ResponseForReview>,
}

/// One flagged response with the moderator's explanation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViolationFinding {
    pub response_id: ResponseId,
    pub explanation: String,
}

/// Moderator output. Responses absent from `violations` are compliant.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ModerationVerdict {
    pub violations: Vec<ViolationFinding>,
}

/// Trait for moderation providers.
/// Implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait ModerationProvider: Send + Sync {
    /// Review every response in the request against the guidelines.
    ///
    /// # Returns
    /// * `Ok(ModerationVerdict)` - Findings for the violating subset
    /// * `Err(CanvassError::Llm)` - If the provider call fails; the caller
    ///   must treat this as "no verdict" and mutate nothing
    async fn review(&self, request: &ModerationRequest) -> CanvassResult<ModerationVerdict>;
}

// ============================================================================
// SUMMARIZATION CONTRACT
// ============================================================================

/// Everything the summarizer needs: survey context, the creator's
/// summary instructions, and the response contents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRequest {
    pub area: String,
    pub question: String,
    pub summary_instructions: String,
    pub responses: Vec<String>,
}

/// Trait for summarization providers.
/// Implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait SummaryProvider: Send + Sync {
    /// Produce a structured summary of the responses. The output shape is
    /// provider-defined; callers store it opaquely and serve it verbatim.
    async fn summarize(&self, request: &SummaryRequest) -> CanvassResult<serde_json::Value>;
}
