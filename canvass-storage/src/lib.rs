//! Canvass Storage - Repository Traits and In-Memory Reference Store
//!
//! Defines the persistence abstraction for surveys and responses. The
//! contract is deliberately narrow: any durable document or key-value
//! store with unique-constraint support can implement it. The in-memory
//! implementation in [`memory`] is the reference adapter used by tests
//! and development deployments.

pub mod memory;

pub use memory::MemoryStore;

use async_trait::async_trait;
use canvass_core::{
    CanvassResult, Response, ResponseId, ResponseMetadata, Survey, SurveyId, UserId,
};

/// Input for the atomic create-or-replace keyed by `(survey, user)`.
#[derive(Debug, Clone)]
pub struct ResponseDraft {
    pub survey_id: SurveyId,
    pub user_id: UserId,
    pub username: String,
    pub content: String,
    pub metadata: ResponseMetadata,
}

/// Durable collection of surveys.
#[async_trait]
pub trait SurveyStore: Send + Sync {
    /// Insert a new survey. Fails with `StorageError::DuplicateKey` when a
    /// survey with an identical `(question, guidelines)` tuple exists.
    async fn insert(&self, survey: &Survey) -> CanvassResult<()>;

    /// Get a survey by ID.
    async fn get(&self, id: SurveyId) -> CanvassResult<Option<Survey>>;

    /// List surveys, newest first.
    async fn list(&self, offset: usize, limit: usize) -> CanvassResult<Vec<Survey>>;

    /// Replace a stored survey. Fails with `StorageError::NotFound` when
    /// the survey does not exist.
    async fn update(&self, survey: &Survey) -> CanvassResult<()>;

    /// Delete a survey. Response cascade is the caller's responsibility.
    async fn delete(&self, id: SurveyId) -> CanvassResult<()>;

    /// Case-insensitive keyword search over `area` and `question`.
    async fn search(&self, query: &str) -> CanvassResult<Vec<Survey>>;
}

/// Durable collection of responses with the `(survey, user)` uniqueness
/// invariant.
#[async_trait]
pub trait ResponseStore: Send + Sync {
    /// Atomic create-or-replace keyed by `(survey_id, user_id)`.
    ///
    /// On replace the stored response keeps its ID but gets the new
    /// content, a `Pending` validation state, a cleared explanation, and
    /// refreshed metadata. The entire operation happens under a single
    /// write guard so two concurrent submissions from the same user can
    /// never produce two rows.
    async fn upsert_by_survey_user(&self, draft: ResponseDraft) -> CanvassResult<Response>;

    /// Get a response by ID.
    async fn get(&self, id: ResponseId) -> CanvassResult<Option<Response>>;

    /// List all responses for a survey, newest first.
    async fn list_by_survey(&self, survey_id: SurveyId) -> CanvassResult<Vec<Response>>;

    /// Replace a stored response. Fails with `StorageError::NotFound`
    /// when the response does not exist.
    async fn update(&self, response: &Response) -> CanvassResult<()>;

    /// Delete a single response.
    async fn delete(&self, id: ResponseId) -> CanvassResult<()>;

    /// Delete every response belonging to a survey (cascade on survey
    /// deletion). Returns the number removed.
    async fn delete_by_survey(&self, survey_id: SurveyId) -> CanvassResult<usize>;

    /// Delete every `Violation`-state response for a survey. Returns the
    /// number removed.
    async fn delete_violations(&self, survey_id: SurveyId) -> CanvassResult<usize>;
}
