//! Shared application state for Axum routers.

use std::sync::Arc;

use canvass_llm::{ModerationProvider, SummaryProvider};
use canvass_storage::{ResponseStore, SurveyStore};

/// Application-wide state shared across all routes.
///
/// Stores and providers sit behind trait objects so tests can swap in
/// scripted implementations and a durable store can replace the
/// in-memory one without touching the handlers.
#[derive(Clone)]
pub struct AppState {
    pub surveys: Arc<dyn SurveyStore>,
    pub responses: Arc<dyn ResponseStore>,
    pub moderator: Arc<dyn ModerationProvider>,
    pub summarizer: Arc<dyn SummaryProvider>,
    pub start_time: std::time::Instant,
}

impl AppState {
    pub fn new(
        surveys: Arc<dyn SurveyStore>,
        responses: Arc<dyn ResponseStore>,
        moderator: Arc<dyn ModerationProvider>,
        summarizer: Arc<dyn SummaryProvider>,
    ) -> Self {
        Self {
            surveys,
            responses,
            moderator,
            summarizer,
            start_time: std::time::Instant::now(),
        }
    }
}
