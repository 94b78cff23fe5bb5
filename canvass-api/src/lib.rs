//! Canvass REST API
//!
//! Axum HTTP layer for the Canvass survey service:
//! - Survey CRUD and lifecycle (close, expiry) under /api/v1/surveys
//! - Response submission with atomic one-per-user replacement
//! - LLM-backed moderation and summarization
//! - JWT bearer authentication on every /api/v1 route
//! - Health checks at /health (public)

pub mod auth;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;
pub mod types;
pub mod validation;

pub use auth::{AuthConfig, AuthContext, Claims};
pub use config::ApiConfig;
pub use error::{ApiError, ApiResult, ErrorCode};
pub use routes::create_api_router;
pub use state::AppState;
