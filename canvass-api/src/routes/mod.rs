//! REST API Routes Module
//!
//! Route handlers organized by concern:
//! - Survey CRUD and lifecycle under /api/v1/surveys
//! - Response submission and removal nested under each survey
//! - Moderation and summary operations
//! - Health check endpoints (Kubernetes-compatible, public)
//! - CORS support for browser-based clients

pub mod health;
pub mod moderation;
pub mod response;
pub mod summary;
pub mod survey;

use std::time::Duration;

use axum::{
    error_handling::HandleErrorLayer,
    http::{header, HeaderValue, Method},
    middleware::from_fn_with_state,
    routing::{delete, get, post, put},
    Router,
};
use tower::{BoxError, ServiceBuilder};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::auth::AuthConfig;
use crate::config::ApiConfig;
use crate::error::{ApiError, ApiResult};
use crate::middleware::{auth_middleware, AuthMiddlewareState};
use crate::state::AppState;

const REQUEST_TIMEOUT_SECS: u64 = 30;
const MAX_IN_FLIGHT_REQUESTS: usize = 1024;

// ============================================================================
// ROUTER SETUP
// ============================================================================

/// Survey, response, moderation, and summary routes. All require
/// authentication.
fn build_survey_routes(state: AppState) -> Router {
    Router::new()
        .route(
            "/",
            post(survey::create_survey).get(survey::list_surveys),
        )
        .route("/search", get(survey::search_surveys))
        .route(
            "/:id",
            get(survey::get_survey).delete(survey::delete_survey),
        )
        .route("/:id/close", post(survey::close_survey))
        .route("/:id/expiry", put(survey::update_expiry))
        .route(
            "/:id/responses",
            post(response::submit_response).get(response::list_responses),
        )
        .route(
            "/:id/responses/:response_id",
            put(response::update_response).delete(response::delete_response),
        )
        .route("/:id/bad-responses", delete(response::delete_bad_responses))
        .route("/:id/moderate", post(moderation::moderate_survey))
        .route("/:id/summary", post(summary::generate_summary))
        .route(
            "/:id/summary/visibility",
            put(summary::set_summary_visibility),
        )
        .with_state(state)
}

/// Create the complete API router.
///
/// # Middleware Order (outer to inner)
/// 1. CORS (outermost) - handles preflight requests
/// 2. Tracing - one span per request
/// 3. Load shedding - timeout and in-flight cap
/// 4. Auth (only on /api/v1/*) - validates the bearer token
///
/// Health endpoints under /health stay public.
pub fn create_api_router(
    state: AppState,
    api_config: &ApiConfig,
    auth_config: AuthConfig,
) -> ApiResult<Router> {
    auth_config.validate_for_production()?;

    let auth_state = AuthMiddlewareState::new(auth_config);
    let api_routes = Router::new()
        .nest("/surveys", build_survey_routes(state.clone()))
        .layer(from_fn_with_state(auth_state, auth_middleware));

    let cors = build_cors_layer(api_config);

    Ok(Router::new()
        .nest("/api/v1", api_routes)
        .nest("/health", health::create_router(state))
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(handle_middleware_error))
                .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .concurrency_limit(MAX_IN_FLIGHT_REQUESTS),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors))
}

/// Convert load-shedding layer errors into the standard error envelope.
async fn handle_middleware_error(err: BoxError) -> ApiError {
    if err.is::<tower::timeout::error::Elapsed>() {
        ApiError::internal_error("Request timed out")
    } else {
        ApiError::internal_error(format!("Service error: {}", err))
    }
}

// ============================================================================
// CORS LAYER
// ============================================================================

/// Build the CORS layer from ApiConfig.
///
/// In development mode (empty origins), allows all origins. In
/// production mode, only the configured origins are allowed.
fn build_cors_layer(config: &ApiConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .max_age(Duration::from_secs(3600));

    if config.cors_origins.is_empty() {
        tracing::info!("CORS: development mode, allowing all origins");
        cors.allow_origin(Any).allow_headers(Any)
    } else {
        tracing::info!(origins = ?config.cors_origins, "CORS: allowing configured origins");
        let origins: Vec<HeaderValue> = config
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        cors.allow_origin(origins).allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            header::ACCEPT,
        ])
    }
}
