//! API Configuration Module
//!
//! Configuration for CORS, network binding, and the Anthropic collaborator.
//! Loaded from environment variables with development defaults.

// ============================================================================
// API CONFIGURATION
// ============================================================================

/// API configuration for binding, CORS, and the external collaborator.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Bind host (default: 0.0.0.0).
    pub bind_host: String,

    /// Bind port (default: 3000).
    pub port: u16,

    /// Allowed CORS origins (comma-separated in env var).
    /// Empty means allow all origins (dev mode).
    pub cors_origins: Vec<String>,

    /// Anthropic API key for the moderation and summarization providers.
    pub anthropic_api_key: Option<String>,

    /// Anthropic model name.
    pub anthropic_model: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_host: "0.0.0.0".to_string(),
            port: 3000,
            cors_origins: Vec::new(), // Empty = allow all
            anthropic_api_key: None,
            anthropic_model: "claude-3-5-sonnet-20241022".to_string(),
        }
    }
}

impl ApiConfig {
    /// Create ApiConfig from environment variables.
    ///
    /// Environment variables:
    /// - `CANVASS_API_BIND`: Bind host (default: 0.0.0.0)
    /// - `PORT` or `CANVASS_API_PORT`: Bind port (default: 3000)
    /// - `CANVASS_CORS_ORIGINS`: Comma-separated allowed origins (empty = allow all)
    /// - `ANTHROPIC_API_KEY`: API key for the collaborator providers
    /// - `CANVASS_ANTHROPIC_MODEL`: Model name (default: claude-3-5-sonnet-20241022)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let bind_host =
            std::env::var("CANVASS_API_BIND").unwrap_or(defaults.bind_host);

        let port = std::env::var("PORT")
            .ok()
            .or_else(|| std::env::var("CANVASS_API_PORT").ok())
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.port);

        let cors_origins = std::env::var("CANVASS_CORS_ORIGINS")
            .ok()
            .map(|s| {
                s.split(',')
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let anthropic_api_key = std::env::var("ANTHROPIC_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty());

        let anthropic_model =
            std::env::var("CANVASS_ANTHROPIC_MODEL").unwrap_or(defaults.anthropic_model);

        Self {
            bind_host,
            port,
            cors_origins,
            anthropic_api_key,
            anthropic_model,
        }
    }

    /// Check if running in production mode (strict CORS).
    pub fn is_production(&self) -> bool {
        !self.cors_origins.is_empty()
    }

    /// Check if a given origin is allowed.
    pub fn is_origin_allowed(&self, origin: &str) -> bool {
        if self.cors_origins.is_empty() {
            // Dev mode: allow all
            return true;
        }
        self.cors_origins.iter().any(|allowed| allowed == origin)
    }
}
