//! Authentication Module
//!
//! JWT bearer authentication for the Canvass API. Token issuance is
//! external; this module verifies tokens, extracts the caller's identity
//! claims, and rejects inactive accounts at the gate.

use crate::error::{ApiError, ApiResult};
use canvass_core::{Role, UserId};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

// ============================================================================
// CLOCK ABSTRACTION (FOR DETERMINISTIC TESTS + CI ROBUSTNESS)
// ============================================================================

/// Clock abstraction for JWT time validation.
///
/// By owning time validation ourselves (instead of letting `jsonwebtoken`
/// do it), we avoid the `SystemTime::now()` panic path on broken clocks
/// and make tests fully deterministic.
pub trait JwtClock: Send + Sync {
    /// Get current time as Unix epoch seconds.
    fn now_epoch_secs(&self) -> i64;
}

/// Production clock using system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl JwtClock for SystemClock {
    fn now_epoch_secs(&self) -> i64 {
        chrono::Utc::now().timestamp()
    }
}

/// Fixed clock for deterministic tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub i64);

impl JwtClock for FixedClock {
    fn now_epoch_secs(&self) -> i64 {
        self.0
    }
}

// ============================================================================
// JWT SECRET (TYPE-SAFE)
// ============================================================================

const INSECURE_DEFAULT_SECRET: &str = "INSECURE_DEFAULT_SECRET_CHANGE_IN_PRODUCTION";

/// Type-safe JWT secret that prevents accidental logging.
#[derive(Clone)]
pub struct JwtSecret(SecretString);

impl JwtSecret {
    /// Create a new JWT secret. Empty or whitespace-only secrets fall back
    /// to the insecure development default.
    pub fn new(secret: String) -> Self {
        let normalized = if secret.trim().is_empty() {
            INSECURE_DEFAULT_SECRET.to_string()
        } else {
            secret
        };
        Self(SecretString::new(normalized.into()))
    }

    /// Expose the secret value (only for cryptographic operations).
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }

    /// Get the length of the secret without exposing it.
    pub fn len(&self) -> usize {
        self.0.expose_secret().len()
    }

    /// Check if the secret is empty without exposing it.
    pub fn is_empty(&self) -> bool {
        self.0.expose_secret().is_empty()
    }

    /// Check if the secret is the insecure default.
    pub fn is_insecure_default(&self) -> bool {
        self.0.expose_secret() == INSECURE_DEFAULT_SECRET
    }
}

impl std::fmt::Debug for JwtSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "JwtSecret([REDACTED, {} chars])", self.len())
    }
}

// ============================================================================
// CONFIGURATION
// ============================================================================

/// Authentication configuration.
#[derive(Clone)]
pub struct AuthConfig {
    /// JWT secret key for signing and verification
    pub jwt_secret: JwtSecret,

    /// JWT algorithm (default: HS256)
    pub jwt_algorithm: Algorithm,

    /// JWT token expiration in seconds (default: 1 hour)
    pub jwt_expiration_secs: i64,

    /// JWT clock skew tolerance in seconds (default: 60)
    pub jwt_clock_skew_secs: i64,

    /// Clock for JWT time validation (injected for testing)
    pub clock: Arc<dyn JwtClock>,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &self.jwt_secret)
            .field("jwt_algorithm", &self.jwt_algorithm)
            .field("jwt_expiration_secs", &self.jwt_expiration_secs)
            .field("jwt_clock_skew_secs", &self.jwt_clock_skew_secs)
            .field("clock", &"<JwtClock>")
            .finish()
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        let secret_str =
            std::env::var("CANVASS_JWT_SECRET").unwrap_or_else(|_| INSECURE_DEFAULT_SECRET.to_string());

        Self {
            jwt_secret: JwtSecret::new(secret_str),
            jwt_algorithm: Algorithm::HS256,
            jwt_expiration_secs: 3600,
            jwt_clock_skew_secs: 60,
            clock: Arc::new(SystemClock),
        }
    }
}

impl AuthConfig {
    /// Create authentication configuration from environment variables.
    ///
    /// # Environment Variables
    /// - `CANVASS_JWT_SECRET`: JWT signing secret
    /// - `CANVASS_JWT_EXPIRATION_SECS`: JWT token expiration (default: 3600)
    /// - `CANVASS_JWT_CLOCK_SKEW_SECS`: Clock skew tolerance (default: 60)
    pub fn from_env() -> Self {
        let secret_str =
            std::env::var("CANVASS_JWT_SECRET").unwrap_or_else(|_| INSECURE_DEFAULT_SECRET.to_string());

        Self {
            jwt_secret: JwtSecret::new(secret_str),
            jwt_algorithm: Algorithm::HS256,
            jwt_expiration_secs: std::env::var("CANVASS_JWT_EXPIRATION_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(3600),
            jwt_clock_skew_secs: std::env::var("CANVASS_JWT_CLOCK_SKEW_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(60),
            clock: Arc::new(SystemClock),
        }
    }

    /// Validate the authentication configuration for production use.
    ///
    /// Called at server startup so insecure defaults cannot reach
    /// production silently. In development, warnings are logged and the
    /// server continues.
    pub fn validate_for_production(&self) -> ApiResult<()> {
        let environment = std::env::var("CANVASS_ENVIRONMENT")
            .unwrap_or_else(|_| "development".to_string())
            .to_lowercase();

        let is_production = environment == "production" || environment == "prod";

        if self.jwt_secret.is_insecure_default() {
            if is_production {
                return Err(ApiError::invalid_input(format!(
                    "Cannot start server in production with insecure JWT secret. \
                     Set CANVASS_JWT_SECRET to a secure value. CANVASS_ENVIRONMENT={}",
                    environment
                )));
            }
            tracing::warn!(
                "Using insecure default JWT secret. Set CANVASS_JWT_SECRET to a \
                 secure random value (minimum 32 characters) before deploying."
            );
        } else if self.jwt_secret.len() < 32 {
            if is_production {
                return Err(ApiError::invalid_input(format!(
                    "JWT secret is too short for production use ({} chars). \
                     It must be at least 32 characters long.",
                    self.jwt_secret.len()
                )));
            }
            tracing::warn!(
                chars = self.jwt_secret.len(),
                "JWT secret is short. For production, use at least 32 characters."
            );
        }

        Ok(())
    }
}

// ============================================================================
// JWT CLAIMS
// ============================================================================

/// JWT claims structure.
///
/// Standard claims plus the identity fields Canvass relies on. Tokens are
/// issued by the external identity service; the same shape is minted by
/// tests via [`generate_jwt_token`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID, UUID string)
    pub sub: String,

    /// Display name of the user
    pub username: String,

    /// Role of the user
    #[serde(default)]
    pub role: Role,

    /// Whether the account is active. Inactive accounts are rejected.
    #[serde(default = "default_true")]
    pub is_active: bool,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

fn default_true() -> bool {
    true
}

impl Claims {
    /// Create new claims for a user using a clock.
    pub fn new(
        user_id: UserId,
        username: impl Into<String>,
        role: Role,
        expiration_secs: i64,
        clock: &dyn JwtClock,
    ) -> Self {
        let now = clock.now_epoch_secs();

        Self {
            sub: user_id.to_string(),
            username: username.into(),
            role,
            is_active: true,
            iat: now,
            exp: now + expiration_secs,
        }
    }

    /// Mark the account inactive (used by tests and external issuers).
    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }
}

// ============================================================================
// AUTHENTICATION CONTEXT
// ============================================================================

/// Authentication context extracted from a verified token.
///
/// This is injected into Axum request extensions after successful
/// authentication.
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// User ID from the JWT sub claim
    pub user_id: UserId,

    /// Display name from the JWT
    pub username: String,

    /// Role from the JWT
    pub role: Role,
}

impl AuthContext {
    /// Whether this caller may manage a survey owned by `creator`.
    /// Admins may manage any survey.
    pub fn can_manage(&self, creator: UserId) -> bool {
        self.user_id == creator || self.role == Role::Admin
    }
}

// ============================================================================
// AUTHENTICATION FUNCTIONS
// ============================================================================

/// Validate JWT claim times using our own clock logic.
fn validate_claim_times(now: i64, exp: i64, leeway_secs: i64) -> ApiResult<()> {
    // Allow slightly-in-the-past expiry within leeway.
    if exp < now - leeway_secs {
        return Err(ApiError::token_expired());
    }
    Ok(())
}

/// Validate a JWT token and extract claims.
///
/// Signature validation only happens inside `jsonwebtoken`; time
/// validation uses the injected clock with skew tolerance.
pub fn validate_jwt_token(config: &AuthConfig, token: &str) -> ApiResult<Claims> {
    let decoding_key = DecodingKey::from_secret(config.jwt_secret.expose().as_bytes());

    let mut validation = Validation::new(config.jwt_algorithm);
    validation.validate_exp = false; // We'll do this ourselves with our clock
    validation.validate_nbf = false;
    validation.required_spec_claims = std::collections::HashSet::from(["exp".to_string()]);

    let token_data =
        decode::<Claims>(token, &decoding_key, &validation).map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::InvalidToken => {
                ApiError::invalid_token("Token is invalid")
            }
            jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                ApiError::invalid_token("Token signature is invalid")
            }
            _ => ApiError::invalid_token(format!("Token validation failed: {}", e)),
        })?;

    let claims = token_data.claims;

    let now = config.clock.now_epoch_secs();
    if now < 0 {
        tracing::error!(
            timestamp = now,
            "System clock returned pre-epoch time - server time is broken"
        );
        return Err(ApiError::internal_error("Server time configuration error"));
    }

    validate_claim_times(now, claims.exp, config.jwt_clock_skew_secs)?;

    Ok(claims)
}

/// Generate a JWT token for a user. Used by tests and tooling; production
/// tokens come from the external identity service with the same claims.
pub fn generate_jwt_token(config: &AuthConfig, claims: &Claims) -> ApiResult<String> {
    let encoding_key = EncodingKey::from_secret(config.jwt_secret.expose().as_bytes());
    let header = Header::new(config.jwt_algorithm);

    encode(&header, claims, &encoding_key)
        .map_err(|e| ApiError::internal_error(format!("Failed to generate token: {}", e)))
}

/// Authenticate a request from its Authorization header value.
///
/// Verifies the bearer token, rejects inactive accounts, and produces the
/// [`AuthContext`] injected into request extensions.
pub fn authenticate(config: &AuthConfig, auth_header: Option<&str>) -> ApiResult<AuthContext> {
    let auth_value = auth_header
        .ok_or_else(|| ApiError::unauthorized("Authentication required: provide Authorization header"))?;

    let token = auth_value.strip_prefix("Bearer ").ok_or_else(|| {
        ApiError::invalid_token("Authorization header must use Bearer scheme")
    })?;

    let claims = validate_jwt_token(config, token)?;

    if !claims.is_active {
        return Err(ApiError::unauthorized("Account is inactive"));
    }

    let user_id = Uuid::parse_str(&claims.sub)
        .map_err(|_| ApiError::invalid_token("Token subject is not a valid user ID"))?;

    Ok(AuthContext {
        user_id,
        username: claims.username,
        role: claims.role,
    })
}
