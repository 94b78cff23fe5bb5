//! Error types for Canvass operations

use thiserror::Error;
use uuid::Uuid;

/// Domain errors raised by lifecycle gates and service-level invariant
/// checks. Each variant maps to a stable machine-readable kind at the
/// API boundary.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("{0}")]
    Validation(String),

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: Uuid },

    #[error("{0}")]
    Authorization(String),

    #[error("{0}")]
    Conflict(String),
}

impl CoreError {
    pub fn validation(message: impl Into<String>) -> Self {
        CoreError::Validation(message.into())
    }

    pub fn not_found(entity: &'static str, id: Uuid) -> Self {
        CoreError::NotFound { entity, id }
    }

    pub fn authorization(message: impl Into<String>) -> Self {
        CoreError::Authorization(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        CoreError::Conflict(message.into())
    }
}

/// Storage layer errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("{entity} not found with id {id}")]
    NotFound { entity: &'static str, id: Uuid },

    #[error("Duplicate key on {constraint}")]
    DuplicateKey { constraint: &'static str },

    #[error("Insert failed for {entity}: {reason}")]
    InsertFailed { entity: &'static str, reason: String },

    #[error("Storage lock poisoned")]
    LockPoisoned,
}

/// LLM collaborator errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LlmError {
    #[error("No LLM provider configured")]
    ProviderNotConfigured,

    #[error("Request to {provider} failed with status {status}: {message}")]
    RequestFailed {
        provider: String,
        status: i32,
        message: String,
    },

    #[error("Rate limited by {provider}")]
    RateLimited { provider: String },

    #[error("Invalid API key for {provider}")]
    InvalidApiKey { provider: String },

    #[error("Invalid response from {provider}: {reason}")]
    InvalidResponse { provider: String, reason: String },
}

/// Top-level error wrapper covering every layer below the API boundary.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CanvassError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Llm(#[from] LlmError),
}

/// A specialized Result type for Canvass logic.
pub type CanvassResult<T> = Result<T, CanvassError>;
