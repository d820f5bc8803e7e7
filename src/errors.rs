//! Centralized error handling.
//!
//! Provides a unified error type for the entire crate. Every failure the
//! account service can surface maps to exactly one variant, raised at the
//! point of detection and propagated unchanged to the caller.

use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Recoverable by the caller supplying corrected input
    #[error("{0}")]
    Validation(String),

    // Resource errors
    #[error("Account not found")]
    NotFound,

    /// Optimistic-concurrency failure: either the caller-supplied expected
    /// version was stale, or the store's compare-and-swap lost the race.
    /// Recoverable by re-fetching and retrying with fresh state.
    #[error("Concurrency conflict: account was modified by another request")]
    VersionConflict,

    /// Email, username, or phone already registered to another account.
    #[error("{0} already registered")]
    Duplicate(String),

    /// Registration blocked by risk evaluation. Terminal, no retry implied.
    #[error("Registration blocked by risk assessment")]
    RiskRejected,

    /// Current-password mismatch on password change.
    #[error("Invalid credentials")]
    InvalidCredentials,

    // External service errors
    #[error("Database error")]
    Database(#[from] mongodb::error::Error),

    // Internal
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Stable error code for clients and logs
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::NotFound => "NOT_FOUND",
            AppError::VersionConflict => "CONFLICT",
            AppError::Duplicate(_) => "DUPLICATE",
            AppError::RiskRejected => "RISK_REJECTED",
            AppError::InvalidCredentials => "INVALID_CREDENTIALS",
            AppError::Database(_) => "DATABASE_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// True when the caller can recover by re-fetching current state
    pub fn is_conflict(&self) -> bool {
        matches!(self, AppError::VersionConflict)
    }
}

/// Result type alias
pub type AppResult<T> = Result<T, AppError>;

/// Extension trait for Option -> AppError conversion
pub trait OptionExt<T> {
    fn ok_or_not_found(self) -> AppResult<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_not_found(self) -> AppResult<T> {
        self.ok_or(AppError::NotFound)
    }
}

/// Convenience constructors
impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn duplicate(field: impl Into<String>) -> Self {
        AppError::Duplicate(field.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }
}
