//! # AppError
//!
//! Centralized error handling for the brewlog ecosystem.
//! Maps domain-specific failures to actionable error types.

use thiserror::Error;

/// The primary error type for all domain operations.
#[derive(Error, Debug)]
pub enum AppError {
    /// Resource not found (e.g., Beer, Comment, parent Comment)
    #[error("{0} not found with ID {1}")]
    NotFound(String, String),

    /// Validation failure (e.g., score out of range, empty comment body)
    #[error("validation error: {0}")]
    Validation(String),

    /// No actor could be resolved for an operation that requires one
    #[error("unauthenticated: {0}")]
    Unauthenticated(String),

    /// Actor resolved but lacks rights (not owner/admin, guest window expired)
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Uniqueness collision (e.g., concurrent first rating, duplicate username)
    #[error("conflict: {0}")]
    Conflict(String),

    /// Infrastructure failure (e.g., DB down)
    #[error("internal service error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn not_found(kind: impl Into<String>, id: impl ToString) -> Self {
        Self::NotFound(kind.into(), id.to_string())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn internal(err: impl ToString) -> Self {
        Self::Internal(err.to_string())
    }
}

/// A specialized Result type for brewlog logic.
pub type Result<T> = std::result::Result<T, AppError>;
