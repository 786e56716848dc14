//! Shared primitives for all Rust crates in Coffer.

#![forbid(unsafe_code)]

/// Authentication primitives shared across services.
pub mod auth;

mod ids;

use thiserror::Error;

pub use auth::ActorIdentity;
pub use ids::{CipherId, CollectionId, GroupId, OrganizationId, OrganizationUserId, UserId};

/// Result type used across Coffer crates.
pub type AppResult<T> = Result<T, AppError>;

/// Common application error categories.
///
/// Authorization denials and missing resources are kept apart here. Only the
/// outermost boundary decides whether both are reported identically.
#[derive(Debug, Error)]
pub enum AppError {
    /// Invalid input, violated invariant or malformed request.
    #[error("validation error: {0}")]
    Validation(String),

    /// Requested resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Actor is identified but blocked by authorization policy.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Internal unexpected error, including storage and cache failures.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Rewrites a denial into the error reported for a missing resource.
    ///
    /// Callers facing end users apply this so that tenant resources the actor
    /// cannot see are indistinguishable from resources that do not exist.
    #[must_use]
    pub fn conceal_denial(self) -> Self {
        match self {
            Self::Forbidden(_) => Self::NotFound("resource not found".to_owned()),
            other => other,
        }
    }

    /// Returns whether the error is a client-side request error.
    #[must_use]
    pub fn is_invalid_request(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}
