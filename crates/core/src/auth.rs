use serde::{Deserialize, Serialize};

use crate::{AppError, AppResult, UserId};

/// Authenticated caller as supplied by the identity/session layer.
///
/// The user id is optional because machine callers and half-initialised
/// sessions reach the engine without one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorIdentity {
    user_id: Option<UserId>,
    email: Option<String>,
}

impl ActorIdentity {
    /// Creates an identity for an authenticated user.
    #[must_use]
    pub fn new(user_id: UserId, email: Option<String>) -> Self {
        Self {
            user_id: Some(user_id),
            email,
        }
    }

    /// Creates an identity that carries no user id.
    #[must_use]
    pub fn anonymous() -> Self {
        Self {
            user_id: None,
            email: None,
        }
    }

    /// Returns the user id, if one was established.
    #[must_use]
    pub fn user_id(&self) -> Option<UserId> {
        self.user_id
    }

    /// Returns the user id or fails with a request error.
    pub fn require_user_id(&self) -> AppResult<UserId> {
        self.user_id
            .ok_or_else(|| AppError::Validation("actor user id is required".to_owned()))
    }

    /// Returns the email, if the identity provider returned one.
    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }
}
