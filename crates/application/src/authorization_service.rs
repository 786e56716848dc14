//! Allow/Deny decision points built on graded access resolution.
//!
//! Every decision point short-circuits on its own role and permission table
//! before falling back to grant resolution. Bulk checks are all-or-nothing:
//! the weakest resolved access across the targets must satisfy the
//! operation. Targets spanning organizations are rejected as invalid input
//! before any access is resolved, and an empty target set is
//! [`AccessDecision::Indeterminate`].

use std::collections::BTreeSet;

use coffer_core::{AppError, AppResult, OrganizationId};
use coffer_domain::{AccessDecision, ActorContext, CustomPermission};

use crate::AccessService;

mod ciphers;
mod collections;
mod organization;

/// Application service answering authorization questions.
#[derive(Clone)]
pub struct AuthorizationService {
    access_service: AccessService,
}

impl AuthorizationService {
    /// Creates an authorization service over an access service.
    #[must_use]
    pub fn new(access_service: AccessService) -> Self {
        Self { access_service }
    }

    /// Returns the underlying access service.
    #[must_use]
    pub fn access_service(&self) -> &AccessService {
        &self.access_service
    }
}

fn require_decision(decision: AccessDecision, denial: impl FnOnce() -> String) -> AppResult<()> {
    match decision {
        AccessDecision::Allow | AccessDecision::Indeterminate => Ok(()),
        AccessDecision::Deny => Err(AppError::Forbidden(denial())),
    }
}

fn holds_any(
    actor: &ActorContext,
    organization_id: OrganizationId,
    permissions: &[CustomPermission],
) -> bool {
    permissions
        .iter()
        .any(|permission| actor.has_permission(organization_id, *permission))
}

fn single_organization<I>(organization_ids: I, resource: &str) -> AppResult<OrganizationId>
where
    I: IntoIterator<Item = OrganizationId>,
{
    let distinct: BTreeSet<OrganizationId> = organization_ids.into_iter().collect();
    let mut iter = distinct.into_iter();

    match (iter.next(), iter.next()) {
        (Some(organization_id), None) => Ok(organization_id),
        (None, _) => Err(AppError::Validation(format!("no {resource} to authorize"))),
        (Some(_), Some(_)) => Err(AppError::Validation(format!(
            "all {resource} must belong to the same organization"
        ))),
    }
}
