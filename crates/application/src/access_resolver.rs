//! Grant-only resolution strategies.
//!
//! Resolvers are pure: they read a [`GrantSnapshot`] fetched for one actor in
//! one organization and never touch storage. Role and provider overrides are
//! layered on top by the callers.

use coffer_core::CollectionId;
use coffer_domain::{
    AuthorizationMode, CollectionAccess, CollectionAccessGrant, GrantSubject, Group,
    OrganizationMembership,
};

/// Request-scoped grant data for one actor in one organization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GrantSnapshot {
    membership: Option<OrganizationMembership>,
    groups: Vec<Group>,
    grants: Vec<CollectionAccessGrant>,
}

impl GrantSnapshot {
    /// Creates a snapshot.
    ///
    /// Grants whose subject is neither the membership nor one of the groups
    /// are ignored during resolution.
    #[must_use]
    pub fn new(
        membership: Option<OrganizationMembership>,
        groups: Vec<Group>,
        grants: Vec<CollectionAccessGrant>,
    ) -> Self {
        Self {
            membership,
            groups,
            grants,
        }
    }

    /// Snapshot of an actor with no membership.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns the membership when it participates in access checks.
    #[must_use]
    pub fn active_membership(&self) -> Option<&OrganizationMembership> {
        self.membership
            .as_ref()
            .filter(|membership| membership.is_active())
    }

    fn has_access_all(&self) -> bool {
        self.active_membership()
            .is_some_and(|membership| membership.access_all)
            || self.groups.iter().any(|group| group.access_all)
    }

    fn holds(&self, subject: &GrantSubject) -> bool {
        match subject {
            GrantSubject::Member(organization_user_id) => self
                .active_membership()
                .is_some_and(|membership| membership.id == *organization_user_id),
            GrantSubject::Group(group_id) => self.groups.iter().any(|group| group.id == *group_id),
        }
    }

    fn grant_access(&self, collection_id: CollectionId) -> CollectionAccess {
        CollectionAccess::from_grants(
            self.grants
                .iter()
                .filter(|grant| grant.collection_id == collection_id && self.holds(&grant.subject))
                .map(|grant| &grant.permissions),
        )
    }
}

/// Strategy computing grant-derived access on one collection.
pub trait AccessResolver: Send + Sync {
    /// Resolves the actor's access on the collection.
    fn resolve(&self, snapshot: &GrantSnapshot, collection_id: CollectionId) -> CollectionAccess;
}

/// Pre-migration resolution honoring access-all flags.
#[derive(Debug, Clone, Copy, Default)]
pub struct LegacyResolver;

impl AccessResolver for LegacyResolver {
    fn resolve(&self, snapshot: &GrantSnapshot, collection_id: CollectionId) -> CollectionAccess {
        if snapshot.active_membership().is_none() {
            return CollectionAccess::NONE;
        }

        if snapshot.has_access_all() {
            return CollectionAccess::FULL;
        }

        snapshot.grant_access(collection_id)
    }
}

/// Explicit-assignment resolution.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlexibleResolver;

impl AccessResolver for FlexibleResolver {
    fn resolve(&self, snapshot: &GrantSnapshot, collection_id: CollectionId) -> CollectionAccess {
        if snapshot.active_membership().is_none() {
            return CollectionAccess::NONE;
        }

        snapshot.grant_access(collection_id)
    }
}

/// Returns the resolver for a mode.
#[must_use]
pub fn resolver_for(mode: AuthorizationMode) -> &'static dyn AccessResolver {
    match mode {
        AuthorizationMode::Legacy => &LegacyResolver,
        AuthorizationMode::FlexibleV0 | AuthorizationMode::FlexibleV1 => &FlexibleResolver,
    }
}
