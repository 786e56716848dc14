//! Request-scoped view of who is calling and what they hold.

use std::collections::{BTreeMap, BTreeSet};

use coffer_core::{ActorIdentity, AppResult, OrganizationId, OrganizationUserId, UserId};
use serde::{Deserialize, Serialize};

use crate::{CustomPermission, CustomPermissions, OrganizationMembership, OrganizationUserType};

/// Cached role data for one organization the actor is a confirmed member of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentOrganization {
    /// Organization identifier.
    pub organization_id: OrganizationId,
    /// Membership identifier.
    pub organization_user_id: OrganizationUserId,
    /// Role inside the organization.
    pub role: OrganizationUserType,
    /// Custom permissions.
    pub permissions: CustomPermissions,
}

impl From<&OrganizationMembership> for CurrentOrganization {
    fn from(membership: &OrganizationMembership) -> Self {
        Self {
            organization_id: membership.organization_id,
            organization_user_id: membership.id,
            role: membership.role,
            permissions: membership.permissions,
        }
    }
}

/// Authenticated actor plus organization and provider context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorContext {
    identity: ActorIdentity,
    organizations: BTreeMap<OrganizationId, CurrentOrganization>,
    provider_organizations: BTreeSet<OrganizationId>,
}

impl ActorContext {
    /// Creates a context with no organization data.
    #[must_use]
    pub fn new(identity: ActorIdentity) -> Self {
        Self {
            identity,
            organizations: BTreeMap::new(),
            provider_organizations: BTreeSet::new(),
        }
    }

    /// Builds a context from membership rows.
    ///
    /// Memberships that are not confirmed or belong to another user are
    /// skipped.
    #[must_use]
    pub fn from_memberships<'a, I>(identity: ActorIdentity, memberships: I) -> Self
    where
        I: IntoIterator<Item = &'a OrganizationMembership>,
    {
        let user_id = identity.user_id();
        let organizations = memberships
            .into_iter()
            .filter(|membership| membership.is_active() && membership.user_id == user_id)
            .map(|membership| (membership.organization_id, membership.into()))
            .collect();

        Self {
            identity,
            organizations,
            provider_organizations: BTreeSet::new(),
        }
    }

    /// Returns a copy carrying the organization entry.
    #[must_use]
    pub fn with_organization(mut self, organization: CurrentOrganization) -> Self {
        self.organizations
            .insert(organization.organization_id, organization);
        self
    }

    /// Returns a copy marking the actor as a provider user for the organization.
    #[must_use]
    pub fn with_provider_organization(mut self, organization_id: OrganizationId) -> Self {
        self.provider_organizations.insert(organization_id);
        self
    }

    /// Returns the underlying identity.
    #[must_use]
    pub fn identity(&self) -> &ActorIdentity {
        &self.identity
    }

    /// Returns the user id, if one was established.
    #[must_use]
    pub fn user_id(&self) -> Option<UserId> {
        self.identity.user_id()
    }

    /// Returns the user id or fails with a request error.
    pub fn require_user_id(&self) -> AppResult<UserId> {
        self.identity.require_user_id()
    }

    /// Returns the organization entry, if the actor is a confirmed member.
    #[must_use]
    pub fn organization(&self, organization_id: OrganizationId) -> Option<&CurrentOrganization> {
        self.organizations.get(&organization_id)
    }

    /// Returns every organization entry.
    pub fn organizations(&self) -> impl Iterator<Item = &CurrentOrganization> {
        self.organizations.values()
    }

    /// Returns the role held in the organization.
    #[must_use]
    pub fn role(&self, organization_id: OrganizationId) -> Option<OrganizationUserType> {
        self.organization(organization_id)
            .map(|organization| organization.role)
    }

    /// Returns whether the actor is a confirmed member.
    #[must_use]
    pub fn is_member(&self, organization_id: OrganizationId) -> bool {
        self.organizations.contains_key(&organization_id)
    }

    /// Returns whether the actor owns the organization.
    #[must_use]
    pub fn is_owner(&self, organization_id: OrganizationId) -> bool {
        self.role(organization_id) == Some(OrganizationUserType::Owner)
    }

    /// Returns whether the actor administers the organization.
    #[must_use]
    pub fn is_admin(&self, organization_id: OrganizationId) -> bool {
        self.role(organization_id) == Some(OrganizationUserType::Admin)
    }

    /// Returns whether the actor holds the custom permission.
    ///
    /// Permissions only count for members with the Custom role.
    #[must_use]
    pub fn has_permission(
        &self,
        organization_id: OrganizationId,
        permission: CustomPermission,
    ) -> bool {
        self.organization(organization_id)
            .is_some_and(|organization| {
                organization.role == OrganizationUserType::Custom
                    && organization.permissions.contains(permission)
            })
    }

    /// Returns whether the actor is a provider user managing the organization.
    #[must_use]
    pub fn is_provider_user_for(&self, organization_id: OrganizationId) -> bool {
        self.provider_organizations.contains(&organization_id)
    }
}
