use async_trait::async_trait;
use coffer_core::{
    AppResult, CipherId, CollectionId, GroupId, OrganizationId, OrganizationUserId, UserId,
};
use coffer_domain::{Cipher, Collection, CollectionAccessGrant, Group, OrganizationMembership};

/// Read-only port over memberships, groups, collections and their grants.
#[async_trait]
pub trait GrantRepository: Send + Sync {
    /// Finds the membership of a user in an organization, whatever its status.
    async fn find_membership(
        &self,
        organization_id: OrganizationId,
        user_id: UserId,
    ) -> AppResult<Option<OrganizationMembership>>;

    /// Lists every membership of an organization.
    async fn list_memberships(
        &self,
        organization_id: OrganizationId,
    ) -> AppResult<Vec<OrganizationMembership>>;

    /// Lists every group of an organization.
    async fn list_groups(&self, organization_id: OrganizationId) -> AppResult<Vec<Group>>;

    /// Lists the groups a membership belongs to.
    async fn list_groups_for_membership(
        &self,
        organization_user_id: OrganizationUserId,
    ) -> AppResult<Vec<Group>>;

    /// Lists the memberships belonging to any of the groups.
    async fn list_group_members(
        &self,
        group_ids: &[GroupId],
    ) -> AppResult<Vec<OrganizationUserId>>;

    /// Lists direct grants of a membership restricted to the collections.
    async fn list_member_grants(
        &self,
        organization_user_id: OrganizationUserId,
        collection_ids: &[CollectionId],
    ) -> AppResult<Vec<CollectionAccessGrant>>;

    /// Lists grants of any of the groups restricted to the collections.
    async fn list_group_grants(
        &self,
        group_ids: &[GroupId],
        collection_ids: &[CollectionId],
    ) -> AppResult<Vec<CollectionAccessGrant>>;

    /// Lists every direct and group grant on one collection.
    async fn list_collection_grants(
        &self,
        collection_id: CollectionId,
    ) -> AppResult<Vec<CollectionAccessGrant>>;

    /// Lists every collection of an organization.
    async fn list_collections(&self, organization_id: OrganizationId) -> AppResult<Vec<Collection>>;

    /// Finds the collections that exist among the identifiers.
    async fn find_collections(
        &self,
        collection_ids: &[CollectionId],
    ) -> AppResult<Vec<Collection>>;

    /// Finds the ciphers that exist among the identifiers, with their collection links.
    async fn find_ciphers(&self, cipher_ids: &[CipherId]) -> AppResult<Vec<Cipher>>;
}

/// Port replacing the access list of one collection.
#[async_trait]
pub trait CollectionAccessWriter: Send + Sync {
    /// Replaces every direct and group grant on the collection.
    async fn replace_collection_access(
        &self,
        collection_id: CollectionId,
        grants: Vec<CollectionAccessGrant>,
    ) -> AppResult<()>;
}

/// Port resolving the organizations and provider links of a user.
#[async_trait]
pub trait ActorDirectory: Send + Sync {
    /// Lists every membership of the user, whatever its status.
    async fn list_memberships_for_user(
        &self,
        user_id: UserId,
    ) -> AppResult<Vec<OrganizationMembership>>;

    /// Lists organizations managed by a provider the user is confirmed against.
    async fn list_provider_organizations(
        &self,
        user_id: UserId,
    ) -> AppResult<Vec<OrganizationId>>;
}
