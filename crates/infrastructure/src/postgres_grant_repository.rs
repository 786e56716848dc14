use async_trait::async_trait;
use coffer_application::{ActorDirectory, CollectionAccessWriter, GrantRepository};
use coffer_core::{
    AppResult, CipherId, CollectionId, GroupId, OrganizationId, OrganizationUserId, UserId,
};
use coffer_domain::{Cipher, Collection, CollectionAccessGrant, Group, OrganizationMembership};
use sqlx::PgPool;
use uuid::Uuid;

mod grants;
mod memberships;
mod resources;


/// PostgreSQL-backed grant store.
///
/// Serves membership, group, collection and cipher lookups and replaces
/// collection access lists inside one transaction.
#[derive(Clone)]
pub struct PostgresGrantRepository {
    pool: PgPool,
}

impl PostgresGrantRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn group_uuids(group_ids: &[GroupId]) -> Vec<Uuid> {
    group_ids.iter().map(GroupId::as_uuid).collect()
}

fn collection_uuids(collection_ids: &[CollectionId]) -> Vec<Uuid> {
    collection_ids.iter().map(CollectionId::as_uuid).collect()
}

#[async_trait]
impl GrantRepository for PostgresGrantRepository {
    async fn find_membership(
        &self,
        organization_id: OrganizationId,
        user_id: UserId,
    ) -> AppResult<Option<OrganizationMembership>> {
        self.find_membership_impl(organization_id, user_id).await
    }

    async fn list_memberships(
        &self,
        organization_id: OrganizationId,
    ) -> AppResult<Vec<OrganizationMembership>> {
        self.list_memberships_impl(organization_id).await
    }

    async fn list_groups(&self, organization_id: OrganizationId) -> AppResult<Vec<Group>> {
        self.list_groups_impl(organization_id).await
    }

    async fn list_groups_for_membership(
        &self,
        organization_user_id: OrganizationUserId,
    ) -> AppResult<Vec<Group>> {
        self.list_groups_for_membership_impl(organization_user_id)
            .await
    }

    async fn list_group_members(
        &self,
        group_ids: &[GroupId],
    ) -> AppResult<Vec<OrganizationUserId>> {
        self.list_group_members_impl(group_ids).await
    }

    async fn list_member_grants(
        &self,
        organization_user_id: OrganizationUserId,
        collection_ids: &[CollectionId],
    ) -> AppResult<Vec<CollectionAccessGrant>> {
        self.list_member_grants_impl(organization_user_id, collection_ids)
            .await
    }

    async fn list_group_grants(
        &self,
        group_ids: &[GroupId],
        collection_ids: &[CollectionId],
    ) -> AppResult<Vec<CollectionAccessGrant>> {
        self.list_group_grants_impl(group_ids, collection_ids).await
    }

    async fn list_collection_grants(
        &self,
        collection_id: CollectionId,
    ) -> AppResult<Vec<CollectionAccessGrant>> {
        self.list_collection_grants_impl(collection_id).await
    }

    async fn list_collections(
        &self,
        organization_id: OrganizationId,
    ) -> AppResult<Vec<Collection>> {
        self.list_collections_impl(organization_id).await
    }

    async fn find_collections(
        &self,
        collection_ids: &[CollectionId],
    ) -> AppResult<Vec<Collection>> {
        self.find_collections_impl(collection_ids).await
    }

    async fn find_ciphers(&self, cipher_ids: &[CipherId]) -> AppResult<Vec<Cipher>> {
        self.find_ciphers_impl(cipher_ids).await
    }
}

#[async_trait]
impl CollectionAccessWriter for PostgresGrantRepository {
    async fn replace_collection_access(
        &self,
        collection_id: CollectionId,
        grants: Vec<CollectionAccessGrant>,
    ) -> AppResult<()> {
        self.replace_collection_access_impl(collection_id, grants)
            .await
    }
}

#[async_trait]
impl ActorDirectory for PostgresGrantRepository {
    async fn list_memberships_for_user(
        &self,
        user_id: UserId,
    ) -> AppResult<Vec<OrganizationMembership>> {
        self.list_memberships_for_user_impl(user_id).await
    }

    async fn list_provider_organizations(
        &self,
        user_id: UserId,
    ) -> AppResult<Vec<OrganizationId>> {
        self.list_provider_organizations_impl(user_id).await
    }
}
