use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use coffer_application::{
    ActorDirectory, CollectionAccessWriter, GrantRepository, OrganizationAbilityRepository,
};
use coffer_core::{
    AppError, AppResult, CipherId, CollectionId, GroupId, OrganizationId, OrganizationUserId,
    UserId,
};
use coffer_domain::{
    Cipher, Collection, CollectionAccessGrant, GrantSubject, Group, OrganizationAbility,
    OrganizationMembership,
};
use tokio::sync::RwLock;


#[derive(Debug, Default)]
struct GrantStoreState {
    abilities: BTreeMap<OrganizationId, OrganizationAbility>,
    memberships: BTreeMap<OrganizationUserId, OrganizationMembership>,
    groups: BTreeMap<GroupId, Group>,
    group_members: BTreeSet<(GroupId, OrganizationUserId)>,
    collections: BTreeMap<CollectionId, Collection>,
    grants: Vec<CollectionAccessGrant>,
    ciphers: BTreeMap<CipherId, Cipher>,
    provider_organizations: BTreeSet<(UserId, OrganizationId)>,
}

impl GrantStoreState {
    fn grants_matching(
        &self,
        subjects: &BTreeSet<GrantSubject>,
        collection_ids: &[CollectionId],
    ) -> Vec<CollectionAccessGrant> {
        self.grants
            .iter()
            .filter(|grant| {
                subjects.contains(&grant.subject) && collection_ids.contains(&grant.collection_id)
            })
            .copied()
            .collect()
    }
}

/// In-memory grant store for local runs and tests.
///
/// Holds organization abilities next to the grant data so a whole
/// organization can be served from one value.
#[derive(Debug, Default)]
pub struct InMemoryGrantRepository {
    state: RwLock<GrantStoreState>,
}

impl InMemoryGrantRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores or replaces the ability of an organization.
    pub async fn save_ability(&self, ability: OrganizationAbility) {
        self.state
            .write()
            .await
            .abilities
            .insert(ability.organization_id, ability);
    }

    /// Stores or replaces a membership.
    pub async fn save_membership(&self, membership: OrganizationMembership) {
        self.state
            .write()
            .await
            .memberships
            .insert(membership.id, membership);
    }

    /// Stores or replaces a group.
    pub async fn save_group(&self, group: Group) {
        self.state.write().await.groups.insert(group.id, group);
    }

    /// Adds a membership to a group of the same organization.
    pub async fn add_group_member(
        &self,
        group_id: GroupId,
        organization_user_id: OrganizationUserId,
    ) -> AppResult<()> {
        let mut state = self.state.write().await;
        let group = state
            .groups
            .get(&group_id)
            .ok_or_else(|| AppError::NotFound(format!("group '{group_id}' does not exist")))?;
        let membership = state.memberships.get(&organization_user_id).ok_or_else(|| {
            AppError::NotFound(format!(
                "organization user '{organization_user_id}' does not exist"
            ))
        })?;

        if group.organization_id != membership.organization_id {
            return Err(AppError::Validation(format!(
                "organization user '{organization_user_id}' cannot join group '{group_id}' of \
                 another organization"
            )));
        }

        state.group_members.insert((group_id, organization_user_id));
        Ok(())
    }

    /// Stores or replaces a collection.
    pub async fn save_collection(&self, collection: Collection) {
        self.state
            .write()
            .await
            .collections
            .insert(collection.id, collection);
    }

    /// Stores or replaces a cipher together with its collection links.
    pub async fn save_cipher(&self, cipher: Cipher) {
        self.state.write().await.ciphers.insert(cipher.id, cipher);
    }

    /// Records that a user manages an organization through a provider.
    pub async fn link_provider_organization(
        &self,
        user_id: UserId,
        organization_id: OrganizationId,
    ) {
        self.state
            .write()
            .await
            .provider_organizations
            .insert((user_id, organization_id));
    }
}

#[async_trait]
impl GrantRepository for InMemoryGrantRepository {
    async fn find_membership(
        &self,
        organization_id: OrganizationId,
        user_id: UserId,
    ) -> AppResult<Option<OrganizationMembership>> {
        Ok(self
            .state
            .read()
            .await
            .memberships
            .values()
            .find(|membership| {
                membership.organization_id == organization_id
                    && membership.user_id == Some(user_id)
            })
            .cloned())
    }

    async fn list_memberships(
        &self,
        organization_id: OrganizationId,
    ) -> AppResult<Vec<OrganizationMembership>> {
        Ok(self
            .state
            .read()
            .await
            .memberships
            .values()
            .filter(|membership| membership.organization_id == organization_id)
            .cloned()
            .collect())
    }

    async fn list_groups(&self, organization_id: OrganizationId) -> AppResult<Vec<Group>> {
        Ok(self
            .state
            .read()
            .await
            .groups
            .values()
            .filter(|group| group.organization_id == organization_id)
            .cloned()
            .collect())
    }

    async fn list_groups_for_membership(
        &self,
        organization_user_id: OrganizationUserId,
    ) -> AppResult<Vec<Group>> {
        let state = self.state.read().await;
        Ok(state
            .group_members
            .iter()
            .filter(|(_, member_id)| *member_id == organization_user_id)
            .filter_map(|(group_id, _)| state.groups.get(group_id).cloned())
            .collect())
    }

    async fn list_group_members(
        &self,
        group_ids: &[GroupId],
    ) -> AppResult<Vec<OrganizationUserId>> {
        let state = self.state.read().await;
        let members: BTreeSet<OrganizationUserId> = state
            .group_members
            .iter()
            .filter(|(group_id, _)| group_ids.contains(group_id))
            .map(|(_, member_id)| *member_id)
            .collect();

        Ok(members.into_iter().collect())
    }

    async fn list_member_grants(
        &self,
        organization_user_id: OrganizationUserId,
        collection_ids: &[CollectionId],
    ) -> AppResult<Vec<CollectionAccessGrant>> {
        let subjects = BTreeSet::from([GrantSubject::Member(organization_user_id)]);
        Ok(self
            .state
            .read()
            .await
            .grants_matching(&subjects, collection_ids))
    }

    async fn list_group_grants(
        &self,
        group_ids: &[GroupId],
        collection_ids: &[CollectionId],
    ) -> AppResult<Vec<CollectionAccessGrant>> {
        let subjects: BTreeSet<GrantSubject> =
            group_ids.iter().copied().map(GrantSubject::Group).collect();
        Ok(self
            .state
            .read()
            .await
            .grants_matching(&subjects, collection_ids))
    }

    async fn list_collection_grants(
        &self,
        collection_id: CollectionId,
    ) -> AppResult<Vec<CollectionAccessGrant>> {
        Ok(self
            .state
            .read()
            .await
            .grants
            .iter()
            .filter(|grant| grant.collection_id == collection_id)
            .copied()
            .collect())
    }

    async fn list_collections(
        &self,
        organization_id: OrganizationId,
    ) -> AppResult<Vec<Collection>> {
        Ok(self
            .state
            .read()
            .await
            .collections
            .values()
            .filter(|collection| collection.organization_id == organization_id)
            .copied()
            .collect())
    }

    async fn find_collections(
        &self,
        collection_ids: &[CollectionId],
    ) -> AppResult<Vec<Collection>> {
        let state = self.state.read().await;
        Ok(collection_ids
            .iter()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .filter_map(|collection_id| state.collections.get(collection_id).copied())
            .collect())
    }

    async fn find_ciphers(&self, cipher_ids: &[CipherId]) -> AppResult<Vec<Cipher>> {
        let state = self.state.read().await;
        Ok(cipher_ids
            .iter()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .filter_map(|cipher_id| state.ciphers.get(cipher_id).cloned())
            .collect())
    }
}

#[async_trait]
impl CollectionAccessWriter for InMemoryGrantRepository {
    async fn replace_collection_access(
        &self,
        collection_id: CollectionId,
        grants: Vec<CollectionAccessGrant>,
    ) -> AppResult<()> {
        let mut state = self.state.write().await;
        if !state.collections.contains_key(&collection_id) {
            return Err(AppError::NotFound(format!(
                "collection '{collection_id}' does not exist"
            )));
        }

        state
            .grants
            .retain(|grant| grant.collection_id != collection_id);
        state.grants.extend(
            grants
                .into_iter()
                .map(|grant| CollectionAccessGrant {
                    collection_id,
                    ..grant
                }),
        );

        Ok(())
    }
}

#[async_trait]
impl ActorDirectory for InMemoryGrantRepository {
    async fn list_memberships_for_user(
        &self,
        user_id: UserId,
    ) -> AppResult<Vec<OrganizationMembership>> {
        Ok(self
            .state
            .read()
            .await
            .memberships
            .values()
            .filter(|membership| membership.user_id == Some(user_id))
            .cloned()
            .collect())
    }

    async fn list_provider_organizations(
        &self,
        user_id: UserId,
    ) -> AppResult<Vec<OrganizationId>> {
        Ok(self
            .state
            .read()
            .await
            .provider_organizations
            .iter()
            .filter(|(provider_user_id, _)| *provider_user_id == user_id)
            .map(|(_, organization_id)| *organization_id)
            .collect())
    }
}

#[async_trait]
impl OrganizationAbilityRepository for InMemoryGrantRepository {
    async fn find_ability(
        &self,
        organization_id: OrganizationId,
    ) -> AppResult<Option<OrganizationAbility>> {
        Ok(self
            .state
            .read()
            .await
            .abilities
            .get(&organization_id)
            .copied())
    }
}
