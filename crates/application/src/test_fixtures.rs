//! Fake ports shared by the service test modules.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use coffer_core::{
    ActorIdentity, AppError, AppResult, CipherId, CollectionId, GroupId, OrganizationId,
    OrganizationUserId, UserId,
};
use coffer_domain::{
    ActorContext, Cipher, CipherOwner, Collection, CollectionAccessGrant, CustomPermission,
    CustomPermissions, FeatureFlag, GrantPermissions, GrantSubject, Group, OrganizationAbility,
    OrganizationMembership, OrganizationUserStatus, OrganizationUserType,
};
use tokio::sync::Mutex;

use crate::{
    AccessService, AccountRevisionRepository, AuditEvent, AuditRepository, AuthorizationService,
    CollectionAccessService, CollectionAccessWriter, FeatureFlagSource, GrantRepository,
    ModeSelector, OrganizationAbilityProvider, OrganizationAbilityRepository,
};

#[derive(Default)]
pub(crate) struct FakeGrantStore {
    memberships: Vec<OrganizationMembership>,
    groups: Vec<Group>,
    group_members: Vec<(GroupId, OrganizationUserId)>,
    collections: Vec<Collection>,
    ciphers: Vec<Cipher>,
    pub(crate) grants: Mutex<Vec<CollectionAccessGrant>>,
}

#[async_trait]
impl GrantRepository for FakeGrantStore {
    async fn find_membership(
        &self,
        organization_id: OrganizationId,
        user_id: UserId,
    ) -> AppResult<Option<OrganizationMembership>> {
        Ok(self
            .memberships
            .iter()
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
            .memberships
            .iter()
            .filter(|membership| membership.organization_id == organization_id)
            .cloned()
            .collect())
    }

    async fn list_groups(&self, organization_id: OrganizationId) -> AppResult<Vec<Group>> {
        Ok(self
            .groups
            .iter()
            .filter(|group| group.organization_id == organization_id)
            .cloned()
            .collect())
    }

    async fn list_groups_for_membership(
        &self,
        organization_user_id: OrganizationUserId,
    ) -> AppResult<Vec<Group>> {
        Ok(self
            .groups
            .iter()
            .filter(|group| {
                self.group_members
                    .contains(&(group.id, organization_user_id))
            })
            .cloned()
            .collect())
    }

    async fn list_group_members(
        &self,
        group_ids: &[GroupId],
    ) -> AppResult<Vec<OrganizationUserId>> {
        Ok(self
            .group_members
            .iter()
            .filter(|(group_id, _)| group_ids.contains(group_id))
            .map(|(_, organization_user_id)| *organization_user_id)
            .collect())
    }

    async fn list_member_grants(
        &self,
        organization_user_id: OrganizationUserId,
        collection_ids: &[CollectionId],
    ) -> AppResult<Vec<CollectionAccessGrant>> {
        Ok(self
            .grants
            .lock()
            .await
            .iter()
            .filter(|grant| {
                grant.subject == GrantSubject::Member(organization_user_id)
                    && collection_ids.contains(&grant.collection_id)
            })
            .copied()
            .collect())
    }

    async fn list_group_grants(
        &self,
        group_ids: &[GroupId],
        collection_ids: &[CollectionId],
    ) -> AppResult<Vec<CollectionAccessGrant>> {
        Ok(self
            .grants
            .lock()
            .await
            .iter()
            .filter(|grant| match grant.subject {
                GrantSubject::Group(group_id) => {
                    group_ids.contains(&group_id) && collection_ids.contains(&grant.collection_id)
                }
                GrantSubject::Member(_) => false,
            })
            .copied()
            .collect())
    }

    async fn list_collection_grants(
        &self,
        collection_id: CollectionId,
    ) -> AppResult<Vec<CollectionAccessGrant>> {
        Ok(self
            .grants
            .lock()
            .await
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
            .collections
            .iter()
            .filter(|collection| collection.organization_id == organization_id)
            .copied()
            .collect())
    }

    async fn find_collections(
        &self,
        collection_ids: &[CollectionId],
    ) -> AppResult<Vec<Collection>> {
        Ok(self
            .collections
            .iter()
            .filter(|collection| collection_ids.contains(&collection.id))
            .copied()
            .collect())
    }

    async fn find_ciphers(&self, cipher_ids: &[CipherId]) -> AppResult<Vec<Cipher>> {
        Ok(self
            .ciphers
            .iter()
            .filter(|cipher| cipher_ids.contains(&cipher.id))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl CollectionAccessWriter for FakeGrantStore {
    async fn replace_collection_access(
        &self,
        collection_id: CollectionId,
        grants: Vec<CollectionAccessGrant>,
    ) -> AppResult<()> {
        let mut stored = self.grants.lock().await;
        stored.retain(|grant| grant.collection_id != collection_id);
        stored.extend(grants);
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct FakeAuditRepository {
    pub(crate) events: Mutex<Vec<AuditEvent>>,
}

#[async_trait]
impl AuditRepository for FakeAuditRepository {
    async fn append_event(&self, event: AuditEvent) -> AppResult<()> {
        self.events.lock().await.push(event);
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct FakeRevisionRepository {
    pub(crate) bumped: Mutex<Vec<UserId>>,
    pub(crate) failing: bool,
}

#[async_trait]
impl AccountRevisionRepository for FakeRevisionRepository {
    async fn bump_account_revisions(&self, user_ids: &[UserId]) -> AppResult<()> {
        if self.failing {
            return Err(AppError::Internal("revision store unavailable".to_owned()));
        }
        self.bumped.lock().await.extend_from_slice(user_ids);
        Ok(())
    }
}

struct FakeAbilityRepository {
    abilities: HashMap<OrganizationId, OrganizationAbility>,
}

#[async_trait]
impl OrganizationAbilityRepository for FakeAbilityRepository {
    async fn find_ability(
        &self,
        organization_id: OrganizationId,
    ) -> AppResult<Option<OrganizationAbility>> {
        Ok(self.abilities.get(&organization_id).copied())
    }
}

struct FakeFeatureFlags {
    flexible_collections: bool,
}

impl FeatureFlagSource for FakeFeatureFlags {
    fn is_enabled(&self, flag: FeatureFlag) -> bool {
        match flag {
            FeatureFlag::FlexibleCollections => self.flexible_collections,
        }
    }
}

/// Organization ability presets keyed by the mode they produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Rollout {
    Legacy,
    FlexibleV0,
    FlexibleV1 { allow_admin_access: bool },
}

/// Mutable world the tests populate before building services.
pub(crate) struct Fixture {
    store: FakeGrantStore,
    abilities: HashMap<OrganizationId, OrganizationAbility>,
    flexible_collections: bool,
    pub(crate) revisions: FakeRevisionRepository,
}

impl Fixture {
    pub(crate) fn new(flexible_collections: bool) -> Self {
        Self {
            store: FakeGrantStore::default(),
            abilities: HashMap::new(),
            flexible_collections,
            revisions: FakeRevisionRepository::default(),
        }
    }

    /// Builds a world whose global flag matches the rollout stage.
    pub(crate) fn for_rollout(rollout: Rollout) -> (Self, OrganizationId) {
        let mut fixture = Self::new(rollout != Rollout::Legacy);
        let organization_id = fixture.organization(rollout);
        (fixture, organization_id)
    }

    pub(crate) fn organization(&mut self, rollout: Rollout) -> OrganizationId {
        let organization_id = OrganizationId::new();
        let mut ability = OrganizationAbility::legacy(organization_id);
        match rollout {
            Rollout::Legacy | Rollout::FlexibleV0 => {}
            Rollout::FlexibleV1 { allow_admin_access } => {
                ability.flexible_collections = true;
                ability.allow_admin_access_to_all_collection_items = allow_admin_access;
            }
        }
        self.abilities.insert(organization_id, ability);
        organization_id
    }

    pub(crate) fn limit_collection_management(&mut self, organization_id: OrganizationId) {
        if let Some(ability) = self.abilities.get_mut(&organization_id) {
            ability.limit_collection_creation_deletion = true;
        }
    }

    pub(crate) fn add_membership(&mut self, membership: OrganizationMembership) {
        self.store.memberships.push(membership);
    }

    /// Adds a confirmed member and returns it with its actor context.
    pub(crate) fn member(
        &mut self,
        organization_id: OrganizationId,
        role: OrganizationUserType,
    ) -> (OrganizationMembership, ActorContext) {
        self.member_with(organization_id, role, &[], false)
    }

    pub(crate) fn custom_member(
        &mut self,
        organization_id: OrganizationId,
        permissions: &[CustomPermission],
    ) -> (OrganizationMembership, ActorContext) {
        self.member_with(
            organization_id,
            OrganizationUserType::Custom,
            permissions,
            false,
        )
    }

    pub(crate) fn member_with(
        &mut self,
        organization_id: OrganizationId,
        role: OrganizationUserType,
        permissions: &[CustomPermission],
        access_all: bool,
    ) -> (OrganizationMembership, ActorContext) {
        let membership = OrganizationMembership {
            id: OrganizationUserId::new(),
            organization_id,
            user_id: Some(UserId::new()),
            role,
            status: OrganizationUserStatus::Confirmed,
            permissions: permissions.iter().copied().collect::<CustomPermissions>(),
            access_all,
        };
        let actor = actor_for(&membership);
        self.add_membership(membership.clone());
        (membership, actor)
    }

    pub(crate) fn group(&mut self, organization_id: OrganizationId, access_all: bool) -> Group {
        let group = Group {
            id: GroupId::new(),
            organization_id,
            access_all,
        };
        self.store.groups.push(group.clone());
        group
    }

    pub(crate) fn join_group(&mut self, group: &Group, membership: &OrganizationMembership) {
        self.store.group_members.push((group.id, membership.id));
    }

    pub(crate) fn collection(&mut self, organization_id: OrganizationId) -> Collection {
        let collection = Collection {
            id: CollectionId::new(),
            organization_id,
        };
        self.store.collections.push(collection);
        collection
    }

    pub(crate) fn grant(
        &mut self,
        collection: &Collection,
        subject: GrantSubject,
        permissions: GrantPermissions,
    ) {
        self.store.grants.get_mut().push(CollectionAccessGrant {
            collection_id: collection.id,
            subject,
            permissions,
        });
    }

    pub(crate) fn cipher(&mut self, owner: CipherOwner, collections: &[&Collection]) -> Cipher {
        let cipher = Cipher {
            id: CipherId::new(),
            owner,
            collection_ids: collections.iter().map(|collection| collection.id).collect(),
        };
        self.store.ciphers.push(cipher.clone());
        cipher
    }

    pub(crate) fn build(self) -> Harness {
        let store = Arc::new(self.store);
        let audit = Arc::new(FakeAuditRepository::default());
        let revisions = Arc::new(self.revisions);
        let mode_selector = ModeSelector::new(
            OrganizationAbilityProvider::new(Arc::new(FakeAbilityRepository {
                abilities: self.abilities,
            })),
            Arc::new(FakeFeatureFlags {
                flexible_collections: self.flexible_collections,
            }),
        );
        let access_service = AccessService::new(store.clone(), mode_selector);
        let authorization_service = AuthorizationService::new(access_service.clone());
        let collection_access_service = CollectionAccessService::new(
            authorization_service.clone(),
            store.clone(),
            revisions.clone(),
            audit.clone(),
        );

        Harness {
            store,
            audit,
            revisions,
            access_service,
            authorization_service,
            collection_access_service,
        }
    }
}

/// Services wired over the fakes.
pub(crate) struct Harness {
    pub(crate) store: Arc<FakeGrantStore>,
    pub(crate) audit: Arc<FakeAuditRepository>,
    pub(crate) revisions: Arc<FakeRevisionRepository>,
    pub(crate) access_service: AccessService,
    pub(crate) authorization_service: AuthorizationService,
    pub(crate) collection_access_service: CollectionAccessService,
}

pub(crate) fn actor_for(membership: &OrganizationMembership) -> ActorContext {
    let identity = match membership.user_id {
        Some(user_id) => ActorIdentity::new(user_id, None),
        None => ActorIdentity::anonymous(),
    };
    ActorContext::from_memberships(identity, [membership])
}

pub(crate) fn outsider() -> ActorContext {
    ActorContext::new(ActorIdentity::new(UserId::new(), None))
}

pub(crate) fn provider_user(organization_id: OrganizationId) -> ActorContext {
    outsider().with_provider_organization(organization_id)
}
