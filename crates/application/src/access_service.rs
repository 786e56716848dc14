use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use coffer_core::{AppError, AppResult, CollectionId, GroupId, OrganizationId, UserId};
use coffer_domain::{ActorContext, Collection, CollectionAccess, CustomPermission};
use tracing::debug;

use crate::access_resolver::{GrantSnapshot, resolver_for};
use crate::{GrantRepository, ModeSelector, OrganizationPolicy};

mod ciphers;

/// Resolved access of the actor on one collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedCollectionAccess {
    /// Collection the access applies to.
    pub collection: Collection,
    /// Effective access, never `None`.
    pub access: CollectionAccess,
}

/// Application service computing graded access levels.
#[derive(Clone)]
pub struct AccessService {
    grant_repository: Arc<dyn GrantRepository>,
    mode_selector: ModeSelector,
}

impl AccessService {
    /// Creates an access service.
    #[must_use]
    pub fn new(grant_repository: Arc<dyn GrantRepository>, mode_selector: ModeSelector) -> Self {
        Self {
            grant_repository,
            mode_selector,
        }
    }

    /// Resolves the actor's effective access on one collection.
    pub async fn resolve_collection(
        &self,
        actor: &ActorContext,
        collection_id: CollectionId,
    ) -> AppResult<CollectionAccess> {
        let user_id = actor.require_user_id()?;
        let collection = self.find_collection(collection_id).await?;
        let policy = self
            .mode_selector
            .organization_policy(collection.organization_id)
            .await?;

        let resolved = self
            .resolve_collections(actor, user_id, &policy, &[collection_id])
            .await?;

        Ok(resolved
            .get(&collection_id)
            .copied()
            .unwrap_or(CollectionAccess::NONE))
    }

    /// Lists every collection of the organization the actor can reach.
    pub async fn list_collection_access(
        &self,
        actor: &ActorContext,
        organization_id: OrganizationId,
    ) -> AppResult<Vec<ResolvedCollectionAccess>> {
        let user_id = actor.require_user_id()?;
        let policy = self.mode_selector.organization_policy(organization_id).await?;
        let collections = self.grant_repository.list_collections(organization_id).await?;
        let collection_ids: Vec<CollectionId> =
            collections.iter().map(|collection| collection.id).collect();

        let resolved = self
            .resolve_collections(actor, user_id, &policy, &collection_ids)
            .await?;

        Ok(collections
            .into_iter()
            .filter_map(|collection| {
                resolved
                    .get(&collection.id)
                    .copied()
                    .filter(|access| access.can_read())
                    .map(|access| ResolvedCollectionAccess { collection, access })
            })
            .collect())
    }

    pub(crate) fn grant_repository(&self) -> &Arc<dyn GrantRepository> {
        &self.grant_repository
    }

    /// Returns the mode selector shared with decision points.
    #[must_use]
    pub fn mode_selector(&self) -> &ModeSelector {
        &self.mode_selector
    }

    pub(crate) async fn find_collection(
        &self,
        collection_id: CollectionId,
    ) -> AppResult<Collection> {
        self.grant_repository
            .find_collections(&[collection_id])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| {
                AppError::NotFound(format!("collection '{collection_id}' does not exist"))
            })
    }

    /// Resolves access with role and provider overrides applied first.
    pub(crate) async fn resolve_collections(
        &self,
        actor: &ActorContext,
        user_id: UserId,
        policy: &OrganizationPolicy,
        collection_ids: &[CollectionId],
    ) -> AppResult<BTreeMap<CollectionId, CollectionAccess>> {
        if let Some(access) = role_override(actor, policy) {
            debug!(
                organization_id = %policy.organization_id(),
                user_id = %user_id,
                mode = %policy.mode,
                "role override grants full collection access"
            );
            return Ok(collection_ids.iter().map(|id| (*id, access)).collect());
        }

        self.resolve_grants(user_id, policy, collection_ids).await
    }

    /// Resolves access from grants alone.
    pub(crate) async fn resolve_grants(
        &self,
        user_id: UserId,
        policy: &OrganizationPolicy,
        collection_ids: &[CollectionId],
    ) -> AppResult<BTreeMap<CollectionId, CollectionAccess>> {
        let snapshot = self
            .load_snapshot(policy, user_id, collection_ids)
            .await?;
        let resolver = resolver_for(policy.mode);

        Ok(collection_ids
            .iter()
            .map(|id| (*id, resolver.resolve(&snapshot, *id)))
            .collect())
    }

    async fn load_snapshot(
        &self,
        policy: &OrganizationPolicy,
        user_id: UserId,
        collection_ids: &[CollectionId],
    ) -> AppResult<GrantSnapshot> {
        let Some(membership) = self
            .grant_repository
            .find_membership(policy.organization_id(), user_id)
            .await?
        else {
            return Ok(GrantSnapshot::empty());
        };

        if !membership.is_active() {
            return Ok(GrantSnapshot::new(Some(membership), Vec::new(), Vec::new()));
        }

        let groups = self
            .grant_repository
            .list_groups_for_membership(membership.id)
            .await?;

        let access_all = membership.access_all || groups.iter().any(|group| group.access_all);
        if policy.mode.honors_access_all() && access_all {
            return Ok(GrantSnapshot::new(Some(membership), groups, Vec::new()));
        }

        let distinct: Vec<CollectionId> = collection_ids
            .iter()
            .copied()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let mut grants = self
            .grant_repository
            .list_member_grants(membership.id, &distinct)
            .await?;

        if !groups.is_empty() {
            let group_ids: Vec<GroupId> = groups.iter().map(|group| group.id).collect();
            grants.extend(
                self.grant_repository
                    .list_group_grants(&group_ids, &distinct)
                    .await?,
            );
        }

        Ok(GrantSnapshot::new(Some(membership), groups, grants))
    }
}

/// Organization-wide access granted by role, custom permission or provider link.
fn role_override(actor: &ActorContext, policy: &OrganizationPolicy) -> Option<CollectionAccess> {
    let organization_id = policy.organization_id();
    let overridden = actor.is_provider_user_for(organization_id)
        || actor.is_owner(organization_id)
        || (actor.is_admin(organization_id) && policy.admins_reach_all_collections())
        || actor.has_permission(organization_id, CustomPermission::EditAnyCollection);

    overridden.then_some(CollectionAccess::FULL)
}

#[cfg(test)]
mod tests;
