use std::collections::BTreeSet;

use coffer_core::{AppError, AppResult, CollectionId, UserId};
use coffer_domain::{
    AccessDecision, ActorContext, Collection, CollectionAccess, CollectionOperation,
    CustomPermission, OrganizationUserType,
};
use tracing::debug;

use crate::OrganizationPolicy;

use super::{AuthorizationService, holds_any, require_decision, single_organization};

impl AuthorizationService {
    /// Decides whether the actor may perform the operation on every collection.
    pub async fn authorize_collections(
        &self,
        actor: &ActorContext,
        operation: CollectionOperation,
        collections: &[Collection],
    ) -> AppResult<AccessDecision> {
        if collections.is_empty() {
            return Ok(AccessDecision::Indeterminate);
        }

        let user_id = actor.require_user_id()?;
        let organization_id = single_organization(
            collections
                .iter()
                .map(|collection| collection.organization_id),
            "collections",
        )?;
        let policy = self
            .access_service
            .mode_selector()
            .organization_policy(organization_id)
            .await?;

        let decision = if collection_bypass(actor, operation, &policy) {
            AccessDecision::Allow
        } else {
            self.resolve_collection_fallback(user_id, operation, &policy, collections)
                .await?
        };

        debug!(
            organization_id = %organization_id,
            user_id = %user_id,
            operation = operation.as_str(),
            targets = collections.len(),
            decision = decision.as_str(),
            "collection authorization decided"
        );

        Ok(decision)
    }

    /// Loads the collections and decides the operation on them.
    ///
    /// Unknown identifiers are reported as not found.
    pub async fn authorize_collection_ids(
        &self,
        actor: &ActorContext,
        operation: CollectionOperation,
        collection_ids: &[CollectionId],
    ) -> AppResult<AccessDecision> {
        let distinct: Vec<CollectionId> = collection_ids
            .iter()
            .copied()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        if distinct.is_empty() {
            return Ok(AccessDecision::Indeterminate);
        }

        let collections = self
            .access_service
            .grant_repository()
            .find_collections(&distinct)
            .await?;
        if collections.len() != distinct.len() {
            return Err(AppError::NotFound(
                "one or more collections do not exist".to_owned(),
            ));
        }

        self.authorize_collections(actor, operation, &collections)
            .await
    }

    /// Requires the operation on every collection, failing with `Forbidden`.
    pub async fn require_collections(
        &self,
        actor: &ActorContext,
        operation: CollectionOperation,
        collections: &[Collection],
    ) -> AppResult<()> {
        let decision = self
            .authorize_collections(actor, operation, collections)
            .await?;

        require_decision(decision, || {
            format!(
                "actor is not allowed to perform '{}' on the requested collections",
                operation.as_str()
            )
        })
    }

    async fn resolve_collection_fallback(
        &self,
        user_id: UserId,
        operation: CollectionOperation,
        policy: &OrganizationPolicy,
        collections: &[Collection],
    ) -> AppResult<AccessDecision> {
        // Create has no grant to fall back on.
        let Some(required) = operation.required_level() else {
            return Ok(AccessDecision::Deny);
        };

        let collection_ids: Vec<CollectionId> =
            collections.iter().map(|collection| collection.id).collect();
        let resolved = self
            .access_service
            .resolve_grants(user_id, policy, &collection_ids)
            .await?;

        let weakest = collection_ids
            .iter()
            .map(|id| resolved.get(id).copied().unwrap_or(CollectionAccess::NONE))
            .reduce(CollectionAccess::least_permissive)
            .unwrap_or(CollectionAccess::NONE);

        Ok(AccessDecision::from_allowed(
            weakest.level().satisfies(required),
        ))
    }
}

fn collection_bypass(
    actor: &ActorContext,
    operation: CollectionOperation,
    policy: &OrganizationPolicy,
) -> bool {
    let organization_id = policy.organization_id();
    if actor.is_provider_user_for(organization_id) {
        return true;
    }

    let owner = actor.is_owner(organization_id);
    let admin = actor.is_admin(organization_id);
    let limited = policy.limits_collection_management();

    match operation {
        CollectionOperation::Create => {
            owner
                || admin
                || (!limited
                    && actor
                        .has_permission(organization_id, CustomPermission::CreateNewCollections))
        }
        CollectionOperation::Read | CollectionOperation::ReadAccess => {
            owner
                || admin
                || holds_any(
                    actor,
                    organization_id,
                    &[
                        CustomPermission::ManageGroups,
                        CustomPermission::ManageUsers,
                        CustomPermission::EditAnyCollection,
                        CustomPermission::DeleteAnyCollection,
                        CustomPermission::AccessImportExport,
                    ],
                )
        }
        CollectionOperation::ReadWithAccess => {
            owner
                || admin
                || holds_any(
                    actor,
                    organization_id,
                    &[
                        CustomPermission::EditAnyCollection,
                        CustomPermission::DeleteAnyCollection,
                        CustomPermission::ManageUsers,
                    ],
                )
        }
        CollectionOperation::Update
        | CollectionOperation::ModifyAccess
        | CollectionOperation::ModifyUserAccess
        | CollectionOperation::ModifyGroupAccess
        | CollectionOperation::ImportCiphers => {
            owner
                || (admin && policy.admins_reach_all_collections())
                || actor.has_permission(organization_id, CustomPermission::EditAnyCollection)
        }
        CollectionOperation::Delete => {
            owner
                || admin
                || actor.has_permission(organization_id, CustomPermission::DeleteAnyCollection)
                || (!limited
                    && actor.role(organization_id) == Some(OrganizationUserType::Custom))
        }
    }
}
