use coffer_core::{AppResult, OrganizationId};
use coffer_domain::{
    AccessDecision, ActorContext, CustomPermission, GroupOperation, OrganizationUserOperation,
};
use tracing::debug;

use super::{AuthorizationService, holds_any, require_decision};

const DIRECTORY_READERS: &[CustomPermission] = &[
    CustomPermission::ManageGroups,
    CustomPermission::ManageUsers,
    CustomPermission::EditAnyCollection,
    CustomPermission::DeleteAnyCollection,
    CustomPermission::AccessImportExport,
];

impl AuthorizationService {
    /// Decides an organization-wide group operation.
    pub async fn authorize_groups(
        &self,
        actor: &ActorContext,
        operation: GroupOperation,
        organization_id: OrganizationId,
    ) -> AppResult<AccessDecision> {
        let user_id = actor.require_user_id()?;
        // Fails for unknown organizations.
        self.access_service
            .mode_selector()
            .organization_policy(organization_id)
            .await?;

        let decision = match operation {
            GroupOperation::ReadAll => {
                AccessDecision::from_allowed(reads_directory(actor, organization_id))
            }
        };

        debug!(
            organization_id = %organization_id,
            user_id = %user_id,
            operation = ?operation,
            decision = decision.as_str(),
            "group authorization decided"
        );

        Ok(decision)
    }

    /// Requires an organization-wide group operation.
    pub async fn require_groups(
        &self,
        actor: &ActorContext,
        operation: GroupOperation,
        organization_id: OrganizationId,
    ) -> AppResult<()> {
        let decision = self
            .authorize_groups(actor, operation, organization_id)
            .await?;

        require_decision(decision, || {
            format!("actor may not list groups of organization '{organization_id}'")
        })
    }

    /// Decides an organization-wide membership operation.
    pub async fn authorize_organization_users(
        &self,
        actor: &ActorContext,
        operation: OrganizationUserOperation,
        organization_id: OrganizationId,
    ) -> AppResult<AccessDecision> {
        let user_id = actor.require_user_id()?;
        let policy = self
            .access_service
            .mode_selector()
            .organization_policy(organization_id)
            .await?;

        let decision = match operation {
            OrganizationUserOperation::ReadAll => AccessDecision::from_allowed(
                reads_directory(actor, organization_id)
                    || (!policy.limits_collection_management()
                        && actor.is_member(organization_id)),
            ),
        };

        debug!(
            organization_id = %organization_id,
            user_id = %user_id,
            operation = ?operation,
            decision = decision.as_str(),
            "organization user authorization decided"
        );

        Ok(decision)
    }

    /// Requires an organization-wide membership operation.
    pub async fn require_organization_users(
        &self,
        actor: &ActorContext,
        operation: OrganizationUserOperation,
        organization_id: OrganizationId,
    ) -> AppResult<()> {
        let decision = self
            .authorize_organization_users(actor, operation, organization_id)
            .await?;

        require_decision(decision, || {
            format!("actor may not list members of organization '{organization_id}'")
        })
    }
}

fn reads_directory(actor: &ActorContext, organization_id: OrganizationId) -> bool {
    actor.is_provider_user_for(organization_id)
        || actor.is_owner(organization_id)
        || actor.is_admin(organization_id)
        || holds_any(actor, organization_id, DIRECTORY_READERS)
}
