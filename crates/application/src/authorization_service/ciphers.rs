use std::collections::BTreeSet;

use coffer_core::{AppError, AppResult, CipherId, OrganizationId};
use coffer_domain::{
    AccessDecision, ActorContext, Cipher, CipherOperation, CollectionAccess, CustomPermission,
};
use tracing::debug;

use super::{AuthorizationService, holds_any, require_decision};

impl AuthorizationService {
    /// Decides whether the actor may perform the operation on every cipher.
    ///
    /// Ciphers must all be personal or all belong to one organization.
    pub async fn authorize_ciphers(
        &self,
        actor: &ActorContext,
        operation: CipherOperation,
        cipher_ids: &[CipherId],
    ) -> AppResult<AccessDecision> {
        let distinct: Vec<CipherId> = cipher_ids
            .iter()
            .copied()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        if distinct.is_empty() {
            return Ok(AccessDecision::Indeterminate);
        }

        let user_id = actor.require_user_id()?;
        let ciphers = self
            .access_service
            .grant_repository()
            .find_ciphers(&distinct)
            .await?;
        if ciphers.len() != distinct.len() {
            return Err(AppError::NotFound(
                "one or more ciphers do not exist".to_owned(),
            ));
        }

        let owners: BTreeSet<Option<OrganizationId>> =
            ciphers.iter().map(Cipher::organization_id).collect();
        if owners.len() > 1 {
            return Err(AppError::Validation(
                "ciphers must all be personal or belong to the same organization".to_owned(),
            ));
        }

        let Some(required) = operation.required_level() else {
            return match owners.into_iter().next().flatten() {
                Some(organization_id) => {
                    self.authorize_cipher_read_all(actor, organization_id).await
                }
                None => Err(AppError::Validation(
                    "listing every cipher requires an organization".to_owned(),
                )),
            };
        };

        let resolved = self
            .access_service
            .resolve_cipher_access(actor, &ciphers)
            .await?;
        let weakest = resolved
            .values()
            .copied()
            .reduce(CollectionAccess::least_permissive)
            .unwrap_or(CollectionAccess::NONE);

        let allowed = weakest.level().satisfies(required)
            && (!operation.requires_visible_passwords() || weakest.can_view_passwords());
        let decision = AccessDecision::from_allowed(allowed);

        debug!(
            user_id = %user_id,
            operation = operation.as_str(),
            targets = ciphers.len(),
            weakest = %weakest.level(),
            decision = decision.as_str(),
            "cipher authorization decided"
        );

        Ok(decision)
    }

    /// Decides whether the actor may list every cipher of the organization.
    pub async fn authorize_cipher_read_all(
        &self,
        actor: &ActorContext,
        organization_id: OrganizationId,
    ) -> AppResult<AccessDecision> {
        let user_id = actor.require_user_id()?;
        self.access_service
            .mode_selector()
            .organization_policy(organization_id)
            .await?;

        let decision = AccessDecision::from_allowed(
            actor.is_provider_user_for(organization_id)
                || actor.is_owner(organization_id)
                || actor.is_admin(organization_id)
                || holds_any(
                    actor,
                    organization_id,
                    &[
                        CustomPermission::AccessImportExport,
                        CustomPermission::EditAnyCollection,
                        CustomPermission::AccessReports,
                    ],
                ),
        );

        debug!(
            organization_id = %organization_id,
            user_id = %user_id,
            decision = decision.as_str(),
            "cipher listing authorization decided"
        );

        Ok(decision)
    }

    /// Requires the operation on every cipher, failing with `Forbidden`.
    pub async fn require_ciphers(
        &self,
        actor: &ActorContext,
        operation: CipherOperation,
        cipher_ids: &[CipherId],
    ) -> AppResult<()> {
        let decision = self
            .authorize_ciphers(actor, operation, cipher_ids)
            .await?;

        require_decision(decision, || {
            format!(
                "actor is not allowed to perform '{}' on the requested ciphers",
                operation.as_str()
            )
        })
    }
}
