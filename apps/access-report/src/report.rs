use coffer_application::{AuthorizationService, ResolvedCollectionAccess};
use coffer_core::{AppResult, CipherId, CollectionId, OrganizationId};
use coffer_domain::{
    AccessDecision, ActorContext, AuthorizationMode, Collection, CollectionAccess,
    CollectionOperation, GroupOperation, OrganizationUserOperation, OrganizationUserType,
};
use tracing::info;

/// Effective access of one user inside one organization.
#[derive(Debug, Clone)]
pub struct OrganizationReport {
    pub organization_id: OrganizationId,
    pub mode: AuthorizationMode,
    pub role: Option<OrganizationUserType>,
    pub provider: bool,
    pub collections: Vec<ResolvedCollectionAccess>,
    pub create_collections: AccessDecision,
    pub read_groups: AccessDecision,
    pub read_members: AccessDecision,
}

#[derive(Debug, Clone)]
pub struct AccessReport {
    pub organizations: Vec<OrganizationReport>,
    pub ciphers: Vec<(CipherId, CollectionAccess)>,
}

pub async fn build_report(
    authorization: &AuthorizationService,
    actor: &ActorContext,
    organization_ids: &[OrganizationId],
    cipher_ids: &[CipherId],
) -> AppResult<AccessReport> {
    let access = authorization.access_service();
    let mut organizations = Vec::with_capacity(organization_ids.len());

    for organization_id in organization_ids.iter().copied() {
        let mode = access
            .mode_selector()
            .resolve_mode(organization_id)
            .await?;
        let collections = access
            .list_collection_access(actor, organization_id)
            .await?;
        let prospective = Collection {
            id: CollectionId::new(),
            organization_id,
        };

        organizations.push(OrganizationReport {
            organization_id,
            mode,
            role: actor.role(organization_id),
            provider: actor.is_provider_user_for(organization_id),
            collections,
            create_collections: authorization
                .authorize_collections(actor, CollectionOperation::Create, &[prospective])
                .await?,
            read_groups: authorization
                .authorize_groups(actor, GroupOperation::ReadAll, organization_id)
                .await?,
            read_members: authorization
                .authorize_organization_users(
                    actor,
                    OrganizationUserOperation::ReadAll,
                    organization_id,
                )
                .await?,
        });
    }

    let mut ciphers = Vec::with_capacity(cipher_ids.len());
    for cipher_id in cipher_ids.iter().copied() {
        ciphers.push((cipher_id, access.resolve_cipher(actor, cipher_id).await?));
    }

    Ok(AccessReport {
        organizations,
        ciphers,
    })
}

pub fn log_report(report: &AccessReport) {
    for organization in &report.organizations {
        info!(
            organization_id = %organization.organization_id,
            mode = %organization.mode,
            role = organization.role.map_or("none", |role| role.as_str()),
            provider = organization.provider,
            collections = organization.collections.len(),
            create_collections = organization.create_collections.as_str(),
            read_groups = organization.read_groups.as_str(),
            read_members = organization.read_members.as_str(),
            "organization access"
        );

        for entry in &organization.collections {
            info!(
                organization_id = %organization.organization_id,
                collection_id = %entry.collection.id,
                level = %entry.access.level(),
                hide_passwords = entry.access.hide_passwords(),
                "collection access"
            );
        }
    }

    for (cipher_id, access) in &report.ciphers {
        info!(
            cipher_id = %cipher_id,
            level = %access.level(),
            hide_passwords = access.hide_passwords(),
            "cipher access"
        );
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use coffer_application::{
        AccessService, AuthorizationService, CollectionAccessWriter, ModeSelector,
        OrganizationAbilityProvider,
    };
    use coffer_core::{
        ActorIdentity, AppResult, CipherId, CollectionId, OrganizationId, OrganizationUserId,
        UserId,
    };
    use coffer_domain::{
        AccessDecision, ActorContext, AuthorizationMode, Cipher, CipherOwner, Collection,
        CollectionAccessGrant, CustomPermissions, GrantPermissions, GrantSubject,
        OrganizationAbility, OrganizationMembership, OrganizationUserStatus,
        OrganizationUserType, PermissionLevel,
    };
    use coffer_infrastructure::{InMemoryGrantRepository, StaticFeatureFlagSource};

    use super::build_report;

    #[tokio::test]
    async fn report_lists_granted_collections_and_ciphers() -> AppResult<()> {
        let store = Arc::new(InMemoryGrantRepository::new());
        let organization_id = OrganizationId::new();
        store
            .save_ability(OrganizationAbility {
                flexible_collections: true,
                limit_collection_creation_deletion: true,
                ..OrganizationAbility::legacy(organization_id)
            })
            .await;

        let membership = OrganizationMembership {
            id: OrganizationUserId::new(),
            organization_id,
            user_id: Some(UserId::new()),
            role: OrganizationUserType::User,
            status: OrganizationUserStatus::Confirmed,
            permissions: CustomPermissions::empty(),
            access_all: false,
        };
        store.save_membership(membership.clone()).await;

        let collection = Collection {
            id: CollectionId::new(),
            organization_id,
        };
        store.save_collection(collection).await;
        store
            .replace_collection_access(
                collection.id,
                vec![CollectionAccessGrant {
                    collection_id: collection.id,
                    subject: GrantSubject::Member(membership.id),
                    permissions: GrantPermissions::read_write().hiding_passwords(),
                }],
            )
            .await?;

        let cipher = Cipher {
            id: CipherId::new(),
            owner: CipherOwner::Organization(organization_id),
            collection_ids: vec![collection.id],
        };
        store.save_cipher(cipher.clone()).await;

        let flags = StaticFeatureFlagSource::parse("flexible-collections")?;
        let access = AccessService::new(
            store.clone(),
            ModeSelector::new(OrganizationAbilityProvider::new(store), Arc::new(flags)),
        );
        let authorization = AuthorizationService::new(access);
        let actor = ActorContext::from_memberships(
            ActorIdentity::new(membership.user_id.unwrap_or_default(), None),
            [&membership],
        );

        let report =
            build_report(&authorization, &actor, &[organization_id], &[cipher.id]).await?;

        assert_eq!(report.organizations.len(), 1);
        let organization = &report.organizations[0];
        assert_eq!(organization.mode, AuthorizationMode::FlexibleV1);
        assert_eq!(organization.role, Some(OrganizationUserType::User));
        assert_eq!(organization.collections.len(), 1);
        assert_eq!(organization.create_collections, AccessDecision::Deny);
        assert_eq!(organization.read_members, AccessDecision::Deny);

        assert_eq!(report.ciphers.len(), 1);
        let (_, cipher_access) = report.ciphers[0];
        assert_eq!(cipher_access.level(), PermissionLevel::ReadWrite);
        assert!(cipher_access.hide_passwords());
        Ok(())
    }
}
