use std::collections::{BTreeMap, BTreeSet};

use coffer_core::{AppError, AppResult, CipherId, CollectionId, OrganizationId};
use coffer_domain::{
    ActorContext, Cipher, CipherOwner, CollectionAccess, CustomPermission, PermissionLevel,
};

use super::AccessService;

impl AccessService {
    /// Resolves the actor's effective access on one cipher.
    pub async fn resolve_cipher(
        &self,
        actor: &ActorContext,
        cipher_id: CipherId,
    ) -> AppResult<CollectionAccess> {
        let cipher = self
            .grant_repository
            .find_ciphers(&[cipher_id])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| AppError::NotFound(format!("cipher '{cipher_id}' does not exist")))?;

        let resolved = self
            .resolve_cipher_access(actor, std::slice::from_ref(&cipher))
            .await?;

        Ok(resolved
            .get(&cipher_id)
            .copied()
            .unwrap_or(CollectionAccess::NONE))
    }

    /// Resolves access on already loaded ciphers.
    pub(crate) async fn resolve_cipher_access(
        &self,
        actor: &ActorContext,
        ciphers: &[Cipher],
    ) -> AppResult<BTreeMap<CipherId, CollectionAccess>> {
        let user_id = actor.require_user_id()?;

        let mut collections_by_organization: BTreeMap<OrganizationId, BTreeSet<CollectionId>> =
            BTreeMap::new();
        for cipher in ciphers {
            if let Some(organization_id) = cipher.organization_id() {
                collections_by_organization
                    .entry(organization_id)
                    .or_default()
                    .extend(cipher.collection_ids.iter().copied());
            }
        }

        let mut collection_access = BTreeMap::new();
        for (organization_id, collection_ids) in collections_by_organization {
            if collection_ids.is_empty() {
                continue;
            }

            let policy = self
                .mode_selector
                .organization_policy(organization_id)
                .await?;
            let collection_ids: Vec<CollectionId> = collection_ids.into_iter().collect();
            collection_access.extend(
                self.resolve_collections(actor, user_id, &policy, &collection_ids)
                    .await?,
            );
        }

        Ok(ciphers
            .iter()
            .map(|cipher| {
                let access = match cipher.owner {
                    CipherOwner::User(owner_id) if owner_id == user_id => CollectionAccess::FULL,
                    CipherOwner::User(_) => CollectionAccess::NONE,
                    CipherOwner::Organization(organization_id) => organization_cipher_access(
                        actor,
                        organization_id,
                        cipher,
                        &collection_access,
                    ),
                };
                (cipher.id, access)
            })
            .collect())
    }
}

fn organization_cipher_access(
    actor: &ActorContext,
    organization_id: OrganizationId,
    cipher: &Cipher,
    collection_access: &BTreeMap<CollectionId, CollectionAccess>,
) -> CollectionAccess {
    // Import/export rights let a member read every organization item.
    let floor = if actor.has_permission(organization_id, CustomPermission::AccessImportExport) {
        CollectionAccess::new(PermissionLevel::ReadOnly, false)
    } else {
        CollectionAccess::NONE
    };

    if cipher.collection_ids.is_empty() {
        let unassigned_editor = actor.is_provider_user_for(organization_id)
            || actor.is_owner(organization_id)
            || actor.is_admin(organization_id)
            || actor.has_permission(organization_id, CustomPermission::EditAnyCollection);

        return if unassigned_editor {
            CollectionAccess::FULL
        } else {
            floor
        };
    }

    cipher
        .collection_ids
        .iter()
        .filter_map(|collection_id| collection_access.get(collection_id))
        .copied()
        .fold(floor, CollectionAccess::most_permissive)
}
