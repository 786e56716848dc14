use std::collections::BTreeSet;
use std::sync::Arc;

use coffer_core::{AppError, AppResult, CollectionId, GroupId, OrganizationUserId, UserId};
use coffer_domain::{
    ActorContext, AuditAction, Collection, CollectionAccessGrant, CollectionAccessSelection,
    CollectionOperation, GrantSubject, OrganizationMembership,
};
use tracing::warn;

use crate::{
    AccountRevisionRepository, AuditEvent, AuditRepository, AuthorizationService,
    CollectionAccessWriter,
};

/// Application service replacing collection access lists.
#[derive(Clone)]
pub struct CollectionAccessService {
    authorization_service: AuthorizationService,
    writer: Arc<dyn CollectionAccessWriter>,
    revision_repository: Arc<dyn AccountRevisionRepository>,
    audit_repository: Arc<dyn AuditRepository>,
}

impl CollectionAccessService {
    /// Creates a collection access service.
    #[must_use]
    pub fn new(
        authorization_service: AuthorizationService,
        writer: Arc<dyn CollectionAccessWriter>,
        revision_repository: Arc<dyn AccountRevisionRepository>,
        audit_repository: Arc<dyn AuditRepository>,
    ) -> Self {
        Self {
            authorization_service,
            writer,
            revision_repository,
            audit_repository,
        }
    }

    /// Replaces every direct and group grant on a collection.
    pub async fn replace_collection_access(
        &self,
        actor: &ActorContext,
        collection_id: CollectionId,
        selections: Vec<CollectionAccessSelection>,
    ) -> AppResult<()> {
        let access_service = self.authorization_service.access_service();
        let collection = access_service.find_collection(collection_id).await?;
        self.authorization_service
            .require_collections(
                actor,
                CollectionOperation::ModifyAccess,
                std::slice::from_ref(&collection),
            )
            .await?;

        let grant_repository = access_service.grant_repository();
        let memberships = grant_repository
            .list_memberships(collection.organization_id)
            .await?;
        let group_ids: BTreeSet<GroupId> = grant_repository
            .list_groups(collection.organization_id)
            .await?
            .into_iter()
            .map(|group| group.id)
            .collect();
        validate_selections(&collection, &selections, &memberships, &group_ids)?;

        let policy = access_service
            .mode_selector()
            .organization_policy(collection.organization_id)
            .await?;
        if !policy.admins_reach_all_collections()
            && !selections
                .iter()
                .any(|selection| selection.permissions.manage)
        {
            return Err(AppError::Validation(
                "at least one member or group must be able to manage the collection".to_owned(),
            ));
        }

        let previous = grant_repository.list_collection_grants(collection.id).await?;
        let grants: Vec<CollectionAccessGrant> = selections
            .iter()
            .map(|selection| selection.into_grant(collection.id))
            .collect();
        self.writer
            .replace_collection_access(collection.id, grants.clone())
            .await?;

        let subjects: BTreeSet<GrantSubject> = previous
            .iter()
            .chain(grants.iter())
            .map(|grant| grant.subject)
            .collect();
        self.bump_affected_revisions(&collection, &subjects, &memberships)
            .await;

        let member_count = grants
            .iter()
            .filter(|grant| matches!(grant.subject, GrantSubject::Member(_)))
            .count();
        let actor_subject = actor
            .user_id()
            .map(|user_id| user_id.to_string())
            .unwrap_or_default();

        self.audit_repository
            .append_event(AuditEvent {
                organization_id: collection.organization_id,
                subject: actor_subject,
                action: AuditAction::CollectionAccessUpdated,
                resource_type: "collection".to_owned(),
                resource_id: collection.id.to_string(),
                detail: Some(format!(
                    "replaced access with {member_count} member and {} group grants",
                    grants.len() - member_count
                )),
            })
            .await
    }

    async fn bump_affected_revisions(
        &self,
        collection: &Collection,
        subjects: &BTreeSet<GrantSubject>,
        memberships: &[OrganizationMembership],
    ) {
        let mut organization_user_ids: BTreeSet<OrganizationUserId> = BTreeSet::new();
        let mut group_ids = Vec::new();
        for subject in subjects {
            match subject {
                GrantSubject::Member(organization_user_id) => {
                    organization_user_ids.insert(*organization_user_id);
                }
                GrantSubject::Group(group_id) => group_ids.push(*group_id),
            }
        }

        if !group_ids.is_empty() {
            match self
                .authorization_service
                .access_service()
                .grant_repository()
                .list_group_members(&group_ids)
                .await
            {
                Ok(members) => organization_user_ids.extend(members),
                Err(error) => warn!(
                    collection_id = %collection.id,
                    error = %error,
                    "failed to expand group members for revision bump"
                ),
            }
        }

        let user_ids: Vec<UserId> = memberships
            .iter()
            .filter(|membership| organization_user_ids.contains(&membership.id))
            .filter_map(|membership| membership.user_id)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        if user_ids.is_empty() {
            return;
        }

        if let Err(error) = self
            .revision_repository
            .bump_account_revisions(&user_ids)
            .await
        {
            warn!(
                collection_id = %collection.id,
                users = user_ids.len(),
                error = %error,
                "failed to bump account revisions after access change"
            );
        }
    }
}

fn validate_selections(
    collection: &Collection,
    selections: &[CollectionAccessSelection],
    memberships: &[OrganizationMembership],
    group_ids: &BTreeSet<GroupId>,
) -> AppResult<()> {
    let mut seen = BTreeSet::new();

    for selection in selections {
        if !seen.insert(selection.subject) {
            return Err(AppError::Validation(format!(
                "duplicate {} entry in access list for collection '{}'",
                selection.subject.kind(),
                collection.id
            )));
        }

        let known = match selection.subject {
            GrantSubject::Member(organization_user_id) => memberships
                .iter()
                .any(|membership| membership.id == organization_user_id),
            GrantSubject::Group(group_id) => group_ids.contains(&group_id),
        };
        if !known {
            return Err(AppError::Validation(format!(
                "{} does not belong to organization '{}'",
                selection.subject.kind(),
                collection.organization_id
            )));
        }
    }

    Ok(())
}
