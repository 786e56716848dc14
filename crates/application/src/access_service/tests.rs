use coffer_core::{
    ActorIdentity, AppError, AppResult, CollectionId, OrganizationUserId, UserId,
};
use coffer_domain::{
    ActorContext, CipherOwner, CollectionAccess, CustomPermission, CustomPermissions,
    GrantPermissions, GrantSubject, OrganizationMembership, OrganizationUserStatus,
    OrganizationUserType, PermissionLevel,
};

use crate::test_fixtures::{Fixture, Rollout, outsider, provider_user};

#[tokio::test]
async fn member_without_grants_resolves_to_none() -> AppResult<()> {
    let (mut fixture, organization_id) = Fixture::for_rollout(Rollout::Legacy);
    let (_, actor) = fixture.member(organization_id, OrganizationUserType::User);
    let collection = fixture.collection(organization_id);
    let harness = fixture.build();

    let access = harness
        .access_service
        .resolve_collection(&actor, collection.id)
        .await?;

    assert_eq!(access, CollectionAccess::NONE);
    Ok(())
}

#[tokio::test]
async fn legacy_access_all_membership_reaches_every_collection() -> AppResult<()> {
    let (mut fixture, organization_id) = Fixture::for_rollout(Rollout::Legacy);
    let (_, actor) = fixture.member_with(organization_id, OrganizationUserType::User, &[], true);
    let first = fixture.collection(organization_id);
    let second = fixture.collection(organization_id);
    let harness = fixture.build();

    for collection in [first, second] {
        let access = harness
            .access_service
            .resolve_collection(&actor, collection.id)
            .await?;
        assert_eq!(access, CollectionAccess::FULL);
    }
    Ok(())
}

#[tokio::test]
async fn access_all_is_ignored_once_flexible_collections_is_on() -> AppResult<()> {
    let (mut fixture, organization_id) = Fixture::for_rollout(Rollout::FlexibleV0);
    let (_, actor) = fixture.member_with(organization_id, OrganizationUserType::User, &[], true);
    let collection = fixture.collection(organization_id);
    let harness = fixture.build();

    let access = harness
        .access_service
        .resolve_collection(&actor, collection.id)
        .await?;

    assert_eq!(access, CollectionAccess::NONE);
    Ok(())
}

#[tokio::test]
async fn admin_with_admin_access_enabled_manages_ungranted_collection() -> AppResult<()> {
    let (mut fixture, organization_id) = Fixture::for_rollout(Rollout::FlexibleV1 {
        allow_admin_access: true,
    });
    let (_, admin) = fixture.member(organization_id, OrganizationUserType::Admin);
    let collection = fixture.collection(organization_id);
    let harness = fixture.build();

    let access = harness
        .access_service
        .resolve_collection(&admin, collection.id)
        .await?;

    assert_eq!(access.level(), PermissionLevel::Manage);
    Ok(())
}

#[tokio::test]
async fn admin_without_admin_access_falls_back_to_grants() -> AppResult<()> {
    let (mut fixture, organization_id) = Fixture::for_rollout(Rollout::FlexibleV1 {
        allow_admin_access: false,
    });
    let (membership, admin) = fixture.member(organization_id, OrganizationUserType::Admin);
    let granted = fixture.collection(organization_id);
    let ungranted = fixture.collection(organization_id);
    fixture.grant(
        &granted,
        GrantSubject::Member(membership.id),
        GrantPermissions::read_only(),
    );
    let harness = fixture.build();

    let granted_access = harness
        .access_service
        .resolve_collection(&admin, granted.id)
        .await?;
    let ungranted_access = harness
        .access_service
        .resolve_collection(&admin, ungranted.id)
        .await?;

    assert_eq!(granted_access.level(), PermissionLevel::ReadOnly);
    assert_eq!(ungranted_access, CollectionAccess::NONE);
    Ok(())
}

#[tokio::test]
async fn owner_keeps_full_access_without_admin_access() -> AppResult<()> {
    let (mut fixture, organization_id) = Fixture::for_rollout(Rollout::FlexibleV1 {
        allow_admin_access: false,
    });
    let (_, owner) = fixture.member(organization_id, OrganizationUserType::Owner);
    let collection = fixture.collection(organization_id);
    let harness = fixture.build();

    let access = harness
        .access_service
        .resolve_collection(&owner, collection.id)
        .await?;

    assert_eq!(access, CollectionAccess::FULL);
    Ok(())
}

#[tokio::test]
async fn least_restrictive_group_grant_wins() -> AppResult<()> {
    let (mut fixture, organization_id) = Fixture::for_rollout(Rollout::FlexibleV0);
    let (membership, actor) = fixture.member(organization_id, OrganizationUserType::User);
    let read_group = fixture.group(organization_id, false);
    let write_group = fixture.group(organization_id, false);
    fixture.join_group(&read_group, &membership);
    fixture.join_group(&write_group, &membership);
    let collection = fixture.collection(organization_id);
    fixture.grant(
        &collection,
        GrantSubject::Group(read_group.id),
        GrantPermissions::read_only(),
    );
    fixture.grant(
        &collection,
        GrantSubject::Group(write_group.id),
        GrantPermissions::read_write(),
    );
    let harness = fixture.build();

    let access = harness
        .access_service
        .resolve_collection(&actor, collection.id)
        .await?;

    assert_eq!(access.level(), PermissionLevel::ReadWrite);
    Ok(())
}

#[tokio::test]
async fn edit_any_collection_receives_full_access() -> AppResult<()> {
    let (mut fixture, organization_id) = Fixture::for_rollout(Rollout::FlexibleV1 {
        allow_admin_access: false,
    });
    let (_, actor) =
        fixture.custom_member(organization_id, &[CustomPermission::EditAnyCollection]);
    let collection = fixture.collection(organization_id);
    let harness = fixture.build();

    let access = harness
        .access_service
        .resolve_collection(&actor, collection.id)
        .await?;

    assert_eq!(access, CollectionAccess::FULL);
    Ok(())
}

#[tokio::test]
async fn provider_user_receives_full_access_in_every_mode() -> AppResult<()> {
    for rollout in [
        Rollout::Legacy,
        Rollout::FlexibleV0,
        Rollout::FlexibleV1 {
            allow_admin_access: false,
        },
    ] {
        let (mut fixture, organization_id) = Fixture::for_rollout(rollout);
        let collection = fixture.collection(organization_id);
        let harness = fixture.build();

        let access = harness
            .access_service
            .resolve_collection(&provider_user(organization_id), collection.id)
            .await?;

        assert_eq!(access, CollectionAccess::FULL);
    }
    Ok(())
}

#[tokio::test]
async fn invited_member_grants_do_not_count() -> AppResult<()> {
    let (mut fixture, organization_id) = Fixture::for_rollout(Rollout::FlexibleV0);
    let user_id = UserId::new();
    let invited = OrganizationMembership {
        id: OrganizationUserId::new(),
        organization_id,
        user_id: Some(user_id),
        role: OrganizationUserType::User,
        status: OrganizationUserStatus::Invited,
        permissions: CustomPermissions::empty(),
        access_all: false,
    };
    fixture.add_membership(invited.clone());
    let collection = fixture.collection(organization_id);
    fixture.grant(
        &collection,
        GrantSubject::Member(invited.id),
        GrantPermissions::manage(),
    );
    let harness = fixture.build();

    let access = harness
        .access_service
        .resolve_collection(&ActorContext::new(ActorIdentity::new(user_id, None)), collection.id)
        .await?;

    assert_eq!(access, CollectionAccess::NONE);
    Ok(())
}

#[tokio::test]
async fn missing_collection_is_not_found() {
    let (fixture, _) = Fixture::for_rollout(Rollout::Legacy);
    let harness = fixture.build();

    let result = harness
        .access_service
        .resolve_collection(&outsider(), CollectionId::new())
        .await;

    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn anonymous_actor_is_invalid_request() {
    let (mut fixture, organization_id) = Fixture::for_rollout(Rollout::Legacy);
    let collection = fixture.collection(organization_id);
    let harness = fixture.build();

    let result = harness
        .access_service
        .resolve_collection(&ActorContext::new(ActorIdentity::anonymous()), collection.id)
        .await;

    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn personal_cipher_is_managed_by_owner_only() -> AppResult<()> {
    let (mut fixture, organization_id) = Fixture::for_rollout(Rollout::Legacy);
    let (membership, owner_actor) = fixture.member(organization_id, OrganizationUserType::Owner);
    let owner_id = membership.user_id.unwrap_or_default();
    let cipher = fixture.cipher(CipherOwner::User(owner_id), &[]);
    let harness = fixture.build();

    let own = harness
        .access_service
        .resolve_cipher(&owner_actor, cipher.id)
        .await?;
    let foreign = harness
        .access_service
        .resolve_cipher(&outsider(), cipher.id)
        .await?;

    assert_eq!(own, CollectionAccess::FULL);
    assert_eq!(foreign, CollectionAccess::NONE);
    Ok(())
}

#[tokio::test]
async fn assigned_cipher_takes_highest_collection_level() -> AppResult<()> {
    let (mut fixture, organization_id) = Fixture::for_rollout(Rollout::FlexibleV0);
    let (membership, actor) = fixture.member(organization_id, OrganizationUserType::User);
    let read_only = fixture.collection(organization_id);
    let writable = fixture.collection(organization_id);
    let unrelated = fixture.collection(organization_id);
    fixture.grant(
        &read_only,
        GrantSubject::Member(membership.id),
        GrantPermissions::read_only(),
    );
    fixture.grant(
        &writable,
        GrantSubject::Member(membership.id),
        GrantPermissions::read_write().hiding_passwords(),
    );
    let cipher = fixture.cipher(
        CipherOwner::Organization(organization_id),
        &[&read_only, &writable, &unrelated],
    );
    let harness = fixture.build();

    let access = harness
        .access_service
        .resolve_cipher(&actor, cipher.id)
        .await?;

    assert_eq!(access.level(), PermissionLevel::ReadWrite);
    assert!(access.hide_passwords());
    Ok(())
}

#[tokio::test]
async fn unassigned_cipher_is_readable_with_import_export_only() -> AppResult<()> {
    let (mut fixture, organization_id) = Fixture::for_rollout(Rollout::FlexibleV1 {
        allow_admin_access: true,
    });
    let (_, importer) =
        fixture.custom_member(organization_id, &[CustomPermission::AccessImportExport]);
    let (_, editor) = fixture.custom_member(
        organization_id,
        &[
            CustomPermission::AccessImportExport,
            CustomPermission::EditAnyCollection,
        ],
    );
    let (_, plain) = fixture.member(organization_id, OrganizationUserType::User);
    let cipher = fixture.cipher(CipherOwner::Organization(organization_id), &[]);
    let harness = fixture.build();

    let importer_access = harness
        .access_service
        .resolve_cipher(&importer, cipher.id)
        .await?;
    let editor_access = harness
        .access_service
        .resolve_cipher(&editor, cipher.id)
        .await?;
    let plain_access = harness
        .access_service
        .resolve_cipher(&plain, cipher.id)
        .await?;

    assert!(importer_access.can_read());
    assert!(!importer_access.can_edit());
    assert!(editor_access.can_edit());
    assert_eq!(plain_access, CollectionAccess::NONE);
    Ok(())
}

#[tokio::test]
async fn listing_omits_unreachable_collections() -> AppResult<()> {
    let (mut fixture, organization_id) = Fixture::for_rollout(Rollout::FlexibleV0);
    let (membership, actor) = fixture.member(organization_id, OrganizationUserType::User);
    let visible = fixture.collection(organization_id);
    fixture.collection(organization_id);
    fixture.grant(
        &visible,
        GrantSubject::Member(membership.id),
        GrantPermissions::read_write(),
    );
    let harness = fixture.build();

    let listed = harness
        .access_service
        .list_collection_access(&actor, organization_id)
        .await?;

    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].collection, visible);
    assert_eq!(listed[0].access.level(), PermissionLevel::ReadWrite);
    Ok(())
}
