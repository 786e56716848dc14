use std::str::FromStr;

use coffer_core::AppError;
use coffer_domain::{
    CustomPermission, CustomPermissions, OrganizationUserStatus, OrganizationUserType,
};
use sqlx::FromRow;

use super::*;

const PROVIDER_USER_CONFIRMED: i16 = 2;

#[derive(Debug, FromRow)]
struct MembershipRow {
    id: Uuid,
    organization_id: Uuid,
    user_id: Option<Uuid>,
    user_type: i16,
    status: i16,
    permissions: Vec<String>,
    access_all: bool,
}

impl MembershipRow {
    fn into_membership(self) -> AppResult<OrganizationMembership> {
        let decode = |error: AppError| {
            AppError::Internal(format!(
                "failed to decode organization user '{}': {error}",
                self.id
            ))
        };

        let role = OrganizationUserType::from_code(self.user_type).map_err(decode)?;
        let status = OrganizationUserStatus::from_code(self.status).map_err(decode)?;
        let permissions = self
            .permissions
            .iter()
            .map(|value| CustomPermission::from_str(value.as_str()))
            .collect::<AppResult<Vec<_>>>()
            .map_err(decode)?
            .into_iter()
            .collect::<CustomPermissions>();

        Ok(OrganizationMembership {
            id: OrganizationUserId::from_uuid(self.id),
            organization_id: OrganizationId::from_uuid(self.organization_id),
            user_id: self.user_id.map(UserId::from_uuid),
            role,
            status,
            permissions,
            access_all: self.access_all,
        })
    }
}

#[derive(Debug, FromRow)]
struct GroupRow {
    id: Uuid,
    organization_id: Uuid,
    access_all: bool,
}

impl From<GroupRow> for Group {
    fn from(row: GroupRow) -> Self {
        Self {
            id: GroupId::from_uuid(row.id),
            organization_id: OrganizationId::from_uuid(row.organization_id),
            access_all: row.access_all,
        }
    }
}

fn into_memberships(rows: Vec<MembershipRow>) -> AppResult<Vec<OrganizationMembership>> {
    rows.into_iter().map(MembershipRow::into_membership).collect()
}

impl PostgresGrantRepository {
    pub(super) async fn find_membership_impl(
        &self,
        organization_id: OrganizationId,
        user_id: UserId,
    ) -> AppResult<Option<OrganizationMembership>> {
        let row = sqlx::query_as::<_, MembershipRow>(
            r#"
            SELECT id, organization_id, user_id, type AS user_type, status, permissions, access_all
            FROM organization_users
            WHERE organization_id = $1
                AND user_id = $2
            "#,
        )
        .bind(organization_id.as_uuid())
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to find organization membership: {error}"))
        })?;

        row.map(MembershipRow::into_membership).transpose()
    }

    pub(super) async fn list_memberships_impl(
        &self,
        organization_id: OrganizationId,
    ) -> AppResult<Vec<OrganizationMembership>> {
        let rows = sqlx::query_as::<_, MembershipRow>(
            r#"
            SELECT id, organization_id, user_id, type AS user_type, status, permissions, access_all
            FROM organization_users
            WHERE organization_id = $1
            ORDER BY id
            "#,
        )
        .bind(organization_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to list organization memberships: {error}"))
        })?;

        into_memberships(rows)
    }

    pub(super) async fn list_memberships_for_user_impl(
        &self,
        user_id: UserId,
    ) -> AppResult<Vec<OrganizationMembership>> {
        let rows = sqlx::query_as::<_, MembershipRow>(
            r#"
            SELECT id, organization_id, user_id, type AS user_type, status, permissions, access_all
            FROM organization_users
            WHERE user_id = $1
            ORDER BY organization_id
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to list memberships for user: {error}"))
        })?;

        into_memberships(rows)
    }

    pub(super) async fn list_provider_organizations_impl(
        &self,
        user_id: UserId,
    ) -> AppResult<Vec<OrganizationId>> {
        let organization_ids = sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT DISTINCT provider_organizations.organization_id
            FROM provider_users
            INNER JOIN provider_organizations
                ON provider_organizations.provider_id = provider_users.provider_id
            WHERE provider_users.user_id = $1
                AND provider_users.status = $2
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(PROVIDER_USER_CONFIRMED)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to list provider organizations: {error}"))
        })?;

        Ok(organization_ids
            .into_iter()
            .map(OrganizationId::from_uuid)
            .collect())
    }

    pub(super) async fn list_groups_impl(
        &self,
        organization_id: OrganizationId,
    ) -> AppResult<Vec<Group>> {
        let rows = sqlx::query_as::<_, GroupRow>(
            r#"
            SELECT id, organization_id, access_all
            FROM groups
            WHERE organization_id = $1
            ORDER BY id
            "#,
        )
        .bind(organization_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list groups: {error}")))?;

        Ok(rows.into_iter().map(Group::from).collect())
    }

    pub(super) async fn list_groups_for_membership_impl(
        &self,
        organization_user_id: OrganizationUserId,
    ) -> AppResult<Vec<Group>> {
        let rows = sqlx::query_as::<_, GroupRow>(
            r#"
            SELECT groups.id, groups.organization_id, groups.access_all
            FROM group_users
            INNER JOIN groups ON groups.id = group_users.group_id
            WHERE group_users.organization_user_id = $1
            ORDER BY groups.id
            "#,
        )
        .bind(organization_user_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to list groups for membership: {error}"))
        })?;

        Ok(rows.into_iter().map(Group::from).collect())
    }

    pub(super) async fn list_group_members_impl(
        &self,
        group_ids: &[GroupId],
    ) -> AppResult<Vec<OrganizationUserId>> {
        if group_ids.is_empty() {
            return Ok(Vec::new());
        }

        let member_ids = sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT DISTINCT organization_user_id
            FROM group_users
            WHERE group_id = ANY($1)
            "#,
        )
        .bind(group_uuids(group_ids))
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list group members: {error}")))?;

        Ok(member_ids
            .into_iter()
            .map(OrganizationUserId::from_uuid)
            .collect())
    }
}
