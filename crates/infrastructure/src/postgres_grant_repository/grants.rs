use coffer_core::AppError;
use coffer_domain::{GrantPermissions, GrantSubject};
use sqlx::FromRow;
use tracing::debug;

use super::*;

#[derive(Debug, FromRow)]
struct GrantRow {
    collection_id: Uuid,
    subject_id: Uuid,
    read_only: bool,
    hide_passwords: bool,
    manage: bool,
}

impl GrantRow {
    fn into_grant(self, subject: fn(Uuid) -> GrantSubject) -> CollectionAccessGrant {
        CollectionAccessGrant {
            collection_id: CollectionId::from_uuid(self.collection_id),
            subject: subject(self.subject_id),
            permissions: GrantPermissions {
                read_only: self.read_only,
                hide_passwords: self.hide_passwords,
                manage: self.manage,
            },
        }
    }
}

fn member_subject(value: Uuid) -> GrantSubject {
    GrantSubject::Member(OrganizationUserId::from_uuid(value))
}

fn group_subject(value: Uuid) -> GrantSubject {
    GrantSubject::Group(GroupId::from_uuid(value))
}

impl PostgresGrantRepository {
    pub(super) async fn list_member_grants_impl(
        &self,
        organization_user_id: OrganizationUserId,
        collection_ids: &[CollectionId],
    ) -> AppResult<Vec<CollectionAccessGrant>> {
        if collection_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, GrantRow>(
            r#"
            SELECT
                collection_id,
                organization_user_id AS subject_id,
                read_only,
                hide_passwords,
                manage
            FROM collection_users
            WHERE organization_user_id = $1
                AND collection_id = ANY($2)
            "#,
        )
        .bind(organization_user_id.as_uuid())
        .bind(collection_uuids(collection_ids))
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list member grants: {error}")))?;

        Ok(rows
            .into_iter()
            .map(|row| row.into_grant(member_subject))
            .collect())
    }

    pub(super) async fn list_group_grants_impl(
        &self,
        group_ids: &[GroupId],
        collection_ids: &[CollectionId],
    ) -> AppResult<Vec<CollectionAccessGrant>> {
        if group_ids.is_empty() || collection_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, GrantRow>(
            r#"
            SELECT
                collection_id,
                group_id AS subject_id,
                read_only,
                hide_passwords,
                manage
            FROM collection_groups
            WHERE group_id = ANY($1)
                AND collection_id = ANY($2)
            "#,
        )
        .bind(group_uuids(group_ids))
        .bind(collection_uuids(collection_ids))
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list group grants: {error}")))?;

        Ok(rows
            .into_iter()
            .map(|row| row.into_grant(group_subject))
            .collect())
    }

    pub(super) async fn list_collection_grants_impl(
        &self,
        collection_id: CollectionId,
    ) -> AppResult<Vec<CollectionAccessGrant>> {
        let member_rows = sqlx::query_as::<_, GrantRow>(
            r#"
            SELECT
                collection_id,
                organization_user_id AS subject_id,
                read_only,
                hide_passwords,
                manage
            FROM collection_users
            WHERE collection_id = $1
            "#,
        )
        .bind(collection_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to list collection member grants: {error}"))
        })?;

        let group_rows = sqlx::query_as::<_, GrantRow>(
            r#"
            SELECT
                collection_id,
                group_id AS subject_id,
                read_only,
                hide_passwords,
                manage
            FROM collection_groups
            WHERE collection_id = $1
            "#,
        )
        .bind(collection_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to list collection group grants: {error}"))
        })?;

        Ok(member_rows
            .into_iter()
            .map(|row| row.into_grant(member_subject))
            .chain(group_rows.into_iter().map(|row| row.into_grant(group_subject)))
            .collect())
    }

    pub(super) async fn replace_collection_access_impl(
        &self,
        collection_id: CollectionId,
        grants: Vec<CollectionAccessGrant>,
    ) -> AppResult<()> {
        let mut transaction = self.pool.begin().await.map_err(|error| {
            AppError::Internal(format!(
                "failed to start collection access transaction: {error}"
            ))
        })?;

        sqlx::query("DELETE FROM collection_users WHERE collection_id = $1")
            .bind(collection_id.as_uuid())
            .execute(&mut *transaction)
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to clear collection member grants: {error}"))
            })?;

        sqlx::query("DELETE FROM collection_groups WHERE collection_id = $1")
            .bind(collection_id.as_uuid())
            .execute(&mut *transaction)
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to clear collection group grants: {error}"))
            })?;

        let grant_count = grants.len();
        for grant in grants {
            let statement = match grant.subject {
                GrantSubject::Member(organization_user_id) => sqlx::query(
                    r#"
                    INSERT INTO collection_users (
                        collection_id,
                        organization_user_id,
                        read_only,
                        hide_passwords,
                        manage
                    )
                    VALUES ($1, $2, $3, $4, $5)
                    "#,
                )
                .bind(collection_id.as_uuid())
                .bind(organization_user_id.as_uuid()),
                GrantSubject::Group(group_id) => sqlx::query(
                    r#"
                    INSERT INTO collection_groups (
                        collection_id,
                        group_id,
                        read_only,
                        hide_passwords,
                        manage
                    )
                    VALUES ($1, $2, $3, $4, $5)
                    "#,
                )
                .bind(collection_id.as_uuid())
                .bind(group_id.as_uuid()),
            };

            statement
                .bind(grant.permissions.read_only)
                .bind(grant.permissions.hide_passwords)
                .bind(grant.permissions.manage)
                .execute(&mut *transaction)
                .await
                .map_err(|error| {
                    AppError::Internal(format!(
                        "failed to insert {} grant on collection '{}': {error}",
                        grant.subject.kind(),
                        collection_id
                    ))
                })?;
        }

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!(
                "failed to commit collection access transaction: {error}"
            ))
        })?;

        debug!(collection_id = %collection_id, grant_count, "replaced collection access");
        Ok(())
    }
}
