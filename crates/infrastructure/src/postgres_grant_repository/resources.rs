use coffer_core::AppError;
use coffer_domain::CipherOwner;
use sqlx::FromRow;

use super::*;

#[derive(Debug, FromRow)]
struct CollectionRow {
    id: Uuid,
    organization_id: Uuid,
}

impl From<CollectionRow> for Collection {
    fn from(row: CollectionRow) -> Self {
        Self {
            id: CollectionId::from_uuid(row.id),
            organization_id: OrganizationId::from_uuid(row.organization_id),
        }
    }
}

#[derive(Debug, FromRow)]
struct CipherRow {
    id: Uuid,
    user_id: Option<Uuid>,
    organization_id: Option<Uuid>,
    collection_ids: Vec<Uuid>,
}

impl CipherRow {
    fn into_cipher(self) -> AppResult<Cipher> {
        let owner = match (self.organization_id, self.user_id) {
            (Some(organization_id), _) => {
                CipherOwner::Organization(OrganizationId::from_uuid(organization_id))
            }
            (None, Some(user_id)) => CipherOwner::User(UserId::from_uuid(user_id)),
            (None, None) => {
                return Err(AppError::Internal(format!(
                    "cipher '{}' has neither a user nor an organization owner",
                    self.id
                )));
            }
        };

        Ok(Cipher {
            id: CipherId::from_uuid(self.id),
            owner,
            collection_ids: self
                .collection_ids
                .into_iter()
                .map(CollectionId::from_uuid)
                .collect(),
        })
    }
}

impl PostgresGrantRepository {
    pub(super) async fn list_collections_impl(
        &self,
        organization_id: OrganizationId,
    ) -> AppResult<Vec<Collection>> {
        let rows = sqlx::query_as::<_, CollectionRow>(
            r#"
            SELECT id, organization_id
            FROM collections
            WHERE organization_id = $1
            ORDER BY id
            "#,
        )
        .bind(organization_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list collections: {error}")))?;

        Ok(rows.into_iter().map(Collection::from).collect())
    }

    pub(super) async fn find_collections_impl(
        &self,
        collection_ids: &[CollectionId],
    ) -> AppResult<Vec<Collection>> {
        if collection_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, CollectionRow>(
            r#"
            SELECT id, organization_id
            FROM collections
            WHERE id = ANY($1)
            "#,
        )
        .bind(collection_uuids(collection_ids))
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find collections: {error}")))?;

        Ok(rows.into_iter().map(Collection::from).collect())
    }

    pub(super) async fn find_ciphers_impl(
        &self,
        cipher_ids: &[CipherId],
    ) -> AppResult<Vec<Cipher>> {
        if cipher_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, CipherRow>(
            r#"
            SELECT
                ciphers.id,
                ciphers.user_id,
                ciphers.organization_id,
                COALESCE(
                    array_agg(collection_ciphers.collection_id)
                        FILTER (WHERE collection_ciphers.collection_id IS NOT NULL),
                    '{}'
                ) AS collection_ids
            FROM ciphers
            LEFT JOIN collection_ciphers ON collection_ciphers.cipher_id = ciphers.id
            WHERE ciphers.id = ANY($1)
            GROUP BY ciphers.id, ciphers.user_id, ciphers.organization_id
            "#,
        )
        .bind(cipher_ids.iter().map(CipherId::as_uuid).collect::<Vec<_>>())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find ciphers: {error}")))?;

        rows.into_iter().map(CipherRow::into_cipher).collect()
    }
}
