use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use coffer_application::OrganizationAbilityRepository;
use coffer_core::{AppError, AppResult, OrganizationId};
use coffer_domain::OrganizationAbility;

/// PostgreSQL-backed organization ability lookups.
#[derive(Clone)]
pub struct PostgresOrganizationAbilityRepository {
    pool: PgPool,
}

impl PostgresOrganizationAbilityRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct AbilityRow {
    id: Uuid,
    enabled: bool,
    flexible_collections: bool,
    allow_admin_access_to_all_collection_items: bool,
    limit_collection_creation_deletion: bool,
}

impl From<AbilityRow> for OrganizationAbility {
    fn from(row: AbilityRow) -> Self {
        Self {
            organization_id: OrganizationId::from_uuid(row.id),
            enabled: row.enabled,
            flexible_collections: row.flexible_collections,
            allow_admin_access_to_all_collection_items: row
                .allow_admin_access_to_all_collection_items,
            limit_collection_creation_deletion: row.limit_collection_creation_deletion,
        }
    }
}

#[async_trait]
impl OrganizationAbilityRepository for PostgresOrganizationAbilityRepository {
    async fn find_ability(
        &self,
        organization_id: OrganizationId,
    ) -> AppResult<Option<OrganizationAbility>> {
        let row = sqlx::query_as::<_, AbilityRow>(
            r#"
            SELECT
                id,
                enabled,
                flexible_collections,
                allow_admin_access_to_all_collection_items,
                limit_collection_creation_deletion
            FROM organizations
            WHERE id = $1
            "#,
        )
        .bind(organization_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to load organization ability: {error}"))
        })?;

        Ok(row.map(OrganizationAbility::from))
    }
}
