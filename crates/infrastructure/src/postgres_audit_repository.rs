use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;

use coffer_application::{AuditEvent, AuditRepository};
use coffer_core::{AppError, AppResult};

/// Append-only audit trail stored in `audit_log_entries`.
#[derive(Clone)]
pub struct PostgresAuditRepository {
    pool: PgPool,
}

impl PostgresAuditRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuditRepository for PostgresAuditRepository {
    async fn append_event(&self, event: AuditEvent) -> AppResult<()> {
        let action = event.action.as_str();
        let entry_id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO audit_log_entries (
                organization_id, subject, action, resource_type, resource_id, detail
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(event.organization_id.as_uuid())
        .bind(&event.subject)
        .bind(action)
        .bind(&event.resource_type)
        .bind(&event.resource_id)
        .bind(event.detail.as_deref())
        .fetch_one(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to record {action} for {} {}: {error}",
                event.resource_type, event.resource_id
            ))
        })?;

        debug!(
            entry_id,
            organization_id = %event.organization_id,
            action,
            resource_id = %event.resource_id,
            "audit entry recorded"
        );
        Ok(())
    }
}
