use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use tracing::debug;

use coffer_application::AccountRevisionRepository;
use coffer_core::{AppError, AppResult, UserId};

/// Stamps `users.account_revision_date` so clients resync after access changes.
#[derive(Clone)]
pub struct PostgresAccountRevisionRepository {
    pool: PgPool,
}

impl PostgresAccountRevisionRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccountRevisionRepository for PostgresAccountRevisionRepository {
    async fn bump_account_revisions(&self, user_ids: &[UserId]) -> AppResult<()> {
        if user_ids.is_empty() {
            return Ok(());
        }

        let result = sqlx::query(
            r#"
            UPDATE users
            SET account_revision_date = $2
            WHERE id = ANY($1)
            "#,
        )
        .bind(user_ids.iter().map(UserId::as_uuid).collect::<Vec<_>>())
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to bump account revisions for {} users: {error}",
                user_ids.len()
            ))
        })?;

        debug!(
            requested = user_ids.len(),
            updated = result.rows_affected(),
            "account revisions bumped"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Utc};
    use coffer_application::AccountRevisionRepository;
    use coffer_core::{AppResult, UserId};
    use sqlx::PgPool;

    use super::PostgresAccountRevisionRepository;
    use crate::postgres_test_support::{execute, test_pool};

    async fn stale_user(pool: &PgPool) -> UserId {
        let user_id = UserId::new();
        execute(
            pool,
            r#"
            INSERT INTO users (id, email, account_revision_date)
            VALUES ($1, $1::uuid::text || '@example.com', now() - interval '1 day')
            "#,
            &[user_id.as_uuid()],
        )
        .await;
        user_id
    }

    async fn revision_of(pool: &PgPool, user_id: UserId) -> Option<DateTime<Utc>> {
        sqlx::query_scalar("SELECT account_revision_date FROM users WHERE id = $1")
            .bind(user_id.as_uuid())
            .fetch_optional(pool)
            .await
            .ok()
            .flatten()
    }

    #[tokio::test]
    async fn only_listed_users_move_forward() -> AppResult<()> {
        let Some(pool) = test_pool().await else {
            return Ok(());
        };
        let first = stale_user(&pool).await;
        let second = stale_user(&pool).await;
        let untouched = stale_user(&pool).await;
        let before = revision_of(&pool, untouched).await;
        let started = Utc::now() - chrono::Duration::minutes(1);
        let repository = PostgresAccountRevisionRepository::new(pool.clone());

        repository.bump_account_revisions(&[first, second]).await?;

        for user_id in [first, second] {
            let stamped = revision_of(&pool, user_id).await;
            assert!(stamped.is_some_and(|stamp| stamp >= started));
        }
        let after = revision_of(&pool, untouched).await;
        assert!(after.is_some_and(|stamp| stamp < started));
        assert_eq!(after, before);
        Ok(())
    }

    #[tokio::test]
    async fn empty_list_touches_nothing() -> AppResult<()> {
        let Some(pool) = test_pool().await else {
            return Ok(());
        };
        let user_id = stale_user(&pool).await;
        let before = revision_of(&pool, user_id).await;
        let repository = PostgresAccountRevisionRepository::new(pool.clone());

        repository.bump_account_revisions(&[]).await?;

        assert_eq!(revision_of(&pool, user_id).await, before);
        Ok(())
    }
}
