//! Shared database setup for the PostgreSQL adapter tests.

use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

pub(crate) async fn test_pool() -> Option<PgPool> {
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        return None;
    };

    let pool = match PgPoolOptions::new()
        .max_connections(2)
        .connect(database_url.as_str())
        .await
    {
        Ok(pool) => pool,
        Err(error) => panic!("failed to connect to DATABASE_URL in test: {error}"),
    };

    if let Err(error) = MIGRATOR.run(&pool).await {
        panic!("failed to run migrations for postgres adapter tests: {error}");
    }

    Some(pool)
}

pub(crate) async fn execute(pool: &PgPool, statement: &str, ids: &[uuid::Uuid]) {
    let mut query = sqlx::query(statement);
    for id in ids {
        query = query.bind(*id);
    }
    let result = query.execute(pool).await;
    assert!(result.is_ok(), "seed statement failed: {result:?}");
}
