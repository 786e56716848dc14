//! Coffer access report runtime.
//!
//! Prints the effective collection and cipher access of one user.

#![forbid(unsafe_code)]

mod config;
mod report;

use std::sync::Arc;

use coffer_application::{
    AccessService, ActorContextService, AuthorizationService, ModeSelector,
    OrganizationAbilityCache, OrganizationAbilityProvider,
};
use coffer_core::{ActorIdentity, AppError, AppResult, OrganizationId};
use coffer_infrastructure::{
    InMemoryOrganizationAbilityCache, PostgresGrantRepository,
    PostgresOrganizationAbilityRepository, RedisOrganizationAbilityCache,
    StaticFeatureFlagSource,
};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::info;

use crate::config::{AccessReportConfig, ReportCommand, init_tracing};
use crate::report::{build_report, log_report};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = AccessReportConfig::load()?;
    let pool = connect_pool(&config).await?;

    sqlx::migrate!("../../crates/infrastructure/migrations")
        .run(&pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to run migrations: {error}")))?;

    if config.command == ReportCommand::Migrate {
        info!("database migrations applied successfully");
        return Ok(());
    }

    let user_id = config
        .user_id
        .ok_or_else(|| AppError::Validation("REPORT_USER_ID is required".to_owned()))?;
    let feature_flags = StaticFeatureFlagSource::parse(config.feature_flags.as_str())?;
    let ability_cache = build_ability_cache(config.redis_url.as_deref())?;
    let abilities = OrganizationAbilityProvider::new(Arc::new(
        PostgresOrganizationAbilityRepository::new(pool.clone()),
    ))
    .with_cache(ability_cache, config.ability_cache_ttl_seconds);

    let grant_repository = Arc::new(PostgresGrantRepository::new(pool));
    let authorization_service = AuthorizationService::new(AccessService::new(
        grant_repository.clone(),
        ModeSelector::new(abilities, Arc::new(feature_flags)),
    ));
    let actor = ActorContextService::new(grant_repository)
        .load(ActorIdentity::new(user_id, None))
        .await?;

    let organization_ids: Vec<OrganizationId> = match config.organization_id {
        Some(organization_id) => vec![organization_id],
        None => actor
            .organizations()
            .map(|organization| organization.organization_id)
            .collect(),
    };

    info!(
        user_id = %user_id,
        organizations = organization_ids.len(),
        ciphers = config.cipher_ids.len(),
        "building access report"
    );

    let report = build_report(
        &authorization_service,
        &actor,
        &organization_ids,
        &config.cipher_ids,
    )
    .await?;
    log_report(&report);

    Ok(())
}

async fn connect_pool(config: &AccessReportConfig) -> AppResult<PgPool> {
    PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(config.database_url.as_str())
        .await
        .map_err(|error| AppError::Internal(format!("failed to connect to database: {error}")))
}

fn build_ability_cache(redis_url: Option<&str>) -> AppResult<Arc<dyn OrganizationAbilityCache>> {
    let Some(redis_url) = redis_url else {
        return Ok(Arc::new(InMemoryOrganizationAbilityCache::new()));
    };

    let client = redis::Client::open(redis_url)
        .map_err(|error| AppError::Validation(format!("invalid REDIS_URL: {error}")))?;
    info!("organization ability cache backed by redis");

    Ok(Arc::new(RedisOrganizationAbilityCache::new(
        client,
        "coffer:organization_ability",
    )))
}
