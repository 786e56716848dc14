//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod in_memory_grant_repository;
mod in_memory_organization_ability_cache;
mod postgres_account_revision_repository;
mod postgres_audit_repository;
mod postgres_grant_repository;
mod postgres_organization_ability_repository;
#[cfg(test)]
mod postgres_test_support;
mod redis_organization_ability_cache;
mod static_feature_flag_source;

pub use in_memory_grant_repository::InMemoryGrantRepository;
pub use in_memory_organization_ability_cache::InMemoryOrganizationAbilityCache;
pub use postgres_account_revision_repository::PostgresAccountRevisionRepository;
pub use postgres_audit_repository::PostgresAuditRepository;
pub use postgres_grant_repository::PostgresGrantRepository;
pub use postgres_organization_ability_repository::PostgresOrganizationAbilityRepository;
pub use redis_organization_ability_cache::RedisOrganizationAbilityCache;
pub use static_feature_flag_source::StaticFeatureFlagSource;
