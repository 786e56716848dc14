use async_trait::async_trait;
use coffer_core::{AppResult, OrganizationId};
use coffer_domain::{FeatureFlag, OrganizationAbility};

/// Repository port for organization ability flags.
#[async_trait]
pub trait OrganizationAbilityRepository: Send + Sync {
    /// Finds the ability of one organization.
    async fn find_ability(
        &self,
        organization_id: OrganizationId,
    ) -> AppResult<Option<OrganizationAbility>>;
}

/// Cache port for organization ability flags.
#[async_trait]
pub trait OrganizationAbilityCache: Send + Sync {
    /// Returns the cached ability, if present and fresh.
    async fn get_ability(
        &self,
        organization_id: OrganizationId,
    ) -> AppResult<Option<OrganizationAbility>>;

    /// Stores an ability with ttl.
    async fn set_ability(&self, ability: OrganizationAbility, ttl_seconds: u32) -> AppResult<()>;
}

/// Source of process-wide feature flags.
pub trait FeatureFlagSource: Send + Sync {
    /// Returns whether the flag is switched on.
    fn is_enabled(&self, flag: FeatureFlag) -> bool;
}
