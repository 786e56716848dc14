//! Per-organization selection of the authorization model.
//!
//! Rollout is gated twice: the process-wide `flexible-collections` flag
//! switches grant resolution away from access-all semantics, and the
//! organization's own `flexible_collections` ability marks its data as
//! migrated, which also changes how Admins are treated.

use std::sync::Arc;

use coffer_core::{AppError, AppResult, OrganizationId};
use coffer_domain::{AuthorizationMode, FeatureFlag, OrganizationAbility};
use tracing::{debug, warn};

use crate::{FeatureFlagSource, OrganizationAbilityCache, OrganizationAbilityRepository};

/// Ability and mode resolved once per request for one organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrganizationPolicy {
    /// Organization ability flags.
    pub ability: OrganizationAbility,
    /// Authorization model in force.
    pub mode: AuthorizationMode,
}

impl OrganizationPolicy {
    /// Returns the organization identifier.
    #[must_use]
    pub fn organization_id(&self) -> OrganizationId {
        self.ability.organization_id
    }

    /// Returns whether Owners and Admins reach every collection without grants.
    #[must_use]
    pub fn admins_reach_all_collections(&self) -> bool {
        self.mode != AuthorizationMode::FlexibleV1
            || self.ability.allow_admin_access_to_all_collection_items
    }

    /// Returns whether collection creation and deletion is restricted.
    #[must_use]
    pub fn limits_collection_management(&self) -> bool {
        self.ability.limit_collection_creation_deletion
    }
}

/// Read-through lookup of organization ability flags.
#[derive(Clone)]
pub struct OrganizationAbilityProvider {
    repository: Arc<dyn OrganizationAbilityRepository>,
    cache: Option<Arc<dyn OrganizationAbilityCache>>,
    cache_ttl_seconds: u32,
}

impl OrganizationAbilityProvider {
    /// Creates a provider reading straight from the repository.
    #[must_use]
    pub fn new(repository: Arc<dyn OrganizationAbilityRepository>) -> Self {
        Self {
            repository,
            cache: None,
            cache_ttl_seconds: 0,
        }
    }

    /// Adds optional ability caching behavior.
    #[must_use]
    pub fn with_cache(
        mut self,
        cache: Arc<dyn OrganizationAbilityCache>,
        ttl_seconds: u32,
    ) -> Self {
        self.cache = Some(cache);
        self.cache_ttl_seconds = ttl_seconds;
        self
    }

    /// Returns the ability of one organization.
    ///
    /// Cache failures fall back to the repository.
    pub async fn ability(
        &self,
        organization_id: OrganizationId,
    ) -> AppResult<OrganizationAbility> {
        if self.cache_ttl_seconds > 0
            && let Some(cache) = &self.cache
        {
            match cache.get_ability(organization_id).await {
                Ok(Some(ability)) => return Ok(ability),
                Ok(None) => {}
                Err(error) => warn!(
                    organization_id = %organization_id,
                    error = %error,
                    "organization ability cache read failed"
                ),
            }
        }

        let ability = self
            .repository
            .find_ability(organization_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("organization '{organization_id}' does not exist"))
            })?;

        if self.cache_ttl_seconds > 0
            && let Some(cache) = &self.cache
            && let Err(error) = cache.set_ability(ability, self.cache_ttl_seconds).await
        {
            warn!(
                organization_id = %organization_id,
                error = %error,
                "organization ability cache write failed"
            );
        }

        Ok(ability)
    }
}

/// Chooses between Legacy and Flexible resolution for an organization.
#[derive(Clone)]
pub struct ModeSelector {
    abilities: OrganizationAbilityProvider,
    feature_flags: Arc<dyn FeatureFlagSource>,
}

impl ModeSelector {
    /// Creates a mode selector.
    #[must_use]
    pub fn new(
        abilities: OrganizationAbilityProvider,
        feature_flags: Arc<dyn FeatureFlagSource>,
    ) -> Self {
        Self {
            abilities,
            feature_flags,
        }
    }

    /// Returns the mode implied by an already fetched ability.
    #[must_use]
    pub fn mode_for(&self, ability: &OrganizationAbility) -> AuthorizationMode {
        if !self.feature_flags.is_enabled(FeatureFlag::FlexibleCollections) {
            return AuthorizationMode::Legacy;
        }

        if ability.flexible_collections {
            AuthorizationMode::FlexibleV1
        } else {
            AuthorizationMode::FlexibleV0
        }
    }

    /// Returns the mode in force for an organization.
    pub async fn resolve_mode(
        &self,
        organization_id: OrganizationId,
    ) -> AppResult<AuthorizationMode> {
        Ok(self.organization_policy(organization_id).await?.mode)
    }

    /// Fetches the ability once and pairs it with the mode it implies.
    pub async fn organization_policy(
        &self,
        organization_id: OrganizationId,
    ) -> AppResult<OrganizationPolicy> {
        let ability = self.abilities.ability(organization_id).await?;
        let mode = self.mode_for(&ability);

        debug!(organization_id = %organization_id, mode = %mode, "resolved authorization mode");

        Ok(OrganizationPolicy { ability, mode })
    }
}
