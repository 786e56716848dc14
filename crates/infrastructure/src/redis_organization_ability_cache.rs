//! Redis-backed organization ability cache.

use async_trait::async_trait;
use coffer_application::OrganizationAbilityCache;
use coffer_core::{AppError, AppResult, OrganizationId};
use coffer_domain::OrganizationAbility;
use redis::AsyncCommands;

/// Redis implementation of the organization ability cache port.
///
/// Entries are JSON-encoded abilities keyed by organization id.
#[derive(Clone)]
pub struct RedisOrganizationAbilityCache {
    client: redis::Client,
    key_prefix: String,
}

impl RedisOrganizationAbilityCache {
    /// Creates a cache adapter with a configured Redis client and key prefix.
    #[must_use]
    pub fn new(client: redis::Client, key_prefix: impl Into<String>) -> Self {
        Self {
            client,
            key_prefix: key_prefix.into(),
        }
    }

    fn key_for(&self, organization_id: OrganizationId) -> String {
        format!("{}:organization={organization_id}", self.key_prefix)
    }

    fn encode_ability(ability: &OrganizationAbility) -> AppResult<String> {
        serde_json::to_string(ability).map_err(|error| {
            AppError::Internal(format!(
                "failed to encode organization ability cache value: {error}"
            ))
        })
    }

    fn decode_ability(value: &str) -> AppResult<OrganizationAbility> {
        serde_json::from_str(value).map_err(|error| {
            AppError::Internal(format!(
                "invalid organization ability cache value '{value}': {error}"
            ))
        })
    }
}

#[async_trait]
impl OrganizationAbilityCache for RedisOrganizationAbilityCache {
    async fn get_ability(
        &self,
        organization_id: OrganizationId,
    ) -> AppResult<Option<OrganizationAbility>> {
        let key = self.key_for(organization_id);
        let mut connection = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(|error| AppError::Internal(format!("failed to connect to redis: {error}")))?;

        let encoded: Option<String> = connection.get(key).await.map_err(|error| {
            AppError::Internal(format!(
                "failed to read organization ability cache entry: {error}"
            ))
        })?;

        encoded.as_deref().map(Self::decode_ability).transpose()
    }

    async fn set_ability(&self, ability: OrganizationAbility, ttl_seconds: u32) -> AppResult<()> {
        if ttl_seconds == 0 {
            return Ok(());
        }

        let key = self.key_for(ability.organization_id);
        let value = Self::encode_ability(&ability)?;
        let mut connection = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(|error| AppError::Internal(format!("failed to connect to redis: {error}")))?;

        connection
            .set_ex(key, value, u64::from(ttl_seconds))
            .await
            .map_err(|error| {
                AppError::Internal(format!(
                    "failed to write organization ability cache entry: {error}"
                ))
            })
    }
}
