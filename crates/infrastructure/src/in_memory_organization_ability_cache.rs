use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use coffer_application::OrganizationAbilityCache;
use coffer_core::{AppResult, OrganizationId};
use coffer_domain::OrganizationAbility;
use tokio::sync::RwLock;

#[derive(Debug, Clone, Copy)]
struct AbilityCacheEntry {
    ability: OrganizationAbility,
    expires_at: Instant,
}

/// In-memory cache adapter for organization abilities.
#[derive(Default)]
pub struct InMemoryOrganizationAbilityCache {
    entries: RwLock<HashMap<OrganizationId, AbilityCacheEntry>>,
}

impl InMemoryOrganizationAbilityCache {
    /// Creates an empty in-memory ability cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrganizationAbilityCache for InMemoryOrganizationAbilityCache {
    async fn get_ability(
        &self,
        organization_id: OrganizationId,
    ) -> AppResult<Option<OrganizationAbility>> {
        {
            let entries = self.entries.read().await;
            match entries.get(&organization_id) {
                Some(entry) if entry.expires_at > Instant::now() => {
                    return Ok(Some(entry.ability));
                }
                Some(_) => {}
                None => return Ok(None),
            }
        }

        let mut entries = self.entries.write().await;
        if entries
            .get(&organization_id)
            .is_some_and(|entry| entry.expires_at <= Instant::now())
        {
            entries.remove(&organization_id);
        }

        Ok(None)
    }

    async fn set_ability(&self, ability: OrganizationAbility, ttl_seconds: u32) -> AppResult<()> {
        if ttl_seconds == 0 {
            return Ok(());
        }

        let now = Instant::now();
        let expires_at = now
            .checked_add(Duration::from_secs(u64::from(ttl_seconds)))
            .unwrap_or(now);

        self.entries.write().await.insert(
            ability.organization_id,
            AbilityCacheEntry {
                ability,
                expires_at,
            },
        );

        Ok(())
    }
}
