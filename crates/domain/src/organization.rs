use std::fmt::{Display, Formatter};
use std::str::FromStr;

use coffer_core::{AppError, OrganizationId};
use serde::{Deserialize, Serialize};

/// Per-organization flags consumed by authorization checks.
///
/// Fetched once per request and passed through explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizationAbility {
    /// Organization the flags belong to.
    pub organization_id: OrganizationId,
    /// Organization is enabled.
    ///
    /// Carried for callers; access decisions do not consult it.
    pub enabled: bool,
    /// Organization data has been migrated to Flexible Collections.
    pub flexible_collections: bool,
    /// Owners and Admins may reach every collection item.
    pub allow_admin_access_to_all_collection_items: bool,
    /// Collection creation and deletion is limited to privileged members.
    pub limit_collection_creation_deletion: bool,
}

impl OrganizationAbility {
    /// Ability of an organization that has not started the migration.
    #[must_use]
    pub fn legacy(organization_id: OrganizationId) -> Self {
        Self {
            organization_id,
            enabled: true,
            flexible_collections: false,
            allow_admin_access_to_all_collection_items: true,
            limit_collection_creation_deletion: false,
        }
    }
}

/// Authorization model applied to one organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthorizationMode {
    /// Access-all flags on memberships and groups are honored.
    Legacy,
    /// Explicit grants only; legacy role semantics.
    FlexibleV0,
    /// Explicit grants only; admin access gated by the organization setting.
    FlexibleV1,
}

impl AuthorizationMode {
    /// Returns whether access-all flags are honored.
    #[must_use]
    pub fn honors_access_all(&self) -> bool {
        matches!(self, Self::Legacy)
    }

    /// Returns a stable label for this mode.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Legacy => "legacy",
            Self::FlexibleV0 => "flexible_v0",
            Self::FlexibleV1 => "flexible_v1",
        }
    }
}

impl Display for AuthorizationMode {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Process-wide feature flags known to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FeatureFlag {
    /// Global rollout switch for Flexible Collections.
    FlexibleCollections,
}

impl FeatureFlag {
    /// Returns the configuration key for this flag.
    #[must_use]
    pub fn key(&self) -> &'static str {
        match self {
            Self::FlexibleCollections => "flexible-collections",
        }
    }
}

impl FromStr for FeatureFlag {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "flexible-collections" => Ok(Self::FlexibleCollections),
            _ => Err(AppError::Validation(format!(
                "unknown feature flag '{value}'"
            ))),
        }
    }
}
