use std::collections::HashSet;
use std::str::FromStr;

use coffer_application::FeatureFlagSource;
use coffer_core::AppResult;
use coffer_domain::FeatureFlag;

/// Feature flags fixed at process start.
#[derive(Debug, Clone, Default)]
pub struct StaticFeatureFlagSource {
    enabled: HashSet<FeatureFlag>,
}

impl StaticFeatureFlagSource {
    /// Creates a source with the listed flags switched on.
    #[must_use]
    pub fn new(flags: impl IntoIterator<Item = FeatureFlag>) -> Self {
        Self {
            enabled: flags.into_iter().collect(),
        }
    }

    /// Parses a comma-separated list of flag keys.
    ///
    /// Blank entries are ignored; unknown keys are rejected.
    pub fn parse(value: &str) -> AppResult<Self> {
        let flags = value
            .split(',')
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .map(FeatureFlag::from_str)
            .collect::<AppResult<Vec<_>>>()?;

        Ok(Self::new(flags))
    }
}

impl FeatureFlagSource for StaticFeatureFlagSource {
    fn is_enabled(&self, flag: FeatureFlag) -> bool {
        self.enabled.contains(&flag)
    }
}
