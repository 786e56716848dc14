//! Application services and ports.

#![forbid(unsafe_code)]

mod access_ports;
mod access_resolver;
mod access_service;
mod actor_context_service;
mod authorization_service;
mod collection_access_service;
mod mode_selector;

#[cfg(test)]
mod test_fixtures;

pub use access_ports::{
    AccountRevisionRepository, ActorDirectory, AuditEvent, AuditRepository,
    CollectionAccessWriter, FeatureFlagSource, GrantRepository, OrganizationAbilityCache,
    OrganizationAbilityRepository,
};
pub use access_resolver::{
    AccessResolver, FlexibleResolver, GrantSnapshot, LegacyResolver, resolver_for,
};
pub use access_service::{AccessService, ResolvedCollectionAccess};
pub use actor_context_service::ActorContextService;
pub use authorization_service::AuthorizationService;
pub use collection_access_service::CollectionAccessService;
pub use mode_selector::{ModeSelector, OrganizationAbilityProvider, OrganizationPolicy};
