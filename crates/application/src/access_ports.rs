mod audit;
mod grant_store;
mod organization;
mod revision;

pub use audit::{AuditEvent, AuditRepository};
pub use grant_store::{ActorDirectory, CollectionAccessWriter, GrantRepository};
pub use organization::{FeatureFlagSource, OrganizationAbilityCache, OrganizationAbilityRepository};
pub use revision::AccountRevisionRepository;
