use std::sync::Arc;

use coffer_core::{ActorIdentity, AppResult};
use coffer_domain::ActorContext;
use tracing::debug;

use crate::ActorDirectory;

/// Builds request-scoped actor contexts from the membership directory.
#[derive(Clone)]
pub struct ActorContextService {
    directory: Arc<dyn ActorDirectory>,
}

impl ActorContextService {
    /// Creates an actor context service.
    #[must_use]
    pub fn new(directory: Arc<dyn ActorDirectory>) -> Self {
        Self { directory }
    }

    /// Loads confirmed memberships and provider links for the identity.
    ///
    /// Identities without a user id get an empty context.
    pub async fn load(&self, identity: ActorIdentity) -> AppResult<ActorContext> {
        let Some(user_id) = identity.user_id() else {
            return Ok(ActorContext::new(identity));
        };

        let memberships = self.directory.list_memberships_for_user(user_id).await?;
        let provider_organizations = self.directory.list_provider_organizations(user_id).await?;

        let actor = provider_organizations.into_iter().fold(
            ActorContext::from_memberships(identity, &memberships),
            ActorContext::with_provider_organization,
        );

        debug!(
            user_id = %user_id,
            organizations = actor.organizations().count(),
            "loaded actor context"
        );

        Ok(actor)
    }
}
