use async_trait::async_trait;
use coffer_core::{AppResult, UserId};

/// Port for the per-user account revision stamp clients resync against.
#[async_trait]
pub trait AccountRevisionRepository: Send + Sync {
    /// Bumps the revision stamp of every listed user.
    async fn bump_account_revisions(&self, user_ids: &[UserId]) -> AppResult<()>;
}
