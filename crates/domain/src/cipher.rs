use coffer_core::{CipherId, CollectionId, OrganizationId, UserId};
use serde::{Deserialize, Serialize};

/// Owner of a vault item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum CipherOwner {
    /// Personal item of one user.
    User(UserId),
    /// Shared item of an organization.
    Organization(OrganizationId),
}

/// Vault item together with its collection links.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cipher {
    /// Cipher identifier.
    pub id: CipherId,
    /// Owning user or organization.
    pub owner: CipherOwner,
    /// Collections the cipher is linked to.
    pub collection_ids: Vec<CollectionId>,
}

impl Cipher {
    /// Returns the owning organization, if any.
    #[must_use]
    pub fn organization_id(&self) -> Option<OrganizationId> {
        match self.owner {
            CipherOwner::Organization(organization_id) => Some(organization_id),
            CipherOwner::User(_) => None,
        }
    }

    /// Returns whether the cipher is organization-owned with no collection.
    #[must_use]
    pub fn is_unassigned(&self) -> bool {
        self.organization_id().is_some() && self.collection_ids.is_empty()
    }
}
