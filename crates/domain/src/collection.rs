use coffer_core::{CollectionId, GroupId, OrganizationId, OrganizationUserId};
use serde::{Deserialize, Serialize};

use crate::GrantPermissions;

/// Organization-scoped container of vault items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Collection {
    /// Collection identifier.
    pub id: CollectionId,
    /// Owning organization.
    pub organization_id: OrganizationId,
}

/// Grantee of a collection grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum GrantSubject {
    /// Direct grant to one membership.
    Member(OrganizationUserId),
    /// Grant to every member of a group.
    Group(GroupId),
}

impl GrantSubject {
    /// Returns a stable label for the subject kind.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Member(_) => "member",
            Self::Group(_) => "group",
        }
    }
}

/// Stored grant linking a subject to a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CollectionAccessGrant {
    /// Target collection.
    pub collection_id: CollectionId,
    /// Member or group receiving the grant.
    pub subject: GrantSubject,
    /// Permission payload.
    pub permissions: GrantPermissions,
}

/// One requested entry of a collection's access list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CollectionAccessSelection {
    /// Member or group receiving the grant.
    pub subject: GrantSubject,
    /// Permission payload.
    pub permissions: GrantPermissions,
}

impl CollectionAccessSelection {
    /// Binds the selection to a collection.
    #[must_use]
    pub fn into_grant(self, collection_id: CollectionId) -> CollectionAccessGrant {
        CollectionAccessGrant {
            collection_id,
            subject: self.subject,
            permissions: self.permissions,
        }
    }
}
