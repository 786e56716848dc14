//! Operations guarded by decision points and their outcomes.

use serde::{Deserialize, Serialize};

use crate::PermissionLevel;

/// Operation on one or more collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionOperation {
    /// Create a collection.
    Create,
    /// Read collection metadata.
    Read,
    /// Read the collection access list.
    ReadAccess,
    /// Read collections together with their access lists.
    ReadWithAccess,
    /// Update collection items.
    Update,
    /// Replace collection access grants.
    ModifyAccess,
    /// Change the grant of one member.
    ModifyUserAccess,
    /// Change the grant of one group.
    ModifyGroupAccess,
    /// Import items into collections.
    ImportCiphers,
    /// Delete a collection.
    Delete,
}

impl CollectionOperation {
    /// Returns a stable label for logging and auditing.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "collection.create",
            Self::Read => "collection.read",
            Self::ReadAccess => "collection.read_access",
            Self::ReadWithAccess => "collection.read_with_access",
            Self::Update => "collection.update",
            Self::ModifyAccess => "collection.modify_access",
            Self::ModifyUserAccess => "collection.modify_user_access",
            Self::ModifyGroupAccess => "collection.modify_group_access",
            Self::ImportCiphers => "collection.import_ciphers",
            Self::Delete => "collection.delete",
        }
    }

    /// Returns the resolved level required when no bypass applies.
    ///
    /// `Create` has no target to resolve against.
    #[must_use]
    pub fn required_level(&self) -> Option<PermissionLevel> {
        match self {
            Self::Create => None,
            Self::Read | Self::ReadAccess => Some(PermissionLevel::ReadOnly),
            Self::ReadWithAccess
            | Self::Update
            | Self::ModifyAccess
            | Self::ModifyUserAccess
            | Self::ModifyGroupAccess
            | Self::ImportCiphers
            | Self::Delete => Some(PermissionLevel::Manage),
        }
    }
}

/// Organization-wide operation on groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupOperation {
    /// List every group of the organization.
    ReadAll,
}

/// Organization-wide operation on memberships.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrganizationUserOperation {
    /// List every member of the organization.
    ReadAll,
}

/// Operation on one or more vault items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CipherOperation {
    /// View an item.
    Read,
    /// Edit an item.
    Edit,
    /// Delete or restore an item.
    Delete,
    /// Move an item between collections.
    ModifyCollections,
    /// List every item of the organization.
    ReadAll,
}

impl CipherOperation {
    /// Returns a stable label for logging and auditing.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Read => "cipher.read",
            Self::Edit => "cipher.edit",
            Self::Delete => "cipher.delete",
            Self::ModifyCollections => "cipher.modify_collections",
            Self::ReadAll => "cipher.read_all",
        }
    }

    /// Returns the resolved level required per item.
    ///
    /// `ReadAll` is decided by role alone.
    #[must_use]
    pub fn required_level(&self) -> Option<PermissionLevel> {
        match self {
            Self::Read => Some(PermissionLevel::ReadOnly),
            Self::Edit | Self::Delete | Self::ModifyCollections => {
                Some(PermissionLevel::ReadWrite)
            }
            Self::ReadAll => None,
        }
    }

    /// Returns whether secret values must be visible.
    #[must_use]
    pub fn requires_visible_passwords(&self) -> bool {
        matches!(self, Self::ModifyCollections)
    }
}

/// Outcome of a decision point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessDecision {
    /// The operation may proceed.
    Allow,
    /// The actor lacks sufficient access.
    Deny,
    /// Nothing was presented to authorize.
    Indeterminate,
}

impl AccessDecision {
    /// Maps a boolean check to Allow or Deny.
    #[must_use]
    pub fn from_allowed(allowed: bool) -> Self {
        if allowed { Self::Allow } else { Self::Deny }
    }

    /// Returns whether the decision is Allow.
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }

    /// Returns a stable label for logging.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Allow => "allow",
            Self::Deny => "deny",
            Self::Indeterminate => "indeterminate",
        }
    }
}
