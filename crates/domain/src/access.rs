//! Permission levels and the rules for merging overlapping grants.
//!
//! A member can reach one collection through several paths: a direct grant
//! and any number of group grants. Each path yields a [`CollectionAccess`];
//! paths are combined with [`CollectionAccess::most_permissive`] while bulk
//! checks over many collections combine with
//! [`CollectionAccess::least_permissive`].

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Graded permission a member holds on a collection or cipher.
///
/// Variants are ordered from weakest to strongest.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum PermissionLevel {
    /// No access at all.
    #[default]
    None,
    /// Items may be viewed but not changed.
    ReadOnly,
    /// Items may be viewed and edited.
    ReadWrite,
    /// Items may be edited and the collection's access list administered.
    Manage,
}

impl PermissionLevel {
    /// Returns a stable storage value for this level.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::ReadOnly => "read_only",
            Self::ReadWrite => "read_write",
            Self::Manage => "manage",
        }
    }

    /// Returns whether this level meets the required level.
    #[must_use]
    pub fn satisfies(self, required: Self) -> bool {
        self >= required
    }
}

impl Display for PermissionLevel {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Permission payload stored on direct and group collection grants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GrantPermissions {
    /// Grantee may not edit items.
    pub read_only: bool,
    /// Grantee may not view secret values.
    pub hide_passwords: bool,
    /// Grantee has full control; overrides the other two flags.
    pub manage: bool,
}

impl GrantPermissions {
    /// View-only grant.
    #[must_use]
    pub fn read_only() -> Self {
        Self {
            read_only: true,
            hide_passwords: false,
            manage: false,
        }
    }

    /// Edit grant without access administration.
    #[must_use]
    pub fn read_write() -> Self {
        Self::default()
    }

    /// Full control grant.
    #[must_use]
    pub fn manage() -> Self {
        Self {
            read_only: false,
            hide_passwords: false,
            manage: true,
        }
    }

    /// Returns a copy with secret values hidden.
    #[must_use]
    pub fn hiding_passwords(self) -> Self {
        Self {
            hide_passwords: true,
            ..self
        }
    }

    /// Returns the level this single grant confers.
    #[must_use]
    pub fn level(&self) -> PermissionLevel {
        if self.manage {
            PermissionLevel::Manage
        } else if !self.read_only {
            PermissionLevel::ReadWrite
        } else {
            PermissionLevel::ReadOnly
        }
    }

    /// Returns the access this single grant confers.
    #[must_use]
    pub fn access(&self) -> CollectionAccess {
        CollectionAccess::new(self.level(), self.hide_passwords)
    }
}

/// Effective access on one resource: a level plus the hide-passwords modifier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CollectionAccess {
    level: PermissionLevel,
    hide_passwords: bool,
}

impl CollectionAccess {
    /// Access that permits nothing.
    pub const NONE: Self = Self {
        level: PermissionLevel::None,
        hide_passwords: false,
    };

    /// Unrestricted access.
    pub const FULL: Self = Self {
        level: PermissionLevel::Manage,
        hide_passwords: false,
    };

    /// Creates an access value.
    ///
    /// The modifier is dropped for `None` and `Manage`, which it cannot
    /// restrict.
    #[must_use]
    pub fn new(level: PermissionLevel, hide_passwords: bool) -> Self {
        let hide_passwords = hide_passwords
            && matches!(level, PermissionLevel::ReadOnly | PermissionLevel::ReadWrite);
        Self {
            level,
            hide_passwords,
        }
    }

    /// Merges every grant reaching one collection.
    ///
    /// The highest level wins. Passwords stay hidden only when every grant at
    /// the winning level hides them.
    #[must_use]
    pub fn from_grants<'a, I>(grants: I) -> Self
    where
        I: IntoIterator<Item = &'a GrantPermissions>,
    {
        grants
            .into_iter()
            .map(GrantPermissions::access)
            .fold(Self::NONE, Self::most_permissive)
    }

    /// Combines two independent paths to the same resource.
    #[must_use]
    pub fn most_permissive(self, other: Self) -> Self {
        match self.level.cmp(&other.level) {
            std::cmp::Ordering::Greater => self,
            std::cmp::Ordering::Less => other,
            std::cmp::Ordering::Equal => {
                Self::new(self.level, self.hide_passwords && other.hide_passwords)
            }
        }
    }

    /// Combines access on two resources that must both be satisfied.
    #[must_use]
    pub fn least_permissive(self, other: Self) -> Self {
        match self.level.cmp(&other.level) {
            std::cmp::Ordering::Less => self,
            std::cmp::Ordering::Greater => other,
            std::cmp::Ordering::Equal => {
                Self::new(self.level, self.hide_passwords || other.hide_passwords)
            }
        }
    }

    /// Returns the graded level.
    #[must_use]
    pub fn level(&self) -> PermissionLevel {
        self.level
    }

    /// Returns whether secret values are hidden.
    #[must_use]
    pub fn hide_passwords(&self) -> bool {
        self.hide_passwords
    }

    /// Returns whether items may be viewed.
    #[must_use]
    pub fn can_read(&self) -> bool {
        self.level.satisfies(PermissionLevel::ReadOnly)
    }

    /// Returns whether items may be edited.
    #[must_use]
    pub fn can_edit(&self) -> bool {
        self.level.satisfies(PermissionLevel::ReadWrite)
    }

    /// Returns whether the access list may be administered.
    #[must_use]
    pub fn can_manage(&self) -> bool {
        self.level == PermissionLevel::Manage
    }

    /// Returns whether secret values may be viewed.
    #[must_use]
    pub fn can_view_passwords(&self) -> bool {
        self.can_read() && !self.hide_passwords
    }
}
