//! Organization membership, roles and custom permissions.

use std::str::FromStr;

use coffer_core::{AppError, GroupId, OrganizationId, OrganizationUserId, UserId};
use serde::{Deserialize, Serialize};

/// Role a member holds inside an organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrganizationUserType {
    /// Organization owner.
    Owner,
    /// Organization administrator.
    Admin,
    /// Ordinary member.
    User,
    /// Member whose rights come from custom permissions.
    Custom,
}

impl OrganizationUserType {
    /// Returns a stable storage value for this role.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Owner => "owner",
            Self::Admin => "admin",
            Self::User => "user",
            Self::Custom => "custom",
        }
    }

    /// Decodes the numeric role code used by the relational store.
    pub fn from_code(code: i16) -> Result<Self, AppError> {
        match code {
            0 => Ok(Self::Owner),
            1 => Ok(Self::Admin),
            2 => Ok(Self::User),
            4 => Ok(Self::Custom),
            _ => Err(AppError::Validation(format!(
                "unknown organization user type code '{code}'"
            ))),
        }
    }

    /// Returns whether the role is Owner or Admin.
    #[must_use]
    pub fn is_owner_or_admin(&self) -> bool {
        matches!(self, Self::Owner | Self::Admin)
    }
}

/// Lifecycle state of a membership.
///
/// Variants are ordered so that `status >= Confirmed` selects members that
/// participate in access checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrganizationUserStatus {
    /// Access revoked by an administrator.
    Revoked,
    /// Invitation sent, not yet accepted.
    Invited,
    /// Invitation accepted, waiting for key exchange.
    Accepted,
    /// Fully confirmed member.
    Confirmed,
}

impl OrganizationUserStatus {
    /// Decodes the numeric status code used by the relational store.
    pub fn from_code(code: i16) -> Result<Self, AppError> {
        match code {
            -1 => Ok(Self::Revoked),
            0 => Ok(Self::Invited),
            1 => Ok(Self::Accepted),
            2 => Ok(Self::Confirmed),
            _ => Err(AppError::Validation(format!(
                "unknown organization user status code '{code}'"
            ))),
        }
    }

    /// Returns whether the membership counts for permission grants.
    #[must_use]
    pub fn is_active(&self) -> bool {
        *self >= Self::Confirmed
    }
}

/// Fine-grained permission granted to Custom members.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CustomPermission {
    /// View event logs.
    AccessEventLogs,
    /// Import and export organization vault data.
    AccessImportExport,
    /// View organization reports.
    AccessReports,
    /// Create collections.
    CreateNewCollections,
    /// Edit any collection and its items.
    EditAnyCollection,
    /// Delete any collection.
    DeleteAnyCollection,
    /// Manage groups.
    ManageGroups,
    /// Manage organization policies.
    ManagePolicies,
    /// Manage single sign-on.
    ManageSso,
    /// Manage members.
    ManageUsers,
    /// Reset member passwords.
    ManageResetPassword,
    /// Manage directory provisioning.
    ManageScim,
}

impl CustomPermission {
    /// Returns a stable storage value for this permission.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AccessEventLogs => "access_event_logs",
            Self::AccessImportExport => "access_import_export",
            Self::AccessReports => "access_reports",
            Self::CreateNewCollections => "create_new_collections",
            Self::EditAnyCollection => "edit_any_collection",
            Self::DeleteAnyCollection => "delete_any_collection",
            Self::ManageGroups => "manage_groups",
            Self::ManagePolicies => "manage_policies",
            Self::ManageSso => "manage_sso",
            Self::ManageUsers => "manage_users",
            Self::ManageResetPassword => "manage_reset_password",
            Self::ManageScim => "manage_scim",
        }
    }

    /// Returns all known permissions.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[CustomPermission] = &[
            CustomPermission::AccessEventLogs,
            CustomPermission::AccessImportExport,
            CustomPermission::AccessReports,
            CustomPermission::CreateNewCollections,
            CustomPermission::EditAnyCollection,
            CustomPermission::DeleteAnyCollection,
            CustomPermission::ManageGroups,
            CustomPermission::ManagePolicies,
            CustomPermission::ManageSso,
            CustomPermission::ManageUsers,
            CustomPermission::ManageResetPassword,
            CustomPermission::ManageScim,
        ];

        ALL
    }

    fn bit(self) -> u16 {
        1 << (self as u16)
    }
}

impl FromStr for CustomPermission {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|permission| permission.as_str() == value)
            .ok_or_else(|| AppError::Validation(format!("unknown custom permission '{value}'")))
    }
}

/// Bit set of [`CustomPermission`] values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomPermissions(u16);

impl CustomPermissions {
    /// Empty permission set.
    #[must_use]
    pub fn empty() -> Self {
        Self(0)
    }

    /// Returns a copy with the permission added.
    #[must_use]
    pub fn with(self, permission: CustomPermission) -> Self {
        Self(self.0 | permission.bit())
    }

    /// Returns whether the permission is present.
    #[must_use]
    pub fn contains(&self, permission: CustomPermission) -> bool {
        self.0 & permission.bit() != 0
    }

    /// Returns whether no permission is present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Iterates the contained permissions in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = CustomPermission> + '_ {
        CustomPermission::all()
            .iter()
            .copied()
            .filter(|permission| self.contains(*permission))
    }
}

impl FromIterator<CustomPermission> for CustomPermissions {
    fn from_iter<T: IntoIterator<Item = CustomPermission>>(iter: T) -> Self {
        iter.into_iter().fold(Self::empty(), Self::with)
    }
}

/// Membership row linking a user to an organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizationMembership {
    /// Membership identifier.
    pub id: OrganizationUserId,
    /// Owning organization.
    pub organization_id: OrganizationId,
    /// Linked user; empty while an invitation is pending.
    pub user_id: Option<UserId>,
    /// Role inside the organization.
    pub role: OrganizationUserType,
    /// Lifecycle state.
    pub status: OrganizationUserStatus,
    /// Custom permissions, meaningful for the Custom role only.
    pub permissions: CustomPermissions,
    /// Legacy flag granting every collection in the organization.
    pub access_all: bool,
}

impl OrganizationMembership {
    /// Returns whether the membership participates in access checks.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status.is_active() && self.user_id.is_some()
    }
}

/// Organization-scoped set of memberships.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    /// Group identifier.
    pub id: GroupId,
    /// Owning organization.
    pub organization_id: OrganizationId,
    /// Legacy flag granting every collection in the organization.
    pub access_all: bool,
}
