//! Domain entities and access-merging rules.

#![forbid(unsafe_code)]

mod access;
mod actor;
mod audit;
mod cipher;
mod collection;
mod membership;
mod operation;
mod organization;

pub use access::{CollectionAccess, GrantPermissions, PermissionLevel};
pub use actor::{ActorContext, CurrentOrganization};
pub use audit::AuditAction;
pub use cipher::{Cipher, CipherOwner};
pub use collection::{
    Collection, CollectionAccessGrant, CollectionAccessSelection, GrantSubject,
};
pub use membership::{
    CustomPermission, CustomPermissions, Group, OrganizationMembership, OrganizationUserStatus,
    OrganizationUserType,
};
pub use operation::{
    AccessDecision, CipherOperation, CollectionOperation, GroupOperation,
    OrganizationUserOperation,
};
pub use organization::{AuthorizationMode, FeatureFlag, OrganizationAbility};
