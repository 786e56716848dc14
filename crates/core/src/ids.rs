use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::AppError;

macro_rules! uuid_identifier {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Creates a random identifier.
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Creates an identifier from an existing UUID value.
            #[must_use]
            pub fn from_uuid(value: Uuid) -> Self {
                Self(value)
            }

            /// Returns the underlying UUID value.
            #[must_use]
            pub fn as_uuid(&self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl Display for $name {
            fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
                write!(formatter, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = AppError;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(value.trim()).map(Self).map_err(|error| {
                    AppError::Validation(format!("invalid {} '{value}': {error}", $label))
                })
            }
        }
    };
}

uuid_identifier!(
    /// Account identifier of a person using the vault.
    UserId,
    "user id"
);
uuid_identifier!(
    /// Tenant identifier used as the partition key for every shared resource.
    OrganizationId,
    "organization id"
);
uuid_identifier!(
    /// Identifier of one membership row linking a user to an organization.
    OrganizationUserId,
    "organization user id"
);
uuid_identifier!(
    /// Identifier of an organization-scoped group.
    GroupId,
    "group id"
);
uuid_identifier!(
    /// Identifier of an organization-scoped collection.
    CollectionId,
    "collection id"
);
uuid_identifier!(
    /// Identifier of a vault item.
    CipherId,
    "cipher id"
);

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::{CollectionId, OrganizationId};

    #[test]
    fn identifier_formats_as_uuid() {
        let organization_id = OrganizationId::new();
        assert_eq!(organization_id.to_string().len(), 36);
    }

    #[test]
    fn identifier_parses_its_display_value() {
        let collection_id = CollectionId::new();
        let parsed = CollectionId::from_str(collection_id.to_string().as_str());
        assert!(matches!(parsed, Ok(value) if value == collection_id));
    }

    #[test]
    fn identifier_rejects_malformed_input() {
        let parsed = CollectionId::from_str("not-a-uuid");
        assert!(parsed.is_err());
    }
}
