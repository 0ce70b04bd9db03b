//! Resource, entitlement and grant records handed to the sync host.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Slug of the single entitlement each role exposes.
pub const ROLE_PERMISSION_NAME: &str = "assigned";

/// Kind of object a resource type describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceTrait {
    User,
    Role,
}

/// A resource type the connector syncs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResourceType {
    pub id: &'static str,
    pub display_name: &'static str,
    pub traits: &'static [ResourceTrait],
}

pub const USER_RESOURCE_TYPE: ResourceType = ResourceType {
    id: "user",
    display_name: "User",
    traits: &[ResourceTrait::User],
};

pub const ROLE_RESOURCE_TYPE: ResourceType = ResourceType {
    id: "role",
    display_name: "Role",
    traits: &[ResourceTrait::Role],
};

/// Typed resource identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceId {
    pub resource_type: String,
    pub resource: String,
}

impl ResourceId {
    pub fn new(resource_type: &ResourceType, resource: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.id.to_string(),
            resource: resource.into(),
        }
    }

    pub fn is_type(&self, resource_type: &ResourceType) -> bool {
        self.resource_type == resource_type.id
    }
}

/// Account status of a user resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UserStatus {
    Enabled,
    Disabled,
    Unspecified,
}

impl UserStatus {
    /// Map a RingCentral extension status.
    pub fn from_remote(status: &str) -> Self {
        match status {
            "Enabled" => Self::Enabled,
            "Disabled" | "Frozen" => Self::Disabled,
            _ => Self::Unspecified,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Email {
    pub address: String,
    pub is_primary: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserTrait {
    pub profile: Map<String, Value>,
    pub status: UserStatus,
    pub login: String,
    pub emails: Vec<Email>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoleTrait {
    pub profile: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Traits {
    User(UserTrait),
    Role(RoleTrait),
    None,
}

/// A synced object.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resource {
    pub id: ResourceId,
    pub display_name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<ResourceId>,
    pub traits: Traits,
}

/// Something that can be granted on a resource.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Entitlement {
    pub id: String,
    pub resource: Resource,
    pub slug: String,
    pub display_name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    pub grantable_to: Vec<String>,
}

impl Entitlement {
    /// Permission entitlement on `resource`.
    pub fn permission(
        resource: &Resource,
        slug: &str,
        grantable_to: &[&ResourceType],
    ) -> Self {
        Self {
            id: format!(
                "{}:{}:{}",
                resource.id.resource_type, resource.id.resource, slug
            ),
            resource: resource.clone(),
            slug: slug.to_string(),
            display_name: resource.display_name.clone(),
            description: resource.description.clone(),
            grantable_to: grantable_to.iter().map(|t| t.id.to_string()).collect(),
        }
    }
}

/// A principal holding an entitlement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Grant {
    pub id: String,
    pub entitlement: Entitlement,
    pub principal: ResourceId,
}

impl Grant {
    pub fn new(resource: &Resource, slug: &str, principal: ResourceId) -> Self {
        let entitlement = Entitlement::permission(resource, slug, &[]);
        Self {
            id: format!(
                "{}:{}:{}",
                entitlement.id, principal.resource_type, principal.resource
            ),
            entitlement,
            principal,
        }
    }
}

/// Paging request from the host: the page size plus the cursor it was handed last.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageToken {
    pub size: u32,
    pub token: String,
}

impl PageToken {
    pub fn new(size: u32) -> Self {
        Self {
            size,
            token: String::new(),
        }
    }

    pub fn resume(size: u32, token: impl Into<String>) -> Self {
        Self {
            size,
            token: token.into(),
        }
    }
}

/// One page of results; an empty `next_token` means the listing is complete.
#[derive(Debug, Clone, PartialEq)]
pub struct ListPage<T> {
    pub items: Vec<T>,
    pub next_token: String,
}

impl<T> ListPage<T> {
    pub fn last(items: Vec<T>) -> Self {
        Self {
            items,
            next_token: String::new(),
        }
    }

    pub fn is_last(&self) -> bool {
        self.next_token.is_empty()
    }
}
