//! RingCentral API data models.

use serde::{Deserialize, Serialize};

/// Envelope shared by every paged listing endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageEnvelope<T> {
    /// Canonical URI of the page that was returned.
    #[serde(default)]
    pub uri: Option<String>,

    #[serde(default = "Vec::new")]
    pub records: Vec<T>,

    #[serde(default)]
    pub paging: Paging,

    #[serde(default)]
    pub navigation: Navigation,
}

/// Pagination counters reported by the server.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paging {
    pub page: Option<u32>,
    pub total_pages: Option<u32>,
    pub per_page: Option<u32>,
    pub total_elements: Option<u32>,
    pub page_start: Option<u32>,
    pub page_end: Option<u32>,
}

/// Navigation links reported by the server.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Navigation {
    pub first_page: Option<NavPage>,
    pub next_page: Option<NavPage>,
    pub previous_page: Option<NavPage>,
    pub last_page: Option<NavPage>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NavPage {
    #[serde(default)]
    pub uri: String,
}

/// A RingCentral extension, i.e. a workforce account.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Extension {
    /// Stable numeric identifier.
    pub id: u64,

    #[serde(default)]
    pub extension_number: String,

    #[serde(default)]
    pub name: String,

    /// Extension type (`User`, `Department`, `IvrMenu`, ...).
    #[serde(rename = "type", default)]
    pub kind: String,

    /// Account status (`Enabled`, `Disabled`, `Frozen`, `NotActivated`, `Unassigned`).
    #[serde(default)]
    pub status: String,

    #[serde(default)]
    pub contact: ExtensionContact,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtensionContact {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
}

impl Extension {
    /// Name for display, falling back to the contact email.
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.contact.email
        } else {
            &self.name
        }
    }
}

/// A role defined on the account.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    pub id: String,

    #[serde(default)]
    pub display_name: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub scope: String,

    #[serde(default)]
    pub custom: bool,

    #[serde(default)]
    pub hidden: bool,

    #[serde(default)]
    pub site_compatible: bool,
}

/// One entry of an extension's assigned-role list.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignedRole {
    pub id: String,

    #[serde(default)]
    pub display_name: String,

    #[serde(default)]
    pub auto_assigned: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AssignedRolesResponse {
    #[serde(default = "Vec::new")]
    pub records: Vec<AssignedRole>,
}

/// Body of the assigned-role replacement write.
///
/// `records` always serializes as an array; an empty list clears all roles.
#[derive(Debug, Serialize)]
pub(crate) struct AssignedRolesUpdate<'a> {
    pub records: Vec<RoleRef<'a>>,
}

#[derive(Debug, Serialize)]
pub(crate) struct RoleRef<'a> {
    pub id: &'a str,
}

impl<'a> AssignedRolesUpdate<'a> {
    pub fn new(role_ids: &'a [String]) -> Self {
        Self {
            records: role_ids.iter().map(|id| RoleRef { id }).collect(),
        }
    }
}
