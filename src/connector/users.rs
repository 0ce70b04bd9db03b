//! User resources, backed by RingCentral extensions.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use tracing::debug;

use super::cursor::Bag;
use super::resource::{
    Email, Entitlement, Grant, ListPage, PageToken, Resource, ResourceId, ResourceType, Traits,
    UserStatus, UserTrait, ROLE_PERMISSION_NAME, ROLE_RESOURCE_TYPE, USER_RESOURCE_TYPE,
};
use super::syncer::ResourceSyncer;
use crate::client::models::Extension;
use crate::client::pagination::PageWindow;
use crate::client::RingCentralClient;
use crate::error::SyncError;

pub struct UserSyncer {
    client: Arc<RingCentralClient>,
}

impl UserSyncer {
    pub fn new(client: Arc<RingCentralClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ResourceSyncer for UserSyncer {
    fn resource_type(&self) -> &'static ResourceType {
        &USER_RESOURCE_TYPE
    }

    async fn list(
        &self,
        _parent: Option<&ResourceId>,
        token: &PageToken,
    ) -> Result<ListPage<Resource>, SyncError> {
        let (bag, page) = Bag::resume(&token.token, &USER_RESOURCE_TYPE)?;

        let result = self
            .client
            .list_extensions(PageWindow::new(page, token.size))
            .await?;

        let items = result.records.iter().map(user_resource).collect();
        let next_token = bag.advance(result.next_page)?;

        Ok(ListPage { items, next_token })
    }

    async fn entitlements(
        &self,
        _resource: &Resource,
        _token: &PageToken,
    ) -> Result<ListPage<Entitlement>, SyncError> {
        Ok(ListPage::last(Vec::new()))
    }

    /// Role grants are derived here: assignments are only readable per user.
    async fn grants(
        &self,
        resource: &Resource,
        _token: &PageToken,
    ) -> Result<ListPage<Grant>, SyncError> {
        let assigned = self.client.get_assigned_roles(&resource.id.resource).await?;

        debug!(
            "User {} holds {} roles",
            resource.id.resource,
            assigned.len()
        );

        let grants = assigned
            .into_iter()
            .map(|role| {
                let role_resource = Resource {
                    id: ResourceId::new(&ROLE_RESOURCE_TYPE, role.id),
                    display_name: role.display_name,
                    description: String::new(),
                    parent: None,
                    traits: Traits::None,
                };
                Grant::new(&role_resource, ROLE_PERMISSION_NAME, resource.id.clone())
            })
            .collect();

        Ok(ListPage::last(grants))
    }
}

/// Convert an extension into a user resource.
pub fn user_resource(extension: &Extension) -> Resource {
    let contact = &extension.contact;

    let mut profile = Map::new();
    profile.insert("user_id".into(), json!(extension.id));
    profile.insert("email".into(), Value::from(contact.email.clone()));
    profile.insert("first_name".into(), Value::from(contact.first_name.clone()));
    profile.insert("last_name".into(), Value::from(contact.last_name.clone()));
    profile.insert("status".into(), Value::from(extension.status.clone()));

    let emails = if contact.email.is_empty() {
        Vec::new()
    } else {
        vec![Email {
            address: contact.email.clone(),
            is_primary: true,
        }]
    };

    Resource {
        id: ResourceId::new(&USER_RESOURCE_TYPE, extension.id.to_string()),
        display_name: extension.display_name().to_string(),
        description: String::new(),
        parent: None,
        traits: Traits::User(UserTrait {
            profile,
            status: UserStatus::from_remote(&extension.status),
            login: contact.email.clone(),
            emails,
        }),
    }
}
