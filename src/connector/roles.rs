//! Role resources and role assignment provisioning.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::warn;

use super::cursor::Bag;
use super::reconcile::RoleAssignmentReconciler;
use super::resource::{
    Entitlement, Grant, ListPage, PageToken, Resource, ResourceId, ResourceType, RoleTrait,
    Traits, ROLE_PERMISSION_NAME, ROLE_RESOURCE_TYPE, USER_RESOURCE_TYPE,
};
use super::syncer::{Provisioner, ResourceSyncer};
use crate::client::models::Role;
use crate::client::pagination::PageWindow;
use crate::client::RingCentralClient;
use crate::error::SyncError;

pub struct RoleSyncer {
    client: Arc<RingCentralClient>,
    reconciler: RoleAssignmentReconciler,
}

impl RoleSyncer {
    pub fn new(client: Arc<RingCentralClient>) -> Self {
        let reconciler = RoleAssignmentReconciler::new(client.clone());
        Self { client, reconciler }
    }
}

#[async_trait]
impl ResourceSyncer for RoleSyncer {
    fn resource_type(&self) -> &'static ResourceType {
        &ROLE_RESOURCE_TYPE
    }

    async fn list(
        &self,
        _parent: Option<&ResourceId>,
        token: &PageToken,
    ) -> Result<ListPage<Resource>, SyncError> {
        let (bag, page) = Bag::resume(&token.token, &ROLE_RESOURCE_TYPE)?;

        let result = self
            .client
            .list_user_roles(PageWindow::new(page, token.size))
            .await?;

        let items = result.records.iter().map(role_resource).collect();
        let next_token = bag.advance(result.next_page)?;

        Ok(ListPage { items, next_token })
    }

    async fn entitlements(
        &self,
        resource: &Resource,
        _token: &PageToken,
    ) -> Result<ListPage<Entitlement>, SyncError> {
        Ok(ListPage::last(vec![Entitlement::permission(
            resource,
            ROLE_PERMISSION_NAME,
            &[&USER_RESOURCE_TYPE],
        )]))
    }

    /// Always empty: grants are read from the user side.
    async fn grants(
        &self,
        _resource: &Resource,
        _token: &PageToken,
    ) -> Result<ListPage<Grant>, SyncError> {
        Ok(ListPage::last(Vec::new()))
    }

    fn provisioner(&self) -> Option<&dyn Provisioner> {
        Some(self)
    }
}

#[async_trait]
impl Provisioner for RoleSyncer {
    async fn grant(
        &self,
        principal: &ResourceId,
        entitlement: &Entitlement,
    ) -> Result<(), SyncError> {
        ensure_user(principal)?;
        self.reconciler
            .grant(&principal.resource, &entitlement.resource.id.resource)
            .await
    }

    async fn revoke(&self, grant: &Grant) -> Result<(), SyncError> {
        ensure_user(&grant.principal)?;
        self.reconciler
            .revoke(
                &grant.principal.resource,
                &grant.entitlement.resource.id.resource,
            )
            .await
    }
}

fn ensure_user(principal: &ResourceId) -> Result<(), SyncError> {
    if principal.is_type(&USER_RESOURCE_TYPE) {
        return Ok(());
    }

    warn!(
        "Only users can be granted role membership (principal {} of type {})",
        principal.resource, principal.resource_type
    );
    Err(SyncError::PrincipalMismatch {
        principal_id: principal.resource.clone(),
        resource_type: principal.resource_type.clone(),
    })
}

/// Convert an account role into a role resource.
pub fn role_resource(role: &Role) -> Resource {
    let mut profile = Map::new();
    profile.insert("role_id".into(), Value::from(role.id.clone()));
    profile.insert("description".into(), Value::from(role.description.clone()));
    profile.insert("display_name".into(), Value::from(role.display_name.clone()));
    profile.insert("scope".into(), Value::from(role.scope.clone()));
    profile.insert("hidden".into(), Value::from(role.hidden));
    profile.insert("custom".into(), Value::from(role.custom));
    profile.insert("site_compatible".into(), Value::from(role.site_compatible));

    Resource {
        id: ResourceId::new(&ROLE_RESOURCE_TYPE, role.id.clone()),
        display_name: role.display_name.clone(),
        description: role.description.clone(),
        parent: None,
        traits: Traits::Role(RoleTrait { profile }),
    }
}
