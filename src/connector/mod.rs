//! The RingCentral connector as seen by a sync host.
//!
//! This module provides:
//! - Resource syncers for users (extensions) and roles
//! - Stateless cursor-based listing via opaque continuation tokens
//! - Role grant/revoke through fetch-then-replace reconciliation

pub mod cursor;
pub mod reconcile;
pub mod resource;
pub mod roles;
pub mod syncer;
pub mod users;

use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use crate::client::pagination::PageWindow;
use crate::client::RingCentralClient;
use crate::config::Config;
use crate::error::SyncError;

pub use cursor::{Bag, PageState};
pub use reconcile::{AssignmentStore, RoleAssignmentReconciler};
pub use resource::{
    Entitlement, Grant, ListPage, PageToken, Resource, ResourceId, ResourceType,
    ROLE_RESOURCE_TYPE, USER_RESOURCE_TYPE,
};
pub use roles::RoleSyncer;
pub use syncer::{Provisioner, ResourceSyncer};
pub use users::UserSyncer;

/// Connector description reported to the host.
#[derive(Debug, Clone, Serialize)]
pub struct ConnectorMetadata {
    pub display_name: String,
    pub description: String,
}

pub struct Connector {
    client: Arc<RingCentralClient>,
    display_name: String,
}

impl Connector {
    /// Build the connector, exchanging credentials for a token if they are complete.
    pub async fn new(config: &Config) -> Result<Self, SyncError> {
        let client = RingCentralClient::connect(config).await?;
        Ok(Self::with_client(
            Arc::new(client),
            config.app.display_name.clone(),
        ))
    }

    pub fn with_client(client: Arc<RingCentralClient>, display_name: String) -> Self {
        Self {
            client,
            display_name,
        }
    }

    pub fn metadata(&self) -> ConnectorMetadata {
        ConnectorMetadata {
            display_name: self.display_name.clone(),
            description: "Syncs users and roles from RingCentral and grants or revokes \
                          user role assignments."
                .to_string(),
        }
    }

    /// Exercise the credentials with a one-record extension listing.
    pub async fn validate(&self) -> Result<(), SyncError> {
        self.client.list_extensions(PageWindow::new(1, 1)).await?;
        info!("Connector credentials validated");
        Ok(())
    }

    /// One syncer per resource type.
    pub fn resource_syncers(&self) -> Vec<Box<dyn ResourceSyncer>> {
        vec![
            Box::new(UserSyncer::new(self.client.clone())),
            Box::new(RoleSyncer::new(self.client.clone())),
        ]
    }

    /// Syncer for the given resource type id.
    pub fn syncer(&self, resource_type_id: &str) -> Option<Box<dyn ResourceSyncer>> {
        self.resource_syncers()
            .into_iter()
            .find(|s| s.resource_type().id == resource_type_id)
    }
}
