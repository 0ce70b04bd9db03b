//! Capability traits the sync host drives, one implementation per resource type.

use async_trait::async_trait;

use super::resource::{
    Entitlement, Grant, ListPage, PageToken, Resource, ResourceId, ResourceType,
};
use crate::error::SyncError;

/// Read side of a resource type: listing, entitlements and grants.
///
/// Every call is independent; progress travels in the [`PageToken`].
#[async_trait]
pub trait ResourceSyncer: Send + Sync {
    fn resource_type(&self) -> &'static ResourceType;

    async fn list(
        &self,
        parent: Option<&ResourceId>,
        token: &PageToken,
    ) -> Result<ListPage<Resource>, SyncError>;

    async fn entitlements(
        &self,
        resource: &Resource,
        token: &PageToken,
    ) -> Result<ListPage<Entitlement>, SyncError>;

    async fn grants(
        &self,
        resource: &Resource,
        token: &PageToken,
    ) -> Result<ListPage<Grant>, SyncError>;

    /// Write side, for resource types whose entitlements can be provisioned.
    fn provisioner(&self) -> Option<&dyn Provisioner> {
        None
    }
}

/// Write side of a resource type.
///
/// Callers must serialize grant/revoke calls that target the same principal:
/// the remote list has no version token, so concurrent writers race.
#[async_trait]
pub trait Provisioner: Send + Sync {
    async fn grant(&self, principal: &ResourceId, entitlement: &Entitlement)
        -> Result<(), SyncError>;

    async fn revoke(&self, grant: &Grant) -> Result<(), SyncError>;
}
