//! ChaosSearch Provider
//!
//! Manages ChaosSearch object groups and exposes the list of object groups as
//! a data source.
//!
//! ## Module Structure
//!
//! - `resources` - Resource type definitions
//! - `schemas` - Attribute schemas per resource type
//! - `provider` - ChaosSearchProvider implementation
//! - `convert` - Attribute values to and from client models

pub mod convert;
pub mod provider;
pub mod resources;
pub mod schemas;

// Re-export main types
pub use provider::ChaosSearchProvider;

use chaossearch_core::provider::{BoxFuture, Provider, ProviderResult, ResourceType};
use chaossearch_core::resource::{Resource, ResourceId, State};

use resources::resource_types;

impl Provider for ChaosSearchProvider {
    fn name(&self) -> &'static str {
        "chaossearch"
    }

    fn resource_types(&self) -> Vec<Box<dyn ResourceType>> {
        resource_types()
    }

    fn read(
        &self,
        id: &ResourceId,
        identifier: Option<&str>,
    ) -> BoxFuture<'_, ProviderResult<State>> {
        let id = id.clone();
        let identifier = identifier.map(|s| s.to_string());
        Box::pin(async move { self.read_resource(&id, identifier.as_deref()).await })
    }

    fn create(&self, resource: &Resource) -> BoxFuture<'_, ProviderResult<State>> {
        let resource = resource.clone();
        Box::pin(async move { self.create_resource(&resource).await })
    }

    fn update(
        &self,
        id: &ResourceId,
        identifier: &str,
        from: &State,
        to: &Resource,
    ) -> BoxFuture<'_, ProviderResult<State>> {
        let id = id.clone();
        let identifier = identifier.to_string();
        let from = from.clone();
        let to = to.clone();
        Box::pin(async move { self.update_resource(&id, &identifier, &from, &to).await })
    }

    fn delete(&self, id: &ResourceId, identifier: &str) -> BoxFuture<'_, ProviderResult<()>> {
        let id = id.clone();
        let identifier = identifier.to_string();
        Box::pin(async move { self.delete_resource(&id, &identifier).await })
    }
}
