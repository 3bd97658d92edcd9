//! ChaosSearch provider implementation
//!
//! Maps resource lifecycle calls onto the ChaosSearch client. Object groups
//! are identified by their bucket name, which is also the resource name.

use std::collections::HashMap;

use chaossearch_client::{
    Client, ClientError, Configuration, DeleteObjectGroupRequest, ReadIndexingStateRequest,
    ReadObjectGroupRequest, SetActiveRequest, UpdateObjectGroupRequest,
};
use chaossearch_core::differ::find_changed_attributes;
use chaossearch_core::provider::{ProviderError, ProviderResult};
use chaossearch_core::resource::{Resource, ResourceId, State};

use crate::convert::{
    canonical_attributes, create_request, object_group_attributes, object_groups_attributes,
};
use crate::resources::{OBJECT_GROUP, OBJECT_GROUPS};
use crate::schemas::{self, IN_PLACE_ATTRIBUTES};

fn client_error(id: &ResourceId, e: ClientError) -> ProviderError {
    ProviderError::new(e.to_string())
        .for_resource(id.clone())
        .with_cause(e)
}

fn validate_object_group(resource: &Resource) -> ProviderResult<()> {
    schemas::object_group()
        .validate(&resource.attributes)
        .map_err(|errors| {
            let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            ProviderError::validation(format!("Invalid attributes: {}", messages.join("; ")))
                .for_resource(resource.id.clone())
        })
}

/// ChaosSearch Provider
pub struct ChaosSearchProvider {
    client: Client,
}

impl ChaosSearchProvider {
    /// Create a provider from its settings (`url`, `access_key_id`,
    /// `secret_access_key`, `region`)
    ///
    /// Missing settings fall back to the `CHAOSSEARCH_*` environment variables.
    /// Anything still empty fails here rather than on the first request.
    pub async fn new(settings: &HashMap<String, String>) -> ProviderResult<Self> {
        let config = Configuration::from_settings(settings);
        let client = Client::new(config)
            .await
            .map_err(|e| ProviderError::configuration(e.to_string()).with_cause(e))?;
        log::info!("Configured ChaosSearch provider for {}", client.config().url);
        Ok(Self::with_client(client))
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    // =========================================================================
    // Resource Operations
    // =========================================================================

    /// Read an object group or the object-groups data source
    pub async fn read_resource(
        &self,
        id: &ResourceId,
        identifier: Option<&str>,
    ) -> ProviderResult<State> {
        match id.resource_type.as_str() {
            OBJECT_GROUP => {
                let name = identifier.unwrap_or(&id.name);
                self.read_object_group(id, name).await
            }
            OBJECT_GROUPS => self.read_object_groups(id).await,
            _ => Err(ProviderError::unsupported(id)),
        }
    }

    async fn read_object_group(&self, id: &ResourceId, name: &str) -> ProviderResult<State> {
        let attrs = match self
            .client
            .read_object_group(&ReadObjectGroupRequest {
                id: name.to_string(),
            })
            .await
        {
            Ok(attrs) => attrs,
            Err(e) if e.is_not_found() => {
                log::debug!("Object group {} not found", name);
                return Ok(State::not_found(id.clone()));
            }
            Err(e) => return Err(client_error(id, e)),
        };

        let indexing = self
            .client
            .read_indexing_state(&ReadIndexingStateRequest {
                object_group_name: name.to_string(),
            })
            .await
            .map_err(|e| client_error(id, e))?;

        Ok(
            State::existing(id.clone(), object_group_attributes(&attrs, indexing.active))
                .with_identifier(name),
        )
    }

    async fn read_object_groups(&self, id: &ResourceId) -> ProviderResult<State> {
        let buckets = self
            .client
            .list_object_groups()
            .await
            .map_err(|e| client_error(id, e))?;
        Ok(State::existing(id.clone(), object_groups_attributes(&buckets)))
    }

    /// Create an object group, set its activation if given, then read it back
    pub async fn create_resource(&self, resource: &Resource) -> ProviderResult<State> {
        let id = &resource.id;
        if id.resource_type == OBJECT_GROUPS {
            return Err(ProviderError::validation("Data sources cannot be created")
                .for_resource(id.clone()));
        }
        if id.resource_type != OBJECT_GROUP {
            return Err(ProviderError::unsupported(id));
        }

        validate_object_group(resource)?;

        let req = create_request(resource)?;
        self.client
            .create_object_group(&req)
            .await
            .map_err(|e| client_error(id, e))?;

        if let Some(active) = resource.get_bool("active") {
            self.set_active(id, &req.name, active).await?;
        }

        self.read_object_group(id, &req.name).await
    }

    /// Update an object group in place
    ///
    /// Only index retention and activation can change in place. Any other
    /// changed attribute is an error so the caller replaces the resource.
    pub async fn update_resource(
        &self,
        id: &ResourceId,
        identifier: &str,
        from: &State,
        to: &Resource,
    ) -> ProviderResult<State> {
        if id.resource_type != OBJECT_GROUP {
            return Err(ProviderError::unsupported(id));
        }

        validate_object_group(to)?;

        let changed = find_changed_attributes(
            &canonical_attributes(&to.attributes),
            &canonical_attributes(&from.attributes),
        );
        let replace: Vec<&str> = changed
            .iter()
            .map(String::as_str)
            .filter(|name| !IN_PLACE_ATTRIBUTES.contains(name))
            .collect();
        if !replace.is_empty() {
            return Err(ProviderError::replacement_required(format!(
                "Cannot update {} in place, delete and recreate",
                replace.join(", ")
            ))
            .for_resource(id.clone()));
        }

        if changed.iter().any(|name| name == "index_retention")
            && let Some(index_retention) = to.get_int("index_retention")
        {
            self.client
                .update_object_group(&UpdateObjectGroupRequest {
                    name: identifier.to_string(),
                    index_retention,
                })
                .await
                .map_err(|e| client_error(id, e))?;
        }

        if changed.iter().any(|name| name == "active")
            && let Some(active) = to.get_bool("active")
        {
            self.set_active(id, identifier, active).await?;
        }

        self.read_object_group(id, identifier).await
    }

    pub async fn delete_resource(&self, id: &ResourceId, identifier: &str) -> ProviderResult<()> {
        if id.resource_type != OBJECT_GROUP {
            return Err(ProviderError::unsupported(id));
        }
        self.client
            .delete_object_group(&DeleteObjectGroupRequest {
                name: identifier.to_string(),
            })
            .await
            .map_err(|e| client_error(id, e))
    }

    async fn set_active(&self, id: &ResourceId, name: &str, active: bool) -> ProviderResult<()> {
        self.client
            .set_active(&SetActiveRequest {
                object_group_name: name.to_string(),
                active,
            })
            .await
            .map_err(|e| client_error(id, e))
    }
}
