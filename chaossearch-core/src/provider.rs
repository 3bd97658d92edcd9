//! Provider - Lifecycle operations over a platform's resources
//!
//! A Provider owns a set of resource types and turns create/read/update/delete
//! of those resources into calls against its platform.

use std::error::Error as StdError;
use std::fmt;
use std::future::Future;
use std::pin::Pin;

use crate::resource::{Resource, ResourceId, State};
use crate::schema::ResourceSchema;

/// Broad category of a provider failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Provider settings are missing or unusable
    Configuration,
    /// Attributes do not satisfy the resource schema
    Validation,
    /// The requested change cannot be applied in place
    ReplacementRequired,
    /// The provider does not manage this resource type
    UnsupportedResource,
    /// The platform rejected the call or could not be reached
    Platform,
}

/// Error type for Provider operations
#[derive(Debug)]
pub struct ProviderError {
    pub kind: ErrorKind,
    pub message: String,
    pub resource_id: Option<ResourceId>,
    pub cause: Option<Box<dyn StdError + Send + Sync>>,
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.resource_id {
            Some(id) => write!(f, "[{}.{}] {}", id.resource_type, id.name, self.message),
            None => f.write_str(&self.message),
        }
    }
}

impl StdError for ProviderError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.cause.as_deref().map(|e| e as &(dyn StdError + 'static))
    }
}

impl ProviderError {
    /// Platform error with the given message
    pub fn new(message: impl Into<String>) -> Self {
        Self::with_kind(ErrorKind::Platform, message)
    }

    pub fn with_kind(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            resource_id: None,
            cause: None,
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::with_kind(ErrorKind::Configuration, message)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::with_kind(ErrorKind::Validation, message)
    }

    pub fn replacement_required(message: impl Into<String>) -> Self {
        Self::with_kind(ErrorKind::ReplacementRequired, message)
    }

    pub fn unsupported(id: &ResourceId) -> Self {
        Self::with_kind(
            ErrorKind::UnsupportedResource,
            format!("Unknown resource type: {}", id.resource_type),
        )
        .for_resource(id.clone())
    }

    pub fn for_resource(mut self, id: ResourceId) -> Self {
        self.resource_id = Some(id);
        self
    }

    pub fn with_cause(mut self, cause: impl StdError + Send + Sync + 'static) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }
}

pub type ProviderResult<T> = Result<T, ProviderError>;

/// Future returned by Provider operations
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A resource type handled by a Provider
pub trait ResourceType: Send + Sync {
    /// Type name (e.g., "object_group")
    fn name(&self) -> &'static str;

    fn schema(&self) -> ResourceSchema;

    /// Data sources are read, never created or changed
    fn is_data_source(&self) -> bool {
        false
    }
}

/// Main Provider trait
///
/// All operations are async and involve side effects.
pub trait Provider: Send + Sync {
    /// Name of this Provider (e.g., "chaossearch")
    fn name(&self) -> &'static str;

    fn resource_types(&self) -> Vec<Box<dyn ResourceType>>;

    /// Get the current state of a resource
    ///
    /// `identifier` is the platform identifier when known; otherwise the
    /// resource name is used. A resource that does not exist reads as
    /// `State::not_found()`, not as an error.
    fn read(
        &self,
        id: &ResourceId,
        identifier: Option<&str>,
    ) -> BoxFuture<'_, ProviderResult<State>>;

    /// Create a resource and return its state with the identifier set
    fn create(&self, resource: &Resource) -> BoxFuture<'_, ProviderResult<State>>;

    /// Update a resource in place from `from` to `to`
    fn update(
        &self,
        id: &ResourceId,
        identifier: &str,
        from: &State,
        to: &Resource,
    ) -> BoxFuture<'_, ProviderResult<State>>;

    fn delete(&self, id: &ResourceId, identifier: &str) -> BoxFuture<'_, ProviderResult<()>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Echoes desired attributes back as state
    struct EchoProvider;

    impl Provider for EchoProvider {
        fn name(&self) -> &'static str {
            "echo"
        }

        fn resource_types(&self) -> Vec<Box<dyn ResourceType>> {
            Vec::new()
        }

        fn read(
            &self,
            id: &ResourceId,
            _identifier: Option<&str>,
        ) -> BoxFuture<'_, ProviderResult<State>> {
            let id = id.clone();
            Box::pin(async move { Ok(State::not_found(id)) })
        }

        fn create(&self, resource: &Resource) -> BoxFuture<'_, ProviderResult<State>> {
            let state = State::existing(resource.id.clone(), resource.attributes.clone())
                .with_identifier(resource.id.name.clone());
            Box::pin(async move { Ok(state) })
        }

        fn update(
            &self,
            id: &ResourceId,
            _identifier: &str,
            _from: &State,
            _to: &Resource,
        ) -> BoxFuture<'_, ProviderResult<State>> {
            let err = ProviderError::replacement_required("echo resources are immutable")
                .for_resource(id.clone());
            Box::pin(async move { Err(err) })
        }

        fn delete(&self, _id: &ResourceId, _identifier: &str) -> BoxFuture<'_, ProviderResult<()>> {
            Box::pin(async { Ok(()) })
        }
    }

    #[tokio::test]
    async fn read_of_absent_resource_is_not_found() {
        let id = ResourceId::new("object_group", "logs");
        let state = EchoProvider.read(&id, None).await.unwrap();
        assert!(!state.exists);
    }

    #[tokio::test]
    async fn create_sets_identifier_and_update_reports_kind() {
        let resource = Resource::new("object_group", "logs");
        let state = EchoProvider.create(&resource).await.unwrap();
        assert_eq!(state.identifier.as_deref(), Some("logs"));

        let err = EchoProvider
            .update(&resource.id, "logs", &state, &resource)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::ReplacementRequired);
    }

    #[test]
    fn error_display_includes_resource() {
        let id = ResourceId::new("object_group", "logs");
        let error = ProviderError::new("boom").for_resource(id.clone());
        assert_eq!(error.to_string(), "[object_group.logs] boom");
        assert_eq!(ProviderError::new("boom").to_string(), "boom");

        let error = ProviderError::unsupported(&ResourceId::new("dashboard", "main"));
        assert_eq!(error.kind, ErrorKind::UnsupportedResource);
        assert_eq!(error.to_string(), "[dashboard.main] Unknown resource type: dashboard");
    }

    #[test]
    fn cause_is_exposed_as_source() {
        let io = std::io::Error::other("connection reset");
        let error = ProviderError::new("read failed").with_cause(io);
        assert_eq!(error.source().unwrap().to_string(), "connection reset");
    }
}
