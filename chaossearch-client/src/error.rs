//! Client error types

use reqwest::StatusCode;
use thiserror::Error;

/// Errors that can occur when talking to ChaosSearch
#[derive(Debug, Error)]
pub enum ClientError {
    /// A required provider setting is missing or invalid
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The request never produced a response (network, TLS, timeout)
    #[error("Failed to {method} to {url}: {source}")]
    Transport {
        method: String,
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The API answered with a non-success status
    #[error("Failed to {method} to {url}: status {status}: {body}")]
    Status {
        method: String,
        url: String,
        status: StatusCode,
        body: String,
    },

    /// Bucket storage (S3 API) call failed
    #[error("Failed to {operation} for bucket {bucket}: {message}")]
    Storage {
        operation: String,
        bucket: String,
        message: String,
    },

    /// The bucket behind an object group does not exist
    #[error("Bucket not found: {0}")]
    BucketNotFound(String),

    /// A present value could not be decoded as JSON
    #[error("Failed to decode {context}: {source}")]
    Decode {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// A decoded document does not have the expected shape
    #[error("Unexpected shape for {context}: {message}")]
    UnexpectedShape { context: String, message: String },

    /// A whole object-group operation failed
    #[error("Failed to {operation} object group {name}: {source}")]
    ObjectGroup {
        operation: &'static str,
        name: String,
        #[source]
        source: Box<ClientError>,
    },
}

impl ClientError {
    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Create a decode error for the given context (tag key, URL, ...)
    pub fn decode(context: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Decode {
            context: context.into(),
            source,
        }
    }

    /// Create a storage error
    pub fn storage(
        operation: impl Into<String>,
        bucket: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Storage {
            operation: operation.into(),
            bucket: bucket.into(),
            message: message.into(),
        }
    }

    /// Wrap an error with the object-group operation it aborted
    pub fn object_group(operation: &'static str, name: impl Into<String>, source: ClientError) -> Self {
        Self::ObjectGroup {
            operation,
            name: name.into(),
            source: Box::new(source),
        }
    }

    /// True for malformed or mis-shaped JSON, looking through operation wrappers
    pub fn is_decode(&self) -> bool {
        match self {
            Self::Decode { .. } | Self::UnexpectedShape { .. } => true,
            Self::ObjectGroup { source, .. } => source.is_decode(),
            _ => false,
        }
    }

    /// True for failures reaching or answered by the remote side
    pub fn is_transport(&self) -> bool {
        match self {
            Self::Transport { .. } | Self::Status { .. } | Self::Storage { .. } => true,
            Self::ObjectGroup { source, .. } => source.is_transport(),
            _ => false,
        }
    }

    /// True when the remote side reported that the resource does not exist
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Status { status, .. } => *status == StatusCode::NOT_FOUND,
            Self::BucketNotFound(_) => true,
            Self::ObjectGroup { source, .. } => source.is_not_found(),
            _ => false,
        }
    }
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;
