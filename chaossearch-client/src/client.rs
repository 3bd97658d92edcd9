//! ChaosSearch client

use std::sync::Arc;

use crate::api::ApiClient;
use crate::config::Configuration;
use crate::error::ClientResult;
use crate::store::{BucketStore, S3BucketStore};

/// Handle for all object-group operations
///
/// Holds the REST dispatcher and the bucket store. No state is shared between
/// calls beyond the connection pools of the underlying HTTP clients.
pub struct Client {
    config: Configuration,
    pub(crate) api: ApiClient,
    pub(crate) store: Arc<dyn BucketStore>,
}

impl Client {
    /// Validate the configuration and connect to the REST and S3 endpoints
    pub async fn new(config: Configuration) -> ClientResult<Self> {
        config.validate()?;
        let store = S3BucketStore::from_config(&config).await;
        Self::with_store(config, Arc::new(store))
    }

    /// Use an explicit bucket store (tests, alternative storage)
    pub fn with_store(config: Configuration, store: Arc<dyn BucketStore>) -> ClientResult<Self> {
        config.validate()?;
        let api = ApiClient::new(&config);
        Ok(Self { config, api, store })
    }

    pub fn config(&self) -> &Configuration {
        &self.config
    }
}
