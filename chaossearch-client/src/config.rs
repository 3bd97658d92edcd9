//! Client configuration

use std::collections::HashMap;

use url::Url;

use crate::error::{ClientError, ClientResult};

pub const ENV_URL: &str = "CHAOSSEARCH_URL";
pub const ENV_ACCESS_KEY_ID: &str = "CHAOSSEARCH_ACCESS_KEY_ID";
pub const ENV_SECRET_ACCESS_KEY: &str = "CHAOSSEARCH_SECRET_ACCESS_KEY";
pub const ENV_REGION: &str = "CHAOSSEARCH_REGION";

/// Region used when neither the settings nor the environment name one
pub const DEFAULT_REGION: &str = "eu-west-1";

/// Connection settings for a ChaosSearch deployment
#[derive(Clone, PartialEq, Eq)]
pub struct Configuration {
    /// Base URL of the deployment (e.g., "https://acme.chaossearch.io")
    pub url: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    pub region: String,
}

impl std::fmt::Debug for Configuration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Configuration")
            .field("url", &self.url)
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field("region", &self.region)
            .finish()
    }
}

impl Configuration {
    pub fn new(
        url: impl Into<String>,
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
        region: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            region: region.into(),
        }
    }

    /// Build a configuration from explicit settings, falling back to the
    /// `CHAOSSEARCH_*` environment variables for anything not given
    pub fn from_settings(settings: &HashMap<String, String>) -> Self {
        Self::from_lookup(|key, env| {
            settings
                .get(key)
                .cloned()
                .or_else(|| std::env::var(env).ok())
        })
    }

    /// Build a configuration with a custom lookup of (setting name, env var name)
    pub fn from_lookup(lookup: impl Fn(&str, &str) -> Option<String>) -> Self {
        Self {
            url: lookup("url", ENV_URL).unwrap_or_default(),
            access_key_id: lookup("access_key_id", ENV_ACCESS_KEY_ID).unwrap_or_default(),
            secret_access_key: lookup("secret_access_key", ENV_SECRET_ACCESS_KEY)
                .unwrap_or_default(),
            region: lookup("region", ENV_REGION).unwrap_or_else(|| DEFAULT_REGION.to_string()),
        }
    }

    /// Check that every setting is present and the URL is usable
    pub fn validate(&self) -> ClientResult<()> {
        for (name, value) in [
            ("url", &self.url),
            ("access_key_id", &self.access_key_id),
            ("secret_access_key", &self.secret_access_key),
            ("region", &self.region),
        ] {
            if value.is_empty() {
                return Err(ClientError::configuration(format!(
                    "Expected '{}' to be defined in provider configuration, but it was not",
                    name
                )));
            }
        }

        let url = Url::parse(&self.url).map_err(|e| {
            ClientError::configuration(format!("Invalid url '{}': {}", self.url, e))
        })?;
        if url.host_str().is_none() {
            return Err(ClientError::configuration(format!(
                "Invalid url '{}': missing host",
                self.url
            )));
        }

        Ok(())
    }

    /// Base URL without trailing slash
    pub fn base_url(&self) -> &str {
        self.url.trim_end_matches('/')
    }

    /// Endpoint of the S3-compatible API
    pub fn storage_endpoint(&self) -> String {
        format!("{}/V1", self.base_url())
    }
}
