//! Bucket storage access
//!
//! Object-group tags and the bucket listing come from the S3-compatible
//! storage API at `{url}/V1`. [`BucketStore`] abstracts it so the REST side can
//! be exercised against an in-memory store.

use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use aws_sdk_s3::Client as S3Client;
use aws_sdk_s3::config::{Credentials, Region};
use aws_sdk_s3::error::{ProvideErrorMetadata, SdkError};
use chrono::{DateTime, Utc};

use crate::config::Configuration;
use crate::error::{ClientError, ClientResult};
use crate::model::BucketSummary;
use crate::tagging::TagSet;

/// Tagging error code for a bucket that exists but carries no tags
const NO_SUCH_TAG_SET: &str = "NoSuchTagSet";
const NO_SUCH_BUCKET: &str = "NoSuchBucket";

#[async_trait]
pub trait BucketStore: Send + Sync {
    /// Tags of `bucket`; an untagged bucket yields an empty set
    async fn get_bucket_tagging(&self, bucket: &str) -> ClientResult<TagSet>;

    async fn list_buckets(&self) -> ClientResult<Vec<BucketSummary>>;
}

/// [`BucketStore`] backed by the ChaosSearch S3 endpoint
pub struct S3BucketStore {
    client: S3Client,
}

impl S3BucketStore {
    /// Build an S3 client with static credentials and path-style addressing
    pub async fn from_config(config: &Configuration) -> Self {
        let credentials = Credentials::new(
            config.access_key_id.clone(),
            config.secret_access_key.clone(),
            None,
            None,
            "chaossearch",
        );

        let sdk_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .credentials_provider(credentials)
            .endpoint_url(config.storage_endpoint())
            .load()
            .await;

        let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(true)
            .build();

        Self {
            client: S3Client::from_conf(s3_config),
        }
    }
}

#[async_trait]
impl BucketStore for S3BucketStore {
    async fn get_bucket_tagging(&self, bucket: &str) -> ClientResult<TagSet> {
        log::debug!("GetBucketTagging {}", bucket);
        let result = self.client.get_bucket_tagging().bucket(bucket).send().await;

        match result {
            Ok(output) => Ok(output
                .tag_set()
                .iter()
                .map(|tag| (tag.key(), tag.value()))
                .collect()),
            Err(err) => match err.code() {
                Some(NO_SUCH_TAG_SET) => Ok(TagSet::new()),
                Some(NO_SUCH_BUCKET) => Err(ClientError::BucketNotFound(bucket.to_string())),
                _ if is_not_found_error(&err) => {
                    Err(ClientError::BucketNotFound(bucket.to_string()))
                }
                _ => Err(ClientError::storage(
                    "read bucket tagging",
                    bucket,
                    storage_message(&err),
                )),
            },
        }
    }

    async fn list_buckets(&self) -> ClientResult<Vec<BucketSummary>> {
        log::debug!("ListBuckets");
        let output = self
            .client
            .list_buckets()
            .send()
            .await
            .map_err(|err| ClientError::storage("list buckets", "*", storage_message(&err)))?;

        Ok(output
            .buckets()
            .iter()
            .filter_map(|bucket| {
                let name = bucket.name()?.to_string();
                let creation_date = bucket
                    .creation_date()
                    .and_then(|d| DateTime::<Utc>::from_timestamp(d.secs(), d.subsec_nanos()));
                Some(BucketSummary {
                    name,
                    creation_date,
                })
            })
            .collect())
    }
}

fn is_not_found_error<E>(err: &SdkError<E>) -> bool {
    err.raw_response()
        .is_some_and(|raw| raw.status().as_u16() == 404)
}

fn storage_message<E: ProvideErrorMetadata + std::error::Error + 'static>(
    err: &SdkError<E>,
) -> String {
    match (err.code(), err.message()) {
        (Some(code), Some(message)) => format!("{}: {}", code, message),
        (Some(code), None) => code.to_string(),
        _ => aws_sdk_s3::error::DisplayErrorContext(err).to_string(),
    }
}

/// In-memory [`BucketStore`]
///
/// Buckets are listed in name order with no creation date.
#[derive(Debug, Default)]
pub struct MemoryBucketStore {
    buckets: RwLock<BTreeMap<String, TagSet>>,
}

impl MemoryBucketStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bucket(self, name: impl Into<String>, tags: TagSet) -> Self {
        self.insert(name, tags);
        self
    }

    pub fn insert(&self, name: impl Into<String>, tags: TagSet) {
        self.write().insert(name.into(), tags);
    }

    pub fn remove(&self, name: &str) {
        self.write().remove(name);
    }

    // Reads and writes both recover from a poisoned lock
    fn read(&self) -> RwLockReadGuard<'_, BTreeMap<String, TagSet>> {
        self.buckets.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, BTreeMap<String, TagSet>> {
        self.buckets.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl BucketStore for MemoryBucketStore {
    async fn get_bucket_tagging(&self, bucket: &str) -> ClientResult<TagSet> {
        self.read()
            .get(bucket)
            .cloned()
            .ok_or_else(|| ClientError::BucketNotFound(bucket.to_string()))
    }

    async fn list_buckets(&self) -> ClientResult<Vec<BucketSummary>> {
        Ok(self
            .read()
            .keys()
            .map(|name| BucketSummary {
                name: name.clone(),
                creation_date: None,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store_tagging() {
        let tags: TagSet = [("cs3.parent", "raw")].into_iter().collect();
        let store = MemoryBucketStore::new().with_bucket("logs-view", tags.clone());

        assert_eq!(store.get_bucket_tagging("logs-view").await.unwrap(), tags);

        let err = store.get_bucket_tagging("missing").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_memory_store_lists_in_name_order() {
        let store = MemoryBucketStore::new()
            .with_bucket("b-view", TagSet::new())
            .with_bucket("a-view", TagSet::new());
        store.remove("b-view");
        store.insert("c-view", TagSet::new());

        let names: Vec<String> = store
            .list_buckets()
            .await
            .unwrap()
            .into_iter()
            .map(|b| b.name)
            .collect();
        assert_eq!(names, vec!["a-view", "c-view"]);
    }

    #[tokio::test]
    async fn test_memory_store_recovers_from_poisoned_lock() {
        let store = MemoryBucketStore::new().with_bucket("a-view", TagSet::new());
        let poisoned = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = store.buckets.write().unwrap();
            panic!("writer died");
        }));
        assert!(poisoned.is_err());
        assert!(store.buckets.is_poisoned());

        store.insert("b-view", TagSet::new());
        store.remove("a-view");

        assert!(store.get_bucket_tagging("b-view").await.is_ok());
        assert!(store.get_bucket_tagging("a-view").await.unwrap_err().is_not_found());
        assert_eq!(store.list_buckets().await.unwrap().len(), 1);
    }
}
