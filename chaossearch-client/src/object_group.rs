//! Object-group lifecycle operations

use std::collections::BTreeMap;

use serde::Serialize;

use crate::assembler::assemble;
use crate::client::Client;
use crate::column_selection::ColumnSelection;
use crate::dataset::DatasetDescription;
use crate::error::{ClientError, ClientResult};
use crate::model::{
    BucketSummary, CreateObjectGroupRequest, DeleteObjectGroupRequest, ObjectGroupAttributes,
    ReadObjectGroupRequest, UpdateObjectGroupRequest,
};

const CREATE_PATH: &str = "Bucket/createObjectGroup";
const UPDATE_PATH: &str = "Bucket/updateObjectGroup";
const DELETE_PATH: &str = "Bucket/deleteObjectGroup";

#[derive(Debug, Serialize)]
struct CreateBody<'a> {
    bucket: &'a str,
    source: &'a str,
    format: FormatBody<'a>,
    #[serde(rename = "indexRetention")]
    index_retention: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    filter: Option<serde_json::Value>,
    options: OptionsBody<'a>,
    #[serde(rename = "partitionBy", skip_serializing_if = "Option::is_none")]
    partition_by: Option<&'a str>,
    realtime: bool,
    #[serde(rename = "liveEvents", skip_serializing_if = "Option::is_none")]
    live_events: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct FormatBody<'a> {
    #[serde(rename = "_type")]
    format_type: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pattern: Option<&'a str>,
    #[serde(rename = "arrayFlattenDepth", skip_serializing_if = "Option::is_none")]
    array_flatten_depth: Option<i64>,
    #[serde(rename = "keepOriginal")]
    keep_original: bool,
    horizontal: bool,
    #[serde(rename = "stripPrefix")]
    strip_prefix: bool,
}

#[derive(Debug, Serialize)]
struct OptionsBody<'a> {
    #[serde(rename = "ignoreIrregular")]
    ignore_irregular: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    compression: Option<&'a str>,
    #[serde(rename = "colRenames", skip_serializing_if = "Option::is_none")]
    column_renames: Option<&'a BTreeMap<String, String>>,
    #[serde(rename = "colSelection", skip_serializing_if = "Option::is_none")]
    column_selection: Option<&'a [ColumnSelection]>,
    #[serde(rename = "colTypes", skip_serializing_if = "Option::is_none")]
    column_types: Option<&'a BTreeMap<String, String>>,
}

#[derive(Debug, Serialize)]
struct UpdateBody<'a> {
    bucket: &'a str,
    #[serde(rename = "indexRetention")]
    index_retention: i64,
}

#[derive(Debug, Serialize)]
struct DeleteBody<'a> {
    bucket: &'a str,
}

fn non_empty(s: &str) -> Option<&str> {
    if s.is_empty() { None } else { Some(s) }
}

fn non_empty_map(map: &BTreeMap<String, String>) -> Option<&BTreeMap<String, String>> {
    if map.is_empty() { None } else { Some(map) }
}

impl<'a> CreateBody<'a> {
    fn from_request(req: &'a CreateObjectGroupRequest) -> ClientResult<Self> {
        let filter = match non_empty(&req.filter_json) {
            Some(raw) => Some(
                serde_json::from_str(raw).map_err(|e| ClientError::decode("filter_json", e))?,
            ),
            None => None,
        };
        let live_events = non_empty(&req.live_events_sqs_arn);

        Ok(Self {
            bucket: &req.name,
            source: &req.source_bucket,
            format: FormatBody {
                format_type: &req.format,
                pattern: non_empty(&req.pattern),
                array_flatten_depth: req.array_flatten_depth,
                keep_original: req.keep_original,
                horizontal: req.horizontal,
                strip_prefix: true,
            },
            index_retention: req.index_retention,
            filter,
            options: OptionsBody {
                ignore_irregular: true,
                compression: non_empty(&req.compression),
                column_renames: non_empty_map(&req.column_renames),
                column_selection: if req.column_selection.is_empty() {
                    None
                } else {
                    Some(req.column_selection.as_slice())
                },
                column_types: non_empty_map(&req.column_types),
            },
            partition_by: non_empty(&req.partition_by),
            realtime: live_events.is_some(),
            live_events,
        })
    }
}

impl Client {
    pub async fn create_object_group(&self, req: &CreateObjectGroupRequest) -> ClientResult<()> {
        let create = async {
            let body = CreateBody::from_request(req)?;
            self.api.post(CREATE_PATH, &body).await?;
            Ok::<(), ClientError>(())
        };
        create
            .await
            .map_err(|e| ClientError::object_group("create", &req.name, e))?;
        log::info!("Created object group {}", req.name);
        Ok(())
    }

    /// Assemble an object group from its bucket tags and dataset description
    ///
    /// The tag fetch and dataset fetch run one after the other; the first
    /// failure aborts the read with no partial result.
    pub async fn read_object_group(
        &self,
        req: &ReadObjectGroupRequest,
    ) -> ClientResult<ObjectGroupAttributes> {
        let read = async {
            let tags = self.store.get_bucket_tagging(&req.id).await?;
            let dataset: DatasetDescription = self
                .api
                .get_json_at(&["Bucket", "dataset", "name", req.id.as_str()])
                .await?;
            assemble(&tags, dataset)
        };
        let attrs = read
            .await
            .map_err(|e| ClientError::object_group("read", &req.id, e))?;
        log::debug!("Read object group {}: {:?}", req.id, attrs);
        Ok(attrs)
    }

    pub async fn update_object_group(&self, req: &UpdateObjectGroupRequest) -> ClientResult<()> {
        let body = UpdateBody {
            bucket: &req.name,
            index_retention: req.index_retention,
        };
        self.api
            .post(UPDATE_PATH, &body)
            .await
            .map_err(|e| ClientError::object_group("update", &req.name, e))?;
        log::info!("Updated object group {}", req.name);
        Ok(())
    }

    pub async fn delete_object_group(&self, req: &DeleteObjectGroupRequest) -> ClientResult<()> {
        self.api
            .post(DELETE_PATH, &DeleteBody { bucket: &req.name })
            .await
            .map_err(|e| ClientError::object_group("delete", &req.name, e))?;
        log::info!("Deleted object group {}", req.name);
        Ok(())
    }

    /// Buckets visible through the storage API
    pub async fn list_object_groups(&self) -> ClientResult<Vec<BucketSummary>> {
        self.store.list_buckets().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::config::Configuration;
    use crate::store::MemoryBucketStore;
    use crate::tagging::TagSet;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer, store: MemoryBucketStore) -> Client {
        let config = Configuration::new(server.uri(), "AKID", "SECRET", "eu-west-1");
        Client::with_store(config, Arc::new(store)).unwrap()
    }

    fn view_tags() -> TagSet {
        [
            ("cs3.parent", "raw-logs"),
            (
                "cs3.predicate",
                r#"{"AND":[{"field":"key","regex":{"pattern":".*","strict":true}}]}"#,
            ),
            ("cs3.index-retention", r#"{"overall": 30}"#),
            ("cs3.dataset-format", r#"{"_type":"JSON","horizontal":true}"#),
        ]
        .into_iter()
        .collect()
    }

    #[tokio::test]
    async fn test_read_encodes_group_name_in_dataset_path() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/Bucket/dataset/name/odd%3Fview%23x"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"options": {}})))
            .expect(1)
            .mount(&server)
            .await;

        let store = MemoryBucketStore::new().with_bucket("odd?view#x", view_tags());
        let attrs = client(&server, store)
            .read_object_group(&ReadObjectGroupRequest {
                id: "odd?view#x".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(attrs.source_bucket, "raw-logs");
    }

    #[tokio::test]
    async fn test_read_object_group_end_to_end() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/Bucket/dataset/name/logs-view"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "partitionBy": "host",
                "options": {
                    "colRenames": {"ts": "timestamp"},
                    "colSelection": [{"type": "whitelist", "fields": ["timestamp", "host"]}],
                    "colTypes": {"timestamp": "Timeval"}
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let store = MemoryBucketStore::new().with_bucket("logs-view", view_tags());
        let attrs = client(&server, store)
            .read_object_group(&ReadObjectGroupRequest {
                id: "logs-view".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(attrs.source_bucket, "raw-logs");
        assert_eq!(attrs.filter_json, r#"{"AND":[{"field":"key","regex":".*"}]}"#);
        assert_eq!(attrs.index_retention, 30);
        assert_eq!(attrs.format, "JSON");
        assert_eq!(attrs.partition_by, "host");
        assert_eq!(attrs.column_selection[0].include(), Some(false));
        assert_eq!(attrs.column_selection[0].fields(), vec!["timestamp", "host"]);
    }

    #[tokio::test]
    async fn test_read_missing_bucket_is_not_found() {
        let server = MockServer::start().await;
        let err = client(&server, MemoryBucketStore::new())
            .read_object_group(&ReadObjectGroupRequest {
                id: "gone".to_string(),
            })
            .await
            .unwrap_err();
        assert!(err.is_not_found());
        assert!(err.to_string().starts_with("Failed to read object group gone"));
    }

    #[tokio::test]
    async fn test_dataset_status_error_aborts_read() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/Bucket/dataset/name/logs-view"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let store = MemoryBucketStore::new().with_bucket("logs-view", view_tags());
        let err = client(&server, store)
            .read_object_group(&ReadObjectGroupRequest {
                id: "logs-view".to_string(),
            })
            .await
            .unwrap_err();
        assert!(err.is_transport());
        assert!(err.to_string().contains("boom"));
    }

    #[tokio::test]
    async fn test_dataset_decode_error_aborts_read() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/Bucket/dataset/name/logs-view"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let store = MemoryBucketStore::new().with_bucket("logs-view", view_tags());
        let err = client(&server, store)
            .read_object_group(&ReadObjectGroupRequest {
                id: "logs-view".to_string(),
            })
            .await
            .unwrap_err();
        assert!(err.is_decode());
    }

    #[tokio::test]
    async fn test_create_object_group_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/Bucket/createObjectGroup"))
            .and(body_json(json!({
                "bucket": "logs-view",
                "source": "raw-logs",
                "format": {
                    "_type": "JSON",
                    "arrayFlattenDepth": -1,
                    "keepOriginal": false,
                    "horizontal": true,
                    "stripPrefix": true
                },
                "indexRetention": 14,
                "filter": {"AND": [{"field": "key", "regex": ".*\\.json"}]},
                "options": {
                    "ignoreIrregular": true,
                    "compression": "GZIP",
                    "colSelection": [{"type": "whitelist", "fields": ["host"], "include": true}]
                },
                "realtime": true,
                "liveEvents": "arn:aws:sqs:eu-west-1:123456789012:events"
            })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let mut selection = ColumnSelection::whitelist(["host"]);
        selection.set_include(true);
        let req = CreateObjectGroupRequest {
            name: "logs-view".to_string(),
            source_bucket: "raw-logs".to_string(),
            format: "JSON".to_string(),
            compression: "GZIP".to_string(),
            filter_json: r#"{"AND":[{"field":"key","regex":".*\\.json"}]}"#.to_string(),
            live_events_sqs_arn: "arn:aws:sqs:eu-west-1:123456789012:events".to_string(),
            index_retention: 14,
            array_flatten_depth: Some(-1),
            horizontal: true,
            column_selection: vec![selection],
            ..Default::default()
        };

        client(&server, MemoryBucketStore::new())
            .create_object_group(&req)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_create_with_invalid_filter_sends_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let req = CreateObjectGroupRequest {
            name: "logs-view".to_string(),
            filter_json: "{AND".to_string(),
            ..Default::default()
        };
        let err = client(&server, MemoryBucketStore::new())
            .create_object_group(&req)
            .await
            .unwrap_err();
        assert!(err.is_decode());
    }

    #[tokio::test]
    async fn test_update_and_delete_bodies() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/Bucket/updateObjectGroup"))
            .and(body_json(json!({"bucket": "logs-view", "indexRetention": 7})))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/Bucket/deleteObjectGroup"))
            .and(body_json(json!({"bucket": "logs-view"})))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let client = client(&server, MemoryBucketStore::new());
        client
            .update_object_group(&UpdateObjectGroupRequest {
                name: "logs-view".to_string(),
                index_retention: 7,
            })
            .await
            .unwrap();
        client
            .delete_object_group(&DeleteObjectGroupRequest {
                name: "logs-view".to_string(),
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_list_object_groups() {
        let server = MockServer::start().await;
        let store = MemoryBucketStore::new()
            .with_bucket("a-view", TagSet::new())
            .with_bucket("b-view", TagSet::new());
        let buckets = client(&server, store).list_object_groups().await.unwrap();
        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets[0].name, "a-view");
    }
}
