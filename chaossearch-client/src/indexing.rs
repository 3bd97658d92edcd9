//! Indexing activation of an object group

use serde::{Deserialize, Serialize};

use crate::client::Client;
use crate::error::{ClientError, ClientResult};
use crate::model::{IndexingState, ReadIndexingStateRequest, SetActiveRequest};

const MODEL_PATH: &str = "Bucket/model";
const METADATA_PATH: &str = "Bucket/metadata";

/// `ModelMode` of an indexing object group
const MODEL_MODE_ACTIVE: i64 = 0;
/// `ModelMode` of a paused object group
const MODEL_MODE_INACTIVE: i64 = -1;

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct ModelBody<'a> {
    bucket_name: &'a str,
    model_mode: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct MetadataBody<'a> {
    bucket_name: &'a str,
    stats: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct MetadataResponse {
    model_mode: Option<i64>,
}

pub(crate) fn model_mode(active: bool) -> i64 {
    if active {
        MODEL_MODE_ACTIVE
    } else {
        MODEL_MODE_INACTIVE
    }
}

impl Client {
    /// Start or pause indexing of an object group
    pub async fn set_active(&self, req: &SetActiveRequest) -> ClientResult<()> {
        let body = ModelBody {
            bucket_name: &req.object_group_name,
            model_mode: model_mode(req.active),
        };
        self.api
            .post(MODEL_PATH, &body)
            .await
            .map_err(|e| ClientError::object_group("set active state of", &req.object_group_name, e))?;
        log::info!(
            "Set object group {} {}",
            req.object_group_name,
            if req.active { "active" } else { "inactive" }
        );
        Ok(())
    }

    /// Whether an object group is currently indexing
    ///
    /// A response without `ModelMode` reads as inactive.
    pub async fn read_indexing_state(
        &self,
        req: &ReadIndexingStateRequest,
    ) -> ClientResult<IndexingState> {
        let body = MetadataBody {
            bucket_name: &req.object_group_name,
            stats: false,
        };
        let metadata: MetadataResponse = self
            .api
            .post_json(METADATA_PATH, &body)
            .await
            .map_err(|e| {
                ClientError::object_group("read indexing state of", &req.object_group_name, e)
            })?;

        Ok(IndexingState {
            object_group_name: req.object_group_name.clone(),
            active: metadata.model_mode == Some(MODEL_MODE_ACTIVE),
        })
    }
}
