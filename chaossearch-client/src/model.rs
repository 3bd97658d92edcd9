//! Request and response types for object-group operations

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::column_selection::ColumnSelection;

/// Everything known about an object group, assembled from bucket tags and
/// the dataset description
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectGroupAttributes {
    pub source_bucket: String,
    pub compression: String,
    pub live_events_sqs_arn: String,
    /// Dataset format type (e.g., "JSON", "CSV", "LOG")
    pub format: String,
    pub pattern: String,
    pub array_flatten_depth: Option<i64>,
    pub keep_original: bool,
    pub horizontal: bool,
    /// Filter predicate in the bare-pattern shape
    pub filter_json: String,
    pub index_retention: i64,
    pub partition_by: String,
    pub column_renames: BTreeMap<String, String>,
    pub column_selection: Vec<ColumnSelection>,
    pub column_types: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadObjectGroupRequest {
    pub id: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CreateObjectGroupRequest {
    pub name: String,
    pub source_bucket: String,
    pub format: String,
    pub pattern: String,
    pub compression: String,
    pub filter_json: String,
    pub live_events_sqs_arn: String,
    pub partition_by: String,
    pub index_retention: i64,
    pub array_flatten_depth: Option<i64>,
    pub keep_original: bool,
    pub horizontal: bool,
    pub column_renames: BTreeMap<String, String>,
    pub column_selection: Vec<ColumnSelection>,
    pub column_types: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateObjectGroupRequest {
    pub name: String,
    pub index_retention: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteObjectGroupRequest {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetActiveRequest {
    pub object_group_name: String,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadIndexingStateRequest {
    pub object_group_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexingState {
    pub object_group_name: String,
    pub active: bool,
}

/// A bucket as listed by the storage API
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketSummary {
    pub name: String,
    pub creation_date: Option<DateTime<Utc>>,
}
