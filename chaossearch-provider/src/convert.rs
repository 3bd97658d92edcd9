//! Conversion between resource attribute values and client models

use std::collections::{BTreeMap, HashMap};

use chaossearch_client::{
    BucketSummary, ColumnSelection, CreateObjectGroupRequest, ObjectGroupAttributes,
};
use chaossearch_core::provider::{ProviderError, ProviderResult};
use chaossearch_core::resource::{Resource, Value};

/// Convert a JSON value to an attribute value
///
/// `null` has no attribute form and is dropped, both on its own and inside
/// lists and objects. Numbers that are not integers are kept as their decimal
/// text.
pub fn json_to_value(value: &serde_json::Value) -> Option<Value> {
    match value {
        serde_json::Value::String(s) => Some(Value::String(s.clone())),
        serde_json::Value::Bool(b) => Some(Value::Bool(*b)),
        serde_json::Value::Number(n) => Some(match n.as_i64() {
            Some(i) => Value::Int(i),
            None => Value::String(n.to_string()),
        }),
        serde_json::Value::Array(arr) => {
            Some(Value::List(arr.iter().filter_map(json_to_value).collect()))
        }
        serde_json::Value::Object(map) => Some(Value::Map(
            map.iter()
                .filter_map(|(k, v)| json_to_value(v).map(|v| (k.clone(), v)))
                .collect(),
        )),
        serde_json::Value::Null => None,
    }
}

/// Convert an attribute value to JSON
pub fn value_to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::String(s) => serde_json::Value::String(s.clone()),
        Value::Int(i) => serde_json::Value::from(*i),
        Value::Bool(b) => serde_json::Value::Bool(*b),
        Value::List(items) => serde_json::Value::Array(items.iter().map(value_to_json).collect()),
        Value::Map(map) => serde_json::Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), value_to_json(v)))
                .collect(),
        ),
    }
}

/// Compact JSON text with object keys sorted
///
/// Text that does not parse is returned as given.
pub fn canonical_json_text(text: &str) -> String {
    match serde_json::from_str::<serde_json::Value>(text) {
        Ok(value) => sort_keys(value).to_string(),
        Err(_) => text.to_string(),
    }
}

fn sort_keys(value: serde_json::Value) -> serde_json::Value {
    match value {
        serde_json::Value::Object(map) => {
            let mut entries: Vec<(String, serde_json::Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            serde_json::Value::Object(
                entries
                    .into_iter()
                    .map(|(k, v)| (k, sort_keys(v)))
                    .collect(),
            )
        }
        serde_json::Value::Array(items) => {
            serde_json::Value::Array(items.into_iter().map(sort_keys).collect())
        }
        other => other,
    }
}

/// Copy of `attributes` with JSON-text attributes in canonical form
///
/// `filter_json` is compared by document, not by spelling.
pub fn canonical_attributes(attributes: &HashMap<String, Value>) -> HashMap<String, Value> {
    let mut attributes = attributes.clone();
    if let Some(Value::String(text)) = attributes.get_mut("filter_json") {
        *text = canonical_json_text(text);
    }
    attributes
}

fn string_map_to_value(map: &BTreeMap<String, String>) -> Value {
    Value::Map(
        map.iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect(),
    )
}

/// Attribute view of an assembled object group
///
/// Empty strings, maps and lists are left out so that an attribute the caller
/// never set does not show up as drift.
pub fn object_group_attributes(
    attrs: &ObjectGroupAttributes,
    active: bool,
) -> HashMap<String, Value> {
    let mut attributes = HashMap::new();

    for (name, value) in [
        ("source_bucket", &attrs.source_bucket),
        ("format", &attrs.format),
        ("pattern", &attrs.pattern),
        ("compression", &attrs.compression),
        ("live_events_sqs_arn", &attrs.live_events_sqs_arn),
        ("partition_by", &attrs.partition_by),
    ] {
        if !value.is_empty() {
            attributes.insert(name.to_string(), Value::String(value.clone()));
        }
    }
    if !attrs.filter_json.is_empty() {
        attributes.insert(
            "filter_json".to_string(),
            Value::String(canonical_json_text(&attrs.filter_json)),
        );
    }

    attributes.insert(
        "index_retention".to_string(),
        Value::Int(attrs.index_retention),
    );
    if let Some(depth) = attrs.array_flatten_depth {
        attributes.insert("array_flatten_depth".to_string(), Value::Int(depth));
    }
    attributes.insert(
        "keep_original".to_string(),
        Value::Bool(attrs.keep_original),
    );
    attributes.insert("horizontal".to_string(), Value::Bool(attrs.horizontal));

    if !attrs.column_renames.is_empty() {
        attributes.insert(
            "column_renames".to_string(),
            string_map_to_value(&attrs.column_renames),
        );
    }
    if !attrs.column_types.is_empty() {
        attributes.insert(
            "column_types".to_string(),
            string_map_to_value(&attrs.column_types),
        );
    }
    if !attrs.column_selection.is_empty() {
        let entries = attrs
            .column_selection
            .iter()
            .filter_map(|entry| {
                json_to_value(&serde_json::Value::Object(entry.as_map().clone()))
            })
            .collect();
        attributes.insert("column_selection".to_string(), Value::List(entries));
    }

    attributes.insert("active".to_string(), Value::Bool(active));
    attributes
}

fn invalid(resource: &Resource, name: &str, expected: &str) -> ProviderError {
    ProviderError::validation(format!("Attribute '{}' must be {}", name, expected))
        .for_resource(resource.id.clone())
}

fn get_string_map(resource: &Resource, name: &str) -> ProviderResult<BTreeMap<String, String>> {
    match resource.attributes.get(name) {
        None => Ok(BTreeMap::new()),
        Some(Value::Map(map)) => map
            .iter()
            .map(|(k, v)| match v {
                Value::String(s) => Ok((k.clone(), s.clone())),
                _ => Err(invalid(resource, name, "a map of strings")),
            })
            .collect(),
        Some(_) => Err(invalid(resource, name, "a map of strings")),
    }
}

fn get_column_selection(resource: &Resource) -> ProviderResult<Vec<ColumnSelection>> {
    match resource.attributes.get("column_selection") {
        None => Ok(Vec::new()),
        Some(Value::List(items)) => items
            .iter()
            .map(|item| match value_to_json(item) {
                serde_json::Value::Object(map) => Ok(ColumnSelection::from_map(map)),
                _ => Err(invalid(resource, "column_selection", "a list of objects")),
            })
            .collect(),
        Some(_) => Err(invalid(resource, "column_selection", "a list of objects")),
    }
}

/// Build the create request for an `object_group` resource
///
/// The resource name is the object group (bucket) name.
pub fn create_request(resource: &Resource) -> ProviderResult<CreateObjectGroupRequest> {
    let string = |name: &str| resource.get_string(name).unwrap_or_default().to_string();

    Ok(CreateObjectGroupRequest {
        name: resource.id.name.clone(),
        source_bucket: string("source_bucket"),
        format: string("format"),
        pattern: string("pattern"),
        compression: string("compression"),
        filter_json: string("filter_json"),
        live_events_sqs_arn: string("live_events_sqs_arn"),
        partition_by: string("partition_by"),
        index_retention: resource.get_int("index_retention").unwrap_or(0),
        array_flatten_depth: resource.get_int("array_flatten_depth"),
        keep_original: resource.get_bool("keep_original").unwrap_or(false),
        horizontal: resource.get_bool("horizontal").unwrap_or(false),
        column_renames: get_string_map(resource, "column_renames")?,
        column_selection: get_column_selection(resource)?,
        column_types: get_string_map(resource, "column_types")?,
    })
}

/// Attribute view of the bucket listing
pub fn object_groups_attributes(buckets: &[BucketSummary]) -> HashMap<String, Value> {
    let entries = buckets
        .iter()
        .map(|bucket| {
            let mut entry = HashMap::new();
            entry.insert("name".to_string(), Value::String(bucket.name.clone()));
            if let Some(created) = bucket.creation_date {
                entry.insert(
                    "creation_date".to_string(),
                    Value::String(created.to_rfc3339()),
                );
            }
            Value::Map(entry)
        })
        .collect();

    let mut attributes = HashMap::new();
    attributes.insert("object_groups".to_string(), Value::List(entries));
    attributes
}
