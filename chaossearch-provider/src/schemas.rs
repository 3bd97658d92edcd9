//! Attribute schemas for ChaosSearch resources

use chaossearch_core::resource::Value;
use chaossearch_core::schema::{AttributeSchema, AttributeType, ResourceSchema, types};

/// Attributes of `object_group` that can change in place
pub const IN_PLACE_ATTRIBUTES: &[&str] = &["index_retention", "active"];

pub fn object_group() -> ResourceSchema {
    ResourceSchema::new("object_group")
        .with_description("A ChaosSearch object group: an indexed view over a source bucket")
        .attribute(
            AttributeSchema::new("source_bucket", AttributeType::String)
                .required()
                .force_new()
                .with_description("Bucket holding the raw objects"),
        )
        .attribute(
            AttributeSchema::new("format", AttributeType::String)
                .required()
                .force_new()
                .with_description("Dataset format type (e.g., JSON, CSV, LOG)"),
        )
        .attribute(AttributeSchema::new("pattern", AttributeType::String).force_new())
        .attribute(AttributeSchema::new("compression", AttributeType::String).force_new())
        .attribute(
            AttributeSchema::new("filter_json", types::json_object_string())
                .force_new()
                .with_description("Object key filter, e.g. {\"AND\":[{\"field\":\"key\",\"regex\":\".*\"}]}"),
        )
        .attribute(AttributeSchema::new("live_events_sqs_arn", AttributeType::String).force_new())
        .attribute(AttributeSchema::new("partition_by", AttributeType::String).force_new())
        .attribute(
            AttributeSchema::new("index_retention", types::non_negative_int())
                .with_default(Value::Int(0))
                .with_description("Days to keep indexed data"),
        )
        .attribute(AttributeSchema::new("array_flatten_depth", AttributeType::Int).force_new())
        .attribute(
            AttributeSchema::new("keep_original", AttributeType::Bool)
                .force_new()
                .with_default(Value::Bool(false)),
        )
        .attribute(
            AttributeSchema::new("horizontal", AttributeType::Bool)
                .force_new()
                .with_default(Value::Bool(false)),
        )
        .attribute(
            AttributeSchema::new("column_renames", AttributeType::map_of(AttributeType::String))
                .force_new(),
        )
        .attribute(
            AttributeSchema::new("column_selection", AttributeType::list_of(AttributeType::Object))
                .force_new()
                .with_description("Selection entries such as {type = \"whitelist\", fields = [...], include = true}"),
        )
        .attribute(
            AttributeSchema::new("column_types", AttributeType::map_of(AttributeType::String))
                .force_new(),
        )
        .attribute(
            AttributeSchema::new("active", AttributeType::Bool)
                .with_description("Whether the object group is indexing"),
        )
}

pub fn object_groups() -> ResourceSchema {
    ResourceSchema::new("object_groups")
        .with_description("Object groups visible to the configured credentials")
        .attribute(
            AttributeSchema::new("object_groups", AttributeType::list_of(AttributeType::Object))
                .computed()
                .with_description("Entries with `name` and, when known, `creation_date`"),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn only_retention_and_active_update_in_place() {
        let schema = object_group();
        for (name, attr) in &schema.attributes {
            assert_eq!(
                attr.force_new,
                !IN_PLACE_ATTRIBUTES.contains(&name.as_str()),
                "{}",
                name
            );
        }
    }

    #[test]
    fn source_and_format_are_required() {
        let errors = object_group().validate(&HashMap::new()).unwrap_err();
        let mut missing: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
        missing.sort();
        assert_eq!(missing.len(), 2);
        assert!(missing[0].contains("format"));
        assert!(missing[1].contains("source_bucket"));
    }

    #[test]
    fn rejects_negative_retention_and_non_object_filter() {
        let attributes: HashMap<String, Value> = [
            ("source_bucket".to_string(), Value::String("raw".to_string())),
            ("format".to_string(), Value::String("JSON".to_string())),
            ("index_retention".to_string(), Value::Int(-1)),
            ("filter_json".to_string(), Value::String("[1]".to_string())),
        ]
        .into_iter()
        .collect();
        let errors = object_group().validate(&attributes).unwrap_err();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn data_source_attribute_is_computed() {
        let schema = object_groups();
        assert!(schema.attributes["object_groups"].computed);
        assert!(schema.force_new_attributes().is_empty());
    }
}
