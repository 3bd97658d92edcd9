//! Differ - Desired attributes against the state read back from the platform
//!
//! Only attributes the caller declared are compared; anything the platform
//! reports beyond them is not drift. Names starting with `_` are internal and
//! never compared.

use std::collections::HashMap;

use crate::resource::{Resource, ResourceId, State, Value};
use crate::schema::ResourceSchema;

/// One declared attribute whose observed value differs
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeChange {
    pub name: String,
    /// `None` when the platform did not report the attribute
    pub current: Option<Value>,
    pub desired: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Diff {
    /// Resource does not exist yet
    Create(Resource),
    /// Resource exists and some declared attributes drifted
    Update {
        id: ResourceId,
        changes: Vec<AttributeChange>,
    },
    NoChange(ResourceId),
}

impl Diff {
    pub fn is_change(&self) -> bool {
        !matches!(self, Diff::NoChange(_))
    }

    /// Names of drifted attributes, sorted
    pub fn changed_attributes(&self) -> Vec<&str> {
        match self {
            Diff::Update { changes, .. } => changes.iter().map(|c| c.name.as_str()).collect(),
            _ => Vec::new(),
        }
    }

    /// Drifted attributes the schema marks as force-new
    pub fn replacement_attributes(&self, schema: &ResourceSchema) -> Vec<&str> {
        self.changed_attributes()
            .into_iter()
            .filter(|name| schema.attributes.get(*name).is_some_and(|a| a.force_new))
            .collect()
    }

    pub fn requires_replacement(&self, schema: &ResourceSchema) -> bool {
        !self.replacement_attributes(schema).is_empty()
    }
}

pub fn diff(desired: &Resource, current: &State) -> Diff {
    if !current.exists {
        return Diff::Create(desired.clone());
    }

    let changes = attribute_changes(&desired.attributes, &current.attributes);
    if changes.is_empty() {
        Diff::NoChange(desired.id.clone())
    } else {
        Diff::Update {
            id: desired.id.clone(),
            changes,
        }
    }
}

/// Declared attributes whose current value is missing or different, by name
pub fn attribute_changes(
    desired: &HashMap<String, Value>,
    current: &HashMap<String, Value>,
) -> Vec<AttributeChange> {
    let mut changes: Vec<AttributeChange> = desired
        .iter()
        .filter(|(name, _)| !name.starts_with('_'))
        .filter(|(name, value)| current.get(*name) != Some(*value))
        .map(|(name, value)| AttributeChange {
            name: name.clone(),
            current: current.get(name).cloned(),
            desired: value.clone(),
        })
        .collect();
    changes.sort_by(|a, b| a.name.cmp(&b.name));
    changes
}

pub fn find_changed_attributes(
    desired: &HashMap<String, Value>,
    current: &HashMap<String, Value>,
) -> Vec<String> {
    attribute_changes(desired, current)
        .into_iter()
        .map(|c| c.name)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{AttributeSchema, AttributeType};

    fn id() -> ResourceId {
        ResourceId::new("object_group", "logs")
    }

    fn observed(pairs: &[(&str, Value)]) -> State {
        let attrs = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect();
        State::existing(id(), attrs)
    }

    #[test]
    fn missing_resource_is_created() {
        let desired = Resource::new("object_group", "logs");
        let result = diff(&desired, &State::not_found(id()));
        assert!(matches!(result, Diff::Create(_)));
        assert!(result.is_change());
        assert!(result.changed_attributes().is_empty());
    }

    #[test]
    fn extra_observed_attributes_are_not_drift() {
        let desired =
            Resource::new("object_group", "logs").with_attribute("index_retention", Value::Int(30));
        let current = observed(&[
            ("index_retention", Value::Int(30)),
            ("partition_by", Value::String("".to_string())),
        ]);
        assert_eq!(diff(&desired, &current), Diff::NoChange(id()));
    }

    #[test]
    fn changes_carry_both_values_and_skip_internal_names() {
        let desired = Resource::new("object_group", "logs")
            .with_attribute("index_retention", Value::Int(7))
            .with_attribute("active", Value::Bool(true))
            .with_attribute("_internal", Value::Bool(true));
        let current = observed(&[("index_retention", Value::Int(30))]);

        let Diff::Update { changes, .. } = diff(&desired, &current) else {
            panic!("expected an update");
        };
        assert_eq!(
            changes,
            vec![
                AttributeChange {
                    name: "active".to_string(),
                    current: None,
                    desired: Value::Bool(true),
                },
                AttributeChange {
                    name: "index_retention".to_string(),
                    current: Some(Value::Int(30)),
                    desired: Value::Int(7),
                },
            ]
        );
    }

    #[test]
    fn presence_of_map_key_is_a_change() {
        let mut with_include = HashMap::new();
        with_include.insert("type".to_string(), Value::String("whitelist".to_string()));
        with_include.insert("include".to_string(), Value::Bool(false));
        let mut without_include = with_include.clone();
        without_include.remove("include");

        let desired = Resource::new("object_group", "logs").with_attribute(
            "column_selection",
            Value::List(vec![Value::Map(with_include)]),
        );
        let current = observed(&[(
            "column_selection",
            Value::List(vec![Value::Map(without_include)]),
        )]);

        assert_eq!(
            diff(&desired, &current).changed_attributes(),
            vec!["column_selection"]
        );
    }

    #[test]
    fn replacement_only_for_force_new_changes() {
        let schema = ResourceSchema::new("object_group")
            .attribute(AttributeSchema::new("format", AttributeType::String).force_new())
            .attribute(AttributeSchema::new("index_retention", AttributeType::Int));
        let current = observed(&[
            ("format", Value::String("CSV".to_string())),
            ("index_retention", Value::Int(30)),
        ]);

        let retention_only = Resource::new("object_group", "logs")
            .with_attribute("format", Value::String("CSV".to_string()))
            .with_attribute("index_retention", Value::Int(7));
        assert!(!diff(&retention_only, &current).requires_replacement(&schema));

        let new_format = Resource::new("object_group", "logs")
            .with_attribute("format", Value::String("JSON".to_string()))
            .with_attribute("index_retention", Value::Int(7));
        assert_eq!(
            diff(&new_format, &current).replacement_attributes(&schema),
            vec!["format"]
        );
    }
}
