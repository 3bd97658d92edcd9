//! Schema - Attribute types and per-resource schemas
//!
//! Every attribute a caller sets is checked against the resource schema before
//! the provider talks to the platform. Errors name the attribute path
//! (`column_selection[1]`, `column_types.ts`) so they can be reported as-is.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use crate::resource::Value;

/// Extra check applied once the base type matched
pub type Constraint = fn(&Value) -> Result<(), String>;

#[derive(Debug, Clone)]
pub enum AttributeType {
    String,
    Int,
    Bool,
    /// Any map value
    Object,
    List(Box<AttributeType>),
    Map(Box<AttributeType>),
    /// Base type narrowed by a constraint
    Constrained {
        name: &'static str,
        base: Box<AttributeType>,
        check: Constraint,
    },
}

impl AttributeType {
    pub fn list_of(inner: AttributeType) -> Self {
        AttributeType::List(Box::new(inner))
    }

    pub fn map_of(inner: AttributeType) -> Self {
        AttributeType::Map(Box::new(inner))
    }

    /// Check a value, collecting every problem under `path`
    pub fn check(&self, path: &str, value: &Value) -> Result<(), Vec<SchemaError>> {
        let mut errors = Vec::new();
        self.check_into(path, value, &mut errors);
        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }

    fn check_into(&self, path: &str, value: &Value, errors: &mut Vec<SchemaError>) {
        match (self, value) {
            (AttributeType::String, Value::String(_))
            | (AttributeType::Int, Value::Int(_))
            | (AttributeType::Bool, Value::Bool(_))
            | (AttributeType::Object, Value::Map(_)) => {}
            (AttributeType::List(inner), Value::List(items)) => {
                for (i, item) in items.iter().enumerate() {
                    inner.check_into(&format!("{}[{}]", path, i), item, errors);
                }
            }
            (AttributeType::Map(inner), Value::Map(entries)) => {
                // Sorted so errors come out in a stable order
                let mut keys: Vec<&String> = entries.keys().collect();
                keys.sort();
                for key in keys {
                    inner.check_into(&format!("{}.{}", path, key), &entries[key], errors);
                }
            }
            (AttributeType::Constrained { base, check, .. }, v) => {
                let before = errors.len();
                base.check_into(path, v, errors);
                if errors.len() == before
                    && let Err(message) = check(v)
                {
                    errors.push(SchemaError::Constraint {
                        path: path.to_string(),
                        message,
                    });
                }
            }
            _ => errors.push(SchemaError::WrongType {
                path: path.to_string(),
                expected: self.to_string(),
                got: kind_of(value),
            }),
        }
    }
}

impl fmt::Display for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeType::String => f.write_str("a string"),
            AttributeType::Int => f.write_str("an integer"),
            AttributeType::Bool => f.write_str("a boolean"),
            AttributeType::Object => f.write_str("an object"),
            AttributeType::List(inner) => write!(f, "a list of {}", Plural(inner)),
            AttributeType::Map(inner) => write!(f, "a map of {}", Plural(inner)),
            AttributeType::Constrained { name, .. } => f.write_str(name),
        }
    }
}

/// Element type in list/map descriptions ("a list of strings")
struct Plural<'a>(&'a AttributeType);

impl fmt::Display for Plural<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            AttributeType::String => f.write_str("strings"),
            AttributeType::Int => f.write_str("integers"),
            AttributeType::Bool => f.write_str("booleans"),
            AttributeType::Object => f.write_str("objects"),
            other => write!(f, "({})", other),
        }
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::String(_) => "a string",
        Value::Int(_) => "an integer",
        Value::Bool(_) => "a boolean",
        Value::List(_) => "a list",
        Value::Map(_) => "a map",
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    #[error("'{path}' must be {expected}, got {got}")]
    WrongType {
        path: String,
        expected: String,
        got: &'static str,
    },

    #[error("'{path}' {message}")]
    Constraint { path: String, message: String },

    #[error("Required attribute '{name}' is missing")]
    Missing { name: String },

    #[error("'{name}' is set by the platform and cannot be given")]
    Computed { name: String },

    #[error("Unknown attribute '{name}'")]
    Unknown { name: String },
}

#[derive(Debug, Clone)]
pub struct AttributeSchema {
    pub name: String,
    pub attr_type: AttributeType,
    pub required: bool,
    /// Set by the platform, never by the caller
    pub computed: bool,
    /// Changing this attribute requires replacing the resource
    pub force_new: bool,
    pub default: Option<Value>,
    pub description: Option<String>,
}

impl AttributeSchema {
    pub fn new(name: impl Into<String>, attr_type: AttributeType) -> Self {
        Self {
            name: name.into(),
            attr_type,
            required: false,
            computed: false,
            force_new: false,
            default: None,
            description: None,
        }
    }

    pub fn required(self) -> Self {
        Self {
            required: true,
            ..self
        }
    }

    pub fn computed(self) -> Self {
        Self {
            computed: true,
            ..self
        }
    }

    pub fn force_new(self) -> Self {
        Self {
            force_new: true,
            ..self
        }
    }

    pub fn with_default(self, value: Value) -> Self {
        Self {
            default: Some(value),
            ..self
        }
    }

    pub fn with_description(self, description: impl Into<String>) -> Self {
        Self {
            description: Some(description.into()),
            ..self
        }
    }
}

/// Attributes of one resource type, keyed by name
#[derive(Debug, Clone)]
pub struct ResourceSchema {
    pub resource_type: String,
    pub attributes: BTreeMap<String, AttributeSchema>,
    pub description: Option<String>,
}

impl ResourceSchema {
    pub fn new(resource_type: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            attributes: BTreeMap::new(),
            description: None,
        }
    }

    pub fn attribute(mut self, attribute: AttributeSchema) -> Self {
        self.attributes.insert(attribute.name.clone(), attribute);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Names of attributes that cannot be changed in place, sorted
    pub fn force_new_attributes(&self) -> Vec<&str> {
        self.attributes
            .values()
            .filter(|a| a.force_new)
            .map(|a| a.name.as_str())
            .collect()
    }

    /// Check caller-supplied attributes
    ///
    /// Reports every problem at once: missing required attributes, values of
    /// the wrong type, computed attributes that were given, and names the
    /// schema does not know.
    pub fn validate(&self, attributes: &HashMap<String, Value>) -> Result<(), Vec<SchemaError>> {
        let mut errors = Vec::new();

        for (name, attribute) in &self.attributes {
            match attributes.get(name) {
                Some(_) if attribute.computed => {
                    errors.push(SchemaError::Computed { name: name.clone() });
                }
                Some(value) => attribute.attr_type.check_into(name, value, &mut errors),
                None if attribute.required && attribute.default.is_none() => {
                    errors.push(SchemaError::Missing { name: name.clone() });
                }
                None => {}
            }
        }

        let mut unknown: Vec<&String> = attributes
            .keys()
            .filter(|name| !self.attributes.contains_key(*name))
            .collect();
        unknown.sort();
        errors.extend(
            unknown
                .into_iter()
                .map(|name| SchemaError::Unknown { name: name.clone() }),
        );

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

/// Constrained types shared by provider schemas
pub mod types {
    use super::*;

    pub fn non_negative_int() -> AttributeType {
        AttributeType::Constrained {
            name: "a non-negative integer",
            base: Box::new(AttributeType::Int),
            check: |value| match value {
                Value::Int(n) if *n < 0 => Err(format!("must not be negative, got {}", n)),
                _ => Ok(()),
            },
        }
    }

    /// String holding a JSON object
    ///
    /// Only the outer braces are checked here; decoding happens where the
    /// document is used.
    pub fn json_object_string() -> AttributeType {
        AttributeType::Constrained {
            name: "a JSON object string",
            base: Box::new(AttributeType::String),
            check: |value| match value.as_str().map(str::trim) {
                Some(s) if s.starts_with('{') && s.ends_with('}') => Ok(()),
                _ => Err("must hold a JSON object".to_string()),
            },
        }
    }
}
