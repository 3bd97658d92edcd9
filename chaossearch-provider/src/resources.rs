//! Resource type definitions for the ChaosSearch provider

use chaossearch_core::provider::ResourceType;
use chaossearch_core::schema::ResourceSchema;

use crate::schemas;

pub const OBJECT_GROUP: &str = "object_group";
pub const OBJECT_GROUPS: &str = "object_groups";

macro_rules! define_resource_type {
    ($name:ident, $type_name:expr, $schema:path) => {
        define_resource_type!($name, $type_name, $schema, false);
    };
    ($name:ident, $type_name:expr, $schema:path, $data_source:expr) => {
        pub struct $name;
        impl ResourceType for $name {
            fn name(&self) -> &'static str {
                $type_name
            }
            fn schema(&self) -> ResourceSchema {
                $schema()
            }
            fn is_data_source(&self) -> bool {
                $data_source
            }
        }
    };
}

define_resource_type!(ObjectGroupType, OBJECT_GROUP, schemas::object_group);
define_resource_type!(ObjectGroupsType, OBJECT_GROUPS, schemas::object_groups, true);

/// Returns all resource types supported by this provider
pub fn resource_types() -> Vec<Box<dyn ResourceType>> {
    vec![Box::new(ObjectGroupType), Box::new(ObjectGroupsType)]
}

/// Look up a resource type by name
pub fn find_resource_type(name: &str) -> Option<Box<dyn ResourceType>> {
    resource_types().into_iter().find(|t| t.name() == name)
}
