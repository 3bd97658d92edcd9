//! Dataset description returned by `GET /Bucket/dataset/name/{id}`

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::column_selection::{ColumnSelection, normalize_column_selection};
use crate::model::ObjectGroupAttributes;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct DatasetDescription {
    #[serde(rename = "partitionBy")]
    pub partition_by: Option<String>,
    pub options: DatasetOptions,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct DatasetOptions {
    #[serde(rename = "colRenames")]
    pub column_renames: Option<BTreeMap<String, String>>,
    #[serde(rename = "colSelection")]
    pub column_selection: Option<Vec<ColumnSelection>>,
    #[serde(rename = "colTypes")]
    pub column_types: Option<BTreeMap<String, String>>,
}

impl DatasetDescription {
    /// Copy the dataset-derived attributes into `attrs`
    ///
    /// Fields the API left out keep their current value. The column selection
    /// is normalized on the way in.
    pub fn apply_to(self, attrs: &mut ObjectGroupAttributes) {
        if let Some(partition_by) = self.partition_by {
            attrs.partition_by = partition_by;
        }
        if let Some(renames) = self.options.column_renames {
            attrs.column_renames = renames;
        }
        if let Some(mut selection) = self.options.column_selection {
            normalize_column_selection(&mut selection);
            attrs.column_selection = selection;
        }
        if let Some(types) = self.options.column_types {
            attrs.column_types = types;
        }
    }
}
