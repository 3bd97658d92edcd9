//! Column selection entries
//!
//! The API describes column selection as a list of loosely-typed objects
//! (`{"type": "whitelist", "fields": [...], "include": true}` and variants).
//! Entries are kept as JSON objects so unknown keys survive a round trip, with
//! typed accessors for the keys this crate interprets.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Selection mode named by the `type` key
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionType {
    Whitelist,
    Blacklist,
    Regex,
    Other(String),
}

impl SelectionType {
    pub fn as_str(&self) -> &str {
        match self {
            SelectionType::Whitelist => "whitelist",
            SelectionType::Blacklist => "blacklist",
            SelectionType::Regex => "regex",
            SelectionType::Other(s) => s.as_str(),
        }
    }
}

impl From<&str> for SelectionType {
    fn from(s: &str) -> Self {
        match s {
            "whitelist" => SelectionType::Whitelist,
            "blacklist" => SelectionType::Blacklist,
            "regex" => SelectionType::Regex,
            other => SelectionType::Other(other.to_string()),
        }
    }
}

/// One column selection entry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnSelection(Map<String, Value>);

impl ColumnSelection {
    pub fn new(selection_type: SelectionType) -> Self {
        let mut map = Map::new();
        map.insert(
            "type".to_string(),
            Value::String(selection_type.as_str().to_string()),
        );
        Self(map)
    }

    pub fn whitelist<S: Into<String>>(fields: impl IntoIterator<Item = S>) -> Self {
        Self::new(SelectionType::Whitelist).with_strings("fields", fields)
    }

    pub fn blacklist<S: Into<String>>(fields: impl IntoIterator<Item = S>) -> Self {
        Self::new(SelectionType::Blacklist).with_strings("fields", fields)
    }

    pub fn regex<S: Into<String>>(patterns: impl IntoIterator<Item = S>, include: bool) -> Self {
        let mut selection = Self::new(SelectionType::Regex).with_strings("patterns", patterns);
        selection.set_include(include);
        selection
    }

    pub fn from_map(map: Map<String, Value>) -> Self {
        Self(map)
    }

    fn with_strings<S: Into<String>>(
        mut self,
        key: &str,
        values: impl IntoIterator<Item = S>,
    ) -> Self {
        let values = values
            .into_iter()
            .map(|v| Value::String(v.into()))
            .collect();
        self.0.insert(key.to_string(), Value::Array(values));
        self
    }

    pub fn selection_type(&self) -> Option<SelectionType> {
        self.0
            .get("type")
            .and_then(Value::as_str)
            .map(SelectionType::from)
    }

    pub fn fields(&self) -> Vec<&str> {
        self.strings("fields")
    }

    pub fn patterns(&self) -> Vec<&str> {
        self.strings("patterns")
    }

    fn strings(&self, key: &str) -> Vec<&str> {
        self.0
            .get(key)
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    /// `include` flag; `None` when the key is missing
    pub fn include(&self) -> Option<bool> {
        self.0.get("include").and_then(Value::as_bool)
    }

    pub fn has_include(&self) -> bool {
        self.0.contains_key("include")
    }

    pub fn set_include(&mut self, include: bool) {
        self.0.insert("include".to_string(), Value::Bool(include));
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }
}

/// Give the first entry an explicit `include: false` when the API left it out
///
/// The API omits `include` for whitelist/blacklist selections, but callers
/// configure it explicitly; without the default every read would report a
/// difference. Only the first entry is patched.
pub fn normalize_column_selection(selection: &mut [ColumnSelection]) {
    if let Some(first) = selection.first_mut()
        && !first.has_include()
    {
        first.set_include(false);
    }
}
