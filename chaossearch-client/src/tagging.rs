//! Bucket tag sets and the tag-value codec
//!
//! ChaosSearch stores part of an object group's configuration as tags on the
//! backing bucket. A [`TagSet`] is the flat key/value view of those tags; the
//! codec functions read typed values out of it.

use serde::de::DeserializeOwned;

use crate::error::{ClientError, ClientResult};

/// A single bucket tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub key: String,
    pub value: String,
}

impl Tag {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Tags of one bucket, in the order the storage API returned them
///
/// Keys are expected to be unique. When a key does occur more than once the
/// first occurrence wins and later ones are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagSet {
    tags: Vec<Tag>,
}

impl TagSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, tag: Tag) {
        self.tags.push(tag);
    }

    /// Value of the first tag with this key
    pub fn get(&self, key: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|tag| tag.key == key)
            .map(|tag| tag.value.as_str())
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tag> {
        self.tags.iter()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for TagSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            tags: iter.into_iter().map(|(k, v)| Tag::new(k, v)).collect(),
        }
    }
}

/// Read a string tag; `None` when the key is absent
pub fn read_string(tags: &TagSet, key: &str) -> Option<String> {
    tags.get(key).map(str::to_string)
}

/// Read a JSON-encoded tag into `T`
///
/// An absent key yields `Ok(None)`. A present key whose value is not valid
/// JSON for `T` is a decode error naming the key.
pub fn read_json<T: DeserializeOwned>(tags: &TagSet, key: &str) -> ClientResult<Option<T>> {
    match tags.get(key) {
        Some(raw) => serde_json::from_str(raw)
            .map(Some)
            .map_err(|e| ClientError::decode(format!("tag {}", key), e)),
        None => Ok(None),
    }
}
