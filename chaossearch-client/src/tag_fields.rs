//! Bucket tag fields of an object group
//!
//! Each [`TagField`] names one namespaced tag key, how its value is decoded
//! and which [`ObjectGroupAttributes`] it fills. The assembler applies
//! [`TagField::ALL`] in order.

use serde::Deserialize;

use crate::error::ClientResult;
use crate::filter::rewrite_filter_json;
use crate::model::ObjectGroupAttributes;
use crate::tagging::{TagSet, read_json, read_string};

pub const TAG_NAMESPACE: &str = "cs3";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagField {
    Parent,
    Compression,
    LiveSqsArn,
    DatasetFormat,
    Predicate,
    IndexRetention,
}

/// How a tag value is decoded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagDecoder {
    String,
    Json,
    /// String, then rewritten into the bare filter shape
    Predicate,
}

/// Decoded form of `cs3.dataset-format`
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DatasetFormatTag {
    #[serde(rename = "_type")]
    format_type: String,
    pattern: String,
    #[serde(rename = "arrayFlattenDepth")]
    array_flatten_depth: Option<i64>,
    #[serde(rename = "keepOriginal")]
    keep_original: bool,
    horizontal: bool,
}

/// Decoded form of `cs3.index-retention`
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct IndexRetentionTag {
    overall: i64,
}

impl TagField {
    pub const ALL: [TagField; 6] = [
        TagField::Parent,
        TagField::Compression,
        TagField::LiveSqsArn,
        TagField::DatasetFormat,
        TagField::Predicate,
        TagField::IndexRetention,
    ];

    pub fn key(self) -> &'static str {
        match self {
            TagField::Parent => "cs3.parent",
            TagField::Compression => "cs3.compression",
            TagField::LiveSqsArn => "cs3.live-sqs-arn",
            TagField::DatasetFormat => "cs3.dataset-format",
            TagField::Predicate => "cs3.predicate",
            TagField::IndexRetention => "cs3.index-retention",
        }
    }

    pub fn decoder(self) -> TagDecoder {
        match self {
            TagField::Parent | TagField::Compression | TagField::LiveSqsArn => TagDecoder::String,
            TagField::DatasetFormat | TagField::IndexRetention => TagDecoder::Json,
            TagField::Predicate => TagDecoder::Predicate,
        }
    }

    /// Attribute names this field fills
    pub fn targets(self) -> &'static [&'static str] {
        match self {
            TagField::Parent => &["source_bucket"],
            TagField::Compression => &["compression"],
            TagField::LiveSqsArn => &["live_events_sqs_arn"],
            TagField::DatasetFormat => &[
                "format",
                "pattern",
                "array_flatten_depth",
                "keep_original",
                "horizontal",
            ],
            TagField::Predicate => &["filter_json"],
            TagField::IndexRetention => &["index_retention"],
        }
    }

    pub fn from_key(key: &str) -> Option<TagField> {
        Self::ALL.into_iter().find(|field| field.key() == key)
    }

    /// Decode this field from the tag set into `attrs`
    ///
    /// An absent tag leaves `attrs` untouched.
    pub fn apply(self, tags: &TagSet, attrs: &mut ObjectGroupAttributes) -> ClientResult<()> {
        match self {
            TagField::Parent => {
                if let Some(v) = read_string(tags, self.key()) {
                    attrs.source_bucket = v;
                }
            }
            TagField::Compression => {
                if let Some(v) = read_string(tags, self.key()) {
                    attrs.compression = v;
                }
            }
            TagField::LiveSqsArn => {
                if let Some(v) = read_string(tags, self.key()) {
                    attrs.live_events_sqs_arn = v;
                }
            }
            TagField::DatasetFormat => {
                if let Some(format) = read_json::<DatasetFormatTag>(tags, self.key())? {
                    attrs.format = format.format_type;
                    attrs.pattern = format.pattern;
                    attrs.array_flatten_depth = format.array_flatten_depth;
                    attrs.keep_original = format.keep_original;
                    attrs.horizontal = format.horizontal;
                }
            }
            TagField::Predicate => {
                if let Some(raw) = read_string(tags, self.key()) {
                    attrs.filter_json = rewrite_filter_json(&raw)?;
                }
            }
            TagField::IndexRetention => {
                if let Some(retention) = read_json::<IndexRetentionTag>(tags, self.key())? {
                    attrs.index_retention = retention.overall;
                }
            }
        }
        Ok(())
    }
}
