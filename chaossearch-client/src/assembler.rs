//! Response assembly
//!
//! An object group's attributes come from two places: tags on the backing
//! bucket and the dataset description served by the REST API. Tags are
//! applied first, field by field, then the dataset description.

use crate::dataset::DatasetDescription;
use crate::error::ClientResult;
use crate::model::ObjectGroupAttributes;
use crate::tag_fields::TagField;
use crate::tagging::TagSet;

/// Build the attributes of one object group
///
/// Missing tags keep their defaults. The first tag that is present but cannot
/// be decoded aborts the whole assembly.
pub fn assemble(tags: &TagSet, dataset: DatasetDescription) -> ClientResult<ObjectGroupAttributes> {
    let mut attrs = ObjectGroupAttributes::default();
    for field in TagField::ALL {
        field.apply(tags, &mut attrs)?;
    }
    dataset.apply_to(&mut attrs);
    Ok(attrs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClientError;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn full_tags() -> TagSet {
        [
            ("cs3.parent", "raw-logs"),
            ("cs3.compression", "GZIP"),
            (
                "cs3.dataset-format",
                r#"{"_type":"JSON","horizontal":true,"keepOriginal":false,"arrayFlattenDepth":-1}"#,
            ),
            (
                "cs3.predicate",
                r#"{"AND":[{"field":"key","regex":{"pattern":".*","strict":true}}]}"#,
            ),
            ("cs3.index-retention", r#"{"overall": 30}"#),
            ("unrelated", "value"),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_assemble_from_tags_and_dataset() {
        let dataset: DatasetDescription = serde_json::from_value(json!({
            "partitionBy": "host",
            "options": {"colSelection": [{"type": "blacklist", "fields": ["secret"]}]}
        }))
        .unwrap();

        let attrs = assemble(&full_tags(), dataset).unwrap();
        assert_eq!(attrs.source_bucket, "raw-logs");
        assert_eq!(attrs.compression, "GZIP");
        assert_eq!(attrs.format, "JSON");
        assert!(attrs.horizontal);
        assert_eq!(attrs.array_flatten_depth, Some(-1));
        assert_eq!(attrs.filter_json, r#"{"AND":[{"field":"key","regex":".*"}]}"#);
        assert_eq!(attrs.index_retention, 30);
        assert_eq!(attrs.partition_by, "host");
        assert_eq!(attrs.live_events_sqs_arn, "");
        assert_eq!(attrs.column_selection[0].include(), Some(false));
    }

    #[test]
    fn test_assemble_without_tags() {
        let attrs = assemble(&TagSet::new(), DatasetDescription::default()).unwrap();
        assert_eq!(attrs, ObjectGroupAttributes::default());
    }

    #[test]
    fn test_bad_tag_aborts_assembly() {
        let tags: TagSet = [
            ("cs3.parent", "raw-logs"),
            ("cs3.index-retention", "thirty"),
        ]
        .into_iter()
        .collect();
        let err = assemble(&tags, DatasetDescription::default()).unwrap_err();
        assert!(matches!(err, ClientError::Decode { .. }));
    }

    #[test]
    fn test_mis_shaped_predicate_aborts_assembly() {
        let tags: TagSet = [("cs3.predicate", r#"{"OR":{"pattern":".*"}}"#)]
            .into_iter()
            .collect();
        let err = assemble(&tags, DatasetDescription::default()).unwrap_err();
        assert!(matches!(err, ClientError::UnexpectedShape { .. }));
    }
}
