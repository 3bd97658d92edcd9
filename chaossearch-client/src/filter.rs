//! Filter predicate shape rewriting
//!
//! The predicate stored on a bucket comes back with each regex wrapped as
//! `{"pattern": ..., "strict": ...}`, while object groups are created with a
//! bare pattern string. Reads rewrite the wrapped form back into the bare form
//! so the predicate compares equal to what was configured:
//!
//! ```text
//! {"AND":[{"field":"key","regex":{"pattern":".*","strict":true}}]}
//! {"AND":[{"field":"key","regex":".*"}]}
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{ClientError, ClientResult};

/// Substring whose presence marks a predicate as possibly wrapped
const WRAPPED_MARKER: &str = "pattern";

#[derive(Debug, Deserialize)]
struct WrappedFilter {
    #[serde(rename = "AND")]
    and: Vec<WrappedCondition>,
}

#[derive(Debug, Deserialize)]
struct WrappedCondition {
    field: String,
    regex: WrappedRegex,
}

// `strict` is accepted and dropped
#[derive(Debug, Deserialize)]
struct WrappedRegex {
    pattern: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct BareFilter {
    #[serde(rename = "AND")]
    and: Vec<BareCondition>,
}

#[derive(Debug, Serialize, Deserialize)]
struct BareCondition {
    field: String,
    regex: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StoredFilter {
    Bare(BareFilter),
    Wrapped(WrappedFilter),
}

/// Returns true if the predicate text may be in the wrapped shape
pub fn needs_rewrite(filter_json: &str) -> bool {
    filter_json.contains(WRAPPED_MARKER)
}

/// Rewrite a stored predicate into the bare-pattern shape
///
/// Text without the `pattern` marker is returned untouched. Otherwise the
/// document is shape-checked: the wrapped shape is rewritten (element order
/// and fields preserved, `strict` dropped), the bare shape is returned
/// untouched, and anything else is an error.
pub fn rewrite_filter_json(filter_json: &str) -> ClientResult<String> {
    if !needs_rewrite(filter_json) {
        return Ok(filter_json.to_string());
    }

    let stored: StoredFilter = match serde_json::from_str(filter_json) {
        Ok(stored) => stored,
        Err(_) => return Err(shape_error(filter_json)),
    };

    match stored {
        StoredFilter::Bare(bare) => {
            log::debug!("Filter predicate already bare ({} conditions)", bare.and.len());
            Ok(filter_json.to_string())
        }
        StoredFilter::Wrapped(wrapped) => {
            let bare = BareFilter {
                and: wrapped
                    .and
                    .into_iter()
                    .map(|condition| BareCondition {
                        field: condition.field,
                        regex: condition.regex.pattern,
                    })
                    .collect(),
            };
            serde_json::to_string(&bare).map_err(|e| ClientError::decode("filter predicate", e))
        }
    }
}

fn shape_error(filter_json: &str) -> ClientError {
    match serde_json::from_str::<serde_json::Value>(filter_json) {
        Err(e) => ClientError::decode("filter predicate", e),
        Ok(_) => ClientError::UnexpectedShape {
            context: "filter predicate".to_string(),
            message: format!(
                "expected {{\"AND\":[{{\"field\",\"regex\"}}]}}, got {}",
                filter_json
            ),
        },
    }
}
