//! ChaosSearch Client
//!
//! Talks to a ChaosSearch deployment on behalf of the object-group provider.
//! Object groups are described partly by tags on their backing bucket (read
//! through the S3-compatible storage API) and partly by the REST dataset
//! endpoint.
//!
//! # Overview
//!
//! - **Client**: entry point for every object-group operation
//! - **TagSet** / **TagField**: bucket tags and the table that decodes them
//! - **assemble**: merges tags and the dataset description into
//!   [`ObjectGroupAttributes`]
//! - **rewrite_filter_json**: converts a stored filter predicate back into the
//!   shape it is configured in
//!
//! # Example
//!
//! ```ignore
//! use chaossearch_client::{Client, Configuration, ReadObjectGroupRequest};
//!
//! let config = Configuration::from_settings(&settings);
//! let client = Client::new(config).await?;
//!
//! let attrs = client
//!     .read_object_group(&ReadObjectGroupRequest { id: "logs-view".into() })
//!     .await?;
//! println!("retention: {} days", attrs.index_retention);
//! ```

pub mod api;
pub mod assembler;
pub mod client;
pub mod column_selection;
pub mod config;
pub mod dataset;
pub mod error;
pub mod filter;
pub mod indexing;
pub mod model;
pub mod object_group;
pub mod signer;
pub mod store;
pub mod tag_fields;
pub mod tagging;

// Re-export main types for convenience
pub use assembler::assemble;
pub use client::Client;
pub use column_selection::{ColumnSelection, SelectionType, normalize_column_selection};
pub use config::Configuration;
pub use dataset::DatasetDescription;
pub use error::{ClientError, ClientResult};
pub use filter::rewrite_filter_json;
pub use model::{
    BucketSummary, CreateObjectGroupRequest, DeleteObjectGroupRequest, IndexingState,
    ObjectGroupAttributes, ReadIndexingStateRequest, ReadObjectGroupRequest, SetActiveRequest,
    UpdateObjectGroupRequest,
};
pub use store::{BucketStore, MemoryBucketStore, S3BucketStore};
pub use tag_fields::TagField;
pub use tagging::{Tag, TagSet, read_json, read_string};
