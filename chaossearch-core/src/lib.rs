//! ChaosSearch Core
//!
//! Provider abstraction shared by the ChaosSearch provider and CLI: resources,
//! their observed state, attribute schemas and desired-vs-actual diffing.

pub mod differ;
pub mod provider;
pub mod resource;
pub mod schema;
