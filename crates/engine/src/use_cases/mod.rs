//! Use cases - User story orchestration.
//!
//! Each module contains use cases for a specific domain area.
//! Use cases orchestrate across ports to fulfill user stories.

pub mod data_collection;

// Re-export main types
pub use data_collection::{DataCollectionError, DataCollectionServices, ProgressIndicator};
