//! Infrastructure implementations.
//!
//! Contains port trait implementations for external dependencies.

pub mod clock;
pub mod data_collections;
pub mod downloads;
pub mod file_stores;
pub mod ports;
