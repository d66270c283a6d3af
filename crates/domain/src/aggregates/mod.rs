//! Aggregate roots - domain objects that own their related data
//!
//! Each aggregate:
//! - Owns all its constituent parts (enforced by Rust ownership)
//! - Exposes behavior through methods, not public fields
//! - Scenario mutations go through the authoring session, which returns events
//!
//! # Rustic DDD Principles
//!
//! | Java DDD Pattern | Rustic Equivalent |
//! |------------------|-------------------|
//! | Private fields + getters | Newtypes valid by construction |
//! | Aggregate root guards | Ownership (borrow checker enforces) |
//! | Factory pattern | `::new()` + builder pattern |
//! | Domain Events | Return enums from mutations |

pub mod data_collection;
pub mod scenario;

pub use data_collection::{
    DataCollection, DataCollectionPermission, DataCollectionRole, DataCollectionStatus,
    DataSetType, LtiResult, Subject,
};
pub use scenario::ScenarioDocument;
