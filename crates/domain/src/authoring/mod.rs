//! Scenario authoring: name registry, reference tracking, and the commands
//! that keep name references consistent while a document is edited.
//!
//! Entities refer to each other by display name. [`ReferenceIndex`] answers
//! "who mentions this name", the propagation functions rewrite or clear those
//! mentions, and [`ScenarioSession`] bundles both behind a small set of
//! commands.

mod place_draft;
mod propagation;
mod references;
mod registry;
mod segmenter;
mod session;
mod slots;
mod validation;

pub use place_draft::{DraftShape, PlaceDraft, PlaceEdit};
pub use propagation::DeleteOutcome;
pub use references::{Reference, ReferenceIndex, ReferenceKind, ReferenceOwner};
pub use registry::{EntityRef, RemovedEntity};
pub use segmenter::{compute_coordinates, identity_map, set_coordinates};
pub use session::{DeleteMode, DeletePlan, ScenarioSession};
pub use validation::{validate_coordinates, PlaceValidation};
