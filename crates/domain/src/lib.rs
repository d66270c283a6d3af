//! Scenario authoring domain.
//!
//! A scenario document holds places of interest, a team organization,
//! learner actions, strategies, and tasks. Those objects refer to each other
//! by display name, so this crate also owns the bookkeeping that keeps names
//! unique and references consistent across renames and deletes, plus the
//! data-collection model used by the engine.

pub mod aggregates;
pub mod authoring;
pub mod entities;
pub mod error;
pub mod events;
pub mod ids;
pub mod value_objects;

pub use aggregates::{
    DataCollection, DataCollectionPermission, DataCollectionRole, DataCollectionStatus,
    DataSetType, LtiResult, ScenarioDocument, Subject,
};

pub use authoring::{
    compute_coordinates, identity_map, set_coordinates, validate_coordinates, DeleteMode,
    DeleteOutcome, DeletePlan, DraftShape, EntityRef, PlaceDraft, PlaceEdit, PlaceValidation,
    Reference, ReferenceIndex, ReferenceKind, ReferenceOwner, RemovedEntity, ScenarioSession,
};

pub use entities::{
    Area, Checkpoint, Concept, ConceptChildren, Condition, ConditionInput, Entrance,
    EnvironmentAdaptation, LearnerAction, LearnerActionType, Path, PlaceKind, PlaceOfInterest,
    Point, Segment, StateTransition, Strategy, StrategyActivity, Task, Team, TeamMember,
    TeamOrganization, TeamUnit, Trigger, TriggerKind, TriggerMessage,
};

pub use error::DomainError;
pub use events::ScenarioEvent;

pub use ids::{
    ConceptId, ConditionId, CoordinateId, DataCollectionId, LearnerActionId, PlaceId,
    StateTransitionId, StrategyId, TaskId, TeamUnitId,
};

pub use value_objects::{is_blank, Coordinate, CoordinateKind, CoordinateType, EntityName, NameMatching};
