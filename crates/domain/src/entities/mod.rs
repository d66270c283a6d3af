//! Domain entities - Core objects of a scenario document with identity

mod condition;
mod learner_action;
mod place;
mod state_transition;
mod strategy;
mod task;
mod team;

pub use condition::{Checkpoint, Condition, ConditionInput, Entrance};
pub use learner_action::{LearnerAction, LearnerActionType};
pub use place::{
    Area, Path, PlaceKind, PlaceOfInterest, Point, Segment, DEFAULT_SEGMENT_WIDTH,
    MIN_AREA_COORDINATES, MIN_PATH_COORDINATES, SEGMENT_NAME_PREFIX,
};
pub use state_transition::StateTransition;
pub use strategy::{EnvironmentAdaptation, Strategy, StrategyActivity};
pub use task::{Concept, ConceptChildren, Task, Trigger, TriggerKind, TriggerMessage};
pub use team::{Team, TeamMember, TeamOrganization, TeamUnit};
