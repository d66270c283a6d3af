//! Domain Events
//!
//! Outcomes of scenario authoring commands. Every command on
//! [`crate::authoring::ScenarioSession`] returns one of these, so callers can
//! refresh views or record an audit trail without diffing the document.

use serde::{Deserialize, Serialize};

use crate::authoring::{DeleteMode, EntityRef, Reference, RemovedEntity};
use crate::{ConditionId, LearnerActionId, PlaceId, TeamUnitId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ScenarioEvent {
    EntityRenamed {
        entity: EntityRef,
        from: String,
        to: String,
        /// Reference fields rewritten to the new name
        references_updated: usize,
    },
    EntityDeleted {
        removed: RemovedEntity,
        mode: DeleteMode,
        /// Cleared for `RemoveReferences`, left dangling for `KeepReferences`
        references: Vec<Reference>,
    },
    LearnerActionRemoved {
        action: LearnerActionId,
        mode: DeleteMode,
        references: Vec<Reference>,
        /// Avoid-location conditions that no longer require assessing location
        requirements_cleared: Vec<ConditionId>,
    },
    PlaceAdded {
        place: PlaceId,
        name: String,
    },
    PlaceEdited {
        place: PlaceId,
        from: String,
        to: String,
        references_updated: usize,
    },
    PathCoordinatesChanged {
        place: PlaceId,
        segment_names: Vec<String>,
    },
    PlacesImported {
        /// Final names, in input order, after conflict renaming
        names: Vec<String>,
    },
    TeamUnitMoved {
        unit: TeamUnitId,
        new_parent: TeamUnitId,
        index: usize,
    },
}
