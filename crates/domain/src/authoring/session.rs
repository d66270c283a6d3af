//! Scenario editing session.
//!
//! All document mutation goes through [`ScenarioSession`] commands. Each one
//! keeps name references consistent and returns a [`ScenarioEvent`]
//! describing what changed.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::aggregates::ScenarioDocument;
use crate::entities::{LearnerActionType, PlaceOfInterest};
use crate::error::DomainError;
use crate::events::ScenarioEvent;
use crate::value_objects::{is_blank, Coordinate, EntityName};
use crate::{ConditionId, CoordinateId, LearnerActionId, PlaceId, TeamUnitId};

use super::place_draft::PlaceDraft;
use super::registry::EntityRef;
use super::{Reference, ReferenceKind};

/// What happens to references when their target is deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeleteMode {
    /// Clear the referencing fields, then delete
    RemoveReferences,
    /// Delete and leave references dangling for validation to flag
    KeepReferences,
}

/// Whether a delete can go ahead without asking the author.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DeletePlan {
    Immediate,
    NeedsConfirmation {
        references: Vec<Reference>,
        /// Sum of reference counts across all owners
        total: usize,
    },
}

#[derive(Debug, Clone)]
pub struct ScenarioSession {
    document: ScenarioDocument,
    read_only: bool,
}

impl ScenarioSession {
    pub fn new(document: ScenarioDocument) -> Self {
        Self {
            document,
            read_only: false,
        }
    }

    /// A session that rejects every mutating command.
    pub fn read_only(document: ScenarioDocument) -> Self {
        Self {
            document,
            read_only: true,
        }
    }

    #[inline]
    pub fn document(&self) -> &ScenarioDocument {
        &self.document
    }

    #[inline]
    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    pub fn into_document(self) -> ScenarioDocument {
        self.document
    }

    fn ensure_writable(&self) -> Result<(), DomainError> {
        if self.read_only {
            return Err(DomainError::constraint("The scenario is open in read-only mode"));
        }
        Ok(())
    }

    // =========================================================================
    // Rename / Delete
    // =========================================================================

    /// Rename an entity and rewrite every reference to its old name.
    pub fn rename(&mut self, entity: EntityRef, new_name: &str) -> Result<ScenarioEvent, DomainError> {
        self.ensure_writable()?;
        let from = self.document.rename_entity(entity, new_name)?;
        let to = self
            .document
            .name_of(entity)
            .map(str::to_string)
            .unwrap_or_else(|| new_name.trim().to_string());
        let references_updated = self.document.propagate_rename(entity, &from, &to)?;

        Ok(ScenarioEvent::EntityRenamed {
            entity,
            from,
            to,
            references_updated,
        })
    }

    /// Work out whether deleting `entity` needs the author's confirmation.
    ///
    /// Deleting a team also counts references to every unit inside it.
    pub fn request_delete(&self, entity: EntityRef) -> Result<DeletePlan, DomainError> {
        let names = self.document.names_removed_with(entity)?;
        let references = self.document.references_to_all(entity.kind(), &names);
        if references.is_empty() {
            return Ok(DeletePlan::Immediate);
        }
        let total = references.iter().map(|r| r.count).sum();
        Ok(DeletePlan::NeedsConfirmation { references, total })
    }

    pub fn confirm_delete(
        &mut self,
        entity: EntityRef,
        mode: DeleteMode,
    ) -> Result<ScenarioEvent, DomainError> {
        self.ensure_writable()?;
        if let EntityRef::LearnerAction(id) = entity {
            return self.remove_learner_action(id, mode);
        }

        let outcome = match mode {
            DeleteMode::RemoveReferences => self.document.delete_with_reference_cleanup(entity)?,
            DeleteMode::KeepReferences => self.document.delete_only(entity)?,
        };
        Ok(ScenarioEvent::EntityDeleted {
            removed: outcome.removed,
            mode,
            references: outcome.references,
        })
    }

    // =========================================================================
    // Learner Actions
    // =========================================================================

    /// Conditions that would be left requiring an assess-my-location action
    /// nobody can press if `action` were removed.
    ///
    /// Empty unless `action` is the last `AssessMyLocation` action.
    pub fn assess_location_dependents(&self, action: LearnerActionId) -> Vec<ConditionId> {
        let actions = self.document.learner_actions();
        let is_assess = |id: LearnerActionId| {
            actions
                .iter()
                .any(|a| a.id == id && a.action_type == LearnerActionType::AssessMyLocation)
        };
        if !is_assess(action) {
            return Vec::new();
        }
        let others = actions
            .iter()
            .filter(|a| a.id != action && a.action_type == LearnerActionType::AssessMyLocation)
            .count();
        if others > 0 {
            return Vec::new();
        }

        self.document
            .conditions()
            .into_iter()
            .filter(|c| c.requires_assess_my_location())
            .map(|c| c.id)
            .collect()
    }

    /// Remove a learner action.
    ///
    /// With `RemoveReferences`, removing the last assess-my-location action
    /// also turns off the learner-action requirement on the conditions that
    /// depended on it.
    pub fn remove_learner_action(
        &mut self,
        action: LearnerActionId,
        mode: DeleteMode,
    ) -> Result<ScenarioEvent, DomainError> {
        self.ensure_writable()?;
        let entity = EntityRef::LearnerAction(action);
        let dependents = self.assess_location_dependents(action);

        let outcome = match mode {
            DeleteMode::RemoveReferences => self.document.delete_with_reference_cleanup(entity)?,
            DeleteMode::KeepReferences => self.document.delete_only(entity)?,
        };

        let requirements_cleared = match mode {
            DeleteMode::RemoveReferences => {
                for condition in self.document.conditions_mut() {
                    if dependents.contains(&condition.id) {
                        condition.clear_learner_action_requirement();
                    }
                }
                dependents
            }
            DeleteMode::KeepReferences => Vec::new(),
        };

        Ok(ScenarioEvent::LearnerActionRemoved {
            action,
            mode,
            references: outcome.references,
            requirements_cleared,
        })
    }

    // =========================================================================
    // Places of Interest
    // =========================================================================

    /// Add a new place. The name must be unique; shape rules are left to validation.
    pub fn add_place(&mut self, place: impl Into<PlaceOfInterest>) -> Result<ScenarioEvent, DomainError> {
        self.ensure_writable()?;
        let mut place: PlaceOfInterest = place.into();
        let name = self.ensure_unique_place_name(place.name(), None)?;
        place.set_name(name.into_string());

        let event = ScenarioEvent::PlaceAdded {
            place: place.id(),
            name: place.name().to_string(),
        };
        self.document.places_mut().push(place);
        Ok(event)
    }

    /// Write a draft back into its place and propagate a rename.
    pub fn apply_place_draft(&mut self, draft: &PlaceDraft) -> Result<ScenarioEvent, DomainError> {
        self.ensure_writable()?;
        let id = draft.place();
        // The draft writes its name trimmed, so check the trimmed form
        self.ensure_unique_place_name(&draft.name, Some(EntityRef::Place(id)))?;

        let target = self.place_mut(id)?;
        let edit = draft.apply_edits(target)?;
        let references_updated = if edit.renamed() {
            self.document
                .propagate_rename(EntityRef::Place(id), &edit.old_name, &edit.new_name)?
        } else {
            0
        };

        Ok(ScenarioEvent::PlaceEdited {
            place: id,
            from: edit.old_name,
            to: edit.new_name,
            references_updated,
        })
    }

    /// Rebuild a path's segments from a coordinate list.
    ///
    /// See [`super::set_coordinates`] for the naming rules; `None` or an empty
    /// list leaves the path as it is.
    pub fn set_path_coordinates(
        &mut self,
        path: PlaceId,
        coordinates: Option<&[Coordinate]>,
        replacement_to_original: Option<&HashMap<CoordinateId, CoordinateId>>,
    ) -> Result<ScenarioEvent, DomainError> {
        self.ensure_writable()?;
        let PlaceOfInterest::Path(target) = self.place_mut(path)? else {
            return Err(DomainError::validation(format!(
                "Place {} is not a path",
                path
            )));
        };
        super::set_coordinates(target, coordinates, replacement_to_original);

        Ok(ScenarioEvent::PathCoordinatesChanged {
            place: path,
            segment_names: target.segments().iter().map(|s| s.name.clone()).collect(),
        })
    }

    /// Merge already-parsed places into the document.
    ///
    /// A name that clashes with an existing place becomes `"Name (2)"`,
    /// `"Name (3)"`, and so on, taking the first free suffix. Nothing is
    /// imported if any incoming place has a blank name.
    pub fn import_places(&mut self, places: Vec<PlaceOfInterest>) -> Result<ScenarioEvent, DomainError> {
        self.ensure_writable()?;
        if let Some(blank) = places.iter().find(|p| is_blank(p.name())) {
            return Err(DomainError::invalid_name(
                blank.name(),
                "imported places must have a name",
            ));
        }

        let mut names = Vec::with_capacity(places.len());
        for mut place in places {
            let name = self.free_place_name(place.name().trim());
            place.set_name(name.clone());
            self.document.places_mut().push(place);
            names.push(name);
        }
        Ok(ScenarioEvent::PlacesImported { names })
    }

    fn free_place_name(&self, original: &str) -> String {
        let is_free = |candidate: &str| {
            self.document
                .is_name_unique(ReferenceKind::PlaceOfInterest, candidate, None)
        };
        if is_free(original) {
            return original.to_string();
        }
        (2..)
            .map(|i| format!("{} ({})", original, i))
            .find(|candidate| is_free(candidate))
            .unwrap_or_else(|| original.to_string())
    }

    /// Validates and trims a place name, refusing one already in use.
    fn ensure_unique_place_name(
        &self,
        name: &str,
        excluding: Option<EntityRef>,
    ) -> Result<EntityName, DomainError> {
        let name = EntityName::new(name)?;
        if !self
            .document
            .is_name_unique(ReferenceKind::PlaceOfInterest, name.as_str(), excluding)
        {
            return Err(DomainError::invalid_name(
                name.as_str(),
                "another place of interest already uses this name",
            ));
        }
        Ok(name)
    }

    fn place_mut(&mut self, id: PlaceId) -> Result<&mut PlaceOfInterest, DomainError> {
        self.document
            .places_mut()
            .iter_mut()
            .find(|p| p.id() == id)
            .ok_or_else(|| DomainError::not_found("PlaceOfInterest", id.to_string()))
    }

    // =========================================================================
    // Team Organization
    // =========================================================================

    /// Move a team or member under another team. Names are unaffected, so no
    /// references change.
    pub fn move_team_unit(
        &mut self,
        unit: TeamUnitId,
        new_parent: TeamUnitId,
        index: usize,
    ) -> Result<ScenarioEvent, DomainError> {
        self.ensure_writable()?;
        self.document.teams_mut().move_unit(unit, new_parent, index)?;
        Ok(ScenarioEvent::TeamUnitMoved {
            unit,
            new_parent,
            index,
        })
    }
}
