//! Named-entity registry: name lookup and uniqueness within each reference scope.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::aggregates::ScenarioDocument;
use crate::entities::{LearnerAction, PlaceOfInterest, Strategy, TeamUnit};
use crate::error::DomainError;
use crate::value_objects::{is_blank, EntityName};
use crate::{LearnerActionId, PlaceId, StrategyId, TeamUnitId};

use super::ReferenceKind;

/// Identity of a named entity in the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
pub enum EntityRef {
    Place(PlaceId),
    TeamUnit(TeamUnitId),
    LearnerAction(LearnerActionId),
    Strategy(StrategyId),
}

impl EntityRef {
    pub fn kind(&self) -> ReferenceKind {
        match self {
            Self::Place(_) => ReferenceKind::PlaceOfInterest,
            Self::TeamUnit(_) => ReferenceKind::TeamUnit,
            Self::LearnerAction(_) => ReferenceKind::LearnerAction,
            Self::Strategy(_) => ReferenceKind::Strategy,
        }
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Place(id) => write!(f, "{}", id),
            Self::TeamUnit(id) => write!(f, "{}", id),
            Self::LearnerAction(id) => write!(f, "{}", id),
            Self::Strategy(id) => write!(f, "{}", id),
        }
    }
}

/// An entity detached from the document by a delete.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "entity", rename_all = "snake_case")]
pub enum RemovedEntity {
    Place(PlaceOfInterest),
    TeamUnit(TeamUnit),
    LearnerAction(LearnerAction),
    Strategy(Strategy),
}

impl ScenarioDocument {
    /// Every named entity in the scope of `kind`, in document order.
    pub fn named_entities(&self, kind: ReferenceKind) -> Vec<(EntityRef, &str)> {
        match kind {
            ReferenceKind::PlaceOfInterest => self
                .places()
                .iter()
                .map(|p| (EntityRef::Place(p.id()), p.name()))
                .collect(),
            ReferenceKind::TeamUnit => self
                .teams()
                .names()
                .into_iter()
                .map(|(id, name)| (EntityRef::TeamUnit(id), name))
                .collect(),
            ReferenceKind::LearnerAction => self
                .learner_actions()
                .iter()
                .map(|a| (EntityRef::LearnerAction(a.id), a.name.as_str()))
                .collect(),
            ReferenceKind::Strategy => self
                .strategies()
                .iter()
                .map(|s| (EntityRef::Strategy(s.id), s.name.as_str()))
                .collect(),
        }
    }

    pub fn name_of(&self, entity: EntityRef) -> Option<&str> {
        self.named_entities(entity.kind())
            .into_iter()
            .find(|(e, _)| *e == entity)
            .map(|(_, name)| name)
    }

    pub fn contains_entity(&self, entity: EntityRef) -> bool {
        self.name_of(entity).is_some()
    }

    /// First entity in scope whose name matches. Blank names never match.
    pub fn find_entity(&self, kind: ReferenceKind, name: &str) -> Option<EntityRef> {
        let matching = self.name_matching();
        self.named_entities(kind)
            .into_iter()
            .find(|(_, existing)| matching.matches(existing, name))
            .map(|(entity, _)| entity)
    }

    /// False if `candidate` is blank or already used by an entity other than `excluding`.
    pub fn is_name_unique(
        &self,
        kind: ReferenceKind,
        candidate: &str,
        excluding: Option<EntityRef>,
    ) -> bool {
        if is_blank(candidate) {
            return false;
        }
        let matching = self.name_matching();
        !self
            .named_entities(kind)
            .into_iter()
            .any(|(entity, existing)| Some(entity) != excluding && matching.matches(existing, candidate))
    }

    /// Rename an entity without touching references. Returns the old name.
    ///
    /// Callers follow up with [`ScenarioDocument::propagate_rename`].
    pub fn rename_entity(&mut self, entity: EntityRef, new_name: &str) -> Result<String, DomainError> {
        let name = EntityName::new(new_name)?;
        let old_name = self
            .name_of(entity)
            .map(str::to_string)
            .ok_or_else(|| DomainError::missing_reference_target(entity.kind(), entity.to_string()))?;

        if !self.is_name_unique(entity.kind(), name.as_str(), Some(entity)) {
            return Err(DomainError::invalid_name(
                name.as_str(),
                format!("another {} already uses this name", entity.kind()),
            ));
        }

        let name = name.into_string();
        match entity {
            EntityRef::Place(id) => {
                if let Some(place) = self.places_mut().iter_mut().find(|p| p.id() == id) {
                    place.set_name(name);
                }
            }
            EntityRef::TeamUnit(id) => {
                self.teams_mut().rename(id, name);
            }
            EntityRef::LearnerAction(id) => {
                if let Some(action) = self.learner_actions_mut().iter_mut().find(|a| a.id == id) {
                    action.name = name;
                }
            }
            EntityRef::Strategy(id) => {
                if let Some(strategy) = self.strategies_mut().iter_mut().find(|s| s.id == id) {
                    strategy.name = name;
                }
            }
        }
        Ok(old_name)
    }

    /// Detach an entity from the document, leaving references untouched.
    pub(crate) fn remove_entity(&mut self, entity: EntityRef) -> Result<RemovedEntity, DomainError> {
        let missing = || DomainError::not_found(entity_type(entity), entity.to_string());
        match entity {
            EntityRef::Place(id) => {
                let places = self.places_mut();
                let pos = places.iter().position(|p| p.id() == id).ok_or_else(missing)?;
                Ok(RemovedEntity::Place(places.remove(pos)))
            }
            EntityRef::TeamUnit(id) => self.teams_mut().remove_unit(id).map(RemovedEntity::TeamUnit),
            EntityRef::LearnerAction(id) => {
                let actions = self.learner_actions_mut();
                let pos = actions.iter().position(|a| a.id == id).ok_or_else(missing)?;
                Ok(RemovedEntity::LearnerAction(actions.remove(pos)))
            }
            EntityRef::Strategy(id) => {
                let strategies = self.strategies_mut();
                let pos = strategies.iter().position(|s| s.id == id).ok_or_else(missing)?;
                Ok(RemovedEntity::Strategy(strategies.remove(pos)))
            }
        }
    }
}

fn entity_type(entity: EntityRef) -> &'static str {
    match entity {
        EntityRef::Place(_) => "PlaceOfInterest",
        EntityRef::TeamUnit(_) => "TeamUnit",
        EntityRef::LearnerAction(_) => "LearnerAction",
        EntityRef::Strategy(_) => "Strategy",
    }
}
