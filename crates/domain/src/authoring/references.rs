//! Reference tracking - who mentions a named entity, and how often.
//!
//! References are a view over the current document. They are never stored;
//! [`ReferenceIndex::build`] recomputes them on demand, which keeps the index
//! correct after any edit without incremental bookkeeping.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::aggregates::ScenarioDocument;
use crate::value_objects::{is_blank, NameMatching};
use crate::{ConditionId, LearnerActionId, StateTransitionId, StrategyId, TaskId};

use super::slots::owner_slots;

/// The kinds of named entity that other objects reference by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceKind {
    PlaceOfInterest,
    /// Teams and team members share one name space
    TeamUnit,
    LearnerAction,
    Strategy,
}

impl ReferenceKind {
    pub const ALL: [ReferenceKind; 4] = [
        ReferenceKind::PlaceOfInterest,
        ReferenceKind::TeamUnit,
        ReferenceKind::LearnerAction,
        ReferenceKind::Strategy,
    ];
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PlaceOfInterest => write!(f, "place of interest"),
            Self::TeamUnit => write!(f, "team or team member"),
            Self::LearnerAction => write!(f, "learner action"),
            Self::Strategy => write!(f, "strategy"),
        }
    }
}

/// An object whose fields can reference named entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
pub enum ReferenceOwner {
    Condition(ConditionId),
    /// The start and end triggers of a task, taken together
    TaskTriggers(TaskId),
    Strategy(StrategyId),
    LearnerAction(LearnerActionId),
    StateTransition(StateTransitionId),
    ScenarioEndTriggers,
}

/// One owning object's references to one named entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reference {
    pub owner: ReferenceOwner,
    /// Human-readable description of the owner, for confirmation prompts
    pub owner_label: String,
    pub kind: ReferenceKind,
    pub target: String,
    /// Number of distinct fields in the owner naming the target
    pub count: usize,
}

/// Bidirectional index between named entities and the objects referencing them.
#[derive(Debug, Clone, Default)]
pub struct ReferenceIndex {
    matching: NameMatching,
    by_target: HashMap<(ReferenceKind, String), Vec<Reference>>,
    by_owner: HashMap<ReferenceOwner, Vec<(ReferenceKind, String, usize)>>,
}

impl ReferenceIndex {
    /// Walk every reference field in the document.
    ///
    /// Owners are recorded in document order. Blank and cleared fields are skipped.
    pub fn build(doc: &ScenarioDocument) -> Self {
        let matching = doc.name_matching();
        let mut index = Self {
            matching,
            ..Self::default()
        };

        for kind in ReferenceKind::ALL {
            for owner in owner_slots(doc, kind) {
                // Tally per target, preserving first-seen order within the owner
                let mut tallies: Vec<(String, usize)> = Vec::new();
                for name in owner.slots.iter().filter_map(|s| s.as_deref()) {
                    if is_blank(name) {
                        continue;
                    }
                    match tallies.iter_mut().find(|(t, _)| matching.matches(t, name)) {
                        Some((_, count)) => *count += 1,
                        None => tallies.push((name.to_string(), 1)),
                    }
                }

                for (target, count) in tallies {
                    index
                        .by_owner
                        .entry(owner.owner)
                        .or_default()
                        .push((kind, target.clone(), count));
                    index
                        .by_target
                        .entry((kind, index_key(matching, &target)))
                        .or_default()
                        .push(Reference {
                            owner: owner.owner,
                            owner_label: owner.label.clone(),
                            kind,
                            target,
                            count,
                        });
                }
            }
        }

        index
    }

    /// References to the named entity. Empty means it is safe to delete without confirmation.
    pub fn references_to(&self, kind: ReferenceKind, name: &str) -> &[Reference] {
        if is_blank(name) {
            return &[];
        }
        self.by_target
            .get(&(kind, index_key(self.matching, name)))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Sum of reference counts across every owner.
    pub fn total_count(&self, kind: ReferenceKind, name: &str) -> usize {
        self.references_to(kind, name).iter().map(|r| r.count).sum()
    }

    /// Everything a single owner references, as (kind, target, count).
    pub fn targets_of(&self, owner: ReferenceOwner) -> &[(ReferenceKind, String, usize)] {
        self.by_owner
            .get(&owner)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// References whose target no longer exists in the document.
    pub fn dangling(&self, doc: &ScenarioDocument) -> Vec<&Reference> {
        let mut dangling: Vec<&Reference> = self
            .by_target
            .iter()
            .filter(|((kind, _), refs)| {
                refs.first()
                    .map(|r| doc.find_entity(*kind, &r.target).is_none())
                    .unwrap_or(false)
            })
            .flat_map(|(_, refs)| refs.iter())
            .collect();
        dangling.sort_by(|a, b| a.target.cmp(&b.target).then(a.owner_label.cmp(&b.owner_label)));
        dangling
    }
}

fn index_key(matching: NameMatching, name: &str) -> String {
    match matching {
        NameMatching::CaseSensitive => name.to_string(),
        NameMatching::CaseInsensitive => name.to_lowercase(),
    }
}

impl ScenarioDocument {
    /// Every object referencing the entity named `name`, one entry per owner.
    pub fn find_references(&self, kind: ReferenceKind, name: &str) -> Vec<Reference> {
        ReferenceIndex::build(self).references_to(kind, name).to_vec()
    }
}
