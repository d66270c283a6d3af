//! Rename and delete propagation across name references.

use serde::{Deserialize, Serialize};

use crate::aggregates::ScenarioDocument;
use crate::entities::TeamUnit;
use crate::error::DomainError;
use crate::value_objects::is_blank;

use super::registry::{EntityRef, RemovedEntity};
use super::slots::owner_slots_mut;
use super::{Reference, ReferenceKind};

/// Result of deleting a named entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteOutcome {
    pub removed: RemovedEntity,
    /// References that were cleared, or left dangling by `delete_only`
    pub references: Vec<Reference>,
}

impl ScenarioDocument {
    /// Rewrite every reference to `old_name` so it names `new_name`.
    ///
    /// A blank `new_name` clears the referencing fields. Does nothing when
    /// `old_name` is blank or equal to `new_name`, so repeating a rename is a
    /// no-op. Returns the number of fields rewritten.
    pub fn propagate_rename(
        &mut self,
        entity: EntityRef,
        old_name: &str,
        new_name: &str,
    ) -> Result<usize, DomainError> {
        if !self.contains_entity(entity) {
            return Err(DomainError::missing_reference_target(entity.kind(), old_name));
        }
        Ok(self.rewrite_references(entity.kind(), old_name, new_name))
    }

    /// Remove the entity, then clear every reference to it (and, for teams,
    /// to every unit inside it).
    ///
    /// References are only cleared once the removal succeeded, so a refused
    /// delete leaves the document untouched.
    pub fn delete_with_reference_cleanup(
        &mut self,
        entity: EntityRef,
    ) -> Result<DeleteOutcome, DomainError> {
        let names = self.names_removed_with(entity)?;
        let references = self.references_to_all(entity.kind(), &names);
        let removed = self.remove_entity(entity)?;
        for name in &names {
            self.rewrite_references(entity.kind(), name, "");
        }
        Ok(DeleteOutcome {
            removed,
            references,
        })
    }

    /// Remove the entity and leave its references dangling for validation to flag.
    pub fn delete_only(&mut self, entity: EntityRef) -> Result<DeleteOutcome, DomainError> {
        let names = self.names_removed_with(entity)?;
        let references = self.references_to_all(entity.kind(), &names);
        let removed = self.remove_entity(entity)?;
        Ok(DeleteOutcome {
            removed,
            references,
        })
    }

    pub(crate) fn rewrite_references(
        &mut self,
        kind: ReferenceKind,
        old_name: &str,
        new_name: &str,
    ) -> usize {
        if is_blank(old_name) || old_name == new_name {
            return 0;
        }
        let matching = self.name_matching();
        let replacement = (!is_blank(new_name)).then(|| new_name.to_string());

        let mut rewritten = 0;
        for owner in owner_slots_mut(self, kind) {
            for slot in owner.slots {
                if slot.as_deref().is_some_and(|name| matching.matches(name, old_name)) {
                    *slot = replacement.clone();
                    rewritten += 1;
                }
            }
        }
        rewritten
    }

    /// The entity's own name plus, for teams, the names of every unit it contains.
    pub(crate) fn names_removed_with(&self, entity: EntityRef) -> Result<Vec<String>, DomainError> {
        let name = self
            .name_of(entity)
            .ok_or_else(|| DomainError::missing_reference_target(entity.kind(), entity.to_string()))?
            .to_string();
        let mut names = vec![name];

        if let EntityRef::TeamUnit(id) = entity {
            if let Some(TeamUnit::Team(team)) = self.teams().find(id) {
                names.extend(team.descendants().into_iter().map(|u| u.name().to_string()));
            }
        }
        Ok(names)
    }

    pub(crate) fn references_to_all(&self, kind: ReferenceKind, names: &[String]) -> Vec<Reference> {
        let index = super::ReferenceIndex::build(self);
        names
            .iter()
            .flat_map(|name| index.references_to(kind, name).iter().cloned())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{
        Concept, Condition, ConditionInput, LearnerAction, LearnerActionType, Point, StateTransition,
        Strategy, Task, Team, TeamMember, TeamOrganization, Trigger, TriggerKind,
    };
    use crate::{PlaceId, StrategyId};

    fn create_test_document() -> (ScenarioDocument, PlaceId) {
        let p1 = Point::new("P1");
        let p1_id = p1.id;
        let doc = ScenarioDocument::new("Test")
            .with_place(p1)
            .with_place(Point::new("P2"))
            .with_task(Task::new("Patrol").with_concept(Concept::with_conditions(
                "Movement",
                vec![
                    Condition::avoid_location(&["P1", "P2"], &["P1"]),
                    Condition::new(ConditionInput::CorridorPosture {
                        path_ref: Some("P1".into()),
                    }),
                ],
            )));
        (doc, p1_id)
    }

    fn avoid_refs(doc: &ScenarioDocument) -> Vec<Option<String>> {
        match &doc.conditions()[0].input {
            ConditionInput::AvoidLocation {
                point_refs,
                area_refs,
                ..
            } => point_refs.iter().chain(area_refs.iter()).cloned().collect(),
            other => panic!("unexpected input {:?}", other),
        }
    }

    mod rename {
        use super::*;

        #[test]
        fn rewrites_every_reference() {
            let (mut doc, p1) = create_test_document();
            doc.rename_entity(EntityRef::Place(p1), "Rally").expect("rename");
            let rewritten = doc
                .propagate_rename(EntityRef::Place(p1), "P1", "Rally")
                .expect("propagate");

            assert_eq!(rewritten, 3);
            assert_eq!(
                avoid_refs(&doc),
                vec![Some("Rally".into()), Some("P2".into()), Some("Rally".into())]
            );
            assert!(doc.find_references(ReferenceKind::PlaceOfInterest, "P1").is_empty());
            assert_eq!(doc.find_references(ReferenceKind::PlaceOfInterest, "Rally").len(), 2);
        }

        #[test]
        fn second_identical_rename_is_a_no_op() {
            let (mut doc, p1) = create_test_document();
            doc.rename_entity(EntityRef::Place(p1), "Rally").expect("rename");
            doc.propagate_rename(EntityRef::Place(p1), "P1", "Rally").expect("first");
            let after_first = doc.clone();

            let rewritten = doc
                .propagate_rename(EntityRef::Place(p1), "P1", "Rally")
                .expect("second");
            assert_eq!(rewritten, 0);
            assert_eq!(doc, after_first);
        }

        #[test]
        fn blank_old_name_or_same_name_does_nothing() {
            let (mut doc, p1) = create_test_document();
            let before = doc.clone();
            assert_eq!(doc.propagate_rename(EntityRef::Place(p1), "", "X").expect("blank"), 0);
            assert_eq!(doc.propagate_rename(EntityRef::Place(p1), "P1", "P1").expect("same"), 0);
            assert_eq!(doc, before);
        }

        #[test]
        fn blank_new_name_clears_references() {
            let (mut doc, p1) = create_test_document();
            doc.propagate_rename(EntityRef::Place(p1), "P1", "").expect("clear");
            assert_eq!(avoid_refs(&doc), vec![None, Some("P2".into()), None]);
        }

        #[test]
        fn missing_target_is_an_error() {
            let (mut doc, _) = create_test_document();
            let result = doc.propagate_rename(EntityRef::Strategy(StrategyId::new()), "Old", "New");
            assert!(matches!(result, Err(DomainError::MissingReferenceTarget { .. })));
        }

        #[test]
        fn strategy_rename_reaches_learner_actions_and_transitions() {
            let strategy = Strategy::new("Hint");
            let id = strategy.id;
            let mut doc = ScenarioDocument::new("Test")
                .with_strategy(strategy)
                .with_learner_action(
                    LearnerAction::new("Ask", LearnerActionType::ApplyStrategy).with_strategy_ref("Hint"),
                )
                .with_state_transition(StateTransition::new("Below").with_strategy_ref("Hint"));

            doc.rename_entity(EntityRef::Strategy(id), "Prompt").expect("rename");
            let rewritten = doc
                .propagate_rename(EntityRef::Strategy(id), "Hint", "Prompt")
                .expect("propagate");
            assert_eq!(rewritten, 2);
            assert_eq!(doc.learner_actions()[0].strategy_ref.as_deref(), Some("Prompt"));
            assert_eq!(doc.state_transitions()[0].strategy_refs, vec![Some("Prompt".into())]);
        }
    }

    mod delete {
        use super::*;

        #[test]
        fn cleanup_clears_references_then_removes() {
            let (mut doc, p1) = create_test_document();
            let outcome = doc
                .delete_with_reference_cleanup(EntityRef::Place(p1))
                .expect("delete");

            assert_eq!(outcome.references.len(), 2);
            assert_eq!(outcome.references.iter().map(|r| r.count).sum::<usize>(), 3);
            assert!(doc.place(p1).is_none());
            assert_eq!(avoid_refs(&doc), vec![None, Some("P2".into()), None]);
        }

        #[test]
        fn delete_only_leaves_references_dangling() {
            let (mut doc, p1) = create_test_document();
            let outcome = doc.delete_only(EntityRef::Place(p1)).expect("delete");

            assert_eq!(outcome.references.len(), 2);
            assert!(doc.place(p1).is_none());
            let index = crate::authoring::ReferenceIndex::build(&doc);
            assert_eq!(index.dangling(&doc).len(), 2);
        }

        #[test]
        fn deleting_a_team_clears_member_references() {
            let member = TeamMember::new("Alpha Lead");
            let alpha = Team::new("Alpha").with_unit(member);
            let alpha_id = alpha.id;
            let mut doc = ScenarioDocument::new("Test")
                .with_teams(TeamOrganization::new(Team::new("Platoon").with_unit(alpha)))
                .with_task(Task::new("Patrol").with_start_trigger(Trigger::new(
                    TriggerKind::EntityLocation {
                        team_member_ref: Some("Alpha Lead".into()),
                        location: None,
                    },
                )));

            let outcome = doc
                .delete_with_reference_cleanup(EntityRef::TeamUnit(alpha_id))
                .expect("delete");
            assert_eq!(outcome.references.len(), 1);
            assert!(doc.find_references(ReferenceKind::TeamUnit, "Alpha Lead").is_empty());
        }

        #[test]
        fn refused_root_team_delete_keeps_references() {
            let root = Team::new("Platoon");
            let root_id = root.id;
            let mut doc = ScenarioDocument::new("Test")
                .with_teams(TeamOrganization::new(root.with_unit(TeamMember::new("Alpha Lead"))))
                .with_end_trigger(Trigger::new(TriggerKind::EntityLocation {
                    team_member_ref: Some("Platoon".into()),
                    location: None,
                }));
            let before = doc.clone();

            let result = doc.delete_with_reference_cleanup(EntityRef::TeamUnit(root_id));
            assert!(matches!(result, Err(DomainError::Constraint(_))));
            assert_eq!(doc, before);
            assert_eq!(doc.find_references(ReferenceKind::TeamUnit, "Platoon").len(), 1);
        }

        #[test]
        fn deleting_missing_entity_fails_without_changes() {
            let (mut doc, _) = create_test_document();
            let before = doc.clone();
            let result = doc.delete_with_reference_cleanup(EntityRef::Place(PlaceId::new()));
            assert!(matches!(result, Err(DomainError::MissingReferenceTarget { .. })));
            assert_eq!(doc, before);
        }
    }
}
