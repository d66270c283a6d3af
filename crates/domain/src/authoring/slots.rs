//! Which fields of which objects hold a name reference, per reference kind.
//!
//! Every cross-reference in a scenario is an `Option<String>` field. This module
//! is the single place that knows where those fields live, so the tracker and
//! the propagator never walk the document by hand.

use crate::aggregates::scenario::ScenarioPartsMut;
use crate::aggregates::ScenarioDocument;
use crate::entities::{
    Condition, ConditionInput, EnvironmentAdaptation, LearnerAction, StateTransition, Strategy,
    StrategyActivity, Trigger, TriggerKind,
};

use super::references::{ReferenceKind, ReferenceOwner};

pub(crate) trait ReferenceSlots {
    fn slots(&self, kind: ReferenceKind) -> Vec<&Option<String>>;
    fn slots_mut(&mut self, kind: ReferenceKind) -> Vec<&mut Option<String>>;
}

impl ReferenceSlots for Condition {
    fn slots(&self, kind: ReferenceKind) -> Vec<&Option<String>> {
        match kind {
            ReferenceKind::PlaceOfInterest => match &self.input {
                ConditionInput::AvoidLocation {
                    point_refs,
                    area_refs,
                    ..
                } => point_refs.iter().chain(area_refs.iter()).collect(),
                ConditionInput::IdentifyPois { point_refs }
                | ConditionInput::DetectObjects { point_refs } => point_refs.iter().collect(),
                ConditionInput::CheckpointPace { checkpoints }
                | ConditionInput::CheckpointProgress { checkpoints } => {
                    checkpoints.iter().map(|c| &c.point).collect()
                }
                ConditionInput::CorridorBoundary { path_ref, .. }
                | ConditionInput::CorridorPosture { path_ref } => vec![path_ref],
                ConditionInput::EnterArea { entrances } => entrances
                    .iter()
                    .flat_map(|e| [&e.inside, &e.outside])
                    .collect(),
                ConditionInput::Other { .. } => Vec::new(),
            },
            ReferenceKind::TeamUnit => self.team_member_refs.iter().collect(),
            ReferenceKind::LearnerAction | ReferenceKind::Strategy => Vec::new(),
        }
    }

    fn slots_mut(&mut self, kind: ReferenceKind) -> Vec<&mut Option<String>> {
        match kind {
            ReferenceKind::PlaceOfInterest => match &mut self.input {
                ConditionInput::AvoidLocation {
                    point_refs,
                    area_refs,
                    ..
                } => point_refs.iter_mut().chain(area_refs.iter_mut()).collect(),
                ConditionInput::IdentifyPois { point_refs }
                | ConditionInput::DetectObjects { point_refs } => point_refs.iter_mut().collect(),
                ConditionInput::CheckpointPace { checkpoints }
                | ConditionInput::CheckpointProgress { checkpoints } => {
                    checkpoints.iter_mut().map(|c| &mut c.point).collect()
                }
                ConditionInput::CorridorBoundary { path_ref, .. }
                | ConditionInput::CorridorPosture { path_ref } => vec![path_ref],
                ConditionInput::EnterArea { entrances } => entrances
                    .iter_mut()
                    .flat_map(|e| [&mut e.inside, &mut e.outside])
                    .collect(),
                ConditionInput::Other { .. } => Vec::new(),
            },
            ReferenceKind::TeamUnit => self.team_member_refs.iter_mut().collect(),
            ReferenceKind::LearnerAction | ReferenceKind::Strategy => Vec::new(),
        }
    }
}

impl ReferenceSlots for Strategy {
    fn slots(&self, kind: ReferenceKind) -> Vec<&Option<String>> {
        let mut out = Vec::new();
        for activity in &self.activities {
            match (kind, activity) {
                (
                    ReferenceKind::TeamUnit,
                    StrategyActivity::InstructionalIntervention { team_refs, .. },
                ) => out.extend(team_refs.iter()),
                (_, StrategyActivity::ScenarioAdaptation { adaptation }) => {
                    adaptation_slots(adaptation, kind, &mut out)
                }
                _ => {}
            }
        }
        out
    }

    fn slots_mut(&mut self, kind: ReferenceKind) -> Vec<&mut Option<String>> {
        let mut out = Vec::new();
        for activity in self.activities.iter_mut() {
            match (kind, activity) {
                (
                    ReferenceKind::TeamUnit,
                    StrategyActivity::InstructionalIntervention { team_refs, .. },
                ) => out.extend(team_refs.iter_mut()),
                (_, StrategyActivity::ScenarioAdaptation { adaptation }) => {
                    adaptation_slots_mut(adaptation, kind, &mut out)
                }
                _ => {}
            }
        }
        out
    }
}

fn adaptation_slots<'a>(
    adaptation: &'a EnvironmentAdaptation,
    kind: ReferenceKind,
    out: &mut Vec<&'a Option<String>>,
) {
    match (kind, adaptation) {
        (
            ReferenceKind::PlaceOfInterest,
            EnvironmentAdaptation::HighlightObjects {
                place_of_interest_ref,
                ..
            },
        ) => out.push(place_of_interest_ref),
        (
            ReferenceKind::PlaceOfInterest,
            EnvironmentAdaptation::CreateBreadcrumbs {
                place_of_interest_refs,
                ..
            },
        ) => out.extend(place_of_interest_refs.iter()),
        (
            ReferenceKind::TeamUnit,
            EnvironmentAdaptation::HighlightObjects {
                team_member_ref, ..
            }
            | EnvironmentAdaptation::CreateBreadcrumbs {
                team_member_ref, ..
            }
            | EnvironmentAdaptation::FatigueRecovery {
                team_member_ref, ..
            }
            | EnvironmentAdaptation::Endurance {
                team_member_ref, ..
            }
            | EnvironmentAdaptation::Teleport {
                team_member_ref, ..
            },
        ) => out.push(team_member_ref),
        _ => {}
    }
}

fn adaptation_slots_mut<'a>(
    adaptation: &'a mut EnvironmentAdaptation,
    kind: ReferenceKind,
    out: &mut Vec<&'a mut Option<String>>,
) {
    match (kind, adaptation) {
        (
            ReferenceKind::PlaceOfInterest,
            EnvironmentAdaptation::HighlightObjects {
                place_of_interest_ref,
                ..
            },
        ) => out.push(place_of_interest_ref),
        (
            ReferenceKind::PlaceOfInterest,
            EnvironmentAdaptation::CreateBreadcrumbs {
                place_of_interest_refs,
                ..
            },
        ) => out.extend(place_of_interest_refs.iter_mut()),
        (
            ReferenceKind::TeamUnit,
            EnvironmentAdaptation::HighlightObjects {
                team_member_ref, ..
            }
            | EnvironmentAdaptation::CreateBreadcrumbs {
                team_member_ref, ..
            }
            | EnvironmentAdaptation::FatigueRecovery {
                team_member_ref, ..
            }
            | EnvironmentAdaptation::Endurance {
                team_member_ref, ..
            }
            | EnvironmentAdaptation::Teleport {
                team_member_ref, ..
            },
        ) => out.push(team_member_ref),
        _ => {}
    }
}

impl ReferenceSlots for Trigger {
    fn slots(&self, kind: ReferenceKind) -> Vec<&Option<String>> {
        let mut out = Vec::new();
        match (kind, &self.kind) {
            (ReferenceKind::TeamUnit, TriggerKind::EntityLocation { team_member_ref, .. }) => {
                out.push(team_member_ref)
            }
            (
                ReferenceKind::LearnerAction,
                TriggerKind::LearnerActionReference { learner_action_ref },
            ) => out.push(learner_action_ref),
            (ReferenceKind::Strategy, TriggerKind::StrategyApplied { strategy_ref }) => {
                out.push(strategy_ref)
            }
            _ => {}
        }
        if let (ReferenceKind::Strategy, Some(message)) = (kind, &self.message) {
            out.push(&message.strategy_ref);
        }
        out
    }

    fn slots_mut(&mut self, kind: ReferenceKind) -> Vec<&mut Option<String>> {
        let mut out = Vec::new();
        match (kind, &mut self.kind) {
            (ReferenceKind::TeamUnit, TriggerKind::EntityLocation { team_member_ref, .. }) => {
                out.push(team_member_ref)
            }
            (
                ReferenceKind::LearnerAction,
                TriggerKind::LearnerActionReference { learner_action_ref },
            ) => out.push(learner_action_ref),
            (ReferenceKind::Strategy, TriggerKind::StrategyApplied { strategy_ref }) => {
                out.push(strategy_ref)
            }
            _ => {}
        }
        if let (ReferenceKind::Strategy, Some(message)) = (kind, &mut self.message) {
            out.push(&mut message.strategy_ref);
        }
        out
    }
}

impl ReferenceSlots for LearnerAction {
    fn slots(&self, kind: ReferenceKind) -> Vec<&Option<String>> {
        match kind {
            ReferenceKind::Strategy => vec![&self.strategy_ref],
            _ => Vec::new(),
        }
    }

    fn slots_mut(&mut self, kind: ReferenceKind) -> Vec<&mut Option<String>> {
        match kind {
            ReferenceKind::Strategy => vec![&mut self.strategy_ref],
            _ => Vec::new(),
        }
    }
}

impl ReferenceSlots for StateTransition {
    fn slots(&self, kind: ReferenceKind) -> Vec<&Option<String>> {
        match kind {
            ReferenceKind::Strategy => self.strategy_refs.iter().collect(),
            _ => Vec::new(),
        }
    }

    fn slots_mut(&mut self, kind: ReferenceKind) -> Vec<&mut Option<String>> {
        match kind {
            ReferenceKind::Strategy => self.strategy_refs.iter_mut().collect(),
            _ => Vec::new(),
        }
    }
}

// ============================================================================
// Document walk
// ============================================================================

/// The reference fields of one owning object.
pub(crate) struct OwnerSlots<'a> {
    pub owner: ReferenceOwner,
    pub label: String,
    pub slots: Vec<&'a Option<String>>,
}

pub(crate) struct OwnerSlotsMut<'a> {
    pub owner: ReferenceOwner,
    pub slots: Vec<&'a mut Option<String>>,
}

/// Every object in the document holding at least one field of `kind`, in document order.
pub(crate) fn owner_slots(doc: &ScenarioDocument, kind: ReferenceKind) -> Vec<OwnerSlots<'_>> {
    let mut out = Vec::new();
    let mut push = |owner, label, slots| push_owner(&mut out, owner, label, slots);

    for task in doc.tasks() {
        for concept in &task.concepts {
            for condition in concept.conditions() {
                push(
                    ReferenceOwner::Condition(condition.id),
                    format!(
                        "{} condition under concept '{}'",
                        condition.input.label(),
                        concept.name
                    ),
                    condition.slots(kind),
                );
            }
        }
        push(
            ReferenceOwner::TaskTriggers(task.id),
            format!("Triggers of task '{}'", task.name),
            task.triggers().flat_map(|t| t.slots(kind)).collect(),
        );
    }
    for strategy in doc.strategies() {
        push(
            ReferenceOwner::Strategy(strategy.id),
            format!("Strategy '{}'", strategy.name),
            strategy.slots(kind),
        );
    }
    for action in doc.learner_actions() {
        push(
            ReferenceOwner::LearnerAction(action.id),
            format!("Learner action '{}'", action.name),
            action.slots(kind),
        );
    }
    for transition in doc.state_transitions() {
        push(
            ReferenceOwner::StateTransition(transition.id),
            format!("State transition '{}'", transition.name),
            transition.slots(kind),
        );
    }
    push(
        ReferenceOwner::ScenarioEndTriggers,
        "Scenario end triggers".to_string(),
        doc.end_triggers().iter().flat_map(|t| t.slots(kind)).collect(),
    );
    out
}

pub(crate) fn owner_slots_mut(
    doc: &mut ScenarioDocument,
    kind: ReferenceKind,
) -> Vec<OwnerSlotsMut<'_>> {
    let ScenarioPartsMut {
        tasks,
        strategies,
        learner_actions,
        state_transitions,
        end_triggers: scenario_end_triggers,
        ..
    } = doc.parts_mut();
    let mut out = Vec::new();

    for task in tasks.iter_mut() {
        let task_id = task.id;
        let (concepts, start_triggers, end_triggers) = (
            &mut task.concepts,
            &mut task.start_triggers,
            &mut task.end_triggers,
        );
        for concept in concepts.iter_mut() {
            for condition in concept.conditions_mut() {
                let owner = ReferenceOwner::Condition(condition.id);
                push_owner_mut(&mut out, owner, condition.slots_mut(kind));
            }
        }
        push_owner_mut(
            &mut out,
            ReferenceOwner::TaskTriggers(task_id),
            start_triggers
                .iter_mut()
                .chain(end_triggers.iter_mut())
                .flat_map(|t| t.slots_mut(kind))
                .collect(),
        );
    }
    for strategy in strategies.iter_mut() {
        let owner = ReferenceOwner::Strategy(strategy.id);
        push_owner_mut(&mut out, owner, strategy.slots_mut(kind));
    }
    for action in learner_actions.iter_mut() {
        let owner = ReferenceOwner::LearnerAction(action.id);
        push_owner_mut(&mut out, owner, action.slots_mut(kind));
    }
    for transition in state_transitions.iter_mut() {
        let owner = ReferenceOwner::StateTransition(transition.id);
        push_owner_mut(&mut out, owner, transition.slots_mut(kind));
    }
    push_owner_mut(
        &mut out,
        ReferenceOwner::ScenarioEndTriggers,
        scenario_end_triggers
            .iter_mut()
            .flat_map(|t| t.slots_mut(kind))
            .collect(),
    );
    out
}

fn push_owner<'a>(
    out: &mut Vec<OwnerSlots<'a>>,
    owner: ReferenceOwner,
    label: String,
    slots: Vec<&'a Option<String>>,
) {
    if !slots.is_empty() {
        out.push(OwnerSlots {
            owner,
            label,
            slots,
        });
    }
}

fn push_owner_mut<'a>(
    out: &mut Vec<OwnerSlotsMut<'a>>,
    owner: ReferenceOwner,
    slots: Vec<&'a mut Option<String>>,
) {
    if !slots.is_empty() {
        out.push(OwnerSlotsMut { owner, slots });
    }
}
