//! Scenario aggregate - the document being authored
//!
//! The scenario owns every place of interest, team unit, learner action,
//! strategy, task, and state transition. Cross-references between them are
//! plain names, so renames and deletes go through the authoring commands in
//! [`crate::authoring`], which keep those names consistent.
//!
//! # Rustic DDD Design
//!
//! - **Private fields**: collections are only reachable through accessors
//! - **Builder pattern**: fluent `with_*` methods for assembling a document
//! - **Crate-private mutation**: only the authoring layer edits collections in place

use serde::{Deserialize, Serialize};

use crate::entities::{
    Condition, LearnerAction, PlaceOfInterest, StateTransition, Strategy, Task, TeamOrganization,
    Trigger,
};
use crate::value_objects::NameMatching;
use crate::{LearnerActionId, PlaceId, StrategyId};

/// A scenario document.
///
/// # Example
///
/// ```
/// use gat_domain::aggregates::ScenarioDocument;
/// use gat_domain::entities::Point;
///
/// let doc = ScenarioDocument::new("Route Clearance").with_place(Point::new("Rally Point"));
/// assert_eq!(doc.places().len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioDocument {
    name: String,
    description: Option<String>,

    places: Vec<PlaceOfInterest>,
    teams: TeamOrganization,
    learner_actions: Vec<LearnerAction>,
    strategies: Vec<Strategy>,
    tasks: Vec<Task>,
    state_transitions: Vec<StateTransition>,
    /// Triggers that end the whole scenario
    end_triggers: Vec<Trigger>,

    #[serde(default)]
    name_matching: NameMatching,
}

/// Disjoint mutable borrows of the collections that hold name references.
pub(crate) struct ScenarioPartsMut<'a> {
    pub learner_actions: &'a mut Vec<LearnerAction>,
    pub strategies: &'a mut Vec<Strategy>,
    pub tasks: &'a mut Vec<Task>,
    pub state_transitions: &'a mut Vec<StateTransition>,
    pub end_triggers: &'a mut Vec<Trigger>,
}

impl ScenarioDocument {
    // =========================================================================
    // Constructor
    // =========================================================================

    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            places: Vec::new(),
            teams: TeamOrganization::default(),
            learner_actions: Vec::new(),
            strategies: Vec::new(),
            tasks: Vec::new(),
            state_transitions: Vec::new(),
            end_triggers: Vec::new(),
            name_matching: NameMatching::default(),
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    #[inline]
    pub fn places(&self) -> &[PlaceOfInterest] {
        &self.places
    }

    #[inline]
    pub fn teams(&self) -> &TeamOrganization {
        &self.teams
    }

    #[inline]
    pub fn learner_actions(&self) -> &[LearnerAction] {
        &self.learner_actions
    }

    #[inline]
    pub fn strategies(&self) -> &[Strategy] {
        &self.strategies
    }

    #[inline]
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    #[inline]
    pub fn state_transitions(&self) -> &[StateTransition] {
        &self.state_transitions
    }

    #[inline]
    pub fn end_triggers(&self) -> &[Trigger] {
        &self.end_triggers
    }

    #[inline]
    pub fn name_matching(&self) -> NameMatching {
        self.name_matching
    }

    /// Every condition in every task, depth first.
    pub fn conditions(&self) -> Vec<&Condition> {
        self.tasks
            .iter()
            .flat_map(|t| t.concepts.iter())
            .flat_map(|c| c.conditions())
            .collect()
    }

    pub fn place(&self, id: PlaceId) -> Option<&PlaceOfInterest> {
        self.places.iter().find(|p| p.id() == id)
    }

    pub fn learner_action(&self, id: LearnerActionId) -> Option<&LearnerAction> {
        self.learner_actions.iter().find(|a| a.id == id)
    }

    pub fn strategy(&self, id: StrategyId) -> Option<&Strategy> {
        self.strategies.iter().find(|s| s.id == id)
    }

    // =========================================================================
    // Builder Methods
    // =========================================================================

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_place(mut self, place: impl Into<PlaceOfInterest>) -> Self {
        self.places.push(place.into());
        self
    }

    pub fn with_teams(mut self, teams: TeamOrganization) -> Self {
        self.teams = teams;
        self
    }

    pub fn with_learner_action(mut self, action: LearnerAction) -> Self {
        self.learner_actions.push(action);
        self
    }

    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategies.push(strategy);
        self
    }

    pub fn with_task(mut self, task: Task) -> Self {
        self.tasks.push(task);
        self
    }

    pub fn with_state_transition(mut self, transition: StateTransition) -> Self {
        self.state_transitions.push(transition);
        self
    }

    pub fn with_end_trigger(mut self, trigger: Trigger) -> Self {
        self.end_triggers.push(trigger);
        self
    }

    pub fn with_name_matching(mut self, name_matching: NameMatching) -> Self {
        self.name_matching = name_matching;
        self
    }

    // =========================================================================
    // Crate-private Mutation
    // =========================================================================

    pub(crate) fn places_mut(&mut self) -> &mut Vec<PlaceOfInterest> {
        &mut self.places
    }

    pub(crate) fn teams_mut(&mut self) -> &mut TeamOrganization {
        &mut self.teams
    }

    pub(crate) fn learner_actions_mut(&mut self) -> &mut Vec<LearnerAction> {
        &mut self.learner_actions
    }

    pub(crate) fn strategies_mut(&mut self) -> &mut Vec<Strategy> {
        &mut self.strategies
    }

    pub(crate) fn tasks_mut(&mut self) -> &mut Vec<Task> {
        &mut self.tasks
    }

    pub(crate) fn state_transitions_mut(&mut self) -> &mut Vec<StateTransition> {
        &mut self.state_transitions
    }

    pub(crate) fn end_triggers_mut(&mut self) -> &mut Vec<Trigger> {
        &mut self.end_triggers
    }

    pub(crate) fn parts_mut(&mut self) -> ScenarioPartsMut<'_> {
        ScenarioPartsMut {
            learner_actions: &mut self.learner_actions,
            strategies: &mut self.strategies,
            tasks: &mut self.tasks,
            state_transitions: &mut self.state_transitions,
            end_triggers: &mut self.end_triggers,
        }
    }

    pub(crate) fn conditions_mut(&mut self) -> Vec<&mut Condition> {
        self.tasks
            .iter_mut()
            .flat_map(|t| t.concepts.iter_mut())
            .flat_map(|c| c.conditions_mut())
            .collect()
    }
}
