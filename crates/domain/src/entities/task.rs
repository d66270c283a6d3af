//! Tasks, concepts, and the triggers that start and end them

use serde::{Deserialize, Serialize};

use crate::entities::Condition;
use crate::value_objects::Coordinate;
use crate::{ConceptId, TaskId};

// ============================================================================
// Trigger
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TriggerKind {
    ScenarioStarted,
    /// Fires when the named team member's entity reaches a location
    EntityLocation {
        team_member_ref: Option<String>,
        location: Option<Coordinate>,
    },
    /// Fires when the learner presses the named learner action
    LearnerActionReference { learner_action_ref: Option<String> },
    /// Fires when the named strategy is applied
    StrategyApplied { strategy_ref: Option<String> },
    TaskEnded { task: Option<TaskId> },
    ElapsedTime { seconds: u32 },
}

/// A strategy to apply when the trigger fires.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerMessage {
    pub strategy_ref: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trigger {
    pub kind: TriggerKind,
    pub message: Option<TriggerMessage>,
}

impl Trigger {
    pub fn new(kind: TriggerKind) -> Self {
        Self {
            kind,
            message: None,
        }
    }

    pub fn with_strategy_message(mut self, strategy: impl Into<String>) -> Self {
        self.message = Some(TriggerMessage {
            strategy_ref: Some(strategy.into()),
        });
        self
    }
}

// ============================================================================
// Concept
// ============================================================================

/// A concept holds either sub-concepts or conditions, never both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "children", content = "items", rename_all = "snake_case")]
pub enum ConceptChildren {
    Concepts(Vec<Concept>),
    Conditions(Vec<Condition>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Concept {
    pub id: ConceptId,
    pub name: String,
    pub children: ConceptChildren,
}

impl Concept {
    pub fn with_conditions(name: impl Into<String>, conditions: Vec<Condition>) -> Self {
        Self {
            id: ConceptId::new(),
            name: name.into(),
            children: ConceptChildren::Conditions(conditions),
        }
    }

    pub fn with_concepts(name: impl Into<String>, concepts: Vec<Concept>) -> Self {
        Self {
            id: ConceptId::new(),
            name: name.into(),
            children: ConceptChildren::Concepts(concepts),
        }
    }

    /// Every condition in this concept and its descendants.
    pub fn conditions(&self) -> Vec<&Condition> {
        match &self.children {
            ConceptChildren::Conditions(conditions) => conditions.iter().collect(),
            ConceptChildren::Concepts(concepts) => {
                concepts.iter().flat_map(|c| c.conditions()).collect()
            }
        }
    }

    pub fn conditions_mut(&mut self) -> Vec<&mut Condition> {
        match &mut self.children {
            ConceptChildren::Conditions(conditions) => conditions.iter_mut().collect(),
            ConceptChildren::Concepts(concepts) => concepts
                .iter_mut()
                .flat_map(|c| c.conditions_mut())
                .collect(),
        }
    }
}

// ============================================================================
// Task
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub name: String,
    pub start_triggers: Vec<Trigger>,
    pub end_triggers: Vec<Trigger>,
    pub concepts: Vec<Concept>,
}

impl Task {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: TaskId::new(),
            name: name.into(),
            start_triggers: Vec::new(),
            end_triggers: Vec::new(),
            concepts: Vec::new(),
        }
    }

    pub fn with_start_trigger(mut self, trigger: Trigger) -> Self {
        self.start_triggers.push(trigger);
        self
    }

    pub fn with_end_trigger(mut self, trigger: Trigger) -> Self {
        self.end_triggers.push(trigger);
        self
    }

    pub fn with_concept(mut self, concept: Concept) -> Self {
        self.concepts.push(concept);
        self
    }

    pub fn triggers(&self) -> impl Iterator<Item = &Trigger> {
        self.start_triggers.iter().chain(self.end_triggers.iter())
    }

    pub fn triggers_mut(&mut self) -> impl Iterator<Item = &mut Trigger> {
        self.start_triggers
            .iter_mut()
            .chain(self.end_triggers.iter_mut())
    }
}
