use serde::{Deserialize, Serialize};

use crate::StateTransitionId;

/// Maps a change in learner state to the strategies the tutor may choose from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateTransition {
    pub id: StateTransitionId,
    pub name: String,
    pub strategy_refs: Vec<Option<String>>,
}

impl StateTransition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: StateTransitionId::new(),
            name: name.into(),
            strategy_refs: Vec::new(),
        }
    }

    pub fn with_strategy_ref(mut self, strategy: impl Into<String>) -> Self {
        self.strategy_refs.push(Some(strategy.into()));
        self
    }
}
