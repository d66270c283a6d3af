//! Learner actions - buttons offered to the learner during a scenario

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::LearnerActionId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LearnerActionType {
    AssessMyLocation,
    ApplyStrategy,
    StartPaceCount,
    EndPaceCount,
    SpotReport,
    ExplosiveHazardSpotReport,
    NineLineReport,
    Radio,
    TutorMe,
}

impl fmt::Display for LearnerActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::AssessMyLocation => "Assess My Location",
            Self::ApplyStrategy => "Apply Strategy",
            Self::StartPaceCount => "Start Pace Count",
            Self::EndPaceCount => "End Pace Count",
            Self::SpotReport => "Spot Report",
            Self::ExplosiveHazardSpotReport => "Explosive Hazard Spot Report",
            Self::NineLineReport => "Nine Line Report",
            Self::Radio => "Radio",
            Self::TutorMe => "Tutor Me",
        };
        write!(f, "{}", label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearnerAction {
    pub id: LearnerActionId,
    pub name: String,
    pub action_type: LearnerActionType,
    pub description: Option<String>,
    /// Strategy applied when the learner presses the action. Only meaningful for `ApplyStrategy`.
    pub strategy_ref: Option<String>,
}

impl LearnerAction {
    pub fn new(name: impl Into<String>, action_type: LearnerActionType) -> Self {
        Self {
            id: LearnerActionId::new(),
            name: name.into(),
            action_type,
            description: None,
            strategy_ref: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_strategy_ref(mut self, strategy: impl Into<String>) -> Self {
        self.strategy_ref = Some(strategy.into());
        self
    }
}
