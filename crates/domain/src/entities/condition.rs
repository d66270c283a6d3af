//! Conditions - assessment rules attached to concepts
//!
//! A condition's input determines which places of interest it watches.

use serde::{Deserialize, Serialize};

use crate::ConditionId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Checkpoint {
    pub point: Option<String>,
    /// Time the learner should reach the checkpoint, as scenario-relative seconds
    pub at_time_secs: u32,
    pub window_of_time_secs: u32,
}

impl Checkpoint {
    pub fn new(point: impl Into<String>, at_time_secs: u32) -> Self {
        Self {
            point: Some(point.into()),
            at_time_secs,
            window_of_time_secs: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entrance {
    pub name: String,
    pub inside: Option<String>,
    pub outside: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConditionInput {
    AvoidLocation {
        point_refs: Vec<Option<String>>,
        area_refs: Vec<Option<String>>,
        /// The learner must press "Assess My Location" for this condition to evaluate
        require_learner_action: bool,
    },
    IdentifyPois { point_refs: Vec<Option<String>> },
    CheckpointPace { checkpoints: Vec<Checkpoint> },
    CheckpointProgress { checkpoints: Vec<Checkpoint> },
    CorridorBoundary {
        path_ref: Option<String>,
        buffer_width_percent: f64,
    },
    CorridorPosture { path_ref: Option<String> },
    EnterArea { entrances: Vec<Entrance> },
    DetectObjects { point_refs: Vec<Option<String>> },
    /// Conditions that watch no places, identified by implementation name
    Other { implementation: String },
}

impl ConditionInput {
    pub fn label(&self) -> &str {
        match self {
            Self::AvoidLocation { .. } => "Avoid Location",
            Self::IdentifyPois { .. } => "Identify POIs",
            Self::CheckpointPace { .. } => "Checkpoint Pace",
            Self::CheckpointProgress { .. } => "Checkpoint Progress",
            Self::CorridorBoundary { .. } => "Corridor Boundary",
            Self::CorridorPosture { .. } => "Corridor Posture",
            Self::EnterArea { .. } => "Enter Area",
            Self::DetectObjects { .. } => "Detect Objects",
            Self::Other { implementation } => implementation,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    pub id: ConditionId,
    pub input: ConditionInput,
    /// Team members (or teams) whose entities this condition assesses
    pub team_member_refs: Vec<Option<String>>,
}

impl Condition {
    pub fn new(input: ConditionInput) -> Self {
        Self {
            id: ConditionId::new(),
            input,
            team_member_refs: Vec::new(),
        }
    }

    pub fn with_team_member_ref(mut self, name: impl Into<String>) -> Self {
        self.team_member_refs.push(Some(name.into()));
        self
    }

    pub fn avoid_location(points: &[&str], areas: &[&str]) -> Self {
        Self::new(ConditionInput::AvoidLocation {
            point_refs: points.iter().map(|p| Some(p.to_string())).collect(),
            area_refs: areas.iter().map(|a| Some(a.to_string())).collect(),
            require_learner_action: false,
        })
    }

    /// True for avoid-location conditions that need the learner to assess their location.
    pub fn requires_assess_my_location(&self) -> bool {
        matches!(
            self.input,
            ConditionInput::AvoidLocation {
                require_learner_action: true,
                ..
            }
        )
    }

    pub(crate) fn clear_learner_action_requirement(&mut self) {
        if let ConditionInput::AvoidLocation {
            require_learner_action,
            ..
        } = &mut self.input
        {
            *require_learner_action = false;
        }
    }
}
