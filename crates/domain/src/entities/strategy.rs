//! Strategies - instructional responses the tutor can apply during a scenario

use serde::{Deserialize, Serialize};

use crate::value_objects::Coordinate;
use crate::StrategyId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Strategy {
    pub id: StrategyId,
    pub name: String,
    pub activities: Vec<StrategyActivity>,
}

impl Strategy {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: StrategyId::new(),
            name: name.into(),
            activities: Vec::new(),
        }
    }

    pub fn with_activity(mut self, activity: StrategyActivity) -> Self {
        self.activities.push(activity);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "activity", rename_all = "snake_case")]
pub enum StrategyActivity {
    /// Feedback delivered to the learner, optionally to specific teams or members
    InstructionalIntervention {
        message: String,
        team_refs: Vec<Option<String>>,
    },
    /// A change to the training environment
    ScenarioAdaptation { adaptation: EnvironmentAdaptation },
    MidLessonMedia { media: String },
    PerformanceAssessment { description: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EnvironmentAdaptation {
    HighlightObjects {
        name: String,
        place_of_interest_ref: Option<String>,
        team_member_ref: Option<String>,
    },
    CreateBreadcrumbs {
        place_of_interest_refs: Vec<Option<String>>,
        team_member_ref: Option<String>,
    },
    FatigueRecovery {
        team_member_ref: Option<String>,
        rate: f64,
    },
    Endurance {
        team_member_ref: Option<String>,
        value: f64,
    },
    Teleport {
        team_member_ref: Option<String>,
        coordinate: Option<Coordinate>,
    },
    Overcast { value: f64 },
}
