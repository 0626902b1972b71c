use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

use crate::data::scenarios::ScenarioOption;

/// Step-based scoring: every option click earns or loses a fixed amount.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringRules {
    pub correct_points: i64,
    pub costly_points: i64,
}

impl Default for ScoringRules {
    fn default() -> Self {
        Self {
            correct_points: 20,
            costly_points: -10,
        }
    }
}

impl ScoringRules {
    /// Independent of the resulting risk; a fatal click is always costly.
    pub fn delta_for(&self, option: &ScenarioOption) -> i64 {
        if option.is_costly() {
            self.costly_points
        } else {
            self.correct_points
        }
    }
}
