use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

use crate::data::locations::Location;
use crate::data::scenarios::{Scenario, ScenarioOption, Step};
use crate::rules::risk::Risk;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Phase {
    #[default]
    MapIdle,
    Intro,
    Playing,
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FinishReason {
    Fatal,
    MissionComplete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Speaker {
    Player,
    System,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptLine {
    pub speaker: Speaker,
    pub text: String,
}

/// Per-location session state. Discarded when the player leaves the location.
#[derive(Debug, Clone)]
pub struct PlaythroughState {
    pub location: Location,
    pub scenario: Scenario,
    active_step: usize,
    pub risk: Risk,
    pub transcript: Vec<TranscriptLine>,
    pub chosen: Option<usize>,
}

impl PlaythroughState {
    /// Opens at step `completed_count mod step_count` so consecutive locations
    /// in a mission cycle rotate through the scenario's questions.
    /// Refuses scenarios with no steps or with a step that has no options.
    pub fn begin(location: Location, scenario: Scenario, completed_count: usize) -> Option<Self> {
        if scenario.steps.is_empty() || scenario.first_empty_step().is_some() {
            return None;
        }
        let active_step = completed_count % scenario.steps.len();
        Some(Self {
            location,
            scenario,
            active_step,
            risk: Risk::ZERO,
            transcript: Vec::new(),
            chosen: None,
        })
    }

    pub fn active_step(&self) -> usize {
        self.active_step
    }

    pub fn step(&self) -> &Step {
        &self.scenario.steps[self.active_step]
    }

    pub fn option(&self, index: usize) -> Option<&ScenarioOption> {
        self.step().options.get(index)
    }

    pub fn option_texts(&self) -> Vec<String> {
        self.step().options.iter().map(|o| o.text.clone()).collect()
    }

    pub fn push_line(&mut self, speaker: Speaker, text: impl Into<String>) -> TranscriptLine {
        let line = TranscriptLine {
            speaker,
            text: text.into(),
        };
        self.transcript.push(line.clone());
        line
    }
}

#[derive(Resource, Debug, Default)]
pub struct Progression {
    pub phase: Phase,
    pub finish: Option<FinishReason>,
    pub playthrough: Option<PlaythroughState>,
    /// Bumped whenever a playthrough starts or is abandoned; stale scheduled events are dropped.
    pub serial: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::incident::IncidentType;

    fn scenario(step_count: usize) -> Scenario {
        Scenario {
            id: IncidentType::Earthquake,
            title: "Quake".to_string(),
            intro: "Shaking".to_string(),
            steps: (0..step_count)
                .map(|idx| Step {
                    question: format!("Q{}", idx),
                    options: vec![ScenarioOption {
                        text: "ok".to_string(),
                        risk_delta: 0,
                        feedback: "fine".to_string(),
                    }],
                })
                .collect(),
        }
    }

    fn location() -> Location {
        Location {
            name: "Izmir".to_string(),
            incident_type: IncidentType::Earthquake,
            lat: 38.4,
            lng: 27.1,
            population: 0,
            risk_label: String::new(),
        }
    }

    #[test]
    fn step_rotates_with_completed_count() {
        let opened: Vec<usize> = (0..5)
            .map(|done| {
                PlaythroughState::begin(location(), scenario(2), done)
                    .unwrap()
                    .active_step()
            })
            .collect();
        assert_eq!(opened, vec![0, 1, 0, 1, 0]);
    }

    #[test]
    fn scenario_without_steps_cannot_begin() {
        assert!(PlaythroughState::begin(location(), scenario(0), 0).is_none());
    }

    #[test]
    fn step_without_options_cannot_begin() {
        let mut broken = scenario(2);
        broken.steps[1].options.clear();
        assert!(PlaythroughState::begin(location(), broken, 0).is_none());
    }

    #[test]
    fn new_playthrough_starts_safe() {
        let state = PlaythroughState::begin(location(), scenario(3), 4).unwrap();
        assert_eq!(state.risk, Risk::ZERO);
        assert_eq!(state.step().question, "Q1");
        assert!(state.transcript.is_empty());
    }
}
