use bevy_utils::tracing::{error, info};

use crate::content::session::SessionContent;
use crate::core::config::Pacing;
use crate::persistence::reconciler::ScoreLedger;
use crate::rules::risk::{apply_option, classify, StepOutcome};
use crate::rules::scoring::ScoringRules;
use crate::simulation::events::{EngineEvent, EngineEventLog, Notice};
use crate::simulation::mission::MissionTracker;
use crate::simulation::playthrough::{FinishReason, Phase, PlaythroughState, Progression, Speaker};
use crate::simulation::rng::SimRng;
use crate::simulation::time::{PendingEvent, PendingEvents};

pub const FAILURE_LINE: &str = "YOU DID NOT MAKE IT. Your risk level reached 100%.";
pub const WRONG_CHOICE_LINE: &str = "Wrong decision! Your risk level went up.";
pub const RIGHT_CHOICE_LINE: &str = "Good move! The risk is under control.";
pub const SELECT_FROM_MAP: &str = "Please select a city from the map.";
pub const RESTART_TO_MAP: &str = "Restart to return to the map.";

/// Mutable view over the engine resources for one system run.
pub struct Engine<'a> {
    pub content: &'a SessionContent,
    pub tracker: &'a mut MissionTracker,
    pub progression: &'a mut Progression,
    pub pending: &'a mut PendingEvents,
    pub now_ms: u64,
    pub pacing: &'a Pacing,
    pub scoring: &'a ScoringRules,
    pub rng: &'a mut SimRng,
    pub ledger: &'a mut ScoreLedger,
    pub log: &'a mut EngineEventLog,
}

impl Engine<'_> {
    /// Player-initiated selection. Only accepted from the map.
    pub fn select_location(&mut self, name: &str) {
        if self.progression.phase != Phase::MapIdle {
            self.log.notice(Notice::invalid(
                "Finish or restart the current scenario before picking another city.",
            ));
            return;
        }
        self.enter_location(name);
    }

    /// Opens a playthrough at `name`. Rejections leave every resource untouched.
    pub fn enter_location(&mut self, name: &str) -> bool {
        let Some(location) = self.content.registry.get(name) else {
            self.log
                .notice(Notice::invalid(format!("Unknown location: {}.", name)));
            return false;
        };
        if !self.tracker.is_eligible(location) {
            self.log.notice(Notice::invalid(format!(
                "{} is not part of the current mission.",
                location.name
            )));
            return false;
        }
        if self.tracker.is_completed(&location.name) {
            self.log.notice(Notice::invalid(format!(
                "The mission in {} is already complete.",
                location.name
            )));
            return false;
        }
        let Some(scenario) = self.content.resolve_scenario(location.incident_type) else {
            error!("no scenarios available for {}", location.name);
            self.log
                .notice(Notice::content("No scenarios are available right now."));
            return false;
        };
        let Some(mut state) = PlaythroughState::begin(
            location.clone(),
            scenario.clone(),
            self.tracker.completed_count(),
        ) else {
            error!("scenario {} has no playable steps", scenario.id);
            self.log.notice(Notice::content(format!(
                "The {} scenario has no questions yet.",
                scenario.title
            )));
            return false;
        };

        info!(
            "entering {} ({}) at step {}",
            location.name,
            location.incident_type,
            state.active_step()
        );
        self.log.push(EngineEvent::LocationSelected {
            name: location.name.clone(),
            incident: location.incident_type,
        });
        let opening = [
            location.incident_type.warning(&location.name),
            scenario.intro.clone(),
            state.step().question.clone(),
        ];
        for text in opening {
            let line = state.push_line(Speaker::System, text);
            self.log.push(EngineEvent::TranscriptAppended(line));
        }

        self.progression.serial += 1;
        self.progression.playthrough = Some(state);
        self.progression.finish = None;
        self.set_phase(Phase::Intro);

        if let Some(delay) = self.pacing.intro_auto_start_ms {
            self.schedule(delay, PendingEvent::BeginPlaying);
        }
        true
    }

    pub fn start(&mut self) {
        match self.progression.phase {
            Phase::MapIdle => self.start_random(),
            Phase::Intro => self.begin_playing(),
            Phase::Playing => {
                self.log
                    .notice(Notice::invalid("The scenario has already started."));
            }
            Phase::Finished => self.log.notice(Notice::invalid(RESTART_TO_MAP)),
        }
    }

    /// Enters a random unvisited eligible location.
    pub fn start_random(&mut self) {
        match self.tracker.pick_next(&self.content.registry, self.rng) {
            Some(name) => {
                self.enter_location(&name);
            }
            None => self.log.notice(Notice::invalid(SELECT_FROM_MAP)),
        }
    }

    pub fn begin_playing(&mut self) {
        let Some(state) = self.progression.playthrough.as_ref() else {
            return;
        };
        let options = state.option_texts();
        self.set_phase(Phase::Playing);
        self.log.push(EngineEvent::StepOptionsAvailable(options));
    }

    /// Records the click and the new risk now; feedback follows after the delay.
    pub fn choose_option(&mut self, index: usize) {
        if self.progression.phase != Phase::Playing {
            self.log
                .notice(Notice::invalid("No question is waiting for an answer."));
            return;
        }
        let Some(state) = self.progression.playthrough.as_mut() else {
            return;
        };
        if state.chosen.is_some() {
            self.log
                .notice(Notice::invalid("This question has already been answered."));
            return;
        }
        let Some(option) = state.option(index).cloned() else {
            self.log
                .notice(Notice::invalid(format!("Option {} is not available.", index + 1)));
            return;
        };

        state.chosen = Some(index);
        state.risk = apply_option(state.risk, &option);
        let line = state.push_line(Speaker::Player, option.text);
        self.log.push(EngineEvent::TranscriptAppended(line));
        self.schedule(
            self.pacing.feedback_delay_ms,
            PendingEvent::ResolveChoice {
                option_index: index,
            },
        );
    }

    pub fn resolve_choice(&mut self, index: usize) {
        let Some(state) = self.progression.playthrough.as_mut() else {
            return;
        };
        let Some(option) = state.option(index).cloned() else {
            return;
        };
        let risk = state.risk;
        let location = state.location.name.clone();
        let feedback = state.push_line(Speaker::System, option.feedback.clone());
        self.log.push(EngineEvent::TranscriptAppended(feedback));

        let delta = self.scoring.delta_for(&option);
        match classify(risk, &option) {
            StepOutcome::Fatal => {
                let line = state.push_line(Speaker::System, FAILURE_LINE);
                self.log.push(EngineEvent::TranscriptAppended(line));
                info!("fatal outcome in {}", location);
                self.progression.finish = Some(FinishReason::Fatal);
                self.set_phase(Phase::Finished);
                self.ledger.record(delta);
            }
            StepOutcome::Survived { costly } => {
                let verdict = if costly {
                    WRONG_CHOICE_LINE
                } else {
                    RIGHT_CHOICE_LINE
                };
                let line = state.push_line(Speaker::System, verdict);
                self.log.push(EngineEvent::TranscriptAppended(line));
                self.ledger.record(delta);
                self.complete_location(&location);
            }
        }
    }

    /// Back to the map. Progress survives unless the mission was finished.
    pub fn restart(&mut self) {
        if self.progression.phase == Phase::MapIdle {
            self.log.notice(Notice::invalid("Nothing to restart."));
            return;
        }
        self.abandon_playthrough();
        if self.tracker.rollover(&self.content.registry) {
            info!("mission cycle rolled over");
            self.emit_progress();
        }
        self.set_phase(Phase::MapIdle);
    }

    /// Drops the current playthrough and everything scheduled for it.
    pub(crate) fn abandon_playthrough(&mut self) {
        self.pending.clear();
        self.progression.serial += 1;
        self.progression.playthrough = None;
        self.progression.finish = None;
    }

    pub(crate) fn set_phase(&mut self, phase: Phase) {
        self.progression.phase = phase;
        self.log.push(EngineEvent::PhaseChanged(phase));
    }

    pub(crate) fn schedule(&mut self, delay_ms: u64, event: PendingEvent) {
        self.pending.schedule(
            self.now_ms.saturating_add(delay_ms),
            self.progression.serial,
            event,
        );
    }

    pub(crate) fn emit_progress(&mut self) {
        let progress = self.tracker.progress(&self.content.registry);
        self.log.push(EngineEvent::MissionProgress {
            completed: progress.completed,
            total: progress.total,
        });
    }
}


#[cfg(test)]
mod tests {
    use super::harness::Harness;
    use super::*;
    use crate::data::incident::{IncidentType, MissionFilter};
    use crate::data::scenarios::{Scenario, ScenarioOption, Step};
    use crate::rules::risk::Risk;
    use crate::simulation::events::NoticeKind;

    fn two_option_scenario(id: IncidentType, deltas: [i32; 2]) -> Scenario {
        Scenario {
            id,
            title: "Drill".to_string(),
            intro: "Stay calm.".to_string(),
            steps: vec![Step {
                question: "What now?".to_string(),
                options: deltas
                    .iter()
                    .enumerate()
                    .map(|(idx, delta)| ScenarioOption {
                        text: format!("option {}", idx),
                        risk_delta: *delta,
                        feedback: format!("feedback {}", idx),
                    })
                    .collect(),
            }],
        }
    }

    #[test]
    fn selection_opens_intro_with_three_lines() {
        let mut h = Harness::new(MissionFilter::AllIncidents);
        h.engine().select_location("Izmir");
        assert_eq!(h.progression.phase, Phase::Intro);
        let transcript = h.transcript();
        assert_eq!(transcript.len(), 3);
        assert!(transcript[0].contains("Izmir"));
        let state = h.progression.playthrough.as_ref().unwrap();
        assert_eq!(state.risk, Risk::ZERO);
        assert_eq!(transcript[2], state.step().question);
    }

    #[test]
    fn ineligible_selection_is_rejected_without_mutation() {
        let mut h = Harness::new(MissionFilter::Only(IncidentType::Flood));
        h.engine().select_location("Izmir");
        h.engine().select_location("Atlantis");
        assert_eq!(h.progression.phase, Phase::MapIdle);
        assert!(h.progression.playthrough.is_none());
        assert_eq!(h.progression.serial, 0);
        let kinds: Vec<_> = h.log.notices().map(|n| n.kind).collect();
        assert_eq!(kinds, vec![NoticeKind::InvalidAction, NoticeKind::InvalidAction]);
    }

    #[test]
    fn completed_location_cannot_be_selected_again() {
        let mut h = Harness::new(MissionFilter::Only(IncidentType::Flood));
        h.tracker.mark_complete("Rize");
        h.engine().select_location("Rize");
        assert!(h.progression.playthrough.is_none());
        assert!(h
            .log
            .notices()
            .any(|n| n.message.contains("already complete")));
    }

    #[test]
    fn overshooting_option_is_fatal_and_keeps_location_open() {
        let mut h = Harness::with_scenarios(
            vec![two_option_scenario(IncidentType::Earthquake, [40, 110])],
            MissionFilter::Only(IncidentType::Earthquake),
        );
        h.engine().select_location("Izmir");
        h.engine().start();
        h.engine().choose_option(1);
        assert_eq!(h.progression.playthrough.as_ref().unwrap().risk.value(), 100);
        assert_eq!(h.progression.phase, Phase::Playing);

        h.wait(600);
        assert_eq!(h.progression.phase, Phase::Finished);
        assert_eq!(h.progression.finish, Some(FinishReason::Fatal));
        assert!(!h.tracker.is_completed("Izmir"));
        assert_eq!(h.ledger.drain(), vec![-10]);
        assert_eq!(h.transcript().last().map(String::as_str), Some(FAILURE_LINE));
    }

    #[test]
    fn start_after_a_fatal_finish_points_to_restart() {
        let mut h = Harness::with_scenarios(
            vec![two_option_scenario(IncidentType::Earthquake, [40, 110])],
            MissionFilter::Only(IncidentType::Earthquake),
        );
        h.engine().select_location("Izmir");
        h.engine().start();
        h.engine().choose_option(1);
        h.wait(600);
        h.log.0.clear();

        h.engine().start();
        let messages: Vec<&str> = h.log.notices().map(|n| n.message.as_str()).collect();
        assert_eq!(messages, vec![RESTART_TO_MAP]);
        assert_eq!(h.progression.phase, Phase::Finished);
    }

    #[test]
    fn step_without_options_is_never_opened() {
        let mut broken = two_option_scenario(IncidentType::Flood, [0, 20]);
        broken.steps[0].options.clear();
        let mut h = Harness::with_scenarios(vec![broken], MissionFilter::Only(IncidentType::Flood));
        h.engine().select_location("Rize");

        assert_eq!(h.progression.phase, Phase::MapIdle);
        assert!(h.progression.playthrough.is_none());
        let kinds: Vec<NoticeKind> = h.log.notices().map(|n| n.kind).collect();
        assert_eq!(kinds, vec![NoticeKind::Content]);
    }

    #[test]
    fn survivable_costly_choice_still_completes_the_location() {
        let mut h = Harness::with_scenarios(
            vec![two_option_scenario(IncidentType::Earthquake, [40, 110])],
            MissionFilter::Only(IncidentType::Earthquake),
        );
        h.engine().select_location("Izmir");
        h.engine().start();
        h.engine().choose_option(0);
        h.wait(599);
        assert_eq!(h.transcript().len(), 4);
        h.wait(1);
        let transcript = h.transcript();
        assert_eq!(transcript[4], "feedback 0");
        assert_eq!(transcript[5], WRONG_CHOICE_LINE);
        assert!(h.tracker.is_completed("Izmir"));
        assert_eq!(h.ledger.drain(), vec![-10]);
    }

    #[test]
    fn second_choice_is_rejected() {
        let mut h = Harness::new(MissionFilter::AllIncidents);
        h.engine().select_location("Antalya");
        h.engine().start();
        h.engine().choose_option(0);
        h.engine().choose_option(1);
        assert_eq!(
            h.progression.playthrough.as_ref().unwrap().chosen,
            Some(0)
        );
        assert_eq!(h.pending.len(), 1);
        assert_eq!(h.log.notices().count(), 1);
    }

    #[test]
    fn out_of_range_option_is_a_notice() {
        let mut h = Harness::new(MissionFilter::AllIncidents);
        h.engine().select_location("Antalya");
        h.engine().choose_option(0);
        h.engine().start();
        h.engine().choose_option(42);
        assert!(h.progression.playthrough.as_ref().unwrap().chosen.is_none());
        assert_eq!(h.log.notices().count(), 2);
        assert!(h.pending.is_empty());
    }

    #[test]
    fn start_from_map_picks_an_unvisited_location() {
        let mut h = Harness::new(MissionFilter::Only(IncidentType::Avalanche));
        h.tracker.mark_complete("Erzurum");
        h.tracker.mark_complete("Hakkari");
        h.engine().start();
        assert_eq!(
            h.progression.playthrough.as_ref().map(|p| p.location.name.as_str()),
            Some("Bitlis")
        );
    }

    #[test]
    fn start_with_nothing_left_asks_for_a_map_pick() {
        let mut h = Harness::new(MissionFilter::Only(IncidentType::Avalanche));
        for name in ["Erzurum", "Hakkari", "Bitlis"] {
            h.tracker.mark_complete(name);
        }
        h.engine().start();
        assert_eq!(h.progression.phase, Phase::MapIdle);
        assert!(h.log.notices().any(|n| n.message == SELECT_FROM_MAP));
    }

    #[test]
    fn empty_scenario_aborts_with_content_notice() {
        let mut empty = two_option_scenario(IncidentType::Flood, [0, 0]);
        empty.steps.clear();
        let mut h = Harness::with_scenarios(vec![empty], MissionFilter::AllIncidents);
        h.engine().select_location("Rize");
        assert!(h.progression.playthrough.is_none());
        assert_eq!(h.progression.phase, Phase::MapIdle);
        let kinds: Vec<_> = h.log.notices().map(|n| n.kind).collect();
        assert_eq!(kinds, vec![NoticeKind::Content]);
    }

    #[test]
    fn auto_start_moves_intro_to_playing() {
        let mut h = Harness::new(MissionFilter::AllIncidents);
        h.pacing.intro_auto_start_ms = Some(2_500);
        h.engine().select_location("Mugla");
        h.wait(2_499);
        assert_eq!(h.progression.phase, Phase::Intro);
        h.wait(1);
        assert_eq!(h.progression.phase, Phase::Playing);
    }

    #[test]
    fn restart_after_fatal_keeps_progress_and_cancels_pending() {
        let mut h = Harness::with_scenarios(
            vec![two_option_scenario(IncidentType::Flood, [0, 110])],
            MissionFilter::Only(IncidentType::Flood),
        );
        h.tracker.mark_complete("Rize");
        h.engine().select_location("Trabzon");
        h.engine().start();
        h.engine().choose_option(1);
        h.engine().restart();
        assert!(h.pending.is_empty());
        assert_eq!(h.progression.phase, Phase::MapIdle);
        assert!(h.progression.playthrough.is_none());
        assert_eq!(h.tracker.completed_count(), 1);
        h.wait(10_000);
        assert!(h.ledger.is_empty());
    }

    #[test]
    fn restart_on_map_is_a_notice() {
        let mut h = Harness::new(MissionFilter::AllIncidents);
        h.engine().restart();
        assert_eq!(h.log.notices().count(), 1);
        assert_eq!(h.progression.serial, 0);
    }
}
