use bevy_ecs::prelude::*;
use bevy_utils::tracing::info;

use crate::content::repository::{ContentRepository, LocationRepository};
use crate::content::session::{SessionContent, SessionError};
use crate::core::config::EngineConfig;
use crate::core::ecs::{create_schedule, create_world};
use crate::data::incident::{IncidentType, MissionFilter};
use crate::persistence::reconciler::{ScoreError, ScoreLedger, ScoreReconciler};
use crate::persistence::repository::{LeaderboardEntry, PlayerId, PlayerProfile, ScoreRepository};
use crate::rules::risk::{Risk, RiskBand};
use crate::simulation::events::{EngineEvent, EngineEventLog};
use crate::simulation::mission::{MissionProgress, MissionTracker};
use crate::simulation::playthrough::{FinishReason, Phase, Progression, TranscriptLine};
use crate::simulation::time::{PendingEvents, SimClock};

/// Intent-driven commands fed into the ECS each tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerIntent {
    SelectLocation(String),
    Start,
    /// Zero-based option index within the active step.
    ChooseOption(usize),
    Restart,
}

/// Resource storing the intents for the next tick.
#[derive(Resource, Default, Debug)]
pub struct ActionQueue(pub Vec<PlayerIntent>);

/// Data snapshot returned to the UI layer after each tick.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub now_ms: u64,
    pub phase: Phase,
    pub finish: Option<FinishReason>,
    pub location: Option<String>,
    pub incident: Option<IncidentType>,
    pub risk: Risk,
    pub band: RiskBand,
    pub active_step: Option<usize>,
    pub question: Option<String>,
    /// Only populated while an unanswered question is on screen.
    pub options: Vec<String>,
    pub transcript: Vec<TranscriptLine>,
    pub filter: MissionFilter,
    pub mission_label: &'static str,
    pub briefing: &'static str,
    pub progress: MissionProgress,
    pub completed: Vec<String>,
    pub player: Option<String>,
    pub score: Option<i64>,
    /// Everything the engine emitted since the previous snapshot.
    pub events: Vec<EngineEvent>,
}

/// Wrapper around the ECS world and schedule.
pub struct Game {
    world: World,
    schedule: Schedule,
    scores: ScoreReconciler,
    config: EngineConfig,
}

impl Game {
    /// Reads content and locations once. A location name collision aborts the session.
    pub fn new(
        config: EngineConfig,
        content: &dyn ContentRepository,
        locations: &dyn LocationRepository,
    ) -> Result<Self, SessionError> {
        let (session, filter) = SessionContent::load(content, locations)?;
        info!(
            "session ready: {} scenarios, {} locations, mission {}",
            session.scenarios.len(),
            session.registry.len(),
            filter
        );
        let world = create_world(&config, session, filter);
        Ok(Self {
            world,
            schedule: create_schedule(),
            scores: ScoreReconciler::default(),
            config,
        })
    }

    pub fn with_scores(mut self, store: Box<dyn ScoreRepository>) -> Self {
        self.scores = ScoreReconciler::new(store);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn login(&mut self, player: PlayerId) -> Result<PlayerProfile, ScoreError> {
        self.scores.login(player).cloned()
    }

    pub fn logout(&mut self) -> Option<PlayerProfile> {
        self.scores.logout()
    }

    pub fn player(&self) -> Option<&PlayerProfile> {
        self.scores.player()
    }

    /// Run the schedule with the provided intents and return a snapshot for rendering.
    pub fn tick(&mut self, intents: Vec<PlayerIntent>) -> Snapshot {
        self.world.resource_mut::<ActionQueue>().0 = intents;
        self.run_schedule();
        self.snapshot()
    }

    /// Moves the virtual clock forward and fires whatever came due.
    pub fn advance(&mut self, elapsed_ms: u64) -> Snapshot {
        self.world.resource_mut::<SimClock>().advance(elapsed_ms);
        self.run_schedule();
        self.snapshot()
    }

    /// Fast-forwards until no scheduled event remains.
    pub fn settle(&mut self) -> Snapshot {
        while let Some(due) = self.world.resource::<PendingEvents>().next_due() {
            self.world.resource_mut::<SimClock>().advance_to(due);
            self.run_schedule();
        }
        self.snapshot()
    }

    pub fn next_due(&self) -> Option<u64> {
        self.world.resource::<PendingEvents>().next_due()
    }

    pub fn phase(&self) -> Phase {
        self.world.resource::<Progression>().phase
    }

    pub fn content(&self) -> &SessionContent {
        self.world.resource::<SessionContent>()
    }

    pub fn tracker(&self) -> &MissionTracker {
        self.world.resource::<MissionTracker>()
    }

    /// Re-reads content and the mission filter. Refused while a playthrough is active.
    pub fn refresh_content(
        &mut self,
        content: &dyn ContentRepository,
        locations: &dyn LocationRepository,
    ) -> Result<(), SessionError> {
        if self.phase() != Phase::MapIdle {
            return Err(SessionError::PlaythroughActive);
        }
        let (session, filter) = SessionContent::load(content, locations)?;
        self.world.insert_resource(session);
        if self.world.resource_mut::<MissionTracker>().set_filter(filter) {
            info!("mission filter changed to {}; progress reset", filter);
        }
        Ok(())
    }

    pub fn leaderboard(&self) -> Result<Vec<LeaderboardEntry>, ScoreError> {
        self.scores.leaderboard(self.config.leaderboard_limit)
    }

    fn run_schedule(&mut self) {
        self.schedule.run(&mut self.world);
        let deltas = self.world.resource_mut::<ScoreLedger>().drain();
        if deltas.is_empty() {
            return;
        }
        let mut log = self.world.resource_mut::<EngineEventLog>();
        for delta in deltas {
            self.scores.persist(delta, &mut log);
        }
    }

    fn snapshot(&mut self) -> Snapshot {
        let events = self.world.resource_mut::<EngineEventLog>().drain();
        Snapshot::capture(&self.world, &self.scores, events)
    }
}

impl Snapshot {
    fn capture(world: &World, scores: &ScoreReconciler, events: Vec<EngineEvent>) -> Self {
        let progression = world.resource::<Progression>();
        let tracker = world.resource::<MissionTracker>();
        let content = world.resource::<SessionContent>();
        let filter = tracker.filter();
        let playthrough = progression.playthrough.as_ref();
        let risk = playthrough.map(|p| p.risk).unwrap_or_default();

        let options = match playthrough {
            Some(state) if progression.phase == Phase::Playing && state.chosen.is_none() => {
                state.option_texts()
            }
            _ => Vec::new(),
        };

        Self {
            now_ms: world.resource::<SimClock>().now_ms,
            phase: progression.phase,
            finish: progression.finish,
            location: playthrough.map(|p| p.location.name.clone()),
            incident: playthrough.map(|p| p.location.incident_type),
            risk,
            band: risk.band(),
            active_step: playthrough.map(|p| p.active_step()),
            question: playthrough.map(|p| p.step().question.clone()),
            options,
            transcript: playthrough
                .map(|p| p.transcript.clone())
                .unwrap_or_default(),
            filter,
            mission_label: filter.label(),
            briefing: filter.briefing(),
            progress: tracker.progress(&content.registry),
            completed: tracker.completed().iter().cloned().collect(),
            player: scores.player().map(|p| p.name.clone()),
            score: scores.local_score(),
            events,
        }
    }
}
