use bevy_ecs::prelude::*;
use bevy_utils::tracing::debug;

use crate::content::session::SessionContent;
use crate::core::config::Pacing;
use crate::persistence::reconciler::ScoreLedger;
use crate::rules::scoring::ScoringRules;
use crate::simulation::events::EngineEventLog;
use crate::simulation::mission::MissionTracker;
use crate::simulation::playthrough::{Phase, Progression};
use crate::simulation::rng::SimRng;
use crate::simulation::time::{PendingEvent, PendingEvents, ScheduledEvent, SimClock};
use crate::systems::progression::Engine;

impl Engine<'_> {
    /// Fires every event due at or before `now_ms`, including ones scheduled along the way.
    pub fn run_due(&mut self, now_ms: u64) {
        while let Some(event) = self.pending.pop_due(now_ms) {
            self.fire(event);
        }
        self.now_ms = now_ms;
    }

    /// Events from an abandoned playthrough are dropped.
    pub fn fire(&mut self, scheduled: ScheduledEvent) {
        if scheduled.playthrough != self.progression.serial {
            debug!(
                "dropping stale {:?} from playthrough {}",
                scheduled.event, scheduled.playthrough
            );
            return;
        }
        self.now_ms = scheduled.due_ms;
        match scheduled.event {
            PendingEvent::BeginPlaying => {
                if self.progression.phase == Phase::Intro {
                    self.begin_playing();
                }
            }
            PendingEvent::ResolveChoice { option_index } => self.resolve_choice(option_index),
            PendingEvent::AnnounceMissionComplete => self.announce_mission_complete(),
            PendingEvent::Transit => self.transit(),
            PendingEvent::AutoAdvance => self.auto_advance(),
        }
    }
}

#[allow(clippy::too_many_arguments)]
pub fn scheduler_system(
    clock: Res<SimClock>,
    content: Res<SessionContent>,
    pacing: Res<Pacing>,
    scoring: Res<ScoringRules>,
    mut tracker: ResMut<MissionTracker>,
    mut progression: ResMut<Progression>,
    mut pending: ResMut<PendingEvents>,
    mut rng: ResMut<SimRng>,
    mut ledger: ResMut<ScoreLedger>,
    mut log: ResMut<EngineEventLog>,
) {
    if pending.next_due().map_or(true, |due| due > clock.now_ms) {
        return;
    }
    let mut engine = Engine {
        content: &content,
        tracker: &mut tracker,
        progression: &mut progression,
        pending: &mut pending,
        now_ms: clock.now_ms,
        pacing: &pacing,
        scoring: &scoring,
        rng: &mut rng,
        ledger: &mut ledger,
        log: &mut log,
    };
    engine.run_due(clock.now_ms);
}
