use bevy_utils::tracing::{debug, info, warn};

use crate::simulation::events::EngineEvent;
use crate::simulation::playthrough::{FinishReason, Phase, Speaker};
use crate::simulation::time::PendingEvent;
use crate::systems::progression::Engine;

pub const MISSION_COMPLETE_LINE: &str = "MISSION COMPLETE! Every region has been visited.";
pub const TRANSIT_LINE: &str =
    "The helicopter is getting ready... Heading to the next emergency zone...";

impl Engine<'_> {
    /// Non-fatal end of a location: record it and decide what comes next.
    pub(crate) fn complete_location(&mut self, name: &str) {
        if self.tracker.mark_complete(name) {
            info!("location {} completed", name);
        }
        self.emit_progress();

        let next = if self.tracker.is_complete(&self.content.registry) {
            PendingEvent::AnnounceMissionComplete
        } else {
            PendingEvent::Transit
        };
        self.schedule(self.pacing.settle_delay_ms, next);
    }

    pub fn announce_mission_complete(&mut self) {
        self.append_system_line(MISSION_COMPLETE_LINE);
        info!("mission {} complete", self.tracker.filter());
        self.progression.finish = Some(FinishReason::MissionComplete);
        self.set_phase(Phase::Finished);
    }

    pub fn transit(&mut self) {
        self.append_system_line(TRANSIT_LINE);
        self.schedule(self.pacing.advance_delay_ms, PendingEvent::AutoAdvance);
    }

    /// Moves straight into the next unvisited location, bypassing the map.
    /// A location that cannot be entered sends the player back to the map.
    pub fn auto_advance(&mut self) {
        let Some(name) = self.tracker.pick_next(&self.content.registry, self.rng) else {
            debug!("auto-advance found no remaining locations");
            return;
        };
        if !self.enter_location(&name) {
            warn!("auto-advance into {} failed; returning to the map", name);
            self.abandon_playthrough();
            self.set_phase(Phase::MapIdle);
        }
    }

    fn append_system_line(&mut self, text: &str) {
        let Some(state) = self.progression.playthrough.as_mut() else {
            return;
        };
        let line = state.push_line(Speaker::System, text);
        self.log.push(EngineEvent::TranscriptAppended(line));
    }
}
