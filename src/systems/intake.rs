use bevy_ecs::prelude::*;

use crate::content::session::SessionContent;
use crate::core::config::Pacing;
use crate::core::world::{ActionQueue, PlayerIntent};
use crate::persistence::reconciler::ScoreLedger;
use crate::rules::scoring::ScoringRules;
use crate::simulation::events::EngineEventLog;
use crate::simulation::mission::MissionTracker;
use crate::simulation::playthrough::Progression;
use crate::simulation::rng::SimRng;
use crate::simulation::time::{PendingEvents, SimClock};
use crate::systems::progression::Engine;

/// System: applies the player's intents in submission order.
#[allow(clippy::too_many_arguments)]
pub fn intake_system(
    intents: Res<ActionQueue>,
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
    if intents.0.is_empty() {
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

    for intent in intents.0.iter() {
        match intent {
            PlayerIntent::SelectLocation(name) => engine.select_location(name),
            PlayerIntent::Start => engine.start(),
            PlayerIntent::ChooseOption(index) => engine.choose_option(*index),
            PlayerIntent::Restart => engine.restart(),
        }
    }
}

/// System: empties the intent queue once every set has seen it.
pub fn clear_intents_system(mut intents: ResMut<ActionQueue>) {
    intents.0.clear();
}
