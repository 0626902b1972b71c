use bevy_ecs::prelude::*;
use bevy_ecs::schedule::{ExecutorKind, SystemSet};

use crate::content::session::SessionContent;
use crate::core::config::EngineConfig;
use crate::core::world::ActionQueue;
use crate::data::incident::MissionFilter;
use crate::persistence::reconciler::ScoreLedger;
use crate::simulation::events::EngineEventLog;
use crate::simulation::mission::MissionTracker;
use crate::simulation::playthrough::Progression;
use crate::simulation::rng::SimRng;
use crate::simulation::time::{PendingEvents, SimClock};
use crate::systems::{clear_intents_system, intake_system, scheduler_system};

/// Canonical tick ordering for the engine.
#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
pub enum TickSet {
    Intake,
    Scheduler,
    Cleanup,
}

/// Build the ECS world for one session.
pub fn create_world(config: &EngineConfig, content: SessionContent, filter: MissionFilter) -> World {
    let mut world = World::new();
    world.insert_resource(SimClock::default());
    world.insert_resource(ActionQueue::default());
    world.insert_resource(content);
    world.insert_resource(MissionTracker::new(filter));
    world.insert_resource(Progression::default());
    world.insert_resource(PendingEvents::default());
    world.insert_resource(config.pacing);
    world.insert_resource(config.scoring);
    world.insert_resource(
        config
            .seed
            .map(SimRng::from_seed_u64)
            .unwrap_or_default(),
    );
    world.insert_resource(ScoreLedger::default());
    world.insert_resource(EngineEventLog::default());
    world
}

/// Build the system schedule in the canonical order.
pub fn create_schedule() -> Schedule {
    let mut schedule = Schedule::default();
    schedule.set_executor_kind(ExecutorKind::SingleThreaded);

    schedule.configure_sets((TickSet::Intake, TickSet::Scheduler, TickSet::Cleanup).chain());

    schedule.add_systems((
        intake_system.in_set(TickSet::Intake),
        scheduler_system.in_set(TickSet::Scheduler),
        clear_intents_system.in_set(TickSet::Cleanup),
    ));

    schedule
}
