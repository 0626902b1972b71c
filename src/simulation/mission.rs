use std::collections::BTreeSet;

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

use crate::data::incident::MissionFilter;
use crate::data::locations::{Location, LocationRegistry};
use crate::simulation::rng::SimRng;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MissionProgress {
    pub completed: usize,
    pub total: usize,
}

/// Completed set for the active mission filter.
#[derive(Resource, Debug, Clone, Default)]
pub struct MissionTracker {
    filter: MissionFilter,
    completed: BTreeSet<String>,
}

pub fn is_mission_complete(completed: &BTreeSet<String>, eligible: &BTreeSet<String>) -> bool {
    eligible.is_subset(completed)
}

impl MissionTracker {
    pub fn new(filter: MissionFilter) -> Self {
        Self {
            filter,
            completed: BTreeSet::new(),
        }
    }

    pub fn filter(&self) -> MissionFilter {
        self.filter
    }

    /// A different filter starts a new mission cycle.
    pub fn set_filter(&mut self, filter: MissionFilter) -> bool {
        if filter == self.filter {
            return false;
        }
        self.filter = filter;
        self.completed.clear();
        true
    }

    pub fn completed(&self) -> &BTreeSet<String> {
        &self.completed
    }

    pub fn completed_count(&self) -> usize {
        self.completed.len()
    }

    pub fn is_completed(&self, name: &str) -> bool {
        self.completed.contains(name)
    }

    pub fn is_eligible(&self, location: &Location) -> bool {
        self.filter.matches(location.incident_type)
    }

    pub fn eligible(&self, registry: &LocationRegistry) -> BTreeSet<String> {
        registry
            .matching(self.filter)
            .map(str::to_string)
            .collect()
    }

    /// Returns `false` when the location was already complete.
    pub fn mark_complete(&mut self, name: &str) -> bool {
        if self.completed.contains(name) {
            return false;
        }
        self.completed.insert(name.to_string())
    }

    pub fn is_complete(&self, registry: &LocationRegistry) -> bool {
        is_mission_complete(&self.completed, &self.eligible(registry))
    }

    pub fn progress(&self, registry: &LocationRegistry) -> MissionProgress {
        let eligible = self.eligible(registry);
        MissionProgress {
            completed: eligible.intersection(&self.completed).count(),
            total: eligible.len(),
        }
    }

    pub fn remaining<'r>(&self, registry: &'r LocationRegistry) -> Vec<&'r str> {
        registry
            .matching(self.filter)
            .filter(|name| !self.completed.contains(*name))
            .collect()
    }

    pub fn pick_next(&self, registry: &LocationRegistry, rng: &mut SimRng) -> Option<String> {
        rng.pick(self.remaining(registry)).map(str::to_string)
    }

    /// Clears progress only when every eligible location was completed.
    pub fn rollover(&mut self, registry: &LocationRegistry) -> bool {
        if !self.is_complete(registry) {
            return false;
        }
        self.completed.clear();
        true
    }
}
