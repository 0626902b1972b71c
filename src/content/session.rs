use bevy_ecs::prelude::*;
use bevy_utils::tracing::{error, warn};

use crate::content::repository::{ContentRepository, LocationRepository};
use crate::data::incident::{IncidentType, MissionFilter};
use crate::data::locations::{LocationDataError, LocationRegistry};
use crate::data::scenarios::{Scenario, ScenarioCatalog};

/// Content snapshot taken at session start. Never patched mid-playthrough.
#[derive(Resource, Debug, Clone, Default)]
pub struct SessionContent {
    pub scenarios: Vec<Scenario>,
    pub registry: LocationRegistry,
}

#[derive(Debug)]
pub enum SessionError {
    LocationSource(Box<dyn std::error::Error>),
    Registry(LocationDataError),
    PlaythroughActive,
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionError::LocationSource(err) => write!(f, "failed to list locations: {}", err),
            SessionError::Registry(err) => write!(f, "invalid location registry: {}", err),
            SessionError::PlaythroughActive => {
                write!(f, "content cannot be refreshed while a playthrough is active")
            }
        }
    }
}

impl std::error::Error for SessionError {}

impl From<LocationDataError> for SessionError {
    fn from(err: LocationDataError) -> Self {
        Self::Registry(err)
    }
}

impl SessionContent {
    pub fn load(
        content: &dyn ContentRepository,
        locations: &dyn LocationRepository,
    ) -> Result<(Self, MissionFilter), SessionError> {
        let scenarios = load_scenarios(content);
        let filter = load_filter(content);
        let listed = locations
            .list_locations()
            .map_err(SessionError::LocationSource)?;
        let registry = LocationRegistry::from_locations(listed).map_err(|err| {
            error!("location registry rejected: {}", err);
            SessionError::Registry(err)
        })?;
        Ok((
            Self {
                scenarios,
                registry,
            },
            filter,
        ))
    }

    /// Scenario whose id matches the incident, else the first one available.
    pub fn resolve_scenario(&self, incident: IncidentType) -> Option<&Scenario> {
        self.scenarios
            .iter()
            .find(|scenario| scenario.id == incident)
            .or_else(|| self.scenarios.first())
    }
}

pub(crate) fn load_scenarios(content: &dyn ContentRepository) -> Vec<Scenario> {
    match content.scenarios() {
        Ok(scenarios) if !scenarios.is_empty() => scenarios,
        Ok(_) => {
            warn!("content store has no scenarios; using the bundled set");
            bundled_scenarios()
        }
        Err(err) => {
            warn!("failed to fetch scenarios ({}); using the bundled set", err);
            bundled_scenarios()
        }
    }
}

pub(crate) fn load_filter(content: &dyn ContentRepository) -> MissionFilter {
    match content.active_mission_filter() {
        Ok(filter) => filter.unwrap_or_default(),
        Err(err) => {
            warn!("failed to fetch the active mission ({}); using all incidents", err);
            MissionFilter::AllIncidents
        }
    }
}

fn bundled_scenarios() -> Vec<Scenario> {
    match ScenarioCatalog::bundled() {
        Ok(catalog) => catalog.scenarios,
        Err(err) => {
            error!("bundled scenarios are unreadable: {}", err);
            Vec::new()
        }
    }
}
