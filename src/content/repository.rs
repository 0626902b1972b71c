use crate::data::incident::MissionFilter;
use crate::data::locations::{Location, LocationCatalog};
use crate::data::scenarios::{Scenario, ScenarioCatalog};

/// Source of scenario definitions and the active mission filter.
/// Read once when a session starts.
pub trait ContentRepository {
    fn scenarios(&self) -> Result<Vec<Scenario>, Box<dyn std::error::Error>>;
    /// `None` when no filter was ever configured.
    fn active_mission_filter(&self) -> Result<Option<MissionFilter>, Box<dyn std::error::Error>>;
}

pub trait LocationRepository {
    fn list_locations(&self) -> Result<Vec<Location>, Box<dyn std::error::Error>>;
}

/// The scenario and location catalogs compiled into the crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct BundledContent;

impl ContentRepository for BundledContent {
    fn scenarios(&self) -> Result<Vec<Scenario>, Box<dyn std::error::Error>> {
        Ok(ScenarioCatalog::bundled()?.scenarios)
    }

    fn active_mission_filter(&self) -> Result<Option<MissionFilter>, Box<dyn std::error::Error>> {
        Ok(None)
    }
}

impl LocationRepository for BundledContent {
    fn list_locations(&self) -> Result<Vec<Location>, Box<dyn std::error::Error>> {
        Ok(LocationCatalog::bundled()?.locations)
    }
}

impl LocationRepository for LocationCatalog {
    fn list_locations(&self) -> Result<Vec<Location>, Box<dyn std::error::Error>> {
        Ok(self.locations.clone())
    }
}

/// Fixed in-memory content, e.g. a catalog loaded from disk plus a chosen filter.
#[derive(Debug, Clone, Default)]
pub struct StaticContent {
    pub scenarios: Vec<Scenario>,
    pub filter: Option<MissionFilter>,
}

impl StaticContent {
    pub fn new(scenarios: Vec<Scenario>, filter: MissionFilter) -> Self {
        Self {
            scenarios,
            filter: Some(filter),
        }
    }
}

impl From<ScenarioCatalog> for StaticContent {
    fn from(catalog: ScenarioCatalog) -> Self {
        Self {
            scenarios: catalog.scenarios,
            filter: None,
        }
    }
}

impl ContentRepository for StaticContent {
    fn scenarios(&self) -> Result<Vec<Scenario>, Box<dyn std::error::Error>> {
        Ok(self.scenarios.clone())
    }

    fn active_mission_filter(&self) -> Result<Option<MissionFilter>, Box<dyn std::error::Error>> {
        Ok(self.filter)
    }
}
