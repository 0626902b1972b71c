pub mod incident;
pub mod locations;
pub mod scenarios;

pub use incident::{IncidentType, MissionFilter};
pub use locations::{
    load_location_catalog, Location, LocationCatalog, LocationDataError, LocationRegistry,
};
pub use scenarios::{
    load_scenario_catalog, Scenario, ScenarioCatalog, ScenarioDataError, ScenarioOption, Step,
};
