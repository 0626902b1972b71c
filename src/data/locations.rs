use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::data::incident::{IncidentType, MissionFilter};

const BUNDLED_LOCATIONS: &str = include_str!("../../assets/data/locations.json");

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationCatalog {
    pub schema_version: u32,
    pub locations: Vec<Location>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    pub incident_type: IncidentType,
    pub lat: f64,
    pub lng: f64,
    #[serde(default)]
    pub population: u64,
    #[serde(default)]
    pub risk_label: String,
}

#[derive(Debug)]
pub enum LocationDataError {
    Io { path: String, source: std::io::Error },
    Json { path: String, source: serde_json::Error },
    DuplicateName(String),
    Validation(String),
}

impl std::fmt::Display for LocationDataError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LocationDataError::Io { path, source } => {
                write!(f, "failed to read {}: {}", path, source)
            }
            LocationDataError::Json { path, source } => {
                write!(f, "failed to parse {}: {}", path, source)
            }
            LocationDataError::DuplicateName(name) => {
                write!(f, "location name {} is registered more than once", name)
            }
            LocationDataError::Validation(message) => write!(f, "{}", message),
        }
    }
}

impl std::error::Error for LocationDataError {}

pub fn load_location_catalog(path: impl AsRef<Path>) -> Result<LocationCatalog, LocationDataError> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path).map_err(|source| LocationDataError::Io {
        path: path.display().to_string(),
        source,
    })?;
    LocationCatalog::from_json(&path.display().to_string(), &raw)
}

impl LocationCatalog {
    pub fn bundled() -> Result<Self, LocationDataError> {
        Self::from_json("<bundled locations>", BUNDLED_LOCATIONS)
    }

    fn from_json(origin: &str, raw: &str) -> Result<Self, LocationDataError> {
        serde_json::from_str(raw).map_err(|source| LocationDataError::Json {
            path: origin.to_string(),
            source,
        })
    }
}

/// Locations keyed by display name. Ordered so seeded selection is reproducible.
#[derive(Debug, Clone, Default)]
pub struct LocationRegistry {
    locations: BTreeMap<String, Location>,
}

impl LocationRegistry {
    pub fn from_locations(locations: Vec<Location>) -> Result<Self, LocationDataError> {
        let mut map = BTreeMap::new();
        for location in locations {
            if location.name.trim().is_empty() {
                return Err(LocationDataError::Validation(
                    "location name cannot be empty".to_string(),
                ));
            }
            if map.contains_key(&location.name) {
                return Err(LocationDataError::DuplicateName(location.name));
            }
            map.insert(location.name.clone(), location);
        }
        Ok(Self { locations: map })
    }

    pub fn get(&self, name: &str) -> Option<&Location> {
        self.locations.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Location> {
        self.locations.values()
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    /// Names of every location the filter admits.
    pub fn matching(&self, filter: MissionFilter) -> impl Iterator<Item = &str> {
        self.locations
            .values()
            .filter(move |location| filter.matches(location.incident_type))
            .map(|location| location.name.as_str())
    }
}
