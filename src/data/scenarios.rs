use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::data::incident::IncidentType;

const BUNDLED_SCENARIOS: &str = include_str!("../../assets/data/scenarios.json");

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioCatalog {
    pub schema_version: u32,
    pub scenarios: Vec<Scenario>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub id: IncidentType,
    pub title: String,
    pub intro: String,
    #[serde(default)]
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub question: String,
    pub options: Vec<ScenarioOption>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioOption {
    pub text: String,
    #[serde(alias = "riskChanges")]
    pub risk_delta: i32,
    pub feedback: String,
}

impl Scenario {
    /// Index of the first step that offers nothing to choose.
    pub fn first_empty_step(&self) -> Option<usize> {
        self.steps.iter().position(|step| step.options.is_empty())
    }
}

impl ScenarioOption {
    /// A choice is costly when it pushes risk up. There is no separate correctness flag.
    pub fn is_costly(&self) -> bool {
        self.risk_delta > 0
    }
}

#[derive(Debug)]
pub enum ScenarioDataError {
    Io { path: String, source: std::io::Error },
    Json { path: String, source: serde_json::Error },
    Validation(String),
}

impl std::fmt::Display for ScenarioDataError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScenarioDataError::Io { path, source } => {
                write!(f, "failed to read {}: {}", path, source)
            }
            ScenarioDataError::Json { path, source } => {
                write!(f, "failed to parse {}: {}", path, source)
            }
            ScenarioDataError::Validation(message) => write!(f, "{}", message),
        }
    }
}

impl std::error::Error for ScenarioDataError {}

pub fn load_scenario_catalog(path: impl AsRef<Path>) -> Result<ScenarioCatalog, ScenarioDataError> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path).map_err(|source| ScenarioDataError::Io {
        path: path.display().to_string(),
        source,
    })?;
    ScenarioCatalog::from_json(&path.display().to_string(), &raw)
}

impl ScenarioCatalog {
    /// Default scenario set compiled into the crate.
    pub fn bundled() -> Result<Self, ScenarioDataError> {
        Self::from_json("<bundled scenarios>", BUNDLED_SCENARIOS)
    }

    fn from_json(origin: &str, raw: &str) -> Result<Self, ScenarioDataError> {
        let catalog: ScenarioCatalog =
            serde_json::from_str(raw).map_err(|source| ScenarioDataError::Json {
                path: origin.to_string(),
                source,
            })?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Scenarios without steps are accepted here; the engine refuses to play them.
    pub fn validate(&self) -> Result<(), ScenarioDataError> {
        let mut ids = HashSet::new();
        for scenario in &self.scenarios {
            if !ids.insert(scenario.id) {
                return Err(ScenarioDataError::Validation(format!(
                    "duplicate scenario id {}",
                    scenario.id
                )));
            }
            if scenario.title.trim().is_empty() {
                return Err(ScenarioDataError::Validation(format!(
                    "scenario {} missing title",
                    scenario.id
                )));
            }
            if let Some(idx) = scenario.first_empty_step() {
                return Err(ScenarioDataError::Validation(format!(
                    "scenario {} step {} has no options",
                    scenario.id, idx
                )));
            }
        }
        Ok(())
    }
}
