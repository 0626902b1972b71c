use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Kind of disaster a location is exposed to. Scenario ids use the same values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncidentType {
    #[serde(alias = "deprem")]
    Earthquake,
    #[serde(alias = "sel")]
    Flood,
    #[serde(alias = "cig")]
    Avalanche,
    #[serde(alias = "yangin")]
    Wildfire,
}

impl IncidentType {
    pub const ALL: [IncidentType; 4] = [
        IncidentType::Earthquake,
        IncidentType::Flood,
        IncidentType::Avalanche,
        IncidentType::Wildfire,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            IncidentType::Earthquake => "earthquake",
            IncidentType::Flood => "flood",
            IncidentType::Avalanche => "avalanche",
            IncidentType::Wildfire => "wildfire",
        }
    }

    /// First transcript line shown when a location of this type is entered.
    pub fn warning(self, location_name: &str) -> String {
        match self {
            IncidentType::Flood => {
                format!("WARNING: A flood disaster has started in the {} region!", location_name)
            }
            IncidentType::Avalanche => {
                format!("WARNING: An avalanche has struck the mountains of {}!", location_name)
            }
            IncidentType::Wildfire => {
                format!("ALARM: A fire has broken out in the forests of {}!", location_name)
            }
            IncidentType::Earthquake => {
                format!("WARNING: Severe tremors detected in the {} region!", location_name)
            }
        }
    }
}

impl fmt::Display for IncidentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IncidentType {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "earthquake" | "deprem" => Ok(IncidentType::Earthquake),
            "flood" | "sel" => Ok(IncidentType::Flood),
            "avalanche" | "cig" => Ok(IncidentType::Avalanche),
            "wildfire" | "yangin" => Ok(IncidentType::Wildfire),
            other => Err(format!("unknown incident type {}", other)),
        }
    }
}

/// Process-wide mission selector set by the content author.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum MissionFilter {
    #[default]
    AllIncidents,
    Only(IncidentType),
}

impl MissionFilter {
    pub fn matches(self, incident: IncidentType) -> bool {
        match self {
            MissionFilter::AllIncidents => true,
            MissionFilter::Only(kind) => kind == incident,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MissionFilter::AllIncidents => "All Disasters (Free Mode)",
            MissionFilter::Only(IncidentType::Earthquake) => "Earthquake Drill",
            MissionFilter::Only(IncidentType::Wildfire) => "Wildfire Response",
            MissionFilter::Only(IncidentType::Flood) => "Flood Operation",
            MissionFilter::Only(IncidentType::Avalanche) => "Avalanche Watch",
        }
    }

    /// Banner shown over the map while no location is active.
    pub fn briefing(self) -> &'static str {
        match self {
            MissionFilter::AllIncidents => "Pick a city and start the simulation",
            MissionFilter::Only(IncidentType::Wildfire) => {
                "MISSION: Respond to regions at risk of forest fires!"
            }
            MissionFilter::Only(IncidentType::Earthquake) => {
                "MISSION: Run drills in regions at risk of earthquakes!"
            }
            MissionFilter::Only(IncidentType::Flood) => {
                "MISSION: Check the regions at risk of flooding!"
            }
            MissionFilter::Only(IncidentType::Avalanche) => {
                "MISSION: Survey the regions with avalanche danger!"
            }
        }
    }
}

impl fmt::Display for MissionFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MissionFilter::AllIncidents => f.write_str("all"),
            MissionFilter::Only(kind) => f.write_str(kind.as_str()),
        }
    }
}

impl FromStr for MissionFilter {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "all" | "hepsi" | "" => Ok(MissionFilter::AllIncidents),
            other => other.parse::<IncidentType>().map(MissionFilter::Only),
        }
    }
}

impl TryFrom<String> for MissionFilter {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<MissionFilter> for String {
    fn from(filter: MissionFilter) -> Self {
        filter.to_string()
    }
}
