use serde::{Deserialize, Serialize};

use crate::data::scenarios::ScenarioOption;

pub const MAX_RISK: u8 = 100;

/// Player risk level, always within `0..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Hash, Serialize, Deserialize)]
pub struct Risk(u8);

impl Risk {
    pub const ZERO: Risk = Risk(0);

    pub fn new(value: i64) -> Self {
        Risk(value.clamp(0, MAX_RISK as i64) as u8)
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn is_fatal(self) -> bool {
        self.0 >= MAX_RISK
    }

    pub fn band(self) -> RiskBand {
        RiskBand::from_risk(self)
    }
}

/// Outcome of a single option click.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Fatal,
    Survived { costly: bool },
}

pub fn apply_option(current: Risk, option: &ScenarioOption) -> Risk {
    Risk::new(current.0 as i64 + option.risk_delta as i64)
}

pub fn classify(new_risk: Risk, option: &ScenarioOption) -> StepOutcome {
    if new_risk.is_fatal() {
        StepOutcome::Fatal
    } else {
        StepOutcome::Survived {
            costly: option.is_costly(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskBand {
    Safe,
    Risky,
    SeriousInjury,
    LifeThreatening,
}

impl RiskBand {
    pub fn from_risk(risk: Risk) -> Self {
        match risk.value() {
            90.. => RiskBand::LifeThreatening,
            50..=89 => RiskBand::SeriousInjury,
            20..=49 => RiskBand::Risky,
            _ => RiskBand::Safe,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RiskBand::Safe => "SAFE",
            RiskBand::Risky => "RISKY SITUATION",
            RiskBand::SeriousInjury => "SERIOUS INJURY",
            RiskBand::LifeThreatening => "LIFE-THREATENING!",
        }
    }
}
