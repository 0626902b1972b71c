pub mod risk;
pub mod scoring;

pub use risk::{apply_option, classify, Risk, RiskBand, StepOutcome, MAX_RISK};
pub use scoring::ScoringRules;
