// Re-export core modules for use by the binary or other consumers
pub mod content;
pub mod core;
pub mod data;
pub mod persistence;
pub mod rules;
pub mod simulation;
pub mod systems;
pub mod ui;

// Expose the main Game wrapper and types needed for interaction
pub use crate::core::config::{EngineConfig, Pacing};
pub use crate::core::world::{Game, PlayerIntent, Snapshot};
