pub mod config;
pub mod ecs;
pub mod world;

pub use config::{ConfigError, EngineConfig, Pacing};
pub use world::{ActionQueue, Game, PlayerIntent, Snapshot};
