use bevy_ecs::prelude::*;
use bevy_utils::tracing::{info, warn};

use crate::persistence::repository::{LeaderboardEntry, PlayerId, PlayerProfile, ScoreRepository};
use crate::simulation::events::{EngineEvent, EngineEventLog, Notice};

pub const SCORE_SAVE_FAILED: &str = "Your score could not be saved to the server.";

/// Score deltas issued by the engine during a tick, flushed after the schedule runs.
#[derive(Resource, Debug, Default)]
pub struct ScoreLedger {
    pending: Vec<i64>,
}

impl ScoreLedger {
    pub fn record(&mut self, delta: i64) {
        self.pending.push(delta);
    }

    pub fn drain(&mut self) -> Vec<i64> {
        std::mem::take(&mut self.pending)
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[derive(Debug)]
pub enum ScoreError {
    NoStore,
    UnknownPlayer(PlayerId),
    Store(Box<dyn std::error::Error>),
}

impl std::fmt::Display for ScoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScoreError::NoStore => write!(f, "no score store is configured"),
            ScoreError::UnknownPlayer(id) => write!(f, "no player with id {}", id),
            ScoreError::Store(err) => write!(f, "score store error: {}", err),
        }
    }
}

impl std::error::Error for ScoreError {}

impl From<Box<dyn std::error::Error>> for ScoreError {
    fn from(err: Box<dyn std::error::Error>) -> Self {
        Self::Store(err)
    }
}

/// Applies score deltas to the logged-in player.
///
/// The local total moves first; the store is then asked for an increment.
/// A failed write leaves the local total as it is.
#[derive(Default)]
pub struct ScoreReconciler {
    store: Option<Box<dyn ScoreRepository>>,
    player: Option<PlayerProfile>,
}

impl ScoreReconciler {
    pub fn new(store: Box<dyn ScoreRepository>) -> Self {
        Self {
            store: Some(store),
            player: None,
        }
    }

    pub fn login(&mut self, player: PlayerId) -> Result<&PlayerProfile, ScoreError> {
        let store = self.store.as_ref().ok_or(ScoreError::NoStore)?;
        let profile = store.player(player)?.ok_or(ScoreError::UnknownPlayer(player))?;
        info!("player {} ({}) logged in", profile.name, profile.id);
        Ok(self.player.insert(profile))
    }

    pub fn logout(&mut self) -> Option<PlayerProfile> {
        self.player.take()
    }

    pub fn player(&self) -> Option<&PlayerProfile> {
        self.player.as_ref()
    }

    pub fn local_score(&self) -> Option<i64> {
        self.player.as_ref().map(|p| p.score)
    }

    /// No-op without a logged-in player.
    pub fn persist(&mut self, delta: i64, log: &mut EngineEventLog) {
        let Some(profile) = self.player.as_mut() else {
            return;
        };
        profile.score = profile.score.saturating_add(delta);
        log.push(EngineEvent::ScoreChanged {
            score: profile.score,
            delta,
        });

        let Some(store) = self.store.as_mut() else {
            return;
        };
        match store.increment(profile.id, delta) {
            Ok(total) => {
                if total != profile.score {
                    info!(
                        "score for {} resynced from store ({} -> {})",
                        profile.id, profile.score, total
                    );
                    profile.score = total;
                }
            }
            Err(err) => {
                warn!("failed to persist score delta {} for {}: {}", delta, profile.id, err);
                log.notice(Notice::persistence(SCORE_SAVE_FAILED));
            }
        }
    }

    pub fn leaderboard(&self, limit: usize) -> Result<Vec<LeaderboardEntry>, ScoreError> {
        let store = self.store.as_ref().ok_or(ScoreError::NoStore)?;
        let Some(profile) = self.player.as_ref() else {
            return Ok(Vec::new());
        };
        Ok(store.leaderboard(profile.class_id, limit)?)
    }
}
