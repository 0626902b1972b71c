use serde::{Deserialize, Serialize};

pub type PlayerId = i64;
pub type ClassId = i64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerProfile {
    pub id: PlayerId,
    pub name: String,
    pub class_id: ClassId,
    pub score: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub player_id: PlayerId,
    pub name: String,
    pub score: i64,
}

/// Persisted per-player score record.
pub trait ScoreRepository {
    fn get_score(&self, player: PlayerId) -> Result<i64, Box<dyn std::error::Error>>;
    fn set_score(&mut self, player: PlayerId, score: i64) -> Result<(), Box<dyn std::error::Error>>;

    /// Adds `delta` and returns the stored total.
    ///
    /// The default reads then writes, so two sessions for the same player can
    /// lose an update. Stores with an atomic primitive override this.
    fn increment(&mut self, player: PlayerId, delta: i64) -> Result<i64, Box<dyn std::error::Error>> {
        let current = self.get_score(player)?;
        let next = current.saturating_add(delta);
        self.set_score(player, next)?;
        Ok(next)
    }

    /// Players of one class ordered by descending score.
    fn leaderboard(
        &self,
        class_id: ClassId,
        limit: usize,
    ) -> Result<Vec<LeaderboardEntry>, Box<dyn std::error::Error>>;

    fn player(&self, player: PlayerId) -> Result<Option<PlayerProfile>, Box<dyn std::error::Error>>;
}
