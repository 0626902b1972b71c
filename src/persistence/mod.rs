pub mod reconciler;
pub mod repository;
pub mod sqlite;

pub use reconciler::{ScoreError, ScoreLedger, ScoreReconciler};
pub use repository::{ClassId, LeaderboardEntry, PlayerId, PlayerProfile, ScoreRepository};
pub use sqlite::{ClassRoom, ScoreDb, ScoreDbError};
