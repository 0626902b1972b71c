use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};

use crate::persistence::repository::{
    ClassId, LeaderboardEntry, PlayerId, PlayerProfile, ScoreRepository,
};

const SCORE_SCHEMA_VERSION: i64 = 1;

const SCORE_DB_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS score_meta (
  id INTEGER PRIMARY KEY CHECK (id = 1),
  schema_version INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS classes (
  class_id INTEGER PRIMARY KEY AUTOINCREMENT,
  name TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS students (
  student_id INTEGER PRIMARY KEY AUTOINCREMENT,
  class_id INTEGER NOT NULL REFERENCES classes(class_id) ON DELETE CASCADE,
  name TEXT NOT NULL,
  score INTEGER NOT NULL DEFAULT 0
);

CREATE INDEX IF NOT EXISTS students_by_class ON students (class_id, score DESC);
"#;

#[derive(Debug)]
pub enum ScoreDbError {
    Sqlite(rusqlite::Error),
    UnknownPlayer(PlayerId),
    UnknownClass(ClassId),
    InvalidData(String),
}

impl std::fmt::Display for ScoreDbError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScoreDbError::Sqlite(err) => write!(f, "sqlite error: {}", err),
            ScoreDbError::UnknownPlayer(id) => write!(f, "no student with id {}", id),
            ScoreDbError::UnknownClass(id) => write!(f, "no class with id {}", id),
            ScoreDbError::InvalidData(message) => write!(f, "{}", message),
        }
    }
}

impl std::error::Error for ScoreDbError {}

impl From<rusqlite::Error> for ScoreDbError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Sqlite(err)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassRoom {
    pub id: ClassId,
    pub name: String,
}

/// Class roster and score store.
pub struct ScoreDb {
    conn: Connection,
}

impl ScoreDb {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ScoreDbError> {
        Self::init(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self, ScoreDbError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, ScoreDbError> {
        let mut db = Self { conn };
        db.conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        db.conn.execute_batch(SCORE_DB_SCHEMA)?;
        db.ensure_score_meta()?;
        Ok(db)
    }

    pub fn add_class(&mut self, name: &str) -> Result<ClassId, ScoreDbError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ScoreDbError::InvalidData("class name is empty".to_string()));
        }
        self.conn
            .execute("INSERT INTO classes (name) VALUES (?1)", params![name])?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn list_classes(&self) -> Result<Vec<ClassRoom>, ScoreDbError> {
        let mut stmt = self
            .conn
            .prepare("SELECT class_id, name FROM classes ORDER BY name")?;
        let rows = stmt.query_map([], |row| {
            Ok(ClassRoom {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        })?;
        let mut classes = Vec::new();
        for row in rows {
            classes.push(row?);
        }
        Ok(classes)
    }

    /// Removes the class and every student enrolled in it.
    pub fn remove_class(&mut self, class_id: ClassId) -> Result<bool, ScoreDbError> {
        let removed = self
            .conn
            .execute("DELETE FROM classes WHERE class_id = ?1", params![class_id])?;
        Ok(removed > 0)
    }

    pub fn add_student(&mut self, class_id: ClassId, name: &str) -> Result<PlayerId, ScoreDbError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ScoreDbError::InvalidData("student name is empty".to_string()));
        }
        let class_exists = self
            .conn
            .query_row(
                "SELECT 1 FROM classes WHERE class_id = ?1",
                params![class_id],
                |_| Ok(()),
            )
            .optional()?
            .is_some();
        if !class_exists {
            return Err(ScoreDbError::UnknownClass(class_id));
        }
        self.conn.execute(
            "INSERT INTO students (class_id, name, score) VALUES (?1, ?2, 0)",
            params![class_id, name],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn list_students(&self, class_id: ClassId) -> Result<Vec<PlayerProfile>, ScoreDbError> {
        let mut stmt = self.conn.prepare(
            "SELECT student_id, name, class_id, score FROM students WHERE class_id = ?1 ORDER BY name",
        )?;
        let rows = stmt.query_map(params![class_id], profile_from_row)?;
        let mut students = Vec::new();
        for row in rows {
            students.push(row?);
        }
        Ok(students)
    }

    pub fn remove_student(&mut self, player: PlayerId) -> Result<bool, ScoreDbError> {
        let removed = self
            .conn
            .execute("DELETE FROM students WHERE student_id = ?1", params![player])?;
        Ok(removed > 0)
    }

    pub fn load_player(&self, player: PlayerId) -> Result<Option<PlayerProfile>, ScoreDbError> {
        Ok(self
            .conn
            .query_row(
                "SELECT student_id, name, class_id, score FROM students WHERE student_id = ?1",
                params![player],
                profile_from_row,
            )
            .optional()?)
    }

    pub fn load_score(&self, player: PlayerId) -> Result<i64, ScoreDbError> {
        self.conn
            .query_row(
                "SELECT score FROM students WHERE student_id = ?1",
                params![player],
                |row| row.get::<_, i64>(0),
            )
            .optional()?
            .ok_or(ScoreDbError::UnknownPlayer(player))
    }

    pub fn store_score(&mut self, player: PlayerId, score: i64) -> Result<(), ScoreDbError> {
        let updated = self.conn.execute(
            "UPDATE students SET score = ?2 WHERE student_id = ?1",
            params![player, score],
        )?;
        if updated == 0 {
            return Err(ScoreDbError::UnknownPlayer(player));
        }
        Ok(())
    }

    /// Single-statement update; concurrent sessions cannot lose a delta.
    pub fn add_to_score(&mut self, player: PlayerId, delta: i64) -> Result<i64, ScoreDbError> {
        let tx = self.conn.transaction()?;
        let updated = tx.execute(
            "UPDATE students SET score = score + ?2 WHERE student_id = ?1",
            params![player, delta],
        )?;
        if updated == 0 {
            return Err(ScoreDbError::UnknownPlayer(player));
        }
        let total = tx.query_row(
            "SELECT score FROM students WHERE student_id = ?1",
            params![player],
            |row| row.get::<_, i64>(0),
        )?;
        tx.commit()?;
        Ok(total)
    }

    pub fn class_leaderboard(
        &self,
        class_id: ClassId,
        limit: usize,
    ) -> Result<Vec<LeaderboardEntry>, ScoreDbError> {
        let mut stmt = self.conn.prepare(
            "SELECT student_id, name, score FROM students WHERE class_id = ?1 ORDER BY score DESC, name LIMIT ?2",
        )?;
        let rows = stmt.query_map(params![class_id, limit as i64], |row| {
            Ok(LeaderboardEntry {
                player_id: row.get(0)?,
                name: row.get(1)?,
                score: row.get(2)?,
            })
        })?;
        let mut entries = Vec::new();
        for row in rows {
            entries.push(row?);
        }
        Ok(entries)
    }

    fn ensure_score_meta(&mut self) -> Result<(), ScoreDbError> {
        let version = self
            .conn
            .query_row(
                "SELECT schema_version FROM score_meta WHERE id = 1",
                [],
                |row| row.get::<_, i64>(0),
            )
            .optional()?;

        match version {
            Some(SCORE_SCHEMA_VERSION) => Ok(()),
            Some(other) => Err(ScoreDbError::InvalidData(format!(
                "score_meta version mismatch (found {}, expected {})",
                other, SCORE_SCHEMA_VERSION
            ))),
            None => {
                self.conn.execute(
                    "INSERT INTO score_meta (id, schema_version) VALUES (1, ?1)",
                    params![SCORE_SCHEMA_VERSION],
                )?;
                Ok(())
            }
        }
    }
}

fn profile_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<PlayerProfile> {
    Ok(PlayerProfile {
        id: row.get(0)?,
        name: row.get(1)?,
        class_id: row.get(2)?,
        score: row.get(3)?,
    })
}

impl ScoreRepository for ScoreDb {
    fn get_score(&self, player: PlayerId) -> Result<i64, Box<dyn std::error::Error>> {
        Ok(ScoreDb::load_score(self, player)?)
    }

    fn set_score(&mut self, player: PlayerId, score: i64) -> Result<(), Box<dyn std::error::Error>> {
        Ok(ScoreDb::store_score(self, player, score)?)
    }

    fn increment(&mut self, player: PlayerId, delta: i64) -> Result<i64, Box<dyn std::error::Error>> {
        Ok(ScoreDb::add_to_score(self, player, delta)?)
    }

    fn leaderboard(
        &self,
        class_id: ClassId,
        limit: usize,
    ) -> Result<Vec<LeaderboardEntry>, Box<dyn std::error::Error>> {
        Ok(ScoreDb::class_leaderboard(self, class_id, limit)?)
    }

    fn player(&self, player: PlayerId) -> Result<Option<PlayerProfile>, Box<dyn std::error::Error>> {
        Ok(ScoreDb::load_player(self, player)?)
    }
}
