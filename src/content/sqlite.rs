use std::path::Path;

use bevy_utils::tracing::error;
use rusqlite::{params, Connection, OptionalExtension};

use crate::content::repository::ContentRepository;
use crate::data::incident::{IncidentType, MissionFilter};
use crate::data::scenarios::{Scenario, ScenarioCatalog, Step};

const CONTENT_SCHEMA_VERSION: i64 = 1;
const SETTINGS_ROW: &str = "global_config";

const CONTENT_DB_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS content_meta (
  id INTEGER PRIMARY KEY CHECK (id = 1),
  schema_version INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS scenarios (
  scenario_id TEXT PRIMARY KEY,
  title TEXT NOT NULL,
  intro TEXT NOT NULL,
  steps_json TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS game_settings (
  id TEXT PRIMARY KEY,
  active_mission TEXT NOT NULL
);
"#;

#[derive(Debug)]
pub enum ContentDbError {
    Sqlite(rusqlite::Error),
    Json(serde_json::Error),
    InvalidData(String),
}

impl std::fmt::Display for ContentDbError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContentDbError::Sqlite(err) => write!(f, "sqlite error: {}", err),
            ContentDbError::Json(err) => write!(f, "malformed steps: {}", err),
            ContentDbError::InvalidData(message) => write!(f, "{}", message),
        }
    }
}

impl std::error::Error for ContentDbError {}

impl From<rusqlite::Error> for ContentDbError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Sqlite(err)
    }
}

impl From<serde_json::Error> for ContentDbError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}

fn check_playable(scenario: &Scenario) -> Result<(), ContentDbError> {
    match scenario.first_empty_step() {
        Some(idx) => Err(ContentDbError::InvalidData(format!(
            "scenario {} step {} has no options",
            scenario.id, idx
        ))),
        None => Ok(()),
    }
}

/// Authoring store for scenarios and the active mission.
pub struct SqliteContentRepository {
    conn: Connection,
}

impl SqliteContentRepository {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ContentDbError> {
        Self::init(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self, ContentDbError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, ContentDbError> {
        let mut db = Self { conn };
        db.conn.execute_batch(CONTENT_DB_SCHEMA)?;
        db.ensure_content_meta()?;
        Ok(db)
    }

    pub fn load_scenarios(&self) -> Result<Vec<Scenario>, ContentDbError> {
        let mut stmt = self
            .conn
            .prepare("SELECT scenario_id, title, intro, steps_json FROM scenarios ORDER BY rowid")?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
            ))
        })?;

        let mut scenarios = Vec::new();
        for row in rows {
            let (id_raw, title, intro, steps_raw) = row?;
            let id = id_raw
                .parse::<IncidentType>()
                .map_err(ContentDbError::InvalidData)?;
            let steps: Vec<Step> = serde_json::from_str(&steps_raw)?;
            let scenario = Scenario {
                id,
                title,
                intro,
                steps,
            };
            if let Err(err) = check_playable(&scenario) {
                error!("skipping stored scenario: {}", err);
                continue;
            }
            scenarios.push(scenario);
        }
        Ok(scenarios)
    }

    pub fn upsert_scenario(&mut self, scenario: &Scenario) -> Result<(), ContentDbError> {
        check_playable(scenario)?;
        let steps_json = serde_json::to_string(&scenario.steps)?;
        self.conn.execute(
            "INSERT INTO scenarios (scenario_id, title, intro, steps_json) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(scenario_id) DO UPDATE SET title = excluded.title, intro = excluded.intro, steps_json = excluded.steps_json",
            params![scenario.id.as_str(), scenario.title, scenario.intro, steps_json],
        )?;
        Ok(())
    }

    pub fn delete_scenario(&mut self, id: IncidentType) -> Result<bool, ContentDbError> {
        let removed = self
            .conn
            .execute("DELETE FROM scenarios WHERE scenario_id = ?1", params![id.as_str()])?;
        Ok(removed > 0)
    }

    /// Writes every scenario of the catalog in one transaction.
    pub fn seed_from_catalog(&mut self, catalog: &ScenarioCatalog) -> Result<(), ContentDbError> {
        let tx = self.conn.transaction()?;
        for scenario in &catalog.scenarios {
            check_playable(scenario)?;
            let steps_json = serde_json::to_string(&scenario.steps)?;
            tx.execute(
                "INSERT OR REPLACE INTO scenarios (scenario_id, title, intro, steps_json) VALUES (?1, ?2, ?3, ?4)",
                params![scenario.id.as_str(), scenario.title, scenario.intro, steps_json],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    pub fn load_active_mission(&self) -> Result<Option<MissionFilter>, ContentDbError> {
        let raw = self
            .conn
            .query_row(
                "SELECT active_mission FROM game_settings WHERE id = ?1",
                params![SETTINGS_ROW],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        match raw {
            Some(value) => value
                .parse::<MissionFilter>()
                .map(Some)
                .map_err(ContentDbError::InvalidData),
            None => Ok(None),
        }
    }

    pub fn set_active_mission(&mut self, filter: MissionFilter) -> Result<(), ContentDbError> {
        self.conn.execute(
            "INSERT INTO game_settings (id, active_mission) VALUES (?1, ?2)
             ON CONFLICT(id) DO UPDATE SET active_mission = excluded.active_mission",
            params![SETTINGS_ROW, filter.to_string()],
        )?;
        Ok(())
    }

    fn ensure_content_meta(&mut self) -> Result<(), ContentDbError> {
        let version = self
            .conn
            .query_row(
                "SELECT schema_version FROM content_meta WHERE id = 1",
                [],
                |row| row.get::<_, i64>(0),
            )
            .optional()?;

        match version {
            Some(CONTENT_SCHEMA_VERSION) => Ok(()),
            Some(other) => Err(ContentDbError::InvalidData(format!(
                "content_meta version mismatch (found {}, expected {})",
                other, CONTENT_SCHEMA_VERSION
            ))),
            None => {
                self.conn.execute(
                    "INSERT INTO content_meta (id, schema_version) VALUES (1, ?1)",
                    params![CONTENT_SCHEMA_VERSION],
                )?;
                Ok(())
            }
        }
    }
}

impl ContentRepository for SqliteContentRepository {
    fn scenarios(&self) -> Result<Vec<Scenario>, Box<dyn std::error::Error>> {
        Ok(SqliteContentRepository::load_scenarios(self)?)
    }

    fn active_mission_filter(&self) -> Result<Option<MissionFilter>, Box<dyn std::error::Error>> {
        Ok(SqliteContentRepository::load_active_mission(self)?)
    }
}
