use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Result, Row};
use serde::de::DeserializeOwned;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::models::{
    Climb, ClimbStatus, Grade, Gym, HoldType, NewClimb, NewGym, Profile, RouteType, Snapshot,
    Theme, WallAngle,
};

const CLIMB_COLUMNS: &str = "id, route_name, grade, gym_id, attempts, status, route_type, \
                             wall_angle, hold_types, date, notes, created_at";

pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path.as_ref())?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        debug!(path = %path.as_ref().display(), "opened database");
        Ok(Self { conn })
    }

    pub fn init(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS gyms (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                location TEXT NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS climbs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                route_name TEXT NOT NULL,
                grade TEXT NOT NULL,
                gym_id INTEGER NOT NULL,
                attempts INTEGER NOT NULL DEFAULT 1 CHECK(attempts >= 1),
                status TEXT NOT NULL CHECK(status IN ('attempted', 'completed', 'flash')),
                route_type TEXT,
                wall_angle TEXT,
                hold_types TEXT NOT NULL DEFAULT '[]',
                date TEXT NOT NULL,
                notes TEXT,
                created_at TEXT NOT NULL,
                FOREIGN KEY (gym_id) REFERENCES gyms(id)
            );

            -- Single-row climber profile
            CREATE TABLE IF NOT EXISTS profile (
                id INTEGER PRIMARY KEY CHECK(id = 1),
                name TEXT NOT NULL DEFAULT '',
                start_date TEXT NOT NULL,
                favorite_gym INTEGER,
                selected_gym INTEGER,
                theme TEXT NOT NULL DEFAULT 'system',
                goals TEXT NOT NULL DEFAULT '[]'
            );

            CREATE INDEX IF NOT EXISTS idx_climbs_date ON climbs(date);
            CREATE INDEX IF NOT EXISTS idx_climbs_gym ON climbs(gym_id);
            CREATE INDEX IF NOT EXISTS idx_climbs_status ON climbs(status);
            CREATE INDEX IF NOT EXISTS idx_climbs_grade ON climbs(grade);
            CREATE INDEX IF NOT EXISTS idx_gyms_name ON gyms(name);
            "#,
        )?;

        info!("database schema ready");
        Ok(())
    }

    // Gym operations
    pub fn add_gym(&self, gym: &NewGym) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO gyms (name, location, created_at) VALUES (?1, ?2, ?3)",
            params![gym.name, gym.location, timestamp(&Utc::now())],
        )?;
        let id = self.conn.last_insert_rowid();
        debug!(id, name = %gym.name, "added gym");
        Ok(id)
    }

    pub fn get_gym(&self, id: i64) -> Result<Option<Gym>> {
        self.conn
            .query_row(
                "SELECT id, name, location, created_at FROM gyms WHERE id = ?1",
                params![id],
                gym_from_row,
            )
            .optional()
    }

    pub fn list_gyms(&self) -> Result<Vec<Gym>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, location, created_at FROM gyms ORDER BY name, id")?;
        let rows = stmt.query_map([], gym_from_row)?;
        rows.collect()
    }

    // Climb operations
    pub fn add_climb(&self, climb: &NewClimb) -> Result<i64> {
        let holds: Vec<&str> = climb.hold_types.iter().map(HoldType::as_str).collect();
        let holds_json = serde_json::to_string(&holds)
            .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;

        self.conn.execute(
            r#"
            INSERT INTO climbs (route_name, grade, gym_id, attempts, status, route_type,
                                wall_angle, hold_types, date, notes, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
            params![
                climb.route_name,
                climb.grade.label(),
                climb.gym_id,
                climb.attempts,
                climb.status.as_str(),
                climb.route_type.as_ref().map(RouteType::as_str),
                climb.wall_angle.as_ref().map(WallAngle::as_str),
                holds_json,
                timestamp(&climb.date),
                climb.notes,
                timestamp(&Utc::now()),
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        debug!(id, grade = climb.grade.label(), status = climb.status.as_str(), "logged climb");
        Ok(id)
    }

    pub fn get_climb(&self, id: i64) -> Result<Option<Climb>> {
        let sql = format!("SELECT {} FROM climbs WHERE id = ?1", CLIMB_COLUMNS);
        self.conn
            .query_row(&sql, params![id], climb_from_row)
            .optional()
    }

    /// Climbs newest first. `limit` of `None` returns everything.
    pub fn list_climbs(&self, limit: Option<usize>) -> Result<Vec<Climb>> {
        // SQLite treats a negative LIMIT as unbounded
        let limit = limit.map(|n| n as i64).unwrap_or(-1);
        let sql = format!(
            "SELECT {} FROM climbs ORDER BY date DESC, id DESC LIMIT ?1",
            CLIMB_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![limit], climb_from_row)?;
        let climbs = rows.collect::<Result<Vec<_>>>()?;
        debug!(count = climbs.len(), "loaded climbs");
        Ok(climbs)
    }

    pub fn count_climbs(&self) -> Result<i64> {
        self.conn
            .query_row("SELECT COUNT(*) FROM climbs", [], |row| row.get(0))
    }

    // Profile operations
    pub fn get_profile(&self) -> Result<Profile> {
        let profile = self
            .conn
            .query_row(
                r#"
                SELECT name, start_date, favorite_gym, selected_gym, theme, goals
                FROM profile
                WHERE id = 1
                "#,
                [],
                |row| {
                    let start_date: String = row.get(1)?;
                    let theme: String = row.get(4)?;
                    let goals: String = row.get(5)?;
                    Ok(Profile {
                        name: row.get(0)?,
                        start_date: NaiveDate::parse_from_str(&start_date, "%Y-%m-%d")
                            .map_err(|e| conversion_error(1, e))?,
                        favorite_gym: row.get(2)?,
                        selected_gym: row.get(3)?,
                        theme: Theme::from_str(&theme).unwrap_or_default(),
                        goals: parse_json(5, &goals)?,
                    })
                },
            )
            .optional()?;

        Ok(profile.unwrap_or_default())
    }

    pub fn save_profile(&self, profile: &Profile) -> Result<()> {
        let goals = serde_json::to_string(&profile.goals)
            .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;

        self.conn.execute(
            r#"
            INSERT INTO profile (id, name, start_date, favorite_gym, selected_gym, theme, goals)
            VALUES (1, ?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                start_date = excluded.start_date,
                favorite_gym = excluded.favorite_gym,
                selected_gym = excluded.selected_gym,
                theme = excluded.theme,
                goals = excluded.goals
            "#,
            params![
                profile.name,
                profile.start_date.format("%Y-%m-%d").to_string(),
                profile.favorite_gym,
                profile.selected_gym,
                profile.theme.as_str(),
                goals,
            ],
        )?;

        debug!("saved profile");
        Ok(())
    }

    /// Everything in the store, for export.
    pub fn snapshot(&self) -> Result<Snapshot> {
        Ok(Snapshot {
            exported_at: Utc::now(),
            climbs: self.list_climbs(None)?,
            gyms: self.list_gyms()?,
            profile: self.get_profile()?,
        })
    }

    /// Empties climbs and gyms and resets the profile.
    pub fn clear_all(&self) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        // Climbs reference gyms, so they go first
        tx.execute("DELETE FROM climbs", [])?;
        tx.execute("DELETE FROM gyms", [])?;
        tx.execute("DELETE FROM profile", [])?;
        tx.commit()?;

        info!("cleared all climbing data");
        Ok(())
    }
}

#[cfg(test)]
impl Database {
    pub fn execute_raw(&self, sql: &str) -> Result<()> {
        self.conn.execute_batch(sql)
    }
}

fn timestamp(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn conversion_error<E>(idx: usize, err: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}

fn parse_timestamp(idx: usize, s: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| conversion_error(idx, e))
}

fn parse_json<T: DeserializeOwned>(idx: usize, s: &str) -> Result<T> {
    serde_json::from_str(s).map_err(|e| conversion_error(idx, e))
}

fn gym_from_row(row: &Row) -> Result<Gym> {
    let created_at: String = row.get(3)?;
    Ok(Gym {
        id: row.get(0)?,
        name: row.get(1)?,
        location: row.get(2)?,
        created_at: parse_timestamp(3, &created_at)?,
    })
}

// Stored values are trusted as-is; unknown labels become legacy variants.
fn climb_from_row(row: &Row) -> Result<Climb> {
    let id: i64 = row.get(0)?;
    let grade: String = row.get(2)?;
    let status: String = row.get(5)?;
    let route_type: Option<String> = row.get(6)?;
    let wall_angle: Option<String> = row.get(7)?;
    let hold_types: String = row.get(8)?;
    let date: String = row.get(9)?;
    let created_at: String = row.get(11)?;

    let status = ClimbStatus::from_str(&status).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            5,
            Type::Text,
            format!("unknown climb status '{}'", status).into(),
        )
    })?;

    let grade = Grade::from_str(&grade);
    if let Grade::Unrecognized(raw) = &grade {
        warn!(id, grade = %raw, "climb has a grade outside the V-scale table");
    }

    let route_type = route_type
        .filter(|s| !s.trim().is_empty())
        .map(|s| RouteType::from_str(&s));
    if let Some(RouteType::Other(raw)) = &route_type {
        warn!(id, route_type = %raw, "climb has an unrecognized route type");
    }

    let wall_angle = wall_angle
        .filter(|s| !s.trim().is_empty())
        .map(|s| WallAngle::from_str(&s));
    if let Some(WallAngle::Other(raw)) = &wall_angle {
        warn!(id, wall_angle = %raw, "climb has an unrecognized wall angle");
    }

    let hold_types: Vec<String> = parse_json(8, &hold_types)?;
    let mut holds: Vec<HoldType> = Vec::with_capacity(hold_types.len());
    for raw in hold_types {
        let hold = HoldType::from_str(&raw);
        if let HoldType::Other(raw) = &hold {
            warn!(id, hold_type = %raw, "climb has an unrecognized hold type");
        }
        if !holds.contains(&hold) {
            holds.push(hold);
        }
    }

    Ok(Climb {
        id,
        route_name: row.get(1)?,
        grade,
        gym_id: row.get(3)?,
        attempts: row.get(4)?,
        status,
        route_type,
        wall_angle,
        hold_types: holds,
        date: parse_timestamp(9, &date)?,
        notes: row.get(10)?,
        created_at: parse_timestamp(11, &created_at)?,
    })
}
