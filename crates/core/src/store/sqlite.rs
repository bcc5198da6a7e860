//! SQLite-backed decision store implementation.

use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use crate::quality::{CustomFormatDef, DelayProfile, QualityProfile, ReleaseFilter};
use crate::searcher::MediaKind;

use super::traits::{DecisionStore, GateChecks, StoreError};
use super::types::{
    BlocklistEntry, CreateItemRequest, IndexerExclusion, MediaExclusion, MonitoredItem,
    PendingGrab, Settings,
};

/// SQLite-backed store. Structured rule-sets (profiles, formats, delay
/// profiles, filters) live in JSON data columns; row ids are authoritative
/// and overwrite whatever id the JSON carries on load.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

fn db_err(e: rusqlite::Error) -> StoreError {
    StoreError::Database(e.to_string())
}

fn json_err(e: serde_json::Error) -> StoreError {
    StoreError::Serialization(e.to_string())
}

fn kind_to_str(kind: MediaKind) -> &'static str {
    match kind {
        MediaKind::Movie => "movie",
        MediaKind::Tv => "tv",
    }
}

fn kind_from_str(s: &str) -> MediaKind {
    match s {
        "tv" => MediaKind::Tv,
        _ => MediaKind::Movie,
    }
}

fn parse_timestamp(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

impl SqliteStore {
    /// Open (or create) the database file and initialize the schema.
    pub fn new(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path).map_err(db_err)?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// In-memory store, useful for testing.
    pub fn in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory().map_err(db_err)?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), StoreError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS monitored_items (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                year INTEGER,
                media_kind TEXT NOT NULL,
                tmdb_id INTEGER,
                library_id INTEGER NOT NULL,
                quality_profile_id INTEGER,
                monitored INTEGER NOT NULL DEFAULT 1,
                last_searched_at TEXT,
                owned_score INTEGER
            );

            CREATE TABLE IF NOT EXISTS quality_profiles (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                data TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS custom_formats (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                data TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS delay_profiles (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                data TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS release_filters (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                profile_id INTEGER NOT NULL,
                data TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS blocklist (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                release_title TEXT NOT NULL,
                media_id INTEGER,
                reason TEXT,
                added_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS indexer_exclusions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                library_id INTEGER NOT NULL,
                indexer_id INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS media_exclusions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                tmdb_id INTEGER NOT NULL,
                media_kind TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS pending_grabs (
                id TEXT PRIMARY KEY,
                media_id INTEGER NOT NULL,
                release_title TEXT NOT NULL,
                release_json TEXT NOT NULL,
                score INTEGER NOT NULL,
                indexer_id INTEGER,
                available_at TEXT NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS settings (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                data TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_blocklist_title ON blocklist(release_title);
            CREATE INDEX IF NOT EXISTS idx_filters_profile ON release_filters(profile_id);
            CREATE INDEX IF NOT EXISTS idx_pending_available ON pending_grabs(available_at);
            "#,
        )
        .map_err(db_err)
    }

    fn row_to_item(row: &rusqlite::Row) -> rusqlite::Result<MonitoredItem> {
        let media_kind: String = row.get(3)?;
        let last_searched_at: Option<String> = row.get(8)?;
        Ok(MonitoredItem {
            id: row.get(0)?,
            title: row.get(1)?,
            year: row.get(2)?,
            media_kind: kind_from_str(&media_kind),
            tmdb_id: row.get(4)?,
            library_id: row.get(5)?,
            quality_profile_id: row.get(6)?,
            monitored: row.get::<_, i64>(7)? != 0,
            last_searched_at: last_searched_at.as_deref().map(parse_timestamp),
            owned_score: row.get(9)?,
        })
    }

    /// Insert or replace a JSON-data row, returning the row id.
    fn save_json_row(
        &self,
        table: &str,
        name: Option<&str>,
        id: i64,
        data: &str,
    ) -> Result<i64, StoreError> {
        let conn = self.conn.lock().unwrap();
        match (name, id) {
            (Some(name), 0) => {
                conn.execute(
                    &format!("INSERT INTO {table} (name, data) VALUES (?1, ?2)"),
                    params![name, data],
                )
                .map_err(db_err)?;
            }
            (Some(name), id) => {
                conn.execute(
                    &format!("INSERT OR REPLACE INTO {table} (id, name, data) VALUES (?1, ?2, ?3)"),
                    params![id, name, data],
                )
                .map_err(db_err)?;
            }
            (None, 0) => {
                conn.execute(
                    &format!("INSERT INTO {table} (data) VALUES (?1)"),
                    params![data],
                )
                .map_err(db_err)?;
            }
            (None, id) => {
                conn.execute(
                    &format!("INSERT OR REPLACE INTO {table} (id, data) VALUES (?1, ?2)"),
                    params![id, data],
                )
                .map_err(db_err)?;
            }
        }
        Ok(if id == 0 {
            conn.last_insert_rowid()
        } else {
            id
        })
    }

    fn delete_by_id(&self, table: &str, id: i64) -> Result<bool, StoreError> {
        let conn = self.conn.lock().unwrap();
        let affected = conn
            .execute(&format!("DELETE FROM {table} WHERE id = ?1"), params![id])
            .map_err(db_err)?;
        Ok(affected > 0)
    }
}

impl GateChecks for SqliteStore {
    fn is_blocklisted(&self, release_title: &str) -> Result<bool, StoreError> {
        let conn = self.conn.lock().unwrap();
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM blocklist WHERE lower(release_title) = lower(?1)",
                params![release_title],
                |row| row.get(0),
            )
            .map_err(db_err)?;
        Ok(count > 0)
    }

    fn is_indexer_excluded(&self, library_id: i64, indexer_id: i64) -> Result<bool, StoreError> {
        let conn = self.conn.lock().unwrap();
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM indexer_exclusions WHERE library_id = ?1 AND indexer_id = ?2",
                params![library_id, indexer_id],
                |row| row.get(0),
            )
            .map_err(db_err)?;
        Ok(count > 0)
    }
}

impl DecisionStore for SqliteStore {
    fn list_items(&self) -> Result<Vec<MonitoredItem>, StoreError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare(
                "SELECT id, title, year, media_kind, tmdb_id, library_id, quality_profile_id,
                        monitored, last_searched_at, owned_score
                 FROM monitored_items ORDER BY id",
            )
            .map_err(db_err)?;
        let items = stmt
            .query_map([], Self::row_to_item)
            .map_err(db_err)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(db_err)?;
        Ok(items)
    }

    fn get_item(&self, id: i64) -> Result<Option<MonitoredItem>, StoreError> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            "SELECT id, title, year, media_kind, tmdb_id, library_id, quality_profile_id,
                    monitored, last_searched_at, owned_score
             FROM monitored_items WHERE id = ?1",
            params![id],
            Self::row_to_item,
        )
        .optional()
        .map_err(db_err)
    }

    fn create_item(&self, request: &CreateItemRequest) -> Result<MonitoredItem, StoreError> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO monitored_items
                (title, year, media_kind, tmdb_id, library_id, quality_profile_id, monitored)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                request.title,
                request.year,
                kind_to_str(request.media_kind),
                request.tmdb_id,
                request.library_id,
                request.quality_profile_id,
                request.monitored as i64,
            ],
        )
        .map_err(db_err)?;
        let id = conn.last_insert_rowid();
        Ok(MonitoredItem {
            id,
            title: request.title.clone(),
            year: request.year,
            media_kind: request.media_kind,
            tmdb_id: request.tmdb_id,
            library_id: request.library_id,
            quality_profile_id: request.quality_profile_id,
            monitored: request.monitored,
            last_searched_at: None,
            owned_score: None,
        })
    }

    fn delete_item(&self, id: i64) -> Result<bool, StoreError> {
        self.delete_by_id("monitored_items", id)
    }

    fn set_last_searched(&self, id: i64, at: DateTime<Utc>) -> Result<(), StoreError> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "UPDATE monitored_items SET last_searched_at = ?1 WHERE id = ?2",
            params![at.to_rfc3339(), id],
        )
        .map_err(db_err)?;
        Ok(())
    }

    fn set_owned_score(&self, id: i64, score: Option<i32>) -> Result<(), StoreError> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "UPDATE monitored_items SET owned_score = ?1 WHERE id = ?2",
            params![score, id],
        )
        .map_err(db_err)?;
        Ok(())
    }

    fn list_profiles(&self) -> Result<Vec<QualityProfile>, StoreError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare("SELECT id, data FROM quality_profiles ORDER BY id")
            .map_err(db_err)?;
        let rows = stmt
            .query_map([], |row| {
                Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
            })
            .map_err(db_err)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(db_err)?;
        rows.into_iter()
            .map(|(id, data)| {
                let mut profile: QualityProfile =
                    serde_json::from_str(&data).map_err(json_err)?;
                profile.id = id;
                Ok(profile)
            })
            .collect()
    }

    fn get_profile(&self, id: i64) -> Result<Option<QualityProfile>, StoreError> {
        let conn = self.conn.lock().unwrap();
        let data: Option<String> = conn
            .query_row(
                "SELECT data FROM quality_profiles WHERE id = ?1",
                params![id],
                |row| row.get(0),
            )
            .optional()
            .map_err(db_err)?;
        match data {
            Some(data) => {
                let mut profile: QualityProfile =
                    serde_json::from_str(&data).map_err(json_err)?;
                profile.id = id;
                Ok(Some(profile))
            }
            None => Ok(None),
        }
    }

    fn save_profile(&self, profile: &QualityProfile) -> Result<i64, StoreError> {
        let data = serde_json::to_string(profile).map_err(json_err)?;
        self.save_json_row("quality_profiles", Some(&profile.name), profile.id, &data)
    }

    fn delete_profile(&self, id: i64) -> Result<bool, StoreError> {
        self.delete_by_id("quality_profiles", id)
    }

    fn list_formats(&self) -> Result<Vec<CustomFormatDef>, StoreError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare("SELECT id, data FROM custom_formats ORDER BY id")
            .map_err(db_err)?;
        let rows = stmt
            .query_map([], |row| {
                Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
            })
            .map_err(db_err)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(db_err)?;
        rows.into_iter()
            .map(|(id, data)| {
                let mut format: CustomFormatDef =
                    serde_json::from_str(&data).map_err(json_err)?;
                format.id = id;
                Ok(format)
            })
            .collect()
    }

    fn save_format(&self, format: &CustomFormatDef) -> Result<i64, StoreError> {
        let data = serde_json::to_string(format).map_err(json_err)?;
        self.save_json_row("custom_formats", Some(&format.name), format.id, &data)
    }

    fn delete_format(&self, id: i64) -> Result<bool, StoreError> {
        self.delete_by_id("custom_formats", id)
    }

    fn list_delay_profiles(&self) -> Result<Vec<DelayProfile>, StoreError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare("SELECT id, data FROM delay_profiles ORDER BY id")
            .map_err(db_err)?;
        let rows = stmt
            .query_map([], |row| {
                Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
            })
            .map_err(db_err)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(db_err)?;
        rows.into_iter()
            .map(|(id, data)| {
                let mut profile: DelayProfile = serde_json::from_str(&data).map_err(json_err)?;
                profile.id = id;
                Ok(profile)
            })
            .collect()
    }

    fn save_delay_profile(&self, profile: &DelayProfile) -> Result<i64, StoreError> {
        let data = serde_json::to_string(profile).map_err(json_err)?;
        self.save_json_row("delay_profiles", None, profile.id, &data)
    }

    fn delete_delay_profile(&self, id: i64) -> Result<bool, StoreError> {
        self.delete_by_id("delay_profiles", id)
    }

    fn list_filters(&self, profile_id: i64) -> Result<Vec<ReleaseFilter>, StoreError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare("SELECT id, data FROM release_filters WHERE profile_id = ?1 ORDER BY id")
            .map_err(db_err)?;
        let rows = stmt
            .query_map(params![profile_id], |row| {
                Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
            })
            .map_err(db_err)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(db_err)?;
        rows.into_iter()
            .map(|(id, data)| {
                let mut filter: ReleaseFilter = serde_json::from_str(&data).map_err(json_err)?;
                filter.id = id;
                Ok(filter)
            })
            .collect()
    }

    fn save_filter(&self, filter: &ReleaseFilter) -> Result<i64, StoreError> {
        let data = serde_json::to_string(filter).map_err(json_err)?;
        let conn = self.conn.lock().unwrap();
        if filter.id == 0 {
            conn.execute(
                "INSERT INTO release_filters (profile_id, data) VALUES (?1, ?2)",
                params![filter.profile_id, data],
            )
            .map_err(db_err)?;
            Ok(conn.last_insert_rowid())
        } else {
            conn.execute(
                "INSERT OR REPLACE INTO release_filters (id, profile_id, data) VALUES (?1, ?2, ?3)",
                params![filter.id, filter.profile_id, data],
            )
            .map_err(db_err)?;
            Ok(filter.id)
        }
    }

    fn delete_filter(&self, id: i64) -> Result<bool, StoreError> {
        self.delete_by_id("release_filters", id)
    }

    fn list_blocklist(&self) -> Result<Vec<BlocklistEntry>, StoreError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare(
                "SELECT id, release_title, media_id, reason, added_at
                 FROM blocklist ORDER BY id",
            )
            .map_err(db_err)?;
        let entries = stmt
            .query_map([], |row| {
                let added_at: String = row.get(4)?;
                Ok(BlocklistEntry {
                    id: row.get(0)?,
                    release_title: row.get(1)?,
                    media_id: row.get(2)?,
                    reason: row.get(3)?,
                    added_at: parse_timestamp(&added_at),
                })
            })
            .map_err(db_err)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(db_err)?;
        Ok(entries)
    }

    fn add_blocklist(
        &self,
        release_title: &str,
        media_id: Option<i64>,
        reason: Option<&str>,
    ) -> Result<BlocklistEntry, StoreError> {
        let added_at = Utc::now();
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO blocklist (release_title, media_id, reason, added_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![release_title, media_id, reason, added_at.to_rfc3339()],
        )
        .map_err(db_err)?;
        Ok(BlocklistEntry {
            id: conn.last_insert_rowid(),
            release_title: release_title.to_string(),
            media_id,
            reason: reason.map(str::to_string),
            added_at,
        })
    }

    fn remove_blocklist(&self, id: i64) -> Result<bool, StoreError> {
        self.delete_by_id("blocklist", id)
    }

    fn list_indexer_exclusions(&self) -> Result<Vec<IndexerExclusion>, StoreError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare("SELECT id, library_id, indexer_id FROM indexer_exclusions ORDER BY id")
            .map_err(db_err)?;
        let rows = stmt
            .query_map([], |row| {
                Ok(IndexerExclusion {
                    id: row.get(0)?,
                    library_id: row.get(1)?,
                    indexer_id: row.get(2)?,
                })
            })
            .map_err(db_err)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(db_err)?;
        Ok(rows)
    }

    fn add_indexer_exclusion(
        &self,
        library_id: i64,
        indexer_id: i64,
    ) -> Result<IndexerExclusion, StoreError> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO indexer_exclusions (library_id, indexer_id) VALUES (?1, ?2)",
            params![library_id, indexer_id],
        )
        .map_err(db_err)?;
        Ok(IndexerExclusion {
            id: conn.last_insert_rowid(),
            library_id,
            indexer_id,
        })
    }

    fn remove_indexer_exclusion(&self, id: i64) -> Result<bool, StoreError> {
        self.delete_by_id("indexer_exclusions", id)
    }

    fn list_media_exclusions(&self) -> Result<Vec<MediaExclusion>, StoreError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare("SELECT id, tmdb_id, media_kind FROM media_exclusions ORDER BY id")
            .map_err(db_err)?;
        let rows = stmt
            .query_map([], |row| {
                let kind: String = row.get(2)?;
                Ok(MediaExclusion {
                    id: row.get(0)?,
                    tmdb_id: row.get(1)?,
                    media_kind: kind_from_str(&kind),
                })
            })
            .map_err(db_err)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(db_err)?;
        Ok(rows)
    }

    fn add_media_exclusion(
        &self,
        tmdb_id: i64,
        media_kind: MediaKind,
    ) -> Result<MediaExclusion, StoreError> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO media_exclusions (tmdb_id, media_kind) VALUES (?1, ?2)",
            params![tmdb_id, kind_to_str(media_kind)],
        )
        .map_err(db_err)?;
        Ok(MediaExclusion {
            id: conn.last_insert_rowid(),
            tmdb_id,
            media_kind,
        })
    }

    fn remove_media_exclusion(&self, id: i64) -> Result<bool, StoreError> {
        self.delete_by_id("media_exclusions", id)
    }

    fn is_media_excluded(&self, tmdb_id: i64, media_kind: MediaKind) -> Result<bool, StoreError> {
        let conn = self.conn.lock().unwrap();
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM media_exclusions WHERE tmdb_id = ?1 AND media_kind = ?2",
                params![tmdb_id, kind_to_str(media_kind)],
                |row| row.get(0),
            )
            .map_err(db_err)?;
        Ok(count > 0)
    }

    fn list_pending(&self) -> Result<Vec<PendingGrab>, StoreError> {
        self.query_pending("SELECT id, media_id, release_title, release_json, score, indexer_id, available_at, created_at FROM pending_grabs ORDER BY available_at", None)
    }

    fn due_pending(&self, now: DateTime<Utc>) -> Result<Vec<PendingGrab>, StoreError> {
        self.query_pending(
            "SELECT id, media_id, release_title, release_json, score, indexer_id, available_at, created_at FROM pending_grabs WHERE available_at <= ?1 ORDER BY available_at",
            Some(now),
        )
    }

    fn save_pending(&self, grab: &PendingGrab) -> Result<(), StoreError> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT OR REPLACE INTO pending_grabs
                (id, media_id, release_title, release_json, score, indexer_id, available_at, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                grab.id,
                grab.media_id,
                grab.release_title,
                grab.release_json,
                grab.score,
                grab.indexer_id,
                grab.available_at.to_rfc3339(),
                grab.created_at.to_rfc3339(),
            ],
        )
        .map_err(db_err)?;
        Ok(())
    }

    fn remove_pending(&self, id: &str) -> Result<bool, StoreError> {
        let conn = self.conn.lock().unwrap();
        let affected = conn
            .execute("DELETE FROM pending_grabs WHERE id = ?1", params![id])
            .map_err(db_err)?;
        Ok(affected > 0)
    }

    fn get_settings(&self) -> Result<Settings, StoreError> {
        let conn = self.conn.lock().unwrap();
        let data: Option<String> = conn
            .query_row("SELECT data FROM settings WHERE id = 1", [], |row| {
                row.get(0)
            })
            .optional()
            .map_err(db_err)?;
        match data {
            Some(data) => serde_json::from_str(&data).map_err(json_err),
            None => Ok(Settings::default()),
        }
    }

    fn save_settings(&self, settings: &Settings) -> Result<(), StoreError> {
        let data = serde_json::to_string(settings).map_err(json_err)?;
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT OR REPLACE INTO settings (id, data) VALUES (1, ?1)",
            params![data],
        )
        .map_err(db_err)?;
        Ok(())
    }
}

impl SqliteStore {
    fn query_pending(
        &self,
        sql: &str,
        cutoff: Option<DateTime<Utc>>,
    ) -> Result<Vec<PendingGrab>, StoreError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(sql).map_err(db_err)?;
        let map_row = |row: &rusqlite::Row| -> rusqlite::Result<PendingGrab> {
            let available_at: String = row.get(6)?;
            let created_at: String = row.get(7)?;
            Ok(PendingGrab {
                id: row.get(0)?,
                media_id: row.get(1)?,
                release_title: row.get(2)?,
                release_json: row.get(3)?,
                score: row.get(4)?,
                indexer_id: row.get(5)?,
                available_at: parse_timestamp(&available_at),
                created_at: parse_timestamp(&created_at),
            })
        };
        let rows = match cutoff {
            Some(now) => stmt
                .query_map(params![now.to_rfc3339()], map_row)
                .map_err(db_err)?
                .collect::<Result<Vec<_>, _>>()
                .map_err(db_err)?,
            None => stmt
                .query_map([], map_row)
                .map_err(db_err)?
                .collect::<Result<Vec<_>, _>>()
                .map_err(db_err)?,
        };
        Ok(rows)
    }
}
