//! SQLite-based storage for work threads, items, the activity log, and
//! computed snapshots (cognitive load, recommendations, insights).

use std::path::Path;

use chrono::{DateTime, Duration, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use super::data_dir;
use crate::activity::{Activity, ActivityKind};
use crate::error::StoreError;
use crate::insight::{Insight, InsightKind, Severity};
use crate::load::{CognitiveLoad, LoadLevel};
use crate::priority::PriorityRecommendation;
use crate::store::{ActivityStore, InsightStore, SnapshotStore, ThreadStore};
use crate::thread::{PriorityTier, ThreadStatus, WorkItem, WorkItemKind, WorkThread};

// === Helper Functions ===

/// Parse a datetime from an RFC3339 string with fallback to current time.
fn parse_timestamp(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

/// Serialize a JSON payload column.
fn to_json_param<T: serde::Serialize>(value: &T) -> Result<String, rusqlite::Error> {
    serde_json::to_string(value).map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))
}

/// Deserialize a JSON payload column.
fn from_json_column<T: serde::de::DeserializeOwned>(
    idx: usize,
    raw: &str,
) -> Result<T, rusqlite::Error> {
    serde_json::from_str(raw).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

const THREAD_COLUMNS: &str =
    "id, user_id, title, summary, priority, progress, status, is_ignored, deadline, \
     item_count, last_activity, created_at";

/// Build a WorkThread from a database row.
fn row_to_thread(row: &rusqlite::Row) -> Result<WorkThread, rusqlite::Error> {
    let priority_str: String = row.get(4)?;
    let status_str: String = row.get(6)?;
    let deadline: Option<String> = row.get(8)?;
    Ok(WorkThread {
        id: row.get(0)?,
        user_id: row.get(1)?,
        title: row.get(2)?,
        summary: row.get(3)?,
        priority: PriorityTier::parse(&priority_str).unwrap_or_default(),
        progress: row.get(5)?,
        status: ThreadStatus::parse(&status_str).unwrap_or_default(),
        is_ignored: row.get(7)?,
        deadline: deadline.map(|raw| parse_timestamp(&raw)),
        item_count: row.get(9)?,
        last_activity: parse_timestamp(&row.get::<_, String>(10)?),
        created_at: parse_timestamp(&row.get::<_, String>(11)?),
    })
}

/// Build an Activity from a database row.
fn row_to_activity(row: &rusqlite::Row) -> Result<Activity, rusqlite::Error> {
    let kind_str: String = row.get(3)?;
    Ok(Activity {
        id: row.get(0)?,
        user_id: row.get(1)?,
        thread_id: row.get(2)?,
        kind: ActivityKind::parse(&kind_str).unwrap_or(ActivityKind::ThreadUpdated),
        timestamp: parse_timestamp(&row.get::<_, String>(4)?),
    })
}

/// Build a WorkItem from a database row.
fn row_to_item(row: &rusqlite::Row) -> Result<WorkItem, rusqlite::Error> {
    let kind_str: String = row.get(3)?;
    Ok(WorkItem {
        id: row.get(0)?,
        thread_id: row.get(1)?,
        user_id: row.get(2)?,
        kind: WorkItemKind::parse(&kind_str).unwrap_or_default(),
        title: row.get(4)?,
        received_at: parse_timestamp(&row.get::<_, String>(5)?),
    })
}

/// Build a CognitiveLoad from a database row.
fn row_to_load(row: &rusqlite::Row) -> Result<CognitiveLoad, rusqlite::Error> {
    let level_str: String = row.get(2)?;
    let score: f64 = row.get(3)?;
    let factors_raw: String = row.get(4)?;
    Ok(CognitiveLoad {
        id: row.get(0)?,
        user_id: row.get(1)?,
        level: LoadLevel::parse(&level_str).unwrap_or_else(|_| LoadLevel::from_score(score)),
        score,
        factors: from_json_column(4, &factors_raw)?,
        timestamp: parse_timestamp(&row.get::<_, String>(5)?),
    })
}

/// Build a PriorityRecommendation from a database row.
fn row_to_recommendation(row: &rusqlite::Row) -> Result<PriorityRecommendation, rusqlite::Error> {
    let reasoning_raw: String = row.get(4)?;
    Ok(PriorityRecommendation {
        id: row.get(0)?,
        user_id: row.get(1)?,
        thread_id: row.get(2)?,
        score: row.get(3)?,
        reasoning: from_json_column(4, &reasoning_raw)?,
        generated_at: parse_timestamp(&row.get::<_, String>(5)?),
        is_active: row.get(6)?,
    })
}

/// Build an Insight from a database row.
fn row_to_insight(row: &rusqlite::Row) -> Result<Insight, rusqlite::Error> {
    let kind_str: String = row.get(3)?;
    let severity_str: String = row.get(4)?;
    Ok(Insight {
        id: row.get(0)?,
        user_id: row.get(1)?,
        thread_id: row.get(2)?,
        kind: InsightKind::parse(&kind_str).unwrap_or(InsightKind::AiGenerated),
        severity: Severity::parse(&severity_str).unwrap_or(Severity::Info),
        title: row.get(5)?,
        description: row.get(6)?,
        detected_at: parse_timestamp(&row.get::<_, String>(7)?),
    })
}

/// SQLite database backing every store seam.
///
/// One connection, one file at `~/.config/worklens/worklens.db`.
pub struct WorklensDb {
    conn: Connection,
}

impl WorklensDb {
    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Open the database at `~/.config/worklens/worklens.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, StoreError> {
        let path = data_dir()?.join("worklens.db");
        Self::open_at(&path)
    }

    /// Open a database at an explicit path.
    pub fn open_at(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path).map_err(|source| StoreError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()
            .map_err(|e| StoreError::MigrationFailed(e.to_string()))?;
        Ok(db)
    }

    /// Open an in-memory database (for tests and scratch work).
    pub fn open_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory().map_err(StoreError::from)?;
        let db = Self { conn };
        db.migrate()
            .map_err(|e| StoreError::MigrationFailed(e.to_string()))?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS threads (
                id            TEXT PRIMARY KEY,
                user_id       TEXT NOT NULL,
                title         TEXT NOT NULL,
                summary       TEXT,
                priority      TEXT NOT NULL DEFAULT 'medium',
                progress      INTEGER NOT NULL DEFAULT 0,
                status        TEXT NOT NULL DEFAULT 'active',
                is_ignored    INTEGER NOT NULL DEFAULT 0,
                deadline      TEXT,
                item_count    INTEGER NOT NULL DEFAULT 0,
                last_activity TEXT NOT NULL,
                created_at    TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS work_items (
                id          TEXT PRIMARY KEY,
                thread_id   TEXT NOT NULL,
                user_id     TEXT NOT NULL,
                kind        TEXT NOT NULL,
                title       TEXT NOT NULL,
                received_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS activities (
                id        TEXT PRIMARY KEY,
                user_id   TEXT NOT NULL,
                thread_id TEXT,
                kind      TEXT NOT NULL,
                timestamp TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS cognitive_loads (
                id        TEXT PRIMARY KEY,
                user_id   TEXT NOT NULL,
                level     TEXT NOT NULL,
                score     REAL NOT NULL,
                factors   TEXT NOT NULL,
                timestamp TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS recommendations (
                id           TEXT PRIMARY KEY,
                user_id      TEXT NOT NULL,
                thread_id    TEXT NOT NULL,
                score        INTEGER NOT NULL,
                reasoning    TEXT NOT NULL,
                generated_at TEXT NOT NULL,
                is_active    INTEGER NOT NULL DEFAULT 1
            );

            CREATE TABLE IF NOT EXISTS insights (
                id          TEXT PRIMARY KEY,
                user_id     TEXT NOT NULL,
                thread_id   TEXT,
                kind        TEXT NOT NULL,
                severity    TEXT NOT NULL,
                title       TEXT NOT NULL,
                description TEXT NOT NULL,
                detected_at TEXT NOT NULL
            );

            -- Indexes for the common query patterns
            CREATE INDEX IF NOT EXISTS idx_threads_user_status ON threads(user_id, status);
            CREATE INDEX IF NOT EXISTS idx_threads_deadline ON threads(user_id, deadline);
            CREATE INDEX IF NOT EXISTS idx_items_thread ON work_items(thread_id);
            CREATE INDEX IF NOT EXISTS idx_activities_user_time ON activities(user_id, timestamp);
            CREATE INDEX IF NOT EXISTS idx_loads_user_time ON cognitive_loads(user_id, timestamp);
            CREATE INDEX IF NOT EXISTS idx_recs_user_active ON recommendations(user_id, is_active);
            CREATE INDEX IF NOT EXISTS idx_insights_user_time ON insights(user_id, detected_at);",
        )
    }

    // === Thread CRUD ===

    /// Create a thread and log a thread-created event.
    pub fn create_thread(&self, thread: &WorkThread) -> Result<(), rusqlite::Error> {
        self.conn.execute(
            "INSERT INTO threads (id, user_id, title, summary, priority, progress, status,
                                  is_ignored, deadline, item_count, last_activity, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            params![
                thread.id,
                thread.user_id,
                thread.title,
                thread.summary,
                thread.priority.as_str(),
                thread.progress,
                thread.status.as_str(),
                thread.is_ignored,
                thread.deadline.map(|d| d.to_rfc3339()),
                thread.item_count,
                thread.last_activity.to_rfc3339(),
                thread.created_at.to_rfc3339(),
            ],
        )?;
        self.insert_activity(
            &Activity::new(&thread.user_id, ActivityKind::ThreadCreated).with_thread(&thread.id),
        )
    }

    /// Fetch one thread by id.
    pub fn get_thread(&self, id: &str) -> Result<Option<WorkThread>, rusqlite::Error> {
        self.conn
            .query_row(
                &format!("SELECT {THREAD_COLUMNS} FROM threads WHERE id = ?1"),
                params![id],
                row_to_thread,
            )
            .optional()
    }

    /// Every thread for the user regardless of status, oldest first.
    pub fn list_threads(&self, user_id: &str) -> Result<Vec<WorkThread>, rusqlite::Error> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {THREAD_COLUMNS} FROM threads WHERE user_id = ?1 ORDER BY created_at ASC"
        ))?;
        let mut rows = stmt.query(params![user_id])?;
        let mut threads = Vec::new();
        while let Some(row) = rows.next()? {
            threads.push(row_to_thread(row)?);
        }
        Ok(threads)
    }

    /// Write a thread's mutable fields back and log a thread-updated
    /// event. Missing ids are a silent no-op; callers fetch first.
    pub fn update_thread(&self, thread: &WorkThread) -> Result<(), rusqlite::Error> {
        let changed = self.conn.execute(
            "UPDATE threads
             SET title = ?2, summary = ?3, priority = ?4, progress = ?5, status = ?6,
                 is_ignored = ?7, deadline = ?8, item_count = ?9, last_activity = ?10
             WHERE id = ?1",
            params![
                thread.id,
                thread.title,
                thread.summary,
                thread.priority.as_str(),
                thread.progress,
                thread.status.as_str(),
                thread.is_ignored,
                thread.deadline.map(|d| d.to_rfc3339()),
                thread.item_count,
                thread.last_activity.to_rfc3339(),
            ],
        )?;
        if changed > 0 {
            self.insert_activity(
                &Activity::new(&thread.user_id, ActivityKind::ThreadUpdated)
                    .with_thread(&thread.id),
            )?;
        }
        Ok(())
    }

    /// Delete a thread and its items. Returns whether a row was removed.
    /// The activity log keeps its history.
    pub fn delete_thread(&self, id: &str) -> Result<bool, rusqlite::Error> {
        self.conn
            .execute("DELETE FROM work_items WHERE thread_id = ?1", params![id])?;
        let deleted = self
            .conn
            .execute("DELETE FROM threads WHERE id = ?1", params![id])?;
        Ok(deleted > 0)
    }

    // === Work items ===

    /// Capture an item into its thread: inserts the item, bumps the
    /// thread's item count and last activity, and logs an item-added event.
    pub fn add_item(&self, item: &WorkItem) -> Result<(), rusqlite::Error> {
        self.conn.execute(
            "INSERT INTO work_items (id, thread_id, user_id, kind, title, received_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                item.id,
                item.thread_id,
                item.user_id,
                item.kind.as_str(),
                item.title,
                item.received_at.to_rfc3339(),
            ],
        )?;
        self.conn.execute(
            "UPDATE threads SET item_count = item_count + 1, last_activity = ?2 WHERE id = ?1",
            params![item.thread_id, item.received_at.to_rfc3339()],
        )?;
        self.insert_activity(
            &Activity::new(&item.user_id, ActivityKind::ItemAdded).with_thread(&item.thread_id),
        )
    }

    /// Items captured into a thread, oldest first.
    pub fn list_items(&self, thread_id: &str) -> Result<Vec<WorkItem>, rusqlite::Error> {
        let mut stmt = self.conn.prepare(
            "SELECT id, thread_id, user_id, kind, title, received_at
             FROM work_items WHERE thread_id = ?1 ORDER BY received_at ASC",
        )?;
        let mut rows = stmt.query(params![thread_id])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(row_to_item(row)?);
        }
        Ok(items)
    }

    // === Activity log ===

    fn insert_activity(&self, activity: &Activity) -> Result<(), rusqlite::Error> {
        self.conn.execute(
            "INSERT INTO activities (id, user_id, thread_id, kind, timestamp)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                activity.id,
                activity.user_id,
                activity.thread_id,
                activity.kind.as_str(),
                activity.timestamp.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    fn query_activities_since(
        &self,
        user_id: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<Activity>, rusqlite::Error> {
        let mut stmt = self.conn.prepare(
            "SELECT id, user_id, thread_id, kind, timestamp
             FROM activities WHERE user_id = ?1 AND timestamp >= ?2
             ORDER BY timestamp ASC",
        )?;
        let mut rows = stmt.query(params![user_id, since.to_rfc3339()])?;
        let mut activities = Vec::new();
        while let Some(row) = rows.next()? {
            activities.push(row_to_activity(row)?);
        }
        Ok(activities)
    }

    // === Thread queries ===

    fn query_active_threads(&self, user_id: &str) -> Result<Vec<WorkThread>, rusqlite::Error> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {THREAD_COLUMNS} FROM threads
             WHERE user_id = ?1 AND status = 'active'
             ORDER BY created_at ASC"
        ))?;
        let mut rows = stmt.query(params![user_id])?;
        let mut threads = Vec::new();
        while let Some(row) = rows.next()? {
            threads.push(row_to_thread(row)?);
        }
        Ok(threads)
    }

    fn query_deadline_window(
        &self,
        user_id: &str,
        days: i64,
    ) -> Result<Vec<WorkThread>, rusqlite::Error> {
        let now = Utc::now();
        let end = now + Duration::days(days);
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {THREAD_COLUMNS} FROM threads
             WHERE user_id = ?1 AND status = 'active'
               AND deadline IS NOT NULL AND deadline > ?2 AND deadline <= ?3
             ORDER BY deadline ASC"
        ))?;
        let mut rows = stmt.query(params![user_id, now.to_rfc3339(), end.to_rfc3339()])?;
        let mut threads = Vec::new();
        while let Some(row) = rows.next()? {
            threads.push(row_to_thread(row)?);
        }
        Ok(threads)
    }

    // === Snapshots ===

    fn insert_cognitive_load(&self, load: &CognitiveLoad) -> Result<(), rusqlite::Error> {
        self.conn.execute(
            "INSERT INTO cognitive_loads (id, user_id, level, score, factors, timestamp)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                load.id,
                load.user_id,
                load.level.as_str(),
                load.score,
                to_json_param(&load.factors)?,
                load.timestamp.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// The newest load measurements, most recent first.
    pub fn load_history(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<CognitiveLoad>, rusqlite::Error> {
        let mut stmt = self.conn.prepare(
            "SELECT id, user_id, level, score, factors, timestamp
             FROM cognitive_loads WHERE user_id = ?1
             ORDER BY timestamp DESC LIMIT ?2",
        )?;
        let mut rows = stmt.query(params![user_id, limit as i64])?;
        let mut loads = Vec::new();
        while let Some(row) = rows.next()? {
            loads.push(row_to_load(row)?);
        }
        Ok(loads)
    }

    fn insert_recommendation(&self, rec: &PriorityRecommendation) -> Result<(), rusqlite::Error> {
        self.conn.execute(
            "INSERT INTO recommendations (id, user_id, thread_id, score, reasoning, generated_at, is_active)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                rec.id,
                rec.user_id,
                rec.thread_id,
                rec.score,
                to_json_param(&rec.reasoning)?,
                rec.generated_at.to_rfc3339(),
                rec.is_active,
            ],
        )?;
        Ok(())
    }

    fn clear_active_recommendations(&self, user_id: &str) -> Result<(), rusqlite::Error> {
        self.conn.execute(
            "UPDATE recommendations SET is_active = 0 WHERE user_id = ?1 AND is_active = 1",
            params![user_id],
        )?;
        Ok(())
    }

    fn query_active_recommendations(
        &self,
        user_id: &str,
    ) -> Result<Vec<PriorityRecommendation>, rusqlite::Error> {
        let mut stmt = self.conn.prepare(
            "SELECT id, user_id, thread_id, score, reasoning, generated_at, is_active
             FROM recommendations WHERE user_id = ?1 AND is_active = 1
             ORDER BY score DESC, rowid ASC",
        )?;
        let mut rows = stmt.query(params![user_id])?;
        let mut recs = Vec::new();
        while let Some(row) = rows.next()? {
            recs.push(row_to_recommendation(row)?);
        }
        Ok(recs)
    }

    fn insert_insight(&self, insight: &Insight) -> Result<(), rusqlite::Error> {
        self.conn.execute(
            "INSERT INTO insights (id, user_id, thread_id, kind, severity, title, description, detected_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                insight.id,
                insight.user_id,
                insight.thread_id,
                insight.kind.as_str(),
                insight.severity.as_str(),
                insight.title,
                insight.description,
                insight.detected_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    fn query_recent_insights(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<Insight>, rusqlite::Error> {
        let mut stmt = self.conn.prepare(
            "SELECT id, user_id, thread_id, kind, severity, title, description, detected_at
             FROM insights WHERE user_id = ?1
             ORDER BY detected_at DESC LIMIT ?2",
        )?;
        let mut rows = stmt.query(params![user_id, limit as i64])?;
        let mut insights = Vec::new();
        while let Some(row) = rows.next()? {
            insights.push(row_to_insight(row)?);
        }
        Ok(insights)
    }
}

impl ThreadStore for WorklensDb {
    fn active_threads(&self, user_id: &str) -> Result<Vec<WorkThread>, StoreError> {
        Ok(self.query_active_threads(user_id)?)
    }

    fn threads_with_deadline_within(
        &self,
        user_id: &str,
        days: i64,
    ) -> Result<Vec<WorkThread>, StoreError> {
        Ok(self.query_deadline_window(user_id, days)?)
    }
}

impl ActivityStore for WorklensDb {
    fn record_activity(&self, activity: &Activity) -> Result<(), StoreError> {
        Ok(self.insert_activity(activity)?)
    }

    fn activities_since(
        &self,
        user_id: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<Activity>, StoreError> {
        Ok(self.query_activities_since(user_id, since)?)
    }
}

impl SnapshotStore for WorklensDb {
    fn save_cognitive_load(&self, load: &CognitiveLoad) -> Result<(), StoreError> {
        Ok(self.insert_cognitive_load(load)?)
    }

    fn latest_cognitive_load(&self, user_id: &str) -> Result<Option<CognitiveLoad>, StoreError> {
        Ok(self.load_history(user_id, 1)?.into_iter().next())
    }

    fn save_recommendation(&self, rec: &PriorityRecommendation) -> Result<(), StoreError> {
        Ok(self.insert_recommendation(rec)?)
    }

    fn deactivate_recommendations(&self, user_id: &str) -> Result<(), StoreError> {
        Ok(self.clear_active_recommendations(user_id)?)
    }

    fn active_recommendations(
        &self,
        user_id: &str,
    ) -> Result<Vec<PriorityRecommendation>, StoreError> {
        Ok(self.query_active_recommendations(user_id)?)
    }
}

impl InsightStore for WorklensDb {
    fn save_insight(&self, insight: &Insight) -> Result<(), StoreError> {
        Ok(self.insert_insight(insight)?)
    }

    fn recent_insights(&self, user_id: &str, limit: usize) -> Result<Vec<Insight>, StoreError> {
        Ok(self.query_recent_insights(user_id, limit)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::load::LoadFactors;
    use crate::priority::Reasoning;

    fn plain_reasoning(title: &str) -> Reasoning {
        Reasoning {
            title: title.to_string(),
            description: "because".to_string(),
            factors: vec![],
        }
    }

    #[test]
    fn thread_roundtrip_preserves_fields() {
        let db = WorklensDb::open_memory().unwrap();
        let deadline = Utc::now() + Duration::days(2);
        let thread = WorkThread::new("u1", "Quarterly report")
            .with_priority(PriorityTier::High)
            .with_progress(35)
            .with_deadline(deadline)
            .with_summary("Q3 numbers")
            .with_ignored(true);
        db.create_thread(&thread).unwrap();

        let loaded = db.get_thread(&thread.id).unwrap().unwrap();
        assert_eq!(loaded, thread);
        assert!(db.get_thread("nope").unwrap().is_none());
    }

    #[test]
    fn create_thread_logs_an_activity() {
        let db = WorklensDb::open_memory().unwrap();
        let thread = WorkThread::new("u1", "t");
        db.create_thread(&thread).unwrap();

        let log = db
            .activities_since("u1", Utc::now() - Duration::minutes(5))
            .unwrap();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].kind, ActivityKind::ThreadCreated);
        assert_eq!(log[0].thread_id.as_deref(), Some(thread.id.as_str()));
    }

    #[test]
    fn update_thread_persists_and_logs() {
        let db = WorklensDb::open_memory().unwrap();
        let mut thread = WorkThread::new("u1", "t");
        db.create_thread(&thread).unwrap();

        thread.set_progress(60).unwrap();
        thread.is_ignored = true;
        db.update_thread(&thread).unwrap();

        let loaded = db.get_thread(&thread.id).unwrap().unwrap();
        assert_eq!(loaded.progress, 60);
        assert!(loaded.is_ignored);

        let log = db
            .activities_since("u1", Utc::now() - Duration::minutes(5))
            .unwrap();
        assert_eq!(log.len(), 2);
        assert_eq!(log[1].kind, ActivityKind::ThreadUpdated);
    }

    #[test]
    fn update_of_missing_thread_logs_nothing() {
        let db = WorklensDb::open_memory().unwrap();
        let thread = WorkThread::new("u1", "ghost");
        db.update_thread(&thread).unwrap();
        let log = db
            .activities_since("u1", Utc::now() - Duration::minutes(5))
            .unwrap();
        assert!(log.is_empty());
    }

    #[test]
    fn add_item_bumps_count_and_last_activity() {
        let db = WorklensDb::open_memory().unwrap();
        let thread = WorkThread::new("u1", "inbox");
        db.create_thread(&thread).unwrap();

        let item = WorkItem::new("u1", &thread.id, WorkItemKind::Email, "Re: budget");
        db.add_item(&item).unwrap();

        let loaded = db.get_thread(&thread.id).unwrap().unwrap();
        assert_eq!(loaded.item_count, 1);
        assert_eq!(loaded.last_activity, item.received_at);

        let items = db.list_items(&thread.id).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].kind, WorkItemKind::Email);

        let log = db
            .activities_since("u1", Utc::now() - Duration::minutes(5))
            .unwrap();
        assert_eq!(log.last().unwrap().kind, ActivityKind::ItemAdded);
    }

    #[test]
    fn active_threads_filters_status_but_keeps_ignored() {
        let db = WorklensDb::open_memory().unwrap();
        let now = Utc::now();

        let mut first = WorkThread::new("u1", "oldest");
        first.created_at = now - Duration::days(3);
        let mut ignored = WorkThread::new("u1", "ignored").with_ignored(true);
        ignored.created_at = now - Duration::days(2);
        let mut done = WorkThread::new("u1", "done");
        done.created_at = now - Duration::days(1);
        done.status = ThreadStatus::Completed;
        let other_user = WorkThread::new("u2", "not mine");

        for thread in [&first, &ignored, &done, &other_user] {
            db.create_thread(thread).unwrap();
        }

        let active = db.active_threads("u1").unwrap();
        let titles: Vec<&str> = active.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["oldest", "ignored"]);
    }

    #[test]
    fn deadline_window_is_bounded_both_ways() {
        let db = WorklensDb::open_memory().unwrap();
        let now = Utc::now();

        let soon = WorkThread::new("u1", "soon").with_deadline(now + Duration::days(2));
        let edge = WorkThread::new("u1", "edge").with_deadline(now + Duration::days(7) - Duration::minutes(1));
        let far = WorkThread::new("u1", "far").with_deadline(now + Duration::days(10));
        let past = WorkThread::new("u1", "past").with_deadline(now - Duration::days(1));
        let none = WorkThread::new("u1", "none");

        for thread in [&soon, &edge, &far, &past, &none] {
            db.create_thread(thread).unwrap();
        }

        let pending = db.threads_with_deadline_within("u1", 7).unwrap();
        let titles: Vec<&str> = pending.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["soon", "edge"]);
    }

    #[test]
    fn activities_since_is_inclusive_of_boundary() {
        let db = WorklensDb::open_memory().unwrap();
        let now = Utc::now();
        let boundary = now - Duration::hours(1);

        let at_boundary = Activity::new("u1", ActivityKind::ContextSwitch).at(boundary);
        let before = Activity::new("u1", ActivityKind::ContextSwitch)
            .at(boundary - Duration::seconds(1));
        let after = Activity::new("u1", ActivityKind::FocusSession)
            .at(now - Duration::minutes(10));
        for activity in [&at_boundary, &before, &after] {
            db.record_activity(activity).unwrap();
        }

        let log = db.activities_since("u1", boundary).unwrap();
        assert_eq!(log.len(), 2);
        assert_eq!(log[0].id, at_boundary.id);
        assert_eq!(log[1].id, after.id);
    }

    #[test]
    fn latest_load_wins_and_factors_roundtrip() {
        let db = WorklensDb::open_memory().unwrap();
        let factors = LoadFactors {
            active_threads: 4,
            switching_frequency: 2,
            work_duration: 1.5,
            pending_deadlines: 1,
        };
        let older = CognitiveLoad::new("u1", factors, Utc::now() - Duration::hours(2));
        let newer = CognitiveLoad::new("u1", factors, Utc::now());
        db.save_cognitive_load(&older).unwrap();
        db.save_cognitive_load(&newer).unwrap();

        let latest = db.latest_cognitive_load("u1").unwrap().unwrap();
        assert_eq!(latest.id, newer.id);
        assert_eq!(latest.factors, factors);

        let history = db.load_history("u1", 10).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].id, newer.id);

        assert!(db.latest_cognitive_load("u2").unwrap().is_none());
    }

    #[test]
    fn recommendations_batch_lifecycle() {
        let db = WorklensDb::open_memory().unwrap();
        let first = PriorityRecommendation::new("u1", "t1", 85, plain_reasoning("one"));
        let second = PriorityRecommendation::new("u1", "t2", 60, plain_reasoning("two"));
        db.save_recommendation(&second).unwrap();
        db.save_recommendation(&first).unwrap();

        let active = db.active_recommendations("u1").unwrap();
        assert_eq!(active.len(), 2);
        // Highest score first regardless of insertion order.
        assert_eq!(active[0].id, first.id);
        assert_eq!(active[1].id, second.id);

        db.deactivate_recommendations("u1").unwrap();
        let replacement = PriorityRecommendation::new("u1", "t3", 70, plain_reasoning("three"));
        db.save_recommendation(&replacement).unwrap();

        let active = db.active_recommendations("u1").unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, replacement.id);
        assert_eq!(active[0].reasoning.title, "three");
    }

    #[test]
    fn recent_insights_orders_and_limits() {
        let db = WorklensDb::open_memory().unwrap();
        let now = Utc::now();
        for hours in [3, 2, 1] {
            let insight = Insight::new(
                "u1",
                InsightKind::DeadlineRisk,
                Severity::Warning,
                format!("insight {hours}"),
                "details",
                now - Duration::hours(hours),
            );
            db.save_insight(&insight).unwrap();
        }

        let recent = db.recent_insights("u1", 2).unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].title, "insight 1");
        assert_eq!(recent[1].title, "insight 2");
    }

    #[test]
    fn delete_thread_removes_thread_and_items() {
        let db = WorklensDb::open_memory().unwrap();
        let thread = WorkThread::new("u1", "t");
        db.create_thread(&thread).unwrap();
        db.add_item(&WorkItem::new("u1", &thread.id, WorkItemKind::Task, "do it"))
            .unwrap();

        assert!(db.delete_thread(&thread.id).unwrap());
        assert!(db.get_thread(&thread.id).unwrap().is_none());
        assert!(db.list_items(&thread.id).unwrap().is_empty());
        assert!(!db.delete_thread(&thread.id).unwrap());
    }

    #[test]
    fn open_at_creates_file_backed_database() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.db");
        {
            let db = WorklensDb::open_at(&path).unwrap();
            db.create_thread(&WorkThread::new("u1", "persisted")).unwrap();
        }
        let reopened = WorklensDb::open_at(&path).unwrap();
        let threads = reopened.list_threads("u1").unwrap();
        assert_eq!(threads.len(), 1);
        assert_eq!(threads[0].title, "persisted");
    }
}
