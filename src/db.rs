//! Durable store for user ratings
//!
//! The `leadboard` table is the system of record. Bootstrap reads it in
//! `user_id` order; the update pipeline writes ratings back in batches.
//! See `sql/00_leadboard.sql` for the schema.

use crate::pipeline::types::RatingUpdateEvent;
use crate::sqlite_pragma::apply_optimized_pragmas;
use async_trait::async_trait;
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::{Arc, Mutex};

const SCHEMA_SQL: &str = include_str!("../sql/00_leadboard.sql");

#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("database connection lock poisoned")]
    Poisoned,
    #[error("database task failed: {0}")]
    Task(String),
}

/// One row of the `leadboard` table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRow {
    pub user_id: i64,
    pub username: String,
    pub rating: i64,
}

/// Contract for the durable backing store.
#[async_trait]
pub trait DurableStore: Send + Sync {
    /// Up to `limit` rows with `user_id > after_user_id`, ordered by `user_id`
    async fn fetch_users_after(
        &self,
        after_user_id: i64,
        limit: usize,
    ) -> Result<Vec<UserRow>, DbError>;

    /// Write a batch of rating changes in one transaction
    ///
    /// All-or-nothing: any failure rolls back every update in the batch.
    /// Returns the number of rows actually changed (unknown usernames
    /// change nothing).
    async fn apply_rating_updates(&self, updates: Vec<RatingUpdateEvent>) -> Result<usize, DbError>;

    /// Connectivity check
    async fn ping(&self) -> Result<(), DbError>;
}

/// Create the schema if it doesn't exist yet (idempotent)
pub fn run_schema_migrations(conn: &Connection) -> Result<(), DbError> {
    conn.execute_batch(SCHEMA_SQL)?;
    log::debug!("✅ Durable schema ready");
    Ok(())
}

/// Accepts `sqlite://path`, `sqlite:path`, a bare path, or `:memory:`
pub fn sqlite_path(url: &str) -> &str {
    url.strip_prefix("sqlite://")
        .or_else(|| url.strip_prefix("sqlite:"))
        .unwrap_or(url)
}

/// SQLite implementation of `DurableStore`
///
/// One connection behind a mutex; every query runs on the blocking pool.
pub struct SqliteDurableStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteDurableStore {
    /// Open (creating if needed) the database named by `url`
    pub fn open(url: &str) -> Result<Self, DbError> {
        let path = sqlite_path(url);

        let conn = if path == ":memory:" {
            Connection::open_in_memory()?
        } else {
            if let Some(parent) = Path::new(path).parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            Connection::open(path)?
        };

        Self::from_connection(conn)
    }

    /// Wrap an existing connection, applying PRAGMAs and schema
    pub fn from_connection(conn: Connection) -> Result<Self, DbError> {
        apply_optimized_pragmas(&conn)?;
        run_schema_migrations(&conn)?;

        log::info!("✅ SQLite durable store initialized with WAL mode");

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    async fn with_conn<T, F>(&self, f: F) -> Result<T, DbError>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> Result<T, DbError> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut guard = conn.lock().map_err(|_| DbError::Poisoned)?;
            f(&mut guard)
        })
        .await
        .map_err(|e| DbError::Task(e.to_string()))?
    }

    /// Insert users, or overwrite the rating of existing usernames
    pub async fn insert_users(&self, users: Vec<(String, i64)>) -> Result<usize, DbError> {
        self.with_conn(move |conn| {
            let tx = conn.transaction()?;
            let mut written = 0;
            {
                let mut stmt = tx.prepare(
                    "INSERT INTO leadboard (username, rating) VALUES (?1, ?2)
                     ON CONFLICT(username) DO UPDATE SET rating = excluded.rating",
                )?;
                for (username, rating) in &users {
                    written += stmt.execute(params![username, rating])?;
                }
            }
            tx.commit()?;
            Ok(written)
        })
        .await
    }

    /// Stored rating for `username`
    pub async fn rating_of(&self, username: &str) -> Result<Option<i64>, DbError> {
        let username = username.to_string();
        self.with_conn(move |conn| {
            let mut stmt = conn.prepare("SELECT rating FROM leadboard WHERE username = ?1")?;
            let mut rows = stmt.query(params![username])?;
            let rating = match rows.next()? {
                Some(row) => Some(row.get(0)?),
                None => None,
            };
            Ok(rating)
        })
        .await
    }

    /// Total rows in `leadboard`
    pub async fn count_users(&self) -> Result<i64, DbError> {
        self.with_conn(|conn| {
            Ok(conn.query_row("SELECT COUNT(*) FROM leadboard", [], |row| row.get(0))?)
        })
        .await
    }

    /// Run arbitrary DDL/DML against the store (fixtures and maintenance)
    pub async fn execute_batch(&self, sql: &str) -> Result<(), DbError> {
        let sql = sql.to_string();
        self.with_conn(move |conn| Ok(conn.execute_batch(&sql)?)).await
    }
}

#[async_trait]
impl DurableStore for SqliteDurableStore {
    async fn fetch_users_after(
        &self,
        after_user_id: i64,
        limit: usize,
    ) -> Result<Vec<UserRow>, DbError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT user_id, username, rating
                 FROM leadboard
                 WHERE user_id > ?1
                 ORDER BY user_id
                 LIMIT ?2",
            )?;
            let rows = stmt.query_map(params![after_user_id, limit], |row| {
                Ok(UserRow {
                    user_id: row.get(0)?,
                    username: row.get(1)?,
                    rating: row.get(2)?,
                })
            })?;

            let mut users = Vec::new();
            for row in rows {
                users.push(row?);
            }
            Ok(users)
        })
        .await
    }

    async fn apply_rating_updates(&self, updates: Vec<RatingUpdateEvent>) -> Result<usize, DbError> {
        if updates.is_empty() {
            return Ok(0);
        }

        self.with_conn(move |conn| {
            // Dropping `tx` on any early return rolls the whole batch back
            let tx = conn.transaction()?;
            let mut updated = 0;
            {
                let mut stmt = tx.prepare("UPDATE leadboard SET rating = ?1 WHERE username = ?2")?;
                for update in &updates {
                    updated += stmt.execute(params![update.rating, update.username])?;
                }
            }
            tx.commit()?;
            Ok(updated)
        })
        .await
    }

    async fn ping(&self) -> Result<(), DbError> {
        self.with_conn(|conn| {
            conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;
            Ok(())
        })
        .await
    }
}
