//! Shared SQLite connection tuning

use rusqlite::Connection;
use std::time::Duration;

const PRAGMAS: &[&str] = &[
    "PRAGMA journal_mode = WAL",
    "PRAGMA synchronous = NORMAL",
    "PRAGMA temp_store = MEMORY",
    "PRAGMA mmap_size = 268435456",
    "PRAGMA cache_size = -64000",
    "PRAGMA wal_autocheckpoint = 1000",
];

/// Apply the PRAGMAs every durable-store connection runs with
///
/// - WAL journal so bootstrap reads don't block batch flushes
/// - NORMAL sync (safe under WAL)
/// - in-memory temp store, 256MB mmap, ~64MB page cache
/// - checkpoint every 1000 pages
/// - 5s busy timeout for writers racing on the lock
pub fn apply_optimized_pragmas(conn: &Connection) -> Result<(), rusqlite::Error> {
    for pragma in PRAGMAS {
        // Some of these echo the new value back as a row
        let mut stmt = conn.prepare(pragma)?;
        let mut rows = stmt.query([])?;
        while rows.next()?.is_some() {}
    }
    conn.busy_timeout(Duration::from_secs(5))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_wal_checkpoint_configured() {
        let dir = tempdir().unwrap();
        let conn = Connection::open(dir.path().join("pragma.db")).unwrap();
        apply_optimized_pragmas(&conn).unwrap();

        let journal_mode: String = conn
            .query_row("PRAGMA journal_mode", [], |row| row.get(0))
            .unwrap();
        assert_eq!(journal_mode.to_lowercase(), "wal");

        let checkpoint: i32 = conn
            .query_row("PRAGMA wal_autocheckpoint", [], |row| row.get(0))
            .unwrap();
        assert_eq!(checkpoint, 1000);
    }

    #[test]
    fn test_pragmas_on_memory_database() {
        let conn = Connection::open_in_memory().unwrap();
        apply_optimized_pragmas(&conn).unwrap();
    }
}
