use rusqlite::Connection;
use std::path::Path;
use tokio::task;
use crate::error::{Result, LexrelError};

pub mod migrate;

// WAL for concurrent readers while a job writes, NORMAL sync for speed,
// foreign keys for integrity, busy_timeout so a status query does not fail
// while a batch transaction holds the write lock.
const CONNECTION_PRAGMAS: &str = "PRAGMA journal_mode = WAL; \
     PRAGMA synchronous = NORMAL; \
     PRAGMA foreign_keys = ON; \
     PRAGMA temp_store = MEMORY; \
     PRAGMA busy_timeout = 5000;";

/// Database connection wrapper
#[derive(Debug, Clone)]
pub struct Db {
    path: std::path::PathBuf,
}

impl Db {
    /// Create a new database connection manager
    pub fn new<P: AsRef<Path>>(db_path: P) -> Self {
        Self {
            path: db_path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Open a new blocking connection with the standard pragmas.
    /// Used directly by generation jobs, which already run on their own thread.
    pub fn open_connection(&self) -> Result<Connection> {
        let conn = Connection::open(&self.path)
            .map_err(LexrelError::Database)?;
        conn.execute_batch(CONNECTION_PRAGMAS)?;
        Ok(conn)
    }

    /// Execute a closure with a database connection in a blocking task
    pub async fn with_connection<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let db = self.clone();
        task::spawn_blocking(move || {
            let mut conn = db.open_connection()?;
            f(&mut conn)
        })
        .await
        .map_err(|e| LexrelError::StoreFailure(format!("blocking task failed: {}", e)))?
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use rusqlite::params;
    use tempfile::TempDir;

    /// Fresh database with the real migrations applied.
    pub fn migrated_db() -> (Db, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db = Db::new(temp_dir.path().join("test.db"));
        let migrations_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("migrations");
        let mut conn = db.open_connection().unwrap();
        migrate::run_migrations(&mut conn, &migrations_dir).unwrap();
        (db, temp_dir)
    }

    pub fn insert_word(conn: &Connection, user_id: &str, id: i64, word: &str, definition: Option<&str>) {
        conn.execute(
            "INSERT INTO words (id, user_id, word, definition) VALUES (?1, ?2, ?3, ?4)",
            params![id, user_id, word, definition],
        )
        .unwrap();
    }

    /// Insert both directions of a relation, the way the store writes them.
    pub fn insert_pair(conn: &Connection, user_id: &str, a: i64, b: i64, relation_type: &str, confidence: f64) {
        for (s, t) in [(a, b), (b, a)] {
            conn.execute(
                "INSERT INTO words_relations (user_id, word_id, related_word_id, relation_type, confidence) \
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![user_id, s, t, relation_type, confidence],
            )
            .unwrap();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_db_connection() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");
        let db = Db::new(&db_path);

        let result = db.with_connection(|conn| {
            conn.execute("CREATE TABLE test (id INTEGER PRIMARY KEY)", [])
                .map_err(LexrelError::Database)?;
            Ok(())
        }).await;

        assert!(result.is_ok());
        assert!(db_path.exists());
    }

    #[tokio::test]
    async fn test_pragmas_set() {
        let temp_dir = TempDir::new().unwrap();
        let db = Db::new(temp_dir.path().join("test.db"));

        db.with_connection(|conn| {
            let journal_mode: String = conn.query_row("PRAGMA journal_mode", [], |row| row.get(0))?;
            assert_eq!(journal_mode.to_uppercase(), "WAL");

            let foreign_keys: i32 = conn.query_row("PRAGMA foreign_keys", [], |row| row.get(0))?;
            assert_eq!(foreign_keys, 1);

            Ok::<(), LexrelError>(())
        }).await.unwrap();
    }

    #[test]
    fn test_blocking_connection_shares_file() {
        let (db, _temp) = test_support::migrated_db();
        let conn = db.open_connection().unwrap();
        test_support::insert_word(&conn, "u1", 1, "abandon", None);
        let other = db.open_connection().unwrap();
        let count: i64 = other
            .query_row("SELECT COUNT(*) FROM words", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }
}
