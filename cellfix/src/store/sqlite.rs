//! SQLite-backed lookup store.
//!
//! Expects the bundled dataset layout:
//!
//! ```text
//! CREATE TABLE cell_towers (
//!     cell_id   INTEGER NOT NULL,
//!     lac       INTEGER NOT NULL,
//!     mcc       INTEGER NOT NULL,
//!     mnc       INTEGER NOT NULL,
//!     latitude  REAL NOT NULL,
//!     longitude REAL NOT NULL,
//!     accuracy  REAL NOT NULL
//! );
//! ```
//!
//! The file is opened read-only and never created. Among duplicate keys,
//! records come back in rowid order, or in primary-key order for a
//! `WITHOUT ROWID` table.

use std::path::{Path, PathBuf};

use rusqlite::{params, Connection, OpenFlags};
use tracing::{debug, info, warn};

use crate::cell::CellKey;
use crate::BoxFuture;

use super::types::{LookupStore, StoreError, StoreInfo, StoreSource, TowerRecord};

/// Table holding the tower records.
pub const TABLE_NAME: &str = "cell_towers";

/// Columns the table must provide.
pub const REQUIRED_COLUMNS: [&str; 7] = [
    "cell_id",
    "lac",
    "mcc",
    "mnc",
    "latitude",
    "longitude",
    "accuracy",
];

const FIND_SQL: &str = "SELECT latitude, longitude, accuracy FROM cell_towers \
     WHERE cell_id = ?1 AND lac = ?2 AND mcc = ?3 AND mnc = ?4";

/// Read-only handle to a SQLite tower dataset.
#[derive(Debug)]
pub struct SqliteLookupStore {
    path: PathBuf,
    conn: Option<Connection>,
    /// [`FIND_SQL`] plus the table's natural order.
    find_sql: String,
}

impl SqliteLookupStore {
    /// Opens and validates the dataset at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::OpenFailed`] if the file does not exist, is not a
    /// SQLite database, or lacks the `cell_towers` table or any of
    /// [`REQUIRED_COLUMNS`].
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let open_failed = |reason: String| StoreError::OpenFailed {
            path: path.clone(),
            reason,
        };

        if !path.is_file() {
            return Err(open_failed("dataset file not found".to_string()));
        }

        let conn = Connection::open_with_flags(
            &path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|e| open_failed(e.to_string()))?;

        let find_sql = verify_schema(&conn).map_err(open_failed)?;

        info!(path = %path.display(), "Lookup store opened");
        Ok(Self {
            path,
            conn: Some(conn),
            find_sql,
        })
    }

    /// Path of the dataset file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn connection(&self) -> Result<&Connection, StoreError> {
        self.conn.as_ref().ok_or(StoreError::Unavailable)
    }
}

/// Checks that the tower table exists with every required column and
/// returns the lookup query ordered by the table's natural order.
///
/// This is also the first statement run against the file, so a corrupt or
/// non-SQLite file fails here. The returned query is prepared once so that
/// nothing about it can first fail at lookup time.
fn verify_schema(conn: &Connection) -> Result<String, String> {
    let mut stmt = conn
        .prepare("SELECT name, pk FROM pragma_table_info(?1)")
        .map_err(|e| e.to_string())?;
    let columns = stmt
        .query_map([TABLE_NAME], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })
        .and_then(|rows| rows.collect::<Result<Vec<_>, _>>())
        .map_err(|e| e.to_string())?;

    if columns.is_empty() {
        return Err(format!("missing table {}", TABLE_NAME));
    }

    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|required| !columns.iter().any(|(c, _)| c.eq_ignore_ascii_case(required)))
        .collect();

    if !missing.is_empty() {
        return Err(format!(
            "table {} is missing columns: {}",
            TABLE_NAME,
            missing.join(", ")
        ));
    }

    let find_sql = format!("{} ORDER BY {}", FIND_SQL, natural_order(conn, &columns)?);
    conn.prepare(&find_sql).map_err(|e| e.to_string())?;
    Ok(find_sql)
}

/// `rowid` for an ordinary table, the primary-key columns for a
/// `WITHOUT ROWID` one.
fn natural_order(conn: &Connection, columns: &[(String, i64)]) -> Result<String, String> {
    let has_rowid = conn
        .prepare(&format!("SELECT rowid FROM {} LIMIT 0", TABLE_NAME))
        .is_ok();
    if has_rowid {
        return Ok("rowid".to_string());
    }

    let mut key: Vec<&(String, i64)> = columns.iter().filter(|(_, pk)| *pk > 0).collect();
    if key.is_empty() {
        return Err(format!("table {} has neither rowid nor primary key", TABLE_NAME));
    }
    key.sort_by_key(|(_, pk)| *pk);

    debug!(table = TABLE_NAME, "Dataset has no rowid, ordering by primary key");
    Ok(key
        .iter()
        .map(|(name, _)| format!("\"{}\"", name.replace('"', "\"\"")))
        .collect::<Vec<_>>()
        .join(", "))
}

impl LookupStore for SqliteLookupStore {
    fn find_all(&self, key: &CellKey) -> Result<Vec<TowerRecord>, StoreError> {
        let conn = self.connection()?;
        let query_failed = |e: rusqlite::Error| StoreError::QueryFailed(e.to_string());

        let mut stmt = conn.prepare_cached(&self.find_sql).map_err(query_failed)?;
        let rows = stmt
            .query_map(params![key.cell_id, key.lac, key.mcc, key.mnc], |row| {
                Ok(TowerRecord {
                    latitude: row.get(0)?,
                    longitude: row.get(1)?,
                    accuracy: row.get(2)?,
                })
            })
            .map_err(query_failed)?;

        let records = rows.collect::<Result<Vec<_>, _>>().map_err(query_failed)?;
        debug!(key = %key, matches = records.len(), "Lookup store query");
        Ok(records)
    }

    fn info(&self) -> Result<StoreInfo, StoreError> {
        let conn = self.connection()?;
        let records: i64 = conn
            .query_row("SELECT COUNT(*) FROM cell_towers", [], |row| row.get(0))
            .map_err(|e| StoreError::QueryFailed(e.to_string()))?;

        Ok(StoreInfo {
            source: self.path.display().to_string(),
            records: records.max(0) as u64,
        })
    }

    fn is_open(&self) -> bool {
        self.conn.is_some()
    }

    fn close(&mut self) {
        let Some(conn) = self.conn.take() else {
            return;
        };

        match conn.close() {
            Ok(()) => info!(path = %self.path.display(), "Lookup store closed"),
            // The connection is dropped with the error, which releases it.
            Err((_, e)) => warn!(
                path = %self.path.display(),
                error = %e,
                "Lookup store close reported an error"
            ),
        }
    }
}

impl Drop for SqliteLookupStore {
    fn drop(&mut self) {
        self.close();
    }
}

/// Opens [`SqliteLookupStore`]s from a fixed path on the blocking pool.
#[derive(Debug, Clone)]
pub struct SqliteSource {
    path: PathBuf,
}

impl SqliteSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StoreSource for SqliteSource {
    fn open(&self) -> BoxFuture<'_, Result<Box<dyn LookupStore>, StoreError>> {
        let path = self.path.clone();
        Box::pin(async move {
            let opened = tokio::task::spawn_blocking({
                let path = path.clone();
                move || SqliteLookupStore::open(path)
            })
            .await
            .map_err(|e| StoreError::OpenFailed {
                path,
                reason: format!("open task failed: {}", e),
            })??;

            Ok(Box::new(opened) as Box<dyn LookupStore>)
        })
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{tempdir, NamedTempFile, TempDir};

    fn create_dataset(rows: &[(u32, u32, u16, u16, f64, f64, f64)]) -> (TempDir, PathBuf) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("celltowers.db");
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch(
            "CREATE TABLE cell_towers (
                cell_id INTEGER NOT NULL, lac INTEGER NOT NULL,
                mcc INTEGER NOT NULL, mnc INTEGER NOT NULL,
                latitude REAL NOT NULL, longitude REAL NOT NULL, accuracy REAL NOT NULL
            );",
        )
        .unwrap();
        for (cell_id, lac, mcc, mnc, lat, lon, acc) in rows {
            conn.execute(
                "INSERT INTO cell_towers VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![cell_id, lac, mcc, mnc, lat, lon, acc],
            )
            .unwrap();
        }
        (dir, path)
    }

    #[test]
    fn test_open_and_find() {
        let (_dir, path) = create_dataset(&[(100, 200, 310, 410, 37.422, -122.084, 150.0)]);
        let store = SqliteLookupStore::open(&path).unwrap();

        let records = store.find_all(&CellKey::new(100, 200, 310, 410)).unwrap();
        assert_eq!(records, vec![TowerRecord::new(37.422, -122.084, 150.0)]);
        assert!(store
            .find_all(&CellKey::new(100, 200, 310, 411))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_duplicates_in_rowid_order() {
        let (_dir, path) = create_dataset(&[
            (1, 1, 262, 1, 52.0, 13.0, 500.0),
            (1, 1, 262, 1, 48.0, 11.0, 900.0),
        ]);
        let store = SqliteLookupStore::open(&path).unwrap();

        let records = store.find_all(&CellKey::new(1, 1, 262, 1)).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].latitude, 52.0);
        assert_eq!(records[1].latitude, 48.0);
    }

    #[test]
    fn test_open_missing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("absent.db");

        assert!(matches!(
            SqliteLookupStore::open(&path),
            Err(StoreError::OpenFailed { .. })
        ));
        assert!(!path.exists(), "open must never create the dataset");
    }

    #[test]
    fn test_open_corrupt_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"this is not a sqlite database at all, just text")
            .unwrap();

        assert!(matches!(
            SqliteLookupStore::open(file.path()),
            Err(StoreError::OpenFailed { .. })
        ));
    }

    #[test]
    fn test_open_wrong_schema() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("wrong.db");
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch("CREATE TABLE cell_towers (cell_id INTEGER, lac INTEGER);")
            .unwrap();
        drop(conn);

        match SqliteLookupStore::open(&path) {
            Err(StoreError::OpenFailed { reason, .. }) => {
                assert!(reason.contains("missing columns"), "{}", reason);
                assert!(reason.contains("latitude"), "{}", reason);
            }
            other => panic!("expected OpenFailed, got {:?}", other),
        }
    }

    fn create_without_rowid(rows: &[(u32, u32, u16, u16, f64, f64, f64)]) -> (TempDir, PathBuf) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("pk.db");
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch(
            "CREATE TABLE cell_towers (
                cell_id INTEGER NOT NULL, lac INTEGER NOT NULL,
                mcc INTEGER NOT NULL, mnc INTEGER NOT NULL,
                latitude REAL NOT NULL, longitude REAL NOT NULL, accuracy REAL NOT NULL,
                PRIMARY KEY (cell_id, lac, mcc, mnc, latitude)
            ) WITHOUT ROWID;",
        )
        .unwrap();
        for (cell_id, lac, mcc, mnc, lat, lon, acc) in rows {
            conn.execute(
                "INSERT INTO cell_towers VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![cell_id, lac, mcc, mnc, lat, lon, acc],
            )
            .unwrap();
        }
        (dir, path)
    }

    #[test]
    fn test_without_rowid_table_is_queryable() {
        let (_dir, path) = create_without_rowid(&[(100, 200, 310, 410, 37.422, -122.084, 150.0)]);
        let store = SqliteLookupStore::open(&path).unwrap();

        let records = store.find_all(&CellKey::new(100, 200, 310, 410)).unwrap();
        assert_eq!(records, vec![TowerRecord::new(37.422, -122.084, 150.0)]);
        assert!(store.find_all(&CellKey::new(1, 2, 3, 4)).unwrap().is_empty());
    }

    #[test]
    fn test_without_rowid_duplicates_in_primary_key_order() {
        // Inserted out of key order; the primary key puts 48.0 first.
        let (_dir, path) = create_without_rowid(&[
            (1, 1, 262, 1, 52.0, 13.0, 500.0),
            (1, 1, 262, 1, 48.0, 11.0, 900.0),
        ]);
        let store = SqliteLookupStore::open(&path).unwrap();

        for _ in 0..3 {
            let records = store.find_all(&CellKey::new(1, 1, 262, 1)).unwrap();
            assert_eq!(records[0].latitude, 48.0);
            assert_eq!(records[1].latitude, 52.0);
        }
    }

    #[test]
    fn test_open_missing_table() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.db");
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch("CREATE TABLE other (x INTEGER);").unwrap();
        drop(conn);

        match SqliteLookupStore::open(&path) {
            Err(StoreError::OpenFailed { reason, .. }) => {
                assert_eq!(reason, "missing table cell_towers")
            }
            other => panic!("expected OpenFailed, got {:?}", other),
        }
    }

    #[test]
    fn test_query_after_close_is_unavailable() {
        let (_dir, path) = create_dataset(&[(1, 2, 3, 4, 0.0, 0.0, 1.0)]);
        let mut store = SqliteLookupStore::open(&path).unwrap();

        store.close();
        assert!(!store.is_open());
        assert_eq!(
            store.find_all(&CellKey::new(1, 2, 3, 4)),
            Err(StoreError::Unavailable)
        );
        assert_eq!(store.info(), Err(StoreError::Unavailable));

        // Second close is a no-op.
        store.close();
        assert!(!store.is_open());
    }

    #[test]
    fn test_info_counts_records() {
        let (_dir, path) = create_dataset(&[
            (1, 2, 3, 4, 0.0, 0.0, 1.0),
            (5, 6, 7, 8, 0.0, 0.0, 1.0),
        ]);
        let store = SqliteLookupStore::open(&path).unwrap();

        let info = store.info().unwrap();
        assert_eq!(info.records, 2);
        assert_eq!(info.source, path.display().to_string());
    }

    #[tokio::test]
    async fn test_source_opens_on_blocking_pool() {
        let (_dir, path) = create_dataset(&[(1, 2, 3, 4, 10.0, 20.0, 30.0)]);
        let source = SqliteSource::new(&path);

        let store = source.open().await.unwrap();
        assert!(store.is_open());
        assert_eq!(store.find_all(&CellKey::new(1, 2, 3, 4)).unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_source_reports_open_failure() {
        let source = SqliteSource::new("/nonexistent/celltowers.db");
        assert!(matches!(
            source.open().await,
            Err(StoreError::OpenFailed { .. })
        ));
    }
}
