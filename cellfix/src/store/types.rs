//! Core traits for the lookup store.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::cell::CellKey;
use crate::BoxFuture;

/// Errors that can occur while opening or querying a store.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// The dataset is missing, unreadable or has the wrong schema.
    #[error("failed to open lookup store at {}: {reason}", .path.display())]
    OpenFailed { path: PathBuf, reason: String },

    /// The store has been closed.
    #[error("lookup store is not open")]
    Unavailable,

    /// The underlying query failed.
    #[error("lookup query failed: {0}")]
    QueryFailed(String),
}

/// One location row as stored, before range validation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TowerRecord {
    pub latitude: f64,
    pub longitude: f64,
    pub accuracy: f64,
}

impl TowerRecord {
    pub fn new(latitude: f64, longitude: f64, accuracy: f64) -> Self {
        Self {
            latitude,
            longitude,
            accuracy,
        }
    }
}

/// Summary of an open store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreInfo {
    /// Where the records come from (a path, or `memory`).
    pub source: String,
    /// Number of records.
    pub records: u64,
}

impl fmt::Display for StoreInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} records)", self.source, self.records)
    }
}

/// An open, read-only handle to a tower dataset.
///
/// Implementations hold their resources until [`close`](Self::close) or drop.
/// Access is strictly sequential, so the trait only requires `Send`.
pub trait LookupStore: Send {
    /// Returns every record whose key equals `key` exactly, in the store's
    /// natural iteration order.
    ///
    /// # Errors
    ///
    /// - [`StoreError::Unavailable`] if the store is closed
    /// - [`StoreError::QueryFailed`] on an underlying read error
    fn find_all(&self, key: &CellKey) -> Result<Vec<TowerRecord>, StoreError>;

    /// Record count and source description.
    fn info(&self) -> Result<StoreInfo, StoreError>;

    /// Whether the store is still open.
    fn is_open(&self) -> bool;

    /// Releases all resources. Calling it again is a no-op.
    fn close(&mut self);
}

/// Opens a [`LookupStore`].
///
/// Opening may be slow (file I/O, schema checks), so it is async.
pub trait StoreSource: Send + Sync {
    /// Opens a fresh handle.
    fn open(&self) -> BoxFuture<'_, Result<Box<dyn LookupStore>, StoreError>>;

    /// Human-readable description of the source for logs.
    fn describe(&self) -> String;
}
